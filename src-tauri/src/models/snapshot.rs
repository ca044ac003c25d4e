use crate::error::{PulseError, PulseResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reserved top-level key holding category membership.
pub const CATEGORIES_KEY: &str = "categories";

/// One job posting as recorded by the collector. Only `technologies` is read;
/// any other fields in the document are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub technologies: BTreeMap<String, i64>,
}

impl JobPosting {
    pub fn new<I, S>(technologies: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            technologies: technologies
                .into_iter()
                .map(|(tech, count)| (tech.into(), count))
                .collect(),
        }
    }
}

/// A named group of tracked technologies, in the order the document lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub technologies: Vec<String>,
}

impl Category {
    pub fn new<S: Into<String>>(name: S, technologies: Vec<&str>) -> Self {
        Self {
            name: name.into(),
            technologies: technologies.into_iter().map(str::to_string).collect(),
        }
    }
}

/// The `history.json` document: date key → postings, plus `categories`.
///
/// Date keys live in a `BTreeMap`, so iteration is already the ascending
/// lexicographic order the history model uses. Keys are not validated as
/// dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSnapshot {
    days: BTreeMap<String, Vec<JobPosting>>,
    categories: Option<Vec<Category>>,
}

impl RawSnapshot {
    pub fn new(categories: Option<Vec<Category>>) -> Self {
        Self {
            days: BTreeMap::new(),
            categories,
        }
    }

    pub fn from_json_str(raw: &str) -> PulseResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_json_slice(raw: &[u8]) -> PulseResult<Self> {
        let value: Value = serde_json::from_slice(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> PulseResult<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| PulseError::malformed("history.json must be a JSON object"))?;

        let mut snapshot = RawSnapshot::default();
        for (key, entry) in root {
            if key == CATEGORIES_KEY {
                snapshot.categories = parse_categories(entry)?;
            } else {
                snapshot.days.insert(key.clone(), parse_day(key, entry)?);
            }
        }

        Ok(snapshot)
    }

    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        for (date, postings) in &self.days {
            let postings = postings
                .iter()
                .map(|posting| serde_json::json!({ "technologies": posting.technologies }))
                .collect();
            root.insert(date.clone(), Value::Array(postings));
        }
        if let Some(categories) = &self.categories {
            let categories = categories
                .iter()
                .map(|category| (category.name.clone(), serde_json::json!(category.technologies)))
                .collect();
            root.insert(CATEGORIES_KEY.to_string(), Value::Object(categories));
        }
        Value::Object(root)
    }

    pub fn categories(&self) -> Option<&[Category]> {
        self.categories.as_deref()
    }

    /// Date keys in ascending lexicographic order.
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    pub fn days(&self) -> impl Iterator<Item = (&str, &[JobPosting])> {
        self.days
            .iter()
            .map(|(date, postings)| (date.as_str(), postings.as_slice()))
    }

    pub fn postings(&self, date: &str) -> &[JobPosting] {
        self.days.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn date_count(&self) -> usize {
        self.days.len()
    }

    pub fn has_dates(&self) -> bool {
        !self.days.is_empty()
    }

    /// A copy holding only the dates accepted by `keep`; `categories` is untouched.
    pub fn retain_dates<F>(&self, mut keep: F) -> RawSnapshot
    where
        F: FnMut(&str) -> bool,
    {
        RawSnapshot {
            days: self
                .days
                .iter()
                .filter(|(date, _)| keep(date))
                .map(|(date, postings)| (date.clone(), postings.clone()))
                .collect(),
            categories: self.categories.clone(),
        }
    }

    /// Inserts one day of postings, replacing anything already recorded for
    /// that date.
    pub fn record_day(&mut self, date: impl Into<String>, postings: Vec<JobPosting>) {
        self.days.insert(date.into(), postings);
    }
}

fn parse_categories(value: &Value) -> PulseResult<Option<Vec<Category>>> {
    if value.is_null() {
        return Ok(None);
    }

    let map = value
        .as_object()
        .ok_or_else(|| PulseError::malformed("'categories' must map category names to lists"))?;

    let mut categories = Vec::with_capacity(map.len());
    for (name, techs) in map {
        let list = techs.as_array().ok_or_else(|| {
            PulseError::malformed(format!("category '{name}' must be a list of technology names"))
        })?;

        let mut technologies = Vec::with_capacity(list.len());
        for tech in list {
            let tech = tech.as_str().ok_or_else(|| {
                PulseError::malformed(format!("category '{name}' contains a non-string entry"))
            })?;
            technologies.push(tech.to_string());
        }

        categories.push(Category {
            name: name.clone(),
            technologies,
        });
    }

    Ok(Some(categories))
}

fn parse_day(date: &str, value: &Value) -> PulseResult<Vec<JobPosting>> {
    let list = value
        .as_array()
        .ok_or_else(|| PulseError::malformed(format!("'{date}' must be a list of job postings")))?;

    list.iter()
        .enumerate()
        .map(|(index, posting)| parse_posting(date, index, posting))
        .collect()
}

fn parse_posting(date: &str, index: usize, value: &Value) -> PulseResult<JobPosting> {
    let posting = value.as_object().ok_or_else(|| {
        PulseError::malformed(format!("posting #{index} on '{date}' is not an object"))
    })?;

    // A posting without `technologies` simply mentions nothing.
    let techs = match posting.get("technologies") {
        None | Some(Value::Null) => return Ok(JobPosting::default()),
        Some(Value::Object(techs)) => techs,
        Some(_) => {
            return Err(PulseError::malformed(format!(
                "posting #{index} on '{date}' has a non-object 'technologies' field"
            )))
        }
    };

    let mut technologies = BTreeMap::new();
    for (tech, count) in techs {
        let count = parse_count(count).ok_or_else(|| {
            PulseError::malformed(format!(
                "count for '{tech}' in posting #{index} on '{date}' is not an integer"
            ))
        })?;
        technologies.insert(tech.clone(), count);
    }

    Ok(JobPosting { technologies })
}

fn parse_count(value: &Value) -> Option<i64> {
    if let Some(count) = value.as_i64() {
        return Some(count);
    }
    // Integral floats (`2.0`) are accepted; anything fractional is not a count.
    value
        .as_f64()
        .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}
