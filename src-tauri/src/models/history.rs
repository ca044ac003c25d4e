use crate::models::snapshot::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized, dense view of a snapshot. Rebuilt wholesale on every load or
/// period change and only ever read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryModel {
    /// Ascending date keys.
    pub dates: Vec<String>,
    /// Tracked technologies in first-seen order (category order, then list order).
    pub technologies: Vec<String>,
    /// One value per entry in `dates` for every tracked technology.
    pub series: BTreeMap<String, Vec<i64>>,
    pub categories: Vec<Category>,
}

impl HistoryModel {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn latest_index(&self) -> Option<usize> {
        self.dates.len().checked_sub(1)
    }

    pub fn latest_date(&self) -> Option<&str> {
        self.dates.last().map(String::as_str)
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    /// Count for `tech` on `day`, treating a missing series or index as 0.
    pub fn value(&self, tech: &str, day: usize) -> i64 {
        self.series
            .get(tech)
            .and_then(|values| values.get(day))
            .copied()
            .unwrap_or(0)
    }
}
