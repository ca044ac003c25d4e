use crate::models::history::HistoryModel;
use crate::models::snapshot::RawSnapshot;
use std::collections::{BTreeMap, HashSet};

/// Build the dense history model from a raw snapshot.
///
/// Only technologies listed under `categories` are tracked; counts for
/// anything else are dropped. A snapshot without `categories` yields a model
/// with dates but no series. Daily sums saturate at the `i64` bounds.
pub fn aggregate(raw: &RawSnapshot) -> HistoryModel {
    let dates: Vec<String> = raw.dates().map(str::to_string).collect();
    let categories = raw.categories().map(<[_]>::to_vec).unwrap_or_default();

    let mut seen = HashSet::new();
    let technologies: Vec<String> = categories
        .iter()
        .flat_map(|category| category.technologies.iter())
        .filter(|tech| seen.insert(tech.as_str()))
        .cloned()
        .collect();

    let mut series: BTreeMap<String, Vec<i64>> = technologies
        .iter()
        .map(|tech| (tech.clone(), vec![0; dates.len()]))
        .collect();

    for (day, (_, postings)) in raw.days().enumerate() {
        for posting in postings {
            for (tech, count) in &posting.technologies {
                if let Some(values) = series.get_mut(tech) {
                    values[day] = values[day].saturating_add(*count);
                }
            }
        }
    }

    HistoryModel {
        dates,
        technologies,
        series,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::{Category, JobPosting};
    use serde_json::json;

    fn scenario() -> RawSnapshot {
        RawSnapshot::from_value(&json!({
            "2024-01-01": [{ "technologies": { "Go": 2 } }],
            "2024-01-02": [{ "technologies": { "Go": 1, "Rust": 3 } }],
            "categories": { "Backend": ["Go", "Rust"] }
        }))
        .unwrap()
    }

    #[test]
    fn builds_dense_series_for_scenario() {
        let model = aggregate(&scenario());

        assert_eq!(model.dates, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(model.series["Go"], vec![2, 1]);
        assert_eq!(model.series["Rust"], vec![0, 3]);
    }

    #[test]
    fn every_tracked_technology_has_a_full_length_series() {
        let raw = RawSnapshot::from_value(&json!({
            "2024-03-01": [],
            "2024-03-02": [{ "technologies": { "Docker": 1 } }],
            "2024-03-03": [],
            "categories": {
                "DevOps/Cloud": ["Docker", "Kubernetes"],
                "Design": ["Figma"]
            }
        }))
        .unwrap();
        let model = aggregate(&raw);

        assert_eq!(model.technologies, vec!["Docker", "Kubernetes", "Figma"]);
        for tech in &model.technologies {
            assert_eq!(model.series[tech].len(), model.dates.len(), "{tech}");
        }
        assert_eq!(model.series["Figma"], vec![0, 0, 0]);
    }

    #[test]
    fn sums_across_postings_and_drops_untracked_technologies() {
        let mut raw = RawSnapshot::new(Some(vec![Category::new("Backend", vec!["Go"])]));
        raw.record_day(
            "2024-05-01",
            vec![
                JobPosting::new([("Go", 1), ("COBOL", 9)]),
                JobPosting::new([("Go", 4)]),
                JobPosting::default(),
            ],
        );
        let model = aggregate(&raw);

        assert_eq!(model.series["Go"], vec![5]);
        assert!(!model.series.contains_key("COBOL"));
    }

    #[test]
    fn shared_technology_is_tracked_once() {
        let raw = RawSnapshot::from_value(&json!({
            "2024-01-01": [{ "technologies": { "SQL": 2 } }],
            "categories": { "Databases": ["SQL"], "BI Tools": ["Power BI", "SQL"] }
        }))
        .unwrap();
        let model = aggregate(&raw);

        assert_eq!(model.technologies, vec!["SQL", "Power BI"]);
        assert_eq!(model.series["SQL"], vec![2]);
    }

    #[test]
    fn missing_categories_yields_empty_universe() {
        let raw = RawSnapshot::from_value(&json!({
            "2024-01-01": [{ "technologies": { "Go": 2 } }]
        }))
        .unwrap();
        let model = aggregate(&raw);

        assert_eq!(model.dates.len(), 1);
        assert!(model.technologies.is_empty());
        assert!(model.series.is_empty());
    }

    #[test]
    fn malformed_date_keys_sort_lexicographically() {
        let raw = RawSnapshot::from_value(&json!({
            "2024-01-02": [],
            "yesterday": [],
            "2024-01-01": [],
            "categories": {}
        }))
        .unwrap();

        assert_eq!(aggregate(&raw).dates, vec!["2024-01-01", "2024-01-02", "yesterday"]);
    }

    #[test]
    fn negative_counts_pass_through() {
        let raw = RawSnapshot::from_value(&json!({
            "2024-01-01": [{ "technologies": { "Go": 3 } }, { "technologies": { "Go": -1 } }],
            "categories": { "Backend": ["Go"] }
        }))
        .unwrap();

        assert_eq!(aggregate(&raw).series["Go"], vec![2]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let raw = scenario();
        assert_eq!(aggregate(&raw), aggregate(&raw));
    }

    #[test]
    fn daily_sums_saturate_instead_of_overflowing() {
        let raw = RawSnapshot::from_value(&json!({
            "2024-01-01": [
                { "technologies": { "Go": i64::MAX } },
                { "technologies": { "Go": 1 } }
            ],
            "categories": { "Backend": ["Go"] }
        }))
        .unwrap();

        let model = aggregate(&raw);
        assert_eq!(model.series["Go"], vec![i64::MAX]);
    }
}
