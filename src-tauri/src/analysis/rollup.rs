use crate::models::history::HistoryModel;
use crate::models::selection::CategoryCountMap;

/// Per-category totals for `day`. Only positive totals are kept; an
/// out-of-range `day` gives an empty map.
///
/// A technology listed in two categories counts toward both.
pub fn rollup_day(model: &HistoryModel, day: usize) -> CategoryCountMap {
    if day >= model.dates.len() {
        return CategoryCountMap::new();
    }

    model
        .categories
        .iter()
        .map(|category| {
            let total: i64 = category
                .technologies
                .iter()
                .map(|tech| model.value(tech, day))
                .fold(0_i64, i64::saturating_add);
            (category.name.clone(), total)
        })
        .filter(|(_, total)| *total > 0)
        .collect()
}

pub fn rollup_latest_day(model: &HistoryModel) -> CategoryCountMap {
    model
        .latest_index()
        .map(|day| rollup_day(model, day))
        .unwrap_or_default()
}

/// Per-technology counts inside one category for `day`, same zero rule as
/// [`rollup_day`]. `None` when the category is unknown.
pub fn rollup_category_day(
    model: &HistoryModel,
    category: &str,
    day: usize,
) -> Option<CategoryCountMap> {
    let category = model.category(category)?;
    if day >= model.dates.len() {
        return Some(CategoryCountMap::new());
    }

    Some(
        category
            .technologies
            .iter()
            .map(|tech| (tech.clone(), model.value(tech, day)))
            .filter(|(_, count)| *count > 0)
            .collect(),
    )
}

pub fn rollup_category_latest_day(model: &HistoryModel, category: &str) -> Option<CategoryCountMap> {
    match model.latest_index() {
        Some(day) => rollup_category_day(model, category, day),
        None => model.category(category).map(|_| CategoryCountMap::new()),
    }
}

/// Daily totals per category, in category order, aligned with `model.dates`.
pub fn category_series(model: &HistoryModel) -> Vec<(String, Vec<i64>)> {
    model
        .categories
        .iter()
        .map(|category| {
            let totals: Vec<i64> = (0..model.dates.len())
                .map(|day| {
                    category
                        .technologies
                        .iter()
                        .map(|tech| model.value(tech, day))
                        .fold(0_i64, i64::saturating_add)
                })
                .collect();
            (category.name.clone(), totals)
        })
        .collect()
}

/// Series for each technology of `category`, zero-filled when a series is
/// missing. `None` when the category is unknown.
pub fn technology_series(model: &HistoryModel, category: &str) -> Option<Vec<(String, Vec<i64>)>> {
    let category = model.category(category)?;

    Some(
        category
            .technologies
            .iter()
            .map(|tech| {
                let values = model
                    .series
                    .get(tech)
                    .cloned()
                    .unwrap_or_else(|| vec![0; model.dates.len()]);
                (tech.clone(), values)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate::aggregate;
    use crate::models::snapshot::{Category, RawSnapshot};
    use serde_json::json;

    fn model() -> HistoryModel {
        aggregate(
            &RawSnapshot::from_value(&json!({
                "2024-01-01": [{ "technologies": { "Go": 2, "Figma": 1 } }],
                "2024-01-02": [{ "technologies": { "Go": 1, "Rust": 3 } }],
                "categories": {
                    "Backend": ["Go", "Rust"],
                    "Design": ["Figma"],
                    "Systems": ["Rust"]
                }
            }))
            .unwrap(),
        )
    }

    #[test]
    fn rolls_up_scenario_day() {
        let counts = rollup_day(&model(), 1);
        assert_eq!(counts.get("Backend"), Some(&4));
    }

    #[test]
    fn zero_total_category_is_absent_on_latest_day() {
        let latest = rollup_latest_day(&model());
        assert!(!latest.contains_key("Design"));
        assert_eq!(latest.get("Systems"), Some(&3));
    }

    #[test]
    fn rollup_matches_series_sums() {
        let model = model();
        for day in 0..model.dates.len() {
            let counts = rollup_day(&model, day);
            for category in &model.categories {
                let sum: i64 = category
                    .technologies
                    .iter()
                    .map(|tech| model.series[tech][day])
                    .sum();
                if sum > 0 {
                    assert_eq!(counts[&category.name], sum);
                } else {
                    assert!(!counts.contains_key(&category.name));
                }
            }
        }
    }

    #[test]
    fn empty_model_rolls_up_to_empty_map() {
        let model = HistoryModel::default();
        assert!(rollup_latest_day(&model).is_empty());
        assert!(rollup_day(&model, 0).is_empty());
    }

    #[test]
    fn out_of_range_day_is_empty() {
        assert!(rollup_day(&model(), 7).is_empty());
    }

    #[test]
    fn missing_series_entry_counts_as_zero() {
        let mut model = model();
        model.series.remove("Rust");
        model.categories.push(Category::new("Ghost", vec!["Nothing"]));

        let counts = rollup_day(&model, 1);
        assert_eq!(counts.get("Backend"), Some(&1));
        assert!(!counts.contains_key("Ghost"));
    }

    #[test]
    fn drills_into_category_technologies() {
        let model = model();
        let backend = rollup_category_latest_day(&model, "Backend").unwrap();
        assert_eq!(backend.get("Go"), Some(&1));
        assert_eq!(backend.get("Rust"), Some(&3));

        let design = rollup_category_latest_day(&model, "Design").unwrap();
        assert!(design.is_empty());

        assert!(rollup_category_latest_day(&model, "Mobile").is_none());
    }

    #[test]
    fn category_series_sums_each_day() {
        let series = category_series(&model());
        assert_eq!(series[0], ("Backend".to_string(), vec![2, 4]));
        assert_eq!(series[1], ("Design".to_string(), vec![1, 0]));
        assert_eq!(series[2], ("Systems".to_string(), vec![0, 3]));
    }

    #[test]
    fn technology_series_zero_fills_missing_entries() {
        let mut model = model();
        model.series.remove("Go");

        let series = technology_series(&model, "Backend").unwrap();
        assert_eq!(series[0], ("Go".to_string(), vec![0, 0]));
        assert_eq!(series[1], ("Rust".to_string(), vec![0, 3]));
        assert!(technology_series(&model, "Mobile").is_none());
    }

    #[test]
    fn category_totals_saturate() {
        let raw = RawSnapshot::from_value(&json!({
            "2024-01-01": [{ "technologies": { "Go": i64::MAX, "Rust": i64::MAX } }],
            "categories": { "Backend": ["Go", "Rust"] }
        }))
        .unwrap();
        let model = aggregate(&raw);

        assert_eq!(rollup_day(&model, 0)["Backend"], i64::MAX);
        assert_eq!(category_series(&model)[0].1, vec![i64::MAX]);
    }
}
