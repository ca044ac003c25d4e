use crate::models::selection::{CategoryCountMap, RankedSelection};
use std::cmp::Ordering;

/// Keep the `n` largest strictly positive, finite values.
///
/// Sorted by value descending; equal values are ordered by label ascending
/// so the result does not depend on the input's iteration order. Fewer than
/// `n` qualifying entries are returned as-is, never padded.
pub fn select_top_n<I, K>(counts: I, n: usize) -> RankedSelection
where
    I: IntoIterator<Item = (K, f64)>,
    K: Into<String>,
{
    let mut entries: Vec<(String, f64)> = counts
        .into_iter()
        .filter(|(_, value)| value.is_finite() && *value > 0.0)
        .map(|(label, value)| (label.into(), value))
        .collect();

    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    entries.truncate(n);

    let (labels, values) = entries.into_iter().unzip();
    RankedSelection { labels, values }
}

/// [`select_top_n`] over a rollup result.
pub fn rank_counts(counts: &CategoryCountMap, n: usize) -> RankedSelection {
    select_top_n(
        counts.iter().map(|(label, count)| (label.as_str(), *count as f64)),
        n,
    )
}
