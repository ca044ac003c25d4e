use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name → aggregate count for a single day. Entries with a zero total are
/// never present.
pub type CategoryCountMap = BTreeMap<String, i64>;

/// Top-N labels and values, ready for a donut or bar chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedSelection {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl RankedSelection {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Whether a view has something to draw. `Empty` is a normal outcome
/// (e.g. nothing in a category was mentioned that day), not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Ready,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutData {
    /// `None` for the all-categories overview.
    pub category: Option<String>,
    pub date: Option<String>,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
    pub state: SelectionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDataset {
    pub label: String,
    pub data: Vec<i64>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineData {
    pub category: Option<String>,
    /// X-axis labels, aligned with every dataset's `data`.
    pub labels: Vec<String>,
    pub datasets: Vec<TimelineDataset>,
}
