use crate::models::history::HistoryModel;
use crate::models::snapshot::RawSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum DashboardView {
    #[default]
    Overview,
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSelection {
    pub month: String,
    pub year: i32,
    pub first_day: String,
    pub last_day: String,
}

/// Outcome of a month selection. `Empty` leaves the previous model in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PeriodSelection {
    Applied {
        period: MonthSelection,
        date_count: usize,
    },
    Empty {
        period: MonthSelection,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub first_date: Option<String>,
    pub latest_date: Option<String>,
    pub date_count: usize,
    pub category_count: usize,
    pub technology_count: usize,
    pub period: Option<MonthSelection>,
    pub view: DashboardView,
    pub hours_since_update: i64,
    pub updated_label: String,
}

/// Application state owned by the shell and handed to every command.
#[derive(Debug, Default)]
pub struct DashboardState {
    /// Last successfully fetched document, kept so month filters never refetch.
    pub full_snapshot: Option<RawSnapshot>,
    /// Model currently displayed (filtered when `period` is set).
    pub history: Option<HistoryModel>,
    pub period: Option<MonthSelection>,
    pub view: DashboardView,
}

impl DashboardState {
    pub fn clear(&mut self) {
        self.full_snapshot = None;
        self.history = None;
        self.period = None;
    }
}
