//! Error types shared by the snapshot pipeline and the IPC commands.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum PulseError {
    /// Network failure, non-2xx response, or unreadable snapshot file.
    #[error("FETCH_FAILED: {0}")]
    Fetch(String),

    /// The snapshot document does not have the expected shape.
    #[error("MALFORMED_INPUT: {0}")]
    MalformedInput(String),

    /// A month/year selection that does not name a calendar month.
    #[error("INVALID_PERIOD: {0}")]
    InvalidPeriod(String),

    /// A command needed a loaded snapshot and none is available.
    #[error("NO_DATA: No history loaded. Load history.json first.")]
    NoData,

    #[error("NOT_FOUND: {entity} '{name}'")]
    NotFound { entity: &'static str, name: String },

    #[error("SETTINGS: {0}")]
    Settings(String),

    #[error("STATE_LOCK: dashboard state is unavailable")]
    StateLock,
}

impl PulseError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn invalid_period(message: impl Into<String>) -> Self {
        Self::InvalidPeriod(message.into())
    }

    pub fn category_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "category",
            name: name.into(),
        }
    }

    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(message.into())
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedInput(_))
    }

    pub fn is_invalid_period(&self) -> bool {
        matches!(self, Self::InvalidPeriod(_))
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Errors the view layer should present as "no data available" rather
    /// than as a failure of the current interaction.
    pub fn means_no_data(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::MalformedInput(_) | Self::NoData)
    }
}

impl From<reqwest::Error> for PulseError {
    fn from(err: reqwest::Error) -> Self {
        Self::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for PulseError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(format!("history.json is not valid JSON: {err}"))
    }
}

pub type PulseResult<T> = Result<T, PulseError>;
