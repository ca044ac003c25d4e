pub mod dashboard;
pub mod history;
pub mod selection;
pub mod snapshot;
