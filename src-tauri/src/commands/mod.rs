pub mod dashboard;
pub mod fetch;
pub mod settings;
