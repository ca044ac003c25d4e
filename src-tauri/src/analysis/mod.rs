pub mod aggregate;
pub mod display;
pub mod extraction;
pub mod period;
pub mod ranking;
pub mod rollup;
