pub mod failures;
pub mod thresholds;
