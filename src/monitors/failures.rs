use tracing::debug;

use crate::alerts::{AlertKind, AlertMessage};

/// Counts consecutive fetch failures.
///
/// Once `threshold` failures happened in a row, [`FailureCounter::record_failure`]
/// signals that the unavailability alert should fire and the counter starts
/// over, so every further run of `threshold` failures fires exactly once more.
#[derive(Debug, Clone)]
pub struct FailureCounter {
    consecutive: u32,
    threshold: u32,
}

impl FailureCounter {
    /// A threshold of 0 behaves like 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive: 0,
            threshold: threshold.max(1),
        }
    }

    /// Returns `true` when the unavailability alert should be emitted now.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive += 1;
        debug!(
            "consecutive fetch failures: {}/{}",
            self.consecutive, self.threshold
        );

        if self.consecutive >= self.threshold {
            self.consecutive = 0;
            return true;
        }
        false
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn unavailable_alert() -> AlertMessage {
        AlertMessage::new(AlertKind::Unavailable, "Unable to fetch server statistic")
    }
}
