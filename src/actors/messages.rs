//! Message types for the collector actor
//!
//! Commands are sent to the actor over an mpsc channel; results of an
//! on-demand poll come back through a oneshot channel.

use tokio::sync::oneshot;

use crate::record::DecodeError;

/// What happened during a single poll cycle
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// A record was decoded and evaluated; `alerts` were emitted
    Evaluated { alerts: usize },

    /// The payload was fetched but could not be decoded, nothing was emitted
    Malformed(DecodeError),

    /// The fetch failed; `escalated` is true if the unavailability alert was emitted
    FetchFailed { escalated: bool },
}

/// Commands that can be sent to a StatsCollectorActor
#[derive(Debug)]
pub enum CollectorCommand {
    /// Run one poll cycle immediately, outside of the interval timer
    PollNow {
        /// Channel to send the outcome back
        respond_to: oneshot::Sender<PollOutcome>,
    },

    /// Replace the polling interval; the timer restarts with the new period
    UpdateInterval { interval_ms: u64 },

    /// Stop the collector
    ///
    /// A cycle that is already in flight completes first.
    Shutdown,
}
