//! Actor driving the poll loop
//!
//! ```text
//! Timer tick → fetch → decode → evaluate → AlertDispatcher → [console, webhook, discord]
//!     ↑           └─ failure → FailureCounter → (3rd in a row) "Unable to fetch server statistic"
//!     └─── Commands (PollNow, UpdateInterval, Shutdown)
//! ```
//!
//! The collector processes one cycle at a time: alerts of a record are fully
//! emitted before the next fetch starts.

pub mod collector;
pub mod messages;
