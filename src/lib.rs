pub mod actors;
pub mod alerts;
pub mod config;
pub mod discord;
pub mod fetch;
pub mod monitors;
pub mod record;
pub mod util;

pub use record::{DecodeError, StatsRecord};
