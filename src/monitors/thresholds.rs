//! Threshold rules evaluated against every decoded [`StatsRecord`]
//!
//! All four rules are checked on every record and each may contribute one
//! alert. A rule whose capacity field is zero or negative is skipped.
//! Comparisons are strict, a value exactly at its threshold never alerts.

use serde::Deserialize;
use tracing::trace;

use crate::{
    StatsRecord,
    alerts::{AlertKind, AlertMessage},
};

const BYTES_PER_MEBIBYTE: f64 = 1024.0 * 1024.0;

const BITS_PER_BYTE: f64 = 8.0;

const BITS_PER_MEGABIT: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Alert when the load average is above this value
    pub load_average: f64,
    /// Alert when memory usage is above this percentage
    pub memory_usage_percent: f64,
    /// Alert when free disk space is below this percentage
    pub disk_free_percent: f64,
    /// Alert when network usage is above this percentage
    pub network_usage_percent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            load_average: 30.0,
            memory_usage_percent: 80.0,
            disk_free_percent: 10.0,
            network_usage_percent: 90.0,
        }
    }
}

/// Evaluate all rules in order: load, memory, disk, network.
pub fn evaluate(record: &StatsRecord, thresholds: &Thresholds) -> Vec<AlertMessage> {
    let alerts = [
        check_load(record, thresholds),
        check_memory(record, thresholds),
        check_disk(record, thresholds),
        check_network(record, thresholds),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    trace!("evaluated record {record:?} -> {} alert(s)", alerts.len());
    alerts
}

fn check_load(record: &StatsRecord, thresholds: &Thresholds) -> Option<AlertMessage> {
    if record.load_average <= thresholds.load_average {
        return None;
    }

    Some(AlertMessage::new(
        AlertKind::Load,
        format!(
            "Load Average is too high: {}",
            round_half_away(record.load_average)
        ),
    ))
}

fn check_memory(record: &StatsRecord, thresholds: &Thresholds) -> Option<AlertMessage> {
    let usage = percent(record.mem_used, record.mem_total)?;
    if usage <= thresholds.memory_usage_percent {
        return None;
    }

    Some(AlertMessage::new(
        AlertKind::Memory,
        format!("Memory usage too high: {}%", round_half_away(usage)),
    ))
}

fn check_disk(record: &StatsRecord, thresholds: &Thresholds) -> Option<AlertMessage> {
    let free_bytes = record.disk_total - record.disk_used;
    let free = percent(free_bytes, record.disk_total)?;
    if free >= thresholds.disk_free_percent {
        return None;
    }

    Some(AlertMessage::new(
        AlertKind::Disk,
        format!(
            "Free disk space is too low: {:.0} Mb left",
            bytes_to_mebibytes_floor(free_bytes)
        ),
    ))
}

fn check_network(record: &StatsRecord, thresholds: &Thresholds) -> Option<AlertMessage> {
    let usage = percent(record.net_used, record.net_total)?;
    if usage <= thresholds.network_usage_percent {
        return None;
    }

    let available = bytes_per_sec_to_megabits(record.net_total - record.net_used);
    Some(AlertMessage::new(
        AlertKind::Network,
        format!(
            "Network bandwidth usage high: {} Mbit/s available",
            round_half_away(available)
        ),
    ))
}

/// `part` as a percentage of `total`, or `None` when `total` is not positive.
///
/// Divides first so large finite inputs do not overflow to infinity.
fn percent(part: f64, total: f64) -> Option<f64> {
    (total > 0.0).then(|| part / total * 100.0)
}

/// Round half away from zero and format without decimals.
///
/// Formatting the float keeps large values intact; `+ 0.0` turns `-0` into `0`.
fn round_half_away(value: f64) -> String {
    format!("{:.0}", value.round() + 0.0)
}

/// Convert bytes to whole mebibytes, rounding down.
pub fn bytes_to_mebibytes_floor(bytes: f64) -> f64 {
    (bytes / BYTES_PER_MEBIBYTE).floor() + 0.0
}

/// Convert bytes/s to (decimal) megabits/s.
pub fn bytes_per_sec_to_megabits(bytes_per_sec: f64) -> f64 {
    bytes_per_sec * BITS_PER_BYTE / BITS_PER_MEGABIT
}
