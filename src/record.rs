//! Decoding of the compact stats record served by the monitored host
//!
//! The endpoint answers with a single line of seven comma separated numbers:
//!
//! ```text
//! load_average,mem_total,mem_used,disk_total,disk_used,net_total,net_used
//! ```
//!
//! Surrounding whitespace and whitespace around each field are ignored.
//! Only the first line of the payload is read; anything after it is ignored.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One decoded snapshot of the monitored server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Current system load, unitless
    pub load_average: f64,
    pub mem_total: f64,
    pub mem_used: f64,
    /// Total disk capacity in bytes
    pub disk_total: f64,
    /// Used disk space in bytes
    pub disk_used: f64,
    /// Total network bandwidth in bytes/s
    pub net_total: f64,
    /// Used network bandwidth in bytes/s
    pub net_used: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {} fields, found {found}", StatsRecord::FIELD_COUNT)]
    Shape { found: usize },

    #[error("field {index} is not a valid number: {value:?}")]
    NumberFormat { index: usize, value: String },
}

impl StatsRecord {
    pub const FIELD_COUNT: usize = 7;

    /// Decode a raw payload into a record.
    ///
    /// The shape is checked before any field is parsed, so a payload with the
    /// wrong number of fields always yields [`DecodeError::Shape`].
    pub fn decode(raw: &str) -> Result<StatsRecord, DecodeError> {
        let line = raw.trim().lines().next().unwrap_or_default();
        let fields = line.split(',').map(str::trim).collect::<Vec<_>>();

        if fields.len() != Self::FIELD_COUNT {
            return Err(DecodeError::Shape {
                found: fields.len(),
            });
        }

        let mut values = [0.0; Self::FIELD_COUNT];
        for (index, (slot, field)) in values.iter_mut().zip(&fields).enumerate() {
            *slot = parse_field(index, field)?;
        }

        let [
            load_average,
            mem_total,
            mem_used,
            disk_total,
            disk_used,
            net_total,
            net_used,
        ] = values;

        Ok(StatsRecord {
            load_average,
            mem_total,
            mem_used,
            disk_total,
            disk_used,
            net_total,
            net_used,
        })
    }
}

fn parse_field(index: usize, field: &str) -> Result<f64, DecodeError> {
    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| DecodeError::NumberFormat {
            index,
            value: field.to_string(),
        })
}

impl FromStr for StatsRecord {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatsRecord::decode(s)
    }
}
