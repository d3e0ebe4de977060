use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display format for sample timestamps (local time, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored reading. Immutable once appended to the history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Unix time in seconds, with sub-second precision.
    pub timestamp: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Build a sample from any zoned date-time.
    pub fn at<Tz: TimeZone>(time: &DateTime<Tz>, value: f64) -> Self {
        Self::new(unix_seconds(time), value)
    }
}

/// Unix time of `time` in seconds, keeping the sub-second part.
pub fn unix_seconds<Tz: TimeZone>(time: &DateTime<Tz>) -> f64 {
    time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) / 1e9
}

impl fmt::Display for Sample {
    /// `"2024-05-01 12:34:56 - 42"`, the list-view row format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", format_timestamp(self.timestamp), self.value)
    }
}

/// JSON shape of one inbound text frame:
/// `{"timestamp": "2024-05-01T12:34:56.789", "value": 42}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: String,
    pub value: f64,
}

/// Render a unix timestamp in local time using [`TIMESTAMP_FORMAT`].
///
/// Values chrono cannot represent fall back to the raw number.
pub fn format_timestamp(timestamp: f64) -> String {
    if !timestamp.is_finite() {
        return timestamp.to_string();
    }
    let secs  = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;

    match DateTime::<Utc>::from_timestamp(secs as i64, nanos.min(999_999_999)) {
        Some(utc) => utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
        None      => timestamp.to_string(),
    }
}
