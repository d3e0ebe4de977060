use chrono::{DateTime, Local};
use tview_core::Reading;

/// Timestamp layout of emitted readings: local time, millisecond precision,
/// no offset (e.g. `2024-05-01T12:34:56.789`).
pub const READING_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Integer ramp that climbs from `min` to `max` one step per tick and then
/// wraps back to `min`.
#[derive(Debug, Clone)]
pub struct Sawtooth {
    min:     i64,
    max:     i64,
    current: i64,
}

impl Sawtooth {
    /// The first emitted value is `min + 1` (or `min` when `min == max`).
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max, current: min }
    }

    pub fn next_value(&mut self) -> i64 {
        self.current = if self.current >= self.max {
            self.min
        } else {
            self.current + 1
        };
        self.current
    }
}

/// Wire reading for `value` stamped at `now`.
pub fn reading_at(now: &DateTime<Local>, value: i64) -> Reading {
    Reading {
        timestamp: now.format(READING_TIMESTAMP_FORMAT).to_string(),
        value:     value as f64,
    }
}
