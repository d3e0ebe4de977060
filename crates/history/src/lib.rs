pub mod ring;

pub use ring::RingHistory;

/// Capacity used when the config does not override it.
pub const DEFAULT_CAPACITY: usize = 1000;
