pub mod error;
pub mod event;
pub mod sample;
pub mod state;

pub use error::{DecodeError, Result, TransportError, ViewerError};
pub use event::IngestEvent;
pub use sample::{format_timestamp, unix_seconds, Reading, Sample};
pub use state::ConnectionState;
