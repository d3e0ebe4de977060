use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("config error: {0}")]
    Config(String),

    /// Rejected before any connection attempt; state is left untouched.
    #[error("invalid stream URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// A network-level failure on the streaming connection.
///
/// Reported to the presenter as an event; never closes the session by itself.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("receive failed: {0}")]
    Receive(String),
}

/// An inbound message that could not be turned into a sample.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed reading: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognised timestamp '{0}'")]
    Timestamp(String),
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
