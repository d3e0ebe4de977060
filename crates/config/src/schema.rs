use serde::{Deserialize, Serialize};
use tview_core::{Result, ViewerError};

/// Root configuration structure parsed from `tview.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub connection: ConnectionConfig,
    pub history: HistoryConfig,
    pub ingest: IngestConfig,
    pub presenter: PresenterConfig,
}

impl ViewerConfig {
    /// Reject values the core cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.history.capacity == 0 {
            return Err(ViewerError::Config("history.capacity must be at least 1".into()));
        }
        if self.ingest.batch_size == 0 {
            return Err(ViewerError::Config("ingest.batch_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Where the stream comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// WebSocket URI used by `start` when none is given.
    pub uri: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: "ws://localhost:8765/ws".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of samples retained before the oldest is overwritten.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Accepted samples between two batch-ready signals.
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

/// Console presenter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Default row count for the `last` command.
    pub recent_count: usize,
    /// Number of points drawn in the sparkline.
    pub sparkline_width: usize,
    /// Drop the previous session's samples when a new connection starts.
    pub clear_on_reconnect: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            recent_count:       100,
            sparkline_width:    60,
            clear_on_reconnect: false,
        }
    }
}
