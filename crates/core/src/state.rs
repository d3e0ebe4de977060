use std::fmt;

/// Connection status as seen by the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// `true` while a worker is (or is about to be) attached to a transport.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting   => "connecting",
            Self::Connected    => "connected",
        };
        f.write_str(label)
    }
}
