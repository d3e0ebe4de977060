/// Notifications flowing from the ingestion worker to the controlling task.
///
/// Sources:
/// - Transport open / close → `Opened`, `Closed`
/// - Transport read or connect failure → `TransportError`
/// - Stream ingestor batch counter → `BatchReady`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestEvent {
    /// The transport handshake completed; samples may start arriving.
    Opened,
    /// The session ended, either because the source closed it or `stop` was
    /// requested. Fired exactly once per worker.
    Closed,
    /// A network-level failure. The session stays up until the transport
    /// itself reports closure.
    TransportError(String),
    /// Another batch of samples has been appended; pull `snapshot_all()` and
    /// redraw. Carries no payload.
    BatchReady,
}
