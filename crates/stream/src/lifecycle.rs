use crate::ingestor::StreamIngestor;
use crate::transport::{Connector, Frame, FrameStream};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use tview_core::{ConnectionState, IngestEvent, Result, ViewerError};
use tview_history::RingHistory;

/// Owns the ingestion worker and drives the connection state machine:
///
/// ```text
/// Disconnected --start--> Connecting --open--> Connected
///      ^                      |                    |
///      +---- connect failed --+---- close / stop --+
/// ```
///
/// At most one worker exists at a time. `stop` cancels the worker and waits
/// for it to finish, so a following `start` never overlaps the previous
/// session's writes to the history.
pub struct ConnectionLifecycle {
    connector:  Arc<dyn Connector>,
    history:    Arc<RingHistory>,
    batch_size: usize,
    state:      Arc<watch::Sender<ConnectionState>>,
    events:     mpsc::UnboundedSender<IngestEvent>,
    worker:     Option<Worker>,
}

/// Handle to a running ingestion task.
struct Worker {
    uri:    String,
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ConnectionLifecycle {
    /// Create a lifecycle in the `Disconnected` state. The returned receiver
    /// carries every [`IngestEvent`] produced by successive workers.
    pub fn new(
        connector: Arc<dyn Connector>,
        history: Arc<RingHistory>,
        batch_size: usize,
    ) -> (Self, mpsc::UnboundedReceiver<IngestEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        let lifecycle = Self {
            connector,
            history,
            batch_size,
            state: Arc::new(state),
            events,
            worker: None,
        };
        (lifecycle, rx)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch state transitions, e.g. to drive a status indicator.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn history(&self) -> &Arc<RingHistory> {
        &self.history
    }

    /// URI served by the current worker, if one exists.
    pub fn uri(&self) -> Option<&str> {
        self.worker.as_ref().map(|w| w.uri.as_str())
    }

    /// Check `uri` the same way `start` does, without touching any state.
    pub fn validate(&self, uri: &str) -> Result<()> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(ViewerError::InvalidUri {
                uri: uri.to_string(),
                reason: "no URI given".to_string(),
            });
        }
        self.connector
            .validate(uri)
            .map_err(|reason| ViewerError::InvalidUri { uri: uri.to_string(), reason })
    }

    /// Spawn an ingestion worker for `uri`.
    ///
    /// An empty or malformed URI is rejected before anything changes. Calling
    /// this while a session is already connecting or connected does nothing.
    pub async fn start(&mut self, uri: &str) -> Result<()> {
        self.validate(uri)?;
        let uri = uri.trim();

        let state = self.state();
        if state.is_active() {
            warn!("Start ignored: stream is already {state}");
            return Ok(());
        }

        // The source closed the previous session on its own; reap the task.
        if let Some(Worker { uri, handle, .. }) = self.worker.take() {
            join(&uri, handle).await;
        }

        self.state.send_replace(ConnectionState::Connecting);

        let (cancel, cancelled) = oneshot::channel();
        let ingestor = StreamIngestor::new(
            Arc::clone(&self.history),
            self.events.clone(),
            self.batch_size,
        );
        let handle = tokio::spawn(run_session(
            uri.to_string(),
            Arc::clone(&self.connector),
            ingestor,
            Arc::clone(&self.state),
            self.events.clone(),
            cancelled,
        ));

        info!("Stream worker started for {uri}");
        self.worker = Some(Worker { uri: uri.to_string(), cancel, handle });
        Ok(())
    }

    /// Close the transport, wait for the worker to exit and settle in
    /// `Disconnected`. A no-op when no worker was ever started.
    pub async fn stop(&mut self) {
        let Some(Worker { uri, cancel, handle }) = self.worker.take() else {
            return;
        };
        // Fails only if the worker already exited, which is fine.
        let _ = cancel.send(());
        join(&uri, handle).await;
        self.state.send_replace(ConnectionState::Disconnected);
    }
}

async fn join(uri: &str, handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        error!("Stream worker for {uri} terminated abnormally: {e}");
    }
}

/// Body of the ingestion worker: connect, receive until closed or cancelled,
/// then report `Closed` exactly once.
async fn run_session(
    uri: String,
    connector: Arc<dyn Connector>,
    mut ingestor: StreamIngestor,
    state: Arc<watch::Sender<ConnectionState>>,
    events: mpsc::UnboundedSender<IngestEvent>,
    mut cancelled: oneshot::Receiver<()>,
) {
    let session = tokio::select! {
        biased;
        _ = &mut cancelled => {
            debug!("Stop requested while connecting to {uri}");
            None
        }
        result = connector.connect(&uri) => match result {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Stream connection to {uri} failed: {e}");
                let _ = events.send(IngestEvent::TransportError(e.to_string()));
                None
            }
        },
    };

    if let Some(mut session) = session {
        state.send_replace(ConnectionState::Connected);
        info!("Stream connected: {uri}");
        let _ = events.send(IngestEvent::Opened);

        let stopped = receive(&mut session.frames, &mut ingestor, &events, &mut cancelled).await;
        if stopped {
            session.close().await;
        }
    }

    state.send_replace(ConnectionState::Disconnected);
    let _ = events.send(IngestEvent::Closed);
    info!(
        accepted = ingestor.accepted(),
        rejected = ingestor.rejected(),
        "Stream closed: {uri}"
    );
}

/// Returns `true` when the session ended because a stop was requested, in
/// which case the close handshake is still ours to send.
async fn receive(
    frames: &mut FrameStream,
    ingestor: &mut StreamIngestor,
    events: &mpsc::UnboundedSender<IngestEvent>,
    cancelled: &mut oneshot::Receiver<()>,
) -> bool {
    loop {
        tokio::select! {
            biased;
            _ = &mut *cancelled => {
                debug!("Stop requested; closing transport");
                return true;
            }
            frame = frames.next() => match frame {
                Some(Ok(Frame::Text(text))) => ingestor.handle_text(&text),
                Some(Ok(Frame::Other)) => {}
                Some(Ok(Frame::Close)) | None => {
                    info!("Stream closed by source");
                    return false;
                }
                // The transport decides whether this ends the session.
                Some(Err(e)) => {
                    warn!("Stream transport error: {e}");
                    let _ = events.send(IngestEvent::TransportError(e.to_string()));
                }
            },
        }
    }
}
