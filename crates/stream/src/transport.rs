use futures::future::{self, BoxFuture};
use futures::stream::BoxStream;
use futures::{FutureExt, SinkExt, StreamExt};
use std::time::Duration;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::connect_async;
use tracing::debug;
use tview_core::TransportError;

/// How long a local close may take to flush before the socket is dropped.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// One inbound unit from the transport, reduced to what the ingestor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A UTF-8 text frame carrying one JSON reading.
    Text(String),
    /// The source asked to end the session.
    Close,
    /// Binary, ping, pong and other control frames; ignored.
    Other,
}

/// Inbound frames of one session. The stream ending means the transport is
/// closed.
pub type FrameStream = BoxStream<'static, Result<Frame, TransportError>>;

/// One open connection: its inbound frames plus the handshake that ends it
/// from our side.
pub struct Session {
    pub frames: FrameStream,
    close:      BoxFuture<'static, ()>,
}

impl Session {
    /// A session with nothing to send on close.
    pub fn new(frames: FrameStream) -> Self {
        Self::with_close(frames, future::ready(()).boxed())
    }

    /// `close` runs only when the session is ended locally by [`Session::close`].
    pub fn with_close(frames: FrameStream, close: BoxFuture<'static, ()>) -> Self {
        Self { frames, close }
    }

    /// Drop the inbound half and run the close handshake.
    pub async fn close(self) {
        let Self { frames, close } = self;
        drop(frames);
        close.await;
    }
}

/// Opens streaming sessions for the ingestion worker.
///
/// [`WsConnector`] is the production implementation; tests plug in scripted
/// in-memory sessions.
pub trait Connector: Send + Sync + 'static {
    /// Synchronous URI check performed before any state change.
    fn validate(&self, _uri: &str) -> Result<(), String> {
        Ok(())
    }

    /// Connect to `uri` and return the open session.
    fn connect(&self, uri: &str) -> BoxFuture<'static, Result<Session, TransportError>>;
}

/// WebSocket transport over `tokio-tungstenite` (`ws://` and `wss://`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn validate(&self, uri: &str) -> Result<(), String> {
        let request = uri.into_client_request().map_err(|e| e.to_string())?;
        match request.uri().scheme_str() {
            Some("ws" | "wss") => Ok(()),
            Some(other) => Err(format!("unsupported scheme '{other}', expected ws or wss")),
            None => Err("missing scheme, expected ws:// or wss://".to_string()),
        }
    }

    fn connect(&self, uri: &str) -> BoxFuture<'static, Result<Session, TransportError>> {
        let uri = uri.to_string();
        async move {
            let (ws, _response) = connect_async(uri.as_str())
                .await
                .map_err(|e| TransportError::Connect(e.to_string()))?;
            let (mut sink, stream) = ws.split();

            // tungstenite cannot resume after a read error, so the stream ends
            // right after reporting it.
            let frames = stream
                .scan(false, |failed, msg| {
                    if *failed {
                        return future::ready(None);
                    }
                    let frame = match msg {
                        Ok(Message::Text(text)) => Ok(Frame::Text(text)),
                        Ok(Message::Close(_))   => Ok(Frame::Close),
                        Ok(_)                   => Ok(Frame::Other),
                        Err(e) => {
                            *failed = true;
                            Err(TransportError::Receive(e.to_string()))
                        }
                    };
                    future::ready(Some(frame))
                })
                .boxed();

            // Sends a Close frame and flushes it; the peer's reply is not awaited.
            let close = async move {
                match tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await {
                    Ok(Ok(())) => debug!("WebSocket close sent"),
                    Ok(Err(e)) => debug!("WebSocket close failed: {e}"),
                    Err(_) => debug!("WebSocket close timed out"),
                }
            }
            .boxed();

            Ok(Session::with_close(frames, close))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_uris_are_accepted() {
        assert!(WsConnector.validate("ws://localhost:8765/ws").is_ok());
        assert!(WsConnector.validate("wss://telemetry.example.com/feed").is_ok());
    }

    #[test]
    fn other_schemes_are_rejected() {
        let err = WsConnector.validate("http://localhost:8765/ws").unwrap_err();
        assert!(err.contains("unsupported scheme"));
    }

    #[test]
    fn garbage_uri_is_rejected() {
        assert!(WsConnector.validate("not a uri").is_err());
    }

    #[tokio::test]
    async fn refused_connection_reports_connect_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = WsConnector.connect(&format!("ws://{addr}/ws")).await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }

    #[tokio::test]
    async fn local_close_sends_close_frame() {
        use tokio_tungstenite::accept_async;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            ws.next().await
        });

        let session = WsConnector.connect(&format!("ws://{addr}/ws")).await.unwrap();
        session.close().await;

        let received = server.await.unwrap();
        assert!(matches!(received, Some(Ok(Message::Close(_)))));
    }
}
