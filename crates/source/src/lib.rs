//! Demo telemetry source.
//!
//! Serves a WebSocket endpoint that pushes one sawtooth reading every tick to
//! every connected client, in the same JSON shape the viewer ingests:
//! `{"timestamp": "2024-05-01T12:34:56.789", "value": 42.0}`.

pub mod sawtooth;

pub use sawtooth::{reading_at, Sawtooth};

use chrono::Local;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use tview_core::{Result, ViewerError};

/// Readings buffered per client before a slow client starts skipping.
const CLIENT_BACKLOG: usize = 1024;

#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Request path clients must connect to.
    pub path:     String,
    pub min:      i64,
    pub max:      i64,
    /// Time between two readings.
    pub interval: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path:     "/ws".to_string(),
            min:      0,
            max:      255,
            interval: Duration::from_millis(10),
        }
    }
}

/// Run the source on `listener` until the future is dropped.
pub async fn serve(listener: TcpListener, config: SourceConfig) -> Result<()> {
    if config.min > config.max {
        return Err(ViewerError::Config(format!(
            "min ({}) must not exceed max ({})",
            config.min, config.max
        )));
    }
    if config.interval.is_zero() {
        return Err(ViewerError::Config("interval must be non-zero".into()));
    }

    if let Ok(addr) = listener.local_addr() {
        info!(
            "Serving sawtooth {}..={} every {:?} on ws://{addr}{}",
            config.min, config.max, config.interval, config.path
        );
    }

    let (tx, _) = broadcast::channel(CLIENT_BACKLOG);
    let wave = Sawtooth::new(config.min, config.max);

    tokio::select! {
        _ = generate(wave, config.interval, tx.clone()) => Ok(()),
        _ = accept_loop(listener, Arc::from(config.path), tx) => Ok(()),
    }
}

async fn generate(mut wave: Sawtooth, interval: Duration, tx: broadcast::Sender<String>) {
    let mut ticker = time::interval(interval);
    loop {
        ticker.tick().await;
        let reading = reading_at(&Local::now(), wave.next_value());
        match serde_json::to_string(&reading) {
            // No subscribers is normal between clients.
            Ok(text) => { let _ = tx.send(text); }
            Err(e)   => warn!("Cannot encode reading: {e}"),
        }
    }
}

async fn accept_loop(listener: TcpListener, path: Arc<str>, tx: broadcast::Sender<String>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(serve_client(stream, peer, Arc::clone(&path), tx.subscribe()));
            }
            Err(e) => warn!("Accept failed: {e}"),
        }
    }
}

async fn serve_client(
    stream: TcpStream,
    peer: SocketAddr,
    path: Arc<str>,
    mut readings: broadcast::Receiver<String>,
) {
    let check_path = |req: &Request, resp: Response| -> std::result::Result<Response, ErrorResponse> {
        if req.uri().path() == &*path {
            return Ok(resp);
        }
        let mut err = ErrorResponse::new(Some(format!("no stream at {}", req.uri().path())));
        *err.status_mut() = StatusCode::NOT_FOUND;
        Err(err)
    };

    let ws = match accept_hdr_async(stream, check_path).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("Handshake with {peer} failed: {e}");
            return;
        }
    };
    info!("Client connected: {peer}");

    let (mut outbound, mut inbound) = ws.split();
    loop {
        tokio::select! {
            reading = readings.recv() => match reading {
                Ok(text) => {
                    if let Err(e) = outbound.send(Message::Text(text)).await {
                        debug!("Send to {peer} failed: {e}");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Client {peer} is lagging; skipped {skipped} readings");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = inbound.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    info!("Client disconnected: {peer}");
}
