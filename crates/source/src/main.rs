//! tview-source — demo WebSocket telemetry source for `tview`.
//!
//! Run with:  `RUST_LOG=info tview-source --bind 127.0.0.1:8765`

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tview_source::SourceConfig;

#[derive(Debug, Parser)]
#[command(version, about = "Stream a sawtooth telemetry signal over WebSocket")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8765")]
    bind: String,
    /// Request path clients connect to.
    #[arg(long, default_value = "/ws")]
    path: String,
    /// Lowest emitted value.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    min: i64,
    /// Highest emitted value.
    #[arg(long, default_value_t = 255, allow_negative_numbers = true)]
    max: i64,
    /// Milliseconds between readings.
    #[arg(long, default_value_t = 10)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let listener = TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("cannot listen on {}", args.bind))?;

    let config = SourceConfig {
        path:     args.path,
        min:      args.min,
        max:      args.max,
        interval: Duration::from_millis(args.interval_ms),
    };

    tokio::select! {
        result = tview_source::serve(listener, config) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
    }
    Ok(())
}
