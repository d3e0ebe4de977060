//! tview — live telemetry viewer for a WebSocket stream of timestamped readings.
//!
//! Run with:  `RUST_LOG=info tview ws://localhost:8765/ws`

mod console;
mod render;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Live telemetry viewer")]
struct Args {
    /// Stream URI; when given, the viewer connects immediately.
    uri: Option<String>,
    /// Config file (default: $XDG_CONFIG_HOME/tview/tview.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging on stderr so it never interleaves with the console
    // view on stdout. RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("tview v{} starting", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let path = args.config.unwrap_or_else(tview_config::default_path);
    let config = tview_config::load(&path)?;

    console::Console::new(config).run(args.uri).await?;
    Ok(())
}
