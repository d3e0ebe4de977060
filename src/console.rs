//! Line-oriented presenter: reads commands from stdin, reacts to ingestion
//! events and prints what the history snapshots contain.

use crate::render;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tview_config::ViewerConfig;
use tview_core::{IngestEvent, Result};
use tview_history::RingHistory;
use tview_stream::{ConnectionLifecycle, WsConnector};

const HELP: &str = "\
commands:
  start [URI]   connect (default URI from config)
  stop          disconnect and wait for the worker to exit
  toggle        start when disconnected, stop otherwise
  last [N]      list the N most recent readings
  latest        show the newest reading
  clear         drop all stored readings
  status        connection state and buffer fill
  help          this text
  quit          stop and exit";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(Option<String>),
    Stop,
    Toggle,
    Last(Option<usize>),
    Latest,
    Clear,
    Status,
    Help,
    Quit,
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments for '{verb}'"));
        }

        let command = match (verb, arg) {
            ("start", uri) => Self::Start(uri.map(str::to_string)),
            ("last", None) => Self::Last(None),
            ("last", Some(n)) => {
                let n = n.parse().map_err(|_| format!("'{n}' is not a count"))?;
                Self::Last(Some(n))
            }
            ("stop", None)   => Self::Stop,
            ("toggle", None) => Self::Toggle,
            ("latest", None) => Self::Latest,
            ("clear", None)  => Self::Clear,
            ("status", None) => Self::Status,
            ("help", None)   => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            (_, Some(_)) if is_known(verb) => return Err(format!("'{verb}' takes no argument")),
            _ => return Err(format!("unknown command '{verb}' (try 'help')")),
        };
        Ok(Some(command))
    }
}

fn is_known(verb: &str) -> bool {
    matches!(
        verb,
        "stop" | "toggle" | "latest" | "clear" | "status" | "help" | "quit" | "exit"
    )
}

pub struct Console {
    lifecycle: ConnectionLifecycle,
    events:    mpsc::UnboundedReceiver<IngestEvent>,
    history:   Arc<RingHistory>,
    config:    ViewerConfig,
}

impl Console {
    pub fn new(config: ViewerConfig) -> Self {
        let history = Arc::new(RingHistory::new(config.history.capacity));
        let (lifecycle, events) = ConnectionLifecycle::new(
            Arc::new(WsConnector),
            Arc::clone(&history),
            config.ingest.batch_size,
        );
        Self { lifecycle, events, history, config }
    }

    /// Serve commands from stdin until `quit`, end of input or Ctrl-C, then
    /// stop the worker before returning.
    pub async fn run(self, autostart: Option<String>) -> Result<()> {
        self.serve(autostart, BufReader::new(tokio::io::stdin())).await
    }

    async fn serve<R>(mut self, autostart: Option<String>, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        println!("{HELP}");
        if let Some(uri) = autostart {
            self.start(Some(uri)).await;
        }

        let mut lines = input.lines();
        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if !self.dispatch(&line).await {
                            break;
                        }
                    }
                    Ok(None) => break,
                    // The offending line is consumed; keep reading.
                    Err(e) if e.kind() == ErrorKind::InvalidData => {
                        warn!("Ignoring unreadable input line: {e}");
                        println!("unreadable input ignored");
                    }
                    Err(e) => {
                        warn!("Stdin failed, shutting down: {e}");
                        break;
                    }
                },
                Some(event) = self.events.recv() => self.on_event(event),
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        self.lifecycle.stop().await;
        info!("tview exiting");
        Ok(())
    }

    /// Returns `false` when the console should exit.
    async fn dispatch(&mut self, line: &str) -> bool {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(e) => {
                println!("{e}");
                return true;
            }
        };

        match command {
            Command::Start(uri) => self.start(uri).await,
            Command::Stop => self.lifecycle.stop().await,
            Command::Toggle => {
                if self.lifecycle.state().is_active() {
                    self.lifecycle.stop().await;
                } else {
                    self.start(None).await;
                }
            }
            Command::Last(n) => {
                let n = n.unwrap_or(self.config.presenter.recent_count);
                let rows = render::list(&self.history.snapshot_recent(n));
                println!("Last {} readings:", rows.len());
                for row in rows {
                    println!("  {row}");
                }
            }
            Command::Latest => println!("{}", render::latest(self.history.latest())),
            Command::Clear => {
                self.history.clear();
                println!("History cleared.");
            }
            Command::Status => println!(
                "{}",
                render::status(
                    self.lifecycle.state(),
                    self.history.len(),
                    self.history.capacity(),
                    self.lifecycle.uri(),
                )
            ),
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }
        true
    }

    async fn start(&mut self, uri: Option<String>) {
        let state = self.lifecycle.state();
        if state.is_active() {
            println!("Already {state}; 'stop' first.");
            return;
        }

        let uri = uri.unwrap_or_else(|| self.config.connection.uri.clone());
        if let Err(e) = self.lifecycle.validate(&uri) {
            println!("{e}");
            return;
        }
        if self.config.presenter.clear_on_reconnect {
            self.history.clear();
        }
        if let Err(e) = self.lifecycle.start(&uri).await {
            println!("{e}");
        }
    }

    fn on_event(&mut self, event: IngestEvent) {
        match event {
            IngestEvent::Opened => println!("✔ Connected"),
            IngestEvent::Closed => println!("✖ Disconnected"),
            IngestEvent::TransportError(e) => println!("! Transport error: {e}"),
            IngestEvent::BatchReady => {
                let snapshot = self.history.snapshot_all();
                println!("{}", render::plot(&snapshot, self.config.presenter.sparkline_width));
            }
        }
    }
}
