//! Streaming side of the viewer: decodes inbound readings, feeds the shared
//! [`RingHistory`](tview_history::RingHistory) and owns the ingestion worker's
//! connect/disconnect lifecycle.

pub mod decode;
pub mod ingestor;
pub mod lifecycle;
pub mod transport;

pub use decode::{decode, parse_timestamp};
pub use ingestor::{StreamIngestor, DEFAULT_BATCH_SIZE};
pub use lifecycle::ConnectionLifecycle;
pub use transport::{Connector, Frame, FrameStream, Session, WsConnector};
