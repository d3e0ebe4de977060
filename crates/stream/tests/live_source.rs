use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tview_core::{ConnectionState, IngestEvent};
use tview_history::RingHistory;
use tview_source::SourceConfig;
use tview_stream::{ConnectionLifecycle, WsConnector};

async fn next_event(rx: &mut mpsc::UnboundedReceiver<IngestEvent>) -> IngestEvent {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

async fn spawn_source() -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = SourceConfig {
        min: 0,
        max: 9,
        interval: Duration::from_millis(1),
        ..SourceConfig::default()
    };
    let server = tokio::spawn(async move {
        tview_source::serve(listener, config).await.unwrap();
    });
    (format!("ws://{addr}/ws"), server)
}

#[tokio::test]
async fn ingests_batches_from_websocket_source() {
    let (uri, server) = spawn_source().await;
    let history = Arc::new(RingHistory::new(50));
    let (mut lifecycle, mut events) =
        ConnectionLifecycle::new(Arc::new(WsConnector), Arc::clone(&history), 20);

    lifecycle.start(&uri).await.unwrap();
    assert_eq!(next_event(&mut events).await, IngestEvent::Opened);
    assert_eq!(lifecycle.state(), ConnectionState::Connected);

    for _ in 0..3 {
        assert_eq!(next_event(&mut events).await, IngestEvent::BatchReady);
    }
    lifecycle.stop().await;
    assert_eq!(lifecycle.state(), ConnectionState::Disconnected);

    let retained = history.snapshot_all();
    assert_eq!(retained.len(), 50);
    assert!(retained.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert!(retained.iter().all(|s| (0.0..=9.0).contains(&s.value)));

    // After the join nothing writes to the history any more.
    let frozen = history.len();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(history.snapshot_all(), retained);
    assert_eq!(history.len(), frozen);

    server.abort();
}

#[tokio::test]
async fn unknown_path_fails_to_connect() {
    let (uri, server) = spawn_source().await;
    let wrong = uri.replace("/ws", "/nope");
    let (mut lifecycle, mut events) =
        ConnectionLifecycle::new(Arc::new(WsConnector), Arc::new(RingHistory::new(10)), 10);

    lifecycle.start(&wrong).await.unwrap();
    assert!(matches!(next_event(&mut events).await, IngestEvent::TransportError(_)));
    assert_eq!(next_event(&mut events).await, IngestEvent::Closed);
    lifecycle.stop().await;

    server.abort();
}
