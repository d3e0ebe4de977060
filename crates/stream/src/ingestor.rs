use crate::decode::decode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;
use tview_core::{DecodeError, IngestEvent, Sample};
use tview_history::RingHistory;

/// Accepted samples between two batch-ready signals unless configured.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Turns raw text frames into samples, appends them to the shared history and
/// emits [`IngestEvent::BatchReady`] every `batch_size` accepted samples.
///
/// One ingestor lives exactly as long as one connection; its counters are
/// never carried over to the next session.
#[derive(Debug)]
pub struct StreamIngestor {
    history:    Arc<RingHistory>,
    events:     mpsc::UnboundedSender<IngestEvent>,
    batch_size: usize,
    pending:    usize,
    accepted:   u64,
    rejected:   u64,
}

impl StreamIngestor {
    pub fn new(
        history: Arc<RingHistory>,
        events: mpsc::UnboundedSender<IngestEvent>,
        batch_size: usize,
    ) -> Self {
        Self {
            history,
            events,
            batch_size: batch_size.max(1),
            pending: 0,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Decode and store one message. A decode failure leaves the history and
    /// the batch counter untouched.
    pub fn ingest(&mut self, text: &str) -> Result<Sample, DecodeError> {
        let sample = decode(text)?;
        self.history.append(sample.value, sample.timestamp);
        self.accepted += 1;
        self.pending += 1;

        if self.pending == self.batch_size {
            self.pending = 0;
            // Presenter gone means nobody is rendering; keep ingesting anyway.
            let _ = self.events.send(IngestEvent::BatchReady);
        }
        Ok(sample)
    }

    /// Like [`ingest`](Self::ingest), but logs and discards bad messages.
    pub fn handle_text(&mut self, text: &str) {
        if let Err(e) = self.ingest(text) {
            self.rejected += 1;
            warn!("Discarding message: {e} (raw: {text:?})");
        }
    }

    /// Samples accepted since the last batch-ready signal.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(i: usize) -> String {
        format!(r#"{{"timestamp":"2024-05-01T12:00:{:02}Z","value":{i}}}"#, i % 60)
    }

    fn ingestor(
        capacity: usize,
        batch_size: usize,
    ) -> (StreamIngestor, Arc<RingHistory>, mpsc::UnboundedReceiver<IngestEvent>) {
        let history = Arc::new(RingHistory::new(capacity));
        let (tx, rx) = mpsc::unbounded_channel();
        (StreamIngestor::new(Arc::clone(&history), tx, batch_size), history, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<IngestEvent>) -> Vec<IngestEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn batch_signal_fires_every_hundred_samples() {
        let (mut ingestor, history, mut rx) = ingestor(1000, DEFAULT_BATCH_SIZE);
        for i in 0..250 {
            ingestor.handle_text(&reading(i));
        }

        assert_eq!(drain(&mut rx), vec![IngestEvent::BatchReady, IngestEvent::BatchReady]);
        assert_eq!(ingestor.pending(), 50);
        assert_eq!(history.len(), 250);
    }

    #[test]
    fn malformed_message_between_valid_ones_is_skipped() {
        let (mut ingestor, history, mut rx) = ingestor(10, 2);
        ingestor.handle_text(&reading(1));
        ingestor.handle_text(r#"{"timestamp": 17, "value": "#);
        ingestor.handle_text(&reading(2));

        let values: Vec<f64> = history.snapshot_all().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
        assert_eq!(ingestor.accepted(), 2);
        assert_eq!(ingestor.rejected(), 1);
        // The bad frame neither counts toward nor resets the batch.
        assert_eq!(drain(&mut rx), vec![IngestEvent::BatchReady]);
        assert_eq!(ingestor.pending(), 0);
    }

    #[test]
    fn ingest_reports_decoded_sample() {
        let (mut ingestor, history, _rx) = ingestor(4, 100);
        let sample = ingestor.ingest(&reading(7)).unwrap();
        assert_eq!(sample.value, 7.0);
        assert_eq!(history.latest(), Some(sample));
    }

    #[test]
    fn dropped_presenter_does_not_stop_ingestion() {
        let (mut ingestor, history, rx) = ingestor(8, 1);
        drop(rx);
        ingestor.handle_text(&reading(0));
        ingestor.handle_text(&reading(1));
        assert_eq!(history.len(), 2);
    }
}
