use parking_lot::Mutex;
use tview_core::Sample;

/// Fixed-capacity circular store of recent samples, shared between the
/// ingestion worker (sole writer) and the presenter (reader).
///
/// Once full, each append overwrites the oldest sample. Every operation holds
/// the lock for exactly one append or one snapshot copy, so readers never see
/// a half-written slot and rendering happens on the copied data lock-free.
#[derive(Debug)]
pub struct RingHistory {
    inner: Mutex<Ring>,
    capacity: usize,
}

#[derive(Debug)]
struct Ring {
    slots: Vec<Option<Sample>>,
    /// Next slot to overwrite, never the most recently written one.
    write_index: usize,
    stored: usize,
}

impl RingHistory {
    /// Create an empty history. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Ring {
                slots: vec![None; capacity],
                write_index: 0,
                stored: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently retained (`<= capacity`).
    pub fn len(&self) -> usize {
        self.inner.lock().stored
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store one reading, evicting the oldest when full. O(1).
    pub fn append(&self, value: f64, timestamp: f64) {
        let mut ring = self.inner.lock();
        let idx = ring.write_index;
        ring.slots[idx] = Some(Sample::new(timestamp, value));
        ring.write_index = (idx + 1) % self.capacity;
        ring.stored = (ring.stored + 1).min(self.capacity);
    }

    /// Every retained sample, oldest first.
    pub fn snapshot_all(&self) -> Vec<Sample> {
        let ring = self.inner.lock();
        let (newer, older) = ring.slots.split_at(ring.write_index);
        older.iter().chain(newer).flatten().copied().collect()
    }

    /// The most recent `min(n, capacity, len)` samples, oldest first.
    pub fn snapshot_recent(&self, n: usize) -> Vec<Sample> {
        let ring = self.inner.lock();
        let count = n.min(ring.stored);
        let start = (ring.write_index + self.capacity - count) % self.capacity;

        (0..count)
            .filter_map(|offset| ring.slots[(start + offset) % self.capacity])
            .collect()
    }

    /// The newest sample, if any.
    pub fn latest(&self) -> Option<Sample> {
        self.snapshot_recent(1).pop()
    }

    /// Drop every sample and rewind to the first slot.
    pub fn clear(&self) {
        let mut ring = self.inner.lock();
        ring.slots.fill(None);
        ring.write_index = 0;
        ring.stored = 0;
    }
}

impl Default for RingHistory {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CAPACITY)
    }
}
