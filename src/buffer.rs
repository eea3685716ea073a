//! Bounded frame buffer.
//!
//! Decouples the bursty, network-bound arrival of snapshots from the
//! display-clocked consumption rate. Bounding the queue caps worst-case
//! presentation latency and memory under backlog; when full, the oldest
//! entry is evicted to admit the newest (drop-oldest, never drop-newest).
//! Eviction only removes from the head, so presentation order among
//! surviving frames is the arrival order.

use std::collections::VecDeque;

use crate::snapshot::Snapshot;

/// Default capacity: three snapshots (~100 ms of backlog at 30 fps).
pub const DEFAULT_BUFFER_CAPACITY: usize = 3;

/// Bounded FIFO of snapshots. Non-blocking both ways: `push` never waits for
/// a consumer and `pop_oldest` never waits for a producer.
pub struct FrameBuffer {
    buffer: VecDeque<Snapshot>,
    capacity: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        // A zero-capacity buffer would silently drop everything.
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append to the tail, evicting from the head while over capacity.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.buffer.push_back(snapshot);
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    /// Remove and return the oldest snapshot, or `None` when empty.
    pub fn pop_oldest(&mut self) -> Option<Snapshot> {
        self.buffer.pop_front()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
