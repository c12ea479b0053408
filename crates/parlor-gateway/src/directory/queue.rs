use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use parlor_core::protocol::envelope::Envelope;

use crate::directory::connection::ConnectionHandle;

/// One user awaiting pairing.
#[derive(Clone)]
pub struct Waiting {
    pub conn: Arc<dyn ConnectionHandle>,
    pub profile: Envelope,
}

/// FIFO of users waiting to be paired.
///
/// Holds no pairing or table-assignment logic; callers decide what to do
/// with dequeued entries. Payloads are not validated here, a bad user id
/// surfaces later as a login-registry no-op.
pub struct MatchQueue {
    inner: Mutex<VecDeque<Waiting>>,
    capacity: Option<usize>,
}

impl MatchQueue {
    /// Unbounded queue.
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// `Some(n)` bounds the queue; `enqueue` then refuses when full.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Waiting>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append at the tail. No duplicate detection. Returns false only when
    /// a capacity is configured and the queue is full.
    pub fn enqueue(&self, waiting: Waiting) -> bool {
        let mut q = self.lock();
        if let Some(cap) = self.capacity {
            if q.len() >= cap {
                return false;
            }
        }
        q.push_back(waiting);
        true
    }

    /// Pop the longest-waiting entry, `None` when empty.
    pub fn dequeue(&self) -> Option<Waiting> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for MatchQueue {
    fn default() -> Self {
        Self::new()
    }
}
