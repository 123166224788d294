//! FIFO task queue
//!
//! Producers push from any thread; a single consumer pops. Once closed, the
//! queue refuses new items but still hands out everything already queued,
//! so a consumer draining until `pop` returns `None` loses nothing.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

struct QueueInner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Unbounded multi-producer, single-consumer FIFO.
pub struct TaskQueue<T> {
    inner: Mutex<QueueInner<T>>,
    available: Condvar,
}

impl<T> TaskQueue<T> {
    /// Create an open, empty queue
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append an item.
    ///
    /// Returns the item back if the queue has been closed.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(item);
        }
        inner.items.push_back(item);
        drop(inner);
        self.available.notify_one();
        Ok(())
    }

    /// Take the oldest item, blocking while the queue is open and empty.
    ///
    /// Returns `None` once the queue is closed and fully drained.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            self.available.wait(&mut inner);
        }
    }

    /// Take the oldest item without blocking
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().items.pop_front()
    }

    /// Refuse further pushes and wake the consumer
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.available.notify_all();
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Whether no items are queued
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
