//! FIFO Queue Module
//!
//! Tracks insertion order of keys for eviction.

use std::collections::VecDeque;

// == FIFO Queue ==
/// Insertion-order queue of cache keys.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion (next eviction candidate)
/// - Back = Newest insertion
///
/// Each key appears at most once: re-inserting a key drops its earlier
/// occurrence and queues it at the back.
#[derive(Debug, Default)]
pub struct FifoQueue {
    /// Keys by insertion time
    order: VecDeque<String>,
}

impl FifoQueue {
    // == Constructor ==
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records an insertion of `key` at the back of the queue.
    pub fn push(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_back(key.to_string());
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest key.
    ///
    /// Returns None if the queue is empty.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    /// Returns the oldest key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    // == Length ==
    /// Returns the number of queued keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }
}
