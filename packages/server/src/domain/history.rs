//! Bounded, ordered store of recent content messages.

use std::collections::VecDeque;

use super::event::ContentMessage;

/// Number of messages kept when no capacity is configured
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// FIFO window over the most recent content messages.
///
/// Holds at most `capacity` entries in insertion order. Appending past the
/// capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<ContentMessage>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` messages
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a message, returning the evicted oldest entry if the buffer was full
    pub fn append(&mut self, message: ContentMessage) -> Option<ContentMessage> {
        self.entries.push_back(message);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<ContentMessage> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
