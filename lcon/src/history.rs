//! Bounded command history with a recall cursor.

use std::collections::VecDeque;
use tracing::debug;

/// Default number of commands kept per session
pub const DEFAULT_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
    /// In `0..=entries.len()`; `entries.len()` is the live input position
    current_index: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        History {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            current_index: 0,
        }
    }

    /// Record a submitted command unless it repeats the previous one.
    /// The recall cursor goes back to the live position either way.
    pub fn submit(&mut self, cmd: &str) {
        if self.entries.back().map(String::as_str) != Some(cmd) {
            if self.entries.len() >= self.capacity
                && let Some(evicted) = self.entries.pop_front()
            {
                debug!("history full, evicting {:?}", evicted);
            }
            self.entries.push_back(cmd.to_string());
        }
        self.reset_index();
    }

    /// Move the cursor by `delta` (negative is older) and return the entry
    /// under it. At the live position the latest command is returned.
    pub fn recall(&mut self, delta: isize) -> String {
        let len = self.entries.len();
        self.current_index = self.current_index.saturating_add_signed(delta).min(len);

        let index = if self.current_index == len {
            len.checked_sub(1)
        } else {
            Some(self.current_index)
        };
        index
            .and_then(|i| self.entries.get(i))
            .cloned()
            .unwrap_or_default()
    }

    /// Older entry; used for the up arrow.
    pub fn back(&mut self) -> String {
        self.recall(-1)
    }

    /// Newer entry; used for the down arrow.
    pub fn forward(&mut self) -> String {
        self.recall(1)
    }

    pub fn reset_index(&mut self) {
        self.current_index = self.entries.len();
    }

    pub fn at_end(&self) -> bool {
        self.current_index == self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.current_index
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

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
