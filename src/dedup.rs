//! Fixed-capacity history of recently accepted keys.

use std::collections::VecDeque;

/// Insertion-ordered window over the last `capacity` accepted keys.
///
/// Checking membership never inserts, so a suppressed repeat does not keep
/// itself alive in the window.
#[derive(Debug, Clone)]
pub struct RecentWindow {
    keys: VecDeque<String>,
    capacity: usize,
}

impl RecentWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Record an accepted key, evicting the oldest one when full.
    pub fn insert(&mut self, key: String) {
        if self.capacity == 0 {
            return;
        }
        if self.keys.len() == self.capacity {
            self.keys.pop_front();
        }
        self.keys.push_back(key);
    }

    /// Insert `key` unless it is already in the window.
    ///
    /// Returns `true` when the key was new.
    pub fn admit(&mut self, key: &str) -> bool {
        if self.contains(key) {
            return false;
        }
        self.insert(key.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
