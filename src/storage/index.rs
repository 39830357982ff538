//! Reverse Value Index
//!
//! Tracks how many committed keys hold each value, so `COUNTS` does not
//! need to scan the whole store.
//!
//! The index only ever reflects the committed map. Staged writes inside an
//! open transaction never touch it; the engine adjusts the committed count
//! with the transaction overlay at query time instead.

use std::collections::HashMap;

/// Mapping from value to the number of committed keys holding it.
///
/// Entries never hold a zero count: the last decrement removes the entry.
#[derive(Debug, Default, Clone)]
pub struct ReverseIndex {
    counts: HashMap<String, usize>,
}

impl ReverseIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a key now holds `new_value`.
    ///
    /// `previous` is the value the key held in the committed map before this
    /// write, if any; its count is released first.
    pub fn record_insert_or_update(&mut self, previous: Option<&str>, new_value: &str) {
        if let Some(old) = previous {
            self.release(old);
        }
        *self.counts.entry(new_value.to_string()).or_insert(0) += 1;
    }

    /// Records that a key holding `old_value` was removed from the committed map.
    pub fn record_deletion(&mut self, old_value: &str) {
        self.release(old_value);
    }

    /// Returns how many committed keys hold `value`.
    #[inline]
    pub fn count(&self, value: &str) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Returns the number of distinct values currently indexed.
    pub fn distinct_values(&self) -> usize {
        self.counts.len()
    }

    fn release(&mut self, value: &str) {
        if let Some(count) = self.counts.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(value);
            }
        }
    }
}
