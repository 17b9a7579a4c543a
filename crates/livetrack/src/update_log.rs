//! Bounded, newest-first history of emitted updates.
//!
//! The log keeps at most `capacity` entries. New updates go to the front;
//! once full, every push evicts the oldest entry from the back. Entries are
//! never edited in place.

use std::collections::VecDeque;

use crate::update::LiveUpdate;

/// Number of updates the live feed keeps.
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Newest-first log of update events.
#[derive(Debug, Clone)]
pub struct UpdateLog {
    entries: VecDeque<LiveUpdate>,
    capacity: usize,
}

impl UpdateLog {
    /// Create an empty log holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend an update, returning the entry evicted to stay within capacity.
    pub fn push(&mut self, update: LiveUpdate) -> Option<LiveUpdate> {
        self.entries.push_front(update);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Maximum number of entries retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the log holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent update.
    #[must_use]
    pub fn latest(&self) -> Option<&LiveUpdate> {
        self.entries.front()
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LiveUpdate> {
        self.entries.iter()
    }

    /// The `limit` most recent updates, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<LiveUpdate> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// All retained updates referring to one shipment, newest first.
    #[must_use]
    pub fn for_shipment(&self, shipment_id: &str) -> Vec<LiveUpdate> {
        self.entries
            .iter()
            .filter(|u| u.is_for(shipment_id))
            .cloned()
            .collect()
    }

    /// Updates generated after `sequence`, oldest first.
    ///
    /// Used by followers that poll the log and print what is new.
    #[must_use]
    pub fn since(&self, sequence: u64) -> Vec<LiveUpdate> {
        self.entries
            .iter()
            .rev()
            .filter(|u| u.sequence > sequence)
            .cloned()
            .collect()
    }

    /// Copy the whole log, newest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<LiveUpdate> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for UpdateLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}
