//! Current-state table of the shipments a session tracks.
//!
//! The set of shipments is fixed when the store is seeded; ticks only mutate
//! records in place. Records keep the caller's input order.

use chrono::{DateTime, Utc};

use crate::random::RandomSource;
use crate::shipment::{seed_shipments, ShipmentState, ShipmentStatus};

/// Shipment statuses keyed by shipment id.
#[derive(Debug, Clone, Default)]
pub struct StatusStore {
    shipments: Vec<ShipmentStatus>,
}

impl StatusStore {
    /// Seed one record per tracking code.
    #[must_use]
    pub fn seed<S: AsRef<str>>(
        tracking_numbers: &[S],
        now: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Self {
        Self {
            shipments: seed_shipments(tracking_numbers, now, rng),
        }
    }

    /// Number of tracked shipments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shipments.len()
    }

    /// Check whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }

    /// Look up a shipment by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ShipmentStatus> {
        self.shipments.iter().find(|s| s.id == id)
    }

    /// Check whether a shipment id is tracked.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Record at a position in seeding order.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&ShipmentStatus> {
        self.shipments.get(index)
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> Option<&mut ShipmentStatus> {
        self.shipments.get_mut(index)
    }

    /// Pick one shipment uniformly, returning its position.
    ///
    /// Returns `None` without drawing when the store is empty.
    pub fn pick(&self, rng: &mut dyn RandomSource) -> Option<usize> {
        if self.shipments.is_empty() {
            None
        } else {
            Some(rng.pick_index(self.shipments.len()))
        }
    }

    /// Iterate in seeding order.
    pub fn iter(&self) -> impl Iterator<Item = &ShipmentStatus> {
        self.shipments.iter()
    }

    /// Number of shipments in the given state.
    #[must_use]
    pub fn count_in(&self, state: ShipmentState) -> usize {
        self.shipments.iter().filter(|s| s.status == state).count()
    }

    /// Copy every record, in seeding order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<ShipmentStatus> {
        self.shipments.clone()
    }
}
