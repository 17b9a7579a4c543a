//! Feed state shared between a session's timer task and its views.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::generator::EventGenerator;
use crate::random::RandomSource;
use crate::shipment::{ShipmentState, ShipmentStatus};
use crate::store::StatusStore;
use crate::update::LiveUpdate;
use crate::update_log::UpdateLog;

/// Everything one session owns: shipments, update history and the generator.
#[derive(Debug)]
pub struct Feed {
    store: StatusStore,
    log: UpdateLog,
    generator: EventGenerator,
    connected: bool,
}

impl Feed {
    /// Seed a feed from tracking codes.
    ///
    /// ETA offsets are drawn from the same source the generator uses.
    #[must_use]
    pub fn seed<S: AsRef<str>>(
        tracking_numbers: &[S],
        log_capacity: usize,
        rng: Box<dyn RandomSource>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut generator = EventGenerator::new(rng);
        let store = StatusStore::seed(tracking_numbers, now, generator.rng());
        Self {
            store,
            log: UpdateLog::with_capacity(log_capacity),
            generator,
            connected: false,
        }
    }

    /// Apply one tick. See [`EventGenerator::tick`].
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<LiveUpdate> {
        self.generator.tick(&mut self.store, &mut self.log, now)
    }

    /// Current shipments.
    #[must_use]
    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Update history.
    #[must_use]
    pub fn log(&self) -> &UpdateLog {
        &self.log
    }

    /// Whether a timer is currently driving this feed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Copy the current state.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            shipments: self.store.to_vec(),
            updates: self.log.to_vec(),
            connected: self.connected,
            generated: self.generator.sequence(),
            taken_at: Utc::now(),
        }
    }
}

/// Cloneable, lock-guarded handle to a [`Feed`].
///
/// Every access holds the lock for its whole duration, so a reader never
/// sees a tick half-applied.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    inner: Arc<Mutex<Feed>>,
}

impl FeedHandle {
    /// Wrap a feed for sharing.
    #[must_use]
    pub fn new(feed: Feed) -> Self {
        Self {
            inner: Arc::new(Mutex::new(feed)),
        }
    }

    /// Run `f` with exclusive access to the feed.
    pub fn with<R>(&self, f: impl FnOnce(&mut Feed) -> R) -> R {
        f(&mut *self.lock())
    }

    /// Apply one tick stamped with the current time.
    pub fn tick(&self) -> Option<LiveUpdate> {
        self.lock().tick(Utc::now())
    }

    /// Copy the current state.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.lock().snapshot()
    }

    /// Retained updates newer than `sequence`, oldest first.
    #[must_use]
    pub fn updates_since(&self, sequence: u64) -> Vec<LiveUpdate> {
        self.lock().log.since(sequence)
    }

    // Poisoning only means a tick panicked; the feed is still readable.
    fn lock(&self) -> MutexGuard<'_, Feed> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Point-in-time copy of a feed, consistent across shipments and updates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Shipments in seeding order.
    pub shipments: Vec<ShipmentStatus>,
    /// Retained updates, newest first.
    pub updates: Vec<LiveUpdate>,
    /// Whether a timer was driving the feed.
    pub connected: bool,
    /// Total updates generated so far, including evicted ones.
    pub generated: u64,
    /// When the copy was taken.
    pub taken_at: DateTime<Utc>,
}

impl FeedSnapshot {
    /// Look up a shipment by id.
    #[must_use]
    pub fn shipment(&self, id: &str) -> Option<&ShipmentStatus> {
        self.shipments.iter().find(|s| s.id == id)
    }

    /// Number of shipments in the given state.
    #[must_use]
    pub fn count_in(&self, state: ShipmentState) -> usize {
        self.shipments.iter().filter(|s| s.status == state).count()
    }
}
