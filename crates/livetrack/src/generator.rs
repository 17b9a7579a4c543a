//! Synthetic update generation.
//!
//! Each tick picks one tracked shipment, synthesizes an update for it, moves
//! the shipment along and prepends the update to the log. Random draws happen
//! in a fixed order (shipment, kind, city, status, message, latitude,
//! longitude, progress delta, new location) so a scripted source reproduces
//! exact sequences.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::random::RandomSource;
use crate::shipment::{ShipmentState, ShipmentStatus};
use crate::store::StatusStore;
use crate::update::{LiveUpdate, UpdateKind};
use crate::update_log::UpdateLog;

/// Cities location messages can mention.
pub const EVENT_CITIES: [&str; 10] = [
    "New York",
    "Boston",
    "Philadelphia",
    "Chicago",
    "Los Angeles",
    "San Francisco",
    "Houston",
    "Miami",
    "Seattle",
    "Denver",
];

/// Locations a shipment can be moved to by a tick.
pub const TRANSIT_LOCATIONS: [&str; 4] = ["New York", "Boston", "Chicago", "Los Angeles"];

/// Upper bound (exclusive) of the per-tick progress increase.
pub const MAX_PROGRESS_STEP: f64 = 10.0;

const STATUS_MESSAGES: [&str; 4] = [
    "Out for delivery",
    "In transit to next facility",
    "Awaiting pickup from sender",
    "Clearance completed",
];

const DELIVERY_MESSAGES: [&str; 3] = [
    "Package delivered successfully",
    "Delivery attempted, no one home",
    "Scheduled for delivery tomorrow",
];

const ALERT_MESSAGES: [&str; 3] = [
    "Weather delay reported",
    "High-value package flagged for security",
    "Delivery address needs verification",
];

/// Number of message templates for a kind.
#[must_use]
pub const fn template_count(kind: UpdateKind) -> usize {
    match kind {
        UpdateKind::Location => 3,
        UpdateKind::Status => STATUS_MESSAGES.len(),
        UpdateKind::Delivery => DELIVERY_MESSAGES.len(),
        UpdateKind::Alert => ALERT_MESSAGES.len(),
    }
}

/// Render template `index` of `kind`, interpolating `city` where needed.
///
/// # Panics
///
/// Panics if `index >= template_count(kind)`.
#[must_use]
pub fn render_message(kind: UpdateKind, index: usize, city: &str) -> String {
    match kind {
        UpdateKind::Location => match index {
            0 => format!("Package scanned at {city} sorting facility"),
            1 => format!("Delivery vehicle picked up package in {city}"),
            _ => format!("Package arrived at local distribution center in {city}"),
        },
        UpdateKind::Status => STATUS_MESSAGES[index].to_string(),
        UpdateKind::Delivery => DELIVERY_MESSAGES[index].to_string(),
        UpdateKind::Alert => ALERT_MESSAGES[index].to_string(),
    }
}

/// Produces update events and applies their side effects.
#[derive(Debug)]
pub struct EventGenerator {
    rng: Box<dyn RandomSource>,
    sequence: u64,
}

impl EventGenerator {
    /// Create a generator drawing from `rng`.
    #[must_use]
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self { rng, sequence: 0 }
    }

    /// Sequence number of the last generated update (0 before the first).
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Borrow the random source, e.g. to seed a store from the same stream.
    pub fn rng(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }

    /// Synthesize one update for `shipment` without touching any state
    /// besides the sequence counter.
    pub fn synthesize(&mut self, shipment: &ShipmentStatus, now: DateTime<Utc>) -> LiveUpdate {
        let kind = UpdateKind::ALL[self.rng.pick_index(UpdateKind::ALL.len())];
        let city = EVENT_CITIES[self.rng.pick_index(EVENT_CITIES.len())];
        let status = ShipmentState::ALL[self.rng.pick_index(ShipmentState::ALL.len())];
        let template = self.rng.pick_index(template_count(kind));
        let message = render_message(kind, template, city);
        let latitude = self.rng.in_range(-90.0, 90.0);
        let longitude = self.rng.in_range(-180.0, 180.0);

        self.sequence += 1;
        LiveUpdate {
            id: LiveUpdate::id_for(self.sequence),
            sequence: self.sequence,
            shipment_id: shipment.id.clone(),
            tracking_number: shipment.tracking_number.clone(),
            timestamp: now,
            kind,
            title: kind.title().to_string(),
            message,
            latitude: Some(latitude),
            longitude: Some(longitude),
            status: Some(status),
            severity: Some(kind.severity()),
        }
    }

    /// Advance a shipment: progress grows by `[0, 10)`, location is redrawn
    /// and the update time refreshed. The status field is left alone.
    pub fn advance(&mut self, shipment: &mut ShipmentStatus, now: DateTime<Utc>) {
        let delta = self.rng.in_range(0.0, MAX_PROGRESS_STEP);
        let location = TRANSIT_LOCATIONS[self.rng.pick_index(TRANSIT_LOCATIONS.len())];
        trace!(
            shipment = %shipment.id,
            delta,
            location,
            "Advancing shipment"
        );
        shipment.advance(delta, location, now);
    }

    /// Run one tick against a store and log.
    ///
    /// Returns the emitted update, or `None` when the store is empty.
    pub fn tick(
        &mut self,
        store: &mut StatusStore,
        log: &mut UpdateLog,
        now: DateTime<Utc>,
    ) -> Option<LiveUpdate> {
        let index = store.pick(self.rng.as_mut())?;
        let shipment = store.at_mut(index)?;

        let update = self.synthesize(shipment, now);
        self.advance(shipment, now);

        debug!(
            id = %update.id,
            shipment = %update.shipment_id,
            kind = %update.kind,
            progress = shipment.progress,
            "Generated update"
        );

        if let Some(evicted) = log.push(update.clone()) {
            trace!(id = %evicted.id, "Evicted oldest update");
        }
        Some(update)
    }
}
