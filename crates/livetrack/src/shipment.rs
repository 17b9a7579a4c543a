//! Tracked shipment records and their initial seeding.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Locations assigned at seeding time, cycled by index.
pub const SEED_LOCATIONS: [&str; 3] = ["New York", "Los Angeles", "Chicago"];

/// Statuses assigned at seeding time, cycled by index.
pub const SEED_STATES: [ShipmentState; 3] = [
    ShipmentState::Pending,
    ShipmentState::InTransit,
    ShipmentState::Delivered,
];

/// Progress values assigned at seeding time, cycled by index.
pub const SEED_PROGRESS: [f64; 3] = [0.0, 50.0, 100.0];

/// Checkpoint every seeded shipment is heading to.
pub const SEED_CHECKPOINT: &str = "Distribution Center";

/// Upper bound of the random ETA offset, in milliseconds (24 hours).
const MAX_ETA_OFFSET_MS: f64 = 86_400_000.0;

/// Maximum completion percentage.
pub const MAX_PROGRESS: f64 = 100.0;

/// Delivery state of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShipmentState {
    /// Not yet picked up.
    Pending,
    /// On its way.
    InTransit,
    /// Handed to the recipient.
    Delivered,
}

impl ShipmentState {
    /// All states in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InTransit, Self::Delivered];
}

impl std::fmt::Display for ShipmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InTransit => write!(f, "in-transit"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

/// Current state of one tracked shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentStatus {
    /// Stable identifier (`shipment-{index}`).
    pub id: String,

    /// Tracking code supplied by the caller.
    pub tracking_number: String,

    /// Last known location (free text).
    pub current_location: String,

    /// Delivery state.
    pub status: ShipmentState,

    /// Completion percentage in `[0, 100]`.
    pub progress: f64,

    /// When this record last changed.
    pub last_update: DateTime<Utc>,

    /// Next checkpoint on the route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_checkpoint: Option<String>,

    /// Estimated arrival.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<DateTime<Utc>>,

    /// Assigned driver label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,

    /// Assigned vehicle label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
}

impl ShipmentStatus {
    /// Build the seeded record for position `index` in the caller's list.
    ///
    /// Only the ETA offset is drawn from `rng`.
    #[must_use]
    pub fn seeded(
        index: usize,
        tracking_number: impl Into<String>,
        now: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let slot = index % 3;
        Self {
            id: shipment_id(index),
            tracking_number: tracking_number.into(),
            current_location: SEED_LOCATIONS[slot].to_string(),
            status: SEED_STATES[slot],
            progress: SEED_PROGRESS[slot],
            last_update: now,
            next_checkpoint: Some(SEED_CHECKPOINT.to_string()),
            eta: Some(now + eta_offset(rng)),
            driver: Some(format!("Driver {}", index + 1)),
            vehicle: Some(format!("TR-{:03}", index + 1)),
        }
    }

    /// Move the shipment along: add `delta` to progress (clamped to 100),
    /// relocate it and stamp the update time.
    ///
    /// Negative deltas are ignored so progress never goes backwards.
    pub fn advance(&mut self, delta: f64, location: impl Into<String>, at: DateTime<Utc>) {
        self.progress = (self.progress + delta.max(0.0)).min(MAX_PROGRESS);
        self.current_location = location.into();
        self.last_update = at;
    }

    /// Progress rounded to a whole percentage for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress_percent(&self) -> u8 {
        self.progress.round().clamp(0.0, MAX_PROGRESS) as u8
    }
}

/// Identifier for the shipment seeded at `index`.
#[must_use]
pub fn shipment_id(index: usize) -> String {
    format!("shipment-{index}")
}

/// Seed one record per tracking code, in input order.
///
/// Not idempotent: timestamps and ETAs differ between calls, so a session
/// seeds exactly once.
#[must_use]
pub fn seed_shipments<S: AsRef<str>>(
    tracking_numbers: &[S],
    now: DateTime<Utc>,
    rng: &mut dyn RandomSource,
) -> Vec<ShipmentStatus> {
    tracking_numbers
        .iter()
        .enumerate()
        .map(|(index, code)| ShipmentStatus::seeded(index, code.as_ref(), now, rng))
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn eta_offset(rng: &mut dyn RandomSource) -> Duration {
    Duration::milliseconds(rng.in_range(0.0, MAX_ETA_OFFSET_MS) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn test_state_display() {
        assert_eq!(ShipmentState::Pending.to_string(), "pending");
        assert_eq!(ShipmentState::InTransit.to_string(), "in-transit");
        assert_eq!(ShipmentState::Delivered.to_string(), "delivered");
    }

    #[test]
    fn test_state_serializes_kebab_case() {
        let json = serde_json::to_string(&ShipmentState::InTransit).unwrap();
        assert_eq!(json, "\"in-transit\"");
    }

    #[test]
    fn test_seed_cycles_by_index() {
        let now = Utc::now();
        let mut rng = ScriptedRandom::new([0.5]);
        let codes = ["A", "B", "C", "D", "E"];
        let shipments = seed_shipments(&codes, now, &mut rng);

        assert_eq!(shipments.len(), 5);
        for (i, s) in shipments.iter().enumerate() {
            assert_eq!(s.id, format!("shipment-{i}"));
            assert_eq!(s.tracking_number, codes[i]);
            assert_eq!(s.status, SEED_STATES[i % 3]);
            assert_eq!(s.current_location, SEED_LOCATIONS[i % 3]);
            assert!((s.progress - SEED_PROGRESS[i % 3]).abs() < f64::EPSILON);
            assert_eq!(s.last_update, now);
        }
    }

    #[test]
    fn test_seed_index_one_is_in_transit() {
        let mut rng = ScriptedRandom::new([0.0]);
        let shipments = seed_shipments(&["A", "B", "C"], Utc::now(), &mut rng);
        assert_eq!(shipments[1].status, ShipmentState::InTransit);
        assert!((shipments[1].progress - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_seed_labels() {
        let mut rng = ScriptedRandom::new([0.0]);
        let codes: Vec<String> = (0..12).map(|i| format!("SHP-{i}")).collect();
        let shipments = seed_shipments(&codes, Utc::now(), &mut rng);
        assert_eq!(shipments[0].driver.as_deref(), Some("Driver 1"));
        assert_eq!(shipments[0].vehicle.as_deref(), Some("TR-001"));
        assert_eq!(shipments[11].vehicle.as_deref(), Some("TR-012"));
        assert_eq!(
            shipments[3].next_checkpoint.as_deref(),
            Some(SEED_CHECKPOINT)
        );
    }

    #[test]
    fn test_seed_eta_within_a_day() {
        let now = Utc::now();
        let mut rng = ScriptedRandom::new([0.0, 0.5, 0.999]);
        let shipments = seed_shipments(&["A", "B", "C"], now, &mut rng);

        assert_eq!(shipments[0].eta, Some(now));
        assert_eq!(shipments[1].eta, Some(now + Duration::hours(12)));
        let last = shipments[2].eta.unwrap();
        assert!(last > now && last < now + Duration::hours(24));
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn test_seed_empty() {
        let mut rng = ScriptedRandom::new([0.5]);
        let shipments = seed_shipments::<&str>(&[], Utc::now(), &mut rng);
        assert!(shipments.is_empty());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_advance_clamps_to_hundred() {
        let mut rng = ScriptedRandom::new([0.0]);
        let mut s = ShipmentStatus::seeded(2, "X", Utc::now(), &mut rng);
        let later = Utc::now() + Duration::seconds(6);
        s.advance(9.5, "Boston", later);
        assert!((s.progress - MAX_PROGRESS).abs() < f64::EPSILON);
        assert_eq!(s.current_location, "Boston");
        assert_eq!(s.last_update, later);
        assert_eq!(s.status, ShipmentState::Delivered);
    }

    #[test]
    fn test_advance_ignores_negative_delta() {
        let mut rng = ScriptedRandom::new([0.0]);
        let mut s = ShipmentStatus::seeded(1, "X", Utc::now(), &mut rng);
        s.advance(-5.0, "Chicago", Utc::now());
        assert!((s.progress - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_percent_rounds() {
        let mut rng = ScriptedRandom::new([0.0]);
        let mut s = ShipmentStatus::seeded(0, "X", Utc::now(), &mut rng);
        s.advance(7.6, "Miami", Utc::now());
        assert_eq!(s.progress_percent(), 8);
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let mut rng = ScriptedRandom::new([0.0]);
        let s = ShipmentStatus::seeded(1, "SHP-1", Utc::now(), &mut rng);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"trackingNumber\":\"SHP-1\""));
        assert!(json.contains("\"status\":\"in-transit\""));
        assert!(json.contains("\"currentLocation\""));
    }
}
