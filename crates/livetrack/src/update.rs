//! Update events emitted by the simulated telemetry feed.
//!
//! A [`LiveUpdate`] is created once by the generator and never edited; the
//! update log only prepends and evicts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shipment::ShipmentState;

/// Category of an update event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// The shipment was scanned or moved somewhere.
    Location,
    /// A progress note from the carrier.
    Status,
    /// A delivery attempt or outcome.
    Delivery,
    /// Something needs attention.
    Alert,
}

impl UpdateKind {
    /// All kinds, in the order the generator draws from.
    pub const ALL: [Self; 4] = [Self::Location, Self::Status, Self::Delivery, Self::Alert];

    /// Severity attached to events of this kind.
    ///
    /// Alerts are warnings; everything else is informational.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::Alert => Severity::Warning,
            Self::Location | Self::Status | Self::Delivery => Severity::Info,
        }
    }

    /// Event title: the capitalized kind followed by `" Update"`.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Location => "Location Update",
            Self::Status => "Status Update",
            Self::Delivery => "Delivery Update",
            Self::Alert => "Alert Update",
        }
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Location => write!(f, "location"),
            Self::Status => write!(f, "status"),
            Self::Delivery => write!(f, "delivery"),
            Self::Alert => write!(f, "alert"),
        }
    }
}

/// How urgent an update is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Routine.
    Info,
    /// Worth a look.
    Warning,
    /// Needs action. Never produced by the simulated feed.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// One synthetic telemetry record about a tracked shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveUpdate {
    /// Unique identifier, ordered like `sequence`.
    pub id: String,

    /// Position in the session's generation order, starting at 1.
    pub sequence: u64,

    /// The shipment this update refers to.
    pub shipment_id: String,

    /// Tracking code of that shipment.
    pub tracking_number: String,

    /// When the update was generated.
    pub timestamp: DateTime<Utc>,

    /// Event category.
    #[serde(rename = "type")]
    pub kind: UpdateKind,

    /// Short heading.
    pub title: String,

    /// Human-readable body.
    pub message: String,

    /// Decorative latitude in `[-90, 90]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Decorative longitude in `[-180, 180]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Status snapshot carried by the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ShipmentState>,

    /// Event severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl LiveUpdate {
    /// Identifier for the update generated at `sequence`.
    #[must_use]
    pub fn id_for(sequence: u64) -> String {
        format!("update-{sequence:08}")
    }

    /// Check whether this update refers to the given shipment.
    #[must_use]
    pub fn is_for(&self, shipment_id: &str) -> bool {
        self.shipment_id == shipment_id
    }

    /// Check whether this update is a warning or worse.
    #[must_use]
    pub fn needs_attention(&self) -> bool {
        self.severity.is_some_and(|s| s >= Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: UpdateKind) -> LiveUpdate {
        LiveUpdate {
            id: LiveUpdate::id_for(7),
            sequence: 7,
            shipment_id: "shipment-0".to_string(),
            tracking_number: "SHP-2024-001".to_string(),
            timestamp: Utc::now(),
            kind,
            title: kind.title().to_string(),
            message: "Out for delivery".to_string(),
            latitude: Some(12.5),
            longitude: Some(-40.0),
            status: Some(ShipmentState::InTransit),
            severity: Some(kind.severity()),
        }
    }

    #[test]
    fn test_severity_is_warning_only_for_alerts() {
        for kind in UpdateKind::ALL {
            let expected = if kind == UpdateKind::Alert {
                Severity::Warning
            } else {
                Severity::Info
            };
            assert_eq!(kind.severity(), expected, "{kind}");
        }
    }

    #[test]
    fn test_title_is_capitalized_kind() {
        for kind in UpdateKind::ALL {
            let name = kind.to_string();
            let mut chars = name.chars();
            let first = chars.next().unwrap().to_ascii_uppercase();
            let expected = format!("{first}{} Update", chars.as_str());
            assert_eq!(kind.title(), expected);
        }
    }

    #[test]
    fn test_id_for_sorts_in_generation_order() {
        assert_eq!(LiveUpdate::id_for(1), "update-00000001");
        assert!(LiveUpdate::id_for(9) < LiveUpdate::id_for(10));
    }

    #[test]
    fn test_is_for() {
        let update = sample(UpdateKind::Status);
        assert!(update.is_for("shipment-0"));
        assert!(!update.is_for("shipment-1"));
    }

    #[test]
    fn test_needs_attention() {
        assert!(sample(UpdateKind::Alert).needs_attention());
        assert!(!sample(UpdateKind::Delivery).needs_attention());

        let mut critical = sample(UpdateKind::Status);
        critical.severity = Some(Severity::Critical);
        assert!(critical.needs_attention());
    }

    #[test]
    fn test_serialization_uses_wire_names() {
        let json = serde_json::to_string(&sample(UpdateKind::Alert)).unwrap();
        assert!(json.contains("\"type\":\"alert\""));
        assert!(json.contains("\"shipmentId\":\"shipment-0\""));
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"status\":\"in-transit\""));
    }

    #[test]
    fn test_optional_fields_skipped() {
        let mut update = sample(UpdateKind::Location);
        update.latitude = None;
        update.longitude = None;
        update.status = None;
        update.severity = None;
        let json = serde_json::to_string(&update).unwrap();
        assert!(!json.contains("latitude"));
        assert!(!json.contains("severity"));
    }
}
