//! Read-only projections of a feed for presentation code.
//!
//! A [`FeedView`] never mutates the feed. Its only state is which shipment,
//! if any, the user has selected.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::feed::{Feed, FeedHandle};
use crate::shipment::{ShipmentState, ShipmentStatus};
use crate::update::LiveUpdate;

/// Updates shown when no shipment is selected.
pub const RECENT_UPDATES_LIMIT: usize = 10;

/// Headline numbers for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    /// Updates currently retained in the log.
    pub total_updates: usize,
    /// Shipments in transit.
    pub in_transit: usize,
    /// Shipments delivered.
    pub delivered: usize,
    /// Whether the timer is live.
    pub connected: bool,
}

impl FeedSummary {
    fn of(feed: &Feed) -> Self {
        Self {
            total_updates: feed.log().len(),
            in_transit: feed.store().count_in(ShipmentState::InTransit),
            delivered: feed.store().count_in(ShipmentState::Delivered),
            connected: feed.is_connected(),
        }
    }
}

/// Everything a view renders, read under one lock.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewFrame {
    /// All shipments, in seeding order.
    pub shipments: Vec<ShipmentStatus>,
    /// The selected shipment, if any.
    pub selected: Option<ShipmentStatus>,
    /// Updates for the selection, or the most recent ones.
    pub updates: Vec<LiveUpdate>,
    /// Headline numbers.
    pub summary: FeedSummary,
}

/// A view over one session's feed.
#[derive(Debug, Clone)]
pub struct FeedView {
    feed: FeedHandle,
    selected: Option<String>,
}

impl FeedView {
    /// Create a view with nothing selected.
    #[must_use]
    pub fn new(feed: FeedHandle) -> Self {
        Self {
            feed,
            selected: None,
        }
    }

    /// Select a shipment. Selecting the current selection again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownShipment`] if the feed does not track `id`;
    /// the previous selection is kept.
    pub fn select(&mut self, id: &str) -> Result<()> {
        if self.selected.as_deref() == Some(id) {
            return Ok(());
        }
        if !self.feed.with(|feed| feed.store().contains(id)) {
            return Err(Error::unknown_shipment(id));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Id of the selected shipment.
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Current state of the selected shipment.
    #[must_use]
    pub fn selected(&self) -> Option<ShipmentStatus> {
        let id = self.selected.as_deref()?;
        self.feed.with(|feed| feed.store().get(id).cloned())
    }

    /// Updates to display: every retained update for the selected shipment,
    /// or the most recent few when nothing is selected. Newest first.
    #[must_use]
    pub fn visible_updates(&self) -> Vec<LiveUpdate> {
        self.feed.with(|feed| self.updates_in(feed))
    }

    /// Headline numbers.
    #[must_use]
    pub fn summary(&self) -> FeedSummary {
        self.feed.with(|feed| FeedSummary::of(feed))
    }

    /// Read everything needed to render, consistently.
    #[must_use]
    pub fn render(&self) -> ViewFrame {
        self.feed.with(|feed| ViewFrame {
            shipments: feed.store().to_vec(),
            selected: self
                .selected
                .as_deref()
                .and_then(|id| feed.store().get(id).cloned()),
            updates: self.updates_in(feed),
            summary: FeedSummary::of(feed),
        })
    }

    fn updates_in(&self, feed: &Feed) -> Vec<LiveUpdate> {
        match self.selected.as_deref() {
            Some(id) => feed.log().for_shipment(id),
            None => feed.log().recent(RECENT_UPDATES_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use crate::session::{SessionOptions, TrackingSession};

    fn session(codes: &[&str]) -> TrackingSession {
        TrackingSession::new(
            codes,
            SessionOptions::default(),
            Box::new(SeededRandom::new(99)),
        )
    }

    #[test]
    fn test_no_selection_shows_recent() {
        let session = session(&["A", "B", "C"]);
        for _ in 0..25 {
            session.tick_now();
        }
        let view = session.view();
        let updates = view.visible_updates();
        assert_eq!(updates.len(), RECENT_UPDATES_LIMIT);
        assert_eq!(updates[0].sequence, 25);
        assert!(view.selected().is_none());
    }

    #[test]
    fn test_selection_filters_updates() {
        let session = session(&["A", "B", "C"]);
        for _ in 0..40 {
            session.tick_now();
        }
        let mut view = session.view();
        view.select("shipment-1").unwrap();

        let updates = view.visible_updates();
        assert!(updates.iter().all(|u| u.shipment_id == "shipment-1"));
        let expected = session
            .snapshot()
            .updates
            .iter()
            .filter(|u| u.shipment_id == "shipment-1")
            .count();
        assert_eq!(updates.len(), expected);
        assert_eq!(view.selected().unwrap().tracking_number, "B");
    }

    #[test]
    fn test_select_twice_changes_nothing() {
        let session = session(&["A", "B"]);
        for _ in 0..5 {
            session.tick_now();
        }
        let before = session.snapshot();

        let mut view = session.view();
        view.select("shipment-0").unwrap();
        view.select("shipment-0").unwrap();

        let after = session.snapshot();
        assert_eq!(before.shipments, after.shipments);
        assert_eq!(before.updates, after.updates);
        assert_eq!(view.selected_id(), Some("shipment-0"));
    }

    #[test]
    fn test_select_unknown_keeps_previous() {
        let session = session(&["A", "B"]);
        let mut view = session.view();
        view.select("shipment-1").unwrap();

        let err = view.select("shipment-9").unwrap_err();
        assert!(matches!(err, Error::UnknownShipment { .. }));
        assert_eq!(view.selected_id(), Some("shipment-1"));
    }

    #[test]
    fn test_clear_selection() {
        let session = session(&["A"]);
        let mut view = session.view();
        view.select("shipment-0").unwrap();
        view.clear_selection();
        assert!(view.selected_id().is_none());
    }

    #[test]
    fn test_summary_counts() {
        let session = session(&["A", "B", "C", "D", "E"]);
        session.tick_now();
        let summary = session.view().summary();
        assert_eq!(summary.total_updates, 1);
        assert_eq!(summary.in_transit, 2);
        assert_eq!(summary.delivered, 1);
        assert!(!summary.connected);
    }

    #[test]
    fn test_views_are_independent() {
        let session = session(&["A", "B"]);
        let mut first = session.view();
        let second = session.view();
        first.select("shipment-1").unwrap();
        assert!(second.selected_id().is_none());
    }

    #[test]
    fn test_render_is_consistent() {
        let session = session(&["A", "B", "C"]);
        for _ in 0..8 {
            session.tick_now();
        }
        let mut view = session.view();
        view.select("shipment-2").unwrap();
        let frame = view.render();

        assert_eq!(frame.shipments.len(), 3);
        assert_eq!(frame.selected.as_ref().unwrap().id, "shipment-2");
        assert_eq!(frame.summary.total_updates, 8);
        assert!(frame.updates.iter().all(|u| u.shipment_id == "shipment-2"));
    }
}
