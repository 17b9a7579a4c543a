//! Tracking sessions: the owned scope of one live feed.
//!
//! A session seeds its shipments once, then [`start`](TrackingSession::start)
//! spawns the timer and [`stop`](TrackingSession::stop) cancels it. Dropping a
//! running session cancels the timer too.

use std::time::Duration;

use tracing::{info, warn};

use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::feed::{Feed, FeedHandle, FeedSnapshot};
use crate::random::{self, RandomSource};
use crate::task::{ScheduledTask, TaskKind, TaskStatus};
use crate::update::LiveUpdate;
use crate::update_log::DEFAULT_LOG_CAPACITY;
use crate::view::FeedView;

/// Default period between feed ticks.
pub const DEFAULT_FEED_INTERVAL: Duration = Duration::from_secs(6);

/// Timer and retention settings for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Period between ticks.
    pub interval: Duration,
    /// Number of updates the log keeps.
    pub log_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_FEED_INTERVAL,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl From<&FeedConfig> for SessionOptions {
    fn from(config: &FeedConfig) -> Self {
        Self {
            interval: config.interval(),
            log_capacity: config.log_capacity,
        }
    }
}

/// One live feed: shipments, update log and the timer driving them.
#[derive(Debug)]
pub struct TrackingSession {
    feed: FeedHandle,
    options: SessionOptions,
    task: Option<ScheduledTask>,
}

impl TrackingSession {
    /// Seed a session for the given tracking codes.
    #[must_use]
    pub fn new<S: AsRef<str>>(
        tracking_numbers: &[S],
        options: SessionOptions,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let feed = Feed::seed(
            tracking_numbers,
            options.log_capacity,
            rng,
            chrono::Utc::now(),
        );
        info!(
            shipments = tracking_numbers.len(),
            interval_ms = options.interval.as_millis(),
            capacity = options.log_capacity,
            "Tracking session seeded"
        );
        Self {
            feed: FeedHandle::new(feed),
            options,
            task: None,
        }
    }

    /// Seed a session from the `[feed]` configuration section.
    #[must_use]
    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(
            config.tracking_numbers.as_slice(),
            SessionOptions::from(config),
            random::from_seed(config.seed),
        )
    }

    /// Start the timer.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] if the timer is already live. A
    /// timer that exited on a panic is replaced.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(Error::AlreadyRunning {
                task: TaskKind::ShipmentFeed,
            });
        }
        if self.task.take().is_some() {
            warn!("Replacing a feed timer that exited without stop()");
        }

        self.feed.with(|feed| feed.set_connected(true));
        let feed = self.feed.clone();
        self.task = Some(ScheduledTask::spawn(
            TaskKind::ShipmentFeed,
            self.options.interval,
            move || {
                let _guard = DisconnectOnPanic(&feed);
                feed.tick();
            },
        ));
        info!("Tracking session started");
        Ok(())
    }

    /// Cancel the timer and wait for it to exit, returning the number of
    /// ticks it ran.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunning`] if the session was not started, or
    /// [`Error::TaskPanicked`] if a tick panicked.
    pub async fn stop(&mut self) -> Result<u64> {
        let task = self.task.take().ok_or(Error::NotRunning {
            task: TaskKind::ShipmentFeed,
        })?;
        self.feed.with(|feed| feed.set_connected(false));
        let ticks = task.stop().await?;
        info!(ticks, "Tracking session stopped");
        Ok(ticks)
    }

    /// Check whether the timer is live. False once a tick has panicked,
    /// even before [`stop`](Self::stop) collects the panic.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| task.status().is_running)
    }

    /// Timer status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.task.as_ref().map_or_else(
            || TaskStatus::stopped(TaskKind::ShipmentFeed, self.options.interval),
            ScheduledTask::status,
        )
    }

    /// Settings this session was created with.
    #[must_use]
    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Apply one tick immediately, independent of the timer.
    pub fn tick_now(&self) -> Option<LiveUpdate> {
        self.feed.tick()
    }

    /// Consistent copy of shipments and updates.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.feed.snapshot()
    }

    /// Shared handle to the feed, for code that needs its own reads.
    #[must_use]
    pub fn handle(&self) -> FeedHandle {
        self.feed.clone()
    }

    /// A view over this session with no shipment selected.
    #[must_use]
    pub fn view(&self) -> FeedView {
        FeedView::new(self.feed.clone())
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
            self.feed.with(|feed| feed.set_connected(false));
        }
    }
}

/// Clears the feed's connected flag when a tick unwinds.
struct DisconnectOnPanic<'a>(&'a FeedHandle);

impl Drop for DisconnectOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.with(|feed| feed.set_connected(false));
        }
    }
}
