//! Cancellable fixed-period tasks that drive the simulated feeds.
//!
//! A [`ScheduledTask`] owns a spawned interval loop and the
//! [`CancellationToken`] that ends it. Cancellation happens on [`stop`],
//! and also when the task is dropped, so no exit path leaves a timer
//! mutating state nobody observes.
//!
//! [`stop`]: ScheduledTask::stop

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// What a scheduled task drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// The shipment telemetry feed.
    ShipmentFeed,
    /// The warehouse inventory perturbation.
    Inventory,
}

impl TaskKind {
    /// Short name used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ShipmentFeed => "shipment-feed",
            Self::Inventory => "inventory",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Observable state of a scheduled task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStatus {
    /// What the task drives.
    pub kind: TaskKind,
    /// Whether the loop is still live.
    pub is_running: bool,
    /// Ticks completed since spawn.
    pub tick_count: u64,
    /// Period between ticks, in milliseconds.
    pub period_ms: u64,
}

impl TaskStatus {
    /// Status of a task that was never started.
    #[must_use]
    pub fn stopped(kind: TaskKind, period: Duration) -> Self {
        Self {
            kind,
            is_running: false,
            tick_count: 0,
            period_ms: duration_ms(period),
        }
    }
}

/// A spawned fixed-period loop paired with its cancellation token.
#[derive(Debug)]
pub struct ScheduledTask {
    kind: TaskKind,
    period: Duration,
    token: CancellationToken,
    ticks: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Spawn a loop calling `on_tick` every `period`, first after one full
    /// period has elapsed.
    ///
    /// Each call runs to completion before the next tick is considered.
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(kind: TaskKind, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let token = CancellationToken::new();
        let ticks = Arc::new(AtomicU64::new(0));

        let cancelled = token.clone();
        let counter = Arc::clone(&ticks);
        let handle = tokio::spawn(async move {
            debug!(
                task = %kind,
                interval_ms = duration_ms(period),
                "Scheduled task started"
            );
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        on_tick();
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }

            debug!(
                task = %kind,
                ticks = counter.load(Ordering::SeqCst),
                "Scheduled task stopped"
            );
        });

        Self {
            kind,
            period,
            token,
            ticks,
            handle: Some(handle),
        }
    }

    /// What this task drives.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Period between ticks.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Check whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        TaskStatus {
            kind: self.kind,
            is_running: !self.is_cancelled()
                && self.handle.as_ref().is_some_and(|h| !h.is_finished()),
            tick_count: self.tick_count(),
            period_ms: duration_ms(self.period),
        }
    }

    /// Request cancellation without waiting for the loop to exit.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel the loop and wait for it to exit, returning the tick count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskPanicked`] if a tick callback panicked.
    pub async fn stop(mut self) -> Result<u64> {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    warn!(task = %self.kind, "Scheduled task panicked");
                    return Err(Error::task_panicked(self.kind, err.to_string()));
                }
            }
        }
        Ok(self.tick_count())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn duration_ms(period: Duration) -> u64 {
    u64::try_from(period.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_task(period: Duration) -> (ScheduledTask, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let task = ScheduledTask::spawn(TaskKind::ShipmentFeed, period, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (task, calls)
    }

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::ShipmentFeed.to_string(), "shipment-feed");
        assert_eq!(TaskKind::Inventory.to_string(), "inventory");
    }

    #[test]
    fn test_stopped_status() {
        let status = TaskStatus::stopped(TaskKind::Inventory, Duration::from_secs(5));
        assert!(!status.is_running);
        assert_eq!(status.tick_count, 0);
        assert_eq!(status.period_ms, 5000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let (task, calls) = counting_task(Duration::from_secs(6));

        tokio::time::sleep(Duration::from_millis(5_900)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(task.stop().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period() {
        let (task, calls) = counting_task(Duration::from_secs(6));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(task.tick_count(), 10);
        assert!(task.status().is_running);
        assert_eq!(task.stop().await.unwrap(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_ticks() {
        let (task, calls) = counting_task(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        task.stop().await.unwrap();

        let after_stop = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
        assert_eq!(after_stop, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (task, calls) = counting_task(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        drop(task);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_marks_status() {
        let (task, _calls) = counting_task(Duration::from_secs(1));
        assert!(!task.is_cancelled());
        task.cancel();
        assert!(task.is_cancelled());
        assert!(!task.status().is_running);
        task.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_tick_reports_error() {
        let task = ScheduledTask::spawn(TaskKind::Inventory, Duration::from_secs(1), || {
            panic!("boom");
        });
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        let err = task.stop().await.unwrap_err();
        assert!(matches!(err, Error::TaskPanicked { .. }));
        assert!(err.to_string().contains("inventory"));
    }
}
