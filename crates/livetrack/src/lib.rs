//! `livetrack` - A simulated real-time shipment telemetry feed
//!
//! A [`TrackingSession`] seeds a fixed set of shipments, then a timer picks
//! one at random every few seconds, synthesizes a [`LiveUpdate`] about it,
//! nudges its progress forward and records the update in a bounded
//! [`UpdateLog`]. Views read consistent snapshots of the whole feed.
//!
//! ```no_run
//! # async fn demo() -> livetrack::Result<()> {
//! use livetrack::{FeedConfig, TrackingSession};
//!
//! let mut session = TrackingSession::from_config(&FeedConfig::default());
//! session.start()?;
//! // ...
//! let snapshot = session.snapshot();
//! println!("{} updates", snapshot.updates.len());
//! session.stop().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod generator;
pub mod inventory;
pub mod logging;
pub mod random;
pub mod session;
pub mod shipment;
pub mod store;
pub mod task;
pub mod update;
pub mod update_log;
pub mod view;

pub use config::{Config, FeedConfig, InventoryConfig};
pub use error::{Error, Result};
pub use feed::{Feed, FeedHandle, FeedSnapshot};
pub use generator::EventGenerator;
pub use inventory::{Inventory, InventoryFeed, InventoryItem, ItemCondition};
pub use logging::init_logging;
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
pub use session::{SessionOptions, TrackingSession};
pub use shipment::{ShipmentState, ShipmentStatus};
pub use store::StatusStore;
pub use task::{ScheduledTask, TaskKind, TaskStatus};
pub use update::{LiveUpdate, Severity, UpdateKind};
pub use update_log::UpdateLog;
pub use view::{FeedSummary, FeedView};
