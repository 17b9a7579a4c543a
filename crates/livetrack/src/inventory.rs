//! Simulated warehouse stock.
//!
//! [`Inventory`] holds the item table and its read helpers. [`InventoryFeed`]
//! owns a table behind a lock and a [`ScheduledTask`] that randomly nudges
//! quantities, the same lifecycle a [`TrackingSession`] has for shipments.
//!
//! [`TrackingSession`]: crate::session::TrackingSession

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::InventoryConfig;
use crate::error::{Error, Result};
use crate::random::{self, RandomSource};
use crate::task::{ScheduledTask, TaskKind, TaskStatus};

/// Default period between perturbations.
pub const DEFAULT_INVENTORY_INTERVAL: Duration = Duration::from_secs(5);

/// Default chance that an item changes on a tick.
pub const DEFAULT_CHANGE_PROBABILITY: f64 = 0.3;

/// Number of distinct quantity steps; a change lands in `[-10, 9]`.
const QUANTITY_STEPS: usize = 20;
const QUANTITY_OFFSET: i64 = 10;

/// Physical state of stocked goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    /// Sellable.
    Good,
    /// Physically damaged.
    Damaged,
    /// Past its shelf life.
    Expired,
}

impl std::fmt::Display for ItemCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Good => "good",
            Self::Damaged => "damaged",
            Self::Expired => "expired",
        })
    }
}

/// One stocked SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Row identifier.
    pub id: String,
    /// Stock keeping unit code.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Product category.
    pub category: String,
    /// Units on hand.
    pub quantity: u32,
    /// Zone and shelf.
    pub location: String,
    /// Quantity at or below which the item needs reordering.
    pub reorder_level: u32,
    /// When the quantity last changed.
    pub last_updated: DateTime<Utc>,
    /// Physical state.
    pub condition: ItemCondition,
}

impl InventoryItem {
    /// Check whether stock is at or below the reorder level.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.quantity <= self.reorder_level
    }

    /// Shift the quantity by `change`, never below zero.
    pub fn adjust(&mut self, change: i64, at: DateTime<Utc>) {
        let next = (i64::from(self.quantity) + change).clamp(0, i64::from(u32::MAX));
        self.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        self.last_updated = at;
    }
}

/// The warehouse item table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    /// Wrap a list of items.
    #[must_use]
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    /// The demo warehouse: five items, last touched between 15 minutes and
    /// two hours before `now`.
    #[must_use]
    pub fn demo(now: DateTime<Utc>) -> Self {
        let item = |n: u32,
                    name: &str,
                    category: &str,
                    quantity: u32,
                    location: &str,
                    reorder_level: u32,
                    minutes_ago: i64,
                    condition: ItemCondition| InventoryItem {
            id: n.to_string(),
            sku: format!("SKU-{n:03}"),
            name: name.to_string(),
            category: category.to_string(),
            quantity,
            location: location.to_string(),
            reorder_level,
            last_updated: now - chrono::Duration::minutes(minutes_ago),
            condition,
        };

        Self::new(vec![
            item(
                1,
                "Electronics - Laptops",
                "Electronics",
                145,
                "Zone A - Shelf 12",
                50,
                30,
                ItemCondition::Good,
            ),
            item(
                2,
                "Textiles - T-Shirts",
                "Textiles",
                32,
                "Zone B - Shelf 5",
                100,
                60,
                ItemCondition::Good,
            ),
            item(
                3,
                "Furniture - Chairs",
                "Furniture",
                78,
                "Zone C - Shelf 8",
                20,
                120,
                ItemCondition::Damaged,
            ),
            item(
                4,
                "Food - Frozen Vegetables",
                "Food",
                12,
                "Zone A - Freezer 3",
                100,
                15,
                ItemCondition::Good,
            ),
            item(
                5,
                "Electronics - Cables",
                "Electronics",
                562,
                "Zone B - Shelf 2",
                200,
                45,
                ItemCondition::Good,
            ),
        ])
    }

    /// All items in table order.
    #[must_use]
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by SKU.
    #[must_use]
    pub fn by_sku(&self, sku: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.sku == sku)
    }

    /// Give each item a `probability` chance of a quantity change in
    /// `[-10, 9]`. Returns how many items changed.
    ///
    /// Per item, one draw decides whether it changes and, if so, a second
    /// draw picks the amount.
    pub fn perturb(
        &mut self,
        rng: &mut dyn RandomSource,
        probability: f64,
        now: DateTime<Utc>,
    ) -> usize {
        let mut changed = 0;
        for item in &mut self.items {
            if !rng.chance(probability) {
                continue;
            }
            let step = i64::try_from(rng.pick_index(QUANTITY_STEPS)).unwrap_or(QUANTITY_OFFSET);
            let change = step - QUANTITY_OFFSET;
            item.adjust(change, now);
            trace!(sku = %item.sku, change, quantity = item.quantity, "Stock changed");
            changed += 1;
        }
        changed
    }

    /// Items at or below their reorder level.
    #[must_use]
    pub fn critical_items(&self) -> Vec<&InventoryItem> {
        self.items.iter().filter(|i| i.is_critical()).collect()
    }

    /// Units on hand across all items.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Number of damaged items.
    #[must_use]
    pub fn damaged_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.condition == ItemCondition::Damaged)
            .count()
    }

    /// Items whose SKU or name contains `query` (case-insensitive), optionally
    /// restricted to one category.
    #[must_use]
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<&InventoryItem> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|i| {
                i.sku.to_lowercase().contains(&needle) || i.name.to_lowercase().contains(&needle)
            })
            .filter(|i| category.map_or(true, |c| i.category == c))
            .collect()
    }

    /// Summarize the current table.
    #[must_use]
    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            items: self.items.clone(),
            critical: self.critical_items().len(),
            total_quantity: self.total_quantity(),
            damaged: self.damaged_count(),
            taken_at: Utc::now(),
        }
    }

    /// Like [`snapshot`](Self::snapshot), but listing only the items that
    /// [`search`](Self::search) matches. Headline numbers cover the whole table.
    #[must_use]
    pub fn search_snapshot(&self, query: &str, category: Option<&str>) -> InventorySnapshot {
        InventorySnapshot {
            items: self.search(query, category).into_iter().cloned().collect(),
            ..self.snapshot()
        }
    }
}

/// Point-in-time copy of the table with its headline numbers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    /// All items in table order.
    pub items: Vec<InventoryItem>,
    /// Items at or below their reorder level.
    pub critical: usize,
    /// Units on hand across all items.
    pub total_quantity: u64,
    /// Damaged items.
    pub damaged: usize,
    /// When the copy was taken.
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Stock {
    inventory: Inventory,
    rng: Box<dyn RandomSource>,
    probability: f64,
}

impl Stock {
    fn tick(&mut self) -> usize {
        let changed = self
            .inventory
            .perturb(self.rng.as_mut(), self.probability, Utc::now());
        debug!(changed, "Inventory tick");
        changed
    }
}

#[derive(Debug, Clone)]
struct StockHandle {
    inner: Arc<Mutex<Stock>>,
}

impl StockHandle {
    fn lock(&self) -> MutexGuard<'_, Stock> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An inventory table perturbed on a timer.
#[derive(Debug)]
pub struct InventoryFeed {
    stock: StockHandle,
    interval: Duration,
    task: Option<ScheduledTask>,
}

impl InventoryFeed {
    /// Create a feed over `inventory`.
    #[must_use]
    pub fn new(
        inventory: Inventory,
        interval: Duration,
        probability: f64,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            stock: StockHandle {
                inner: Arc::new(Mutex::new(Stock {
                    inventory,
                    rng,
                    probability,
                })),
            },
            interval,
            task: None,
        }
    }

    /// Create a feed over the demo warehouse from the `[inventory]` section.
    #[must_use]
    pub fn from_config(config: &InventoryConfig) -> Self {
        Self::new(
            Inventory::demo(Utc::now()),
            config.interval(),
            config.change_probability,
            random::from_seed(config.seed),
        )
    }

    /// Start the timer.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] if the timer is already live.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(Error::AlreadyRunning {
                task: TaskKind::Inventory,
            });
        }
        let stock = self.stock.clone();
        self.task = Some(ScheduledTask::spawn(
            TaskKind::Inventory,
            self.interval,
            move || {
                stock.lock().tick();
            },
        ));
        info!(interval_ms = self.interval.as_millis(), "Inventory feed started");
        Ok(())
    }

    /// Cancel the timer and wait for it, returning the number of ticks run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunning`] if the feed was not started, or
    /// [`Error::TaskPanicked`] if a tick panicked.
    pub async fn stop(&mut self) -> Result<u64> {
        let task = self.task.take().ok_or(Error::NotRunning {
            task: TaskKind::Inventory,
        })?;
        let ticks = task.stop().await?;
        info!(ticks, "Inventory feed stopped");
        Ok(ticks)
    }

    /// Check whether the timer is live.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| task.status().is_running)
    }

    /// Timer status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.task.as_ref().map_or_else(
            || TaskStatus::stopped(TaskKind::Inventory, self.interval),
            ScheduledTask::status,
        )
    }

    /// Apply one perturbation immediately. Returns how many items changed.
    pub fn tick_now(&self) -> usize {
        self.stock.lock().tick()
    }

    /// Read the table under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&Inventory) -> R) -> R {
        f(&self.stock.lock().inventory)
    }

    /// Copy the current table.
    #[must_use]
    pub fn snapshot(&self) -> InventorySnapshot {
        self.stock.lock().inventory.snapshot()
    }
}

impl Drop for InventoryFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}
