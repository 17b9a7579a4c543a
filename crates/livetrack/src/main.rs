//! `livetrack` - CLI for the simulated shipment feed
//!
//! This binary runs the live feed on its timer, applies ticks offline for
//! inspection, and shows the simulated warehouse stock.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use livetrack::cli::{
    Cli, Command, ConfigCommand, InventoryCommand, OutputFormat, SimulateCommand, WatchCommand,
};
use livetrack::inventory::InventorySnapshot;
use livetrack::view::ViewFrame;
use livetrack::{
    init_logging, Config, FeedHandle, InventoryFeed, LiveUpdate, TrackingSession,
};

/// Smallest poll period `watch` uses to pick up new events.
const MIN_POLL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Watch(watch_cmd) => handle_watch(config, watch_cmd).await,
        Command::Simulate(simulate_cmd) => handle_simulate(config, simulate_cmd),
        Command::Inventory(inventory_cmd) => handle_inventory(&config, &inventory_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Apply command-line overrides to the `[feed]` section and re-validate.
fn feed_overrides(
    mut config: Config,
    tracking: Vec<String>,
    seed: Option<u64>,
    interval_ms: Option<u64>,
) -> livetrack::Result<Config> {
    if !tracking.is_empty() {
        config.feed.tracking_numbers = tracking;
    }
    if seed.is_some() {
        config.feed.seed = seed;
    }
    if let Some(interval_ms) = interval_ms {
        config.feed.interval_ms = interval_ms;
    }
    config.validate()?;
    Ok(config)
}

async fn handle_watch(config: Config, cmd: WatchCommand) -> Result<(), Box<dyn std::error::Error>> {
    let duration = cmd.duration.map(Duration::from_secs);
    let config = feed_overrides(config, cmd.tracking, cmd.seed, cmd.interval_ms)?;
    let mut session = TrackingSession::from_config(&config.feed);
    let feed = session.handle();

    if !cmd.json {
        print_shipments_header();
        for shipment in session.snapshot().shipments {
            print_shipment_row(&shipment);
        }
        println!();
    }

    session.start()?;
    info!(duration = ?duration, "Watching feed (Ctrl-C to stop)");

    let deadline = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut poll = tokio::time::interval((config.feed.interval() / 2).max(MIN_POLL));
    let mut seen = 0;
    loop {
        tokio::select! {
            () = &mut deadline => break,
            result = &mut ctrl_c => {
                if let Err(err) = result {
                    warn!(error = %err, "Failed to listen for Ctrl-C");
                }
                break;
            }
            _ = poll.tick() => print_updates_since(&feed, &mut seen, cmd.json)?,
        }
    }

    let ticks = session.stop().await?;
    // Events from the last poll up to cancellation.
    print_updates_since(&feed, &mut seen, cmd.json)?;
    if !cmd.json {
        let summary = session.view().summary();
        println!();
        println!(
            "Stopped after {ticks} events ({} in log, {} in transit, {} delivered).",
            summary.total_updates, summary.in_transit, summary.delivered
        );
    }
    Ok(())
}

/// Print every update newer than `seen` and advance it.
fn print_updates_since(
    feed: &FeedHandle,
    seen: &mut u64,
    json: bool,
) -> livetrack::Result<()> {
    for update in feed.updates_since(*seen) {
        *seen = update.sequence;
        if json {
            println!("{}", serde_json::to_string(&update)?);
        } else {
            print_update_row(&update);
        }
    }
    Ok(())
}

fn handle_simulate(config: Config, cmd: SimulateCommand) -> Result<(), Box<dyn std::error::Error>> {
    let config = feed_overrides(config, cmd.tracking, cmd.seed, None)?;
    let session = TrackingSession::from_config(&config.feed);
    for _ in 0..cmd.ticks {
        session.tick_now();
    }

    let mut view = session.view();
    if let Some(id) = cmd.select.as_deref() {
        view.select(id)?;
    }
    let frame = view.render();

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&frame)?),
        OutputFormat::Table => print_frame(&frame, cmd.ticks),
    }
    Ok(())
}

fn handle_inventory(
    config: &Config,
    cmd: &InventoryCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut inventory_config = config.inventory.clone();
    if cmd.seed.is_some() {
        inventory_config.seed = cmd.seed;
    }
    let feed = InventoryFeed::from_config(&inventory_config);
    let changed: usize = (0..cmd.ticks).map(|_| feed.tick_now()).sum();
    let snapshot = if cmd.search.is_some() || cmd.category.is_some() {
        let query = cmd.search.as_deref().unwrap_or_default();
        feed.with(|inventory| inventory.search_snapshot(query, cmd.category.as_deref()))
    } else {
        feed.snapshot()
    };

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Table => print_inventory(&snapshot, cmd.ticks, changed),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Feed]");
                println!("  Interval (ms):      {}", config.feed.interval_ms);
                println!("  Log capacity:       {}", config.feed.log_capacity);
                println!(
                    "  Tracking numbers:   {}",
                    config.feed.tracking_numbers.join(", ")
                );
                println!("  Seed:               {}", display_seed(config.feed.seed));
                println!();
                println!("[Inventory]");
                println!("  Interval (ms):      {}", config.inventory.interval_ms);
                println!(
                    "  Change probability: {}",
                    config.inventory.change_probability
                );
                println!(
                    "  Seed:               {}",
                    display_seed(config.inventory.seed)
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn display_seed(seed: Option<u64>) -> String {
    seed.map_or_else(|| "(random)".to_string(), |s| s.to_string())
}

fn print_shipments_header() {
    println!(
        "{:<12} {:<14} {:<12} {:<12} {:>5}",
        "ID", "TRACKING", "STATUS", "LOCATION", "PROG"
    );
}

fn print_shipment_row(shipment: &livetrack::ShipmentStatus) {
    println!(
        "{:<12} {:<14} {:<12} {:<12} {:>4}%",
        shipment.id,
        shipment.tracking_number,
        shipment.status.to_string(),
        shipment.current_location,
        shipment.progress_percent()
    );
}

fn print_update_row(update: &LiveUpdate) {
    let severity = update
        .severity
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    let flag = if update.needs_attention() { "!" } else { " " };
    println!(
        "{} {flag} {:<7} {:<14} {:<16} {}",
        update.timestamp.format("%H:%M:%S"),
        severity,
        update.tracking_number,
        update.title,
        update.message
    );
}

fn print_frame(frame: &ViewFrame, ticks: u64) {
    println!("livetrack simulation ({ticks} ticks)");
    println!("------------------------------");
    print_shipments_header();
    for shipment in &frame.shipments {
        print_shipment_row(shipment);
    }
    println!();

    match &frame.selected {
        Some(shipment) => println!(
            "Updates for {} ({}):",
            shipment.id, shipment.tracking_number
        ),
        None => println!("Recent updates:"),
    }
    if frame.updates.is_empty() {
        println!("  (none)");
    }
    for update in &frame.updates {
        print_update_row(update);
    }
    println!();
    println!(
        "Updates in log: {}   In transit: {}   Delivered: {}",
        frame.summary.total_updates, frame.summary.in_transit, frame.summary.delivered
    );
}

fn print_inventory(snapshot: &InventorySnapshot, ticks: u64, changed: usize) {
    println!("Warehouse inventory ({ticks} ticks, {changed} changes)");
    println!("----------------------------------------");
    println!(
        "{:<8} {:<26} {:>8} {:>8} {:<20} {:<8}",
        "SKU", "NAME", "QTY", "REORDER", "LOCATION", "COND"
    );
    for item in &snapshot.items {
        let flag = if item.is_critical() { " !" } else { "" };
        println!(
            "{:<8} {:<26} {:>8} {:>8} {:<20} {:<8}{flag}",
            item.sku,
            item.name,
            item.quantity,
            item.reorder_level,
            item.location,
            item.condition.to_string()
        );
    }
    println!();
    println!(
        "Total units: {}   Critical: {}   Damaged: {}",
        snapshot.total_quantity, snapshot.critical, snapshot.damaged
    );
}
