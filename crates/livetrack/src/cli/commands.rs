//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Watch command arguments.
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Tracking codes to follow (defaults to the configured list)
    #[arg(value_name = "TRACKING")]
    pub tracking: Vec<String>,

    /// Stop after this many seconds (runs until Ctrl-C when omitted)
    #[arg(short, long, value_name = "SECS")]
    pub duration: Option<u64>,

    /// Override the event interval in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Seed the random source for a reproducible feed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Print each event as a JSON line
    #[arg(short, long)]
    pub json: bool,
}

/// Simulate command arguments.
#[derive(Debug, Args)]
pub struct SimulateCommand {
    /// Number of ticks to apply
    #[arg(short = 'n', long, default_value = "20")]
    pub ticks: u64,

    /// Tracking codes to seed (defaults to the configured list)
    #[arg(short, long = "tracking", value_name = "CODE")]
    pub tracking: Vec<String>,

    /// Seed the random source for a reproducible run
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Show only updates for this shipment id (e.g. shipment-0)
    #[arg(long, value_name = "ID")]
    pub select: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Inventory command arguments.
#[derive(Debug, Args)]
pub struct InventoryCommand {
    /// Number of perturbation ticks to apply
    #[arg(short = 'n', long, default_value = "0")]
    pub ticks: u64,

    /// Seed the random source for a reproducible run
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Only list items whose SKU or name contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Only list items in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
