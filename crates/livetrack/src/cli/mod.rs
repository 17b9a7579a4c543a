//! Command-line interface for livetrack.
//!
//! This module provides the CLI structure for the `livetrack` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, InventoryCommand, OutputFormat, SimulateCommand, WatchCommand,
};

use crate::logging::Verbosity;

/// livetrack - Simulated real-time shipment telemetry
///
/// Seeds a set of tracked shipments and feeds them synthetic location,
/// status, delivery and alert events on a timer.
#[derive(Debug, Parser)]
#[command(name = "livetrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the live feed on its timer and print events as they arrive
    Watch(WatchCommand),

    /// Apply a number of ticks immediately and print the resulting state
    Simulate(SimulateCommand),

    /// Show the simulated warehouse stock
    Inventory(InventoryCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Config(ConfigCommand::Path),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "livetrack");
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch() {
        let cli =
            Cli::try_parse_from(["livetrack", "watch", "A-1", "B-2", "-d", "30", "--seed", "7"])
                .unwrap();
        let Command::Watch(cmd) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(cmd.tracking, vec!["A-1", "B-2"]);
        assert_eq!(cmd.duration, Some(30));
        assert_eq!(cmd.seed, Some(7));
        assert!(cmd.interval_ms.is_none());
    }

    #[test]
    fn test_parse_simulate_defaults() {
        let cli = Cli::try_parse_from(["livetrack", "simulate"]).unwrap();
        let Command::Simulate(cmd) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(cmd.ticks, 20);
        assert!(cmd.tracking.is_empty());
        assert_eq!(cmd.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_simulate_options() {
        let cli = Cli::try_parse_from([
            "livetrack",
            "simulate",
            "-n",
            "60",
            "-t",
            "X",
            "-t",
            "Y",
            "--select",
            "shipment-1",
            "-f",
            "json",
        ])
        .unwrap();
        let Command::Simulate(cmd) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(cmd.ticks, 60);
        assert_eq!(cmd.tracking, vec!["X", "Y"]);
        assert_eq!(cmd.select.as_deref(), Some("shipment-1"));
        assert_eq!(cmd.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_inventory() {
        let cli = Cli::try_parse_from(["livetrack", "inventory", "-n", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Inventory(InventoryCommand { ticks: 3, .. })
        ));
    }

    #[test]
    fn test_parse_inventory_filters() {
        let cli = Cli::try_parse_from([
            "livetrack",
            "inventory",
            "--search",
            "sku-00",
            "--category",
            "Electronics",
        ])
        .unwrap();
        let Command::Inventory(cmd) = cli.command else {
            panic!("expected inventory");
        };
        assert_eq!(cmd.search.as_deref(), Some("sku-00"));
        assert_eq!(cmd.category.as_deref(), Some("Electronics"));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["livetrack", "config", "validate", "-f", "/tmp/x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["livetrack", "-c", "/custom/config.toml", "config", "path"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["livetrack", "simulate", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["livetrack", "config", "path", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
