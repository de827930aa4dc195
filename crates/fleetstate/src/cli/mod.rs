//! Command-line interface for fleetstate.
//!
//! This module provides the CLI structure for the `fleetctl` binary. The
//! handlers live in the binary; everything here is argument parsing.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddAircraft, AircraftCommand, ConfigCommand, MaintenanceCommand, StatusArg, UpdateAircraft,
};

use crate::logging::Verbosity;

/// fleetctl - Track aircraft state, history and maintenance
///
/// Operates directly on the fleet database named in the configuration.
#[derive(Debug, Parser)]
#[command(name = "fleetctl")]
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

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage aircraft records
    #[command(subcommand)]
    Aircraft(AircraftCommand),

    /// Manage maintenance windows
    #[command(subcommand)]
    Maintenance(MaintenanceCommand),

    /// Show fleet counts and upcoming maintenance
    Dashboard,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}
