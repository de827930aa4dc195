//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::{AircraftStatus, AircraftUpdate, NewAircraft};

/// Aircraft record commands.
#[derive(Debug, Subcommand)]
pub enum AircraftCommand {
    /// Register a new aircraft
    Add(AddAircraft),

    /// Change an aircraft's operational state
    Update(UpdateAircraft),

    /// Show one aircraft by id or registration
    Show {
        /// Numeric id or registration mark
        aircraft: String,
    },

    /// List aircraft by registration
    List {
        /// Only aircraft with this status
        #[arg(short, long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Show the audit history of one aircraft
    History {
        /// Aircraft id
        id: i64,
    },

    /// Delete an aircraft
    Remove {
        /// Aircraft id
        id: i64,

        /// Also delete its maintenance windows and history
        #[arg(long)]
        purge: bool,
    },
}

/// Arguments for registering an aircraft.
#[derive(Debug, Args)]
pub struct AddAircraft {
    /// Registration mark, e.g. PP-ECE
    pub registration: String,

    /// Manufacturer serial number
    #[arg(long)]
    pub serial: Option<String>,

    /// Airframe manufacturer
    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Airframe model
    #[arg(long)]
    pub model: Option<String>,

    /// Aircraft category
    #[arg(long)]
    pub category: Option<String>,

    /// Home base
    #[arg(long)]
    pub home_base: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<AddAircraft> for NewAircraft {
    fn from(args: AddAircraft) -> Self {
        Self {
            registration: args.registration,
            serial_number: args.serial,
            manufacturer: args.manufacturer,
            model: args.model,
            category: args.category,
            home_base: args.home_base,
            notes: args.notes,
        }
    }
}

/// Arguments for updating an aircraft. Pass an empty string to clear a field.
#[derive(Debug, Args)]
pub struct UpdateAircraft {
    /// Aircraft id
    pub id: i64,

    /// New status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Current location
    #[arg(short, long)]
    pub location: Option<String>,

    /// Pilot in command
    #[arg(long)]
    pub commander: Option<String>,

    /// Second pilot
    #[arg(long)]
    pub co_pilot: Option<String>,

    /// Assigned mechanic
    #[arg(long)]
    pub mechanic: Option<String>,

    /// Current mission
    #[arg(long)]
    pub mission: Option<String>,
}

impl UpdateAircraft {
    /// The partial update described by these arguments.
    #[must_use]
    pub fn to_update(&self) -> AircraftUpdate {
        AircraftUpdate {
            status: self.status.map(AircraftStatus::from),
            current_location: self.location.clone(),
            commander: self.commander.clone(),
            co_pilot: self.co_pilot.clone(),
            mechanic: self.mechanic.clone(),
            mission: self.mission.clone(),
        }
    }
}

/// Maintenance window commands.
#[derive(Debug, Subcommand)]
pub enum MaintenanceCommand {
    /// Book a maintenance window; the aircraft goes into maintenance
    Schedule {
        /// Aircraft id
        aircraft_id: i64,

        /// First day, as YYYY-MM-DD
        date: String,

        /// Length in days (defaults to 1)
        #[arg(short, long)]
        duration: Option<String>,
    },

    /// List the next maintenance windows
    Upcoming {
        /// Maximum number of windows
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// List the windows booked for one aircraft
    Windows {
        /// Aircraft id
        aircraft_id: i64,
    },

    /// Move a window to its next state
    Advance {
        /// Window id
        window_id: i64,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Aircraft status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Airborne
    Flying,
    /// On the ground
    Grounded,
    /// In a hangar
    Hangared,
    /// Out of service
    Maintenance,
}

impl From<StatusArg> for AircraftStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Flying => Self::Flying,
            StatusArg::Grounded => Self::Grounded,
            StatusArg::Hangared => Self::Hangared,
            StatusArg::Maintenance => Self::Maintenance,
        }
    }
}
