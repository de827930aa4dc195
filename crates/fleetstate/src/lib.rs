//! `fleetstate` - Aircraft fleet state tracking with an audit history
//!
//! This library keeps the canonical record of each aircraft in a fleet, an
//! append-only history of every operational change, and the maintenance
//! windows that take aircraft out of service. All state lives in one SQLite
//! database; every mutating operation is a single transaction.
//!
//! ```no_run
//! use fleetstate::{AircraftStatus, AircraftUpdate, Fleet, NewAircraft};
//!
//! # fn main() -> fleetstate::Result<()> {
//! let fleet = Fleet::in_memory()?;
//! let aircraft = fleet.registry().create(NewAircraft::new("PP-ECE"))?;
//! fleet
//!     .registry()
//!     .apply_update(aircraft.id, &AircraftUpdate::status(AircraftStatus::Flying))?;
//! assert_eq!(fleet.ledger().list_for(aircraft.id)?.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod fleet;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod query;
pub mod registry;
pub mod retirement;
pub mod scheduler;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use fleet::Fleet;
pub use ledger::HistoryLedger;
pub use logging::init_logging;
pub use model::{
    Aircraft, AircraftStatus, AircraftUpdate, HistorySnapshot, MaintenanceWindow, NewAircraft,
    WindowState,
};
pub use query::{DashboardSummary, FleetQuery};
pub use registry::AircraftRegistry;
pub use retirement::{PurgeReport, Retirement};
pub use scheduler::{MaintenanceScheduler, ScheduleRequest};
pub use storage::{Store, StoreStats};
