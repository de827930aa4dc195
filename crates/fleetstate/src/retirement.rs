//! Removing an aircraft together with everything that references it.
//!
//! [`AircraftRegistry::delete`](crate::registry::AircraftRegistry::delete)
//! refuses while windows or snapshots exist. Retirement is the explicit,
//! destructive path: it purges those first and then runs the same guarded
//! delete, all in one transaction.

use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::registry;
use crate::storage::Store;

/// What a purge removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Maintenance windows deleted.
    pub windows: usize,
    /// History snapshots deleted.
    pub snapshots: usize,
}

/// Cascading removal of aircraft.
#[derive(Debug, Clone)]
pub struct Retirement {
    store: Arc<Store>,
}

impl Retirement {
    /// Create a retirement service over `store`.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Delete every maintenance window and history snapshot of one aircraft.
    ///
    /// The aircraft itself is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the aircraft is
    /// unknown, or a storage error.
    pub fn purge_dependents(&self, aircraft_id: i64) -> Result<PurgeReport> {
        let (registration, report) = self.store.write(|conn| {
            let aircraft = registry::require_in(conn, aircraft_id)?;
            Ok((aircraft.registration, purge_in(conn, aircraft_id)?))
        })?;

        warn!(
            "Purged {} maintenance window(s) and {} history snapshot(s) of aircraft {}",
            report.windows, report.snapshots, registration
        );
        Ok(report)
    }

    /// Purge dependents and delete the aircraft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the aircraft is
    /// unknown, or a storage error. Nothing is removed on error.
    pub fn retire(&self, aircraft_id: i64) -> Result<PurgeReport> {
        let (registration, report) = self.store.write(|conn| {
            registry::require_in(conn, aircraft_id)?;
            let report = purge_in(conn, aircraft_id)?;
            let registration = registry::delete_in(conn, aircraft_id)?;
            Ok((registration, report))
        })?;

        info!(
            "Retired aircraft {} ({} window(s), {} snapshot(s) removed)",
            registration, report.windows, report.snapshots
        );
        Ok(report)
    }
}

fn purge_in(conn: &Connection, aircraft_id: i64) -> Result<PurgeReport> {
    let windows = conn.execute(
        "DELETE FROM maintenance_window WHERE aircraft_id = ?1",
        [aircraft_id],
    )?;
    let snapshots = conn.execute(
        "DELETE FROM history_snapshot WHERE aircraft_id = ?1",
        [aircraft_id],
    )?;
    Ok(PurgeReport { windows, snapshots })
}
