//! Read-side aggregation over the fleet.

use std::sync::Arc;

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::model::{Aircraft, AircraftStatus, MaintenanceWindow};
use crate::registry;
use crate::scheduler;
use crate::storage::Store;

/// Everything the fleet overview shows, taken from one consistent read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// Number of registered aircraft.
    pub total: i64,
    /// Aircraft currently `flying`.
    pub flying: i64,
    /// Aircraft currently in `maintenance`.
    pub in_maintenance: i64,
    /// The next scheduled maintenance windows.
    pub upcoming: Vec<MaintenanceWindow>,
    /// Aircraft in maintenance, by registration.
    pub maintenance_cards: Vec<Aircraft>,
}

/// Read-only queries. Every call runs in its own read transaction.
#[derive(Debug, Clone)]
pub struct FleetQuery {
    store: Arc<Store>,
}

impl FleetQuery {
    /// Create a query service over `store`.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Number of registered aircraft.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_all(&self) -> Result<i64> {
        self.store.read(|conn| registry::count_in(conn, None))
    }

    /// Number of aircraft with the given status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_by_status(&self, status: AircraftStatus) -> Result<i64> {
        self.store.read(|conn| registry::count_in(conn, Some(status)))
    }

    /// The first `limit` maintenance windows by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upcoming_maintenance(&self, limit: usize) -> Result<Vec<MaintenanceWindow>> {
        self.store.read(|conn| scheduler::upcoming_in(conn, limit))
    }

    /// Up to `limit` aircraft in maintenance, by registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn maintenance_aircraft(&self, limit: usize) -> Result<Vec<Aircraft>> {
        self.store
            .read(|conn| registry::list_in(conn, Some(AircraftStatus::Maintenance), Some(limit)))
    }

    /// All aircraft, or only those with `status`, by registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_filtered(&self, status: Option<AircraftStatus>) -> Result<Vec<Aircraft>> {
        self.store.read(|conn| registry::list_in(conn, status, None))
    }

    /// Counts and lists for the fleet overview.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn dashboard(&self, limits: &DashboardConfig) -> Result<DashboardSummary> {
        self.store.read(|conn| {
            Ok(DashboardSummary {
                total: registry::count_in(conn, None)?,
                flying: registry::count_in(conn, Some(AircraftStatus::Flying))?,
                in_maintenance: registry::count_in(conn, Some(AircraftStatus::Maintenance))?,
                upcoming: scheduler::upcoming_in(conn, limits.upcoming_limit)?,
                maintenance_cards: registry::list_in(
                    conn,
                    Some(AircraftStatus::Maintenance),
                    Some(limits.maintenance_cards),
                )?,
            })
        })
    }
}
