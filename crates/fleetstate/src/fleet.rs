//! One handle over every fleet component.
//!
//! [`Fleet`] wires a single [`Store`] and [`Clock`] into the registry,
//! ledger, scheduler, query service and retirement. It is cheap to clone and
//! safe to share between threads; all components see the same database.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::ledger::HistoryLedger;
use crate::query::FleetQuery;
use crate::registry::AircraftRegistry;
use crate::retirement::Retirement;
use crate::scheduler::MaintenanceScheduler;
use crate::storage::Store;

/// The fleet state-tracking core.
#[derive(Debug, Clone)]
pub struct Fleet {
    store: Arc<Store>,
    registry: AircraftRegistry,
    ledger: HistoryLedger,
    scheduler: MaintenanceScheduler,
    query: FleetQuery,
    retirement: Retirement,
}

impl Fleet {
    /// Open the database named by `config`, using the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &Config) -> Result<Self> {
        let store = Store::from_config(config)?;
        Ok(Self::new(Arc::new(store)))
    }

    /// A fleet backed by a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Arc::new(Store::open_in_memory()?)))
    }

    /// Wire components over `store` with the system clock.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Wire components over `store`, stamping changes with `clock`.
    #[must_use]
    pub fn with_clock(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        let registry = AircraftRegistry::new(store.clone(), clock.clone());
        Self {
            ledger: HistoryLedger::new(store.clone(), clock),
            scheduler: MaintenanceScheduler::new(store.clone(), registry.clone()),
            query: FleetQuery::new(store.clone()),
            retirement: Retirement::new(store.clone()),
            registry,
            store,
        }
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Aircraft records.
    #[must_use]
    pub fn registry(&self) -> &AircraftRegistry {
        &self.registry
    }

    /// Audit history.
    #[must_use]
    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    /// Maintenance windows.
    #[must_use]
    pub fn scheduler(&self) -> &MaintenanceScheduler {
        &self.scheduler
    }

    /// Read-side aggregation.
    #[must_use]
    pub fn query(&self) -> &FleetQuery {
        &self.query
    }

    /// Cascading removal.
    #[must_use]
    pub fn retirement(&self) -> &Retirement {
        &self.retirement
    }
}
