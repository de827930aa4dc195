//! Append-only audit history of aircraft operational state.
//!
//! The ledger only ever inserts. Snapshots are written by the registry in the
//! same transaction as the change they describe.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::clock::Clock;
use crate::error::Result;
use crate::model::{Aircraft, HistorySnapshot};
use crate::registry;
use crate::storage::{decode_timestamp, encode_timestamp, Store};

const SNAPSHOT_COLUMNS: &str =
    "id, aircraft_id, status, location, commander, co_pilot, mechanic, mission, recorded_at";

/// Writer and reader of [`HistorySnapshot`] rows.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl HistoryLedger {
    /// Create a ledger over `store`, stamping snapshots with `clock`.
    #[must_use]
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Append a snapshot of `aircraft`'s committed operational attributes as
    /// of now.
    ///
    /// Only `aircraft.id` is taken from the argument. The snapshot copies the
    /// stored row, so a stale or locally edited value cannot enter the history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the aircraft no longer exists, or a
    /// storage error if the insert fails.
    pub fn record(&self, aircraft: &Aircraft) -> Result<HistorySnapshot> {
        let recorded_at = self.clock.now();
        self.store.write(|conn| {
            let committed = registry::require_in(conn, aircraft.id)?;
            self.append_in(conn, &committed, recorded_at)
        })
    }

    /// Every snapshot of one aircraft, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_for(&self, aircraft_id: i64) -> Result<Vec<HistorySnapshot>> {
        self.store.read(|conn| list_in(conn, aircraft_id))
    }

    /// The newest snapshot of one aircraft.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn latest_for(&self, aircraft_id: i64) -> Result<Option<HistorySnapshot>> {
        self.store.read(|conn| {
            let sql = format!(
                "SELECT {SNAPSHOT_COLUMNS} FROM history_snapshot
                 WHERE aircraft_id = ?1 ORDER BY recorded_at DESC, id DESC LIMIT 1"
            );
            Ok(conn
                .query_row(&sql, [aircraft_id], row_to_snapshot)
                .optional()?)
        })
    }

    /// Number of snapshots held for one aircraft.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_for(&self, aircraft_id: i64) -> Result<i64> {
        self.store.read(|conn| count_in(conn, aircraft_id))
    }

    /// Append inside the caller's unit of work.
    pub(crate) fn append_in(
        &self,
        conn: &Connection,
        aircraft: &Aircraft,
        recorded_at: DateTime<Utc>,
    ) -> Result<HistorySnapshot> {
        conn.execute(
            r"
            INSERT INTO history_snapshot
                (aircraft_id, status, location, commander, co_pilot, mechanic, mission, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                aircraft.id,
                aircraft.status,
                aircraft.current_location,
                aircraft.commander,
                aircraft.co_pilot,
                aircraft.mechanic,
                aircraft.mission,
                encode_timestamp(recorded_at),
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(
            "Recorded history snapshot {} for aircraft {} ({})",
            id, aircraft.registration, aircraft.status
        );
        Ok(HistorySnapshot {
            id,
            aircraft_id: aircraft.id,
            status: aircraft.status,
            location: aircraft.current_location.clone(),
            commander: aircraft.commander.clone(),
            co_pilot: aircraft.co_pilot.clone(),
            mechanic: aircraft.mechanic.clone(),
            mission: aircraft.mission.clone(),
            recorded_at,
        })
    }
}

/// Snapshots in append order; `id` breaks ties between equal timestamps.
pub(crate) fn list_in(conn: &Connection, aircraft_id: i64) -> Result<Vec<HistorySnapshot>> {
    let sql = format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM history_snapshot
         WHERE aircraft_id = ?1 ORDER BY recorded_at ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let snapshots = stmt
        .query_map([aircraft_id], row_to_snapshot)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(snapshots)
}

pub(crate) fn count_in(conn: &Connection, aircraft_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM history_snapshot WHERE aircraft_id = ?1",
        [aircraft_id],
        |row| row.get(0),
    )?)
}

fn row_to_snapshot(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistorySnapshot> {
    Ok(HistorySnapshot {
        id: row.get(0)?,
        aircraft_id: row.get(1)?,
        status: row.get(2)?,
        location: row.get(3)?,
        commander: row.get(4)?,
        co_pilot: row.get(5)?,
        mechanic: row.get(6)?,
        mission: row.get(7)?,
        recorded_at: decode_timestamp(row, 8)?,
    })
}
