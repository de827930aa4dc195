//! The canonical set of aircraft records.
//!
//! Every operational change goes through [`AircraftRegistry::apply_update`]
//! (or [`AircraftRegistry::force_status`]), which writes the new state and its
//! history snapshot in one transaction.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::ledger::{self, HistoryLedger};
use crate::model::{Aircraft, AircraftStatus, AircraftUpdate, NewAircraft};
use crate::storage::{decode_timestamp, encode_timestamp, sql_limit, Store};

const AIRCRAFT_COLUMNS: &str = "id, registration, serial_number, manufacturer, model, category, \
     home_base, notes, status, current_location, commander, co_pilot, mechanic, mission, updated_at";

/// Owner of [`Aircraft`] records.
#[derive(Debug, Clone)]
pub struct AircraftRegistry {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    ledger: HistoryLedger,
}

impl AircraftRegistry {
    /// Create a registry over `store`, stamping changes with `clock`.
    #[must_use]
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        let ledger = HistoryLedger::new(store.clone(), clock.clone());
        Self {
            store,
            clock,
            ledger,
        }
    }

    /// Register a new aircraft.
    ///
    /// The aircraft starts `grounded` with no operational attributes. No
    /// history snapshot is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank registration and
    /// [`Error::Conflict`] if the registration is already taken.
    pub fn create(&self, input: NewAircraft) -> Result<Aircraft> {
        let input = input.normalized()?;
        let now = self.clock.now();

        let aircraft = self.store.write(|conn| {
            if find_by_registration_in(conn, &input.registration)?.is_some() {
                return Err(duplicate(&input.registration));
            }

            conn.execute(
                r"
                INSERT INTO aircraft
                    (registration, serial_number, manufacturer, model, category,
                     home_base, notes, status, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ",
                params![
                    input.registration,
                    input.serial_number,
                    input.manufacturer,
                    input.model,
                    input.category,
                    input.home_base,
                    input.notes,
                    AircraftStatus::default(),
                    encode_timestamp(now),
                ],
            )
            .map_err(|e| Error::from_insert(e, duplicate_message(&input.registration)))?;

            Ok(Aircraft {
                id: conn.last_insert_rowid(),
                registration: input.registration.clone(),
                serial_number: input.serial_number.clone(),
                manufacturer: input.manufacturer.clone(),
                model: input.model.clone(),
                category: input.category.clone(),
                home_base: input.home_base.clone(),
                notes: input.notes.clone(),
                status: AircraftStatus::default(),
                current_location: None,
                commander: None,
                co_pilot: None,
                mechanic: None,
                mission: None,
                updated_at: now,
            })
        })?;

        info!(
            "Registered aircraft {} with id {}",
            aircraft.registration, aircraft.id
        );
        Ok(aircraft)
    }

    /// Change some operational attributes and record the result.
    ///
    /// Attributes absent from `update` keep their value. A snapshot is always
    /// appended, even when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` is unknown, or a storage error if
    /// either the update or the snapshot could not be written; in that case
    /// neither is committed.
    pub fn apply_update(&self, id: i64, update: &AircraftUpdate) -> Result<Aircraft> {
        let aircraft = self
            .store
            .write(|conn| self.apply_update_in(conn, id, update))?;
        info!(
            "Updated aircraft {}: status {}",
            aircraft.registration, aircraft.status
        );
        Ok(aircraft)
    }

    /// Set only the status, recording a snapshot like any other update.
    ///
    /// # Errors
    ///
    /// Same as [`AircraftRegistry::apply_update`].
    pub fn force_status(&self, id: i64, status: AircraftStatus) -> Result<Aircraft> {
        self.apply_update(id, &AircraftUpdate::status(status))
    }

    /// Remove an aircraft that has no maintenance windows or history left.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` is unknown and [`Error::Conflict`]
    /// while dependent records still reference it.
    pub fn delete(&self, id: i64) -> Result<()> {
        let registration = self.store.write(|conn| delete_in(conn, id))?;
        info!("Deleted aircraft {registration} (id {id})");
        Ok(())
    }

    /// Look up an aircraft by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` is unknown.
    pub fn get(&self, id: i64) -> Result<Aircraft> {
        self.store.read(|conn| require_in(conn, id))
    }

    /// Look up an aircraft by registration mark.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no aircraft carries `registration`.
    pub fn get_by_registration(&self, registration: &str) -> Result<Aircraft> {
        let registration = registration.trim();
        self.store
            .read(|conn| find_by_registration_in(conn, registration))?
            .ok_or_else(|| Error::not_found_key("aircraft", registration))
    }

    /// All aircraft, optionally only those in `status`, by registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self, status: Option<AircraftStatus>) -> Result<Vec<Aircraft>> {
        self.store.read(|conn| list_in(conn, status, None))
    }

    /// Apply `update` inside the caller's unit of work.
    pub(crate) fn apply_update_in(
        &self,
        conn: &Connection,
        id: i64,
        update: &AircraftUpdate,
    ) -> Result<Aircraft> {
        let mut aircraft = require_in(conn, id)?;
        if update.is_empty() {
            debug!(
                "Empty update for aircraft {}; recording its current state",
                aircraft.registration
            );
        }
        update.apply_to(&mut aircraft);
        aircraft.updated_at = self.clock.now();

        conn.execute(
            r"
            UPDATE aircraft SET
                status = ?1, current_location = ?2, commander = ?3,
                co_pilot = ?4, mechanic = ?5, mission = ?6, updated_at = ?7
            WHERE id = ?8
            ",
            params![
                aircraft.status,
                aircraft.current_location,
                aircraft.commander,
                aircraft.co_pilot,
                aircraft.mechanic,
                aircraft.mission,
                encode_timestamp(aircraft.updated_at),
                aircraft.id,
            ],
        )?;
        self.ledger.append_in(conn, &aircraft, aircraft.updated_at)?;

        Ok(aircraft)
    }
}

/// Guarded delete inside the caller's unit of work; returns the registration.
pub(crate) fn delete_in(conn: &Connection, id: i64) -> Result<String> {
    let aircraft = require_in(conn, id)?;

    let windows: i64 = conn.query_row(
        "SELECT COUNT(*) FROM maintenance_window WHERE aircraft_id = ?1",
        [id],
        |row| row.get(0),
    )?;
    let snapshots = ledger::count_in(conn, id)?;
    if windows > 0 || snapshots > 0 {
        debug!(
            "Refusing to delete aircraft {}: {} windows, {} snapshots",
            aircraft.registration, windows, snapshots
        );
        return Err(Error::conflict(format!(
            "aircraft {} still has {windows} maintenance window(s) and {snapshots} history snapshot(s)",
            aircraft.registration
        )));
    }

    conn.execute("DELETE FROM aircraft WHERE id = ?1", [id])?;
    Ok(aircraft.registration)
}

fn duplicate_message(registration: &str) -> String {
    format!("registration {registration} already exists")
}

fn duplicate(registration: &str) -> Error {
    Error::conflict(duplicate_message(registration))
}

pub(crate) fn find_in(conn: &Connection, id: i64) -> Result<Option<Aircraft>> {
    let sql = format!("SELECT {AIRCRAFT_COLUMNS} FROM aircraft WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], row_to_aircraft).optional()?)
}

pub(crate) fn require_in(conn: &Connection, id: i64) -> Result<Aircraft> {
    find_in(conn, id)?.ok_or_else(|| Error::not_found("aircraft", id))
}

fn find_by_registration_in(conn: &Connection, registration: &str) -> Result<Option<Aircraft>> {
    let sql = format!("SELECT {AIRCRAFT_COLUMNS} FROM aircraft WHERE registration = ?1");
    Ok(conn
        .query_row(&sql, [registration], row_to_aircraft)
        .optional()?)
}

/// Aircraft ordered by registration, optionally filtered and bounded.
pub(crate) fn list_in(
    conn: &Connection,
    status: Option<AircraftStatus>,
    limit: Option<usize>,
) -> Result<Vec<Aircraft>> {
    let limit = limit.map_or(-1, sql_limit);
    let sql = format!(
        "SELECT {AIRCRAFT_COLUMNS} FROM aircraft
         WHERE ?1 IS NULL OR status = ?1
         ORDER BY registration ASC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let aircraft = stmt
        .query_map(params![status, limit], row_to_aircraft)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(aircraft)
}

pub(crate) fn count_in(conn: &Connection, status: Option<AircraftStatus>) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM aircraft WHERE ?1 IS NULL OR status = ?1",
        [status],
        |row| row.get(0),
    )?)
}

fn row_to_aircraft(row: &rusqlite::Row<'_>) -> rusqlite::Result<Aircraft> {
    Ok(Aircraft {
        id: row.get(0)?,
        registration: row.get(1)?,
        serial_number: row.get(2)?,
        manufacturer: row.get(3)?,
        model: row.get(4)?,
        category: row.get(5)?,
        home_base: row.get(6)?,
        notes: row.get(7)?,
        status: row.get(8)?,
        current_location: row.get(9)?,
        commander: row.get(10)?,
        co_pilot: row.get(11)?,
        mechanic: row.get(12)?,
        mission: row.get(13)?,
        updated_at: decode_timestamp(row, 14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone, Utc};

    struct Harness {
        store: Arc<Store>,
        clock: Arc<ManualClock>,
        registry: AircraftRegistry,
        ledger: HistoryLedger,
    }

    fn harness() -> Harness {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        ));
        let registry = AircraftRegistry::new(store.clone(), clock.clone());
        let ledger = HistoryLedger::new(store.clone(), clock.clone());
        Harness {
            store,
            clock,
            registry,
            ledger,
        }
    }

    fn flying_update() -> AircraftUpdate {
        AircraftUpdate {
            status: Some(AircraftStatus::Flying),
            current_location: Some("Surucucu".to_string()),
            commander: Some("Carlos".to_string()),
            ..AircraftUpdate::default()
        }
    }

    #[test]
    fn test_create_defaults() {
        let h = harness();
        let mut input = NewAircraft::new("PP-ECE").airframe("Helibras", "AS 350 BA");
        input.home_base = Some("Boa Vista".to_string());

        let aircraft = h.registry.create(input).unwrap();

        assert_eq!(aircraft.registration, "PP-ECE");
        assert_eq!(aircraft.status, AircraftStatus::Grounded);
        assert_eq!(aircraft.home_base.as_deref(), Some("Boa Vista"));
        assert!(aircraft.current_location.is_none());
        assert!(aircraft.commander.is_none());
        assert_eq!(aircraft.updated_at, h.clock.now());
        assert_eq!(h.registry.get(aircraft.id).unwrap(), aircraft);
    }

    #[test]
    fn test_create_writes_no_history() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        assert_eq!(h.ledger.count_for(aircraft.id).unwrap(), 0);
    }

    #[test]
    fn test_create_duplicate_registration() {
        let h = harness();
        h.registry.create(NewAircraft::new("PP-ECE")).unwrap();

        let err = h.registry.create(NewAircraft::new("PP-ECE")).unwrap_err();
        assert!(err.is_conflict());

        // Surrounding whitespace does not make a new registration.
        let err = h.registry.create(NewAircraft::new(" PP-ECE ")).unwrap_err();
        assert!(err.is_conflict());

        assert_eq!(h.registry.list(None).unwrap().len(), 1);
    }

    #[test]
    fn test_create_empty_registration() {
        let h = harness();
        let err = h.registry.create(NewAircraft::new("")).unwrap_err();
        assert!(err.is_validation());
        assert!(h.registry.list(None).unwrap().is_empty());
    }

    #[test]
    fn test_apply_update_records_snapshot() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        h.clock.advance(Duration::minutes(10));

        let updated = h.registry.apply_update(aircraft.id, &flying_update()).unwrap();

        assert_eq!(updated.status, AircraftStatus::Flying);
        assert_eq!(updated.current_location.as_deref(), Some("Surucucu"));
        assert_eq!(updated.updated_at, h.clock.now());

        let history = h.ledger.list_for(aircraft.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].location.as_deref(), Some("Surucucu"));
        assert!(history[0].reflects(&updated));
        assert_eq!(history[0].recorded_at, updated.updated_at);
    }

    #[test]
    fn test_apply_update_is_partial() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        h.registry.apply_update(aircraft.id, &flying_update()).unwrap();

        let update = AircraftUpdate {
            mission: Some("Cestas SWUQ".to_string()),
            ..AircraftUpdate::default()
        };
        let updated = h.registry.apply_update(aircraft.id, &update).unwrap();

        assert_eq!(updated.status, AircraftStatus::Flying);
        assert_eq!(updated.current_location.as_deref(), Some("Surucucu"));
        assert_eq!(updated.commander.as_deref(), Some("Carlos"));
        assert_eq!(updated.mission.as_deref(), Some("Cestas SWUQ"));
        assert_eq!(h.registry.get(aircraft.id).unwrap(), updated);
    }

    #[test]
    fn test_every_update_adds_exactly_one_snapshot() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();

        let updates = [
            flying_update(),
            AircraftUpdate::default(),
            AircraftUpdate::status(AircraftStatus::Hangared),
        ];
        for (i, update) in updates.iter().enumerate() {
            h.clock.advance(Duration::seconds(1));
            let updated = h.registry.apply_update(aircraft.id, update).unwrap();
            let history = h.ledger.list_for(aircraft.id).unwrap();
            assert_eq!(history.len(), i + 1);
            assert!(history.last().unwrap().reflects(&updated));
        }
    }

    #[test]
    fn test_apply_update_unknown_aircraft() {
        let h = harness();
        let err = h.registry.apply_update(404, &flying_update()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(h.store.stats().unwrap().history_snapshots, 0);
    }

    #[test]
    fn test_apply_update_rolls_back_without_history() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        h.store
            .write(|conn| {
                conn.execute_batch("DROP TABLE history_snapshot")?;
                Ok(())
            })
            .unwrap();

        let err = h.registry.apply_update(aircraft.id, &flying_update()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Storage);

        let unchanged = h.registry.get(aircraft.id).unwrap();
        assert_eq!(unchanged, aircraft);
    }

    #[test]
    fn test_force_status_records_snapshot() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        h.registry.apply_update(aircraft.id, &flying_update()).unwrap();

        let forced = h
            .registry
            .force_status(aircraft.id, AircraftStatus::Maintenance)
            .unwrap();

        assert_eq!(forced.status, AircraftStatus::Maintenance);
        assert_eq!(forced.commander.as_deref(), Some("Carlos"));
        let latest = h.ledger.latest_for(aircraft.id).unwrap().unwrap();
        assert_eq!(latest.status, AircraftStatus::Maintenance);
        assert_eq!(h.ledger.count_for(aircraft.id).unwrap(), 2);
    }

    #[test]
    fn test_get_missing() {
        let h = harness();
        assert!(h.registry.get(1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_by_registration() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PT-HLP")).unwrap();

        assert_eq!(h.registry.get_by_registration("PT-HLP").unwrap(), aircraft);
        assert_eq!(h.registry.get_by_registration(" PT-HLP ").unwrap(), aircraft);
        assert!(h
            .registry
            .get_by_registration("PR-XYZ")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_list_ordered_and_filtered() {
        let h = harness();
        let c = h.registry.create(NewAircraft::new("PT-HLP")).unwrap();
        h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        h.registry.create(NewAircraft::new("PS-AMB")).unwrap();
        h.registry.force_status(c.id, AircraftStatus::Flying).unwrap();

        let all: Vec<_> = h
            .registry
            .list(None)
            .unwrap()
            .into_iter()
            .map(|a| a.registration)
            .collect();
        assert_eq!(all, vec!["PP-ECE", "PS-AMB", "PT-HLP"]);

        let grounded: Vec<_> = h
            .registry
            .list(Some(AircraftStatus::Grounded))
            .unwrap()
            .into_iter()
            .map(|a| a.registration)
            .collect();
        assert_eq!(grounded, vec!["PP-ECE", "PS-AMB"]);

        assert!(h
            .registry
            .list(Some(AircraftStatus::Maintenance))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_delete_without_dependents() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();

        h.registry.delete(aircraft.id).unwrap();

        assert!(h.registry.get(aircraft.id).unwrap_err().is_not_found());
        // The registration is free again.
        h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
    }

    #[test]
    fn test_delete_with_history_conflicts() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        h.registry.apply_update(aircraft.id, &flying_update()).unwrap();

        let err = h.registry.delete(aircraft.id).unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("1 history snapshot"));
        assert!(h.registry.get(aircraft.id).is_ok());
    }

    #[test]
    fn test_delete_missing() {
        let h = harness();
        assert!(h.registry.delete(7).unwrap_err().is_not_found());
    }

    #[test]
    fn test_count_in() {
        let h = harness();
        let a = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        h.registry.create(NewAircraft::new("PT-HLP")).unwrap();
        h.registry.force_status(a.id, AircraftStatus::Flying).unwrap();

        let (total, flying) = h
            .store
            .read(|conn| {
                Ok((
                    count_in(conn, None)?,
                    count_in(conn, Some(AircraftStatus::Flying))?,
                ))
            })
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(flying, 1);
    }
}
