//! Maintenance windows and their effect on aircraft status.
//!
//! Scheduling a window puts the aircraft into `maintenance`. The window
//! insert and the status change (with its history snapshot) share one
//! transaction.

use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{
    AircraftStatus, AircraftUpdate, MaintenanceWindow, WindowState, DEFAULT_DURATION_DAYS,
};
use crate::registry::{self, AircraftRegistry};
use crate::storage::{decode_date, encode_date, parse_date, sql_limit, Store};

const WINDOW_COLUMNS: &str = "id, aircraft_id, scheduled_date, duration_days, state";

/// A maintenance booking decoded from raw text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRequest {
    /// The aircraft to service.
    pub aircraft_id: i64,
    /// First day of the window.
    pub date: NaiveDate,
    /// Length in days.
    pub duration_days: i64,
}

impl ScheduleRequest {
    /// Decode a request from form-style text.
    ///
    /// `date` must be `YYYY-MM-DD`. A missing or blank `duration` means one
    /// day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the date is not a real calendar date
    /// or the duration is not a whole number of at least 1.
    pub fn parse(aircraft_id: i64, date: &str, duration: Option<&str>) -> Result<Self> {
        let date = parse_date(date).ok_or_else(|| {
            Error::validation(
                "scheduled_date",
                format!("'{}' is not a calendar date (expected YYYY-MM-DD)", date.trim()),
            )
        })?;

        let duration_days = match duration.map(str::trim).filter(|d| !d.is_empty()) {
            None => DEFAULT_DURATION_DAYS,
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                Error::validation("duration_days", format!("'{raw}' is not a whole number"))
            })?,
        };
        validate_duration(duration_days)?;

        Ok(Self {
            aircraft_id,
            date,
            duration_days,
        })
    }
}

fn validate_duration(duration_days: i64) -> Result<()> {
    if duration_days < 1 {
        return Err(Error::validation(
            "duration_days",
            format!("must be at least 1, got {duration_days}"),
        ));
    }
    Ok(())
}

/// Owner of [`MaintenanceWindow`] records.
#[derive(Debug, Clone)]
pub struct MaintenanceScheduler {
    store: Arc<Store>,
    registry: AircraftRegistry,
}

impl MaintenanceScheduler {
    /// Create a scheduler that drives status changes through `registry`.
    #[must_use]
    pub fn new(store: Arc<Store>, registry: AircraftRegistry) -> Self {
        Self { store, registry }
    }

    /// Book a window and put the aircraft into maintenance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `duration_days < 1`,
    /// [`Error::NotFound`] if the aircraft is unknown, or a storage error.
    /// On any error neither the window nor the status change is committed.
    pub fn schedule(
        &self,
        aircraft_id: i64,
        date: NaiveDate,
        duration_days: i64,
    ) -> Result<MaintenanceWindow> {
        validate_duration(duration_days)?;

        let (window, registration) = self.store.write(|conn| {
            let window = insert_window(conn, aircraft_id, date, duration_days)?;
            let aircraft = self.registry.apply_update_in(
                conn,
                aircraft_id,
                &AircraftUpdate::status(AircraftStatus::Maintenance),
            )?;
            Ok((window, aircraft.registration))
        })?;

        info!(
            "Scheduled maintenance window {} for aircraft {} on {} ({} day(s))",
            window.id, registration, window.scheduled_date, window.duration_days
        );
        Ok(window)
    }

    /// Book a window from a decoded [`ScheduleRequest`].
    ///
    /// # Errors
    ///
    /// Same as [`MaintenanceScheduler::schedule`].
    pub fn submit(&self, request: &ScheduleRequest) -> Result<MaintenanceWindow> {
        self.schedule(request.aircraft_id, request.date, request.duration_days)
    }

    /// The first `limit` windows by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_upcoming(&self, limit: usize) -> Result<Vec<MaintenanceWindow>> {
        self.store.read(|conn| upcoming_in(conn, limit))
    }

    /// Every window booked for one aircraft, by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn windows_for(&self, aircraft_id: i64) -> Result<Vec<MaintenanceWindow>> {
        self.store.read(|conn| {
            let sql = format!(
                "SELECT {WINDOW_COLUMNS} FROM maintenance_window
                 WHERE aircraft_id = ?1 ORDER BY scheduled_date ASC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let windows = stmt
                .query_map([aircraft_id], row_to_window)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(windows)
        })
    }

    /// Look up a window by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `window_id` is unknown.
    pub fn get(&self, window_id: i64) -> Result<MaintenanceWindow> {
        self.store.read(|conn| require_window(conn, window_id))
    }

    /// Move a window one step along `scheduled -> in_progress -> completed`.
    ///
    /// The aircraft's status is left alone; returning it to service is an
    /// explicit update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `window_id` is unknown and
    /// [`Error::Validation`] if the window is already completed.
    pub fn advance(&self, window_id: i64) -> Result<MaintenanceWindow> {
        let window = self.store.write(|conn| {
            let mut window = require_window(conn, window_id)?;
            let next = window.state.next().ok_or_else(|| {
                Error::validation(
                    "state",
                    format!("maintenance window {window_id} is already completed"),
                )
            })?;
            conn.execute(
                "UPDATE maintenance_window SET state = ?1 WHERE id = ?2",
                params![next, window_id],
            )?;
            window.state = next;
            Ok(window)
        })?;

        info!("Maintenance window {} is now {}", window.id, window.state);
        Ok(window)
    }
}

fn insert_window(
    conn: &Connection,
    aircraft_id: i64,
    date: NaiveDate,
    duration_days: i64,
) -> Result<MaintenanceWindow> {
    registry::require_in(conn, aircraft_id)?;

    let state = WindowState::default();
    conn.execute(
        r"
        INSERT INTO maintenance_window (aircraft_id, scheduled_date, duration_days, state)
        VALUES (?1, ?2, ?3, ?4)
        ",
        params![aircraft_id, encode_date(date), duration_days, state],
    )?;

    Ok(MaintenanceWindow {
        id: conn.last_insert_rowid(),
        aircraft_id,
        scheduled_date: date,
        duration_days,
        state,
    })
}

fn require_window(conn: &Connection, window_id: i64) -> Result<MaintenanceWindow> {
    let sql = format!("SELECT {WINDOW_COLUMNS} FROM maintenance_window WHERE id = ?1");
    conn.query_row(&sql, [window_id], row_to_window)
        .optional()?
        .ok_or_else(|| Error::not_found("maintenance window", window_id))
}

/// Windows by date, ties broken by booking order.
pub(crate) fn upcoming_in(conn: &Connection, limit: usize) -> Result<Vec<MaintenanceWindow>> {
    let sql = format!(
        "SELECT {WINDOW_COLUMNS} FROM maintenance_window
         ORDER BY scheduled_date ASC, id ASC LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let windows = stmt
        .query_map([sql_limit(limit)], row_to_window)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(windows)
}

fn row_to_window(row: &rusqlite::Row<'_>) -> rusqlite::Result<MaintenanceWindow> {
    Ok(MaintenanceWindow {
        id: row.get(0)?,
        aircraft_id: row.get(1)?,
        scheduled_date: decode_date(row, 2)?,
        duration_days: row.get(3)?,
        state: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::ledger::HistoryLedger;
    use crate::model::NewAircraft;
    use chrono::{TimeZone, Utc};

    struct Harness {
        store: Arc<Store>,
        registry: AircraftRegistry,
        ledger: HistoryLedger,
        scheduler: MaintenanceScheduler,
    }

    fn harness() -> Harness {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap(),
        ));
        let registry = AircraftRegistry::new(store.clone(), clock.clone());
        let ledger = HistoryLedger::new(store.clone(), clock);
        let scheduler = MaintenanceScheduler::new(store.clone(), registry.clone());
        Harness {
            store,
            registry,
            ledger,
            scheduler,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_schedule_forces_maintenance() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        h.registry
            .force_status(aircraft.id, AircraftStatus::Flying)
            .unwrap();

        let window = h
            .scheduler
            .schedule(aircraft.id, date(2024, 5, 1), 3)
            .unwrap();

        assert_eq!(window.aircraft_id, aircraft.id);
        assert_eq!(window.scheduled_date, date(2024, 5, 1));
        assert_eq!(window.duration_days, 3);
        assert_eq!(window.state, WindowState::Scheduled);

        let aircraft = h.registry.get(aircraft.id).unwrap();
        assert_eq!(aircraft.status, AircraftStatus::Maintenance);

        let history = h.ledger.list_for(aircraft.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].status, AircraftStatus::Maintenance);
        assert!(history[1].reflects(&aircraft));
    }

    #[test]
    fn test_schedule_rejects_short_duration() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();

        for days in [0, -2] {
            let err = h
                .scheduler
                .schedule(aircraft.id, date(2024, 5, 1), days)
                .unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(
            h.registry.get(aircraft.id).unwrap().status,
            AircraftStatus::Grounded
        );
        assert!(h.scheduler.windows_for(aircraft.id).unwrap().is_empty());
    }

    #[test]
    fn test_schedule_unknown_aircraft() {
        let h = harness();
        let err = h.scheduler.schedule(99, date(2024, 5, 1), 1).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(h.store.stats().unwrap().maintenance_windows, 0);
    }

    #[test]
    fn test_schedule_is_atomic() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        h.store
            .write(|conn| {
                conn.execute_batch("DROP TABLE history_snapshot")?;
                Ok(())
            })
            .unwrap();

        let err = h
            .scheduler
            .schedule(aircraft.id, date(2024, 5, 1), 3)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Storage);

        assert!(h.scheduler.list_upcoming(10).unwrap().is_empty());
        assert_eq!(
            h.registry.get(aircraft.id).unwrap().status,
            AircraftStatus::Grounded
        );
    }

    #[test]
    fn test_list_upcoming_ordered_and_bounded() {
        let h = harness();
        let a = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        let b = h.registry.create(NewAircraft::new("PT-HLP")).unwrap();

        h.scheduler.schedule(a.id, date(2024, 6, 10), 1).unwrap();
        h.scheduler.schedule(b.id, date(2024, 5, 2), 2).unwrap();
        h.scheduler.schedule(a.id, date(2024, 5, 20), 1).unwrap();

        let upcoming = h.scheduler.list_upcoming(2).unwrap();
        let dates: Vec<_> = upcoming.iter().map(|w| w.scheduled_date).collect();
        assert_eq!(dates, vec![date(2024, 5, 2), date(2024, 5, 20)]);

        assert_eq!(h.scheduler.list_upcoming(10).unwrap().len(), 3);
        assert!(h.scheduler.list_upcoming(0).unwrap().is_empty());
    }

    #[test]
    fn test_windows_for_aircraft() {
        let h = harness();
        let a = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        let b = h.registry.create(NewAircraft::new("PT-HLP")).unwrap();
        h.scheduler.schedule(a.id, date(2024, 7, 1), 1).unwrap();
        h.scheduler.schedule(a.id, date(2024, 5, 1), 1).unwrap();
        h.scheduler.schedule(b.id, date(2024, 6, 1), 1).unwrap();

        let windows = h.scheduler.windows_for(a.id).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].scheduled_date, date(2024, 5, 1));
        assert!(windows.iter().all(|w| w.aircraft_id == a.id));
    }

    #[test]
    fn test_advance_walks_states() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        let window = h
            .scheduler
            .schedule(aircraft.id, date(2024, 5, 1), 2)
            .unwrap();

        assert_eq!(
            h.scheduler.advance(window.id).unwrap().state,
            WindowState::InProgress
        );
        assert_eq!(
            h.scheduler.advance(window.id).unwrap().state,
            WindowState::Completed
        );
        assert_eq!(h.scheduler.get(window.id).unwrap().state, WindowState::Completed);

        let err = h.scheduler.advance(window.id).unwrap_err();
        assert!(err.is_validation());

        // Completion does not return the aircraft to service.
        assert_eq!(
            h.registry.get(aircraft.id).unwrap().status,
            AircraftStatus::Maintenance
        );
    }

    #[test]
    fn test_advance_unknown_window() {
        let h = harness();
        assert!(h.scheduler.advance(5).unwrap_err().is_not_found());
        assert!(h.scheduler.get(5).unwrap_err().is_not_found());
    }

    #[test]
    fn test_parse_request() {
        let request = ScheduleRequest::parse(3, "2024-05-01", Some("3")).unwrap();
        assert_eq!(request.aircraft_id, 3);
        assert_eq!(request.date, date(2024, 5, 1));
        assert_eq!(request.duration_days, 3);
    }

    #[test]
    fn test_parse_request_default_duration() {
        let request = ScheduleRequest::parse(3, "2024-05-01", None).unwrap();
        assert_eq!(request.duration_days, DEFAULT_DURATION_DAYS);

        let request = ScheduleRequest::parse(3, "2024-05-01", Some("  ")).unwrap();
        assert_eq!(request.duration_days, 1);
    }

    #[test]
    fn test_parse_request_rejects_bad_input() {
        let err = ScheduleRequest::parse(3, "2024-13-01", None).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("scheduled_date"));

        assert!(ScheduleRequest::parse(3, "01/05/2024", None)
            .unwrap_err()
            .is_validation());
        assert!(ScheduleRequest::parse(3, "2024-05-01", Some("three"))
            .unwrap_err()
            .is_validation());
        assert!(ScheduleRequest::parse(3, "2024-05-01", Some("0"))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_submit_request() {
        let h = harness();
        let aircraft = h.registry.create(NewAircraft::new("PP-ECE")).unwrap();
        let request = ScheduleRequest::parse(aircraft.id, "2024-05-01", Some("3")).unwrap();

        let window = h.scheduler.submit(&request).unwrap();
        assert_eq!(window.duration_days, 3);
        assert_eq!(
            h.registry.get(aircraft.id).unwrap().status,
            AircraftStatus::Maintenance
        );
    }
}
