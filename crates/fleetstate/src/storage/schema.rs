//! `SQLite` schema definitions for fleetstate.
//!
//! Dependent tables reference `aircraft` without `ON DELETE CASCADE`;
//! removing an aircraft that still has windows or snapshots fails.

/// SQL statement to create the aircraft table.
pub const CREATE_AIRCRAFT_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS aircraft (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    registration TEXT NOT NULL UNIQUE CHECK (length(trim(registration)) > 0),
    serial_number TEXT,
    manufacturer TEXT,
    model TEXT,
    category TEXT,
    home_base TEXT,
    notes TEXT,
    status TEXT NOT NULL DEFAULT 'grounded'
        CHECK (status IN ('flying', 'grounded', 'hangared', 'maintenance')),
    current_location TEXT,
    commander TEXT,
    co_pilot TEXT,
    mechanic TEXT,
    mission TEXT,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create an index on status for filtered listings and counts.
pub const CREATE_AIRCRAFT_STATUS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_aircraft_status ON aircraft(status, registration)
";

/// SQL statement to create the maintenance window table.
pub const CREATE_MAINTENANCE_WINDOW_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS maintenance_window (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    aircraft_id INTEGER NOT NULL REFERENCES aircraft(id),
    scheduled_date TEXT NOT NULL,
    duration_days INTEGER NOT NULL DEFAULT 1 CHECK (duration_days >= 1),
    state TEXT NOT NULL DEFAULT 'scheduled'
        CHECK (state IN ('scheduled', 'in_progress', 'completed'))
)
";

/// SQL statement to create an index on the window date for upcoming queries.
pub const CREATE_WINDOW_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_window_date ON maintenance_window(scheduled_date)
";

/// SQL statement to create an index on the owning aircraft of a window.
pub const CREATE_WINDOW_AIRCRAFT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_window_aircraft ON maintenance_window(aircraft_id)
";

/// SQL statement to create the history snapshot table.
pub const CREATE_HISTORY_SNAPSHOT_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS history_snapshot (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    aircraft_id INTEGER NOT NULL REFERENCES aircraft(id),
    status TEXT NOT NULL
        CHECK (status IN ('flying', 'grounded', 'hangared', 'maintenance')),
    location TEXT,
    commander TEXT,
    co_pilot TEXT,
    mechanic TEXT,
    mission TEXT,
    recorded_at TEXT NOT NULL
)
";

/// SQL statement to create an index for per-aircraft history in time order.
pub const CREATE_HISTORY_TIME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_history_aircraft_time
    ON history_snapshot(aircraft_id, recorded_at)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Statements making up schema version 1, in order.
pub const SCHEMA_V1: &[&str] = &[
    CREATE_AIRCRAFT_TABLE,
    CREATE_AIRCRAFT_STATUS_INDEX,
    CREATE_MAINTENANCE_WINDOW_TABLE,
    CREATE_WINDOW_DATE_INDEX,
    CREATE_WINDOW_AIRCRAFT_INDEX,
    CREATE_HISTORY_SNAPSHOT_TABLE,
    CREATE_HISTORY_TIME_INDEX,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_V1.is_empty());
        for stmt in SCHEMA_V1 {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_aircraft_table_constraints() {
        assert!(CREATE_AIRCRAFT_TABLE.contains("registration TEXT NOT NULL UNIQUE"));
        assert!(CREATE_AIRCRAFT_TABLE.contains("DEFAULT 'grounded'"));
        assert!(CREATE_AIRCRAFT_TABLE.contains("updated_at TEXT NOT NULL"));
    }

    #[test]
    fn test_dependents_do_not_cascade() {
        assert!(CREATE_MAINTENANCE_WINDOW_TABLE.contains("REFERENCES aircraft(id)"));
        assert!(CREATE_HISTORY_SNAPSHOT_TABLE.contains("REFERENCES aircraft(id)"));
        for stmt in SCHEMA_V1 {
            assert!(!stmt.contains("CASCADE"));
        }
    }

    #[test]
    fn test_window_duration_check() {
        assert!(CREATE_MAINTENANCE_WINDOW_TABLE.contains("CHECK (duration_days >= 1)"));
    }
}
