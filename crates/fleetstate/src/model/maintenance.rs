//! Maintenance windows.

use chrono::{Days, NaiveDate};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Length of a window when the caller does not give one.
pub const DEFAULT_DURATION_DAYS: i64 = 1;

/// Progress of a maintenance window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    /// Booked but not started.
    #[default]
    Scheduled,
    /// Work underway.
    InProgress,
    /// Work finished.
    Completed,
}

impl WindowState {
    /// The persisted name of this state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// The state that follows this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Scheduled => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

impl std::fmt::Display for WindowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WindowState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(Error::validation(
                "state",
                format!("unrecognized window state '{other}'"),
            )),
        }
    }
}

impl ToSql for WindowState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WindowState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: Error| FromSqlError::Other(Box::new(err)))
    }
}

/// A scheduled out-of-service period for one aircraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    /// Row id assigned by the store.
    pub id: i64,
    /// The aircraft being serviced.
    pub aircraft_id: i64,
    /// First day of the window.
    pub scheduled_date: NaiveDate,
    /// Length of the window in days, at least 1.
    pub duration_days: i64,
    /// Progress of the work.
    pub state: WindowState,
}

impl MaintenanceWindow {
    /// Last day covered by the window.
    #[must_use]
    pub fn last_day(&self) -> Option<NaiveDate> {
        let extra = u64::try_from(self.duration_days.checked_sub(1)?).ok()?;
        self.scheduled_date.checked_add_days(Days::new(extra))
    }
}
