//! The aircraft record and its operational status.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::error::{Error, Result};

/// Where an aircraft stands operationally.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AircraftStatus {
    /// Airborne on a mission.
    Flying,
    /// On the ground and available.
    #[default]
    Grounded,
    /// Parked inside a hangar.
    Hangared,
    /// Out of service for maintenance.
    Maintenance,
}

impl AircraftStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Flying,
        Self::Grounded,
        Self::Hangared,
        Self::Maintenance,
    ];

    /// The persisted name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flying => "flying",
            Self::Grounded => "grounded",
            Self::Hangared => "hangared",
            Self::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for AircraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AircraftStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::validation(
                    "status",
                    format!(
                        "unrecognized status '{wanted}' (expected flying, grounded, hangared or maintenance)"
                    ),
                )
            })
    }
}

impl ToSql for AircraftStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AircraftStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: Error| FromSqlError::Other(Box::new(err)))
    }
}

/// A tracked aircraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aircraft {
    /// Row id assigned by the store.
    pub id: i64,
    /// Registration mark, unique across the fleet.
    pub registration: String,
    /// Manufacturer serial number.
    pub serial_number: Option<String>,
    /// Airframe manufacturer.
    pub manufacturer: Option<String>,
    /// Airframe model.
    pub model: Option<String>,
    /// Category, e.g. rotorcraft.
    pub category: Option<String>,
    /// Home base of operations.
    pub home_base: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Current operational status.
    pub status: AircraftStatus,
    /// Last reported location.
    pub current_location: Option<String>,
    /// Pilot in command.
    pub commander: Option<String>,
    /// Second pilot.
    pub co_pilot: Option<String>,
    /// Assigned mechanic.
    pub mechanic: Option<String>,
    /// Current mission description.
    pub mission: Option<String>,
    /// When the operational attributes last changed.
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a new aircraft.
///
/// Only the registration is required; the descriptive attributes are
/// informational and fixed once the aircraft exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAircraft {
    /// Registration mark.
    pub registration: String,
    /// Manufacturer serial number.
    pub serial_number: Option<String>,
    /// Airframe manufacturer.
    pub manufacturer: Option<String>,
    /// Airframe model.
    pub model: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Home base.
    pub home_base: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl NewAircraft {
    /// Start a registration with no descriptive attributes.
    #[must_use]
    pub fn new(registration: impl Into<String>) -> Self {
        Self {
            registration: registration.into(),
            ..Self::default()
        }
    }

    /// Set the manufacturer and model.
    #[must_use]
    pub fn airframe(mut self, manufacturer: impl Into<String>, model: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self.model = Some(model.into());
        self
    }

    /// Trim the registration and drop blank descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the registration is blank.
    pub(crate) fn normalized(self) -> Result<Self> {
        let registration = self.registration.trim().to_string();
        if registration.is_empty() {
            return Err(Error::validation("registration", "must not be empty"));
        }
        Ok(Self {
            registration,
            serial_number: non_blank(self.serial_number),
            manufacturer: non_blank(self.manufacturer),
            model: non_blank(self.model),
            category: non_blank(self.category),
            home_base: non_blank(self.home_base),
            notes: non_blank(self.notes),
        })
    }
}

/// A partial change to an aircraft's operational attributes.
///
/// `None` keeps the current value. `Some` replaces it; a blank string clears
/// the attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftUpdate {
    /// New status.
    pub status: Option<AircraftStatus>,
    /// New location.
    pub current_location: Option<String>,
    /// New pilot in command.
    pub commander: Option<String>,
    /// New second pilot.
    pub co_pilot: Option<String>,
    /// New mechanic.
    pub mechanic: Option<String>,
    /// New mission.
    pub mission: Option<String>,
}

impl AircraftUpdate {
    /// An update that only changes the status.
    #[must_use]
    pub fn status(status: AircraftStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// True when no attribute would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the present fields to `aircraft`, leaving the rest untouched.
    pub fn apply_to(&self, aircraft: &mut Aircraft) {
        if let Some(status) = self.status {
            aircraft.status = status;
        }
        let fields = [
            (&self.current_location, &mut aircraft.current_location),
            (&self.commander, &mut aircraft.commander),
            (&self.co_pilot, &mut aircraft.co_pilot),
            (&self.mechanic, &mut aircraft.mechanic),
            (&self.mission, &mut aircraft.mission),
        ];
        for (change, field) in fields {
            if change.is_some() {
                *field = non_blank(change.clone());
            }
        }
    }
}
