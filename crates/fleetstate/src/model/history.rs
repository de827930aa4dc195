//! Audit snapshots of an aircraft's operational attributes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Aircraft, AircraftStatus};

/// An immutable copy of an aircraft's operational state at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Row id assigned by the store.
    pub id: i64,
    /// The aircraft this snapshot belongs to.
    pub aircraft_id: i64,
    /// Status at the time of the change.
    pub status: AircraftStatus,
    /// Location at the time of the change.
    pub location: Option<String>,
    /// Pilot in command.
    pub commander: Option<String>,
    /// Second pilot.
    pub co_pilot: Option<String>,
    /// Assigned mechanic.
    pub mechanic: Option<String>,
    /// Mission description.
    pub mission: Option<String>,
    /// When the snapshot was appended.
    pub recorded_at: DateTime<Utc>,
}

impl HistorySnapshot {
    /// True when this snapshot carries exactly the aircraft's current
    /// operational attributes.
    #[must_use]
    pub fn reflects(&self, aircraft: &Aircraft) -> bool {
        self.aircraft_id == aircraft.id
            && self.status == aircraft.status
            && self.location == aircraft.current_location
            && self.commander == aircraft.commander
            && self.co_pilot == aircraft.co_pilot
            && self.mechanic == aircraft.mechanic
            && self.mission == aircraft.mission
    }
}
