//! Core record types for fleetstate.
//!
//! [`Aircraft`] is the root entity. [`MaintenanceWindow`] and
//! [`HistorySnapshot`] rows reference an aircraft by id but are stored
//! independently of it.

mod aircraft;
mod history;
mod maintenance;

pub use aircraft::{Aircraft, AircraftStatus, AircraftUpdate, NewAircraft};
pub use history::HistorySnapshot;
pub use maintenance::{MaintenanceWindow, WindowState, DEFAULT_DURATION_DAYS};

/// Treat empty or whitespace-only text as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}
