//! Sequential unlock policy.
//!
//! Status is never trusted on its own: it is recomputed from the completed list
//! and list order after every mutation. Each location is `completed` iff its id
//! is in the completed list, the first non-completed location in list order is
//! `available`, and every other non-completed location is `locked`.

use crate::hunt::errors::HuntError;
use crate::hunt::types::{Location, LocationStatus};

/// Recompute every status in place from `completed_ids`.
pub fn derive_statuses(locations: &mut [Location], completed_ids: &[String]) {
    let mut available_assigned = false;
    for location in locations.iter_mut() {
        location.status = if completed_ids.iter().any(|id| *id == location.id) {
            LocationStatus::Completed
        } else if !available_assigned {
            available_assigned = true;
            LocationStatus::Available
        } else {
            LocationStatus::Locked
        };
    }
}

/// First location currently open for play, if any remain.
pub fn next_available(locations: &[Location]) -> Option<&Location> {
    locations.iter().find(|l| l.is_available())
}

pub fn find_location<'a>(locations: &'a [Location], location_id: &str) -> Option<&'a Location> {
    locations.iter().find(|l| l.id == location_id)
}

/// Guard for the scanner and photo views: the location must exist and be available.
pub fn ensure_accessible<'a>(
    locations: &'a [Location],
    location_id: &str,
) -> Result<&'a Location, HuntError> {
    let location = find_location(locations, location_id)
        .ok_or_else(|| HuntError::LocationNotFound(location_id.to_string()))?;
    if !location.is_available() {
        return Err(HuntError::LocationUnavailable {
            id: location.id.clone(),
            status: location.status,
        });
    }
    Ok(location)
}

/// True when every seeded location is completed (and at least one exists)
pub fn all_completed(locations: &[Location]) -> bool {
    !locations.is_empty() && locations.iter().all(|l| l.status == LocationStatus::Completed)
}
