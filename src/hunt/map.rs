//! Per-floor views over the location list.

use crate::hunt::types::{Floor, Location, LocationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloorStats {
    pub total: usize,
    pub completed: usize,
}

pub fn locations_on_floor(locations: &[Location], floor: Floor) -> Vec<&Location> {
    locations.iter().filter(|l| l.floor == floor).collect()
}

pub fn floor_stats(locations: &[Location], floor: Floor) -> FloorStats {
    locations
        .iter()
        .filter(|l| l.floor == floor)
        .fold(FloorStats::default(), |mut acc, l| {
            acc.total += 1;
            if l.status == LocationStatus::Completed {
                acc.completed += 1;
            }
            acc
        })
}

/// Location count per floor, in `Floor::ALL` order
pub fn floor_counts(locations: &[Location]) -> Vec<(Floor, usize)> {
    Floor::ALL
        .iter()
        .map(|floor| (*floor, floor_stats(locations, *floor).total))
        .collect()
}

/// Floor holding the currently available location, for the map's initial selection
pub fn suggested_floor(locations: &[Location]) -> Floor {
    locations
        .iter()
        .find(|l| l.status == LocationStatus::Available)
        .map(|l| l.floor)
        .unwrap_or(Floor::Ground)
}
