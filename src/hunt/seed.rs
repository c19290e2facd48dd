//! Seeded location list.
//!
//! `canonical_hunt_seed` is the built-in venue; `load_locations_from_json`
//! lets an organiser swap in their own list without recompiling.

use log::info;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::hunt::errors::HuntError;
use crate::hunt::types::{Floor, Location, LocationStatus, Quiz};

/// Built-in venue, in unlock order.
pub fn canonical_hunt_seed() -> Vec<Location> {
    vec![
        Location::new(
            "food-court",
            "Food Court",
            Floor::Underground,
            "FOODCOURT001",
            Quiz::new(
                "fc-quiz",
                "In what year did Indonesia proclaim its independence?",
                &["1944", "1945", "1946", "1947"],
                1,
                "Indonesia proclaimed independence on 17 August 1945.",
            ),
        )
        .with_description("Main dining area with a wide choice of food stalls")
        .with_coordinates(100.0, 150.0)
        .with_decoration("Selfie with the red-and-white ornaments"),
        Location::new(
            "cinema",
            "XXI Cinema",
            Floor::First,
            "CINEMA001",
            Quiz::new(
                "cinema-quiz",
                "Who proclaimed Indonesia's independence?",
                &[
                    "Soekarno and Hatta",
                    "Sjahrir and Hatta",
                    "Soekarno and Sjahrir",
                    "Tan Malaka and Soekarno",
                ],
                0,
                "Independence was proclaimed by Ir. Soekarno and Drs. Mohammad Hatta.",
            ),
        )
        .with_description("Cinema with state-of-the-art projection")
        .with_coordinates(200.0, 100.0)
        .with_decoration("Photo with an independence-themed film poster"),
        Location::new(
            "hypermart",
            "Hypermart",
            Floor::Ground,
            "HYPERMART001",
            Quiz::new(
                "hypermart-quiz",
                "What is the first principle of Pancasila?",
                &[
                    "Just and civilized humanity",
                    "Belief in the One and Only God",
                    "The unity of Indonesia",
                    "Social justice for all Indonesians",
                ],
                1,
                "The first principle of Pancasila is belief in the One and Only God.",
            ),
        )
        .with_description("Supermarket with a complete range of products")
        .with_coordinates(150.0, 200.0)
        .with_decoration("Photo with an Indonesian-themed product"),
        Location::new(
            "atrium",
            "Atrium Central",
            Floor::Ground,
            "ATRIUM001",
            Quiz::new(
                "atrium-quiz",
                "What is Indonesia's national anthem?",
                &["Garuda Pancasila", "Indonesia Raya", "Bagimu Negeri", "Hari Merdeka"],
                1,
                "The national anthem is \"Indonesia Raya\", composed by W.R. Supratman.",
            ),
        )
        .with_description("Central hall decorated for independence day")
        .with_coordinates(175.0, 125.0)
        .with_decoration("Photo in front of the red-and-white flag backdrop"),
    ]
}

/// Load a location list from a JSON array. Statuses in the file are ignored;
/// they are derived once the list is in the store.
pub fn load_locations_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Location>, HuntError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mut locations: Vec<Location> = serde_json::from_str(&contents)?;
    validate_seed(&locations)?;
    for location in locations.iter_mut() {
        location.status = LocationStatus::Locked;
    }
    info!("loaded {} locations from {}", locations.len(), path.display());
    Ok(locations)
}

/// Reject lists the unlock policy cannot work with.
pub fn validate_seed(locations: &[Location]) -> Result<(), HuntError> {
    if locations.is_empty() {
        return Err(HuntError::InvalidSeed("location list is empty".to_string()));
    }
    let mut ids = HashSet::new();
    for location in locations {
        if !ids.insert(location.id.as_str()) {
            return Err(HuntError::InvalidSeed(format!("duplicate location id {}", location.id)));
        }
        if location.qr_code.trim().is_empty() {
            return Err(HuntError::InvalidSeed(format!("location {} has no code", location.id)));
        }
        if location.quiz.option(location.quiz.correct_answer).is_none() {
            return Err(HuntError::InvalidSeed(format!(
                "quiz {} correct answer out of range",
                location.quiz.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_seed_is_valid() {
        let seed = canonical_hunt_seed();
        assert_eq!(seed.len(), 4);
        assert!(validate_seed(&seed).is_ok());
        assert_eq!(seed[0].qr_code, "FOODCOURT001");
    }

    #[test]
    fn loads_from_json_and_resets_status() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("locations.json");
        let mut seed = canonical_hunt_seed();
        seed[2].status = LocationStatus::Completed;
        fs::write(&path, serde_json::to_string_pretty(&seed).unwrap()).unwrap();

        let loaded = load_locations_from_json(&path).unwrap();
        assert_eq!(loaded.len(), 4);
        assert!(loaded.iter().all(|l| l.status == LocationStatus::Locked));
        assert_eq!(loaded[1].quiz.options.len(), 4);
    }

    #[test]
    fn rejects_duplicates_and_empty_lists() {
        let mut seed = canonical_hunt_seed();
        seed[1].id = seed[0].id.clone();
        assert!(matches!(validate_seed(&seed), Err(HuntError::InvalidSeed(_))));
        assert!(matches!(validate_seed(&[]), Err(HuntError::InvalidSeed(_))));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_locations_from_json(&path), Err(HuntError::Json(_))));
    }
}
