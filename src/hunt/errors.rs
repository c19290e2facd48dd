use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::hunt::camera::CameraError;
use crate::hunt::types::LocationStatus;
use crate::validation::RegistrationError;

/// Errors surfaced by the treasure hunt engine.
#[derive(Debug, Error)]
pub enum HuntError {
    /// Location id is not part of the seeded list.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// Location exists but cannot be played right now.
    #[error("location {id} is {status}, not available")]
    LocationUnavailable { id: String, status: LocationStatus },

    /// A view that requires a registered player was opened without one.
    #[error("no registered player")]
    NoPlayer,

    /// The player record is immutable once registration has completed.
    #[error("player {0} is already registered")]
    AlreadyRegistered(String),

    /// Progress has not been created yet (dashboard never visited).
    #[error("no progress record for the current player")]
    NoProgress,

    /// A wrong quiz answer is still cooling down.
    #[error("quiz for {location_id} locked until {until}")]
    QuizLockedOut {
        location_id: String,
        until: DateTime<Utc>,
    },

    /// Answer index does not name an option.
    #[error("answer {index} is not an option (quiz has {options} options)")]
    InvalidAnswer { index: usize, options: usize },

    /// The quiz step was reached without a submitted photo.
    #[error("no photo submitted for {0}")]
    PhotoMissing(String),

    /// Operation needs a different view to be open.
    #[error("not in the {0} view")]
    WrongView(&'static str),

    #[error("camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Seed data was rejected.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
