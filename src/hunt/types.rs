use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registered participant. Created once at registration and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub phone: String,
    /// Registration code the player signed up with (upper-case, 6 chars)
    pub code: String,
    pub registered_at: DateTime<Utc>,
}

impl Player {
    pub fn new(
        id: &str,
        name: &str,
        phone: &str,
        code: &str,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            code: code.to_string(),
            registered_at,
        }
    }
}

/// Venue level a location sits on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Floor {
    /// Ground floor
    #[serde(rename = "GF")]
    Ground,
    /// Underground
    #[serde(rename = "UG")]
    Underground,
    /// First floor
    #[serde(rename = "FF")]
    First,
}

impl Floor {
    pub const ALL: [Floor; 3] = [Floor::Ground, Floor::Underground, Floor::First];

    /// Short venue label (GF/UG/FF)
    pub fn code(&self) -> &'static str {
        match self {
            Floor::Ground => "GF",
            Floor::Underground => "UG",
            Floor::First => "FF",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Floor::Ground => "Ground Floor",
            Floor::Underground => "Underground",
            Floor::First => "First Floor",
        }
    }

    /// Parse a floor code (case-insensitive)
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GF" => Some(Floor::Ground),
            "UG" => Some(Floor::Underground),
            "FF" => Some(Floor::First),
            _ => None,
        }
    }
}

impl std::fmt::Display for Floor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Display position on the floor map
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    #[default]
    Locked,
    Available,
    Completed,
}

impl LocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationStatus::Locked => "locked",
            LocationStatus::Available => "available",
            LocationStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiple-choice trivia question attached to a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quiz {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct_answer: usize,
    pub explanation: String,
}

impl Quiz {
    pub fn new(
        id: &str,
        question: &str,
        options: &[&str],
        correct_answer: usize,
        explanation: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer,
            explanation: explanation.to_string(),
        }
    }

    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(|s| s.as_str())
    }

    /// Returns `None` when `index` does not name an option.
    pub fn is_correct(&self, index: usize) -> Option<bool> {
        self.option(index).map(|_| index == self.correct_answer)
    }
}

/// Physical point of interest in the venue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub floor: Floor,
    pub description: String,
    pub coordinates: Coordinates,
    /// Derived from progress; see `unlock::derive_statuses`
    #[serde(default)]
    pub status: LocationStatus,
    /// Code printed on the QR sticker at the location
    pub qr_code: String,
    pub quiz: Quiz,
    pub decoration_requirement: String,
}

impl Location {
    pub fn new(id: &str, name: &str, floor: Floor, qr_code: &str, quiz: Quiz) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            floor,
            description: String::new(),
            coordinates: Coordinates { x: 0.0, y: 0.0 },
            status: LocationStatus::Locked,
            qr_code: qr_code.to_string(),
            quiz,
            decoration_requirement: String::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_coordinates(mut self, x: f32, y: f32) -> Self {
        self.coordinates = Coordinates { x, y };
        self
    }

    pub fn with_decoration(mut self, requirement: &str) -> Self {
        self.decoration_requirement = requirement.to_string();
        self
    }

    pub fn is_available(&self) -> bool {
        self.status == LocationStatus::Available
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizResult {
    pub correct: bool,
    pub timestamp: DateTime<Utc>,
}

/// Per-player progress record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameProgress {
    pub player_id: String,
    /// Append-only, never contains duplicates
    pub completed_locations: Vec<String>,
    #[serde(default)]
    pub current_location: Option<String>,
    pub total_score: u32,
    /// Captured photo payload (encoded image) keyed by location id
    pub photos: HashMap<String, String>,
    pub quiz_results: HashMap<String, QuizResult>,
    /// Expiry of the wrong-answer lockout keyed by location id
    pub wrong_answer_cooldowns: HashMap<String, DateTime<Utc>>,
}

impl GameProgress {
    pub fn new(player_id: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            completed_locations: Vec::new(),
            current_location: None,
            total_score: 0,
            photos: HashMap::new(),
            quiz_results: HashMap::new(),
            wrong_answer_cooldowns: HashMap::new(),
        }
    }

    pub fn is_completed(&self, location_id: &str) -> bool {
        self.completed_locations.iter().any(|id| id == location_id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// Transient user-facing notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub kind: ToastKind,
    pub message: String,
    /// Display duration in milliseconds; `None` means the notifier default
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl Toast {
    pub fn new(id: &str, kind: ToastKind, message: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            message: message.to_string(),
            duration_ms: None,
        }
    }
}
