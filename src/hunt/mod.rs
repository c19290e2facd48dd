//! Treasure hunt engine.
//! The store, unlock policy and progress recorder form the core; camera,
//! scanner and toast handle the asynchronous edges, and the session ties
//! them together for a front end.

pub mod achievement;
pub mod camera;
pub mod clock;
pub mod errors;
pub mod map;
pub mod progress;
pub mod registration;
pub mod routes;
pub mod scanner;
pub mod seed;
pub mod session;
pub mod state;
pub mod toast;
pub mod types;
pub mod unlock;
pub mod verify;

pub use achievement::{evaluate_achievements, Achievement, AchievementKind};
pub use camera::{CameraDevice, CameraError, CameraManager, FacingMode, StreamConstraints};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::HuntError;
pub use map::{floor_counts, floor_stats, locations_on_floor, suggested_floor, FloorStats};
pub use progress::{
    active_cooldown, check_quiz_allowed, completed_count, completion_percentage,
    default_quiz_cooldown, format_remaining, has_photo, quiz_result,
    DEFAULT_QUIZ_COOLDOWN_MINUTES,
};
pub use registration::{RegistrationFlow, RegistrationStep, StepOutcome};
pub use routes::View;
pub use scanner::{FrameDecoder, ScanEvent, ScanTask, ScanTiming};
pub use seed::{canonical_hunt_seed, load_locations_from_json, validate_seed};
pub use session::{DashboardSummary, HuntSession};
pub use state::{reduce, GameAction, GameState, GameStore, SharedStore};
pub use toast::ToastNotifier;
pub use types::*;
pub use unlock::{derive_statuses, ensure_accessible, next_available};
pub use verify::{codes_match, normalize_code, verify_code, CodeSource, VerifyOutcome};
