//! Progress recording for location completions and quiz attempts
//!
//! Folds completion events into `GameProgress` and keeps the wrong-answer
//! cooldown bookkeeping. These functions are called by the reducer; views use
//! the read-only helpers for dashboard and progress summaries.
use chrono::{DateTime, Duration, Utc};

use crate::hunt::errors::HuntError;
use crate::hunt::types::{GameProgress, QuizResult};

/// Lockout applied after an incorrect quiz answer
pub const DEFAULT_QUIZ_COOLDOWN_MINUTES: i64 = 180;

pub fn default_quiz_cooldown() -> Duration {
    Duration::minutes(DEFAULT_QUIZ_COOLDOWN_MINUTES)
}

pub fn cooldown_expiry(now: DateTime<Utc>, cooldown: Duration) -> DateTime<Utc> {
    now + cooldown
}

/// Append a completion. Returns false when the id was already recorded.
pub fn record_completion(
    progress: &mut GameProgress,
    location_id: &str,
    photo: Option<String>,
    quiz_correct: Option<bool>,
    now: DateTime<Utc>,
) -> bool {
    let appended = if progress.is_completed(location_id) {
        false
    } else {
        progress.completed_locations.push(location_id.to_string());
        true
    };

    if let Some(photo) = photo {
        progress.photos.insert(location_id.to_string(), photo);
    }
    if let Some(correct) = quiz_correct {
        progress.quiz_results.insert(
            location_id.to_string(),
            QuizResult {
                correct,
                timestamp: now,
            },
        );
    }
    if progress.current_location.as_deref() == Some(location_id) {
        progress.current_location = None;
    }
    appended
}

/// Record an incorrect answer: result is stored and the location cools down.
pub fn record_wrong_answer(
    progress: &mut GameProgress,
    location_id: &str,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> DateTime<Utc> {
    let until = cooldown_expiry(now, cooldown);
    progress.quiz_results.insert(
        location_id.to_string(),
        QuizResult {
            correct: false,
            timestamp: now,
        },
    );
    progress
        .wrong_answer_cooldowns
        .insert(location_id.to_string(), until);
    until
}

/// Pending cooldown expiry, ignoring entries that have already lapsed
pub fn active_cooldown(
    progress: &GameProgress,
    location_id: &str,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    progress
        .wrong_answer_cooldowns
        .get(location_id)
        .copied()
        .filter(|until| now < *until)
}

/// Reject a quiz attempt while the location is locked out.
pub fn check_quiz_allowed(
    progress: &GameProgress,
    location_id: &str,
    now: DateTime<Utc>,
) -> Result<(), HuntError> {
    match active_cooldown(progress, location_id, now) {
        Some(until) => Err(HuntError::QuizLockedOut {
            location_id: location_id.to_string(),
            until,
        }),
        None => Ok(()),
    }
}

pub fn completed_count(progress: Option<&GameProgress>) -> usize {
    progress.map(|p| p.completed_locations.len()).unwrap_or(0)
}

/// Completed share of `total`, in percent
pub fn completion_percentage(progress: Option<&GameProgress>, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed_count(progress) as f64 / total as f64 * 100.0
}

pub fn has_photo(progress: &GameProgress, location_id: &str) -> bool {
    progress.photos.contains_key(location_id)
}

pub fn quiz_result(progress: &GameProgress, location_id: &str) -> Option<QuizResult> {
    progress.quiz_results.get(location_id).copied()
}

/// Human-readable remaining lockout, e.g. "2h 14m"
pub fn format_remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = until.signed_duration_since(now);
    if remaining <= Duration::zero() {
        return "0m".to_string();
    }
    let minutes = (remaining.num_seconds() + 59) / 60;
    let (h, m) = (minutes / 60, minutes % 60);
    if h > 0 {
        format!("{}h {}m", h, m)
    } else {
        format!("{}m", m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 17, 9, 0, 0).unwrap()
    }

    #[test]
    fn completion_never_duplicates() {
        let mut progress = GameProgress::new("p1");
        assert!(record_completion(&mut progress, "a", None, None, t0()));
        assert!(!record_completion(&mut progress, "a", Some("img".into()), None, t0()));
        assert_eq!(progress.completed_locations, vec!["a".to_string()]);
        // Photo still applied on the repeated completion
        assert_eq!(progress.photos.get("a").map(String::as_str), Some("img"));
    }

    #[test]
    fn photo_and_quiz_overwrite_previous_values() {
        let mut progress = GameProgress::new("p1");
        record_completion(&mut progress, "a", Some("first".into()), Some(false), t0());
        let later = t0() + Duration::minutes(5);
        record_completion(&mut progress, "a", Some("second".into()), Some(true), later);
        assert_eq!(progress.photos["a"], "second");
        assert_eq!(
            progress.quiz_results["a"],
            QuizResult {
                correct: true,
                timestamp: later
            }
        );
    }

    #[test]
    fn wrong_answer_locks_for_three_hours() {
        let mut progress = GameProgress::new("p1");
        let until = record_wrong_answer(&mut progress, "a", t0(), default_quiz_cooldown());
        assert_eq!(until, t0() + Duration::hours(3));

        let err = check_quiz_allowed(&progress, "a", t0() + Duration::hours(1)).unwrap_err();
        assert!(matches!(err, HuntError::QuizLockedOut { until: u, .. } if u == until));
        assert!(check_quiz_allowed(&progress, "a", t0() + Duration::hours(4)).is_ok());
        // Exactly at expiry the lockout is over
        assert!(check_quiz_allowed(&progress, "a", until).is_ok());
        // Other locations unaffected
        assert!(check_quiz_allowed(&progress, "b", t0()).is_ok());
    }

    #[test]
    fn photo_and_quiz_lookups() {
        let mut progress = GameProgress::new("p1");
        assert!(!has_photo(&progress, "a"));
        assert_eq!(quiz_result(&progress, "a"), None);

        progress.photos.insert("a".to_string(), "img".to_string());
        record_wrong_answer(&mut progress, "a", t0(), default_quiz_cooldown());
        assert!(has_photo(&progress, "a"));
        assert_eq!(
            quiz_result(&progress, "a"),
            Some(QuizResult {
                correct: false,
                timestamp: t0()
            })
        );
    }

    #[test]
    fn percentage_handles_empty_list() {
        assert_eq!(completion_percentage(None, 0), 0.0);
        let mut progress = GameProgress::new("p1");
        record_completion(&mut progress, "a", None, None, t0());
        assert_eq!(completion_percentage(Some(&progress), 4), 25.0);
    }

    #[test]
    fn remaining_time_rounds_up_to_minutes() {
        let now = t0();
        assert_eq!(format_remaining(now + Duration::minutes(134), now), "2h 14m");
        assert_eq!(format_remaining(now + Duration::seconds(30), now), "1m");
        assert_eq!(format_remaining(now, now), "0m");
    }
}
