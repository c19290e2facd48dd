//! Achievement evaluation for the progress view
//!
//! Achievements are derived on read from player, locations and progress;
//! nothing is stored.
use chrono::Duration;
use serde::Serialize;

use crate::hunt::types::{GameProgress, Location, Player};

/// Completing everything within this window after registering earns the speed badge
pub const SPEED_RUN_WINDOW_MINUTES: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementKind {
    FirstLocation,
    Photographer,
    Halfway,
    MasterHunter,
    SpeedRunner,
    PerfectScore,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 6] = [
        AchievementKind::FirstLocation,
        AchievementKind::Photographer,
        AchievementKind::Halfway,
        AchievementKind::MasterHunter,
        AchievementKind::SpeedRunner,
        AchievementKind::PerfectScore,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AchievementKind::FirstLocation => "Rookie Explorer",
            AchievementKind::Photographer => "Skilled Photographer",
            AchievementKind::Halfway => "Halfway There",
            AchievementKind::MasterHunter => "Master Treasure Hunter",
            AchievementKind::SpeedRunner => "Speed Runner",
            AchievementKind::PerfectScore => "Perfect Score",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementKind::FirstLocation => "Complete your first location",
            AchievementKind::Photographer => "Take 2 selfies",
            AchievementKind::Halfway => "Complete 50% of the locations",
            AchievementKind::MasterHunter => "Complete every location",
            AchievementKind::SpeedRunner => "Finish within 2 hours",
            AchievementKind::PerfectScore => "Answer every quiz correctly on the first try",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub kind: AchievementKind,
    pub unlocked: bool,
}

/// Evaluate every achievement; unlocked ones first, in declaration order.
pub fn evaluate_achievements(
    player: Option<&Player>,
    locations: &[Location],
    progress: Option<&GameProgress>,
) -> Vec<Achievement> {
    let mut result: Vec<Achievement> = AchievementKind::ALL
        .iter()
        .map(|kind| Achievement {
            kind: *kind,
            unlocked: is_unlocked(*kind, player, locations, progress),
        })
        .collect();
    // Stable sort keeps declaration order within each group
    result.sort_by_key(|a| !a.unlocked);
    result
}

pub fn is_unlocked(
    kind: AchievementKind,
    player: Option<&Player>,
    locations: &[Location],
    progress: Option<&GameProgress>,
) -> bool {
    let Some(progress) = progress else {
        return false;
    };
    let total = locations.len();
    let completed = progress.completed_locations.len();
    let finished = total > 0 && locations.iter().all(|l| progress.is_completed(&l.id));

    match kind {
        AchievementKind::FirstLocation => completed >= 1,
        AchievementKind::Photographer => completed >= 2,
        AchievementKind::Halfway => total > 0 && completed * 2 >= total,
        AchievementKind::MasterHunter => finished,
        AchievementKind::SpeedRunner => {
            let Some(player) = player else {
                return false;
            };
            let last_completion = locations
                .iter()
                .filter_map(|l| progress.quiz_results.get(&l.id).map(|r| r.timestamp))
                .max();
            match last_completion {
                Some(at) if finished => {
                    at.signed_duration_since(player.registered_at)
                        <= Duration::minutes(SPEED_RUN_WINDOW_MINUTES)
                }
                _ => false,
            }
        }
        AchievementKind::PerfectScore => {
            finished
                && progress.wrong_answer_cooldowns.is_empty()
                && locations.iter().all(|l| {
                    progress
                        .quiz_results
                        .get(&l.id)
                        .map(|r| r.correct)
                        .unwrap_or(false)
                })
        }
    }
}

pub fn unlocked_count(achievements: &[Achievement]) -> usize {
    achievements.iter().filter(|a| a.unlocked).count()
}
