//! Game state aggregate and its reducer.
//!
//! [`GameState`] is only ever changed through [`reduce`], a total function of
//! `(state, action, now)`. [`GameStore`] owns one state plus the clock that
//! stamps each dispatch; consumers receive the store by reference (or the
//! [`SharedStore`] handle when a timer task needs to dispatch later).

use chrono::{DateTime, Duration, Utc};
use log::{debug, trace};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::hunt::clock::{Clock, SystemClock};
use crate::hunt::progress;
use crate::hunt::types::{GameProgress, Location, LocationStatus, Player, Toast};
use crate::hunt::unlock::derive_statuses;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub player: Option<Player>,
    pub locations: Vec<Location>,
    pub progress: Option<GameProgress>,
    /// Insertion-ordered notification queue
    pub toasts: Vec<Toast>,
    pub is_loading: bool,
}

impl GameState {
    pub fn location(&self, location_id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == location_id)
    }

    pub fn completed_ids(&self) -> &[String] {
        self.progress
            .as_ref()
            .map(|p| p.completed_locations.as_slice())
            .unwrap_or(&[])
    }

    fn resync_statuses(&mut self) {
        let completed = self.completed_ids().to_vec();
        derive_statuses(&mut self.locations, &completed);
    }
}

/// Every mutation the store accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    SetPlayer(Player),
    /// Replace the seeded location list wholesale
    SetLocations(Vec<Location>),
    /// Replace the progress record wholesale
    SetProgress(GameProgress),
    /// Override one location's status; reconciled against the completed list
    UpdateLocationStatus {
        location_id: String,
        status: LocationStatus,
    },
    CompleteLocation {
        location_id: String,
        photo: Option<String>,
        quiz_correct: Option<bool>,
    },
    /// Keep a submitted photo before the quiz is answered
    AttachPhoto { location_id: String, photo: String },
    /// Incorrect quiz answer; starts the lockout
    RecordWrongAnswer {
        location_id: String,
        cooldown: Duration,
    },
    AddToast(Toast),
    RemoveToast(String),
    SetLoading(bool),
}

impl GameAction {
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::SetPlayer(_) => "SET_PLAYER",
            GameAction::SetLocations(_) => "SET_LOCATIONS",
            GameAction::SetProgress(_) => "SET_PROGRESS",
            GameAction::UpdateLocationStatus { .. } => "UPDATE_LOCATION_STATUS",
            GameAction::CompleteLocation { .. } => "COMPLETE_LOCATION",
            GameAction::AttachPhoto { .. } => "ATTACH_PHOTO",
            GameAction::RecordWrongAnswer { .. } => "RECORD_WRONG_ANSWER",
            GameAction::AddToast(_) => "ADD_TOAST",
            GameAction::RemoveToast(_) => "REMOVE_TOAST",
            GameAction::SetLoading(_) => "SET_LOADING",
        }
    }
}

/// Apply one action. Never panics; actions that cannot apply leave the state unchanged.
pub fn reduce(mut state: GameState, action: GameAction, now: DateTime<Utc>) -> GameState {
    match action {
        GameAction::SetPlayer(player) => {
            state.player = Some(player);
        }
        GameAction::SetLocations(locations) => {
            state.locations = locations;
            state.resync_statuses();
        }
        GameAction::SetProgress(mut new_progress) => {
            dedup_preserving_order(&mut new_progress.completed_locations);
            state.progress = Some(new_progress);
            state.resync_statuses();
        }
        GameAction::UpdateLocationStatus {
            location_id,
            status,
        } => {
            // Without a progress record there is no completed list to reconcile with
            if state.location(&location_id).is_none() || state.progress.is_none() {
                return state;
            }
            if let Some(progress) = state.progress.as_mut() {
                match status {
                    LocationStatus::Completed => {
                        progress::record_completion(progress, &location_id, None, None, now);
                    }
                    LocationStatus::Available | LocationStatus::Locked => {
                        progress.completed_locations.retain(|id| *id != location_id);
                    }
                }
            }
            state.resync_statuses();
        }
        GameAction::CompleteLocation {
            location_id,
            photo,
            quiz_correct,
        } => {
            if state.location(&location_id).is_none() || state.progress.is_none() {
                return state;
            }
            if let Some(progress) = state.progress.as_mut() {
                progress::record_completion(progress, &location_id, photo, quiz_correct, now);
            }
            state.resync_statuses();
        }
        GameAction::AttachPhoto { location_id, photo } => {
            if state.location(&location_id).is_none() {
                return state;
            }
            if let Some(progress) = state.progress.as_mut() {
                progress.photos.insert(location_id.clone(), photo);
                progress.current_location = Some(location_id);
            }
        }
        GameAction::RecordWrongAnswer {
            location_id,
            cooldown,
        } => {
            if state.location(&location_id).is_none() {
                return state;
            }
            if let Some(progress) = state.progress.as_mut() {
                progress::record_wrong_answer(progress, &location_id, now, cooldown);
            }
        }
        GameAction::AddToast(toast) => {
            if !state.toasts.iter().any(|t| t.id == toast.id) {
                state.toasts.push(toast);
            }
        }
        GameAction::RemoveToast(id) => {
            state.toasts.retain(|t| t.id != id);
        }
        GameAction::SetLoading(flag) => {
            state.is_loading = flag;
        }
    }
    state
}

fn dedup_preserving_order(ids: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

/// Owner of the single game state.
pub struct GameStore {
    state: GameState,
    clock: Arc<dyn Clock>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: GameState::default(),
            clock,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn dispatch(&mut self, action: GameAction) {
        let now = self.clock.now();
        debug!("dispatch {}", action.name());
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action, now);
        trace!(
            "state: {} locations, {} completed, {} toasts",
            self.state.locations.len(),
            self.state.completed_ids().len(),
            self.state.toasts.len()
        );
    }

    pub fn into_shared(self) -> SharedStore {
        SharedStore::new(self)
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle for consumers that dispatch from timer tasks.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<GameStore>>,
}

impl SharedStore {
    pub fn new(store: GameStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store. A poisoned lock is recovered since every reduce runs to completion.
    pub fn lock(&self) -> MutexGuard<'_, GameStore> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn dispatch(&self, action: GameAction) {
        self.lock().dispatch(action);
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> GameState {
        self.lock().state().clone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.lock().now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hunt::types::{Floor, Quiz, ToastKind};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 17, 9, 0, 0).unwrap()
    }

    fn seeded() -> GameState {
        let locations = ["l1", "l2", "l3", "l4"]
            .iter()
            .map(|id| Location::new(id, id, Floor::Ground, "C", Quiz::new("q", "?", &["a"], 0, "")))
            .collect();
        let state = reduce(GameState::default(), GameAction::SetLocations(locations), t0());
        reduce(state, GameAction::SetProgress(GameProgress::new("p")), t0())
    }

    #[test]
    fn set_progress_removes_duplicate_ids() {
        let mut progress = GameProgress::new("p");
        progress.completed_locations = vec!["l1".into(), "l2".into(), "l1".into()];
        let state = reduce(seeded(), GameAction::SetProgress(progress), t0());
        assert_eq!(state.completed_ids(), &["l1".to_string(), "l2".to_string()]);
        assert_eq!(state.locations[2].status, LocationStatus::Available);
    }

    #[test]
    fn complete_without_progress_is_a_no_op() {
        let quiz = Quiz::new("q", "?", &["a"], 0, "");
        let locations = vec![Location::new("l1", "l1", Floor::Ground, "C", quiz)];
        let state = reduce(GameState::default(), GameAction::SetLocations(locations), t0());
        let before = state.clone();
        let after = reduce(
            state,
            GameAction::CompleteLocation {
                location_id: "l1".into(),
                photo: None,
                quiz_correct: None,
            },
            t0(),
        );
        assert_eq!(after, before);
    }

    #[test]
    fn manual_status_override_stays_consistent() {
        let state = reduce(
            seeded(),
            GameAction::UpdateLocationStatus {
                location_id: "l1".into(),
                status: LocationStatus::Completed,
            },
            t0(),
        );
        assert_eq!(state.completed_ids(), &["l1".to_string()]);
        assert_eq!(state.locations[1].status, LocationStatus::Available);

        let state = reduce(
            state,
            GameAction::UpdateLocationStatus {
                location_id: "l1".into(),
                status: LocationStatus::Locked,
            },
            t0(),
        );
        assert!(state.completed_ids().is_empty());
        assert_eq!(state.locations[0].status, LocationStatus::Available);
        assert_eq!(state.locations[1].status, LocationStatus::Locked);
    }

    #[test]
    fn attach_photo_does_not_complete() {
        let state = reduce(
            seeded(),
            GameAction::AttachPhoto {
                location_id: "l1".into(),
                photo: "data".into(),
            },
            t0(),
        );
        let progress = state.progress.as_ref().unwrap();
        assert_eq!(progress.photos["l1"], "data");
        assert_eq!(progress.current_location.as_deref(), Some("l1"));
        assert!(progress.completed_locations.is_empty());
        assert_eq!(state.locations[0].status, LocationStatus::Available);
    }

    #[test]
    fn duplicate_toast_ids_are_ignored() {
        let toast = Toast::new("t1", ToastKind::Info, "hello");
        let state = reduce(GameState::default(), GameAction::AddToast(toast.clone()), t0());
        let state = reduce(state, GameAction::AddToast(toast), t0());
        assert_eq!(state.toasts.len(), 1);
    }

    #[test]
    fn loading_flag_touches_nothing_else() {
        let before = seeded();
        let after = reduce(before.clone(), GameAction::SetLoading(true), t0());
        assert!(after.is_loading);
        assert_eq!(GameState { is_loading: false, ..after }, before);
    }
}
