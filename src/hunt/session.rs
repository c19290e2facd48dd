//! Play session controller.
//!
//! [`HuntSession`] is what a front end talks to. It owns the current view and
//! the registration form, reads the store through snapshots and mutates it only
//! through dispatched actions. Every user-visible outcome (wrong code, locked
//! location, cooldown) is reported through the toast queue as well as the
//! returned value.
//!
//! The session also owns the scan loop and the photo camera. Both are released
//! whenever the view moves away from the scanner or photo view.

use log::{debug, info, warn};
use std::sync::Arc;

use crate::config::Config;
use crate::hunt::achievement::{evaluate_achievements, Achievement};
use crate::hunt::camera::{CameraDevice, CameraError, CameraManager};
use crate::hunt::clock::{Clock, SystemClock};
use crate::hunt::errors::HuntError;
use crate::hunt::map::{floor_stats, FloorStats};
use crate::hunt::progress::{check_quiz_allowed, completion_percentage, format_remaining};
use crate::hunt::registration::{RegistrationFlow, RegistrationStep, StepOutcome};
use crate::hunt::routes::View;
use crate::hunt::scanner::{FrameDecoder, ScanEvent, ScanTask};
use crate::hunt::seed::{canonical_hunt_seed, load_locations_from_json};
use crate::hunt::state::{GameAction, GameState, GameStore, SharedStore};
use crate::hunt::toast::ToastNotifier;
use crate::hunt::types::{Floor, GameProgress, Location, LocationStatus, Player};
use crate::hunt::unlock::{all_completed, ensure_accessible, next_available};
use crate::hunt::verify::{verify_code, CodeSource, VerifyOutcome};
use crate::logutil::escape_log;

/// Dashboard header numbers
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub player_name: String,
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
    /// Name of the location to visit next; `None` once everything is done
    pub next_location: Option<String>,
    pub finished: bool,
}

pub struct HuntSession {
    store: SharedStore,
    toasts: ToastNotifier,
    config: Config,
    view: View,
    registration: RegistrationFlow,
    scan: Option<ScanTask<Box<dyn FrameDecoder>>>,
    camera: Option<CameraManager<Box<dyn CameraDevice>>>,
}

impl HuntSession {
    /// New session on the system clock. Must be created within a tokio runtime
    /// since toasts schedule their own removal.
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let store = GameStore::with_clock(clock).into_shared();
        let toasts = ToastNotifier::with_default_duration(
            store.clone(),
            config.notifications.toast_duration(),
        );
        let registration = RegistrationFlow::new(config.hunt.valid_codes.clone());
        Self {
            store,
            toasts,
            config,
            view: View::Registration,
            registration,
            scan: None,
            camera: None,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn toasts(&self) -> &ToastNotifier {
        &self.toasts
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn state(&self) -> GameState {
        self.store.snapshot()
    }

    pub fn registration_step(&self) -> RegistrationStep {
        self.registration.step()
    }

    /// Go to `path`, applying the view guards. Returns the view actually shown.
    pub fn navigate(&mut self, path: &str) -> View {
        let target = View::parse(path);
        debug!("navigate {} -> {:?}", escape_log(path), target);
        let has_player = self.store.lock().state().player.is_some();

        let next = match target {
            View::Registration if has_player => View::Dashboard,
            View::Registration => View::Registration,
            _ if !has_player => View::Registration,
            View::Dashboard | View::Map => {
                self.ensure_session_data();
                target
            }
            View::Scanner(_) | View::Photo(_) => {
                self.ensure_session_data();
                let state = self.store.snapshot();
                let location_id = target.location_id().unwrap_or_default();
                let check = ensure_accessible(&state.locations, location_id).map(|_| ());
                match check {
                    Ok(()) => target,
                    Err(e) => self.redirect_to_dashboard(&e),
                }
            }
        };
        self.set_view(next);
        self.view.clone()
    }

    /// Switch views. Leaving a camera view stops its scan loop and camera
    /// before the next view is shown.
    fn set_view(&mut self, next: View) {
        if self.view.uses_camera() && next != self.view {
            self.release_devices();
        }
        self.view = next;
    }

    fn release_devices(&mut self) {
        if self.scan.take().is_some() {
            debug!("scan loop stopped on leaving {}", self.view.path());
        }
        if let Some(mut camera) = self.camera.take() {
            camera.stop();
        }
    }

    // ----- Registration -----

    pub fn registration_input(&mut self, value: &str) {
        self.registration.input(value);
    }

    pub fn registration_back(&mut self) {
        self.registration.back();
    }

    /// Submit the current registration step. Returns the player once the last
    /// step succeeds; the session then moves to the dashboard.
    pub fn registration_next(&mut self) -> Result<Option<Player>, HuntError> {
        let registered = self.store.lock().state().player.as_ref().map(|p| p.id.clone());
        if let Some(id) = registered {
            warn!("registration submitted again for {}", id);
            return Err(HuntError::AlreadyRegistered(id));
        }
        let now = self.store.now();
        match self.registration.next(now) {
            Ok(StepOutcome::Advanced(step)) => {
                debug!("registration advanced to step {}", step.number());
                Ok(None)
            }
            Ok(StepOutcome::Registered(player)) => {
                info!("player {} registered with code {}", player.id, player.code);
                self.store.dispatch(GameAction::SetPlayer(player.clone()));
                self.toasts.success(&format!("Welcome, {}!", player.name));
                self.enter_dashboard()?;
                Ok(Some(player))
            }
            Err(e) => {
                self.toasts.error(&e.to_string());
                Err(e.into())
            }
        }
    }

    // ----- Dashboard -----

    /// Seed locations and create the progress record on first visit.
    pub fn enter_dashboard(&mut self) -> Result<(), HuntError> {
        match self.prepare_session() {
            Err(HuntError::NoPlayer) => {
                self.set_view(View::Registration);
                Err(HuntError::NoPlayer)
            }
            Err(e) => Err(e),
            Ok(()) => {
                self.set_view(View::Dashboard);
                Ok(())
            }
        }
    }

    fn prepare_session(&mut self) -> Result<(), HuntError> {
        let player_id = match self.store.lock().state().player.as_ref() {
            Some(player) => player.id.clone(),
            None => return Err(HuntError::NoPlayer),
        };

        if self.store.lock().state().locations.is_empty() {
            self.store.dispatch(GameAction::SetLoading(true));
            let seeded = self.load_seed();
            self.store.dispatch(GameAction::SetLoading(false));
            self.store.dispatch(GameAction::SetLocations(seeded?));
        }
        if self.store.lock().state().progress.is_none() {
            debug!("creating progress for {}", player_id);
            self.store
                .dispatch(GameAction::SetProgress(GameProgress::new(&player_id)));
        }
        Ok(())
    }

    fn load_seed(&self) -> Result<Vec<Location>, HuntError> {
        match &self.config.seed.locations_file {
            Some(path) => load_locations_from_json(path),
            None => Ok(canonical_hunt_seed()),
        }
    }

    /// Best-effort seeding for guarded views; failures surface as a toast.
    fn ensure_session_data(&mut self) {
        if let Err(e) = self.prepare_session() {
            warn!("could not prepare session: {}", e);
            self.toasts.error("Could not load the hunt locations");
        }
    }

    fn redirect_to_dashboard(&self, error: &HuntError) -> View {
        warn!("redirecting to dashboard: {}", error);
        let message = match error {
            HuntError::LocationNotFound(_) => "Location not found",
            _ => "This location cannot be accessed right now",
        };
        self.toasts.error(message);
        View::Dashboard
    }

    pub fn dashboard_summary(&self) -> Option<DashboardSummary> {
        let state = self.store.snapshot();
        let player = state.player.as_ref()?;
        let total = state.locations.len();
        let completed = state.completed_ids().len();
        Some(DashboardSummary {
            player_name: player.name.clone(),
            completed,
            total,
            percentage: completion_percentage(state.progress.as_ref(), total),
            next_location: next_available(&state.locations).map(|l| l.name.clone()),
            finished: all_completed(&state.locations),
        })
    }

    /// Select a location from the dashboard or map. Only an available location
    /// opens the scanner; anything else explains itself with an info toast.
    pub fn open_location(&mut self, location_id: &str) -> Result<View, HuntError> {
        let state = self.store.snapshot();
        let location = state
            .location(location_id)
            .ok_or_else(|| HuntError::LocationNotFound(location_id.to_string()))?;
        match location.status {
            LocationStatus::Available => {
                self.set_view(View::Scanner(location.id.clone()));
                Ok(self.view.clone())
            }
            LocationStatus::Locked => {
                self.toasts.info("Complete the previous location first");
                Err(HuntError::LocationUnavailable {
                    id: location.id.clone(),
                    status: location.status,
                })
            }
            LocationStatus::Completed => {
                self.toasts.info("You have already completed this location");
                Err(HuntError::LocationUnavailable {
                    id: location.id.clone(),
                    status: location.status,
                })
            }
        }
    }

    // ----- Scanner -----

    /// Check a scanned or typed code against the location. A match moves on to
    /// the photo step; a mismatch leaves the scanner open for another try.
    pub fn submit_code(
        &mut self,
        location_id: &str,
        code: &str,
        source: CodeSource,
    ) -> Result<VerifyOutcome, HuntError> {
        let state = self.store.snapshot();
        let location = match ensure_accessible(&state.locations, location_id) {
            Ok(location) => location,
            Err(e) => {
                let next = self.redirect_to_dashboard(&e);
                self.set_view(next);
                return Err(e);
            }
        };

        let outcome = verify_code(code, &location.qr_code);
        match outcome {
            VerifyOutcome::Matched => {
                info!("{:?} code accepted for {}", source, location.id);
                self.toasts.success("Location verified!");
                self.set_view(View::Photo(location.id.clone()));
            }
            VerifyOutcome::Mismatch => {
                debug!("{:?} code {} rejected for {}", source, escape_log(code), location.id);
                self.toasts.error("That code does not belong to this location");
            }
        }
        Ok(outcome)
    }

    /// Start scanning for the location shown in the scanner view. A loop that
    /// is already running is replaced.
    pub fn start_scan<D: FrameDecoder>(&mut self, decoder: D) -> Result<(), HuntError> {
        let location_id = match &self.view {
            View::Scanner(id) => id.clone(),
            _ => return Err(HuntError::WrongView("scanner")),
        };
        let state = self.store.snapshot();
        let location = ensure_accessible(&state.locations, &location_id)?;
        self.scan = None;
        let decoder: Box<dyn FrameDecoder> = Box::new(decoder);
        self.scan = Some(ScanTask::start(
            decoder,
            &location.qr_code,
            self.config.scanner.timing(),
        ));
        Ok(())
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.as_ref().map(|task| !task.is_finished()).unwrap_or(false)
    }

    pub fn stop_scan(&mut self) {
        self.scan = None;
    }

    /// Wait for the next scan loop event. `None` when no loop is running or
    /// the loop has ended.
    pub async fn next_scan_event(&mut self) -> Option<ScanEvent> {
        match self.scan.as_mut() {
            Some(task) => task.next_event().await,
            None => None,
        }
    }

    /// Feed one scan loop event back into the session.
    pub fn handle_scan_event(&mut self, event: ScanEvent) -> Result<(), HuntError> {
        let location_id = match self.view.location_id() {
            Some(id) => id.to_string(),
            None => return Ok(()),
        };
        match event {
            ScanEvent::Matched(text) => {
                self.submit_code(&location_id, &text, CodeSource::Scanned)?;
            }
            ScanEvent::Mismatch(_) => {
                self.toasts.error("QR code does not match this location");
            }
            ScanEvent::Failed(e) => {
                // The loop has ended; `start_scan` again is the retry
                self.scan = None;
                self.toasts.error(e.user_message());
                return Err(e.into());
            }
        }
        Ok(())
    }

    // ----- Photo and quiz -----

    /// Keep a photo for the location shown in the photo view.
    pub fn submit_photo(&mut self, location_id: &str, photo: String) -> Result<(), HuntError> {
        let state = self.store.snapshot();
        if state.progress.is_none() {
            return Err(HuntError::NoProgress);
        }
        if let Err(e) = ensure_accessible(&state.locations, location_id) {
            let next = self.redirect_to_dashboard(&e);
            self.set_view(next);
            return Err(e);
        }
        self.store.dispatch(GameAction::AttachPhoto {
            location_id: location_id.to_string(),
            photo,
        });
        self.toasts.success("Photo saved!");
        Ok(())
    }

    /// Open the camera for the photo view. After a failure the camera is kept
    /// so `retry_camera` can ask the device again.
    pub async fn open_camera<D: CameraDevice + 'static>(
        &mut self,
        device: D,
    ) -> Result<(), HuntError> {
        if !matches!(self.view, View::Photo(_)) {
            return Err(HuntError::WrongView("photo"));
        }
        self.camera = None;
        let device: Box<dyn CameraDevice> = Box::new(device);
        let mut camera = CameraManager::new(
            device,
            self.config.camera.constraints.clone(),
            self.config.camera.facing,
        );
        let started = camera.start().await;
        self.camera = Some(camera);
        self.report_camera(started)
    }

    pub async fn retry_camera(&mut self) -> Result<(), HuntError> {
        let started = match self.camera.as_mut() {
            Some(camera) => camera.start().await,
            None => Err(CameraError::NotActive),
        };
        self.report_camera(started)
    }

    /// Flip between front and rear camera.
    pub async fn switch_camera(&mut self) -> Result<(), HuntError> {
        let switched = match self.camera.as_mut() {
            Some(camera) => camera.switch_facing().await,
            None => Err(CameraError::NotActive),
        };
        self.report_camera(switched)
    }

    pub fn camera(&self) -> Option<&CameraManager<Box<dyn CameraDevice>>> {
        self.camera.as_ref()
    }

    fn report_camera(&self, result: Result<(), CameraError>) -> Result<(), HuntError> {
        result.map_err(|e| {
            self.toasts.error(e.user_message());
            e.into()
        })
    }

    /// Capture a still from the open camera, release the camera and submit the photo.
    pub fn capture_photo(&mut self) -> Result<(), HuntError> {
        let location_id = match &self.view {
            View::Photo(id) => id.clone(),
            _ => return Err(HuntError::WrongView("photo")),
        };
        let captured = match self.camera.as_mut() {
            Some(camera) => camera.capture(),
            None => Err(CameraError::NotActive),
        };
        let photo = match captured {
            Ok(photo) => photo,
            Err(e) => {
                self.toasts.error(e.user_message());
                return Err(e.into());
            }
        };
        if let Some(mut camera) = self.camera.take() {
            camera.stop();
        }
        self.submit_photo(&location_id, photo)
    }

    /// Answer the location's quiz. `Ok(true)` completes the location;
    /// `Ok(false)` starts the cooldown.
    pub fn answer_quiz(&mut self, location_id: &str, answer: usize) -> Result<bool, HuntError> {
        let state = self.store.snapshot();
        let now = self.store.now();
        let progress = state.progress.as_ref().ok_or(HuntError::NoProgress)?;
        let location = ensure_accessible(&state.locations, location_id)?;

        if let Err(e) = check_quiz_allowed(progress, location_id, now) {
            if let HuntError::QuizLockedOut { until, .. } = &e {
                self.toasts.error(&format!(
                    "Quiz locked. Try again in {}",
                    format_remaining(*until, now)
                ));
            }
            return Err(e);
        }
        let photo = progress
            .photos
            .get(location_id)
            .cloned()
            .ok_or_else(|| HuntError::PhotoMissing(location_id.to_string()))?;
        let correct = location.quiz.is_correct(answer).ok_or(HuntError::InvalidAnswer {
            index: answer,
            options: location.quiz.options.len(),
        })?;

        if correct {
            self.store.dispatch(GameAction::CompleteLocation {
                location_id: location_id.to_string(),
                photo: Some(photo),
                quiz_correct: Some(true),
            });
            let finished = all_completed(&self.store.lock().state().locations);
            if finished {
                info!("hunt completed");
                self.toasts
                    .success("Congratulations! You found every location!");
            } else {
                self.toasts.success("Correct! The next location is unlocked");
            }
            self.set_view(View::Dashboard);
        } else {
            let cooldown = self.config.hunt.quiz_cooldown();
            self.store.dispatch(GameAction::RecordWrongAnswer {
                location_id: location_id.to_string(),
                cooldown,
            });
            self.toasts.error(&format!(
                "Wrong answer. Try again in {}",
                format_remaining(now + cooldown, now)
            ));
        }
        Ok(correct)
    }

    /// Explanation for a location's quiz, revealed once the location is completed.
    pub fn quiz_explanation(&self, location_id: &str) -> Option<String> {
        let state = self.store.snapshot();
        let location = state.location(location_id)?;
        if location.status != LocationStatus::Completed {
            return None;
        }
        Some(location.quiz.explanation.clone())
    }

    // ----- Progress and map -----

    pub fn achievements(&self) -> Vec<Achievement> {
        let state = self.store.snapshot();
        evaluate_achievements(state.player.as_ref(), &state.locations, state.progress.as_ref())
    }

    pub fn floor_overview(&self) -> Vec<(Floor, FloorStats)> {
        let state = self.store.snapshot();
        Floor::ALL
            .iter()
            .map(|floor| (*floor, floor_stats(&state.locations, *floor)))
            .collect()
    }
}
