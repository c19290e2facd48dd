mod common;

use common::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use treasurehunt::hunt::camera::{DeviceFuture, StreamHandle};
use treasurehunt::hunt::{
    CameraDevice, CameraError, CodeSource, FacingMode, FrameDecoder, HuntError, HuntSession,
    ScanEvent, ScanTask, ScanTiming, StreamConstraints, View,
};

/// Replays a fixed list of frames, then sees nothing.
struct ScriptedDecoder {
    frames: VecDeque<Result<Option<String>, CameraError>>,
    attempts: Arc<AtomicUsize>,
}

impl ScriptedDecoder {
    fn new(frames: Vec<Result<Option<String>, CameraError>>) -> Self {
        Self {
            frames: frames.into(),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FrameDecoder for ScriptedDecoder {
    fn decode(&mut self) -> Result<Option<String>, CameraError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.frames.pop_front().unwrap_or(Ok(None))
    }
}

/// Counts open streams through a shared counter so tests can watch releases.
#[derive(Default)]
struct FakeCamera {
    open: Arc<AtomicUsize>,
    next_id: u64,
    failures: VecDeque<CameraError>,
}

impl CameraDevice for FakeCamera {
    fn acquire<'a>(
        &'a mut self,
        facing: FacingMode,
        _constraints: &'a StreamConstraints,
    ) -> DeviceFuture<'a, StreamHandle> {
        Box::pin(async move {
            if let Some(err) = self.failures.pop_front() {
                return Err(err);
            }
            if self.open.load(Ordering::SeqCst) > 0 {
                return Err(CameraError::Busy);
            }
            self.open.fetch_add(1, Ordering::SeqCst);
            self.next_id += 1;
            Ok(StreamHandle {
                id: self.next_id,
                facing,
            })
        })
    }

    fn release(&mut self, _stream: &StreamHandle) {
        let _ = self
            .open
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    fn capture_still(
        &mut self,
        stream: &StreamHandle,
        _quality: f64,
    ) -> Result<String, CameraError> {
        Ok(format!("data:image/jpeg;base64,still{}", stream.id))
    }
}

/// Registered session sitting in the photo view for the first location.
fn photo_view_session() -> HuntSession {
    let (mut session, _clock) = registered_session();
    session.open_location("food-court").unwrap();
    session
        .submit_code("food-court", "FOODCOURT001", CodeSource::Scanned)
        .unwrap();
    assert_eq!(session.view(), &View::Photo("food-court".to_string()));
    session
}

#[tokio::test(start_paused = true)]
async fn scanned_match_moves_to_photo_view() {
    let (mut session, _clock) = registered_session();
    session.open_location("food-court").unwrap();

    session
        .start_scan(ScriptedDecoder::new(vec![
            Ok(None),
            Ok(Some("CINEMA001".to_string())),
            Ok(None),
            Ok(Some("FOODCOURT001".to_string())),
        ]))
        .unwrap();
    assert!(session.is_scanning());

    let first = session.next_scan_event().await.unwrap();
    assert_eq!(first, ScanEvent::Mismatch("CINEMA001".to_string()));
    session.handle_scan_event(first).unwrap();
    assert_eq!(session.view(), &View::Scanner("food-court".to_string()));
    assert!(toast_messages(&session)
        .iter()
        .any(|m| m == "QR code does not match this location"));

    let second = session.next_scan_event().await.unwrap();
    assert_eq!(second, ScanEvent::Matched("FOODCOURT001".to_string()));
    session.handle_scan_event(second).unwrap();
    assert_eq!(session.view(), &View::Photo("food-court".to_string()));

    // The scan loop belongs to the scanner view and is gone with it
    assert!(!session.is_scanning());
    assert!(session.next_scan_event().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn leaving_the_scanner_view_stops_polling() {
    let (mut session, _clock) = registered_session();
    session.open_location("food-court").unwrap();
    let decoder = ScriptedDecoder::new(vec![]);
    let attempts = Arc::clone(&decoder.attempts);
    session.start_scan(decoder).unwrap();

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(attempts.load(Ordering::SeqCst) > 1);

    // Re-entering the same view keeps the loop
    session.navigate("/scanner/food-court");
    assert!(session.is_scanning());

    session.navigate("/dashboard");
    assert_eq!(session.view(), &View::Dashboard);
    assert!(!session.is_scanning());
    tokio::task::yield_now().await;
    let seen = attempts.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), seen);
}

#[tokio::test(start_paused = true)]
async fn mismatch_pauses_before_the_next_attempt() {
    let decoder = ScriptedDecoder::new(vec![Ok(Some("CINEMA001".to_string()))]);
    let attempts = Arc::clone(&decoder.attempts);
    let mut task = ScanTask::start(decoder, "FOODCOURT001", ScanTiming::default());

    assert!(matches!(task.next_event().await, Some(ScanEvent::Mismatch(_))));
    tokio::time::sleep(Duration::from_millis(1900)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(attempts.load(Ordering::SeqCst) >= 2);

    let decoder = task.stop().await.unwrap();
    assert!(decoder.frames.is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_task_stops_polling() {
    let decoder = ScriptedDecoder::new(vec![]);
    let attempts = Arc::clone(&decoder.attempts);
    let task = ScanTask::start(decoder, "FOODCOURT001", ScanTiming::default());
    tokio::time::sleep(Duration::from_millis(550)).await;
    assert!(attempts.load(Ordering::SeqCst) > 1);

    drop(task);
    tokio::task::yield_now().await;
    let seen = attempts.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), seen);
}

#[tokio::test(start_paused = true)]
async fn camera_failure_is_reported_with_its_message() {
    let (mut session, _clock) = registered_session();
    session.open_location("food-court").unwrap();
    session
        .start_scan(ScriptedDecoder::new(vec![Err(CameraError::PermissionDenied)]))
        .unwrap();

    let event = session.next_scan_event().await.unwrap();
    assert!(matches!(
        session.handle_scan_event(event),
        Err(HuntError::Camera(CameraError::PermissionDenied))
    ));
    assert!(toast_messages(&session)
        .iter()
        .any(|m| m == CameraError::PermissionDenied.user_message()));
    assert_eq!(session.view(), &View::Scanner("food-court".to_string()));
    assert!(!session.is_scanning());

    // Starting again is the retry
    session.start_scan(ScriptedDecoder::new(vec![])).unwrap();
    assert!(session.is_scanning());
}

#[tokio::test(start_paused = true)]
async fn scanning_requires_the_scanner_view() {
    let (mut session, _clock) = registered_session();
    assert!(matches!(
        session.start_scan(ScriptedDecoder::new(vec![])),
        Err(HuntError::WrongView("scanner"))
    ));
    assert!(matches!(
        session.open_camera(FakeCamera::default()).await,
        Err(HuntError::WrongView("photo"))
    ));
}

#[tokio::test(start_paused = true)]
async fn captured_photo_is_kept_and_camera_released() {
    let mut session = photo_view_session();
    assert!(matches!(
        session.capture_photo(),
        Err(HuntError::Camera(CameraError::NotActive))
    ));

    let camera = FakeCamera::default();
    let open = Arc::clone(&camera.open);
    session.open_camera(camera).await.unwrap();
    session.switch_camera().await.unwrap();
    assert_eq!(session.camera().map(|c| c.facing()), Some(FacingMode::User));
    assert_eq!(open.load(Ordering::SeqCst), 1);

    session.capture_photo().unwrap();
    assert!(session.camera().is_none());
    assert_eq!(open.load(Ordering::SeqCst), 0);
    let progress = session.state().progress.unwrap();
    assert_eq!(progress.photos["food-court"], "data:image/jpeg;base64,still2");
}

#[tokio::test(start_paused = true)]
async fn leaving_the_photo_view_releases_the_camera() {
    let mut session = photo_view_session();
    let camera = FakeCamera::default();
    let open = Arc::clone(&camera.open);
    session.open_camera(camera).await.unwrap();
    assert_eq!(open.load(Ordering::SeqCst), 1);

    session.navigate("/map");
    assert_eq!(session.view(), &View::Map);
    assert!(session.camera().is_none());
    assert_eq!(open.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn denied_camera_can_be_retried() {
    let mut session = photo_view_session();
    let mut camera = FakeCamera::default();
    camera.failures.push_back(CameraError::PermissionDenied);
    let open = Arc::clone(&camera.open);

    assert!(matches!(
        session.open_camera(camera).await,
        Err(HuntError::Camera(CameraError::PermissionDenied))
    ));
    assert_eq!(
        session.camera().and_then(|c| c.last_error()),
        Some(&CameraError::PermissionDenied)
    );
    assert!(toast_messages(&session)
        .iter()
        .any(|m| m == CameraError::PermissionDenied.user_message()));

    session.retry_camera().await.unwrap();
    assert!(session.camera().map(|c| c.is_active()).unwrap_or(false));
    assert_eq!(open.load(Ordering::SeqCst), 1);
}
