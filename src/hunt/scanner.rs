//! Cancellable QR scanning loop.
//!
//! A [`ScanTask`] owns one decoder and polls it on a tokio task until the
//! expected code is seen, the task is stopped, or the handle is dropped. The
//! handle is meant to live exactly as long as the scanner view.

use log::{debug, info};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::hunt::camera::CameraError;
use crate::hunt::verify::{verify_code, VerifyOutcome};
use crate::logutil::escape_log;

/// One decode attempt against the current video frame.
pub trait FrameDecoder: Send + 'static {
    /// `Ok(None)` when no code is visible in this frame.
    fn decode(&mut self) -> Result<Option<String>, CameraError>;
}

impl<D: FrameDecoder + ?Sized> FrameDecoder for Box<D> {
    fn decode(&mut self) -> Result<Option<String>, CameraError> {
        (**self).decode()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Expected code seen; the loop has ended
    Matched(String),
    /// A code was read but belongs elsewhere; scanning resumes after a pause
    Mismatch(String),
    /// Frame source failed; the loop has ended
    Failed(CameraError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTiming {
    /// Delay between attempts when nothing was found
    pub retry_interval: Duration,
    /// Delay after a wrong code before scanning again
    pub mismatch_pause: Duration,
}

impl Default for ScanTiming {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_millis(100),
            mismatch_pause: Duration::from_millis(2000),
        }
    }
}

pub struct ScanTask<D: FrameDecoder> {
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<D>>,
    events: mpsc::UnboundedReceiver<ScanEvent>,
}

impl<D: FrameDecoder> ScanTask<D> {
    /// Spawn the polling loop. Must be called within a tokio runtime.
    pub fn start(decoder: D, expected_code: &str, timing: ScanTiming) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (event_tx, events) = mpsc::unbounded_channel();
        let expected = expected_code.to_string();
        let handle = tokio::spawn(scan_loop(decoder, expected, timing, stop_rx, event_tx));
        Self {
            stop_tx,
            handle: Some(handle),
            events,
        }
    }

    /// Next event, or `None` once the loop has ended and all events are drained.
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        self.events.recv().await
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    /// Stop scanning and wait for the loop to exit. Returns the decoder for reuse.
    pub async fn stop(mut self) -> Option<D> {
        let _ = self.stop_tx.send(true);
        let handle = self.handle.take()?;
        handle.await.ok()
    }
}

impl<D: FrameDecoder> Drop for ScanTask<D> {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn scan_loop<D: FrameDecoder>(
    mut decoder: D,
    expected: String,
    timing: ScanTiming,
    mut stop_rx: watch::Receiver<bool>,
    events: mpsc::UnboundedSender<ScanEvent>,
) -> D {
    debug!("scan loop started for {}", escape_log(&expected));
    loop {
        if *stop_rx.borrow() {
            debug!("scan loop stopped");
            break;
        }
        let delay = match decoder.decode() {
            Ok(Some(text)) => match verify_code(&text, &expected) {
                VerifyOutcome::Matched => {
                    info!("scanned matching code {}", escape_log(&text));
                    let _ = events.send(ScanEvent::Matched(text));
                    break;
                }
                VerifyOutcome::Mismatch => {
                    debug!("scanned foreign code {}", escape_log(&text));
                    let _ = events.send(ScanEvent::Mismatch(text));
                    timing.mismatch_pause
                }
            },
            Ok(None) => timing.retry_interval,
            Err(e) => {
                let _ = events.send(ScanEvent::Failed(e));
                break;
            }
        };
        tokio::select! {
            changed = stop_rx.changed() => {
                // Sender gone means the owning view is gone too
                if changed.is_err() || *stop_rx.borrow() {
                    debug!("scan loop cancelled");
                    break;
                }
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
    decoder
}
