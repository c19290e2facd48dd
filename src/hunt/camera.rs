//! Camera device boundary.
//!
//! The device itself (media stream acquisition, still capture) is provided by
//! the embedding platform through [`CameraDevice`]. [`CameraManager`] enforces
//! the single-stream rule: at most one stream is open at a time, and a facing
//! switch fully releases the old stream before asking for a new one.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Camera failures, each with its own user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("camera is in use by another application")]
    Busy,
    #[error("no camera found")]
    NotFound,
    #[error("camera is not running")]
    NotActive,
    #[error("camera failure: {0}")]
    Other(String),
}

impl CameraError {
    /// Message shown next to the manual retry action
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => {
                "Camera access was denied. Enable it in your browser settings, then retry."
            }
            CameraError::Busy => "The camera is being used by another app. Close it and retry.",
            CameraError::NotFound => "No camera was found on this device.",
            CameraError::NotActive => "Open the camera first.",
            CameraError::Other(_) => "Could not access the camera.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Front camera
    User,
    /// Rear camera
    #[default]
    Environment,
}

impl FacingMode {
    pub fn flipped(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

/// Resolution requested from the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub aspect_ratio: f64,
    /// Lossy encoding quality for still captures (0.0..=1.0)
    pub jpeg_quality: f64,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            min_width: 640,
            min_height: 480,
            aspect_ratio: 1.0,
            jpeg_quality: 0.8,
        }
    }
}

/// Open stream as reported by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    pub id: u64,
    pub facing: FacingMode,
}

pub type DeviceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CameraError>> + Send + 'a>>;

/// Platform camera. `acquire` may stay pending while the user decides on a
/// permission prompt; dropping the future abandons the request.
pub trait CameraDevice: Send {
    fn acquire<'a>(
        &'a mut self,
        facing: FacingMode,
        constraints: &'a StreamConstraints,
    ) -> DeviceFuture<'a, StreamHandle>;

    fn release(&mut self, stream: &StreamHandle);

    /// Encode the current frame; returns the image payload (data URL).
    fn capture_still(
        &mut self,
        stream: &StreamHandle,
        quality: f64,
    ) -> Result<String, CameraError>;
}

impl<D: CameraDevice + ?Sized> CameraDevice for Box<D> {
    fn acquire<'a>(
        &'a mut self,
        facing: FacingMode,
        constraints: &'a StreamConstraints,
    ) -> DeviceFuture<'a, StreamHandle> {
        (**self).acquire(facing, constraints)
    }

    fn release(&mut self, stream: &StreamHandle) {
        (**self).release(stream)
    }

    fn capture_still(
        &mut self,
        stream: &StreamHandle,
        quality: f64,
    ) -> Result<String, CameraError> {
        (**self).capture_still(stream, quality)
    }
}

pub struct CameraManager<D: CameraDevice> {
    device: D,
    constraints: StreamConstraints,
    facing: FacingMode,
    active: Option<StreamHandle>,
    last_error: Option<CameraError>,
}

impl<D: CameraDevice> CameraManager<D> {
    pub fn new(device: D, constraints: StreamConstraints, facing: FacingMode) -> Self {
        Self {
            device,
            constraints,
            facing,
            active: None,
            last_error: None,
        }
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_stream(&self) -> Option<&StreamHandle> {
        self.active.as_ref()
    }

    /// Error from the last failed start, cleared by the next attempt
    pub fn last_error(&self) -> Option<&CameraError> {
        self.last_error.as_ref()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Open the camera. Calling again after a failure is the manual retry.
    pub async fn start(&mut self) -> Result<(), CameraError> {
        self.stop();
        self.last_error = None;
        debug!("requesting camera stream (facing={:?})", self.facing);
        match self.device.acquire(self.facing, &self.constraints).await {
            Ok(stream) => {
                info!("camera stream {} opened", stream.id);
                self.active = Some(stream);
                Ok(())
            }
            Err(e) => {
                warn!("camera start failed: {}", e);
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Release the active stream, if any.
    pub fn stop(&mut self) {
        if let Some(stream) = self.active.take() {
            self.device.release(&stream);
            debug!("camera stream {} released", stream.id);
        }
    }

    /// Flip front/rear. A running stream is released before the new one is requested.
    pub async fn switch_facing(&mut self) -> Result<(), CameraError> {
        self.facing = self.facing.flipped();
        if self.active.is_some() {
            self.stop();
            self.start().await
        } else {
            Ok(())
        }
    }

    pub fn capture(&mut self) -> Result<String, CameraError> {
        let stream = self.active.as_ref().ok_or(CameraError::NotActive)?;
        self.device
            .capture_still(stream, self.constraints.jpeg_quality)
    }
}

impl<D: CameraDevice> Drop for CameraManager<D> {
    fn drop(&mut self) {
        self.stop();
    }
}
