// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use super::VideoStream;
use crate::constants::acquisition;
use crate::errors::{CameraError, PhotoError};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Camera orientation relative to the person holding the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Selfie camera
    User,
    /// Outward camera
    Environment,
}

impl FacingMode {
    /// The other facing mode
    pub fn opposite(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    /// Label shown in the settings dialog
    pub fn display_name(&self) -> &'static str {
        match self {
            FacingMode::User => "User-facing",
            FacingMode::Environment => "Environment",
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Kind of a device reported by enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// Raw enumeration entry, before filtering to cameras
#[derive(Debug, Clone)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub kind: MediaDeviceKind,
    /// Empty until the user granted camera permission
    pub label: String,
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub device_id: String,
    pub label: String,
    /// Only known once a stream has been opened on the device
    pub facing_mode: Option<FacingMode>,
}

impl CameraDevice {
    /// Build a camera entry from an enumeration result
    ///
    /// Devices without a label get `Camera <first 8 chars of id>`.
    pub fn from_info(info: &MediaDeviceInfo) -> Self {
        let label = if info.label.is_empty() {
            let short: String = info.device_id.chars().take(8).collect();
            format!("Camera {}", short)
        } else {
            info.label.clone()
        };

        Self {
            device_id: info.device_id.clone(),
            label,
            facing_mode: None,
        }
    }
}

/// Identity of a live stream, used to compare surface bindings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(pub String);

impl StreamId {
    /// Fresh random identifier
    pub fn new_random() -> Self {
        StreamId(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Width and height pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check whether this resolution meets `min` in both dimensions
    pub fn satisfies(&self, min: &Resolution) -> bool {
        self.width >= min.width && self.height >= min.height
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Acquisition request passed to [`super::MediaDevices::get_user_media`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    /// `None` means any camera
    pub facing_mode: Option<FacingMode>,
    /// Preferred resolution; backends pick the closest they can
    pub ideal: Option<Resolution>,
    /// Hard minimum; backends fail with `OverconstrainedError` below it
    pub min: Option<Resolution>,
    /// Audio is never requested by the capture core
    pub audio: bool,
}

impl StreamConstraints {
    /// High-resolution request for one facing mode
    pub fn for_facing(facing: FacingMode) -> Self {
        Self {
            facing_mode: Some(facing),
            ideal: Some(Resolution::new(
                acquisition::IDEAL_WIDTH,
                acquisition::IDEAL_HEIGHT,
            )),
            min: Some(Resolution::new(
                acquisition::MIN_WIDTH,
                acquisition::MIN_HEIGHT,
            )),
            audio: false,
        }
    }

    /// Best-effort request used when enumeration found nothing
    pub fn unconstrained() -> Self {
        Self {
            facing_mode: None,
            ideal: None,
            min: None,
            audio: false,
        }
    }
}

/// Failure reported by a media backend, shaped like a DOM exception
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaError {
    /// Exception class name, e.g. `NotAllowedError`
    pub name: String,
    pub message: String,
}

impl MediaError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn not_allowed() -> Self {
        Self::new("NotAllowedError", "Permission denied")
    }

    pub fn overconstrained(constraint: &str) -> Self {
        Self::new(
            "OverconstrainedError",
            format!("Constraint not satisfied: {}", constraint),
        )
    }

    pub fn not_found() -> Self {
        Self::new("NotFoundError", "Requested device not found")
    }

    /// Map the backend failure onto the user-facing taxonomy
    pub fn classify(&self) -> CameraError {
        match self.name.as_str() {
            "NotAllowedError" | "PermissionDeniedError" => CameraError::PermissionDenied,
            "OverconstrainedError" => CameraError::Overconstrained,
            _ if self.message.contains("Permissions policy violation") => {
                CameraError::IframeBlocked
            }
            _ if self.message.is_empty() => {
                CameraError::Unknown("Failed to initialize cameras".to_string())
            }
            _ => CameraError::Unknown(self.message.clone()),
        }
    }
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for MediaError {}

impl From<MediaError> for CameraError {
    fn from(err: MediaError) -> Self {
        err.classify()
    }
}

/// A single RGBA8 frame grabbed from a stream
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA pixels
    pub data: Arc<[u8]>,
    /// When the frame was grabbed
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap an RGBA image as a frame
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: Arc::from(image.into_raw()),
            captured_at: Instant::now(),
        }
    }

    /// Check whether the frame carries a decodable picture
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Copy the pixels into an image buffer for composition
    pub fn to_rgba_image(&self) -> Result<RgbaImage, PhotoError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() < expected {
            return Err(PhotoError::InvalidFrame(format!(
                "RGBA data too small: expected {}, got {}",
                expected,
                self.data.len()
            )));
        }
        RgbaImage::from_raw(self.width, self.height, self.data[..expected].to_vec())
            .ok_or_else(|| PhotoError::InvalidFrame("Failed to wrap frame pixels".to_string()))
    }
}

/// An acquired stream, bound to the facing mode it was requested for
///
/// Owned exclusively by the stream manager. Dropping the handle stops every
/// underlying track, so a replaced or torn-down stream never keeps the
/// camera indicator on.
pub struct StreamHandle {
    facing: FacingMode,
    stream: Box<dyn VideoStream>,
}

impl StreamHandle {
    pub fn new(facing: FacingMode, stream: Box<dyn VideoStream>) -> Self {
        Self { facing, stream }
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn id(&self) -> &StreamId {
        self.stream.id()
    }

    /// Latest frame, if the stream has produced one
    pub fn current_frame(&self) -> Option<CameraFrame> {
        self.stream.current_frame()
    }

    /// Natural video dimensions; `(0, 0)` until the first frame arrives
    pub fn video_dimensions(&self) -> (u32, u32) {
        self.current_frame()
            .map(|frame| (frame.width, frame.height))
            .unwrap_or((0, 0))
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_active()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        debug!(facing = %self.facing, id = %self.stream.id(), "Stopping stream tracks");
        self.stream.stop_tracks();
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("facing", &self.facing)
            .field("id", self.stream.id())
            .field("active", &self.stream.is_active())
            .finish()
    }
}
