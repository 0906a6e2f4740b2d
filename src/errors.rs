// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the capture core

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Camera capability or acquisition errors
    Camera(CameraError),
    /// Photo composition or encoding errors
    Photo(PhotoError),
    /// Upload compositor validation errors
    Upload(UploadError),
    /// Settings persistence errors
    Settings(SettingsError),
    /// File or runtime I/O errors
    Io(String),
    /// Generic error with message
    Other(String),
}

/// Camera capability errors surfaced to the UI
///
/// Every variant is recoverable by the user: granting permission, refreshing
/// the streams, or switching to the upload compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// Embedding host disallows direct camera access (desktop mini app)
    HostRestricted,
    /// User or host denied camera permission
    PermissionDenied,
    /// Resolution constraints could not be satisfied
    Overconstrained,
    /// Camera blocked by the embedding frame's permissions policy
    IframeBlocked,
    /// Enumeration and the unconstrained fallback both found nothing
    NoDevices,
    /// Anything else, with the backend's message
    Unknown(String),
}

impl CameraError {
    /// Short machine-readable kind, stable across releases
    pub fn kind(&self) -> &'static str {
        match self {
            CameraError::HostRestricted => "host-restricted",
            CameraError::PermissionDenied => "permission-denied",
            CameraError::Overconstrained => "overconstrained",
            CameraError::IframeBlocked => "iframe-blocked",
            CameraError::NoDevices => "no-devices",
            CameraError::Unknown(_) => "unknown",
        }
    }

    /// Follow-up hint shown under the error message, if any
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            CameraError::PermissionDenied => Some("Please refresh and grant camera permission"),
            CameraError::HostRestricted => Some("Upload an image instead"),
            CameraError::Overconstrained | CameraError::IframeBlocked => {
                Some("Try refreshing or upload an image instead")
            }
            CameraError::NoDevices | CameraError::Unknown(_) => None,
        }
    }

    /// Whether this error forces the upload compositor as the only path
    pub fn forces_upload(&self) -> bool {
        matches!(
            self,
            CameraError::HostRestricted | CameraError::PermissionDenied
        )
    }
}

/// Photo composition errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// No frame available for capture
    NoFrameAvailable,
    /// Frame buffer does not match its declared dimensions
    InvalidFrame(String),
    /// Encoding failed
    EncodingFailed(String),
    /// Writing the photo out failed
    SaveFailed(String),
}

/// Upload compositor errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Selected file is not an image
    NotAnImage(String),
    /// File claims to be an image but could not be decoded
    DecodeFailed(String),
}

/// Settings persistence errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Stored record is not valid JSON or misses fields
    Invalid(String),
    /// Backend rejected the write
    Backend(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Upload(e) => write!(f, "Upload error: {}", e),
            AppError::Settings(e) => write!(f, "Settings error: {}", e),
            AppError::Io(msg) => write!(f, "I/O error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::HostRestricted => write!(
                f,
                "Camera access not supported in desktop Farcaster Mini Apps. Please visit https://zory.me"
            ),
            CameraError::PermissionDenied => write!(f, "Camera permission denied"),
            CameraError::Overconstrained => {
                write!(f, "Camera constraints too strict - try refreshing")
            }
            CameraError::IframeBlocked => {
                write!(f, "Camera access blocked by iframe restrictions")
            }
            CameraError::NoDevices => write!(f, "No camera devices found"),
            CameraError::Unknown(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::NotAnImage(_) => write!(f, "Please select an image file"),
            UploadError::DecodeFailed(msg) => write!(f, "Could not decode image: {}", msg),
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Invalid(msg) => write!(f, "Invalid settings record: {}", msg),
            SettingsError::Backend(msg) => write!(f, "Settings backend error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for PhotoError {}
impl std::error::Error for UploadError {}
impl std::error::Error for SettingsError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::Upload(err)
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::Settings(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for PhotoError {
    fn from(err: std::io::Error) -> Self {
        PhotoError::SaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        PhotoError::EncodingFailed(err.to_string())
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Invalid(err.to_string())
    }
}
