// SPDX-License-Identifier: GPL-3.0-only

//! Zory Camera - photo capture and compositing core
//!
//! This library acquires front and back camera streams, shows them as a
//! main view with a picture-in-picture inset, and composites square photos
//! either from the live cameras or from an uploaded image.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Capture session, live renderer and controls
//! - [`backends`]: Capability detection, media traits and stream management
//! - [`pipelines`]: Snapshot and upload compositors, JPEG encoding
//! - [`config`]: Camera settings and their session store
//! - [`storage`]: Key-value storage backends
//!
//! # Example
//!
//! ```ignore
//! let mut session = CaptureSession::new(manager, controls, |photo| {
//!     println!("{}", photo.data_uri());
//! });
//! session.start().await;
//! session.capture();
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use app::{CaptureMode, CaptureSession};
pub use backends::camera::{CameraStreamManager, FacingMode};
pub use config::{CameraSettings, InsetPosition, InsetShape, SettingsStore};
pub use errors::{AppError, AppResult, CameraError};
pub use pipelines::photo::{CapturedPhoto, UploadCompositor};
