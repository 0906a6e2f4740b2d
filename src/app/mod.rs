// SPDX-License-Identifier: GPL-3.0-only

//! Capture screen logic
//!
//! This module contains the presentation-side state of the capture screen:
//! which stream shows where, the settings controls, and the session that
//! switches between the camera and upload paths.
//!
//! # Architecture
//!
//! - `renderer`: Binding plan and display surface binding
//! - `controls`: Overlay and settings-dialog actions
//! - `session`: Mode switching, capture dispatch and the photo callback
//!
//! # Main Types
//!
//! - `CaptureSession`: Owns the manager, controls, renderer and compositors
//! - `CaptureMode`: Camera or (possibly forced) upload

pub mod controls;
pub mod renderer;
pub mod session;

pub use controls::{CameraControls, ControlAvailability};
pub use renderer::{
    Binding, BindingPlan, DisplaySurface, LiveRenderer, VideoSurface, apply, is_camera_ready,
    plan_bindings,
};
pub use session::{CaptureMode, CaptureSession, PhotoCallback};
