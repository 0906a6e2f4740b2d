// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! The capture core never talks to a camera directly. It goes through the
//! [`MediaDevices`] trait, which mirrors the browser media-device API, and
//! receives [`VideoStream`] objects it wraps in owned [`StreamHandle`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │    CaptureSession    │
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │ CameraStreamManager  │  ← detection, dual acquisition, teardown
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │  MediaDevices trait  │  ← enumerate / get_user_media
//! └──────────┬───────────┘
//!            │
//!            ▼
//!   ┌──────────────────┐
//!   │ StillMediaDevices│  ← image-backed implementation
//!   └──────────────────┘
//! ```

pub mod manager;
pub mod still;
pub mod types;

pub use manager::{CameraStreamManager, MountGuard, StreamPresence};
pub use still::{StillCamera, StillMediaDevices};
pub use types::*;

use futures::future::BoxFuture;

/// A live video source returned by a successful acquisition
pub trait VideoStream: Send + Sync {
    /// Stable identity of this stream
    fn id(&self) -> &StreamId;

    /// Latest decoded frame, `None` until the stream is producing
    fn current_frame(&self) -> Option<CameraFrame>;

    /// Stop every underlying track
    ///
    /// Must be idempotent: the handle calls it on drop even if the stream
    /// already ended.
    fn stop_tracks(&self);

    /// False once the tracks were stopped
    fn is_active(&self) -> bool;
}

/// Media device access, the baseline camera capability
pub trait MediaDevices: Send + Sync {
    /// List every media device currently visible
    fn enumerate_devices(&self) -> BoxFuture<'_, Result<Vec<MediaDeviceInfo>, MediaError>>;

    /// Open a stream matching `constraints`
    ///
    /// Backends must not silently downgrade below `constraints.min`; they
    /// fail with an `OverconstrainedError` instead.
    fn get_user_media(
        &self,
        constraints: StreamConstraints,
    ) -> BoxFuture<'_, Result<Box<dyn VideoStream>, MediaError>>;
}
