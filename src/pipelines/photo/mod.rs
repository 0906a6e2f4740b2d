// SPDX-License-Identifier: GPL-3.0-only

//! Photo compositing pipeline
//!
//! Two compositors produce the same [`CapturedPhoto`]:
//!
//! ```text
//! Camera path:  main frame + inset frame → SnapshotCompositor ─┐
//!                                                             ├→ JPEG → caller
//! File path:    image file + gestures    → UploadCompositor  ─┘
//! ```
//!
//! # Stages
//!
//! 1. **Raster**: Pure drawing primitives (transformed blit, clip, stroke)
//! 2. **Composition**: Square crop, mirroring, inset overlay or user placement
//! 3. **Encoding**: Maximum-quality JPEG plus data-URI form

pub mod encoding;
pub mod gestures;
pub mod raster;
pub mod snapshot;
pub mod upload;

pub use encoding::{CapturedPhoto, PhotoEncoder};
pub use gestures::{GestureTracker, ImagePosition};
pub use snapshot::{SnapshotCompositor, SnapshotRequest, SnapshotSource};
pub use upload::{SelectedFile, UploadCompositor, UploadState};
