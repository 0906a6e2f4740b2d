// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for captured photos
//!
//! Composition runs on demand, once per capture, against frames read at the
//! moment of capture. Surfaces are allocated per capture and never pooled.
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Snapshot         │ ──▶ │              │
//! │   (RGBA)     │     │  - Square crop    │     │  JPEG photo  │
//! │              │     │  - Inset overlay  │     │  (data URI)  │
//! └──────────────┘     └───────────────────┘     │              │
//!                                                │              │
//! ┌──────────────┐     ┌───────────────────┐     │              │
//! │ Image File   │ ──▶ │  Upload           │ ──▶ │              │
//! │              │     │  - Pan / zoom     │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Raster primitives, both compositors and JPEG encoding

pub mod photo;
