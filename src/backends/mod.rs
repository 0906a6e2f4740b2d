// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera access
//!
//! This module provides the collaborator seams the capture core talks to:
//! - Host context probing and capability detection
//! - Camera device enumeration and stream acquisition
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────┐    ┌──────────────────┐   │
//! │  │ Capability  │    │     Camera       │   │
//! │  │ (host, UA)  │    │ (MediaDevices)   │   │
//! │  └─────────────┘    └──────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`capability`]: Host probe, mobile detection and restriction checks
//! - [`camera`]: Stream manager, media traits and the still-image backend

pub mod camera;
pub mod capability;
