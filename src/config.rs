// SPDX-License-Identifier: GPL-3.0-only

//! Camera presentation settings and their session store

use crate::backends::camera::types::FacingMode;
use crate::constants::settings::STORAGE_KEY;
use crate::errors::SettingsError;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Corner of the main surface the inset is pinned to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsetPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl InsetPosition {
    /// All positions in the order the settings dialog lists them
    pub const ALL: [InsetPosition; 4] = [
        InsetPosition::TopLeft,
        InsetPosition::TopRight,
        InsetPosition::BottomLeft,
        InsetPosition::BottomRight,
    ];

    /// Label shown in the settings dialog
    pub fn display_name(&self) -> &'static str {
        match self {
            InsetPosition::TopLeft => "Top Left",
            InsetPosition::TopRight => "Top Right",
            InsetPosition::BottomLeft => "Bottom Left",
            InsetPosition::BottomRight => "Bottom Right",
        }
    }

    /// Next position in dialog order, wrapping around
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// Clip shape of the inset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsetShape {
    /// Full circle
    #[default]
    Round,
    /// Square with rounded corners
    Rounded,
    /// Plain square
    Square,
}

impl InsetShape {
    pub const ALL: [InsetShape; 3] = [InsetShape::Round, InsetShape::Rounded, InsetShape::Square];

    /// Label shown in the settings dialog
    pub fn display_name(&self) -> &'static str {
        match self {
            InsetShape::Round => "Round",
            InsetShape::Rounded => "Rounded",
            InsetShape::Square => "Square",
        }
    }

    /// Next shape in dialog order, wrapping around
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// User-adjustable presentation preferences
///
/// Serialized with camelCase keys. Every field is required on read: a record
/// missing any of them fails to deserialize and is replaced by defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSettings {
    /// Facing mode treated as primary on multi-camera devices
    pub main_camera: FacingMode,
    /// Whether the picture-in-picture inset is shown and composited
    pub show_inset: bool,
    /// Inset corner
    pub inset_position: InsetPosition,
    /// Inset clip shape
    pub inset_shape: InsetShape,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            main_camera: FacingMode::Environment,
            show_inset: true,
            inset_position: InsetPosition::BottomRight,
            inset_shape: InsetShape::Round,
        }
    }
}

impl CameraSettings {
    /// Parse a persisted record, rejecting partial or corrupt ones
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Facing mode the renderer should treat as main
    ///
    /// Single-camera (desktop) contexts always use the user-facing camera,
    /// whatever is stored.
    pub fn effective_main_camera(&self, is_mobile: bool) -> FacingMode {
        if is_mobile {
            self.main_camera
        } else {
            FacingMode::User
        }
    }

    /// Apply a partial update, last write wins per field
    pub fn merged(mut self, update: &CameraSettingsUpdate) -> Self {
        if let Some(main_camera) = update.main_camera {
            self.main_camera = main_camera;
        }
        if let Some(show_inset) = update.show_inset {
            self.show_inset = show_inset;
        }
        if let Some(position) = update.inset_position {
            self.inset_position = position;
        }
        if let Some(shape) = update.inset_shape {
            self.inset_shape = shape;
        }
        self
    }
}

/// Partial settings record; `None` fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraSettingsUpdate {
    pub main_camera: Option<FacingMode>,
    pub show_inset: Option<bool>,
    pub inset_position: Option<InsetPosition>,
    pub inset_shape: Option<InsetShape>,
}

impl CameraSettingsUpdate {
    pub fn main_camera(facing: FacingMode) -> Self {
        Self {
            main_camera: Some(facing),
            ..Self::default()
        }
    }

    pub fn show_inset(show: bool) -> Self {
        Self {
            show_inset: Some(show),
            ..Self::default()
        }
    }

    pub fn inset_position(position: InsetPosition) -> Self {
        Self {
            inset_position: Some(position),
            ..Self::default()
        }
    }

    pub fn inset_shape(shape: InsetShape) -> Self {
        Self {
            inset_shape: Some(shape),
            ..Self::default()
        }
    }
}

/// Settings record with write-through persistence
///
/// Updates are applied in memory first, so a `get()` right after `update()`
/// always observes the update even if the backend write fails.
pub struct SettingsStore {
    current: CameraSettings,
    backend: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    /// Restore settings from `backend`, falling back to defaults
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let current = match backend.get(STORAGE_KEY) {
            Some(raw) => match CameraSettings::from_json(&raw) {
                Ok(settings) => {
                    debug!(?settings, "Restored camera settings");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Discarding stored camera settings");
                    CameraSettings::default()
                }
            },
            None => CameraSettings::default(),
        };

        let store = Self { current, backend };
        store.persist();
        store
    }

    /// Current settings
    pub fn get(&self) -> CameraSettings {
        self.current
    }

    /// Merge `update` into the current settings and persist the result
    pub fn update(&mut self, update: CameraSettingsUpdate) -> CameraSettings {
        self.current = self.current.merged(&update);
        debug!(settings = ?self.current, "Camera settings updated");
        self.persist();
        self.current
    }

    /// Drop the stored record and go back to defaults
    pub fn reset(&mut self) -> CameraSettings {
        if let Err(e) = self.backend.remove(STORAGE_KEY) {
            warn!(error = %e, "Failed to remove stored camera settings");
        }
        self.current = CameraSettings::default();
        self.persist();
        self.current
    }

    /// Effective main camera for the renderer
    pub fn main_camera(&self, is_mobile: bool) -> FacingMode {
        self.current.effective_main_camera(is_mobile)
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.current)
            .map_err(SettingsError::from)
            .and_then(|json| self.backend.set(STORAGE_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to save camera settings");
        }
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn serializes_with_web_field_names() {
        let json = serde_json::to_string(&CameraSettings::default()).unwrap();
        assert!(json.contains("\"mainCamera\":\"environment\""));
        assert!(json.contains("\"showInset\":true"));
        assert!(json.contains("\"insetPosition\":\"bottom-right\""));
        assert!(json.contains("\"insetShape\":\"round\""));
    }

    #[test]
    fn invalid_enum_value_is_rejected() {
        let raw = r#"{"mainCamera":"sideways","showInset":true,"insetPosition":"top-left","insetShape":"round"}"#;
        assert!(CameraSettings::from_json(raw).is_err());
    }

    #[test]
    fn cycles_wrap_around() {
        assert_eq!(InsetPosition::BottomRight.next(), InsetPosition::TopLeft);
        assert_eq!(InsetShape::Square.next(), InsetShape::Round);
    }

    #[test]
    fn load_persists_defaults() {
        let backend = MemoryStore::new();
        let store = SettingsStore::load(Arc::new(backend.clone()));
        assert_eq!(store.get(), CameraSettings::default());
        assert!(backend.get(STORAGE_KEY).is_some());
    }

    #[test]
    fn desktop_forces_user_camera() {
        let settings = CameraSettings::default();
        assert_eq!(settings.effective_main_camera(false), FacingMode::User);
        assert_eq!(settings.effective_main_camera(true), FacingMode::Environment);
    }
}
