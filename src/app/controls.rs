// SPDX-License-Identifier: GPL-3.0-only

//! Camera controls
//!
//! Overlay buttons and settings-dialog actions. Every action writes through
//! the [`SettingsStore`], so the renderer picks the change up on its next
//! render and the next capture composites with it.

use crate::backends::camera::FacingMode;
use crate::config::{
    CameraSettings, CameraSettingsUpdate, InsetPosition, InsetShape, SettingsStore,
};
use tracing::{debug, info};

/// Which overlay controls are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlAvailability {
    /// Switch to the file-upload path
    pub upload: bool,
    /// Flip main and inset cameras
    pub flip: bool,
    /// Inset settings (visibility, corner, shape)
    pub settings: bool,
}

impl ControlAvailability {
    /// Upload is always offered; flip and settings are mobile only
    pub fn for_device(is_mobile: bool) -> Self {
        Self {
            upload: true,
            flip: is_mobile,
            settings: is_mobile,
        }
    }
}

/// Settings actions bound to the overlay and dialog
#[derive(Debug)]
pub struct CameraControls {
    store: SettingsStore,
}

impl CameraControls {
    pub fn new(store: SettingsStore) -> Self {
        Self { store }
    }

    pub fn settings(&self) -> CameraSettings {
        self.store.get()
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Effective main camera for this device
    pub fn main_camera(&self, is_mobile: bool) -> FacingMode {
        self.store.main_camera(is_mobile)
    }

    pub fn toggle_inset(&mut self) -> CameraSettings {
        let show = !self.store.get().show_inset;
        debug!(show, "Toggling inset");
        self.store.update(CameraSettingsUpdate::show_inset(show))
    }

    pub fn cycle_inset_position(&mut self) -> CameraSettings {
        let next = self.store.get().inset_position.next();
        self.set_inset_position(next)
    }

    pub fn cycle_inset_shape(&mut self) -> CameraSettings {
        let next = self.store.get().inset_shape.next();
        self.set_inset_shape(next)
    }

    /// Swap which camera is main; ignored on single-camera devices
    pub fn flip_main_camera(&mut self, is_mobile: bool) -> CameraSettings {
        if !is_mobile {
            debug!("Flip ignored on non-mobile device");
            return self.store.get();
        }
        let next = self.store.get().main_camera.opposite();
        info!(main = %next, "Flipping main camera");
        self.set_main_camera(next)
    }

    pub fn set_main_camera(&mut self, facing: FacingMode) -> CameraSettings {
        self.store.update(CameraSettingsUpdate::main_camera(facing))
    }

    pub fn set_show_inset(&mut self, show: bool) -> CameraSettings {
        self.store.update(CameraSettingsUpdate::show_inset(show))
    }

    pub fn set_inset_position(&mut self, position: InsetPosition) -> CameraSettings {
        self.store
            .update(CameraSettingsUpdate::inset_position(position))
    }

    pub fn set_inset_shape(&mut self, shape: InsetShape) -> CameraSettings {
        self.store.update(CameraSettingsUpdate::inset_shape(shape))
    }

    /// Apply several fields at once, as the settings dialog does on save
    pub fn apply(&mut self, update: CameraSettingsUpdate) -> CameraSettings {
        self.store.update(update)
    }

    pub fn reset(&mut self) -> CameraSettings {
        self.store.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn controls() -> CameraControls {
        CameraControls::new(SettingsStore::load(Arc::new(MemoryStore::new())))
    }

    #[test]
    fn flip_is_mobile_only() {
        let mut controls = controls();
        assert_eq!(
            controls.flip_main_camera(false).main_camera,
            FacingMode::Environment
        );
        assert_eq!(controls.flip_main_camera(true).main_camera, FacingMode::User);
        assert_eq!(controls.main_camera(false), FacingMode::User);
    }

    #[test]
    fn cycles_and_toggles() {
        let mut controls = controls();
        assert!(!controls.toggle_inset().show_inset);
        assert_eq!(
            controls.cycle_inset_position().inset_position,
            InsetPosition::TopLeft
        );
        assert_eq!(controls.cycle_inset_shape().inset_shape, InsetShape::Rounded);
        assert_eq!(controls.reset(), CameraSettings::default());
    }

    #[test]
    fn desktop_shows_only_upload() {
        let availability = ControlAvailability::for_device(false);
        assert!(availability.upload);
        assert!(!availability.flip);
        assert!(!availability.settings);
    }
}
