// SPDX-License-Identifier: GPL-3.0-only

//! Capture session
//!
//! Ties the stream manager, settings controls, live renderer and both
//! compositors together, and decides whether the camera path or the upload
//! path is active.
//!
//! The upload path is forced when live capture is impossible (host
//! restriction or permission denial). Otherwise the user may switch to it
//! manually, which releases the camera; switching back refreshes it.

use super::controls::{CameraControls, ControlAvailability};
use super::renderer::{self, BindingPlan, LiveRenderer};
use crate::backends::camera::{CameraFrame, CameraStreamManager, FacingMode};
use crate::pipelines::photo::{
    CapturedPhoto, SnapshotCompositor, SnapshotRequest, SnapshotSource, UploadCompositor,
};
use tracing::{debug, info};

/// Callback receiving every captured photo
pub type PhotoCallback = Box<dyn FnMut(CapturedPhoto) + Send>;

/// Which capture path is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Camera,
    /// `forced` when the camera is unavailable and there is no way back
    Upload { forced: bool },
}

/// One capture screen's worth of state
pub struct CaptureSession {
    manager: CameraStreamManager,
    controls: CameraControls,
    renderer: LiveRenderer,
    snapshot: SnapshotCompositor,
    upload: UploadCompositor,
    manual_upload: bool,
    on_photo: PhotoCallback,
}

impl CaptureSession {
    pub fn new(
        manager: CameraStreamManager,
        controls: CameraControls,
        on_photo: impl FnMut(CapturedPhoto) + Send + 'static,
    ) -> Self {
        Self {
            manager,
            controls,
            renderer: LiveRenderer::default(),
            snapshot: SnapshotCompositor::new(),
            upload: UploadCompositor::new(),
            manual_upload: false,
            on_photo: Box::new(on_photo),
        }
    }

    /// Initialize the cameras and bind the surfaces
    pub async fn start(&mut self) -> CaptureMode {
        self.manager.initialize().await;
        self.render();
        let mode = self.mode();
        info!(?mode, "Capture session started");
        mode
    }

    /// Re-plan and apply surface bindings from current streams and settings
    pub fn render(&mut self) -> BindingPlan {
        let settings = self.controls.settings();
        self.renderer.render(&self.manager, &settings)
    }

    pub fn mode(&self) -> CaptureMode {
        if self.upload_forced() {
            CaptureMode::Upload { forced: true }
        } else if self.manual_upload {
            CaptureMode::Upload { forced: false }
        } else {
            CaptureMode::Camera
        }
    }

    /// Live capture is impossible and upload is the only path
    pub fn upload_forced(&self) -> bool {
        !self.manager.is_loading()
            && (self.manager.permission_denied()
                || self.manager.error().is_some_and(|e| e.forces_upload()))
    }

    /// Whether the upload screen offers a way back to the camera
    pub fn show_camera_switch(&self) -> bool {
        self.mode() == CaptureMode::Upload { forced: false }
    }

    pub fn controls_availability(&self) -> ControlAvailability {
        ControlAvailability::for_device(self.manager.is_mobile())
    }

    /// Leave the camera path; held streams are released first
    pub fn switch_to_upload(&mut self) {
        if self.manual_upload {
            return;
        }
        info!("Switching to upload");
        self.manual_upload = true;
        self.manager.release();
        self.render();
    }

    /// Return to the camera path, dropping any loaded upload, and re-acquire
    /// streams
    pub async fn switch_to_camera(&mut self) {
        if self.upload_forced() {
            debug!("Camera unavailable, staying in upload");
            return;
        }
        info!("Switching to camera");
        self.manual_upload = false;
        self.upload.reset();
        self.manager.refresh().await;
        self.render();
    }

    /// External restart signal: discard any in-progress upload
    pub fn restart(&mut self) {
        debug!("Capture session restart");
        self.upload.restart();
    }

    pub fn is_camera_ready(&self) -> bool {
        self.mode() == CaptureMode::Camera
            && renderer::is_camera_ready(&self.manager, &self.renderer.plan())
    }

    /// Capture on the active path and hand the photo to the callback
    ///
    /// Returns whether a photo was delivered.
    pub fn capture(&mut self) -> bool {
        let photo = match self.mode() {
            CaptureMode::Camera => self.capture_snapshot(),
            CaptureMode::Upload { .. } => self.upload.capture(),
        };

        match photo {
            Some(photo) => {
                (self.on_photo)(photo);
                true
            }
            None => false,
        }
    }

    fn capture_snapshot(&mut self) -> Option<CapturedPhoto> {
        // Settings may have changed since the last render
        let plan = self.render();
        if !renderer::is_camera_ready(&self.manager, &plan) {
            debug!("Camera not ready, nothing captured");
            return None;
        }

        let frame_for = |facing: FacingMode| -> Option<CameraFrame> {
            self.manager.stream(facing)?.current_frame()
        };
        let main = plan.main.and_then(|b| Some((b.facing, frame_for(b.facing)?)));
        let inset = plan.inset.and_then(|b| Some((b.facing, frame_for(b.facing)?)));

        let request = SnapshotRequest {
            main: main
                .as_ref()
                .map(|(facing, frame)| SnapshotSource { frame, facing: *facing }),
            inset: inset
                .as_ref()
                .map(|(facing, frame)| SnapshotSource { frame, facing: *facing }),
            is_mobile: self.manager.is_mobile(),
            settings: self.controls.settings(),
        };
        self.snapshot.capture(&request)
    }

    pub fn manager(&self) -> &CameraStreamManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut CameraStreamManager {
        &mut self.manager
    }

    pub fn controls(&self) -> &CameraControls {
        &self.controls
    }

    /// Settings changes take effect on the next [`Self::render`] or capture
    pub fn controls_mut(&mut self) -> &mut CameraControls {
        &mut self.controls
    }

    pub fn renderer(&self) -> &LiveRenderer {
        &self.renderer
    }

    pub fn upload(&self) -> &UploadCompositor {
        &self.upload
    }

    pub fn upload_mut(&mut self) -> &mut UploadCompositor {
        &mut self.upload
    }

    /// Tear down streams; late acquisitions are discarded from here on
    pub fn unmount(&mut self) {
        self.manager.unmount();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("mode", &self.mode())
            .field("manager", &self.manager)
            .field("plan", &self.renderer.plan())
            .finish()
    }
}
