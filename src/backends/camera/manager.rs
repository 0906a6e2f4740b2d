// SPDX-License-Identifier: GPL-3.0-only

//! Camera stream lifecycle manager
//!
//! The manager provides:
//! - Capability detection and device enumeration
//! - Independent, concurrent acquisition of the user- and environment-facing
//!   streams on mobile
//! - Teardown of every held stream on refresh, release, unmount and drop
//!
//! Stream slots are plain owned fields read by reference. Consumers that
//! need to react when a stream appears or disappears subscribe to the
//! [`StreamPresence`] watch channel, which only fires on presence changes.

use super::MediaDevices;
use super::types::*;
use crate::backends::capability::{
    CapabilityDetector, DetectorConfig, DeviceCapabilities, HostContext,
};
use crate::errors::CameraError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Which facing modes currently hold a stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamPresence {
    pub user: bool,
    pub environment: bool,
}

impl StreamPresence {
    pub fn has(&self, facing: FacingMode) -> bool {
        match facing {
            FacingMode::User => self.user,
            FacingMode::Environment => self.environment,
        }
    }

    pub fn any(&self) -> bool {
        self.user || self.environment
    }
}

/// Shared "still mounted" flag
///
/// Async results that arrive after [`MountGuard::unmount`] are stopped and
/// discarded instead of stored.
#[derive(Debug, Clone)]
pub struct MountGuard(Arc<AtomicBool>);

impl MountGuard {
    fn new() -> Self {
        MountGuard(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Camera stream manager
///
/// Exclusively owns at most one [`StreamHandle`] per facing mode.
pub struct CameraStreamManager {
    media: Arc<dyn MediaDevices>,
    host: Option<Arc<dyn HostContext>>,
    detector: CapabilityDetector,
    user_stream: Option<StreamHandle>,
    environment_stream: Option<StreamHandle>,
    devices: Vec<CameraDevice>,
    capabilities: DeviceCapabilities,
    is_loading: bool,
    error: Option<CameraError>,
    mounted: MountGuard,
    presence: watch::Sender<StreamPresence>,
}

impl CameraStreamManager {
    /// Create a manager; nothing is acquired until [`Self::initialize`]
    pub fn new(
        media: Arc<dyn MediaDevices>,
        host: Option<Arc<dyn HostContext>>,
        detector_config: DetectorConfig,
    ) -> Self {
        let (presence, _) = watch::channel(StreamPresence::default());
        Self {
            media,
            host,
            detector: CapabilityDetector::new(detector_config),
            user_stream: None,
            environment_stream: None,
            devices: Vec::new(),
            capabilities: DeviceCapabilities::default(),
            is_loading: true,
            error: None,
            mounted: MountGuard::new(),
            presence,
        }
    }

    /// Detect capabilities, enumerate cameras and acquire streams
    ///
    /// Never fails: problems end up in [`Self::error`].
    pub async fn initialize(&mut self) {
        if !self.mounted.is_mounted() {
            return;
        }

        self.is_loading = true;
        self.error = None;
        self.capabilities.permission_denied = false;

        let capabilities = self.detector.detect(self.host.as_deref()).await;
        if !self.mounted.is_mounted() {
            return;
        }

        let camera_available = capabilities.camera_available();
        self.error = capabilities.error.clone();
        self.capabilities = capabilities;
        if !camera_available {
            info!(error = ?self.error, "Live camera unavailable");
            self.finish_loading();
            return;
        }

        let media = Arc::clone(&self.media);
        let devices = match media.enumerate_devices().await {
            Ok(list) => list
                .iter()
                .filter(|d| d.kind == MediaDeviceKind::VideoInput)
                .map(CameraDevice::from_info)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to enumerate devices");
                Vec::new()
            }
        };
        info!(count = devices.len(), "Enumerated cameras");
        self.devices = devices;

        if self.devices.is_empty() {
            self.acquire_unconstrained().await;
            self.finish_loading();
            return;
        }

        if self.capabilities.is_mobile {
            // Both requests are in flight together; one failing never
            // delays or cancels the other.
            let (environment, user) = futures::join!(
                media.get_user_media(StreamConstraints::for_facing(FacingMode::Environment)),
                media.get_user_media(StreamConstraints::for_facing(FacingMode::User)),
            );

            let mut first_error = None;
            for (facing, result) in [
                (FacingMode::Environment, environment),
                (FacingMode::User, user),
            ] {
                match result {
                    Ok(stream) => self.store(facing, stream),
                    Err(e) => {
                        warn!(facing = %facing, error = %e, "Camera failed to initialize");
                        first_error.get_or_insert(e);
                    }
                }
            }

            if !self.presence().any()
                && let Some(e) = first_error
            {
                self.set_error(e.classify());
            }
        } else {
            match media
                .get_user_media(StreamConstraints::for_facing(FacingMode::User))
                .await
            {
                Ok(stream) => self.store(FacingMode::User, stream),
                Err(e) => {
                    warn!(error = %e, "Camera failed to initialize");
                    self.set_error(e.classify());
                }
            }
        }

        self.finish_loading();
    }

    /// Tear everything down and initialize again
    pub async fn refresh(&mut self) {
        info!("Refreshing camera streams");
        self.release();
        self.initialize().await;
    }

    /// Stop and drop every held stream
    pub fn release(&mut self) {
        let had_streams = self.user_stream.is_some() || self.environment_stream.is_some();
        self.user_stream = None;
        self.environment_stream = None;
        if had_streams {
            debug!("Released camera streams");
        }
        self.publish_presence();
    }

    /// Mark the manager unmounted and release its streams
    pub fn unmount(&mut self) {
        self.mounted.unmount();
        self.release();
    }

    /// Guard that can unmount the manager from elsewhere
    pub fn mount_guard(&self) -> MountGuard {
        self.mounted.clone()
    }

    /// Held stream for `facing`, by reference
    pub fn stream(&self, facing: FacingMode) -> Option<&StreamHandle> {
        match facing {
            FacingMode::User => self.user_stream.as_ref(),
            FacingMode::Environment => self.environment_stream.as_ref(),
        }
    }

    pub fn presence(&self) -> StreamPresence {
        StreamPresence {
            user: self.user_stream.is_some(),
            environment: self.environment_stream.is_some(),
        }
    }

    /// Receiver notified whenever stream presence changes
    pub fn subscribe(&self) -> watch::Receiver<StreamPresence> {
        self.presence.subscribe()
    }

    pub fn devices(&self) -> &[CameraDevice] {
        &self.devices
    }

    pub fn number_of_cameras(&self) -> usize {
        self.devices.len()
    }

    pub fn is_mobile(&self) -> bool {
        self.capabilities.is_mobile
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&CameraError> {
        self.error.as_ref()
    }

    pub fn permission_denied(&self) -> bool {
        self.capabilities.permission_denied
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    async fn acquire_unconstrained(&mut self) {
        let media = Arc::clone(&self.media);
        match media
            .get_user_media(StreamConstraints::unconstrained())
            .await
        {
            Ok(stream) => {
                self.store(FacingMode::User, stream);
                if self.user_stream.is_some() {
                    return;
                }
            }
            Err(e) => debug!(error = %e, "Unconstrained camera request failed"),
        }
        self.set_error(CameraError::NoDevices);
    }

    fn store(&mut self, facing: FacingMode, stream: Box<dyn super::VideoStream>) {
        if !self.mounted.is_mounted() {
            debug!(facing = %facing, "Discarding stream acquired after unmount");
            stream.stop_tracks();
            return;
        }

        info!(facing = %facing, id = %stream.id(), "Camera stream acquired");
        let handle = StreamHandle::new(facing, stream);
        // Assigning drops the previous handle, which stops its tracks
        match facing {
            FacingMode::User => self.user_stream = Some(handle),
            FacingMode::Environment => self.environment_stream = Some(handle),
        }
    }

    fn set_error(&mut self, error: CameraError) {
        if error == CameraError::PermissionDenied {
            self.capabilities.permission_denied = true;
        }
        self.error = Some(error);
    }

    fn finish_loading(&mut self) {
        if self.mounted.is_mounted() {
            self.is_loading = false;
        }
        self.publish_presence();
    }

    fn publish_presence(&self) {
        let current = self.presence();
        self.presence.send_if_modified(|presence| {
            if *presence != current {
                *presence = current;
                true
            } else {
                false
            }
        });
    }
}

impl Drop for CameraStreamManager {
    fn drop(&mut self) {
        self.mounted.unmount();
    }
}

impl std::fmt::Debug for CameraStreamManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraStreamManager")
            .field("presence", &self.presence())
            .field("is_mobile", &self.capabilities.is_mobile)
            .field("is_loading", &self.is_loading)
            .field("error", &self.error)
            .finish()
    }
}
