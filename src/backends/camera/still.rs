// SPDX-License-Identifier: GPL-3.0-only

//! Still-image media backend
//!
//! Serves fixed frames (decoded image files or in-memory buffers) as camera
//! streams. Each camera can be scripted to fail acquisition with a given
//! [`MediaError`], which is how the CLI simulates a device and how tests
//! exercise partial acquisition failures.

use super::types::{
    CameraFrame, FacingMode, MediaDeviceInfo, MediaDeviceKind, MediaError, Resolution,
    StreamConstraints, StreamId,
};
use super::{MediaDevices, VideoStream};
use crate::errors::PhotoError;
use futures::future::BoxFuture;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Load an image file as a camera frame
pub fn load_image_as_frame(path: &Path) -> Result<CameraFrame, PhotoError> {
    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        PhotoError::InvalidFrame(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let frame = CameraFrame::from_rgba_image(img.to_rgba8());
    info!(width = frame.width, height = frame.height, "Image loaded successfully");
    Ok(frame)
}

/// One simulated camera
#[derive(Debug, Clone)]
pub struct StillCamera {
    pub device_id: String,
    pub label: String,
    pub facing: Option<FacingMode>,
    /// Frame every stream of this camera shows; `None` means never ready
    pub frame: Option<CameraFrame>,
    /// Acquisition always fails with this error when set
    pub failure: Option<MediaError>,
}

impl StillCamera {
    pub fn new(device_id: &str, facing: Option<FacingMode>, frame: CameraFrame) -> Self {
        Self {
            device_id: device_id.to_string(),
            label: String::new(),
            facing,
            frame: Some(frame),
            failure: None,
        }
    }

    /// Camera backed by an image file
    pub fn from_path(path: &Path, facing: Option<FacingMode>) -> Result<Self, PhotoError> {
        let frame = load_image_as_frame(path)?;
        let device_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "still".to_string());
        Ok(Self::new(&device_id, facing, frame).with_label(&path.display().to_string()))
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Make every acquisition of this camera fail
    pub fn failing(mut self, error: MediaError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Camera that opens but never delivers a frame
    pub fn without_frame(mut self) -> Self {
        self.frame = None;
        self
    }

    fn resolution(&self) -> Option<Resolution> {
        self.frame
            .as_ref()
            .map(|f| Resolution::new(f.width, f.height))
    }
}

struct StillStream {
    id: StreamId,
    frame: Option<CameraFrame>,
    active: Arc<AtomicBool>,
}

impl VideoStream for StillStream {
    fn id(&self) -> &StreamId {
        &self.id
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        if self.active.load(Ordering::SeqCst) {
            self.frame.clone()
        } else {
            None
        }
    }

    fn stop_tracks(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!(id = %self.id, "Still stream stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Media devices backed by still images
#[derive(Default)]
pub struct StillMediaDevices {
    cameras: Vec<StillCamera>,
    /// Cameras stay acquirable but are not listed by enumeration
    hidden: bool,
    enumeration_failure: Option<MediaError>,
    opened: Mutex<Vec<Arc<AtomicBool>>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    requests: Mutex<Vec<StreamConstraints>>,
}

impl StillMediaDevices {
    pub fn new(cameras: Vec<StillCamera>) -> Self {
        Self {
            cameras,
            ..Self::default()
        }
    }

    /// Hide cameras from enumeration, like a browser before permission
    pub fn hidden_from_enumeration(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn failing_enumeration(mut self, error: MediaError) -> Self {
        self.enumeration_failure = Some(error);
        self
    }

    /// Streams opened and not yet stopped
    pub fn active_stream_count(&self) -> usize {
        self.opened
            .lock()
            .map(|opened| opened.iter().filter(|a| a.load(Ordering::SeqCst)).count())
            .unwrap_or(0)
    }

    /// Total streams ever opened
    pub fn opened_stream_count(&self) -> usize {
        self.opened.lock().map(|o| o.len()).unwrap_or(0)
    }

    /// Highest number of acquisitions that were pending at the same time
    pub fn peak_concurrent_acquisitions(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Constraints of every acquisition request, in call order
    pub fn requests(&self) -> Vec<StreamConstraints> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn select_camera(&self, constraints: &StreamConstraints) -> Option<&StillCamera> {
        match constraints.facing_mode {
            // Facing mode is a preference: fall back to any camera
            Some(facing) => self
                .cameras
                .iter()
                .find(|c| c.facing == Some(facing))
                .or_else(|| self.cameras.iter().find(|c| c.facing.is_none())),
            None => self.cameras.first(),
        }
    }

    fn open(&self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>, MediaError> {
        let camera = self
            .select_camera(constraints)
            .ok_or_else(MediaError::not_found)?;

        if let Some(error) = &camera.failure {
            return Err(error.clone());
        }

        if let (Some(min), Some(resolution)) = (&constraints.min, camera.resolution())
            && !resolution.satisfies(min)
        {
            return Err(MediaError::overconstrained(&format!(
                "{} below minimum {}",
                resolution, min
            )));
        }

        let active = Arc::new(AtomicBool::new(true));
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(Arc::clone(&active));
        }

        let stream = StillStream {
            id: StreamId::new_random(),
            frame: camera.frame.clone(),
            active,
        };
        info!(device = %camera.device_id, id = %stream.id, "Opened still stream");
        Ok(Box::new(stream))
    }
}

impl MediaDevices for StillMediaDevices {
    fn enumerate_devices(&self) -> BoxFuture<'_, Result<Vec<MediaDeviceInfo>, MediaError>> {
        Box::pin(async move {
            if let Some(error) = &self.enumeration_failure {
                return Err(error.clone());
            }
            if self.hidden {
                return Ok(Vec::new());
            }
            Ok(self
                .cameras
                .iter()
                .map(|c| MediaDeviceInfo {
                    device_id: c.device_id.clone(),
                    kind: MediaDeviceKind::VideoInput,
                    label: c.label.clone(),
                })
                .collect())
        })
    }

    fn get_user_media(
        &self,
        constraints: StreamConstraints,
    ) -> BoxFuture<'_, Result<Box<dyn VideoStream>, MediaError>> {
        Box::pin(async move {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(constraints.clone());
            }

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            // Give sibling acquisitions a chance to start before this one settles
            tokio::task::yield_now().await;

            let result = self.open(&constraints);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn frame(w: u32, h: u32) -> CameraFrame {
        CameraFrame::from_rgba_image(RgbaImage::new(w, h))
    }

    #[tokio::test]
    async fn rejects_streams_below_minimum() {
        let devices = StillMediaDevices::new(vec![StillCamera::new(
            "tiny",
            Some(FacingMode::User),
            frame(320, 240),
        )]);
        let err = devices
            .get_user_media(StreamConstraints::for_facing(FacingMode::User))
            .await
            .err()
            .unwrap();
        assert_eq!(err.name, "OverconstrainedError");
    }

    #[tokio::test]
    async fn stopped_stream_stops_delivering_frames() {
        let devices = StillMediaDevices::new(vec![StillCamera::new("cam", None, frame(640, 480))]);
        let stream = devices
            .get_user_media(StreamConstraints::unconstrained())
            .await
            .unwrap();
        assert!(stream.current_frame().is_some());
        assert_eq!(devices.active_stream_count(), 1);
        stream.stop_tracks();
        stream.stop_tracks();
        assert!(stream.current_frame().is_none());
        assert_eq!(devices.active_stream_count(), 0);
    }

    #[tokio::test]
    async fn hidden_cameras_are_still_acquirable() {
        let devices =
            StillMediaDevices::new(vec![StillCamera::new("cam", None, frame(640, 480))])
                .hidden_from_enumeration();
        assert!(devices.enumerate_devices().await.unwrap().is_empty());
        assert!(
            devices
                .get_user_media(StreamConstraints::unconstrained())
                .await
                .is_ok()
        );
    }
}
