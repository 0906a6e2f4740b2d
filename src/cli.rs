// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for capture operations
//!
//! This module provides command-line functionality for:
//! - Listing the cameras a simulated device exposes
//! - Taking a composited photo from still-image cameras
//! - Positioning and capturing an uploaded image

use chrono::Local;
use kurbo::Point;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use zory_camera::app::{CameraControls, CaptureMode, CaptureSession};
use zory_camera::backends::camera::{
    CameraStreamManager, FacingMode, StillCamera, StillMediaDevices,
};
use zory_camera::backends::capability::{
    DetectorConfig, HostContext, HostContextInfo, StaticHostContext,
};
use zory_camera::config::{InsetPosition, InsetShape, SettingsStore};
use zory_camera::constants::file_formats;
use zory_camera::constants::settings::STORAGE_KEY;
use zory_camera::errors::AppResult;
use zory_camera::pipelines::photo::{
    CapturedPhoto, ImagePosition, SelectedFile, UploadCompositor,
};
use zory_camera::storage::MemoryStore;

/// User agent reported when `--mobile` is given
const MOBILE_USER_AGENT: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Simulated device: still images standing in for cameras
#[derive(Debug, Clone, Default)]
pub struct DeviceOptions {
    /// Image shown by the environment-facing camera
    pub back: Option<PathBuf>,
    /// Image shown by the user-facing camera
    pub front: Option<PathBuf>,
    pub mobile: bool,
    /// Pretend to run inside an embedding host with this platform type
    pub host_platform: Option<String>,
    /// Host already granted camera access
    pub host_granted: bool,
    /// Host refuses the permission prompt
    pub host_deny: bool,
}

impl DeviceOptions {
    fn media_devices(&self) -> AppResult<StillMediaDevices> {
        let mut cameras = Vec::new();
        for (path, facing) in [
            (&self.back, FacingMode::Environment),
            (&self.front, FacingMode::User),
        ] {
            if let Some(path) = path {
                check_image_path(path)?;
                cameras.push(StillCamera::from_path(path, Some(facing))?);
            }
        }
        Ok(StillMediaDevices::new(cameras))
    }

    fn host(&self) -> Option<Arc<dyn HostContext>> {
        let platform = self.host_platform.clone()?;
        let host = StaticHostContext::new(
            HostContextInfo {
                platform_type: Some(platform),
                camera_and_microphone_granted: self.host_granted,
            },
            !self.host_deny,
        );
        Some(Arc::new(host))
    }

    fn detector_config(&self) -> DetectorConfig {
        let user_agent = if self.mobile {
            MOBILE_USER_AGENT
        } else {
            DESKTOP_USER_AGENT
        };
        DetectorConfig {
            user_agent: user_agent.to_string(),
            local_environment: false,
        }
    }

    fn manager(&self) -> AppResult<CameraStreamManager> {
        Ok(CameraStreamManager::new(
            Arc::new(self.media_devices()?),
            self.host(),
            self.detector_config(),
        ))
    }
}

/// Settings sources and overrides
#[derive(Debug, Clone, Default)]
pub struct SettingsOptions {
    /// JSON settings record, validated like a stored one
    pub settings_file: Option<PathBuf>,
    pub main_camera: Option<FacingMode>,
    pub hide_inset: bool,
    pub position: Option<InsetPosition>,
    pub shape: Option<InsetShape>,
}

impl SettingsOptions {
    fn controls(&self) -> AppResult<CameraControls> {
        let backend = match &self.settings_file {
            Some(path) => MemoryStore::with_entry(STORAGE_KEY, &std::fs::read_to_string(path)?),
            None => MemoryStore::new(),
        };
        let mut controls = CameraControls::new(SettingsStore::load(Arc::new(backend)));

        if let Some(main) = self.main_camera {
            controls.set_main_camera(main);
        }
        if self.hide_inset {
            controls.set_show_inset(false);
        }
        if let Some(position) = self.position {
            controls.set_inset_position(position);
        }
        if let Some(shape) = self.shape {
            controls.set_inset_shape(shape);
        }
        Ok(controls)
    }
}

/// Upload positioning requested on the command line
#[derive(Debug, Clone, Default)]
pub struct PlacementOptions {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
    /// Drag by this offset in preview pixels
    pub drag: Option<(f64, f64)>,
    /// Wheel steps; positive zooms in, negative zooms out
    pub zoom_steps: i32,
}

/// List the cameras of the simulated device
pub fn list_devices(device: DeviceOptions) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let mut manager = device.manager()?;
    rt.block_on(manager.initialize());

    if let Some(error) = manager.error() {
        println!("Camera unavailable: {}", error);
        if let Some(hint) = error.remediation() {
            println!("  {}", hint);
        }
    }

    if manager.devices().is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!(
        "Available cameras ({}):",
        if manager.is_mobile() {
            "mobile"
        } else {
            "desktop"
        }
    );
    println!();
    for (index, camera) in manager.devices().iter().enumerate() {
        println!("  [{}] {}", index, camera.label);
    }
    println!();

    for facing in [FacingMode::Environment, FacingMode::User] {
        if let Some(stream) = manager.stream(facing) {
            let (width, height) = stream.video_dimensions();
            println!(
                "  {} stream: {}x{} ({})",
                facing.display_name(),
                width,
                height,
                stream.id()
            );
        }
    }

    manager.release();
    Ok(())
}

/// Composite a photo from the simulated cameras
pub fn take_photo(
    device: DeviceOptions,
    settings: SettingsOptions,
    output: Option<PathBuf>,
    data_uri: bool,
) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let captured: Arc<Mutex<Option<CapturedPhoto>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);
    let mut session = CaptureSession::new(device.manager()?, settings.controls()?, move |photo| {
        if let Ok(mut slot) = sink.lock() {
            *slot = Some(photo);
        }
    });

    if let CaptureMode::Upload { .. } = rt.block_on(session.start()) {
        let reason = session
            .manager()
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Camera unavailable".to_string());
        return Err(format!("{}; use the upload command instead", reason).into());
    }

    println!("Settings: {:?}", session.controls().settings());
    println!("Capturing...");
    if !session.capture() {
        return Err("Camera not ready, no photo captured".into());
    }
    session.unmount();

    let photo = captured
        .lock()
        .map_err(|_| "Photo callback poisoned")?
        .take()
        .ok_or("No photo delivered")?;
    deliver(&photo, output, data_uri)
}

/// Position an image file and capture it
pub fn upload_photo(
    image: PathBuf,
    placement: PlacementOptions,
    output: Option<PathBuf>,
    data_uri: bool,
) -> AppResult<()> {
    let mut upload = UploadCompositor::new();
    let fitted = upload.select_file(SelectedFile::from_path(&image)?)?;
    println!(
        "Fitted {} at ({:.1}, {:.1}) scale {:.3}",
        image.display(),
        fitted.x,
        fitted.y,
        fitted.scale
    );

    if placement.x.is_some() || placement.y.is_some() || placement.scale.is_some() {
        upload.set_position(ImagePosition {
            x: placement.x.unwrap_or(fitted.x),
            y: placement.y.unwrap_or(fitted.y),
            scale: placement.scale.unwrap_or(fitted.scale),
        });
    }

    if let Some((dx, dy)) = placement.drag
        && let Some(position) = upload.position()
    {
        let grab = Point::new(position.x, position.y);
        upload.pointer_down(grab);
        upload.pointer_move(Point::new(grab.x + dx, grab.y + dy));
        upload.pointer_up();
    }

    for _ in 0..placement.zoom_steps.unsigned_abs() {
        // Scrolling up (negative delta) zooms in
        upload.wheel(if placement.zoom_steps > 0 { -1.0 } else { 1.0 });
    }

    if let Some(position) = upload.position() {
        println!(
            "Placed at ({:.1}, {:.1}) scale {:.3}",
            position.x, position.y, position.scale
        );
    }

    let photo = upload.capture().ok_or("Failed to capture uploaded image")?;
    deliver(&photo, output, data_uri)
}

fn deliver(
    photo: &CapturedPhoto,
    output: Option<PathBuf>,
    data_uri: bool,
) -> AppResult<()> {
    if data_uri {
        println!("{}", photo.data_uri());
        return Ok(());
    }
    let path = photo.save(&resolve_output(output))?;
    println!(
        "Photo saved: {} ({}x{})",
        path.display(),
        photo.width(),
        photo.height()
    );
    Ok(())
}

fn resolve_output(output: Option<PathBuf>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(photo_file_name()),
        Some(path) => path,
        None => get_default_photo_dir().join(photo_file_name()),
    }
}

fn photo_file_name() -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("zory_{}.jpg", timestamp)
}

fn check_image_path(path: &Path) -> Result<(), String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if file_formats::is_image_extension(extension) {
        Ok(())
    } else {
        Err(format!("Not an image file: {}", path.display()))
    }
}

fn get_default_photo_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("zory")
}
