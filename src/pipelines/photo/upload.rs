// SPDX-License-Identifier: GPL-3.0-only

//! File-upload compositor
//!
//! The alternative to the live camera: the user picks an image file, pans
//! and zooms it inside a square preview, and captures a square photo.
//!
//! ```text
//! Empty ──select_file──▶ Positioning ──capture──▶ Empty
//!                            │  ▲
//!                            │  └── pointer / touch / wheel
//!                            └──reset / restart──▶ Empty
//! ```

use super::encoding::{CapturedPhoto, PhotoEncoder};
use super::gestures::{GestureTracker, ImagePosition};
use super::raster::{self, BLACK, Canvas};
use crate::constants::file_formats;
use crate::constants::upload::{OUTPUT_SIZE, PREVIEW_SIZE, output_scale_factor};
use crate::errors::{PhotoError, UploadError};
use image::RgbaImage;
use kurbo::{Point, Rect};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// A file picked by the user
#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    /// Declared MIME type, e.g. `image/png`
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        }
    }

    /// Read a file from disk, deriving its MIME type from the extension
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(
            &name,
            file_formats::mime_type_for_extension(extension),
            bytes,
        ))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Upload compositor state
#[derive(Debug, Clone, Default)]
pub enum UploadState {
    /// Waiting for a file
    #[default]
    Empty,
    /// An image is loaded and being positioned
    Positioning {
        file_name: String,
        image: RgbaImage,
        position: ImagePosition,
    },
}

/// File-path compositor with gesture positioning
#[derive(Debug)]
pub struct UploadCompositor {
    state: UploadState,
    gestures: GestureTracker,
    encoder: PhotoEncoder,
    preview: RgbaImage,
}

impl Default for UploadCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadCompositor {
    pub fn new() -> Self {
        Self {
            state: UploadState::Empty,
            gestures: GestureTracker::new(),
            encoder: PhotoEncoder::new(),
            preview: raster::solid_surface(PREVIEW_SIZE, PREVIEW_SIZE, BLACK),
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.state, UploadState::Empty)
    }

    /// Current position, `None` while empty
    pub fn position(&self) -> Option<ImagePosition> {
        match &self.state {
            UploadState::Positioning { position, .. } => Some(*position),
            UploadState::Empty => None,
        }
    }

    /// Name of the loaded file, `None` while empty
    pub fn file_name(&self) -> Option<&str> {
        match &self.state {
            UploadState::Positioning { file_name, .. } => Some(file_name),
            UploadState::Empty => None,
        }
    }

    pub fn gestures(&self) -> &GestureTracker {
        &self.gestures
    }

    /// The 480×480 preview raster
    pub fn preview(&self) -> &RgbaImage {
        &self.preview
    }

    /// Load a file and fit it into the preview
    ///
    /// Rejected files leave the compositor untouched.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<ImagePosition, UploadError> {
        if !file.is_image() {
            warn!(name = %file.name, mime = %file.mime_type, "Rejected non-image file");
            return Err(UploadError::NotAnImage(file.mime_type));
        }

        let image = image::load_from_memory(&file.bytes)
            .map_err(|e| UploadError::DecodeFailed(e.to_string()))?
            .to_rgba8();

        let position = ImagePosition::fit(image.width(), image.height(), PREVIEW_SIZE as f64);
        info!(
            name = %file.name,
            width = image.width(),
            height = image.height(),
            scale = position.scale,
            "Image loaded for positioning"
        );

        self.gestures.clear();
        self.state = UploadState::Positioning {
            file_name: file.name,
            image,
            position,
        };
        self.redraw();
        Ok(position)
    }

    /// Move the image to an explicit position; the scale is clamped
    pub fn set_position(&mut self, position: ImagePosition) {
        self.update_position(|_| Some(position.clamped()));
    }

    pub fn pointer_down(&mut self, pointer: Point) {
        if let Some(position) = self.position() {
            self.gestures.pointer_down(pointer, &position);
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        let gestures = self.gestures;
        self.update_position(|position| gestures.pointer_move(pointer, position));
    }

    pub fn pointer_up(&mut self) {
        self.gestures.pointer_up();
    }

    /// The pointer leaving the canvas ends the drag
    pub fn pointer_leave(&mut self) {
        self.gestures.pointer_up();
    }

    pub fn touch_start(&mut self, touches: &[Point]) {
        if let Some(position) = self.position() {
            self.gestures.touch_start(touches, &position);
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) {
        let Some(position) = self.position() else {
            return;
        };
        if let Some(next) = self.gestures.touch_move(touches, &position) {
            self.update_position(|_| Some(next));
        }
    }

    pub fn touch_end(&mut self) {
        self.gestures.touch_end();
    }

    pub fn wheel(&mut self, delta_y: f64) {
        let gestures = self.gestures;
        self.update_position(|position| Some(gestures.wheel(delta_y, position)));
    }

    /// Drop the loaded image and go back to waiting for a file
    pub fn reset(&mut self) {
        if !self.is_empty() {
            debug!("Upload reset");
        }
        self.state = UploadState::Empty;
        self.gestures.clear();
        self.redraw();
    }

    /// External restart signal
    pub fn restart(&mut self) {
        self.reset();
    }

    /// Render the 1080×1080 output and return to `Empty`
    ///
    /// `None` while empty; a render or encoding failure keeps the current image.
    pub fn capture(&mut self) -> Option<CapturedPhoto> {
        let UploadState::Positioning {
            image, position, ..
        } = &self.state
        else {
            debug!("Nothing to capture, no image loaded");
            return None;
        };

        let photo = render(image, position, OUTPUT_SIZE, output_scale_factor())
            .and_then(|surface| self.encoder.encode(&surface));
        match photo {
            Ok(photo) => {
                info!(size = OUTPUT_SIZE, "Upload captured");
                self.reset();
                Some(photo)
            }
            Err(e) => {
                error!(error = %e, "Failed to render uploaded image");
                None
            }
        }
    }

    fn update_position(&mut self, f: impl FnOnce(&ImagePosition) -> Option<ImagePosition>) {
        let UploadState::Positioning { position, .. } = &mut self.state else {
            return;
        };
        if let Some(next) = f(position) {
            *position = next;
            self.redraw();
        }
    }

    fn redraw(&mut self) {
        self.preview = match &self.state {
            UploadState::Positioning {
                image, position, ..
            } => render(image, position, PREVIEW_SIZE, 1.0).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to draw upload preview");
                raster::solid_surface(PREVIEW_SIZE, PREVIEW_SIZE, BLACK)
            }),
            UploadState::Empty => raster::solid_surface(PREVIEW_SIZE, PREVIEW_SIZE, BLACK),
        };
    }
}

/// Black square of `size` with the image drawn at `position × factor`
fn render(
    image: &RgbaImage,
    position: &ImagePosition,
    size: u32,
    factor: f64,
) -> Result<RgbaImage, PhotoError> {
    let mut canvas = Canvas::new(size, size, BLACK)?;
    let source = Rect::new(0.0, 0.0, image.width() as f64, image.height() as f64);
    canvas.draw_image(image, source, position.to_transform(factor), None)?;
    canvas.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn png(width: u32, height: u32, color: Rgba<u8>) -> SelectedFile {
        let img = RgbaImage::from_pixel(width, height, color);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        SelectedFile::new("test.png", "image/png", bytes)
    }

    #[test]
    fn gestures_ignored_while_empty() {
        let mut upload = UploadCompositor::new();
        upload.pointer_down(Point::new(10.0, 10.0));
        upload.pointer_move(Point::new(50.0, 50.0));
        upload.wheel(-1.0);
        assert!(upload.is_empty());
        assert!(!upload.gestures().is_dragging());
        assert!(upload.capture().is_none());
    }

    #[test]
    fn undecodable_bytes_are_rejected() {
        let mut upload = UploadCompositor::new();
        let file = SelectedFile::new("broken.png", "image/png", vec![1, 2, 3]);
        assert!(matches!(
            upload.select_file(file),
            Err(UploadError::DecodeFailed(_))
        ));
        assert!(upload.is_empty());
    }

    #[test]
    fn preview_follows_drag() {
        let red = Rgba([255, 0, 0, 255]);
        let mut upload = UploadCompositor::new();
        upload.select_file(png(100, 100, red)).unwrap();
        assert_eq!(*upload.preview().get_pixel(5, 5), red);

        upload.pointer_down(Point::new(0.0, 0.0));
        upload.pointer_move(Point::new(240.0, 0.0));
        upload.pointer_up();

        assert_eq!(upload.position().unwrap().x, 240.0);
        assert_eq!(*upload.preview().get_pixel(5, 5), BLACK);
        assert_eq!(*upload.preview().get_pixel(300, 5), red);
    }

    #[test]
    fn capture_returns_to_empty() {
        let mut upload = UploadCompositor::new();
        upload
            .select_file(png(64, 32, Rgba([0, 0, 255, 255])))
            .unwrap();
        let photo = upload.capture().unwrap();
        assert_eq!((photo.width(), photo.height()), (1080, 1080));
        assert!(upload.is_empty());
    }
}
