// SPDX-License-Identifier: GPL-3.0-only

//! Camera-path snapshot compositor
//!
//! Rasterizes the current main frame into a square output, overlays the
//! clipped picture-in-picture inset when enabled, and encodes the result.
//!
//! ```text
//! main frame ──center crop──▶ side×side ──(mirror if user)──┐
//!                                                          ├─▶ JPEG
//! inset frame ─center crop──▶ 0.3·side clip ─▶ white border ┘
//! ```

use super::encoding::{CapturedPhoto, PhotoEncoder};
use super::raster::{self, BLACK, Canvas, ClipShape, WHITE};
use crate::backends::camera::types::{CameraFrame, FacingMode};
use crate::config::{CameraSettings, InsetPosition, InsetShape};
use crate::constants::{capture, inset};
use crate::errors::PhotoError;
use image::RgbaImage;
use kurbo::{Point, Rect};
use tracing::{debug, error, info, warn};

/// A frame together with the facing mode of the stream it came from
#[derive(Debug, Clone, Copy)]
pub struct SnapshotSource<'a> {
    pub frame: &'a CameraFrame,
    pub facing: FacingMode,
}

/// Everything a capture needs, read at the moment of capture
#[derive(Debug, Clone, Copy)]
pub struct SnapshotRequest<'a> {
    pub main: Option<SnapshotSource<'a>>,
    pub inset: Option<SnapshotSource<'a>>,
    pub is_mobile: bool,
    pub settings: CameraSettings,
}

/// Side of the square output for a `width × height` main frame
pub fn output_side(width: u32, height: u32) -> u32 {
    width.min(height).max(capture::MIN_OUTPUT_SIDE)
}

/// Inset rectangle inside a `side × side` output
pub fn inset_rect(side: u32, position: InsetPosition) -> Rect {
    let side = side as f64;
    let size = side * inset::SIZE_RATIO;
    let margin = side * inset::MARGIN_RATIO;
    let far = side - size - margin;

    let (x, y) = match position {
        InsetPosition::TopLeft => (margin, margin),
        InsetPosition::TopRight => (far, margin),
        InsetPosition::BottomLeft => (margin, far),
        InsetPosition::BottomRight => (far, far),
    };
    Rect::new(x, y, x + size, y + size)
}

/// Clip outline of the inset for `shape`
pub fn inset_clip(rect: Rect, shape: InsetShape) -> ClipShape {
    match shape {
        InsetShape::Round => ClipShape::Circle {
            center: Point::new(rect.center().x, rect.center().y),
            radius: rect.width() / 2.0,
        },
        InsetShape::Rounded => ClipShape::RoundedRect {
            rect,
            radius: rect.width() * inset::CORNER_RATIO,
        },
        InsetShape::Square => ClipShape::Rect(rect),
    }
}

/// Camera-path compositor
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotCompositor {
    encoder: PhotoEncoder,
}

impl SnapshotCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compose and encode a photo
    ///
    /// Returns `None` without side effects when the main frame is not ready
    /// or the result cannot be encoded.
    pub fn capture(&self, request: &SnapshotRequest<'_>) -> Option<CapturedPhoto> {
        match self.try_capture(request) {
            Ok(photo) => {
                info!(side = photo.width(), "Snapshot captured");
                Some(photo)
            }
            Err(PhotoError::NoFrameAvailable) => {
                debug!("Main stream not ready, nothing captured");
                None
            }
            Err(e) => {
                error!(error = %e, "Snapshot capture failed");
                None
            }
        }
    }

    /// Compose and encode, reporting why nothing was produced
    pub fn try_capture(&self, request: &SnapshotRequest<'_>) -> Result<CapturedPhoto, PhotoError> {
        let surface = self.compose(request)?;
        self.encoder.encode(&surface)
    }

    /// Compose the output surface without encoding it
    pub fn compose(&self, request: &SnapshotRequest<'_>) -> Result<RgbaImage, PhotoError> {
        let main = request
            .main
            .filter(|m| m.frame.is_ready())
            .ok_or(PhotoError::NoFrameAvailable)?;
        let main_image = main.frame.to_rgba_image()?;

        let side = output_side(main.frame.width, main.frame.height);
        let mut canvas = Canvas::new(side, side, BLACK)?;
        let dest = Rect::new(0.0, 0.0, side as f64, side as f64);
        let crop = raster::center_square(main.frame.width, main.frame.height);

        // Selfie mirroring for the user-facing camera
        let mirror_main = main.facing == FacingMode::User;
        canvas.draw_image(
            &main_image,
            crop,
            raster::fit_transform(crop, dest, mirror_main),
            None,
        )?;
        debug!(side, mirror_main, "Main frame composed");

        if request.is_mobile
            && request.settings.show_inset
            && let Some(inset_source) = request.inset
        {
            draw_inset(&mut canvas, side, main.facing, inset_source, &request.settings);
        }

        canvas.finish()
    }
}

/// Overlay the inset; a source that is not ready is skipped, never fatal
fn draw_inset(
    canvas: &mut Canvas,
    side: u32,
    main_facing: FacingMode,
    source: SnapshotSource<'_>,
    settings: &CameraSettings,
) {
    if !source.frame.is_ready() {
        debug!("Inset stream not ready, skipping inset");
        return;
    }
    let inset_image = match source.frame.to_rgba_image() {
        Ok(image) => image,
        Err(e) => {
            warn!(error = %e, "Inset frame unusable, skipping inset");
            return;
        }
    };

    let rect = inset_rect(side, settings.inset_position);
    let clip = inset_clip(rect, settings.inset_shape);
    let crop = raster::center_square(source.frame.width, source.frame.height);
    let mirror = source.facing == FacingMode::User && main_facing == FacingMode::Environment;

    if let Err(e) = canvas.draw_image(
        &inset_image,
        crop,
        raster::fit_transform(crop, rect, mirror),
        Some(&clip),
    ) {
        warn!(error = %e, "Inset frame unusable, skipping inset");
        return;
    }

    // Same clip as the image: only the inner half of the border shows
    let border = side as f64 * inset::BORDER_RATIO;
    canvas.stroke_shape(&clip, border, WHITE, Some(&clip));
    debug!(?rect, mirror, shape = ?settings.inset_shape, "Inset composed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_side_has_floor_of_1080() {
        assert_eq!(output_side(640, 480), 1080);
        assert_eq!(output_side(1920, 1080), 1080);
        assert_eq!(output_side(4032, 3024), 3024);
    }

    #[test]
    fn inset_corners() {
        let side = 1000;
        assert_eq!(
            inset_rect(side, InsetPosition::TopLeft),
            Rect::new(30.0, 30.0, 330.0, 330.0)
        );
        assert_eq!(
            inset_rect(side, InsetPosition::BottomRight),
            Rect::new(670.0, 670.0, 970.0, 970.0)
        );
        assert_eq!(
            inset_rect(side, InsetPosition::TopRight),
            Rect::new(670.0, 30.0, 970.0, 330.0)
        );
        assert_eq!(
            inset_rect(side, InsetPosition::BottomLeft),
            Rect::new(30.0, 670.0, 330.0, 970.0)
        );
    }

    #[test]
    fn rounded_clip_uses_ten_percent_radius() {
        let rect = Rect::new(0.0, 0.0, 300.0, 300.0);
        assert_eq!(
            inset_clip(rect, InsetShape::Rounded),
            ClipShape::RoundedRect { rect, radius: 30.0 }
        );
    }

    #[test]
    fn missing_main_frame_is_an_error() {
        let request = SnapshotRequest {
            main: None,
            inset: None,
            is_mobile: false,
            settings: CameraSettings::default(),
        };
        let compositor = SnapshotCompositor::new();
        assert!(compositor.capture(&request).is_none());
        assert_eq!(
            compositor.try_capture(&request).err(),
            Some(PhotoError::NoFrameAvailable)
        );
    }
}
