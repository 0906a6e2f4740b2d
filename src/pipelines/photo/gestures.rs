// SPDX-License-Identifier: GPL-3.0-only

//! Pan and zoom gestures for positioning an uploaded image
//!
//! Coordinates are preview-canvas pixels. The tracker only remembers where a
//! drag started and the last pinch distance; every gesture returns the new
//! [`ImagePosition`] for the caller to store and redraw.

use crate::constants::upload::{MAX_SCALE, MIN_SCALE, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT};
use kurbo::{Affine, Point, Vec2};
use tracing::trace;

/// Placement of an image on the preview canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePosition {
    /// Left edge of the drawn image
    pub x: f64,
    /// Top edge of the drawn image
    pub y: f64,
    /// Image pixels to canvas pixels
    pub scale: f64,
}

impl Default for ImagePosition {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl ImagePosition {
    /// Fit a `width × height` image into a `canvas × canvas` square
    ///
    /// Wide images fill the height and are centered horizontally; tall and
    /// square images fill the width and are centered vertically.
    ///
    /// The fitted scale is exact and may fall outside the zoom range (a 64 px
    /// image fits at 7.5); the first gesture or explicit position clamps it.
    pub fn fit(width: u32, height: u32, canvas: f64) -> Self {
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);
        if w / h > 1.0 {
            let scale = canvas / h;
            Self {
                x: (canvas - w * scale) / 2.0,
                y: 0.0,
                scale,
            }
        } else {
            let scale = canvas / w;
            Self {
                x: 0.0,
                y: (canvas - h * scale) / 2.0,
                scale,
            }
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same position with the scale multiplied by `factor` and clamped
    pub fn zoomed(self, factor: f64) -> Self {
        Self {
            scale: clamp_scale(self.scale * factor).unwrap_or(self.scale),
            ..self
        }
    }

    /// Same position with the scale clamped into range
    pub fn clamped(self) -> Self {
        Self {
            scale: clamp_scale(self.scale).unwrap_or(1.0),
            ..self
        }
    }

    /// Image-pixel to canvas transform, with everything multiplied by
    /// `output_factor` for canvases larger than the preview
    pub fn to_transform(&self, output_factor: f64) -> Affine {
        Affine::translate((self.x * output_factor, self.y * output_factor))
            * Affine::scale(self.scale * output_factor)
    }
}

/// Clamp a scale into `[MIN_SCALE, MAX_SCALE]`; `None` for NaN
pub fn clamp_scale(scale: f64) -> Option<f64> {
    (!scale.is_nan()).then(|| scale.clamp(MIN_SCALE, MAX_SCALE))
}

/// Distance between the first two touch points
fn touch_distance(touches: &[Point]) -> Option<f64> {
    match touches {
        [a, b, ..] => Some(a.distance(*b)),
        _ => None,
    }
}

/// In-progress drag and pinch state
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureTracker {
    /// Pointer position minus image origin at drag start
    drag_offset: Option<Vec2>,
    last_pinch_distance: Option<f64>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.last_pinch_distance.is_some()
    }

    pub fn pointer_down(&mut self, pointer: Point, position: &ImagePosition) {
        self.drag_offset = Some(pointer - position.origin());
    }

    /// Follow the pointer while dragging
    pub fn pointer_move(&self, pointer: Point, position: &ImagePosition) -> Option<ImagePosition> {
        let offset = self.drag_offset?;
        let origin = pointer - offset;
        Some(ImagePosition {
            x: origin.x,
            y: origin.y,
            ..*position
        })
    }

    /// End a drag (pointer released or left the canvas)
    pub fn pointer_up(&mut self) {
        self.drag_offset = None;
    }

    /// One touch starts a drag, two start a pinch
    pub fn touch_start(&mut self, touches: &[Point], position: &ImagePosition) {
        match touches {
            [single] => self.pointer_down(*single, position),
            [_, _, ..] => {
                self.drag_offset = None;
                self.last_pinch_distance = touch_distance(touches);
            }
            [] => {}
        }
    }

    pub fn touch_move(
        &mut self,
        touches: &[Point],
        position: &ImagePosition,
    ) -> Option<ImagePosition> {
        match touches {
            [single] => self.pointer_move(*single, position),
            [_, _, ..] => {
                let last = self.last_pinch_distance?;
                let current = touch_distance(touches)?;
                self.last_pinch_distance = Some(current);
                if last <= 0.0 {
                    return None;
                }
                let zoomed = position.zoomed(current / last);
                trace!(scale = zoomed.scale, "Pinch zoom");
                Some(zoomed)
            }
            [] => None,
        }
    }

    /// Lifting any finger ends both drag and pinch
    pub fn touch_end(&mut self) {
        self.drag_offset = None;
        self.last_pinch_distance = None;
    }

    /// Wheel zoom: scrolling down zooms out, anything else zooms in
    pub fn wheel(&self, delta_y: f64, position: &ImagePosition) -> ImagePosition {
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        position.zoomed(factor)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
