// SPDX-License-Identifier: GPL-3.0-only

//! CPU raster surfaces
//!
//! A [`Canvas`] records fills, clipped image draws and strokes into a
//! `vello_cpu` render context and resolves them into an [`RgbaImage`] in
//! [`Canvas::finish`]. Each call sets its own transform, so nothing carries
//! over from one draw to the next.

use crate::errors::PhotoError;
use image::{Rgba, RgbaImage};
use kurbo::{Affine, Point, Rect};
use std::sync::Arc;
use vello_cpu::kurbo::Shape;

/// Opaque black, the background of every composed surface
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Border color of the inset
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Curve flattening tolerance, in pixels
const TOLERANCE: f64 = 0.1;

/// Clip region for a draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipShape {
    Circle { center: Point, radius: f64 },
    RoundedRect { rect: Rect, radius: f64 },
    Rect(Rect),
}

impl ClipShape {
    fn to_path(self) -> vello_cpu::kurbo::BezPath {
        match self {
            ClipShape::Circle { center, radius } => {
                vello_cpu::kurbo::Circle::new(point_to_cpu(center), radius).to_path(TOLERANCE)
            }
            ClipShape::RoundedRect { rect, radius } => {
                vello_cpu::kurbo::RoundedRect::from_rect(rect_to_cpu(rect), radius)
                    .to_path(TOLERANCE)
            }
            ClipShape::Rect(rect) => rect_to_cpu(rect).to_path(TOLERANCE),
        }
    }
}

/// Largest centered square of a `width × height` source
pub fn center_square(width: u32, height: u32) -> Rect {
    let side = width.min(height) as f64;
    let x = (width as f64 - side) / 2.0;
    let y = (height as f64 - side) / 2.0;
    Rect::new(x, y, x + side, y + side)
}

/// Transform mapping `source` onto `dest`, optionally mirrored horizontally
/// inside `dest`
pub fn fit_transform(source: Rect, dest: Rect, mirror_x: bool) -> Affine {
    let scale_x = dest.width() / source.width();
    let scale_y = dest.height() / source.height();
    let place = Affine::translate((dest.x0, dest.y0))
        * Affine::scale_non_uniform(scale_x, scale_y)
        * Affine::translate((-source.x0, -source.y0));
    if mirror_x {
        Affine::translate((dest.x0 + dest.x1, 0.0)) * Affine::scale_non_uniform(-1.0, 1.0) * place
    } else {
        place
    }
}

/// Fixed-size drawing surface over a `vello_cpu` render context
pub struct Canvas {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl Canvas {
    /// A `width × height` surface filled with `background`
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Result<Self, PhotoError> {
        let w = dimension(width, "surface width")?;
        let h = dimension(height, "surface height")?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint(color_to_cpu(background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        Ok(Self {
            ctx,
            width: w,
            height: h,
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Paint the `source_rect` region of `image` through `to_dest`
    ///
    /// `to_dest` maps image pixel coordinates to surface coordinates. With a
    /// clip, only the part inside the clip outline is painted.
    pub fn draw_image(
        &mut self,
        image: &RgbaImage,
        source_rect: Rect,
        to_dest: Affine,
        clip: Option<&ClipShape>,
    ) -> Result<(), PhotoError> {
        if image.width() == 0 || image.height() == 0 || source_rect.area() <= 0.0 {
            return Ok(());
        }
        if to_dest.determinant().abs() < f64::EPSILON {
            return Ok(());
        }
        let paint = image_paint(image)?;

        self.push_clip(clip);
        self.ctx.set_transform(affine_to_cpu(to_dest));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&rect_to_cpu(source_rect));
        self.pop_clip(clip);
        Ok(())
    }

    /// Stroke the outline of `shape` with `width`, centred on the outline
    ///
    /// When `clip` is given only the part of the stroke inside it is painted.
    pub fn stroke_shape(
        &mut self,
        shape: &ClipShape,
        width: f64,
        color: Rgba<u8>,
        clip: Option<&ClipShape>,
    ) {
        self.push_clip(clip);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.stroke_path(&shape.to_path());
        self.pop_clip(clip);
    }

    /// Rasterize everything recorded so far
    pub fn finish(mut self) -> Result<RgbaImage, PhotoError> {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);

        let data: Vec<u8> = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .flat_map(|px| unpremultiply([px[0], px[1], px[2], px[3]]))
            .collect();
        RgbaImage::from_raw(self.width(), self.height(), data)
            .ok_or_else(|| PhotoError::InvalidFrame("rendered buffer size mismatch".to_string()))
    }

    fn push_clip(&mut self, clip: Option<&ClipShape>) {
        if let Some(clip) = clip {
            self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            self.ctx.push_clip_layer(&clip.to_path());
        }
    }

    fn pop_clip(&mut self, clip: Option<&ClipShape>) {
        if clip.is_some() {
            self.ctx.pop_layer();
        }
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// A surface of `width × height` filled with `color`
pub fn solid_surface(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

fn dimension(value: u32, what: &str) -> Result<u16, PhotoError> {
    match u16::try_from(value) {
        Ok(0) | Err(_) => Err(PhotoError::InvalidFrame(format!(
            "{} {} out of range",
            what, value
        ))),
        Ok(v) => Ok(v),
    }
}

fn image_paint(image: &RgbaImage) -> Result<vello_cpu::Image, PhotoError> {
    let w = dimension(image.width(), "image width")?;
    let h = dimension(image.height(), "image height")?;

    let mut may_have_opacities = false;
    let pixels = image
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            may_have_opacities |= a != 255;
            premultiply(r, g, b, a)
        })
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);

    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn premultiply(r: u8, g: u8, b: u8, a: u8) -> vello_cpu::peniko::color::PremulRgba8 {
    let af = (a as u16) + 1;
    let premul = |c: u8| -> u8 { (((c as u16) * af) >> 8) as u8 };
    vello_cpu::peniko::color::PremulRgba8 {
        r: premul(r),
        g: premul(g),
        b: premul(b),
        a,
    }
}

fn unpremultiply(px: [u8; 4]) -> [u8; 4] {
    match px[3] {
        0 => [0, 0, 0, 0],
        255 => px,
        a => {
            let straight = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
            [straight(px[0]), straight(px[1]), straight(px[2]), a]
        }
    }
}

fn color_to_cpu(color: Rgba<u8>) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = color.0;
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_source() -> RgbaImage {
        // Left half red, right half blue
        RgbaImage::from_fn(100, 100, |x, _| {
            if x < 50 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn center_square_crops_long_axis() {
        assert_eq!(center_square(1920, 1080), Rect::new(420.0, 0.0, 1500.0, 1080.0));
        assert_eq!(center_square(600, 800), Rect::new(0.0, 100.0, 600.0, 700.0));
    }

    #[test]
    fn fit_transform_mirrors_inside_dest() {
        let source = Rect::new(0.0, 0.0, 10.0, 10.0);
        let dest = Rect::new(100.0, 0.0, 200.0, 100.0);
        let plain = fit_transform(source, dest, false);
        let mirrored = fit_transform(source, dest, true);
        assert_eq!(plain * Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert_eq!(mirrored * Point::new(0.0, 0.0), Point::new(200.0, 0.0));
        assert_eq!(mirrored * Point::new(10.0, 10.0), Point::new(100.0, 100.0));
    }

    #[test]
    fn empty_canvas_is_background() {
        let surface = Canvas::new(16, 8, BLACK).unwrap().finish().unwrap();
        assert_eq!(surface.dimensions(), (16, 8));
        assert!(surface.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(matches!(
            Canvas::new(0, 10, BLACK),
            Err(PhotoError::InvalidFrame(_))
        ));
    }

    #[test]
    fn mirrored_draw_swaps_halves() {
        let src = split_source();
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut canvas = Canvas::new(100, 100, BLACK).unwrap();
        canvas
            .draw_image(&src, rect, fit_transform(rect, rect, true), None)
            .unwrap();
        let dst = canvas.finish().unwrap();
        assert_eq!(dst.get_pixel(10, 50).0, [0, 0, 255, 255]);
        assert_eq!(dst.get_pixel(90, 50).0, [255, 0, 0, 255]);
    }

    #[test]
    fn circle_clip_leaves_corners_untouched() {
        let src = RgbaImage::from_pixel(10, 10, Rgba([0, 255, 0, 255]));
        let source = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let clip = ClipShape::Circle {
            center: Point::new(50.0, 50.0),
            radius: 50.0,
        };
        let mut canvas = Canvas::new(100, 100, BLACK).unwrap();
        canvas
            .draw_image(&src, source, fit_transform(source, rect, false), Some(&clip))
            .unwrap();
        let dst = canvas.finish().unwrap();
        assert_eq!(dst.get_pixel(1, 1).0, [0, 0, 0, 255]);
        assert_eq!(dst.get_pixel(50, 50).0, [0, 255, 0, 255]);
    }

    #[test]
    fn rounded_clip_cuts_corners_only() {
        let src = RgbaImage::from_pixel(10, 10, Rgba([0, 255, 0, 255]));
        let source = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let clip = ClipShape::RoundedRect { rect, radius: 20.0 };
        let mut canvas = Canvas::new(100, 100, BLACK).unwrap();
        canvas
            .draw_image(&src, source, fit_transform(source, rect, false), Some(&clip))
            .unwrap();
        let dst = canvas.finish().unwrap();
        assert_eq!(dst.get_pixel(1, 1).0, [0, 0, 0, 255]);
        assert_eq!(dst.get_pixel(50, 2).0, [0, 255, 0, 255]);
        assert_eq!(dst.get_pixel(2, 50).0, [0, 255, 0, 255]);
    }

    #[test]
    fn stroke_paints_only_near_outline() {
        let shape = ClipShape::Rect(Rect::new(10.0, 10.0, 90.0, 90.0));
        let mut canvas = Canvas::new(100, 100, BLACK).unwrap();
        canvas.stroke_shape(&shape, 4.0, WHITE, None);
        let dst = canvas.finish().unwrap();
        assert_eq!(dst.get_pixel(10, 50).0, [255, 255, 255, 255]);
        assert_eq!(dst.get_pixel(50, 50).0, [0, 0, 0, 255]);
        assert_eq!(dst.get_pixel(2, 2).0, [0, 0, 0, 255]);
    }

    #[test]
    fn clipped_stroke_keeps_inner_half() {
        let shape = ClipShape::Rect(Rect::new(10.0, 10.0, 90.0, 90.0));
        let mut canvas = Canvas::new(100, 100, BLACK).unwrap();
        canvas.stroke_shape(&shape, 8.0, WHITE, Some(&shape));
        let dst = canvas.finish().unwrap();
        assert_eq!(dst.get_pixel(11, 50).0, [255, 255, 255, 255]);
        assert_eq!(dst.get_pixel(8, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn premultiply_round_trips_opaque() {
        let p = premultiply(12, 200, 255, 255);
        assert_eq!(unpremultiply([p.r, p.g, p.b, p.a]), [12, 200, 255, 255]);
        assert_eq!(unpremultiply([0, 0, 0, 0]), [0, 0, 0, 0]);
    }
}
