// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the file-upload compositor

use image::{ImageFormat, Rgba, RgbaImage};
use kurbo::Point;
use std::io::Cursor;
use zory_camera::errors::UploadError;
use zory_camera::pipelines::photo::{ImagePosition, SelectedFile, UploadCompositor, UploadState};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

fn png_file(width: u32, height: u32, color: Rgba<u8>) -> SelectedFile {
    let img = RgbaImage::from_pixel(width, height, color);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    SelectedFile::new("photo.png", "image/png", bytes)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_wide_image_fit() {
    // 2:1 image: height fills the 480 preview, centered horizontally
    let mut upload = UploadCompositor::new();
    let position = upload.select_file(png_file(2000, 1000, RED)).unwrap();

    assert!(approx(position.scale, 0.48));
    assert!(approx(position.x, -240.0));
    assert!(approx(position.y, 0.0));
    assert!(matches!(upload.state(), UploadState::Positioning { .. }));
}

#[test]
fn test_small_image_fit_clamped_by_first_gesture() {
    let mut upload = UploadCompositor::new();
    let fitted = upload.select_file(png_file(64, 64, RED)).unwrap();
    assert!(approx(fitted.scale, 7.5));

    // Zooming out from an out-of-range fit lands inside the range
    upload.wheel(120.0);
    assert!(approx(upload.position().unwrap().scale, 3.0));
}

#[test]
fn test_non_image_rejected_without_state_change() {
    let mut upload = UploadCompositor::new();
    let text = SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec());

    let err = upload.select_file(text.clone()).unwrap_err();
    assert_eq!(err.to_string(), "Please select an image file");
    assert!(matches!(err, UploadError::NotAnImage(_)));
    assert!(upload.is_empty());

    // A rejected file never replaces a loaded image
    upload.select_file(png_file(100, 100, RED)).unwrap();
    let before = upload.position();
    assert!(upload.select_file(text).is_err());
    assert_eq!(upload.position(), before);
    assert_eq!(upload.file_name(), Some("photo.png"));
}

#[test]
fn test_scale_clamped_under_extreme_wheel_input() {
    let mut upload = UploadCompositor::new();
    upload.select_file(png_file(100, 100, RED)).unwrap();

    for _ in 0..1000 {
        upload.wheel(-120.0);
    }
    assert!(approx(upload.position().unwrap().scale, 3.0));

    for _ in 0..1000 {
        upload.wheel(120.0);
    }
    assert!(approx(upload.position().unwrap().scale, 0.1));
}

#[test]
fn test_scale_clamped_under_extreme_pinch() {
    let mut upload = UploadCompositor::new();
    upload.select_file(png_file(100, 100, RED)).unwrap();

    upload.touch_start(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
    upload.touch_move(&[Point::new(0.0, 0.0), Point::new(100_000.0, 0.0)]);
    assert!(approx(upload.position().unwrap().scale, 3.0));

    upload.touch_move(&[Point::new(0.0, 0.0), Point::new(0.001, 0.0)]);
    assert!(approx(upload.position().unwrap().scale, 0.1));

    upload.touch_end();
    assert!(!upload.gestures().is_pinching());
}

#[test]
fn test_explicit_position_is_clamped() {
    let mut upload = UploadCompositor::new();
    upload.select_file(png_file(100, 100, RED)).unwrap();
    upload.set_position(ImagePosition {
        x: 10.0,
        y: 20.0,
        scale: 50.0,
    });
    assert_eq!(
        upload.position(),
        Some(ImagePosition {
            x: 10.0,
            y: 20.0,
            scale: 3.0
        })
    );
}

#[test]
fn test_reset_then_new_file_gets_fresh_fit() {
    let mut upload = UploadCompositor::new();
    upload.select_file(png_file(200, 400, RED)).unwrap();

    upload.pointer_down(Point::new(100.0, 100.0));
    upload.pointer_move(Point::new(150.0, 180.0));
    upload.pointer_leave();
    upload.wheel(-1.0);
    assert_ne!(upload.position().unwrap().x, 0.0);

    upload.reset();
    assert!(upload.is_empty());
    assert_eq!(upload.position(), None);
    assert!(upload.preview().pixels().all(|p| *p == BLACK));

    let fitted = upload.select_file(png_file(200, 400, RED)).unwrap();
    assert_eq!(fitted, ImagePosition::fit(200, 400, 480.0));
    assert_eq!(upload.position(), Some(fitted));
}

#[test]
fn test_pointer_leave_ends_drag() {
    let mut upload = UploadCompositor::new();
    upload.select_file(png_file(100, 100, RED)).unwrap();

    upload.pointer_down(Point::new(10.0, 10.0));
    upload.pointer_leave();
    let before = upload.position();
    upload.pointer_move(Point::new(200.0, 200.0));
    assert_eq!(upload.position(), before);
}

#[test]
fn test_capture_scales_preview_placement_to_output() {
    let mut upload = UploadCompositor::new();
    upload.select_file(png_file(100, 100, RED)).unwrap();
    // 100px image at scale 1 covers the preview's top-left 100x100
    upload.set_position(ImagePosition {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    });

    let photo = upload.capture().unwrap();
    assert_eq!((photo.width(), photo.height()), (1080, 1080));
    assert!(upload.is_empty(), "capture returns to the empty state");

    // 100 preview pixels become 225 output pixels
    let decoded = photo.decode().unwrap().to_rgba8();
    let inside = decoded.get_pixel(200, 200);
    let outside = decoded.get_pixel(260, 260);
    assert!(inside[0] > 200 && inside[1] < 50 && inside[2] < 50);
    assert!(outside[0] < 50 && outside[1] < 50 && outside[2] < 50);
}

#[test]
fn test_restart_discards_loaded_image() {
    let mut upload = UploadCompositor::new();
    upload.select_file(png_file(100, 100, RED)).unwrap();
    upload.restart();
    assert!(upload.is_empty());
    assert!(upload.capture().is_none());
}
