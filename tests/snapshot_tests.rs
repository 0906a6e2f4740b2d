// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the camera-path snapshot compositor

use image::{GenericImageView, Rgba, RgbaImage};
use zory_camera::backends::camera::{CameraFrame, FacingMode};
use zory_camera::config::{CameraSettings, InsetPosition, InsetShape};
use zory_camera::pipelines::photo::snapshot::inset_rect;
use zory_camera::pipelines::photo::{SnapshotCompositor, SnapshotRequest, SnapshotSource};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn solid(width: u32, height: u32, color: Rgba<u8>) -> CameraFrame {
    CameraFrame::from_rgba_image(RgbaImage::from_pixel(width, height, color))
}

/// Left half red, right half blue
fn split(width: u32, height: u32) -> CameraFrame {
    CameraFrame::from_rgba_image(RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 { RED } else { BLUE }
    }))
}

fn request<'a>(
    main: &'a CameraFrame,
    main_facing: FacingMode,
    inset: Option<(&'a CameraFrame, FacingMode)>,
    is_mobile: bool,
    settings: CameraSettings,
) -> SnapshotRequest<'a> {
    SnapshotRequest {
        main: Some(SnapshotSource {
            frame: main,
            facing: main_facing,
        }),
        inset: inset.map(|(frame, facing)| SnapshotSource { frame, facing }),
        is_mobile,
        settings,
    }
}

#[test]
fn test_output_side_is_square_with_1080_floor() {
    let compositor = SnapshotCompositor::new();

    for ((w, h), expected) in [((1920, 1080), 1080), ((800, 600), 1080), ((1200, 1600), 1200)] {
        let frame = solid(w, h, GREEN);
        let surface = compositor
            .compose(&request(&frame, FacingMode::Environment, None, false, CameraSettings::default()))
            .unwrap();
        assert_eq!(surface.dimensions(), (expected, expected), "frame {}x{}", w, h);
    }
}

#[test]
fn test_captured_jpeg_has_square_dimensions() {
    let frame = solid(1280, 720, GREEN);
    let photo = SnapshotCompositor::new()
        .capture(&request(&frame, FacingMode::Environment, None, false, CameraSettings::default()))
        .unwrap();

    assert_eq!((photo.width(), photo.height()), (1080, 1080));
    assert!(photo.data_uri().starts_with("data:image/jpeg;base64,"));
    assert_eq!(photo.decode().unwrap().dimensions(), (1080, 1080));
}

#[test]
fn test_user_main_is_mirrored() {
    let frame = split(1920, 1080);
    let compositor = SnapshotCompositor::new();
    let settings = CameraSettings::default();

    let environment = compositor
        .compose(&request(&frame, FacingMode::Environment, None, false, settings))
        .unwrap();
    assert_eq!(*environment.get_pixel(100, 540), RED);
    assert_eq!(*environment.get_pixel(980, 540), BLUE);

    let user = compositor
        .compose(&request(&frame, FacingMode::User, None, false, settings))
        .unwrap();
    assert_eq!(*user.get_pixel(100, 540), BLUE, "selfie view must be mirrored");
    assert_eq!(*user.get_pixel(980, 540), RED);
}

#[test]
fn test_missing_inset_matches_disabled_inset() {
    let frame = split(1920, 1080);
    let compositor = SnapshotCompositor::new();

    let enabled_without_stream = compositor
        .compose(&request(&frame, FacingMode::Environment, None, true, CameraSettings::default()))
        .unwrap();
    let disabled = compositor
        .compose(&request(
            &frame,
            FacingMode::Environment,
            None,
            true,
            CameraSettings {
                show_inset: false,
                ..CameraSettings::default()
            },
        ))
        .unwrap();

    assert_eq!(enabled_without_stream, disabled);
}

#[test]
fn test_inset_only_composited_on_mobile() {
    let main = solid(1280, 720, GREEN);
    let selfie = split(640, 480);
    let compositor = SnapshotCompositor::new();
    let settings = CameraSettings::default();

    let desktop = compositor
        .compose(&request(&main, FacingMode::Environment, Some((&selfie, FacingMode::User)), false, settings))
        .unwrap();
    let plain = compositor
        .compose(&request(&main, FacingMode::Environment, None, false, settings))
        .unwrap();
    assert_eq!(desktop, plain);
}

#[test]
fn test_selfie_inset_is_mirrored_under_environment_main() {
    let main = solid(1280, 720, GREEN);
    let selfie = split(640, 480);
    let settings = CameraSettings {
        inset_shape: InsetShape::Square,
        inset_position: InsetPosition::BottomRight,
        ..CameraSettings::default()
    };

    let surface = SnapshotCompositor::new()
        .compose(&request(&main, FacingMode::Environment, Some((&selfie, FacingMode::User)), true, settings))
        .unwrap();

    let rect = inset_rect(1080, InsetPosition::BottomRight);
    let cy = rect.center().y as u32;
    let left = (rect.x0 + rect.width() * 0.25) as u32;
    let right = (rect.x0 + rect.width() * 0.75) as u32;

    assert_eq!(*surface.get_pixel(left, cy), BLUE, "selfie inset must be mirrored");
    assert_eq!(*surface.get_pixel(right, cy), RED);

    // Inner half of the white border, just inside the square edge
    assert_eq!(*surface.get_pixel(rect.x0 as u32 + 2, cy), WHITE);
    // Outside the inset the main frame is untouched
    assert_eq!(*surface.get_pixel(rect.x0 as u32 - 10, cy), GREEN);
    assert_eq!(*surface.get_pixel(100, 100), GREEN);
}

#[test]
fn test_environment_inset_not_mirrored_under_user_main() {
    let main = solid(1280, 720, GREEN);
    let back = split(640, 480);
    let settings = CameraSettings {
        main_camera: FacingMode::User,
        inset_shape: InsetShape::Square,
        inset_position: InsetPosition::TopLeft,
        ..CameraSettings::default()
    };

    let surface = SnapshotCompositor::new()
        .compose(&request(&main, FacingMode::User, Some((&back, FacingMode::Environment)), true, settings))
        .unwrap();

    let rect = inset_rect(1080, InsetPosition::TopLeft);
    let cy = rect.center().y as u32;
    assert_eq!(*surface.get_pixel((rect.x0 + rect.width() * 0.25) as u32, cy), RED);
    assert_eq!(*surface.get_pixel((rect.x0 + rect.width() * 0.75) as u32, cy), BLUE);
}

#[test]
fn test_round_inset_leaves_corners_to_main() {
    let main = solid(1280, 720, GREEN);
    let selfie = solid(640, 480, RED);

    let surface = SnapshotCompositor::new()
        .compose(&request(
            &main,
            FacingMode::Environment,
            Some((&selfie, FacingMode::User)),
            true,
            CameraSettings::default(),
        ))
        .unwrap();

    let rect = inset_rect(1080, InsetPosition::BottomRight);
    let center = rect.center();
    assert_eq!(*surface.get_pixel(rect.x0 as u32 + 1, rect.y0 as u32 + 1), GREEN);
    assert_eq!(*surface.get_pixel(center.x as u32, center.y as u32), RED);
}

#[test]
fn test_zero_sized_inset_frame_is_skipped() {
    let main = solid(1280, 720, GREEN);
    let empty = solid(0, 0, RED);
    let compositor = SnapshotCompositor::new();
    let settings = CameraSettings::default();

    let with_empty_inset = compositor
        .compose(&request(&main, FacingMode::Environment, Some((&empty, FacingMode::User)), true, settings))
        .unwrap();
    let without = compositor
        .compose(&request(&main, FacingMode::Environment, None, true, settings))
        .unwrap();
    assert_eq!(with_empty_inset, without);
}

#[test]
fn test_zero_sized_main_frame_captures_nothing() {
    let empty = solid(0, 0, GREEN);
    let photo = SnapshotCompositor::new().capture(&request(
        &empty,
        FacingMode::Environment,
        None,
        false,
        CameraSettings::default(),
    ));
    assert!(photo.is_none());
}
