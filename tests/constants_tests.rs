// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use zory_camera::constants::{acquisition, capture, file_formats, inset, upload};

#[test]
fn test_upload_output_scale_factor() {
    // Preview positions are scaled from 480 to 1080
    assert!((upload::output_scale_factor() - 2.25).abs() < 1e-12);
}

#[test]
fn test_scale_bounds_ordered() {
    assert!(upload::MIN_SCALE < 1.0);
    assert!(upload::MAX_SCALE > 1.0);
    assert!(upload::WHEEL_ZOOM_OUT < 1.0 && upload::WHEEL_ZOOM_IN > 1.0);
}

#[test]
fn test_inset_fits_inside_output() {
    // Inset plus both margins must stay inside the square
    assert!(inset::SIZE_RATIO + 2.0 * inset::MARGIN_RATIO < 1.0);
    assert!(inset::BORDER_RATIO < inset::MARGIN_RATIO);
}

#[test]
fn test_acquisition_minimum_below_ideal() {
    assert!(acquisition::MIN_WIDTH < acquisition::IDEAL_WIDTH);
    assert!(acquisition::MIN_HEIGHT < acquisition::IDEAL_HEIGHT);
    assert_eq!(capture::MIN_OUTPUT_SIDE, upload::OUTPUT_SIZE);
}

#[test]
fn test_image_extensions() {
    assert!(file_formats::is_image_extension("JPG"));
    assert!(file_formats::is_image_extension("png"));
    assert!(!file_formats::is_image_extension("txt"));
    assert_eq!(file_formats::mime_type_for_extension("jpeg"), "image/jpeg");
    assert_eq!(file_formats::mime_type_for_extension("txt"), "text/plain");
}
