// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! Both compositors end in the same place: an RGBA surface encoded as a
//! JPEG and handed out as a [`CapturedPhoto`], whose data-URI form is what
//! the upload/minting collaborator consumes.

use crate::constants::capture::JPEG_QUALITY;
use crate::errors::PhotoError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// MIME type of every captured photo
pub const MIME_TYPE: &str = "image/jpeg";

/// Encoded still image, the output of either compositor
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
}

impl CapturedPhoto {
    /// JPEG bytes
    pub fn bytes(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.jpeg
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `data:image/jpeg;base64,...` form
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", MIME_TYPE, STANDARD.encode(&self.jpeg))
    }

    /// Decode the photo back into pixels
    pub fn decode(&self) -> Result<DynamicImage, PhotoError> {
        Ok(image::load_from_memory(&self.jpeg)?)
    }

    /// Write the JPEG to `path`
    pub fn save(&self, path: &Path) -> Result<PathBuf, PhotoError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.jpeg)?;
        info!(path = %path.display(), bytes = self.jpeg.len(), "Photo saved");
        Ok(path.to_path_buf())
    }
}

impl std::fmt::Debug for CapturedPhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedPhoto")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.jpeg.len())
            .finish()
    }
}

/// JPEG encoder for composed surfaces
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: u8,
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }
}

impl PhotoEncoder {
    /// Encoder at maximum quality
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder at a custom quality (1-100)
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Encode a composed surface
    pub fn encode(&self, surface: &RgbaImage) -> Result<CapturedPhoto, PhotoError> {
        let (width, height) = surface.dimensions();
        let rgb = convert_rgba_to_rgb(surface);

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality).encode_image(&rgb)?;

        debug!(width, height, size = jpeg.len(), "Encoding complete");
        Ok(CapturedPhoto {
            jpeg,
            width,
            height,
        })
    }
}

/// Drop the alpha channel; composed surfaces are always opaque
fn convert_rgba_to_rgb(surface: &RgbaImage) -> RgbImage {
    let (width, height) = surface.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, _] = surface.get_pixel(x, y).0;
        image::Rgb([r, g, b])
    })
}
