// SPDX-License-Identifier: GPL-3.0-only

//! Capture-wide constants

/// Live stream acquisition
pub mod acquisition {
    /// Ideal capture width requested from the camera
    pub const IDEAL_WIDTH: u32 = 1920;
    /// Ideal capture height requested from the camera
    pub const IDEAL_HEIGHT: u32 = 1080;
    /// Hard minimum width; lower resolutions fail as overconstrained
    pub const MIN_WIDTH: u32 = 640;
    /// Hard minimum height
    pub const MIN_HEIGHT: u32 = 480;
}

/// Camera-path snapshot geometry
pub mod capture {
    /// Minimum side length of the square output
    pub const MIN_OUTPUT_SIDE: u32 = 1080;
    /// JPEG quality used for every captured photo (maximum)
    pub const JPEG_QUALITY: u8 = 100;
}

/// Picture-in-picture inset geometry, as fractions of the output side
pub mod inset {
    /// Inset edge length
    pub const SIZE_RATIO: f64 = 0.3;
    /// Distance from the nearest output edges
    pub const MARGIN_RATIO: f64 = 0.03;
    /// Corner radius of the `rounded` shape, as a fraction of the inset size
    pub const CORNER_RATIO: f64 = 0.1;
    /// Border stroke width
    pub const BORDER_RATIO: f64 = 0.01;
}

/// Upload-path geometry and gesture limits
pub mod upload {
    /// Side of the interactive preview surface
    pub const PREVIEW_SIZE: u32 = 480;
    /// Side of the captured output
    pub const OUTPUT_SIZE: u32 = 1080;
    /// Smallest allowed image scale
    pub const MIN_SCALE: f64 = 0.1;
    /// Largest allowed image scale
    pub const MAX_SCALE: f64 = 3.0;
    /// Wheel zoom factor when scrolling up/away
    pub const WHEEL_ZOOM_IN: f64 = 1.1;
    /// Wheel zoom factor when scrolling down/toward
    pub const WHEEL_ZOOM_OUT: f64 = 0.9;

    /// Ratio between output and preview coordinates (2.25)
    pub fn output_scale_factor() -> f64 {
        OUTPUT_SIZE as f64 / PREVIEW_SIZE as f64
    }
}

/// Runtime environment detection
pub mod device {
    /// User-agent fragments that classify a session as mobile
    pub const MOBILE_USER_AGENTS: &[&str] = &[
        "android",
        "webos",
        "iphone",
        "ipad",
        "ipod",
        "blackberry",
        "iemobile",
        "opera mini",
    ];

    /// Host platform type that cannot grant camera access
    pub const WEB_PLATFORM: &str = "web";
}

/// Settings persistence
pub mod settings {
    /// Key of the settings record in the session store
    pub const STORAGE_KEY: &str = "cameraSettings";
}

/// Supported image file extensions for the still-image backend and CLI
pub mod file_formats {
    /// Image extensions decodable by the `image` crate features we enable
    pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif"];

    /// Check if an extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }

    /// Best-effort MIME type for a file extension
    pub fn mime_type_for_extension(ext: &str) -> &'static str {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "gif" => "image/gif",
            "txt" => "text/plain",
            "json" => "application/json",
            _ => "application/octet-stream",
        }
    }
}
