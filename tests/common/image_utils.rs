//! Image inspection helpers for the integration tests.

use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Load an image from a file, panicking with context on failure.
pub fn load_image(path: &Path) -> DynamicImage {
    image::open(path).unwrap_or_else(|e| panic!("failed to open {}: {e}", path.display()))
}

/// Detect the image format of a byte buffer.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Count how many pixels in an RGB image differ from pure white.
pub fn non_white_pixels(img: &DynamicImage) -> usize {
    img.to_rgb8()
        .pixels()
        .filter(|p| p.0 != [255, 255, 255])
        .count()
}
