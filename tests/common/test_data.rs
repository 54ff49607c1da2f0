//! Synthetic data builders for the integration tests.

use ndarray::{Array2, Array3};
use std::path::Path;

/// Sentinel used to mark out-of-domain cells in the test arrays.
pub const NO_DATA_VALUE: f64 = -9999.0;

/// A 10x10 field with values 0..99 and the corner masked by the sentinel.
pub fn masked_field() -> Array2<f64> {
    let mut arr = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c) as f64);
    arr[[0, 0]] = NO_DATA_VALUE;
    arr
}

/// A small frame stack whose values drift upward frame by frame.
pub fn frame_stack(frames: usize) -> Array3<f64> {
    Array3::from_shape_fn((frames, 8, 8), |(f, r, c)| (f * 10 + r + c) as f64)
}

/// A three-band array shaped like raw satellite digital numbers.
pub fn band_stack() -> Array3<f64> {
    Array3::from_shape_fn((3, 12, 12), |(b, r, c)| {
        (b * 1000 + r * 80 + c * 20) as f64
    })
}

/// Write a horizontal two-color ramp strip for color-ramp extraction.
pub fn write_ramp_image(path: &Path) {
    let width = 16u32;
    let img = image::RgbImage::from_fn(width, 4, |x, _| {
        let t = x as f64 / (width - 1) as f64;
        image::Rgb([(t * 255.0) as u8, 0, ((1.0 - t) * 255.0) as u8])
    });
    img.save(path).expect("failed to write ramp fixture");
}
