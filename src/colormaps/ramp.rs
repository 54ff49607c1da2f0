//! Custom color ramps built from user-supplied colors.

use super::colormap::{sample_anchors, Colormap};
use crate::error::{OchreError, Result};

/// A continuous colormap interpolated between a list of anchor colors.
///
/// Built from user color values or from the pixel strip of a ramp image;
/// see [`crate::colors::Colors::to_color_ramp`].
pub struct ColorRamp {
    name: String,
    anchors: Vec<[u8; 3]>,
}

impl ColorRamp {
    /// Create a ramp from at least two anchor colors.
    pub fn new(name: &str, anchors: Vec<[u8; 3]>) -> Result<Self> {
        if anchors.len() < 2 {
            return Err(OchreError::InvalidColor {
                message: format!(
                    "a color ramp needs at least 2 colors, got {}",
                    anchors.len()
                ),
            });
        }
        Ok(ColorRamp {
            name: name.to_string(),
            anchors,
        })
    }

    /// The anchor colors, in ramp order.
    pub fn anchors(&self) -> &[[u8; 3]] {
        &self.anchors
    }
}

impl Colormap for ColorRamp {
    fn map_normalized(&self, value: f64) -> [u8; 3] {
        sample_anchors(&self.anchors, value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
