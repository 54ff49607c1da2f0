//! Colormap trait and name resolution.

use crate::error::{OchreError, Result};

/// Trait for color mapping implementations
pub trait Colormap: Send + Sync {
    /// Map a normalized value (0.0 to 1.0) to an RGB color
    fn map_normalized(&self, value: f64) -> [u8; 3];

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// A colormap with its value axis flipped.
pub struct Reversed {
    inner: Box<dyn Colormap>,
    name: String,
}

impl Colormap for Reversed {
    fn map_normalized(&self, value: f64) -> [u8; 3] {
        self.inner.map_normalized(1.0 - value.clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Get a colormap by name.
///
/// Any known name with an `_r` suffix resolves to the reversed colormap.
pub fn get_colormap(name: &str) -> Result<Box<dyn Colormap>> {
    use super::{diverging::*, sequential::*};

    let lower = name.to_lowercase();
    if let Some(base) = lower.strip_suffix("_r") {
        let inner = get_colormap(base)?;
        return Ok(Box::new(Reversed {
            inner,
            name: lower.clone(),
        }));
    }

    match lower.as_str() {
        "viridis" => Ok(Box::new(Viridis)),
        "gray" | "grays" | "greys" => Ok(Box::new(Grays)),
        "terrain" => Ok(Box::new(Terrain)),
        "coolwarm" => Ok(Box::new(Coolwarm)),
        _ => Err(OchreError::UnknownColormap {
            name: name.to_string(),
        }),
    }
}

/// Linear interpolation between two colors
pub fn lerp_color(c1: [u8; 3], c2: [u8; 3], t: f64) -> [u8; 3] {
    [
        (f64::from(c1[0]) * (1.0 - t) + f64::from(c2[0]) * t) as u8,
        (f64::from(c1[1]) * (1.0 - t) + f64::from(c2[1]) * t) as u8,
        (f64::from(c1[2]) * (1.0 - t) + f64::from(c2[2]) * t) as u8,
    ]
}

/// Sample an anchor table at a normalized position.
pub(crate) fn sample_anchors(anchors: &[[u8; 3]], value: f64) -> [u8; 3] {
    match anchors {
        [] => [0, 0, 0],
        [only] => *only,
        _ => {
            let position = value.clamp(0.0, 1.0) * (anchors.len() - 1) as f64;
            let index = (position.floor() as usize).min(anchors.len() - 2);
            lerp_color(anchors[index], anchors[index + 1], position - index as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_color() {
        let black = [0, 0, 0];
        let white = [255, 255, 255];

        let mid = lerp_color(black, white, 0.5);
        assert_eq!(mid, [127, 127, 127]);
    }

    #[test]
    fn test_sample_anchor_endpoints() {
        let anchors = [[0, 0, 0], [100, 100, 100], [255, 255, 255]];
        assert_eq!(sample_anchors(&anchors, 0.0), [0, 0, 0]);
        assert_eq!(sample_anchors(&anchors, 1.0), [255, 255, 255]);
        assert_eq!(sample_anchors(&anchors, 0.5), [100, 100, 100]);
        assert_eq!(sample_anchors(&anchors, -1.0), [0, 0, 0]);
        assert_eq!(sample_anchors(&anchors, 2.0), [255, 255, 255]);
    }

    #[test]
    fn test_get_colormap_by_name() {
        assert!(get_colormap("viridis").is_ok());
        assert!(get_colormap("Terrain").is_ok());
        assert!(get_colormap("coolwarm_r").is_ok());
        assert!(get_colormap("nope").is_err());
        assert!(get_colormap("nope_r").is_err());
    }

    #[test]
    fn test_reversed_flips_endpoints() {
        let cmap = get_colormap("coolwarm").unwrap();
        let rev = get_colormap("coolwarm_r").unwrap();
        assert_eq!(cmap.map_normalized(0.0), rev.map_normalized(1.0));
        assert_eq!(cmap.map_normalized(1.0), rev.map_normalized(0.0));
        assert_eq!(rev.name(), "coolwarm_r");
    }
}
