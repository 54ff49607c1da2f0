//! Color-value normalization and conversion.
//!
//! A user-supplied color is one of three externally-defined representations:
//! a hex string (`"ff0000"`, `"#23a9dd"`), an RGB triple of 0-255 integers,
//! or an RGB triple of 0-1 floats. [`Colors`] holds a list of such values in
//! input order and offers validity checks, structural classification,
//! hex/RGB conversion, and construction of a continuous color ramp, either
//! from the stored values or from the middle pixel row of a ramp image.

use std::path::Path;

use crate::colormaps::ColorRamp;
use crate::error::{OchreError, Result};

/// A single color value in one of the supported representations.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    /// Hex string, leading `#` optional
    Hex(String),
    /// RGB triple with 0-255 components
    Rgb(u8, u8, u8),
    /// RGB triple with 0-1 float components
    RgbNormalized(f64, f64, f64),
}

impl From<&str> for ColorValue {
    fn from(value: &str) -> Self {
        ColorValue::Hex(value.to_string())
    }
}

impl From<String> for ColorValue {
    fn from(value: String) -> Self {
        ColorValue::Hex(value)
    }
}

impl From<(u8, u8, u8)> for ColorValue {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        ColorValue::Rgb(r, g, b)
    }
}

impl From<(f64, f64, f64)> for ColorValue {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        ColorValue::RgbNormalized(r, g, b)
    }
}

/// Structural classification of a color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorKind {
    Hex,
    Rgb,
    RgbNormalized,
}

impl ColorKind {
    /// Classification label as reported to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorKind::Hex => "hex",
            ColorKind::Rgb => "rgb",
            ColorKind::RgbNormalized => "rgb-normalized",
        }
    }
}

/// An ordered list of user-supplied color values.
#[derive(Debug, Clone)]
pub struct Colors {
    values: Vec<ColorValue>,
}

impl Colors {
    /// Create a color list from any mix of supported representations.
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ColorValue>,
    {
        Colors {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Extract a color ramp from an image.
    ///
    /// Reads the horizontal strip of pixels across the middle row, one 0-255
    /// RGB entry per column. The file must exist; a missing path is reported
    /// before any decode is attempted.
    pub fn from_image<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OchreError::DataNotFound {
                message: format!("The file {} does not exist", path.display()),
            });
        }

        let image = image::open(path)?.to_rgb8();
        let (width, height) = image.dimensions();
        let mid_row = height / 2;
        let values = (0..width)
            .map(|x| {
                let p = image.get_pixel(x, mid_row);
                ColorValue::Rgb(p[0], p[1], p[2])
            })
            .collect();

        Ok(Colors { values })
    }

    /// The stored color values, in input order.
    pub fn values(&self) -> &[ColorValue] {
        &self.values
    }

    /// Classify each entry into hex / rgb / rgb-normalized, in input order.
    ///
    /// Entries that are valid in no representation are skipped.
    pub fn kinds(&self) -> Vec<ColorKind> {
        self.values
            .iter()
            .filter_map(|value| match value {
                ColorValue::RgbNormalized(r, g, b) if rgb_norm_in_range(*r, *g, *b) => {
                    Some(ColorKind::RgbNormalized)
                }
                ColorValue::Rgb(..) => Some(ColorKind::Rgb),
                ColorValue::Hex(s) if is_valid_hex_str(s) => Some(ColorKind::Hex),
                _ => None,
            })
            .collect()
    }

    /// Per-entry hex validity, order preserving.
    pub fn is_valid_hex(&self) -> Vec<bool> {
        self.values
            .iter()
            .map(|value| matches!(value, ColorValue::Hex(s) if is_valid_hex_str(s)))
            .collect()
    }

    /// Per-entry RGB validity (either 0-255 or 0-1 form), order preserving.
    pub fn is_valid_rgb(&self) -> Vec<bool> {
        self.values
            .iter()
            .map(|value| match value {
                ColorValue::Rgb(..) => true,
                ColorValue::RgbNormalized(r, g, b) => rgb_norm_in_range(*r, *g, *b),
                ColorValue::Hex(_) => false,
            })
            .collect()
    }

    /// Convert every entry to a hex string.
    ///
    /// Hex entries pass through unchanged; RGB entries are formatted as
    /// lowercase `#rrggbb` (0-1 floats are rounded to the nearest 8-bit
    /// component).
    pub fn to_hex(&self) -> Result<Vec<String>> {
        self.values
            .iter()
            .map(|value| match value {
                ColorValue::Hex(s) => {
                    if is_valid_hex_str(s) {
                        Ok(s.clone())
                    } else {
                        Err(invalid(s))
                    }
                }
                ColorValue::Rgb(r, g, b) => Ok(format!("#{:02x}{:02x}{:02x}", r, g, b)),
                ColorValue::RgbNormalized(r, g, b) => {
                    if !rgb_norm_in_range(*r, *g, *b) {
                        return Err(invalid(&format!("({r}, {g}, {b})")));
                    }
                    Ok(format!(
                        "#{:02x}{:02x}{:02x}",
                        (r * 255.0).round() as u8,
                        (g * 255.0).round() as u8,
                        (b * 255.0).round() as u8
                    ))
                }
            })
            .collect()
    }

    /// Convert every entry to a normalized (0-1) RGB triple.
    pub fn to_rgb_normalized(&self) -> Result<Vec<(f64, f64, f64)>> {
        self.values
            .iter()
            .map(|value| match value {
                ColorValue::Hex(s) => {
                    let (r, g, b) = parse_hex(s)?;
                    Ok((
                        f64::from(r) / 255.0,
                        f64::from(g) / 255.0,
                        f64::from(b) / 255.0,
                    ))
                }
                ColorValue::Rgb(r, g, b) => Ok((
                    f64::from(*r) / 255.0,
                    f64::from(*g) / 255.0,
                    f64::from(*b) / 255.0,
                )),
                ColorValue::RgbNormalized(r, g, b) => {
                    if rgb_norm_in_range(*r, *g, *b) {
                        Ok((*r, *g, *b))
                    } else {
                        Err(invalid(&format!("({r}, {g}, {b})")))
                    }
                }
            })
            .collect()
    }

    /// Convert every entry to a 0-255 RGB triple.
    ///
    /// 0-1 float components are truncated toward zero (`0.5` becomes `127`),
    /// matching the integer conversion of the normalized form.
    pub fn to_rgb(&self) -> Result<Vec<(u8, u8, u8)>> {
        self.values
            .iter()
            .map(|value| match value {
                ColorValue::Hex(s) => parse_hex(s),
                ColorValue::Rgb(r, g, b) => Ok((*r, *g, *b)),
                ColorValue::RgbNormalized(r, g, b) => {
                    if rgb_norm_in_range(*r, *g, *b) {
                        Ok(((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8))
                    } else {
                        Err(invalid(&format!("({r}, {g}, {b})")))
                    }
                }
            })
            .collect()
    }

    /// Build a continuous color ramp usable anywhere a colormap is accepted.
    pub fn to_color_ramp(&self, name: Option<&str>) -> Result<ColorRamp> {
        let anchors: Vec<[u8; 3]> = self
            .to_rgb()?
            .into_iter()
            .map(|(r, g, b)| [r, g, b])
            .collect();
        ColorRamp::new(name.unwrap_or("custom_color_ramp"), anchors)
    }

    /// Build a `colorgrad` gradient from the stored colors.
    pub fn to_gradient(&self) -> Result<colorgrad::Gradient> {
        let colors: Vec<colorgrad::Color> = self
            .to_rgb_normalized()?
            .into_iter()
            .map(|(r, g, b)| colorgrad::Color::new(r, g, b, 1.0))
            .collect();
        colorgrad::CustomGradient::new()
            .colors(&colors)
            .build()
            .map_err(|e| OchreError::InvalidColor {
                message: e.to_string(),
            })
    }
}

fn invalid(value: &str) -> OchreError {
    OchreError::InvalidColor {
        message: format!("{value} is not a valid color value"),
    }
}

fn rgb_norm_in_range(r: f64, g: f64, b: f64) -> bool {
    [r, g, b].iter().all(|c| (0.0..=1.0).contains(c))
}

fn is_valid_hex_str(s: &str) -> bool {
    let digits = s.strip_prefix('#').unwrap_or(s);
    matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a hex color string into a 0-255 RGB triple.
///
/// Accepts 3/4/6/8-digit forms with an optional leading `#`; any alpha
/// digits are ignored.
pub fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !is_valid_hex_str(s) {
        return Err(invalid(s));
    }
    let digits = s.strip_prefix('#').unwrap_or(s);
    let expanded: String;
    let digits = if digits.len() < 6 {
        // #rgb / #rgba shorthand doubles each digit
        expanded = digits.chars().flat_map(|c| [c, c]).collect();
        expanded.as_str()
    } else {
        digits
    };
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid(s));
    Ok((byte(0)?, byte(2)?, byte(4)?))
}

/// Resolve a color given as a CSS-style name or a hex string.
///
/// Covers the handful of names used by the default styles; anything else
/// must be hex.
pub fn parse_color(s: &str) -> Result<(u8, u8, u8)> {
    match s.to_lowercase().as_str() {
        "black" => Ok((0, 0, 0)),
        "white" => Ok((255, 255, 255)),
        "red" => Ok((255, 0, 0)),
        "green" => Ok((0, 128, 0)),
        "blue" => Ok((0, 0, 255)),
        "orange" => Ok((255, 165, 0)),
        "yellow" => Ok((255, 255, 0)),
        "cyan" => Ok((0, 255, 255)),
        "magenta" => Ok((255, 0, 255)),
        "purple" => Ok((128, 0, 128)),
        "pink" => Ok((255, 192, 203)),
        "brown" => Ok((165, 42, 42)),
        "grey" | "gray" => Ok((128, 128, 128)),
        other => parse_hex(other),
    }
}
