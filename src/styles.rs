//! Shared style options for figures.
//!
//! This module holds the default-option tables used by the array glyph and
//! the statistic plots. Each table is a plain struct with serde defaults;
//! dynamic overrides arrive as JSON-typed values through [`PlotOptions::set`]
//! and [`HistogramOptions::set`], which validate keys by membership and
//! reject anything unknown.
//!
//! Sizes are in pixels (figure dimensions) and points (font sizes).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OchreError, Result};

/// Option keys accepted by [`PlotOptions::set`].
pub const PLOT_OPTION_KEYS: &[&str] = &[
    "figsize",
    "title",
    "title_size",
    "cmap",
    "vmin",
    "vmax",
    "color_scale",
    "gamma",
    "line_threshold",
    "line_scale",
    "bounds",
    "midpoint",
    "cbar_orientation",
    "cbar_length",
    "cbar_label",
    "cbar_label_size",
    "ticks_spacing",
    "display_cell_value",
    "num_size",
    "background_color_threshold",
    "id_color",
    "id_size",
    "precision",
];

/// Option keys accepted by [`HistogramOptions::set`].
pub const HISTOGRAM_OPTION_KEYS: &[&str] = &[
    "figsize",
    "bins",
    "color",
    "alpha",
    "rwidth",
    "grid_alpha",
    "xlabel",
    "ylabel",
    "xlabel_font_size",
    "ylabel_font_size",
    "xtick_font_size",
    "ytick_font_size",
];

/// Options controlling array-glyph figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotOptions {
    /// Figure size in pixels (width, height)
    #[serde(default = "default_plot_figsize")]
    pub figsize: (u32, u32),

    /// Figure title
    #[serde(default = "default_title")]
    pub title: String,

    /// Title font size in points
    #[serde(default = "default_title_size")]
    pub title_size: u32,

    /// Colormap name (see [`crate::colormaps::get_colormap`])
    #[serde(default = "default_cmap")]
    pub cmap: String,

    /// Minimum value for color scaling (None = data minimum)
    #[serde(default)]
    pub vmin: Option<f64>,

    /// Maximum value for color scaling (None = data maximum)
    #[serde(default)]
    pub vmax: Option<f64>,

    /// Color-scale strategy: linear, power, sym-lognorm, boundary-norm, midpoint
    #[serde(default = "default_color_scale")]
    pub color_scale: String,

    /// Exponent for the power color scale
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// Linear threshold for the sym-lognorm color scale
    #[serde(default = "default_line_threshold")]
    pub line_threshold: f64,

    /// Linear-range scale factor for the sym-lognorm color scale
    #[serde(default = "default_line_scale")]
    pub line_scale: f64,

    /// Interval boundaries for the boundary-norm color scale (None = ticks)
    #[serde(default)]
    pub bounds: Option<Vec<f64>>,

    /// Split point for the midpoint color scale
    #[serde(default)]
    pub midpoint: f64,

    /// Colorbar orientation: vertical or horizontal
    #[serde(default = "default_cbar_orientation")]
    pub cbar_orientation: String,

    /// Colorbar length as a fraction of the figure edge
    #[serde(default = "default_cbar_length")]
    pub cbar_length: f64,

    /// Colorbar label text
    #[serde(default = "default_cbar_label")]
    pub cbar_label: String,

    /// Colorbar label font size in points
    #[serde(default = "default_cbar_label_size")]
    pub cbar_label_size: u32,

    /// Colorbar tick spacing (None = derived from the data range)
    #[serde(default)]
    pub ticks_spacing: Option<f64>,

    /// Draw the value of each cell as text
    #[serde(default)]
    pub display_cell_value: bool,

    /// Font size of the cell-value text in points
    #[serde(default = "default_num_size")]
    pub num_size: u32,

    /// Threshold deciding the cell-value text color (None = half of max)
    #[serde(default)]
    pub background_color_threshold: Option<f64>,

    /// Color of point-id annotations
    #[serde(default = "default_id_color")]
    pub id_color: String,

    /// Font size of point-id annotations in points
    #[serde(default = "default_id_size")]
    pub id_size: u32,

    /// Decimal places for displayed cell values
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            figsize: default_plot_figsize(),
            title: default_title(),
            title_size: default_title_size(),
            cmap: default_cmap(),
            vmin: None,
            vmax: None,
            color_scale: default_color_scale(),
            gamma: default_gamma(),
            line_threshold: default_line_threshold(),
            line_scale: default_line_scale(),
            bounds: None,
            midpoint: 0.0,
            cbar_orientation: default_cbar_orientation(),
            cbar_length: default_cbar_length(),
            cbar_label: default_cbar_label(),
            cbar_label_size: default_cbar_label_size(),
            ticks_spacing: None,
            display_cell_value: false,
            num_size: default_num_size(),
            background_color_threshold: None,
            id_color: default_id_color(),
            id_size: default_id_size(),
            precision: default_precision(),
        }
    }
}

impl PlotOptions {
    /// Override a single option by key, validating key membership.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        match key {
            "figsize" => self.figsize = as_figsize(key, value)?,
            "title" => self.title = as_string(key, value)?,
            "title_size" => self.title_size = as_u32(key, value)?,
            "cmap" => self.cmap = as_string(key, value)?,
            "vmin" => self.vmin = as_opt_f64(key, value)?,
            "vmax" => self.vmax = as_opt_f64(key, value)?,
            "color_scale" => self.color_scale = as_string(key, value)?,
            "gamma" => self.gamma = as_f64(key, value)?,
            "line_threshold" => self.line_threshold = as_f64(key, value)?,
            "line_scale" => self.line_scale = as_f64(key, value)?,
            "bounds" => self.bounds = as_opt_f64_vec(key, value)?,
            "midpoint" => self.midpoint = as_f64(key, value)?,
            "cbar_orientation" => self.cbar_orientation = as_string(key, value)?,
            "cbar_length" => self.cbar_length = as_f64(key, value)?,
            "cbar_label" => self.cbar_label = as_string(key, value)?,
            "cbar_label_size" => self.cbar_label_size = as_u32(key, value)?,
            "ticks_spacing" => self.ticks_spacing = as_opt_f64(key, value)?,
            "display_cell_value" => self.display_cell_value = as_bool(key, value)?,
            "num_size" => self.num_size = as_u32(key, value)?,
            "background_color_threshold" => {
                self.background_color_threshold = as_opt_f64(key, value)?
            }
            "id_color" => self.id_color = as_string(key, value)?,
            "id_size" => self.id_size = as_u32(key, value)?,
            "precision" => self.precision = as_u32(key, value)? as usize,
            _ => {
                return Err(OchreError::UnknownOption {
                    key: key.to_string(),
                    available: PLOT_OPTION_KEYS.join(", "),
                })
            }
        }
        Ok(())
    }

    /// Apply a batch of overrides, stopping at the first invalid one.
    pub fn apply<'a, I>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        for (key, value) in overrides {
            self.set(key, &value)?;
        }
        Ok(())
    }
}

/// Options controlling histogram figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramOptions {
    /// Figure size in pixels (width, height)
    #[serde(default = "default_hist_figsize")]
    pub figsize: (u32, u32),

    /// Number of histogram bins
    #[serde(default = "default_bins")]
    pub bins: usize,

    /// Bar colors, one per data series
    #[serde(default = "default_hist_color")]
    pub color: Vec<String>,

    /// Bar transparency (0 transparent .. 1 opaque)
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Relative bar width inside each bin (0 .. 1)
    #[serde(default = "default_rwidth")]
    pub rwidth: f64,

    /// Grid-line transparency
    #[serde(default = "default_grid_alpha")]
    pub grid_alpha: f64,

    /// X-axis label
    #[serde(default)]
    pub xlabel: String,

    /// Y-axis label
    #[serde(default)]
    pub ylabel: String,

    /// X-axis label font size in points
    #[serde(default = "default_label_font_size")]
    pub xlabel_font_size: u32,

    /// Y-axis label font size in points
    #[serde(default = "default_label_font_size")]
    pub ylabel_font_size: u32,

    /// X-axis tick font size in points
    #[serde(default = "default_tick_font_size")]
    pub xtick_font_size: u32,

    /// Y-axis tick font size in points
    #[serde(default = "default_tick_font_size")]
    pub ytick_font_size: u32,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        HistogramOptions {
            figsize: default_hist_figsize(),
            bins: default_bins(),
            color: default_hist_color(),
            alpha: default_alpha(),
            rwidth: default_rwidth(),
            grid_alpha: default_grid_alpha(),
            xlabel: String::new(),
            ylabel: String::new(),
            xlabel_font_size: default_label_font_size(),
            ylabel_font_size: default_label_font_size(),
            xtick_font_size: default_tick_font_size(),
            ytick_font_size: default_tick_font_size(),
        }
    }
}

impl HistogramOptions {
    /// Override a single option by key, validating key membership.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        match key {
            "figsize" => self.figsize = as_figsize(key, value)?,
            "bins" => self.bins = as_u32(key, value)? as usize,
            "color" => self.color = as_string_vec(key, value)?,
            "alpha" => self.alpha = as_f64(key, value)?,
            "rwidth" => self.rwidth = as_f64(key, value)?,
            "grid_alpha" => self.grid_alpha = as_f64(key, value)?,
            "xlabel" => self.xlabel = as_string(key, value)?,
            "ylabel" => self.ylabel = as_string(key, value)?,
            "xlabel_font_size" => self.xlabel_font_size = as_u32(key, value)?,
            "ylabel_font_size" => self.ylabel_font_size = as_u32(key, value)?,
            "xtick_font_size" => self.xtick_font_size = as_u32(key, value)?,
            "ytick_font_size" => self.ytick_font_size = as_u32(key, value)?,
            _ => {
                return Err(OchreError::UnknownOption {
                    key: key.to_string(),
                    available: HISTOGRAM_OPTION_KEYS.join(", "),
                })
            }
        }
        Ok(())
    }

    /// Apply a batch of overrides, stopping at the first invalid one.
    pub fn apply<'a, I>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        for (key, value) in overrides {
            self.set(key, &value)?;
        }
        Ok(())
    }
}

fn default_plot_figsize() -> (u32, u32) {
    (800, 800)
}

fn default_hist_figsize() -> (u32, u32) {
    (500, 500)
}

fn default_title() -> String {
    "Array Plot".to_string()
}

fn default_title_size() -> u32 {
    15
}

fn default_cmap() -> String {
    "coolwarm_r".to_string()
}

fn default_color_scale() -> String {
    "linear".to_string()
}

fn default_gamma() -> f64 {
    0.5
}

fn default_line_threshold() -> f64 {
    1e-4
}

fn default_line_scale() -> f64 {
    0.001
}

fn default_cbar_orientation() -> String {
    "vertical".to_string()
}

fn default_cbar_length() -> f64 {
    0.75
}

fn default_cbar_label() -> String {
    "Value".to_string()
}

fn default_cbar_label_size() -> u32 {
    12
}

fn default_num_size() -> u32 {
    8
}

fn default_id_color() -> String {
    "green".to_string()
}

fn default_id_size() -> u32 {
    20
}

fn default_precision() -> usize {
    2
}

fn default_bins() -> usize {
    15
}

fn default_hist_color() -> Vec<String> {
    vec!["#0504aa".to_string()]
}

fn default_alpha() -> f64 {
    0.7
}

fn default_rwidth() -> f64 {
    0.85
}

fn default_grid_alpha() -> f64 {
    0.75
}

fn default_label_font_size() -> u32 {
    12
}

fn default_tick_font_size() -> u32 {
    10
}

fn type_error(key: &str, expected: &str, value: &Value) -> OchreError {
    OchreError::InvalidParameter {
        param: key.to_string(),
        message: format!("expected {}, got {}", expected, value),
    }
}

fn as_f64(key: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| type_error(key, "a number", value))
}

fn as_opt_f64(key: &str, value: &Value) -> Result<Option<f64>> {
    if value.is_null() {
        Ok(None)
    } else {
        as_f64(key, value).map(Some)
    }
}

fn as_u32(key: &str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .map(|v| v as u32)
        .ok_or_else(|| type_error(key, "a non-negative integer", value))
}

fn as_bool(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| type_error(key, "a boolean", value))
}

fn as_string(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| type_error(key, "a string", value))
}

fn as_figsize(key: &str, value: &Value) -> Result<(u32, u32)> {
    let arr = value
        .as_array()
        .ok_or_else(|| type_error(key, "a [width, height] pair", value))?;
    if arr.len() != 2 {
        return Err(type_error(key, "a [width, height] pair", value));
    }
    Ok((as_u32(key, &arr[0])?, as_u32(key, &arr[1])?))
}

fn as_opt_f64_vec(key: &str, value: &Value) -> Result<Option<Vec<f64>>> {
    if value.is_null() {
        return Ok(None);
    }
    let arr = value
        .as_array()
        .ok_or_else(|| type_error(key, "an array of numbers", value))?;
    arr.iter().map(|v| as_f64(key, v)).collect::<Result<_>>().map(Some)
}

fn as_string_vec(key: &str, value: &Value) -> Result<Vec<String>> {
    let arr = value
        .as_array()
        .ok_or_else(|| type_error(key, "an array of strings", value))?;
    arr.iter().map(|v| as_string(key, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plot_defaults() {
        let opts = PlotOptions::default();
        assert_eq!(opts.cmap, "coolwarm_r");
        assert_eq!(opts.color_scale, "linear");
        assert_eq!(opts.title, "Array Plot");
        assert_eq!(opts.cbar_length, 0.75);
        assert!(!opts.display_cell_value);
        assert_eq!(opts.precision, 2);
    }

    #[test]
    fn test_histogram_defaults() {
        let opts = HistogramOptions::default();
        assert_eq!(opts.bins, 15);
        assert_eq!(opts.color, vec!["#0504aa".to_string()]);
        assert_eq!(opts.alpha, 0.7);
        assert_eq!(opts.rwidth, 0.85);
    }

    #[test]
    fn test_set_known_key() {
        let mut opts = PlotOptions::default();
        opts.set("gamma", &json!(0.8)).unwrap();
        assert_eq!(opts.gamma, 0.8);

        opts.set("bounds", &json!([0.0, 5.0, 10.0])).unwrap();
        assert_eq!(opts.bounds, Some(vec![0.0, 5.0, 10.0]));
    }

    #[test]
    fn test_set_unknown_key_is_rejected() {
        let mut opts = PlotOptions::default();
        let err = opts.set("no_such_option", &json!(1)).unwrap_err();
        match err {
            OchreError::UnknownOption { key, available } => {
                assert_eq!(key, "no_such_option");
                assert!(available.contains("cmap"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_set_wrong_type_is_rejected() {
        let mut opts = HistogramOptions::default();
        assert!(opts.set("alpha", &json!("not a number")).is_err());
        assert!(opts.set("color", &json!(42)).is_err());
    }
}
