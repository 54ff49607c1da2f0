//! Array glyphs: raster visualization of 2D and 3D arrays.
//!
//! An [`ArrayGlyph`] wraps a numeric array for display. Cells matching an
//! exclude sentinel are masked to NaN and render as background; a 3D array
//! is either composed into an RGB image or animated slice by slice along its
//! first axis.

pub mod animation;
pub mod render;
pub mod rgb;

pub use animation::{Animation, SUPPORTED_VIDEO_FORMATS};
pub use render::{Figure, PointStyle};
pub use rgb::RgbParams;

use ndarray::{Array2, Array3, Axis};
use serde_json::Value;
use tracing::debug;

use crate::colormaps::get_colormap;
use crate::colors::parse_color;
use crate::error::{OchreError, Result};
use crate::scales::{generate_ticks, ColorScale};
use crate::styles::PlotOptions;

use render::{render, RasterData, RenderSpec};
use rgb::prepare_rgb_array;

/// Relative tolerance when matching exclude values.
const MASK_RTOL: f64 = 1e-7;

/// Options controlling frame animation.
#[derive(Debug, Clone)]
pub struct AnimateOptions {
    /// Delay between frames in milliseconds
    pub interval_ms: u64,
    /// Cell-text colors used below and above the background threshold
    pub text_colors: (String, String),
    /// Frame-label location in cell coordinates (x, y)
    pub text_loc: (f64, f64),
}

impl Default for AnimateOptions {
    fn default() -> Self {
        AnimateOptions {
            interval_ms: 200,
            text_colors: ("white".to_string(), "black".to_string()),
            text_loc: (0.1, 0.2),
        }
    }
}

#[derive(Debug)]
enum GlyphData {
    /// A single 2D field
    Single(Array2<f64>),
    /// A stack of 2D frames along axis 0
    Stack(Array3<f64>),
    /// A prepared (height, width, 3) RGB composite in [0, 1]
    Rgb(Array3<f64>),
}

/// A 2D or 3D array wrapped for raster display.
#[derive(Debug)]
pub struct ArrayGlyph {
    data: GlyphData,
    exclude_value: Vec<f64>,
    /// Stored as [xmin, xmax, ymin, ymax]
    extent: Option<[f64; 4]>,
    data_vmin: f64,
    data_vmax: f64,
    derived_ticks_spacing: f64,
    element_count: usize,
    options: PlotOptions,
}

impl ArrayGlyph {
    /// Wrap a 2D array with default options.
    pub fn new(array: Array2<f64>) -> Result<Self> {
        Self::with_options(array, PlotOptions::default())
    }

    /// Wrap a 2D array with explicit options.
    pub fn with_options(array: Array2<f64>, options: PlotOptions) -> Result<Self> {
        Self::masked(array, &[], options)
    }

    /// Wrap a 2D array, masking cells that match any of the exclude values.
    pub fn masked(
        mut array: Array2<f64>,
        exclude_value: &[f64],
        options: PlotOptions,
    ) -> Result<Self> {
        mask_excluded(array.iter_mut(), exclude_value);
        Self::finish(GlyphData::Single(array), exclude_value, options)
    }

    /// Wrap a 3D frame stack (frame, row, col) for animation.
    pub fn stacked(
        mut array: Array3<f64>,
        exclude_value: &[f64],
        options: PlotOptions,
    ) -> Result<Self> {
        mask_excluded(array.iter_mut(), exclude_value);
        Self::finish(GlyphData::Stack(array), exclude_value, options)
    }

    /// Compose three bands of a band-first 3D array into an RGB image.
    pub fn rgb_composite(
        array: Array3<f64>,
        params: &RgbParams,
        options: PlotOptions,
    ) -> Result<Self> {
        let composite = prepare_rgb_array(array.view(), params)?;
        let element_count = composite.shape()[0] * composite.shape()[1];
        Ok(ArrayGlyph {
            data: GlyphData::Rgb(composite),
            exclude_value: Vec::new(),
            extent: None,
            data_vmin: 0.0,
            data_vmax: 1.0,
            derived_ticks_spacing: 0.1,
            element_count,
            options,
        })
    }

    fn finish(data: GlyphData, exclude_value: &[f64], options: PlotOptions) -> Result<Self> {
        let (data_vmin, data_vmax, element_count) = match &data {
            GlyphData::Single(array) => scan_finite(array.iter()),
            GlyphData::Stack(array) => {
                let (vmin, vmax, _) = scan_finite(array.iter());
                let (_, _, count) = scan_finite(array.index_axis(Axis(0), 0).iter());
                (vmin, vmax, count)
            }
            GlyphData::Rgb(_) => (0.0, 1.0, 0),
        };
        if !data_vmin.is_finite() || !data_vmax.is_finite() {
            return Err(OchreError::InvalidParameter {
                param: "array".to_string(),
                message: "the array contains no finite values after masking".to_string(),
            });
        }

        let vmin = options.vmin.unwrap_or(data_vmin);
        let vmax = options.vmax.unwrap_or(data_vmax);
        // Aim for roughly ten colorbar ticks.
        let derived_ticks_spacing = (vmax - vmin) / 10.0;

        debug!(
            vmin = vmin,
            vmax = vmax,
            elements = element_count,
            "Array glyph created"
        );

        Ok(ArrayGlyph {
            data,
            exclude_value: exclude_value.to_vec(),
            extent: None,
            data_vmin,
            data_vmax,
            derived_ticks_spacing,
            element_count,
            options,
        })
    }

    /// Attach a spatial extent given as [xmin, ymin, xmax, ymax].
    ///
    /// Axis tick labels are drawn only when an extent is present.
    pub fn with_extent(mut self, extent: [f64; 4]) -> Self {
        self.extent = Some([extent[0], extent[2], extent[1], extent[3]]);
        self
    }

    /// Minimum finite value of the wrapped data.
    pub fn vmin(&self) -> f64 {
        self.options.vmin.unwrap_or(self.data_vmin)
    }

    /// Maximum finite value of the wrapped data.
    pub fn vmax(&self) -> f64 {
        self.options.vmax.unwrap_or(self.data_vmax)
    }

    /// Number of unmasked cells (first frame for a stack).
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// The exclude sentinels this glyph was constructed with.
    pub fn exclude_value(&self) -> &[f64] {
        &self.exclude_value
    }

    /// Whether this glyph renders an RGB composite.
    pub fn is_rgb(&self) -> bool {
        matches!(self.data, GlyphData::Rgb(_))
    }

    /// The wrapped 2D data, if this is a single-field glyph.
    pub fn array(&self) -> Option<&Array2<f64>> {
        match &self.data {
            GlyphData::Single(array) => Some(array),
            _ => None,
        }
    }

    /// The current plot options.
    pub fn options(&self) -> &PlotOptions {
        &self.options
    }

    /// Override a single option by key; unknown keys are rejected.
    pub fn set_option(&mut self, key: &str, value: &Value) -> Result<()> {
        self.options.set(key, value)
    }

    /// Colorbar tick positions for the current options.
    pub fn ticks(&self) -> Result<Vec<f64>> {
        let spacing = self
            .options
            .ticks_spacing
            .unwrap_or(self.derived_ticks_spacing);
        generate_ticks(self.vmin(), self.vmax(), spacing)
    }

    /// Render the array as a figure.
    ///
    /// A frame stack renders its first slice; RGB composites skip the
    /// colorbar.
    pub fn plot(&self) -> Result<Figure> {
        self.plot_frame(None, &PointStyle::default())
    }

    /// Render the array with a point overlay.
    ///
    /// `points` has one row per point with columns (value, row, col).
    pub fn plot_with_points(&self, points: &Array2<f64>, style: &PointStyle) -> Result<Figure> {
        validate_points(points)?;
        self.plot_frame(Some(points), style)
    }

    fn plot_frame(&self, points: Option<&Array2<f64>>, style: &PointStyle) -> Result<Figure> {
        match &self.data {
            GlyphData::Rgb(composite) => render(&RenderSpec {
                data: RasterData::Rgb(composite),
                options: &self.options,
                scale: &ColorScale::Linear,
                cmap: get_colormap("grays")?.as_ref(),
                vmin: 0.0,
                vmax: 1.0,
                ticks: Vec::new(),
                extent: self.extent,
                points,
                point_style: style,
                frame_label: None,
                cell_text_colors: ((255, 255, 255), (255, 255, 255)),
                background_threshold: 0.5,
            }),
            GlyphData::Single(array) => self.render_scalar(array.view(), points, style, None),
            GlyphData::Stack(array) => {
                self.render_scalar(array.index_axis(Axis(0), 0), points, style, None)
            }
        }
    }

    fn render_scalar(
        &self,
        view: ndarray::ArrayView2<'_, f64>,
        points: Option<&Array2<f64>>,
        style: &PointStyle,
        frame_label: Option<(String, (f64, f64))>,
    ) -> Result<Figure> {
        let ticks = self.ticks()?;
        // The color range follows the tick endpoints, not the raw data range.
        let vmin = ticks[0];
        let vmax = *ticks.last().unwrap_or(&vmin);
        let scale = ColorScale::from_options(&self.options, &ticks)?;
        let cmap = get_colormap(&self.options.cmap)?;

        render(&RenderSpec {
            data: RasterData::Scalar(view.view()),
            options: &self.options,
            scale: &scale,
            cmap: cmap.as_ref(),
            vmin,
            vmax,
            ticks,
            extent: self.extent,
            points,
            point_style: style,
            frame_label,
            cell_text_colors: ((255, 255, 255), (255, 255, 255)),
            background_threshold: 0.5,
        })
    }

    /// Animate a frame stack, one frame per slice along axis 0.
    ///
    /// `time` supplies one label per frame, drawn on each frame at the
    /// configured text location.
    pub fn animate<S: AsRef<str>>(&self, time: &[S]) -> Result<Animation> {
        self.animate_with(time, None, &PointStyle::default(), &AnimateOptions::default())
    }

    /// Animate with point overlays and explicit animation options.
    pub fn animate_with<S: AsRef<str>>(
        &self,
        time: &[S],
        points: Option<&Array2<f64>>,
        style: &PointStyle,
        animate_options: &AnimateOptions,
    ) -> Result<Animation> {
        let stack = match &self.data {
            GlyphData::Stack(array) => array,
            _ => {
                return Err(OchreError::InvalidParameter {
                    param: "array".to_string(),
                    message: "animation needs a 3D frame stack".to_string(),
                })
            }
        };
        let n_frames = stack.shape()[0];
        if time.len() != n_frames {
            return Err(OchreError::InvalidParameter {
                param: "time".to_string(),
                message: format!(
                    "got {} labels for {} frames",
                    time.len(),
                    n_frames
                ),
            });
        }
        if let Some(points) = points {
            validate_points(points)?;
        }

        let ticks = self.ticks()?;
        let vmin = ticks[0];
        let vmax = *ticks.last().unwrap_or(&vmin);
        let scale = ColorScale::from_options(&self.options, &ticks)?;
        let cmap = get_colormap(&self.options.cmap)?;

        // Normalize the threshold to the color range.
        let background_threshold = match self.options.background_color_threshold {
            Some(threshold) => scale.normalize(threshold, vmin, vmax),
            None => scale.normalize(self.data_vmax, vmin, vmax) / 2.0,
        };
        let below = parse_color(&animate_options.text_colors.0)?;
        let above = parse_color(&animate_options.text_colors.1)?;

        let mut frames = Vec::with_capacity(n_frames);
        for (index, label) in time.iter().enumerate() {
            let label: String = label.as_ref().chars().take(10).collect();
            let figure = render(&RenderSpec {
                data: RasterData::Scalar(stack.index_axis(Axis(0), index)),
                options: &self.options,
                scale: &scale,
                cmap: cmap.as_ref(),
                vmin,
                vmax,
                ticks: ticks.clone(),
                extent: self.extent,
                points,
                point_style: style,
                frame_label: Some((
                    format!("Date = {}", label),
                    animate_options.text_loc,
                )),
                cell_text_colors: (below, above),
                background_threshold,
            })?;
            frames.push(figure.to_image()?);
        }

        debug!(frames = frames.len(), "Animation rendered");
        Ok(Animation::new(frames, animate_options.interval_ms))
    }
}

fn validate_points(points: &Array2<f64>) -> Result<()> {
    if points.shape()[1] < 3 {
        return Err(OchreError::InvalidParameter {
            param: "points".to_string(),
            message: format!(
                "expected 3 columns (value, row, col), got {}",
                points.shape()[1]
            ),
        });
    }
    Ok(())
}

fn mask_excluded<'a>(values: impl Iterator<Item = &'a mut f64>, exclude: &[f64]) {
    if exclude.is_empty() {
        return;
    }
    for value in values {
        if exclude.iter().any(|e| is_close(*value, *e)) {
            *value = f64::NAN;
        }
    }
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= MASK_RTOL * b.abs() + f64::EPSILON
}

/// Scan for the finite minimum, maximum and count in one pass.
fn scan_finite<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64, usize) {
    let mut vmin = f64::INFINITY;
    let mut vmax = f64::NEG_INFINITY;
    let mut count = 0usize;
    for &value in values {
        if value.is_finite() {
            vmin = vmin.min(value);
            vmax = vmax.max(value);
            count += 1;
        }
    }
    (vmin, vmax, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_exclude_value_masks_cells() {
        let arr = array![[9999.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let glyph = ArrayGlyph::masked(arr, &[9999.0], PlotOptions::default()).unwrap();
        let masked = glyph.array().unwrap();
        assert!(masked[[0, 0]].is_nan());
        assert_eq!(glyph.element_count(), 8);
        assert_eq!(glyph.vmin(), 2.0);
        assert_eq!(glyph.vmax(), 9.0);
    }

    #[test]
    fn test_all_masked_is_an_error() {
        let arr = array![[1.0, 1.0], [1.0, 1.0]];
        assert!(ArrayGlyph::masked(arr, &[1.0], PlotOptions::default()).is_err());
    }

    #[test]
    fn test_vmin_vmax_options_win() {
        let arr = array![[0.0, 10.0]];
        let mut options = PlotOptions::default();
        options.vmin = Some(2.0);
        options.vmax = Some(8.0);
        let glyph = ArrayGlyph::with_options(arr, options).unwrap();
        assert_eq!(glyph.vmin(), 2.0);
        assert_eq!(glyph.vmax(), 8.0);
    }

    #[test]
    fn test_derived_ticks_cover_range() {
        let arr = array![[0.0, 88.0]];
        let glyph = ArrayGlyph::new(arr).unwrap();
        let ticks = glyph.ticks().unwrap();
        assert_eq!(ticks[0], 0.0);
        assert!(*ticks.last().unwrap() >= 88.0);
    }

    #[test]
    fn test_extent_is_reordered() {
        let arr = array![[1.0, 2.0], [3.0, 4.0]];
        let glyph = ArrayGlyph::new(arr)
            .unwrap()
            .with_extent([-75.6, 4.2, -75.1, 4.7]);
        assert_eq!(glyph.extent, Some([-75.6, -75.1, 4.2, 4.7]));
    }

    #[test]
    fn test_animate_rejects_2d() {
        let arr = array![[1.0, 2.0], [3.0, 4.0]];
        let glyph = ArrayGlyph::new(arr).unwrap();
        assert!(glyph.animate(&["a"]).is_err());
    }

    #[test]
    fn test_animate_label_count_mismatch() {
        let stack = ndarray::Array3::from_shape_fn((3, 4, 4), |(f, r, c)| (f + r + c) as f64);
        let glyph = ArrayGlyph::stacked(stack, &[], PlotOptions::default()).unwrap();
        assert!(glyph.animate(&["one", "two"]).is_err());
    }

    #[test]
    fn test_is_close_relative() {
        assert!(is_close(1e6 + 0.05, 1e6));
        assert!(!is_close(1.5, 1.0));
        assert!(is_close(0.0, 0.0));
    }
}
