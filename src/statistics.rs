//! Statistical plots: overlaid histograms.
//!
//! A [`Statistic`] wraps a 1D array, or a 2D array with one data series per
//! column, and renders the series as overlaid histograms with per-series
//! colors and a shared transparency and bar width.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use plotters::prelude::*;
use tracing::debug;

use crate::colors::parse_color;
use crate::error::{OchreError, Result};
use crate::glyph::render::with_canvas;
use crate::glyph::Figure;
use crate::styles::HistogramOptions;

/// Computed histogram data, one entry per series.
#[derive(Debug, Clone)]
pub struct HistogramData {
    /// Bin counts per series
    pub counts: Vec<Vec<usize>>,
    /// Bin edges per series (`bins + 1` values each)
    pub bin_edges: Vec<Vec<f64>>,
}

enum Values {
    OneDim(Array1<f64>),
    TwoDim(Array2<f64>),
}

/// A 1D or 2D array wrapped for histogram plotting.
pub struct Statistic {
    values: Values,
    options: HistogramOptions,
}

impl Statistic {
    /// Wrap a 1D series with default options.
    pub fn new(values: Array1<f64>) -> Self {
        Self::with_options(values, HistogramOptions::default())
    }

    /// Wrap a 1D series with explicit options.
    pub fn with_options(values: Array1<f64>, options: HistogramOptions) -> Self {
        Statistic {
            values: Values::OneDim(values),
            options,
        }
    }

    /// Wrap a 2D array, one data series per column.
    pub fn new_2d(values: Array2<f64>, options: HistogramOptions) -> Self {
        Statistic {
            values: Values::TwoDim(values),
            options,
        }
    }

    /// The current histogram options.
    pub fn options(&self) -> &HistogramOptions {
        &self.options
    }

    /// Override a single option by key; unknown keys are rejected.
    pub fn set_option(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.options.set(key, value)
    }

    /// Render the histogram figure and return it with the computed data.
    ///
    /// For 2D input the configured color list must have exactly one color
    /// per column.
    pub fn histogram(&self) -> Result<(Figure, HistogramData)> {
        let series: Vec<ArrayView1<'_, f64>> = match &self.values {
            Values::OneDim(values) => vec![values.view()],
            Values::TwoDim(values) => {
                let num_samples = values.shape()[1];
                if self.options.color.len() != num_samples {
                    return Err(OchreError::ColorCountMismatch {
                        colors: self.options.color.len(),
                        series: num_samples,
                    });
                }
                values.axis_iter(Axis(1)).collect()
            }
        };
        if self.options.color.is_empty() {
            return Err(OchreError::InvalidParameter {
                param: "color".to_string(),
                message: "at least one color is required".to_string(),
            });
        }
        let bins = self.options.bins.max(1);

        let mut counts = Vec::with_capacity(series.len());
        let mut bin_edges = Vec::with_capacity(series.len());
        for view in &series {
            let (series_counts, series_edges) = bin_series(view, bins)?;
            counts.push(series_counts);
            bin_edges.push(series_edges);
        }

        let x_min = bin_edges
            .iter()
            .filter_map(|e| e.first())
            .fold(f64::INFINITY, |a, &b| a.min(b));
        let x_max = bin_edges
            .iter()
            .filter_map(|e| e.last())
            .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let y_max = counts
            .iter()
            .flat_map(|c| c.iter())
            .copied()
            .max()
            .unwrap_or(1) as f64;

        let options = &self.options;
        let figure = with_canvas(options.figsize, |root| {
            let mut chart = ChartBuilder::on(root)
                .margin(10)
                .x_label_area_size(45)
                .y_label_area_size(55)
                .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.05)
                .map_err(OchreError::render)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .bold_line_style(RGBColor(180, 180, 180).mix(options.grid_alpha))
                .x_desc(options.xlabel.as_str())
                .y_desc(options.ylabel.as_str())
                .axis_desc_style(("sans-serif", options.xlabel_font_size as i32))
                .label_style(("sans-serif", options.xtick_font_size as i32))
                .draw()
                .map_err(OchreError::render)?;

            for (index, (series_counts, series_edges)) in
                counts.iter().zip(&bin_edges).enumerate()
            {
                let (r, g, b) = parse_color(&options.color[index])?;
                let bar_color = RGBColor(r, g, b).mix(options.alpha);
                let bars = series_counts.iter().enumerate().filter_map(|(bin, &count)| {
                    if count == 0 {
                        return None;
                    }
                    let left = series_edges[bin];
                    let width = series_edges[bin + 1] - left;
                    let pad = width * (1.0 - options.rwidth) / 2.0;
                    Some(Rectangle::new(
                        [(left + pad, 0.0), (left + width - pad, count as f64)],
                        bar_color.filled(),
                    ))
                });
                chart
                    .draw_series(bars)
                    .map(|_| ())
                    .map_err(OchreError::render)?;
            }
            Ok(())
        })?;

        debug!(series = counts.len(), bins = bins, "Histogram rendered");
        Ok((figure, HistogramData { counts, bin_edges }))
    }
}

/// Equal-width binning over a series' own finite range.
///
/// The last bin is closed on both sides so the maximum lands in it; a
/// degenerate range widens by half a unit each way.
fn bin_series(view: &ArrayView1<'_, f64>, bins: usize) -> Result<(Vec<usize>, Vec<f64>)> {
    let finite: Vec<f64> = view.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(OchreError::InvalidParameter {
            param: "values".to_string(),
            message: "a histogram series has no finite values".to_string(),
        });
    }
    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for value in finite {
        let mut bin = ((value - lo) / width) as usize;
        if bin >= bins {
            bin = bins - 1;
        }
        counts[bin] += 1;
    }
    Ok((counts, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    fn series_1d() -> Array1<f64> {
        Array1::from_iter((0..200).map(|i| (i % 17) as f64 * 0.5))
    }

    #[test]
    fn test_histogram_1d_counts_and_edges() {
        let stat = Statistic::new(series_1d());
        let (figure, data) = stat.histogram().unwrap();
        assert_eq!(figure.width(), 500);
        assert_eq!(data.counts.len(), 1);
        assert_eq!(data.bin_edges[0].len(), 16);
        assert_eq!(data.counts[0].iter().sum::<usize>(), 200);
    }

    #[test]
    fn test_histogram_2d_color_count_mismatch() {
        let values = Array2::from_shape_fn((50, 3), |(r, c)| (r + c) as f64);
        let stat = Statistic::new_2d(values, HistogramOptions::default());
        let err = stat.histogram().unwrap_err();
        assert!(matches!(
            err,
            OchreError::ColorCountMismatch {
                colors: 1,
                series: 3
            }
        ));
    }

    #[test]
    fn test_histogram_2d_with_matching_colors() {
        let values = Array2::from_shape_fn((50, 3), |(r, c)| (r * (c + 1)) as f64);
        let mut options = HistogramOptions::default();
        options.color = vec![
            "red".to_string(),
            "green".to_string(),
            "blue".to_string(),
        ];
        options.alpha = 0.4;
        let stat = Statistic::new_2d(values, options);
        let (_, data) = stat.histogram().unwrap();
        assert_eq!(data.counts.len(), 3);
        for series_counts in &data.counts {
            assert_eq!(series_counts.iter().sum::<usize>(), 50);
        }
    }

    #[test]
    fn test_constant_series_widens_range() {
        let values = Array1::from_elem(10, 3.0);
        let (counts, edges) = bin_series(&values.view(), 5).unwrap();
        assert_eq!(edges.first().copied().unwrap(), 2.5);
        assert_eq!(edges.last().copied().unwrap(), 3.5);
        assert_eq!(counts.iter().sum::<usize>(), 10);
    }

    #[test]
    fn test_maximum_lands_in_last_bin() {
        let values = Array1::from_vec(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let (counts, _) = bin_series(&values.view(), 5).unwrap();
        assert_eq!(counts, vec![1, 1, 1, 1, 2]);
    }
}
