//! Figure rendering for array glyphs.
//!
//! Draws the raster cells, colorbar, title and overlays into an in-memory
//! RGB buffer through the plotters bitmap backend. The same routine renders
//! standalone plots and animation frames.

use std::path::Path;

use image::RgbImage;
use ndarray::{Array2, Array3, ArrayView2};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::colormaps::Colormap;
use crate::colors::parse_color;
use crate::error::{OchreError, Result};
use crate::scales::ColorScale;
use crate::styles::PlotOptions;

/// Pixel band reserved for the colorbar and its labels.
const CBAR_BAND: u32 = 110;

/// Resolution of the colorbar gradient strip.
const CBAR_STEPS: usize = 256;

/// A rendered figure: an RGB pixel buffer plus its dimensions.
#[derive(Debug)]
pub struct Figure {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Figure {
    /// Figure width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Figure height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGB pixel buffer, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The RGB value at a pixel position.
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let idx = ((y * self.width + x) * 3) as usize;
        (self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2])
    }

    /// Copy the buffer into an `image` buffer.
    pub fn to_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(|| {
            OchreError::Render {
                message: "pixel buffer does not match figure dimensions".to_string(),
            }
        })
    }

    /// Save the figure to disk; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        image::save_buffer(
            path.as_ref(),
            &self.pixels,
            self.width,
            self.height,
            image::ColorType::Rgb8,
        )?;
        Ok(())
    }
}

/// Marker and annotation styling for point overlays.
#[derive(Debug, Clone)]
pub struct PointStyle {
    /// Marker color
    pub point_color: String,
    /// Marker area in square pixels
    pub point_size: f64,
    /// Annotation text color
    pub pid_color: String,
    /// Annotation font size in points
    pub pid_size: u32,
}

impl Default for PointStyle {
    fn default() -> Self {
        PointStyle {
            point_color: "red".to_string(),
            point_size: 100.0,
            pid_color: "blue".to_string(),
            pid_size: 10,
        }
    }
}

/// The raster payload of one rendered frame.
pub(crate) enum RasterData<'a> {
    /// Scalar field colored through a colormap
    Scalar(ArrayView2<'a, f64>),
    /// Prepared (height, width, 3) composite with values in [0, 1]
    Rgb(&'a Array3<f64>),
}

impl RasterData<'_> {
    fn dims(&self) -> (usize, usize) {
        match self {
            RasterData::Scalar(view) => view.dim(),
            RasterData::Rgb(arr) => (arr.shape()[0], arr.shape()[1]),
        }
    }
}

/// Everything one frame needs to render.
pub(crate) struct RenderSpec<'a> {
    pub data: RasterData<'a>,
    pub options: &'a PlotOptions,
    pub scale: &'a ColorScale,
    pub cmap: &'a dyn Colormap,
    /// Color-scaling range; taken from the tick endpoints for scalar data
    pub vmin: f64,
    pub vmax: f64,
    pub ticks: Vec<f64>,
    /// Axis extent [xmin, xmax, ymin, ymax]; tick labels appear only when set
    pub extent: Option<[f64; 4]>,
    /// Point table with columns (value, row, col)
    pub points: Option<&'a Array2<f64>>,
    pub point_style: &'a PointStyle,
    /// Frame label text and its (x, y) location in cell coordinates
    pub frame_label: Option<(String, (f64, f64))>,
    /// Cell text colors (below threshold, above threshold)
    pub cell_text_colors: ((u8, u8, u8), (u8, u8, u8)),
    /// Normalized threshold deciding the cell text color
    pub background_threshold: f64,
}

/// Run a drawing closure against a fresh white canvas and wrap the result.
pub(crate) fn with_canvas<F>(size: (u32, u32), draw: F) -> Result<Figure>
where
    F: for<'a, 'b> FnOnce(&'a DrawingArea<BitMapBackend<'b>, plotters::coord::Shift>) -> Result<()>,
{
    let (width, height) = size;
    let mut pixels = vec![255u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(OchreError::render)?;
        draw(&root)?;
        root.present().map_err(OchreError::render)?;
    }

    Ok(Figure {
        width,
        height,
        pixels,
    })
}

/// Render one figure from a frame spec.
pub(crate) fn render(spec: &RenderSpec<'_>) -> Result<Figure> {
    with_canvas(spec.options.figsize, |root| draw_figure(root, spec))
}


fn draw_figure(
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    spec: &RenderSpec<'_>,
) -> Result<()> {
    let options = spec.options;
    let (nrows, ncols) = spec.data.dims();
    let (width, height) = root.dim_in_pixel();

    let with_cbar = matches!(spec.data, RasterData::Scalar(_)) && !spec.ticks.is_empty();
    let horizontal = options.cbar_orientation.eq_ignore_ascii_case("horizontal");

    let (plot_area, cbar_area) = if with_cbar {
        if horizontal {
            let (top, bottom) = root.split_vertically(height.saturating_sub(CBAR_BAND) as i32);
            (top, Some(bottom))
        } else {
            let (left, right) = root.split_horizontally(width.saturating_sub(CBAR_BAND) as i32);
            (left, Some(right))
        }
    } else {
        (root.clone(), None)
    };

    // Chart coordinates: the extent when given, cell indices otherwise.
    let [x0, x1, y0, y1] = spec
        .extent
        .unwrap_or([0.0, ncols as f64, 0.0, nrows as f64]);
    let cell_w = (x1 - x0) / ncols as f64;
    let cell_h = (y1 - y0) / nrows as f64;
    // Row 0 renders at the top of the chart.
    let cx = move |col: f64| x0 + col * cell_w;
    let cy = move |row: f64| y1 - row * cell_h;

    let mut builder = ChartBuilder::on(&plot_area);
    builder
        .caption(
            &options.title,
            ("sans-serif", options.title_size as i32).into_font(),
        )
        .margin(10);
    if spec.extent.is_some() {
        builder.x_label_area_size(40).y_label_area_size(55);
    }
    let mut chart = builder
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(OchreError::render)?;

    if spec.extent.is_some() {
        chart
            .configure_mesh()
            .disable_mesh()
            .label_style(("sans-serif", 12))
            .draw()
            .map_err(OchreError::render)?;
    }

    // Raster cells
    let mut cells = Vec::with_capacity(nrows * ncols);
    match &spec.data {
        RasterData::Scalar(view) => {
            for row in 0..nrows {
                for col in 0..ncols {
                    let value = view[[row, col]];
                    if !value.is_finite() {
                        continue;
                    }
                    let t = spec.scale.normalize(value, spec.vmin, spec.vmax);
                    let [r, g, b] = spec.cmap.map_normalized(t);
                    cells.push(Rectangle::new(
                        [
                            (cx(col as f64), cy(row as f64)),
                            (cx(col as f64 + 1.0), cy(row as f64 + 1.0)),
                        ],
                        RGBColor(r, g, b).filled(),
                    ));
                }
            }
        }
        RasterData::Rgb(composite) => {
            for row in 0..nrows {
                for col in 0..ncols {
                    let channel = |slot: usize| {
                        (composite[[row, col, slot]].clamp(0.0, 1.0) * 255.0) as u8
                    };
                    cells.push(Rectangle::new(
                        [
                            (cx(col as f64), cy(row as f64)),
                            (cx(col as f64 + 1.0), cy(row as f64 + 1.0)),
                        ],
                        RGBColor(channel(0), channel(1), channel(2)).filled(),
                    ));
                }
            }
        }
    }
    chart
        .draw_series(cells)
        .map(|_| ())
        .map_err(OchreError::render)?;

    // Cell-value text
    if options.display_cell_value {
        if let RasterData::Scalar(view) = &spec.data {
            let mut texts = Vec::new();
            for row in 0..nrows {
                for col in 0..ncols {
                    let value = view[[row, col]];
                    if !value.is_finite() {
                        continue;
                    }
                    let t = spec.scale.normalize(value, spec.vmin, spec.vmax);
                    let (r, g, b) = if t > spec.background_threshold {
                        spec.cell_text_colors.1
                    } else {
                        spec.cell_text_colors.0
                    };
                    let style = ("sans-serif", options.num_size as i32)
                        .into_font()
                        .color(&RGBColor(r, g, b))
                        .pos(Pos::new(HPos::Center, VPos::Center));
                    texts.push(Text::new(
                        format!("{:.*}", options.precision, value),
                        (cx(col as f64 + 0.5), cy(row as f64 + 0.5)),
                        style,
                    ));
                }
            }
            chart
                .draw_series(texts)
                .map(|_| ())
                .map_err(OchreError::render)?;
        }
    }

    // Point overlay: markers then id annotations
    if let Some(points) = spec.points {
        let (pr, pg, pb) = parse_color(&spec.point_style.point_color)?;
        let marker_color = RGBColor(pr, pg, pb);
        let radius = spec.point_style.point_size.sqrt().round().max(1.0) as i32;
        let markers = points.rows().into_iter().map(|p| {
            Circle::new(
                (cx(p[2] + 0.5), cy(p[1] + 0.5)),
                radius,
                marker_color.filled(),
            )
        });
        chart
            .draw_series(markers)
            .map(|_| ())
            .map_err(OchreError::render)?;

        let (ir, ig, ib) = parse_color(&spec.point_style.pid_color)?;
        let id_style = ("sans-serif", spec.point_style.pid_size as i32)
            .into_font()
            .color(&RGBColor(ir, ig, ib))
            .pos(Pos::new(HPos::Center, VPos::Center));
        let labels = points.rows().into_iter().map(|p| {
            Text::new(
                format!("{}", p[0]),
                (cx(p[2] + 0.5), cy(p[1] + 0.5)),
                id_style.clone(),
            )
        });
        chart
            .draw_series(labels)
            .map(|_| ())
            .map_err(OchreError::render)?;
    }

    // Frame label for animations
    if let Some((label, (lx, ly))) = &spec.frame_label {
        let style = ("sans-serif", options.cbar_label_size as i32)
            .into_font()
            .color(&BLACK);
        chart
            .draw_series(std::iter::once(Text::new(
                label.clone(),
                (cx(*lx + 0.5), cy(*ly + 0.5)),
                style,
            )))
            .map(|_| ())
            .map_err(OchreError::render)?;
    }

    if let Some(area) = cbar_area {
        draw_colorbar(&area, spec, horizontal)?;
    }

    Ok(())
}

/// Draw the colorbar gradient strip and its labels.
fn draw_colorbar(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    spec: &RenderSpec<'_>,
    horizontal: bool,
) -> Result<()> {
    let options = spec.options;
    let (area_w, area_h) = area.dim_in_pixel();
    let tick_min = spec.ticks[0];
    let tick_max = *spec.ticks.last().unwrap_or(&tick_min);
    let span = tick_max - tick_min;
    if span <= 0.0 {
        return Ok(());
    }

    // cbar_length shrinks the bar symmetrically along its long edge.
    let pad = |edge: u32| (f64::from(edge) * (1.0 - options.cbar_length) / 2.0) as u32;

    let label_font = ("sans-serif", options.cbar_label_size as i32).into_font();
    let step = span / CBAR_STEPS as f64;
    let color_at = |value: f64| {
        let t = spec.scale.normalize(value, spec.vmin, spec.vmax);
        let [r, g, b] = spec.cmap.map_normalized(t);
        RGBColor(r, g, b)
    };

    if horizontal {
        let area = area.margin(5, 35, pad(area_w), pad(area_w));
        let mut cb_chart = ChartBuilder::on(&area)
            .x_label_area_size(30)
            .build_cartesian_2d(tick_min..tick_max, 0.0..1.0)
            .map_err(OchreError::render)?;
        cb_chart
            .configure_mesh()
            .disable_y_axis()
            .disable_mesh()
            .x_labels(spec.ticks.len().min(10))
            .x_desc(options.cbar_label.as_str())
            .axis_desc_style(label_font)
            .label_style(("sans-serif", 10))
            .draw()
            .map_err(OchreError::render)?;
        let strip = (0..CBAR_STEPS).map(|i| {
            let v0 = tick_min + step * i as f64;
            Rectangle::new(
                [(v0, 0.0), (v0 + step, 1.0)],
                color_at(v0 + step / 2.0).filled(),
            )
        });
        cb_chart
            .draw_series(strip)
            .map(|_| ())
            .map_err(OchreError::render)?;
    } else {
        let area = area.margin(pad(area_h), pad(area_h), 5, 10);
        let mut cb_chart = ChartBuilder::on(&area)
            .y_label_area_size(55)
            .build_cartesian_2d(0.0..1.0, tick_min..tick_max)
            .map_err(OchreError::render)?;
        cb_chart
            .configure_mesh()
            .disable_x_axis()
            .disable_mesh()
            .y_labels(spec.ticks.len().min(10))
            .y_desc(options.cbar_label.as_str())
            .axis_desc_style(label_font)
            .label_style(("sans-serif", 10))
            .draw()
            .map_err(OchreError::render)?;
        let strip = (0..CBAR_STEPS).map(|i| {
            let v0 = tick_min + step * i as f64;
            Rectangle::new(
                [(0.0, v0), (1.0, v0 + step)],
                color_at(v0 + step / 2.0).filled(),
            )
        });
        cb_chart
            .draw_series(strip)
            .map(|_| ())
            .map_err(OchreError::render)?;
    }

    Ok(())
}
