//! # ochre
//!
//! An array and color visualization toolkit.
//!
//! This library wraps numeric arrays for raster display and takes care of
//! the color plumbing around it: color-value normalization, colormap and
//! color-scale dispatch, colorbars, RGB composites, overlaid histograms and
//! frame animation with GIF/ffmpeg export.
//!
//! ## Key Features
//!
//! - **Color normalization**: hex / 0-255 RGB / 0-1 RGB values classified,
//!   validated and converted, with color ramps extracted from images
//! - **Raster display**: 2D arrays rendered through named colormaps with
//!   five color-scale strategies and configurable colorbars
//! - **RGB composites**: three-band composition with percentile or
//!   reflectance scaling
//! - **Histograms**: overlaid per-column histograms with shared styling
//! - **Animation**: per-frame rendering of 3D stacks, exported as GIF
//!   in-process or piped to the system ffmpeg for video containers
//!
//! ## Architecture
//!
//! - **Styles**: default-option tables merged with key-validated overrides
//! - **Scales/Colormaps**: value normalization and color lookup
//! - **Glyph/Statistic**: array wrappers that delegate drawing to the
//!   plotters backend and hand back in-memory figures

pub mod colormaps;
pub mod colors;
pub mod error;
pub mod glyph;
pub mod logging;
pub mod scales;
pub mod statistics;
pub mod styles;

pub use colormaps::{get_colormap, ColorRamp, Colormap};
pub use colors::{ColorKind, ColorValue, Colors};
pub use error::{OchreError, Result};
pub use glyph::{
    AnimateOptions, Animation, ArrayGlyph, Figure, PointStyle, RgbParams,
    SUPPORTED_VIDEO_FORMATS,
};
pub use logging::{init_tracing, log_operation_end, log_timed_operation};
pub use scales::{generate_ticks, rescale, ColorScale};
pub use statistics::{HistogramData, Statistic};
pub use styles::{HistogramOptions, PlotOptions};
