//! Error types for the ochre library.
//!
//! This module defines a comprehensive error enum that covers all possible
//! error conditions raised by the visualization layer.

use thiserror::Error;

/// The main error type for ochre operations.
#[derive(Error, Debug)]
pub enum OchreError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding/encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown option key passed as an override
    #[error("The given option `{key}` is not correct, possible parameters are: {available}")]
    UnknownOption { key: String, available: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Invalid color-scale name
    #[error(
        "Invalid color scale option: {name}. Use 'linear', 'power', 'sym-lognorm', \
         'boundary-norm' or 'midpoint'"
    )]
    InvalidColorScale { name: String },

    /// Unknown colormap name
    #[error("Unknown colormap: {name}")]
    UnknownColormap { name: String },

    /// Malformed color value
    #[error("Invalid color: {message}")]
    InvalidColor { message: String },

    /// Number of colors does not match the number of data series
    #[error("The number of colors: {colors} should be equal to the number of samples: {series}")]
    ColorCountMismatch { colors: usize, series: usize },

    /// Input file not found
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// Unsupported animation container format
    #[error(
        "The given extension {format} implies a format that is not supported, \
         only [\"gif\", \"mov\", \"avi\", \"mp4\"] are supported"
    )]
    UnsupportedVideoFormat { format: String },

    /// Drawing backend errors
    #[error("Render error: {message}")]
    Render { message: String },
}

/// Convenience type alias for Results with OchreError
pub type Result<T> = std::result::Result<T, OchreError>;

impl OchreError {
    /// Wrap a drawing-backend failure into a `Render` error.
    pub fn render<E: std::fmt::Display>(err: E) -> Self {
        OchreError::Render {
            message: err.to_string(),
        }
    }
}
