//! Color-scale strategies for mapping data values into [0, 1].
//!
//! A color scale decides how a data value is normalized before it is looked
//! up in a colormap. Five strategies are supported, selected by name through
//! the `color_scale` option: `linear`, `power`, `sym-lognorm`,
//! `boundary-norm` and `midpoint`. The dispatch is a direct mapping with no
//! fallback; an unknown name is an error.

use crate::error::{OchreError, Result};
use crate::styles::PlotOptions;

/// Maximum number of colorbar ticks before tick generation is rejected.
///
/// A runaway count here almost always means the exclude value leaked into
/// the data range.
const MAX_TICKS: usize = 10_000;

/// A value-normalization strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScale {
    /// Affine map of [vmin, vmax] onto [0, 1]
    Linear,
    /// Power-law normalization with exponent `gamma`
    Power { gamma: f64 },
    /// Symmetric log normalization (natural-log base)
    SymLog { line_threshold: f64, line_scale: f64 },
    /// Discrete intervals between consecutive boundaries
    Boundary { bounds: Vec<f64> },
    /// Piecewise-linear scale split at `midpoint`
    Midpoint { midpoint: f64 },
}

impl ColorScale {
    /// Resolve the scale named in the options.
    ///
    /// `ticks` supplies the default boundaries for `boundary-norm` when the
    /// `bounds` option is not set.
    pub fn from_options(options: &PlotOptions, ticks: &[f64]) -> Result<Self> {
        match options.color_scale.to_lowercase().as_str() {
            "linear" => Ok(ColorScale::Linear),
            "power" => Ok(ColorScale::Power {
                gamma: options.gamma,
            }),
            "sym-lognorm" => Ok(ColorScale::SymLog {
                line_threshold: options.line_threshold,
                line_scale: options.line_scale,
            }),
            "boundary-norm" => {
                let bounds = match &options.bounds {
                    Some(bounds) if !bounds.is_empty() => bounds.clone(),
                    _ => ticks.to_vec(),
                };
                Ok(ColorScale::Boundary { bounds })
            }
            "midpoint" => Ok(ColorScale::Midpoint {
                midpoint: options.midpoint,
            }),
            _ => Err(OchreError::InvalidColorScale {
                name: options.color_scale.clone(),
            }),
        }
    }

    /// The boundaries the colorbar should tick at, if this scale is discrete.
    pub fn boundaries(&self) -> Option<&[f64]> {
        match self {
            ColorScale::Boundary { bounds } => Some(bounds),
            _ => None,
        }
    }

    /// Normalize a value into [0, 1] given the data range.
    pub fn normalize(&self, value: f64, vmin: f64, vmax: f64) -> f64 {
        if vmax <= vmin {
            return 0.5;
        }
        match self {
            ColorScale::Linear => ((value - vmin) / (vmax - vmin)).clamp(0.0, 1.0),
            ColorScale::Power { gamma } => {
                let t = (value - vmin) / (vmax - vmin);
                t.clamp(0.0, 1.0).powf(*gamma)
            }
            ColorScale::SymLog {
                line_threshold,
                line_scale,
            } => {
                let t = symlog_transform(value, *line_threshold, *line_scale);
                let t0 = symlog_transform(vmin, *line_threshold, *line_scale);
                let t1 = symlog_transform(vmax, *line_threshold, *line_scale);
                if t1 <= t0 {
                    0.5
                } else {
                    ((t - t0) / (t1 - t0)).clamp(0.0, 1.0)
                }
            }
            ColorScale::Boundary { bounds } => boundary_normalize(value, bounds),
            ColorScale::Midpoint { midpoint } => {
                midpoint_normalize(value, vmin, *midpoint, vmax)
            }
        }
    }
}

/// Symmetric-log forward transform, natural-log base.
///
/// Values inside the linear threshold are scaled linearly; outside it the
/// magnitude grows logarithmically. `line_scale` sets how many decades the
/// linear region spans visually.
fn symlog_transform(value: f64, line_threshold: f64, line_scale: f64) -> f64 {
    let linscale_adj = line_scale / (1.0 - std::f64::consts::E.recip());
    let abs = value.abs();
    if abs <= line_threshold {
        value * linscale_adj
    } else {
        value.signum() * line_threshold * (linscale_adj + (abs / line_threshold).ln())
    }
}

/// Map a value onto the index of its enclosing interval, scaled to [0, 1].
fn boundary_normalize(value: f64, bounds: &[f64]) -> f64 {
    if bounds.len() < 2 {
        return 0.5;
    }
    let regions = bounds.len() - 1;
    let mut idx = 0usize;
    for (i, window) in bounds.windows(2).enumerate() {
        if value >= window[0] {
            idx = i;
        }
    }
    if regions == 1 {
        0.5
    } else {
        idx as f64 / (regions - 1) as f64
    }
}

/// Piecewise-linear normalization through [vmin, midpoint, vmax] -> [0, 0.5, 1].
pub fn midpoint_normalize(value: f64, vmin: f64, midpoint: f64, vmax: f64) -> f64 {
    if value <= vmin {
        0.0
    } else if value <= midpoint {
        if midpoint > vmin {
            0.5 * (value - vmin) / (midpoint - vmin)
        } else {
            0.5
        }
    } else if value < vmax {
        if vmax > midpoint {
            0.5 + 0.5 * (value - midpoint) / (vmax - midpoint)
        } else {
            0.5
        }
    } else {
        1.0
    }
}

/// Linearly rescale a value from one range to another.
pub fn rescale(value: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> f64 {
    let old_range = old_max - old_min;
    let new_range = new_max - new_min;
    ((value - old_min) * new_range) / old_range + new_min
}

/// Generate colorbar tick positions.
///
/// Ticks step from `vmin` to `vmax` by `spacing`. When `vmax` does not land
/// on a tick (IEEE remainder, rounded to 3 decimals), one extra tick is
/// appended past the last multiple so the maximum is covered.
pub fn generate_ticks(vmin: f64, vmax: f64, spacing: f64) -> Result<Vec<f64>> {
    if !(spacing > 0.0) || !spacing.is_finite() {
        return Err(OchreError::InvalidParameter {
            param: "ticks_spacing".to_string(),
            message: format!("spacing must be a positive number, got {}", spacing),
        });
    }
    let span = vmax - vmin;
    if !span.is_finite() || span < 0.0 || span / spacing > MAX_TICKS as f64 {
        return Err(OchreError::InvalidParameter {
            param: "ticks_spacing".to_string(),
            message: format!(
                "the number of ticks exceeded the max allowed size ({}); \
                 check the exclude value and the data range [{}, {}]",
                MAX_TICKS, vmin, vmax
            ),
        });
    }

    let mut ticks = Vec::new();
    let mut k = 0u32;
    loop {
        let t = vmin + f64::from(k) * spacing;
        if t >= vmax + spacing {
            break;
        }
        ticks.push(t);
        k += 1;
    }

    let remainder = vmax - (vmax / spacing).round() * spacing;
    let rounded = (remainder * 1000.0).round() / 1000.0;
    if rounded != 0.0 {
        ticks.push((vmax / spacing).trunc() * spacing + spacing);
    }
    Ok(ticks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_with_scale(name: &str) -> PlotOptions {
        let mut options = PlotOptions::default();
        options.color_scale = name.to_string();
        options
    }

    #[test]
    fn test_scale_dispatch() {
        let ticks = [0.0, 1.0, 2.0];
        assert_eq!(
            ColorScale::from_options(&options_with_scale("linear"), &ticks).unwrap(),
            ColorScale::Linear
        );
        assert!(matches!(
            ColorScale::from_options(&options_with_scale("Power"), &ticks).unwrap(),
            ColorScale::Power { .. }
        ));
        assert!(matches!(
            ColorScale::from_options(&options_with_scale("sym-lognorm"), &ticks).unwrap(),
            ColorScale::SymLog { .. }
        ));
        assert!(matches!(
            ColorScale::from_options(&options_with_scale("midpoint"), &ticks).unwrap(),
            ColorScale::Midpoint { .. }
        ));
    }

    #[test]
    fn test_unknown_scale_name() {
        let err =
            ColorScale::from_options(&options_with_scale("log"), &[]).unwrap_err();
        assert!(err.to_string().contains("Invalid color scale"));
    }

    #[test]
    fn test_boundary_defaults_to_ticks() {
        let ticks = [0.0, 5.0, 10.0];
        let scale =
            ColorScale::from_options(&options_with_scale("boundary-norm"), &ticks).unwrap();
        assert_eq!(scale.boundaries().unwrap(), &ticks);
    }

    #[test]
    fn test_linear_normalize() {
        let scale = ColorScale::Linear;
        assert_eq!(scale.normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(scale.normalize(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(scale.normalize(11.0, 0.0, 10.0), 1.0);
    }

    #[test]
    fn test_power_normalize_emphasizes_low_values() {
        let scale = ColorScale::Power { gamma: 0.5 };
        let t = scale.normalize(1.0, 0.0, 4.0);
        assert!((t - 0.5).abs() < 1e-12); // (0.25)^0.5
    }

    #[test]
    fn test_symlog_is_monotonic() {
        let scale = ColorScale::SymLog {
            line_threshold: 1e-4,
            line_scale: 0.001,
        };
        let mut last = -1.0;
        for v in [-10.0, -1.0, -1e-5, 0.0, 1e-5, 1.0, 10.0] {
            let t = scale.normalize(v, -10.0, 10.0);
            assert!(t >= last, "not monotonic at {v}");
            last = t;
        }
        assert_eq!(scale.normalize(-10.0, -10.0, 10.0), 0.0);
        assert_eq!(scale.normalize(10.0, -10.0, 10.0), 1.0);
    }

    #[test]
    fn test_boundary_normalize_is_discrete() {
        let bounds = vec![0.0, 5.0, 10.0];
        let scale = ColorScale::Boundary { bounds };
        assert_eq!(scale.normalize(1.0, 0.0, 10.0), 0.0);
        assert_eq!(scale.normalize(4.9, 0.0, 10.0), 0.0);
        assert_eq!(scale.normalize(5.1, 0.0, 10.0), 1.0);
    }

    #[test]
    fn test_midpoint_normalize() {
        assert_eq!(midpoint_normalize(2.0, 0.0, 2.0, 10.0), 0.5);
        assert_eq!(midpoint_normalize(0.0, 0.0, 2.0, 10.0), 0.0);
        assert_eq!(midpoint_normalize(10.0, 0.0, 2.0, 10.0), 1.0);
        assert_eq!(midpoint_normalize(6.0, 0.0, 2.0, 10.0), 0.75);
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
        assert_eq!(rescale(0.0, -1.0, 1.0, 0.0, 1.0), 0.5);
    }

    #[test]
    fn test_ticks_exact_multiple() {
        let ticks = generate_ticks(0.0, 10.0, 2.0).unwrap();
        assert_eq!(ticks, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_ticks_with_remainder_cover_vmax() {
        let ticks = generate_ticks(0.0, 9.0, 2.0).unwrap();
        assert_eq!(ticks.last().copied().unwrap(), 10.0);
        assert!(ticks.last().copied().unwrap() >= 9.0);
    }

    #[test]
    fn test_ticks_runaway_spacing_rejected() {
        assert!(generate_ticks(0.0, 1e9, 0.001).is_err());
        assert!(generate_ticks(0.0, 1.0, 0.0).is_err());
        assert!(generate_ticks(0.0, 1.0, -2.0).is_err());
    }
}
