//! RGB composite preparation.
//!
//! Turns a band-first 3D array into an (height, width, 3) composite with
//! values in [0, 1], using either percentile-based contrast stretching or
//! reflectance scaling with an optional per-band cutoff.

use ndarray::{Array3, ArrayView3, Axis};

use crate::error::{OchreError, Result};

/// Parameters controlling RGB composite preparation.
#[derive(Debug, Clone, Default)]
pub struct RgbParams {
    /// Indices of the red, green and blue bands in the source array
    pub bands: [usize; 3],
    /// Scaling constant mapping raw digital values into 0-1 reflectance
    pub surface_reflectance: Option<f64>,
    /// Per-band upper clip value applied after reflectance scaling
    pub cutoff: Option<Vec<f64>>,
    /// Percentile for contrast stretching; takes precedence over reflectance
    pub percentile: Option<f64>,
}

/// Reorder the requested bands and scale the composite into [0, 1].
///
/// The source array is band-first (band, height, width). Percentile
/// stretching wins over reflectance scaling when both are set; with neither,
/// values pass through untouched and are clipped at render time.
pub fn prepare_rgb_array(array: ArrayView3<'_, f64>, params: &RgbParams) -> Result<Array3<f64>> {
    let n_bands = array.shape()[0];
    if n_bands < 3 {
        return Err(OchreError::InvalidParameter {
            param: "rgb".to_string(),
            message: format!(
                "an RGB composite needs 3 bands, the given array has {}",
                n_bands
            ),
        });
    }
    for &band in &params.bands {
        if band >= n_bands {
            return Err(OchreError::InvalidParameter {
                param: "rgb".to_string(),
                message: format!("band index {} out of range for {} bands", band, n_bands),
            });
        }
    }

    let (height, width) = (array.shape()[1], array.shape()[2]);
    let mut composite = Array3::<f64>::zeros((height, width, 3));
    for (slot, &band) in params.bands.iter().enumerate() {
        composite
            .index_axis_mut(Axis(2), slot)
            .assign(&array.index_axis(Axis(0), band));
    }

    if let Some(percentile) = params.percentile {
        scale_percentile(&mut composite, percentile);
    } else if let Some(reflectance) = params.surface_reflectance {
        scale_reflectance(&mut composite, reflectance, params.cutoff.as_deref())?;
    }

    Ok(composite)
}

/// Percentile-based contrast stretch, band by band.
///
/// For each band the lower bound is the p-th percentile and the upper bound
/// is the (100-p)-th percentile minus the lower; values are rescaled against
/// those bounds and clipped to [0, 1].
pub fn scale_percentile(composite: &mut Array3<f64>, percentile: f64) {
    for mut band in composite.axis_iter_mut(Axis(2)) {
        let mut sorted: Vec<f64> = band.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            continue;
        }
        sorted.sort_by(f64::total_cmp);

        let lower = percentile_of_sorted(&sorted, percentile);
        let upper = percentile_of_sorted(&sorted, 100.0 - percentile) - lower;
        if upper <= 0.0 {
            continue;
        }
        band.mapv_inplace(|v| ((v - lower) / upper).clamp(0.0, 1.0));
    }
}

fn scale_reflectance(
    composite: &mut Array3<f64>,
    reflectance: f64,
    cutoff: Option<&[f64]>,
) -> Result<()> {
    composite.mapv_inplace(|v| (v / reflectance).clamp(0.0, 1.0));

    if let Some(cutoff) = cutoff {
        if cutoff.len() < 3 {
            return Err(OchreError::InvalidParameter {
                param: "cutoff".to_string(),
                message: format!("expected one cutoff per band, got {}", cutoff.len()),
            });
        }
        for (slot, mut band) in composite.axis_iter_mut(Axis(2)).enumerate() {
            let cut = cutoff[slot];
            if cut > 0.0 {
                band.mapv_inplace(|v| v.clamp(0.0, cut) / cut);
            }
        }
    }
    Ok(())
}

/// Percentile over an ascending slice, linear interpolation between ranks.
fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    let weight = rank - low as f64;
    sorted[low] * (1.0 - weight) + sorted[high] * weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn band_first(values: impl Fn(usize, usize, usize) -> f64) -> Array3<f64> {
        Array3::from_shape_fn((3, 4, 5), |(b, r, c)| values(b, r, c))
    }

    #[test]
    fn test_band_reorder() {
        let arr = band_first(|b, _, _| b as f64);
        let params = RgbParams {
            bands: [2, 1, 0],
            ..Default::default()
        };
        let out = prepare_rgb_array(arr.view(), &params).unwrap();
        assert_eq!(out.shape(), &[4, 5, 3]);
        assert_eq!(out[[0, 0, 0]], 2.0);
        assert_eq!(out[[0, 0, 1]], 1.0);
        assert_eq!(out[[0, 0, 2]], 0.0);
    }

    #[test]
    fn test_too_few_bands() {
        let arr = Array3::<f64>::zeros((2, 4, 5));
        let params = RgbParams::default();
        assert!(prepare_rgb_array(arr.view(), &params).is_err());
    }

    #[test]
    fn test_band_index_out_of_range() {
        let arr = Array3::<f64>::zeros((3, 4, 5));
        let params = RgbParams {
            bands: [0, 1, 7],
            ..Default::default()
        };
        assert!(prepare_rgb_array(arr.view(), &params).is_err());
    }

    #[test]
    fn test_percentile_scaling_clips_and_orders() {
        // Values 0..n across each band; scaling must keep ordering and land in [0, 1].
        let arr = band_first(|_, r, c| (r * 5 + c) as f64);
        let params = RgbParams {
            bands: [0, 1, 2],
            percentile: Some(2.0),
            ..Default::default()
        };
        let out = prepare_rgb_array(arr.view(), &params).unwrap();
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(out[[0, 0, 0]] < out[[1, 0, 0]]);
        assert!(out[[3, 3, 0]] > out[[2, 0, 0]]);
        assert_eq!(out[[3, 4, 0]], 1.0);
    }

    #[test]
    fn test_reflectance_scaling_with_cutoff() {
        let arr = band_first(|_, r, _| if r == 0 { 10_000.0 } else { 2_500.0 });
        let params = RgbParams {
            bands: [0, 1, 2],
            surface_reflectance: Some(10_000.0),
            cutoff: Some(vec![0.5, 0.5, 0.5]),
            ..Default::default()
        };
        let out = prepare_rgb_array(arr.view(), &params).unwrap();
        // 10000 -> 1.0 -> clipped to 0.5 -> rescaled to 1.0
        assert_eq!(out[[0, 0, 0]], 1.0);
        // 2500 -> 0.25 -> under the cutoff -> 0.5
        assert_eq!(out[[1, 0, 0]], 0.5);
    }

    #[test]
    fn test_percentile_of_sorted_midpoint() {
        let sorted = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile_of_sorted(&sorted, 50.0), 2.0);
        assert_eq!(percentile_of_sorted(&sorted, 0.0), 0.0);
        assert_eq!(percentile_of_sorted(&sorted, 100.0), 4.0);
        assert_eq!(percentile_of_sorted(&sorted, 25.0), 1.0);
    }
}
