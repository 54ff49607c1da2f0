//! Integration tests for the ochre visualization toolkit.
//!
//! These tests exercise the public API end-to-end: constructing glyphs and
//! statistics, rendering figures, and writing image and animation files.

mod common;

use common::{image_utils, test_data};
use ndarray::array;
use pretty_assertions::assert_eq;
use serde_json::json;

use ochre::{
    ArrayGlyph, ColorKind, Colors, HistogramOptions, OchreError, PlotOptions, PointStyle,
    RgbParams, Statistic,
};

#[test]
fn test_masked_glyph_reports_range_and_count() {
    let arr = test_data::masked_field();
    let glyph = ArrayGlyph::masked(arr, &[test_data::NO_DATA_VALUE], PlotOptions::default())
        .unwrap();

    // Cell (0, 0) carried the sentinel; 99 cells and the range survive.
    assert_eq!(glyph.element_count(), 99);
    assert_eq!(glyph.vmin(), 1.0);
    assert_eq!(glyph.vmax(), 99.0);
}

#[test]
fn test_plot_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("field.png");

    let glyph = ArrayGlyph::masked(
        test_data::masked_field(),
        &[test_data::NO_DATA_VALUE],
        PlotOptions::default(),
    )
    .unwrap();
    glyph.plot().unwrap().save(&path).unwrap();

    let img = image_utils::load_image(&path);
    assert_eq!(img.width(), 800);
    assert_eq!(img.height(), 800);
    assert!(image_utils::non_white_pixels(&img) > 1000);
}

#[test]
fn test_plot_every_color_scale() {
    for scale in ["linear", "power", "sym-lognorm", "boundary-norm", "midpoint"] {
        let mut glyph = ArrayGlyph::masked(
            test_data::masked_field(),
            &[test_data::NO_DATA_VALUE],
            PlotOptions::default(),
        )
        .unwrap();
        glyph.set_option("color_scale", &json!(scale)).unwrap();
        glyph.set_option("cmap", &json!("terrain")).unwrap();
        glyph.set_option("ticks_spacing", &json!(20.0)).unwrap();
        let figure = glyph.plot().unwrap();
        assert_eq!(figure.width(), 800);
    }
}

#[test]
fn test_invalid_color_scale_name() {
    let mut glyph = ArrayGlyph::new(array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
    glyph.set_option("color_scale", &json!("logarithmic")).unwrap();
    let err = glyph.plot().unwrap_err();
    assert!(matches!(err, OchreError::InvalidColorScale { .. }));
}

#[test]
fn test_unknown_option_key_is_rejected() {
    let mut glyph = ArrayGlyph::new(array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
    let err = glyph.set_option("colour_scale", &json!("linear")).unwrap_err();
    assert!(matches!(err, OchreError::UnknownOption { .. }));
}

#[test]
fn test_plot_with_extent_and_points() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("points.png");

    let glyph = ArrayGlyph::masked(
        test_data::masked_field(),
        &[test_data::NO_DATA_VALUE],
        PlotOptions::default(),
    )
    .unwrap()
    .with_extent([-75.6, 4.2, -75.1, 4.7]);

    let points = array![[1.0, 1.0, 1.0], [2.0, 4.0, 4.0], [3.0, 8.0, 8.0]];
    let figure = glyph
        .plot_with_points(&points, &PointStyle::default())
        .unwrap();
    figure.save(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_rgb_composite_with_percentile() {
    let params = RgbParams {
        bands: [0, 1, 2],
        percentile: Some(2.0),
        ..Default::default()
    };
    let glyph =
        ArrayGlyph::rgb_composite(test_data::band_stack(), &params, PlotOptions::default())
            .unwrap();
    assert!(glyph.is_rgb());

    let figure = glyph.plot().unwrap();
    assert_eq!(figure.width(), 800);
}

#[test]
fn test_rgb_composite_rejects_two_bands() {
    let bands = ndarray::Array3::<f64>::zeros((2, 4, 4));
    let err = ArrayGlyph::rgb_composite(bands, &RgbParams::default(), PlotOptions::default())
        .unwrap_err();
    assert!(matches!(err, OchreError::InvalidParameter { .. }));
}

#[test]
fn test_animation_gif_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anim.gif");

    let glyph = ArrayGlyph::stacked(test_data::frame_stack(4), &[], PlotOptions::default())
        .unwrap();
    let labels = ["2000-01-01", "2000-01-02", "2000-01-03", "2000-01-04"];
    let animation = glyph.animate(&labels).unwrap();
    assert_eq!(animation.frame_count(), 4);
    assert_eq!(animation.interval_ms(), 200);

    animation.save(&path, 2).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(
        image_utils::detect_format(&bytes),
        Some(image::ImageFormat::Gif)
    );
}

#[test]
fn test_animation_unsupported_container() {
    let glyph = ArrayGlyph::stacked(test_data::frame_stack(2), &[], PlotOptions::default())
        .unwrap();
    let animation = glyph.animate(&["a", "b"]).unwrap();
    let err = animation.save("anim.webm", 2).unwrap_err();
    assert!(matches!(err, OchreError::UnsupportedVideoFormat { .. }));
}

#[test]
fn test_histogram_1d_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hist.png");

    let values = ndarray::Array1::from_iter((0..200).map(|i| ((i * 37) % 100) as f64));
    let stat = Statistic::new(values);
    let (figure, data) = stat.histogram().unwrap();
    figure.save(&path).unwrap();

    assert_eq!(data.counts[0].iter().sum::<usize>(), 200);
    assert_eq!(data.bin_edges[0].len(), 16);
    let img = image_utils::load_image(&path);
    assert_eq!(img.width(), 500);
}

#[test]
fn test_histogram_2d_color_mismatch() {
    let values = ndarray::Array2::from_shape_fn((40, 3), |(r, c)| (r + c) as f64);
    let stat = Statistic::new_2d(values, HistogramOptions::default());
    let err = stat.histogram().unwrap_err();
    assert!(matches!(err, OchreError::ColorCountMismatch { .. }));
}

#[test]
fn test_color_scenario_from_hex() {
    let colors = Colors::new(["ff0000"]);
    assert_eq!(colors.kinds(), vec![ColorKind::Hex]);
    assert_eq!(colors.to_rgb_normalized().unwrap(), vec![(1.0, 0.0, 0.0)]);
    assert_eq!(colors.to_rgb().unwrap(), vec![(255, 0, 0)]);
}

#[test]
fn test_color_ramp_from_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.png");
    test_data::write_ramp_image(&path);

    let colors = Colors::from_image(&path).unwrap();
    assert_eq!(colors.values().len(), 16);

    let ramp = colors.to_color_ramp(None).unwrap();
    use ochre::Colormap;
    // Left edge is blue-ish, right edge red-ish, matching the strip.
    let left = ramp.map_normalized(0.0);
    let right = ramp.map_normalized(1.0);
    assert!(left[2] > left[0]);
    assert!(right[0] > right[2]);
}

#[test]
fn test_color_ramp_missing_image() {
    let err = Colors::from_image("no/such/ramp.png").unwrap_err();
    assert!(matches!(err, OchreError::DataNotFound { .. }));
}
