//! Render a CSV array as a PNG heatmap.
//!
//! A small command-line front end over [`ochre::ArrayGlyph`]: reads a
//! comma-separated numeric grid and writes the rendered figure next to it.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ndarray::Array2;
use serde_json::json;

use ochre::{init_tracing, ArrayGlyph, PlotOptions};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "heatmap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a CSV file holding a numeric grid
    input: PathBuf,

    /// Output image path (format follows the extension)
    #[arg(short, long, default_value = "heatmap.png")]
    output: PathBuf,

    /// Colormap name
    #[arg(long, env = "OCHRE_CMAP", default_value = "coolwarm_r")]
    cmap: String,

    /// Color scale: linear, power, sym-lognorm, boundary-norm, midpoint
    #[arg(long, default_value = "linear")]
    color_scale: String,

    /// Sentinel value masked out before display
    #[arg(long)]
    exclude: Option<f64>,

    /// Figure title
    #[arg(long, default_value = "Array Plot")]
    title: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "OCHRE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let array = read_csv_grid(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let mut options = PlotOptions::default();
    options.set("cmap", &json!(args.cmap))?;
    options.set("color_scale", &json!(args.color_scale))?;
    options.set("title", &json!(args.title))?;

    let exclude: Vec<f64> = args.exclude.into_iter().collect();
    let glyph = ArrayGlyph::masked(array, &exclude, options)?;
    let figure = glyph.plot()?;
    figure
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "Rendered {}x{} figure to {}",
        figure.width(),
        figure.height(),
        args.output.display()
    );
    Ok(())
}

/// Parse a rectangular comma-separated numeric grid.
fn read_csv_grid(path: &PathBuf) -> anyhow::Result<Array2<f64>> {
    let content = std::fs::read_to_string(path)?;
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .split(',')
            .map(|cell| cell.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .with_context(|| format!("bad number on line {}", line_no + 1))?;
        if let Some(first) = rows.first() {
            anyhow::ensure!(
                row.len() == first.len(),
                "line {} has {} columns, expected {}",
                line_no + 1,
                row.len(),
                first.len()
            );
        }
        rows.push(row);
    }
    anyhow::ensure!(!rows.is_empty(), "the file contains no data rows");

    let shape = (rows.len(), rows[0].len());
    Array2::from_shape_vec(shape, rows.into_iter().flatten().collect())
        .context("grid is not rectangular")
}
