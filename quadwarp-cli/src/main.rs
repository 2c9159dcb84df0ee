use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;

use quadwarp::config::WarpJob;
use quadwarp::geometry::{Containment, Quad};
use quadwarp::grid::project_grid;
use quadwarp::homography::Homography;
use quadwarp::image::RgbaImage;
use quadwarp::overlay::draw_polylines;
use quadwarp::warp::Warper;
use quadwarp::WarpError;

/// Warp an image onto four destination corner points
#[derive(Parser)]
#[command(name = "quadwarp", version)]
struct Args {
    /// Input image file (PNG or JPEG)
    input: String,

    /// Output PNG file
    #[arg(short, long)]
    output: String,

    /// Destination corners as x0,y0,x1,y1,x2,y2,x3,y3 (TL, TR, BR, BL)
    #[arg(long, num_args = 1, value_delimiter = ',', allow_hyphen_values = true)]
    corners: Option<Vec<f64>>,

    /// TOML job file with corners, output size and [warp] settings
    #[arg(long)]
    job: Option<String>,

    /// Output width in pixels (default: job file, then input width)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (default: job file, then input height)
    #[arg(long)]
    height: Option<u32>,

    /// Use exact quadrilateral containment instead of the bounding box
    #[arg(long)]
    polygon: bool,

    /// Clamp corners into the output canvas
    #[arg(long)]
    clamp: bool,

    /// Draw the projected reference grid
    #[arg(long)]
    grid: bool,

    /// Grid spacing in source pixels
    #[arg(long)]
    grid_spacing: Option<f64>,

    /// Print a JSON summary to stdout
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct OutputSummary {
    input: String,
    output: String,
    source_width: u32,
    source_height: u32,
    width: u32,
    height: u32,
    corners: [[f64; 2]; 4],
    /// Row-major src→dst homography; absent when the corners are degenerate.
    #[serde(skip_serializing_if = "Option::is_none")]
    homography: Option<[f64; 9]>,
    fallback: bool,
    grid_lines: usize,
}

fn load_image(path: &str) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image: {path}"))?
        .into_rgba8();

    let width = img.width();
    let height = img.height();
    let pixels = img.into_raw();

    RgbaImage::from_buf(width, height, pixels).with_context(|| format!("invalid image: {path}"))
}

fn save_png(path: &str, img: RgbaImage) -> Result<()> {
    let out = image::RgbaImage::from_raw(img.width, img.height, img.buf)
        .context("output buffer does not match its dimensions")?;
    out.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {path}"))
}

fn load_job(path: &str) -> Result<WarpJob> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    WarpJob::from_toml_str(&text).with_context(|| format!("parsing {path}"))
}

fn corners_from_args(values: &[f64]) -> Result<Quad> {
    if values.len() != 8 {
        bail!("--corners needs 8 numbers (4 x,y pairs), got {}", values.len());
    }
    Ok(Quad::from([
        [values[0], values[1]],
        [values[2], values[3]],
        [values[4], values[5]],
        [values[6], values[7]],
    ]))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let job = args.job.as_deref().map(load_job).transpose()?;
    let source = load_image(&args.input)?;
    info!("loaded {} ({}x{})", args.input, source.width, source.height);

    // Command-line flags override the job file
    let mut config = job.as_ref().map(|j| j.warp.clone()).unwrap_or_default();
    if args.polygon {
        config.containment = Containment::Polygon;
    }
    if let Some(spacing) = args.grid_spacing {
        config.grid_spacing = spacing;
    }

    let width = args
        .width
        .or(job.as_ref().and_then(|j| j.width))
        .unwrap_or(source.width);
    let height = args
        .height
        .or(job.as_ref().and_then(|j| j.height))
        .unwrap_or(source.height);

    let mut corners = match (&args.corners, &job) {
        (Some(values), _) => corners_from_args(values)?,
        (None, Some(job)) => job.corners,
        // resting handle positions
        (None, None) => Quad::rect(width as f64, height as f64),
    };
    if args.clamp {
        corners = corners.clamped(width as f64, height as f64);
    }

    let src = source.corners();
    let homography = match Homography::estimate(&src, &corners) {
        Ok(h) => Some(h),
        Err(WarpError::DegenerateGeometry(_)) => None,
        Err(e) => return Err(e).context("invalid corners"),
    };

    let warper = Warper::new(config);
    let mut output = warper
        .render_or_fallback(&source, &corners, width, height)
        .context("warp failed")?;
    info!(
        "warped onto {}x{} with {:?} containment",
        width, height, warper.config.containment
    );

    let mut grid_lines = 0;
    if args.grid {
        match project_grid(source.width, source.height, &src, &corners, warper.config.grid_spacing)
        {
            Ok(lines) => {
                grid_lines = lines.len();
                draw_polylines(&mut output, &lines, warper.config.grid_color);
                info!("drew {grid_lines} grid lines");
            }
            Err(WarpError::DegenerateGeometry(reason)) => warn!("skipping grid: {reason}"),
            Err(e) => return Err(e).context("grid projection failed"),
        }
    }

    save_png(&args.output, output)?;
    info!("wrote {}", args.output);

    if args.json {
        let summary = OutputSummary {
            input: args.input.clone(),
            output: args.output.clone(),
            source_width: source.width,
            source_height: source.height,
            width,
            height,
            corners: corners.into(),
            homography: homography.map(|h| h.to_array()),
            fallback: homography.is_none(),
            grid_lines,
        };
        let json = if args.pretty {
            serde_json::to_string_pretty(&summary)?
        } else {
            serde_json::to_string(&summary)?
        };
        println!("{json}");
    }

    Ok(())
}
