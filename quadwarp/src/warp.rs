//! Inverse-mapped resampling of a source raster onto a destination quad.
//!
//! For each destination pixel the resampler asks the containment test
//! whether the pixel belongs to the target quad, maps it back into the source
//! with the dst→src homography and bilinear-samples the source there. Pixels
//! that fail either check stay fully transparent.

use log::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "parallel")]
use rayon::slice::ParallelSliceMut;

use crate::config::WarpConfig;
use crate::error::WarpError;
use crate::geometry::{Containment, Point2D, Quad};
use crate::grid::{project_grid, Polyline};
use crate::homography::Homography;
use crate::image::RgbaImage;

/// Source coordinates this close to an integer are snapped onto it before the
/// source bounds check, so `-1e-10` samples column 0 while `width - 1e-10`
/// falls outside.
pub const SNAP_EPSILON: f64 = 1e-9;

/// A resampler with fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Warper {
    pub config: WarpConfig,
}

impl Warper {
    pub fn new(config: WarpConfig) -> Self {
        Self { config }
    }

    /// Warp `source` so that `src[i]` lands on `dst[i]`, into a fresh
    /// `out_width x out_height` raster.
    pub fn resample(
        &self,
        source: &RgbaImage,
        src: &Quad,
        dst: &Quad,
        out_width: u32,
        out_height: u32,
    ) -> Result<RgbaImage, WarpError> {
        if out_width == 0 || out_height == 0 {
            return Err(WarpError::InvalidInput(format!(
                "output dimensions must be positive, got {out_width}x{out_height}"
            )));
        }
        source.validate()?;

        // dst→src directly, no matrix inverse
        let hinv = Homography::estimate(dst, src)?;
        let containment = self.config.containment;

        let mut out = RgbaImage::new(out_width, out_height);
        let row_len = out_width as usize * 4;

        #[cfg(feature = "parallel")]
        out.buf
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| render_row(row, y as u32, source, &hinv, dst, containment));

        #[cfg(not(feature = "parallel"))]
        out.buf
            .chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| render_row(row, y as u32, source, &hinv, dst, containment));

        debug!(
            "resampled {}x{} onto {}x{} ({:?})",
            source.width, source.height, out_width, out_height, containment
        );
        Ok(out)
    }

    /// Warp the whole of `source` onto `dst`.
    ///
    /// When the corners are degenerate the source is stretched over the full
    /// output canvas instead, i.e. shown without the transform.
    pub fn render_or_fallback(
        &self,
        source: &RgbaImage,
        dst: &Quad,
        out_width: u32,
        out_height: u32,
    ) -> Result<RgbaImage, WarpError> {
        let src = source.corners();
        match self.resample(source, &src, dst, out_width, out_height) {
            Err(WarpError::DegenerateGeometry(reason)) => {
                warn!("{reason}; showing image without transform");
                let canvas = Quad::rect(out_width as f64, out_height as f64);
                self.resample(source, &src, &canvas, out_width, out_height)
            }
            other => other,
        }
    }

    /// Grid overlay for a `width x height` source warped from `src` to `dst`,
    /// using the configured spacing.
    pub fn grid(
        &self,
        width: u32,
        height: u32,
        src: &Quad,
        dst: &Quad,
    ) -> Result<Vec<Polyline>, WarpError> {
        project_grid(width, height, src, dst, self.config.grid_spacing)
    }
}

fn render_row(
    row: &mut [u8],
    y: u32,
    source: &RgbaImage,
    hinv: &Homography,
    dst: &Quad,
    containment: Containment,
) {
    for (x, px) in row.chunks_exact_mut(4).enumerate() {
        let p = Point2D::new(x as f64, y as f64);
        if !dst.contains(p, containment) {
            continue;
        }
        let s = hinv.project(p.x, p.y);
        if let Some(rgba) = source.sample_bilinear(snap(s.x), snap(s.y)) {
            px.copy_from_slice(&rgba);
        }
    }
}

#[inline]
fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPSILON {
        r
    } else {
        v
    }
}
