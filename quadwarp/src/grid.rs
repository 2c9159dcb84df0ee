//! Forward projection of a source-space reference grid.

use log::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::WarpError;
use crate::geometry::{Point2D, Quad};
use crate::homography::Homography;

/// Most samples a single grid may project, over both line families.
pub const MAX_GRID_SAMPLES: usize = 1 << 24;

/// Which family of grid lines a polyline belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GridAxis {
    /// Constant source `y`.
    Horizontal,
    /// Constant source `x`.
    Vertical,
}

/// One projected grid line in destination space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline {
    pub axis: GridAxis,
    pub points: Vec<Point2D>,
}

/// Project a `width x height` source grid with the given spacing through the
/// forward (src→dst) homography.
///
/// Horizontal lines come first (top to bottom), then vertical lines (left to
/// right). Samples beyond the source extent are dropped; lines left without
/// samples are omitted. Samples whose projection is undefined keep their slot
/// as [`Point2D::OUTSIDE`].
pub fn project_grid(
    width: u32,
    height: u32,
    src: &Quad,
    dst: &Quad,
    spacing: f64,
) -> Result<Vec<Polyline>, WarpError> {
    if width == 0 || height == 0 {
        return Err(WarpError::InvalidInput(format!(
            "grid dimensions must be positive, got {width}x{height}"
        )));
    }
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(WarpError::InvalidInput(format!(
            "grid spacing must be a positive number, got {spacing}"
        )));
    }

    let w = width as f64;
    let ht = height as f64;
    let nx = (w / spacing).ceil();
    let ny = (ht / spacing).ceil();
    // both families walk the same (nx+1) x (ny+1) lattice
    if 2.0 * (nx + 1.0) * (ny + 1.0) > MAX_GRID_SAMPLES as f64 {
        return Err(WarpError::InvalidInput(format!(
            "grid spacing {spacing} is too fine for a {width}x{height} source"
        )));
    }
    let nx = nx as usize;
    let ny = ny as usize;

    let h = Homography::estimate(src, dst)?;

    let mut lines = Vec::with_capacity(nx + ny + 2);

    for i in 0..=ny {
        let y = i as f64 * spacing;
        let points: Vec<Point2D> = (0..=nx)
            .map(|j| j as f64 * spacing)
            .filter(|&x| x <= w && y <= ht)
            .map(|x| h.project(x, y))
            .collect();
        if !points.is_empty() {
            lines.push(Polyline {
                axis: GridAxis::Horizontal,
                points,
            });
        }
    }

    for j in 0..=nx {
        let x = j as f64 * spacing;
        let points: Vec<Point2D> = (0..=ny)
            .map(|i| i as f64 * spacing)
            .filter(|&y| x <= w && y <= ht)
            .map(|y| h.project(x, y))
            .collect();
        if !points.is_empty() {
            lines.push(Polyline {
                axis: GridAxis::Vertical,
                points,
            });
        }
    }

    trace!("projected {} grid lines at spacing {spacing}", lines.len());
    Ok(lines)
}
