pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
#[allow(clippy::needless_range_loop)]
pub mod homography;
#[allow(clippy::needless_range_loop)]
pub mod image;
pub mod overlay;
#[allow(clippy::needless_range_loop)]
pub mod solve;
pub mod warp;

pub use config::WarpConfig;
pub use error::{Degeneracy, WarpError};
pub use geometry::{Containment, Point2D, Quad};
pub use grid::{GridAxis, Polyline};
pub use homography::Homography;
pub use image::RgbaImage;
pub use warp::Warper;

/// Homography taking each `src[i]` to `dst[i]`.
pub fn estimate_homography(src: &Quad, dst: &Quad) -> Result<Homography, WarpError> {
    Homography::estimate(src, dst)
}

/// Map `p` through `h`; undefined mappings give [`Point2D::OUTSIDE`].
pub fn apply_homography(h: &Homography, p: Point2D) -> Point2D {
    h.project(p.x, p.y)
}

/// Warp `source` from `src` onto `dst` with the default configuration.
pub fn resample(
    source: &RgbaImage,
    src: &Quad,
    dst: &Quad,
    out_width: u32,
    out_height: u32,
) -> Result<RgbaImage, WarpError> {
    Warper::default().resample(source, src, dst, out_width, out_height)
}

/// Destination-space grid lines for a `width x height` source.
pub fn project_grid(
    width: u32,
    height: u32,
    src: &Quad,
    dst: &Quad,
    spacing: f64,
) -> Result<Vec<Polyline>, WarpError> {
    grid::project_grid(width, height, src, dst, spacing)
}
