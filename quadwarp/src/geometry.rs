//! Points, corner quads and the containment test used by the resampler.

use std::ops::{Index, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Degeneracy, WarpError};

/// Relative tolerance for treating three corners as collinear.
///
/// Compared against `|cross(b - a, c - a)| / (|b - a| * |c - a|)`, i.e. the sine
/// of the angle at `a`.
pub const COLLINEAR_EPSILON: f64 = 1e-9;

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 2]", into = "[f64; 2]"))]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// Returned by projections that have no finite image. Fails every
    /// `[0, w) x [0, h)` bounds check.
    pub const OUTSIDE: Point2D = Point2D { x: -1.0, y: -1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// 2D cross product (z component of `self x other`).
    #[inline]
    pub fn cross(self, other: Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Clamp into the closed canvas rectangle `[0, width] x [0, height]`.
    pub fn clamped(self, width: f64, height: f64) -> Self {
        Self {
            x: self.x.clamp(0.0, width.max(0.0)),
            y: self.y.clamp(0.0, height.max(0.0)),
        }
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// How the resampler decides whether a destination pixel belongs to the quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Containment {
    /// Axis-aligned bounding box of the four corners (inclusive). Pixels in
    /// the box but outside a rotated or concave quad are still sampled.
    #[default]
    BoundingBox,
    /// Non-zero winding number over the corner loop; edges count as inside.
    Polygon,
}

/// Four corners in the order top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Quad {
    pub points: [Point2D; 4],
}

impl Quad {
    pub const fn new(points: [Point2D; 4]) -> Self {
        Self { points }
    }

    /// Build a quad from a slice that must hold exactly four points.
    pub fn from_slice(points: &[Point2D]) -> Result<Self, WarpError> {
        let points: [Point2D; 4] = points.try_into().map_err(|_| {
            WarpError::InvalidInput(format!(
                "a quad needs exactly 4 corners, got {}",
                points.len()
            ))
        })?;
        Ok(Self { points })
    }

    /// Corners of the rectangle `(0,0)-(width,height)`: the resting position
    /// of the handles and the source quad of a `width x height` raster.
    pub fn rect(width: f64, height: f64) -> Self {
        Self::new([
            Point2D::new(0.0, 0.0),
            Point2D::new(width, 0.0),
            Point2D::new(width, height),
            Point2D::new(0.0, height),
        ])
    }

    /// Clamp every corner into `[0, width] x [0, height]`.
    pub fn clamped(&self, width: f64, height: f64) -> Self {
        Self::new(self.points.map(|p| p.clamped(width, height)))
    }

    /// `(min_x, min_y, max_x, max_y)` over the four corners.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in &self.points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        (min_x, min_y, max_x, max_y)
    }

    pub fn contains(&self, p: Point2D, containment: Containment) -> bool {
        match containment {
            Containment::BoundingBox => {
                let (min_x, min_y, max_x, max_y) = self.bounds();
                p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y
            }
            Containment::Polygon => self.winding_number(p) != 0 || self.on_boundary(p),
        }
    }

    /// Winding number of the closed corner loop around `p`.
    pub fn winding_number(&self, p: Point2D) -> i32 {
        let mut wn = 0;
        for i in 0..4 {
            let a = self.points[i];
            let b = self.points[(i + 1) % 4];
            let side = (b - a).cross(p - a);
            if a.y <= p.y {
                if b.y > p.y && side > 0.0 {
                    wn += 1;
                }
            } else if b.y <= p.y && side < 0.0 {
                wn -= 1;
            }
        }
        wn
    }

    fn on_boundary(&self, p: Point2D) -> bool {
        (0..4).any(|i| {
            let a = self.points[i];
            let b = self.points[(i + 1) % 4];
            let len = (b - a).norm();
            let side = (b - a).cross(p - a);
            side.abs() <= COLLINEAR_EPSILON * len.max(1.0)
                && p.x >= a.x.min(b.x)
                && p.x <= a.x.max(b.x)
                && p.y >= a.y.min(b.y)
                && p.y <= a.y.max(b.y)
        })
    }

    /// Reject non-finite corners (`InvalidInput`) and any collinear or
    /// coincident triple (`DegenerateGeometry`).
    pub fn validate(&self) -> Result<(), WarpError> {
        if let Some(i) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(WarpError::InvalidInput(format!(
                "corner {i} is not finite: ({}, {})",
                self.points[i].x, self.points[i].y
            )));
        }

        const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        for indices in TRIPLES {
            let [a, b, c] = indices.map(|i| self.points[i]);
            let ab = b - a;
            let ac = c - a;
            if ab.cross(ac).abs() <= COLLINEAR_EPSILON * ab.norm() * ac.norm() {
                return Err(WarpError::DegenerateGeometry(
                    Degeneracy::CollinearPoints { indices },
                ));
            }
        }
        Ok(())
    }
}

impl Index<usize> for Quad {
    type Output = Point2D;

    fn index(&self, i: usize) -> &Point2D {
        &self.points[i]
    }
}

impl From<[[f64; 2]; 4]> for Quad {
    fn from(corners: [[f64; 2]; 4]) -> Self {
        Self::new(corners.map(Point2D::from))
    }
}

impl From<Quad> for [[f64; 2]; 4] {
    fn from(q: Quad) -> Self {
        q.points.map(<[f64; 2]>::from)
    }
}
