use log::debug;

use crate::error::WarpError;
use crate::geometry::{Point2D, Quad};
use crate::solve::solve;

/// Projections whose homogeneous denominator is below this are undefined.
pub const DENOM_EPSILON: f64 = 1e-4;

/// A 3x3 homography matrix, normalized so that `data[2][2] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    pub data: [[f64; 3]; 3],
}

impl Homography {
    pub const IDENTITY: Homography = Homography {
        data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Compute the homography taking each `src[i]` to `dst[i]`.
    ///
    /// Both quads must be free of collinear triples. Passing the quads the
    /// other way round gives the inverse mapping directly.
    pub fn estimate(src: &Quad, dst: &Quad) -> Result<Self, WarpError> {
        src.validate()?;
        dst.validate()?;

        // Build 8x8 system in h11..h13, h21..h23, h31, h32 (h33 = 1)
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];
        for i in 0..4 {
            let (x, y) = (src[i].x, src[i].y);
            let (u, v) = (dst[i].x, dst[i].y);

            let row0 = i * 2;
            a[row0] = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u];
            b[row0] = u;

            let row1 = i * 2 + 1;
            a[row1] = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v];
            b[row1] = v;
        }

        let h = solve(&a, &b).inspect_err(|e| debug!("homography estimation failed: {e}"))?;

        Ok(Homography {
            data: [
                [h[0], h[1], h[2]],
                [h[3], h[4], h[5]],
                [h[6], h[7], 1.0],
            ],
        })
    }

    /// Map a point, or `None` when it lies on (or next to) the vanishing line.
    pub fn try_project(&self, x: f64, y: f64) -> Option<Point2D> {
        let h = &self.data;
        let denom = h[2][0] * x + h[2][1] * y + h[2][2];
        if !(denom.abs() >= DENOM_EPSILON) {
            return None;
        }
        let xx = h[0][0] * x + h[0][1] * y + h[0][2];
        let yy = h[1][0] * x + h[1][1] * y + h[1][2];
        Some(Point2D::new(xx / denom, yy / denom))
    }

    /// Map a point, returning [`Point2D::OUTSIDE`] where the mapping is undefined.
    #[inline]
    pub fn project(&self, x: f64, y: f64) -> Point2D {
        self.try_project(x, y).unwrap_or(Point2D::OUTSIDE)
    }

    /// Row-major copy of the nine entries.
    pub fn to_array(&self) -> [f64; 9] {
        let h = &self.data;
        [
            h[0][0], h[0][1], h[0][2], h[1][0], h[1][1], h[1][2], h[2][0], h[2][1], h[2][2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Degeneracy;

    fn assert_close(actual: Point2D, expected: Point2D, tol: f64, msg: &str) {
        assert!(
            (actual.x - expected.x).abs() < tol && (actual.y - expected.y).abs() < tol,
            "{msg}: expected ({}, {}), got ({}, {})",
            expected.x,
            expected.y,
            actual.x,
            actual.y,
        );
    }

    #[test]
    fn identity_from_equal_quads() {
        let q = Quad::rect(2.0, 2.0);
        let h = Homography::estimate(&q, &q).unwrap();
        for r in 0..3 {
            for c in 0..3 {
                let expected = Homography::IDENTITY.data[r][c];
                assert!(
                    (h.data[r][c] - expected).abs() < 1e-12,
                    "h[{r}][{c}] = {}",
                    h.data[r][c]
                );
            }
        }
    }

    #[test]
    fn scaling_homography() {
        let src = Quad::rect(2.0, 2.0);
        let dst = Quad::rect(100.0, 50.0);
        let h = Homography::estimate(&src, &dst).unwrap();
        assert_close(h.project(1.0, 1.0), Point2D::new(50.0, 25.0), 1e-9, "center");
        assert_close(h.project(0.5, 2.0), Point2D::new(25.0, 50.0), 1e-9, "edge");
    }

    #[test]
    fn project_all_corners_match() {
        let src = Quad::rect(640.0, 480.0);
        let dst = Quad::from([[10.0, 20.0], [590.0, 15.0], [620.0, 470.0], [5.0, 400.0]]);
        let h = Homography::estimate(&src, &dst).unwrap();
        assert_eq!(h.data[2][2], 1.0);

        for i in 0..4 {
            let p = h.project(src[i].x, src[i].y);
            assert_close(p, dst[i], 1e-6, &format!("corner {i}"));
        }
    }

    #[test]
    fn swapped_estimate_is_inverse() {
        let src = Quad::rect(300.0, 200.0);
        let dst = Quad::from([[40.0, 10.0], [280.0, 60.0], [250.0, 190.0], [20.0, 150.0]]);
        let h = Homography::estimate(&src, &dst).unwrap();
        let hinv = Homography::estimate(&dst, &src).unwrap();

        let p = h.project(123.0, 77.0);
        assert_close(hinv.project(p.x, p.y), Point2D::new(123.0, 77.0), 1e-6, "roundtrip");
    }

    #[test]
    fn perspective_is_not_affine() {
        // A trapezoid needs a non-zero bottom row
        let src = Quad::rect(100.0, 100.0);
        let dst = Quad::from([[30.0, 0.0], [70.0, 0.0], [100.0, 100.0], [0.0, 100.0]]);
        let h = Homography::estimate(&src, &dst).unwrap();
        assert!(h.data[2][0].abs() > 1e-6 || h.data[2][1].abs() > 1e-6);
    }

    #[test]
    fn collinear_destination_is_degenerate() {
        let src = Quad::rect(20.0, 20.0);
        let dst = Quad::from([[0.0, 0.0], [10.0, 0.0], [20.0, 0.0], [0.0, 10.0]]);
        assert!(matches!(
            Homography::estimate(&src, &dst),
            Err(WarpError::DegenerateGeometry(Degeneracy::CollinearPoints { .. }))
        ));
    }

    #[test]
    fn collapsed_quad_is_degenerate() {
        let src = Quad::rect(10.0, 10.0);
        let dst = Quad::from([[5.0, 5.0]; 4]);
        assert!(matches!(
            Homography::estimate(&src, &dst),
            Err(WarpError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn project_near_vanishing_line_is_undefined() {
        // denominator = 1 - x/10 vanishes at x = 10
        let h = Homography {
            data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-0.1, 0.0, 1.0]],
        };
        assert!(h.try_project(10.0, 3.0).is_none());
        assert_eq!(h.project(10.0, 3.0), Point2D::OUTSIDE);
        assert_eq!(h.project(10.000_5, 3.0), Point2D::OUTSIDE);
        assert_close(h.project(5.0, 3.0), Point2D::new(10.0, 6.0), 1e-12, "defined");
    }

    #[test]
    fn to_array_is_row_major() {
        let h = Homography {
            data: [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 1.0]],
        };
        assert_eq!(h.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 1.0]);
    }
}
