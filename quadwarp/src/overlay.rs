//! Stroking projected grid lines onto a raster.

use crate::geometry::Point2D;
use crate::grid::Polyline;
use crate::image::RgbaImage;

/// Stroke each polyline with 1-pixel lines, blending `color` source-over.
///
/// Segments are clipped to the raster; segments with a non-finite endpoint
/// are skipped. Within one polyline a pixel shared by consecutive segments is
/// blended once. [`Point2D::OUTSIDE`] samples are stroked like any other
/// vertex, so a line through one runs toward the top-left corner.
pub fn draw_polylines(img: &mut RgbaImage, lines: &[Polyline], color: [u8; 4]) {
    for line in lines {
        let mut last: Option<(i64, i64)> = None;
        for seg in line.points.windows(2) {
            let Some((x0, y0, x1, y1)) = clip_segment(seg[0], seg[1], img.width, img.height) else {
                last = None;
                continue;
            };
            for (x, y) in bresenham(x0, y0, x1, y1) {
                if last == Some((x, y)) {
                    continue;
                }
                last = Some((x, y));
                blend_pixel(img, x as u32, y as u32, color);
            }
        }
        // a polyline of a single sample still marks its point
        if let [p] = line.points.as_slice() {
            if let Some((x, y, _, _)) = clip_segment(*p, *p, img.width, img.height) {
                blend_pixel(img, x as u32, y as u32, color);
            }
        }
    }
}

/// Source-over blend of a straight-alpha color onto one pixel.
pub fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: [u8; 4]) {
    let dst = img.get(x, y);
    let sa = color[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (color[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    img.set(x, y, out);
}

/// Clip the segment `a-b` to the pixel rectangle `[0, width-1] x [0, height-1]`
/// (Liang-Barsky) and round the surviving endpoints to pixel coordinates.
fn clip_segment(a: Point2D, b: Point2D, width: u32, height: u32) -> Option<(i64, i64, i64, i64)> {
    if !a.is_finite() || !b.is_finite() || width == 0 || height == 0 {
        return None;
    }
    let (xmax, ymax) = ((width - 1) as f64, (height - 1) as f64);
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, a.x), (dx, xmax - a.x), (-dy, a.y), (dy, ymax - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }

    let px = |t: f64, base: f64, d: f64, max: f64| (base + t * d).round().clamp(0.0, max) as i64;
    Some((
        px(t0, a.x, dx, xmax),
        px(t0, a.y, dy, ymax),
        px(t1, a.x, dx, xmax),
        px(t1, a.y, dy, ymax),
    ))
}

/// Integer Bresenham line from `(x0, y0)` to `(x1, y1)`, 8-connected,
/// endpoints included.
fn bresenham(x0: i64, y0: i64, x1: i64, y1: i64) -> Vec<(i64, i64)> {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x1 > x0 { 1 } else { -1 };
    let sy = if y1 > y0 { 1 } else { -1 };

    let npts = dx.max(dy) + 1;
    let mut pts = Vec::with_capacity(npts as usize);
    let (mut x, mut y) = (x0, y0);

    if dx >= dy {
        // step along x
        let mut err = dx / 2;
        for _ in 0..npts {
            pts.push((x, y));
            err -= dy;
            if err < 0 {
                y += sy;
                err += dx;
            }
            x += sx;
        }
    } else {
        // step along y
        let mut err = dy / 2;
        for _ in 0..npts {
            pts.push((x, y));
            err -= dx;
            if err < 0 {
                x += sx;
                err += dy;
            }
            y += sy;
        }
    }
    pts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridAxis;

    fn line(points: &[[f64; 2]]) -> Polyline {
        Polyline {
            axis: GridAxis::Horizontal,
            points: points.iter().map(|&p| Point2D::from(p)).collect(),
        }
    }

    #[test]
    fn bresenham_endpoints_and_length() {
        let pts = bresenham(0, 0, 5, 2);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], (0, 0));
        assert_eq!(pts[5], (5, 2));

        let pts = bresenham(3, 7, 3, 1);
        assert_eq!(pts.len(), 7);
        assert!(pts.iter().all(|&(x, _)| x == 3));
        assert_eq!(pts[6], (3, 1));

        assert_eq!(bresenham(2, 2, 2, 2), vec![(2, 2)]);
    }

    #[test]
    fn opaque_stroke_replaces_pixels() {
        let mut img = RgbaImage::new(5, 5);
        draw_polylines(&mut img, &[line(&[[0.0, 2.0], [4.0, 2.0]])], [255, 0, 0, 255]);
        for x in 0..5 {
            assert_eq!(img.get(x, 2), [255, 0, 0, 255]);
        }
        assert_eq!(img.get(2, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn translucent_stroke_blends() {
        let mut img = RgbaImage::new(3, 1);
        img.buf.fill(255); // opaque white
        draw_polylines(&mut img, &[line(&[[0.0, 0.0], [2.0, 0.0]])], [0, 150, 255, 128]);
        let px = img.get(1, 0);
        // ~50% blend of (0,150,255) over white
        assert_eq!(px[3], 255);
        assert!((px[0] as i32 - 127).abs() <= 1, "{px:?}");
        assert!((px[1] as i32 - 202).abs() <= 1, "{px:?}");
        assert_eq!(px[2], 255);
    }

    #[test]
    fn shared_vertex_blended_once() {
        let mut a = RgbaImage::new(6, 1);
        let mut b = RgbaImage::new(6, 1);
        let color = [0, 0, 255, 100];
        draw_polylines(&mut a, &[line(&[[0.0, 0.0], [3.0, 0.0], [5.0, 0.0]])], color);
        draw_polylines(&mut b, &[line(&[[0.0, 0.0], [5.0, 0.0]])], color);
        assert_eq!(a, b);
    }

    #[test]
    fn clips_far_away_segments() {
        let mut img = RgbaImage::new(10, 10);
        draw_polylines(
            &mut img,
            &[line(&[[-1e9, 5.0], [1e9, 5.0]]), line(&[[-5.0, -5.0], [-1.0, -1.0]])],
            [0, 255, 0, 255],
        );
        for x in 0..10 {
            assert_eq!(img.get(x, 5), [0, 255, 0, 255]);
        }
        assert_eq!(img.get(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn skips_non_finite_points() {
        let mut img = RgbaImage::new(4, 4);
        draw_polylines(
            &mut img,
            &[line(&[[0.0, 0.0], [f64::NAN, 1.0], [3.0, 3.0]])],
            [255, 255, 255, 255],
        );
        assert!(img.buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn outside_sample_strokes_toward_origin() {
        let mut img = RgbaImage::new(4, 4);
        draw_polylines(
            &mut img,
            &[Polyline {
                axis: GridAxis::Vertical,
                points: vec![Point2D::new(3.0, 3.0), Point2D::OUTSIDE],
            }],
            [255, 0, 0, 255],
        );
        for i in 0..4 {
            assert_eq!(img.get(i, i), [255, 0, 0, 255]);
        }
        assert_eq!(img.get(3, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn single_point_line() {
        let mut img = RgbaImage::new(4, 4);
        draw_polylines(&mut img, &[line(&[[1.0, 2.0]])], [9, 9, 9, 255]);
        assert_eq!(img.get(1, 2), [9, 9, 9, 255]);
    }
}
