//! Pixel-level drawing into an `RgbaImage`
//!
//! Triangles are filled by testing pixel centers against the three edge
//! functions over the triangle's clipped bounding box. Lines are clipped to
//! the image, then walked with Bresenham.

use glam::DVec2;
use image::{Rgba, RgbaImage};

/// Fill a screen-space triangle
///
/// `shade` receives the barycentric weights of each covered pixel center
/// (one per vertex, summing to 1) and returns its color. Winding does not
/// matter; degenerate triangles draw nothing.
pub fn fill_triangle<F>(image: &mut RgbaImage, points: [DVec2; 3], mut shade: F)
where
    F: FnMut([f64; 3]) -> [u8; 4],
{
    let [a, b, c] = points;
    let area = edge(a, b, c);
    if area == 0.0 || !area.is_finite() {
        return;
    }

    let (width, height) = image.dimensions();
    let min = a.min(b).min(c).floor().max(DVec2::ZERO);
    let max = a
        .max(b)
        .max(c)
        .ceil()
        .min(DVec2::new(f64::from(width), f64::from(height)));
    if min.x >= max.x || min.y >= max.y {
        return;
    }

    for y in min.y as u32..max.y as u32 {
        for x in min.x as u32..max.x as u32 {
            let p = DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let w0 = edge(b, c, p) / area;
            let w1 = edge(c, a, p) / area;
            let w2 = edge(a, b, p) / area;

            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                blend(image, x, y, shade([w0, w1, w2]));
            }
        }
    }
}

/// Draw a one-pixel line from `from` to `to`, clipped to the image
pub fn draw_line(image: &mut RgbaImage, from: DVec2, to: DVec2, color: [u8; 4]) {
    if !(from.is_finite() && to.is_finite()) {
        return;
    }

    let (width, height) = image.dimensions();
    // One pixel of slack keeps edge pixels on the same Bresenham path
    let Some((from, to)) = clip_segment(
        from,
        to,
        DVec2::splat(-1.0),
        DVec2::new(f64::from(width) + 1.0, f64::from(height) + 1.0),
    ) else {
        return;
    };

    let (mut x0, mut y0) = (from.x.floor() as i64, from.y.floor() as i64);
    let (x1, y1) = (to.x.floor() as i64, to.y.floor() as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 && x0 < i64::from(width) && y0 < i64::from(height) {
            blend(image, x0 as u32, y0 as u32, color);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Outline a closed polygon
pub fn stroke_polygon(image: &mut RgbaImage, points: &[DVec2], color: [u8; 4]) {
    for (i, &from) in points.iter().enumerate() {
        let to = points[(i + 1) % points.len()];
        draw_line(image, from, to, color);
    }
}

/// Source-over blend of `color` onto the pixel at `(x, y)`
pub fn blend(image: &mut RgbaImage, x: u32, y: u32, color: [u8; 4]) {
    let alpha = u32::from(color[3]);
    if alpha == 255 {
        image.put_pixel(x, y, Rgba(color));
        return;
    }
    if alpha == 0 {
        return;
    }

    let Rgba(dst) = *image.get_pixel(x, y);
    let dst_alpha = u32::from(dst[3]) * (255 - alpha) / 255;
    let out_alpha = alpha + dst_alpha;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let value = (u32::from(color[i]) * alpha + u32::from(dst[i]) * dst_alpha) / out_alpha;
        out[i] = value.min(255) as u8;
    }
    out[3] = out_alpha.min(255) as u8;

    image.put_pixel(x, y, Rgba(out));
}

/// Liang-Barsky clip of the segment `from`-`to` against `[min, max]`
fn clip_segment(from: DVec2, to: DVec2, min: DVec2, max: DVec2) -> Option<(DVec2, DVec2)> {
    let d = to - from;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [
        (-d.x, from.x - min.x),
        (d.x, max.x - from.x),
        (-d.y, from.y - min.y),
        (d.y, max.y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((from + d * t0, from + d * t1))
}

/// Twice the signed area of `(a, b, p)`
#[inline]
fn edge(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn test_fill_covers_interior_only() {
        let mut image = RgbaImage::new(10, 10);
        fill_triangle(
            &mut image,
            [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0)],
            |_| RED,
        );

        assert_eq!(image.get_pixel(1, 1).0, RED);
        assert_eq!(image.get_pixel(9, 9).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_fill_ignores_winding() {
        let mut cw = RgbaImage::new(8, 8);
        let mut ccw = RgbaImage::new(8, 8);
        let (a, b, c) = (DVec2::new(0.0, 0.0), DVec2::new(8.0, 0.0), DVec2::new(0.0, 8.0));

        fill_triangle(&mut cw, [a, b, c], |_| RED);
        fill_triangle(&mut ccw, [a, c, b], |_| RED);
        assert_eq!(cw, ccw);
    }

    #[test]
    fn test_barycentric_weights_sum_to_one() {
        let mut image = RgbaImage::new(16, 16);
        fill_triangle(
            &mut image,
            [DVec2::new(1.0, 1.0), DVec2::new(15.0, 2.0), DVec2::new(4.0, 14.0)],
            |w| {
                assert!((w[0] + w[1] + w[2] - 1.0).abs() < 1e-9);
                RED
            },
        );
    }

    #[test]
    fn test_fill_clips_offscreen() {
        let mut image = RgbaImage::new(4, 4);
        fill_triangle(
            &mut image,
            [DVec2::new(-100.0, -100.0), DVec2::new(100.0, -100.0), DVec2::new(0.0, 100.0)],
            |_| RED,
        );
        assert_eq!(image.get_pixel(2, 2).0, RED);
    }

    #[test]
    fn test_degenerate_triangle_draws_nothing() {
        let mut image = RgbaImage::new(4, 4);
        fill_triangle(
            &mut image,
            [DVec2::new(0.0, 0.0), DVec2::new(2.0, 2.0), DVec2::new(4.0, 4.0)],
            |_| RED,
        );
        assert!(image.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_line_endpoints_and_clipping() {
        let mut image = RgbaImage::new(5, 5);
        draw_line(&mut image, DVec2::new(0.0, 0.0), DVec2::new(4.0, 4.0), RED);
        for i in 0..5 {
            assert_eq!(image.get_pixel(i, i).0, RED);
        }

        draw_line(&mut image, DVec2::new(-10.0, 2.0), DVec2::new(10.0, 2.0), RED);
        assert_eq!(image.get_pixel(0, 2).0, RED);
        assert_eq!(image.get_pixel(4, 2).0, RED);
    }

    #[test]
    fn test_far_offscreen_line_is_clipped() {
        let mut image = RgbaImage::new(6, 6);
        draw_line(&mut image, DVec2::new(-1e12, 3.0), DVec2::new(1e12, 3.0), RED);
        for x in 0..6 {
            assert_eq!(image.get_pixel(x, 3).0, RED);
        }
        assert_eq!(image.get_pixel(0, 2).0, [0, 0, 0, 0]);

        let mut untouched = RgbaImage::new(6, 6);
        draw_line(&mut untouched, DVec2::new(-1e12, -5.0), DVec2::new(1e12, -5.0), RED);
        assert!(untouched.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_clip_segment() {
        let min = DVec2::ZERO;
        let max = DVec2::splat(10.0);

        let (a, b) = clip_segment(DVec2::new(-10.0, 5.0), DVec2::new(30.0, 5.0), min, max).unwrap();
        assert_eq!(a, DVec2::new(0.0, 5.0));
        assert_eq!(b, DVec2::new(10.0, 5.0));

        let inside = (DVec2::new(2.0, 3.0), DVec2::new(7.0, 8.0));
        assert_eq!(clip_segment(inside.0, inside.1, min, max), Some(inside));

        assert!(clip_segment(DVec2::new(-5.0, -1.0), DVec2::new(-1.0, -5.0), min, max).is_none());
    }

    #[test]
    fn test_blend_half_alpha_over_opaque() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 255]));
        blend(&mut image, 0, 0, [255, 0, 0, 128]);
        let [r, g, b, a] = image.get_pixel(0, 0).0;
        assert_eq!(a, 255);
        assert_eq!(g, 0);
        assert!(r > 120 && r < 136, "r = {}", r);
        assert!(b > 120 && b < 136, "b = {}", b);
    }
}
