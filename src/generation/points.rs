//! Point placement for a rectangular field
//!
//! Coordinates are mesh-local: the origin sits at the rectangle's center and y
//! points up. Interior points are sampled strictly inside the rectangle; border
//! points sit exactly on its edges so the triangulation always reaches them.

use glam::DVec2;
use rand::distributions::Open01;
use rand::Rng;

/// Number of extra rounds of random border points (four points per round)
pub const BORDER_ROUNDS: usize = 7;

/// Number of points produced by [`border_points`]
pub const BORDER_POINT_COUNT: usize = 8 + BORDER_ROUNDS * 4;

/// Sample `count` points uniformly, strictly inside a `width` x `height` rectangle
pub fn interior_points<R: Rng>(rng: &mut R, count: usize, width: f64, height: f64) -> Vec<DVec2> {
    let half = DVec2::new(width, height) * 0.5;

    (0..count)
        .map(|_| {
            let x: f64 = rng.sample(Open01);
            let y: f64 = rng.sample(Open01);
            DVec2::new(-half.x + x * width, half.y - y * height)
        })
        .collect()
}

/// Points on the rectangle's edges: the fixed ring (corners and edge midpoints)
/// followed by [`BORDER_ROUNDS`] rounds of random points on each edge
///
/// Without them the triangulation's convex hull would follow the random
/// interior points and leave gaps along the edges.
pub fn border_points<R: Rng>(rng: &mut R, width: f64, height: f64) -> Vec<DVec2> {
    let left = width * -0.5;
    let top = height * 0.5;
    let right = left + width;
    let bottom = top - height;

    let mut points = Vec::with_capacity(BORDER_POINT_COUNT);
    points.extend_from_slice(&[
        DVec2::new(left, top),
        DVec2::new(left + width / 2.0, top),
        DVec2::new(right, top),
        DVec2::new(right, top - height / 2.0),
        DVec2::new(right, bottom),
        DVec2::new(left + width / 2.0, bottom),
        DVec2::new(left, bottom),
        DVec2::new(left, top - height / 2.0),
    ]);

    for _ in 0..BORDER_ROUNDS {
        let t: [f64; 4] = [
            rng.sample(Open01),
            rng.sample(Open01),
            rng.sample(Open01),
            rng.sample(Open01),
        ];
        points.push(DVec2::new(left + t[0] * width, top));
        points.push(DVec2::new(left, top - t[1] * height));
        points.push(DVec2::new(right, top - t[2] * height));
        points.push(DVec2::new(left + t[3] * width, bottom));
    }

    points
}
