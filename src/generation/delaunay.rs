//! Delaunay triangulation by incremental Bowyer-Watson insertion
//!
//! Points are inserted left to right into a mesh seeded with an oversized
//! super-triangle. Every candidate triangle carries its circumcircle, and a
//! triangle whose circle lies entirely to the left of the sweep is moved to a
//! closed list so it is never tested again. The open list is scanned linearly
//! for every insertion, which is O(n²) in the worst case; fields hold a few
//! hundred points, so no spatial index is used.

use glam::DVec2;

use crate::error::{FieldError, Result};

/// Tolerance (2⁻²⁰) for the in-circle test and the equal-y special cases
pub const EPSILON: f64 = 1.0 / 1_048_576.0;

/// Super-triangle size in multiples of the bounding box's largest side
const SUPER_TRIANGLE_MARGIN: f64 = 20.0;

/// A candidate triangle together with its circumscribed circle
///
/// Only lives for the duration of one triangulation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circumcircle {
    /// First vertex index
    pub i: usize,
    /// Second vertex index
    pub j: usize,
    /// Third vertex index
    pub k: usize,
    /// Circle center
    pub center: DVec2,
    /// Squared circle radius
    pub radius_squared: f64,
}

impl Circumcircle {
    /// The three vertex indices of the triangle
    #[inline]
    pub fn indices(&self) -> [usize; 3] {
        [self.i, self.j, self.k]
    }
}

/// Compute the circumcircle of the triangle `(i, j, k)`
///
/// The center is the intersection of two perpendicular bisectors. When one pair
/// of points shares a y coordinate its bisector is vertical and is handled
/// directly.
///
/// # Errors
///
/// Returns `CoincidentPoints` when both pairs `(i, j)` and `(j, k)` share a y
/// coordinate within [`EPSILON`].
pub fn circumcircle(points: &[DVec2], i: usize, j: usize, k: usize) -> Result<Circumcircle> {
    let (p1, p2, p3) = (points[i], points[j], points[k]);
    let dy12 = (p1.y - p2.y).abs();
    let dy23 = (p2.y - p3.y).abs();

    if dy12 < EPSILON && dy23 < EPSILON {
        return Err(FieldError::CoincidentPoints { i, j, k });
    }

    let center = if dy12 < EPSILON {
        let m2 = -((p3.x - p2.x) / (p3.y - p2.y));
        let mid2 = (p2 + p3) * 0.5;
        let xc = (p2.x + p1.x) * 0.5;
        DVec2::new(xc, m2 * (xc - mid2.x) + mid2.y)
    } else if dy23 < EPSILON {
        let m1 = -((p2.x - p1.x) / (p2.y - p1.y));
        let mid1 = (p1 + p2) * 0.5;
        let xc = (p3.x + p2.x) * 0.5;
        DVec2::new(xc, m1 * (xc - mid1.x) + mid1.y)
    } else {
        let m1 = -((p2.x - p1.x) / (p2.y - p1.y));
        let m2 = -((p3.x - p2.x) / (p3.y - p2.y));
        let mid1 = (p1 + p2) * 0.5;
        let mid2 = (p2 + p3) * 0.5;
        let xc = (m1 * mid1.x - m2 * mid2.x + mid2.y - mid1.y) / (m1 - m2);
        // Use the better conditioned of the two bisectors for y
        let yc = if dy12 > dy23 {
            m1 * (xc - mid1.x) + mid1.y
        } else {
            m2 * (xc - mid2.x) + mid2.y
        };
        DVec2::new(xc, yc)
    };

    Ok(Circumcircle {
        i,
        j,
        k,
        center,
        radius_squared: p2.distance_squared(center),
    })
}

/// Barycentric containment test
///
/// Returns the barycentric `(u, v)` of `point` relative to edges `b - a` and
/// `c - a`, or `None` when the point lies outside the triangle's bounding box,
/// outside the triangle, or when the triangle has zero area.
///
/// # Example
///
/// ```
/// use glam::DVec2;
/// use triangle_field::generation::contains;
///
/// let triangle = [DVec2::ZERO, DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0)];
/// assert!(contains(triangle, DVec2::new(1.0, 1.0)).is_some());
/// assert!(contains(triangle, DVec2::new(9.0, 9.0)).is_none());
/// ```
pub fn contains(triangle: [DVec2; 3], point: DVec2) -> Option<(f64, f64)> {
    let [a, b, c] = triangle;

    // Quick rejection against the bounding box
    if (point.x < a.x && point.x < b.x && point.x < c.x)
        || (point.x > a.x && point.x > b.x && point.x > c.x)
        || (point.y < a.y && point.y < b.y && point.y < c.y)
        || (point.y > a.y && point.y > b.y && point.y > c.y)
    {
        return None;
    }

    let e1 = b - a;
    let e2 = c - a;
    let det = e1.x * e2.y - e2.x * e1.y;
    if det == 0.0 {
        return None;
    }

    let rel = point - a;
    let u = (e2.y * rel.x - e2.x * rel.y) / det;
    let v = (e1.x * rel.y - e1.y * rel.x) / det;

    if u < 0.0 || v < 0.0 || u + v > 1.0 {
        return None;
    }

    Some((u, v))
}

/// Reusable Bowyer-Watson triangulator
///
/// Keeps its working buffers between calls so that re-triangulating a field
/// every frame does not allocate once the buffers have grown to size.
#[derive(Debug, Clone, Default)]
pub struct Triangulator {
    vertices: Vec<DVec2>,
    order: Vec<usize>,
    open: Vec<Circumcircle>,
    closed: Vec<Circumcircle>,
    edges: Vec<[usize; 2]>,
}

impl Triangulator {
    /// Create a triangulator with empty buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangulate `points`, returning index triples into the slice
    ///
    /// Fewer than three points yield an empty result.
    ///
    /// # Errors
    ///
    /// Propagates `CoincidentPoints` from [`circumcircle`].
    pub fn triangulate(&mut self, points: &[DVec2]) -> Result<Vec<[usize; 3]>> {
        let mut triangles = Vec::new();
        self.triangulate_into(points, &mut triangles)?;
        Ok(triangles)
    }

    /// Triangulate `points` into an existing output buffer
    ///
    /// `triangles` is cleared first. On error its contents are unspecified.
    pub fn triangulate_into(
        &mut self,
        points: &[DVec2],
        triangles: &mut Vec<[usize; 3]>,
    ) -> Result<()> {
        triangles.clear();

        let n = points.len();
        if n < 3 {
            return Ok(());
        }

        self.vertices.clear();
        self.vertices.extend_from_slice(points);

        // Descending x, ties in index order. Consumed from the back.
        self.order.clear();
        self.order.extend(0..n);
        let vertices = &self.vertices;
        self.order
            .sort_by(|&a, &b| vertices[b].x.total_cmp(&vertices[a].x));

        self.vertices.extend_from_slice(&super_triangle(points));

        self.open.clear();
        self.closed.clear();
        self.open.push(circumcircle(&self.vertices, n, n + 1, n + 2)?);

        for &c in self.order.iter().rev() {
            let point = self.vertices[c];
            self.edges.clear();

            let mut j = self.open.len();
            while j > 0 {
                j -= 1;
                let circle = self.open[j];

                // Circle entirely left of the sweep: it can never change again
                let dx = point.x - circle.center.x;
                if dx > 0.0 && dx * dx > circle.radius_squared {
                    self.closed.push(self.open.swap_remove(j));
                    continue;
                }

                let dy = point.y - circle.center.y;
                if dx * dx + dy * dy - circle.radius_squared > EPSILON {
                    continue;
                }

                self.edges.extend_from_slice(&[
                    [circle.i, circle.j],
                    [circle.j, circle.k],
                    [circle.k, circle.i],
                ]);
                self.open.swap_remove(j);
            }

            dedup_edges(&mut self.edges);

            for &[a, b] in &self.edges {
                self.open.push(circumcircle(&self.vertices, a, b, c)?);
            }
        }

        self.closed.append(&mut self.open);

        triangles.extend(
            self.closed
                .iter()
                .filter(|t| t.i < n && t.j < n && t.k < n)
                .map(Circumcircle::indices),
        );

        Ok(())
    }
}

/// Triangulate `points` with a fresh [`Triangulator`]
///
/// # Example
///
/// ```
/// use glam::DVec2;
/// use triangle_field::generation::triangulate;
///
/// let points = [
///     DVec2::new(0.0, 0.0),
///     DVec2::new(10.0, 0.0),
///     DVec2::new(5.0, 5.0),
/// ];
/// let triangles = triangulate(&points).unwrap();
/// assert_eq!(triangles.len(), 1);
/// ```
pub fn triangulate(points: &[DVec2]) -> Result<Vec<[usize; 3]>> {
    Triangulator::new().triangulate(points)
}

/// Three points enclosing the bounding box of `points` with a wide margin
fn super_triangle(points: &[DVec2]) -> [DVec2; 3] {
    let (min, max) = points.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(min, max), &p| (min.min(p), max.max(p)),
    );

    let size = max - min;
    let d = size.max_element();
    let mid = min + size * 0.5;

    [
        DVec2::new(mid.x - SUPER_TRIANGLE_MARGIN * d, mid.y - d),
        DVec2::new(mid.x, mid.y + SUPER_TRIANGLE_MARGIN * d),
        DVec2::new(mid.x + SUPER_TRIANGLE_MARGIN * d, mid.y - d),
    ]
}

/// Remove every edge that appears twice, in either orientation
///
/// What remains is the boundary of the cavity left by the removed triangles.
fn dedup_edges(edges: &mut Vec<[usize; 2]>) {
    let mut j = edges.len();
    while j > 0 {
        j -= 1;
        let [a, b] = edges[j];
        let twin = edges[..j]
            .iter()
            .rposition(|&[m, n]| (a == m && b == n) || (a == n && b == m));

        if let Some(i) = twin {
            edges.remove(j);
            edges.remove(i);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_points(count: usize, seed: u64) -> Vec<DVec2> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..count)
            .map(|_| DVec2::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)))
            .collect()
    }

    fn area(points: &[DVec2], [a, b, c]: [usize; 3]) -> f64 {
        (points[b] - points[a]).perp_dot(points[c] - points[a]).abs() * 0.5
    }

    #[test]
    fn test_fewer_than_three_points() {
        assert!(triangulate(&[]).unwrap().is_empty());
        assert!(triangulate(&[DVec2::ZERO]).unwrap().is_empty());
        assert!(triangulate(&[DVec2::ZERO, DVec2::ONE]).unwrap().is_empty());
    }

    #[test]
    fn test_single_triangle() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(5.0, 5.0),
        ];
        let triangles = triangulate(&points).unwrap();
        assert_eq!(triangles.len(), 1);

        let mut indices = triangles[0];
        indices.sort_unstable();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn test_square_gives_two_triangles() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ];
        let triangles = triangulate(&points).unwrap();
        assert_eq!(triangles.len(), 2);

        // Two halves of the square, no overlap
        let total: f64 = triangles.iter().map(|&t| area(&points, t)).sum();
        assert!((total - 100.0).abs() < 1e-9);
        for &t in &triangles {
            assert!((area(&points, t) - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_indices_valid_and_distinct() {
        let points = random_points(300, 7);
        let triangles = triangulate(&points).unwrap();
        assert!(!triangles.is_empty());

        for [a, b, c] in triangles {
            assert!(a < points.len() && b < points.len() && c < points.len());
            assert!(a != b && b != c && a != c);
        }
    }

    #[test]
    fn test_empty_circumcircle_property() {
        let points = random_points(150, 11);
        let triangles = triangulate(&points).unwrap();

        for &[a, b, c] in &triangles {
            let circle = circumcircle(&points, a, b, c).unwrap();
            for (idx, p) in points.iter().enumerate() {
                if idx == a || idx == b || idx == c {
                    continue;
                }
                let d = p.distance_squared(circle.center) - circle.radius_squared;
                assert!(
                    d > -1e-6 * circle.radius_squared.max(1.0),
                    "point {} lies inside circumcircle of {:?}",
                    idx,
                    [a, b, c]
                );
            }
        }
    }

    #[test]
    fn test_triangle_count_matches_euler() {
        // For points in general position: 2n - 2 - h triangles, h = hull size.
        // A square hull with interior points keeps h = 4.
        let mut points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(100.0, 0.5),
            DVec2::new(99.5, 100.0),
            DVec2::new(0.5, 99.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..40 {
            points.push(DVec2::new(rng.gen_range(10.0..90.0), rng.gen_range(10.0..90.0)));
        }

        let triangles = triangulate(&points).unwrap();
        assert_eq!(triangles.len(), 2 * points.len() - 2 - 4);
    }

    #[test]
    fn test_determinism() {
        let points = random_points(200, 42);
        let first = triangulate(&points).unwrap();
        let second = triangulate(&points).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reused_triangulator_matches_fresh() {
        let mut triangulator = Triangulator::new();
        let warmup = random_points(50, 1);
        triangulator.triangulate(&warmup).unwrap();

        let points = random_points(120, 2);
        let reused = triangulator.triangulate(&points).unwrap();
        let fresh = triangulate(&points).unwrap();
        assert_eq!(reused, fresh);
    }

    #[test]
    fn test_circumcircle_general() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 1.0),
            DVec2::new(1.0, 3.0),
        ];
        let circle = circumcircle(&points, 0, 1, 2).unwrap();
        for p in points {
            assert!((p.distance_squared(circle.center) - circle.radius_squared).abs() < 1e-9);
        }
    }

    #[test]
    fn test_circumcircle_equal_y_pairs() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(1.0, 3.0),
        ];
        let first = circumcircle(&points, 0, 1, 2).unwrap();
        assert!((first.center.x - 2.0).abs() < 1e-12);

        let second = circumcircle(&points, 2, 0, 1).unwrap();
        assert!((second.center - first.center).length() < 1e-9);
    }

    #[test]
    fn test_circumcircle_coincident_y_is_error() {
        let points = [
            DVec2::new(0.0, 5.0),
            DVec2::new(1.0, 5.0),
            DVec2::new(2.0, 5.0),
        ];
        let result = circumcircle(&points, 0, 1, 2);
        assert!(matches!(
            result,
            Err(FieldError::CoincidentPoints { i: 0, j: 1, k: 2 })
        ));
    }

    #[test]
    fn test_contains() {
        let triangle = [DVec2::ZERO, DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0)];

        let (u, v) = contains(triangle, DVec2::new(1.0, 1.0)).unwrap();
        assert!(u >= 0.0 && v >= 0.0);
        assert!(u + v <= 1.0);
        assert!((u - 0.1).abs() < 1e-12);
        assert!((v - 0.1).abs() < 1e-12);

        assert!(contains(triangle, DVec2::new(9.0, 9.0)).is_none());
        assert!(contains(triangle, DVec2::new(-1.0, 2.0)).is_none());
    }

    #[test]
    fn test_contains_degenerate() {
        let triangle = [DVec2::ZERO, DVec2::new(5.0, 5.0), DVec2::new(10.0, 10.0)];
        assert!(contains(triangle, DVec2::new(5.0, 5.0)).is_none());
        assert!(contains(triangle, DVec2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn test_dedup_edges() {
        let mut edges = vec![[0, 1], [1, 2], [2, 0], [2, 1], [1, 3], [3, 2]];
        dedup_edges(&mut edges);
        assert_eq!(edges, vec![[0, 1], [2, 0], [1, 3], [3, 2]]);
    }
}
