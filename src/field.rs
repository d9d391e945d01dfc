//! The animated point field
//!
//! A [`PointField`] owns every point of the mesh in a fixed index layout:
//!
//! | range | points |
//! |-------|--------|
//! | `0..count` | interior points, animated |
//! | `count..count + BORDER_POINT_COUNT` | border points, fixed |
//! | `pointer_index()` | the pointer point |
//!
//! Triangles index into that layout, so the order never changes for the life
//! of a field. Changing the size or point count means building a new field.

use std::time::Instant;

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::MotionConfig;
use crate::error::Result;
use crate::generation::{
    border_points, interior_points, AnimatedVertex, Triangulator, BORDER_POINT_COUNT,
};

/// Interior, border and pointer points plus their current triangulation
#[derive(Debug, Clone)]
pub struct PointField {
    size: DVec2,
    vertices: Vec<AnimatedVertex>,
    border: Vec<DVec2>,
    pointer: DVec2,
    positions: Vec<DVec2>,
    triangles: Vec<[usize; 3]>,
    scratch: Vec<[usize; 3]>,
    triangulator: Triangulator,
    rng: ChaCha8Rng,
}

impl PointField {
    /// Create a `width` x `height` field with `count` animated interior points
    ///
    /// The field is centered on the origin with y pointing up. The pointer point
    /// starts at the origin.
    ///
    /// # Errors
    ///
    /// Returns `CoincidentPoints` if the initial triangulation fails.
    pub fn new(width: f64, height: f64, count: usize, seed: u64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let vertices = interior_points(&mut rng, count, width, height)
            .into_iter()
            .map(AnimatedVertex::new)
            .collect();
        let border = border_points(&mut rng, width, height);

        let mut field = Self {
            size: DVec2::new(width, height),
            vertices,
            border,
            pointer: DVec2::ZERO,
            positions: Vec::with_capacity(count + BORDER_POINT_COUNT + 1),
            triangles: Vec::new(),
            scratch: Vec::new(),
            triangulator: Triangulator::new(),
            rng,
        };

        field.collect_positions();
        field
            .triangulator
            .triangulate_into(&field.positions, &mut field.triangles)?;

        tracing::debug!(
            "Built {}x{} field: {} points, {} triangles",
            width,
            height,
            field.positions.len(),
            field.triangles.len()
        );

        Ok(field)
    }

    /// Advance every interior point by one frame and re-triangulate
    ///
    /// `pointer` is already in mesh-local coordinates; `None` leaves the
    /// pointer point where it was.
    ///
    /// # Errors
    ///
    /// Returns `CoincidentPoints` if the new positions cannot be triangulated.
    /// The points still move, but [`PointField::triangles`] keeps the previous
    /// frame's triangles.
    pub fn advance(&mut self, motion: &MotionConfig, pointer: Option<DVec2>) -> Result<()> {
        let start = Instant::now();
        let bounds = self.size * 0.5;

        for vertex in &mut self.vertices {
            vertex.advance(&mut self.rng, motion, bounds);
        }

        if let Some(pointer) = pointer {
            self.pointer = pointer;
        }

        self.collect_positions();
        self.triangulator
            .triangulate_into(&self.positions, &mut self.scratch)?;
        std::mem::swap(&mut self.triangles, &mut self.scratch);

        tracing::trace!(
            "Advanced field: {} triangles in {:.2?}",
            self.triangles.len(),
            start.elapsed()
        );

        Ok(())
    }

    fn collect_positions(&mut self) {
        self.positions.clear();
        self.positions
            .extend(self.vertices.iter().map(|vertex| vertex.position));
        self.positions.extend_from_slice(&self.border);
        self.positions.push(self.pointer);
    }

    /// Field width and height
    pub fn size(&self) -> DVec2 {
        self.size
    }

    /// Number of animated interior points
    pub fn interior_count(&self) -> usize {
        self.vertices.len()
    }

    /// Index of the pointer point in [`PointField::points`]
    pub fn pointer_index(&self) -> usize {
        self.vertices.len() + self.border.len()
    }

    /// Current pointer point position
    pub fn pointer(&self) -> DVec2 {
        self.pointer
    }

    /// Interior points with their motion state
    pub fn vertices(&self) -> &[AnimatedVertex] {
        &self.vertices
    }

    /// All point positions in index order
    pub fn points(&self) -> &[DVec2] {
        &self.positions
    }

    /// Current triangulation, as index triples into [`PointField::points`]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }
}
