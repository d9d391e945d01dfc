//! Mesh assembly for the triangle field
//!
//! Turns a [`PointField`] snapshot into flat-shaded triangles that any backend
//! can draw:
//! - [`Geometry`] holds the triangles and their derived centroid and normal
//! - [`Mesh`] pairs geometry with a [`Material`] and a [`Side`] policy and
//!   recolors it under a [`Light`]
//! - [`Scene`] is the unit handed to a renderer

mod colors;
mod light;
mod scene;

pub use colors::Color;
pub use light::{illuminance, shade, Light, Material};
pub use scene::{MeshId, Scene};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::DVec3;

use crate::config::MeshConfig;
use crate::field::PointField;

/// Which faces of a triangle receive diffuse light
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Faces whose normal points toward the light
    #[default]
    Front,
    /// Faces whose normal points away from the light
    Back,
    /// Both
    Double,
}

impl Side {
    /// Integer code used in shader vertex attributes
    pub fn index(self) -> u8 {
        match self {
            Side::Front => 0,
            Side::Back => 1,
            Side::Double => 2,
        }
    }

    /// Inverse of [`Side::index`]
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Side::Front),
            1 => Some(Side::Back),
            2 => Some(Side::Double),
            _ => None,
        }
    }
}

/// One triangle with its derived geometry and current colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedTriangle {
    /// Vertex positions (z = 0)
    pub vertices: [DVec3; 3],
    /// Mean of the three vertices
    pub centroid: DVec3,
    /// Unit normal, `(b - a) x (c - a)`
    pub normal: DVec3,
    /// Fill color
    pub color: Color,
    /// Outline color
    pub border: Color,
}

impl ShadedTriangle {
    /// Create a triangle and compute its centroid and normal
    pub fn new(a: DVec3, b: DVec3, c: DVec3) -> Self {
        let mut triangle = Self {
            vertices: [a, b, c],
            centroid: DVec3::ZERO,
            normal: DVec3::ZERO,
            color: Color::TRANSPARENT,
            border: Color::TRANSPARENT,
        };
        triangle.compute_centroid();
        triangle.compute_normal();
        triangle
    }

    /// Recompute the centroid from the vertices
    pub fn compute_centroid(&mut self) {
        let [a, b, c] = self.vertices;
        self.centroid = (a + b + c) / 3.0;
    }

    /// Recompute the normal from the vertices
    ///
    /// Degenerate triangles get a zero normal, which shades as unlit.
    pub fn compute_normal(&mut self) {
        let [a, b, c] = self.vertices;
        self.normal = (b - a).cross(c - a).normalize_or_zero();
    }
}

/// Triangles of a mesh plus a flag that tracks pending vertex changes
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    triangles: Vec<ShadedTriangle>,
    dirty: bool,
}

impl Geometry {
    /// Create empty geometry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create dirty geometry from existing triangles
    pub fn from_triangles(triangles: Vec<ShadedTriangle>) -> Self {
        Self {
            triangles,
            dirty: true,
        }
    }

    /// Rebuild every triangle from the field's current triangulation
    ///
    /// Vertices are snapped up to whole units. Triangles are stored last to
    /// first with their vertex order reversed, so the normal of index triple
    /// `[i, j, k]` is `(p[j] - p[k]) x (p[i] - p[k])`. The geometry is always
    /// left dirty.
    pub fn rebuild(&mut self, field: &PointField) {
        let points = field.points();
        let snap = |index: usize| {
            let p = points[index];
            DVec3::new(p.x.ceil(), p.y.ceil(), 0.0)
        };

        self.triangles.clear();
        self.triangles.extend(
            field
                .triangles()
                .iter()
                .rev()
                .map(|&[i, j, k]| ShadedTriangle::new(snap(k), snap(j), snap(i))),
        );
        self.dirty = true;
    }

    /// Recompute centroids and normals if any vertex changed
    pub fn update(&mut self) {
        if self.dirty {
            for triangle in &mut self.triangles {
                triangle.compute_centroid();
                triangle.compute_normal();
            }
            self.dirty = false;
        }
    }

    /// Whether vertices changed since the last [`Geometry::update`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the geometry as changed
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// All triangles
    pub fn triangles(&self) -> &[ShadedTriangle] {
        &self.triangles
    }

    /// Mutable triangles; marks the geometry dirty
    pub fn triangles_mut(&mut self) -> &mut [ShadedTriangle] {
        self.dirty = true;
        &mut self.triangles
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of vertices when drawn as an unindexed triangle list
    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// Check if there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// Geometry with a material and a sidedness policy
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Triangles
    pub geometry: Geometry,
    /// Surface colors
    pub material: Material,
    /// Which faces are lit
    pub side: Side,
    /// Hidden meshes are skipped by every renderer
    pub visible: bool,
}

impl Mesh {
    /// Create a visible, front-sided mesh
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            side: Side::Front,
            visible: true,
        }
    }

    /// Create an empty mesh from configuration
    pub fn from_config(config: &MeshConfig) -> Self {
        let mut mesh = Self::new(
            Geometry::new(),
            Material {
                ambient: config.ambient,
                diffuse: config.diffuse,
                border: config.border,
            },
        );
        mesh.side = config.side;
        mesh
    }

    /// Apply material and side from configuration, leaving geometry intact
    pub fn apply_config(&mut self, config: &MeshConfig) {
        self.material = Material {
            ambient: config.ambient,
            diffuse: config.diffuse,
            border: config.border,
        };
        self.side = config.side;
    }

    /// Refresh geometry and, when `calculate` is set, recolor every triangle
    ///
    /// Without a light the triangles keep their previous colors.
    pub fn update(&mut self, light: Option<&Light>, calculate: bool) {
        self.geometry.update();

        if !calculate {
            return;
        }
        let Some(light) = light else {
            return;
        };

        for triangle in &mut self.geometry.triangles {
            let i = light.illuminance(triangle.normal, triangle.centroid, self.side);
            let (fill, border) = shade(&self.material, light, i);
            triangle.color = fill;
            triangle.border = border;
        }
    }
}
