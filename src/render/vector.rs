//! SVG renderer
//!
//! Keeps one polygon record per drawn triangle and rewrites its `points` and
//! `style` attributes in place each frame, the way a retained document tree
//! would be updated. Records are reused by drawing position, so a steady
//! triangle count allocates nothing after the first frame.

use std::fmt::Write;

use super::{Renderer, Snapshot, Viewport};
use crate::error::Result;
use crate::mesh::Scene;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// One `<polygon>` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polygon {
    /// `points` attribute, screen coordinates
    pub points: String,
    /// `style` attribute
    pub style: String,
}

/// Renders scenes to SVG markup
#[derive(Debug, Clone)]
pub struct VectorRenderer {
    viewport: Viewport,
    polygons: Vec<Polygon>,
}

impl VectorRenderer {
    /// Create an empty `width` x `height` document
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            polygons: Vec::new(),
        }
    }

    /// Polygons in document order
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Serialize the document
    pub fn markup(&self) -> String {
        let mut svg = String::with_capacity(128 + self.polygons.len() * 160);
        let _ = write!(
            svg,
            r#"<svg xmlns="{}" version="1.1" width="{}" height="{}">"#,
            SVG_NS, self.viewport.width, self.viewport.height
        );
        for polygon in &self.polygons {
            let _ = write!(
                svg,
                r#"<polygon stroke-linejoin="round" stroke-miterlimit="1" stroke-width="1" points="{}" style="{}"/>"#,
                polygon.points, polygon.style
            );
        }
        svg.push_str("</svg>");
        svg
    }
}

impl Renderer for VectorRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self) {
        self.polygons.clear();
    }

    fn render(&mut self, scene: &mut Scene) {
        scene.update_meshes(true);

        let viewport = self.viewport;
        let mut drawn = 0;

        for mesh in scene.meshes().filter(|mesh| mesh.visible) {
            for triangle in mesh.geometry.triangles().iter().rev() {
                if drawn == self.polygons.len() {
                    self.polygons.push(Polygon::default());
                }
                let polygon = &mut self.polygons[drawn];
                drawn += 1;

                polygon.points.clear();
                for (i, vertex) in triangle.vertices.iter().enumerate() {
                    let p = viewport.to_screen(vertex.truncate());
                    let separator = if i == 0 { "" } else { " " };
                    let _ = write!(polygon.points, "{}{},{}", separator, p.x, p.y);
                }

                let color = triangle.color.to_hex();
                polygon.style.clear();
                let _ = write!(polygon.style, "fill:{};stroke:{};", color, color);
            }
        }

        self.polygons.truncate(drawn);
    }

    fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::Svg(self.markup()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Color, Geometry, Light, Material, Mesh, ShadedTriangle};
    use glam::DVec3;

    fn triangle(offset: f64) -> ShadedTriangle {
        ShadedTriangle::new(
            DVec3::new(offset, 0.0, 0.0),
            DVec3::new(offset + 10.0, 0.0, 0.0),
            DVec3::new(offset, 10.0, 0.0),
        )
    }

    fn scene(count: usize) -> Scene {
        let triangles = (0..count).map(|i| triangle(i as f64)).collect();
        let material = Material {
            ambient: Color::from_rgb8(0xff, 0x00, 0x00),
            diffuse: Color::BLACK,
            border: Color::BLACK,
        };
        let mut scene = Scene::new();
        scene.add(Mesh::new(Geometry::from_triangles(triangles), material));
        scene.set_light(Light::new(DVec3::Z, Color::WHITE, Color::WHITE));
        scene
    }

    #[test]
    fn test_polygon_attributes() {
        let mut renderer = VectorRenderer::new(100, 50);
        renderer.render(&mut scene(1));

        let polygon = &renderer.polygons()[0];
        assert_eq!(polygon.points, "50,25 60,25 50,15");
        assert_eq!(polygon.style, "fill:#ff0000;stroke:#ff0000;");
    }

    #[test]
    fn test_markup() {
        let mut renderer = VectorRenderer::new(100, 50);
        renderer.render(&mut scene(2));

        let svg = renderer.markup();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="100" height="50">"#));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<polygon").count(), 2);
    }

    #[test]
    fn test_polygons_reused_across_frames() {
        let mut renderer = VectorRenderer::new(100, 50);
        let mut scene = scene(3);

        renderer.render(&mut scene);
        let first: Vec<*const u8> = renderer.polygons().iter().map(|p| p.points.as_ptr()).collect();

        renderer.render(&mut scene);
        let second: Vec<*const u8> = renderer.polygons().iter().map(|p| p.points.as_ptr()).collect();

        assert_eq!(renderer.polygons().len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_polygon_count_follows_triangles() {
        let mut renderer = VectorRenderer::new(100, 50);
        renderer.render(&mut scene(4));
        assert_eq!(renderer.polygons().len(), 4);

        renderer.render(&mut scene(2));
        assert_eq!(renderer.polygons().len(), 2);

        renderer.clear();
        assert!(renderer.polygons().is_empty());
    }
}
