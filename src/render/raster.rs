//! Immediate-mode bitmap renderer

use image::{Rgba, RgbaImage};

use super::pixels::{fill_triangle, stroke_polygon};
use super::{Renderer, Snapshot, Viewport};
use crate::error::Result;
use crate::mesh::Scene;

/// Draws each triangle into an RGBA bitmap: outline first, then fill
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    viewport: Viewport,
    image: RgbaImage,
}

impl RasterRenderer {
    /// Create a transparent `width` x `height` bitmap
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            image: RgbaImage::new(width, height),
        }
    }

    /// The current frame
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl Renderer for RasterRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        if self.viewport == Viewport::new(width, height) {
            return;
        }
        self.viewport = Viewport::new(width, height);
        self.image = RgbaImage::new(width, height);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    fn render(&mut self, scene: &mut Scene) {
        self.clear();
        scene.update_meshes(true);

        let viewport = self.viewport;
        for mesh in scene.meshes().filter(|mesh| mesh.visible) {
            for triangle in mesh.geometry.triangles().iter().rev() {
                let points = triangle
                    .vertices
                    .map(|v| viewport.to_screen(v.truncate()));
                let fill = triangle.color.to_rgba8();

                stroke_polygon(&mut self.image, &points, triangle.border.to_rgba8());
                fill_triangle(&mut self.image, points, |_| fill);
            }
        }
    }

    fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::Bitmap(self.image.clone()))
    }
}
