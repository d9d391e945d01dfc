//! Shader-style renderer
//!
//! Mirrors how a GPU pipeline would draw the field: the host flattens every
//! visible mesh into per-vertex attribute buffers, uploads them only when the
//! geometry changed, sets the light uniforms, and issues a single draw call.
//! Shading happens per vertex in [`vertex_program`], which repeats the host
//! lighting math so the two agree.
//!
//! The device is abstracted behind [`GraphicsDevice`]. [`SoftwareDevice`] runs
//! the vertex program on the CPU and rasterizes the result.

use std::fmt;

use glam::{DVec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};

use super::pixels::fill_triangle;
use super::{Renderer, Snapshot, Viewport};
use crate::error::{FieldError, Result};
use crate::mesh::{Color, Scene, Side};

/// Inputs of one vertex
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexAttributes {
    /// [`Side::index`] of the owning mesh
    pub side: u8,
    /// Vertex position
    pub position: Vec3,
    /// Centroid of the owning triangle
    pub centroid: Vec3,
    /// Normal of the owning triangle
    pub normal: Vec3,
    /// Material ambient color
    pub ambient: Vec4,
    /// Material diffuse color
    pub diffuse: Vec4,
}

/// Per-draw constants
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Uniforms {
    /// Viewport width, height, width
    pub resolution: Vec3,
    /// Light position
    pub light_position: Vec3,
    /// Light ambient color
    pub light_ambient: Vec4,
    /// Light diffuse color
    pub light_diffuse: Vec4,
}

/// Output of [`vertex_program`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    /// Normalized device coordinates, each axis in `[-1, 1]` when on screen
    pub position: Vec3,
    /// Shaded color
    pub color: Vec4,
}

/// Position and color of one vertex
///
/// Equivalent to [`crate::mesh::illuminance`] followed by
/// [`crate::mesh::shade`]'s fill, in single precision.
pub fn vertex_program(vertex: &VertexAttributes, uniforms: &Uniforms) -> VertexOutput {
    let position = vertex.position / uniforms.resolution * 2.0;

    let mut ray = uniforms.light_position - vertex.centroid;
    ray.x = 0.0;
    let i = vertex.normal.dot(ray.normalize_or_zero());
    let i = match Side::from_index(vertex.side) {
        Some(Side::Front) | None => i.max(0.0),
        Some(Side::Back) => i.min(0.0).abs(),
        Some(Side::Double) => i.abs(),
    };

    let color = vertex.ambient * uniforms.light_ambient + vertex.diffuse * uniforms.light_diffuse * i;

    VertexOutput {
        position,
        color: color.clamp(Vec4::ZERO, Vec4::ONE),
    }
}

/// A target that accepts vertex buffers and draws them
pub trait GraphicsDevice {
    /// Resize the drawing surface
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear color and depth
    fn clear(&mut self);

    /// Replace the vertex buffer
    fn upload(&mut self, vertices: &[VertexAttributes]);

    /// Draw the first `count` uploaded vertices as a triangle list
    fn draw(&mut self, uniforms: &Uniforms, count: usize);

    /// Copy the surface back to the host, if the device allows it
    fn read_pixels(&self) -> Option<RgbaImage>;
}

/// CPU implementation of [`GraphicsDevice`]
#[derive(Debug, Clone)]
pub struct SoftwareDevice {
    surface: RgbaImage,
    buffer: Vec<VertexAttributes>,
}

impl SoftwareDevice {
    /// Create a transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: RgbaImage::new(width, height),
            buffer: Vec::new(),
        }
    }
}

impl GraphicsDevice for SoftwareDevice {
    fn set_viewport(&mut self, width: u32, height: u32) {
        if self.surface.dimensions() != (width, height) {
            self.surface = RgbaImage::new(width, height);
        }
    }

    fn clear(&mut self) {
        self.surface.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    fn upload(&mut self, vertices: &[VertexAttributes]) {
        self.buffer.clear();
        self.buffer.extend_from_slice(vertices);
    }

    fn draw(&mut self, uniforms: &Uniforms, count: usize) {
        let (width, height) = self.surface.dimensions();
        let size = DVec2::new(f64::from(width), f64::from(height));
        let count = count.min(self.buffer.len());

        for triangle in self.buffer[..count].chunks_exact(3) {
            let out = [
                vertex_program(&triangle[0], uniforms),
                vertex_program(&triangle[1], uniforms),
                vertex_program(&triangle[2], uniforms),
            ];

            // NDC to pixels, y down
            let points = out.map(|v| {
                DVec2::new(
                    (f64::from(v.position.x) + 1.0) * 0.5 * size.x,
                    (1.0 - f64::from(v.position.y)) * 0.5 * size.y,
                )
            });

            fill_triangle(&mut self.surface, points, |w| {
                let color = out[0].color * w[0] as f32
                    + out[1].color * w[1] as f32
                    + out[2].color * w[2] as f32;
                Color::from(color).to_rgba8()
            });
        }
    }

    fn read_pixels(&self) -> Option<RgbaImage> {
        Some(self.surface.clone())
    }
}

/// Renderer that feeds a [`GraphicsDevice`]
///
/// Created without a device, it reports itself unsupported and every
/// operation does nothing.
pub struct ShaderRenderer {
    device: Option<Box<dyn GraphicsDevice>>,
    viewport: Viewport,
    attributes: Vec<VertexAttributes>,
    vertex_count: Option<usize>,
    uploads: usize,
}

impl ShaderRenderer {
    /// Create a renderer on a [`SoftwareDevice`]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_device(Ok(Box::new(SoftwareDevice::new(width, height))), width, height)
    }

    /// Create a renderer from the result of creating a device
    ///
    /// A failed device leaves the renderer unsupported.
    pub fn with_device(
        device: Result<Box<dyn GraphicsDevice>>,
        width: u32,
        height: u32,
    ) -> Self {
        let device = match device {
            Ok(mut device) => {
                device.set_viewport(width, height);
                Some(device)
            }
            Err(e) => {
                tracing::warn!("Shader renderer unsupported: {}", e);
                None
            }
        };

        Self {
            device,
            viewport: Viewport::new(width, height),
            attributes: Vec::new(),
            vertex_count: None,
            uploads: 0,
        }
    }

    /// Number of times vertex buffers were rebuilt and uploaded
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Vertices in the last upload
    pub fn vertex_count(&self) -> usize {
        self.vertex_count.unwrap_or(0)
    }

    fn rebuild_attributes(&mut self, scene: &Scene) {
        self.attributes.clear();

        for mesh in scene.meshes().filter(|mesh| mesh.visible) {
            let side = mesh.side.index();
            let ambient = mesh.material.ambient.rgba;
            let diffuse = mesh.material.diffuse.rgba;

            for triangle in mesh.geometry.triangles() {
                let centroid = triangle.centroid.as_vec3();
                let normal = triangle.normal.as_vec3();

                for vertex in triangle.vertices {
                    self.attributes.push(VertexAttributes {
                        side,
                        position: vertex.as_vec3(),
                        centroid,
                        normal,
                        ambient,
                        diffuse,
                    });
                }
            }
        }
    }
}

impl fmt::Debug for ShaderRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderRenderer")
            .field("supported", &self.device.is_some())
            .field("viewport", &self.viewport)
            .field("vertex_count", &self.vertex_count)
            .field("uploads", &self.uploads)
            .finish()
    }
}

impl Renderer for ShaderRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        if let Some(device) = self.device.as_mut() {
            device.set_viewport(width, height);
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self) {
        if let Some(device) = self.device.as_mut() {
            device.clear();
        }
    }

    fn render(&mut self, scene: &mut Scene) {
        if self.device.is_none() {
            return;
        }
        self.clear();

        let Some(light) = scene.light().copied() else {
            return;
        };

        let mut changed = false;
        let mut vertices = 0;
        for mesh in scene.meshes_mut().filter(|mesh| mesh.visible) {
            changed |= mesh.geometry.is_dirty();
            mesh.update(Some(&light), false);
            vertices += mesh.geometry.vertex_count();
        }

        if changed || self.vertex_count != Some(vertices) {
            self.rebuild_attributes(scene);
            if let Some(device) = self.device.as_mut() {
                device.upload(&self.attributes);
            }
            self.vertex_count = Some(vertices);
            self.uploads += 1;
            tracing::trace!("Uploaded {} vertices", vertices);
        }

        let size = self.viewport.size().as_vec2();
        let uniforms = Uniforms {
            resolution: Vec3::new(size.x, size.y, size.x),
            light_position: light.position.as_vec3(),
            light_ambient: light.ambient.rgba,
            light_diffuse: light.diffuse.rgba,
        };

        if let Some(device) = self.device.as_mut() {
            device.draw(&uniforms, vertices);
        }
    }

    fn is_supported(&self) -> bool {
        self.device.is_some()
    }

    fn snapshot(&self) -> Result<Snapshot> {
        self.device
            .as_ref()
            .and_then(|device| device.read_pixels())
            .map(Snapshot::Bitmap)
            .ok_or_else(|| FieldError::BackendUnavailable("no graphics device".to_string()))
    }
}
