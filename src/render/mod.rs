//! Render backends
//!
//! Every backend implements [`Renderer`] and consumes a [`Scene`]:
//! - [`RasterRenderer`]: immediate-mode drawing into an RGBA bitmap
//! - [`ShaderRenderer`]: per-vertex attribute buffers and a vertex program run
//!   on a [`GraphicsDevice`]
//! - [`VectorRenderer`]: persistent SVG polygons
//!
//! [`Backend`] holds whichever one is active and forwards to it.
//!
//! Meshes are in local coordinates (origin at the viewport center, y up).
//! [`Viewport::to_screen`] maps them to pixels (origin top-left, y down).

mod pixels;
mod raster;
mod shader;
mod vector;

pub use raster::RasterRenderer;
pub use shader::{
    vertex_program, GraphicsDevice, ShaderRenderer, SoftwareDevice, Uniforms, VertexAttributes,
    VertexOutput,
};
pub use vector::VectorRenderer;

use std::fs;
use std::path::Path;

use glam::DVec2;
use image::RgbaImage;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mesh::Scene;

/// Backend selector
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RendererKind {
    /// Bitmap drawn triangle by triangle
    #[default]
    Raster,
    /// Vertex program over attribute buffers
    Shader,
    /// SVG markup
    Vector,
}

/// Size of a render target in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height as a vector
    pub fn size(&self) -> DVec2 {
        DVec2::new(f64::from(self.width), f64::from(self.height))
    }

    /// Half of width and height
    pub fn half(&self) -> DVec2 {
        self.size() * 0.5
    }

    /// Screen position (origin top-left, y down) to local (origin center, y up)
    pub fn to_local(&self, screen: DVec2) -> DVec2 {
        let half = self.half();
        DVec2::new(screen.x - half.x, half.y - screen.y)
    }

    /// Local position to screen position
    pub fn to_screen(&self, local: DVec2) -> DVec2 {
        let half = self.half();
        DVec2::new(half.x + local.x, half.y - local.y)
    }
}

/// A captured frame
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// Pixels from the raster or shader backend
    Bitmap(RgbaImage),
    /// Markup from the vector backend
    Svg(String),
}

impl Snapshot {
    /// Write the frame to `path`: PNG for bitmaps, SVG markup otherwise
    ///
    /// # Errors
    ///
    /// Returns `Image` if PNG encoding fails or `Io` if the file cannot be
    /// written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        match self {
            Snapshot::Bitmap(image) => image.save_with_format(path, image::ImageFormat::Png)?,
            Snapshot::Svg(markup) => fs::write(path, markup)?,
        }
        Ok(())
    }

    /// File extension matching [`Snapshot::save`]'s output
    pub fn extension(&self) -> &'static str {
        match self {
            Snapshot::Bitmap(_) => "png",
            Snapshot::Svg(_) => "svg",
        }
    }

    /// Pixels, if this is a bitmap
    pub fn as_bitmap(&self) -> Option<&RgbaImage> {
        match self {
            Snapshot::Bitmap(image) => Some(image),
            Snapshot::Svg(_) => None,
        }
    }

    /// Markup, if this is SVG
    pub fn as_svg(&self) -> Option<&str> {
        match self {
            Snapshot::Bitmap(_) => None,
            Snapshot::Svg(markup) => Some(markup),
        }
    }
}

/// A sink for scenes
pub trait Renderer {
    /// Resize the render target
    fn set_size(&mut self, width: u32, height: u32);

    /// Current render target size
    fn viewport(&self) -> Viewport;

    /// Erase everything drawn so far
    fn clear(&mut self);

    /// Draw the scene, updating its meshes as needed
    fn render(&mut self, scene: &mut Scene);

    /// Whether this backend can produce output
    fn is_supported(&self) -> bool {
        true
    }

    /// Capture the current frame
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if the backend cannot produce output.
    fn snapshot(&self) -> Result<Snapshot>;
}

/// The active backend
#[derive(Debug)]
pub enum Backend {
    /// See [`RasterRenderer`]
    Raster(RasterRenderer),
    /// See [`ShaderRenderer`]
    Shader(ShaderRenderer),
    /// See [`VectorRenderer`]
    Vector(VectorRenderer),
}

impl Backend {
    /// Create a backend of the given kind
    ///
    /// The shader backend runs on a [`SoftwareDevice`].
    pub fn new(kind: RendererKind, width: u32, height: u32) -> Self {
        match kind {
            RendererKind::Raster => Backend::Raster(RasterRenderer::new(width, height)),
            RendererKind::Shader => Backend::Shader(ShaderRenderer::new(width, height)),
            RendererKind::Vector => Backend::Vector(VectorRenderer::new(width, height)),
        }
    }

    /// Which backend this is
    pub fn kind(&self) -> RendererKind {
        match self {
            Backend::Raster(_) => RendererKind::Raster,
            Backend::Shader(_) => RendererKind::Shader,
            Backend::Vector(_) => RendererKind::Vector,
        }
    }

    fn renderer(&self) -> &dyn Renderer {
        match self {
            Backend::Raster(r) => r,
            Backend::Shader(r) => r,
            Backend::Vector(r) => r,
        }
    }

    fn renderer_mut(&mut self) -> &mut dyn Renderer {
        match self {
            Backend::Raster(r) => r,
            Backend::Shader(r) => r,
            Backend::Vector(r) => r,
        }
    }
}

impl Renderer for Backend {
    fn set_size(&mut self, width: u32, height: u32) {
        self.renderer_mut().set_size(width, height);
    }

    fn viewport(&self) -> Viewport {
        self.renderer().viewport()
    }

    fn clear(&mut self) {
        self.renderer_mut().clear();
    }

    fn render(&mut self, scene: &mut Scene) {
        self.renderer_mut().render(scene);
    }

    fn is_supported(&self) -> bool {
        self.renderer().is_supported()
    }

    fn snapshot(&self) -> Result<Snapshot> {
        self.renderer().snapshot()
    }
}
