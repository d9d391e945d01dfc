//! Animated fields of lit triangles
//!
//! A set of points wanders slowly inside a rectangle, is re-triangulated
//! (Delaunay) every frame, and each triangle is flat-shaded by a directional
//! light. The result is drawn by one of three interchangeable backends: a
//! raster bitmap, a shader-style vertex pipeline, or SVG markup.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use triangle_field::*;
//!
//! let config = FieldConfigBuilder::new()
//!     .seed(42)
//!     .slices(250)
//!     .mesh_ambient("#3300ff").unwrap()
//!     .light_diffuse("#33ccff").unwrap()
//!     .build().unwrap();
//!
//! let mut animator = Animator::new(config, 1280, 720).unwrap();
//! animator.step(60);
//!
//! // Save the current frame, then a high-resolution export
//! animator.snapshot().unwrap().save("frame.png").unwrap();
//! animator.export(3840, 2160).unwrap().save("export.png").unwrap();
//! ```
//!
//! The triangulator can also be used on its own:
//!
//! ```rust
//! use triangle_field::generation::triangulate;
//! use glam::DVec2;
//!
//! let square = [
//!     DVec2::new(0.0, 0.0),
//!     DVec2::new(10.0, 0.0),
//!     DVec2::new(10.0, 10.0),
//!     DVec2::new(0.0, 10.0),
//! ];
//! assert_eq!(triangulate(&square).unwrap().len(), 2);
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration types

// Modules
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod generation;
pub mod mesh;
pub mod render;

// Re-export core types for convenience
pub use config::{
    ExportConfig, FieldConfig, FieldConfigBuilder, LightConfig, MeshConfig, MotionConfig,
    PointerConfig,
};
pub use driver::Animator;
pub use error::{FieldError, Result};
pub use field::PointField;
pub use generation::{triangulate, Triangulator};
pub use mesh::{Color, Geometry, Light, Material, Mesh, Scene, ShadedTriangle, Side};
pub use render::{Backend, Renderer, RendererKind, Snapshot, Viewport};

// Re-export glam vectors used throughout the API
pub use glam::{DVec2, DVec3};
