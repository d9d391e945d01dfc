//! Animation driver
//!
//! [`Animator`] owns the point field, the scene and the active backend, and
//! runs one frame per call: advance the points, re-triangulate, rebuild the
//! mesh, render.

use std::time::Instant;

use glam::DVec2;

use crate::config::FieldConfig;
use crate::error::{FieldError, Result};
use crate::field::PointField;
use crate::mesh::{Light, Mesh, MeshId, Scene};
use crate::render::{
    Backend, GraphicsDevice, Renderer, RendererKind, ShaderRenderer, Snapshot, Viewport,
};

/// An animated triangle field bound to a viewport and a backend
///
/// # Example
///
/// ```
/// use triangle_field::*;
///
/// let config = FieldConfigBuilder::new()
///     .seed(42)
///     .slices(60)
///     .renderer(RendererKind::Vector)
///     .build()
///     .unwrap();
///
/// let mut animator = Animator::new(config, 320, 200).unwrap();
/// animator.set_pointer(160.0, 100.0);
/// animator.step(5);
///
/// let svg = animator.snapshot().unwrap();
/// assert!(svg.as_svg().is_some());
/// ```
#[derive(Debug)]
pub struct Animator {
    config: FieldConfig,
    viewport: Viewport,
    field: PointField,
    scene: Scene,
    mesh: MeshId,
    backend: Backend,
    pointer: Option<DVec2>,
    frames: u64,
}

impl Animator {
    /// Create an animator for a `width` x `height` viewport
    ///
    /// The backend is chosen by `config.renderer`; the shader backend runs
    /// on the CPU.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero-sized viewport and propagates
    /// triangulation errors from the initial field.
    pub fn new(config: FieldConfig, width: u32, height: u32) -> Result<Self> {
        let backend = Backend::new(config.renderer, width, height);
        Self::with_backend(config, width, height, backend)
    }

    /// Create an animator drawing through a specific graphics device
    ///
    /// `device` is the outcome of creating the device. On error the shader
    /// backend stays unsupported and frames still animate but draw nothing.
    pub fn with_device(
        config: FieldConfig,
        width: u32,
        height: u32,
        device: Result<Box<dyn GraphicsDevice>>,
    ) -> Result<Self> {
        let backend = Backend::Shader(ShaderRenderer::with_device(device, width, height));
        let mut config = config;
        config.renderer = RendererKind::Shader;
        Self::with_backend(config, width, height, backend)
    }

    fn with_backend(config: FieldConfig, width: u32, height: u32, backend: Backend) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FieldError::InvalidConfig(format!(
                "viewport must be non-zero (got {} x {})",
                width, height
            )));
        }

        let viewport = Viewport::new(width, height);
        let field = build_field(&config, viewport, config.mesh.slices)?;

        let mut scene = Scene::new();
        let mesh = scene.add(Mesh::from_config(&config.mesh));
        scene.set_light(Light::from_config(&config.light, viewport.size()));

        if !backend.is_supported() {
            tracing::warn!("{:?} backend unsupported, frames will not be drawn", backend.kind());
        }

        tracing::info!(
            "Triangle field {}x{}: {} points, {:?} backend, seed {}",
            width,
            height,
            field.points().len(),
            backend.kind(),
            config.seed
        );

        let mut animator = Self {
            config,
            viewport,
            field,
            scene,
            mesh,
            backend,
            pointer: None,
            frames: 0,
        };
        animator.rebuild_geometry();
        Ok(animator)
    }

    /// Advance and draw one frame
    ///
    /// A frame whose points cannot be triangulated logs an error and is drawn
    /// with the previous frame's triangles.
    pub fn frame(&mut self) {
        let start = Instant::now();

        let pointer = if self.config.pointer.detect {
            self.pointer.take()
        } else {
            None
        };

        self.advance_and_render(pointer);
        self.frames += 1;

        tracing::trace!("Frame {} in {:.2?}", self.frames, start.elapsed());
    }

    /// Run `count` frames
    pub fn step(&mut self, count: usize) {
        for _ in 0..count {
            self.frame();
        }
    }

    /// Run frames until `keep_going` returns false
    ///
    /// The callback sees the animator after each frame, so it can read
    /// snapshots, feed pointer input or change settings between frames.
    pub fn run<F>(&mut self, mut keep_going: F)
    where
        F: FnMut(&mut Self) -> bool,
    {
        loop {
            self.frame();
            if !keep_going(self) {
                break;
            }
        }
    }

    /// Resize the viewport and rebuild the field at the new size
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero size and propagates triangulation
    /// errors from the new field.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(FieldError::InvalidConfig(format!(
                "viewport must be non-zero (got {} x {})",
                width, height
            )));
        }

        let viewport = Viewport::new(width, height);
        self.field = build_field(&self.config, viewport, self.config.mesh.slices)?;
        self.viewport = viewport;
        self.backend.set_size(width, height);
        self.place_light();
        self.rebuild_geometry();

        tracing::debug!("Resized to {}x{}", width, height);
        Ok(())
    }

    /// Switch to another backend; the animation continues where it was
    pub fn set_renderer(&mut self, kind: RendererKind) {
        if self.backend.kind() == kind {
            return;
        }
        self.set_backend(Backend::new(kind, self.viewport.width, self.viewport.height));
    }

    /// Replace the active backend
    pub fn set_backend(&mut self, mut backend: Backend) {
        backend.set_size(self.viewport.width, self.viewport.height);
        if !backend.is_supported() {
            tracing::warn!("{:?} backend unsupported, frames will not be drawn", backend.kind());
        }
        tracing::debug!("Switched from {:?} to {:?}", self.backend.kind(), backend.kind());

        self.config.renderer = backend.kind();
        self.backend = backend;
        // A fresh backend has no uploaded buffers
        if let Some(mesh) = self.scene.mesh_mut(self.mesh) {
            mesh.geometry.mark_dirty();
        }
    }

    /// Record a pointer position in screen coordinates for the next frame
    ///
    /// Ignored while pointer tracking is disabled.
    pub fn set_pointer(&mut self, x: f64, y: f64) {
        if self.config.pointer.detect {
            self.pointer = Some(self.viewport.to_local(DVec2::new(x, y)));
        }
    }

    /// Drop a pointer position that has not been consumed yet
    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    /// Capture the last drawn frame
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if the backend cannot produce output.
    pub fn snapshot(&self) -> Result<Snapshot> {
        self.backend.snapshot()
    }

    /// Render one frame at `width` x `height` and capture it
    ///
    /// Point density grows with the width ratio (plus the configured boost)
    /// so the export looks as dense as the live view; the light follows the
    /// new size through its ratios. Viewport, field, light, pending pointer
    /// and frame count are left as they were, and the live frame is redrawn,
    /// whether or not the capture succeeded.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero size, propagates triangulation
    /// errors from the export field and `BackendUnavailable` from the backend.
    pub fn export(&mut self, width: u32, height: u32) -> Result<Snapshot> {
        if width == 0 || height == 0 {
            return Err(FieldError::InvalidConfig(format!(
                "export size must be non-zero (got {} x {})",
                width, height
            )));
        }

        let export_viewport = Viewport::new(width, height);
        let scale = f64::from(width) / f64::from(self.viewport.width);
        let slices =
            (self.config.mesh.slices as f64 * scale * self.config.export.density_boost).ceil() as usize;

        let export_field = build_field(&self.config, export_viewport, slices)?;
        let live_field = std::mem::replace(&mut self.field, export_field);
        let live_viewport = std::mem::replace(&mut self.viewport, export_viewport);

        tracing::info!("Exporting {}x{} with {} points", width, height, slices);

        self.backend.set_size(width, height);
        self.place_light();
        self.advance_and_render(None);
        let snapshot = self.backend.snapshot();

        self.field = live_field;
        self.viewport = live_viewport;
        self.backend.set_size(live_viewport.width, live_viewport.height);
        self.place_light();
        self.rebuild_geometry();
        // Resizing dropped the live frame; draw it again without advancing
        self.backend.render(&mut self.scene);

        snapshot
    }

    /// Export at the configured export size
    pub fn export_default(&mut self) -> Result<Snapshot> {
        self.export(self.config.export.width, self.config.export.height)
    }

    /// Apply a new configuration
    ///
    /// Colors, sidedness, light, motion and pointer settings take effect on
    /// the next frame. A changed point count or mesh size rebuilds the field;
    /// a changed renderer swaps the backend.
    ///
    /// # Errors
    ///
    /// Propagates triangulation errors when the field is rebuilt; the
    /// previous field is kept in that case.
    pub fn update_config(&mut self, config: FieldConfig) -> Result<()> {
        let rebuild = config.mesh.slices != self.config.mesh.slices
            || config.mesh.width_ratio != self.config.mesh.width_ratio
            || config.mesh.height_ratio != self.config.mesh.height_ratio
            || config.seed != self.config.seed;

        if rebuild {
            self.field = build_field(&config, self.viewport, config.mesh.slices)?;
        }
        if !config.pointer.detect {
            self.pointer = None;
        }

        let renderer = config.renderer;
        self.config = config;

        if let Some(mesh) = self.scene.mesh_mut(self.mesh) {
            mesh.apply_config(&self.config.mesh);
        }
        self.place_light();
        self.set_renderer(renderer);
        self.rebuild_geometry();
        Ok(())
    }

    /// Change the number of animated points, rebuilding the field
    pub fn set_slices(&mut self, slices: usize) -> Result<()> {
        let mut config = self.config;
        config.mesh.slices = slices;
        self.update_config(config)
    }

    /// Current configuration
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The animated points
    pub fn field(&self) -> &PointField {
        &self.field
    }

    /// Meshes and light
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The field's mesh
    pub fn mesh(&self) -> Option<&Mesh> {
        self.scene.mesh(self.mesh)
    }

    /// The active backend
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Frames drawn so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    fn place_light(&mut self) {
        self.scene
            .set_light(Light::from_config(&self.config.light, self.viewport.size()));
    }

    fn advance_and_render(&mut self, pointer: Option<DVec2>) {
        if let Err(e) = self.field.advance(&self.config.motion, pointer) {
            tracing::error!("Frame {}: keeping previous triangles: {}", self.frames, e);
        }

        self.rebuild_geometry();
        self.backend.render(&mut self.scene);
    }

    fn rebuild_geometry(&mut self) {
        if let Some(mesh) = self.scene.mesh_mut(self.mesh) {
            mesh.geometry.rebuild(&self.field);
        }
    }
}

/// Build a field covering the viewport scaled by the mesh ratios
fn build_field(config: &FieldConfig, viewport: Viewport, slices: usize) -> Result<PointField> {
    let size = viewport.size() * DVec2::new(config.mesh.width_ratio, config.mesh.height_ratio);
    PointField::new(size.x, size.y, slices, u64::from(config.seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfigBuilder;
    use crate::generation::BORDER_POINT_COUNT;
    use crate::mesh::Side;
    use approx::assert_relative_eq;

    fn config(renderer: RendererKind) -> FieldConfig {
        FieldConfigBuilder::new()
            .seed(7)
            .slices(40)
            .renderer(renderer)
            .build()
            .unwrap()
    }

    #[test]
    fn test_frames_advance() {
        let mut animator = Animator::new(config(RendererKind::Raster), 120, 80).unwrap();
        animator.step(3);

        assert_eq!(animator.frame_count(), 3);
        let mesh = animator.mesh().unwrap();
        assert_eq!(mesh.geometry.triangle_count(), animator.field().triangles().len());
    }

    #[test]
    fn test_zero_viewport_rejected() {
        assert!(Animator::new(config(RendererKind::Raster), 0, 10).is_err());
    }

    #[test]
    fn test_pointer_moves_reserved_point() {
        let mut animator = Animator::new(config(RendererKind::Raster), 200, 100).unwrap();
        animator.set_pointer(150.0, 20.0);
        animator.frame();

        let field = animator.field();
        assert_eq!(field.points()[field.pointer_index()], DVec2::new(50.0, 30.0));
        assert_eq!(field.pointer_index(), 40 + BORDER_POINT_COUNT);
    }

    #[test]
    fn test_pointer_ignored_when_disabled() {
        let config = FieldConfigBuilder::new()
            .seed(7)
            .slices(10)
            .detect_pointer(false)
            .build()
            .unwrap();
        let mut animator = Animator::new(config, 200, 100).unwrap();
        animator.set_pointer(150.0, 20.0);
        animator.frame();

        assert_eq!(animator.field().pointer(), DVec2::ZERO);
    }

    #[test]
    fn test_switch_backend_keeps_animation() {
        let mut animator = Animator::new(config(RendererKind::Raster), 100, 60).unwrap();
        animator.step(2);
        let points = animator.field().points().to_vec();

        animator.set_renderer(RendererKind::Vector);
        assert_eq!(animator.backend().kind(), RendererKind::Vector);
        assert_eq!(animator.config().renderer, RendererKind::Vector);
        assert_eq!(animator.field().points(), points.as_slice());

        animator.frame();
        assert!(animator.snapshot().unwrap().as_svg().is_some());
    }

    #[test]
    fn test_resize_rebuilds_field() {
        let mut animator = Animator::new(config(RendererKind::Raster), 100, 50).unwrap();
        animator.resize(300, 200).unwrap();

        assert_eq!(animator.viewport(), Viewport::new(300, 200));
        assert_relative_eq!(animator.field().size().x, 360.0, epsilon = 1e-9);
        assert_relative_eq!(animator.field().size().y, 240.0, epsilon = 1e-9);
        let light = animator.scene().light().unwrap();
        assert_eq!(light.position.y, -100.0);
    }

    #[test]
    fn test_export_restores_state() {
        let mut animator = Animator::new(config(RendererKind::Raster), 100, 50).unwrap();
        animator.step(2);
        let points = animator.field().points().to_vec();
        let light = *animator.scene().light().unwrap();

        let snapshot = animator.export(200, 100).unwrap();
        assert_eq!(snapshot.as_bitmap().unwrap().dimensions(), (200, 100));

        assert_eq!(animator.viewport(), Viewport::new(100, 50));
        assert_eq!(animator.field().points(), points.as_slice());
        assert_eq!(*animator.scene().light().unwrap(), light);
        assert_eq!(animator.backend().viewport(), Viewport::new(100, 50));
    }

    #[test]
    fn test_export_keeps_pointer_and_frame() {
        let mut animator = Animator::new(config(RendererKind::Raster), 200, 100).unwrap();
        animator.step(2);
        let before = animator.snapshot().unwrap();

        animator.set_pointer(150.0, 20.0);
        animator.export(400, 200).unwrap();

        assert_eq!(animator.frame_count(), 2);
        assert_eq!(animator.snapshot().unwrap(), before);

        animator.frame();
        assert_eq!(animator.frame_count(), 3);
        assert_eq!(animator.field().pointer(), DVec2::new(50.0, 30.0));
    }

    #[test]
    fn test_export_scales_density() {
        let mut animator = Animator::new(config(RendererKind::Vector), 100, 50).unwrap();
        let export = animator.export(200, 100).unwrap();
        let svg = export.as_svg().unwrap();
        assert!(svg.contains(r#"width="200""#));

        // 40 * 2 * 1.3
        assert!(svg.matches("<polygon").count() > 104);
        assert_eq!(animator.field().interior_count(), 40);

        let live = animator.snapshot().unwrap();
        assert!(live.as_svg().unwrap().contains(r#"width="100""#));
    }

    #[test]
    fn test_unsupported_device_still_animates() {
        let mut animator = Animator::with_device(
            config(RendererKind::Shader),
            64,
            64,
            Err(FieldError::BackendUnavailable("no context".to_string())),
        )
        .unwrap();

        animator.step(2);
        assert_eq!(animator.frame_count(), 2);
        assert!(!animator.backend().is_supported());
        assert!(animator.snapshot().is_err());
        assert!(animator.export(128, 128).is_err());
        assert_eq!(animator.viewport(), Viewport::new(64, 64));
    }

    #[test]
    fn test_update_config_applies_material() {
        let mut animator = Animator::new(config(RendererKind::Raster), 100, 60).unwrap();
        let mut updated = *animator.config();
        updated.mesh.side = Side::Double;
        updated.mesh.slices = 12;
        updated.renderer = RendererKind::Shader;
        animator.update_config(updated).unwrap();

        assert_eq!(animator.mesh().unwrap().side, Side::Double);
        assert_eq!(animator.field().interior_count(), 12);
        assert_eq!(animator.backend().kind(), RendererKind::Shader);

        animator.set_slices(20).unwrap();
        assert_eq!(animator.field().interior_count(), 20);
    }
}
