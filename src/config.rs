//! Triangle field configuration and builder
//!
//! Everything the animation reads at runtime lives in one explicit
//! [`FieldConfig`] that is handed to the point field, the mesh builder and the
//! renderers. The core does not re-validate these values; [`FieldConfigBuilder`]
//! is the place where user input gets checked.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};
use crate::mesh::{Color, Side};
use crate::render::RendererKind;

/// Mesh layout and material
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshConfig {
    /// Mesh width as a multiple of the viewport width
    ///
    /// Values above 1.0 push the mesh's border points outside the viewport so
    /// the visible area is always covered.
    pub width_ratio: f64,
    /// Mesh height as a multiple of the viewport height
    pub height_ratio: f64,
    /// Number of interior (animated) points
    pub slices: usize,
    /// Material ambient color
    pub ambient: Color,
    /// Material diffuse color
    pub diffuse: Color,
    /// Triangle outline color; its alpha is the border opacity
    pub border: Color,
    /// Which faces receive diffuse light
    pub side: Side,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            width_ratio: 1.2,
            height_ratio: 1.2,
            slices: 250,
            ambient: Color::from_rgb8(0x33, 0x00, 0xff),
            diffuse: Color::WHITE,
            border: Color::BLACK,
            side: Side::Front,
        }
    }
}

/// Light colors and placement
///
/// The light position is derived from the viewport size, so it follows resizes
/// and exports proportionally.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConfig {
    /// Light ambient color
    pub ambient: Color,
    /// Light diffuse color
    pub diffuse: Color,
    /// x position as a fraction of the viewport width
    pub x_ratio: f64,
    /// y position as a fraction of the viewport height
    pub y_ratio: f64,
    /// Distance from the mesh plane as a fraction of the viewport height
    pub z_ratio: f64,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            ambient: Color::from_rgb8(0x99, 0x99, 0x99),
            diffuse: Color::from_rgb8(0x33, 0xcc, 0xff),
            x_ratio: 0.0,
            y_ratio: -0.5,
            z_ratio: 0.25,
        }
    }
}

/// Point motion parameters
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    /// Longest motion segment, in frames
    pub frames: u32,
    /// Largest displacement per axis for one segment
    pub distance: f64,
    /// Lower bound of segment distance and duration as a fraction of their maximum
    ///
    /// 1.0 gives every segment the full distance range and duration; 0.0
    /// draws both from the whole range down to zero.
    pub randomness: f64,
}

impl MotionConfig {
    /// Frame ceiling for a speed setting in `1..=300`; faster means shorter segments
    pub fn frames_for_speed(speed: u32) -> u32 {
        301u32.saturating_sub(speed).max(1)
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            frames: 100,
            distance: 50.0,
            randomness: 1.0,
        }
    }
}

/// Pointer tracking
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerConfig {
    /// Feed pointer positions into the field's reserved point
    pub detect: bool,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self { detect: true }
    }
}

/// High-resolution export settings
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportConfig {
    /// Export width in pixels
    pub width: u32,
    /// Export height in pixels
    pub height: u32,
    /// Extra point density applied on top of the width scale factor
    pub density_boost: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 1000,
            density_boost: 1.3,
        }
    }
}

/// Complete configuration of an animated triangle field
///
/// The same configuration and seed always produce the same sequence of frames.
///
/// # Example
///
/// ```rust
/// use triangle_field::*;
///
/// let config = FieldConfigBuilder::new()
///     .seed(7)
///     .slices(120)
///     .mesh_ambient("#3300ff").unwrap()
///     .renderer(RendererKind::Vector)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.mesh.slices, 120);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    /// Random seed for point placement and motion
    pub seed: u32,
    /// Mesh layout and material
    pub mesh: MeshConfig,
    /// Light colors and placement
    pub light: LightConfig,
    /// Point motion
    pub motion: MotionConfig,
    /// Pointer tracking
    pub pointer: PointerConfig,
    /// Active backend
    pub renderer: RendererKind,
    /// Export settings
    pub export: ExportConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            seed: rand::random(),
            mesh: MeshConfig::default(),
            light: LightConfig::default(),
            motion: MotionConfig::default(),
            pointer: PointerConfig::default(),
            renderer: RendererKind::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Builder for [`FieldConfig`] with validation
///
/// Setters that take free-form input return `Result<Self>`.
#[derive(Debug, Clone)]
pub struct FieldConfigBuilder {
    seed: Option<u32>,
    mesh: MeshConfig,
    light: LightConfig,
    motion: MotionConfig,
    pointer: PointerConfig,
    renderer: RendererKind,
    export: ExportConfig,
}

impl FieldConfigBuilder {
    /// Create a builder with default values
    ///
    /// Defaults:
    /// - seed: random
    /// - mesh: 1.2 x 1.2 viewport, 250 points, ambient #3300ff, diffuse #ffffff,
    ///   black border, front-sided
    /// - light: ambient #999999, diffuse #33ccff, centered at the bottom edge,
    ///   a quarter of the height above the plane
    /// - motion: 100 frames, 50 units, randomness 1.0
    /// - pointer tracking on, raster renderer, 2000 x 1000 export
    pub fn new() -> Self {
        Self {
            seed: None,
            mesh: MeshConfig::default(),
            light: LightConfig::default(),
            motion: MotionConfig::default(),
            pointer: PointerConfig::default(),
            renderer: RendererKind::default(),
            export: ExportConfig::default(),
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the mesh size relative to the viewport
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless both ratios are finite and positive
    pub fn mesh_size(mut self, width_ratio: f64, height_ratio: f64) -> Result<Self> {
        for ratio in [width_ratio, height_ratio] {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(FieldError::InvalidConfig(format!(
                    "mesh size ratios must be positive (got {} x {})",
                    width_ratio, height_ratio
                )));
            }
        }
        self.mesh.width_ratio = width_ratio;
        self.mesh.height_ratio = height_ratio;
        Ok(self)
    }

    /// Set the number of animated interior points
    pub fn slices(mut self, slices: usize) -> Self {
        self.mesh.slices = slices;
        self
    }

    /// Set the material ambient color from a hex string
    pub fn mesh_ambient(mut self, hex: &str) -> Result<Self> {
        self.mesh.ambient = Color::from_hex(hex, 1.0)?;
        Ok(self)
    }

    /// Set the material diffuse color from a hex string
    pub fn mesh_diffuse(mut self, hex: &str) -> Result<Self> {
        self.mesh.diffuse = Color::from_hex(hex, 1.0)?;
        Ok(self)
    }

    /// Set the border color from a hex string, keeping the current opacity
    pub fn border_color(mut self, hex: &str) -> Result<Self> {
        self.mesh.border = Color::from_hex(hex, self.mesh.border.a())?;
        Ok(self)
    }

    /// Set the border opacity
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if opacity is outside `[0, 1]`
    pub fn border_opacity(mut self, opacity: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(FieldError::InvalidConfig(format!(
                "border opacity must be within [0, 1] (got {})",
                opacity
            )));
        }
        self.mesh.border = self.mesh.border.with_opacity(opacity);
        Ok(self)
    }

    /// Set which faces receive diffuse light
    pub fn side(mut self, side: Side) -> Self {
        self.mesh.side = side;
        self
    }

    /// Set the light ambient color from a hex string
    pub fn light_ambient(mut self, hex: &str) -> Result<Self> {
        self.light.ambient = Color::from_hex(hex, 1.0)?;
        Ok(self)
    }

    /// Set the light diffuse color from a hex string
    pub fn light_diffuse(mut self, hex: &str) -> Result<Self> {
        self.light.diffuse = Color::from_hex(hex, 1.0)?;
        Ok(self)
    }

    /// Set the light position as fractions of the viewport size
    ///
    /// `z_ratio` is measured against the viewport height.
    pub fn light_position(mut self, x_ratio: f64, y_ratio: f64, z_ratio: f64) -> Self {
        self.light.x_ratio = x_ratio;
        self.light.y_ratio = y_ratio;
        self.light.z_ratio = z_ratio;
        self
    }

    /// Set the longest motion segment in frames
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if frames is 0
    pub fn movement_frames(mut self, frames: u32) -> Result<Self> {
        if frames == 0 {
            return Err(FieldError::InvalidConfig(
                "movement frames must be at least 1".to_string(),
            ));
        }
        self.motion.frames = frames;
        Ok(self)
    }

    /// Set the motion speed on a `1..=300` scale (frames = 301 - speed)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if speed is outside `1..=300`
    pub fn movement_speed(mut self, speed: u32) -> Result<Self> {
        if !(1..=300).contains(&speed) {
            return Err(FieldError::InvalidConfig(format!(
                "movement speed must be within 1..=300 (got {})",
                speed
            )));
        }
        self.motion.frames = MotionConfig::frames_for_speed(speed);
        Ok(self)
    }

    /// Set the largest displacement per axis for one segment
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if distance is negative or not finite
    pub fn movement_distance(mut self, distance: f64) -> Result<Self> {
        if !(distance.is_finite() && distance >= 0.0) {
            return Err(FieldError::InvalidConfig(format!(
                "movement distance must be >= 0 (got {})",
                distance
            )));
        }
        self.motion.distance = distance;
        Ok(self)
    }

    /// Set the motion randomness factor
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if randomness is outside `[0, 1]`
    pub fn movement_randomness(mut self, randomness: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&randomness) {
            return Err(FieldError::InvalidConfig(format!(
                "movement randomness must be within [0, 1] (got {})",
                randomness
            )));
        }
        self.motion.randomness = randomness;
        Ok(self)
    }

    /// Enable or disable pointer tracking
    pub fn detect_pointer(mut self, detect: bool) -> Self {
        self.pointer.detect = detect;
        self
    }

    /// Select the active backend
    pub fn renderer(mut self, renderer: RendererKind) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the export resolution
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is 0
    pub fn export_size(mut self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FieldError::InvalidConfig(format!(
                "export size must be non-zero (got {} x {})",
                width, height
            )));
        }
        self.export.width = width;
        self.export.height = height;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, a random one is drawn.
    pub fn build(self) -> Result<FieldConfig> {
        Ok(FieldConfig {
            seed: self.seed.unwrap_or_else(rand::random),
            mesh: self.mesh,
            light: self.light,
            motion: self.motion,
            pointer: self.pointer,
            renderer: self.renderer,
            export: self.export,
        })
    }
}

impl Default for FieldConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = FieldConfigBuilder::new().seed(1).build().unwrap();
        assert_eq!(config.seed, 1);
        assert_eq!(config.mesh.slices, 250);
        assert_eq!(config.mesh.width_ratio, 1.2);
        assert_eq!(config.mesh.side, Side::Front);
        assert_eq!(config.motion.frames, 100);
        assert_eq!(config.motion.distance, 50.0);
        assert_eq!(config.renderer, RendererKind::Raster);
        assert!(config.pointer.detect);
        assert_eq!(config.mesh.ambient.to_hex(), "#3300ff");
        assert_eq!(config.light.diffuse.to_hex(), "#33ccff");
    }

    #[test]
    fn test_builder_custom() {
        let config = FieldConfigBuilder::new()
            .seed(42)
            .slices(80)
            .mesh_size(1.5, 1.1)
            .unwrap()
            .mesh_ambient("#112233")
            .unwrap()
            .border_color("#ffffff")
            .unwrap()
            .border_opacity(0.5)
            .unwrap()
            .side(Side::Double)
            .movement_distance(20.0)
            .unwrap()
            .movement_randomness(0.25)
            .unwrap()
            .detect_pointer(false)
            .renderer(RendererKind::Shader)
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.mesh.slices, 80);
        assert_eq!(config.mesh.width_ratio, 1.5);
        assert_eq!(config.mesh.ambient.to_hex(), "#112233");
        assert_eq!(config.mesh.border.to_hex(), "#ffffff");
        assert_eq!(config.mesh.border.a(), 0.5);
        assert_eq!(config.mesh.side, Side::Double);
        assert_eq!(config.motion.distance, 20.0);
        assert_eq!(config.motion.randomness, 0.25);
        assert!(!config.pointer.detect);
        assert_eq!(config.renderer, RendererKind::Shader);
    }

    #[test]
    fn test_border_color_keeps_opacity() {
        let config = FieldConfigBuilder::new()
            .border_opacity(0.3)
            .unwrap()
            .border_color("#ff0000")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.mesh.border.a(), 0.3);
    }

    #[test]
    fn test_movement_speed_maps_to_frames() {
        let config = FieldConfigBuilder::new()
            .movement_speed(201)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.motion.frames, 100);
        assert_eq!(MotionConfig::frames_for_speed(300), 1);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(FieldConfigBuilder::new().mesh_size(0.0, 1.0).is_err());
        assert!(FieldConfigBuilder::new().mesh_size(1.0, f64::NAN).is_err());
        assert!(FieldConfigBuilder::new().border_opacity(1.5).is_err());
        assert!(FieldConfigBuilder::new().movement_frames(0).is_err());
        assert!(FieldConfigBuilder::new().movement_speed(0).is_err());
        assert!(FieldConfigBuilder::new().movement_speed(301).is_err());
        assert!(FieldConfigBuilder::new().movement_distance(-1.0).is_err());
        assert!(FieldConfigBuilder::new().movement_randomness(1.1).is_err());
        assert!(FieldConfigBuilder::new().export_size(0, 10).is_err());
    }

    #[test]
    fn test_builder_rejects_bad_colors() {
        let result = FieldConfigBuilder::new().mesh_ambient("not a color");
        assert!(matches!(result, Err(FieldError::InvalidColor(_))));
        assert!(FieldConfigBuilder::new().light_diffuse("#12").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = FieldConfigBuilder::new()
            .seed(12345)
            .slices(64)
            .renderer(RendererKind::Vector)
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: FieldConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
