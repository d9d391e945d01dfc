//! Directional lighting for flat-shaded triangles
//!
//! A triangle's brightness is the cosine between its normal and the direction
//! to the light, measured in the plane perpendicular to the screen's x axis:
//! the light is treated as a bar spanning the full viewport width, so moving it
//! left or right changes nothing.

use glam::{DVec2, DVec3};

use super::colors::Color;
use super::Side;
use crate::config::LightConfig;

/// The scene's single light source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Position in mesh-local coordinates (y up, z toward the viewer)
    pub position: DVec3,
    /// Ambient color
    pub ambient: Color,
    /// Diffuse color
    pub diffuse: Color,
}

impl Light {
    /// Create a light at `position`
    pub fn new(position: DVec3, ambient: Color, diffuse: Color) -> Self {
        Self {
            position,
            ambient,
            diffuse,
        }
    }

    /// Place a light for a viewport of the given size
    ///
    /// x and y scale with the viewport's width and height; z scales with its
    /// height.
    pub fn from_config(config: &LightConfig, viewport: DVec2) -> Self {
        Self::new(
            DVec3::new(
                viewport.x * config.x_ratio,
                viewport.y * config.y_ratio,
                viewport.y * config.z_ratio,
            ),
            config.ambient,
            config.diffuse,
        )
    }

    /// Illuminance of a face with `normal` and `centroid` under this light
    pub fn illuminance(&self, normal: DVec3, centroid: DVec3, side: Side) -> f64 {
        illuminance(normal, centroid, self.position, side)
    }
}

/// Surface colors of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Color under ambient light
    pub ambient: Color,
    /// Color under diffuse light
    pub diffuse: Color,
    /// Outline color; alpha is the outline opacity
    pub border: Color,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Color::from_rgb8(0x44, 0x44, 0x44),
            diffuse: Color::WHITE,
            border: Color::BLACK,
        }
    }
}

/// Cosine between `normal` and the direction from `centroid` to `light`
///
/// The x component of the direction is dropped before normalizing. `side`
/// decides which faces count as lit: front faces keep positive values, back
/// faces keep the magnitude of negative values, double-sided faces keep both.
pub fn illuminance(normal: DVec3, centroid: DVec3, light: DVec3, side: Side) -> f64 {
    let mut ray = light - centroid;
    ray.x = 0.0;
    let i = normal.dot(ray.normalize_or_zero());

    match side {
        Side::Front => i.max(0.0),
        Side::Back => i.min(0.0).abs(),
        Side::Double => i.abs(),
    }
}

/// Fill and border colors for a face with the given illuminance
///
/// fill = material.ambient * light.ambient + material.diffuse * light.diffuse * i
///
/// The border is the border color scaled by its own opacity plus the same
/// diffuse term. Both are clamped to `[0, 1]`.
pub fn shade(material: &Material, light: &Light, illuminance: f64) -> (Color, Color) {
    let ambient = material.ambient.rgba * light.ambient.rgba;
    let diffuse = material.diffuse.rgba * light.diffuse.rgba * illuminance as f32;

    let fill = Color::from(ambient + diffuse).clamped();
    let border = Color::from(material.border.rgba * material.border.a() + diffuse).clamped();

    (fill, border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec4;

    fn light() -> Light {
        Light::new(
            DVec3::new(0.0, -100.0, 50.0),
            Color::from_rgb8(0x99, 0x99, 0x99),
            Color::from_rgb8(0x33, 0xcc, 0xff),
        )
    }

    #[test]
    fn test_perpendicular_light_is_dark() {
        // Light in the mesh plane: ray is perpendicular to the face normal
        let i = illuminance(
            DVec3::Z,
            DVec3::ZERO,
            DVec3::new(0.0, 100.0, 0.0),
            Side::Front,
        );
        assert_relative_eq!(i, 0.0);

        let material = Material::default();
        let (fill, _) = shade(&material, &light(), i);
        let expected = (material.ambient.rgba * light().ambient.rgba).clamp(Vec4::ZERO, Vec4::ONE);
        assert_eq!(fill.rgba, expected);
    }

    #[test]
    fn test_light_straight_ahead_is_full() {
        let i = illuminance(DVec3::Z, DVec3::ZERO, DVec3::new(0.0, 0.0, 10.0), Side::Front);
        assert_relative_eq!(i, 1.0);

        let material = Material {
            ambient: Color::new(0.1, 0.1, 0.1, 1.0),
            diffuse: Color::new(0.5, 0.5, 0.5, 1.0),
            border: Color::BLACK,
        };
        let light = Light::new(DVec3::Z, Color::new(0.2, 0.2, 0.2, 1.0), Color::new(0.6, 0.6, 0.6, 1.0));
        let (fill, _) = shade(&material, &light, i);
        assert_relative_eq!(fill.r(), 0.1 * 0.2 + 0.5 * 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_x_offset_is_ignored() {
        let a = illuminance(DVec3::Z, DVec3::ZERO, DVec3::new(0.0, -30.0, 40.0), Side::Front);
        let b = illuminance(DVec3::Z, DVec3::ZERO, DVec3::new(900.0, -30.0, 40.0), Side::Front);
        assert_relative_eq!(a, b);
        assert_relative_eq!(a, 0.8);
    }

    #[test]
    fn test_sidedness() {
        let light = DVec3::new(0.0, 0.0, 10.0);
        let back_normal = -DVec3::Z;

        assert_eq!(illuminance(back_normal, DVec3::ZERO, light, Side::Front), 0.0);
        assert_relative_eq!(illuminance(back_normal, DVec3::ZERO, light, Side::Back), 1.0);
        assert_relative_eq!(illuminance(back_normal, DVec3::ZERO, light, Side::Double), 1.0);
        assert_eq!(illuminance(DVec3::Z, DVec3::ZERO, light, Side::Back), 0.0);
    }

    #[test]
    fn test_light_on_centroid_gives_zero() {
        let i = illuminance(DVec3::Z, DVec3::new(5.0, 5.0, 0.0), DVec3::new(5.0, 5.0, 0.0), Side::Double);
        assert_eq!(i, 0.0);
    }

    #[test]
    fn test_border_blends_diffuse() {
        let material = Material {
            ambient: Color::BLACK,
            diffuse: Color::WHITE,
            border: Color::new(1.0, 0.0, 0.0, 0.5),
        };
        let light = Light::new(DVec3::Z, Color::BLACK, Color::new(0.2, 0.2, 0.2, 1.0));
        let (_, border) = shade(&material, &light, 1.0);

        assert_relative_eq!(border.r(), 0.7, epsilon = 1e-6);
        assert_relative_eq!(border.g(), 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_from_config_scales_with_viewport() {
        let config = LightConfig::default();
        let light = Light::from_config(&config, DVec2::new(800.0, 600.0));
        assert_eq!(light.position, DVec3::new(0.0, -300.0, 150.0));
    }
}
