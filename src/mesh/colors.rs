//! RGBA colors parsed from and formatted to CSS hex strings

use std::fmt;
use std::str::FromStr;

use glam::Vec4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};

const CHANNEL_SLACK: f32 = 1e-3;

/// Linear RGBA color with channels in `[0, 1]`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red, green, blue, alpha
    pub rgba: Vec4,
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color { rgba: Vec4::new(0.0, 0.0, 0.0, 1.0) };
    /// Opaque white
    pub const WHITE: Color = Color { rgba: Vec4::ONE };
    /// Fully transparent black
    pub const TRANSPARENT: Color = Color { rgba: Vec4::ZERO };

    /// Create a color from channel values
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { rgba: Vec4::new(r, g, b, a) }
    }

    /// Create an opaque color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional) with the given opacity
    ///
    /// Shorthand digits are doubled, so `#3cf` equals `#33ccff`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidColor` for any other length or a non-hex digit.
    pub fn from_hex(hex: &str, opacity: f32) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || FieldError::InvalidColor(hex.to_string());

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let size = match digits.len() {
            3 => 1,
            6 => 2,
            _ => return Err(invalid()),
        };

        let mut channels = [0.0_f32; 3];
        for (i, channel) in channels.iter_mut().enumerate() {
            let part = &digits[i * size..(i + 1) * size];
            let value = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
            let value = if size == 1 { value * 17 } else { value };
            *channel = f32::from(value) / 255.0;
        }

        Ok(Self::new(channels[0], channels[1], channels[2], opacity))
    }

    /// Same color with a different alpha
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self { rgba: self.rgba.truncate().extend(opacity) }
    }

    /// Red channel
    #[inline]
    pub fn r(&self) -> f32 {
        self.rgba.x
    }

    /// Green channel
    #[inline]
    pub fn g(&self) -> f32 {
        self.rgba.y
    }

    /// Blue channel
    #[inline]
    pub fn b(&self) -> f32 {
        self.rgba.z
    }

    /// Alpha channel
    #[inline]
    pub fn a(&self) -> f32 {
        self.rgba.w
    }

    /// Every channel clamped to `[0, 1]`
    pub fn clamped(self) -> Self {
        Self { rgba: self.rgba.clamp(Vec4::ZERO, Vec4::ONE) }
    }

    /// 8-bit channels; each channel rounds up, matching [`Color::to_hex`]
    pub fn to_rgba8(&self) -> [u8; 4] {
        // Absorb f32 noise so that an exact 8-bit value does not round up
        let c = self.clamped().rgba * 255.0 - Vec4::splat(CHANNEL_SLACK);
        [
            c.x.ceil() as u8,
            c.y.ceil() as u8,
            c.z.ceil() as u8,
            c.w.ceil() as u8,
        ]
    }

    /// 8-bit channels with alpha forced to 255
    pub fn to_opaque_rgba8(&self) -> [u8; 4] {
        let [r, g, b, _] = self.to_rgba8();
        [r, g, b, 255]
    }

    /// Format as a lowercase `#rrggbb` string (alpha is dropped)
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<Vec4> for Color {
    fn from(rgba: Vec4) -> Self {
        Self { rgba }
    }
}

impl FromStr for Color {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_hex(s, 1.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
