//! Linear RGB color used by the framebuffer and every post-process pass

use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

/// Linear RGB color with unbounded channels
///
/// Channels may exceed 1.0 while a frame is being composed (additive
/// splats, emissive boosts); they are clamped only when presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
}

impl Rgb {
    /// Pure black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// Pure white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a color from channels
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` value
    #[must_use]
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| f32::from(((hex >> shift) & 0xFF) as u8) / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Create a color from hue, saturation and lightness, each in `[0, 1]`
    #[must_use]
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(1.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        if s == 0.0 {
            return Self::new(l, l, l);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f32| {
            let t = t.rem_euclid(1.0);
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };
        Self::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
    }

    /// Pack into `0xRRGGBB`, clamping each channel
    #[must_use]
    pub fn to_hex(self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }

    /// Clamp to `[0, 1]` and quantize to 8 bits per channel
    #[must_use]
    pub fn to_rgb8(self) -> [u8; 3] {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    /// Rec. 709 relative luminance
    #[must_use]
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Per-channel maximum
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.r.max(other.r), self.g.max(other.g), self.b.max(other.b))
    }

    /// Linear interpolation toward `other`
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }
}

impl Add for Rgb {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Rgb {
    fn add_assign(&mut self, rhs: Self) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl Mul<f32> for Rgb {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let c = Rgb::from_hex(0xFF8000);
        assert!((c.r - 1.0).abs() < f32::EPSILON);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert!(c.b.abs() < f32::EPSILON);
        assert_eq!(c.to_hex(), 0xFF8000);
    }

    #[test]
    fn test_from_hsl_primaries() {
        assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5).to_hex(), 0xFF0000);
        assert_eq!(Rgb::from_hsl(1.0 / 3.0, 1.0, 0.5).to_hex(), 0x00FF00);
        assert_eq!(Rgb::from_hsl(0.5, 0.0, 0.5).to_hex(), 0x808080);
    }

    #[test]
    fn test_luminance_weights() {
        assert!((Rgb::WHITE.luminance() - 1.0).abs() < 1e-6);
        assert!(Rgb::from_hex(0x00FF00).luminance() > Rgb::from_hex(0xFF0000).luminance());
    }

    #[test]
    fn test_max_is_per_channel() {
        let a = Rgb::new(0.2, 0.9, 0.1);
        let b = Rgb::new(0.5, 0.1, 0.1);
        assert_eq!(a.max(b), Rgb::new(0.5, 0.9, 0.1));
    }

    #[test]
    fn test_rgb8_clamps() {
        assert_eq!(Rgb::new(2.0, -1.0, 0.5).to_rgb8(), [255, 0, 128]);
    }
}
