//! Brightness-threshold bloom
//!
//! ```text
//! frame ──► bright-pass (luminance > threshold) ──► box blur H/V × passes
//!   ▲                                                      │
//!   └──────────────── frame += blurred · strength ◄────────┘
//! ```
//!
//! Two box-blur passes approximate a Gaussian at a fraction of the cost.

use crate::render::{Framebuffer, Rgb};

/// Bloom pass with its scratch buffers
#[derive(Clone, Debug)]
pub struct Bloom {
    threshold: f32,
    strength: f32,
    radius: usize,
    passes: usize,
    bright: Framebuffer,
    scratch: Framebuffer,
}

impl Bloom {
    /// Create a bloom pass sized for a `width × height` frame
    #[must_use]
    pub fn new(width: usize, height: usize, threshold: f32, strength: f32, radius: usize) -> Self {
        Self {
            threshold,
            strength,
            radius,
            passes: 2,
            bright: Framebuffer::new(width, height),
            scratch: Framebuffer::new(width, height),
        }
    }

    /// Luminance threshold
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Resize the scratch buffers
    pub fn resize(&mut self, width: usize, height: usize) {
        self.bright.resize(width, height);
        self.scratch.resize(width, height);
    }

    /// Add the blurred highlights of `frame` back into it
    pub fn apply(&mut self, frame: &mut Framebuffer) {
        let (width, height) = frame.dimensions();
        self.resize(width, height);

        let mut any_bright = false;
        for (dst, src) in self.bright.pixels_mut().iter_mut().zip(frame.pixels()) {
            if src.luminance() > self.threshold {
                *dst = *src;
                any_bright = true;
            } else {
                *dst = Rgb::BLACK;
            }
        }
        if !any_bright {
            return;
        }

        for _ in 0..self.passes {
            blur_horizontal(&self.bright, &mut self.scratch, self.radius);
            blur_vertical(&self.scratch, &mut self.bright, self.radius);
        }

        for (dst, glow) in frame.pixels_mut().iter_mut().zip(self.bright.pixels()) {
            *dst += *glow * self.strength;
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn blur_horizontal(src: &Framebuffer, dst: &mut Framebuffer, radius: usize) {
    let (width, height) = src.dimensions();
    let norm = 1.0 / (2 * radius + 1) as f32;
    let out = dst.pixels_mut();
    for y in 0..height {
        let row = src.row(y);
        for x in 0..width {
            let mut sum = Rgb::BLACK;
            for k in x.saturating_sub(radius)..=(x + radius).min(width - 1) {
                sum += row[k];
            }
            out[y * width + x] = sum * norm;
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn blur_vertical(src: &Framebuffer, dst: &mut Framebuffer, radius: usize) {
    let (width, height) = src.dimensions();
    let norm = 1.0 / (2 * radius + 1) as f32;
    let input = src.pixels();
    let out = dst.pixels_mut();
    for y in 0..height {
        let lo = y.saturating_sub(radius);
        let hi = (y + radius).min(height - 1);
        for x in 0..width {
            let mut sum = Rgb::BLACK;
            for k in lo..=hi {
                sum += input[k * width + x];
            }
            out[y * width + x] = sum * norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_frame_is_untouched() {
        let mut frame = Framebuffer::new(8, 8);
        frame.clear(Rgb::new(0.3, 0.3, 0.3));
        let before = frame.clone();
        Bloom::new(8, 8, 0.75, 0.8, 2).apply(&mut frame);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_bright_pixel_glows_into_neighbors() {
        let mut frame = Framebuffer::new(15, 15);
        frame.set(7, 7, Rgb::WHITE);
        Bloom::new(15, 15, 0.75, 0.8, 2).apply(&mut frame);
        assert!(frame.get(8, 7).unwrap().r > 0.0);
        assert!(frame.get(7, 9).unwrap().g > 0.0);
        assert!(frame.get(7, 7).unwrap().r > 1.0);
        assert_eq!(frame.get(0, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn test_apply_follows_frame_size() {
        let mut bloom = Bloom::new(4, 4, 0.5, 1.0, 1);
        let mut frame = Framebuffer::new(6, 3);
        frame.set(0, 0, Rgb::WHITE);
        bloom.apply(&mut frame);
        assert!(frame.get(1, 0).unwrap().r > 0.0);
    }
}
