//! Additive rasterization primitives
//!
//! Everything is blended additively: overlapping glows brighten, and the
//! bloom pass picks up whatever crosses the luminance threshold.

use super::{Framebuffer, Rgb, ScreenPoint};

/// Lines longer than this many steps are treated as degenerate and skipped
const MAX_LINE_STEPS: f32 = 8192.0;

/// Draw a soft round splat centered at `(cx, cy)`
///
/// Intensity falls off quadratically from the center to `radius`. Splats
/// smaller than a pixel deposit their color into the nearest pixel.
#[allow(clippy::cast_possible_truncation)]
pub fn splat(target: &mut Framebuffer, cx: f32, cy: f32, radius: f32, color: Rgb) {
    if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) {
        return;
    }
    if radius <= 0.75 {
        target.blend_add(cx.floor() as i32, cy.floor() as i32, color);
        return;
    }

    let r = radius.min(512.0);
    let x0 = (cx - r).floor() as i32;
    let x1 = (cx + r).ceil() as i32;
    let y0 = (cy - r).floor() as i32;
    let y1 = (cy + r).ceil() as i32;
    let inv_r2 = 1.0 / (r * r);

    for y in y0.max(0)..=y1 {
        for x in x0.max(0)..=x1 {
            #[allow(clippy::cast_precision_loss)]
            let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
            let d2 = (dx * dx + dy * dy) * inv_r2;
            if d2 < 1.0 {
                let falloff = (1.0 - d2) * (1.0 - d2);
                target.blend_add(x, y, color * falloff);
            }
        }
    }
}

/// Draw a line with a DDA walk, interpolating between two colors
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn line(target: &mut Framebuffer, a: ScreenPoint, b: ScreenPoint, from: Rgb, to: Rgb) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let steps = dx.abs().max(dy.abs()).ceil();
    if !steps.is_finite() || steps > MAX_LINE_STEPS {
        return;
    }
    if steps < 1.0 {
        target.blend_add(a.x.floor() as i32, a.y.floor() as i32, from);
        return;
    }

    let (sx, sy) = (dx / steps, dy / steps);
    let count = steps as i32;
    for i in 0..=count {
        let t = i as f32 / steps;
        let x = a.x + sx * i as f32;
        let y = a.y + sy * i as f32;
        target.blend_add(x.floor() as i32, y.floor() as i32, from.lerp(to, t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32) -> ScreenPoint {
        ScreenPoint { x, y, depth: 1.0 }
    }

    #[test]
    fn test_tiny_splat_hits_one_pixel() {
        let mut fb = Framebuffer::new(4, 4);
        splat(&mut fb, 1.2, 2.7, 0.5, Rgb::WHITE);
        assert_eq!(fb.get(1, 2), Some(Rgb::WHITE));
        let lit = fb.pixels().iter().filter(|p| **p != Rgb::BLACK).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_splat_is_brightest_in_center() {
        let mut fb = Framebuffer::new(16, 16);
        splat(&mut fb, 8.0, 8.0, 4.0, Rgb::WHITE);
        let center = fb.get(7, 7).unwrap().r;
        let edge = fb.get(10, 7).unwrap().r;
        assert!(center > edge);
        assert_eq!(fb.get(0, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn test_horizontal_line_covers_span() {
        let mut fb = Framebuffer::new(10, 3);
        line(&mut fb, point(1.0, 1.0), point(8.0, 1.0), Rgb::WHITE, Rgb::WHITE);
        for x in 1..=8 {
            assert_ne!(fb.get(x, 1), Some(Rgb::BLACK), "pixel {x} unlit");
        }
        assert_eq!(fb.get(1, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn test_offscreen_line_does_not_panic() {
        let mut fb = Framebuffer::new(4, 4);
        line(&mut fb, point(-50.0, -50.0), point(50.0, 50.0), Rgb::WHITE, Rgb::BLACK);
        line(&mut fb, point(f32::NAN, 0.0), point(1.0, 1.0), Rgb::WHITE, Rgb::WHITE);
        assert!(fb.get(2, 2).unwrap().r > 0.0);
    }
}
