//! Pooled shooting stars

use glam::Vec3;
use rand::Rng;

use super::{EntityCore, Trail};
use crate::animation::reference_frames;

/// Shooting stars kept in the pool
pub const SHOOTING_STAR_POOL: usize = 5;

/// Lifetime of one streak in seconds
pub const SHOOTING_STAR_LIFETIME: f32 = 2.0;

/// Samples kept in a streak
pub const SHOOTING_STAR_TRAIL: usize = 20;

const FADE_IN: f32 = 0.2;
const FADE_OUT: f32 = 0.3;

/// A streak across the sky that lives for a fixed time
#[derive(Clone, Debug)]
pub struct ShootingStar {
    pub(crate) core: EntityCore,
    direction: Vec3,
    speed: f32,
    trail: Trail,
}

impl Default for ShootingStar {
    fn default() -> Self {
        Self::new()
    }
}

impl ShootingStar {
    /// Create an inactive star
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: EntityCore::dormant(SHOOTING_STAR_LIFETIME),
            direction: Vec3::NEG_Y,
            speed: 0.0,
            trail: Trail::new(SHOOTING_STAR_TRAIL),
        }
    }

    /// Reset to a random start, direction and speed, and activate
    pub fn activate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.core.position = Vec3::new(
            rng.gen_range(-100.0..100.0),
            rng.gen_range(20.0..70.0),
            rng.gen_range(-100.0..100.0) - 100.0,
        );
        let raw = Vec3::new(
            rng.gen_range(-1.0..1.0),
            -rng.gen_range(0.3..0.8),
            rng.gen_range(-1.0..1.0),
        );
        self.direction = raw.try_normalize().unwrap_or(Vec3::NEG_Y);
        self.speed = rng.gen_range(0.5..1.0);
        self.core.lifetime = 0.0;
        self.core.phase = 0.0;
        self.core.opacity = 0.0;
        self.core.active = true;
        self.trail.clear();
        self.trail.push(self.core.position);
    }

    /// Move along the streak and update the fade envelope
    pub fn update(&mut self, dt: f32) {
        if !self.core.active {
            return;
        }
        self.core.lifetime += dt;
        if self.core.lifetime >= self.core.max_lifetime {
            self.deactivate();
            return;
        }

        self.core.position += self.direction * self.speed * reference_frames(dt);
        self.trail.push(self.core.position);

        let progress = self.core.lifetime / self.core.max_lifetime;
        self.core.phase = progress;
        self.core.opacity = if progress < FADE_IN {
            progress / FADE_IN
        } else if progress > 1.0 - FADE_OUT {
            (1.0 - progress) / FADE_OUT
        } else {
            1.0
        };
    }

    /// Hide and release back to the pool
    pub fn deactivate(&mut self) {
        self.core.active = false;
        self.core.opacity = 0.0;
        self.trail.clear();
    }

    /// Unit direction of travel
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Streak samples
    #[must_use]
    pub fn trail(&self) -> &Trail {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_activation_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut star = ShootingStar::new();
        for _ in 0..50 {
            star.activate(&mut rng);
            let p = star.core.position;
            assert!((-100.0..100.0).contains(&p.x));
            assert!((20.0..70.0).contains(&p.y));
            assert!((-200.0..0.0).contains(&p.z));
            assert!((star.direction().length() - 1.0).abs() < 1e-4);
            assert!(star.direction().y < 0.0);
            assert!((0.5..1.0).contains(&star.speed));
        }
    }

    #[test]
    fn test_fade_envelope() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut star = ShootingStar::new();
        star.activate(&mut rng);

        star.update(0.2);
        assert!((star.core.opacity - 0.5).abs() < 1e-4);
        star.update(0.8);
        assert!((star.core.opacity - 1.0).abs() < f32::EPSILON);
        star.update(0.7);
        assert!((star.core.opacity - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_expiry_hides() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut star = ShootingStar::new();
        star.activate(&mut rng);
        star.update(SHOOTING_STAR_LIFETIME);
        assert!(!star.core.active);
        assert!(star.core.opacity.abs() < f32::EPSILON);
        assert!(star.trail().is_empty());
    }
}
