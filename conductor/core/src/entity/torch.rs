//! Flickering wall torches

use glam::Vec3;
use rand::Rng;

use super::EntityCore;

/// Largest intensity a flame can reach
pub const MAX_INTENSITY: f32 = 1.5;

const BASE_INTENSITY: f32 = 1.0;

/// Expected jitter impulses per second
const JITTER_RATE: f64 = 2.0;

const JITTER_MAX: f32 = 0.25;

/// Exponential decay rate of the jitter impulse, per second
const JITTER_DECAY: f32 = 6.0;

/// How far the flame tip rises per unit of intensity
const FLAME_LIFT: f32 = 0.3;

/// An always-active flame whose intensity flickers
#[derive(Clone, Debug)]
pub struct TorchFlame {
    pub(crate) core: EntityCore,
    base: Vec3,
    jitter: f32,
    intensity: f32,
}

impl TorchFlame {
    /// Mount a flame at `base` with a flicker phase offset
    #[must_use]
    pub fn new(base: Vec3, phase: f32) -> Self {
        let mut core = EntityCore::always_active();
        core.phase = phase;
        core.position = base;
        Self {
            core,
            base,
            jitter: 0.0,
            intensity: BASE_INTENSITY,
        }
    }

    /// Clear accumulated jitter and restart the flicker clock
    pub fn reset(&mut self) {
        self.core.lifetime = 0.0;
        self.core.active = true;
        self.jitter = 0.0;
        self.intensity = BASE_INTENSITY;
        self.core.position = self.base;
    }

    /// Advance the flicker
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.core.lifetime += dt;
        if rng.gen_bool((JITTER_RATE * f64::from(dt)).clamp(0.0, 1.0)) {
            self.jitter += rng.gen_range(0.0..=JITTER_MAX);
        }
        self.jitter *= (-JITTER_DECAY * dt).exp();

        let t = self.core.lifetime;
        let phi = self.core.phase;
        self.intensity = (BASE_INTENSITY
            + 0.15 * (7.3 * t + phi).sin()
            + 0.1 * (13.1 * t + 2.0 * phi).sin()
            + self.jitter)
            .clamp(0.0, MAX_INTENSITY);
        self.core.opacity = self.intensity.min(1.0);
        self.core.position = self.base + Vec3::Y * (FLAME_LIFT * self.intensity);
    }

    /// Current flicker intensity in `[0, 1.5]`
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Mount point
    #[must_use]
    pub fn base(&self) -> Vec3 {
        self.base
    }
}
