//! Quantum motes spiralling around the dungeon altar

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use super::EntityCore;
use crate::animation::wrap_phase;

/// Motes kept in the pool
pub const QUANTUM_POOL: usize = 24;

const BOB_AMPLITUDE: f32 = 0.5;

/// How much the orbit tightens over a mote's life
const SPIRAL_TIGHTENING: f32 = 0.3;

/// A short-lived shimmering particle on a tightening orbit
#[derive(Clone, Debug)]
pub struct QuantumParticle {
    pub(crate) core: EntityCore,
    center: Vec3,
    radius: f32,
    angular_speed: f32,
    height: f32,
    bob_phase: f32,
}

impl QuantumParticle {
    /// Create an inactive mote orbiting `center`
    #[must_use]
    pub fn new(center: Vec3) -> Self {
        Self {
            core: EntityCore::dormant(3.0),
            center,
            radius: 3.0,
            angular_speed: 1.0,
            height: 1.0,
            bob_phase: 0.0,
        }
    }

    /// Randomize orbit and lifetime, and activate
    pub fn activate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.radius = rng.gen_range(3.0..=9.0);
        self.angular_speed = rng.gen_range(0.6..=1.4);
        self.height = rng.gen_range(0.5..3.0);
        self.bob_phase = rng.gen_range(0.0..TAU);
        self.core.phase = rng.gen_range(0.0..TAU);
        self.core.max_lifetime = rng.gen_range(3.0..=6.0);
        self.core.lifetime = 0.0;
        self.core.opacity = 0.0;
        self.core.active = true;
        self.core.position = self.orbit_position();
    }

    /// Advance along the spiral
    pub fn update(&mut self, dt: f32) {
        if !self.core.active {
            return;
        }
        self.core.lifetime += dt;
        if self.core.lifetime >= self.core.max_lifetime {
            self.core.active = false;
            self.core.opacity = 0.0;
            return;
        }
        self.core.phase = wrap_phase(self.core.phase + self.angular_speed * dt);
        self.core.position = self.orbit_position();
        self.core.opacity = (PI * self.core.lifetime / self.core.max_lifetime).sin();
    }

    fn orbit_position(&self) -> Vec3 {
        let age = if self.core.max_lifetime > 0.0 {
            self.core.lifetime / self.core.max_lifetime
        } else {
            0.0
        };
        let radius = self.radius * (1.0 - SPIRAL_TIGHTENING * age);
        let phase = self.core.phase;
        self.center
            + Vec3::new(
                phase.cos() * radius,
                self.height + BOB_AMPLITUDE * (2.0 * phase + self.bob_phase).sin(),
                phase.sin() * radius,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_opacity_follows_sine_envelope() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut mote = QuantumParticle::new(Vec3::ZERO);
        mote.activate(&mut rng);
        let max = mote.core.max_lifetime;
        mote.update(max / 2.0);
        assert!((mote.core.opacity - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_stays_near_center() {
        let mut rng = StdRng::seed_from_u64(4);
        let center = Vec3::new(0.0, 1.0, 0.0);
        let mut mote = QuantumParticle::new(center);
        mote.activate(&mut rng);
        while mote.core.active {
            mote.update(0.05);
            let offset = mote.core.position - center;
            assert!(offset.x.hypot(offset.z) <= 9.0 + 1e-4);
        }
        assert!(mote.core.opacity.abs() < f32::EPSILON);
    }
}
