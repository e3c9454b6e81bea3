//! Orbiting comets

use glam::Vec3;

use super::{EntityCore, Trail};
use crate::animation::{reference_frames, wrap_phase};
use crate::render::Rgb;

/// Samples kept in a comet tail
pub const COMET_TAIL_LENGTH: usize = 30;

/// Vertical amplitude of the comet's figure-eight wobble
const WOBBLE: f32 = 3.0;

/// Orbit parameters of one comet
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CometSpec {
    /// Orbit radius
    pub radius: f32,
    /// Angular speed in radians per reference frame
    pub speed: f32,
    /// Head color
    pub color: u32,
    /// Starting angle
    pub phase: f32,
}

/// The four comets circling the orb scene
pub const COMETS: [CometSpec; 4] = [
    CometSpec {
        radius: 35.0,
        speed: 0.008,
        color: 0xFF_FF_FF,
        phase: 0.0,
    },
    CometSpec {
        radius: 45.0,
        speed: 0.006,
        color: 0x88_DD_FF,
        phase: std::f32::consts::PI,
    },
    CometSpec {
        radius: 55.0,
        speed: 0.005,
        color: 0xFF_88_DD,
        phase: std::f32::consts::FRAC_PI_2,
    },
    CometSpec {
        radius: 40.0,
        speed: 0.007,
        color: 0xAA_FF_88,
        phase: 3.0 * std::f32::consts::FRAC_PI_2,
    },
];

/// A comet on a retrograde orbit with a fading tail
#[derive(Clone, Debug)]
pub struct Comet {
    pub(crate) core: EntityCore,
    spec: CometSpec,
    color: Rgb,
    trail: Trail,
}

impl Comet {
    /// Place a comet at its starting angle
    #[must_use]
    pub fn new(spec: CometSpec) -> Self {
        let mut comet = Self {
            core: EntityCore::always_active(),
            spec,
            color: Rgb::from_hex(spec.color),
            trail: Trail::new(COMET_TAIL_LENGTH),
        };
        comet.reset();
        comet
    }

    /// Return to the starting angle with an empty tail
    pub fn reset(&mut self) {
        self.core.phase = wrap_phase(self.spec.phase);
        self.core.position = Self::orbit_position(self.core.phase, self.spec.radius);
        self.core.lifetime = 0.0;
        self.core.active = true;
        self.core.opacity = 1.0;
        self.trail.clear();
    }

    /// Advance the orbit
    pub fn update(&mut self, dt: f32) {
        self.core.lifetime += dt;
        self.core.phase = wrap_phase(self.core.phase - self.spec.speed * reference_frames(dt));
        self.core.position = Self::orbit_position(self.core.phase, self.spec.radius);
        self.trail.push(self.core.position);
    }

    /// Head color
    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Tail samples
    #[must_use]
    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    fn orbit_position(angle: f32, radius: f32) -> Vec3 {
        Vec3::new(
            angle.cos() * radius,
            (angle * 2.0).sin() * WOBBLE,
            angle.sin() * radius,
        )
    }
}
