//! Animated Entities - Pooled, Self-Contained Parametric Motion
//!
//! Every moving decoration in the scene is an [`AnimatedEntity`]: a tagged
//! value that owns its own state and exposes the same lifecycle.
//!
//! ```text
//!             activate(rng)                  lifetime >= max
//!  dormant ─────────────────► active ──────────────────────► dormant
//!  (opacity 0,                (update(dt) advances          (opacity 0,
//!   not updated)               phase + position)             recyclable)
//! ```
//!
//! Comets and torch flames never expire. Shooting stars and quantum motes
//! are recycled through an [`EntityPool`]: activation picks uniformly among
//! inactive members of the requested kind and silently skips the cycle if
//! all are busy.

mod comet;
mod pool;
mod quantum;
mod shooting_star;
mod torch;
mod trail;

pub use comet::{Comet, CometSpec, COMETS, COMET_TAIL_LENGTH};
pub use pool::EntityPool;
pub use quantum::{QuantumParticle, QUANTUM_POOL};
pub use shooting_star::{
    ShootingStar, SHOOTING_STAR_LIFETIME, SHOOTING_STAR_POOL, SHOOTING_STAR_TRAIL,
};
pub use torch::{TorchFlame, MAX_INTENSITY};
pub use trail::Trail;

use glam::Vec3;
use rand::Rng;

/// State shared by every entity variant
#[derive(Clone, Debug, PartialEq)]
pub struct EntityCore {
    /// World position
    pub position: Vec3,
    /// Phase or angle in radians, wrapped to `[0, 2π)` where it is an angle
    pub phase: f32,
    /// Seconds since activation
    pub lifetime: f32,
    /// Lifetime at which the entity expires (infinite for permanent ones)
    pub max_lifetime: f32,
    /// Whether the entity is visible and updated
    pub active: bool,
    /// Visibility in `[0, 1]`; exactly 0 when inactive
    pub opacity: f32,
}

impl EntityCore {
    pub(crate) fn always_active() -> Self {
        Self {
            position: Vec3::ZERO,
            phase: 0.0,
            lifetime: 0.0,
            max_lifetime: f32::INFINITY,
            active: true,
            opacity: 1.0,
        }
    }

    pub(crate) fn dormant(max_lifetime: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            phase: 0.0,
            lifetime: 0.0,
            max_lifetime,
            active: false,
            opacity: 0.0,
        }
    }
}

/// Discriminant of [`AnimatedEntity`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Orbiting comet
    Comet,
    /// Pooled shooting star
    ShootingStar,
    /// Pooled altar mote
    QuantumParticle,
    /// Wall torch
    TorchFlame,
}

/// One animated decoration
#[derive(Clone, Debug)]
pub enum AnimatedEntity {
    /// Orbiting comet
    Comet(Comet),
    /// Pooled shooting star
    ShootingStar(ShootingStar),
    /// Pooled altar mote
    QuantumParticle(QuantumParticle),
    /// Wall torch
    TorchFlame(TorchFlame),
}

impl AnimatedEntity {
    /// Variant tag
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Comet(_) => EntityKind::Comet,
            Self::ShootingStar(_) => EntityKind::ShootingStar,
            Self::QuantumParticle(_) => EntityKind::QuantumParticle,
            Self::TorchFlame(_) => EntityKind::TorchFlame,
        }
    }

    /// Shared state
    #[must_use]
    pub fn core(&self) -> &EntityCore {
        match self {
            Self::Comet(e) => &e.core,
            Self::ShootingStar(e) => &e.core,
            Self::QuantumParticle(e) => &e.core,
            Self::TorchFlame(e) => &e.core,
        }
    }

    /// Whether the entity is live
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.core().active
    }

    /// Current opacity
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.core().opacity
    }

    /// Reset to a fresh randomized state and activate
    pub fn activate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self {
            Self::Comet(e) => e.reset(),
            Self::ShootingStar(e) => e.activate(rng),
            Self::QuantumParticle(e) => e.activate(rng),
            Self::TorchFlame(e) => e.reset(),
        }
    }

    /// Advance by `dt` seconds; inactive entities are left untouched
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        if !self.is_active() {
            return;
        }
        match self {
            Self::Comet(e) => e.update(dt),
            Self::ShootingStar(e) => e.update(dt),
            Self::QuantumParticle(e) => e.update(dt),
            Self::TorchFlame(e) => e.update(dt, rng),
        }
    }
}

impl From<Comet> for AnimatedEntity {
    fn from(value: Comet) -> Self {
        Self::Comet(value)
    }
}

impl From<ShootingStar> for AnimatedEntity {
    fn from(value: ShootingStar) -> Self {
        Self::ShootingStar(value)
    }
}

impl From<QuantumParticle> for AnimatedEntity {
    fn from(value: QuantumParticle) -> Self {
        Self::QuantumParticle(value)
    }
}

impl From<TorchFlame> for AnimatedEntity {
    fn from(value: TorchFlame) -> Self {
        Self::TorchFlame(value)
    }
}
