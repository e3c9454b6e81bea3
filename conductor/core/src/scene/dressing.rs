//! Static set dressing that only rotates: starfield, nebula, sacred
//! geometry, crypt pillars

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animation::{reference_frames, wrap_phase};
use crate::render::Rgb;

/// Stars scattered through the sky cube
pub const STAR_COUNT: usize = 3000;

/// Points in the distant nebula shell
pub const NEBULA_COUNT: usize = 800;

/// Radius of every flower-of-life circle
pub const FLOWER_RADIUS: f32 = 8.0;

const STAR_SPIN: f32 = -0.0001;
const NEBULA_SPIN_Y: f32 = 0.0003;
const NEBULA_SPIN_X: f32 = -0.0001;
const FLOWER_SPIN: f32 = 0.002;

const PILLAR_COUNT: usize = 8;
const PILLAR_RING: f32 = 18.0;

/// Which backdrop a scene uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DressingKind {
    /// Stars, nebula and the flower of life
    #[default]
    Cosmos,
    /// Pillars and floor rings around an altar
    Crypt,
}

/// One circle of the flower of life
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowerCircle {
    /// Center in the flower's local frame
    pub center: Vec3,
    /// Ring color
    pub color: Rgb,
    /// Bob phase of the light sphere at the center
    pub phase: f32,
}

/// Backdrop geometry plus its slow rotations
#[derive(Clone, Debug)]
pub struct Dressing {
    kind: DressingKind,
    stars: Vec<Vec3>,
    nebula: Vec<(Vec3, Rgb)>,
    flower: Vec<FlowerCircle>,
    pillars: Vec<Vec3>,
    star_spin: f32,
    nebula_spin: (f32, f32),
    flower_spin: f32,
    time: f32,
}

impl Dressing {
    /// Generate the backdrop for `kind`
    pub fn generate<R: Rng + ?Sized>(kind: DressingKind, rng: &mut R) -> Self {
        let mut dressing = Self {
            kind,
            stars: Vec::new(),
            nebula: Vec::new(),
            flower: Vec::new(),
            pillars: Vec::new(),
            star_spin: 0.0,
            nebula_spin: (0.0, 0.0),
            flower_spin: 0.0,
            time: 0.0,
        };
        match kind {
            DressingKind::Cosmos => {
                dressing.stars = (0..STAR_COUNT)
                    .map(|_| {
                        Vec3::new(
                            rng.gen_range(-1000.0..1000.0),
                            rng.gen_range(-1000.0..1000.0),
                            rng.gen_range(-1000.0..1000.0),
                        )
                    })
                    .collect();
                dressing.nebula = (0..NEBULA_COUNT).map(|_| nebula_point(rng)).collect();
                dressing.flower = flower_of_life();
            }
            DressingKind::Crypt => {
                #[allow(clippy::cast_precision_loss)]
                let pillars = (0..PILLAR_COUNT).map(|i| {
                    let angle = TAU * i as f32 / PILLAR_COUNT as f32;
                    Vec3::new(angle.cos() * PILLAR_RING, 0.0, angle.sin() * PILLAR_RING)
                });
                dressing.pillars = pillars.collect();
            }
        }
        dressing
    }

    /// Backdrop kind
    #[must_use]
    pub fn kind(&self) -> DressingKind {
        self.kind
    }

    /// Advance the slow rotations
    pub fn update(&mut self, dt: f32) {
        let frames = reference_frames(dt);
        self.time += dt;
        self.star_spin = wrap_phase(self.star_spin + STAR_SPIN * frames);
        self.nebula_spin = (
            wrap_phase(self.nebula_spin.0 + NEBULA_SPIN_X * frames),
            wrap_phase(self.nebula_spin.1 + NEBULA_SPIN_Y * frames),
        );
        self.flower_spin = wrap_phase(self.flower_spin + FLOWER_SPIN * frames);
    }

    /// Star positions (local frame)
    #[must_use]
    pub fn stars(&self) -> &[Vec3] {
        &self.stars
    }

    /// Nebula points with their colors (local frame)
    #[must_use]
    pub fn nebula(&self) -> &[(Vec3, Rgb)] {
        &self.nebula
    }

    /// Flower-of-life circles (local frame)
    #[must_use]
    pub fn flower(&self) -> &[FlowerCircle] {
        &self.flower
    }

    /// Pillar bases
    #[must_use]
    pub fn pillars(&self) -> &[Vec3] {
        &self.pillars
    }

    /// Starfield transform
    #[must_use]
    pub fn star_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.star_spin)
    }

    /// Nebula transform
    #[must_use]
    pub fn nebula_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.nebula_spin.1) * Mat4::from_rotation_x(self.nebula_spin.0)
    }

    /// Flower-of-life transform
    #[must_use]
    pub fn flower_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.flower_spin)
    }

    /// Bob height of the light sphere at a flower circle
    #[must_use]
    pub fn light_bob(&self, phase: f32) -> f32 {
        0.3 * (self.time * 2.0 + phase).sin()
    }

    /// Seconds of dressing animation
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }
}

fn nebula_point<R: Rng + ?Sized>(rng: &mut R) -> (Vec3, Rgb) {
    let theta = rng.gen_range(0.0..TAU);
    let phi = rng.gen_range(0.0..PI);
    let radius = rng.gen_range(100.0..300.0);
    let position = Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin() - 50.0,
        radius * phi.cos(),
    );
    let pick: f32 = rng.gen();
    let color = if pick < 0.4 {
        Rgb::new(0.4, 0.2, 0.8)
    } else if pick < 0.7 {
        Rgb::new(0.2, 0.4, 0.9)
    } else {
        Rgb::new(0.6, 0.3, 0.9)
    };
    (position, color)
}

fn flower_of_life() -> Vec<FlowerCircle> {
    let half = FLOWER_RADIUS / 2.0;
    let rise = FLOWER_RADIUS * 3.0_f32.sqrt() / 2.0;
    let centers = [
        Vec3::ZERO,
        Vec3::new(FLOWER_RADIUS, 0.0, 0.0),
        Vec3::new(half, 0.0, rise),
        Vec3::new(-half, 0.0, rise),
        Vec3::new(-FLOWER_RADIUS, 0.0, 0.0),
        Vec3::new(-half, 0.0, -rise),
        Vec3::new(half, 0.0, -rise),
    ];
    #[allow(clippy::cast_precision_loss)]
    let count = centers.len() as f32;
    centers
        .iter()
        .enumerate()
        .map(|(i, center)| {
            #[allow(clippy::cast_precision_loss)]
            let i = i as f32;
            FlowerCircle {
                center: *center,
                color: Rgb::from_hsl(0.6 + (i / count) * 0.3, 0.8, 0.5),
                phase: i * PI / 3.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cosmos_has_sky_and_flower() {
        let mut rng = StdRng::seed_from_u64(1);
        let dressing = Dressing::generate(DressingKind::Cosmos, &mut rng);
        assert_eq!(dressing.stars().len(), STAR_COUNT);
        assert_eq!(dressing.nebula().len(), NEBULA_COUNT);
        assert_eq!(dressing.flower().len(), 7);
        assert!(dressing.pillars().is_empty());
    }

    #[test]
    fn test_crypt_has_pillars_only() {
        let mut rng = StdRng::seed_from_u64(1);
        let dressing = Dressing::generate(DressingKind::Crypt, &mut rng);
        assert_eq!(dressing.pillars().len(), PILLAR_COUNT);
        assert!(dressing.stars().is_empty());
    }

    #[test]
    fn test_flower_spins_at_reference_rate() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut dressing = Dressing::generate(DressingKind::Crypt, &mut rng);
        dressing.update(1.0);
        let turned = dressing.flower_transform().transform_vector3(Vec3::X);
        let expected = Mat4::from_rotation_y(FLOWER_SPIN * 60.0).transform_vector3(Vec3::X);
        assert!((turned - expected).length() < 1e-4);
    }
}
