//! Forward pass: project the live scene and splat it into the frame
//!
//! Drawing order does not matter for additive blending; it follows the
//! scene graph so a reader can match it against the scene layout.

use std::f32::consts::TAU;

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::raster::{line, splat};
use super::{Camera, Framebuffer, Rgb};
use crate::avatar::{Avatar, AvatarModel, LINK_COLOR};
use crate::entity::{AnimatedEntity, Trail};
use crate::scene::{Dressing, DressingKind, Scene, FLOWER_RADIUS};

/// World radius of an avatar's core sphere
const ORB_RADIUS: f32 = 1.5;
/// World radius of the translucent shell
const SHELL_RADIUS: f32 = 2.2;
/// Ring radii around the orb
const RING_A_RADIUS: f32 = 2.8;
const RING_B_RADIUS: f32 = 3.3;
/// Points sampled around a ring or circle
const RING_SAMPLES: usize = 48;
/// Particle cloud points per avatar
const CLOUD_POINTS: usize = 12;

const STAR_COLOR: Rgb = Rgb::new(0.55, 0.55, 0.65);
const PILLAR_COLOR: Rgb = Rgb::new(0.25, 0.22, 0.3);
const TORCH_COLOR: Rgb = Rgb::new(1.0, 0.55, 0.2);
const MOTE_COLOR: Rgb = Rgb::new(0.6, 0.85, 1.0);
const SHOOTING_STAR_COLOR: Rgb = Rgb::new(1.0, 1.0, 1.0);

/// Where a surface should draw an avatar's label and speech overlay
#[derive(Clone, Debug, PartialEq)]
pub struct LabelAnchor {
    /// Avatar seat
    pub avatar: usize,
    /// Pixel position of the label, just above the avatar
    pub label: (f32, f32),
    /// Pixel position of the speech overlay, if one is visible
    pub overlay: Option<(f32, f32)>,
}

/// Draws a [`Scene`] through a [`Camera`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardPass;

impl ForwardPass {
    /// Draw the whole scene into `target`
    pub fn draw(target: &mut Framebuffer, camera: &Camera, scene: &Scene) {
        let mut painter = Painter::new(target, camera);
        painter.dressing(scene.dressing());
        for entity in scene.entities().iter() {
            painter.entity(entity);
        }
        for link in scene.links().iter() {
            if link.opacity() > 0.0 {
                let [a, b] = link.endpoints();
                let color = Rgb::from_hex(LINK_COLOR) * link.opacity();
                painter.segment(a, b, color, color);
            }
        }
        for avatar in scene.avatars() {
            painter.avatar(avatar);
        }
    }

    /// Pixel anchors for every avatar's label and visible overlay
    #[must_use]
    pub fn label_anchors(
        camera: &Camera,
        scene: &Scene,
        width: usize,
        height: usize,
    ) -> Vec<LabelAnchor> {
        let view_projection = camera.view_projection();
        scene
            .avatars()
            .iter()
            .filter_map(|avatar| {
                let pose = avatar.pose();
                let label = camera.project_with(
                    &view_projection,
                    pose.position + Vec3::Y * (SHELL_RADIUS + 0.8),
                    width,
                    height,
                )?;
                let overlay = if avatar.overlay().is_visible() {
                    camera
                        .project_with(
                            &view_projection,
                            pose.position + Vec3::Y * avatar.overlay().offset_y(),
                            width,
                            height,
                        )
                        .map(|p| (p.x, p.y))
                } else {
                    None
                };
                Some(LabelAnchor {
                    avatar: avatar.index(),
                    label: (label.x, label.y),
                    overlay,
                })
            })
            .collect()
    }
}

struct Painter<'a> {
    target: &'a mut Framebuffer,
    camera: &'a Camera,
    view_projection: Mat4,
}

impl<'a> Painter<'a> {
    fn new(target: &'a mut Framebuffer, camera: &'a Camera) -> Self {
        Self {
            view_projection: camera.view_projection(),
            target,
            camera,
        }
    }

    fn point(&mut self, world: Vec3, radius: f32, color: Rgb) {
        let (width, height) = self.target.dimensions();
        if let Some(p) = self
            .camera
            .project_with(&self.view_projection, world, width, height)
        {
            let pixels = self.camera.pixel_radius(radius, p.depth, height);
            splat(self.target, p.x, p.y, pixels, color);
        }
    }

    fn segment(&mut self, a: Vec3, b: Vec3, from: Rgb, to: Rgb) {
        let (width, height) = self.target.dimensions();
        let pa = self.camera.project_with(&self.view_projection, a, width, height);
        let pb = self.camera.project_with(&self.view_projection, b, width, height);
        if let (Some(pa), Some(pb)) = (pa, pb) {
            line(self.target, pa, pb, from, to);
        }
    }

    /// Circle of `radius` in the local XZ plane, transformed by `model`
    fn ring(&mut self, model: Mat4, radius: f32, color: Rgb) {
        let mut previous: Option<Vec3> = None;
        for i in 0..=RING_SAMPLES {
            #[allow(clippy::cast_precision_loss)]
            let angle = TAU * i as f32 / RING_SAMPLES as f32;
            let local = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
            let world = model.transform_point3(local);
            if let Some(prev) = previous {
                self.segment(prev, world, color, color);
            }
            previous = Some(world);
        }
    }

    fn trail(&mut self, trail: &Trail, color: Rgb, radius: f32) {
        for (i, position) in trail.iter().enumerate() {
            self.point(*position, radius, color * trail.fade(i));
        }
    }

    fn dressing(&mut self, dressing: &Dressing) {
        match dressing.kind() {
            DressingKind::Cosmos => {
                let stars = dressing.star_transform();
                for star in dressing.stars() {
                    self.point(stars.transform_point3(*star), 0.0, STAR_COLOR);
                }
                let nebula = dressing.nebula_transform();
                for (point, color) in dressing.nebula() {
                    self.point(nebula.transform_point3(*point), 2.0, *color * 0.15);
                }
                let flower = dressing.flower_transform();
                for circle in dressing.flower() {
                    let model = flower * Mat4::from_translation(circle.center);
                    self.ring(model, FLOWER_RADIUS, circle.color * 0.35);
                    let light = model.transform_point3(Vec3::Y * (1.0 + dressing.light_bob(circle.phase)));
                    self.point(light, 0.3, circle.color);
                }
            }
            DressingKind::Crypt => {
                for base in dressing.pillars() {
                    self.segment(*base, *base + Vec3::Y * 14.0, PILLAR_COLOR, PILLAR_COLOR * 0.3);
                }
                for radius in [6.0, 12.0, 18.0] {
                    self.ring(Mat4::IDENTITY, radius, PILLAR_COLOR * 0.6);
                }
            }
        }
    }

    fn entity(&mut self, entity: &AnimatedEntity) {
        if !entity.is_active() {
            return;
        }
        let opacity = entity.opacity();
        match entity {
            AnimatedEntity::Comet(comet) => {
                self.trail(comet.trail(), comet.color() * 0.8, 0.25);
                self.point(entity.core().position, 0.6, comet.color());
            }
            AnimatedEntity::ShootingStar(star) => {
                self.trail(star.trail(), SHOOTING_STAR_COLOR * opacity, 0.2);
                self.point(entity.core().position, 0.4, SHOOTING_STAR_COLOR * opacity);
            }
            AnimatedEntity::QuantumParticle(_) => {
                self.point(entity.core().position, 0.2, MOTE_COLOR * opacity);
            }
            AnimatedEntity::TorchFlame(torch) => {
                let intensity = torch.intensity();
                self.point(torch.base(), 0.3, PILLAR_COLOR);
                self.point(entity.core().position, 0.5 + 0.3 * intensity, TORCH_COLOR * intensity);
            }
        }
    }

    fn avatar(&mut self, avatar: &Avatar) {
        let pose = avatar.pose();
        let color = avatar.color();
        let scale = pose.mesh_scale;
        let center = pose.position;
        let place = |rotation: Vec3| {
            Mat4::from_scale_rotation_translation(
                Vec3::splat(scale),
                Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z),
                center,
            )
        };

        match avatar.model() {
            AvatarModel::PlainSphere => {
                self.point(center, ORB_RADIUS * scale, color * pose.emissive);
            }
            AvatarModel::Orb | AvatarModel::Angel => {
                self.point(center, ORB_RADIUS * pose.orb_scale * scale, color * pose.emissive);
                self.point(center, 0.6 * scale, Rgb::WHITE * (0.4 * pose.emissive));
                self.ring(place(pose.shell), SHELL_RADIUS, color * 0.25);

                let cloud = place(pose.particles);
                for i in 0..CLOUD_POINTS {
                    #[allow(clippy::cast_precision_loss)]
                    let angle = TAU * i as f32 / CLOUD_POINTS as f32;
                    let local = Vec3::new(angle.cos() * 2.0, (angle * 3.0).sin() * 0.8, angle.sin() * 2.0);
                    self.point(cloud.transform_point3(local), 0.12, color * 0.6);
                }

                self.ring(place(pose.ring_a), RING_A_RADIUS, color * 0.5);
                self.ring(place(pose.ring_b), RING_B_RADIUS, color * 0.4);

                if avatar.model() == AvatarModel::Angel {
                    self.wings(center, scale, color * 0.7);
                }
            }
        }
    }

    fn wings(&mut self, center: Vec3, scale: f32, color: Rgb) {
        for side in [-1.0_f32, 1.0] {
            let root = center + Vec3::new(side * 1.2, 0.5, 0.0) * scale;
            let tip = center + Vec3::new(side * 4.5, 2.5, -0.5) * scale;
            let low = center + Vec3::new(side * 3.5, -0.5, -0.3) * scale;
            self.segment(root, tip, color, color * 0.4);
            self.segment(tip, low, color * 0.4, color * 0.2);
            self.segment(low, root, color * 0.2, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneDescription, SceneVariant};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lit_pixels(fb: &Framebuffer) -> usize {
        fb.pixels().iter().filter(|p| p.luminance() > 0.05).count()
    }

    #[test]
    fn test_draws_orb_circle() {
        let mut rng = StdRng::seed_from_u64(9);
        let scene = Scene::build(SceneDescription::for_variant(SceneVariant::OrbCircle, 7), &mut rng);
        let camera = Camera::new(4.0 / 3.0);
        let mut fb = Framebuffer::new(160, 120);
        ForwardPass::draw(&mut fb, &camera, &scene);
        assert!(lit_pixels(&fb) > 100);
    }

    #[test]
    fn test_draws_dungeon() {
        let mut rng = StdRng::seed_from_u64(9);
        let scene = Scene::build(SceneDescription::for_variant(SceneVariant::Dungeon, 7), &mut rng);
        let camera = Camera::new(4.0 / 3.0);
        let mut fb = Framebuffer::new(160, 120);
        ForwardPass::draw(&mut fb, &camera, &scene);
        assert!(lit_pixels(&fb) > 50);
    }

    #[test]
    fn test_center_avatar_lights_middle_of_frame() {
        let mut rng = StdRng::seed_from_u64(9);
        let scene = Scene::build(SceneDescription::for_variant(SceneVariant::OrbCircle, 1), &mut rng);
        let camera = Camera::new(1.0);
        let mut fb = Framebuffer::new(100, 100);
        ForwardPass::draw(&mut fb, &camera, &scene);
        let center = fb.get(50, 50).unwrap_or_default();
        assert!(center.luminance() > 0.1);
    }

    #[test]
    fn test_label_anchor_per_avatar() {
        let mut rng = StdRng::seed_from_u64(9);
        let scene = Scene::build(SceneDescription::for_variant(SceneVariant::OrbCircle, 7), &mut rng);
        let camera = Camera::new(4.0 / 3.0);
        let anchors = ForwardPass::label_anchors(&camera, &scene, 160, 120);
        assert_eq!(anchors.len(), 7);
        assert!(anchors.iter().all(|a| a.overlay.is_none()));
    }
}
