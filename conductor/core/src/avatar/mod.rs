//! Avatars - Visual Stand-Ins for Conversation Participants
//!
//! Each avatar animates on two layers:
//!
//! - **Idle**: floating, pulsing emissive and rotating sub-parts, all a pure
//!   function of elapsed animation time so the pose resumes exactly after a
//!   freeze
//! - **Reactive**: `stimulate` spikes the activity decay to 1; it then falls
//!   linearly, boosting emissive and scale while positive ("flash and
//!   settle"), and the scale relaxes geometrically afterwards
//!
//! ```text
//! stimulate(now) ──► decay = 1 ──► decay -= 0.6·dt ──► 0 ──► scale × 0.98/frame → 1
//!                    speaking until now + 1.5 s
//! show_message() ──► SpeechOverlay (own tween, own expiry generation)
//! ```

mod link;
mod overlay;

pub use link::{CommunicationLink, LinkSet, FADE_IN_RATE, FADE_OUT_RATE, LINK_COLOR};
pub use overlay::{
    SpeechOverlay, TextTexture, OVERLAY_END_Y, OVERLAY_OPACITY, OVERLAY_START_Y,
    OVERLAY_WRAP_COLUMNS,
};

use std::f32::consts::TAU;
use std::time::Duration;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animation::{reference_frames, wrap_phase};
use crate::render::Rgb;

/// How long the speaking flag stays set after `stimulate`
pub const SPEAKING_DURATION: Duration = Duration::from_millis(1500);

/// How long a link-trigger flash holds the emissive boost
pub const FLASH_DURATION: Duration = Duration::from_millis(200);

const FLOAT_AMPLITUDE: f32 = 0.2;
const FLOAT_RATE: f32 = 0.6;
const PULSE_RATE: f32 = 1.2;
const DECAY_RATE: f32 = 0.6;
const FLASH_EMISSIVE: f32 = 1.5;
const SCALE_RELAX: f32 = 0.98;

/// Angular rates of the decorative sub-parts, radians per second (x, y, z)
const SHELL_RATE: Vec3 = Vec3::new(0.18, 0.3, 0.0);
const INNER_RATE: Vec3 = Vec3::new(0.0, -0.48, 0.24);
const PARTICLE_RATE: Vec3 = Vec3::new(0.3, 0.6, 0.0);
const RING_A_RATE: Vec3 = Vec3::new(0.0, 0.0, 0.9);
const RING_B_RATE: Vec3 = Vec3::new(0.6, 0.0, 0.0);

/// Geometry used to draw an avatar
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvatarModel {
    /// Glowing orb with shell, inner glow, particle cloud and two rings
    #[default]
    Orb,
    /// Orb with a pair of wings, for the dungeon tableau
    Angel,
    /// Bare sphere, used when the configured model is unavailable
    PlainSphere,
}

/// Who an avatar stands for
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AvatarIdentity {
    /// Display name
    pub name: String,
    /// Body color as `0xRRGGBB`
    pub color: u32,
    /// Personality traits
    pub personality: Vec<String>,
}

impl AvatarIdentity {
    /// Create an identity
    pub fn new(name: impl Into<String>, color: u32, personality: Vec<String>) -> Self {
        Self {
            name: name.into(),
            color,
            personality,
        }
    }
}

/// Everything the forward pass needs to draw an avatar this frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvatarPose {
    /// World position including the float offset
    pub position: Vec3,
    /// Idle pulse scale of the orb
    pub orb_scale: f32,
    /// Reactive scale of the whole avatar
    pub mesh_scale: f32,
    /// Emissive intensity
    pub emissive: f32,
    /// Outer shell rotation (Euler XYZ)
    pub shell: Vec3,
    /// Inner glow rotation
    pub inner: Vec3,
    /// Particle cloud rotation
    pub particles: Vec3,
    /// First ring rotation
    pub ring_a: Vec3,
    /// Second ring rotation
    pub ring_b: Vec3,
}

impl AvatarPose {
    fn at(position: Vec3) -> Self {
        Self {
            position,
            orb_scale: 1.0,
            mesh_scale: 1.0,
            emissive: 0.8,
            shell: Vec3::ZERO,
            inner: Vec3::ZERO,
            particles: Vec3::ZERO,
            ring_a: Vec3::ZERO,
            ring_b: Vec3::ZERO,
        }
    }
}

/// One conversational participant in the scene
#[derive(Clone, Debug)]
pub struct Avatar {
    index: usize,
    identity: AvatarIdentity,
    color: Rgb,
    label: TextTexture,
    model: AvatarModel,
    base_position: Vec3,
    float_phase: f32,
    pulse_phase: f32,
    pose: AvatarPose,
    activity_decay: f32,
    speaking_until: Option<Duration>,
    flash_until: Option<Duration>,
    overlay: SpeechOverlay,
}

impl Avatar {
    /// Create an avatar with randomized idle phases
    pub fn new<R: Rng + ?Sized>(
        index: usize,
        identity: AvatarIdentity,
        position: Vec3,
        model: AvatarModel,
        rng: &mut R,
    ) -> Self {
        let color = Rgb::from_hex(identity.color);
        Self {
            index,
            label: TextTexture::label(&identity.name, color),
            identity,
            color,
            model,
            base_position: position,
            float_phase: rng.gen_range(0.0..TAU),
            pulse_phase: rng.gen_range(0.0..TAU),
            pose: AvatarPose::at(position),
            activity_decay: 0.0,
            speaking_until: None,
            flash_until: None,
            overlay: SpeechOverlay::default(),
        }
    }

    /// Roster index
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Identity (name, color, traits)
    #[must_use]
    pub fn identity(&self) -> &AvatarIdentity {
        &self.identity
    }

    /// Personality traits
    #[must_use]
    pub fn personality(&self) -> &[String] {
        &self.identity.personality
    }

    /// Body color
    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Drawing model
    #[must_use]
    pub fn model(&self) -> AvatarModel {
        self.model
    }

    /// Name label texture
    #[must_use]
    pub fn label(&self) -> &TextTexture {
        &self.label
    }

    /// Pose computed by the last update
    #[must_use]
    pub fn pose(&self) -> &AvatarPose {
        &self.pose
    }

    /// Rest position (without float offset)
    #[must_use]
    pub fn base_position(&self) -> Vec3 {
        self.base_position
    }

    /// Activity decay in `[0, 1]`
    #[must_use]
    pub fn activity_decay(&self) -> f32 {
        self.activity_decay
    }

    /// The speech overlay
    #[must_use]
    pub fn overlay(&self) -> &SpeechOverlay {
        &self.overlay
    }

    /// Whether the avatar spoke within the last 1.5 s
    #[must_use]
    pub fn is_speaking(&self, now: Duration) -> bool {
        self.speaking_until.is_some_and(|until| now < until)
    }

    /// Rename and re-render the label
    pub fn rename(&mut self, name: impl Into<String>) {
        self.identity.name = name.into();
        self.label = TextTexture::label(&self.identity.name, self.color);
    }

    /// Replace the personality traits
    pub fn set_personality(&mut self, traits: Vec<String>) {
        self.identity.personality = traits;
    }

    /// Mark as speaking: activity decay jumps to 1
    pub fn stimulate(&mut self, now: Duration) {
        self.activity_decay = 1.0;
        self.speaking_until = Some(now + SPEAKING_DURATION);
    }

    /// Hold the flash emissive for a moment
    pub fn flash(&mut self, now: Duration) {
        self.flash_until = Some(now + FLASH_DURATION);
    }

    /// Reset the pulse so it restarts from zero at animation time `t`
    pub fn freeze(&mut self, t: f32) {
        self.pulse_phase = -PULSE_RATE * t;
    }

    /// Show a speech overlay; returns the generation its expiry must match
    pub fn show_message(&mut self, text: &str, now: Duration, duration: Duration) -> u64 {
        tracing::debug!(avatar = %self.identity.name, chars = text.chars().count(), "Overlay shown");
        self.overlay.show(text, self.color, now, duration)
    }

    /// Tear down the overlay if `generation` is still current
    pub fn expire_message(&mut self, generation: u64) -> bool {
        self.overlay.expire(generation)
    }

    /// Advance idle and reactive animation
    ///
    /// `t` is elapsed animation time in seconds, `dt` the frame delta, and
    /// `now` the effects clock reading for the timed flags.
    pub fn update(&mut self, t: f32, dt: f32, now: Duration) {
        let pose = &mut self.pose;

        pose.position = self.base_position
            + Vec3::Y * (FLOAT_AMPLITUDE * (self.float_phase + FLOAT_RATE * t).sin());

        let pulse = self.pulse_phase + PULSE_RATE * t;
        pose.orb_scale = 1.0 + 0.05 * pulse.sin();
        pose.emissive = 0.8 + 0.3 * (1.5 * pulse).sin();

        pose.shell = rotation(SHELL_RATE, t);
        pose.inner = rotation(INNER_RATE, t);
        pose.particles = rotation(PARTICLE_RATE, t);
        pose.ring_a = rotation(RING_A_RATE, t);
        pose.ring_b = rotation(RING_B_RATE, t);

        if self.activity_decay > 0.0 {
            self.activity_decay = (self.activity_decay - DECAY_RATE * dt).max(0.0);
            pose.emissive = 1.2 + 0.8 * self.activity_decay;
            pose.mesh_scale = 1.0 + 0.15 * self.activity_decay;
        } else if pose.mesh_scale > 1.01 {
            pose.mesh_scale *= SCALE_RELAX.powf(reference_frames(dt));
        } else {
            pose.mesh_scale = 1.0;
        }

        if self.flash_until.is_some_and(|until| now < until) {
            pose.emissive = FLASH_EMISSIVE;
        }
        if self.speaking_until.is_some_and(|until| now >= until) {
            self.speaking_until = None;
        }

        self.overlay.update(now);
    }
}

fn rotation(rate: Vec3, t: f32) -> Vec3 {
    let angles = rate * t;
    Vec3::new(wrap_phase(angles.x), wrap_phase(angles.y), wrap_phase(angles.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn avatar() -> Avatar {
        let mut rng = StdRng::seed_from_u64(42);
        Avatar::new(
            0,
            AvatarIdentity::new("Osiris", 0x00BFFF, vec!["judicious".into()]),
            Vec3::new(8.0, 0.0, 0.0),
            AvatarModel::Orb,
            &mut rng,
        )
    }

    #[test]
    fn test_idle_is_pure_function_of_time() {
        let mut a = avatar();
        let mut b = a.clone();
        a.update(3.0, 1.0 / 60.0, Duration::ZERO);
        for i in 1..=180 {
            #[allow(clippy::cast_precision_loss)]
            b.update(i as f32 / 60.0, 1.0 / 60.0, Duration::ZERO);
        }
        assert!((a.pose().position - b.pose().position).length() < 1e-5);
        assert!((a.pose().ring_a - b.pose().ring_a).length() < 1e-4);
    }

    #[test]
    fn test_float_amplitude() {
        let mut a = avatar();
        for i in 0..600 {
            #[allow(clippy::cast_precision_loss)]
            a.update(i as f32 * 0.05, 0.05, Duration::ZERO);
            let dy = a.pose().position.y - a.base_position().y;
            assert!(dy.abs() <= FLOAT_AMPLITUDE + 1e-5);
        }
    }

    #[test]
    fn test_activity_decays_linearly_to_zero() {
        let mut a = avatar();
        a.stimulate(Duration::ZERO);
        assert!((a.activity_decay() - 1.0).abs() < f32::EPSILON);

        a.update(0.5, 0.5, Duration::from_millis(500));
        assert!((a.activity_decay() - 0.7).abs() < 1e-5);
        assert!((a.pose().emissive - (1.2 + 0.8 * 0.7)).abs() < 1e-4);
        assert!((a.pose().mesh_scale - (1.0 + 0.15 * 0.7)).abs() < 1e-4);

        let mut t = 0.5;
        while a.activity_decay() > 0.0 {
            t += 0.1;
            a.update(t, 0.1, Duration::from_secs_f32(t));
            assert!((0.0..=1.0).contains(&a.activity_decay()));
        }
        for _ in 0..200 {
            t += 1.0 / 60.0;
            a.update(t, 1.0 / 60.0, Duration::from_secs_f32(t));
        }
        assert!((a.pose().mesh_scale - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_speaking_flag_clears() {
        let mut a = avatar();
        a.stimulate(Duration::from_secs(1));
        assert!(a.is_speaking(Duration::from_millis(2400)));
        a.update(2.5, 0.016, Duration::from_millis(2500));
        assert!(!a.is_speaking(Duration::from_millis(2500)));
    }

    #[test]
    fn test_flash_holds_emissive() {
        let mut a = avatar();
        a.flash(Duration::ZERO);
        a.update(0.1, 0.016, Duration::from_millis(100));
        assert!((a.pose().emissive - FLASH_EMISSIVE).abs() < f32::EPSILON);
        a.update(0.3, 0.016, Duration::from_millis(300));
        assert!(a.pose().emissive < FLASH_EMISSIVE);
    }

    #[test]
    fn test_freeze_resets_pulse() {
        let mut a = avatar();
        a.freeze(10.0);
        a.update(10.0, 0.0, Duration::ZERO);
        assert!((a.pose().orb_scale - 1.0).abs() < 1e-5);
        assert!((a.pose().emissive - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_rename_rerenders_label() {
        let mut a = avatar();
        a.rename("Thoth");
        assert_eq!(a.name(), "Thoth");
        assert_eq!(a.label().lines(), ["Thoth"]);
    }
}
