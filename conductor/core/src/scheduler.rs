//! Frame Scheduler - One Callback Per Display Refresh
//!
//! The scheduler owns the whole live scene and is the only place it is
//! mutated. Surfaces call [`FrameScheduler::frame`] once per refresh and feed
//! it inbound messages (see `bridge`) and user commands (see `controls`)
//! between frames.
//!
//! # Frame
//!
//! ```text
//! frame(dt)
//!   ├─ clock.advance(dt) ──► dispatch due ClockEvents
//!   │     shooting-star check · mote spawn · link trigger
//!   │     overlay expiry · conversation turn · delayed reply · restart
//!   ├─ avatars.update(t, dt)        (skipped while frozen)
//!   ├─ entities.update(dt)          (one dispatch over AnimatedEntity)
//!   ├─ links.update(dt, positions)
//!   ├─ dressing.update(dt) · camera.update(dt)
//!   └─ render: begin_frame ─► ForwardPass ─► bloom ─► afterimage
//! ```
//!
//! # Freeze
//!
//! Freezing pauses the effects clock, which delays every timer by the frozen
//! span, and stops avatar animation time so poses resume exactly. Ambient
//! motion (comets, motes, dressing) keeps drifting.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::avatar::Avatar;
use crate::bridge::MessagingBridge;
use crate::chat_log::ConversationLog;
use crate::clock::{EffectsClock, TimerId};
use crate::conversation::ConversationDriver;
use crate::effects::{EffectPipeline, EffectSettings};
use crate::entity::EntityKind;
use crate::knowledge::KnowledgeStore;
use crate::protocol::MessageKind;
use crate::render::{Camera, ForwardPass, Framebuffer, LabelAnchor};
use crate::scene::{Scene, SceneDescription};
use crate::state::AppState;

/// Link trigger cadence while stimulated
pub const STIMULATED_LINK_CADENCE: Duration = Duration::from_millis(300);

/// Link trigger cadence otherwise
pub const IDLE_LINK_CADENCE: Duration = Duration::from_millis(1500);

/// Chance that a shooting-star check launches one
const SHOOTING_STAR_CHANCE: f64 = 0.5;

/// Events the effects clock delivers to the scheduler
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClockEvent {
    /// Maybe launch a shooting star
    ShootingStarCheck,
    /// Activate one dormant quantum mote
    QuantumSpawn,
    /// Activate a random link
    LinkTrigger,
    /// Tear down an avatar's overlay if it is still the same one
    ExpireOverlay {
        /// Avatar seat
        avatar: usize,
        /// Overlay generation at scheduling time
        generation: u64,
        /// Roster epoch at scheduling time
        roster: u64,
    },
    /// Next local conversation turn
    ConversationTurn,
    /// A delayed local reply
    LocalReply {
        /// Avatar seat that answers
        avatar: usize,
        /// Reply text
        text: String,
        /// Roster epoch at scheduling time
        roster: u64,
    },
    /// Start the conversation again after a repopulate
    RestartConversation,
}

/// Timings and tunables for the scheduler
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerSettings {
    /// How long a triggered link stays active
    pub link_timeout: Duration,
    /// How long a speech overlay lives
    pub overlay_duration: Duration,
    /// Period of the shooting-star check
    pub shooting_star_check: Duration,
    /// Period of the quantum-mote spawn check
    pub quantum_spawn: Duration,
    /// Delay before a local reply appears
    pub reply_delay: Duration,
    /// Delay before the conversation restarts after a repopulate
    pub restart_delay: Duration,
    /// Post-processing tunables
    pub effects: EffectSettings,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Display name used for the human
    pub username: String,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            link_timeout: Duration::from_millis(2000),
            overlay_duration: Duration::from_millis(5000),
            shooting_star_check: Duration::from_millis(3000),
            quantum_spawn: Duration::from_millis(400),
            reply_delay: Duration::from_millis(1000),
            restart_delay: Duration::from_millis(1000),
            effects: EffectSettings::default(),
            seed: None,
            username: "Traveler".to_string(),
        }
    }
}

/// Owner of the live scene and everything that drives it
pub struct FrameScheduler {
    pub(crate) scene: Scene,
    pub(crate) state: AppState,
    pub(crate) clock: EffectsClock<ClockEvent>,
    pub(crate) pipeline: EffectPipeline,
    pub(crate) camera: Camera,
    pub(crate) knowledge: KnowledgeStore,
    pub(crate) log: ConversationLog,
    pub(crate) rng: StdRng,
    pub(crate) bridge: MessagingBridge,
    pub(crate) conversation: ConversationDriver,
    pub(crate) settings: SchedulerSettings,
    pub(crate) saved_footer: Option<String>,
    link_timer: Option<TimerId>,
    animation_time: f32,
    frames: u64,
}

impl FrameScheduler {
    /// Build the scene and arm the ambient timers
    #[must_use]
    pub fn new(
        description: SceneDescription,
        settings: SchedulerSettings,
        width: usize,
        height: usize,
    ) -> Self {
        let mut rng = settings
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let has_stars = description.shooting_stars > 0;
        let has_motes = description.quantum_motes > 0;
        let scene = Scene::build(description, &mut rng);

        let mut clock = EffectsClock::new();
        if has_stars {
            clock.every(settings.shooting_star_check, ClockEvent::ShootingStarCheck);
        }
        if has_motes {
            clock.every(settings.quantum_spawn, ClockEvent::QuantumSpawn);
        }

        let mut state = AppState::new();
        state.set_roster_count(scene.avatars().len());

        let mut camera = Camera::new(aspect_of(width, height));
        camera.set_auto_rotate_speed(state.camera_speed());

        let mut scheduler = Self {
            pipeline: EffectPipeline::new(width, height, &settings.effects),
            scene,
            state,
            clock,
            camera,
            knowledge: KnowledgeStore::new(),
            log: ConversationLog::new(),
            rng,
            bridge: MessagingBridge::new(),
            conversation: ConversationDriver::new(),
            settings,
            saved_footer: None,
            link_timer: None,
            animation_time: 0.0,
            frames: 0,
        };
        scheduler.reschedule_link_trigger();
        scheduler
    }

    /// Advance the simulation by `dt` without rendering
    pub fn advance(&mut self, dt: Duration) {
        for event in self.clock.advance(dt) {
            self.dispatch(event);
        }

        let seconds = dt.as_secs_f32();
        let now = self.clock.now();
        if !self.state.is_frozen() {
            self.animation_time += seconds;
            for avatar in self.scene.avatars_mut() {
                avatar.update(self.animation_time, seconds, now);
            }
        }

        self.scene.entities_mut().update(seconds, &mut self.rng);
        let positions = self.scene.avatar_positions();
        self.scene.links_mut().update(seconds, now, &positions);
        self.scene.dressing_mut().update(seconds);
        self.camera.update(seconds);
        self.frames += 1;
    }

    /// Draw the current state and run the effect chain
    pub fn render(&mut self) -> &Framebuffer {
        let target = self.pipeline.begin_frame();
        ForwardPass::draw(target, &self.camera, &self.scene);
        self.pipeline.finish_frame()
    }

    /// One full frame: advance then render
    pub fn frame(&mut self, dt: Duration) -> &Framebuffer {
        self.advance(dt);
        self.render()
    }

    /// Resize the canvas, the effect buffers and the camera aspect together
    pub fn resize(&mut self, width: usize, height: usize) {
        self.camera.set_aspect(aspect_of(width, height));
        self.pipeline.resize(width, height);
        tracing::debug!(width, height, aspect = self.camera.aspect(), "Canvas resized");
    }

    /// Latest composed frame
    #[must_use]
    pub fn output(&self) -> &Framebuffer {
        self.pipeline.output()
    }

    /// Label and overlay anchors for the current frame size
    #[must_use]
    pub fn label_anchors(&self) -> Vec<LabelAnchor> {
        let (width, height) = self.pipeline.dimensions();
        ForwardPass::label_anchors(&self.camera, &self.scene, width, height)
    }

    /// The live scene
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Application state
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The camera
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The effect pipeline
    #[must_use]
    pub fn pipeline(&self) -> &EffectPipeline {
        &self.pipeline
    }

    /// The effects clock
    #[must_use]
    pub fn clock(&self) -> &EffectsClock<ClockEvent> {
        &self.clock
    }

    /// Uploaded documents
    #[must_use]
    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    /// Conversation log
    #[must_use]
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Scheduler timings
    #[must_use]
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Frames advanced so far
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Avatar animation time in seconds (stops while frozen)
    #[must_use]
    pub fn animation_time(&self) -> f32 {
        self.animation_time
    }

    /// Show `text` on an avatar, mark it speaking and schedule the overlay's expiry
    pub(crate) fn avatar_speaks(&mut self, index: usize, text: &str) -> bool {
        let now = self.clock.now();
        let duration = self.settings.overlay_duration;
        let roster = self.scene.roster_epoch();
        let Some(avatar) = self.scene.avatar_mut(index) else {
            tracing::debug!(index, "Message for unknown avatar ignored");
            return false;
        };
        let generation = avatar.show_message(text, now, duration);
        avatar.stimulate(now);
        self.clock.after(
            duration,
            ClockEvent::ExpireOverlay {
                avatar: index,
                generation,
                roster,
            },
        );
        true
    }

    /// Re-arm the link trigger at the cadence for the current state
    pub(crate) fn reschedule_link_trigger(&mut self) {
        if let Some(id) = self.link_timer.take() {
            self.clock.cancel(id);
        }
        let cadence = if self.state.is_stimulated() {
            STIMULATED_LINK_CADENCE
        } else {
            IDLE_LINK_CADENCE
        };
        self.link_timer = Some(self.clock.every(cadence, ClockEvent::LinkTrigger));
    }

    fn dispatch(&mut self, event: ClockEvent) {
        match event {
            ClockEvent::ShootingStarCheck => {
                if self.rng.gen_bool(SHOOTING_STAR_CHANCE) {
                    let slot = self
                        .scene
                        .entities_mut()
                        .spawn(EntityKind::ShootingStar, &mut self.rng);
                    tracing::trace!(?slot, "Shooting star check");
                }
            }
            ClockEvent::QuantumSpawn => {
                self.scene
                    .entities_mut()
                    .spawn(EntityKind::QuantumParticle, &mut self.rng);
            }
            ClockEvent::LinkTrigger => self.trigger_random_link(),
            ClockEvent::ExpireOverlay { roster, .. } | ClockEvent::LocalReply { roster, .. }
                if roster != self.scene.roster_epoch() =>
            {
                tracing::debug!(roster, "Timer for a replaced roster dropped");
            }
            ClockEvent::ExpireOverlay {
                avatar, generation, ..
            } => {
                if let Some(a) = self.scene.avatar_mut(avatar) {
                    a.expire_message(generation);
                }
            }
            ClockEvent::ConversationTurn => self.conversation_turn(),
            ClockEvent::LocalReply { avatar, text, .. } => {
                if self.avatar_speaks(avatar, &text) {
                    let name = self.scene.avatars()[avatar].name().to_string();
                    self.log.append(name, text, MessageKind::Agent);
                }
            }
            ClockEvent::RestartConversation => self.start_conversation(),
        }
    }

    fn trigger_random_link(&mut self) {
        let count = self.scene.links().len();
        if count == 0 {
            return;
        }
        let index = self.rng.gen_range(0..count);
        let now = self.clock.now();
        let timeout = self.settings.link_timeout;
        if let Some((a, b)) = self.scene.links_mut().activate(index, now, timeout) {
            flash(self.scene.avatars_mut(), a, b, now);
        }
    }

    /// Speak one conversation turn and light the speaker's link
    pub(crate) fn conversation_turn(&mut self) {
        if !self.state.is_conversation_active() {
            return;
        }
        let count = self.scene.avatars().len();
        let Some(turn) = self.conversation.take_turn(count, &mut self.rng) else {
            return;
        };
        let mode = self.state.simulation().mode;
        let traits = self.scene.avatars()[turn.speaker].personality().to_vec();
        let line = crate::conversation::compose_line(mode, &traits, &mut self.rng);
        self.avatar_speaks(turn.speaker, &line);

        if let Some(listener) = turn.listener {
            let now = self.clock.now();
            let timeout = self.settings.link_timeout;
            self.scene
                .links_mut()
                .activate_between(turn.speaker, listener, now, timeout);
        }
        tracing::debug!(speaker = turn.speaker, listener = ?turn.listener, "Conversation turn");
    }
}

fn flash(avatars: &mut [Avatar], a: usize, b: usize, now: Duration) {
    for index in [a, b] {
        if let Some(avatar) = avatars.get_mut(index) {
            avatar.flash(now);
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn aspect_of(width: usize, height: usize) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneVariant;
    use pretty_assertions::assert_eq;

    fn scheduler(variant: SceneVariant) -> FrameScheduler {
        let settings = SchedulerSettings {
            seed: Some(7),
            ..SchedulerSettings::default()
        };
        FrameScheduler::new(SceneDescription::for_variant(variant, 7), settings, 80, 60)
    }

    #[test]
    fn test_resize_updates_camera_and_buffers() {
        let settings = SchedulerSettings {
            seed: Some(1),
            ..SchedulerSettings::default()
        };
        let mut s = FrameScheduler::new(
            SceneDescription::for_variant(SceneVariant::OrbCircle, 7),
            settings,
            800,
            600,
        );
        s.resize(1200, 800);
        assert!((s.camera().aspect() - 1.5).abs() < 1e-6);
        assert_eq!(s.pipeline().dimensions(), (1200, 800));
        assert_eq!(s.pipeline().afterimage().buffer_dimensions(), [(1200, 800), (1200, 800)]);
    }

    #[test]
    fn test_frames_alternate_ping_pong() {
        let mut s = scheduler(SceneVariant::OrbCircle);
        let mut previous = s.pipeline().afterimage().read_index();
        for _ in 0..4 {
            s.frame(Duration::from_millis(16));
            let current = s.pipeline().afterimage().read_index();
            assert_ne!(current, previous);
            previous = current;
        }
        assert_eq!(s.frame_count(), 4);
    }

    #[test]
    fn test_link_trigger_activates_and_flashes() {
        let mut s = scheduler(SceneVariant::OrbCircle);
        s.advance(IDLE_LINK_CADENCE);
        let now = s.clock().now();
        assert_eq!(s.scene().links().iter().filter(|l| l.is_active(now)).count(), 1);
    }

    #[test]
    fn test_quantum_motes_spawn_in_dungeon() {
        let mut s = scheduler(SceneVariant::Dungeon);
        for _ in 0..5 {
            s.advance(Duration::from_millis(400));
        }
        assert!(s.scene().entities().active_count(EntityKind::QuantumParticle) >= 1);
    }

    #[test]
    fn test_overlay_expires_by_timer() {
        let mut s = scheduler(SceneVariant::OrbCircle);
        assert!(s.avatar_speaks(2, "hello there"));
        s.advance(Duration::from_millis(16));
        assert!(s.scene().avatars()[2].overlay().is_visible());
        s.advance(Duration::from_millis(5000));
        assert!(!s.scene().avatars()[2].overlay().is_visible());
        assert!(!s.avatar_speaks(99, "nobody"));
    }
}
