//! Halo Conductor - Headless Scene Engine for the Ambient Companion
//!
//! This crate owns the animated companion scene (orbiting agent orbs or the
//! dungeon tableau), the effects chain that composes each frame, and the
//! messaging bridge that ties the scene to a companion process. It has no
//! terminal dependencies: a surface asks for frames and forwards input.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         Surfaces                               │
//! │        ┌───────────┐                    ┌──────────────┐       │
//! │        │    TUI    │                    │   Headless   │       │
//! │        │ (ratatui) │                    │   (tests)    │       │
//! │        └─────┬─────┘                    └──────┬───────┘       │
//! │              └───────────────┬─────────────────┘               │
//! │          frame(dt) · controls · handle_server_event            │
//! └──────────────────────────────┼─────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼─────────────────────────────────┐
//! │                      HALO CONDUCTOR                            │
//! │  ┌───────────────────────────┴──────────────────────────────┐  │
//! │  │                    FrameScheduler                        │  │
//! │  │ ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌────────────────┐ │  │
//! │  │ │  Scene  │ │ Effects  │ │ AppState │ │ Effect pipeline│ │  │
//! │  │ │ avatars │ │  Clock   │ │  + log   │ │ bloom · after- │ │  │
//! │  │ │ entities│ │ (timers) │ │          │ │ image          │ │  │
//! │  │ └─────────┘ └──────────┘ └──────────┘ └────────────────┘ │  │
//! │  └──────────────────────────┬───────────────────────────────┘  │
//! │                  MessagingBridge outbox                        │
//! └─────────────────────────────┼──────────────────────────────────┘
//!                               │ ClientEvent / ServerEvent (JSON)
//!                        ┌──────┴──────┐
//!                        │  Companion  │
//!                        └─────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use halo_conductor::{load_config, FrameScheduler};
//!
//! let config = load_config()?;
//! let mut scheduler = FrameScheduler::new(
//!     config.scene_description(),
//!     config.scheduler_settings(),
//!     160,
//!     96,
//! );
//!
//! loop {
//!     let frame = scheduler.frame(config.frame_interval());
//!     // present `frame` on the surface
//!     for event in scheduler.drain_outbox() {
//!         // hand `event` to a transport
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`entity`]: pooled and ambient animated entities (comets, shooting stars, motes, torches)
//! - [`avatar`]: conversation participants, speech overlays, communication links
//! - [`scene`]: scene variants, roster, backdrop and the built scene graph
//! - [`render`]: camera, framebuffer and the forward pass
//! - [`effects`]: bloom and afterimage post-processing
//! - [`clock`]: the effects clock owning every timer
//! - [`scheduler`]: the per-frame update loop
//! - [`bridge`]: companion events in, client events out
//! - [`controls`]: user commands applied between frames
//! - [`knowledge`], [`ingest`], [`responder`]: local document search and replies
//! - [`transport`]: in-process and WebSocket companion channels
//! - [`config`]: TOML / environment configuration

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod avatar;
pub mod bridge;
pub mod chat_log;
pub mod clock;
pub mod config;
pub mod controls;
pub mod conversation;
pub mod effects;
pub mod entity;
pub mod ingest;
pub mod knowledge;
pub mod protocol;
pub mod render;
pub mod responder;
pub mod scene;
pub mod scheduler;
pub mod state;
pub mod transport;

// Scene graph exports
pub use avatar::{Avatar, AvatarIdentity, AvatarModel, CommunicationLink, LinkSet, SpeechOverlay};
pub use entity::{AnimatedEntity, EntityKind, EntityPool};
pub use scene::{AssetSet, PersonaPreset, Scene, SceneDescription, SceneVariant};

// Rendering exports
pub use effects::{EffectPipeline, EffectSettings};
pub use render::{Camera, Framebuffer, LabelAnchor, Rgb};

// Scheduling exports
pub use clock::{EffectsClock, TimerId};
pub use controls::PersonaEdit;
pub use scheduler::{ClockEvent, FrameScheduler, SchedulerSettings};
pub use state::{AppState, SimulationSettings, UsageTotals};

// Messaging exports
pub use bridge::MessagingBridge;
pub use chat_log::{ConversationLog, LogEntry};
pub use protocol::{ChatMessage, ClientEvent, MessageKind, RosterEntry, ServerEvent, SimulationMode};
pub use transport::{CompanionTransport, InProcessTransport, TransportError};

// Knowledge exports
pub use ingest::{read_document, IngestError, IngestedDocument};
pub use knowledge::{KnowledgeStore, SearchChunk};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, HaloConfig, HaloToml,
};
