//! Halo TUI - Terminal surface for the Halo companion scene
//!
//! Presents the headless scene engine in a terminal: the framebuffer drawn
//! with half-block cells, name labels and speech overlays above it, the
//! conversation log beside it, and a footer and prompt below.
//!
//! # Architecture
//!
//! - **App**: event loop tying terminal input, frame ticks and the
//!   companion transport to one [`halo_conductor::FrameScheduler`]
//! - **Compositor**: z-ordered layers with transparent blank cells
//! - **Presenter**: framebuffer to half-block cells
//! - **Widgets**: log panel, labels, header / footer / prompt
//! - **Input**: key presses to scene commands

pub mod app;
pub mod compositor;
pub mod input;
pub mod presenter;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use input::{Command, InputMode, InputState};
