//! Theme and Colors
//!
//! The Halo palette: a dark void for the scene, cyan for the interface
//! chrome, and each agent's own accent for its lines in the log.

use ratatui::style::Color;

use halo_conductor::Rgb;

// ============================================================================
// Interface
// ============================================================================

/// Title and panel accents
pub const HALO_CYAN: Color = Color::Rgb(0, 220, 255);

/// Footer status text
pub const FOOTER_AMBER: Color = Color::Rgb(255, 196, 92);

/// Usage counter
pub const USAGE_TEAL: Color = Color::Rgb(96, 200, 180);

/// Panel separators and hints
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error text
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

// ============================================================================
// Conversation log
// ============================================================================

/// The human's lines
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System notices
pub const SYSTEM_GRAY: Color = Color::Rgb(150, 150, 160);

/// Agent lines when the speaker is not on stage
pub const AGENT_MAGENTA: Color = Color::Rgb(220, 120, 255);

/// Log timestamps
pub const STAMP_GRAY: Color = Color::Rgb(90, 90, 110);

/// Terminal color for a linear scene color
#[must_use]
pub fn terminal_color(color: Rgb) -> Color {
    let [r, g, b] = color.to_rgb8();
    Color::Rgb(r, g, b)
}

/// Terminal color for `color` faded toward black
#[must_use]
pub fn faded(color: Rgb, opacity: f32) -> Color {
    terminal_color(Rgb::BLACK.lerp(color, opacity.clamp(0.0, 1.0)))
}
