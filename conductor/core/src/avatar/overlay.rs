//! Speech overlays and text textures
//!
//! An overlay re-renders its text texture synchronously when shown, then
//! runs a time-boxed rise-and-fade tween. Showing a new message while one is
//! visible replaces it: the generation counter bumps, so the expiry timer
//! scheduled for the old message no longer matches and is ignored.

use std::time::Duration;

use crate::animation::Tween;
use crate::render::Rgb;

/// Columns a speech overlay wraps its text to
pub const OVERLAY_WRAP_COLUMNS: usize = 36;

/// Height above the avatar where an overlay appears
pub const OVERLAY_START_Y: f32 = 4.0;

/// Height above the avatar where an overlay finishes
pub const OVERLAY_END_Y: f32 = 7.0;

/// Opacity of a freshly shown overlay
pub const OVERLAY_OPACITY: f32 = 0.9;

/// Pre-wrapped lines of text tinted with an accent color
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextTexture {
    lines: Vec<String>,
    accent: Rgb,
}

impl TextTexture {
    /// Wrap `text` to `columns` and tint it with `accent`
    #[must_use]
    pub fn render(text: &str, columns: usize, accent: Rgb) -> Self {
        let lines = text
            .lines()
            .flat_map(|line| {
                if line.trim().is_empty() {
                    vec![String::new()]
                } else {
                    textwrap::wrap(line, columns.max(1))
                        .into_iter()
                        .map(|cow| cow.into_owned())
                        .collect()
                }
            })
            .collect();
        Self { lines, accent }
    }

    /// Single-line texture, used for name labels
    #[must_use]
    pub fn label(text: &str, accent: Rgb) -> Self {
        Self {
            lines: vec![text.to_string()],
            accent,
        }
    }

    /// Rendered lines
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Accent (border / label) color
    #[must_use]
    pub fn accent(&self) -> Rgb {
        self.accent
    }

    /// Widest line in characters
    #[must_use]
    pub fn width(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
    }
}

/// A message bubble floating above an avatar
#[derive(Clone, Debug)]
pub struct SpeechOverlay {
    texture: TextTexture,
    visible: bool,
    generation: u64,
    rise: Tween,
    offset_y: f32,
    opacity: f32,
}

impl Default for SpeechOverlay {
    fn default() -> Self {
        Self {
            texture: TextTexture::default(),
            visible: false,
            generation: 0,
            rise: Tween::new(Duration::ZERO, Duration::ZERO, OVERLAY_START_Y, OVERLAY_END_Y),
            offset_y: OVERLAY_START_Y,
            opacity: OVERLAY_OPACITY,
        }
    }
}

impl SpeechOverlay {
    /// Show `text`, replacing whatever was visible
    ///
    /// Returns the generation that an expiry must present to tear this
    /// message down.
    pub fn show(&mut self, text: &str, accent: Rgb, now: Duration, duration: Duration) -> u64 {
        self.texture = TextTexture::render(text, OVERLAY_WRAP_COLUMNS, accent);
        self.generation += 1;
        self.visible = true;
        self.rise = Tween::new(now, duration, OVERLAY_START_Y, OVERLAY_END_Y);
        self.offset_y = OVERLAY_START_Y;
        self.opacity = OVERLAY_OPACITY;
        self.generation
    }

    /// Advance the tween; tears down once the full duration has elapsed
    pub fn update(&mut self, now: Duration) {
        if !self.visible {
            return;
        }
        if self.rise.is_finished(now) {
            self.teardown();
            return;
        }
        let progress = self.rise.progress(now);
        self.offset_y = self.rise.value(now);
        self.opacity = OVERLAY_OPACITY * (1.0 - progress);
    }

    /// Tear down if `generation` is still the one on screen
    pub fn expire(&mut self, generation: u64) -> bool {
        if self.visible && generation == self.generation {
            self.teardown();
            true
        } else {
            false
        }
    }

    /// Hide and reset the transform
    pub fn teardown(&mut self) {
        self.visible = false;
        self.offset_y = OVERLAY_START_Y;
        self.opacity = OVERLAY_OPACITY;
    }

    /// Whether a message is on screen
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Generation of the latest message
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current height above the avatar
    #[must_use]
    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    /// Current opacity
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// The wrapped message
    #[must_use]
    pub fn texture(&self) -> &TextTexture {
        &self.texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_SECONDS: Duration = Duration::from_secs(5);

    #[test]
    fn test_texture_wraps_to_columns() {
        let text = "the quick brown fox jumps over the lazy dog and keeps running far away";
        let texture = TextTexture::render(text, OVERLAY_WRAP_COLUMNS, Rgb::WHITE);
        assert!(texture.lines().len() > 1);
        assert!(texture.width() <= OVERLAY_WRAP_COLUMNS);
    }

    #[test]
    fn test_texture_keeps_blank_lines() {
        let texture = TextTexture::render("From notes.txt:\n\nexcerpt", 36, Rgb::WHITE);
        assert_eq!(texture.lines(), ["From notes.txt:", "", "excerpt"]);
    }

    #[test]
    fn test_rise_and_fade() {
        let mut overlay = SpeechOverlay::default();
        overlay.show("hello", Rgb::WHITE, Duration::ZERO, FIVE_SECONDS);
        overlay.update(Duration::from_millis(2500));
        assert!((overlay.offset_y() - 5.5).abs() < 1e-4);
        assert!((overlay.opacity() - 0.45).abs() < 1e-4);

        overlay.update(FIVE_SECONDS);
        assert!(!overlay.is_visible());
        assert!((overlay.offset_y() - OVERLAY_START_Y).abs() < f32::EPSILON);
        assert!((overlay.opacity() - OVERLAY_OPACITY).abs() < f32::EPSILON);
    }

    #[test]
    fn test_new_message_replaces_old() {
        let mut overlay = SpeechOverlay::default();
        let first = overlay.show("one", Rgb::WHITE, Duration::ZERO, FIVE_SECONDS);
        let second = overlay.show("two", Rgb::WHITE, Duration::from_secs(1), FIVE_SECONDS);
        assert_ne!(first, second);
        assert_eq!(overlay.texture().lines(), ["two"]);

        assert!(!overlay.expire(first));
        assert!(overlay.is_visible());
        assert!(overlay.expire(second));
        assert!(!overlay.is_visible());
    }
}
