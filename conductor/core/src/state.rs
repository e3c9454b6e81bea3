//! Application State - Everything the Old Front-End Kept in Globals
//!
//! [`AppState`] is owned by the frame scheduler and only mutated through its
//! methods. Surfaces read it to draw the footer, the roster counter and the
//! usage meter.

use serde::{Deserialize, Serialize};

pub use crate::protocol::SimulationMode;

/// Footer text when nothing else is going on
pub const DEFAULT_FOOTER: &str = "HORIZON NODE READY... AWAITING INPUT";

/// Topic before the user applies simulation settings
pub const DEFAULT_TOPIC: &str = "General Discussion";

/// Topic set when simulation settings are applied from the surface
pub const APPLIED_TOPIC: &str = "Open Discussion";

/// Camera auto-rotate speed while stimulated
pub const STIMULATED_CAMERA_SPEED: f32 = 2.0;

impl SimulationMode {
    /// Milliseconds between conversation turns
    #[must_use]
    pub fn turn_interval_ms(self) -> u64 {
        match self {
            Self::TurnByTurn => 4000,
            Self::Aggressive => 2000,
            Self::Fireside => 6000,
        }
    }

    /// Camera auto-rotate speed for this pacing
    #[must_use]
    pub fn camera_speed(self) -> f32 {
        match self {
            Self::TurnByTurn => 0.5,
            Self::Aggressive => 1.5,
            Self::Fireside => 0.3,
        }
    }

    /// Upper-case label for the footer
    #[must_use]
    pub fn label(self) -> String {
        self.as_str().to_uppercase()
    }
}

/// Conversation pacing and topic
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Pacing mode
    pub mode: SimulationMode,
    /// Conversation topic
    pub topic: String,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            mode: SimulationMode::default(),
            topic: DEFAULT_TOPIC.to_string(),
        }
    }
}

/// Running totals reported by the companion
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    /// Tokens used
    pub total_tokens: u64,
    /// Cost in USD
    pub total_cost_usd: f64,
}

impl UsageTotals {
    /// Short meter text, e.g. `1,234 tokens | $0.0123`
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{} tokens | ${:.4}",
            group_thousands(self.total_tokens),
            self.total_cost_usd
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Explicit application state
#[derive(Clone, Debug)]
pub struct AppState {
    connected: bool,
    frozen: bool,
    stimulated: bool,
    conversation_active: bool,
    simulation: SimulationSettings,
    footer: String,
    usage: UsageTotals,
    roster_count: usize,
    stimulus_topic: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            connected: false,
            frozen: false,
            stimulated: false,
            conversation_active: false,
            simulation: SimulationSettings::default(),
            footer: DEFAULT_FOOTER.to_string(),
            usage: UsageTotals::default(),
            roster_count: 0,
            stimulus_topic: None,
        }
    }
}

impl AppState {
    /// Fresh state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the companion channel is up
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Record channel state
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Whether animation is frozen
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Flip the frozen flag; returns the new value
    pub fn toggle_frozen(&mut self) -> bool {
        self.frozen = !self.frozen;
        self.frozen
    }

    /// Whether stimulation is on
    #[must_use]
    pub fn is_stimulated(&self) -> bool {
        self.stimulated
    }

    /// Flip the stimulated flag; returns the new value
    pub fn toggle_stimulated(&mut self) -> bool {
        self.stimulated = !self.stimulated;
        self.stimulated
    }

    /// Topic word picked by the last stimulation
    #[must_use]
    pub fn stimulus_topic(&self) -> Option<&str> {
        self.stimulus_topic.as_deref()
    }

    /// Remember the stimulation topic
    pub fn set_stimulus_topic(&mut self, topic: Option<String>) {
        self.stimulus_topic = topic;
    }

    /// Whether the local conversation driver is running
    #[must_use]
    pub fn is_conversation_active(&self) -> bool {
        self.conversation_active
    }

    /// Record conversation state
    pub fn set_conversation_active(&mut self, active: bool) {
        self.conversation_active = active;
    }

    /// Pacing and topic
    #[must_use]
    pub fn simulation(&self) -> &SimulationSettings {
        &self.simulation
    }

    /// Replace pacing and topic
    pub fn set_simulation(&mut self, settings: SimulationSettings) {
        self.simulation = settings;
    }

    /// Camera speed implied by the current flags
    #[must_use]
    pub fn camera_speed(&self) -> f32 {
        if self.stimulated {
            STIMULATED_CAMERA_SPEED
        } else {
            self.simulation.mode.camera_speed()
        }
    }

    /// Footer text
    #[must_use]
    pub fn footer(&self) -> &str {
        &self.footer
    }

    /// Replace the footer text
    pub fn set_footer(&mut self, text: impl Into<String>) {
        self.footer = text.into();
    }

    /// Restore the idle footer
    pub fn reset_footer(&mut self) {
        self.footer = DEFAULT_FOOTER.to_string();
    }

    /// Usage totals
    #[must_use]
    pub fn usage(&self) -> UsageTotals {
        self.usage
    }

    /// Replace usage totals
    pub fn set_usage(&mut self, usage: UsageTotals) {
        self.usage = usage;
    }

    /// Number of avatars on stage
    #[must_use]
    pub fn roster_count(&self) -> usize {
        self.roster_count
    }

    /// Record the roster size
    pub fn set_roster_count(&mut self, count: usize) {
        self.roster_count = count;
    }
}
