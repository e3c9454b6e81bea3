//! Default roster, persona presets and the trait dice

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::avatar::AvatarIdentity;

/// Number of avatars in a full circle
pub const DEFAULT_AGENT_COUNT: usize = 7;

/// Default avatar names, in seat order
pub const AGENT_NAMES: [&str; 7] = ["YOU", "Osiris", "Solomon", "Azura", "Simba", "Harichi", "Angel"];

/// Default avatar colors, in seat order
pub const AGENT_COLORS: [u32; 7] = [
    0x1C_FF_AC, 0x00_BF_FF, 0xFF_1C_AC, 0xFF_AC_1C, 0xAC_1C_FF, 0xFF_D7_00, 0xFF_69_B4,
];

type TraitTable = [[&'static str; 3]; 7];

const DEFAULT_TRAITS: TraitTable = [
    ["daemon-protocol", "systematic", "guardian"],
    ["ancient-wisdom", "judicious", "transcendent"],
    ["enigmatic", "strategic", "observer"],
    ["intellectually-proud", "precise", "tsundere"],
    ["instinctive", "protective", "noble"],
    ["harmonious", "meditative", "balanced"],
    ["compassionate", "ethereal", "nurturing"],
];

const PHILOSOPHER_TRAITS: TraitTable = [
    ["contemplative", "analytical", "questioning"],
    ["logical", "methodical", "rational"],
    ["philosophical", "abstract", "theoretical"],
    ["skeptical", "critical", "thoughtful"],
    ["reflective", "introspective", "wise"],
    ["meditative", "profound", "intellectual"],
    ["ethereal", "transcendent", "enlightened"],
];

const SCIENTIST_TRAITS: TraitTable = [
    ["empirical", "data-driven", "precise"],
    ["experimental", "curious", "systematic"],
    ["analytical", "objective", "rigorous"],
    ["innovative", "methodical", "detailed"],
    ["evidence-based", "logical", "technical"],
    ["quantitative", "hypothesis-driven", "observant"],
    ["research-oriented", "scientific", "rational"],
];

const INNOVATOR_TRAITS: TraitTable = [
    ["creative", "visionary", "bold"],
    ["unconventional", "entrepreneurial", "risk-taking"],
    ["imaginative", "forward-thinking", "disruptive"],
    ["innovative", "dynamic", "pioneering"],
    ["experimental", "ambitious", "resourceful"],
    ["transformative", "revolutionary", "inventive"],
    ["cutting-edge", "futuristic", "trailblazing"],
];

const DEBATER_TRAITS: TraitTable = [
    ["argumentative", "assertive", "persuasive"],
    ["challenging", "direct", "confrontational"],
    ["critical", "provocative", "sharp"],
    ["competitive", "forceful", "passionate"],
    ["strategic", "eloquent", "tenacious"],
    ["dialectical", "rhetorical", "combative"],
    ["incisive", "compelling", "adversarial"],
];

/// Trait categories the dice draw from, in roll order
pub const TRAIT_CATEGORIES: [(&str, [&str; 10]); 5] = [
    (
        "personality",
        [
            "Analytical", "Cautious", "Bold", "Curious", "Skeptical", "Optimistic", "Pragmatic",
            "Idealistic", "Reserved", "Outgoing",
        ],
    ),
    (
        "behavior",
        [
            "Strategic", "Tactical", "Reactive", "Proactive", "Methodical", "Spontaneous",
            "Calculated", "Instinctive", "Deliberate", "Impulsive",
        ],
    ),
    (
        "social",
        [
            "Collaborative", "Independent", "Diplomatic", "Direct", "Persuasive", "Assertive",
            "Supportive", "Competitive", "Mediating", "Confrontational",
        ],
    ),
    (
        "thinking",
        [
            "Innovative", "Traditional", "Logical", "Intuitive", "Creative", "Systematic",
            "Abstract", "Concrete", "Theoretical", "Practical",
        ],
    ),
    (
        "attitude",
        [
            "Patient", "Urgent", "Flexible", "Rigid", "Accepting", "Critical", "Trusting",
            "Suspicious", "Confident", "Humble",
        ],
    ),
];

/// Traits each avatar carries
pub const TRAITS_PER_AVATAR: usize = 3;

/// Named sets of traits for the whole roster
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaPreset {
    /// The starting cast
    #[default]
    Default,
    /// Contemplative thinkers
    Philosophers,
    /// Evidence-driven researchers
    Scientists,
    /// Bold visionaries
    Innovators,
    /// Sharp arguers
    Debaters,
}

impl PersonaPreset {
    /// Every preset, in menu order
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Philosophers,
        Self::Scientists,
        Self::Innovators,
        Self::Debaters,
    ];

    /// Lowercase preset name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Philosophers => "philosophers",
            Self::Scientists => "scientists",
            Self::Innovators => "innovators",
            Self::Debaters => "debaters",
        }
    }

    /// Traits for the avatar in `seat`, wrapping past the table
    #[must_use]
    pub fn traits(self, seat: usize) -> Vec<String> {
        let table = match self {
            Self::Default => &DEFAULT_TRAITS,
            Self::Philosophers => &PHILOSOPHER_TRAITS,
            Self::Scientists => &SCIENTIST_TRAITS,
            Self::Innovators => &INNOVATOR_TRAITS,
            Self::Debaters => &DEBATER_TRAITS,
        };
        table[seat % table.len()]
            .iter()
            .map(|t| (*t).to_string())
            .collect()
    }

    /// The preset after this one, wrapping
    #[must_use]
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for PersonaPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonaPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown persona preset: {s}"))
    }
}

/// Identity of the avatar in `seat` for the default roster
#[must_use]
pub fn default_identity(seat: usize) -> AvatarIdentity {
    AvatarIdentity::new(
        AGENT_NAMES[seat % AGENT_NAMES.len()],
        AGENT_COLORS[seat % AGENT_COLORS.len()],
        PersonaPreset::Default.traits(seat),
    )
}

/// Roll one trait per slot, cycling through the categories
pub fn roll_traits<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    (0..TRAITS_PER_AVATAR)
        .map(|slot| {
            let (_, traits) = &TRAIT_CATEGORIES[slot % TRAIT_CATEGORIES.len()];
            traits.choose(rng).copied().unwrap_or("Curious").to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_identity_wraps() {
        assert_eq!(default_identity(1).name, "Osiris");
        assert_eq!(default_identity(8).name, "Osiris");
        assert_eq!(default_identity(3).personality[2], "tsundere");
    }

    #[test]
    fn test_preset_parse_and_cycle() {
        assert_eq!("Scientists".parse::<PersonaPreset>(), Ok(PersonaPreset::Scientists));
        assert!("wizards".parse::<PersonaPreset>().is_err());
        assert_eq!(PersonaPreset::Debaters.next(), PersonaPreset::Default);
    }

    #[test]
    fn test_roll_draws_from_categories_in_order() {
        let mut rng = StdRng::seed_from_u64(21);
        let traits = roll_traits(&mut rng);
        assert_eq!(traits.len(), TRAITS_PER_AVATAR);
        for (slot, t) in traits.iter().enumerate() {
            assert!(TRAIT_CATEGORIES[slot].1.contains(&t.as_str()));
        }
    }
}
