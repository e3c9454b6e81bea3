//! Local conversation driver: round-robin speakers, canned lines per mode,
//! and the stimulation topic pool

use rand::seq::SliceRandom;
use rand::Rng;

use crate::clock::TimerId;
use crate::protocol::SimulationMode;

/// Topic words the stimulate control picks from
pub const STIMULATION_WORDS: [&str; 50] = [
    "consciousness", "infinity", "quantum", "evolution", "emergence",
    "transcendence", "synchronicity", "harmony", "chaos", "entropy",
    "beauty", "truth", "wisdom", "creativity", "innovation",
    "paradox", "duality", "singularity", "resonance", "vibration",
    "enlightenment", "awareness", "perception", "reality", "illusion",
    "freedom", "destiny", "purpose", "existence", "nothingness",
    "eternity", "cosmos", "universe", "dimension", "multiverse",
    "energy", "matter", "space", "time", "void",
    "transformation", "metamorphosis", "genesis", "apocalypse", "rebirth",
    "mystery", "wonder", "awe", "sublime", "divine",
];

const TURN_BY_TURN_LINES: [&str; 5] = [
    "What's your perspective on this matter?",
    "I think we should consider the data carefully.",
    "Let me share my analysis of the situation.",
    "Have you thought about the long-term implications?",
    "I'd like to hear everyone's thoughts on this.",
];

const AGGRESSIVE_LINES: [&str; 5] = [
    "That approach won't work!",
    "We need to act NOW!",
    "I disagree completely!",
    "Time is running out, we must decide!",
    "This is the only viable solution!",
];

const FIRESIDE_LINES: [&str; 5] = [
    "It's interesting to think about...",
    "Perhaps we could explore this together.",
    "I wonder what would happen if...",
    "That's a fascinating perspective.",
    "Let's take our time with this decision.",
];

/// Canned lines for a pacing mode
#[must_use]
pub fn lines_for(mode: SimulationMode) -> &'static [&'static str] {
    match mode {
        SimulationMode::TurnByTurn => &TURN_BY_TURN_LINES,
        SimulationMode::Aggressive => &AGGRESSIVE_LINES,
        SimulationMode::Fireside => &FIRESIDE_LINES,
    }
}

/// A line for a speaker: `[trait] line`, or the bare line without traits
pub fn compose_line<R: Rng + ?Sized>(mode: SimulationMode, traits: &[String], rng: &mut R) -> String {
    let line = lines_for(mode).choose(rng).copied().unwrap_or_default();
    match traits.choose(rng) {
        Some(t) => format!("[{t}] {line}"),
        None => line.to_string(),
    }
}

/// Pick a stimulation topic
pub fn stimulation_word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    STIMULATION_WORDS.choose(rng).copied().unwrap_or("wonder")
}

/// One conversation turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Turn {
    /// Who speaks
    pub speaker: usize,
    /// Who the link is drawn to, when there is anyone else
    pub listener: Option<usize>,
}

/// Round-robin speaker rotation plus the interval timer driving it
#[derive(Clone, Debug, Default)]
pub struct ConversationDriver {
    next_speaker: usize,
    timer: Option<TimerId>,
}

impl ConversationDriver {
    /// Idle driver starting at seat 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a turn interval is scheduled
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Record the interval timer; the rotation restarts at seat 0
    pub fn start(&mut self, timer: TimerId) {
        self.next_speaker = 0;
        self.timer = Some(timer);
    }

    /// Forget the interval timer, returning it for cancellation
    pub fn stop(&mut self) -> Option<TimerId> {
        self.timer.take()
    }

    /// Seat that speaks next
    #[must_use]
    pub fn next_speaker(&self) -> usize {
        self.next_speaker
    }

    /// Take the next turn among `count` avatars
    pub fn take_turn<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Option<Turn> {
        if count == 0 {
            return None;
        }
        let speaker = self.next_speaker % count;
        self.next_speaker = (speaker + 1) % count;
        let listener = if count > 1 {
            let pick = rng.gen_range(0..count - 1);
            Some(if pick >= speaker { pick + 1 } else { pick })
        } else {
            None
        };
        Some(Turn { speaker, listener })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_round_robin_with_distinct_listener() {
        let mut driver = ConversationDriver::new();
        let mut rng = StdRng::seed_from_u64(11);
        let speakers: Vec<usize> = (0..9)
            .filter_map(|_| driver.take_turn(7, &mut rng))
            .inspect(|turn| {
                let listener = turn.listener.unwrap();
                assert_ne!(listener, turn.speaker);
                assert!(listener < 7);
            })
            .map(|turn| turn.speaker)
            .collect();
        assert_eq!(speakers, vec![0, 1, 2, 3, 4, 5, 6, 0, 1]);
    }

    #[test]
    fn test_single_avatar_has_no_listener() {
        let mut driver = ConversationDriver::new();
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(
            driver.take_turn(1, &mut rng),
            Some(Turn {
                speaker: 0,
                listener: None
            })
        );
        assert_eq!(driver.take_turn(0, &mut rng), None);
    }

    #[test]
    fn test_line_carries_trait_prefix() {
        let mut rng = StdRng::seed_from_u64(2);
        let line = compose_line(SimulationMode::Aggressive, &["bold".to_string()], &mut rng);
        assert!(line.starts_with("[bold] "));
        assert!(AGGRESSIVE_LINES.contains(&&line[7..]));
        let bare = compose_line(SimulationMode::Fireside, &[], &mut rng);
        assert!(FIRESIDE_LINES.contains(&bare.as_str()));
    }

    #[test]
    fn test_stimulation_word_from_pool() {
        let mut rng = StdRng::seed_from_u64(2);
        assert!(STIMULATION_WORDS.contains(&stimulation_word(&mut rng)));
    }
}
