//! Persona voices
//!
//! Each default roster name has a temperament and a handful of one-sentence
//! lines; unknown names speak with Osiris's voice. Lines name a subject
//! pulled from the prompt so replies follow the conversation.

use rand::seq::SliceRandom;
use rand::Rng;

/// Words too common to be a subject
const STOP_WORDS: [&str; 24] = [
    "about", "after", "again", "also", "because", "been", "before", "could", "does", "from",
    "have", "just", "like", "more", "really", "should", "that", "there", "they", "this", "what",
    "when", "with", "would",
];

/// A persona's voice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Voice {
    /// Persona name the voice belongs to
    pub name: &'static str,
    /// Line templates; `{topic}` is replaced with the subject
    pub lines: &'static [&'static str],
}

const VOICES: [Voice; 7] = [
    Voice {
        name: "YOU",
        lines: &[
            "Hold on, what does {topic} actually change?",
            "Is {topic} real, or just a story we like telling?",
            "Show me why {topic} matters before we move on.",
            "Everyone keeps nodding about {topic}, and I'm not convinced.",
        ],
    },
    Voice {
        name: "Osiris",
        lines: &[
            "{topic} keeps showing up in the same shape, like tides.",
            "There's a pattern in {topic} that ties it to everyday life.",
            "I see {topic} linking what we said earlier to something practical.",
            "{topic} rhymes with things we already know.",
        ],
    },
    Voice {
        name: "Solomon",
        lines: &[
            "If {topic} holds, the next step follows on its own.",
            "Break {topic} into parts and the weak one shows itself.",
            "The evidence on {topic} points one way, with one caveat.",
            "Step by step, {topic} is simpler than it looks.",
        ],
    },
    Voice {
        name: "Azura",
        lines: &[
            "The reasoning about {topic} has a flaw.",
            "{topic} is overstated; the numbers do not support it.",
            "Precisely: {topic} fails at the edges.",
            "Your take on {topic} is imprecise.",
        ],
    },
    Voice {
        name: "Simba",
        lines: &[
            "{topic}? Do it now.",
            "Skip the theory, {topic} needs action.",
            "Fast answer: {topic} works.",
            "Cut it short: {topic} is the point.",
        ],
    },
    Voice {
        name: "Harichi",
        lines: &[
            "Both sides of {topic} have something true in them.",
            "Maybe {topic} sits somewhere in the middle.",
            "Let's weigh {topic} calmly before deciding.",
            "There's a balance to find in {topic}.",
        ],
    },
    Voice {
        name: "Angel",
        lines: &[
            "I think {topic} can bring out the best in us.",
            "There's real hope in {topic}.",
            "{topic} reminds me people can surprise you.",
            "Let's be gentle with {topic}; it matters to someone.",
        ],
    },
];

/// Voice for a persona name, falling back to Osiris
#[must_use]
pub fn voice_for(name: &str) -> &'static Voice {
    VOICES
        .iter()
        .find(|v| v.name.eq_ignore_ascii_case(name))
        .unwrap_or(&VOICES[1])
}

/// Subject of a prompt: its longest meaningful word, or `fallback`
#[must_use]
pub fn subject_of(prompt: &str, fallback: &str) -> String {
    prompt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .fold(None::<&str>, |best, w| match best {
            Some(b) if b.chars().count() >= w.chars().count() => Some(b),
            _ => Some(w),
        })
        .map_or_else(|| fallback.to_string(), str::to_lowercase)
}

/// One line from `voice` about `subject`, capitalised
pub fn speak<R: Rng + ?Sized>(voice: &Voice, subject: &str, rng: &mut R) -> String {
    let template = voice.lines.choose(rng).copied().unwrap_or("{topic}.");
    let line = template.replace("{topic}", subject);
    let mut chars = line.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unknown_name_uses_osiris() {
        assert_eq!(voice_for("Zephyr").name, "Osiris");
        assert_eq!(voice_for("azura").name, "Azura");
    }

    #[test]
    fn test_subject_is_longest_meaningful_word() {
        assert_eq!(subject_of("Let's discuss: consciousness", "x"), "consciousness");
        assert_eq!(subject_of("what about that", "Open Discussion"), "Open Discussion");
        assert_eq!(subject_of("The Quantum sea", "x"), "quantum");
    }

    #[test]
    fn test_speak_fills_subject_and_capitalises() {
        let mut rng = StdRng::seed_from_u64(1);
        let voice = voice_for("Simba");
        let line = speak(voice, "entropy", &mut rng);
        assert!(line.to_lowercase().contains("entropy"));
        assert!(line.chars().next().is_some_and(char::is_uppercase));
        assert!(!line.contains("{topic}"));
    }
}
