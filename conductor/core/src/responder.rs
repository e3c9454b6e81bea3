//! Local Responder - Replies When the Companion Is Unreachable
//!
//! Answers are grounded in the [`KnowledgeStore`]: the best-ranked chunk is
//! quoted (whitespace-collapsed, cut to a fixed number of characters) and
//! framed by a short sentence. With no documents the responder says so.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::knowledge::{excerpt, KnowledgeStore};

/// Characters quoted in a chat reply
pub const CHAT_EXCERPT_CHARS: usize = 200;

/// Characters quoted in a stimulation reply
pub const STIMULUS_EXCERPT_CHARS: usize = 180;

/// Notice given when the store is empty
pub const NO_DOCUMENTS_REPLY: &str = "No documents in knowledge base! Please upload documents via HORIZON FEEDER button to enable informed responses about specific topics.";

/// A reply and where it came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalReply {
    /// Text to show and log
    pub text: String,
    /// Document quoted, if any
    pub source: Option<String>,
}

impl LocalReply {
    /// Footer text describing the reply
    #[must_use]
    pub fn footer(&self) -> String {
        match &self.source {
            Some(filename) => format!("Response from {filename}"),
            None => "NO DOCUMENTS - Upload via HORIZON FEEDER".to_string(),
        }
    }
}

/// Reply to a user chat message
#[must_use]
pub fn chat_reply(store: &KnowledgeStore, message: &str) -> LocalReply {
    let Some(chunk) = store.search(message).into_iter().next() else {
        return LocalReply {
            text: NO_DOCUMENTS_REPLY.to_string(),
            source: None,
        };
    };
    let quoted = excerpt(&chunk.text, CHAT_EXCERPT_CHARS);
    let text = if chunk.match_count > 0 {
        format!(
            "From \"{}\":\n\n\"{quoted}...\"\n\n- This information relates to your query about: {message}",
            chunk.filename
        )
    } else {
        format!(
            "While I didn't find exact matches for \"{message}\", here's something from {}:\n\n\"{quoted}...\"\n\n- Perhaps this provides context?",
            chunk.filename
        )
    };
    LocalReply {
        text,
        source: Some(chunk.filename),
    }
}

/// Reply to a stimulation topic word
pub fn stimulus_reply<R: Rng + ?Sized>(store: &KnowledgeStore, word: &str, rng: &mut R) -> LocalReply {
    let Some(chunk) = store.search(word).into_iter().next() else {
        let musings = [
            format!("\"{word}\"... a fascinating concept to ponder"),
            format!("The nature of {word} is intriguing"),
            format!("Consider {word} from another perspective"),
            format!("What if {word} holds the answer?"),
            format!("{word} transcends our understanding"),
            format!("Upload documents via HORIZON FEEDER for informed insights about {word}"),
        ];
        let text = musings
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| format!("The nature of {word} is intriguing"));
        return LocalReply { text, source: None };
    };
    let quoted = excerpt(&chunk.text, STIMULUS_EXCERPT_CHARS);
    let text = if chunk.match_count > 0 {
        format!(
            "Regarding \"{word}\"...\n\nFrom {}:\n\"{quoted}...\"\n\n- Found {} relevant reference(s)",
            chunk.filename, chunk.match_count
        )
    } else {
        format!(
            "\"{word}\" is an interesting concept...\n\nFrom {}:\n\"{quoted}...\"\n\n- This may provide related context",
            chunk.filename
        )
    };
    LocalReply {
        text,
        source: Some(chunk.filename),
    }
}
