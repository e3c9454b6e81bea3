//! Messaging Protocol - Events Exchanged with the Companion Process
//!
//! Every frame on the wire is one JSON text message:
//!
//! ```text
//! {"event": "<snake_case name>", "data": { ...payload... }}
//! ```
//!
//! Payload field names keep the companion's spelling (`agentIndex`, `type`)
//! so either side can be swapped independently.
//!
//! # Directions
//!
//! - [`ClientEvent`]: scene → companion (roster, chat, settings, documents)
//! - [`ServerEvent`]: companion → scene (connection, messages, usage, errors)

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors encoding or decoding protocol frames
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame was not valid JSON or did not match any event
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Frame exceeded the size limit
    #[error("Frame too large: {size} bytes (max {max})")]
    TooLarge {
        /// Actual size
        size: usize,
        /// Allowed size
        max: usize,
    },
}

/// Largest frame either side accepts
pub const MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

/// Conversation pacing style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationMode {
    /// Orderly round-robin
    #[default]
    TurnByTurn,
    /// Fast, overlapping, heated
    Aggressive,
    /// Slow and reflective
    Fireside,
}

impl SimulationMode {
    /// Every mode, in cycle order
    pub const ALL: [Self; 3] = [Self::TurnByTurn, Self::Aggressive, Self::Fireside];

    /// Wire spelling
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TurnByTurn => "turn-by-turn",
            Self::Aggressive => "aggressive",
            Self::Fireside => "fireside",
        }
    }

    /// The mode after this one, wrapping
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::TurnByTurn => Self::Aggressive,
            Self::Aggressive => Self::Fireside,
            Self::Fireside => Self::TurnByTurn,
        }
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who sent a chat message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Human participant
    User,
    /// Avatar / agent
    Agent,
    /// Status notices
    System,
}

/// One roster entry as registered with the companion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Display name
    pub name: String,
    /// Personality traits
    #[serde(default)]
    pub personality: Vec<String>,
}

/// A chat line from the companion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker name
    pub agent: String,
    /// Speaker seat, when the speaker is an avatar
    #[serde(rename = "agentIndex", default, skip_serializing_if = "Option::is_none")]
    pub agent_index: Option<usize>,
    /// Text
    pub message: String,
    /// Sender kind
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Speaker traits
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personality: Vec<String>,
    /// Companion-side timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Events the scene sends to the companion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Replace the companion's roster, keyed by seat index
    RegisterAgents {
        /// Seat index (as a string key) → entry
        agents: BTreeMap<String, RosterEntry>,
    },
    /// A chat line from the human
    UserMessage {
        /// Human's display name
        username: String,
        /// Text
        message: String,
    },
    /// Change conversation pacing
    UpdateSimulationSettings {
        /// Pacing mode
        mode: SimulationMode,
        /// Topic
        topic: String,
    },
    /// Ask the companion to drive a conversation on its own
    StartAutoConversation {
        /// Optional seed topic
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
    /// Add a document to the companion's knowledge
    UploadDocument {
        /// Source file name
        filename: String,
        /// Raw text
        text: String,
    },
    /// Drop the companion's knowledge
    ClearKnowledge {},
}

/// Events the companion sends to the scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Handshake acknowledgement
    ConnectionResponse {
        /// Status text
        status: String,
        /// Session id
        #[serde(default)]
        sid: String,
    },
    /// The channel closed
    Disconnected {
        /// Why, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Roster accepted
    AgentsRegistered {
        /// Number of registered agents
        count: usize,
    },
    /// A chat line
    NewMessage(ChatMessage),
    /// Running totals of model usage
    UsageUpdate {
        /// Tokens used so far
        total_tokens: u64,
        /// Cost so far in USD
        total_cost_usd: f64,
    },
    /// Knowledge base summary
    KnowledgeStatus {
        /// Number of documents
        total_documents: usize,
        /// Distinct sources
        #[serde(default)]
        sources: Vec<String>,
    },
    /// Something went wrong on the companion side
    Error {
        /// Human-readable message
        message: String,
    },
}

/// Encode an event as a JSON text frame
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] if serialization fails.
pub fn encode<T: Serialize>(event: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode a JSON text frame
///
/// # Errors
///
/// Returns [`ProtocolError::TooLarge`] for oversized frames and
/// [`ProtocolError::Malformed`] for anything that is not a known event.
pub fn decode<T: for<'de> Deserialize<'de>>(frame: &str) -> Result<T, ProtocolError> {
    if frame.len() > MAX_FRAME_BYTES {
        return Err(ProtocolError::TooLarge {
            size: frame.len(),
            max: MAX_FRAME_BYTES,
        });
    }
    Ok(serde_json::from_str(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_new_message_uses_companion_field_names() {
        let frame = json!({
            "event": "new_message",
            "data": {
                "agent": "Osiris",
                "agentIndex": 1,
                "message": "Greetings",
                "type": "agent",
                "personality": ["judicious"],
                "timestamp": "2024-01-01T00:00:00"
            }
        })
        .to_string();
        let event: ServerEvent = decode(&frame).unwrap();
        let ServerEvent::NewMessage(message) = event else {
            panic!("expected new_message");
        };
        assert_eq!(message.agent_index, Some(1));
        assert_eq!(message.kind, MessageKind::Agent);
        assert_eq!(message.personality, vec!["judicious"]);
    }

    #[test]
    fn test_user_message_without_index() {
        let frame = r#"{"event":"new_message","data":{"agent":"Traveler","message":"hi","type":"user"}}"#;
        let event: ServerEvent = decode(frame).unwrap();
        assert!(matches!(
            event,
            ServerEvent::NewMessage(ChatMessage { agent_index: None, kind: MessageKind::User, .. })
        ));
    }

    #[test]
    fn test_client_events_encode_with_snake_case_tags() {
        let event = ClientEvent::UpdateSimulationSettings {
            mode: SimulationMode::TurnByTurn,
            topic: "Open Discussion".into(),
        };
        let value: serde_json::Value = serde_json::from_str(&encode(&event).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "update_simulation_settings",
                "data": {"mode": "turn-by-turn", "topic": "Open Discussion"}
            })
        );
    }

    #[test]
    fn test_register_agents_keys_by_seat() {
        let mut agents = BTreeMap::new();
        agents.insert(
            "0".to_string(),
            RosterEntry {
                name: "YOU".into(),
                personality: vec!["guardian".into()],
            },
        );
        let event = ClientEvent::RegisterAgents { agents };
        let decoded: ClientEvent = decode(&encode(&event).unwrap()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_unknown_event_is_malformed() {
        let result: Result<ServerEvent, _> = decode(r#"{"event":"dance","data":{}}"#);
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let frame = " ".repeat(MAX_FRAME_BYTES + 1);
        let result: Result<ServerEvent, _> = decode(&frame);
        assert!(matches!(result, Err(ProtocolError::TooLarge { .. })));
    }

    #[test]
    fn test_mode_cycle() {
        assert_eq!(SimulationMode::Fireside.next(), SimulationMode::TurnByTurn);
        assert_eq!(SimulationMode::Aggressive.to_string(), "aggressive");
    }
}
