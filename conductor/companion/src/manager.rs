//! Conversation Manager
//!
//! Companion-side state shared by every connected surface:
//!
//! - the registered roster, keyed by seat index
//! - pacing mode and topic
//! - a bounded conversation history
//! - the knowledge store replies are grounded in
//! - running usage totals
//!
//! ```text
//! ClientEvent ──► handle_event ──► Outcome { broadcast, direct, continue_conversation }
//!                                      │
//!             server spawns N turns ◄──┘   each: pause ─► continue_turn ─► broadcast
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use chrono::Local;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use halo_conductor::knowledge::excerpt;
use halo_conductor::{
    ChatMessage, ClientEvent, KnowledgeStore, MessageKind, RosterEntry, ServerEvent,
    SimulationMode,
};

use crate::persona::{speak, subject_of, voice_for};

/// Messages kept in the shared history
const HISTORY_LIMIT: usize = 50;

/// Characters of a document quoted in a grounded reply
const QUOTE_CHARS: usize = 80;

/// Approximate characters per token for usage accounting
const CHARS_PER_TOKEN: usize = 4;

/// Cost charged per thousand tokens
const COST_PER_1K_TOKENS: f64 = 0.002;

/// Topic used until the surface sets one
pub const DEFAULT_TOPIC: &str = "General Discussion";

/// Errors a request can produce
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompanionError {
    /// A conversation was requested with nobody to speak
    #[error("No agents registered")]
    NoAgents,
}

/// A registered participant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    /// Seat index on the surface
    pub index: usize,
    /// Display name
    pub name: String,
    /// Trait tags
    pub personality: Vec<String>,
    /// Replies produced so far
    pub message_count: usize,
}

/// One line of shared history
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Who said it
    pub speaker: String,
    /// What was said
    pub content: String,
}

/// Running totals reported to surfaces
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UsageMeter {
    /// Tokens used so far
    pub total_tokens: u64,
    /// Cost so far in USD
    pub total_cost_usd: f64,
}

impl UsageMeter {
    /// Account for one prompt and its reply
    pub fn record(&mut self, prompt: &str, reply: &str) {
        let chars = prompt.chars().count() + reply.chars().count();
        let tokens = chars.div_ceil(CHARS_PER_TOKEN) as u64;
        self.total_tokens += tokens;
        #[allow(clippy::cast_precision_loss)]
        let cost = tokens as f64 / 1000.0 * COST_PER_1K_TOKENS;
        self.total_cost_usd += cost;
    }

    /// The totals as a protocol event
    #[must_use]
    pub fn event(&self) -> ServerEvent {
        ServerEvent::UsageUpdate {
            total_tokens: self.total_tokens,
            total_cost_usd: self.total_cost_usd,
        }
    }
}

/// What to do with the result of one client event
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    /// Events for every connected surface
    pub broadcast: Vec<ServerEvent>,
    /// Events for the sender only
    pub direct: Vec<ServerEvent>,
    /// Whether agents should keep talking among themselves
    pub continue_conversation: bool,
}

/// Shared conversation state
pub struct ConversationManager {
    agents: BTreeMap<usize, Agent>,
    mode: SimulationMode,
    topic: String,
    history: VecDeque<HistoryEntry>,
    turn_index: usize,
    knowledge: KnowledgeStore,
    usage: UsageMeter,
    rng: StdRng,
}

impl ConversationManager {
    /// Empty manager; `None` seeds from entropy
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            agents: BTreeMap::new(),
            mode: SimulationMode::default(),
            topic: DEFAULT_TOPIC.to_string(),
            history: VecDeque::new(),
            turn_index: 0,
            knowledge: KnowledgeStore::new(),
            usage: UsageMeter::default(),
            rng: seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
        }
    }

    /// Registered agents by seat
    #[must_use]
    pub fn agents(&self) -> &BTreeMap<usize, Agent> {
        &self.agents
    }

    /// Pacing mode
    #[must_use]
    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    /// Conversation topic
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Shared history, oldest first
    #[must_use]
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    /// Usage so far
    #[must_use]
    pub fn usage(&self) -> UsageMeter {
        self.usage
    }

    /// Apply one client event
    pub fn handle_event(&mut self, event: ClientEvent) -> Outcome {
        match event {
            ClientEvent::RegisterAgents { agents } => {
                let count = self.register_agents(agents);
                Outcome {
                    broadcast: vec![ServerEvent::AgentsRegistered { count }],
                    ..Outcome::default()
                }
            }
            ClientEvent::UpdateSimulationSettings { mode, topic } => {
                self.update_settings(mode, topic);
                Outcome::default()
            }
            ClientEvent::UserMessage { username, message } => {
                let replies = self.user_message(&username, &message);
                Outcome {
                    broadcast: self.with_usage(replies),
                    continue_conversation: true,
                    ..Outcome::default()
                }
            }
            ClientEvent::StartAutoConversation { topic } => {
                match self.start_auto_conversation(topic) {
                    Ok(replies) => Outcome {
                        broadcast: self.with_usage(replies),
                        continue_conversation: true,
                        ..Outcome::default()
                    },
                    Err(e) => Outcome {
                        direct: vec![ServerEvent::Error {
                            message: e.to_string(),
                        }],
                        ..Outcome::default()
                    },
                }
            }
            ClientEvent::UploadDocument { filename, text } => {
                if text.trim().is_empty() {
                    return Outcome {
                        direct: vec![ServerEvent::Error {
                            message: "No text provided".to_string(),
                        }],
                        ..Outcome::default()
                    };
                }
                tracing::info!(%filename, chars = text.len(), "Document added to knowledge");
                self.knowledge.add_document(filename, text);
                Outcome {
                    broadcast: vec![self.knowledge_status()],
                    ..Outcome::default()
                }
            }
            ClientEvent::ClearKnowledge {} => {
                self.knowledge.clear();
                tracing::info!("Knowledge cleared");
                Outcome {
                    broadcast: vec![self.knowledge_status()],
                    ..Outcome::default()
                }
            }
        }
    }

    /// Replace the roster; keys that are not seat numbers are skipped
    pub fn register_agents(&mut self, agents: BTreeMap<String, RosterEntry>) -> usize {
        self.agents.clear();
        for (key, entry) in agents {
            let Ok(index) = key.trim().parse::<usize>() else {
                tracing::warn!(%key, "Skipping roster entry with a non-numeric seat");
                continue;
            };
            let name = if entry.name.trim().is_empty() {
                format!("Agent-{index}")
            } else {
                entry.name
            };
            tracing::debug!(index, %name, traits = ?entry.personality, "Registered agent");
            self.agents.insert(
                index,
                Agent {
                    index,
                    name,
                    personality: entry.personality,
                    message_count: 0,
                },
            );
        }
        tracing::info!(count = self.agents.len(), "Roster registered");
        self.agents.len()
    }

    /// Change pacing mode and topic
    pub fn update_settings(&mut self, mode: SimulationMode, topic: String) {
        tracing::info!(%mode, %topic, "Simulation settings updated");
        self.mode = mode;
        self.topic = topic;
    }

    /// Record a human message and let the selected agents answer
    pub fn user_message(&mut self, username: &str, message: &str) -> Vec<ChatMessage> {
        tracing::info!(user = %username, %message, "User message");
        self.remember(username, message);
        self.respond(message, username)
    }

    /// Seed a conversation on the current (or given) topic
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::NoAgents`] when no roster is registered.
    pub fn start_auto_conversation(
        &mut self,
        topic: Option<String>,
    ) -> Result<Vec<ChatMessage>, CompanionError> {
        if self.agents.is_empty() {
            return Err(CompanionError::NoAgents);
        }
        if let Some(topic) = topic.filter(|t| !t.trim().is_empty()) {
            self.topic = topic;
        }
        let prompt = format!(
            "Let's discuss: {}. Share your initial perspective.",
            self.topic
        );
        tracing::info!(topic = %self.topic, "Starting auto conversation");
        self.remember("System", &prompt);
        Ok(self.respond(&prompt, "System"))
    }

    /// One follow-up turn answering the last thing said, with updated usage
    pub fn continue_turn(&mut self) -> Vec<ServerEvent> {
        let Some(last) = self.history.back().cloned() else {
            return Vec::new();
        };
        let replies = self.respond(&last.content, &last.speaker);
        self.with_usage(replies)
    }

    /// Number of follow-up turns after a human message
    pub fn continuation_turns(&mut self) -> usize {
        match self.mode {
            SimulationMode::Aggressive => self.rng.gen_range(12..=20),
            SimulationMode::Fireside => self.rng.gen_range(8..=15),
            SimulationMode::TurnByTurn => self.rng.gen_range(10..=18),
        }
    }

    /// Pause before a follow-up turn
    pub fn turn_pause(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(800..=2000))
    }

    /// Knowledge summary as a protocol event
    #[must_use]
    pub fn knowledge_status(&self) -> ServerEvent {
        let status = self.knowledge.status();
        ServerEvent::KnowledgeStatus {
            total_documents: status.total_documents,
            sources: status.sources,
        }
    }

    /// Pick who answers, never the previous speaker
    pub fn select_speakers(&mut self, last_speaker: Option<&str>) -> Vec<usize> {
        let candidates: Vec<usize> = self
            .agents
            .values()
            .filter(|a| last_speaker != Some(a.name.as_str()))
            .map(|a| a.index)
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut selected = match self.mode {
            SimulationMode::TurnByTurn => {
                if self.rng.gen_bool(0.2) {
                    self.pick_one(&candidates)
                } else {
                    let pick = candidates[self.turn_index % candidates.len()];
                    self.turn_index += 1;
                    vec![pick]
                }
            }
            SimulationMode::Aggressive => {
                if self.rng.gen_bool(0.3) {
                    self.pick_one(&candidates)
                } else {
                    self.pick_weighted(&candidates)
                }
            }
            SimulationMode::Fireside => {
                if self.rng.gen_bool(0.15) {
                    self.pick_one(&candidates)
                } else {
                    candidates
                        .iter()
                        .copied()
                        .min_by_key(|i| self.agents.get(i).map_or(0, |a| a.message_count))
                        .into_iter()
                        .collect()
                }
            }
        };

        if self.mode == SimulationMode::TurnByTurn
            && candidates.len() > 1
            && self.rng.gen_bool(0.15)
        {
            let others: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|i| !selected.contains(i))
                .collect();
            if let Some(&second) = others.choose(&mut self.rng) {
                tracing::debug!(second, "Spontaneous second opinion");
                selected.push(second);
            }
        }

        tracing::debug!(?selected, mode = %self.mode, "Selected speakers");
        selected
    }

    fn pick_one(&mut self, candidates: &[usize]) -> Vec<usize> {
        candidates.choose(&mut self.rng).copied().into_iter().collect()
    }

    /// Two or three voices, favouring those who spoke least
    fn pick_weighted(&mut self, candidates: &[usize]) -> Vec<usize> {
        let wanted = self.rng.gen_range(2..=3).min(candidates.len());
        #[allow(clippy::cast_precision_loss)]
        let weights: Vec<f64> = candidates
            .iter()
            .map(|i| 1.0 / (self.agents.get(i).map_or(0, |a| a.message_count) as f64 + 1.0))
            .collect();
        let Ok(dist) = WeightedIndex::new(&weights) else {
            return self.pick_one(candidates);
        };
        let mut selected = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            let pick = candidates[dist.sample(&mut self.rng)];
            if !selected.contains(&pick) {
                selected.push(pick);
            }
        }
        selected
    }

    fn respond(&mut self, prompt: &str, sender: &str) -> Vec<ChatMessage> {
        let speakers = self.select_speakers(Some(sender));
        let grounding = self
            .knowledge
            .search(prompt)
            .into_iter()
            .find(|chunk| chunk.match_count > 0);
        let subject = subject_of(prompt, &self.topic);

        let mut replies = Vec::with_capacity(speakers.len());
        for index in speakers {
            let Some(agent) = self.agents.get(&index) else {
                continue;
            };
            let mut line = speak(voice_for(&agent.name), &subject, &mut self.rng);
            if let Some(chunk) = &grounding {
                line.push_str(&format!(
                    " From {}: \"{}...\"",
                    chunk.filename,
                    excerpt(&chunk.text, QUOTE_CHARS)
                ));
            }
            let name = agent.name.clone();
            let personality = agent.personality.clone();

            self.usage.record(prompt, &line);
            if let Some(agent) = self.agents.get_mut(&index) {
                agent.message_count += 1;
            }
            self.remember(&name, &line);
            tracing::info!(agent = %name, message = %line, "Agent reply");

            replies.push(ChatMessage {
                agent: name,
                agent_index: Some(index),
                message: line,
                kind: MessageKind::Agent,
                personality,
                timestamp: Some(Local::now().to_rfc3339()),
            });
        }
        replies
    }

    fn remember(&mut self, speaker: &str, content: &str) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(HistoryEntry {
            speaker: speaker.to_string(),
            content: content.to_string(),
        });
    }

    fn with_usage(&self, replies: Vec<ChatMessage>) -> Vec<ServerEvent> {
        let mut events: Vec<ServerEvent> = replies.into_iter().map(ServerEvent::NewMessage).collect();
        if !events.is_empty() {
            events.push(self.usage.event());
        }
        events
    }
}
