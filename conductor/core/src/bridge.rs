//! Messaging Bridge - Companion Events In, Client Events Out
//!
//! Inbound [`ServerEvent`]s are applied to the scheduler between frames;
//! the visual side only ever hears "show this text on participant P" and
//! "P is speaking now". Outbound [`ClientEvent`]s queue in the
//! [`MessagingBridge`] outbox until the surface hands them to a transport.
//!
//! ```text
//! transport ──ServerEvent──► FrameScheduler::handle_server_event
//!                                ├─ AppState (connected, usage, footer)
//!                                ├─ avatar overlay + activity decay
//!                                └─ ConversationLog
//! controls ──► MessagingBridge::send ──► drain() ──► transport
//! ```

use std::collections::{BTreeMap, VecDeque};

use crate::protocol::{ChatMessage, ClientEvent, MessageKind, RosterEntry, ServerEvent};
use crate::scheduler::FrameScheduler;
use crate::state::UsageTotals;

/// Characters of the speaker name shown in the footer
const FOOTER_NAME_CHARS: usize = 20;

/// Characters of the message shown in the footer
const FOOTER_MESSAGE_CHARS: usize = 50;

/// Outbox of events waiting for the transport
#[derive(Clone, Debug, Default)]
pub struct MessagingBridge {
    outbox: VecDeque<ClientEvent>,
}

impl MessagingBridge {
    /// Empty outbox
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event
    pub fn send(&mut self, event: ClientEvent) {
        self.outbox.push_back(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<ClientEvent> {
        self.outbox.drain(..).collect()
    }

    /// Number of queued events
    #[must_use]
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }
}

impl FrameScheduler {
    /// Apply one inbound companion event
    pub fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::ConnectionResponse { status, sid } => {
                tracing::info!(%status, %sid, "Companion connected");
                self.state.set_connected(true);
                self.state.set_footer("WEBSOCKET CONNECTED... OK");
                self.register_roster();
            }
            ServerEvent::Disconnected { reason } => {
                tracing::warn!(reason = reason.as_deref().unwrap_or("unknown"), "Companion disconnected");
                self.state.set_connected(false);
                self.state.set_footer("WEBSOCKET DISCONNECTED");
            }
            ServerEvent::AgentsRegistered { count } => {
                tracing::debug!(count, "Roster registered with companion");
            }
            ServerEvent::NewMessage(message) => self.apply_chat_message(message),
            ServerEvent::UsageUpdate {
                total_tokens,
                total_cost_usd,
            } => {
                self.state.set_usage(UsageTotals {
                    total_tokens,
                    total_cost_usd,
                });
            }
            ServerEvent::KnowledgeStatus {
                total_documents,
                sources,
            } => {
                tracing::info!(total_documents, sources = ?sources, "Companion knowledge status");
            }
            ServerEvent::Error { message } => {
                tracing::warn!(%message, "Companion reported an error");
                self.state.set_footer(format!("ERROR: {message}"));
            }
        }
    }

    /// Take the events waiting for the transport
    pub fn drain_outbox(&mut self) -> Vec<ClientEvent> {
        self.bridge.drain()
    }

    /// Queue an event if the companion is connected; returns whether it was queued
    pub(crate) fn emit(&mut self, event: ClientEvent) -> bool {
        if self.state.is_connected() {
            self.bridge.send(event);
            true
        } else {
            false
        }
    }

    /// Send the current roster to the companion
    pub(crate) fn register_roster(&mut self) {
        let agents: BTreeMap<String, RosterEntry> = self
            .scene
            .avatars()
            .iter()
            .map(|avatar| {
                (
                    avatar.index().to_string(),
                    RosterEntry {
                        name: avatar.name().to_string(),
                        personality: avatar.personality().to_vec(),
                    },
                )
            })
            .collect();
        self.emit(ClientEvent::RegisterAgents { agents });
    }

    fn apply_chat_message(&mut self, message: ChatMessage) {
        if message.kind == MessageKind::Agent {
            if let Some(index) = message.agent_index {
                self.avatar_speaks(index, &message.message);
            }
        }
        let name: String = message.agent.chars().take(FOOTER_NAME_CHARS).collect();
        let preview: String = message.message.chars().take(FOOTER_MESSAGE_CHARS).collect();
        self.state.set_footer(format!("{name}: {preview}..."));
        self.log.append(message.agent, message.message, message.kind);
    }
}
