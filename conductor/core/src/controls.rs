//! Controls - User Commands Applied Between Frames
//!
//! Each surface control maps to one method on [`FrameScheduler`]:
//!
//! | Control | Method |
//! |---|---|
//! | stimulate | [`FrameScheduler::toggle_stimulate`] |
//! | freeze | [`FrameScheduler::toggle_freeze`] |
//! | start / stop chat | [`FrameScheduler::toggle_conversation`] |
//! | repopulate | [`FrameScheduler::repopulate`] |
//! | personas | [`FrameScheduler::apply_personas`], [`FrameScheduler::apply_preset`], [`FrameScheduler::roll_personas`] |
//! | simulation rules | [`FrameScheduler::apply_simulation`] |
//! | chat input | [`FrameScheduler::submit_chat`] |
//! | document upload | [`FrameScheduler::ingest_document`], [`FrameScheduler::clear_knowledge`] |

use std::time::Duration;

use rand::Rng;

use crate::conversation::stimulation_word;
use crate::ingest::{IngestError, IngestedDocument};
use crate::protocol::{ClientEvent, MessageKind};
use crate::responder::{chat_reply, stimulus_reply};
use crate::scene::{default_identity, roll_traits, PersonaPreset};
use crate::scheduler::{ClockEvent, FrameScheduler};
use crate::state::{SimulationMode, SimulationSettings, APPLIED_TOPIC};

/// A requested change to one avatar's identity
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonaEdit {
    /// Avatar seat
    pub index: usize,
    /// New display name
    pub name: Option<String>,
    /// New trait list
    pub traits: Option<Vec<String>>,
}

impl FrameScheduler {
    /// Display name used for the human
    #[must_use]
    pub fn username(&self) -> &str {
        &self.settings.username
    }

    /// Change the human's display name (blank keeps the current one)
    pub fn set_username(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.settings.username = name.to_string();
        }
    }

    /// Toggle stimulation; returns the new flag
    pub fn toggle_stimulate(&mut self) -> bool {
        let on = self.state.toggle_stimulated();
        if on {
            let now = self.clock.now();
            for avatar in self.scene.avatars_mut() {
                avatar.stimulate(now);
            }
            let word = stimulation_word(&mut self.rng).to_string();
            let prompt = format!("Let's discuss: {word}");
            let username = self.settings.username.clone();
            self.log.append(username.clone(), prompt.clone(), MessageKind::User);

            self.saved_footer = Some(self.state.footer().to_string());
            self.state
                .set_footer(format!("STIMULATION ACTIVATED | TOPIC: {}", word.to_uppercase()));

            let sent = self.emit(ClientEvent::UserMessage {
                username,
                message: prompt,
            });
            if !sent {
                self.schedule_stimulus_reply(&word);
            }
            self.state.set_stimulus_topic(Some(word));
        } else {
            self.state.set_stimulus_topic(None);
            match self.saved_footer.take() {
                Some(footer) => self.state.set_footer(footer),
                None => self.state.reset_footer(),
            }
        }
        self.camera.set_auto_rotate_speed(self.state.camera_speed());
        self.reschedule_link_trigger();
        tracing::info!(stimulated = on, "Stimulation toggled");
        on
    }

    /// Toggle freeze; returns the new flag
    pub fn toggle_freeze(&mut self) -> bool {
        let frozen = self.state.toggle_frozen();
        if frozen {
            let t = self.animation_time();
            for avatar in self.scene.avatars_mut() {
                avatar.freeze(t);
            }
        }
        self.camera.set_auto_rotate(!frozen);
        self.clock.set_paused(frozen);
        tracing::info!(frozen, "Freeze toggled");
        frozen
    }

    /// Start or stop the local conversation driver
    pub fn toggle_conversation(&mut self) -> bool {
        if self.state.is_conversation_active() {
            self.stop_conversation();
        } else {
            self.start_conversation();
        }
        self.state.is_conversation_active()
    }

    /// Start the conversation: speak now, then on the mode's interval
    pub fn start_conversation(&mut self) {
        if self.state.is_conversation_active() || self.scene.avatars().is_empty() {
            return;
        }
        let settings = self.state.simulation().clone();
        self.state.set_conversation_active(true);
        self.state.set_footer(format!(
            "CONVERSATION ACTIVE | MODE: {} | TOPIC: {}",
            settings.mode.label(),
            settings.topic
        ));
        let interval = Duration::from_millis(settings.mode.turn_interval_ms());
        let timer = self.clock.every(interval, ClockEvent::ConversationTurn);
        self.conversation.start(timer);
        tracing::info!(mode = %settings.mode, topic = %settings.topic, "Conversation started");
        self.conversation_turn();
    }

    /// Stop the conversation and cancel its interval
    pub fn stop_conversation(&mut self) {
        self.state.set_conversation_active(false);
        if let Some(timer) = self.conversation.stop() {
            self.clock.cancel(timer);
        }
        self.state.set_footer("CONVERSATION PAUSED");
        tracing::info!("Conversation stopped");
    }

    /// Rebuild the default roster and its links, restarting the conversation shortly after
    pub fn repopulate(&mut self) {
        self.stop_conversation();
        let count = self.scene.description().agent_count;
        let identities = (0..count).map(default_identity).collect();
        self.scene.populate(identities, &mut self.rng);
        self.state.set_roster_count(self.scene.avatars().len());
        self.register_roster();
        self.clock
            .after(self.settings.restart_delay, ClockEvent::RestartConversation);
        tracing::info!(avatars = count, "Roster repopulated");
    }

    /// Apply names and trait lists per avatar
    pub fn apply_personas(&mut self, edits: &[PersonaEdit]) {
        for edit in edits {
            let Some(avatar) = self.scene.avatar_mut(edit.index) else {
                continue;
            };
            if let Some(name) = edit.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                avatar.rename(name);
            }
            if let Some(traits) = &edit.traits {
                avatar.set_personality(traits.clone());
            }
        }
        self.state.set_footer("PERSONAS UPDATED... OK");
        self.register_roster();
    }

    /// Apply a quickset preset to every avatar
    pub fn apply_preset(&mut self, preset: PersonaPreset) {
        for avatar in self.scene.avatars_mut() {
            let traits = preset.traits(avatar.index());
            avatar.set_personality(traits);
        }
        self.state
            .set_footer(format!("QUICKSET APPLIED: {}", preset.as_str().to_uppercase()));
        self.register_roster();
    }

    /// Roll random traits for every avatar
    pub fn roll_personas(&mut self) {
        let count = self.scene.avatars().len();
        for index in 0..count {
            let traits = roll_traits(&mut self.rng);
            if let Some(avatar) = self.scene.avatar_mut(index) {
                avatar.set_personality(traits);
            }
        }
        self.state.set_footer("PERSONAS UPDATED... OK");
        self.register_roster();
    }

    /// Apply a pacing mode with the "Open Discussion" topic
    pub fn apply_simulation(&mut self, mode: SimulationMode) {
        let settings = SimulationSettings {
            mode,
            topic: APPLIED_TOPIC.to_string(),
        };
        self.state.set_simulation(settings.clone());
        self.emit(ClientEvent::UpdateSimulationSettings {
            mode,
            topic: settings.topic.clone(),
        });
        self.state.set_footer(format!(
            "SIMULATION MODE: {} | TOPIC: {}",
            mode.label(),
            settings.topic
        ));
        self.camera.set_auto_rotate_speed(self.state.camera_speed());
    }

    /// Ask the companion to run its own conversation
    pub fn request_auto_conversation(&mut self) -> bool {
        let topic = Some(self.state.simulation().topic.clone());
        self.emit(ClientEvent::StartAutoConversation { topic })
    }

    /// Submit a chat line from the human
    pub fn submit_chat(&mut self, message: &str) {
        let message = message.trim();
        if message.is_empty() {
            return;
        }
        let username = self.settings.username.clone();
        self.log.append(username.clone(), message, MessageKind::User);

        let sent = self.emit(ClientEvent::UserMessage {
            username,
            message: message.to_string(),
        });
        if sent {
            return;
        }

        self.state.set_footer("LOCAL MODE - Searching documents...");
        let reply = chat_reply(&self.knowledge, message);
        self.state.set_footer(reply.footer());
        self.schedule_local_reply(reply.text);
    }

    /// Add an ingested document, or report why it was rejected
    pub fn ingest_document(&mut self, result: Result<IngestedDocument, IngestError>) {
        let document = match result {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(error = %err, "Document rejected");
                self.state.set_footer(err.status_text());
                return;
            }
        };
        let words = document.word_count();
        self.knowledge
            .add_document(document.filename.clone(), document.text.clone());
        let footer = if self.emit(ClientEvent::UploadDocument {
            filename: document.filename.clone(),
            text: document.text,
        }) {
            format!("{} uploaded ({words} words) - SERVER + LOCAL", document.filename)
        } else {
            format!("{} stored ({words} words) - LOCAL MODE", document.filename)
        };
        self.state.set_footer(footer);
    }

    /// Drop every uploaded document, locally and on the companion
    pub fn clear_knowledge(&mut self) {
        self.knowledge.clear();
        self.emit(ClientEvent::ClearKnowledge {});
        self.state.set_footer("KNOWLEDGE CLEARED");
    }

    fn schedule_stimulus_reply(&mut self, word: &str) {
        let reply = stimulus_reply(&self.knowledge, word, &mut self.rng);
        self.schedule_local_reply(reply.text);
    }

    fn schedule_local_reply(&mut self, text: String) {
        let count = self.scene.avatars().len();
        if count == 0 {
            return;
        }
        let avatar = self.rng.gen_range(0..count);
        let roster = self.scene.roster_epoch();
        self.clock.after(
            self.settings.reply_delay,
            ClockEvent::LocalReply {
                avatar,
                text,
                roster,
            },
        );
    }
}
