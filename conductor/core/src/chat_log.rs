//! Conversation log shown next to the scene

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::protocol::MessageKind;

/// Entries kept before the oldest are dropped
pub const MAX_LOG_ENTRIES: usize = 500;

/// One logged line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local wall-clock time the entry was appended
    pub timestamp: DateTime<Local>,
    /// Display name of the sender
    pub sender: String,
    /// Message text
    pub text: String,
    /// Sender kind
    pub kind: MessageKind,
}

impl LogEntry {
    /// `HH:MM` stamp
    #[must_use]
    pub fn stamp(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }

    /// `[HH:MM] sender:\ntext\n\n`
    #[must_use]
    pub fn render(&self) -> String {
        format!("[{}] {}:\n{}\n\n", self.stamp(), self.sender, self.text)
    }
}

/// Append-only (bounded) log of the conversation
#[derive(Clone, Debug, Default)]
pub struct ConversationLog {
    entries: Vec<LogEntry>,
}

impl ConversationLog {
    /// Empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped now
    pub fn append(&mut self, sender: impl Into<String>, text: impl Into<String>, kind: MessageKind) {
        self.append_at(Local::now(), sender, text, kind);
    }

    /// Append an entry with an explicit timestamp
    pub fn append_at(
        &mut self,
        timestamp: DateTime<Local>,
        sender: impl Into<String>,
        text: impl Into<String>,
        kind: MessageKind,
    ) {
        if self.entries.len() >= MAX_LOG_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(LogEntry {
            timestamp,
            sender: sender.into(),
            text: text.into(),
            kind,
        });
    }

    /// Entries oldest first
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// The whole log as text
    #[must_use]
    pub fn render(&self) -> String {
        self.entries.iter().map(LogEntry::render).collect()
    }
}
