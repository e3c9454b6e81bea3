//! Keyboard Input
//!
//! Turns key presses into [`Command`]s. Outside of a prompt every key is a
//! scene control; `Enter` opens the chat prompt and `u` the upload prompt.
//!
//! | Key | Command |
//! |-----|---------|
//! | `s` | toggle stimulation |
//! | `f` | toggle freeze |
//! | `c` | start / stop the conversation |
//! | `r` | repopulate the roster |
//! | `p` | next persona preset |
//! | `R` | roll random personas |
//! | `m` | next simulation mode |
//! | `a` | ask the companion to converse on its own |
//! | `u` | upload a document (path prompt) |
//! | `k` | clear knowledge |
//! | `Enter` / `i` | chat prompt |
//! | `PgUp` / `PgDn` | scroll the log |
//! | `q` / `Esc` / `Ctrl-C` | quit |

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Lines scrolled per page key
pub const SCROLL_PAGE: isize = 5;

/// What a key press asks the app to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exit the app
    Quit,
    /// Toggle stimulation
    Stimulate,
    /// Toggle freeze
    Freeze,
    /// Start or stop the local conversation
    ToggleConversation,
    /// Rebuild the roster
    Repopulate,
    /// Apply the next persona preset
    NextPreset,
    /// Roll random personas
    RollPersonas,
    /// Apply the next simulation mode
    NextMode,
    /// Ask the companion to drive a conversation
    AutoConversation,
    /// Drop uploaded documents
    ClearKnowledge,
    /// Send a chat line
    Chat(String),
    /// Read and ingest a document
    Upload(PathBuf),
    /// Scroll the log; positive is toward older lines
    Scroll(isize),
}

/// Which prompt, if any, owns the keyboard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Keys are scene controls
    #[default]
    Controls,
    /// Typing a chat line
    Chat,
    /// Typing a document path
    UploadPath,
}

/// Prompt mode and the text typed so far
#[derive(Debug, Default)]
pub struct InputState {
    mode: InputMode,
    buffer: String,
}

impl InputState {
    /// Controls mode, empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    #[must_use]
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Text typed into the open prompt
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Command::Quit);
        }
        match key.code {
            KeyCode::PageUp => return Some(Command::Scroll(SCROLL_PAGE)),
            KeyCode::PageDown => return Some(Command::Scroll(-SCROLL_PAGE)),
            _ => {}
        }
        match self.mode {
            InputMode::Controls => self.control_key(key.code),
            InputMode::Chat | InputMode::UploadPath => self.prompt_key(key.code),
        }
    }

    fn control_key(&mut self, code: KeyCode) -> Option<Command> {
        let command = match code {
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            KeyCode::Char('s') => Command::Stimulate,
            KeyCode::Char('f') => Command::Freeze,
            KeyCode::Char('c') => Command::ToggleConversation,
            KeyCode::Char('r') => Command::Repopulate,
            KeyCode::Char('p') => Command::NextPreset,
            KeyCode::Char('R') => Command::RollPersonas,
            KeyCode::Char('m') => Command::NextMode,
            KeyCode::Char('a') => Command::AutoConversation,
            KeyCode::Char('k') => Command::ClearKnowledge,
            KeyCode::Char('u') => {
                self.open(InputMode::UploadPath);
                return None;
            }
            KeyCode::Enter | KeyCode::Char('i') => {
                self.open(InputMode::Chat);
                return None;
            }
            _ => return None,
        };
        Some(command)
    }

    fn prompt_key(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Esc => {
                self.open(InputMode::Controls);
                None
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                None
            }
            KeyCode::Char(c) => {
                self.buffer.push(c);
                None
            }
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.buffer);
                let mode = std::mem::take(&mut self.mode);
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                match mode {
                    InputMode::Chat => Some(Command::Chat(text.to_string())),
                    InputMode::UploadPath => Some(Command::Upload(PathBuf::from(text))),
                    InputMode::Controls => None,
                }
            }
            _ => None,
        }
    }

    fn open(&mut self, mode: InputMode) {
        self.mode = mode;
        self.buffer.clear();
    }
}
