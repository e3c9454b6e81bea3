//! Main Application
//!
//! The App is a thin surface over the headless [`FrameScheduler`]:
//! - Terminal events become [`Command`]s applied between frames
//! - A frame tick advances the scene and redraws the compositor layers
//! - Companion events arrive through a [`CompanionTransport`] and the
//!   scheduler's outbox is flushed back after every loop turn
//! - Document reads run on their own task and report through a channel
//!
//! ```text
//!   ┌──────────────────────── header ─────────────────────────┐
//!   │                                         │               │
//!   │      scene (half-block framebuffer)     │   log panel   │
//!   │      + labels / speech overlays         │               │
//!   │                                         │               │
//!   ├──────────────────────── footer ─────────────────────────┤
//!   └──────────────────────── prompt ─────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEventKind};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;
use ratatui::{Frame, Terminal};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use halo_conductor::transport::connect_companion;
use halo_conductor::{
    read_document, CompanionTransport, FrameScheduler, HaloConfig, IngestError, IngestedDocument,
    LogEntry, PersonaPreset, ServerEvent, TransportError,
};

use crate::compositor::{Compositor, LayerId};
use crate::input::{Command, InputState};
use crate::presenter::{pixel_size, present};
use crate::theme::terminal_color;
use crate::widgets::{draw_footer, draw_header, draw_labels, draw_prompt, LogPanel, LogPanelState};

/// Preferred width of the log panel
const LOG_WIDTH: u16 = 42;

/// Narrowest scene that still gets the full log panel
const MIN_SCENE_WIDTH: u16 = 40;

/// Pending document reads before new ones wait
const UPLOAD_CAPACITY: usize = 8;

/// Lines scrolled per mouse wheel step
const WHEEL_LINES: isize = 3;

type Connecting = oneshot::Receiver<Result<Box<dyn CompanionTransport>, TransportError>>;
type UploadResult = Result<IngestedDocument, IngestError>;

/// Layer assignments
struct AppLayers {
    header: LayerId,
    scene: LayerId,
    labels: LayerId,
    log: LayerId,
    footer: LayerId,
    prompt: LayerId,
}

/// Screen regions for a terminal size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Regions {
    /// Title line
    pub header: Rect,
    /// Scene and overlays
    pub scene: Rect,
    /// Conversation log
    pub log: Rect,
    /// Status footer
    pub footer: Rect,
    /// Prompt line
    pub prompt: Rect,
}

impl Regions {
    /// Split a `width` × `height` screen
    #[must_use]
    pub fn split(width: u16, height: u16) -> Self {
        let body_height = height.saturating_sub(3);
        let log_width = if width >= MIN_SCENE_WIDTH + LOG_WIDTH {
            LOG_WIDTH
        } else {
            width / 3
        };
        let scene_width = width.saturating_sub(log_width);
        Self {
            header: Rect::new(0, 0, width, 1.min(height)),
            scene: Rect::new(0, 1, scene_width, body_height),
            log: Rect::new(scene_width, 1, log_width, body_height),
            footer: Rect::new(0, 1 + body_height, width, u16::from(height >= 2)),
            prompt: Rect::new(0, height.saturating_sub(1), width, u16::from(height >= 3)),
        }
    }
}

/// Main application state
pub struct App {
    // === Scene ===
    scheduler: FrameScheduler,
    config: HaloConfig,
    preset: PersonaPreset,

    // === Companion ===
    transport: Option<Box<dyn CompanionTransport>>,
    connecting: Option<Connecting>,
    uploads_tx: mpsc::Sender<UploadResult>,
    uploads_rx: mpsc::Receiver<UploadResult>,

    // === Display ===
    compositor: Compositor,
    layers: AppLayers,
    input: InputState,
    log_state: LogPanelState,

    // === Misc ===
    running: bool,
    last_frame: Instant,
}

impl App {
    /// App for a `width` × `height` terminal
    #[must_use]
    pub fn new(config: HaloConfig, width: u16, height: u16) -> Self {
        let regions = Regions::split(width, height);
        let (px_w, px_h) = pixel_size(regions.scene);
        let scheduler = FrameScheduler::new(
            config.scene_description(),
            config.scheduler_settings(),
            px_w,
            px_h,
        );

        let mut compositor = Compositor::new(Rect::new(0, 0, width, height));
        let layers = AppLayers {
            scene: compositor.create_layer(regions.scene, 0),
            labels: compositor.create_layer(regions.scene, 20),
            log: compositor.create_layer(regions.log, 10),
            header: compositor.create_layer(regions.header, 10),
            footer: compositor.create_layer(regions.footer, 10),
            prompt: compositor.create_layer(regions.prompt, 10),
        };
        let (uploads_tx, uploads_rx) = mpsc::channel(UPLOAD_CAPACITY);

        info!(
            scene = %config.scene_variant,
            agents = config.agent_count,
            width,
            height,
            "Surface ready"
        );

        Self {
            scheduler,
            config,
            preset: PersonaPreset::default(),
            transport: None,
            connecting: None,
            uploads_tx,
            uploads_rx,
            compositor,
            layers,
            input: InputState::new(),
            log_state: LogPanelState::default(),
            running: true,
            last_frame: Instant::now(),
        }
    }

    /// The scene engine
    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Prompt state
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Whether the loop should keep going
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a companion transport is attached
    #[must_use]
    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Attach a transport that is already connected
    pub fn attach(&mut self, transport: Box<dyn CompanionTransport>) {
        self.connecting = None;
        self.transport = Some(transport);
    }

    /// Start connecting to the companion in the background
    pub fn connect(&mut self) {
        if !self.config.companion_enabled {
            info!("Companion disabled, running locally");
            return;
        }
        let url = self.config.companion_url.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = connect_companion(&url).await;
            if tx.send(result).is_err() {
                debug!("Surface closed before the companion answered");
            }
        });
        self.connecting = Some(rx);
    }

    /// Main event loop
    ///
    /// # Errors
    ///
    /// Returns an error when the terminal can no longer be read or drawn.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(self.config.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.connect();
        self.last_frame = Instant::now();

        while self.running {
            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_terminal_event(event),
                    Some(Err(e)) => {
                        return Err(anyhow::Error::new(e).context("Terminal event stream failed"));
                    }
                    None => self.running = false,
                },

                connected = Self::next_connection(&mut self.connecting) => {
                    self.on_connected(connected);
                }

                incoming = Self::next_companion_event(&mut self.transport) => {
                    self.on_companion_event(incoming);
                }

                Some(result) = self.uploads_rx.recv() => {
                    self.scheduler.ingest_document(result);
                }

                _ = ticker.tick() => {
                    let now = Instant::now();
                    let dt = now - self.last_frame;
                    self.last_frame = now;
                    self.tick(dt);
                    terminal.draw(|frame| self.draw(frame)).context("Failed to draw frame")?;
                }
            }

            self.flush_outbox().await;
        }

        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!(error = %e, "Companion close failed");
            }
        }
        Ok(())
    }

    /// Advance the scene by `dt`
    pub fn tick(&mut self, dt: Duration) {
        self.scheduler.frame(dt);
    }

    /// Route one terminal event
    pub fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.log_state.scroll(WHEEL_LINES),
                MouseEventKind::ScrollDown => self.log_state.scroll(-WHEEL_LINES),
                _ => {}
            },
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(command) = self.input.handle_key(key) {
            self.apply(command);
        }
    }

    /// Apply a command to the scene
    pub fn apply(&mut self, command: Command) {
        debug!(?command, "Command");
        match command {
            Command::Quit => self.running = false,
            Command::Stimulate => {
                self.scheduler.toggle_stimulate();
            }
            Command::Freeze => {
                self.scheduler.toggle_freeze();
            }
            Command::ToggleConversation => {
                self.scheduler.toggle_conversation();
            }
            Command::Repopulate => self.scheduler.repopulate(),
            Command::NextPreset => {
                self.preset = self.preset.next();
                self.scheduler.apply_preset(self.preset);
            }
            Command::RollPersonas => self.scheduler.roll_personas(),
            Command::NextMode => {
                let mode = self.scheduler.state().simulation().mode.next();
                self.scheduler.apply_simulation(mode);
            }
            Command::AutoConversation => {
                if !self.scheduler.request_auto_conversation() {
                    info!("Auto conversation needs the companion; starting locally");
                    if !self.scheduler.state().is_conversation_active() {
                        self.scheduler.start_conversation();
                    }
                }
            }
            Command::ClearKnowledge => self.scheduler.clear_knowledge(),
            Command::Chat(message) => {
                self.log_state.scroll_to_bottom();
                self.scheduler.submit_chat(&message);
            }
            Command::Upload(path) => {
                let tx = self.uploads_tx.clone();
                tokio::spawn(async move {
                    let result = read_document(&path).await;
                    if tx.send(result).await.is_err() {
                        debug!(path = %path.display(), "Upload finished after the surface closed");
                    }
                });
            }
            Command::Scroll(delta) => self.log_state.scroll(delta),
        }
    }

    /// Wait for the next finished document read and ingest it
    pub async fn finish_upload(&mut self) -> bool {
        match self.uploads_rx.recv().await {
            Some(result) => {
                self.scheduler.ingest_document(result);
                true
            }
            None => false,
        }
    }

    /// Follow a terminal resize
    pub fn resize(&mut self, width: u16, height: u16) {
        let regions = Regions::split(width, height);
        self.compositor.resize(Rect::new(0, 0, width, height));
        self.compositor.place(self.layers.header, regions.header);
        self.compositor.place(self.layers.scene, regions.scene);
        self.compositor.place(self.layers.labels, regions.scene);
        self.compositor.place(self.layers.log, regions.log);
        self.compositor.place(self.layers.footer, regions.footer);
        self.compositor.place(self.layers.prompt, regions.prompt);
        let (px_w, px_h) = pixel_size(regions.scene);
        self.scheduler.resize(px_w, px_h);
        debug!(width, height, px_w, px_h, "Resized");
    }

    /// Draw the current frame
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area != self.compositor.area() {
            self.resize(area.width, area.height);
        }

        let scene = self.scheduler.scene();
        let state = self.scheduler.state();

        if let Some(buf) = self.compositor.begin(self.layers.scene) {
            present(self.scheduler.output(), buf);
        }
        if let Some(buf) = self.compositor.begin(self.layers.labels) {
            draw_labels(buf, scene.avatars(), &self.scheduler.label_anchors());
        }
        if let Some(buf) = self.compositor.begin(self.layers.log) {
            let accent = |entry: &LogEntry| {
                scene
                    .find_avatar(&entry.sender)
                    .and_then(|i| scene.avatars().get(i))
                    .map(|avatar| terminal_color(avatar.color()))
            };
            let panel_area = buf.area;
            LogPanel::new(self.scheduler.log().entries(), accent).render(
                panel_area,
                buf,
                &mut self.log_state,
            );
        }
        if let Some(buf) = self.compositor.begin(self.layers.header) {
            draw_header(buf, state, self.config.scene_variant.as_str());
        }
        if let Some(buf) = self.compositor.begin(self.layers.footer) {
            draw_footer(buf, state.footer());
        }
        if let Some(buf) = self.compositor.begin(self.layers.prompt) {
            draw_prompt(buf, &self.input, self.scheduler.username());
        }

        self.compositor.composite_into(frame.buffer_mut());
    }

    /// Send everything the scene queued for the companion
    pub async fn flush_outbox(&mut self) {
        let events = self.scheduler.drain_outbox();
        let Some(transport) = self.transport.as_mut() else {
            if !events.is_empty() {
                debug!(dropped = events.len(), "No transport for queued events");
            }
            return;
        };
        let mut failure = None;
        for event in events {
            if let Err(e) = transport.send(event).await {
                failure = Some(e);
                break;
            }
        }
        if let Some(e) = failure {
            self.drop_transport(&e);
        }
    }

    /// Apply an inbound companion event or a receive failure
    pub fn on_companion_event(&mut self, incoming: Result<ServerEvent, TransportError>) {
        match incoming {
            Ok(event) => self.scheduler.handle_server_event(event),
            Err(e) => self.drop_transport(&e),
        }
    }

    fn on_connected(&mut self, connected: Result<Box<dyn CompanionTransport>, TransportError>) {
        match connected {
            Ok(transport) => {
                info!(url = %self.config.companion_url, "Companion transport open");
                self.transport = Some(transport);
            }
            Err(e) => {
                warn!(url = %self.config.companion_url, error = %e, "Companion unreachable, staying local");
                self.scheduler.handle_server_event(ServerEvent::Disconnected {
                    reason: Some(e.to_string()),
                });
            }
        }
    }

    fn drop_transport(&mut self, error: &TransportError) {
        warn!(error = %error, "Companion transport lost");
        self.transport = None;
        self.scheduler.handle_server_event(ServerEvent::Disconnected {
            reason: Some(error.to_string()),
        });
    }

    async fn next_connection(
        slot: &mut Option<Connecting>,
    ) -> Result<Box<dyn CompanionTransport>, TransportError> {
        let Some(rx) = slot.as_mut() else {
            return std::future::pending().await;
        };
        let result = rx.await;
        *slot = None;
        result.unwrap_or(Err(TransportError::ConnectionClosed))
    }

    async fn next_companion_event(
        slot: &mut Option<Box<dyn CompanionTransport>>,
    ) -> Result<ServerEvent, TransportError> {
        match slot.as_mut() {
            Some(transport) => transport.recv().await,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_regions_cover_the_screen() {
        let r = Regions::split(120, 40);
        assert_eq!(r.header, Rect::new(0, 0, 120, 1));
        assert_eq!(r.scene, Rect::new(0, 1, 78, 37));
        assert_eq!(r.log, Rect::new(78, 1, 42, 37));
        assert_eq!(r.footer, Rect::new(0, 38, 120, 1));
        assert_eq!(r.prompt, Rect::new(0, 39, 120, 1));
    }

    #[test]
    fn test_narrow_screen_shrinks_log() {
        let r = Regions::split(60, 20);
        assert_eq!(r.log.width, 20);
        assert_eq!(r.scene.width, 40);
    }

    #[test]
    fn test_tiny_screen_does_not_underflow() {
        let r = Regions::split(2, 1);
        assert_eq!(r.scene.height, 0);
        assert_eq!(r.prompt.height, 0);
    }
}
