//! App flow tests
//!
//! Drive the surface without a real terminal: commands and key presses go
//! through `App`, frames are drawn into a ratatui `TestBackend`, and the
//! companion side is an in-process channel pair.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::Terminal;

use halo_conductor::state::DEFAULT_FOOTER;
use halo_conductor::{ClientEvent, HaloConfig, InProcessTransport, ServerEvent, TransportError};
use halo_tui::{App, Command, InputMode};

const WIDTH: u16 = 100;
const HEIGHT: u16 = 30;

fn offline_app() -> App {
    let mut config = HaloConfig::default();
    config.companion_enabled = false;
    config.seed = Some(11);
    App::new(config, WIDTH, HEIGHT)
}

fn row(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width)
        .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
        .collect()
}

fn footer(app: &App) -> String {
    app.scheduler().state().footer().to_string()
}

#[test]
fn test_stimulate_round_trip_restores_footer() {
    let mut app = offline_app();
    assert_eq!(footer(&app), DEFAULT_FOOTER);

    app.apply(Command::Stimulate);
    assert!(footer(&app).starts_with("STIMULATION ACTIVATED | TOPIC: "));
    assert!(app.scheduler().state().is_stimulated());

    app.apply(Command::Stimulate);
    assert_eq!(footer(&app), DEFAULT_FOOTER);
    assert!(!app.scheduler().state().is_stimulated());
}

#[test]
fn test_keys_drive_scene_controls() {
    let mut app = offline_app();
    let press = |app: &mut App, c: char| app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));

    press(&mut app, 'f');
    assert!(app.scheduler().state().is_frozen());
    press(&mut app, 'f');
    assert!(!app.scheduler().state().is_frozen());

    press(&mut app, 'm');
    assert_eq!(footer(&app), "SIMULATION MODE: AGGRESSIVE | TOPIC: Open Discussion");

    press(&mut app, 'p');
    assert!(footer(&app).starts_with("QUICKSET APPLIED: "));

    press(&mut app, 'q');
    assert!(!app.is_running());
}

#[test]
fn test_auto_conversation_offline_runs_locally() {
    let mut app = offline_app();
    app.apply(Command::AutoConversation);
    assert!(app.scheduler().state().is_conversation_active());
    assert!(footer(&app).starts_with("CONVERSATION ACTIVE | MODE: TURN-BY-TURN"));

    app.apply(Command::ToggleConversation);
    assert!(!app.scheduler().state().is_conversation_active());
    assert_eq!(footer(&app), "CONVERSATION PAUSED");
}

#[test]
fn test_chat_prompt_submits_to_log() {
    let mut app = offline_app();
    app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert_eq!(app.input().mode(), InputMode::Chat);
    for c in "hello halo".chars() {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }
    app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

    assert_eq!(app.input().mode(), InputMode::Controls);
    let last = app.scheduler().log().last().map(|e| e.text.clone());
    assert_eq!(last.as_deref(), Some("hello halo"));
}

#[test]
fn test_draw_composites_header_and_footer() {
    let mut app = offline_app();
    app.tick(Duration::from_millis(16));

    let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();
    let buf = terminal.backend().buffer();

    assert!(row(buf, 0).starts_with(" HALO // ORB-CIRCLE "));
    assert!(row(buf, 0).contains("LOCAL"));
    assert!(row(buf, HEIGHT - 2).contains(DEFAULT_FOOTER));
    assert!(row(buf, HEIGHT - 1).contains("[enter] chat"));
}

#[test]
fn test_draw_follows_terminal_resize() {
    let mut app = offline_app();
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();
    let buf = terminal.backend().buffer();
    assert!(row(buf, 22).contains(DEFAULT_FOOTER));

    // 80 columns leave a third for the log
    app.tick(Duration::from_millis(16));
    assert_eq!(app.scheduler().output().width(), 54);
    assert_eq!(app.scheduler().output().height(), 42);
}

#[tokio::test]
async fn test_companion_round_trip_over_in_process_transport() {
    let mut app = offline_app();
    let (transport, mut companion) = InProcessTransport::new_pair();
    app.attach(Box::new(transport));
    assert!(app.has_transport());

    app.on_companion_event(Ok(ServerEvent::ConnectionResponse {
        status: "connected".to_string(),
        sid: "conn-test".to_string(),
    }));
    assert!(app.scheduler().state().is_connected());
    assert_eq!(footer(&app), "WEBSOCKET CONNECTED... OK");

    app.flush_outbox().await;
    match companion.events.recv().await {
        Some(ClientEvent::RegisterAgents { agents }) => assert_eq!(agents.len(), 7),
        other => panic!("expected roster registration, got {other:?}"),
    }

    app.apply(Command::Chat("status?".to_string()));
    app.flush_outbox().await;
    match companion.events.recv().await {
        Some(ClientEvent::UserMessage { message, .. }) => assert_eq!(message, "status?"),
        other => panic!("expected user message, got {other:?}"),
    }

    app.on_companion_event(Err(TransportError::ConnectionClosed));
    assert!(!app.has_transport());
    assert!(!app.scheduler().state().is_connected());
    assert_eq!(footer(&app), "WEBSOCKET DISCONNECTED");
}

#[tokio::test]
async fn test_outbox_without_transport_is_dropped() {
    let mut app = offline_app();
    app.on_companion_event(Ok(ServerEvent::ConnectionResponse {
        status: "connected".to_string(),
        sid: String::new(),
    }));
    app.flush_outbox().await;
    app.apply(Command::ClearKnowledge);
    app.flush_outbox().await;
    assert_eq!(footer(&app), "KNOWLEDGE CLEARED");
}

#[tokio::test]
async fn test_upload_reads_file_into_knowledge() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "the tides of the inner sea").unwrap();

    let mut app = offline_app();
    app.apply(Command::Upload(path));
    assert!(app.finish_upload().await);
    assert_eq!(footer(&app), "notes.txt stored (6 words) - LOCAL MODE");
    assert!(!app.scheduler().knowledge().is_empty());
}

#[tokio::test]
async fn test_upload_of_missing_file_reports_status() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = offline_app();
    app.apply(Command::Upload(dir.path().join("absent.txt")));
    assert!(app.finish_upload().await);
    assert_ne!(footer(&app), DEFAULT_FOOTER);
    assert!(app.scheduler().knowledge().is_empty());
}
