//! Header, footer and prompt lines

use ratatui::buffer::Buffer;
use ratatui::style::{Modifier, Style};

use halo_conductor::AppState;

use crate::input::{InputMode, InputState};
use crate::theme::{DIM_GRAY, FOOTER_AMBER, HALO_CYAN, USAGE_TEAL, USER_GREEN};

/// Title, roster size, mode, usage and link state
pub fn draw_header(buf: &mut Buffer, state: &AppState, variant: &str) {
    let area = buf.area;
    let width = usize::from(area.width);
    let link = if state.is_connected() { "ONLINE" } else { "LOCAL" };
    let title = format!(" HALO // {} ", variant.to_uppercase());
    let (x, _) = buf.set_stringn(
        0,
        0,
        &title,
        width,
        Style::default().fg(HALO_CYAN).add_modifier(Modifier::BOLD),
    );
    let details = format!(
        "AGENTS: {} | MODE: {} | {} | {}",
        state.roster_count(),
        state.simulation().mode.label(),
        link,
        state.usage().display(),
    );
    buf.set_stringn(
        x,
        0,
        &details,
        width.saturating_sub(usize::from(x)),
        Style::default().fg(USAGE_TEAL),
    );
}

/// The status footer
pub fn draw_footer(buf: &mut Buffer, footer: &str) {
    let width = usize::from(buf.area.width);
    buf.set_stringn(1, 0, footer, width.saturating_sub(1), Style::default().fg(FOOTER_AMBER));
}

/// The open prompt, or the key hints
pub fn draw_prompt(buf: &mut Buffer, input: &InputState, username: &str) {
    let width = usize::from(buf.area.width);
    let (text, style) = match input.mode() {
        InputMode::Controls => (
            " [enter] chat  [s]timulate  [f]reeze  [c]onverse  [r]epopulate  [p]reset  [R]oll  [m]ode  [a]uto  [u]pload  [k] clear  [q]uit"
                .to_string(),
            Style::default().fg(DIM_GRAY),
        ),
        InputMode::Chat => (
            format!(" {username}: {}_", input.buffer()),
            Style::default().fg(USER_GREEN),
        ),
        InputMode::UploadPath => (
            format!(" upload path: {}_", input.buffer()),
            Style::default().fg(HALO_CYAN),
        ),
    };
    // Keep the cursor end of a long line in view
    let chars = text.chars().count();
    let visible: String = text.chars().skip(chars.saturating_sub(width)).collect();
    let shown = if matches!(input.mode(), InputMode::Controls) { &text } else { &visible };
    buf.set_stringn(0, 0, shown, width, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;
    use ratatui::layout::Rect;

    fn row(buf: &Buffer) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, 0)).map(|c| c.symbol().to_string()))
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_header_shows_mode_and_usage() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 120, 1));
        draw_header(&mut buf, &AppState::new(), "orb-circle");
        let text = row(&buf);
        assert!(text.starts_with(" HALO // ORB-CIRCLE "));
        assert!(text.contains("MODE: TURN-BY-TURN"));
        assert!(text.contains("LOCAL"));
        assert!(text.contains("0 tokens"));
    }

    #[test]
    fn test_chat_prompt_keeps_tail_visible() {
        let mut input = InputState::new();
        input.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        for c in "a long message that will not fit".chars() {
            input.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        draw_prompt(&mut buf, &input, "Traveler");
        assert_eq!(row(&buf), "t not fit_");
    }
}
