//! Conversation Log Panel
//!
//! A borderless, bottom-anchored view of the conversation log. Each entry
//! renders as a `[HH:MM] sender:` header followed by its wrapped text and a
//! blank line. Scrolling counts lines up from the newest.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;

use halo_conductor::{LogEntry, MessageKind};

use crate::theme::{AGENT_MAGENTA, DIM_GRAY, STAMP_GRAY, SYSTEM_GRAY, USER_GREEN};

/// Scroll state for the log panel
#[derive(Debug, Default)]
pub struct LogPanelState {
    /// Lines scrolled up from the bottom (0 = newest)
    pub scroll_offset: usize,
    /// Total wrapped lines at the last render
    pub total_lines: usize,
}

impl LogPanelState {
    /// Scroll by `delta` lines; positive scrolls toward older entries
    pub fn scroll(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
        self.scroll_offset = self.scroll_offset.min(self.total_lines.saturating_sub(1));
    }

    /// Jump back to the newest entry
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

/// Renders log entries, coloring each sender
pub struct LogPanel<'a, F> {
    entries: &'a [LogEntry],
    accent: F,
}

impl<'a, F> LogPanel<'a, F>
where
    F: Fn(&LogEntry) -> Option<Color>,
{
    /// Panel over `entries`; `accent` picks an agent's color by entry
    pub fn new(entries: &'a [LogEntry], accent: F) -> Self {
        Self { entries, accent }
    }

    fn sender_style(&self, entry: &LogEntry) -> Style {
        let color = match entry.kind {
            MessageKind::User => USER_GREEN,
            MessageKind::System => SYSTEM_GRAY,
            MessageKind::Agent => (self.accent)(entry).unwrap_or(AGENT_MAGENTA),
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Wrapped lines for the whole log, as `(stamp, text, style)`
    fn lines(&self, width: usize) -> Vec<(Option<String>, String, Style)> {
        let mut lines = Vec::new();
        for entry in self.entries {
            lines.push((
                Some(format!("[{}] ", entry.stamp())),
                format!("{}:", entry.sender),
                self.sender_style(entry),
            ));
            for paragraph in entry.text.lines() {
                for line in wrap(paragraph, width.max(1)) {
                    lines.push((None, line.into_owned(), Style::default()));
                }
            }
            lines.push((None, String::new(), Style::default()));
        }
        lines
    }
}

impl<F> StatefulWidget for LogPanel<'_, F>
where
    F: Fn(&LogEntry) -> Option<Color>,
{
    type State = LogPanelState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width < 4 || area.height == 0 {
            return;
        }
        // One column for the separator
        let separator = Style::default().fg(DIM_GRAY);
        for y in area.y..area.y + area.height {
            buf.set_string(area.x, y, "│", separator);
        }
        let text_x = area.x + 2;
        let width = usize::from(area.width.saturating_sub(2));
        let height = usize::from(area.height);

        let lines = self.lines(width);
        state.total_lines = lines.len();
        let max_scroll = lines.len().saturating_sub(height);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let end = lines.len() - state.scroll_offset;
        let start = end.saturating_sub(height);
        for (row, (stamp, text, style)) in lines[start..end].iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + row as u16;
            let mut x = text_x;
            if let Some(stamp) = stamp {
                let (next_x, _) = buf.set_stringn(x, y, stamp, width, Style::default().fg(STAMP_GRAY));
                x = next_x;
            }
            let remaining = width.saturating_sub(usize::from(x - text_x));
            buf.set_stringn(x, y, text, remaining, *style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;

    fn entry(sender: &str, text: &str, kind: MessageKind) -> LogEntry {
        LogEntry {
            timestamp: Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            sender: sender.to_string(),
            text: text.to_string(),
            kind,
        }
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_newest_entry_is_at_the_bottom() {
        let entries = vec![
            entry("Traveler", "hello", MessageKind::User),
            entry("Azura", "greetings", MessageKind::Agent),
        ];
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        let mut state = LogPanelState::default();
        LogPanel::new(&entries, |_| None).render(area, &mut buf, &mut state);

        assert_eq!(state.total_lines, 6);
        assert_eq!(row(&buf, 0), "│ [09:30] Azura:");
        assert_eq!(row(&buf, 1), "│ greetings");
    }

    #[test]
    fn test_scroll_reveals_older_lines_and_clamps() {
        let entries = vec![
            entry("Traveler", "hello", MessageKind::User),
            entry("Azura", "greetings", MessageKind::Agent),
        ];
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        let mut state = LogPanelState {
            scroll_offset: 50,
            total_lines: 0,
        };
        LogPanel::new(&entries, |_| None).render(area, &mut buf, &mut state);
        assert_eq!(state.scroll_offset, 3);
        assert_eq!(row(&buf, 0), "│ [09:30] Traveler:");
    }

    #[test]
    fn test_agent_accent_colors_sender() {
        let entries = vec![entry("Azura", "hi", MessageKind::Agent)];
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        let mut state = LogPanelState::default();
        LogPanel::new(&entries, |_| Some(Color::Rgb(1, 2, 3))).render(area, &mut buf, &mut state);
        // Header is the first of three lines; sender starts after the stamp
        let sender_cell = buf.cell((10, 0)).cloned().unwrap();
        assert_eq!(sender_cell.fg, Color::Rgb(1, 2, 3));
    }
}
