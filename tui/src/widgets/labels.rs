//! Name labels and speech overlays
//!
//! Drawn on a transparent layer above the scene. Anchors arrive in
//! framebuffer pixels; a terminal cell covers two pixel rows.

use ratatui::buffer::Buffer;
use ratatui::style::{Modifier, Style};
use unicode_width::UnicodeWidthStr;

use halo_conductor::{Avatar, LabelAnchor};

use crate::theme::{faded, terminal_color};

/// Cell for a pixel anchor, if it lands inside `buf`
fn anchor_cell(buf: &Buffer, (px, py): (f32, f32)) -> Option<(i32, i32)> {
    if !px.is_finite() || !py.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let cell = (px.round() as i32, (py / 2.0).floor() as i32);
    let (w, h) = (i32::from(buf.area.width), i32::from(buf.area.height));
    ((0..w).contains(&cell.0) && (0..h).contains(&cell.1)).then_some(cell)
}

/// Write `text` centered on column `cx`, clipped to the buffer
fn centered(buf: &mut Buffer, cx: i32, y: i32, text: &str, style: Style) {
    let Ok(y) = u16::try_from(y) else {
        return;
    };
    if y >= buf.area.height {
        return;
    }
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let half = (text.width() / 2) as i32;
    let mut x = cx - half;
    for ch in text.chars() {
        if let Ok(col) = u16::try_from(x) {
            if col < buf.area.width {
                if let Some(cell) = buf.cell_mut((col, y)) {
                    cell.set_char(ch).set_style(style);
                }
            }
        }
        x += 1;
    }
}

/// Draw every avatar's name and any visible speech overlay
pub fn draw_labels(buf: &mut Buffer, avatars: &[Avatar], anchors: &[LabelAnchor]) {
    for anchor in anchors {
        let Some(avatar) = avatars.get(anchor.avatar) else {
            continue;
        };

        if let Some((x, y)) = anchor_cell(buf, anchor.label) {
            let style = Style::default()
                .fg(terminal_color(avatar.color()))
                .add_modifier(Modifier::BOLD);
            centered(buf, x, y, avatar.name(), style);
        }

        let overlay = avatar.overlay();
        let Some(point) = anchor.overlay.filter(|_| overlay.is_visible()) else {
            continue;
        };
        let Some((x, y)) = anchor_cell(buf, point) else {
            continue;
        };
        let lines = overlay.texture().lines();
        let style = Style::default().fg(faded(overlay.texture().accent(), overlay.opacity()));
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        let top = y - lines.len() as i32 + 1;
        for (i, line) in lines.iter().enumerate() {
            #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
            centered(buf, x, top + i as i32, line, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::layout::Rect;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
            .collect()
    }

    #[test]
    fn test_anchor_cell_halves_rows() {
        let buf = Buffer::empty(Rect::new(0, 0, 10, 5));
        assert_eq!(anchor_cell(&buf, (3.4, 7.0)), Some((3, 3)));
        assert_eq!(anchor_cell(&buf, (3.0, 10.0)), None);
        assert_eq!(anchor_cell(&buf, (f32::NAN, 1.0)), None);
    }

    #[test]
    fn test_centered_clips_at_edges() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        centered(&mut buf, 0, 0, "Osiris", Style::default());
        assert_eq!(row(&buf, 0), "ris   ");
    }
}
