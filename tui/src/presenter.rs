//! Half-Block Presenter
//!
//! Draws a [`Framebuffer`] into terminal cells. Each cell shows two
//! vertically stacked pixels: the upper one as the foreground of `▀`, the
//! lower one as the background.
//!
//! ```text
//!   pixels        cell
//!   ┌───┐
//!   │ a │  ──►   ▀  fg = a
//!   │ b │            bg = b
//!   └───┘
//! ```

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use halo_conductor::{Framebuffer, Rgb};

use crate::theme::terminal_color;

/// Upper half block
pub const HALF_BLOCK: &str = "▀";

/// Framebuffer size that fills a terminal area
#[must_use]
pub fn pixel_size(area: Rect) -> (usize, usize) {
    (usize::from(area.width), usize::from(area.height) * 2)
}

/// Paint `frame` into `buf` starting at the buffer's origin
///
/// Pixels outside the framebuffer are drawn black, so a frame that lags a
/// resize by one tick leaves no stale cells behind.
pub fn present(frame: &Framebuffer, buf: &mut Buffer) {
    let area = buf.area;
    for row in 0..area.height {
        let upper_y = usize::from(row) * 2;
        for col in 0..area.width {
            let x = usize::from(col);
            let upper = frame.get(x, upper_y).unwrap_or(Rgb::BLACK);
            let lower = frame.get(x, upper_y + 1).unwrap_or(Rgb::BLACK);
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_symbol(HALF_BLOCK)
                    .set_fg(terminal_color(upper))
                    .set_bg(terminal_color(lower));
            }
        }
    }
}
