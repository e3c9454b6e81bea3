//! A single compositor layer

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::LayerId;

/// An off-screen buffer placed somewhere on the terminal
pub struct Layer {
    /// Identifier handed out by the compositor
    pub id: LayerId,
    /// Position and size on screen
    pub bounds: Rect,
    /// Stacking order; higher draws later
    pub z_index: i32,
    /// Hidden layers are skipped when compositing
    pub visible: bool,
    /// Contents, addressed from the layer's own origin
    pub buffer: Buffer,
}

impl Layer {
    /// Empty visible layer
    #[must_use]
    pub fn new(id: LayerId, bounds: Rect, z_index: i32) -> Self {
        Self {
            id,
            bounds,
            z_index,
            visible: true,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        }
    }

    /// Whether a screen cell falls inside the layer
    #[must_use]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.bounds.x
            && y >= self.bounds.y
            && x < self.bounds.x.saturating_add(self.bounds.width)
            && y < self.bounds.y.saturating_add(self.bounds.height)
    }
}
