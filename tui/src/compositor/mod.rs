//! Layered Compositor
//!
//! The screen is a stack of layers: the half-block scene at the bottom,
//! name labels and speech overlays above it, and the log panel and status
//! lines on top. Each layer renders into its own buffer; compositing copies
//! every non-blank cell in z-order, so blank cells in the label layer let
//! the scene show through.

mod layer;

use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

pub use layer::Layer;

/// Unique identifier for a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(u32);

/// Owns every layer and stacks them into one buffer
pub struct Compositor {
    layers: HashMap<LayerId, Layer>,
    /// Back to front
    render_order: Vec<LayerId>,
    next_id: u32,
    area: Rect,
}

impl Compositor {
    /// Compositor for a screen of `area`
    #[must_use]
    pub fn new(area: Rect) -> Self {
        Self {
            layers: HashMap::new(),
            render_order: Vec::new(),
            next_id: 0,
            area,
        }
    }

    /// Screen area
    #[must_use]
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Add a layer and return its id
    pub fn create_layer(&mut self, bounds: Rect, z_index: i32) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, Layer::new(id, bounds, z_index));
        self.update_render_order();
        id
    }

    /// A layer's buffer for drawing, cleared first
    pub fn begin(&mut self, id: LayerId) -> Option<&mut Buffer> {
        self.layers.get_mut(&id).map(|layer| {
            layer.buffer.reset();
            &mut layer.buffer
        })
    }

    /// Bounds of a layer on screen
    #[must_use]
    pub fn bounds(&self, id: LayerId) -> Option<Rect> {
        self.layers.get(&id).map(|layer| layer.bounds)
    }

    /// Move and resize a layer; its contents are discarded
    pub fn place(&mut self, id: LayerId, bounds: Rect) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.bounds = bounds;
            layer.buffer = Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height));
        }
    }

    /// Show or hide a layer
    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.visible = visible;
        }
    }

    /// Change the screen size
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
    }

    /// Stack every visible layer into `output`
    pub fn composite_into(&self, output: &mut Buffer) {
        for id in &self.render_order {
            if let Some(layer) = self.layers.get(id).filter(|l| l.visible) {
                Self::blit(output, self.area, layer);
            }
        }
    }

    /// Copy a layer's non-blank cells onto `output`
    fn blit(output: &mut Buffer, area: Rect, layer: &Layer) {
        let bounds = layer.bounds;
        for ly in 0..bounds.height {
            for lx in 0..bounds.width {
                let (x, y) = (bounds.x + lx, bounds.y + ly);
                if x >= area.width || y >= area.height || !output.area.contains((x, y).into()) {
                    continue;
                }
                let Some(cell) = layer.buffer.cell((lx, ly)) else {
                    continue;
                };
                if cell.symbol() == " " && cell.bg == ratatui::style::Color::Reset {
                    continue;
                }
                if let Some(target) = output.cell_mut((x, y)) {
                    *target = cell.clone();
                }
            }
        }
    }

    /// Topmost visible layer under a screen cell
    #[must_use]
    pub fn layer_at(&self, x: u16, y: u16) -> Option<LayerId> {
        self.render_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.layers.get(id).is_some_and(|l| l.visible && l.contains(x, y)))
    }

    fn update_render_order(&mut self) {
        self.render_order = self.layers.keys().copied().collect();
        self.render_order
            .sort_by_key(|id| (self.layers.get(id).map_or(0, |l| l.z_index), id.0));
    }
}
