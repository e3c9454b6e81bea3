//! Effect Pipeline - Post-Processing Atop the Forward Pass
//!
//! # Frame Flow
//!
//! ```text
//! begin_frame() ──► scene target cleared to background
//!       │
//!   forward pass draws entities, avatars, links, dressing
//!       │
//! finish_frame() ──► Bloom::apply(scene) ──► Afterimage::composite(scene)
//!       │
//!       └──► output(): latest composite, ready for a surface to present
//! ```
//!
//! `resize` moves the scene target, the bloom scratch buffers and both
//! afterimage buffers in lockstep; the scheduler pairs it with the camera
//! aspect update.

mod afterimage;
mod bloom;

pub use afterimage::Afterimage;
pub use bloom::Bloom;

use serde::{Deserialize, Serialize};

use crate::render::{Framebuffer, Rgb};

/// Scene background color
pub const BACKGROUND: u32 = 0x05_05_10;

/// Tunables for the post-processing chain
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectSettings {
    /// Afterimage damping in (0, 1)
    pub afterimage_damp: f32,
    /// Bloom luminance threshold
    pub bloom_threshold: f32,
    /// Bloom add-back strength
    pub bloom_strength: f32,
    /// Bloom box-blur radius in pixels
    pub bloom_radius: usize,
    /// Whether bloom runs at all
    pub bloom_enabled: bool,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            afterimage_damp: 0.94,
            bloom_threshold: 0.75,
            bloom_strength: 0.8,
            bloom_radius: 2,
            bloom_enabled: true,
        }
    }
}

/// Forward target plus post-processing passes
#[derive(Clone, Debug)]
pub struct EffectPipeline {
    scene: Framebuffer,
    bloom: Bloom,
    bloom_enabled: bool,
    afterimage: Afterimage,
    background: Rgb,
}

impl EffectPipeline {
    /// Build a pipeline for a `width × height` canvas
    #[must_use]
    pub fn new(width: usize, height: usize, settings: &EffectSettings) -> Self {
        Self {
            scene: Framebuffer::new(width, height),
            bloom: Bloom::new(
                width,
                height,
                settings.bloom_threshold,
                settings.bloom_strength,
                settings.bloom_radius,
            ),
            bloom_enabled: settings.bloom_enabled,
            afterimage: Afterimage::new(width, height, settings.afterimage_damp),
            background: Rgb::from_hex(BACKGROUND),
        }
    }

    /// Canvas dimensions
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        self.scene.dimensions()
    }

    /// Resize every buffer in the chain
    pub fn resize(&mut self, width: usize, height: usize) {
        self.scene.resize(width, height);
        self.bloom.resize(width, height);
        self.afterimage.resize(width, height);
        tracing::debug!(width, height, "Effect pipeline resized");
    }

    /// Clear the forward target and hand it out for drawing
    pub fn begin_frame(&mut self) -> &mut Framebuffer {
        self.scene.clear(self.background);
        &mut self.scene
    }

    /// Run bloom and the afterimage composite over the drawn frame
    pub fn finish_frame(&mut self) -> &Framebuffer {
        if self.bloom_enabled {
            self.bloom.apply(&mut self.scene);
        }
        self.afterimage.composite(&self.scene)
    }

    /// Latest composite
    #[must_use]
    pub fn output(&self) -> &Framebuffer {
        self.afterimage.output()
    }

    /// The afterimage stage
    #[must_use]
    pub fn afterimage(&self) -> &Afterimage {
        &self.afterimage
    }

    /// Whether bloom is enabled
    #[must_use]
    pub fn bloom_enabled(&self) -> bool {
        self.bloom_enabled
    }

    /// Toggle bloom
    pub fn set_bloom_enabled(&mut self, enabled: bool) {
        self.bloom_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_in_lockstep() {
        let mut pipeline = EffectPipeline::new(800, 600, &EffectSettings::default());
        pipeline.resize(1200, 800);
        assert_eq!(pipeline.dimensions(), (1200, 800));
        assert_eq!(
            pipeline.afterimage().buffer_dimensions(),
            [(1200, 800), (1200, 800)]
        );
    }

    #[test]
    fn test_frame_starts_from_background() {
        let mut pipeline = EffectPipeline::new(4, 4, &EffectSettings::default());
        let target = pipeline.begin_frame();
        assert_eq!(target.get(0, 0), Some(Rgb::from_hex(BACKGROUND)));
        let out = pipeline.finish_frame();
        assert_eq!(out.get(3, 3), Some(Rgb::from_hex(BACKGROUND)));
    }

    #[test]
    fn test_each_frame_swaps_roles() {
        let mut pipeline = EffectPipeline::new(4, 4, &EffectSettings::default());
        let first = pipeline.afterimage().read_index();
        pipeline.begin_frame();
        pipeline.finish_frame();
        assert_ne!(pipeline.afterimage().read_index(), first);
    }
}
