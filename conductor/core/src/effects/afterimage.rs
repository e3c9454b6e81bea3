//! Afterimage ping-pong compositor
//!
//! Two offscreen buffers trade roles every frame:
//!
//! ```text
//! frame N:   read = A (previous composite)   write = B
//!            B[i] = max(A[i] · damp, input[i])
//! frame N+1: read = B                        write = A
//! ```
//!
//! The damping factor sets trail length: at 0.94 a bright pixel loses half
//! its intensity in about eleven frames.

use crate::render::Framebuffer;

/// Ping-pong buffer pair plus damping
#[derive(Clone, Debug)]
pub struct Afterimage {
    buffers: [Framebuffer; 2],
    read: usize,
    damp: f32,
    frames: u64,
}

impl Afterimage {
    /// Create the buffer pair
    #[must_use]
    pub fn new(width: usize, height: usize, damp: f32) -> Self {
        Self {
            buffers: [Framebuffer::new(width, height), Framebuffer::new(width, height)],
            read: 0,
            damp,
            frames: 0,
        }
    }

    /// Damping factor applied to the previous composite
    #[must_use]
    pub fn damp(&self) -> f32 {
        self.damp
    }

    /// Change the damping factor
    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp;
    }

    /// Index of the buffer holding the previous composite
    #[must_use]
    pub fn read_index(&self) -> usize {
        self.read
    }

    /// Index of the buffer the next composite is written into
    #[must_use]
    pub fn write_index(&self) -> usize {
        1 - self.read
    }

    /// Number of frames composited so far
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Dimensions of both buffers, in index order
    #[must_use]
    pub fn buffer_dimensions(&self) -> [(usize, usize); 2] {
        [self.buffers[0].dimensions(), self.buffers[1].dimensions()]
    }

    /// Resize both buffers together, dropping accumulated trails
    pub fn resize(&mut self, width: usize, height: usize) {
        for buffer in &mut self.buffers {
            buffer.resize(width, height);
        }
    }

    /// Latest composite
    #[must_use]
    pub fn output(&self) -> &Framebuffer {
        &self.buffers[self.read]
    }

    /// Blend `input` over the decayed previous composite and swap roles
    pub fn composite(&mut self, input: &Framebuffer) -> &Framebuffer {
        let (width, height) = input.dimensions();
        if self.buffers[0].dimensions() != (width, height) {
            self.resize(width, height);
        }

        let damp = self.damp;
        let [a, b] = &mut self.buffers;
        let (old, new) = if self.read == 0 { (&*a, b) } else { (&*b, a) };
        for ((dst, prev), fresh) in new
            .pixels_mut()
            .iter_mut()
            .zip(old.pixels())
            .zip(input.pixels())
        {
            *dst = (*prev * damp).max(*fresh);
        }

        self.read = 1 - self.read;
        self.frames += 1;
        &self.buffers[self.read]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Rgb;

    #[test]
    fn test_roles_alternate_every_frame() {
        let mut afterimage = Afterimage::new(4, 4, 0.94);
        let input = Framebuffer::new(4, 4);
        let mut seen = Vec::new();
        for _ in 0..6 {
            let read = afterimage.read_index();
            let write = afterimage.write_index();
            assert_ne!(read, write);
            seen.push(read);
            afterimage.composite(&input);
            assert_eq!(afterimage.read_index(), write);
        }
        assert_eq!(seen, vec![0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_trail_decays_by_damp() {
        let mut afterimage = Afterimage::new(1, 1, 0.5);
        let mut lit = Framebuffer::new(1, 1);
        lit.set(0, 0, Rgb::WHITE);
        let dark = Framebuffer::new(1, 1);

        afterimage.composite(&lit);
        let out = afterimage.composite(&dark).get(0, 0).unwrap();
        assert!((out.r - 0.5).abs() < 1e-6);
        let out = afterimage.composite(&dark).get(0, 0).unwrap();
        assert!((out.r - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_new_frame_wins_when_brighter() {
        let mut afterimage = Afterimage::new(1, 1, 0.94);
        let mut dim = Framebuffer::new(1, 1);
        dim.set(0, 0, Rgb::new(0.1, 0.1, 0.1));
        let mut bright = Framebuffer::new(1, 1);
        bright.set(0, 0, Rgb::new(0.8, 0.0, 0.0));
        afterimage.composite(&dim);
        let out = afterimage.composite(&bright).get(0, 0).unwrap();
        assert!((out.r - 0.8).abs() < 1e-6);
        assert!((out.g - 0.094).abs() < 1e-6);
    }

    #[test]
    fn test_resize_moves_both_buffers() {
        let mut afterimage = Afterimage::new(800, 600, 0.94);
        afterimage.resize(1200, 800);
        assert_eq!(afterimage.buffer_dimensions(), [(1200, 800), (1200, 800)]);
    }
}
