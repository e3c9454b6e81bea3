//! Software Rendering - Camera, Framebuffer, Rasterizer, Forward Pass
//!
//! The scene is drawn on the CPU into a linear-RGB [`Framebuffer`]. Nothing
//! here knows about terminals; surfaces read the finished buffer and present
//! it however they like.
//!
//! ```text
//! Scene ──► ForwardPass::draw(camera) ──► Framebuffer ──► effects ──► surface
//!              │
//!              ├─ dressing (stars, nebula, flower | pillars)
//!              ├─ entities (comets + tails, shooting stars, motes, torches)
//!              ├─ links
//!              └─ avatars (orb | angel | plain sphere)
//! ```

mod camera;
mod color;
mod forward;
mod framebuffer;
pub mod raster;

pub use camera::{Camera, ScreenPoint, AUTO_ROTATE_RATE};
pub use color::Rgb;
pub use forward::{ForwardPass, LabelAnchor};
pub use framebuffer::Framebuffer;
