//! Render backends, that can draw the particles.
//!
//! At the current state of development, the `glium` backend (behind the `glium` feature)
//! is the only available one.

#[cfg(feature = "glium")]
pub mod glium;
