//! The sprite image, that every particle is textured with.

use crate::error::{ParticlesError, ParticlesResult};
use log::debug;
use std::path::Path;

/// RGBA8 image data for the point sprite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SpriteImage {
    /// A single, opaque, white pixel.
    /// Used when no texture is configured, so the points are drawn in their plain color.
    pub fn white_pixel() -> Self {
        SpriteImage {
            width: 1,
            height: 1,
            rgba: vec![0xff, 0xff, 0xff, 0xff],
        }
    }

    /// Decodes an image file (png or jpeg).
    pub fn from_file(path: &Path) -> ParticlesResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| ParticlesError::Io {
            path: path.to_owned(),
            source,
        })?;
        debug!("Loaded point texture from {}", path.display());
        Self::from_memory(&bytes)
    }

    /// Decodes an encoded image (png or jpeg).
    pub fn from_memory(bytes: &[u8]) -> ParticlesResult<Self> {
        let image = image::load_from_memory(bytes)?.into_rgba8();
        Ok(SpriteImage {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        })
    }

    /// Loads the configured texture, or falls back to [Self::white_pixel].
    pub fn load(texture: Option<&Path>) -> ParticlesResult<Self> {
        match texture {
            Some(path) => Self::from_file(path),
            None => Ok(Self::white_pixel()),
        }
    }
}
