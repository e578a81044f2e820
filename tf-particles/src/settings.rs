//! Settings for how the particles should look.

use crate::error::{ParticlesError, ParticlesResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of point slots.
pub const DEFAULT_MAX_POINTS: usize = 13000;

/// Default point size, in world units at a distance of [crate::shaders::SIZE_FALLOFF] pixels.
pub const DEFAULT_POINT_SIZE: f32 = 0.05;

/// Options for creating a [crate::Particles] instance.
///
/// The frame resolution client and the scene root are passed to
/// [crate::Particles::new] directly, because they are not plain data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlesOptions {
    /// Image file to use as the point sprite.
    /// Defaults to a single white pixel.
    pub texture: Option<PathBuf>,

    /// Size to draw each point with.
    pub point_size: f32,

    /// Maximum number of points, that can be drawn at once.
    pub max_points: usize,
}

impl Default for ParticlesOptions {
    fn default() -> Self {
        ParticlesOptions {
            texture: None,
            point_size: DEFAULT_POINT_SIZE,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl ParticlesOptions {
    pub fn from_json_str(json: &str) -> ParticlesResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> ParticlesResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ParticlesError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
