//! Error types returned by the particle system.

use std::error::Error;
use std::path::PathBuf;

/// Shorthand for a [Result] with a [ParticlesError].
pub type ParticlesResult<T> = Result<T, ParticlesError>;

/// Error type returned by the particle system.
#[derive(Debug, thiserror::Error)]
pub enum ParticlesError {
    /// One of the attribute slices passed to an update is shorter than the
    /// number of points that should be written.
    #[error("Not enough {attribute} values: got {len}, but {required} points should be written.")]
    InsufficientPointData {
        attribute: &'static str,
        len: usize,
        required: usize,
    },

    /// The sprite texture could not be decoded.
    #[error("Failed to load the point texture: {source}")]
    Texture {
        #[from]
        source: image::ImageError,
    },

    /// Reading some file (texture, options) failed.
    #[error("Failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The particle options could not be parsed.
    #[error("Invalid particle options: {source}")]
    Options {
        #[from]
        source: serde_json::Error,
    },

    /// Some GPU operation was unsuccessful (e.g. because of not sufficient graphics memory,
    /// or a shader that does not compile on this platform).
    #[error("Gpu error: {source}")]
    Graphics {
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Error returned when a frame cannot be looked up in the [crate::tf::FrameTree].
#[derive(Debug, PartialEq, Eq, Copy, Clone, thiserror::Error)]
pub enum FrameLookupError {
    /// The frame is unknown, unrelated to the target frame, or the
    /// requested time stamp is older than the buffered history.
    #[error("Frame was not found.")]
    NotFound,

    /// The frame (or a newer transform for it) has not arrived yet.
    /// Retrying after more transforms were added might succeed.
    #[error("Frame has not arrived yet.")]
    Wait,
}
