//! Resolution of coordinate frames.
//!
//! The particles only depend on the [TfClient] trait. [FrameTreeClient] is an
//! implementation, that resolves the frames from a buffer of stamped transforms.

mod client;
mod frame_tree;
mod transform;

pub use client::FrameTreeClient;
pub use frame_tree::FrameTree;
pub use transform::Transform;

use crate::scene::PoseHandle;

/// A service, that continuously keeps track of the pose of coordinate frames.
pub trait TfClient {
    /// Starts tracking the given frame.
    ///
    /// The returned handle is kept up to date by the client for as long as the client lives.
    /// Resolving the frame might fail (e.g. because it is not published yet), this is handled
    /// by the client. Until the frame has been resolved, the pose stays empty.
    fn track(&self, frame_id: &str) -> PoseHandle;
}
