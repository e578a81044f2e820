//! Draws a dynamic point cloud (e.g. the latest scan of a LiDAR sensor) as a set of particles,
//! that is attached to a moving coordinate frame.
//!
//! The points are kept in a fixed capacity [buffer](buffer::ParticleBuffer), that is updated in
//! place whenever a new point set arrives. The [Particles] are attached to their coordinate
//! frame via a [TfClient](tf::TfClient) on the first update. Rendering the buffer is left to a
//! render backend, which picks up modified buffers via their update flags.

pub mod anchor;
pub mod backends;
pub mod buffer;
pub mod buffer_attribute;
pub mod error;
pub mod particles;
pub mod points;
pub mod scene;
pub mod settings;
pub mod shaders;
pub mod texture;
pub mod tf;

pub use particles::Particles;
pub use points::{PointData, PointFrame};
pub use settings::ParticlesOptions;
