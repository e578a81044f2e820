//! Minimal scene graph: drawables, that are attached to coordinate frames.
//!
//! Everything in here is meant to be used from a single (render) thread,
//! hence the handles are based on [Rc] and [RefCell].

use crate::buffer::ParticleBuffer;
use crate::shaders::ParticleShaders;
use nalgebra::Matrix4;
use std::cell::{Cell, Ref, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

/// Shared pose of a coordinate frame.
///
/// The pose is the matrix transforming coordinates from the tracked frame into the
/// fixed frame of the scene. It is written by the frame resolution service and read by
/// the render backends. It is [None], until the frame has been resolved for the first time.
#[derive(Clone, Debug, Default)]
pub struct PoseHandle(Rc<Cell<Option<Matrix4<f64>>>>);

impl PoseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Matrix4<f64>> {
        self.0.get()
    }

    pub fn set(&self, pose: Matrix4<f64>) {
        self.0.set(Some(pose))
    }

    /// Checks, if both handles refer to the same pose.
    pub fn ptr_eq(&self, other: &PoseHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Material of the particles.
#[derive(Clone, Debug)]
pub struct ParticleMaterial {
    pub shaders: ParticleShaders,

    /// Image file for the point sprite. [None] means a single white pixel.
    pub texture: Option<PathBuf>,

    pub transparent: bool,
}

/// The drawable primitive: point geometry plus material.
#[derive(Debug)]
pub struct ParticlePoints {
    geometry: RefCell<ParticleBuffer>,
    material: ParticleMaterial,
}

impl ParticlePoints {
    pub fn new(geometry: ParticleBuffer, material: ParticleMaterial) -> Self {
        ParticlePoints {
            geometry: RefCell::new(geometry),
            material,
        }
    }

    /// The point buffer.
    /// Panics, if the buffer is currently being updated.
    pub fn geometry(&self) -> Ref<'_, ParticleBuffer> {
        self.geometry.borrow()
    }

    pub(crate) fn geometry_cell(&self) -> &RefCell<ParticleBuffer> {
        &self.geometry
    }

    pub fn material(&self) -> &ParticleMaterial {
        &self.material
    }
}

/// A drawable, whose pose follows a coordinate frame.
#[derive(Clone, Debug)]
pub struct SceneNode {
    frame_id: String,
    pose: PoseHandle,
    object: Rc<ParticlePoints>,
}

impl SceneNode {
    pub fn new(frame_id: impl Into<String>, pose: PoseHandle, object: Rc<ParticlePoints>) -> Self {
        SceneNode {
            frame_id: frame_id.into(),
            pose,
            object,
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn pose(&self) -> &PoseHandle {
        &self.pose
    }

    pub fn object(&self) -> &Rc<ParticlePoints> {
        &self.object
    }
}

/// Root of the scene. Cloning the root gives another handle to the same scene.
#[derive(Clone, Debug, Default)]
pub struct SceneRoot {
    nodes: Rc<RefCell<Vec<SceneNode>>>,
}

impl SceneRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, node: SceneNode) {
        self.nodes.borrow_mut().push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Snapshot of the nodes currently in the scene.
    pub fn nodes(&self) -> Vec<SceneNode> {
        self.nodes.borrow().clone()
    }
}
