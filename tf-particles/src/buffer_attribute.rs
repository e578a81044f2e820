//! Per-point vertex data, that is kept on the cpu side and synchronized with the gpu on demand.

/// Position of one point slot.
///
/// The field names match the vertex shader inputs, so that the render backends can bind
/// the items directly.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

/// Color of one point slot.
/// The channels are in the range 0.0 to 255.0.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct ColorVertex {
    pub color: [f32; 3],
}

/// Visibility of one point slot. Values below [crate::shaders::VISIBILITY_THRESHOLD]
/// are not drawn.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct AlphaVertex {
    pub alpha: f32,
}

/// Hint for the render backend, how often the contents of a buffer will change.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BufferUsage {
    /// Written once, or very rarely.
    Static,

    /// Re-written with (nearly) every update.
    Dynamic,
}

/// A fixed-length array of vertex items, together with a flag telling the render backend
/// that the items have been modified and need to be uploaded again.
///
/// The length never changes after creation.
#[derive(Clone, Debug)]
pub struct BufferAttribute<T> {
    items: Vec<T>,
    usage: BufferUsage,
    needs_update: bool,
}

impl<T: Copy> BufferAttribute<T> {
    pub fn new(items: Vec<T>, usage: BufferUsage) -> Self {
        BufferAttribute {
            items,
            usage,
            needs_update: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Mutable access to the items.
    /// Does not set the update flag, call [Self::mark_needs_update] once done.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.items.get(index).copied()
    }

    /// Signals the render backend, that the items need to be uploaded again.
    pub fn mark_needs_update(&mut self) {
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Returns, if the items need to be uploaded, and resets the flag.
    /// Meant to be called by the render backend once per frame.
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::replace(&mut self.needs_update, false)
    }
}
