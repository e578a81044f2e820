use crate::scene::{ParticlePoints, SceneNode, SceneRoot};
use crate::tf::TfClient;
use log::debug;
use std::rc::Rc;

/// Attaches a drawable to a coordinate frame, the first time it is needed.
///
/// The attachment is created once and never changed afterwards: the frame id passed
/// to later calls is ignored.
#[derive(Debug, Default)]
pub struct FrameAnchor {
    scene_node: Option<SceneNode>,
}

impl FrameAnchor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure, that `object` is attached to a frame.
    ///
    /// On the first call, the frame resolution client is asked to track `frame_id`,
    /// and the resulting scene node is added to `root`. Any further call returns the
    /// existing scene node.
    pub fn ensure_attached(
        &mut self,
        frame_id: &str,
        tf_client: &dyn TfClient,
        object: &Rc<ParticlePoints>,
        root: &SceneRoot,
    ) -> &SceneNode {
        if let Some(node) = &self.scene_node {
            if node.frame_id() != frame_id {
                debug!(
                    "Ignoring frame '{}', the particles are already attached to '{}'.",
                    frame_id,
                    node.frame_id()
                );
            }
        }
        self.scene_node.get_or_insert_with(|| {
            debug!("Attaching particles to frame '{}'.", frame_id);
            let pose = tf_client.track(frame_id);
            let node = SceneNode::new(frame_id, pose, Rc::clone(object));
            root.add(node.clone());
            node
        })
    }

    pub fn is_attached(&self) -> bool {
        self.scene_node.is_some()
    }

    pub fn scene_node(&self) -> Option<&SceneNode> {
        self.scene_node.as_ref()
    }
}
