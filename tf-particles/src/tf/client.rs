use super::{FrameTree, TfClient, Transform};
use crate::error::FrameLookupError;
use crate::scene::PoseHandle;
use log::{debug, warn};
use std::cell::RefCell;
use std::time::Duration;

/// [TfClient], that resolves the tracked frames into one fixed frame, based on a [FrameTree].
///
/// Transforms are fed in via [Self::add_transform]. Calling [Self::update] re-resolves every
/// tracked frame at the given time and writes the poses. Frames that cannot be resolved keep
/// their previous pose.
#[derive(Debug)]
pub struct FrameTreeClient {
    fixed_frame: String,
    tree: RefCell<FrameTree>,
    subscriptions: RefCell<Vec<Subscription>>,
}

#[derive(Debug)]
struct Subscription {
    frame_id: String,
    pose: PoseHandle,
    last_error: Option<FrameLookupError>,
}

impl FrameTreeClient {
    pub fn new(fixed_frame: impl Into<String>) -> Self {
        FrameTreeClient {
            fixed_frame: fixed_frame.into(),
            tree: RefCell::new(FrameTree::new()),
            subscriptions: RefCell::new(Vec::new()),
        }
    }

    pub fn fixed_frame(&self) -> &str {
        &self.fixed_frame
    }

    pub fn add_transform(&self, transform: Transform) {
        self.tree.borrow_mut().add(transform);
    }

    /// Resolves all tracked frames at the given time.
    /// Returns the number of frames that could be resolved.
    pub fn update(&self, time_stamp: Duration) -> usize {
        let tree = self.tree.borrow();
        let mut subscriptions = self.subscriptions.borrow_mut();
        let mut resolved = 0;
        for subscription in subscriptions.iter_mut() {
            match tree.transform(time_stamp, &subscription.frame_id, &self.fixed_frame) {
                Ok(matrix) => {
                    subscription.pose.set(matrix);
                    subscription.last_error = None;
                    resolved += 1;
                }
                Err(e) => {
                    // only log changes, the same error would otherwise be reported every frame
                    if subscription.last_error != Some(e) {
                        match e {
                            FrameLookupError::Wait => debug!(
                                "Waiting for transform from '{}' to '{}'.",
                                subscription.frame_id, self.fixed_frame
                            ),
                            FrameLookupError::NotFound => warn!(
                                "No transform from '{}' to '{}' at {:?}.",
                                subscription.frame_id, self.fixed_frame, time_stamp
                            ),
                        }
                    }
                    subscription.last_error = Some(e);
                }
            }
        }
        resolved
    }

    /// Drops buffered transforms, that are not needed for resolving frames at
    /// `time_stamp` or later.
    pub fn cleanup_before(&self, time_stamp: Duration) {
        self.tree.borrow_mut().cleanup_before(time_stamp);
    }

    /// Names of the tracked frames, in the order they were requested.
    pub fn tracked_frames(&self) -> Vec<String> {
        self.subscriptions
            .borrow()
            .iter()
            .map(|s| s.frame_id.clone())
            .collect()
    }

    /// Debug representation of the buffered frame tree.
    pub fn describe_tree(&self) -> String {
        self.tree.borrow().to_string()
    }
}

impl TfClient for FrameTreeClient {
    fn track(&self, frame_id: &str) -> PoseHandle {
        debug!("Tracking frame '{}' in '{}'.", frame_id, self.fixed_frame);
        let pose = PoseHandle::new();
        self.subscriptions.borrow_mut().push(Subscription {
            frame_id: frame_id.to_string(),
            pose: pose.clone(),
            last_error: None,
        });
        pose
    }
}
