use super::Transform;
use crate::error::FrameLookupError;
use log::warn;
use nalgebra::Matrix4;
use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use std::time::Duration;

/// Chains longer than this are considered to be cycles.
const MAX_CHAIN_LEN: usize = 100;

/// Buffer of the transforms between coordinate frames.
///
/// Each frame has (at most) one parent. The transform to the parent is either static,
/// or a time series of dynamic transforms, that is interpolated on lookup.
#[derive(Debug, Default)]
pub struct FrameTree {
    frames: HashMap<String, FrameEdge>,
}

#[derive(Debug)]
enum FrameEdge {
    Static(Transform),
    Dynamic(VecDeque<Transform>),
}

impl FrameTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transform.
    ///
    /// Static transforms replace whatever was known about the frame.
    /// Dynamic transforms need to arrive in chronological order, older ones are dropped.
    pub fn add(&mut self, transform: Transform) {
        let key = transform.frame.clone();
        if transform.is_static {
            self.frames.insert(key, FrameEdge::Static(transform));
            return;
        }

        let edge = self
            .frames
            .entry(key)
            .or_insert_with(|| FrameEdge::Dynamic(VecDeque::new()));
        if matches!(edge, FrameEdge::Static(_)) {
            *edge = FrameEdge::Dynamic(VecDeque::new());
        }
        let FrameEdge::Dynamic(history) = edge else {
            return;
        };

        if let Some(newest) = history.back() {
            if newest.time_stamp > transform.time_stamp {
                warn!(
                    "Out-of-order transform for frame '{}' ({:?} < {:?}). Dropping.",
                    transform.frame, transform.time_stamp, newest.time_stamp
                );
                return;
            }
        }
        history.push_back(transform);
    }

    /// Gets the transform from `frame` to its parent at the given time stamp,
    /// interpolating between the buffered transforms.
    ///
    /// Returns [FrameLookupError::NotFound], if the time stamp is older than the buffered
    /// history, and [FrameLookupError::Wait], if it is newer than the newest transform,
    /// or the frame is not known (yet).
    pub fn lookup(&self, frame: &str, time_stamp: Duration) -> Result<Transform, FrameLookupError> {
        let Some(edge) = self.frames.get(frame) else {
            return Err(FrameLookupError::Wait);
        };
        let history = match edge {
            FrameEdge::Static(transform) => return Ok(transform.clone()),
            FrameEdge::Dynamic(history) => history,
        };

        if history
            .front()
            .is_some_and(|oldest| time_stamp < oldest.time_stamp)
        {
            return Err(FrameLookupError::NotFound);
        }

        // first transform at or after the time stamp
        let Some(after_index) = history.iter().position(|t| time_stamp <= t.time_stamp) else {
            return Err(FrameLookupError::Wait);
        };
        let after = &history[after_index];
        if after.time_stamp == time_stamp || after_index == 0 {
            return Ok(after.clone());
        }

        let before = &history[after_index - 1];
        let span = after.time_stamp.as_secs_f64() - before.time_stamp.as_secs_f64();
        let mut frac = (time_stamp.as_secs_f64() - before.time_stamp.as_secs_f64()) / span;
        if !frac.is_finite() {
            frac = 0.0;
        }
        Ok(before.interpolate(frac, after))
    }

    /// Drops the dynamic transforms before the given time stamp.
    ///
    /// The newest transform before the time stamp is kept, so that lookups at the
    /// time stamp or later can still be interpolated.
    pub fn cleanup_before(&mut self, time_stamp: Duration) {
        for edge in self.frames.values_mut() {
            if let FrameEdge::Dynamic(history) = edge {
                let newer = history
                    .iter()
                    .position(|t| t.time_stamp > time_stamp)
                    .unwrap_or(history.len());
                let nr_delete = newer.saturating_sub(1);
                history.drain(..nr_delete);
            }
        }
    }

    /// Collects the transforms from `frame` up to the root of its tree.
    ///
    /// A frame without a parent ends the chain regularly. Otherwise, the error tells,
    /// why the chain ended early.
    fn chain_to_root(
        &self,
        frame: &str,
        time_stamp: Duration,
    ) -> (Vec<Transform>, Option<FrameLookupError>) {
        let mut chain: Vec<Transform> = Vec::new();
        for _ in 0..MAX_CHAIN_LEN {
            let current = chain
                .last()
                .map(|t| t.parent_frame.as_str())
                .unwrap_or(frame);
            if !self.frames.contains_key(current) {
                return (chain, None);
            }
            match self.lookup(current, time_stamp) {
                Ok(t) => chain.push(t),
                Err(e) => return (chain, Some(e)),
            }
        }
        warn!("Cycle in the frame tree at frame '{}'.", frame);
        (Vec::new(), Some(FrameLookupError::NotFound))
    }

    /// Calculates the matrix, that transforms coordinates in `src_frame`
    /// into `dst_frame` at the given time.
    pub fn transform(
        &self,
        time_stamp: Duration,
        src_frame: &str,
        dst_frame: &str,
    ) -> Result<Matrix4<f64>, FrameLookupError> {
        if src_frame == dst_frame {
            return Ok(Matrix4::identity());
        }

        let (mut src_chain, src_error) = self.chain_to_root(src_frame, time_stamp);
        let (mut dst_chain, dst_error) = self.chain_to_root(dst_frame, time_stamp);

        let src_root = src_chain
            .last()
            .map(|t| t.parent_frame.as_str())
            .unwrap_or(src_frame);
        let dst_root = dst_chain
            .last()
            .map(|t| t.parent_frame.as_str())
            .unwrap_or(dst_frame);
        if src_root != dst_root {
            // a history, that is too new for the time stamp, will not get any older.
            // in all other cases, more transforms might still connect the two frames.
            return if src_error == Some(FrameLookupError::NotFound)
                || dst_error == Some(FrameLookupError::NotFound)
            {
                Err(FrameLookupError::NotFound)
            } else {
                Err(FrameLookupError::Wait)
            };
        }

        // strip the common part of both chains
        while let (Some(s), Some(d)) = (src_chain.last(), dst_chain.last()) {
            if s.frame != d.frame {
                break;
            }
            src_chain.pop();
            dst_chain.pop();
        }

        // src -> common ancestor -> dst
        let up = src_chain
            .iter()
            .fold(Matrix4::<f64>::identity(), |acc, t| t.matrix() * acc);
        let down = dst_chain
            .iter()
            .fold(Matrix4::<f64>::identity(), |acc, t| acc * t.inverse_matrix());
        Ok(down * up)
    }
}

/// Lists every parent frame with its children (for debugging).
impl Display for FrameTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut edges = Vec::new();
        for edge in self.frames.values() {
            match edge {
                FrameEdge::Static(t) => edges.push((t.parent_frame.as_str(), t.frame.as_str())),
                FrameEdge::Dynamic(history) => {
                    if let Some(t) = history.back() {
                        edges.push((t.parent_frame.as_str(), t.frame.as_str()));
                    }
                }
            }
        }
        edges.sort_unstable();
        let mut last_parent = None;
        for (parent, child) in edges {
            if last_parent != Some(parent) {
                writeln!(f, " - {parent}")?;
                last_parent = Some(parent);
            }
            writeln!(f, "   --> {child}")?;
        }
        Ok(())
    }
}
