//! The fixed capacity point buffer, that the particles are drawn from.

use crate::buffer_attribute::{
    AlphaVertex, BufferAttribute, BufferUsage, ColorVertex, PositionVertex,
};
use crate::error::{ParticlesError, ParticlesResult};
use crate::points::PointData;
use crate::shaders::VISIBILITY_THRESHOLD;
use log::warn;
use rand::Rng;

/// Placeholder positions are drawn from `[-PLACEHOLDER_EXTENT, PLACEHOLDER_EXTENT)` on each axis.
const PLACEHOLDER_EXTENT: f32 = 1.5;

/// Holds the position, color and alpha value of up to [Self::capacity] points.
///
/// All memory is allocated up front. Updates overwrite the slots in place and hide
/// the slots, that were visible before, but are not part of the new point set.
#[derive(Clone, Debug)]
pub struct ParticleBuffer {
    positions: BufferAttribute<PositionVertex>,
    colors: BufferAttribute<ColorVertex>,
    alpha: BufferAttribute<AlphaVertex>,

    /// Usable number of slots. Narrowed by the first update.
    max_pts: usize,

    /// Number of points in the very first update.
    first_size: Option<usize>,

    /// Number of slots written by the previous update.
    prev_pts: usize,
}

impl ParticleBuffer {
    /// Allocates a buffer for `max_pts` points.
    /// Nothing is visible, until the first update.
    pub fn new(max_pts: usize) -> Self {
        Self::with_rng(max_pts, &mut rand::thread_rng())
    }

    /// Same as [Self::new], but takes the random placeholder positions from the given rng.
    pub fn with_rng<R: Rng + ?Sized>(max_pts: usize, rng: &mut R) -> Self {
        let mut positions = Vec::with_capacity(max_pts);
        for _ in 0..max_pts {
            positions.push(PositionVertex {
                position: [
                    rng.gen_range(-PLACEHOLDER_EXTENT..PLACEHOLDER_EXTENT),
                    rng.gen_range(-PLACEHOLDER_EXTENT..PLACEHOLDER_EXTENT),
                    rng.gen_range(-PLACEHOLDER_EXTENT..PLACEHOLDER_EXTENT),
                ],
            });
        }
        let colors = vec![
            ColorVertex {
                color: [255.0, 255.0, 255.0]
            };
            max_pts
        ];
        let alpha = vec![AlphaVertex { alpha: 0.0 }; max_pts];

        ParticleBuffer {
            positions: BufferAttribute::new(positions, BufferUsage::Dynamic),
            colors: BufferAttribute::new(colors, BufferUsage::Dynamic),
            alpha: BufferAttribute::new(alpha, BufferUsage::Static),
            max_pts,
            first_size: None,
            prev_pts: 0,
        }
    }

    /// Checks, that `points` holds enough data for an update with `n` points,
    /// without modifying the buffer.
    ///
    /// Returns the number of points, that the update would write.
    pub fn check_input(&self, points: &PointData<'_>, n: usize) -> ParticlesResult<usize> {
        let capacity = match self.first_size {
            Some(_) => self.max_pts,
            None => self.max_pts.min(n),
        };
        let n_eff = n.min(capacity);
        check_len("position", points.positions.len(), n_eff)?;
        check_len("color", points.colors.len(), n_eff)?;
        check_len("alpha", points.alpha.len(), n_eff)?;
        Ok(n_eff)
    }

    /// Writes the first `n` points of `points` into the buffer.
    ///
    /// The first call narrows the capacity down to `n`, if `n` is smaller.
    /// Requests for more points than the capacity are truncated.
    /// Points that were visible after the previous update, but are not overwritten
    /// by this one, are hidden.
    ///
    /// Returns the number of points that were actually written.
    pub fn update(&mut self, points: &PointData<'_>, n: usize) -> ParticlesResult<usize> {
        let n_eff = self.check_input(points, n)?;

        if self.first_size.is_none() {
            self.first_size = Some(n);
            self.max_pts = self.max_pts.min(n);
        }
        if n > self.max_pts {
            warn!(
                "Attempted to draw {} points, but only {} fit into the buffer. Dropping {} points.",
                n,
                self.max_pts,
                n - self.max_pts
            );
        }

        let positions = &mut self.positions.as_mut_slice()[..n_eff];
        for (slot, value) in positions.iter_mut().zip(points.positions) {
            slot.position = *value;
        }
        let colors = &mut self.colors.as_mut_slice()[..n_eff];
        for (slot, value) in colors.iter_mut().zip(points.colors) {
            slot.color = *value;
        }
        let alpha = self.alpha.as_mut_slice();
        for (slot, value) in alpha[..n_eff].iter_mut().zip(points.alpha) {
            slot.alpha = *value;
        }

        // hide the points of the previous update, that are not overwritten
        for slot in alpha.iter_mut().take(self.prev_pts).skip(n_eff) {
            slot.alpha = 0.0;
        }
        self.prev_pts = n_eff;

        self.positions.mark_needs_update();
        self.colors.mark_needs_update();
        self.alpha.mark_needs_update();
        Ok(n_eff)
    }

    /// Usable number of point slots.
    pub fn capacity(&self) -> usize {
        self.max_pts
    }

    /// Number of allocated point slots. This is the capacity the buffer was created with,
    /// and stays the same, when the capacity is narrowed by the first update.
    pub fn allocated(&self) -> usize {
        self.alpha.len()
    }

    /// The number of points in the first update, or [None] if there was no update yet.
    pub fn first_size(&self) -> Option<usize> {
        self.first_size
    }

    /// The number of points written by the most recent update.
    pub fn prev_pts(&self) -> usize {
        self.prev_pts
    }

    /// Number of slots, that are currently drawn.
    pub fn visible_count(&self) -> usize {
        self.alpha
            .items()
            .iter()
            .filter(|a| a.alpha >= VISIBILITY_THRESHOLD)
            .count()
    }

    pub fn position(&self, index: usize) -> Option<[f32; 3]> {
        self.positions.get(index).map(|v| v.position)
    }

    pub fn color(&self, index: usize) -> Option<[f32; 3]> {
        self.colors.get(index).map(|v| v.color)
    }

    pub fn alpha(&self, index: usize) -> Option<f32> {
        self.alpha.get(index).map(|v| v.alpha)
    }

    pub fn positions(&self) -> &BufferAttribute<PositionVertex> {
        &self.positions
    }

    pub fn colors(&self) -> &BufferAttribute<ColorVertex> {
        &self.colors
    }

    pub fn alphas(&self) -> &BufferAttribute<AlphaVertex> {
        &self.alpha
    }

    /// Mutable access to all three attributes at once (position, color, alpha).
    /// Used by the render backends to reset the update flags.
    pub fn attributes_mut(
        &mut self,
    ) -> (
        &mut BufferAttribute<PositionVertex>,
        &mut BufferAttribute<ColorVertex>,
        &mut BufferAttribute<AlphaVertex>,
    ) {
        (&mut self.positions, &mut self.colors, &mut self.alpha)
    }
}

fn check_len(attribute: &'static str, len: usize, required: usize) -> ParticlesResult<()> {
    if len < required {
        return Err(ParticlesError::InsufficientPointData {
            attribute,
            len,
            required,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::ParticleBuffer;
    use crate::error::ParticlesError;
    use crate::points::{PointData, PointFrame};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn make_frame(n: usize, offset: f32) -> PointFrame {
        let mut frame = PointFrame::new("sensor");
        for i in 0..n {
            let v = i as f32 + offset;
            frame.push([v, -v, v * 2.0], [i as u8, 10, 20]);
        }
        frame
    }

    fn make_buffer(max_pts: usize) -> ParticleBuffer {
        ParticleBuffer::with_rng(max_pts, &mut StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_initial_state() {
        let buffer = make_buffer(100);
        assert_eq!(buffer.capacity(), 100);
        assert_eq!(buffer.allocated(), 100);
        assert_eq!(buffer.visible_count(), 0);
        assert_eq!(buffer.first_size(), None);
        assert_eq!(buffer.prev_pts(), 0);
        for i in 0..100 {
            assert_eq!(buffer.alpha(i), Some(0.0));
            assert_eq!(buffer.color(i), Some([255.0, 255.0, 255.0]));
            let position = buffer.position(i).unwrap();
            for c in position {
                assert!((-1.5..1.5).contains(&c));
            }
        }
        assert!(!buffer.positions().needs_update());
        assert!(!buffer.colors().needs_update());
        assert!(!buffer.alphas().needs_update());
    }

    #[test]
    fn test_update_sequence() {
        let mut buffer = make_buffer(10);

        // first update: 4 points
        let frame = make_frame(4, 0.0);
        assert_eq!(buffer.update(&frame.as_point_data(), 4).unwrap(), 4);
        assert_eq!(buffer.visible_count(), 4);
        assert_eq!(buffer.first_size(), Some(4));
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.allocated(), 10);
        for i in 0..4 {
            assert_eq!(buffer.position(i), Some(frame.positions[i]));
            assert_eq!(buffer.color(i), Some(frame.colors[i]));
            assert_eq!(buffer.alpha(i), Some(1.0));
        }

        // second update: 2 points. slots 2 and 3 are hidden.
        let frame2 = make_frame(2, 100.0);
        assert_eq!(buffer.update(&frame2.as_point_data(), 2).unwrap(), 2);
        assert_eq!(buffer.visible_count(), 2);
        assert_eq!(buffer.position(0), Some(frame2.positions[0]));
        assert_eq!(buffer.position(1), Some(frame2.positions[1]));
        assert_eq!(buffer.alpha(2), Some(0.0));
        assert_eq!(buffer.alpha(3), Some(0.0));
        assert_eq!(buffer.prev_pts(), 2);

        // third update: 4 points again, all rewritten.
        let frame3 = make_frame(4, 200.0);
        assert_eq!(buffer.update(&frame3.as_point_data(), 4).unwrap(), 4);
        assert_eq!(buffer.visible_count(), 4);
        for i in 0..4 {
            assert_eq!(buffer.position(i), Some(frame3.positions[i]));
            assert_eq!(buffer.alpha(i), Some(1.0));
        }
        assert_eq!(buffer.capacity(), 4);
    }

    #[test]
    fn test_visible_count_follows_point_count() {
        let mut buffer = make_buffer(50);
        let frame = make_frame(50, 0.0);
        let counts = [50, 30, 30, 45, 0, 12, 50, 1];
        let mut max_so_far = 0;
        for n in counts {
            buffer.update(&frame.as_point_data(), n).unwrap();
            assert_eq!(buffer.visible_count(), n);
            for i in n..max_so_far {
                assert_eq!(buffer.alpha(i), Some(0.0));
            }
            max_so_far = max_so_far.max(n);
        }
    }

    #[test]
    fn test_repeated_update_is_idempotent() {
        let mut buffer = make_buffer(20);
        let frame = make_frame(20, 0.0);
        buffer.update(&frame.as_point_data(), 20).unwrap();
        buffer.update(&frame.as_point_data(), 7).unwrap();
        let snapshot = buffer.clone();
        buffer.update(&frame.as_point_data(), 7).unwrap();
        assert_eq!(buffer.positions().items(), snapshot.positions().items());
        assert_eq!(buffer.colors().items(), snapshot.colors().items());
        assert_eq!(buffer.alphas().items(), snapshot.alphas().items());
        assert_eq!(buffer.prev_pts(), snapshot.prev_pts());
    }

    #[test]
    fn test_first_update_narrows_capacity() {
        let mut buffer = make_buffer(13000);
        let frame = make_frame(600, 0.0);

        assert_eq!(buffer.update(&frame.as_point_data(), 500).unwrap(), 500);
        assert_eq!(buffer.capacity(), 500);

        // more points than the capacity are truncated
        assert_eq!(buffer.update(&frame.as_point_data(), 600).unwrap(), 500);
        assert_eq!(buffer.visible_count(), 500);
        assert_eq!(buffer.alpha(500), Some(0.0));
        assert_eq!(buffer.color(500), Some([255.0, 255.0, 255.0]));
        assert_eq!(buffer.capacity(), 500);
    }

    #[test]
    fn test_overflow_on_first_update_is_truncated() {
        let mut buffer = make_buffer(8);
        let frame = make_frame(12, 0.0);
        assert_eq!(buffer.update(&frame.as_point_data(), 12).unwrap(), 8);
        assert_eq!(buffer.first_size(), Some(12));
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.visible_count(), 8);
    }

    #[test]
    fn test_empty_update_hides_everything() {
        let mut buffer = make_buffer(10);
        let frame = make_frame(10, 0.0);
        buffer.update(&frame.as_point_data(), 10).unwrap();
        assert_eq!(buffer.visible_count(), 10);

        let empty = PointFrame::new("sensor");
        assert_eq!(buffer.update(&empty.as_point_data(), 0).unwrap(), 0);
        assert_eq!(buffer.visible_count(), 0);
    }

    #[test]
    fn test_update_marks_attributes() {
        let mut buffer = make_buffer(10);
        let frame = make_frame(3, 0.0);
        buffer.update(&frame.as_point_data(), 3).unwrap();

        let (positions, colors, alpha) = buffer.attributes_mut();
        assert!(positions.take_needs_update());
        assert!(colors.take_needs_update());
        assert!(alpha.take_needs_update());
        assert!(!buffer.alphas().needs_update());

        buffer.update(&frame.as_point_data(), 0).unwrap();
        assert!(buffer.positions().needs_update());
        assert!(buffer.colors().needs_update());
        assert!(buffer.alphas().needs_update());
    }

    #[test]
    fn test_short_input_is_rejected() {
        let mut buffer = make_buffer(10);
        let data = PointData {
            positions: &[[0.0; 3]; 5],
            colors: &[[0.0; 3]; 2],
            alpha: &[1.0; 5],
        };
        let result = buffer.update(&data, 5);
        assert!(matches!(
            result,
            Err(ParticlesError::InsufficientPointData {
                attribute: "color",
                len: 2,
                required: 5
            })
        ));

        // nothing was modified
        assert_eq!(buffer.first_size(), None);
        assert_eq!(buffer.capacity(), 10);
        assert_eq!(buffer.visible_count(), 0);
        assert!(!buffer.alphas().needs_update());
    }

    #[test]
    fn test_hidden_input_points_stay_hidden() {
        let mut buffer = make_buffer(4);
        let data = PointData {
            positions: &[[1.0; 3]; 4],
            colors: &[[1.0; 3]; 4],
            alpha: &[1.0, 0.0, 1.0, 0.0],
        };
        buffer.update(&data, 4).unwrap();
        assert_eq!(buffer.visible_count(), 2);
    }
}
