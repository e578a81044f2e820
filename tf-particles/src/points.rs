//! Input data for updating the particle buffer.

/// Borrowed, parallel per-point data.
///
/// Index `i` of each slice belongs to the same point. The slices may be longer than
/// the number of points that are written (e.g. when the decoder re-uses buffers sized
/// to the capacity), but never shorter.
#[derive(Copy, Clone, Debug)]
pub struct PointData<'a> {
    pub positions: &'a [[f32; 3]],

    /// RGB, each channel between 0.0 and 255.0
    pub colors: &'a [[f32; 3]],

    /// 1.0 for visible points, 0.0 for hidden ones
    pub alpha: &'a [f32],
}

impl PointData<'_> {
    /// Number of points, for which all three attributes are available.
    pub fn len(&self) -> usize {
        self.positions
            .len()
            .min(self.colors.len())
            .min(self.alpha.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An owned set of points, as decoded from a single sensor message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointFrame {
    /// Name of the coordinate frame the positions are relative to.
    pub frame_id: String,
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub alpha: Vec<f32>,
}

impl PointFrame {
    pub fn new(frame_id: impl Into<String>) -> Self {
        PointFrame {
            frame_id: frame_id.into(),
            ..Default::default()
        }
    }

    /// Appends a visible point.
    pub fn push(&mut self, position: [f32; 3], color: [u8; 3]) {
        self.positions.push(position);
        self.colors
            .push([color[0] as f32, color[1] as f32, color[2] as f32]);
        self.alpha.push(1.0);
    }

    pub fn len(&self) -> usize {
        self.as_point_data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_point_data().is_empty()
    }

    pub fn as_point_data(&self) -> PointData<'_> {
        PointData {
            positions: &self.positions,
            colors: &self.colors,
            alpha: &self.alpha,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{PointData, PointFrame};

    #[test]
    fn test_point_frame_push() {
        let mut frame = PointFrame::new("velodyne");
        assert!(frame.is_empty());

        frame.push([1.0, 2.0, 3.0], [255, 0, 128]);
        frame.push([4.0, 5.0, 6.0], [0, 0, 0]);

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.frame_id, "velodyne");
        assert_eq!(frame.colors[0], [255.0, 0.0, 128.0]);
        assert_eq!(frame.alpha, vec![1.0, 1.0]);
    }

    #[test]
    fn test_point_data_len_is_shortest_slice() {
        let data = PointData {
            positions: &[[0.0; 3]; 5],
            colors: &[[0.0; 3]; 3],
            alpha: &[1.0; 4],
        };
        assert_eq!(data.len(), 3);
    }
}
