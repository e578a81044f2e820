use nalgebra::{Isometry3, Matrix4, Translation3, UnitQuaternion, Vector3};
use std::time::Duration;

/// A stamped edge in the frame tree: the pose of `frame` relative to `parent_frame`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub frame: String,
    pub parent_frame: String,
    pub is_static: bool,
    pub time_stamp: Duration,
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Transform {
    fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    /// Matrix transforming coordinates in `frame` into `parent_frame`.
    pub fn matrix(&self) -> Matrix4<f64> {
        self.isometry().to_homogeneous()
    }

    /// Matrix transforming coordinates in `parent_frame` into `frame`.
    pub fn inverse_matrix(&self) -> Matrix4<f64> {
        self.isometry().inverse().to_homogeneous()
    }

    /// Interpolates between two transforms of the same frame.
    /// `frac == 0.0` gives `self`, `frac == 1.0` gives `other`.
    pub fn interpolate(&self, frac: f64, other: &Transform) -> Transform {
        let time_stamp = if other.time_stamp >= self.time_stamp {
            self.time_stamp + (other.time_stamp - self.time_stamp).mul_f64(frac)
        } else {
            self.time_stamp - (self.time_stamp - other.time_stamp).mul_f64(frac)
        };

        // slerp is undefined for opposite rotations - just snap in that case
        let rotation = self
            .rotation
            .try_slerp(&other.rotation, frac, 1.0e-9)
            .unwrap_or(if frac < 0.5 {
                self.rotation
            } else {
                other.rotation
            });

        Transform {
            frame: self.frame.clone(),
            parent_frame: self.parent_frame.clone(),
            is_static: self.is_static && other.is_static,
            time_stamp,
            translation: self.translation.lerp(&other.translation, frac),
            rotation,
        }
    }
}
