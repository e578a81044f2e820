use crate::anchor::FrameAnchor;
use crate::buffer::ParticleBuffer;
use crate::error::ParticlesResult;
use crate::points::{PointData, PointFrame};
use crate::scene::{ParticleMaterial, ParticlePoints, SceneNode, SceneRoot};
use crate::settings::ParticlesOptions;
use crate::shaders::ParticleShaders;
use crate::tf::TfClient;
use std::cell::Ref;
use std::rc::Rc;

/// A set of particles, drawn in some coordinate frame.
///
/// Each call to [Self::update] replaces the drawn points with a new set.
/// The particles are attached to their coordinate frame on the first update.
pub struct Particles {
    tf_client: Rc<dyn TfClient>,
    root_object: SceneRoot,
    options: ParticlesOptions,
    points: Rc<ParticlePoints>,
    anchor: FrameAnchor,
}

impl Particles {
    pub fn new(
        tf_client: Rc<dyn TfClient>,
        root_object: SceneRoot,
        options: ParticlesOptions,
    ) -> Self {
        let material = ParticleMaterial {
            shaders: ParticleShaders::new(options.point_size),
            texture: options.texture.clone(),
            transparent: true,
        };
        let geometry = ParticleBuffer::new(options.max_points);
        Particles {
            tf_client,
            root_object,
            options,
            points: Rc::new(ParticlePoints::new(geometry, material)),
            anchor: FrameAnchor::new(),
        }
    }

    /// Replaces the drawn points with the first `n` points from `points`.
    ///
    /// `frame_id` is the frame, that the positions are relative to. Only the frame id of the
    /// very first update is used.
    ///
    /// Returns the number of points, that are drawn. This can be less than `n`, if `n`
    /// exceeds the capacity.
    ///
    /// Panics, if the point buffer is currently borrowed (e.g. by a render backend).
    pub fn update(
        &mut self,
        frame_id: &str,
        points: &PointData<'_>,
        n: usize,
    ) -> ParticlesResult<usize> {
        // invalid input must neither attach the particles nor touch the buffer
        self.points.geometry().check_input(points, n)?;
        self.anchor.ensure_attached(
            frame_id,
            self.tf_client.as_ref(),
            &self.points,
            &self.root_object,
        );
        self.points.geometry_cell().borrow_mut().update(points, n)
    }

    /// Replaces the drawn points with all points of the given frame.
    pub fn update_frame(&mut self, frame: &PointFrame) -> ParticlesResult<usize> {
        self.update(&frame.frame_id, &frame.as_point_data(), frame.len())
    }

    /// The drawable.
    pub fn points(&self) -> &Rc<ParticlePoints> {
        &self.points
    }

    /// The point buffer.
    pub fn buffer(&self) -> Ref<'_, ParticleBuffer> {
        self.points.geometry()
    }

    pub fn root_object(&self) -> &SceneRoot {
        &self.root_object
    }

    /// The scene node of the particles, or [None] before the first update.
    pub fn scene_node(&self) -> Option<&SceneNode> {
        self.anchor.scene_node()
    }

    pub fn options(&self) -> &ParticlesOptions {
        &self.options
    }
}

#[cfg(test)]
mod test {
    use super::Particles;
    use crate::error::ParticlesError;
    use crate::points::{PointData, PointFrame};
    use crate::scene::{PoseHandle, SceneRoot};
    use crate::settings::ParticlesOptions;
    use crate::tf::{FrameTreeClient, TfClient, Transform};
    use nalgebra::{UnitQuaternion, point, vector};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Remembers which frames were requested.
    #[derive(Default)]
    struct RecordingTfClient {
        requests: RefCell<Vec<String>>,
    }

    impl TfClient for RecordingTfClient {
        fn track(&self, frame_id: &str) -> PoseHandle {
            self.requests.borrow_mut().push(frame_id.to_string());
            PoseHandle::new()
        }
    }

    fn make_frame(frame_id: &str, n: usize) -> PointFrame {
        let mut frame = PointFrame::new(frame_id);
        for i in 0..n {
            frame.push([i as f32, 0.0, 0.0], [255, 0, 0]);
        }
        frame
    }

    fn options(max_points: usize) -> ParticlesOptions {
        ParticlesOptions {
            max_points,
            ..Default::default()
        }
    }

    #[test]
    fn test_nothing_attached_before_first_update() {
        let client = Rc::new(RecordingTfClient::default());
        let particles = Particles::new(client.clone(), SceneRoot::new(), options(10));
        assert!(particles.scene_node().is_none());
        assert!(particles.root_object().is_empty());
        assert!(client.requests.borrow().is_empty());
        assert_eq!(particles.buffer().visible_count(), 0);
        assert_eq!(particles.buffer().capacity(), 10);
    }

    #[test]
    fn test_attached_exactly_once() {
        let client = Rc::new(RecordingTfClient::default());
        let root = SceneRoot::new();
        let mut particles = Particles::new(client.clone(), root.clone(), options(10));

        particles.update_frame(&make_frame("velodyne", 4)).unwrap();
        particles.update_frame(&make_frame("velodyne", 2)).unwrap();
        particles.update_frame(&make_frame("other", 3)).unwrap();

        assert_eq!(*client.requests.borrow(), vec!["velodyne".to_string()]);
        assert_eq!(root.len(), 1);
        assert_eq!(particles.scene_node().unwrap().frame_id(), "velodyne");
        assert!(Rc::ptr_eq(root.nodes()[0].object(), particles.points()));
        assert_eq!(particles.buffer().visible_count(), 3);
    }

    #[test]
    fn test_invalid_first_update_does_not_attach() {
        let client = Rc::new(RecordingTfClient::default());
        let root = SceneRoot::new();
        let mut particles = Particles::new(client.clone(), root.clone(), options(10));

        let data = PointData {
            positions: &[[0.0; 3]; 5],
            colors: &[[0.0; 3]; 2],
            alpha: &[1.0; 5],
        };
        let result = particles.update("bad", &data, 5);
        assert!(matches!(
            result,
            Err(ParticlesError::InsufficientPointData { attribute: "color", .. })
        ));
        assert!(particles.scene_node().is_none());
        assert_eq!(root.len(), 0);
        assert!(client.requests.borrow().is_empty());
        assert_eq!(particles.buffer().first_size(), None);

        // a valid update afterwards attaches to its own frame
        particles.update_frame(&make_frame("velodyne", 3)).unwrap();
        assert_eq!(particles.scene_node().unwrap().frame_id(), "velodyne");
        assert_eq!(root.len(), 1);
        assert_eq!(particles.buffer().first_size(), Some(3));
    }

    #[test]
    fn test_scenario() {
        let client = Rc::new(RecordingTfClient::default());
        let mut particles = Particles::new(client, SceneRoot::new(), options(10));

        assert_eq!(particles.update_frame(&make_frame("map", 4)).unwrap(), 4);
        {
            let buffer = particles.buffer();
            assert_eq!(buffer.visible_count(), 4);
            assert_eq!(buffer.first_size(), Some(4));
            assert_eq!(buffer.capacity(), 4);
            assert_eq!(buffer.position(3), Some([3.0, 0.0, 0.0]));
            assert_eq!(buffer.color(3), Some([255.0, 0.0, 0.0]));
        }

        assert_eq!(particles.update_frame(&make_frame("map", 2)).unwrap(), 2);
        {
            let buffer = particles.buffer();
            assert_eq!(buffer.visible_count(), 2);
            assert_eq!(buffer.alpha(2), Some(0.0));
            assert_eq!(buffer.alpha(3), Some(0.0));
        }

        assert_eq!(particles.update_frame(&make_frame("map", 4)).unwrap(), 4);
        assert_eq!(particles.buffer().visible_count(), 4);

        // the capacity was narrowed by the first update
        assert_eq!(particles.update_frame(&make_frame("map", 8)).unwrap(), 4);
        assert_eq!(particles.buffer().visible_count(), 4);
    }

    #[test]
    fn test_pose_is_resolved_by_client() {
        let client = Rc::new(FrameTreeClient::new("world"));
        let root = SceneRoot::new();
        let mut particles = Particles::new(client.clone(), root.clone(), options(100));

        client.add_transform(Transform {
            frame: "velodyne".to_string(),
            parent_frame: "world".to_string(),
            is_static: true,
            time_stamp: Duration::ZERO,
            translation: vector![0.0, 0.0, 2.0],
            rotation: UnitQuaternion::identity(),
        });
        particles.update_frame(&make_frame("velodyne", 10)).unwrap();
        assert_eq!(client.tracked_frames(), vec!["velodyne".to_string()]);

        let node = &root.nodes()[0];
        assert_eq!(node.pose().get(), None);
        client.update(Duration::from_secs(1));
        let origin = node
            .pose()
            .get()
            .unwrap()
            .transform_point(&point![0.0, 0.0, 0.0]);
        assert_eq!(origin, point![0.0, 0.0, 2.0]);
    }
}
