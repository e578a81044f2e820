use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use nalgebra::{vector, Point3, Quaternion, UnitQuaternion};
use serde::Deserialize;
use std::io::Read;
use std::thread;
use std::time::{Duration, Instant};
use tf_particles::tf::{FrameTreeClient, Transform};
use tf_particles::{Particles, PointFrame};

/// One row of the point cloud file.
#[derive(Debug, Deserialize)]
struct PointRecord {
    stamp: f64,
    frame_id: String,
    x: f32,
    y: f32,
    z: f32,
    r: u8,
    g: u8,
    b: u8,
}

/// One row of the transforms file.
#[derive(Debug, Deserialize)]
struct TransformRecord {
    stamp: f64,
    frame: String,
    parent_frame: String,
    x: f64,
    y: f64,
    z: f64,
    qx: f64,
    qy: f64,
    qz: f64,
    qw: f64,
    is_static: bool,
}

/// A point cloud together with its recording time.
#[derive(Debug)]
pub struct StampedFrame {
    pub stamp: Duration,
    pub frame: PointFrame,
}

fn parse_stamp(stamp: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(stamp).map_err(|e| anyhow!("Invalid time stamp {stamp}: {e}"))
}

/// Reads the point cloud csv. Consecutive rows with the same stamp form one point cloud.
pub fn read_point_frames<R: Read>(reader: R) -> Result<Vec<StampedFrame>> {
    let mut frames: Vec<StampedFrame> = Vec::new();
    let mut csv_reader = csv::Reader::from_reader(reader);
    for (row, record) in csv_reader.deserialize::<PointRecord>().enumerate() {
        let record = record.with_context(|| format!("Invalid point in row {}", row + 1))?;
        let stamp = parse_stamp(record.stamp)?;

        let is_new_frame = frames.last().map_or(true, |last| last.stamp != stamp);
        if is_new_frame {
            frames.push(StampedFrame {
                stamp,
                frame: PointFrame::new(record.frame_id.clone()),
            });
        }
        if let Some(current) = frames.last_mut() {
            current
                .frame
                .push([record.x, record.y, record.z], [record.r, record.g, record.b]);
        }
    }
    Ok(frames)
}

/// Reads the transforms csv.
pub fn read_transforms<R: Read>(reader: R) -> Result<Vec<Transform>> {
    let mut transforms = Vec::new();
    let mut csv_reader = csv::Reader::from_reader(reader);
    for (row, record) in csv_reader.deserialize::<TransformRecord>().enumerate() {
        let record = record.with_context(|| format!("Invalid transform in row {}", row + 1))?;
        transforms.push(Transform {
            frame: record.frame,
            parent_frame: record.parent_frame,
            is_static: record.is_static,
            time_stamp: parse_stamp(record.stamp)?,
            translation: vector![record.x, record.y, record.z],
            rotation: UnitQuaternion::from_quaternion(Quaternion::new(
                record.qw, record.qx, record.qy, record.qz,
            )),
        });
    }
    Ok(transforms)
}

/// What happened during a replay.
#[derive(Debug, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub points_written: usize,
    pub resolved_frames: usize,
    pub last_visible: usize,
}

/// Feeds the point clouds through the particles, one by one.
pub fn replay(
    particles: &mut Particles,
    client: &FrameTreeClient,
    frames: &[StampedFrame],
    interval: Option<Duration>,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for (index, stamped) in frames.iter().enumerate() {
        let start = Instant::now();

        let written = particles.update_frame(&stamped.frame)?;
        let resolved = client.update(stamped.stamp);
        client.cleanup_before(stamped.stamp);

        let visible = particles.buffer().visible_count();
        let origin = particles
            .scene_node()
            .and_then(|node| node.pose().get())
            .map(|pose| pose.transform_point(&Point3::origin()));
        match origin {
            Some(origin) => info!(
                "Point cloud #{index} at {:?}: {written} points written, {visible} visible, origin at ({:.3}, {:.3}, {:.3}) in '{}'.",
                stamped.stamp,
                origin.x,
                origin.y,
                origin.z,
                client.fixed_frame()
            ),
            None => info!(
                "Point cloud #{index} at {:?}: {written} points written, {visible} visible, frame '{}' not resolved yet.",
                stamped.stamp, stamped.frame.frame_id
            ),
        }

        summary.frames += 1;
        summary.points_written += written;
        summary.resolved_frames += resolved;
        summary.last_visible = visible;

        if let Some(interval) = interval {
            if let Some(remaining) = interval.checked_sub(start.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }
    debug!("Frame tree at the end of the replay:\n{}", client.describe_tree());
    Ok(summary)
}
