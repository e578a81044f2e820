use clap::Parser;
use std::path::PathBuf;

/// Replays recorded point clouds and transforms through the particle system.
///
/// Nothing is drawn. For every recorded point cloud, the tool logs how many points
/// would be visible and where the particles are placed in the fixed frame.
///
/// Point cloud file (csv, with header):
///     stamp,frame_id,x,y,z,r,g,b
/// All consecutive rows with the same stamp (in seconds) form one point cloud.
///
/// Transforms file (csv, with header):
///     stamp,frame,parent_frame,x,y,z,qx,qy,qz,qw,is_static
#[derive(Debug, Parser)]
#[command(verbatim_doc_comment)]
pub struct AppOptions {
    /// Verbosity of the command line output.
    #[clap(long, default_value = "info")]
    pub log_level: log::Level,

    /// The recorded point clouds.
    #[clap(long)]
    pub points: PathBuf,

    /// The recorded transforms.
    #[clap(long)]
    pub transforms: Option<PathBuf>,

    /// Frame, that the particles are placed in.
    #[clap(long, default_value = "world")]
    pub fixed_frame: String,

    /// Json file with the particle options (texture, point_size, max_points).
    #[clap(long)]
    pub options: Option<PathBuf>,

    /// Overrides the maximum number of points.
    #[clap(long)]
    pub max_points: Option<usize>,

    /// Overrides the point size.
    #[clap(long)]
    pub point_size: Option<f32>,

    /// Overrides the point texture.
    #[clap(long)]
    pub texture: Option<PathBuf>,

    /// Point clouds per second. By default, the point clouds are replayed as fast as possible.
    #[clap(long)]
    pub rate: Option<f64>,
}
