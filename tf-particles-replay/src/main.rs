use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::AppOptions;
use human_panic::setup_panic;
use log::{debug, error, info};
use replay::{read_point_frames, read_transforms, replay};
use std::fs::File;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;
use tf_particles::scene::SceneRoot;
use tf_particles::tf::FrameTreeClient;
use tf_particles::{Particles, ParticlesOptions};

mod cli;
mod replay;

fn main() -> ExitCode {
    setup_panic!();

    // arg parsing
    let args = AppOptions::parse();

    // logger
    if let Err(e) = simple_logger::init_with_level(args.log_level) {
        eprintln!("Failed to initialize the logger: {e}");
        return ExitCode::FAILURE;
    }

    // run
    let result = run(args);
    if let Err(e) = result {
        error!("{e}");
        debug!("{e:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn particle_options(args: &AppOptions) -> Result<ParticlesOptions> {
    let mut options = match &args.options {
        Some(path) => ParticlesOptions::from_json_file(path)?,
        None => ParticlesOptions::default(),
    };
    if let Some(max_points) = args.max_points {
        options.max_points = max_points;
    }
    if let Some(point_size) = args.point_size {
        options.point_size = point_size;
    }
    if let Some(texture) = &args.texture {
        options.texture = Some(texture.clone());
    }
    Ok(options)
}

fn run(args: AppOptions) -> Result<()> {
    let interval = match args.rate {
        Some(rate) if !(rate.is_finite() && rate > 0.0) => bail!("Invalid rate: {rate}"),
        Some(rate) => Some(Duration::from_secs_f64(1.0 / rate)),
        None => None,
    };
    let options = particle_options(&args)?;

    // frames
    let client = Rc::new(FrameTreeClient::new(args.fixed_frame.as_str()));
    if let Some(path) = &args.transforms {
        let file = File::open(path)
            .with_context(|| format!("Failed to open transforms file {}", path.display()))?;
        let transforms = read_transforms(file)?;
        info!("Loaded {} transforms.", transforms.len());
        for transform in transforms {
            client.add_transform(transform);
        }
    }

    // points
    let file = File::open(&args.points)
        .with_context(|| format!("Failed to open points file {}", args.points.display()))?;
    let frames = read_point_frames(file)?;
    info!("Replaying {} point clouds.", frames.len());

    let mut particles = Particles::new(client.clone(), SceneRoot::new(), options);
    debug!("{:?}", particles.options());
    let summary = replay(&mut particles, &client, &frames, interval)?;

    info!(
        "Replayed {} point clouds, {} points written, {} frame resolutions.",
        summary.frames, summary.points_written, summary.resolved_frames
    );
    info!("Bye. 👋");
    Ok(())
}
