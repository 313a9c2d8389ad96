//! Samples a closed helix around a base circle, fits a periodic B-spline
//! through it and sweeps a circular pipe along the curve.
//!
//! ```text
//! cargo run --bin helix_pipe
//! cargo run --bin helix_pipe -- --rotations 5 --pipe-diameter 3 --copies 4
//! ```

use std::f64::consts::TAU;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use sweepkit::io::{write_off_file, write_stl_file};
use sweepkit::operations::creation::RotatedComposite;
use sweepkit::operations::fitting::FitPeriodicBSpline;
use sweepkit::operations::sampling::{HelixParams, SampleHelix};
use sweepkit::operations::shaping::MakePipe;

#[derive(Parser)]
#[command(name = "helix_pipe")]
#[command(about = "Sweep a pipe along a closed helix", long_about = None)]
struct Cli {
    /// Diameter D of the base circle
    #[arg(long, default_value_t = 100.0)]
    circle_diameter: f64,
    /// Amplitude A of the helical offset
    #[arg(long, default_value_t = 10.0)]
    helix_offset: f64,
    /// Helical turns R per trip around the base circle
    #[arg(long, default_value_t = 3)]
    rotations: i32,
    /// Number N of helix samples
    #[arg(long, default_value_t = 1000)]
    points: usize,
    /// Diameter of the swept pipe
    #[arg(long, default_value_t = 5.0)]
    pipe_diameter: f64,
    /// Copies of the pipe spread evenly about the Z axis
    #[arg(long, default_value_t = 1)]
    copies: i32,
    /// Output STL file; an OFF file is written next to it
    #[arg(short, long, default_value = "pipe_helix.stl")]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for sweepkit and this binary.
    // Override with RUST_LOG.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("helix_pipe=info".parse().unwrap_or_default())
        .add_directive("sweepkit=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    if cli.copies < 1 {
        bail!("invalid copy count {}", cli.copies);
    }

    let samples = SampleHelix::new(HelixParams {
        circle_diameter: cli.circle_diameter,
        helix_offset: cli.helix_offset,
        rotations: cli.rotations,
        n_points: cli.points,
    })
    .execute()?;
    let spine = FitPeriodicBSpline::new(&samples).execute()?;
    let pipe = MakePipe::new(&spine, cli.pipe_diameter).execute()?;
    println!("Pipe volume: {}", pipe.volume());

    let mesh = if cli.copies == 1 {
        pipe.into_mesh()
    } else {
        let angle = TAU / f64::from(cli.copies);
        RotatedComposite::new(&pipe, cli.copies, angle).execute()?.to_mesh()
    };

    write_stl_file(&mesh, &cli.output)?;
    write_off_file(&mesh, cli.output.with_extension("off"))?;
    println!("Pipe written to {}", cli.output.display());
    Ok(())
}
