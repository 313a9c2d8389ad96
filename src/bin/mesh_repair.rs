//! Scales a triangle mesh, fills its holes, estimates wall thickness and
//! writes the result as STL, OFF and a PLY coloured where the wall is thin.
//!
//! ```text
//! cargo run --bin mesh_repair
//! cargo run --bin mesh_repair -- --input part.off --scale 1 --thin 0.8
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use sweepkit::io::{read_off_polyhedron_file, write_off_file, write_ply_file, write_stl_file};
use sweepkit::mesh::{Polyhedron, Rgb};
use sweepkit::operations::analysis::{ThicknessParams, WallThickness};
use sweepkit::operations::repair::FillHoles;
use sweepkit::operations::transform::Scale;

#[derive(Parser)]
#[command(name = "mesh_repair")]
#[command(about = "Scale, hole-fill and wall-thickness check a triangle mesh", long_about = None)]
struct Cli {
    /// Input OFF file
    #[arg(short, long, default_value = "models/big_bunny_repaired.off")]
    input: PathBuf,
    /// Output path without extension; .stl, .off and .ply are written
    #[arg(short, long, default_value = "models/medium_bunny")]
    output: PathBuf,
    /// Uniform scale factor about the origin
    #[arg(long, default_value_t = 0.5)]
    scale: f64,
    /// Rays cast per face
    #[arg(long, default_value_t = 25)]
    rays: usize,
    /// Faces thinner than this are painted red in the PLY output
    #[arg(long, default_value_t = 1.0)]
    thin: f64,
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for sweepkit and this binary.
    // Override with RUST_LOG.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("mesh_repair=info".parse().unwrap_or_default())
        .add_directive("sweepkit=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let mut poly = load_triangle_mesh(&cli.input)?;

    Scale::new(cli.scale).execute(&mut poly)?;
    println!("Mesh scaled by a factor of {}", cli.scale);

    let holes = FillHoles::new().execute(&mut poly)?;
    println!("Number of holes filled: {holes}");

    let mut mesh = poly.to_surface_mesh()?;
    let params = ThicknessParams {
        rays: cli.rays,
        ..ThicknessParams::default()
    };
    let thickness = WallThickness::new().with_params(params).execute(&mesh)?;
    println!("Minimum wall thickness: {}", thickness.min);
    let thin = thickness.paint_below(&mut mesh, cli.thin, Rgb::RED);
    println!("Faces thinner than {}: {thin}", cli.thin);

    write_stl_file(&mesh, cli.output.with_extension("stl"))?;
    write_off_file(&mesh, cli.output.with_extension("off"))?;
    write_ply_file(&mesh, cli.output.with_extension("ply"))?;
    Ok(())
}

/// Reads `path` as a polyhedron and exits with status 1 unless it is a
/// non-empty triangle mesh.
fn load_triangle_mesh(path: &Path) -> Result<Polyhedron> {
    let poly = read_off_polyhedron_file(path)?;
    if poly.face_count() == 0 || !poly.is_pure_triangle() {
        eprintln!("Input is not a triangle mesh: {}", path.display());
        std::process::exit(1);
    }
    Ok(poly)
}
