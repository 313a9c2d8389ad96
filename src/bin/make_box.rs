//! Builds an axis-aligned box and writes it as ASCII STL.
//!
//! ```text
//! cargo run --bin make_box
//! cargo run --bin make_box -- --dx 20 --dy 15 --dz 10 --output small.stl
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sweepkit::io::write_stl_file;
use sweepkit::operations::creation::MakeBox;

#[derive(Parser)]
#[command(name = "make_box")]
#[command(about = "Write a box solid as STL", long_about = None)]
struct Cli {
    /// Extent along X
    #[arg(long, default_value_t = 200.0)]
    dx: f64,
    /// Extent along Y
    #[arg(long, default_value_t = 150.0)]
    dy: f64,
    /// Extent along Z
    #[arg(long, default_value_t = 100.0)]
    dz: f64,
    /// Output STL file
    #[arg(short, long, default_value = "box.stl")]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for sweepkit and this binary.
    // Override with RUST_LOG.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("make_box=info".parse().unwrap_or_default())
        .add_directive("sweepkit=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let solid = MakeBox::from_size(cli.dx, cli.dy, cli.dz).execute()?;
    write_stl_file(solid.mesh(), &cli.output)?;
    println!("Box written to {}", cli.output.display());
    Ok(())
}
