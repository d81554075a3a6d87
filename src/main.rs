//! sdfmesh: extract colored STL surfaces from meshes and CSG shapes.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=sdfmesh=info` - Run summaries
//! - `RUST_LOG=sdfmesh=debug` - Per-worker extraction counters
//! - `RUST_LOG=sdfmesh::timing=info` - Operation durations only
//!
//! # Example
//!
//! ```bash
//! # Clip a mesh with a tilted plane and write the surface to out.stl
//! RUST_LOG=sdfmesh=info sdfmesh mesh bunny.stl --scale 4 -o out.stl
//!
//! # The CSG demo: a sphere and a box intersected, minus three cylinders
//! sdfmesh demo --radius 60 -o demo.stl
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use nalgebra::{Point3, Vector3};
use sdfmesh::float_types::{FRAC_PI_2, Real};
use sdfmesh::{Color, ExtractConfig, Extraction, LatticeBounds, MeshField, Sdf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// sdfmesh - Extract colored triangle surfaces from signed distance fields.
#[derive(Parser)]
#[command(name = "sdfmesh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Worker threads (defaults to the available parallelism)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Sample every lattice cell instead of skipping cells far from the surface
    #[arg(long, global = true)]
    no_skip: bool,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a mesh, clip it with a tilted plane and extract its surface
    Mesh {
        /// Input mesh file (binary or ASCII STL)
        input: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "out.stl")]
        output: PathBuf,

        /// Lattice half extent in cells along each axis
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [320, 320, 520])]
        half_extent: Vec<i32>,

        /// Uniform scale applied to the mesh (lattice cells per mesh unit)
        #[arg(long, default_value_t = 1.0)]
        scale: Real,

        /// Translation applied to the mesh after scaling
        #[arg(
            long,
            num_args = 3,
            value_names = ["X", "Y", "Z"],
            allow_negative_numbers = true,
            default_values_t = [0.0, 0.0, 0.0]
        )]
        offset: Vec<Real>,

        /// Mesh color as RRGGBB hex
        #[arg(long, default_value = "3498DB", value_parser = parse_hex_color)]
        color: u32,

        /// Tilt of the clipping plane about X, in degrees; positive angles
        /// tip the plane normal from +Y towards -Z
        #[arg(long, default_value_t = 22.5, allow_negative_numbers = true)]
        clip_plane_angle: Real,

        /// Keep the whole mesh instead of clipping it
        #[arg(long)]
        no_clip: bool,
    },

    /// Extract the CSG demo shape
    Demo {
        /// Output file path
        #[arg(short, long, default_value = "out.stl")]
        output: PathBuf,

        /// Sphere radius in lattice cells
        #[arg(long, default_value_t = 100.0)]
        radius: Real,
    },
}

fn parse_hex_color(s: &str) -> std::result::Result<u32, String> {
    let digits = s.trim_start_matches('#').trim_start_matches("0x");
    let value = u32::from_str_radix(digits, 16).map_err(|e| format!("{s:?} is not a hex color: {e}"))?;
    if value > 0xFF_FFFF {
        return Err(format!("{s:?} has more than 24 bits"));
    }
    Ok(value)
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "sdfmesh=info",
            2 => "sdfmesh=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

/// A sphere trimmed by a box, bored through by three axis cylinders and cut
/// in half by the `z = 0` plane. Each part has its own color.
fn demo_shape(r: Real) -> Sdf {
    let mut f = Sdf::sphere(r, Point3::origin()).with_color(Color::BLACK);
    f &= Sdf::cuboid(Vector3::repeat(r * 0.75)).with_color(Color::WHITE);
    f -= Sdf::cylinder(r / 2.0)
        .with_hex_color(0xFF0000)
        .rotate(FRAC_PI_2, Vector3::x());
    f -= Sdf::cylinder(r / 2.0)
        .with_hex_color(0x00FF00)
        .rotate(FRAC_PI_2, Vector3::y());
    f -= Sdf::cylinder(r / 2.0)
        .with_hex_color(0x0000FF)
        .rotate(FRAC_PI_2, Vector3::z());
    f &= Sdf::plane(Vector3::z(), Point3::origin()).with_hex_color(0xFF00FF);
    f
}

/// Half-space keeping the side its normal points to, with the normal tipped
/// from +Y towards -Z by `degrees` about X.
fn clip_plane(degrees: Real) -> Sdf {
    Sdf::plane(Vector3::y(), Point3::origin())
        .with_hex_color(0xE74C3C)
        .rotate(-degrees.to_radians(), Vector3::x())
}

fn write_output(extraction: &Extraction, output: &Path) -> Result<()> {
    extraction
        .write_stl(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(
        triangles = extraction.triangle_count(),
        path = %output.display(),
        "wrote surface"
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_mesh(
    input: &Path,
    output: &Path,
    half_extent: &[i32],
    scale: Real,
    offset: &[Real],
    color: u32,
    clip_plane_angle: Option<Real>,
    config: &ExtractConfig,
) -> Result<()> {
    let [hx, hy, hz] = half_extent else {
        bail!("--half-extent takes exactly three values");
    };
    let [ox, oy, oz] = offset else {
        bail!("--offset takes exactly three values");
    };
    if !(scale.is_finite() && scale > 0.0) {
        bail!("--scale must be a positive number, got {scale}");
    }

    let field = MeshField::from_stl_file(input)
        .with_context(|| format!("failed to load mesh from {}", input.display()))?;
    tracing::info!(
        triangles = field.triangle_count(),
        vertices = field.vertices().len(),
        "loaded mesh"
    );

    let mut sdf = (Sdf::mesh(field) * scale + Vector3::new(*ox, *oy, *oz)).with_hex_color(color);
    if let Some(degrees) = clip_plane_angle {
        sdf &= clip_plane(degrees);
    }

    let extraction = sdf.extract(&LatticeBounds::symmetric(*hx, *hy, *hz), config)?;
    write_output(&extraction, output)
}

fn run_demo(output: &Path, radius: Real, config: &ExtractConfig) -> Result<()> {
    if !(radius.is_finite() && radius > 0.0) {
        bail!("--radius must be a positive number, got {radius}");
    }
    let h = radius.ceil() as i32 + 1;
    let extraction = demo_shape(radius).extract(&LatticeBounds::symmetric(h, h, h), config)?;
    write_output(&extraction, output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let mut config = ExtractConfig::default().with_skip_empty_cells(!cli.no_skip);
    if let Some(workers) = cli.workers {
        if workers == 0 {
            bail!("--workers must be at least 1");
        }
        config = config.with_workers(workers);
    }

    match &cli.command {
        Commands::Mesh {
            input,
            output,
            half_extent,
            scale,
            offset,
            color,
            clip_plane_angle,
            no_clip,
        } => run_mesh(
            input,
            output,
            half_extent,
            *scale,
            offset,
            *color,
            (!*no_clip).then_some(*clip_plane_angle),
            &config,
        ),
        Commands::Demo { output, radius } => run_demo(output, *radius, &config),
    }
}
