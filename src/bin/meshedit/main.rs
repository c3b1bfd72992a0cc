//! meshedit CLI - run editing operators on built-in solids.
//!
//! Usage: meshedit <COMMAND> [OPTIONS]
//!
//! Run `meshedit --help` for available commands.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use log::warn;

use meshedit::algo::decimate::DecimateOptions;
use meshedit::algo::remesh::RemeshOptions;
use meshedit::algo::subdivide::{SubdivideOptions, SubdivisionScheme};
use meshedit::algo::{MeshResampler, Progress, ResampleOp};
use meshedit::mesh::{primitives, HalfEdgeMesh, PolygonSoup};

#[derive(Parser)]
#[command(name = "meshedit")]
#[command(author, version, about = "Half-edge mesh editing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Built-in solid to load
        #[arg(short, long, value_enum, default_value = "cube")]
        shape: Shape,

        /// Edge length (cube) or circumradius (other solids)
        #[arg(long, default_value = "1.0")]
        size: f64,
    },

    /// Apply a sequence of operators and report the result
    Apply {
        /// Built-in solid to load
        #[arg(short, long, value_enum, default_value = "cube")]
        shape: Shape,

        /// Edge length (cube) or circumradius (other solids)
        #[arg(long, default_value = "1.0")]
        size: f64,

        /// Operators to run, in order
        #[arg(value_enum, required = true)]
        ops: Vec<Op>,

        /// Subdivision levels per upsample/subdivide
        #[arg(short, long, default_value = "1")]
        iterations: usize,

        /// Use midpoint rules instead of smooth subdivision
        #[arg(long)]
        linear: bool,

        /// Target number of faces for downsample
        #[arg(short = 'f', long, conflicts_with = "ratio")]
        faces: Option<usize>,

        /// Target ratio of faces to keep for downsample (0.0 to 1.0)
        #[arg(short, long, default_value = "0.25")]
        ratio: f64,

        /// Target edge length for resample (default: average edge length)
        #[arg(short = 'l', long)]
        target_length: Option<f64>,

        /// Number of resample passes
        #[arg(long, default_value = "5")]
        passes: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Regular tetrahedron
    Tetrahedron,
    /// Axis-aligned cube (quads)
    Cube,
    /// Regular octahedron
    Octahedron,
    /// Regular icosahedron
    Icosahedron,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Op {
    /// Fan-triangulate every non-triangular face
    Triangulate,
    /// Loop subdivision (triangle meshes)
    Upsample,
    /// Quadric-error simplification (triangle meshes)
    Downsample,
    /// Isotropic remeshing (triangle meshes)
    Resample,
    /// Catmull-Clark subdivision (any polygon mesh)
    Subdivide,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { shape, size } => {
            let mesh = load(shape, size)?;
            print_info(&mesh);
        }

        Commands::Apply {
            shape,
            size,
            ops,
            iterations,
            linear,
            faces,
            ratio,
            target_length,
            passes,
        } => {
            let scheme = if linear {
                SubdivisionScheme::Linear
            } else {
                SubdivisionScheme::Smooth
            };
            let decimate = match faces {
                Some(target) => DecimateOptions::with_target_faces(target),
                None => DecimateOptions::with_target_ratio(ratio),
            };
            let mut remesh = RemeshOptions::default().with_iterations(passes);
            remesh.target_length = target_length;

            let resampler = MeshResampler::new()
                .with_subdivide_options(SubdivideOptions::new(iterations).with_scheme(scheme))
                .with_decimate_options(decimate)
                .with_remesh_options(remesh);

            let mut mesh = load(shape, size)?;
            cmd_apply(&mut mesh, resampler, &ops)?;
            print_info(&mesh);
        }
    }

    Ok(())
}

fn load(shape: Shape, size: f64) -> Result<HalfEdgeMesh, Box<dyn std::error::Error>> {
    let soup: PolygonSoup = match shape {
        Shape::Tetrahedron => primitives::tetrahedron(size),
        Shape::Cube => primitives::cube(size),
        Shape::Octahedron => primitives::octahedron(size),
        Shape::Icosahedron => primitives::icosahedron(size),
    };
    Ok(soup.build()?)
}

fn cmd_apply(
    mesh: &mut HalfEdgeMesh,
    mut resampler: MeshResampler,
    ops: &[Op],
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    for &op in ops {
        let start = Instant::now();
        let resample_op = match op {
            Op::Triangulate => {
                let split = mesh.triangulate();
                println!("triangulate: {} faces split", split);
                continue;
            }
            Op::Upsample => ResampleOp::Upsample,
            Op::Downsample => ResampleOp::Downsample,
            Op::Resample => ResampleOp::Resample,
            Op::Subdivide => ResampleOp::Subdivide,
        };

        println!("Applying {}...", resample_op);
        let progress = create_progress();
        match resampler.run(resample_op, mesh, &progress) {
            Ok(report) => println!(
                "{}: {} -> {} vertices, {} -> {} faces ({:.2?})",
                resample_op,
                report.before.0,
                report.after.0,
                report.before.2,
                report.after.2,
                start.elapsed()
            ),
            Err(e) => {
                warn!("{} skipped: {}", resample_op, e);
                eprintln!("{} skipped: {}", resample_op, e);
            }
        }
    }

    Ok(())
}

fn print_info(mesh: &HalfEdgeMesh) {
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
    println!("Euler characteristic: {}", mesh.euler_characteristic());

    let mut min_area = f64::MAX;
    let mut max_area = 0.0_f64;
    for f in mesh.face_ids() {
        let area = mesh.face_area(f);
        min_area = min_area.min(area);
        max_area = max_area.max(area);
    }
    println!("Surface area: {:.6}", mesh.surface_area());
    println!("Face area range: [{:.6}, {:.6}]", min_area, max_area);

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    println!("Average edge length: {:.6}", mesh.average_edge_length());

    if mesh.is_triangle_mesh() {
        println!("Mesh type: Triangle mesh");
    } else {
        println!("Mesh type: Polygon mesh");
    }

    match mesh.validate() {
        Ok(()) => println!("Valid: yes"),
        Err(msg) => println!("Valid: no ({})", msg),
    }
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only ever move forward
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && current < total {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, raw_percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}
