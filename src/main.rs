//! Heightfield CLI - Procedural eroded terrain generator.
//!
//! Generates square heightmaps from slope-damped OpenSimplex octaves and
//! exports them as 16-bit PNG or RAW files.

use clap::{Parser, Subcommand, ValueEnum};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Instant;

use heightfield::export::{
    expected_file_size, export_png, export_raw, PngExportOptions, RawFormat,
};
use heightfield::pipeline::{Pipeline, Terrain};
use heightfield::{NoiseKind, Normalizer, OffsetMode, TerrainConfig};

/// Grid sizes the `generate` subcommand accepts.
const SIZE_RANGE: RangeInclusive<u32> = 16..=8192;

/// Procedural eroded terrain generator.
#[derive(Parser)]
#[command(name = "heightfield")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new heightmap.
    Generate {
        /// Grid width and height in cells (e.g., 256, 512, 1024).
        #[arg(short = 'z', long, default_value = "1024")]
        size: u32,

        /// Random seed for reproducible generation.
        #[arg(short, long)]
        seed: Option<i32>,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "terrain")]
        name: String,

        /// Export format.
        #[arg(short, long, default_value = "png")]
        format: ExportFormat,

        /// Erosion strength; 0 gives plain weighted noise.
        #[arg(long, default_value = "4.0")]
        gradient_factor: f64,

        /// How octave sample offsets are chosen.
        #[arg(long, default_value = "randomized")]
        offsets: OffsetChoice,

        /// Per-axis range of randomized offsets.
        #[arg(long, default_value = "1000.0")]
        offset_spread: f64,

        /// Noise evaluator.
        #[arg(long, default_value = "simplex2")]
        noise: NoiseChoice,

        /// Depth of the slice through 3D noise (simplex3 only).
        #[arg(long, default_value = "0.0")]
        slice_depth: f64,

        /// Stretch the accumulated range onto [0, 1] instead of clamping.
        #[arg(long)]
        rescale: bool,
    },

    /// Display information about a heightmap configuration.
    Info {
        /// Grid width and height in cells.
        #[arg(short = 'z', long, default_value = "1024")]
        size: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG (universal compatibility).
    Png,
    /// 16-bit RAW little-endian (Unity).
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OffsetChoice {
    /// Use the preset's stored offsets (all zero for the erosion preset).
    Explicit,
    /// Sample every octave from the origin.
    Zeroed,
    /// Seeded random offset per octave.
    Randomized,
}

#[derive(Clone, Copy, ValueEnum)]
enum NoiseChoice {
    /// Planar OpenSimplex noise.
    Simplex2,
    /// Slice through 3D OpenSimplex noise.
    Simplex3,
}

/// Options for the `generate` subcommand.
struct GenerateArgs {
    size: u32,
    seed: Option<i32>,
    output: PathBuf,
    name: String,
    format: ExportFormat,
    gradient_factor: f64,
    offsets: OffsetChoice,
    offset_spread: f64,
    noise: NoiseChoice,
    slice_depth: f64,
    rescale: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            size,
            seed,
            output,
            name,
            format,
            gradient_factor,
            offsets,
            offset_spread,
            noise,
            slice_depth,
            rescale,
        } => {
            run_generate(GenerateArgs {
                size,
                seed,
                output,
                name,
                format,
                gradient_factor,
                offsets,
                offset_spread,
                noise,
                slice_depth,
                rescale,
            });
        }
        Commands::Info { size } => {
            run_info(size);
        }
    }
}

fn run_generate(args: GenerateArgs) {
    if !size_supported(args.size) {
        eprintln!(
            "Error: Size must be between {} and {}",
            SIZE_RANGE.start(),
            SIZE_RANGE.end()
        );
        std::process::exit(1);
    }

    // Generate seed if not provided
    let seed = args.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i32)
            .unwrap_or(0)
    });

    println!("Heightfield - Procedural Terrain Generator");
    println!("==========================================");
    println!("Size: {}x{}", args.size, args.size);
    println!("Seed: {}", seed);
    println!("Output: {}", args.output.display());

    let mut config = TerrainConfig::erosion(seed, args.size);
    config.gradient_factor = args.gradient_factor;
    config.offsets = match args.offsets {
        OffsetChoice::Explicit => OffsetMode::Explicit,
        OffsetChoice::Zeroed => OffsetMode::Zeroed,
        OffsetChoice::Randomized => OffsetMode::Randomized { spread: args.offset_spread },
    };
    config.noise = match args.noise {
        NoiseChoice::Simplex2 => NoiseKind::Simplex2,
        NoiseChoice::Simplex3 => NoiseKind::Simplex3Slice { z: args.slice_depth },
    };
    if args.rescale {
        config.normalizer = Normalizer::rescale();
    }

    println!(
        "Octaves: {}, gradient factor: {}, noise: {}",
        config.octaves.len(),
        config.gradient_factor,
        config.noise.name()
    );

    let start = Instant::now();

    println!("\nRunning generation pipeline...");
    let mut terrain = Terrain::new(&config);
    let pipeline = Pipeline::standard(config);
    if let Err(e) = pipeline.run_with_callbacks(
        &mut terrain,
        |name, i, total| {
            println!("  [{}/{}] Starting: {}", i + 1, total, name);
        },
        |name, i, total| {
            println!("  [{}/{}] Completed: {}", i + 1, total, name);
        },
    ) {
        eprintln!("Error during generation: {}", e);
        std::process::exit(1);
    }

    let gen_time = start.elapsed();
    println!("Generation completed in {:.2?}", gen_time);

    if let Some((min_h, max_h)) = terrain.raw_range {
        println!("Accumulated range: [{:.4}, {:.4}]", min_h, max_h);
    }

    let Some(field) = terrain.into_field() else {
        eprintln!("Error during generation: no heightfield produced");
        std::process::exit(1);
    };

    println!("\nExporting heightmap...");
    if let Err(e) = std::fs::create_dir_all(&args.output) {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    }

    let name = &args.name;
    match args.format {
        ExportFormat::Png => {
            let path = args.output.join(format!("{}.png", name));
            if let Err(e) = export_png(&field, &path, &PngExportOptions::default()) {
                eprintln!("Error exporting PNG: {}", e);
                std::process::exit(1);
            }
            println!("  Exported PNG: {}", path.display());
        }
        ExportFormat::Raw => {
            let path = args.output.join(format!("{}.raw", name));
            if let Err(e) = export_raw(&field, &path, RawFormat::R16LittleEndian, 0.0, 1.0) {
                eprintln!("Error exporting RAW: {}", e);
                std::process::exit(1);
            }
            println!("  Exported RAW (R16): {}", path.display());
        }
        ExportFormat::RawFloat => {
            let path = args.output.join(format!("{}.raw", name));
            if let Err(e) = export_raw(&field, &path, RawFormat::R32Float, 0.0, 1.0) {
                eprintln!("Error exporting RAW: {}", e);
                std::process::exit(1);
            }
            println!("  Exported RAW (R32 float): {}", path.display());
        }
    }

    let total_time = start.elapsed();
    println!("\nTotal time: {:.2?}", total_time);
}

fn run_info(size: u32) {
    let cells = (size as u64) * (size as u64);

    // Two f32 accumulation buffers are live during generation.
    let bytes_buffers = cells * 4 * 2;
    let bytes_field = cells * 4;
    let bytes_png = cells * 2;
    let bytes_raw_r16 = expected_file_size(size, RawFormat::R16LittleEndian);
    let bytes_raw_r32 = expected_file_size(size, RawFormat::R32Float);

    println!("Heightfield - Configuration Info");
    println!("================================");
    println!();
    println!("Size: {}x{}", size, size);
    println!("Cells: {:>12}", cells);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Accumulation buffers: {:>12} bytes ({:.2} MB)", bytes_buffers, mb(bytes_buffers));
    println!("  Final heightfield:    {:>12} bytes ({:.2} MB)", bytes_field, mb(bytes_field));
    println!();
    println!("Export file sizes:");
    println!("  PNG (16-bit, uncompressed): {:>10} bytes ({:.2} MB)", bytes_png, mb(bytes_png));
    println!("  RAW (R16):                  {:>10} bytes ({:.2} MB)", bytes_raw_r16, mb(bytes_raw_r16));
    println!("  RAW (R32):                  {:>10} bytes ({:.2} MB)", bytes_raw_r32, mb(bytes_raw_r32));
    println!();

    if !size_supported(size) {
        println!(
            "Note: generate accepts sizes {} to {}",
            SIZE_RANGE.start(),
            SIZE_RANGE.end()
        );
    }
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Whether `generate` accepts this grid size.
fn size_supported(size: u32) -> bool {
    SIZE_RANGE.contains(&size)
}
