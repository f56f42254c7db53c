//! demterrain CLI - terrain preparation from packed-float DEM images.
//!
//! Decode a packed heightfield, normalize it for a terrain engine and
//! generate the matching normal map.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use demterrain::decode::{load_packed, ByteOrder};
use demterrain::export::{
    export_packed_png, export_terrain, load_grayscale_png, HeightfieldFormat,
    PngExportOptions, RawFormat,
};
use demterrain::pipeline::{Pipeline, StageConfig, TerrainJob};
use demterrain::terrain::{is_valid_terrain_size, FlatPolicy, PixelSpacing, TerrainConfig};

/// Terrain preparation from packed-float DEM images.
#[derive(Parser)]
#[command(name = "demterrain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a normalized heightfield, normal map and descriptor from a packed DEM.
    Build {
        /// Packed-float RGBA image to decode.
        #[arg(short, long)]
        input: PathBuf,

        /// Sample spacing along the first grid axis (rows).
        #[arg(long, default_value = "2.5")]
        xres: f32,

        /// Sample spacing along the second grid axis (columns).
        #[arg(long, default_value = "2.5")]
        yres: f32,

        /// Byte order of the packed channels.
        #[arg(long, default_value = "big")]
        byte_order: ByteOrderArg,

        /// Handling of perfectly flat heightfields.
        #[arg(long, default_value = "zero")]
        flat_policy: FlatPolicyArg,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "terrain")]
        name: String,

        /// Heightfield export format.
        #[arg(short, long, default_value = "png")]
        format: ExportFormat,

        /// Base color texture recorded in the terrain descriptor.
        #[arg(long)]
        base_texture: Option<String>,

        /// Detail map resolution.
        #[arg(long, default_value = "128")]
        detail_resolution: u32,

        /// Detail patch resolution.
        #[arg(long, default_value = "8")]
        resolution_per_patch: u32,

        /// Skip normal map generation.
        #[arg(long)]
        skip_normal_map: bool,
    },

    /// Pack a 16-bit grayscale heightmap into a packed-float RGBA image.
    Pack {
        /// Grayscale PNG to read.
        #[arg(short, long)]
        input: PathBuf,

        /// Output packed PNG path.
        #[arg(short, long)]
        output: PathBuf,

        /// Elevation mapped to black.
        #[arg(long, default_value = "0.0")]
        min: f32,

        /// Elevation mapped to white.
        #[arg(long, default_value = "1000.0")]
        max: f32,

        /// Byte order of the packed channels.
        #[arg(long, default_value = "big")]
        byte_order: ByteOrderArg,
    },

    /// Display information about a heightfield side length.
    Info {
        /// Heightfield side length in samples.
        #[arg(short, long, default_value = "513")]
        resolution: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ByteOrderArg {
    /// Alpha holds the most significant byte.
    Big,
    /// Alpha holds the least significant byte.
    Little,
}

impl From<ByteOrderArg> for ByteOrder {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Big => ByteOrder::BigEndian,
            ByteOrderArg::Little => ByteOrder::LittleEndian,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FlatPolicyArg {
    /// Flat heightfields normalize to zero.
    Zero,
    /// Flat heightfields are an error.
    Reject,
}

impl From<FlatPolicyArg> for FlatPolicy {
    fn from(arg: FlatPolicyArg) -> Self {
        match arg {
            FlatPolicyArg::Zero => FlatPolicy::Zero,
            FlatPolicyArg::Reject => FlatPolicy::Reject,
        }
    }
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

impl From<ExportFormat> for HeightfieldFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Png => HeightfieldFormat::Png,
            ExportFormat::Raw => HeightfieldFormat::Raw(RawFormat::R16LittleEndian),
            ExportFormat::RawFloat => HeightfieldFormat::Raw(RawFormat::R32Float),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            xres,
            yres,
            byte_order,
            flat_policy,
            output,
            name,
            format,
            base_texture,
            detail_resolution,
            resolution_per_patch,
            skip_normal_map,
        } => {
            let config = TerrainConfig {
                spacing: PixelSpacing { xres, yres },
                byte_order: byte_order.into(),
                flat_policy: flat_policy.into(),
                detail_resolution,
                resolution_per_patch,
            };
            run_build(input, config, output, name, format, base_texture, skip_normal_map);
        }
        Commands::Pack {
            input,
            output,
            min,
            max,
            byte_order,
        } => {
            run_pack(input, output, min, max, byte_order.into());
        }
        Commands::Info { resolution } => {
            run_info(resolution);
        }
    }
}

fn run_build(
    input: PathBuf,
    config: TerrainConfig,
    output: PathBuf,
    name: String,
    format: ExportFormat,
    base_texture: Option<String>,
    skip_normal_map: bool,
) {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!("demterrain - Terrain Build");
    println!("==========================");
    println!("Input: {}", input.display());
    println!("Spacing: {} x {}", config.spacing.xres, config.spacing.yres);
    println!("Output: {}", output.display());

    let start = Instant::now();

    println!("\nDecoding heightfield...");
    let raw = load_packed(&input, config.byte_order).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    println!("  Decoded {}x{} samples", raw.nx(), raw.ny());

    println!("Running build pipeline...");
    let mut stage_config = StageConfig::new(config);
    if let Some(texture) = base_texture {
        stage_config = stage_config.with_base_texture(texture);
    }
    let pipeline = Pipeline::standard(stage_config, !skip_normal_map);

    let mut job = TerrainJob::new(raw);
    pipeline
        .run_with_callbacks(
            &mut job,
            |name, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, name);
            },
            |name, i, total| {
                println!("  [{}/{}] Completed: {}", i + 1, total, name);
            },
        )
        .unwrap_or_else(|e| {
            eprintln!("Error during build: {}", e);
            std::process::exit(1);
        });

    let Some(terrain) = job.into_terrain() else {
        eprintln!("Error during build: no terrain was assembled");
        std::process::exit(1);
    };

    println!("Build completed in {:.2?}", start.elapsed());
    println!("Height range: [{:.4}, {:.4}]", terrain.stats.min, terrain.stats.max);
    println!(
        "Terrain size: {:.2} x {:.2} x {:.2}",
        terrain.size.x, terrain.size.y, terrain.size.z
    );

    println!("\nExporting terrain...");
    let export_start = Instant::now();
    let files = export_terrain(
        &terrain,
        &output,
        &name,
        format.into(),
        &PngExportOptions::default(),
    )
    .unwrap_or_else(|e| {
        eprintln!("Error exporting terrain: {}", e);
        std::process::exit(1);
    });

    println!("  Heightfield: {}", files.heightfield.display());
    if let Some(normal) = &files.normal_map {
        println!("  Normal map:  {}", normal.display());
    }
    println!("  Descriptor:  {}", files.descriptor.display());

    println!("Export completed in {:.2?}", export_start.elapsed());
    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_pack(input: PathBuf, output: PathBuf, min: f32, max: f32, order: ByteOrder) {
    if !(min < max) {
        eprintln!("Error: --min ({}) must be below --max ({})", min, max);
        std::process::exit(1);
    }

    let grid = load_grayscale_png(&input, min, max).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", input.display(), e);
        std::process::exit(1);
    });

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| {
            eprintln!("Error creating output directory: {}", e);
            std::process::exit(1);
        });
    }

    export_packed_png(&grid, order, &output, &PngExportOptions::default()).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {}", output.display(), e);
        std::process::exit(1);
    });

    println!(
        "Packed {}x{} samples in [{}, {}] into {}",
        grid.nx(),
        grid.ny(),
        min,
        max,
        output.display()
    );
}

fn run_info(resolution: u32) {
    let n = resolution as u64;
    let samples = n * n;
    let normal_side = n.saturating_sub(1);

    let bytes_heights = samples * 4; // f32
    let bytes_normals = samples * 4 * 3; // three f32 grids
    let bytes_packed = samples * 4;
    let bytes_png = samples * 2;
    let bytes_raw_r16 = samples * 2;
    let bytes_raw_r32 = samples * 4;
    let bytes_normal_png = normal_side * normal_side * 3;

    let mb = |b: u64| b as f64 / 1024.0 / 1024.0;

    println!("demterrain - Heightfield Info");
    println!("=============================");
    println!();
    println!("Resolution: {}x{}", resolution, resolution);
    println!("Samples:    {:>12}", samples);
    println!("Normal map: {}x{}", normal_side, normal_side);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Heights:        {:>12} bytes ({:.2} MB)", bytes_heights, mb(bytes_heights));
    println!("  Normal field:   {:>12} bytes ({:.2} MB)", bytes_normals, mb(bytes_normals));
    println!();
    println!("File sizes (uncompressed):");
    println!("  Packed input:   {:>12} bytes ({:.2} MB)", bytes_packed, mb(bytes_packed));
    println!("  PNG (16-bit):   {:>12} bytes ({:.2} MB)", bytes_png, mb(bytes_png));
    println!("  RAW (R16):      {:>12} bytes ({:.2} MB)", bytes_raw_r16, mb(bytes_raw_r16));
    println!("  RAW (R32):      {:>12} bytes ({:.2} MB)", bytes_raw_r32, mb(bytes_raw_r32));
    println!("  Normal PNG:     {:>12} bytes ({:.2} MB)", bytes_normal_png, mb(bytes_normal_png));
    println!();

    if is_valid_terrain_size(resolution as usize) {
        println!("Terrain size: OK (power of 2 + 1)");
    } else {
        println!("Terrain size: INVALID (must be a power of 2 + 1)");
        let suggested = resolution
            .saturating_sub(1)
            .max(2)
            .checked_next_power_of_two()
            .and_then(|p| p.checked_add(1));
        if let Some(suggested) = suggested {
            println!("  Nearest valid resolution at or above: {}", suggested);
        }
    }
}
