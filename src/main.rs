//! heightsim CLI - frame-based terrain erosion simulator.
//!
//! Validates and runs JSON pipeline descriptions, writing frame 0 and every
//! simulated frame as heightmap files.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use heightsim::config::decode_pipeline;
use heightsim::export::{
    export_frame_png, export_frame_raw, PngExportOptions, RawExportOptions, RawFormat,
};
use heightsim::pipeline::{validate, FnSink, Simulation, SimulationError};
use heightsim::terrain::Grid;

/// Frame-based terrain erosion simulator.
#[derive(Parser)]
#[command(name = "heightsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a pipeline's frame coverage and print the result as JSON.
    Validate {
        /// Pipeline description (JSON).
        config: PathBuf,
    },

    /// Run a pipeline and export its frames.
    Run {
        /// Pipeline description (JSON).
        config: PathBuf,

        /// Grid width in cells.
        #[arg(long, default_value = "256")]
        width: u32,

        /// Grid height in cells.
        #[arg(long, default_value = "256")]
        height: u32,

        /// Output directory for frame files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for frame files.
        #[arg(short, long, default_value = "frame")]
        name: String,

        /// Export format.
        #[arg(short, long, default_value = "png")]
        format: ExportFormat,

        /// Export every Nth frame (frame 0 and the last frame are always written).
        #[arg(long, default_value = "1")]
        every: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Png,
    Raw,
    RawFloat,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => run_validate(&config),
        Commands::Run {
            config,
            width,
            height,
            output,
            name,
            format,
            every,
        } => run_simulation(&config, width, height, &output, &name, format, every),
    }
}

fn read_config(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn run_validate(path: &Path) {
    let config = match decode_pipeline(&read_config(path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = validate(config.total_frames(), config.jobs());
    match result.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing result: {}", e);
            std::process::exit(1);
        }
    }
    if !result.is_valid {
        std::process::exit(2);
    }
}

fn run_simulation(
    path: &Path,
    width: u32,
    height: u32,
    output: &Path,
    name: &str,
    format: ExportFormat,
    every: u32,
) {
    if width < 4 || height < 4 || width > 16384 || height > 16384 {
        eprintln!("Error: Grid dimensions must be between 4 and 16384");
        std::process::exit(1);
    }
    let every = every.max(1) as i32;

    let simulation = match Simulation::from_json(&read_config(path)) {
        Ok(simulation) => simulation,
        Err(SimulationError::NotExecutable(result)) => {
            eprintln!("Error: pipeline is not executable");
            for error in &result.errors {
                eprintln!("  {}", error);
            }
            if !result.uncovered_frames.is_empty() {
                eprintln!("  uncovered frames: {:?}", result.uncovered_frames);
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let config = simulation.config();

    println!("heightsim - Terrain Erosion Simulator");
    println!("=====================================");
    println!("Grid: {}x{}", width, height);
    println!("Frames: {} ({} jobs)", config.total_frames(), config.jobs().len());
    println!("Initial terrain: {}", config.step0().method);
    println!("Output: {}", output.display());

    let start = Instant::now();
    let last_frame = config.total_frames();
    let mut exported = 0u32;
    let mut export_error: Option<String> = None;
    let mut range: Option<(f32, f32)> = None;

    let mut sink = FnSink(|frame: i32, grid: &Grid| {
        if export_error.is_some() || (frame % every != 0 && frame != last_frame) {
            return;
        }
        // Every frame shares frame 0's normalization so exported frames compare directly.
        let (min_height, max_height) = *range.get_or_insert_with(|| {
            let options = PngExportOptions::auto_range(grid);
            (options.min_height, options.max_height)
        });
        let result = match format {
            ExportFormat::Png => {
                let options = PngExportOptions {
                    min_height,
                    max_height,
                    ..Default::default()
                };
                export_frame_png(grid, frame, output, name, &options).map_err(|e| e.to_string())
            }
            ExportFormat::Raw | ExportFormat::RawFloat => {
                let format = match format {
                    ExportFormat::RawFloat => RawFormat::R32Float,
                    _ => RawFormat::R16LittleEndian,
                };
                let options = RawExportOptions {
                    format,
                    min_height,
                    max_height,
                };
                export_frame_raw(grid, frame, output, name, &options).map_err(|e| e.to_string())
            }
        };
        match result {
            Ok(()) => {
                exported += 1;
                println!("  [{}/{}] Exported frame {}", frame, last_frame, frame);
            }
            Err(e) => export_error = Some(format!("frame {}: {}", frame, e)),
        }
    });

    let (grid, report) = match simulation.run(width, height, &mut sink) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    drop(sink);

    if let Some(e) = export_error {
        eprintln!("Error exporting {}", e);
        std::process::exit(1);
    }

    println!("Simulation completed in {:.2?}", start.elapsed());
    println!(
        "Particles: {} ({} left grid, {} stalled, {} evaporated, {} expired)",
        report.erosion.particles,
        report.erosion.left_grid,
        report.erosion.stalled,
        report.erosion.evaporated,
        report.erosion.expired
    );
    println!(
        "Material eroded: {:.4}, deposited: {:.4}",
        report.erosion.eroded, report.erosion.deposited
    );
    let (min_h, max_h) = grid.height_range();
    println!("Final height range: [{:.4}, {:.4}]", min_h, max_h);
    println!("Exported {} frame files to {}", exported, output.display());
}
