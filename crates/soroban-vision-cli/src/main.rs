//! Command-line front end for the soroban extraction pipeline.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{info, warn, LevelFilter};
use serde::Serialize;
use thiserror::Error;

use soroban_vision_core::init_with_level;

use soroban_vision::{
    draw_debug_overlay, load_color_image, load_json, save_color_image, save_json_pretty,
    DetectionParams, ExtractionResult, FrameDetectionResult, ImagePreprocessor, LaneInfo,
    PreprocessingConfig, SorobanVision, VisionError, VisionIoError,
};

#[derive(Parser)]
#[command(name = "soroban-vision")]
#[command(about = "Detect a soroban frame in an image and extract bead-cell tensors")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the frame in an image and extract the cell tensor.
    Detect(DetectArgs),

    /// Print the default configuration as JSON.
    ///
    /// The `config` object is accepted by `detect --config`, the `params`
    /// object by `detect --params`.
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the extraction report (JSON). Printed to stdout when
    /// omitted.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Path to write a debug overlay image (frame outline, lane ticks).
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Path to a PreprocessingConfig JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a DetectionParams JSON file.
    #[arg(long)]
    params: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Io(#[from] VisionIoError),
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat report written for each `detect` run.
#[derive(Debug, Serialize)]
struct DetectReport {
    success: bool,
    error: Option<String>,
    frame: FrameDetectionResult,
    lanes: Vec<LaneInfo>,
    total_cells: i32,
    tensor_shape: Option<[usize; 4]>,
    elapsed_ms: f64,
}

impl DetectReport {
    fn from_result(result: &ExtractionResult) -> Self {
        Self {
            success: result.success,
            error: result.error.as_ref().map(|e| e.to_string()),
            frame: result.frame.clone(),
            lanes: result.lanes.clone(),
            total_cells: result.total_cells,
            tensor_shape: result
                .tensor
                .as_ref()
                .map(|t| [t.batch, t.channels, t.height, t.width]),
            elapsed_ms: result.elapsed_ms,
        }
    }
}

#[derive(Debug, Serialize)]
struct DefaultConfigDoc {
    config: PreprocessingConfig,
    params: DetectionParams,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = init_with_level(level) {
        eprintln!("error: failed to install logger: {e}");
        return ExitCode::from(2);
    }

    let outcome = match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::DefaultConfig => run_default_config(),
    };
    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run_default_config() -> Result<ExitCode, CliError> {
    let doc = DefaultConfigDoc {
        config: PreprocessingConfig::default(),
        params: DetectionParams::default(),
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(ExitCode::SUCCESS)
}

fn run_detect(args: &DetectArgs) -> Result<ExitCode, CliError> {
    let config: PreprocessingConfig = match &args.config {
        Some(path) => load_json(path)?,
        None => PreprocessingConfig::default(),
    };
    let params: DetectionParams = match &args.params {
        Some(path) => load_json(path)?,
        None => DetectionParams::default(),
    };

    let image = load_color_image(&args.image)?;
    info!(
        "loaded {} ({}x{})",
        args.image.display(),
        image.width,
        image.height
    );

    // Resize up front so the report coordinates and the overlay share the
    // processing scale.
    let preprocessor = ImagePreprocessor::new(config.clone());
    let resized = preprocessor.resize_to_long_edge(&image.view());
    let mut vision = SorobanVision::new(config, params);
    let result = vision.process_image(&resized.view());

    if result.success {
        info!(
            "{} lanes, {} cells in {:.1} ms",
            result.frame.lane_count, result.total_cells, result.elapsed_ms
        );
    } else {
        let reason = result
            .error
            .as_ref()
            .map_or_else(|| "unknown".to_string(), |e| e.to_string());
        warn!("extraction failed: {reason}");
    }

    let report = DetectReport::from_result(&result);
    match &args.report {
        Some(path) => {
            save_json_pretty(&report, path)?;
            info!("report written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &args.overlay {
        let overlay = draw_debug_overlay(&resized.view(), &result);
        save_color_image(&overlay.view(), path)?;
        info!("overlay written to {}", path.display());
    }

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
