// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::config::{NudityConfig, DEFAULT_INFERENCE_RESOLUTION, DEFAULT_NUDENET_MODEL_PATH};
use crate::nsfw_check::{check_files, CheckReport};
use crate::vision::nudity::NudeDetector;

/// Exit status used when the check itself could not run
pub const EXIT_ERROR: u8 = 2;

/// Screen images for nudity; exit status 1 if any image fails
#[derive(Parser, Debug)]
#[command(name = "nsfw-detect")]
#[command(version)]
#[command(
    about = "Exit 1 if any image scores at or above the nudity threshold, else 0",
    long_about = None
)]
pub struct NsfwArgs {
    /// Image files to check
    pub files: Vec<PathBuf>,

    /// Path to the NudeNet ONNX model
    #[arg(long, env = "NUDENET_MODEL_PATH", default_value = DEFAULT_NUDENET_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Square input resolution the model was exported with
    #[arg(
        long,
        env = "NUDENET_RESOLUTION",
        default_value_t = DEFAULT_INFERENCE_RESOLUTION,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub resolution: u32,
}

impl NsfwArgs {
    pub fn config(&self) -> NudityConfig {
        NudityConfig {
            model_path: self.model_path.clone(),
            inference_resolution: self.resolution,
        }
    }
}

/// Load the detector and score all files given on the command line
///
/// With no files there is nothing to score and the model is not loaded.
pub fn run(args: NsfwArgs) -> Result<CheckReport> {
    if args.files.is_empty() {
        return Ok(CheckReport::default());
    }

    let detector = NudeDetector::new(&args.config())?;

    let report = check_files(&detector, &args.files)?;
    info!(
        "Checked {} files, {} flagged",
        report.files.len(),
        report.flagged().count()
    );

    Ok(report)
}

/// Process exit status for the outcome of `run`
pub fn exit_status(outcome: &Result<CheckReport>) -> u8 {
    match outcome {
        Ok(report) => report.exit_code(),
        Err(_) => EXIT_ERROR,
    }
}
