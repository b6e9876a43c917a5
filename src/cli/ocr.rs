// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::config::{OcrConfig, OcrLanguage, DEFAULT_DETECTION_THRESHOLD, DEFAULT_OCR_MODEL_DIR};
use crate::ocr_cache::{run_ocr_cache, LazyEngine, OcrRunSummary};
use crate::vision::ocr::PaddleOcrModel;

/// OCR images and cache the results next to them as <image>.ocr.json
#[derive(Parser, Debug)]
#[command(name = "eocr")]
#[command(version)]
#[command(about = "OCR images and cache results as <image>.ocr.json", long_about = None)]
pub struct OcrArgs {
    /// Image files to process
    pub files: Vec<PathBuf>,

    /// Directory with det_model.onnx, rec_model.onnx and the dictionary
    #[arg(long, env = "OCR_MODEL_DIR", default_value = DEFAULT_OCR_MODEL_DIR)]
    pub model_dir: PathBuf,

    /// Recognition language
    #[arg(long, env = "OCR_LANGUAGE", default_value = "en")]
    pub lang: OcrLanguage,

    /// Text detection probability threshold (0.0-1.0)
    #[arg(long, env = "OCR_DETECTION_THRESHOLD", default_value_t = DEFAULT_DETECTION_THRESHOLD)]
    pub detection_threshold: f32,
}

impl OcrArgs {
    pub fn config(&self) -> OcrConfig {
        OcrConfig {
            model_dir: self.model_dir.clone(),
            language: self.lang,
            detection_threshold: self.detection_threshold.clamp(0.0, 1.0),
        }
    }
}

/// Run the OCR cache over all files given on the command line
///
/// Progress lines go to `out`.
pub fn run<W: Write>(args: OcrArgs, out: &mut W) -> Result<OcrRunSummary> {
    let config = args.config();
    let mut engine = LazyEngine::new(|| PaddleOcrModel::new(&config));

    let summary = run_ocr_cache(&args.files, &mut engine, out)?;
    info!(
        "OCR done: {} processed, {} cached",
        summary.processed.len(),
        summary.skipped.len()
    );

    Ok(summary)
}
