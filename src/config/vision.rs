// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_OCR_MODEL_DIR: &str = "./models/paddleocr-onnx";
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.3;
pub const DEFAULT_NUDENET_MODEL_PATH: &str = "./models/nudenet/320n.onnx";
pub const DEFAULT_INFERENCE_RESOLUTION: u32 = 320;

/// Recognition language for the OCR engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrLanguage {
    #[default]
    English,
}

impl OcrLanguage {
    /// Language code as accepted on the command line
    pub fn code(&self) -> &'static str {
        match self {
            OcrLanguage::English => "en",
        }
    }

    /// Character dictionary shipped next to the recognition model
    pub fn dictionary_file(&self) -> &'static str {
        match self {
            OcrLanguage::English => "en_dict.txt",
        }
    }
}

impl FromStr for OcrLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(OcrLanguage::English),
            other => Err(anyhow!("Unsupported OCR language: {}", other)),
        }
    }
}

impl fmt::Display for OcrLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Configuration for the PaddleOCR engine
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    /// Directory holding det_model.onnx, rec_model.onnx and the dictionary
    pub model_dir: PathBuf,
    /// Recognition language
    pub language: OcrLanguage,
    /// Probability threshold for the text detection map (0.0-1.0)
    pub detection_threshold: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_OCR_MODEL_DIR),
            language: OcrLanguage::default(),
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
        }
    }
}

impl OcrConfig {
    pub fn detection_model_path(&self) -> PathBuf {
        self.model_dir.join("det_model.onnx")
    }

    pub fn recognition_model_path(&self) -> PathBuf {
        self.model_dir.join("rec_model.onnx")
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.model_dir.join(self.language.dictionary_file())
    }
}

/// Configuration for the NudeNet detector
#[derive(Debug, Clone, PartialEq)]
pub struct NudityConfig {
    /// Path to the NudeNet ONNX export
    pub model_path: PathBuf,
    /// Square input size the model was exported with (320 or 640)
    pub inference_resolution: u32,
}

impl Default for NudityConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_NUDENET_MODEL_PATH),
            inference_resolution: DEFAULT_INFERENCE_RESOLUTION,
        }
    }
}
