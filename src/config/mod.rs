// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model configuration for the OCR and nudity detection tools
//!
//! Every value has a built-in default. The command-line parsers in
//! `crate::cli` override it from the environment (or a `.env` file) and
//! then from flags.

pub mod vision;

pub use vision::{
    NudityConfig, OcrConfig, OcrLanguage, DEFAULT_DETECTION_THRESHOLD,
    DEFAULT_INFERENCE_RESOLUTION, DEFAULT_NUDENET_MODEL_PATH, DEFAULT_OCR_MODEL_DIR,
};
