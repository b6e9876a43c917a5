// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod config;
pub mod logging;
pub mod nsfw_check;
pub mod ocr_cache;
pub mod vision;

pub use config::{NudityConfig, OcrConfig, OcrLanguage};
pub use nsfw_check::{
    aggregate_score, check_files, exceeds_threshold, is_nsfw_class, CheckReport, FileScore,
    NudityDetector, NSFW_CLASSES, NSFW_THRESHOLD,
};
pub use ocr_cache::{
    cache_path_for, run_ocr_cache, write_cache, LazyEngine, OcrEngine, OcrRunSummary,
    CACHE_SUFFIX,
};
pub use vision::nudity::{BoundingBox, Detection, Label, NudeDetector};
pub use vision::ocr::{OcrDetection, PaddleOcrModel};
