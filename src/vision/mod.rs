// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - OCR (Optical Character Recognition) via PaddleOCR
//! - Nudity detection via NudeNet
//!
//! Both run through ONNX Runtime on the CPU.

pub mod image_utils;
pub mod nudity;
pub mod ocr;

pub use image_utils::{
    decode_image_bytes, detect_format, load_image, ImageError, ImageInfo,
};
