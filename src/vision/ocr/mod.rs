// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration for text extraction from images
//!
//! Components:
//! - `detection` - Text region detection
//! - `recognition` - Text recognition from detected regions
//! - `preprocessing` - Image preprocessing for models
//! - `model` - Combined OCR pipeline

pub mod detection;
pub mod model;
pub mod preprocessing;
pub mod recognition;

pub use detection::{OcrDetectionModel, TextBox};
pub use model::{BoundingBox, OcrDetection, PaddleOcrModel};
pub use recognition::{OcrRecognitionModel, RecognizedText};
