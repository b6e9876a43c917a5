// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR pipeline combining text detection and recognition

use anyhow::{Context, Result};
use image::DynamicImage;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::detection::OcrDetectionModel;
use super::preprocessing::{crop_region, preprocess_for_detection, preprocess_for_recognition};
use super::recognition::OcrRecognitionModel;
use crate::config::OcrConfig;
use crate::ocr_cache::OcrEngine;
use crate::vision::image_utils::load_image;

/// Axis-aligned box in original image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Four corners clockwise from top-left
    pub fn corners(&self) -> [[i32; 2]; 4] {
        let left = self.x as i32;
        let top = self.y as i32;
        let right = (self.x + self.width) as i32;
        let bottom = (self.y + self.height) as i32;
        [[left, top], [right, top], [right, bottom], [left, bottom]]
    }
}

/// One recognized text region
///
/// Serialized as the positional triple `[polygon, text, confidence]`, e.g.
/// `[[[10,20],[110,20],[110,50],[10,50]],"Hello",0.93]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrDetection {
    /// Region corners clockwise from top-left, in original image pixels
    pub polygon: [[i32; 2]; 4],
    /// Recognized text
    pub text: String,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f32,
}

impl OcrDetection {
    pub fn new(polygon: [[i32; 2]; 4], text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }
}

impl Serialize for OcrDetection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.polygon, &self.text, self.confidence).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OcrDetection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (polygon, text, confidence) =
            <([[i32; 2]; 4], String, f32)>::deserialize(deserializer)?;
        Ok(Self {
            polygon,
            text,
            confidence,
        })
    }
}

/// PaddleOCR model for text extraction
///
/// Combines text detection and recognition models for end-to-end OCR.
/// Runs on CPU only.
#[derive(Debug)]
pub struct PaddleOcrModel {
    detection: OcrDetectionModel,
    recognition: OcrRecognitionModel,
}

impl PaddleOcrModel {
    /// Load PaddleOCR models from the configured directory
    ///
    /// Expected files:
    /// - det_model.onnx (text detection)
    /// - rec_model.onnx (text recognition)
    /// - the language dictionary (en_dict.txt)
    pub fn new(config: &OcrConfig) -> Result<Self> {
        info!(
            "Loading PaddleOCR models from {} (language: {})",
            config.model_dir.display(),
            config.language
        );

        let detection = OcrDetectionModel::new(config.detection_model_path())?
            .with_confidence_threshold(config.detection_threshold);
        let recognition =
            OcrRecognitionModel::new(config.recognition_model_path(), config.dictionary_path())?;

        Ok(Self {
            detection,
            recognition,
        })
    }

    /// Run detection and recognition over a decoded image
    ///
    /// Regions whose recognized text is empty are dropped.
    pub fn process(&self, image: &DynamicImage) -> Result<Vec<OcrDetection>> {
        let (tensor, info) = preprocess_for_detection(image);
        let text_boxes = self.detection.detect(&tensor)?;

        let mut detections = Vec::with_capacity(text_boxes.len());
        for text_box in text_boxes.iter().filter(|b| b.is_valid()) {
            let Some(region) =
                info.map_box(text_box.x, text_box.y, text_box.width, text_box.height)
            else {
                continue;
            };

            let crop = crop_region(image, &region);
            let recognized = self
                .recognition
                .recognize(&preprocess_for_recognition(&crop))?;

            if recognized.is_empty() {
                continue;
            }

            detections.push(OcrDetection::new(
                region.corners(),
                recognized.text,
                recognized.confidence,
            ));
        }

        debug!(
            "Recognized {} of {} detected regions",
            detections.len(),
            text_boxes.len()
        );

        Ok(detections)
    }

    /// Load an image file and extract its text regions
    pub fn readtext<P: AsRef<Path>>(&self, path: P) -> Result<Vec<OcrDetection>> {
        let path = path.as_ref();
        let (image, image_info) = load_image(path)
            .with_context(|| format!("Failed to load image {}", path.display()))?;

        debug!(
            "Decoded {}: {}x{}, {} bytes",
            path.display(),
            image_info.width,
            image_info.height,
            image_info.size_bytes
        );

        self.process(&image)
    }
}

impl OcrEngine for PaddleOcrModel {
    fn readtext(&self, path: &Path) -> Result<Vec<OcrDetection>> {
        PaddleOcrModel::readtext(self, path)
    }
}
