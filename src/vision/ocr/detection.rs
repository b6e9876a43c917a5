// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Detects text regions in a preprocessed image and returns bounding boxes
//! in the 640x640 detection space.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, Array4, ArrayViewD, Axis};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Connected regions smaller than this many map pixels are treated as noise
pub const MIN_REGION_PIXELS: usize = 10;

/// Expansion applied to each region; the model predicts shrunk text kernels
pub const UNCLIP_RATIO: f32 = 1.5;

/// A detected text box with location and confidence
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// X coordinate of top-left corner (in preprocessed image space)
    pub x: f32,
    /// Y coordinate of top-left corner (in preprocessed image space)
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean probability over the region's pixels
    pub confidence: f32,
}

impl TextBox {
    /// Check if this text box is valid (reasonable dimensions)
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.confidence > 0.0
    }

    /// Grow the box on every side by `area * ratio / perimeter`, clamped to
    /// `[0, max_width] x [0, max_height]`
    pub fn unclip(&self, ratio: f32, max_width: f32, max_height: f32) -> TextBox {
        let perimeter = 2.0 * (self.width + self.height);
        if perimeter <= f32::EPSILON {
            return self.clone();
        }
        let delta = self.width * self.height * ratio / perimeter;

        let left = (self.x - delta).max(0.0);
        let top = (self.y - delta).max(0.0);
        let right = (self.x + self.width + delta).min(max_width);
        let bottom = (self.y + self.height + delta).min(max_height);

        TextBox {
            x: left,
            y: top,
            width: (right - left).max(0.0),
            height: (bottom - top).max(0.0),
            confidence: self.confidence,
        }
    }
}

/// PaddleOCR text detection model (PP-OCR det, CPU-only)
pub struct OcrDetectionModel {
    /// `Session::run` needs `&mut`, inference goes through the lock
    session: Mutex<Session>,
    input_name: String,
    confidence_threshold: f32,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .field("confidence_threshold", &self.confidence_threshold)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the OCR detection model from a file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load OCR detection model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Detection model loaded - input: {}", input_name);

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            confidence_threshold: 0.3,
        })
    }

    /// Set the confidence threshold for detections
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Run text detection on a preprocessed `[1, 3, H, W]` tensor
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        let (input_height, input_width) = (shape[2], shape[3]);

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Detection session lock poisoned: {}", e))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("Detection output shape: {:?}", output_tensor.shape());

        let prob_map = probability_map(output_tensor.view())?;
        let (map_height, map_width) = (prob_map.nrows() as f32, prob_map.ncols() as f32);
        let scale_y = input_height as f32 / map_height;
        let scale_x = input_width as f32 / map_width;

        let text_boxes: Vec<TextBox> =
            extract_regions(&prob_map, self.confidence_threshold, MIN_REGION_PIXELS)
                .into_iter()
                .map(|b| b.unclip(UNCLIP_RATIO, map_width, map_height))
                .map(|b| TextBox {
                    x: b.x * scale_x,
                    y: b.y * scale_y,
                    width: b.width * scale_x,
                    height: b.height * scale_y,
                    confidence: b.confidence,
                })
                .collect();

        debug!("Detected {} text regions", text_boxes.len());

        Ok(text_boxes)
    }
}

/// Reduce a `[1, 1, H, W]` or `[1, H, W]` detection output to an `H x W` map
pub fn probability_map(output: ArrayViewD<f32>) -> Result<Array2<f32>> {
    let shape = output.shape().to_vec();
    let mut view = output;
    while view.ndim() > 2 {
        if view.shape()[0] != 1 {
            anyhow::bail!("Unexpected output shape: {:?}", shape);
        }
        view = view.index_axis_move(Axis(0), 0);
    }

    view.into_dimensionality::<ndarray::Ix2>()
        .map(|v| v.to_owned())
        .map_err(|_| anyhow!("Unexpected output shape: {:?}", shape))
}

/// Group above-threshold pixels into 4-connected regions
///
/// Returns boxes in map coordinates, sorted top-to-bottom then left-to-right.
pub fn extract_regions(prob_map: &Array2<f32>, threshold: f32, min_pixels: usize) -> Vec<TextBox> {
    let (height, width) = prob_map.dim();
    let mut visited = Array2::from_elem((height, width), false);
    let mut boxes = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[[y, x]] || prob_map[[y, x]] < threshold {
                continue;
            }

            let mut stack = vec![(x, y)];
            visited[[y, x]] = true;
            let (mut min_x, mut max_x, mut min_y, mut max_y) = (x, x, y, y);
            let mut count = 0usize;
            let mut sum_conf = 0.0f32;

            while let Some((cx, cy)) = stack.pop() {
                count += 1;
                sum_conf += prob_map[[cy, cx]];
                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);

                let neighbors = [
                    (cx.wrapping_sub(1), cy),
                    (cx + 1, cy),
                    (cx, cy.wrapping_sub(1)),
                    (cx, cy + 1),
                ];
                for (nx, ny) in neighbors {
                    if nx < width
                        && ny < height
                        && !visited[[ny, nx]]
                        && prob_map[[ny, nx]] >= threshold
                    {
                        visited[[ny, nx]] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if count > min_pixels {
                boxes.push(TextBox {
                    x: min_x as f32,
                    y: min_y as f32,
                    width: (max_x - min_x + 1) as f32,
                    height: (max_y - min_y + 1) as f32,
                    confidence: sum_conf / count as f32,
                });
            }
        }
    }

    boxes.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    boxes
}
