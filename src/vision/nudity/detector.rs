// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! NudeNet ONNX detector
//!
//! Runs the YOLOv8-based NudeNet export on CPU and turns its raw
//! `[1, 4 + classes, anchors]` output into labelled detections.

use anyhow::{anyhow, Context, Result};
use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::labels::Label;
use super::preprocessing::preprocess_for_nudity;
use crate::config::NudityConfig;
use crate::nsfw_check::NudityDetector;
use crate::vision::image_utils::load_image;

/// Minimum best-class score for a candidate row
pub const CANDIDATE_THRESHOLD: f32 = 0.2;
/// Score threshold applied during non-maximum suppression
pub const NMS_SCORE_THRESHOLD: f32 = 0.25;
/// Overlap above which the lower-scored box is suppressed
pub const NMS_IOU_THRESHOLD: f32 = 0.45;

/// Detection box in original image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn area(&self) -> i64 {
        i64::from(self.width.max(0)) * i64::from(self.height.max(0))
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);

        let intersection = i64::from((right - left).max(0)) * i64::from((bottom - top).max(0));
        let union = self.area() + other.area() - intersection;
        if union <= 0 {
            return 0.0;
        }
        intersection as f32 / union as f32
    }
}

/// One detected body part
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class: Label,
    pub score: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class: Label, score: f32) -> Self {
        Self {
            class,
            score,
            bbox: BoundingBox {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            },
        }
    }
}

/// NudeNet detector (CPU-only)
pub struct NudeDetector {
    session: Mutex<Session>,
    input_name: String,
    resolution: u32,
}

impl std::fmt::Debug for NudeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NudeDetector")
            .field("input_name", &self.input_name)
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}

impl NudeDetector {
    /// Load the NudeNet model described by `config`
    pub fn new(config: &NudityConfig) -> Result<Self> {
        let model_path = config.model_path.as_path();

        if !model_path.exists() {
            anyhow::bail!("NudeNet model not found: {}", model_path.display());
        }

        info!(
            "Loading NudeNet model from {} ({}px)",
            model_path.display(),
            config.inference_resolution
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load NudeNet model from {}", model_path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            resolution: config.inference_resolution,
        })
    }

    /// Detect body parts in the image at `path`
    pub fn detect<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Detection>> {
        let path = path.as_ref();
        let (image, _) = load_image(path)
            .with_context(|| format!("Failed to load image {}", path.display()))?;

        let (tensor, resize_factor) = preprocess_for_nudity(&image, self.resolution);

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("NudeNet session lock poisoned: {}", e))?;

        let input_value = Value::from_array(tensor).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("NudeNet inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let rows = anchor_rows(output_tensor.view())?;
        let detections = post_process(rows.view(), resize_factor)?;

        debug!("{}: {} detections", path.display(), detections.len());

        Ok(detections)
    }
}

impl NudityDetector for NudeDetector {
    fn detect(&self, path: &Path) -> Result<Vec<Detection>> {
        NudeDetector::detect(self, path)
    }
}

/// Turn a `[1, 4 + classes, anchors]` output into `anchors x (4 + classes)` rows
fn anchor_rows(output: ArrayViewD<f32>) -> Result<ndarray::Array2<f32>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected NudeNet output shape: {:?}", shape);
    }

    let data = output
        .index_axis_move(Axis(0), 0)
        .into_dimensionality::<Ix2>()
        .map_err(|_| anyhow!("Unexpected NudeNet output shape: {:?}", shape))?;

    Ok(data.reversed_axes().to_owned())
}

/// Decode candidate rows, map boxes to original pixels and apply NMS
///
/// Each row is `[cx, cy, w, h, class scores...]` in model space.
pub fn post_process(rows: ArrayView2<f32>, resize_factor: f32) -> Result<Vec<Detection>> {
    let mut candidates = Vec::new();

    for row in rows.rows() {
        if row.len() <= 4 {
            anyhow::bail!("NudeNet output row has no class scores");
        }

        let (class_id, max_score) = row
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |best, (i, s)| {
                if s > best.1 {
                    (i, s)
                } else {
                    best
                }
            });

        if max_score < CANDIDATE_THRESHOLD {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        let bbox = BoundingBox {
            x: ((cx - w * 0.5) * resize_factor).round() as i32,
            y: ((cy - h * 0.5) * resize_factor).round() as i32,
            width: (w * resize_factor).round() as i32,
            height: (h * resize_factor).round() as i32,
        };

        candidates.push(Detection {
            class: Label::try_from(class_id)?,
            score: max_score,
            bbox,
        });
    }

    Ok(non_max_suppression(
        candidates,
        NMS_SCORE_THRESHOLD,
        NMS_IOU_THRESHOLD,
    ))
}

/// Class-agnostic non-maximum suppression
///
/// Keeps detections scoring above `score_threshold`, highest first, and
/// drops any box overlapping an already-kept box by more than `iou_threshold`.
pub fn non_max_suppression(
    mut detections: Vec<Detection>,
    score_threshold: f32,
    iou_threshold: f32,
) -> Vec<Detection> {
    detections.retain(|d| d.score > score_threshold);
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut keep: Vec<Detection> = Vec::with_capacity(detections.len());
    for detection in detections {
        if keep
            .iter()
            .all(|kept| kept.bbox.iou(&detection.bbox) <= iou_threshold)
        {
            keep.push(detection);
        }
    }
    keep
}
