// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Recognizes the text content of a cropped text region.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, Array4, ArrayViewD, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::preprocessing::{REC_INPUT_HEIGHT, REC_MIN_WIDTH};

/// Recognition model input height
pub const RECOGNITION_INPUT_HEIGHT: u32 = REC_INPUT_HEIGHT;

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean of the per-character confidences (0.0-1.0)
    pub confidence: f32,
    pub char_confidences: Vec<f32>,
}

impl RecognizedText {
    pub fn new(text: String, confidence: f32) -> Self {
        Self {
            text,
            confidence,
            char_confidences: Vec::new(),
        }
    }

    /// Check if the text is empty or whitespace only
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// PaddleOCR text recognition model (PP-OCR rec, CPU-only)
pub struct OcrRecognitionModel {
    session: Mutex<Session>,
    /// CTC alphabet, index 0 is the blank token
    dictionary: Vec<char>,
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load the OCR recognition model and its character dictionary
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - Dictionary file not found
    /// - ONNX Runtime initialization fails
    pub fn new<P: AsRef<Path>, D: AsRef<Path>>(model_path: P, dict_path: D) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary not found: {}",
                dict_path.display()
            );
        }

        info!(
            "Loading OCR recognition model from {}",
            model_path.display()
        );

        let dictionary = load_dictionary(dict_path)?;
        debug!(
            "Loaded character dictionary with {} characters",
            dictionary.len()
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
            .with_context(|| {
                format!(
                    "Failed to load OCR recognition model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        Ok(Self {
            session: Mutex::new(session),
            dictionary,
            input_name,
        })
    }

    /// Recognize text from a preprocessed `[1, 3, 48, W]` tensor
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        let shape = input.shape();
        if shape[0] != 1
            || shape[1] != 3
            || shape[2] != RECOGNITION_INPUT_HEIGHT as usize
            || shape[3] < REC_MIN_WIDTH as usize
        {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>={}]",
                shape,
                RECOGNITION_INPUT_HEIGHT,
                REC_MIN_WIDTH
            );
        }

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Recognition session lock poisoned: {}", e))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let probs = sequence_probabilities(output_tensor.view())?;
        Ok(ctc_greedy_decode(&probs, &self.dictionary))
    }
}

/// Load a PaddleOCR dictionary: one character per line
///
/// Index 0 is reserved for the CTC blank and a trailing space entry is
/// appended, matching how PaddleOCR builds its label list.
pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Vec<char>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;

    let mut dictionary = vec!['\0'];
    for line in BufReader::new(file).lines() {
        let line = line.context("Failed to read dictionary line")?;
        let line = line.trim_end_matches('\r');
        if let Some(ch) = line.chars().next() {
            dictionary.push(ch);
        }
    }
    dictionary.push(' ');

    Ok(dictionary)
}

/// Reduce a `[1, T, C]` or `[T, C]` recognition output to a `T x C` matrix
fn sequence_probabilities(output: ArrayViewD<f32>) -> Result<Array2<f32>> {
    let shape = output.shape().to_vec();
    let view = match shape.len() {
        3 if shape[0] == 1 => output.index_axis_move(Axis(0), 0),
        2 => output,
        _ => anyhow::bail!("Unexpected output shape: {:?}", shape),
    };

    view.into_dimensionality::<Ix2>()
        .map(|v| v.to_owned())
        .map_err(|_| anyhow!("Unexpected output shape: {:?}", shape))
}

/// Greedy (best path) CTC decoding
///
/// Takes the arg-max class at each timestep, collapses repeats and drops
/// blanks. Indices outside the dictionary are skipped.
pub fn ctc_greedy_decode(probs: &Array2<f32>, dictionary: &[char]) -> RecognizedText {
    let mut text = String::new();
    let mut char_confidences = Vec::new();
    let mut prev_index = 0usize;

    for row in probs.rows() {
        let (max_index, max_prob) = row
            .iter()
            .copied()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |best, (i, p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            });

        if max_index != 0 && max_index != prev_index {
            if let Some(&ch) = dictionary.get(max_index) {
                text.push(ch);
                char_confidences.push(max_prob.clamp(0.0, 1.0));
            }
        }
        prev_index = max_index;
    }

    let confidence = if char_confidences.is_empty() {
        0.0
    } else {
        char_confidences.iter().sum::<f32>() / char_confidences.len() as f32
    };

    RecognizedText {
        text: text.trim().to_string(),
        confidence,
        char_confidences,
    }
}
