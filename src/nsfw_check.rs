// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! NSFW screening over a batch of images
//!
//! Per file, the scores of all "exposed" detections are combined as
//! independent events: `p = p + (1 - p) * score`. A file fails when the
//! combined probability reaches `NSFW_THRESHOLD`; the batch fails when any
//! file does.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::vision::nudity::{Detection, Label};

/// Classes that count towards the nudity score
pub const NSFW_CLASSES: [Label; 5] = [
    Label::ButtocksExposed,
    Label::FemaleBreastExposed,
    Label::FemaleGenitaliaExposed,
    Label::AnusExposed,
    Label::MaleGenitaliaExposed,
];

/// Aggregate score at or above which a file fails
pub const NSFW_THRESHOLD: f64 = 0.75;

/// Anything that can list body-part detections for an image file
#[cfg_attr(test, mockall::automock)]
pub trait NudityDetector {
    fn detect(&self, path: &Path) -> Result<Vec<Detection>>;
}

pub fn is_nsfw_class(label: Label) -> bool {
    NSFW_CLASSES.contains(&label)
}

/// Probability that at least one exposed-class detection is a true positive
pub fn aggregate_score(detections: &[Detection]) -> f64 {
    detections
        .iter()
        .filter(|d| is_nsfw_class(d.class))
        .fold(0.0, |total, d| total + (1.0 - total) * f64::from(d.score))
}

pub fn exceeds_threshold(score: f64) -> bool {
    score >= NSFW_THRESHOLD
}

/// Aggregate score of one input
#[derive(Debug, Clone, PartialEq)]
pub struct FileScore {
    pub path: PathBuf,
    pub score: f64,
}

impl FileScore {
    pub fn is_nsfw(&self) -> bool {
        exceeds_threshold(self.score)
    }
}

/// Scores for every input, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub files: Vec<FileScore>,
}

impl CheckReport {
    /// True when any file reached the threshold
    pub fn failed(&self) -> bool {
        self.files.iter().any(FileScore::is_nsfw)
    }

    pub fn flagged(&self) -> impl Iterator<Item = &FileScore> {
        self.files.iter().filter(|f| f.is_nsfw())
    }

    /// Process exit status: 1 if any file failed, else 0
    pub fn exit_code(&self) -> u8 {
        u8::from(self.failed())
    }
}

/// Score every input with `detector`
///
/// All inputs are scored even after one has failed. A detector error
/// aborts the run.
pub fn check_files<D>(detector: &D, inputs: &[PathBuf]) -> Result<CheckReport>
where
    D: NudityDetector + ?Sized,
{
    let mut report = CheckReport::default();

    for input in inputs {
        let detections = detector
            .detect(input)
            .with_context(|| format!("Nudity detection failed for {}", input.display()))?;

        let score = aggregate_score(&detections);
        debug!(
            "{}: score {:.4} from {} detections",
            input.display(),
            score,
            detections.len()
        );

        report.files.push(FileScore {
            path: input.clone(),
            score,
        });
    }

    Ok(report)
}
