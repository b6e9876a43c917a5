// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Batch checker tests with a scripted detector

use anyhow::Result;
use imgscan::{check_files, Detection, Label, NudityDetector};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Returns canned detections per path and records call order
#[derive(Default)]
struct ScriptedDetector {
    responses: HashMap<PathBuf, Vec<Detection>>,
    calls: RefCell<Vec<PathBuf>>,
}

impl ScriptedDetector {
    fn with(mut self, path: &str, detections: Vec<Detection>) -> Self {
        self.responses.insert(PathBuf::from(path), detections);
        self
    }
}

impl NudityDetector for ScriptedDetector {
    fn detect(&self, path: &Path) -> Result<Vec<Detection>> {
        self.calls.borrow_mut().push(path.to_path_buf());
        Ok(self.responses.get(path).cloned().unwrap_or_default())
    }
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

#[test]
fn test_middle_file_fails_all_processed() {
    let detector = ScriptedDetector::default()
        .with("1.jpg", vec![Detection::new(Label::FaceFemale, 0.9)])
        .with(
            "2.jpg",
            vec![
                Detection::new(Label::FemaleBreastExposed, 0.7),
                Detection::new(Label::ButtocksExposed, 0.6),
            ],
        )
        .with("3.jpg", vec![Detection::new(Label::FeetExposed, 0.8)]);

    let inputs = paths(&["1.jpg", "2.jpg", "3.jpg"]);
    let report = check_files(&detector, &inputs).unwrap();

    assert_eq!(*detector.calls.borrow(), inputs);
    assert_eq!(report.files.len(), 3);
    let flagged: Vec<_> = report.flagged().map(|f| f.path.clone()).collect();
    assert_eq!(flagged, vec![PathBuf::from("2.jpg")]);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_first_file_fails_rest_still_checked() {
    let detector = ScriptedDetector::default()
        .with("1.jpg", vec![Detection::new(Label::AnusExposed, 0.95)]);

    let inputs = paths(&["1.jpg", "2.jpg", "3.jpg"]);
    let report = check_files(&detector, &inputs).unwrap();

    assert_eq!(detector.calls.borrow().len(), 3);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_clean_batch_exits_zero() {
    let detector = ScriptedDetector::default()
        .with("1.jpg", vec![Detection::new(Label::FaceMale, 0.99)])
        .with("2.jpg", vec![Detection::new(Label::MaleGenitaliaExposed, 0.7)]);

    let inputs = paths(&["1.jpg", "2.jpg"]);
    let report = check_files(&detector, &inputs).unwrap();

    assert_eq!(detector.calls.borrow().len(), 2);
    assert!(!report.failed());
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_empty_batch_exits_zero() {
    let detector = ScriptedDetector::default();
    let report = check_files(&detector, &[]).unwrap();

    assert!(report.files.is_empty());
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_boundary_scores() {
    let detector = ScriptedDetector::default()
        .with(
            "exact.jpg",
            vec![
                Detection::new(Label::FemaleBreastExposed, 0.5),
                Detection::new(Label::AnusExposed, 0.5),
            ],
        )
        .with("below.jpg", vec![Detection::new(Label::ButtocksExposed, 0.7499)]);

    let report = check_files(&detector, &paths(&["exact.jpg", "below.jpg"])).unwrap();

    assert!(report.files[0].is_nsfw());
    assert!(!report.files[1].is_nsfw());
}
