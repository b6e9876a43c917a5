// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR cache runner tests
//!
//! Covers:
//! - Idempotence across runs
//! - Cache-hit skip without overwrite
//! - Lazy engine loading
//! - Abort on first error
//! - Progress lines only for processed inputs

use imgscan::{cache_path_for, run_ocr_cache, LazyEngine, OcrDetection};
use std::cell::Cell;
use std::io;
use tempfile::TempDir;

use super::common::{touch, FailingEngine, RecordingEngine};

#[test]
fn test_second_run_performs_no_ocr() {
    let dir = TempDir::new().unwrap();
    let image = touch(dir.path(), "page.png");
    let inputs = vec![image.clone()];
    let stub = RecordingEngine::default();

    for _ in 0..2 {
        let shared = stub.clone();
        let mut engine = LazyEngine::new(move || Ok(shared.clone()));
        run_ocr_cache(&inputs, &mut engine, &mut io::sink()).unwrap();
    }

    assert_eq!(stub.call_count(), 1);

    let cache_files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".ocr.json"))
        .collect();
    assert_eq!(cache_files.len(), 1);
    assert_eq!(cache_files[0].path(), cache_path_for(&image));
}

#[test]
fn test_existing_cache_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let image = touch(dir.path(), "scan.jpg");
    let cache = cache_path_for(&image);
    std::fs::write(&cache, "hand-edited, not even JSON").unwrap();

    let stub = RecordingEngine::default();
    let shared = stub.clone();
    let mut engine = LazyEngine::new(move || Ok(shared.clone()));
    let mut out = Vec::new();
    let summary = run_ocr_cache(&[image.clone()], &mut engine, &mut out).unwrap();

    assert_eq!(stub.call_count(), 0);
    assert!(!engine.is_loaded());
    assert_eq!(summary.skipped, vec![image]);
    assert!(summary.processed.is_empty());
    assert!(out.is_empty());
    assert_eq!(
        std::fs::read_to_string(&cache).unwrap(),
        "hand-edited, not even JSON"
    );
}

#[test]
fn test_engine_loaded_once_for_many_files() {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<_> = ["1.png", "2.png", "3.png"]
        .iter()
        .map(|name| touch(dir.path(), name))
        .collect();

    let loads = Cell::new(0);
    let stub = RecordingEngine::default();
    let mut engine = LazyEngine::new(|| {
        loads.set(loads.get() + 1);
        Ok(stub.clone())
    });

    let summary = run_ocr_cache(&inputs, &mut engine, &mut io::sink()).unwrap();

    assert_eq!(loads.get(), 1);
    assert_eq!(stub.call_count(), 3);
    assert_eq!(summary.processed, inputs);
    // Processed strictly in argument order
    assert_eq!(*stub.calls.borrow(), inputs);
}

#[test]
fn test_cache_content_round_trips() {
    let dir = TempDir::new().unwrap();
    let image = touch(dir.path(), "receipt.jpg");

    let mut engine = LazyEngine::new(|| Ok(RecordingEngine::default()));
    run_ocr_cache(&[image.clone()], &mut engine, &mut io::sink()).unwrap();

    let json = std::fs::read_to_string(cache_path_for(&image)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value,
        serde_json::json!([[[[0, 0], [10, 0], [10, 5], [0, 5]], "receipt.jpg", 0.875]])
    );

    let detections: Vec<OcrDetection> = serde_json::from_str(&json).unwrap();
    assert_eq!(detections[0].text, "receipt.jpg");
}

#[test]
fn test_first_error_aborts_batch() {
    let dir = TempDir::new().unwrap();
    let good = touch(dir.path(), "good.jpg");
    let bad = touch(dir.path(), "bad.jpg");
    let later = touch(dir.path(), "later.jpg");

    let recorder = RecordingEngine::default();
    let inner = recorder.clone();
    let mut engine = LazyEngine::new(move || {
        Ok(FailingEngine {
            inner: inner.clone(),
        })
    });

    let mut out = Vec::new();
    let err = run_ocr_cache(&[good.clone(), bad.clone(), later.clone()], &mut engine, &mut out)
        .unwrap_err();

    assert!(err.to_string().contains("bad.jpg"));
    assert!(format!("{:#}", err).contains("unsupported image format"));
    // Work done before the failure is kept, nothing after it runs
    assert!(cache_path_for(&good).exists());
    assert!(!cache_path_for(&bad).exists());
    assert!(!cache_path_for(&later).exists());
    assert_eq!(recorder.call_count(), 2);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("OCRing {}\nOCRing {}\n", good.display(), bad.display())
    );
}

#[test]
fn test_engine_load_failure_aborts() {
    let dir = TempDir::new().unwrap();
    let image = touch(dir.path(), "a.png");

    let mut engine =
        LazyEngine::new(|| -> anyhow::Result<RecordingEngine> { anyhow::bail!("no model files") });
    let err = run_ocr_cache(&[image.clone()], &mut engine, &mut io::sink()).unwrap_err();

    assert!(format!("{:#}", err).contains("no model files"));
    assert!(!cache_path_for(&image).exists());
}
