// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end scenario: one input already cached, one not

use imgscan::{run_ocr_cache, LazyEngine};
use tempfile::TempDir;

use super::common::{touch, RecordingEngine};

#[test]
fn test_only_uncached_input_is_processed() {
    let dir = TempDir::new().unwrap();
    let a = touch(dir.path(), "a.jpg");
    let b = touch(dir.path(), "b.jpg");

    let a_cache = dir.path().join("a.jpg.ocr.json");
    let b_cache = dir.path().join("b.jpg.ocr.json");
    let original = br#"[[[[1,1],[2,1],[2,2],[1,2]],"old",0.1]]"#;
    std::fs::write(&a_cache, original).unwrap();

    let stub = RecordingEngine::default();
    let shared = stub.clone();
    let mut engine = LazyEngine::new(move || Ok(shared.clone()));

    let mut stdout = Vec::new();
    let summary = run_ocr_cache(&[a.clone(), b.clone()], &mut engine, &mut stdout).unwrap();

    assert_eq!(*stub.calls.borrow(), vec![b.clone()]);
    // Only the uncached input is announced
    assert_eq!(
        String::from_utf8(stdout).unwrap(),
        format!("OCRing {}\n", b.display())
    );
    assert_eq!(summary.skipped, vec![a]);
    assert_eq!(summary.processed, vec![b]);

    assert!(b_cache.exists());
    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&b_cache).unwrap()).unwrap();
    assert_eq!(written[0][1], "b.jpg");

    assert_eq!(std::fs::read(&a_cache).unwrap(), original.to_vec());
}
