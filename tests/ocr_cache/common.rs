// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared stub engine for OCR cache tests

use anyhow::Result;
use imgscan::{OcrDetection, OcrEngine};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Records every path it is asked to read and returns one region naming the file
#[derive(Clone, Default)]
pub struct RecordingEngine {
    pub calls: Rc<RefCell<Vec<PathBuf>>>,
}

impl RecordingEngine {
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl OcrEngine for RecordingEngine {
    fn readtext(&self, path: &Path) -> Result<Vec<OcrDetection>> {
        self.calls.borrow_mut().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(vec![OcrDetection::new(
            [[0, 0], [10, 0], [10, 5], [0, 5]],
            name,
            0.875,
        )])
    }
}

/// Fails for any path whose file name is `bad.jpg`
pub struct FailingEngine {
    pub inner: RecordingEngine,
}

impl OcrEngine for FailingEngine {
    fn readtext(&self, path: &Path) -> Result<Vec<OcrDetection>> {
        if path.file_name().is_some_and(|n| n == "bad.jpg") {
            self.inner.calls.borrow_mut().push(path.to_path_buf());
            anyhow::bail!("unsupported image format");
        }
        self.inner.readtext(path)
    }
}

pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not really an image").unwrap();
    path
}
