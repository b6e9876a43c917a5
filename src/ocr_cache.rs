// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR result caching
//!
//! Each input image gets a JSON sidecar `<input>.ocr.json`. An existing
//! sidecar means the image is done: it is never read, validated or
//! rewritten. The OCR engine is only loaded once an input actually needs it.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::{debug, info};

use crate::vision::ocr::OcrDetection;

/// Suffix appended to the input file name to form its cache file
pub const CACHE_SUFFIX: &str = ".ocr.json";

/// Anything that can read text out of an image file
pub trait OcrEngine {
    fn readtext(&self, path: &Path) -> Result<Vec<OcrDetection>>;
}

/// Owned engine handle that runs its loader on first use
pub struct LazyEngine<E, F>
where
    F: FnMut() -> Result<E>,
{
    engine: Option<E>,
    loader: F,
}

impl<E, F> LazyEngine<E, F>
where
    F: FnMut() -> Result<E>,
{
    pub fn new(loader: F) -> Self {
        Self {
            engine: None,
            loader,
        }
    }

    /// Get the engine, loading it if this is the first call
    ///
    /// A failed load leaves the handle empty.
    pub fn get(&mut self) -> Result<&E> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => (self.loader)()?,
        };
        Ok(self.engine.insert(engine))
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.is_some()
    }
}

/// Outcome of one cache run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrRunSummary {
    /// Inputs that were OCRed and written, in order
    pub processed: Vec<PathBuf>,
    /// Inputs skipped because their cache file already existed
    pub skipped: Vec<PathBuf>,
}

/// `a.jpg` -> `a.jpg.ocr.json`
pub fn cache_path_for(input: &Path) -> PathBuf {
    let mut name: OsString = input.as_os_str().to_owned();
    name.push(CACHE_SUFFIX);
    PathBuf::from(name)
}

/// Serialize `detections` as UTF-8 JSON at `path`
///
/// The data goes to a temporary file in the same directory first and is
/// renamed into place, so `path` either holds a complete result or does
/// not exist. The file gets the usual umask-derived mode of a newly
/// created file rather than the private mode of a temporary one.
pub fn write_cache(path: &Path, detections: &[OcrDetection]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let tmp = builder
        .prefix(".ocr-cache")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer(&mut writer, detections)
            .with_context(|| format!("Failed to serialize OCR result for {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    tmp.persist(path)
        .with_context(|| format!("Failed to write cache file {}", path.display()))?;

    Ok(())
}

/// OCR every input that has no cache file yet
///
/// Inputs are handled strictly in order, and `OCRing <input>` is written
/// to `out` before each one that needs work. The first error aborts the
/// run; cache files written before it are kept.
pub fn run_ocr_cache<E, F, W>(
    inputs: &[PathBuf],
    engine: &mut LazyEngine<E, F>,
    out: &mut W,
) -> Result<OcrRunSummary>
where
    E: OcrEngine,
    F: FnMut() -> Result<E>,
    W: Write,
{
    let mut summary = OcrRunSummary::default();

    for input in inputs {
        let outfile = cache_path_for(input);
        if outfile.exists() {
            debug!("Cache hit for {}, skipping", input.display());
            summary.skipped.push(input.clone());
            continue;
        }

        writeln!(out, "OCRing {}", input.display())
            .and_then(|_| out.flush())
            .context("Failed to write progress")?;

        let reader = engine.get().context("Failed to initialize OCR engine")?;
        let result = reader
            .readtext(input)
            .with_context(|| format!("OCR failed for {}", input.display()))?;

        write_cache(&outfile, &result)?;
        info!(
            "Wrote {} ({} regions)",
            outfile.display(),
            result.len()
        );

        summary.processed.push(input.clone());
    }

    Ok(summary)
}
