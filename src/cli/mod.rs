// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Command-line front ends for the `eocr` and `nsfw-detect` binaries

pub mod nsfw;
pub mod ocr;

pub use nsfw::NsfwArgs;
pub use ocr::OcrArgs;
