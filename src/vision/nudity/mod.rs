// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! NudeNet integration for body-part detection
//!
//! Components:
//! - `labels` - The 18 NudeNet classes
//! - `preprocessing` - Square padding and tensor conversion
//! - `detector` - ONNX inference, box decoding and NMS

pub mod detector;
pub mod labels;
pub mod preprocessing;

pub use detector::{BoundingBox, Detection, NudeDetector};
pub use labels::Label;
