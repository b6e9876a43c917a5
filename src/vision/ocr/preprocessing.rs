// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for PaddleOCR

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

use super::model::BoundingBox;

/// Target size for PaddleOCR detection model
pub const OCR_INPUT_SIZE: u32 = 640;

/// Recognition model input height (PP-OCRv5 English model uses 48)
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Maximum width for recognition model input
pub const REC_MAX_WIDTH: u32 = 320;

/// Minimum width accepted by the recognition model
pub const REC_MIN_WIDTH: u32 = 4;

/// Mean values for normalization (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for normalization (ImageNet)
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

const PAD_COLOR: Rgb<u8> = Rgb([128, 128, 128]);

/// Letterbox geometry used to map detections back to the source image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessInfo {
    /// Scale factor applied
    pub scale: f32,
    /// X offset from padding
    pub offset_x: u32,
    /// Y offset from padding
    pub offset_y: u32,
    /// Original image width
    pub original_width: u32,
    /// Original image height
    pub original_height: u32,
}

impl PreprocessInfo {
    /// Compute the letterbox for fitting `(width, height)` into a square of `target_size`
    pub fn new(width: u32, height: u32, target_size: u32) -> Self {
        if width == 0 || height == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                original_width: width,
                original_height: height,
            };
        }

        let scale = (target_size as f32 / width as f32).min(target_size as f32 / height as f32);
        let (new_w, new_h) = scaled_size(width, height, scale);

        Self {
            scale,
            offset_x: target_size.saturating_sub(new_w) / 2,
            offset_y: target_size.saturating_sub(new_h) / 2,
            original_width: width,
            original_height: height,
        }
    }

    /// Map a coordinate from preprocessed space back to original image space
    ///
    /// The result is clamped to the original image bounds.
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }

    /// Map a box given in preprocessed space to an integer box in original space
    ///
    /// Returns `None` when the mapped box is empty (e.g. it lies entirely in padding).
    pub fn map_box(&self, x: f32, y: f32, width: f32, height: f32) -> Option<BoundingBox> {
        let (x0, y0) = self.map_to_original(x, y);
        let (x1, y1) = self.map_to_original(x + width, y + height);

        let left = x0.floor() as u32;
        let top = y0.floor() as u32;
        let right = (x1.ceil() as u32).min(self.original_width);
        let bottom = (y1.ceil() as u32).min(self.original_height);

        if right <= left || bottom <= top {
            return None;
        }

        Some(BoundingBox {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

fn scaled_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let new_w = ((width as f32 * scale).round() as u32).max(1);
    let new_h = ((height as f32 * scale).round() as u32).max(1);
    (new_w, new_h)
}

/// Fill an NCHW tensor from an RGB image, normalizing with ImageNet mean/std
fn normalized_tensor(rgb: &RgbImage) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    Array4::from_shape_fn((1, 3, height as usize, width as usize), |(_, c, y, x)| {
        let value = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
        (value - MEAN[c]) / STD[c]
    })
}

/// Resize with aspect ratio preservation and center the result on a gray square
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, PreprocessInfo) {
    let (orig_w, orig_h) = image.dimensions();
    let info = PreprocessInfo::new(orig_w, orig_h, target_size);

    let mut canvas = RgbImage::from_pixel(target_size, target_size, PAD_COLOR);
    if orig_w == 0 || orig_h == 0 {
        return (canvas, info);
    }

    let (new_w, new_h) = scaled_size(orig_w, orig_h, info.scale);
    let resized = image
        .resize_exact(new_w, new_h, FilterType::Lanczos3)
        .to_rgb8();

    image::imageops::replace(
        &mut canvas,
        &resized,
        info.offset_x as i64,
        info.offset_y as i64,
    );

    (canvas, info)
}

/// Preprocess an image for OCR detection
///
/// Letterboxes to `OCR_INPUT_SIZE`, normalizes and returns a `[1, 3, 640, 640]`
/// tensor together with the geometry needed to map boxes back.
pub fn preprocess_for_detection(image: &DynamicImage) -> (Array4<f32>, PreprocessInfo) {
    let (canvas, info) = letterbox(image, OCR_INPUT_SIZE);
    (normalized_tensor(&canvas), info)
}

/// Preprocess a cropped text region for recognition
///
/// Height is fixed at `REC_INPUT_HEIGHT`; width follows the aspect ratio,
/// clamped to `[REC_MIN_WIDTH, REC_MAX_WIDTH]`.
pub fn preprocess_for_recognition(image: &DynamicImage) -> Array4<f32> {
    let (orig_w, orig_h) = image.dimensions();

    let scale = REC_INPUT_HEIGHT as f32 / orig_h.max(1) as f32;
    let new_width = ((orig_w as f32 * scale).round() as u32).clamp(REC_MIN_WIDTH, REC_MAX_WIDTH);

    let resized = image
        .resize_exact(new_width, REC_INPUT_HEIGHT, FilterType::Lanczos3)
        .to_rgb8();

    normalized_tensor(&resized)
}

/// Cut a region out of the original image
pub fn crop_region(image: &DynamicImage, region: &BoundingBox) -> DynamicImage {
    image.crop_imm(region.x, region.y, region.width, region.height)
}
