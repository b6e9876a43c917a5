// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the NudeNet detector

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Pad the image to a square (black, right and bottom), resize to
/// `resolution`, and build a `[1, 3, resolution, resolution]` RGB tensor in [0, 1].
///
/// Returns the tensor and the factor that maps model coordinates back to
/// original pixels.
pub fn preprocess_for_nudity(image: &DynamicImage, resolution: u32) -> (Array4<f32>, f32) {
    let (width, height) = image.dimensions();
    let side = width.max(height).max(1);

    let mut square = RgbImage::from_pixel(side, side, Rgb([0, 0, 0]));
    image::imageops::replace(&mut square, &image.to_rgb8(), 0, 0);

    let resized = image::imageops::resize(&square, resolution, resolution, FilterType::Triangle);
    let size = resolution as usize;
    let tensor = Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    });

    (tensor, side as f32 / resolution as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_shape_and_factor() {
        let img = DynamicImage::new_rgb8(640, 480);
        let (tensor, factor) = preprocess_for_nudity(&img, 320);
        assert_eq!(tensor.shape(), &[1, 3, 320, 320]);
        assert!((factor - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_padding_on_right_and_bottom() {
        // White 320x160 image: top half stays white, bottom half is black padding
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 160, Rgb([255, 255, 255])));
        let (tensor, factor) = preprocess_for_nudity(&img, 320);

        assert!((factor - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 0, 10, 10]] - 1.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 2, 300, 10]], 0.0);
    }

    #[test]
    fn test_channel_order_is_rgb() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([255, 0, 0])));
        let (tensor, _) = preprocess_for_nudity(&img, 32);
        assert_eq!(tensor[[0, 0, 5, 5]], 1.0);
        assert_eq!(tensor[[0, 1, 5, 5]], 0.0);
        assert_eq!(tensor[[0, 2, 5, 5]], 0.0);
    }
}
