// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image resizing and tensor preparation for the CTPN network
//!
//! The short side is scaled to ~600px with the long side capped at 1200px,
//! then each axis is rounded against the network stride.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;
use tracing::debug;

use super::config::DetectorConfig;
use super::error::{DetectionError, Result};
use super::geometry::Scale;

/// Target dimensions and scale factors for one input image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizePlan {
    pub width: u32,
    pub height: u32,
    pub scale: Scale,
}

/// Round a scaled dimension against the network stride
///
/// NOTE: values below one stride are kept as-is, every other value is bumped
/// to the next stride multiple, even one that already is a multiple. This is
/// almost certainly meant to be "keep exact multiples", but detections are
/// calibrated against this behavior so it is preserved.
pub fn round_to_stride(value: u32, stride: u32) -> u32 {
    if value / stride == 0 {
        value
    } else {
        (value / stride + 1) * stride
    }
}

/// Compute the resize plan for an image of `width` x `height`
pub fn plan_resize(width: u32, height: u32, config: &DetectorConfig) -> Result<ResizePlan> {
    if width == 0 || height == 0 {
        return Err(DetectionError::InvalidImage { width, height });
    }

    let short_side = f64::from(config.short_side);
    let max_long_side = f64::from(config.max_long_side);
    let im_min = f64::from(width.min(height));
    let im_max = f64::from(width.max(height));

    let scale = if short_side / im_min * im_max <= max_long_side {
        short_side / im_min
    } else {
        max_long_side / im_max
    };

    // truncation matches the integer cast the stride rounding expects
    let new_height = round_to_stride((f64::from(height) * scale) as u32, config.stride);
    let new_width = round_to_stride((f64::from(width) * scale) as u32, config.stride);

    // A degenerate axis can truncate to zero on extreme aspect ratios
    if new_width == 0 || new_height == 0 {
        return Err(DetectionError::InvalidImage { width, height });
    }

    let scale = Scale::new(
        (f64::from(new_width) / f64::from(width)) as f32,
        (f64::from(new_height) / f64::from(height)) as f32,
    )?;

    Ok(ResizePlan {
        width: new_width,
        height: new_height,
        scale,
    })
}

/// Convert to RGB and resize for the network
///
/// Returns the resized image and the scale that maps detections back to the
/// original image.
pub fn resize_image(image: &DynamicImage, config: &DetectorConfig) -> Result<(RgbImage, Scale)> {
    let (width, height) = image.dimensions();
    let plan = plan_resize(width, height, config)?;

    debug!(
        "Resizing {}x{} -> {}x{} (scale {:.4}, {:.4})",
        width, height, plan.width, plan.height, plan.scale.x, plan.scale.y
    );

    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, plan.width, plan.height, FilterType::Triangle);
    Ok((resized, plan.scale))
}

/// Build the NHWC input tensor `[1, H, W, 3]` with raw 0..255 pixel values
pub fn to_input_tensor(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array4::zeros((1, height as usize, width as usize, 3));

    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = pixel[c] as f32;
        }
    }

    tensor
}
