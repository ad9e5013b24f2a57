// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hand-off from text-line detection to a recognition stage
//!
//! Detected lines are cropped out of the original image with a small margin
//! and passed to a caller-supplied recognizer.

use anyhow::Result as AnyResult;
use image::DynamicImage;
use tracing::debug;

use super::collaborators::{GraphBuilder, ProposalParser, TextProposalNetwork};
use super::detector::TextDetector;
use super::error::{DetectionError, Result};
use super::geometry::TextLine;

/// Margin in pixels added around each line before recognition
pub const DEFAULT_CROP_PADDING: u32 = 5;

/// Reads the text in a cropped line image
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> AnyResult<String>;
}

/// One recognized line
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub text: String,
    /// Line position in original image coordinates
    pub position: TextLine,
    /// Crop that was passed to the recognizer
    pub crop: DynamicImage,
}

/// Crop `line` out of `image`, widened by `padding` on every side and
/// clamped to the image. Returns `None` when nothing is left.
pub fn crop_text_line(
    image: &DynamicImage,
    line: &TextLine,
    padding: u32,
) -> Option<DynamicImage> {
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));
    let padding = i64::from(padding);

    // pad first, then clamp, so a line beyond the border stays empty
    let edge = |value: f32, offset: i64, limit: i64| {
        (value.trunc() as i64).saturating_add(offset).clamp(0, limit)
    };
    let x0 = edge(line.x_min, -padding, width);
    let y0 = edge(line.y_min, -padding, height);
    let x1 = edge(line.x_max, padding, width);
    let y1 = edge(line.y_max, padding, height);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(image.crop_imm(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Detection followed by recognition of every accepted line
pub struct TextOcr<N, P, G, R> {
    detector: TextDetector<N, P, G>,
    recognizer: R,
    padding: u32,
}

impl<N, P, G, R> TextOcr<N, P, G, R>
where
    N: TextProposalNetwork,
    P: ProposalParser,
    G: GraphBuilder,
    R: TextRecognizer,
{
    pub fn new(detector: TextDetector<N, P, G>, recognizer: R) -> Self {
        Self {
            detector,
            recognizer,
            padding: DEFAULT_CROP_PADDING,
        }
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn detector(&self) -> &TextDetector<N, P, G> {
        &self.detector
    }

    /// Detect and recognize all text lines, in detection order
    pub fn scan(&self, image: &DynamicImage) -> Result<Vec<ScanResult>> {
        let detection = self.detector.detect(image)?;
        let mut results = Vec::with_capacity(detection.text_lines.len());

        for line in detection.text_lines {
            let Some(crop) = crop_text_line(image, &line, self.padding) else {
                debug!("Skipping text line outside image bounds: {:?}", line);
                continue;
            };
            let text = self
                .recognizer
                .recognize(&crop)
                .map_err(DetectionError::collaborator("recognizer"))?;
            results.push(ScanResult {
                text,
                position: line,
                crop,
            });
        }

        Ok(results)
    }
}
