// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Geometric primitives for text-line detection
//!
//! Candidate boxes live in resized-image coordinates, text lines in original
//! image coordinates. `Scale` maps between the two.

use serde::{Deserialize, Serialize};

use super::error::{DetectionError, Result};

/// Per-axis scale factors from original image space to resized image space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    /// Horizontal factor (`new_w / W`)
    pub x: f32,
    /// Vertical factor (`new_h / H`)
    pub y: f32,
}

impl Scale {
    /// Scale used when the image is fed to the network unresized
    pub const IDENTITY: Scale = Scale { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Result<Self> {
        if !(x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0) {
            return Err(DetectionError::malformed(format!(
                "scale factors must be positive, got ({}, {})",
                x, y
            )));
        }
        Ok(Self { x, y })
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A fixed-width text proposal produced by the proposal parser
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl CandidateBox {
    /// Create a box, rejecting non-finite or inverted coordinates
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Result<Self> {
        let candidate = Self {
            x_min,
            y_min,
            x_max,
            y_max,
        };
        candidate.validate()?;
        Ok(candidate)
    }

    /// Check that coordinates are finite and ordered
    pub fn validate(&self) -> Result<()> {
        let coords = [self.x_min, self.y_min, self.x_max, self.y_max];
        if coords.iter().any(|v| !v.is_finite()) {
            return Err(DetectionError::malformed(format!(
                "candidate box has non-finite coordinates: {:?}",
                coords
            )));
        }
        if self.x_min > self.x_max || self.y_min > self.y_max {
            return Err(DetectionError::malformed(format!(
                "candidate box is inverted: {:?}",
                coords
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Map this box from resized-image space back to original-image space
    pub fn rescale(&self, scale: Scale) -> Self {
        Self {
            x_min: self.x_min / scale.x,
            y_min: self.y_min / scale.y,
            x_max: self.x_max / scale.x,
            y_max: self.y_max / scale.y,
        }
    }
}

/// A detected line of text in original image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
    /// Mean score of the candidate boxes in the chain
    pub score: f32,
}

impl TextLine {
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Map this line back into resized-image space
    pub fn to_resized(&self, scale: Scale) -> Self {
        Self {
            x_min: self.x_min * scale.x,
            y_min: self.y_min * scale.y,
            x_max: self.x_max * scale.x,
            y_max: self.y_max * scale.y,
            score: self.score,
        }
    }
}
