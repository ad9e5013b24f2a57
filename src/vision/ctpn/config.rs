// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for CTPN text-line detection
//!
//! The reference detector accepted a `min_width` argument but filtered lines
//! against a literal width of 32. Both thresholds are kept here:
//! `fixed_min_width` is what the acceptance rule applies by default, and
//! `honor_caller_min_width` switches it over to `min_width`.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use super::error::{DetectionError, Result};

/// Score a proposal must exceed before the graph builder runs
pub const DEFAULT_PRE_FILTER_SCORE: f32 = 0.7;
pub const DEFAULT_MIN_RATIO: f32 = 0.5;
pub const DEFAULT_MIN_SCORE: f32 = 0.9;
pub const DEFAULT_MIN_WIDTH: f32 = 32.0;
/// Short side target of the resize adapter
pub const DEFAULT_SHORT_SIDE: u32 = 600;
/// Upper bound on the long side after resizing
pub const DEFAULT_MAX_LONG_SIDE: u32 = 1200;
/// Network stride; resized dimensions are rounded against it
pub const DEFAULT_STRIDE: u32 = 16;

/// Detector-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Skip graph building unless some proposal scores above this
    pub pre_filter_score: f32,
    /// Minimum width/height ratio of an accepted line
    pub min_ratio: f32,
    /// Minimum mean proposal score of an accepted line
    pub min_score: f32,
    /// Caller-facing minimum line width
    pub min_width: f32,
    /// Minimum line width applied by the reference acceptance rule
    pub fixed_min_width: f32,
    /// Use `min_width` instead of `fixed_min_width` when filtering
    pub honor_caller_min_width: bool,
    /// Convert to RGB and resize before inference
    pub preprocess: bool,
    pub short_side: u32,
    pub max_long_side: u32,
    pub stride: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            pre_filter_score: DEFAULT_PRE_FILTER_SCORE,
            min_ratio: DEFAULT_MIN_RATIO,
            min_score: DEFAULT_MIN_SCORE,
            min_width: DEFAULT_MIN_WIDTH,
            fixed_min_width: DEFAULT_MIN_WIDTH,
            honor_caller_min_width: false,
            preprocess: true,
            short_side: DEFAULT_SHORT_SIDE,
            max_long_side: DEFAULT_MAX_LONG_SIDE,
            stride: DEFAULT_STRIDE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    detector: Option<DetectorConfig>,
}

impl DetectorConfig {
    /// Load configuration from `CTPN_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            pre_filter_score: env_or("CTPN_PRE_FILTER_SCORE", defaults.pre_filter_score),
            min_ratio: env_or("CTPN_MIN_RATIO", defaults.min_ratio),
            min_score: env_or("CTPN_MIN_SCORE", defaults.min_score),
            min_width: env_or("CTPN_MIN_WIDTH", defaults.min_width),
            fixed_min_width: env_or("CTPN_FIXED_MIN_WIDTH", defaults.fixed_min_width),
            honor_caller_min_width: env_or(
                "CTPN_HONOR_CALLER_MIN_WIDTH",
                defaults.honor_caller_min_width,
            ),
            preprocess: env_or("CTPN_PREPROCESS", defaults.preprocess),
            ..defaults
        }
    }

    /// Parse the `[detector]` table of a TOML document
    ///
    /// A missing table yields the defaults, missing keys default individually.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| DetectionError::InvalidConfig(e.to_string()))?;
        let config = file.detector.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DetectionError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Width threshold the acceptance rule actually applies
    pub fn effective_min_width(&self) -> f32 {
        if self.honor_caller_min_width {
            self.min_width
        } else {
            self.fixed_min_width
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, score) in [
            ("pre_filter_score", self.pre_filter_score),
            ("min_score", self.min_score),
        ] {
            if !score.is_finite() || !(0.0..=1.0).contains(&score) {
                return Err(DetectionError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, score
                )));
            }
        }
        for (name, value) in [
            ("min_ratio", self.min_ratio),
            ("min_width", self.min_width),
            ("fixed_min_width", self.fixed_min_width),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DetectionError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.stride == 0 {
            return Err(DetectionError::InvalidConfig(
                "stride must be greater than 0".to_string(),
            ));
        }
        if self.short_side == 0 || self.max_long_side == 0 {
            return Err(DetectionError::InvalidConfig(
                "resize targets must be greater than 0".to_string(),
            ));
        }
        if self.short_side > self.max_long_side {
            return Err(DetectionError::InvalidConfig(format!(
                "short_side ({}) exceeds max_long_side ({})",
                self.short_side, self.max_long_side
            )));
        }
        Ok(())
    }
}

fn env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparsable {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Per-call overrides mirroring the `detect(image, preprocess, min_ratio,
/// min_score, min_width)` call shape. `None` falls back to the detector config.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetectOptions {
    pub preprocess: Option<bool>,
    pub min_ratio: Option<f32>,
    pub min_score: Option<f32>,
    pub min_width: Option<f32>,
}

impl DetectOptions {
    pub fn with_preprocess(mut self, preprocess: bool) -> Self {
        self.preprocess = Some(preprocess);
        self
    }

    pub fn with_min_ratio(mut self, min_ratio: f32) -> Self {
        self.min_ratio = Some(min_ratio);
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn with_min_width(mut self, min_width: f32) -> Self {
        self.min_width = Some(min_width);
        self
    }

    /// Apply these overrides on top of `base`
    pub fn resolve(&self, base: &DetectorConfig) -> DetectorConfig {
        DetectorConfig {
            preprocess: self.preprocess.unwrap_or(base.preprocess),
            min_ratio: self.min_ratio.unwrap_or(base.min_ratio),
            min_score: self.min_score.unwrap_or(base.min_score),
            min_width: self.min_width.unwrap_or(base.min_width),
            ..base.clone()
        }
    }
}
