// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for text detection in natural images
//!
//! This module provides:
//! - CTPN text-line post-processing (proposal chains to text lines)
//!
//! Inference, proposal parsing and graph building are supplied by the caller.

pub mod ctpn;

pub use ctpn::{
    CandidateBox, DetectOptions, Detection, DetectionError, DetectorConfig, TextDetector,
    TextLine,
};
