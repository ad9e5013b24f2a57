// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CTPN text-line post-processing
//!
//! Turns the dense, overlapping text proposals of a CTPN network into a small
//! set of scored text-line boxes.
//!
//! Components:
//! - `resize` - Short-side resize and input tensor preparation
//! - `graph` - Candidate adjacency graph and chain decomposition
//! - `line_fit` - Least-squares fitting of chain edges
//! - `assembler` - Chain measurement, filtering and rescaling
//! - `detector` - End-to-end detection over caller-supplied collaborators
//! - `ocr` - Cropping detected lines for a recognition stage

pub mod assembler;
pub mod collaborators;
pub mod config;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod line_fit;
pub mod ocr;
pub mod resize;

pub use assembler::{assemble_text_lines, measure_chain, LineCandidate, TextLineFilter};
pub use collaborators::{GraphBuilder, GraphOutput, ProposalParser, Proposals, TextProposalNetwork};
pub use config::{DetectOptions, DetectorConfig};
pub use detector::{Detection, TextDetector};
pub use error::{DetectionError, Result};
pub use geometry::{CandidateBox, Scale, TextLine};
pub use graph::{AdjacencyGraph, Chain};
pub use line_fit::fit_y;
pub use ocr::{crop_text_line, ScanResult, TextOcr, TextRecognizer};
pub use resize::{plan_resize, resize_image, round_to_stride, to_input_tensor, ResizePlan};
