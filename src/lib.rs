// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod vision;

// Re-export main types
pub use vision::ctpn::{
    AdjacencyGraph, CandidateBox, Chain, DetectOptions, Detection, DetectionError,
    DetectorConfig, GraphBuilder, GraphOutput, ProposalParser, Proposals, Scale, TextDetector,
    TextLine, TextOcr, TextProposalNetwork, TextRecognizer,
};
