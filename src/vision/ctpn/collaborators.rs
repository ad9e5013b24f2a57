// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Interfaces to the stages surrounding text-line post-processing
//!
//! The network, the proposal parser and the graph builder are supplied by the
//! caller. Each returns `anyhow::Result`; the detector tags failures with the
//! stage name and passes them through.

use anyhow::Result as AnyResult;
use ndarray::{Array4, ArrayD};

use super::error::{DetectionError, Result};
use super::geometry::CandidateBox;
use super::graph::AdjacencyGraph;

/// Candidate boxes with one score per box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proposals {
    pub boxes: Vec<CandidateBox>,
    pub scores: Vec<f32>,
}

impl Proposals {
    pub fn new(boxes: Vec<CandidateBox>, scores: Vec<f32>) -> Self {
        Self { boxes, scores }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// True when some score is strictly above `threshold`
    pub fn any_above(&self, threshold: f32) -> bool {
        self.scores.iter().any(|&score| score > threshold)
    }

    pub fn validate(&self) -> Result<()> {
        validate_boxes(&self.boxes, &self.scores)
    }
}

/// Output of the graph builder: the adjacency relation plus the boxes it
/// indexes (after any suppression the builder applied)
#[derive(Debug, Clone, Default)]
pub struct GraphOutput {
    pub graph: AdjacencyGraph,
    pub boxes: Vec<CandidateBox>,
    pub scores: Vec<f32>,
}

impl GraphOutput {
    pub fn validate(&self) -> Result<()> {
        validate_boxes(&self.boxes, &self.scores)?;
        if self.graph.node_count() != self.boxes.len() {
            return Err(DetectionError::malformed(format!(
                "adjacency graph has {} nodes but {} boxes were kept",
                self.graph.node_count(),
                self.boxes.len()
            )));
        }
        Ok(())
    }
}

fn validate_boxes(boxes: &[CandidateBox], scores: &[f32]) -> Result<()> {
    if boxes.len() != scores.len() {
        return Err(DetectionError::malformed(format!(
            "{} boxes but {} scores",
            boxes.len(),
            scores.len()
        )));
    }
    for candidate in boxes {
        candidate.validate()?;
    }
    if let Some(score) = scores.iter().find(|s| !s.is_finite()) {
        return Err(DetectionError::malformed(format!(
            "non-finite proposal score {}",
            score
        )));
    }
    Ok(())
}

/// Text proposal network (CTPN)
pub trait TextProposalNetwork: Send + Sync {
    /// Run inference on an NHWC `[1, H, W, 3]` image tensor
    fn infer(&self, input: &Array4<f32>) -> AnyResult<ArrayD<f32>>;
}

/// Turns the raw prediction tensor into scored candidate boxes in
/// resized-image coordinates
pub trait ProposalParser: Send + Sync {
    fn parse(&self, prediction: &ArrayD<f32>) -> AnyResult<Proposals>;
}

/// Decides which candidates may follow each other
///
/// Implementations must keep the graph acyclic along every path reachable
/// from a root node.
pub trait GraphBuilder: Send + Sync {
    fn build(&self, proposals: &Proposals) -> AnyResult<GraphOutput>;
}
