// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for CTPN text-line post-processing

use thiserror::Error;

/// Errors raised by the text-line detection pipeline
#[derive(Debug, Error)]
pub enum DetectionError {
    /// Image has a zero dimension and cannot be rescaled
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImage {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },

    /// Shapes or lengths of pipeline inputs disagree
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The adjacency graph contains a cycle reachable from a root node
    #[error("Adjacency graph has a cycle reachable from root {root} (revisited node {node})")]
    PreconditionViolation {
        /// Root node the traversal started from
        root: usize,
        /// Node that was reached twice
        node: usize,
    },

    /// Detector configuration failed validation
    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),

    /// An external collaborator (network, parser, graph builder, recognizer) failed
    #[error("{stage} failed: {source}")]
    Collaborator {
        /// Pipeline stage that raised the error
        stage: &'static str,
        /// Original error from the collaborator
        #[source]
        source: anyhow::Error,
    },
}

impl DetectionError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub(crate) fn collaborator(stage: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Collaborator { stage, source }
    }
}

/// Result alias for the detection pipeline
pub type Result<T> = std::result::Result<T, DetectionError>;
