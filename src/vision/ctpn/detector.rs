// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CTPN text-line detector
//!
//! Wires resize, network inference, proposal parsing and graph building to
//! the chain decomposition and line assembly. Each call is independent; the
//! detector holds no mutable state of its own.

use image::DynamicImage;
use tracing::{debug, info};

use super::assembler::{assemble_text_lines, TextLineFilter};
use super::collaborators::{GraphBuilder, ProposalParser, TextProposalNetwork};
use super::config::{DetectOptions, DetectorConfig};
use super::error::{DetectionError, Result};
use super::geometry::{CandidateBox, Scale, TextLine};
use super::resize::{resize_image, to_input_tensor};

/// Result of one detection call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// Accepted text lines in original image coordinates
    pub text_lines: Vec<TextLine>,
    /// Candidate boxes kept by the graph builder, in original image coordinates
    pub boxes: Vec<CandidateBox>,
    /// One score per entry of `boxes`
    pub scores: Vec<f32>,
}

impl Detection {
    /// True when no text line was accepted; `boxes` may still be populated
    pub fn has_no_lines(&self) -> bool {
        self.text_lines.is_empty()
    }
}

/// Text-line detector over caller-supplied network, parser and graph builder
pub struct TextDetector<N, P, G> {
    network: N,
    parser: P,
    graph_builder: G,
    config: DetectorConfig,
}

impl<N, P, G> std::fmt::Debug for TextDetector<N, P, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<N, P, G> TextDetector<N, P, G>
where
    N: TextProposalNetwork,
    P: ProposalParser,
    G: GraphBuilder,
{
    /// Create a detector
    ///
    /// # Errors
    /// `InvalidConfig` if `config` fails validation.
    pub fn new(network: N, parser: P, graph_builder: G, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "CTPN text detector ready (pre-filter {}, min_ratio {}, min_score {}, min_width {})",
            config.pre_filter_score,
            config.min_ratio,
            config.min_score,
            config.effective_min_width()
        );
        Ok(Self {
            network,
            parser,
            graph_builder,
            config,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect text lines using the detector's configuration
    pub fn detect(&self, image: &DynamicImage) -> Result<Detection> {
        self.detect_with(image, &DetectOptions::default())
    }

    /// Detect text lines with per-call overrides
    pub fn detect_with(&self, image: &DynamicImage, options: &DetectOptions) -> Result<Detection> {
        let config = options.resolve(&self.config);
        config.validate()?;

        let (input, scale) = if config.preprocess {
            let (resized, scale) = resize_image(image, &config)?;
            (to_input_tensor(&resized), scale)
        } else {
            if image.width() == 0 || image.height() == 0 {
                return Err(DetectionError::InvalidImage {
                    width: image.width(),
                    height: image.height(),
                });
            }
            (to_input_tensor(&image.to_rgb8()), Scale::IDENTITY)
        };

        let prediction = self
            .network
            .infer(&input)
            .map_err(DetectionError::collaborator("network"))?;

        let proposals = self
            .parser
            .parse(&prediction)
            .map_err(DetectionError::collaborator("proposal parser"))?;
        proposals.validate()?;
        debug!("Parsed {} text proposals", proposals.len());

        if !proposals.any_above(config.pre_filter_score) {
            debug!(
                "No proposal above {}, skipping graph building",
                config.pre_filter_score
            );
            return Ok(Detection::default());
        }

        let output = self
            .graph_builder
            .build(&proposals)
            .map_err(DetectionError::collaborator("graph builder"))?;
        output.validate()?;

        let chains = output.graph.decompose()?;
        let filter = TextLineFilter::from_config(&config);
        let text_lines =
            assemble_text_lines(&chains, &output.boxes, &output.scores, &filter, scale)?;

        debug!(
            "Kept {} of {} chains as text lines",
            text_lines.len(),
            chains.len()
        );

        Ok(Detection {
            text_lines,
            boxes: output.boxes.iter().map(|b| b.rescale(scale)).collect(),
            scores: output.scores,
        })
    }
}
