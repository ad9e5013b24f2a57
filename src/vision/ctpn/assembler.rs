// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Turns candidate chains into scored, filtered text lines
//!
//! Each chain's top and bottom edges are fitted with a line and evaluated
//! half a box-width inside the chain's horizontal extent. The resulting
//! region is kept only if it is wide enough, confident enough and not too
//! narrow relative to its height.

use tracing::debug;

use super::config::DetectorConfig;
use super::error::{DetectionError, Result};
use super::geometry::{CandidateBox, Scale, TextLine};
use super::graph::Chain;
use super::line_fit::fit_y;

/// Geometry and score of one chain, in resized-image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCandidate {
    pub x_min: f32,
    pub x_max: f32,
    /// `min(ul_y, ur_y)` of the fitted top edge
    pub y_top: f32,
    /// `max(dl_y, dr_y)` of the fitted bottom edge
    pub y_bottom: f32,
    pub score: f32,
}

impl LineCandidate {
    /// Pixel-inclusive width
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min + 1.0
    }

    /// Pixel-inclusive height
    pub fn height(&self) -> f32 {
        self.y_bottom - self.y_top + 1.0
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width() / self.height()
    }

    /// Map into original-image coordinates
    pub fn to_text_line(&self, scale: Scale) -> TextLine {
        TextLine {
            x_min: self.x_min / scale.x,
            y_min: self.y_top / scale.y,
            x_max: self.x_max / scale.x,
            y_max: self.y_bottom / scale.y,
            score: self.score,
        }
    }
}

/// Acceptance thresholds for assembled lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLineFilter {
    pub min_ratio: f32,
    pub min_score: f32,
    pub min_width: f32,
}

impl Default for TextLineFilter {
    fn default() -> Self {
        Self::from_config(&DetectorConfig::default())
    }
}

impl TextLineFilter {
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            min_ratio: config.min_ratio,
            min_score: config.min_score,
            min_width: config.effective_min_width(),
        }
    }

    /// Every comparison is strict
    pub fn accepts(&self, line: &LineCandidate) -> bool {
        line.aspect_ratio() > self.min_ratio
            && line.score > self.min_score
            && line.width() > self.min_width
    }
}

/// Measure one chain against its member boxes and scores
pub fn measure_chain(
    chain: &[usize],
    boxes: &[CandidateBox],
    scores: &[f32],
) -> Result<LineCandidate> {
    if boxes.len() != scores.len() {
        return Err(DetectionError::malformed(format!(
            "{} boxes but {} scores",
            boxes.len(),
            scores.len()
        )));
    }
    let first = *chain
        .first()
        .ok_or_else(|| DetectionError::malformed("chain has no boxes"))?;
    if let Some(&bad) = chain.iter().find(|&&index| index >= boxes.len()) {
        return Err(DetectionError::malformed(format!(
            "chain references box {} but only {} exist",
            bad,
            boxes.len()
        )));
    }

    let members: Vec<&CandidateBox> = chain.iter().map(|&index| &boxes[index]).collect();

    let x_min = members.iter().map(|b| b.x_min).fold(f32::INFINITY, f32::min);
    let x_max = members.iter().map(|b| b.x_max).fold(f32::NEG_INFINITY, f32::max);
    let half_width = boxes[first].width() * 0.5;
    let (left, right) = (x_min + half_width, x_max - half_width);

    let xs: Vec<f32> = members.iter().map(|b| b.x_min).collect();
    let tops: Vec<f32> = members.iter().map(|b| b.y_min).collect();
    let bottoms: Vec<f32> = members.iter().map(|b| b.y_max).collect();

    let (ul_y, ur_y) = fit_y(&xs, &tops, left, right)?;
    let (dl_y, dr_y) = fit_y(&xs, &bottoms, left, right)?;

    let score = chain.iter().map(|&index| scores[index]).sum::<f32>() / chain.len() as f32;

    Ok(LineCandidate {
        x_min,
        x_max,
        y_top: ul_y.min(ur_y),
        y_bottom: dl_y.max(dr_y),
        score,
    })
}

/// Build the accepted text lines for every chain, in chain order
pub fn assemble_text_lines(
    chains: &[Chain],
    boxes: &[CandidateBox],
    scores: &[f32],
    filter: &TextLineFilter,
    scale: Scale,
) -> Result<Vec<TextLine>> {
    let mut lines = Vec::with_capacity(chains.len());
    for (index, chain) in chains.iter().enumerate() {
        let candidate = measure_chain(chain, boxes, scores)?;
        if filter.accepts(&candidate) {
            lines.push(candidate.to_text_line(scale));
        } else {
            debug!(
                "Rejected chain {} ({} boxes): width={:.1} ratio={:.2} score={:.3}",
                index,
                chain.len(),
                candidate.width(),
                candidate.aspect_ratio(),
                candidate.score
            );
        }
    }
    Ok(lines)
}
