// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end detector tests over mock collaborators
//!
//! Proposals are expressed in resized-image coordinates. A 900x300 input is
//! resized to 1216x416, so every reported coordinate is divided by
//! (1216/900, 416/300).

use super::mocks::{
    chain_edges, proposal_row, EdgeListGraphBuilder, FailingNetwork, RecordingNetwork,
    StaticParser,
};
use ctpn_textline::vision::ctpn::{
    CandidateBox, DetectOptions, Detection, DetectionError, DetectorConfig, Proposals,
    TextDetector,
};
use image::{DynamicImage, Rgb, RgbImage};

const SCALE_X: f32 = 1216.0 / 900.0;
const SCALE_Y: f32 = 416.0 / 300.0;

fn wide_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(900, 300, Rgb([240, 240, 240])))
}

/// Eight-box text line, a two-box sliver, and one isolated low-score box
fn scene() -> (Proposals, Vec<(usize, usize)>) {
    let mut boxes = proposal_row(100.0, 50.0, 80.0, 8);
    boxes.extend(proposal_row(600.0, 200.0, 300.0, 2));
    boxes.push(CandidateBox::new(900.0, 10.0, 915.0, 30.0).unwrap());

    let mut scores = vec![0.95; 10];
    scores.push(0.5);

    let mut edges = chain_edges(0, 8);
    edges.push((8, 9));

    (Proposals::new(boxes, scores), edges)
}

fn build_detector(
    proposals: Proposals,
    edges: Vec<(usize, usize)>,
    config: DetectorConfig,
) -> TextDetector<RecordingNetwork, StaticParser, EdgeListGraphBuilder> {
    TextDetector::new(
        RecordingNetwork::default(),
        StaticParser::new(proposals),
        EdgeListGraphBuilder::new(edges),
        config,
    )
    .unwrap()
}

#[test]
fn test_detect_scene_returns_single_line() {
    let (proposals, edges) = scene();
    let network = RecordingNetwork::default();
    let last_shape = network.last_shape.clone();
    let graph_builder = EdgeListGraphBuilder::new(edges);
    let graph_calls = graph_builder.calls.clone();
    let detector = TextDetector::new(
        network,
        StaticParser::new(proposals),
        graph_builder,
        DetectorConfig::default(),
    )
    .unwrap();

    let detection = detector.detect(&wide_image()).unwrap();

    assert_eq!(*last_shape.lock().unwrap(), Some(vec![1, 416, 1216, 3]));
    assert_eq!(graph_calls.count(), 1);

    assert_eq!(detection.text_lines.len(), 1);
    let line = detection.text_lines[0];
    assert!((line.x_min - 100.0 / SCALE_X).abs() < 1e-3);
    assert!((line.x_max - 227.0 / SCALE_X).abs() < 1e-3);
    assert!((line.y_min - 50.0 / SCALE_Y).abs() < 1e-3);
    assert!((line.y_max - 80.0 / SCALE_Y).abs() < 1e-3);
    assert!((line.score - 0.95).abs() < 1e-5);

    assert_eq!(detection.boxes.len(), 11);
    assert_eq!(detection.scores.len(), 11);
    assert!((detection.boxes[10].x_min - 900.0 / SCALE_X).abs() < 1e-3);
    assert_eq!(detection.scores[10], 0.5);
}

#[test]
fn test_reported_line_maps_back_to_resized_space() {
    let (proposals, edges) = scene();
    let detector = build_detector(proposals, edges, DetectorConfig::default());
    let detection = detector.detect(&wide_image()).unwrap();

    let scale = ctpn_textline::Scale::new(SCALE_X, SCALE_Y).unwrap();
    let resized = detection.text_lines[0].to_resized(scale);
    assert!((resized.x_min - 100.0).abs() < 1e-3);
    assert!((resized.y_min - 50.0).abs() < 1e-3);
    assert!((resized.x_max - 227.0).abs() < 1e-3);
    assert!((resized.y_max - 80.0).abs() < 1e-3);
}

#[test]
fn test_low_scores_skip_graph_building() {
    let (mut proposals, edges) = scene();
    proposals.scores = vec![0.7; proposals.len()];

    let network = RecordingNetwork::default();
    let network_calls = network.calls.clone();
    let parser = StaticParser::new(proposals);
    let parser_calls = parser.calls.clone();
    let graph_builder = EdgeListGraphBuilder::new(edges);
    let graph_calls = graph_builder.calls.clone();
    let detector =
        TextDetector::new(network, parser, graph_builder, DetectorConfig::default()).unwrap();

    let detection = detector.detect(&wide_image()).unwrap();

    assert_eq!(detection, Detection::default());
    assert!(detection.has_no_lines());
    assert_eq!(network_calls.count(), 1);
    assert_eq!(parser_calls.count(), 1);
    assert_eq!(graph_calls.count(), 0);
}

#[test]
fn test_caller_min_width_ignored_by_default() {
    let (proposals, edges) = scene();
    let detector = build_detector(proposals, edges, DetectorConfig::default());

    // the 128px line survives even though the caller asked for 200px
    let options = DetectOptions::default().with_min_width(200.0);
    let detection = detector.detect_with(&wide_image(), &options).unwrap();
    assert_eq!(detection.text_lines.len(), 1);
}

#[test]
fn test_caller_min_width_applied_when_honored() {
    let (proposals, edges) = scene();
    let config = DetectorConfig {
        honor_caller_min_width: true,
        ..Default::default()
    };
    let detector = build_detector(proposals, edges, config);

    let options = DetectOptions::default().with_min_width(200.0);
    let detection = detector.detect_with(&wide_image(), &options).unwrap();
    assert!(detection.has_no_lines());
    // candidate boxes are still reported
    assert_eq!(detection.boxes.len(), 11);
}

#[test]
fn test_min_score_override() {
    let (proposals, edges) = scene();
    let detector = build_detector(proposals, edges, DetectorConfig::default());

    let options = DetectOptions::default().with_min_score(0.96);
    let detection = detector.detect_with(&wide_image(), &options).unwrap();
    assert!(detection.text_lines.is_empty());
}

#[test]
fn test_min_ratio_override_admits_sliver() {
    let (proposals, edges) = scene();
    let config = DetectorConfig {
        fixed_min_width: 0.0,
        ..Default::default()
    };
    let detector = build_detector(proposals, edges, config);

    // the sliver is 32x101, ratio ~0.32
    let options = DetectOptions::default().with_min_ratio(0.3);
    let detection = detector.detect_with(&wide_image(), &options).unwrap();
    assert_eq!(detection.text_lines.len(), 2);
}

#[test]
fn test_cycle_from_root_is_reported() {
    let boxes = proposal_row(0.0, 0.0, 30.0, 3);
    let proposals = Proposals::new(boxes, vec![0.95; 3]);
    let detector = build_detector(
        proposals,
        vec![(0, 1), (1, 2), (2, 1)],
        DetectorConfig::default(),
    );

    let err = detector.detect(&wide_image()).unwrap_err();
    assert!(matches!(
        err,
        DetectionError::PreconditionViolation { root: 0, node: 1 }
    ));
}

#[test]
fn test_mismatched_parser_output_is_malformed() {
    let proposals = Proposals::new(proposal_row(0.0, 0.0, 30.0, 3), vec![0.95, 0.95]);
    let graph_builder = EdgeListGraphBuilder::new(vec![]);
    let graph_calls = graph_builder.calls.clone();
    let detector = TextDetector::new(
        RecordingNetwork::default(),
        StaticParser::new(proposals),
        graph_builder,
        DetectorConfig::default(),
    )
    .unwrap();

    let err = detector.detect(&wide_image()).unwrap_err();
    assert!(matches!(err, DetectionError::MalformedInput(_)));
    assert_eq!(graph_calls.count(), 0);
}

#[test]
fn test_network_failure_is_surfaced() {
    let (proposals, edges) = scene();
    let detector = TextDetector::new(
        FailingNetwork,
        StaticParser::new(proposals),
        EdgeListGraphBuilder::new(edges),
        DetectorConfig::default(),
    )
    .unwrap();

    let err = detector.detect(&wide_image()).unwrap_err();
    assert!(matches!(
        err,
        DetectionError::Collaborator {
            stage: "network",
            ..
        }
    ));
    assert!(err.to_string().contains("model not loaded"));
}

#[test]
fn test_repeated_calls_are_independent() {
    let (proposals, edges) = scene();
    let detector = build_detector(proposals, edges, DetectorConfig::default());

    let first = detector.detect(&wide_image()).unwrap();
    let second = detector.detect(&wide_image()).unwrap();
    assert_eq!(first, second);
}
