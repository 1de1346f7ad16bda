//! Result Reporter (spec component C9).
//!
//! Assembles the human/machine-readable outcome of a top-level call:
//! success metrics, or an error kind plus (when available) the diagnoser's
//! findings. Modeled on the lineage's `main.rs` pattern of a serde-derived
//! output enum (`Wut`) written with `serde_json::to_writer`; formatting
//! beyond that serialisable shape is presentational and outside this
//! module's contract (§4.9).

use serde::Serialize;

use crate::diagnose::DiagnosisReport;
use crate::error::CableRouteError;
use crate::planner::PlanResult;
use crate::point::PointKey;

#[derive(Serialize, Debug)]
pub struct SegmentReport {
	pub points_in_segment: usize,
	pub nodes_explored: usize,
}

#[derive(Serialize, Debug)]
pub struct SuccessReport {
	pub path: Vec<String>,
	pub point_count: usize,
	pub path_length: f64,
	pub euclidean_distance: f64,
	pub total_nodes_explored: usize,
	pub segments: Vec<SegmentReport>,
}

/// Build a success report from a completed plan.
///
/// `path_length` is the polyline's own total (sum of consecutive Euclidean
/// distances); `euclidean_distance` is the straight-line distance between
/// the overall source and destination, reported alongside it for context
/// (§2 C9: "path length, Euclidean distance").
pub fn success_report(plan: &PlanResult, src: &PointKey, dst: &PointKey, points: &crate::graph::TaggedGraph) -> SuccessReport {
	let euclidean_distance = match (points.point(src), points.point(dst)) {
		(Some(s), Some(d)) => s.distance(d),
		_ => 0.0,
	};
	SuccessReport {
		path: plan.path.iter().map(|k| k.to_string()).collect(),
		point_count: plan.path.len(),
		path_length: round3(plan.total_length),
		euclidean_distance: round3(euclidean_distance),
		total_nodes_explored: plan.segments.iter().map(|s| s.nodes_explored).sum(),
		segments: plan
			.segments
			.iter()
			.map(|s| SegmentReport {
				points_in_segment: s.points_in_segment,
				nodes_explored: s.nodes_explored,
			})
			.collect(),
	}
}

fn round3(v: f64) -> f64 {
	(v * 1000.0).round() / 1000.0
}

#[derive(Serialize, Debug)]
pub struct FailureReport {
	pub error_kind: String,
	pub detail: String,
	pub segment: Option<usize>,
	pub from: Option<String>,
	pub to: Option<String>,
	pub diagnosis: Option<DiagnosisReport>,
}

/// Build a failure report from a top-level error, attaching diagnoser
/// findings when the top-level API has already computed them (§4.8, §7).
pub fn failure_report(err: &CableRouteError, diagnosis: Option<DiagnosisReport>) -> FailureReport {
	let (error_kind, segment, from, to) = match err {
		CableRouteError::BadCoordinate { .. } => ("BadCoordinate".to_string(), None, None, None),
		CableRouteError::GraphMalformed { .. } => ("GraphMalformed".to_string(), None, None, None),
		CableRouteError::MappingMalformed { .. } => ("MappingMalformed".to_string(), None, None, None),
		CableRouteError::EndpointNotInGraph { key, .. } => ("EndpointNotInGraph".to_string(), None, Some(key.to_string()), None),
		CableRouteError::EndpointInForbiddenSystem { .. } => ("EndpointInForbiddenSystem".to_string(), None, None, None),
		CableRouteError::NoPath { segment, from, to } => ("NoPath".to_string(), Some(*segment), Some(from.to_string()), Some(to.to_string())),
		CableRouteError::UnknownEdge { .. } => ("UnknownEdge".to_string(), None, None, None),
	};
	FailureReport {
		error_kind,
		detail: err.to_string(),
		segment,
		from,
		to,
		diagnosis,
	}
}
