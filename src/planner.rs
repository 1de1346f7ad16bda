//! Segment Planner (C6) and Forward-Path Controller (C7).
//!
//! The planner sequences [`astar`] calls across an ordered waypoint list in
//! the shape of the lineage's `plow.rs` solvers (a driving loop around a
//! per-step search, with per-step metrics accumulated alongside the path).
//! The Forward-Path Controller is a scoped guard: it injects a tramo id
//! into the shared forbidden set for the duration of one segment's search
//! and removes it again on every exit path, mirroring the "tagged
//! scoped-acquisition" pattern the design notes (§9) call for in place of
//! the source's global mutable state.

use std::collections::HashSet;

use crate::adjacency::FilteredAdjacency;
use crate::astar::astar;
use crate::data::TramoTable;
use crate::error::CableRouteError;
use crate::graph::TaggedGraph;
use crate::point::PointKey;

/// Per-segment outcome metrics (§4.6, §4.9).
#[derive(Clone, Debug)]
pub struct SegmentMetrics {
	pub points_in_segment: usize,
	pub nodes_explored: usize,
}

/// The assembled result of a multi-waypoint plan.
#[derive(Clone, Debug)]
pub struct PlanResult {
	pub path: Vec<PointKey>,
	pub total_length: f64,
	pub segments: Vec<SegmentMetrics>,
}

/// A scoped, restoring injection of (at most) one tramo id into the shared
/// forbidden set. Injecting `None`, or an id already present, is a no-op on
/// both ends - this is what keeps the restoration invariant (§4.7, §8
/// property 5) exact even when ids overlap or a lookup comes back empty.
///
/// Derefs to the underlying set so a caller can feed `&guard` anywhere a
/// `&HashSet<i64>` is expected for the duration of the guard's scope; the
/// injected id (if any) is removed again on drop, covering every exit path
/// including an early `?`/`return` out of the scope.
struct ForbiddenGuard<'a> {
	forbidden: &'a mut HashSet<i64>,
	injected: Option<i64>,
}

impl<'a> ForbiddenGuard<'a> {
	fn inject(forbidden: &'a mut HashSet<i64>, id: Option<i64>) -> Self {
		let injected = match id {
			Some(id) if forbidden.insert(id) => Some(id),
			_ => None,
		};
		ForbiddenGuard { forbidden, injected }
	}
}

impl<'a> std::ops::Deref for ForbiddenGuard<'a> {
	type Target = HashSet<i64>;
	fn deref(&self) -> &HashSet<i64> {
		self.forbidden
	}
}

impl<'a> Drop for ForbiddenGuard<'a> {
	fn drop(&mut self) {
		if let Some(id) = self.injected.take() {
			self.forbidden.remove(&id);
		}
	}
}

/// Tramo id of the last edge of a just-completed segment path, if any.
///
/// A single-vertex segment path (consecutive waypoints canonicalising
/// equal) has no last edge and yields `None` - forward-path is then a
/// no-op on that boundary, per §4.7 and §8.
fn last_edge_tramo_id(tramo: &TramoTable, segment_path: &[PointKey]) -> Option<i64> {
	if segment_path.len() < 2 {
		return None;
	}
	let u = &segment_path[segment_path.len() - 2];
	let v = &segment_path[segment_path.len() - 1];
	let id = tramo.id_of_edge(u, v);
	if id.is_none() {
		log::warn!("forward-path: no registered tramo id for edge {} - {}, treating as no-op", u, v);
	}
	id
}

/// Sequence A* calls across `waypoints` (`w0..wm`, `m >= 1`), assembling the
/// final polyline and per-segment metrics (§4.6).
///
/// On any segment's `NoPath`, stops immediately, restores `forbidden` to
/// its contents on entry, and surfaces `NoPath{segment, from, to}`. Success
/// or failure, `forbidden`'s contents on return equal its contents on entry
/// (§4.7's restoration guarantee, tested in §8 property 5).
pub fn plan(
	graph: &TaggedGraph,
	adj: &FilteredAdjacency,
	tramo: &TramoTable,
	waypoints: &[PointKey],
	forbidden: &mut HashSet<i64>,
	forward_path: bool,
) -> Result<PlanResult, CableRouteError> {
	assert!(waypoints.len() >= 2, "waypoint sequence must have at least source and destination");

	let mut path: Vec<PointKey> = Vec::new();
	let mut total_length = 0.0;
	let mut segments = Vec::with_capacity(waypoints.len() - 1);
	let mut previous_segment_path: Option<Vec<PointKey>> = None;

	for i in 1..waypoints.len() {
		let from = &waypoints[i - 1];
		let to = &waypoints[i];

		let injected_id = if forward_path && i >= 2 {
			previous_segment_path.as_deref().and_then(|p| last_edge_tramo_id(tramo, p))
		} else {
			None
		};
		let guard = ForbiddenGuard::inject(forbidden, injected_id);
		let result = astar(graph, adj, tramo, from, to, &guard);
		drop(guard);

		let segment_result = match result {
			Ok(r) => r,
			Err(CableRouteError::NoPath { from, to, .. }) => {
				return Err(CableRouteError::NoPath { segment: i, from, to });
			}
			Err(other) => return Err(other),
		};

		segments.push(SegmentMetrics {
			points_in_segment: segment_result.path.len(),
			nodes_explored: segment_result.nodes_explored,
		});
		for w in segment_result.path.windows(2) {
			total_length += graph.point(&w[0]).unwrap().distance(graph.point(&w[1]).unwrap());
		}

		if path.is_empty() {
			path.extend(segment_result.path.iter().cloned());
		} else {
			path.extend(segment_result.path.iter().skip(1).cloned());
		}
		previous_segment_path = Some(segment_result.path);
	}

	Ok(PlanResult { path, total_length, segments })
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::data::load_tramo_file;
	use crate::graph::{RawEdge, Tag, TaggedGraph};
	use crate::point::canonicalise;
	use indexmap::IndexMap;
	use std::collections::HashMap as Map;

	/// S4: a path 0-1-2 on the x axis (all tagged A).
	fn s4_graph() -> (TaggedGraph, Vec<PointKey>, TramoTable) {
		let p0 = canonicalise(0.0, 0.0, 0.0).unwrap();
		let p1 = canonicalise(1.0, 0.0, 0.0).unwrap();
		let mut points = Map::new();
		let mut tags = Map::new();
		for p in [&p0, &p1] {
			points.insert(p.key.clone(), p.clone());
			tags.insert(p.key.clone(), Tag::A);
		}
		let g = TaggedGraph::build(
			points,
			tags,
			vec![RawEdge {
				from: p0.key.clone(),
				to: p1.key.clone(),
				tag: Tag::A,
			}],
		)
		.unwrap();
		let mut raw = IndexMap::new();
		raw.insert(format!("{}-{}", p0.key, p1.key), 1);
		let tramo = load_tramo_file(raw).unwrap();
		(g, vec![p0.key, p1.key], tramo)
	}

	#[test]
	fn s4_forward_path_blocks_immediate_uturn() {
		let (g, keys, tramo) = s4_graph();
		let permitted = [Tag::A].into_iter().collect();
		let adj = FilteredAdjacency::build(&g, &permitted);
		let waypoints = vec![keys[0].clone(), keys[1].clone(), keys[0].clone()];
		let mut forbidden = HashSet::new();
		let r = plan(&g, &adj, &tramo, &waypoints, &mut forbidden, true);
		match r {
			Err(CableRouteError::NoPath { segment, from, to }) => {
				assert_eq!(segment, 2);
				assert_eq!(from, keys[1]);
				assert_eq!(to, keys[0]);
			}
			other => panic!("expected NoPath at segment 2, got {:?}", other.map(|p| p.path)),
		}
		// property 5: forbidden set restored on the failure path too
		assert!(forbidden.is_empty());
	}

	#[test]
	fn forward_path_has_no_effect_on_segment_one() {
		let (g, keys, tramo) = s4_graph();
		let permitted = [Tag::A].into_iter().collect();
		let adj = FilteredAdjacency::build(&g, &permitted);
		let waypoints = vec![keys[0].clone(), keys[1].clone()];
		let mut forbidden = HashSet::new();
		let r = plan(&g, &adj, &tramo, &waypoints, &mut forbidden, true).unwrap();
		assert_eq!(r.path, waypoints);
		assert!(forbidden.is_empty());
	}

	#[test]
	fn waypoint_order_is_preserved() {
		// property 6: every waypoint appears, first occurrences strictly ordered.
		let p0 = canonicalise(0.0, 0.0, 0.0).unwrap();
		let p1 = canonicalise(1.0, 0.0, 0.0).unwrap();
		let p2 = canonicalise(2.0, 0.0, 0.0).unwrap();
		let mut points = Map::new();
		let mut tags = Map::new();
		for p in [&p0, &p1, &p2] {
			points.insert(p.key.clone(), p.clone());
			tags.insert(p.key.clone(), Tag::A);
		}
		let g = TaggedGraph::build(
			points,
			tags,
			vec![
				RawEdge { from: p0.key.clone(), to: p1.key.clone(), tag: Tag::A },
				RawEdge { from: p1.key.clone(), to: p2.key.clone(), tag: Tag::A },
			],
		)
		.unwrap();
		let tramo = load_tramo_file(IndexMap::new()).unwrap();
		let permitted = [Tag::A].into_iter().collect();
		let adj = FilteredAdjacency::build(&g, &permitted);
		let waypoints = vec![p0.key.clone(), p1.key.clone(), p2.key.clone()];
		let mut forbidden = HashSet::new();
		let r = plan(&g, &adj, &tramo, &waypoints, &mut forbidden, false).unwrap();
		let mut last_idx = None;
		for w in &waypoints {
			let idx = r.path.iter().position(|k| k == w).unwrap();
			if let Some(prev) = last_idx {
				assert!(idx > prev);
			}
			last_idx = Some(idx);
		}
	}
}
