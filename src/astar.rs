//! Constrained A* Engine (spec component C5).
//!
//! Adapted from the lineage's `graph.rs::pathfind` (heap-optimised Dijkstra,
//! using `priority_queue::PriorityQueue` exactly the way it does) but
//! generalised to A* with a consistent Euclidean heuristic, and to skip any
//! edge whose tramo id is in the caller-supplied forbidden set.

use std::collections::{HashMap, HashSet};

use noisy_float::prelude::{n64, N64};
use priority_queue::PriorityQueue;

use crate::adjacency::FilteredAdjacency;
use crate::data::TramoTable;
use crate::error::CableRouteError;
use crate::graph::TaggedGraph;
use crate::point::PointKey;

pub struct AstarResult {
	pub path: Vec<PointKey>,
	pub nodes_explored: usize,
}

/// Shortest-path search on a filtered adjacency with a forbidden-edge predicate (§4.5).
///
/// Heuristic is Euclidean distance to `dst`, which is consistent, so the
/// first pop of `dst` is already optimal - no re-opening required.
///
/// Open-set ties are broken by smaller f, then smaller g, then FIFO
/// insertion order, via a single composite priority tuple
/// `(-f, -g, -insertion_seq)` fed to a max-priority queue (the same
/// negate-for-max-heap trick the lineage's Dijkstra uses).
///
/// `src`/`dst` are assumed already validated present in `graph` by the
/// caller (§4.5: `EndpointNotInGraph` is pre-checked, not raised here). The
/// `segment` field of a returned `NoPath` is always `0`; the Segment
/// Planner fills in the true segment index.
pub fn astar(
	graph: &TaggedGraph,
	adj: &FilteredAdjacency,
	tramo: &TramoTable,
	src: &PointKey,
	dst: &PointKey,
	forbidden: &HashSet<i64>,
) -> Result<AstarResult, CableRouteError> {
	if src == dst {
		return Ok(AstarResult {
			path: vec![src.clone()],
			nodes_explored: 0,
		});
	}

	let heuristic = |k: &PointKey| -> f64 {
		match (graph.point(k), graph.point(dst)) {
			(Some(p), Some(d)) => p.distance(d),
			_ => 0.0,
		}
	};

	let mut g_score: HashMap<PointKey, f64> = HashMap::new();
	let mut came_from: HashMap<PointKey, PointKey> = HashMap::new();
	let mut closed: HashSet<PointKey> = HashSet::new();
	let mut open: PriorityQueue<PointKey, (N64, N64, i64)> = PriorityQueue::new();
	let mut seq: i64 = 0;

	g_score.insert(src.clone(), 0.0);
	open.push(src.clone(), (n64(-heuristic(src)), n64(0.0), 0));

	let mut nodes_explored = 0usize;
	while let Some((u, _)) = open.pop() {
		if closed.contains(&u) {
			continue;
		}
		if u == *dst {
			let mut path = vec![u.clone()];
			let mut cur = u;
			while let Some(prev) = came_from.get(&cur) {
				path.push(prev.clone());
				cur = prev.clone();
			}
			path.reverse();
			return Ok(AstarResult { path, nodes_explored });
		}
		closed.insert(u.clone());
		nodes_explored += 1;
		let gu = *g_score.get(&u).unwrap();
		for (v, w) in adj.neighbours(&u) {
			if closed.contains(v) {
				continue;
			}
			if let Some(id) = tramo.id_of_edge(&u, v) {
				if forbidden.contains(&id) {
					continue;
				}
			}
			let tentative = gu + w;
			let improves = match g_score.get(v) {
				Some(&g) => tentative < g,
				None => true,
			};
			if improves {
				g_score.insert(v.clone(), tentative);
				came_from.insert(v.clone(), u.clone());
				seq += 1;
				let f = tentative + heuristic(v);
				open.push(v.clone(), (n64(-f), n64(-tentative), -seq));
			}
		}
	}
	Err(CableRouteError::NoPath {
		segment: 0,
		from: src.clone(),
		to: dst.clone(),
	})
}
