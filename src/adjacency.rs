//! Filtered Adjacency Builder (spec component C4).
//!
//! Derives an access-restricted sub-adjacency from a [`TaggedGraph`] and a
//! permitted-tag set, per §4.4.

use std::collections::{HashMap, HashSet};

use crate::graph::{Tag, TaggedGraph};
use crate::point::PointKey;

/// A filtered adjacency view: vertex key -> `(neighbour key, edge weight)`.
///
/// Neighbour list ordering is unspecified; A* tie-breaking happens in the
/// open set, not here (§4.4).
pub struct FilteredAdjacency {
	adj: HashMap<PointKey, Vec<(PointKey, f64)>>,
}

impl FilteredAdjacency {
	/// Build the filtered view: drop edges whose tag is outside `permitted`,
	/// and edges with either endpoint tagged outside `permitted`.
	pub fn build(graph: &TaggedGraph, permitted: &HashSet<Tag>) -> FilteredAdjacency {
		let mut adj: HashMap<PointKey, Vec<(PointKey, f64)>> = HashMap::new();
		for u in graph.vertex_keys() {
			let u_tag = match graph.vertex_tag(u) {
				Some(t) if permitted.contains(&t) => t,
				_ => continue,
			};
			let _ = u_tag;
			for n in graph.neighbours_raw(u) {
				if !permitted.contains(&n.edge_tag) {
					continue;
				}
				let v_tag = match graph.vertex_tag(&n.neighbour) {
					Some(t) => t,
					None => continue,
				};
				if !permitted.contains(&v_tag) {
					continue;
				}
				adj.entry(u.clone()).or_default().push((n.neighbour.clone(), n.weight));
			}
		}
		FilteredAdjacency { adj }
	}

	/// Neighbours of `k` in this filtered view. Empty (not an error) for
	/// vertices with no surviving incident edge, or vertices not present at all.
	pub fn neighbours(&self, k: &PointKey) -> &[(PointKey, f64)] {
		self.adj.get(k).map(|v| v.as_slice()).unwrap_or(&[])
	}
}
