//! Tagged Graph Store (spec component C2).
//!
//! Holds the immutable vertex-tag table and the raw (unfiltered) edge list
//! of a loaded cable-routing graph. Generalised from the lineage's generic
//! `Graph<NId, N, E>` into a graph with exactly the shape this domain needs:
//! every vertex and every edge carries one of two subsystem tags, and edges
//! are weighted by Euclidean distance between their canonicalised endpoints.

use std::collections::HashMap;

use crate::point::{Point, PointKey};

/// Subsystem tag, drawn from the closed set {A, B} (§3).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize)]
pub enum Tag {
	A,
	B,
}

impl Tag {
	pub fn as_char(self) -> char {
		match self {
			Tag::A => 'A',
			Tag::B => 'B',
		}
	}

	pub fn parse(s: &str) -> Option<Tag> {
		match s {
			"A" => Some(Tag::A),
			"B" => Some(Tag::B),
			_ => None,
		}
	}
}

impl std::fmt::Display for Tag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Tag::A => "A",
			Tag::B => "B",
		})
	}
}

/// One raw (unfiltered) incident edge: the neighbour, the edge's own tag,
/// and its Euclidean weight.
#[derive(Clone, Debug)]
pub struct RawNeighbour {
	pub neighbour: PointKey,
	pub edge_tag: Tag,
	pub weight: f64,
}

/// An immutable, loaded cable-routing graph: every vertex's tag, and the
/// unfiltered adjacency of every edge.
#[derive(Debug)]
pub struct TaggedGraph {
	points: HashMap<PointKey, Point>,
	vertex_tag: HashMap<PointKey, Tag>,
	adjacency: HashMap<PointKey, Vec<RawNeighbour>>,
	edge_tag: HashMap<(PointKey, PointKey), Tag>,
}

/// One edge as supplied at construction time, before validation.
pub struct RawEdge {
	pub from: PointKey,
	pub to: PointKey,
	pub tag: Tag,
}

impl TaggedGraph {
	/// Construct a graph from a vertex-tag table and an edge list,
	/// validating §6.1's semantic constraints.
	///
	/// Returns `Err(detail)` naming the offending element on:
	/// - an edge endpoint absent from `points`,
	/// - a self-loop,
	/// - a duplicate unordered edge.
	///
	/// Callers wrap this in `CableRouteError::GraphMalformed`.
	pub fn build(points: HashMap<PointKey, Point>, vertex_tag: HashMap<PointKey, Tag>, edges: Vec<RawEdge>) -> Result<TaggedGraph, String> {
		let mut adjacency: HashMap<PointKey, Vec<RawNeighbour>> = HashMap::new();
		let mut edge_tag = HashMap::new();
		let mut seen_unordered: std::collections::HashSet<(PointKey, PointKey)> = std::collections::HashSet::new();
		for e in edges {
			if !points.contains_key(&e.from) {
				return Err(format!("edge references unknown vertex: {}", e.from));
			}
			if !points.contains_key(&e.to) {
				return Err(format!("edge references unknown vertex: {}", e.to));
			}
			if e.from == e.to {
				return Err(format!("self-loop edge at {}", e.from));
			}
			let ukey = if e.from <= e.to {
				(e.from.clone(), e.to.clone())
			} else {
				(e.to.clone(), e.from.clone())
			};
			if !seen_unordered.insert(ukey.clone()) {
				return Err(format!("duplicate edge between {} and {}", ukey.0, ukey.1));
			}
			let from_pt = points.get(&e.from).unwrap();
			let to_pt = points.get(&e.to).unwrap();
			let weight = from_pt.distance(to_pt);
			adjacency.entry(e.from.clone()).or_default().push(RawNeighbour {
				neighbour: e.to.clone(),
				edge_tag: e.tag,
				weight,
			});
			adjacency.entry(e.to.clone()).or_default().push(RawNeighbour {
				neighbour: e.from.clone(),
				edge_tag: e.tag,
				weight,
			});
			edge_tag.insert(ukey, e.tag);
		}
		for k in points.keys() {
			if !vertex_tag.contains_key(k) {
				return Err(format!("vertex missing tag: {}", k));
			}
		}
		Ok(TaggedGraph {
			points,
			vertex_tag,
			adjacency,
			edge_tag,
		})
	}

	/// `true` iff `k` is present as a vertex.
	pub fn contains_vertex(&self, k: &PointKey) -> bool {
		self.points.contains_key(k)
	}

	pub fn point(&self, k: &PointKey) -> Option<&Point> {
		self.points.get(k)
	}

	/// Tag of a vertex, or `None` if the key is absent.
	pub fn vertex_tag(&self, k: &PointKey) -> Option<Tag> {
		self.vertex_tag.get(k).copied()
	}

	/// All edges incident to `k`, unfiltered. Empty for orphan/unknown vertices.
	pub fn neighbours_raw(&self, k: &PointKey) -> &[RawNeighbour] {
		self.adjacency.get(k).map(|v| v.as_slice()).unwrap_or(&[])
	}

	/// Tag of the (unordered) edge between `u` and `v`, or `None` if no such edge exists.
	pub fn edge_tag(&self, u: &PointKey, v: &PointKey) -> Option<Tag> {
		let key = if u <= v { (u.clone(), v.clone()) } else { (v.clone(), u.clone()) };
		self.edge_tag.get(&key).copied()
	}

	pub fn vertex_count(&self) -> usize {
		self.points.len()
	}

	pub fn vertex_keys(&self) -> impl Iterator<Item = &PointKey> {
		self.points.keys()
	}
}
