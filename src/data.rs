//! Wire-format data types and loaders for tagged-graph and tramo-id files.
//!
//! Mirrors the lineage's split between `data.rs` (serde DTOs matching an
//! external JSON shape) and the internal engine (`graph.rs`): this module
//! never runs the search, it only parses files and converts them at the
//! boundary into [`TaggedGraph`] / [`TramoTable`].

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CableRouteError;
use crate::graph::{RawEdge, Tag, TaggedGraph};
use crate::point::{canonicalise, parse as parse_key, PointKey};

/// §6.1 `nodes` entry: `{ "sys": "A" | "B", ...ignored }`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NodeEntry {
	pub sys: String,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

/// §6.1 `edges` entry: `{ "from": key, "to": key, "sys": "A"|"B", ...ignored }`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EdgeEntry {
	pub from: String,
	pub to: String,
	pub sys: String,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The top-level §6.1 tagged graph file.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GraphFile {
	pub nodes: IndexMap<String, NodeEntry>,
	pub edges: Vec<EdgeEntry>,
}

/// Load and validate a §6.1 tagged graph file into the internal
/// [`TaggedGraph`], raising `GraphMalformed` on any violation.
pub fn load_graph_file(file: GraphFile) -> Result<TaggedGraph, CableRouteError> {
	let malformed = |detail: String| CableRouteError::GraphMalformed { detail };

	let mut points = HashMap::new();
	let mut vertex_tag = HashMap::new();
	for (key_str, entry) in &file.nodes {
		let (x, y, z) = parse_key(key_str).map_err(|e| malformed(format!("node {} has a malformed key: {}", key_str, e)))?;
		let point = canonicalise(x, y, z).map_err(|e| malformed(format!("node {} has a malformed key: {}", key_str, e)))?;
		let tag = Tag::parse(&entry.sys).ok_or_else(|| malformed(format!("node {} has invalid sys tag {:?}", key_str, entry.sys)))?;
		if point.key.as_str() != key_str.as_str() {
			return Err(malformed(format!("node key {:?} is not in canonical form", key_str)));
		}
		vertex_tag.insert(point.key.clone(), tag);
		points.insert(point.key.clone(), point);
	}

	let mut edges = Vec::with_capacity(file.edges.len());
	for e in &file.edges {
		let from_xyz = parse_key(&e.from).map_err(|err| malformed(format!("edge references a malformed key {:?}: {}", e.from, err)))?;
		let to_xyz = parse_key(&e.to).map_err(|err| malformed(format!("edge references a malformed key {:?}: {}", e.to, err)))?;
		let from = canonicalise(from_xyz.0, from_xyz.1, from_xyz.2)
			.map_err(|err| malformed(format!("edge references a malformed key {:?}: {}", e.from, err)))?
			.key;
		let to = canonicalise(to_xyz.0, to_xyz.1, to_xyz.2)
			.map_err(|err| malformed(format!("edge references a malformed key {:?}: {}", e.to, err)))?
			.key;
		let tag = Tag::parse(&e.sys).ok_or_else(|| malformed(format!("edge {}-{} has invalid sys tag {:?}", e.from, e.to, e.sys)))?;
		edges.push(RawEdge { from, to, tag });
	}

	TaggedGraph::build(points, vertex_tag, edges).map_err(|detail| malformed(detail))
}

/// Read a §6.1 tagged graph file from disk.
pub fn read_graph_file(path: &std::path::Path) -> Result<TaggedGraph, CableRouteError> {
	let f = std::fs::File::open(path).map_err(|e| CableRouteError::GraphMalformed {
		detail: format!("cannot open {}: {}", path.display(), e),
	})?;
	let file: GraphFile = serde_json::from_reader(f).map_err(|e| CableRouteError::GraphMalformed {
		detail: format!("{}: {}", path.display(), e),
	})?;
	load_graph_file(file)
}

/// §6.2 bidirectional tramo-id table: `id -> {u,v}` and `key(u,v) -> id`.
///
/// `key(u,v)` is the two canonical point keys joined by `"-"`, taken in
/// lexicographic order so `key(u,v) == key(v,u)`.
#[derive(Debug, Default)]
pub struct TramoTable {
	by_id: IndexMap<i64, (PointKey, PointKey)>,
	by_key: HashMap<String, i64>,
}

/// Join two canonical keys into one combined tramo key, lexicographically
/// ordered so `combined_key(u,v) == combined_key(v,u)`.
///
/// Keys are joined with `"-"`, but a canonical key can itself contain a `-`
/// for negative coordinates (`"(-1.000, ...)"`), so the boundary between the
/// two joined keys can't be recovered by splitting on the first `-`.
/// Canonical keys are always parenthesised with no internal parens, so the
/// literal substring `")-("` only ever occurs at that boundary; `split_combined_key` below relies on it.
fn combined_key(u: &PointKey, v: &PointKey) -> String {
	if u <= v {
		format!("{}-{}", u, v)
	} else {
		format!("{}-{}", v, u)
	}
}

/// Invert [`combined_key`] by splitting on the unambiguous `")-("` boundary.
fn split_combined_key(combo: &str) -> Option<(&str, &str)> {
	let idx = combo.find(")-(")?;
	let split_at = idx + 1;
	Some((&combo[..split_at], &combo[split_at + 1..]))
}

impl TramoTable {
	/// The tramo id of the unordered edge `{u,v}`, if registered.
	pub fn id_of_edge(&self, u: &PointKey, v: &PointKey) -> Option<i64> {
		self.by_key.get(&combined_key(u, v)).copied()
	}

	/// The unordered edge `{u,v}` a tramo id refers to, if registered.
	pub fn edge_of_id(&self, id: i64) -> Option<&(PointKey, PointKey)> {
		self.by_id.get(&id)
	}
}

/// Load a §6.2 tramo-id map file: JSON object `"keyU-keyV" -> id`.
///
/// Keys violating the `keyU <= keyV` ordering convention are canonicalised
/// by swapping; a duplicate id, or a duplicate `(u,v)` pair after
/// canonicalisation, is `MappingMalformed`.
pub fn load_tramo_file(raw: IndexMap<String, i64>) -> Result<TramoTable, CableRouteError> {
	let malformed = |detail: String| CableRouteError::MappingMalformed { detail };
	let mut by_id = IndexMap::new();
	let mut by_key = HashMap::new();
	for (combo, id) in raw {
		let (u_str, v_str) = split_combined_key(&combo).ok_or_else(|| malformed(format!("malformed tramo key: {:?}", combo)))?;
		if id <= 0 {
			return Err(malformed(format!("tramo id must be positive: {}", id)));
		}
		let (ux, uy, uz) = parse_key(u_str).map_err(|e| malformed(format!("tramo key {:?} is malformed: {}", combo, e)))?;
		let (vx, vy, vz) = parse_key(v_str).map_err(|e| malformed(format!("tramo key {:?} is malformed: {}", combo, e)))?;
		let u = canonicalise(ux, uy, uz).map_err(|e| malformed(format!("tramo key {:?} is malformed: {}", combo, e)))?.key;
		let v = canonicalise(vx, vy, vz).map_err(|e| malformed(format!("tramo key {:?} is malformed: {}", combo, e)))?.key;
		let canon = combined_key(&u, &v);
		if by_id.insert(id, if u <= v { (u.clone(), v.clone()) } else { (v.clone(), u.clone()) }).is_some() {
			return Err(malformed(format!("duplicate tramo id: {}", id)));
		}
		if by_key.insert(canon.clone(), id).is_some() {
			return Err(malformed(format!("duplicate tramo mapping for edge: {}", canon)));
		}
	}
	Ok(TramoTable { by_id, by_key })
}

/// Read a §6.2 tramo-id map file from disk.
pub fn read_tramo_file(path: &std::path::Path) -> Result<TramoTable, CableRouteError> {
	let f = std::fs::File::open(path).map_err(|e| CableRouteError::MappingMalformed {
		detail: format!("cannot open {}: {}", path.display(), e),
	})?;
	let raw: IndexMap<String, i64> = serde_json::from_reader(f).map_err(|e| CableRouteError::MappingMalformed {
		detail: format!("{}: {}", path.display(), e),
	})?;
	load_tramo_file(raw)
}

#[cfg(test)]
mod test {
	use super::*;

	fn sample_graph_file() -> GraphFile {
		let mut nodes = IndexMap::new();
		nodes.insert("(0.000, 0.000, 0.000)".to_string(), NodeEntry { sys: "A".into(), extra: Default::default() });
		nodes.insert("(1.000, 0.000, 0.000)".to_string(), NodeEntry { sys: "A".into(), extra: Default::default() });
		GraphFile {
			nodes,
			edges: vec![EdgeEntry {
				from: "(0.000, 0.000, 0.000)".to_string(),
				to: "(1.000, 0.000, 0.000)".to_string(),
				sys: "A".to_string(),
				extra: Default::default(),
			}],
		}
	}

	#[test]
	fn loads_valid_graph_file() {
		let g = load_graph_file(sample_graph_file()).unwrap();
		assert_eq!(g.vertex_count(), 2);
	}

	#[test]
	fn rejects_dangling_edge() {
		let mut file = sample_graph_file();
		file.edges[0].to = "(9.000, 9.000, 9.000)".to_string();
		assert!(load_graph_file(file).is_err());
	}

	#[test]
	fn malformed_node_key_is_graph_malformed_not_bad_coordinate() {
		let mut file = sample_graph_file();
		let bad_key = "not-a-key".to_string();
		let entry = file.nodes.shift_remove("(0.000, 0.000, 0.000)").unwrap();
		file.nodes.insert(bad_key, entry);
		match load_graph_file(file) {
			Err(CableRouteError::GraphMalformed { .. }) => {}
			other => panic!("expected GraphMalformed, got {:?}", other),
		}
	}

	#[test]
	fn malformed_edge_key_is_graph_malformed_not_bad_coordinate() {
		let mut file = sample_graph_file();
		file.edges[0].to = "not-a-key".to_string();
		match load_graph_file(file) {
			Err(CableRouteError::GraphMalformed { .. }) => {}
			other => panic!("expected GraphMalformed, got {:?}", other),
		}
	}

	#[test]
	fn tramo_table_round_trips() {
		let mut raw = IndexMap::new();
		raw.insert("(0.000, 0.000, 0.000)-(1.000, 0.000, 0.000)".to_string(), 1);
		let table = load_tramo_file(raw).unwrap();
		let u = canonicalise(0.0, 0.0, 0.0).unwrap().key;
		let v = canonicalise(1.0, 0.0, 0.0).unwrap().key;
		assert_eq!(table.id_of_edge(&u, &v), Some(1));
		assert_eq!(table.id_of_edge(&v, &u), Some(1));
		assert_eq!(table.edge_of_id(1), Some(&(u, v)));
	}

	#[test]
	fn tramo_table_survives_negative_coordinates() {
		// the combined key's own '-' separator must not be confused with a
		// '-' inside a negative coordinate component
		let mut raw = IndexMap::new();
		raw.insert("(-1.000, 0.000, 0.000)-(1.000, 0.000, 0.000)".to_string(), 1);
		let table = load_tramo_file(raw).unwrap();
		let u = canonicalise(-1.0, 0.0, 0.0).unwrap().key;
		let v = canonicalise(1.0, 0.0, 0.0).unwrap().key;
		assert_eq!(table.id_of_edge(&u, &v), Some(1));
	}

	#[test]
	fn tramo_table_malformed_key_is_mapping_malformed_not_bad_coordinate() {
		let mut raw = IndexMap::new();
		raw.insert("(0.000, 0.000, 0.000)-(not-a-point)".to_string(), 1);
		match load_tramo_file(raw) {
			Err(CableRouteError::MappingMalformed { .. }) => {}
			other => panic!("expected MappingMalformed, got {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn tramo_table_rejects_duplicate_id() {
		let mut raw = IndexMap::new();
		raw.insert("(0.000, 0.000, 0.000)-(1.000, 0.000, 0.000)".to_string(), 1);
		raw.insert("(0.000, 0.000, 0.000)-(2.000, 0.000, 0.000)".to_string(), 1);
		assert!(load_tramo_file(raw).is_err());
	}
}
