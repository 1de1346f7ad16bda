//! Endpoint Diagnoser (spec component C8).
//!
//! Given two coordinates and a pool of candidate graph files, reports
//! per-file endpoint presence/tag and derives feasible cable and graph
//! recommendations. Never attempts pathfinding itself (§4.8); invoked
//! automatically by the top-level API whenever it would otherwise surface
//! `EndpointNotInGraph` or `NoPath` (§4.8, §7).

use std::collections::HashSet;
use std::path::PathBuf;

use crate::cable::{compatible_cables, Cable};
use crate::data::read_graph_file;
use crate::graph::Tag;
use crate::point::{canonicalise, Point, PointKey};

/// Whether one endpoint is present in one candidate graph, and its tag if so.
#[derive(Clone, Debug, serde::Serialize)]
pub struct EndpointStatus {
	pub present: bool,
	pub tag: Option<Tag>,
}

/// Per-graph presence/tag findings for both endpoints.
#[derive(Clone, Debug, serde::Serialize)]
pub struct GraphFinding {
	pub graph_path: PathBuf,
	pub source: EndpointStatus,
	pub destination: EndpointStatus,
}

/// The diagnoser's overall conclusion.
#[derive(Clone, Debug, serde::Serialize)]
pub enum DiagnosisOutcome {
	/// At least one graph contains both endpoints with a non-empty cable recommendation.
	Recommend {
		recommended_cables: HashSet<Cable>,
		recommended_graphs: Vec<PathBuf>,
		suggested_command: String,
	},
	/// At least one candidate has both endpoints, but in mutually-exclusive
	/// subsystems (no cable class can reach both) in every such candidate.
	BothFoundButIncompatible { graphs_with_both: Vec<PathBuf> },
	/// Both endpoints exist somewhere in the pool, but never together in the
	/// same candidate graph.
	BothFoundNoCommonGraph,
	/// Only one of the two endpoints was found, in any candidate.
	OnlyOneEndpointFound { which_found: crate::error::Which },
	/// Neither endpoint was found in any candidate.
	NeitherEndpointFound,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct DiagnosisReport {
	pub findings: Vec<GraphFinding>,
	pub outcome: DiagnosisOutcome,
}

fn format_xyz(p: &Point) -> String {
	format!("{} {} {}", p.xyz.0, p.xyz.1, p.xyz.2)
}

/// Run the diagnosis procedure of §4.8 over `candidates`.
pub fn diagnose(src: (f64, f64, f64), dst: (f64, f64, f64), candidates: &[PathBuf]) -> Result<DiagnosisReport, crate::error::CableRouteError> {
	let src_pt = canonicalise(src.0, src.1, src.2)?;
	let dst_pt = canonicalise(dst.0, dst.1, dst.2)?;

	let mut findings = Vec::with_capacity(candidates.len());
	let mut any_src_found = false;
	let mut any_dst_found = false;
	let mut graphs_with_both: Vec<PathBuf> = Vec::new();
	let mut recommended_cables: HashSet<Cable> = HashSet::new();
	let mut recommended_graphs: Vec<PathBuf> = Vec::new();

	for candidate in candidates {
		let graph = match read_graph_file(candidate.as_path()) {
			Ok(g) => g,
			Err(e) => {
				log::warn!("diagnose: skipping unreadable candidate {}: {}", candidate.display(), e);
				continue;
			}
		};
		let src_tag = graph.vertex_tag(&src_pt.key);
		let dst_tag = graph.vertex_tag(&dst_pt.key);
		any_src_found |= src_tag.is_some();
		any_dst_found |= dst_tag.is_some();
		if let (Some(st), Some(dt)) = (src_tag, dst_tag) {
			graphs_with_both.push(candidate.clone());
			let inter: HashSet<Cable> = compatible_cables(st).intersection(&compatible_cables(dt)).copied().collect();
			if !inter.is_empty() {
				recommended_graphs.push(candidate.clone());
				recommended_cables.extend(inter);
			}
		}
		findings.push(GraphFinding {
			graph_path: candidate.clone(),
			source: EndpointStatus { present: src_tag.is_some(), tag: src_tag },
			destination: EndpointStatus { present: dst_tag.is_some(), tag: dst_tag },
		});
	}

	let outcome = if !recommended_graphs.is_empty() {
		let mut cables: Vec<Cable> = recommended_cables.iter().copied().collect();
		cables.sort_by_key(|c| c.to_string());
		let best_cable = cables[0];
		let best_graph = &recommended_graphs[0];
		let suggested_command = format!(
			"direct --cable {} {} {} {}",
			best_cable,
			best_graph.display(),
			format_xyz(&src_pt),
			format_xyz(&dst_pt)
		);
		DiagnosisOutcome::Recommend {
			recommended_cables,
			recommended_graphs,
			suggested_command,
		}
	} else if !graphs_with_both.is_empty() {
		DiagnosisOutcome::BothFoundButIncompatible { graphs_with_both }
	} else if any_src_found && any_dst_found {
		// found in disjoint graphs, no single candidate has both
		DiagnosisOutcome::BothFoundNoCommonGraph
	} else if any_src_found || any_dst_found {
		let which_found = if any_src_found { crate::error::Which::Source } else { crate::error::Which::Destination };
		DiagnosisOutcome::OnlyOneEndpointFound { which_found }
	} else {
		DiagnosisOutcome::NeitherEndpointFound
	};

	Ok(DiagnosisReport { findings, outcome })
}

#[cfg(test)]
mod test {
	use super::*;
	use std::io::Write;

	fn write_graph(dir: &std::path::Path, name: &str, json: &str) -> PathBuf {
		let path = dir.join(name);
		let mut f = std::fs::File::create(&path).unwrap();
		f.write_all(json.as_bytes()).unwrap();
		path
	}

	/// S5: G1 has src only (A), G2 has both (src A, dst B) -> recommend G2/cable C.
	#[test]
	fn s5_diagnose_two_graphs() {
		let dir = tempdir();
		let g1 = write_graph(
			&dir,
			"g1.json",
			r#"{"nodes":{"(0.000, 0.000, 0.000)":{"sys":"A"}},"edges":[]}"#,
		);
		let g2 = write_graph(
			&dir,
			"g2.json",
			r#"{"nodes":{"(0.000, 0.000, 0.000)":{"sys":"A"},"(3.000, 0.000, 0.000)":{"sys":"B"}},"edges":[]}"#,
		);
		let report = diagnose((0.0, 0.0, 0.0), (3.0, 0.0, 0.0), &[g1, g2]).unwrap();
		match report.outcome {
			DiagnosisOutcome::Recommend {
				recommended_cables,
				recommended_graphs,
				..
			} => {
				assert!(recommended_cables.contains(&Cable::C));
				assert_eq!(recommended_graphs.len(), 1);
			}
			other => panic!("expected Recommend, got {:?}", other),
		}
	}

	#[test]
	fn neither_endpoint_found() {
		let dir = tempdir();
		let g1 = write_graph(&dir, "g1.json", r#"{"nodes":{"(9.000, 9.000, 9.000)":{"sys":"A"}},"edges":[]}"#);
		let report = diagnose((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), &[g1]).unwrap();
		assert!(matches!(report.outcome, DiagnosisOutcome::NeitherEndpointFound));
	}

	fn tempdir() -> PathBuf {
		let dir = std::env::temp_dir().join(format!("cableroute-test-{:?}", std::thread::current().id()));
		std::fs::create_dir_all(&dir).unwrap();
		dir
	}
}
