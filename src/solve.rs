//! Top-level call orchestration (§2 data flow): cable policy resolves the
//! access set, the graph loads once, the filtered adjacency derives from
//! it, the Segment Planner drives the A* engine across waypoints, and on
//! any C3-C5 failure the Endpoint Diagnoser annotates the error before the
//! Result Reporter renders the outcome.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::adjacency::FilteredAdjacency;
use crate::cable::{validate_endpoint, Cable};
use crate::data::{read_graph_file, read_tramo_file, TramoTable};
use crate::diagnose::diagnose;
use crate::error::{CableRouteError, Which};
use crate::planner::plan;
use crate::point::canonicalise;
use crate::report::{failure_report, success_report, FailureReport, SuccessReport};

pub enum SolveOutcome {
	Success(SuccessReport),
	Failure(FailureReport),
}

/// One top-level call's inputs: a graph file, an optional tramo-id map (no
/// map means forward-path can still run, it will just warn and no-op every
/// time it can't find an id), an ordered waypoint list `[src, ppo.., dst]`,
/// a cable class, the forward-path flag, and the pool of candidate graphs
/// the diagnoser falls back to on failure.
pub struct SolveRequest {
	pub graph_path: PathBuf,
	pub tramo_path: Option<PathBuf>,
	pub waypoints_xyz: Vec<(f64, f64, f64)>,
	pub cable: Cable,
	pub forward_path: bool,
	pub diagnose_pool: Vec<PathBuf>,
}

/// Run one top-level call end to end. Never panics on bad input data; a
/// `EndpointNotInGraph`/`EndpointInForbiddenSystem`/`NoPath` failure is
/// annotated with `diagnose`'s findings (§4.8, §7); a `BadCoordinate`,
/// `GraphMalformed`, or `MappingMalformed` failure is not, since it
/// originates in loading (C1/C2), not in the cable policy or search
/// (C3/C5) the diagnoser is scoped to. A failed call leaves nothing
/// behind: the graph store this call loaded is local to it and is simply
/// dropped.
pub fn solve(req: &SolveRequest) -> SolveOutcome {
	match solve_inner(req) {
		Ok(report) => SolveOutcome::Success(report),
		Err(err) => {
			// C8 is only ever invoked on a C3/C5-originated failure (§2, §7); a
			// malformed-file or bad-coordinate failure from loading (C1/C2) would
			// just have `diagnose` re-read the same unreadable pool.
			let diagnosable = matches!(
				err,
				CableRouteError::EndpointNotInGraph { .. } | CableRouteError::EndpointInForbiddenSystem { .. } | CableRouteError::NoPath { .. }
			);
			let diagnosis = if diagnosable {
				let pool: Vec<PathBuf> = if req.diagnose_pool.is_empty() {
					vec![req.graph_path.clone()]
				} else {
					req.diagnose_pool.clone()
				};
				let src = req.waypoints_xyz[0];
				let dst = *req.waypoints_xyz.last().unwrap();
				diagnose(src, dst, &pool).ok()
			} else {
				None
			};
			SolveOutcome::Failure(failure_report(&err, diagnosis))
		}
	}
}

fn solve_inner(req: &SolveRequest) -> Result<SuccessReport, CableRouteError> {
	assert!(req.waypoints_xyz.len() >= 2, "need at least a source and a destination");

	let graph = read_graph_file(&req.graph_path)?;
	let tramo = match &req.tramo_path {
		Some(p) => read_tramo_file(p)?,
		None => TramoTable::default(),
	};
	let permitted = req.cable.permitted();

	let last = req.waypoints_xyz.len() - 1;
	let mut waypoint_keys = Vec::with_capacity(req.waypoints_xyz.len());
	for (i, (x, y, z)) in req.waypoints_xyz.iter().enumerate() {
		let point = canonicalise(*x, *y, *z)?;
		let which = if i == 0 {
			Which::Source
		} else if i == last {
			Which::Destination
		} else {
			Which::Waypoint(i)
		};
		validate_endpoint(&graph, &point.key, which, req.cable)?;
		waypoint_keys.push(point.key);
	}

	let adj = FilteredAdjacency::build(&graph, &permitted);
	let mut forbidden: HashSet<i64> = HashSet::new();
	let plan_result = plan(&graph, &adj, &tramo, &waypoint_keys, &mut forbidden, req.forward_path)?;
	debug_assert!(forbidden.is_empty(), "forbidden set must be restored to its entry contents");

	Ok(success_report(&plan_result, &waypoint_keys[0], waypoint_keys.last().unwrap(), &graph))
}

#[cfg(test)]
mod test {
	use super::*;
	use std::io::Write;

	fn write_file(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
		let path = dir.join(name);
		let mut f = std::fs::File::create(&path).unwrap();
		f.write_all(content.as_bytes()).unwrap();
		path
	}

	fn tempdir(tag: &str) -> PathBuf {
		let dir = std::env::temp_dir().join(format!("cableroute-solve-test-{}", tag));
		std::fs::create_dir_all(&dir).unwrap();
		dir
	}

	/// S1/S2/S3: a 4-node line, (0,0,0)-(1,0,0)-(2,0,0) tagged A, (2,0,0)-(3,0,0) tagged B.
	fn s123_graph(dir: &std::path::Path) -> PathBuf {
		write_file(
			dir,
			"s123.json",
			r#"{
				"nodes": {
					"(0.000, 0.000, 0.000)": {"sys": "A"},
					"(1.000, 0.000, 0.000)": {"sys": "A"},
					"(2.000, 0.000, 0.000)": {"sys": "A"},
					"(3.000, 0.000, 0.000)": {"sys": "B"}
				},
				"edges": [
					{"from": "(0.000, 0.000, 0.000)", "to": "(1.000, 0.000, 0.000)", "sys": "A"},
					{"from": "(1.000, 0.000, 0.000)", "to": "(2.000, 0.000, 0.000)", "sys": "A"},
					{"from": "(2.000, 0.000, 0.000)", "to": "(3.000, 0.000, 0.000)", "sys": "B"}
				]
			}"#,
		)
	}

	#[test]
	fn s1_direct_intra_a() {
		let dir = tempdir("s1");
		let g = s123_graph(&dir);
		let req = SolveRequest {
			graph_path: g.clone(),
			tramo_path: None,
			waypoints_xyz: vec![(0.0, 0.0, 0.0), (2.0, 0.0, 0.0)],
			cable: Cable::A,
			forward_path: false,
			diagnose_pool: vec![g],
		};
		match solve(&req) {
			SolveOutcome::Success(r) => {
				assert_eq!(r.point_count, 3);
				assert_eq!(r.path_length, 2.0);
				assert_eq!(r.total_nodes_explored, 2);
			}
			SolveOutcome::Failure(f) => panic!("expected success, got {:?}", f),
		}
	}

	#[test]
	fn s2_cross_system_blocked() {
		let dir = tempdir("s2");
		let g = s123_graph(&dir);
		let req = SolveRequest {
			graph_path: g.clone(),
			tramo_path: None,
			waypoints_xyz: vec![(0.0, 0.0, 0.0), (3.0, 0.0, 0.0)],
			cable: Cable::A,
			forward_path: false,
			diagnose_pool: vec![g],
		};
		match solve(&req) {
			SolveOutcome::Failure(f) => {
				assert_eq!(f.error_kind, "EndpointInForbiddenSystem");
				let diag = f.diagnosis.expect("diagnosis attached");
				if let crate::diagnose::DiagnosisOutcome::Recommend { recommended_cables, .. } = diag.outcome {
					assert!(recommended_cables.contains(&Cable::C));
				} else {
					panic!("expected a recommendation");
				}
			}
			SolveOutcome::Success(r) => panic!("expected failure, got {:?}", r),
		}
	}

	#[test]
	fn s3_cross_system_via_cable_c() {
		let dir = tempdir("s3");
		let g = s123_graph(&dir);
		let req = SolveRequest {
			graph_path: g.clone(),
			tramo_path: None,
			waypoints_xyz: vec![(0.0, 0.0, 0.0), (3.0, 0.0, 0.0)],
			cable: Cable::C,
			forward_path: false,
			diagnose_pool: vec![g],
		};
		match solve(&req) {
			SolveOutcome::Success(r) => {
				assert_eq!(r.point_count, 4);
				assert_eq!(r.path_length, 3.0);
			}
			SolveOutcome::Failure(f) => panic!("expected success, got {:?}", f),
		}
	}

	#[test]
	fn malformed_graph_file_does_not_invoke_diagnoser() {
		let dir = tempdir("malformed");
		let g = write_file(
			&dir,
			"malformed.json",
			r#"{"nodes": {}, "edges": [{"from": "(0.000, 0.000, 0.000)", "to": "(1.000, 0.000, 0.000)", "sys": "A"}]}"#,
		);
		let req = SolveRequest {
			graph_path: g.clone(),
			tramo_path: None,
			waypoints_xyz: vec![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)],
			cable: Cable::A,
			forward_path: false,
			diagnose_pool: vec![g],
		};
		match solve(&req) {
			SolveOutcome::Failure(f) => {
				assert_eq!(f.error_kind, "GraphMalformed");
				assert!(f.diagnosis.is_none(), "diagnoser must not run on a C1/C2 loading failure");
			}
			SolveOutcome::Success(r) => panic!("expected failure, got {:?}", r),
		}
	}
}
