//! Constrained shortest paths over a dual-system cable-routing graph.
//!
//! CLI front end: five subcommands (`direct`, `ppo`, `multi_ppo`,
//! `forward_path`, `diagnose`) wired with `clap` in the lineage's own
//! `App`/`SubCommand`/`Arg` style (see the `.subcommand_matches(...)`
//! dispatch below). All solving logic lives in the library modules; this
//! file only parses arguments, calls `solve::solve`, and prints the result.

use std::path::PathBuf;

use clap::{crate_version, App, Arg, SubCommand};

mod adjacency;
mod astar;
mod cable;
mod data;
mod diagnose;
mod error;
mod graph;
mod planner;
mod point;
mod report;
mod solve;

use cable::Cable;
use solve::{solve, SolveOutcome, SolveRequest};

fn cable_arg() -> Arg<'static, 'static> {
	Arg::with_name("cable")
		.long("cable")
		.takes_value(true)
		.required(true)
		.possible_values(&["A", "B", "C"])
		.help("Cable class restricting which subsystems may be traversed")
}

fn tramo_arg() -> Arg<'static, 'static> {
	Arg::with_name("tramo").long("tramo").takes_value(true).help("Tramo-id map JSON (§6.2); omit if forward_path isn't needed")
}

fn coords_arg(min: u64) -> Arg<'static, 'static> {
	Arg::with_name("coords")
		.takes_value(true)
		.multiple(true)
		.required(true)
		.min_values(min)
		.allow_hyphen_values(true)
		.help("Coordinates grouped in (x y z) triples")
}

/// Group a flat coordinate list into `(x,y,z)` triples; fails if the count
/// isn't a multiple of 3.
fn parse_triples(values: Vec<&str>) -> Result<Vec<(f64, f64, f64)>, String> {
	if values.len() % 3 != 0 {
		return Err(format!("expected a multiple of 3 coordinate numbers, got {}", values.len()));
	}
	let parse_one = |s: &str| s.parse::<f64>().map_err(|e| format!("bad coordinate {:?}: {}", s, e));
	values.chunks(3).map(|c| Ok((parse_one(c[0])?, parse_one(c[1])?, parse_one(c[2])?))).collect()
}

/// Exit code taxonomy (§6.3): distinguish bad arguments from pathfinding
/// failure from a malformed input file. The exact non-zero values aren't
/// spec-prescribed, only that they're distinguishable.
const EXIT_BAD_ARGS: i32 = 1;
const EXIT_PATHFINDING_FAILED: i32 = 2;
const EXIT_GRAPH_MALFORMED: i32 = 3;

fn run_solve(graph: PathBuf, tramo: Option<PathBuf>, cable: Cable, waypoints: Vec<(f64, f64, f64)>, forward_path: bool) -> i32 {
	let req = SolveRequest {
		graph_path: graph.clone(),
		tramo_path: tramo,
		waypoints_xyz: waypoints,
		cable,
		forward_path,
		diagnose_pool: vec![graph],
	};
	match solve(&req) {
		SolveOutcome::Success(report) => {
			log::info!(
				"path found: {} points, length {:.3}, {} nodes explored",
				report.point_count,
				report.path_length,
				report.total_nodes_explored
			);
			println!("{}", serde_json::to_string_pretty(&report).expect("report is always serialisable"));
			0
		}
		SolveOutcome::Failure(report) => {
			log::error!("{}: {}", report.error_kind, report.detail);
			println!("{}", serde_json::to_string_pretty(&report).expect("report is always serialisable"));
			// we don't have the original error here, only its rendered kind; re-derive the
			// exit code from the kind string since `solve` only hands back the report.
			match report.error_kind.as_str() {
				"GraphMalformed" | "MappingMalformed" | "BadCoordinate" => EXIT_GRAPH_MALFORMED,
				_ => EXIT_PATHFINDING_FAILED,
			}
		}
	}
}

fn main() {
	env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));

	let matches = App::new("Cable Route Solver")
		.version(crate_version!())
		.about("Constrained shortest paths over a dual-system cable-routing graph")
		.subcommand(
			SubCommand::with_name("direct")
				.about("Shortest path between two endpoints")
				.arg(Arg::with_name("graph").takes_value(true).required(true).index(1).help("Tagged graph JSON"))
				.arg(tramo_arg())
				.arg(cable_arg())
				.arg(coords_arg(6)),
		)
		.subcommand(
			SubCommand::with_name("ppo")
				.about("Shortest path through one mandatory waypoint")
				.arg(Arg::with_name("graph").takes_value(true).required(true).index(1).help("Tagged graph JSON"))
				.arg(tramo_arg())
				.arg(cable_arg())
				.arg(coords_arg(9)),
		)
		.subcommand(
			SubCommand::with_name("multi_ppo")
				.about("Shortest path through an ordered list of mandatory waypoints")
				.arg(Arg::with_name("graph").takes_value(true).required(true).index(1).help("Tagged graph JSON"))
				.arg(tramo_arg())
				.arg(cable_arg())
				.arg(coords_arg(9)),
		)
		.subcommand(
			SubCommand::with_name("forward_path")
				.about("Shortest path through one mandatory waypoint, forbidding an immediate U-turn at it")
				.arg(Arg::with_name("graph").takes_value(true).required(true).index(1).help("Tagged graph JSON"))
				.arg(tramo_arg())
				.arg(cable_arg())
				.arg(coords_arg(9)),
		)
		.subcommand(
			SubCommand::with_name("diagnose")
				.about("Report endpoint presence/tag across a pool of graph files and recommend a cable class")
				.arg(
					Arg::with_name("coords")
						.takes_value(true)
						.multiple(true)
						.required(true)
						.min_values(6)
						.allow_hyphen_values(true)
						.help("src(x y z) dst(x y z), followed by zero or more candidate graph file paths"),
				),
		)
		.get_matches();

	let code = if let Some(m) = matches.subcommand_matches("direct") {
		let graph = PathBuf::from(m.value_of("graph").unwrap());
		let tramo = m.value_of("tramo").map(PathBuf::from);
		let cable = Cable::parse(m.value_of("cable").unwrap()).unwrap();
		let values: Vec<&str> = m.values_of("coords").unwrap().collect();
		match parse_triples(values) {
			Ok(triples) if triples.len() == 2 => run_solve(graph, tramo, cable, triples, false),
			Ok(triples) => {
				eprintln!("direct expects exactly 2 coordinate triples (src, dst), got {}", triples.len());
				EXIT_BAD_ARGS
			}
			Err(e) => {
				eprintln!("{}", e);
				EXIT_BAD_ARGS
			}
		}
	} else if let Some(m) = matches.subcommand_matches("ppo") {
		let graph = PathBuf::from(m.value_of("graph").unwrap());
		let tramo = m.value_of("tramo").map(PathBuf::from);
		let cable = Cable::parse(m.value_of("cable").unwrap()).unwrap();
		let values: Vec<&str> = m.values_of("coords").unwrap().collect();
		match parse_triples(values) {
			Ok(triples) if triples.len() == 3 => run_solve(graph, tramo, cable, triples, false),
			Ok(triples) => {
				eprintln!("ppo expects exactly 3 coordinate triples (src, ppo, dst), got {}", triples.len());
				EXIT_BAD_ARGS
			}
			Err(e) => {
				eprintln!("{}", e);
				EXIT_BAD_ARGS
			}
		}
	} else if let Some(m) = matches.subcommand_matches("forward_path") {
		let graph = PathBuf::from(m.value_of("graph").unwrap());
		let tramo = m.value_of("tramo").map(PathBuf::from);
		let cable = Cable::parse(m.value_of("cable").unwrap()).unwrap();
		let values: Vec<&str> = m.values_of("coords").unwrap().collect();
		match parse_triples(values) {
			Ok(triples) if triples.len() == 3 => run_solve(graph, tramo, cable, triples, true),
			Ok(triples) => {
				eprintln!("forward_path expects exactly 3 coordinate triples (src, ppo, dst), got {}", triples.len());
				EXIT_BAD_ARGS
			}
			Err(e) => {
				eprintln!("{}", e);
				EXIT_BAD_ARGS
			}
		}
	} else if let Some(m) = matches.subcommand_matches("multi_ppo") {
		let graph = PathBuf::from(m.value_of("graph").unwrap());
		let tramo = m.value_of("tramo").map(PathBuf::from);
		let cable = Cable::parse(m.value_of("cable").unwrap()).unwrap();
		let values: Vec<&str> = m.values_of("coords").unwrap().collect();
		match parse_triples(values) {
			Ok(triples) if triples.len() >= 3 => run_solve(graph, tramo, cable, triples, false),
			Ok(triples) => {
				eprintln!("multi_ppo expects at least 3 coordinate triples (src, ppo.., dst), got {}", triples.len());
				EXIT_BAD_ARGS
			}
			Err(e) => {
				eprintln!("{}", e);
				EXIT_BAD_ARGS
			}
		}
	} else if let Some(m) = matches.subcommand_matches("diagnose") {
		let values: Vec<&str> = m.values_of("coords").unwrap().collect();
		if values.len() < 6 {
			eprintln!("diagnose expects at least src(x y z) dst(x y z)");
			EXIT_BAD_ARGS
		} else {
			let parse_one = |s: &str| s.parse::<f64>().map_err(|e| format!("bad coordinate {:?}: {}", s, e));
			let src = (parse_one(values[0]), parse_one(values[1]), parse_one(values[2]));
			let dst = (parse_one(values[3]), parse_one(values[4]), parse_one(values[5]));
			let graphs: Vec<PathBuf> = values[6..].iter().map(PathBuf::from).collect();
			match (src.0, src.1, src.2, dst.0, dst.1, dst.2) {
				(Ok(sx), Ok(sy), Ok(sz), Ok(dx), Ok(dy), Ok(dz)) => match diagnose::diagnose((sx, sy, sz), (dx, dy, dz), &graphs) {
					Ok(report) => {
						println!("{}", serde_json::to_string_pretty(&report).expect("report is always serialisable"));
						0
					}
					Err(e) => {
						eprintln!("{}", e);
						EXIT_GRAPH_MALFORMED
					}
				},
				_ => {
					eprintln!("bad coordinate in diagnose arguments");
					EXIT_BAD_ARGS
				}
			}
		}
	} else {
		eprintln!("{}", matches.usage());
		EXIT_BAD_ARGS
	};

	std::process::exit(code);
}
