//! Error taxonomy for the cable-routing solver core.
//!
//! Every fallible boundary in this crate returns [`CableRouteError`] rather
//! than panicking; panics are reserved for invariants the loader itself has
//! already checked (see `graph.rs`, `data.rs`).

use std::fmt;

use crate::cable::Cable;
use crate::point::PointKey;

/// Which endpoint of a call an error refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize)]
pub enum Which {
	Source,
	Destination,
	Waypoint(usize),
}

impl fmt::Display for Which {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Which::Source => write!(f, "source"),
			Which::Destination => write!(f, "destination"),
			Which::Waypoint(i) => write!(f, "waypoint #{}", i),
		}
	}
}

#[derive(Clone, Debug)]
pub enum CableRouteError {
	/// A coordinate triple was non-finite, or a canonical key did not match
	/// the exact three-decimal shape of §4.1.
	BadCoordinate { detail: String },
	/// §6.1 violation while loading a tagged graph file.
	GraphMalformed { detail: String },
	/// §6.2 violation while loading a tramo-id map file.
	MappingMalformed { detail: String },
	/// A canonical key was not present among the graph's vertices.
	EndpointNotInGraph { which: Which, key: PointKey },
	/// A vertex exists but its tag is outside the cable class's permitted set.
	EndpointInForbiddenSystem { which: Which, actual_tag: char, cable: Cable },
	/// The A* open set emptied without reaching the destination.
	NoPath { segment: usize, from: PointKey, to: PointKey },
	/// Internal-only: an edge identifier lookup failed. Never surfaced to a user.
	#[allow(dead_code)]
	UnknownEdge { u: PointKey, v: PointKey },
}

impl fmt::Display for CableRouteError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CableRouteError::BadCoordinate { detail } => write!(f, "bad coordinate: {}", detail),
			CableRouteError::GraphMalformed { detail } => write!(f, "graph malformed: {}", detail),
			CableRouteError::MappingMalformed { detail } => write!(f, "tramo mapping malformed: {}", detail),
			CableRouteError::EndpointNotInGraph { which, key } => write!(f, "{} not in graph: {}", which, key),
			CableRouteError::EndpointInForbiddenSystem { which, actual_tag, cable } => write!(
				f,
				"{} is tagged '{}', not permitted for cable class {}",
				which, actual_tag, cable
			),
			CableRouteError::NoPath { segment, from, to } => write!(f, "no path for segment #{}: {} -> {}", segment, from, to),
			CableRouteError::UnknownEdge { u, v } => write!(f, "unknown edge: {} - {}", u, v),
		}
	}
}

impl std::error::Error for CableRouteError {}
