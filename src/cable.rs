//! Cable Access Policy (spec component C3).

use std::collections::HashSet;

use crate::error::{CableRouteError, Which};
use crate::graph::{Tag, TaggedGraph};
use crate::point::PointKey;

/// A cable class, per §3: fixed, not user-configurable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize)]
pub enum Cable {
	A,
	B,
	C,
}

impl Cable {
	pub fn parse(s: &str) -> Option<Cable> {
		match s {
			"A" => Some(Cable::A),
			"B" => Some(Cable::B),
			"C" => Some(Cable::C),
			_ => None,
		}
	}

	/// Subsystems this cable class may traverse. A↦{A}, B↦{B}, C↦{A,B}.
	pub fn permitted(self) -> HashSet<Tag> {
		match self {
			Cable::A => [Tag::A].into_iter().collect(),
			Cable::B => [Tag::B].into_iter().collect(),
			Cable::C => [Tag::A, Tag::B].into_iter().collect(),
		}
	}
}

impl std::fmt::Display for Cable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Cable::A => "A",
			Cable::B => "B",
			Cable::C => "C",
		})
	}
}

/// Every cable class that is allowed to enter a subsystem tagged `tag`.
pub fn compatible_cables(tag: Tag) -> HashSet<Cable> {
	[Cable::A, Cable::B, Cable::C].into_iter().filter(|c| c.permitted().contains(&tag)).collect()
}

/// Validate that `key` is present in `graph` and tagged within `permitted`.
///
/// Fails with `EndpointNotInGraph` if absent, or
/// `EndpointInForbiddenSystem` if present but out of policy.
pub fn validate_endpoint(graph: &TaggedGraph, key: &PointKey, which: Which, cable: Cable) -> Result<(), CableRouteError> {
	let permitted = cable.permitted();
	match graph.vertex_tag(key) {
		None => Err(CableRouteError::EndpointNotInGraph { which, key: key.clone() }),
		Some(tag) if !permitted.contains(&tag) => Err(CableRouteError::EndpointInForbiddenSystem {
			which,
			actual_tag: tag.as_char(),
			cable,
		}),
		Some(_) => Ok(()),
	}
}
