//! Coordinate canonicalisation (spec component C1).
//!
//! A [`Point`] is externally a triple of `f64`s; internally every point is
//! backed by both its rounded numeric triple and the canonical textual key
//! that exactly reproduces that rounding, so search hot loops never have to
//! re-parse a string to get a number back (§9 design note).

use std::fmt;

use crate::error::CableRouteError;

/// Number of fractional digits a canonical key carries, per §4.1.
pub const COORD_DECIMALS: usize = 3;

/// A canonical vertex identity: the exact text `"(x.xxx, y.yyy, z.zzz)"`.
///
/// Two points are the same vertex iff their canonical keys are equal; no
/// tolerance beyond the rounding itself is ever applied (§4.1 and §9 open
/// question #3).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PointKey(String);

impl PointKey {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for PointKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for PointKey {
	fn from(s: String) -> Self {
		PointKey(s)
	}
}

impl std::borrow::Borrow<str> for PointKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}

/// A canonicalised 3D point: the key and the rounded numeric triple it was
/// derived from.
#[derive(Clone, PartialEq, Debug)]
pub struct Point {
	pub key: PointKey,
	pub xyz: (f64, f64, f64),
}

impl Point {
	/// Euclidean distance between two canonicalised points, computed from the
	/// numeric triples - never by re-parsing the key (§9).
	pub fn distance(&self, other: &Point) -> f64 {
		let (x1, y1, z1) = self.xyz;
		let (x2, y2, z2) = other.xyz;
		((x1 - x2).powi(2) + (y1 - y2).powi(2) + (z1 - z2).powi(2)).sqrt()
	}
}

fn format_component(v: f64) -> String {
	format!("{:.*}", COORD_DECIMALS, v)
}

/// Round and format a 3D coordinate into its canonical key, per §4.1.
///
/// Rounding is delegated to Rust's own `{:.3}` float formatting, which rounds
/// half-to-even at the requested digit; re-parsing that exact text back to
/// `f64` keeps the numeric triple and the key in lockstep, so no rounding
/// drift can ever open up between them.
pub fn canonicalise(x: f64, y: f64, z: f64) -> Result<Point, CableRouteError> {
	if !x.is_finite() || !y.is_finite() || !z.is_finite() {
		return Err(CableRouteError::BadCoordinate {
			detail: format!("non-finite coordinate ({}, {}, {})", x, y, z),
		});
	}
	let (xs, ys, zs) = (format_component(x), format_component(y), format_component(z));
	let key = PointKey(format!("({}, {}, {})", xs, ys, zs));
	// re-parse so the numeric triple is exactly what `key` encodes
	let xyz = (xs.parse().unwrap(), ys.parse().unwrap(), zs.parse().unwrap());
	Ok(Point { key, xyz })
}

/// Parse a canonical key back into its numeric triple.
///
/// Rejects anything not matching the exact shape produced by
/// [`canonicalise`]: parentheses, `", "`-separated components, each with
/// exactly [`COORD_DECIMALS`] fractional digits.
pub fn parse(key: &str) -> Result<(f64, f64, f64), CableRouteError> {
	let malformed = || CableRouteError::BadCoordinate {
		detail: format!("key does not match canonical shape: {:?}", key),
	};
	let inner = key.strip_prefix('(').and_then(|s| s.strip_suffix(')')).ok_or_else(malformed)?;
	let parts: Vec<&str> = inner.split(", ").collect();
	if parts.len() != 3 {
		return Err(malformed());
	}
	let mut out = [0.0f64; 3];
	for (i, p) in parts.iter().enumerate() {
		let v: f64 = p.parse().map_err(|_| malformed())?;
		if format_component(v) != *p {
			return Err(malformed());
		}
		out[i] = v;
	}
	Ok((out[0], out[1], out[2]))
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn canonicalises_to_three_decimals() {
		let p = canonicalise(1.0, -2.5, 0.0001).unwrap();
		assert_eq!(p.key.as_str(), "(1.000, -2.500, 0.000)");
		assert_eq!(p.xyz, (1.000, -2.500, 0.000));
	}

	#[test]
	fn four_decimal_input_is_rounded_on_ingest() {
		// §9 open question #3: four-decimal inputs get canonicalised, not tolerated.
		let p = canonicalise(1.23455, 0.0, 0.0).unwrap();
		assert_eq!(p.key.as_str(), "(1.234, 0.000, 0.000)");
	}

	#[test]
	fn rejects_non_finite() {
		assert!(canonicalise(f64::NAN, 0.0, 0.0).is_err());
		assert!(canonicalise(0.0, f64::INFINITY, 0.0).is_err());
	}

	#[test]
	fn idempotence_round_trip() {
		// property 1 & round-trip law: parse(canonicalise(x).key) == canonicalise(x).rounded
		for (x, y, z) in [(0.0, 0.0, 0.0), (-1.5, 2.25, 3.125), (10.0005, -0.0005, 7.0)] {
			let p = canonicalise(x, y, z).unwrap();
			assert_eq!(parse(p.key.as_str()).unwrap(), p.xyz);
			// canonicalising an already-canonical key returns it unchanged
			let p2 = canonicalise(p.xyz.0, p.xyz.1, p.xyz.2).unwrap();
			assert_eq!(p2.key, p.key);
		}
	}

	#[test]
	fn rejects_malformed_shapes() {
		assert!(parse("1.000, 2.000, 3.000").is_err());
		assert!(parse("(1.00, 2.000, 3.000)").is_err());
		assert!(parse("(1.000,2.000, 3.000)").is_err());
		assert!(parse("(1.000, 2.000, 3.000").is_err());
	}
}
