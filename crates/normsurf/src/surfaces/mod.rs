//! Normal and almost normal surfaces as coordinate vectors.
//!
//! Purpose
//! - Define the coordinate systems (standard, quad, almost normal, quad-oct),
//!   their per-tetrahedron block layout, the matching equations and the
//!   "at most one quad/octagon type per tetrahedron" constraint families.
//! - Hold individual surfaces and answer topological questions about them:
//!   Euler characteristic, orientability, sidedness, boundary, whether the
//!   surface is a vertex link or a thin edge link.
//!
//! Why this design
//! - A surface is a plain vector plus an encoding; every property is derived
//!   from the vector and the triangulation's skeleton and memoised on first use.
//! - Triangle-free vectors are lifted canonically (no redundant vertex links)
//!   whenever a property needs triangle counts. Spun-normal vectors have no
//!   lift and report themselves as non-compact.
//!
//! References
//! - Tollefson, "Normal surface Q-theory", Pacific J. Math. 183 (1998).
//! - Burton, "Converting between quadrilateral and standard solution sets in
//!   normal surface theory", Algebr. Geom. Topol. 9 (2009).

mod constraints;
mod coords;
mod lift;
mod matching;
mod surface;

#[cfg(test)]
mod tests;

pub use constraints::ConstraintSet;
pub use coords::{quad_separating, NormalCoords, NormalEncoding, QUAD_PARTITION};
pub use matching::MatchingEquations;
pub use surface::NormalSurface;

pub(crate) use lift::canonical_lift;
