//! Normal surface theory for 3-manifold triangulations.
//!
//! Exact arithmetic, packed bitmasks and integer vectors at the bottom;
//! triangulations with their skeleta in the middle; normal surface coordinates,
//! vertex enumeration and the quad-to-standard conversion on top.
//!
//! API Policy
//! - Indices are plain `usize`s into the skeleton arrays. They are only
//!   meaningful until the triangulation is next modified.
//! - Every fallible operation returns [`Result`]; errors carry one of the
//!   kinds in [`Error`].
//! - The library logs through `tracing` and never installs a subscriber.

pub mod arith;
pub mod bitmask;
pub mod enumerate;
pub mod error;
pub mod perm;
pub mod progress;
pub mod surfaces;
pub mod triangulation;
pub mod vector;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use arith::{Integer, LargeInteger, Rational};
pub use error::{Error, Result};
pub use perm::Perm4;
pub use triangulation::Triangulation;
pub use vector::Vector;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::arith::{Integer, LargeInteger, Rational};
    pub use crate::enumerate::{
        build_reduced_from_standard, build_standard_from_reduced, EnumAlg, EnumerationCfg,
        NormalSurfaces,
    };
    pub use crate::error::{Error, Result};
    pub use crate::perm::Perm4;
    pub use crate::progress::{Progress, ProgressTracker, ProgressTrackerOpen};
    pub use crate::surfaces::{NormalCoords, NormalEncoding, NormalSurface};
    pub use crate::triangulation::{named, Triangulation};
    pub use crate::vector::Vector;
}
