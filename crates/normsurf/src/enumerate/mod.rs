//! Vertex enumeration of normal surface cones.
//!
//! Purpose
//! - Produce the vertex (extreme ray) set of the projective solution space in
//!   standard, quad, almost normal or quad-oct coordinates.
//! - Convert a quad (or quad-oct) vertex set into the standard (or almost
//!   normal) one without re-running the full enumeration, and back.
//!
//! Why this design
//! - Every algorithm works on [`ray::Ray`]s: a vector plus a packed zero mask.
//!   The mask width is picked once per call through [`crate::bitmask::dispatch`].
//! - Pair tests are the hot loop. The compatibility filter (at most one
//!   quad/octagon type per tetrahedron) runs first because it is cheapest; the
//!   combinatorial adjacency test runs second.
//! - Long runs poll a [`Progress`] tracker every `poll_interval` pair tests and
//!   return an empty result when cancelled.
//!
//! References
//! - Fukuda and Prodon, "Double description method revisited" (1996).
//! - Burton, "Converting between quadrilateral and standard solution sets in
//!   normal surface theory", Algebr. Geom. Topol. 9 (2009).

pub mod convert;
pub mod dd;
mod list;
pub mod ray;
pub mod reduced;

#[cfg(test)]
mod tests;

pub use convert::build_standard_from_reduced;
pub use list::NormalSurfaces;
pub use reduced::build_reduced_from_standard;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::progress::Progress;

/// How [`NormalSurfaces::enumerate`] reaches its answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EnumAlg {
    /// Standard/almost normal coordinates go through the reduced system when
    /// the triangulation is valid and has no ideal vertices; everything else is
    /// enumerated directly.
    #[default]
    Default,
    /// Double description straight in the requested coordinates.
    Direct,
    /// Reduced enumeration followed by conversion. Only meaningful for
    /// standard or almost normal coordinates on valid triangulations without
    /// ideal vertices; other requests run [`EnumAlg::Direct`].
    ViaReduced,
}

impl fmt::Display for EnumAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Direct => "direct",
            Self::ViaReduced => "via-reduced",
        })
    }
}

impl FromStr for EnumAlg {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(Self::Default),
            "direct" => Ok(Self::Direct),
            "via-reduced" | "reduced" => Ok(Self::ViaReduced),
            other => Err(Error::invalid(format!("unknown enumeration algorithm '{other}'"))),
        }
    }
}

/// Enumeration configuration.
#[derive(Clone, Copy, Debug)]
pub struct EnumerationCfg {
    pub algorithm: EnumAlg,
    /// Pair tests between two polls of the progress tracker.
    pub poll_interval: usize,
}

impl Default for EnumerationCfg {
    fn default() -> Self {
        Self {
            algorithm: EnumAlg::Default,
            poll_interval: 1024,
        }
    }
}

/// Rate-limited access to an optional tracker.
pub(crate) struct Poller<'a> {
    tracker: Option<&'a dyn Progress>,
    interval: usize,
    since: usize,
}

impl<'a> Poller<'a> {
    pub(crate) fn new(tracker: Option<&'a dyn Progress>, interval: usize) -> Self {
        Self {
            tracker,
            interval: interval.max(1),
            since: 0,
        }
    }

    /// Counts one unit of work; every `interval` units reports `done/total`.
    /// Returns false once cancellation has been requested.
    pub(crate) fn tick(&mut self, done: usize, total: usize) -> bool {
        self.since += 1;
        if self.since < self.interval {
            return true;
        }
        self.since = 0;
        self.tracker.map_or(true, |t| t.report(done, total))
    }

    /// Unthrottled check, used at step boundaries.
    pub(crate) fn checkpoint(&mut self, done: usize, total: usize) -> bool {
        self.since = 0;
        self.tracker.map_or(true, |t| t.report(done, total))
    }
}

/// Marks the tracker finished when dropped, so every return path (errors
/// and cancellation included) reports completion.
pub(crate) struct FinishGuard<'a>(pub(crate) Option<&'a dyn Progress>);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if let Some(t) = self.0 {
            t.set_finished();
        }
    }
}
