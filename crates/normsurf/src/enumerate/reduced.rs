//! Standard (or almost normal) vertex rays to reduced ones.
//!
//! On a triangulation without ideal vertices every reduced vertex ray is the
//! projection of a standard one. Projecting all standard vertices, dropping
//! vertex links and duplicates, and keeping the candidates whose support is
//! minimal among the rest leaves exactly the reduced vertex set.

use tracing::{debug, warn};

use super::{EnumAlg, EnumerationCfg, FinishGuard, NormalSurfaces, Poller};
use crate::arith::Integer;
use crate::bitmask::{dispatch, Bitmask, BitmaskTask};
use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::surfaces::NormalEncoding;
use crate::triangulation::Triangulation;
use crate::vector::Vector;

/// Quad (or quad-oct) vertex enumeration from a standard (or almost normal) one.
///
/// `FailedPrecondition` on ideal triangulations, where spun-normal vertices
/// have no standard preimage. The support comparison is quadratic in the
/// number of candidates and polls `tracker` throughout; cancellation yields
/// an empty list.
pub fn build_reduced_from_standard<'t>(
    tri: &'t Triangulation,
    standard: &NormalSurfaces<'t>,
    tracker: Option<&dyn Progress>,
) -> Result<NormalSurfaces<'t>> {
    let _finish = FinishGuard(tracker);
    if !std::ptr::eq(tri, standard.triangulation()) {
        return Err(Error::invalid("surface list belongs to a different triangulation"));
    }
    if tri.is_ideal() {
        return Err(Error::precondition(
            "ideal triangulations have reduced vertices with no standard preimage",
        ));
    }
    let from = NormalEncoding::from_coords(standard.coords())?;
    if !from.stores_triangles() {
        return Err(Error::invalid(format!(
            "cannot reduce from {} coordinates; expected standard or an",
            standard.coords()
        )));
    }
    let to = from.without_triangles();
    if let Some(t) = tracker {
        t.new_stage("Projecting to reduced coordinates", 1.0);
    }

    let mut candidates: Vec<Vector<Integer>> = Vec::new();
    for s in standard.iter() {
        if s.is_vertex_linking() {
            continue;
        }
        let mut q = to.project(from, s.vector())?;
        q.scale_down();
        if !candidates.contains(&q) {
            candidates.push(q);
        }
    }
    if tracker.is_some_and(|t| t.is_cancelled()) {
        return NormalSurfaces::from_parts(tri, to.coords(), Some(EnumAlg::Direct), Vec::new());
    }
    let dim = to.block() * tri.size();
    let task = MinimalSupports {
        candidates,
        poller: Poller::new(tracker, EnumerationCfg::default().poll_interval),
    };
    let kept = match dispatch(dim, task) {
        Some(kept) => {
            debug!(input = standard.len(), output = kept.len(), "standard to reduced done");
            kept
        }
        None => {
            warn!("standard to reduced cancelled");
            Vec::new()
        }
    };
    NormalSurfaces::from_parts(tri, to.coords(), Some(EnumAlg::Direct), kept)
}

/// Keeps the vectors no other candidate's support fits inside.
/// `None` when cancelled.
struct MinimalSupports<'a> {
    candidates: Vec<Vector<Integer>>,
    poller: Poller<'a>,
}

impl BitmaskTask for MinimalSupports<'_> {
    type Output = Option<Vec<Vector<Integer>>>;

    fn run<B: Bitmask>(mut self) -> Self::Output {
        let supports: Vec<B> = self
            .candidates
            .iter()
            .map(|v| B::from_bits(v.len(), (0..v.len()).filter(|&i| !v[i].is_zero())))
            .collect();
        let total = supports.len();
        let mut minimal = vec![true; total];
        for (i, own) in supports.iter().enumerate() {
            if !self.poller.checkpoint(i, total) {
                return None;
            }
            for (j, other) in supports.iter().enumerate() {
                if !self.poller.tick(i, total) {
                    return None;
                }
                if j != i && other.is_subset_of(own) {
                    minimal[i] = false;
                    break;
                }
            }
        }
        Some(
            self.candidates
                .into_iter()
                .zip(minimal)
                .filter_map(|(v, keep)| keep.then_some(v))
                .collect(),
        )
    }
}
