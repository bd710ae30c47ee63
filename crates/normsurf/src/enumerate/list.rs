//! Surface lists and the top-level enumeration entry point.
//!
//! Purpose
//! - Hold the vertex surfaces of one triangulation in one coordinate system,
//!   together with the algorithm that produced them.
//! - Pick that algorithm: reduced enumeration plus conversion where the
//!   conversion is exact, direct double description everywhere else.
//!
//! Why this design
//! - The conversion only reproduces the standard vertex set on valid
//!   triangulations without ideal vertices. Ideal or invalid inputs always
//!   run directly, even when the caller asked for [`EnumAlg::ViaReduced`];
//!   [`NormalSurfaces::algorithm`] records what actually ran.
//! - A list borrows its triangulation, so surfaces never outlive the
//!   skeleton their properties are computed from.

use tracing::debug;

use super::{convert, dd, EnumAlg, EnumerationCfg, FinishGuard};
use crate::arith::Integer;
use crate::error::Result;
use crate::progress::Progress;
use crate::surfaces::{ConstraintSet, MatchingEquations, NormalCoords, NormalEncoding, NormalSurface};
use crate::triangulation::Triangulation;
use crate::vector::Vector;

/// A list of surfaces in one coordinate system on one triangulation.
#[derive(Clone, Debug)]
pub struct NormalSurfaces<'t> {
    tri: &'t Triangulation,
    coords: NormalCoords,
    /// How the list was produced; `None` when supplied by the caller.
    algorithm: Option<EnumAlg>,
    surfaces: Vec<NormalSurface<'t>>,
}

impl<'t> NormalSurfaces<'t> {
    /// Vertex surfaces of `tri` in `coords`.
    ///
    /// Cancellation through `tracker` returns an empty list; the tracker is
    /// marked finished however the call ends.
    pub fn enumerate(
        tri: &'t Triangulation,
        coords: NormalCoords,
        cfg: EnumerationCfg,
        tracker: Option<&dyn Progress>,
    ) -> Result<Self> {
        let _finish = FinishGuard(tracker);
        let enc = NormalEncoding::from_coords(coords)?;
        let convertible = enc.stores_triangles() && converts_exactly(tri);
        let algorithm = match cfg.algorithm {
            EnumAlg::Default | EnumAlg::ViaReduced if convertible => EnumAlg::ViaReduced,
            _ => EnumAlg::Direct,
        };
        debug!(
            tetrahedra = tri.size(),
            coords = %coords,
            requested = %cfg.algorithm,
            algorithm = %algorithm,
            "enumerate"
        );
        if tri.is_empty() {
            return Self::from_parts(tri, coords, Some(algorithm), Vec::new());
        }

        let rays = match algorithm {
            EnumAlg::ViaReduced => {
                let reduced = enc.without_triangles();
                if let Some(t) = tracker {
                    t.new_stage("Enumerating reduced vertex surfaces", 0.3);
                }
                let q = direct(tri, reduced, tracker, cfg.poll_interval)?;
                if tracker.is_some_and(|t| t.is_cancelled()) {
                    Vec::new()
                } else {
                    if let Some(t) = tracker {
                        t.new_stage("Converting to standard coordinates", 0.7);
                    }
                    convert::standard_rays(tri, reduced, &q, tracker, cfg.poll_interval)?
                        .unwrap_or_default()
                }
            }
            _ => {
                if let Some(t) = tracker {
                    t.new_stage("Enumerating vertex surfaces", 1.0);
                }
                direct(tri, enc, tracker, cfg.poll_interval)?
            }
        };
        let rays = if tracker.is_some_and(|t| t.is_cancelled()) {
            Vec::new()
        } else {
            rays
        };
        Self::from_parts(tri, coords, Some(algorithm), rays)
    }

    /// Wraps caller-supplied vectors, checking each against `coords`.
    pub fn from_vectors(
        tri: &'t Triangulation,
        coords: NormalCoords,
        vectors: Vec<Vector<Integer>>,
    ) -> Result<Self> {
        Self::from_parts(tri, coords, None, vectors)
    }

    pub(crate) fn from_parts(
        tri: &'t Triangulation,
        coords: NormalCoords,
        algorithm: Option<EnumAlg>,
        vectors: Vec<Vector<Integer>>,
    ) -> Result<Self> {
        let enc = NormalEncoding::from_coords(coords)?;
        let surfaces = vectors
            .into_iter()
            .map(|v| NormalSurface::new(tri, enc, v))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            tri,
            coords,
            algorithm,
            surfaces,
        })
    }

    pub fn triangulation(&self) -> &'t Triangulation {
        self.tri
    }

    pub fn coords(&self) -> NormalCoords {
        self.coords
    }

    pub fn algorithm(&self) -> Option<EnumAlg> {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&NormalSurface<'t>> {
        self.surfaces.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalSurface<'t>> {
        self.surfaces.iter()
    }

    pub fn vectors(&self) -> Vec<&Vector<Integer>> {
        self.surfaces.iter().map(NormalSurface::vector).collect()
    }

    /// Vectors sorted lexicographically, for order-independent comparison.
    pub fn sorted_vectors(&self) -> Vec<Vec<Integer>> {
        let mut out: Vec<Vec<Integer>> = self.surfaces.iter().map(|s| s.vector().as_slice().to_vec()).collect();
        out.sort();
        out
    }
}

impl<'a, 't> IntoIterator for &'a NormalSurfaces<'t> {
    type Item = &'a NormalSurface<'t>;
    type IntoIter = std::slice::Iter<'a, NormalSurface<'t>>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.iter()
    }
}

/// Whether the reduced-to-standard sweep recovers every standard vertex.
/// Ideal and invalid vertices carry standard vertex surfaces that project to
/// nothing reduced, so those triangulations must be enumerated directly.
pub(super) fn converts_exactly(tri: &Triangulation) -> bool {
    tri.is_valid() && !tri.is_ideal()
}

/// Double description in `enc` with its natural equations and constraints.
pub(super) fn direct(
    tri: &Triangulation,
    enc: NormalEncoding,
    tracker: Option<&dyn Progress>,
    poll_interval: usize,
) -> Result<Vec<Vector<Integer>>> {
    let eqs = MatchingEquations::for_encoding(tri, enc)?;
    let constraints = ConstraintSet::quad(enc, tri.size());
    dd::extreme_rays(&eqs, &constraints, enc, tracker, poll_interval)
}
