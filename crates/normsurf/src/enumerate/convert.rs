//! Reduced (quad or quad-oct) vertex rays to standard (or almost normal) ones.
//!
//! The sweep lifts every reduced vertex ray canonically, then brings the
//! triangle coordinates into the non-negativity regime one corner at a time,
//! vertex by vertex. Before the first corner of vertex `v` the negative link
//! of `v` joins the working set; once `v` is done it has been replaced by the
//! positive link, and every ray is reduced against the links still to come.
//!
//! Corners not yet visited are "don't care" in the adjacency test: a ray's
//! zero mask is widened by them before the subset check.

use tracing::{debug, trace, warn};

use super::dd::compatible;
use super::ray::Ray;
use super::{list, EnumAlg, EnumerationCfg, FinishGuard, NormalSurfaces, Poller};
use crate::arith::Integer;
use crate::bitmask::{backend_name, dispatch, Bitmask, BitmaskTask};
use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::surfaces::{canonical_lift, ConstraintSet, NormalCoords, NormalEncoding};
use crate::triangulation::Triangulation;
use crate::vector::Vector;

/// Standard (or almost normal) vertex enumeration from a reduced one.
///
/// `reduced` must live in quad or quad-oct coordinates on `tri`. The result is
/// in standard or almost normal coordinates respectively, every ray in
/// smallest integer form. Cancellation yields an empty list; the tracker is
/// marked finished on every exit path.
///
/// On ideal or invalid triangulations the sweep would lose standard vertices
/// (and spun-normal reduced rays have no standard counterpart at all), so
/// the target system is enumerated directly instead and the result reports
/// [`EnumAlg::Direct`].
pub fn build_standard_from_reduced<'t>(
    tri: &'t Triangulation,
    reduced: &NormalSurfaces<'t>,
    tracker: Option<&dyn Progress>,
) -> Result<NormalSurfaces<'t>> {
    let _finish = FinishGuard(tracker);
    if !std::ptr::eq(tri, reduced.triangulation()) {
        return Err(Error::invalid("surface list belongs to a different triangulation"));
    }
    let coords = match reduced.coords() {
        NormalCoords::Quad => NormalCoords::Standard,
        NormalCoords::QuadOct => NormalCoords::AlmostNormal,
        other => {
            return Err(Error::invalid(format!(
                "cannot convert from {other} coordinates; expected quad or quadoct"
            )))
        }
    };
    let enc = NormalEncoding::from_coords(reduced.coords())?;
    let poll_interval = EnumerationCfg::default().poll_interval;
    if !list::converts_exactly(tri) {
        debug!(
            valid = tri.is_valid(),
            ideal = tri.is_ideal(),
            coords = %coords,
            "conversion not exact; enumerating directly"
        );
        if let Some(t) = tracker {
            t.new_stage("Enumerating vertex surfaces", 1.0);
        }
        let rays = list::direct(tri, enc.with_triangles(), tracker, poll_interval)?;
        let rays = if tracker.is_some_and(|t| t.is_cancelled()) {
            Vec::new()
        } else {
            rays
        };
        return NormalSurfaces::from_parts(tri, coords, Some(EnumAlg::Direct), rays);
    }
    if let Some(t) = tracker {
        t.new_stage("Converting to standard coordinates", 1.0);
    }
    let rays: Vec<Vector<Integer>> = reduced.vectors().into_iter().cloned().collect();
    let out = standard_rays(tri, enc, &rays, tracker, poll_interval)?;
    NormalSurfaces::from_parts(tri, coords, Some(EnumAlg::ViaReduced), out.unwrap_or_default())
}

/// The sweep itself, on raw vectors stored under triangle-free `enc`.
/// `None` when cancelled.
pub(crate) fn standard_rays(
    tri: &Triangulation,
    enc: NormalEncoding,
    reduced: &[Vector<Integer>],
    tracker: Option<&dyn Progress>,
    poll_interval: usize,
) -> Result<Option<Vec<Vector<Integer>>>> {
    if enc.stores_triangles() {
        return Err(Error::invalid(format!(
            "{} vectors already carry triangle coordinates",
            enc.coords()
        )));
    }
    if tri.is_empty() {
        return Ok(Some(Vec::new()));
    }
    let expected = enc.block() * tri.size();
    if let Some(bad) = reduced.iter().find(|v| v.len() != expected) {
        return Err(Error::invalid(format!(
            "reduced vector of length {} (expected {expected})",
            bad.len()
        )));
    }

    let full = enc.with_triangles();
    let mut lifted = Vec::with_capacity(reduced.len());
    for v in reduced {
        if let Some(mut l) = canonical_lift(tri, enc, v) {
            l.scale_down();
            lifted.push(l);
        }
    }
    let dim = full.block() * tri.size();
    debug!(
        input = reduced.len(),
        spun = reduced.len() - lifted.len(),
        dim,
        coords = %full.coords(),
        backend = backend_name(dim),
        "reduced to standard start"
    );

    let sweep = Sweep {
        tri,
        enc: full,
        lifted,
        poller: Poller::new(tracker, poll_interval),
    };
    let out = dispatch(dim, sweep)?;
    match &out {
        Some(rays) => debug!(rays = rays.len(), "reduced to standard done"),
        None => warn!("reduced to standard cancelled"),
    }
    Ok(out)
}

struct Sweep<'a> {
    tri: &'a Triangulation,
    enc: NormalEncoding,
    lifted: Vec<Vector<Integer>>,
    poller: Poller<'a>,
}

impl Sweep<'_> {
    fn link(&self, v: usize) -> Vector<Integer> {
        let mut link = Vector::zero(self.enc.block() * self.tri.size());
        for e in &self.tri.vertices()[v].embeddings {
            if let Some(p) = self.enc.triangle_pos(e.tet, e.vertex) {
                link[p] = Integer::one();
            }
        }
        link
    }
}

impl BitmaskTask for Sweep<'_> {
    type Output = Result<Option<Vec<Vector<Integer>>>>;

    fn run<B: Bitmask>(mut self) -> Self::Output {
        let tri = self.tri;
        let enc = self.enc;
        let dim = enc.block() * tri.size();
        let masks: Vec<B> = ConstraintSet::quad(enc, tri.size()).to_bitmasks(enc, dim)?;
        let links: Vec<Vector<Integer>> = (0..tri.count_vertices()).map(|v| self.link(v)).collect();
        let mut unvisited = B::from_bits(
            dim,
            (0..tri.size()).flat_map(|t| (0..4).filter_map(move |c| enc.triangle_pos(t, c))),
        );
        let mut rays: Vec<Ray<B>> = std::mem::take(&mut self.lifted)
            .into_iter()
            .map(Ray::from_vector)
            .collect();

        let total = 4 * tri.size();
        let mut done = 0;
        if !self.poller.checkpoint(done, total) {
            return Ok(None);
        }

        for (v, vertex) in tri.vertices().iter().enumerate() {
            rays.push(Ray::from_vector(-links[v].clone()));

            for (step, emb) in vertex.embeddings.iter().enumerate() {
                let Some(c) = enc.triangle_pos(emb.tet, emb.vertex) else {
                    return Err(Error::impossible("triangle coordinates missing in sweep"));
                };
                let (mut zero, mut pos, mut neg) = (Vec::new(), Vec::new(), Vec::new());
                for (i, r) in rays.iter().enumerate() {
                    match r.sign(c) {
                        0 => zero.push(i),
                        1 => pos.push(i),
                        _ => neg.push(i),
                    }
                }
                let relaxed: Vec<B> = rays
                    .iter()
                    .map(|r| {
                        let mut z = r.zeros.clone();
                        z.or_with(&unvisited);
                        z
                    })
                    .collect();

                let mut created = Vec::new();
                for &p in &pos {
                    for &n in &neg {
                        if !self.poller.tick(done, total) {
                            return Ok(None);
                        }
                        let (rp, rn) = (&rays[p], &rays[n]);
                        if !compatible(&rp.zeros, &rn.zeros, &masks) {
                            continue;
                        }
                        let blocked = relaxed.iter().enumerate().any(|(k, z)| {
                            k != p && k != n && z.contains_intn(&rp.zeros, &rn.zeros)
                        });
                        if !blocked {
                            created.push(Ray::intersect_at(rp, rn, c));
                        }
                    }
                }
                trace!(
                    vertex = v,
                    coord = c,
                    zero = zero.len(),
                    pos = pos.len(),
                    neg = neg.len(),
                    created = created.len(),
                    "sweep step"
                );

                // At the first corner the positives are spent: each differs from
                // one of the new rays by a multiple of the link added below.
                let carried = if step == 0 { zero } else { [zero, pos].concat() };
                let mut old: Vec<Option<Ray<B>>> = rays.into_iter().map(Some).collect();
                let mut next: Vec<Ray<B>> = carried.into_iter().filter_map(|i| old[i].take()).collect();
                next.extend(created);
                if step == 0 {
                    next.push(Ray::from_vector(links[v].clone()));
                }
                rays = next;

                unvisited.set(c, false);
                done += 1;
                if !self.poller.checkpoint(done, total) {
                    return Ok(None);
                }
            }

            for u in v + 1..tri.count_vertices() {
                let corners: Vec<usize> = tri.vertices()[u]
                    .embeddings
                    .iter()
                    .filter_map(|e| enc.triangle_pos(e.tet, e.vertex))
                    .collect();
                for r in rays.iter_mut() {
                    let Some(m) = corners.iter().map(|&p| &r.v[p]).min().cloned() else {
                        continue;
                    };
                    if m > 0 {
                        let mut w = std::mem::take(&mut r.v);
                        w.subtract_copies(&links[u], &m)?;
                        w.scale_down();
                        *r = Ray::from_vector(w);
                    }
                }
            }
        }
        Ok(Some(rays.into_iter().map(Ray::into_vector).collect()))
    }
}
