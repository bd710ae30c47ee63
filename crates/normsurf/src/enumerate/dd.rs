//! Direct double description over the matching equations.
//!
//! Starts from the unit rays of the non-negative orthant and intersects with
//! one hyperplane at a time. Rays on the hyperplane survive; each adjacent
//! (positive, negative) pair that passes the compatibility test contributes
//! one new ray on the hyperplane.

use tracing::{debug, trace, warn};

use super::ray::Ray;
use super::Poller;
use crate::arith::Integer;
use crate::bitmask::{backend_name, dispatch, Bitmask, BitmaskTask};
use crate::error::Result;
use crate::progress::Progress;
use crate::surfaces::{ConstraintSet, MatchingEquations, NormalEncoding};
use crate::vector::Vector;

/// Extreme rays of `{x ≥ 0 : eqs·x = 0}` whose supports satisfy `constraints`,
/// each in smallest integer form.
///
/// Positives drive the outer pair loop and negatives the inner one; new rays
/// follow the rays already on the hyperplane. Cancellation returns `Ok(vec![])`.
pub fn extreme_rays(
    eqs: &MatchingEquations,
    constraints: &ConstraintSet,
    enc: NormalEncoding,
    tracker: Option<&dyn Progress>,
    poll_interval: usize,
) -> Result<Vec<Vector<Integer>>> {
    let dim = eqs.dim();
    debug!(
        dim,
        equations = eqs.len(),
        coords = %enc.coords(),
        backend = backend_name(dim),
        "double description start"
    );
    let task = DoubleDescription {
        eqs,
        constraints,
        enc,
        poller: Poller::new(tracker, poll_interval),
    };
    let out = dispatch(dim, task)?;
    match &out {
        Some(rays) => debug!(rays = rays.len(), "double description done"),
        None => warn!("double description cancelled"),
    }
    Ok(out.unwrap_or_default())
}

struct DoubleDescription<'a> {
    eqs: &'a MatchingEquations,
    constraints: &'a ConstraintSet,
    enc: NormalEncoding,
    poller: Poller<'a>,
}

impl BitmaskTask for DoubleDescription<'_> {
    /// `None` when cancelled.
    type Output = Result<Option<Vec<Vector<Integer>>>>;

    fn run<B: Bitmask>(mut self) -> Self::Output {
        let dim = self.eqs.dim();
        let masks: Vec<B> = self.constraints.to_bitmasks(self.enc, dim)?;
        let mut rays: Vec<Ray<B>> = (0..dim).map(|i| Ray::unit(dim, i)).collect();
        let total = self.eqs.len();

        if !self.poller.checkpoint(0, total) {
            return Ok(None);
        }
        for r in 0..total {
            let dots: Vec<Integer> = rays.iter().map(|ray| self.eqs.evaluate(r, &ray.v)).collect();
            let (mut next, mut pos, mut neg) = (Vec::new(), Vec::new(), Vec::new());
            for (i, d) in dots.iter().enumerate() {
                match d.sign() {
                    0 => next.push(i),
                    1 => pos.push(i),
                    _ => neg.push(i),
                }
            }
            trace!(row = r, zero = next.len(), pos = pos.len(), neg = neg.len(), "hyperplane");

            let mut created = Vec::new();
            for &p in &pos {
                for &n in &neg {
                    if !self.poller.tick(r, total) {
                        return Ok(None);
                    }
                    let (rp, rn) = (&rays[p], &rays[n]);
                    if !compatible(&rp.zeros, &rn.zeros, &masks) {
                        continue;
                    }
                    let blocked = rays.iter().enumerate().any(|(k, other)| {
                        k != p && k != n && other.zeros.contains_intn(&rp.zeros, &rn.zeros)
                    });
                    if !blocked {
                        created.push(Ray::intersect(rp, &dots[p], rn, &dots[n]));
                    }
                }
            }

            let mut kept: Vec<Ray<B>> = Vec::with_capacity(next.len() + created.len());
            let mut old: Vec<Option<Ray<B>>> = rays.into_iter().map(Some).collect();
            for i in next {
                if let Some(ray) = old[i].take() {
                    kept.push(ray);
                }
            }
            kept.extend(created);
            rays = kept;
        }
        if !self.poller.checkpoint(total, total) {
            return Ok(None);
        }
        Ok(Some(rays.into_iter().map(Ray::into_vector).collect()))
    }
}

/// The support of the would-be intersection meets every constraint mask at
/// most once.
pub(crate) fn compatible<B: Bitmask>(zp: &B, zn: &B, masks: &[B]) -> bool {
    let mut support = zp.clone();
    support.and_with(zn);
    support.flip();
    masks.iter().all(|k| support.meets_at_most_once(k))
}
