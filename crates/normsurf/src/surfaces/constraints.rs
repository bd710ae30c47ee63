//! "At most one non-zero" families of coordinates.

use super::coords::NormalEncoding;
use crate::arith::Integer;
use crate::bitmask::Bitmask;
use crate::error::{Error, Result};
use crate::vector::Vector;

/// Lists of positions; each list may hold at most one non-zero coordinate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    sets: Vec<Vec<usize>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// One family per tetrahedron: its three quads, plus its three octagons
    /// when `enc` stores them (so an octagon also excludes every quad).
    pub fn quad(enc: NormalEncoding, tetrahedra: usize) -> Self {
        let sets = (0..tetrahedra)
            .map(|t| {
                (0..3)
                    .map(|k| enc.quad_pos(t, k))
                    .chain((0..3).filter_map(|k| enc.oct_pos(t, k)))
                    .collect()
            })
            .collect();
        Self { sets }
    }

    pub fn push(&mut self, positions: Vec<usize>) {
        self.sets.push(positions);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.sets.iter().map(Vec::as_slice)
    }

    /// One mask of length `len` per family.
    ///
    /// Fails with `InvalidArgument` if a position is out of range or is not a
    /// quad/octagon slot of `enc`.
    pub fn to_bitmasks<B: Bitmask>(&self, enc: NormalEncoding, len: usize) -> Result<Vec<B>> {
        self.sets
            .iter()
            .map(|set| {
                for &pos in set {
                    if pos >= len || !enc.is_quad_or_oct(pos) {
                        return Err(Error::invalid(format!(
                            "constraint on position {pos}, which is not a quad/oct slot"
                        )));
                    }
                }
                Ok(B::from_bits(len, set.iter().copied()))
            })
            .collect()
    }

    /// True iff every family has at most one non-zero entry in `v`.
    pub fn admits(&self, v: &Vector<Integer>) -> bool {
        self.sets
            .iter()
            .all(|set| set.iter().filter(|&&p| !v[p].is_zero()).count() <= 1)
    }
}
