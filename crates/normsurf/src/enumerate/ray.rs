//! Working rays: a vector plus the mask of its zero coordinates.

use crate::arith::Integer;
use crate::bitmask::Bitmask;
use crate::vector::Vector;

/// A ray of the cone being enumerated.
///
/// `zeros` always mirrors `v`: bit `i` is set iff `v[i] == 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ray<B: Bitmask> {
    pub v: Vector<Integer>,
    pub zeros: B,
}

impl<B: Bitmask> Ray<B> {
    pub fn unit(dim: usize, i: usize) -> Self {
        Self::from_vector(Vector::unit(dim, i))
    }

    pub fn from_vector(v: Vector<Integer>) -> Self {
        let zeros = B::from_bits(v.len(), v.iter().enumerate().filter(|(_, x)| x.is_zero()).map(|(i, _)| i));
        Self { v, zeros }
    }

    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    /// -1, 0 or +1: the sign of coordinate `i`.
    #[inline]
    pub fn sign(&self, i: usize) -> i32 {
        if self.zeros.get(i) {
            0
        } else {
            self.v[i].sign()
        }
    }

    /// The ray on the segment between `pos` and `neg` where the linear form
    /// taking values `dp > 0` on `pos` and `dn < 0` on `neg` vanishes, in
    /// smallest integer form: `neg·dp − pos·dn`, scaled down.
    pub fn intersect(pos: &Self, dp: &Integer, neg: &Self, dn: &Integer) -> Self {
        let mut v = &neg.v * dp;
        // dn < 0, so this adds |dn| copies of pos.
        v -= &(&pos.v * dn);
        v.scale_down();
        Self::from_vector(v)
    }

    /// Intersection on coordinate `c`: the new ray has `v[c] == 0`.
    pub fn intersect_at(pos: &Self, neg: &Self, c: usize) -> Self {
        Self::intersect(pos, &pos.v[c], neg, &neg.v[c])
    }

    pub fn into_vector(self) -> Vector<Integer> {
        self.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask::{Bitmask1, BitmaskVec};

    #[test]
    fn zero_mask_tracks_entries() {
        let r: Ray<Bitmask1<u8>> = Ray::from_vector(Vector::from_i64s(&[0, 3, -2, 0]));
        assert_eq!(r.zeros.ones(), vec![0, 3]);
        assert_eq!((r.sign(0), r.sign(1), r.sign(2)), (0, 1, -1));
        let u: Ray<BitmaskVec> = Ray::unit(5, 2);
        assert_eq!(u.zeros.popcount(), 4);
        assert_eq!(u.sign(2), 1);
    }

    #[test]
    fn intersection_zeroes_the_pivot() {
        let p: Ray<Bitmask1<u8>> = Ray::from_vector(Vector::from_i64s(&[2, 0, 4]));
        let n: Ray<Bitmask1<u8>> = Ray::from_vector(Vector::from_i64s(&[0, 3, -6]));
        let r = Ray::intersect_at(&p, &n, 2);
        // 4·n − (−6)·p = (12, 12, 0) → (1, 1, 0)
        assert_eq!(r.v, Vector::from_i64s(&[1, 1, 0]));
        assert_eq!(r.zeros.ones(), vec![2]);
    }
}
