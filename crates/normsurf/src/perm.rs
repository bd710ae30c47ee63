//! Permutations of {0,1,2,3} and the fixed combinatorics of a tetrahedron.
//!
//! Gluings between tetrahedra are elements of S₄. Externally a permutation is
//! identified by its Lehmer index in `[0, 24)`, which is its rank in the
//! lexicographic order of image sequences (`0123` is 0, `3210` is 23).

use std::fmt;
use std::ops::Mul;

use crate::error::{Error, Result};

/// A permutation of {0,1,2,3}, stored as its image sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Perm4 {
    img: [u8; 4],
}

impl Perm4 {
    pub const IDENTITY: Perm4 = Perm4 { img: [0, 1, 2, 3] };
    /// The number of elements of S₄.
    pub const COUNT: usize = 24;

    /// Builds the permutation `i ↦ images[i]`.
    pub fn from_images(images: [usize; 4]) -> Result<Self> {
        let mut seen = [false; 4];
        for &x in &images {
            if x > 3 || seen[x] {
                return Err(Error::invalid(format!("{images:?} is not a permutation of 0..4")));
            }
            seen[x] = true;
        }
        Ok(Self {
            img: images.map(|x| x as u8),
        })
    }

    /// For tables known to hold permutations.
    pub(crate) const fn from_images_unchecked(img: [u8; 4]) -> Self {
        Self { img }
    }

    /// Decodes a Lehmer index in `[0, 24)`.
    pub fn from_index(index: usize) -> Result<Self> {
        if index >= Self::COUNT {
            return Err(Error::invalid(format!("permutation index {index} out of range")));
        }
        let mut pool = vec![0u8, 1, 2, 3];
        let mut rest = index;
        let mut img = [0u8; 4];
        for (slot, radix) in [6usize, 2, 1, 1].into_iter().enumerate() {
            img[slot] = pool.remove(rest / radix);
            rest %= radix;
        }
        Ok(Self { img })
    }

    /// Lehmer index: lexicographic rank of the image sequence.
    pub fn index(self) -> usize {
        let mut idx = 0;
        for (i, radix) in [6usize, 2, 1].into_iter().enumerate() {
            let smaller_later = self.img[i + 1..]
                .iter()
                .filter(|&&x| x < self.img[i])
                .count();
            idx += smaller_later * radix;
        }
        idx
    }

    /// The transposition swapping `a` and `b` (identity when `a == b`).
    pub fn transposition(a: usize, b: usize) -> Self {
        let mut img = [0u8, 1, 2, 3];
        img.swap(a, b);
        Self { img }
    }

    /// All 24 permutations in index order.
    pub fn all() -> impl Iterator<Item = Perm4> {
        (0..Self::COUNT).filter_map(|i| Self::from_index(i).ok())
    }

    #[inline]
    pub fn apply(self, i: usize) -> usize {
        self.img[i] as usize
    }

    #[inline]
    pub fn images(self) -> [usize; 4] {
        self.img.map(usize::from)
    }

    pub fn inverse(self) -> Self {
        let mut img = [0u8; 4];
        for i in 0..4 {
            img[self.img[i] as usize] = i as u8;
        }
        Self { img }
    }

    /// +1 for even permutations, −1 for odd.
    pub fn sign(self) -> i32 {
        let mut s = 1;
        for i in 0..4 {
            for j in i + 1..4 {
                if self.img[i] > self.img[j] {
                    s = -s;
                }
            }
        }
        s
    }

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }
}

/// Composition: `(p * q)(i) = p(q(i))`.
impl Mul for Perm4 {
    type Output = Perm4;
    #[inline]
    fn mul(self, q: Perm4) -> Perm4 {
        Perm4 {
            img: q.img.map(|x| self.img[x as usize]),
        }
    }
}

impl Default for Perm4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Perm4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Perm4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.img;
        write!(f, "{a}{b}{c}{d}")
    }
}

/// Edge `e` of a tetrahedron joins vertices `EDGE_VERTICES[e]`.
pub const EDGE_VERTICES: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// Number of the edge joining distinct vertices `a` and `b`.
pub fn edge_number(a: usize, b: usize) -> usize {
    debug_assert!(a != b && a < 4 && b < 4);
    const TABLE: [[usize; 4]; 4] = [
        [usize::MAX, 0, 1, 2],
        [0, usize::MAX, 3, 4],
        [1, 3, usize::MAX, 5],
        [2, 4, 5, usize::MAX],
    ];
    TABLE[a][b]
}

/// The even permutation sending 0,1 to the ends of edge `e` (in order) and
/// 2,3 to the remaining vertices.
pub fn edge_ordering(e: usize) -> Perm4 {
    const ORDERINGS: [[u8; 4]; 6] = [
        [0, 1, 2, 3],
        [0, 2, 3, 1],
        [0, 3, 1, 2],
        [1, 2, 0, 3],
        [1, 3, 2, 0],
        [2, 3, 0, 1],
    ];
    Perm4 { img: ORDERINGS[e] }
}

/// The permutation sending 0,1,2 to the vertices of face `f` in increasing
/// order and 3 to `f`.
pub fn face_ordering(f: usize) -> Perm4 {
    let mut img = [0u8; 4];
    let mut k = 0;
    for v in 0..4u8 {
        if v as usize != f {
            img[k] = v;
            k += 1;
        }
    }
    img[3] = f as u8;
    Perm4 { img }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn index_is_lexicographic_rank() {
        let all: Vec<Perm4> = Perm4::all().collect();
        assert_eq!(all.len(), 24);
        assert_eq!(all[0], Perm4::IDENTITY);
        assert_eq!(all[23].images(), [3, 2, 1, 0]);
        for w in all.windows(2) {
            assert!(w[0].images() < w[1].images());
        }
        for (i, p) in all.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
        assert!(Perm4::from_index(24).is_err());
        assert!(Perm4::from_images([0, 1, 1, 3]).is_err());
    }

    #[test]
    fn edge_orderings_are_even_and_match_numbering() {
        for e in 0..6 {
            let p = edge_ordering(e);
            assert_eq!(p.sign(), 1);
            assert_eq!(edge_number(p.apply(0), p.apply(1)), e);
            assert_eq!([p.apply(0), p.apply(1)], EDGE_VERTICES[e]);
        }
    }

    #[test]
    fn face_ordering_sends_three_to_face() {
        for f in 0..4 {
            let p = face_ordering(f);
            assert_eq!(p.apply(3), f);
            assert!(p.apply(0) < p.apply(1) && p.apply(1) < p.apply(2));
        }
    }

    fn any_perm() -> impl Strategy<Value = Perm4> {
        (0usize..24).prop_map(|i| Perm4::from_index(i).unwrap())
    }

    proptest! {
        #[test]
        fn group_laws(p in any_perm(), q in any_perm(), r in any_perm()) {
            prop_assert_eq!((p * q) * r, p * (q * r));
            prop_assert_eq!(p * p.inverse(), Perm4::IDENTITY);
            prop_assert_eq!((p * q).sign(), p.sign() * q.sign());
            prop_assert_eq!((p * q).apply(2), p.apply(q.apply(2)));
        }

        #[test]
        fn transpositions_are_odd(a in 0usize..4, b in 0usize..4) {
            prop_assume!(a != b);
            let t = Perm4::transposition(a, b);
            prop_assert_eq!(t.sign(), -1);
            prop_assert_eq!(t * t, Perm4::IDENTITY);
        }
    }
}
