//! Dense vectors of exact integers.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::arith::IntegerBase;
use crate::error::{Error, Result};

/// Fixed-length vector of [`IntegerBase`] entries.
///
/// Operator forms (`+=`, `-`, ...) panic on a length mismatch; the named
/// methods that can fail return `FailedPrecondition` instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Vector<T> {
    elts: Vec<T>,
}

impl<const I: bool> Vector<IntegerBase<I>> {
    pub fn zero(dim: usize) -> Self {
        Self {
            elts: vec![IntegerBase::zero(); dim],
        }
    }

    /// The `i`-th standard basis vector of length `dim`.
    pub fn unit(dim: usize, i: usize) -> Self {
        let mut v = Self::zero(dim);
        v.elts[i] = IntegerBase::one();
        v
    }

    pub fn from_vec(elts: Vec<IntegerBase<I>>) -> Self {
        Self { elts }
    }

    pub fn from_i64s(values: &[i64]) -> Self {
        Self {
            elts: values.iter().map(|&v| IntegerBase::new(v)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elts.is_empty()
    }

    pub fn as_slice(&self) -> &[IntegerBase<I>] {
        &self.elts
    }

    pub fn into_inner(self) -> Vec<IntegerBase<I>> {
        self.elts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IntegerBase<I>> {
        self.elts.iter()
    }

    pub fn is_zero(&self) -> bool {
        self.elts.iter().all(IntegerBase::is_zero)
    }

    /// True iff no entry is negative.
    pub fn is_nonnegative(&self) -> bool {
        self.elts.iter().all(|x| x.sign() >= 0)
    }

    pub fn negate(&mut self) {
        self.elts.iter_mut().for_each(IntegerBase::negate);
    }

    fn check_len(&self, other: &Self, op: &str) -> Result<()> {
        if self.len() == other.len() {
            Ok(())
        } else {
            Err(Error::precondition(format!(
                "{op} on vectors of lengths {} and {}",
                self.len(),
                other.len()
            )))
        }
    }

    /// `self += k * other`.
    pub fn add_copies(&mut self, other: &Self, k: &IntegerBase<I>) -> Result<()> {
        self.check_len(other, "add_copies")?;
        if k.is_zero() {
            return Ok(());
        }
        for (a, b) in self.elts.iter_mut().zip(&other.elts) {
            if !b.is_zero() {
                *a += b * k;
            }
        }
        Ok(())
    }

    /// `self -= k * other`.
    pub fn subtract_copies(&mut self, other: &Self, k: &IntegerBase<I>) -> Result<()> {
        self.add_copies(other, &-k)
    }

    pub fn dot(&self, other: &Self) -> Result<IntegerBase<I>> {
        self.check_len(other, "dot")?;
        Ok(self
            .elts
            .iter()
            .zip(&other.elts)
            .filter(|(a, b)| !a.is_zero() && !b.is_zero())
            .map(|(a, b)| a * b)
            .sum())
    }

    /// Divides every finite entry by the gcd of the finite entries and
    /// returns that gcd. Signs are preserved; the zero vector is left alone
    /// and reports 1.
    pub fn scale_down(&mut self) -> IntegerBase<I> {
        let mut g = IntegerBase::zero();
        for x in self.elts.iter().filter(|x| !x.is_infinite()) {
            g = g.gcd(x);
            if g == 1 {
                return g;
            }
        }
        if g.is_zero() {
            return IntegerBase::one();
        }
        for x in self.elts.iter_mut().filter(|x| !x.is_infinite()) {
            if !x.is_zero() {
                *x = x.div_exact(&g);
            }
        }
        g
    }

    /// Entries interpreted as `i64`, or `None` if any does not fit.
    pub fn to_i64s(&self) -> Option<Vec<i64>> {
        self.elts.iter().map(IntegerBase::to_i64).collect()
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;
    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.elts[i]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.elts[i]
    }
}

impl<const I: bool> AddAssign<&Vector<IntegerBase<I>>> for Vector<IntegerBase<I>> {
    fn add_assign(&mut self, rhs: &Self) {
        assert_eq!(self.len(), rhs.len(), "vector length mismatch");
        for (a, b) in self.elts.iter_mut().zip(&rhs.elts) {
            *a += b;
        }
    }
}

impl<const I: bool> SubAssign<&Vector<IntegerBase<I>>> for Vector<IntegerBase<I>> {
    fn sub_assign(&mut self, rhs: &Self) {
        assert_eq!(self.len(), rhs.len(), "vector length mismatch");
        for (a, b) in self.elts.iter_mut().zip(&rhs.elts) {
            *a -= b;
        }
    }
}

impl<const I: bool> MulAssign<&IntegerBase<I>> for Vector<IntegerBase<I>> {
    fn mul_assign(&mut self, k: &IntegerBase<I>) {
        for a in self.elts.iter_mut() {
            *a *= k;
        }
    }
}

impl<const I: bool> Add for &Vector<IntegerBase<I>> {
    type Output = Vector<IntegerBase<I>>;
    fn add(self, rhs: Self) -> Self::Output {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl<const I: bool> Sub for &Vector<IntegerBase<I>> {
    type Output = Vector<IntegerBase<I>>;
    fn sub(self, rhs: Self) -> Self::Output {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl<const I: bool> Mul<&IntegerBase<I>> for &Vector<IntegerBase<I>> {
    type Output = Vector<IntegerBase<I>>;
    fn mul(self, k: &IntegerBase<I>) -> Self::Output {
        let mut out = self.clone();
        out *= k;
        out
    }
}

impl<const I: bool> Neg for Vector<IntegerBase<I>> {
    type Output = Self;
    fn neg(mut self) -> Self {
        self.negate();
        self
    }
}

impl<T: fmt::Display> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, x) in self.elts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str(")")
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self {
            elts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::{Integer, LargeInteger};
    use proptest::prelude::*;

    type V = Vector<Integer>;

    #[test]
    fn scale_down_divides_by_gcd() {
        let mut v = V::from_i64s(&[4, -6, 0, 10]);
        assert_eq!(v.scale_down(), Integer::new(2));
        assert_eq!(v, V::from_i64s(&[2, -3, 0, 5]));
        assert_eq!(v.scale_down(), Integer::one());

        let mut z = V::zero(3);
        assert_eq!(z.scale_down(), Integer::one());
        assert!(z.is_zero());
    }

    #[test]
    fn scale_down_skips_infinite_entries() {
        let mut v = Vector::from_vec(vec![
            LargeInteger::new(6),
            LargeInteger::infinity(),
            LargeInteger::new(9),
        ]);
        assert_eq!(v.scale_down(), LargeInteger::new(3));
        assert_eq!(v[0], LargeInteger::new(2));
        assert!(v[1].is_infinite());
        assert_eq!(v[2], LargeInteger::new(3));
    }

    #[test]
    fn add_copies_and_mismatch() {
        let mut a = V::from_i64s(&[1, 2, 3]);
        a.add_copies(&V::from_i64s(&[1, 0, -1]), &Integer::new(3))
            .unwrap();
        assert_eq!(a, V::from_i64s(&[4, 2, 0]));
        a.subtract_copies(&V::unit(3, 1), &Integer::new(2)).unwrap();
        assert_eq!(a, V::from_i64s(&[4, 0, 0]));
        assert!(matches!(
            a.add_copies(&V::zero(2), &Integer::one()),
            Err(Error::FailedPrecondition(_))
        ));
        assert!(matches!(
            a.dot(&V::zero(4)),
            Err(Error::FailedPrecondition(_))
        ));
    }

    #[test]
    fn arithmetic_and_display() {
        let a = V::from_i64s(&[1, -2]);
        let b = V::from_i64s(&[3, 5]);
        assert_eq!(&a + &b, V::from_i64s(&[4, 3]));
        assert_eq!(&a - &b, V::from_i64s(&[-2, -7]));
        assert_eq!(&a * &Integer::new(-3), V::from_i64s(&[-3, 6]));
        assert_eq!(a.dot(&b).unwrap(), Integer::new(-7));
        assert_eq!(-a.clone(), V::from_i64s(&[-1, 2]));
        assert_eq!(a.to_string(), "(1 -2)");
    }

    proptest! {
        #[test]
        fn scale_down_is_idempotent(v in proptest::collection::vec(-50i64..50, 1..12)) {
            let mut once = V::from_i64s(&v);
            once.scale_down();
            let mut twice = once.clone();
            prop_assert_eq!(twice.scale_down(), Integer::one());
            prop_assert_eq!(&twice, &once);
        }

        #[test]
        fn scale_down_restores_by_multiplying(v in proptest::collection::vec(-50i64..50, 1..12)) {
            let orig = V::from_i64s(&v);
            let mut w = orig.clone();
            let g = w.scale_down();
            prop_assert_eq!(&w * &g, orig);
        }
    }
}
