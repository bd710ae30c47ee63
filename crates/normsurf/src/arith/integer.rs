use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::{Error, Result};

/// Internal representation. `Big` never holds a value that fits in `i64`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Repr {
    Native(i64),
    Big(BigInt),
    Infinity,
}

/// Arbitrary-precision integer with a native fast path.
///
/// `INFINITY` selects whether the value may also be the single unsigned
/// infinity. Use the aliases [`Integer`] and [`LargeInteger`].
///
/// Invariants:
/// - A value that fits in `i64` is always stored natively.
/// - Infinity only ever appears when `INFINITY == true`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntegerBase<const INFINITY: bool> {
    repr: Repr,
}

/// Exact integer without an infinite value.
pub type Integer = IntegerBase<false>;
/// Exact integer that also admits infinity (division by zero produces it).
pub type LargeInteger = IntegerBase<true>;

impl<const INFINITY: bool> IntegerBase<INFINITY> {
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self {
            repr: Repr::Native(value),
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0)
    }

    #[inline]
    pub const fn one() -> Self {
        Self::new(1)
    }

    pub fn from_big(value: BigInt) -> Self {
        match value.to_i64() {
            Some(v) => Self::new(v),
            None => Self {
                repr: Repr::Big(value),
            },
        }
    }

    fn infinite() -> Self {
        debug_assert!(INFINITY, "infinity requested from a finite integer type");
        Self {
            repr: Repr::Infinity,
        }
    }

    /// True iff the value is held in a machine word.
    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self.repr, Repr::Native(_))
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        matches!(self.repr, Repr::Infinity)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self.repr, Repr::Native(0))
    }

    /// −1, 0 or +1. Infinity counts as positive.
    pub fn sign(&self) -> i32 {
        match &self.repr {
            Repr::Native(v) => v.signum() as i32,
            Repr::Big(b) => {
                if b.is_negative() {
                    -1
                } else {
                    1
                }
            }
            Repr::Infinity => 1,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match &self.repr {
            Repr::Native(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a `BigInt`, or `None` for infinity. This is the raw view
    /// used when handing values to other big-integer code.
    pub fn to_big(&self) -> Option<BigInt> {
        match &self.repr {
            Repr::Native(v) => Some(BigInt::from(*v)),
            Repr::Big(b) => Some(b.clone()),
            Repr::Infinity => None,
        }
    }

    /// Borrowed big view of a finite value. Callers check for infinity first.
    fn big(&self) -> Cow<'_, BigInt> {
        match &self.repr {
            Repr::Native(v) => Cow::Owned(BigInt::from(*v)),
            Repr::Big(b) => Cow::Borrowed(b),
            Repr::Infinity => Cow::Owned(BigInt::zero()),
        }
    }

    /// Moves a big representation back to native form when it fits.
    pub fn try_reduce(&mut self) {
        if let Repr::Big(b) = &self.repr {
            if let Some(v) = b.to_i64() {
                self.repr = Repr::Native(v);
            }
        }
    }

    pub fn abs(&self) -> Self {
        match &self.repr {
            Repr::Native(v) => match v.checked_abs() {
                Some(a) => Self::new(a),
                None => Self::from_big(BigInt::from(*v).abs()),
            },
            Repr::Big(b) => Self::from_big(b.abs()),
            Repr::Infinity => Self::infinite(),
        }
    }

    /// Negates in place. Infinity is unsigned and stays infinite.
    pub fn negate(&mut self) {
        *self = self.negated();
    }

    fn negated(&self) -> Self {
        match &self.repr {
            Repr::Native(v) => match v.checked_neg() {
                Some(n) => Self::new(n),
                None => Self::from_big(-BigInt::from(*v)),
            },
            Repr::Big(b) => Self::from_big(-b),
            Repr::Infinity => Self::infinite(),
        }
    }

    /// Non-negative greatest common divisor. Infinite operands are ignored,
    /// so `gcd(inf, x) == |x|`.
    pub fn gcd(&self, other: &Self) -> Self {
        match (&self.repr, &other.repr) {
            (Repr::Infinity, _) => other.abs_finite(),
            (_, Repr::Infinity) => self.abs_finite(),
            (Repr::Native(a), Repr::Native(b)) => {
                let g = a.unsigned_abs().gcd(&b.unsigned_abs());
                match i64::try_from(g) {
                    Ok(v) => Self::new(v),
                    Err(_) => Self::from_big(BigInt::from(g)),
                }
            }
            _ => Self::from_big(self.big().gcd(&other.big())),
        }
    }

    fn abs_finite(&self) -> Self {
        if self.is_infinite() {
            Self::zero()
        } else {
            self.abs()
        }
    }

    /// Non-negative least common multiple; zero if either operand is zero.
    pub fn lcm(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let g = self.gcd(other);
        (self.div_exact(&g) * other).abs()
    }

    /// Division when `divisor` is known to divide `self` exactly.
    ///
    /// The result is meaningless if it does not; a zero divisor panics.
    pub fn div_exact(&self, divisor: &Self) -> Self {
        match (&self.repr, &divisor.repr) {
            (Repr::Native(a), Repr::Native(b)) => match a.checked_div(*b) {
                Some(q) => Self::new(q),
                None if *b == 0 => panic!("div_exact by zero"),
                None => Self::from_big(BigInt::from(*a) / *b),
            },
            (Repr::Infinity, _) | (_, Repr::Infinity) => Self::infinite(),
            _ => Self::from_big(&*self.big() / &*divisor.big()),
        }
    }

    /// Truncating division.
    ///
    /// Division by zero is `OutOfRange` for [`Integer`] and infinity for
    /// [`LargeInteger`]. Any infinite operand yields infinity.
    pub fn try_div(&self, divisor: &Self) -> Result<Self> {
        if divisor.is_zero() {
            return if INFINITY {
                Ok(Self::infinite())
            } else {
                Err(Error::out_of_range("integer division by zero"))
            };
        }
        Ok(match (&self.repr, &divisor.repr) {
            (Repr::Infinity, _) | (_, Repr::Infinity) => Self::infinite(),
            (Repr::Native(a), Repr::Native(b)) => match a.checked_div(*b) {
                Some(q) => Self::new(q),
                None => Self::from_big(BigInt::from(*a) / *b),
            },
            _ => Self::from_big(&*self.big() / &*divisor.big()),
        })
    }

    /// Remainder of truncating division; takes the sign of `self`.
    pub fn try_rem(&self, divisor: &Self) -> Result<Self> {
        if divisor.is_zero() {
            return if INFINITY {
                Ok(Self::infinite())
            } else {
                Err(Error::out_of_range("integer remainder by zero"))
            };
        }
        Ok(match (&self.repr, &divisor.repr) {
            (Repr::Infinity, _) | (_, Repr::Infinity) => Self::infinite(),
            (Repr::Native(a), Repr::Native(b)) => match a.checked_rem(*b) {
                Some(r) => Self::new(r),
                None => Self::zero(),
            },
            _ => Self::from_big(&*self.big() % &*divisor.big()),
        })
    }

    fn add_ref(&self, rhs: &Self) -> Self {
        match (&self.repr, &rhs.repr) {
            (Repr::Infinity, _) | (_, Repr::Infinity) => Self::infinite(),
            (Repr::Native(a), Repr::Native(b)) => match a.checked_add(*b) {
                Some(s) => Self::new(s),
                None => Self::from_big(BigInt::from(*a) + *b),
            },
            _ => Self::from_big(&*self.big() + &*rhs.big()),
        }
    }

    fn sub_ref(&self, rhs: &Self) -> Self {
        match (&self.repr, &rhs.repr) {
            (Repr::Infinity, _) | (_, Repr::Infinity) => Self::infinite(),
            (Repr::Native(a), Repr::Native(b)) => match a.checked_sub(*b) {
                Some(s) => Self::new(s),
                None => Self::from_big(BigInt::from(*a) - *b),
            },
            _ => Self::from_big(&*self.big() - &*rhs.big()),
        }
    }

    fn mul_ref(&self, rhs: &Self) -> Self {
        match (&self.repr, &rhs.repr) {
            (Repr::Infinity, _) | (_, Repr::Infinity) => Self::infinite(),
            (Repr::Native(a), Repr::Native(b)) => match a.checked_mul(*b) {
                Some(p) => Self::new(p),
                None => Self::from_big(BigInt::from(*a) * *b),
            },
            _ => Self::from_big(&*self.big() * &*rhs.big()),
        }
    }

    fn div_ref(&self, rhs: &Self) -> Self {
        match self.try_div(rhs) {
            Ok(q) => q,
            Err(e) => panic!("{e}"),
        }
    }

    fn rem_ref(&self, rhs: &Self) -> Self {
        match self.try_rem(rhs) {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        }
    }
}

impl LargeInteger {
    pub fn infinity() -> Self {
        Self::infinite()
    }

    /// The finite value as an [`Integer`], or `None` for infinity.
    pub fn to_finite(&self) -> Option<Integer> {
        match &self.repr {
            Repr::Native(v) => Some(Integer::new(*v)),
            Repr::Big(b) => Some(Integer::from_big(b.clone())),
            Repr::Infinity => None,
        }
    }
}

impl From<Integer> for LargeInteger {
    fn from(value: Integer) -> Self {
        match value.repr {
            Repr::Native(v) => Self::new(v),
            Repr::Big(b) => Self::from_big(b),
            Repr::Infinity => Self::infinity(),
        }
    }
}

impl<const INFINITY: bool> Default for IntegerBase<INFINITY> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const INFINITY: bool> From<i64> for IntegerBase<INFINITY> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<const INFINITY: bool> From<i32> for IntegerBase<INFINITY> {
    fn from(value: i32) -> Self {
        Self::new(i64::from(value))
    }
}

impl<const INFINITY: bool> From<usize> for IntegerBase<INFINITY> {
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(v) => Self::new(v),
            Err(_) => Self::from_big(BigInt::from(value)),
        }
    }
}

impl<const INFINITY: bool> From<BigInt> for IntegerBase<INFINITY> {
    fn from(value: BigInt) -> Self {
        Self::from_big(value)
    }
}

impl<const INFINITY: bool> PartialEq<i64> for IntegerBase<INFINITY> {
    fn eq(&self, other: &i64) -> bool {
        matches!(self.repr, Repr::Native(v) if v == *other)
    }
}

impl<const INFINITY: bool> PartialOrd for IntegerBase<INFINITY> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order; infinity is the maximum.
impl<const INFINITY: bool> Ord for IntegerBase<INFINITY> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.repr, &other.repr) {
            (Repr::Infinity, Repr::Infinity) => Ordering::Equal,
            (Repr::Infinity, _) => Ordering::Greater,
            (_, Repr::Infinity) => Ordering::Less,
            (Repr::Native(a), Repr::Native(b)) => a.cmp(b),
            _ => self.big().cmp(&other.big()),
        }
    }
}

impl<const INFINITY: bool> PartialOrd<i64> for IntegerBase<INFINITY> {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        Some(self.cmp(&Self::new(*other)))
    }
}

impl<const INFINITY: bool> fmt::Display for IntegerBase<INFINITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Native(v) => write!(f, "{v}"),
            Repr::Big(b) => write!(f, "{b}"),
            Repr::Infinity => f.write_str("inf"),
        }
    }
}

/// Parses `[+-]digits` in decimal, or `[+-]0x` / `0X` followed by hex digits.
/// [`LargeInteger`] also accepts `inf`. Surrounding whitespace is ignored.
impl<const INFINITY: bool> FromStr for IntegerBase<INFINITY> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if INFINITY && trimmed.eq_ignore_ascii_case("inf") {
            return Ok(Self::infinite());
        }
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (radix, digits) = match unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
        {
            Some(hex) => (16, hex),
            None => (10, unsigned),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(Error::invalid(format!("malformed integer literal {s:?}")));
        }
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)
            .ok_or_else(|| Error::invalid(format!("malformed integer literal {s:?}")))?;
        Ok(Self::from_big(if negative { -magnitude } else { magnitude }))
    }
}

macro_rules! forward_binop {
    ($Trait:ident, $method:ident, $inner:ident) => {
        impl<const I: bool> $Trait<&IntegerBase<I>> for &IntegerBase<I> {
            type Output = IntegerBase<I>;
            #[inline]
            fn $method(self, rhs: &IntegerBase<I>) -> IntegerBase<I> {
                self.$inner(rhs)
            }
        }
        impl<const I: bool> $Trait<IntegerBase<I>> for IntegerBase<I> {
            type Output = IntegerBase<I>;
            #[inline]
            fn $method(self, rhs: IntegerBase<I>) -> IntegerBase<I> {
                self.$inner(&rhs)
            }
        }
        impl<const I: bool> $Trait<&IntegerBase<I>> for IntegerBase<I> {
            type Output = IntegerBase<I>;
            #[inline]
            fn $method(self, rhs: &IntegerBase<I>) -> IntegerBase<I> {
                self.$inner(rhs)
            }
        }
        impl<const I: bool> $Trait<IntegerBase<I>> for &IntegerBase<I> {
            type Output = IntegerBase<I>;
            #[inline]
            fn $method(self, rhs: IntegerBase<I>) -> IntegerBase<I> {
                self.$inner(&rhs)
            }
        }
        impl<const I: bool> $Trait<i64> for IntegerBase<I> {
            type Output = IntegerBase<I>;
            #[inline]
            fn $method(self, rhs: i64) -> IntegerBase<I> {
                self.$inner(&IntegerBase::new(rhs))
            }
        }
        impl<const I: bool> $Trait<i64> for &IntegerBase<I> {
            type Output = IntegerBase<I>;
            #[inline]
            fn $method(self, rhs: i64) -> IntegerBase<I> {
                self.$inner(&IntegerBase::new(rhs))
            }
        }
    };
}

macro_rules! forward_assign {
    ($Trait:ident, $method:ident, $inner:ident) => {
        impl<const I: bool> $Trait<&IntegerBase<I>> for IntegerBase<I> {
            #[inline]
            fn $method(&mut self, rhs: &IntegerBase<I>) {
                *self = (&*self).$inner(rhs);
            }
        }
        impl<const I: bool> $Trait<IntegerBase<I>> for IntegerBase<I> {
            #[inline]
            fn $method(&mut self, rhs: IntegerBase<I>) {
                *self = (&*self).$inner(&rhs);
            }
        }
        impl<const I: bool> $Trait<i64> for IntegerBase<I> {
            #[inline]
            fn $method(&mut self, rhs: i64) {
                *self = (&*self).$inner(&IntegerBase::new(rhs));
            }
        }
    };
}

forward_binop!(Add, add, add_ref);
forward_binop!(Sub, sub, sub_ref);
forward_binop!(Mul, mul, mul_ref);
forward_binop!(Div, div, div_ref);
forward_binop!(Rem, rem, rem_ref);
forward_assign!(AddAssign, add_assign, add_ref);
forward_assign!(SubAssign, sub_assign, sub_ref);
forward_assign!(MulAssign, mul_assign, mul_ref);
forward_assign!(DivAssign, div_assign, div_ref);
forward_assign!(RemAssign, rem_assign, rem_ref);

impl<const I: bool> Neg for IntegerBase<I> {
    type Output = IntegerBase<I>;
    fn neg(self) -> IntegerBase<I> {
        self.negated()
    }
}

impl<const I: bool> Neg for &IntegerBase<I> {
    type Output = IntegerBase<I>;
    fn neg(self) -> IntegerBase<I> {
        self.negated()
    }
}

impl<const I: bool> Sum for IntegerBase<I> {
    fn sum<It: Iterator<Item = Self>>(iter: It) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl<'a, const I: bool> Sum<&'a IntegerBase<I>> for IntegerBase<I> {
    fn sum<It: Iterator<Item = &'a Self>>(iter: It) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}
