use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{Signed, ToPrimitive};

use super::{Integer, LargeInteger};
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Kind {
    /// Lowest terms, `den > 0`.
    Normal { num: Integer, den: Integer },
    Infinity,
    Undefined,
}

/// Exact rational number with an unsigned infinity and an undefined value.
///
/// `n/0` is infinity for `n != 0` and `0/0` is undefined. Any arithmetic with
/// an undefined operand is undefined. Under the total order undefined is the
/// minimum and infinity the maximum.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    kind: Kind,
}

impl Rational {
    pub fn new(num: impl Into<Integer>, den: impl Into<Integer>) -> Self {
        let num = num.into();
        let den = den.into();
        if den.is_zero() {
            return if num.is_zero() {
                Self::undefined()
            } else {
                Self::infinity()
            };
        }
        let g = num.gcd(&den);
        let (mut num, mut den) = (num.div_exact(&g), den.div_exact(&g));
        if den.sign() < 0 {
            num.negate();
            den.negate();
        }
        Self {
            kind: Kind::Normal { num, den },
        }
    }

    pub fn zero() -> Self {
        Self::from(Integer::zero())
    }

    pub fn one() -> Self {
        Self::from(Integer::one())
    }

    pub fn infinity() -> Self {
        Self {
            kind: Kind::Infinity,
        }
    }

    pub fn undefined() -> Self {
        Self {
            kind: Kind::Undefined,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.kind, Kind::Infinity)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.kind, Kind::Undefined)
    }

    pub fn is_zero(&self) -> bool {
        matches!(&self.kind, Kind::Normal { num, .. } if num.is_zero())
    }

    /// Numerator in lowest terms; 1 for infinity and 0 for undefined.
    pub fn numerator(&self) -> Integer {
        match &self.kind {
            Kind::Normal { num, .. } => num.clone(),
            Kind::Infinity => Integer::one(),
            Kind::Undefined => Integer::zero(),
        }
    }

    /// Denominator in lowest terms; 0 for infinity and undefined.
    pub fn denominator(&self) -> Integer {
        match &self.kind {
            Kind::Normal { den, .. } => den.clone(),
            _ => Integer::zero(),
        }
    }

    /// The integer value when the denominator is 1.
    pub fn to_integer(&self) -> Option<Integer> {
        match &self.kind {
            Kind::Normal { num, den } if *den == 1 => Some(num.clone()),
            _ => None,
        }
    }

    pub fn inverse(&self) -> Self {
        match &self.kind {
            Kind::Normal { num, den } => Self::new(den.clone(), num.clone()),
            Kind::Infinity => Self::zero(),
            Kind::Undefined => Self::undefined(),
        }
    }

    pub fn abs(&self) -> Self {
        match &self.kind {
            Kind::Normal { num, den } => Self {
                kind: Kind::Normal {
                    num: num.abs(),
                    den: den.clone(),
                },
            },
            _ => self.clone(),
        }
    }

    /// Closest `f64`.
    ///
    /// Fails with `OutOfRange` for infinity, undefined, or a non-zero value
    /// whose magnitude overflows or underflows a finite non-zero double.
    pub fn double_approx(&self) -> Result<f64> {
        let (num, den) = match &self.kind {
            Kind::Normal { num, den } => (num, den),
            Kind::Infinity => return Err(Error::out_of_range("infinity has no double value")),
            Kind::Undefined => return Err(Error::out_of_range("undefined has no double value")),
        };
        if num.is_zero() {
            return Ok(0.0);
        }
        let (Some(n), Some(d)) = (num.to_big(), den.to_big()) else {
            return Err(Error::impossible("normal rational with infinite part"));
        };
        // Keep about 60 significant bits of each side, then reapply the scale.
        let shift_n = n.bits().saturating_sub(60);
        let shift_d = d.bits().saturating_sub(60);
        let nf = (n.abs() >> shift_n).to_f64().unwrap_or(f64::NAN);
        let df = (d >> shift_d).to_f64().unwrap_or(f64::NAN);
        let exp = shift_n as i64 - shift_d as i64;
        let exp = exp.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let mut value = nf / df * 2f64.powi(exp);
        if num.sign() < 0 {
            value = -value;
        }
        if value.is_finite() && value != 0.0 {
            Ok(value)
        } else {
            Err(Error::out_of_range(format!(
                "{self} cannot be represented as a finite non-zero double"
            )))
        }
    }

    fn add_ref(&self, rhs: &Self) -> Self {
        match (&self.kind, &rhs.kind) {
            (Kind::Undefined, _) | (_, Kind::Undefined) => Self::undefined(),
            (Kind::Infinity, _) | (_, Kind::Infinity) => Self::infinity(),
            (Kind::Normal { num: a, den: b }, Kind::Normal { num: c, den: d }) => {
                Self::new(a * d + c * b, b * d)
            }
        }
    }

    fn sub_ref(&self, rhs: &Self) -> Self {
        match (&self.kind, &rhs.kind) {
            (Kind::Infinity, Kind::Infinity) => Self::undefined(),
            _ => self.add_ref(&-rhs),
        }
    }

    fn mul_ref(&self, rhs: &Self) -> Self {
        match (&self.kind, &rhs.kind) {
            (Kind::Undefined, _) | (_, Kind::Undefined) => Self::undefined(),
            (Kind::Infinity, _) | (_, Kind::Infinity) => {
                if self.is_zero() || rhs.is_zero() {
                    Self::undefined()
                } else {
                    Self::infinity()
                }
            }
            (Kind::Normal { num: a, den: b }, Kind::Normal { num: c, den: d }) => {
                Self::new(a * c, b * d)
            }
        }
    }

    fn div_ref(&self, rhs: &Self) -> Self {
        self.mul_ref(&rhs.inverse())
    }
}

impl From<Integer> for Rational {
    fn from(value: Integer) -> Self {
        Self {
            kind: Kind::Normal {
                num: value,
                den: Integer::one(),
            },
        }
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from(Integer::new(value))
    }
}

impl From<LargeInteger> for Rational {
    fn from(value: LargeInteger) -> Self {
        match value.to_finite() {
            Some(v) => Self::from(v),
            None => Self::infinity(),
        }
    }
}

impl Neg for &Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        match &self.kind {
            Kind::Normal { num, den } => Rational {
                kind: Kind::Normal {
                    num: -num,
                    den: den.clone(),
                },
            },
            _ => self.clone(),
        }
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        -&self
    }
}

macro_rules! rational_binop {
    ($Trait:ident, $method:ident, $inner:ident) => {
        impl $Trait<&Rational> for &Rational {
            type Output = Rational;
            fn $method(self, rhs: &Rational) -> Rational {
                self.$inner(rhs)
            }
        }
        impl $Trait<Rational> for Rational {
            type Output = Rational;
            fn $method(self, rhs: Rational) -> Rational {
                self.$inner(&rhs)
            }
        }
        impl $Trait<&Rational> for Rational {
            type Output = Rational;
            fn $method(self, rhs: &Rational) -> Rational {
                self.$inner(rhs)
            }
        }
    };
}

rational_binop!(Add, add, add_ref);
rational_binop!(Sub, sub, sub_ref);
rational_binop!(Mul, mul, mul_ref);
rational_binop!(Div, div, div_ref);

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.kind, &other.kind) {
            (Kind::Undefined, Kind::Undefined) | (Kind::Infinity, Kind::Infinity) => {
                Ordering::Equal
            }
            (Kind::Undefined, _) | (_, Kind::Infinity) => Ordering::Less,
            (_, Kind::Undefined) | (Kind::Infinity, _) => Ordering::Greater,
            (Kind::Normal { num: a, den: b }, Kind::Normal { num: c, den: d }) => {
                if b == d {
                    a.cmp(c)
                } else {
                    (a * d).cmp(&(c * b))
                }
            }
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Infinity => f.write_str("Inf"),
            Kind::Undefined => f.write_str("Undef"),
            Kind::Normal { num, den } if *den == 1 => write!(f, "{num}"),
            Kind::Normal { num, den } => write!(f, "{num}/{den}"),
        }
    }
}
