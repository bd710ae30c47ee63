//! Exact arithmetic: arbitrary-precision integers and rationals.
//!
//! Purpose
//! - Every coordinate of a normal surface, every ray of an enumeration and every
//!   matching-equation evaluation flows through `Integer`.
//! - `Rational` is only used where denominators appear naturally (Euler
//!   characteristic sums over disc pieces).
//!
//! Why this design
//! - Values live in a native `i64` until an operation overflows; only then is
//!   a `num_bigint::BigInt` allocated. Results are reduced back to native form
//!   whenever they fit, so equality can compare representations directly.
//! - The infinity-admitting variant is the same type with a const flag, so the
//!   two share all code and differ only where infinity is observable.

mod integer;
mod rational;

pub use integer::{Integer, IntegerBase, LargeInteger};
pub use rational::Rational;
