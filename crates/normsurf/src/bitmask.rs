//! Fixed-length packed bitmasks.
//!
//! Purpose
//! - Zero-sets and supports of enumeration rays, tested millions of times in
//!   the double-description inner loop.
//!
//! Why this design
//! - One trait, several storage backends: a single machine word, a pair of
//!   words, or a heap vector for anything longer. Algorithms are generic over
//!   the trait and [`dispatch`] monomorphises them once for the narrowest
//!   backend that holds the requested length.
//! - Bits at positions `>= len` are kept zero by every operation, so word-wise
//!   equality and popcount need no masking.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not, Shl};

/// Operations shared by every backend.
pub trait Bitmask: Clone + PartialEq + Eq + fmt::Debug {
    /// Largest length this backend can hold, or `None` if unbounded.
    const CAPACITY: Option<usize>;

    /// All-zero mask of the given length.
    ///
    /// Panics if `len` exceeds [`Self::CAPACITY`].
    fn with_len(len: usize) -> Self;
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> bool;
    fn set(&mut self, index: usize, value: bool);
    fn clear_all(&mut self);
    /// Sets every bit in `0..len`.
    fn fill(&mut self);
    fn and_with(&mut self, other: &Self);
    fn or_with(&mut self, other: &Self);
    fn xor_with(&mut self, other: &Self);
    /// Complements every bit in `0..len`.
    fn flip(&mut self);
    fn popcount(&self) -> usize;
    fn is_empty(&self) -> bool;
    /// True iff `x ∧ y ⊆ self`, i.e. `(!self & x & y) == 0`.
    fn contains_intn(&self, x: &Self, y: &Self) -> bool;
    /// True iff every bit of `self` is also set in `other`.
    fn is_subset_of(&self, other: &Self) -> bool;
    /// True iff `self ∧ other` has at most one bit set.
    fn meets_at_most_once(&self, other: &Self) -> bool;
    fn first_bit(&self) -> Option<usize>;

    fn at_most_one_bit(&self) -> bool {
        self.meets_at_most_once(self)
    }

    fn from_bits(len: usize, bits: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = Self::with_len(len);
        for b in bits {
            mask.set(b, true);
        }
        mask
    }

    fn ones(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.get(i)).collect()
    }
}

/// A primitive unsigned word usable as bitmask storage.
pub trait Word:
    Copy
    + Eq
    + fmt::Debug
    + fmt::Binary
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Shl<usize, Output = Self>
{
    const BITS: usize;
    const ZERO: Self;
    const ONE: Self;
    const ALL: Self;
    fn count_ones(self) -> usize;
    fn trailing_zeros(self) -> usize;

    /// Word with the low `n` bits set (`n <= BITS`).
    #[inline]
    fn low_bits(n: usize) -> Self {
        if n >= Self::BITS {
            Self::ALL
        } else if n == 0 {
            Self::ZERO
        } else {
            !(Self::ALL << n)
        }
    }
}

macro_rules! impl_word {
    ($($t:ty),*) => {$(
        impl Word for $t {
            const BITS: usize = <$t>::BITS as usize;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const ALL: Self = <$t>::MAX;
            #[inline]
            fn count_ones(self) -> usize {
                <$t>::count_ones(self) as usize
            }
            #[inline]
            fn trailing_zeros(self) -> usize {
                <$t>::trailing_zeros(self) as usize
            }
        }
    )*};
}

impl_word!(u8, u16, u32, u64, u128);

/// Bitmask held in a single machine word.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Bitmask1<W: Word> {
    bits: W,
    len: usize,
}

impl<W: Word> fmt::Debug for Bitmask1<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bits(f, self)
    }
}

impl<W: Word> Bitmask for Bitmask1<W> {
    const CAPACITY: Option<usize> = Some(W::BITS);

    fn with_len(len: usize) -> Self {
        assert!(len <= W::BITS, "length {len} exceeds {} bits", W::BITS);
        Self { bits: W::ZERO, len }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        self.bits & (W::ONE << index) != W::ZERO
    }

    #[inline]
    fn set(&mut self, index: usize, value: bool) {
        debug_assert!(index < self.len);
        let bit = W::ONE << index;
        self.bits = if value { self.bits | bit } else { self.bits & !bit };
    }

    fn clear_all(&mut self) {
        self.bits = W::ZERO;
    }

    fn fill(&mut self) {
        self.bits = W::low_bits(self.len);
    }

    #[inline]
    fn and_with(&mut self, other: &Self) {
        self.bits = self.bits & other.bits;
    }

    #[inline]
    fn or_with(&mut self, other: &Self) {
        self.bits = self.bits | other.bits;
    }

    #[inline]
    fn xor_with(&mut self, other: &Self) {
        self.bits = self.bits ^ other.bits;
    }

    #[inline]
    fn flip(&mut self) {
        self.bits = !self.bits & W::low_bits(self.len);
    }

    #[inline]
    fn popcount(&self) -> usize {
        self.bits.count_ones()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.bits == W::ZERO
    }

    #[inline]
    fn contains_intn(&self, x: &Self, y: &Self) -> bool {
        (!self.bits & x.bits & y.bits) == W::ZERO
    }

    #[inline]
    fn is_subset_of(&self, other: &Self) -> bool {
        (self.bits & !other.bits) == W::ZERO
    }

    #[inline]
    fn meets_at_most_once(&self, other: &Self) -> bool {
        let both = self.bits & other.bits;
        both.count_ones() <= 1
    }

    fn first_bit(&self) -> Option<usize> {
        (self.bits != W::ZERO).then(|| self.bits.trailing_zeros())
    }
}

/// Bitmask held in two machine words; `low` carries the first `W1::BITS` bits.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Bitmask2<W1: Word, W2: Word> {
    low: W1,
    high: W2,
    len: usize,
}

impl<W1: Word, W2: Word> Bitmask2<W1, W2> {
    #[inline]
    fn high_len(&self) -> usize {
        self.len.saturating_sub(W1::BITS)
    }
}

impl<W1: Word, W2: Word> fmt::Debug for Bitmask2<W1, W2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bits(f, self)
    }
}

impl<W1: Word, W2: Word> Bitmask for Bitmask2<W1, W2> {
    const CAPACITY: Option<usize> = Some(W1::BITS + W2::BITS);

    fn with_len(len: usize) -> Self {
        assert!(
            len <= W1::BITS + W2::BITS,
            "length {len} exceeds {} bits",
            W1::BITS + W2::BITS
        );
        Self {
            low: W1::ZERO,
            high: W2::ZERO,
            len,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        if index < W1::BITS {
            self.low & (W1::ONE << index) != W1::ZERO
        } else {
            self.high & (W2::ONE << (index - W1::BITS)) != W2::ZERO
        }
    }

    #[inline]
    fn set(&mut self, index: usize, value: bool) {
        debug_assert!(index < self.len);
        if index < W1::BITS {
            let bit = W1::ONE << index;
            self.low = if value { self.low | bit } else { self.low & !bit };
        } else {
            let bit = W2::ONE << (index - W1::BITS);
            self.high = if value { self.high | bit } else { self.high & !bit };
        }
    }

    fn clear_all(&mut self) {
        self.low = W1::ZERO;
        self.high = W2::ZERO;
    }

    fn fill(&mut self) {
        self.low = W1::low_bits(self.len);
        self.high = W2::low_bits(self.high_len());
    }

    #[inline]
    fn and_with(&mut self, other: &Self) {
        self.low = self.low & other.low;
        self.high = self.high & other.high;
    }

    #[inline]
    fn or_with(&mut self, other: &Self) {
        self.low = self.low | other.low;
        self.high = self.high | other.high;
    }

    #[inline]
    fn xor_with(&mut self, other: &Self) {
        self.low = self.low ^ other.low;
        self.high = self.high ^ other.high;
    }

    #[inline]
    fn flip(&mut self) {
        self.low = !self.low & W1::low_bits(self.len);
        self.high = !self.high & W2::low_bits(self.high_len());
    }

    #[inline]
    fn popcount(&self) -> usize {
        self.low.count_ones() + self.high.count_ones()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.low == W1::ZERO && self.high == W2::ZERO
    }

    #[inline]
    fn contains_intn(&self, x: &Self, y: &Self) -> bool {
        (!self.low & x.low & y.low) == W1::ZERO && (!self.high & x.high & y.high) == W2::ZERO
    }

    #[inline]
    fn is_subset_of(&self, other: &Self) -> bool {
        (self.low & !other.low) == W1::ZERO && (self.high & !other.high) == W2::ZERO
    }

    #[inline]
    fn meets_at_most_once(&self, other: &Self) -> bool {
        let low = (self.low & other.low).count_ones();
        low <= 1 && low + (self.high & other.high).count_ones() <= 1
    }

    fn first_bit(&self) -> Option<usize> {
        if self.low != W1::ZERO {
            Some(self.low.trailing_zeros())
        } else if self.high != W2::ZERO {
            Some(W1::BITS + self.high.trailing_zeros())
        } else {
            None
        }
    }
}

/// Arbitrary-length bitmask over `u64` words.
#[derive(Clone, PartialEq, Eq)]
pub struct BitmaskVec {
    words: Vec<u64>,
    len: usize,
}

impl BitmaskVec {
    #[inline]
    fn tail_mask(&self) -> u64 {
        match self.len % 64 {
            0 => u64::MAX,
            r => (1u64 << r) - 1,
        }
    }
}

impl fmt::Debug for BitmaskVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bits(f, self)
    }
}

impl Bitmask for BitmaskVec {
    const CAPACITY: Option<usize> = None;

    fn with_len(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    #[inline]
    fn set(&mut self, index: usize, value: bool) {
        debug_assert!(index < self.len);
        let bit = 1u64 << (index % 64);
        let w = &mut self.words[index / 64];
        if value {
            *w |= bit;
        } else {
            *w &= !bit;
        }
    }

    fn clear_all(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    fn fill(&mut self) {
        let tail = self.tail_mask();
        self.words.iter_mut().for_each(|w| *w = u64::MAX);
        if let Some(last) = self.words.last_mut() {
            *last &= tail;
        }
    }

    fn and_with(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= b;
        }
    }

    fn or_with(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }

    fn xor_with(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a ^= b;
        }
    }

    fn flip(&mut self) {
        let tail = self.tail_mask();
        self.words.iter_mut().for_each(|w| *w = !*w);
        if let Some(last) = self.words.last_mut() {
            *last &= tail;
        }
    }

    fn popcount(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    fn contains_intn(&self, x: &Self, y: &Self) -> bool {
        self.words
            .iter()
            .zip(&x.words)
            .zip(&y.words)
            .all(|((s, a), b)| (!s & a & b) == 0)
    }

    fn is_subset_of(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .all(|(a, b)| (a & !b) == 0)
    }

    fn meets_at_most_once(&self, other: &Self) -> bool {
        let mut seen = 0;
        for (a, b) in self.words.iter().zip(&other.words) {
            seen += (a & b).count_ones();
            if seen > 1 {
                return false;
            }
        }
        true
    }

    fn first_bit(&self) -> Option<usize> {
        self.words
            .iter()
            .position(|&w| w != 0)
            .map(|i| i * 64 + self.words[i].trailing_zeros() as usize)
    }
}

fn write_bits<B: Bitmask>(f: &mut fmt::Formatter<'_>, mask: &B) -> fmt::Result {
    for i in 0..mask.len() {
        f.write_str(if mask.get(i) { "1" } else { "0" })?;
    }
    Ok(())
}

/// A computation generic over the bitmask backend.
///
/// Rust closures cannot be generic, so algorithms that want a backend picked
/// at runtime implement this trait and hand themselves to [`dispatch`].
pub trait BitmaskTask {
    type Output;
    fn run<B: Bitmask>(self) -> Self::Output;
}

/// Runs `task` with the narrowest backend whose capacity is at least `len`.
pub fn dispatch<T: BitmaskTask>(len: usize, task: T) -> T::Output {
    match len {
        0..=8 => task.run::<Bitmask1<u8>>(),
        9..=16 => task.run::<Bitmask1<u16>>(),
        17..=32 => task.run::<Bitmask1<u32>>(),
        33..=64 => task.run::<Bitmask1<u64>>(),
        65..=128 => task.run::<Bitmask1<u128>>(),
        129..=192 => task.run::<Bitmask2<u128, u64>>(),
        193..=256 => task.run::<Bitmask2<u128, u128>>(),
        _ => task.run::<BitmaskVec>(),
    }
}

/// Name of the backend [`dispatch`] picks for `len` bits.
pub fn backend_name(len: usize) -> &'static str {
    match len {
        0..=8 => "u8",
        9..=16 => "u16",
        17..=32 => "u32",
        33..=64 => "u64",
        65..=128 => "u128",
        129..=192 => "u128+u64",
        193..=256 => "u128+u128",
        _ => "vec",
    }
}
