//! Criterion microbenches for the exact arithmetic on the enumeration hot path.
//!
//! - Native vs promoted multiplication and gcd.
//! - Rational sums (Euler characteristic accumulation).
//! - Vector combination followed by `scale_down`, the core of every ray step.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use normsurf::{Integer, Rational, Vector};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_integer(c: &mut Criterion) {
    let mut group = c.benchmark_group("integer");
    let small = (Integer::from(123_456_789_i64), Integer::from(987_654_321_i64));
    let big = (
        Integer::from(i64::MAX) * Integer::from(i64::MAX),
        Integer::from(i64::MAX - 7) * Integer::from(3_i64),
    );
    for (label, (a, b)) in [("native", small), ("big", big)] {
        group.bench_function(BenchmarkId::new("mul", label), |bch| bch.iter(|| &a * &b));
        group.bench_function(BenchmarkId::new("gcd", label), |bch| bch.iter(|| a.gcd(&b)));
    }
    group.finish();
}

fn bench_rational(c: &mut Criterion) {
    let mut group = c.benchmark_group("rational");
    group.bench_function(BenchmarkId::new("sum", "64 terms"), |b| {
        b.iter_batched(
            || {
                let mut rng = StdRng::seed_from_u64(5);
                (0..64)
                    .map(|_| Rational::new(rng.gen_range(-50_i64..50), rng.gen_range(1_i64..12)))
                    .collect::<Vec<_>>()
            },
            |terms| terms.into_iter().fold(Rational::zero(), |acc, t| acc + t),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector");
    for dim in [21_usize, 70, 210] {
        group.bench_function(BenchmarkId::new("combine_scale_down", dim), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(dim as u64);
                    let mut draw = || {
                        let v: Vec<i64> = (0..dim).map(|_| rng.gen_range(0..40)).collect();
                        Vector::<Integer>::from_i64s(&v)
                    };
                    (draw(), draw())
                },
                |(mut x, y)| {
                    let _ = x.subtract_copies(&y, &Integer::from(3_i64));
                    x.scale_down()
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_integer, bench_rational, bench_vector);
criterion_main!(benches);
