//! Criterion benches for vertex enumeration and the reduced-to-standard sweep.
//!
//! - Direct double description in quad and standard coordinates.
//! - Standard coordinates via the reduced system.
//! - The conversion alone, on a precomputed quad list.
//!
//! Inputs: the named closed census, a few layered solid tori, and seeded
//! random closed gluings. Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use normsurf::enumerate::{build_standard_from_reduced, EnumAlg, EnumerationCfg, NormalSurfaces};
use normsurf::surfaces::NormalCoords;
use normsurf::triangulation::named;
use normsurf::triangulation::random::{RandomGluingGenerator, RandomGluingParams};
use normsurf::Triangulation;

fn inputs() -> Vec<(String, Triangulation)> {
    let mut out: Vec<(String, Triangulation)> = ["three-sphere", "quaternionic", "figure-eight"]
        .iter()
        .filter_map(|n| named::by_name(n).map(|t| (n.to_string(), t)))
        .collect();
    for (a, b) in [(3, 4), (5, 8)] {
        if let Ok(t) = named::layered_solid_torus(a, b) {
            out.push((format!("lst-{a}-{b}"), t));
        }
    }
    for seed in [3_u64, 17] {
        let params = RandomGluingParams {
            tetrahedra: 4,
            ..RandomGluingParams::default()
        };
        if let Ok(t) = RandomGluingGenerator::generate_single(&params, seed) {
            if t.is_valid() && !t.is_ideal() {
                out.push((format!("random4-{seed}"), t));
            }
        }
    }
    out
}

fn cfg(algorithm: EnumAlg) -> EnumerationCfg {
    EnumerationCfg {
        algorithm,
        ..EnumerationCfg::default()
    }
}

fn bench_enumerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate");
    group.sample_size(20);
    for (name, tri) in inputs() {
        group.bench_function(BenchmarkId::new("quad_direct", &name), |b| {
            b.iter(|| NormalSurfaces::enumerate(&tri, NormalCoords::Quad, cfg(EnumAlg::Direct), None))
        });
        group.bench_function(BenchmarkId::new("standard_direct", &name), |b| {
            b.iter(|| {
                NormalSurfaces::enumerate(&tri, NormalCoords::Standard, cfg(EnumAlg::Direct), None)
            })
        });
        if tri.is_valid() && !tri.is_ideal() {
            group.bench_function(BenchmarkId::new("standard_via_reduced", &name), |b| {
                b.iter(|| {
                    NormalSurfaces::enumerate(
                        &tri,
                        NormalCoords::Standard,
                        cfg(EnumAlg::ViaReduced),
                        None,
                    )
                })
            });
        }
    }
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    group.sample_size(20);
    for (name, tri) in inputs() {
        for (coords, label) in [(NormalCoords::Quad, "quad"), (NormalCoords::QuadOct, "quadoct")] {
            group.bench_function(BenchmarkId::new(label, &name), |b| {
                b.iter_batched(
                    || NormalSurfaces::enumerate(&tri, coords, cfg(EnumAlg::Direct), None).unwrap(),
                    |reduced| {
                        let _ = build_standard_from_reduced(&tri, &reduced, None);
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_enumerate, bench_convert);
criterion_main!(benches);
