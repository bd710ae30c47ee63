use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::*;
use crate::arith::Integer;
use crate::error::Error;
use crate::progress::{Progress, ProgressTracker};
use crate::surfaces::{ConstraintSet, MatchingEquations, NormalCoords, NormalEncoding};
use crate::triangulation::named::*;
use crate::triangulation::random::{RandomGluingGenerator, RandomGluingParams};
use crate::triangulation::Triangulation;
use crate::vector::Vector;

fn run(tri: &Triangulation, coords: NormalCoords, algorithm: EnumAlg) -> NormalSurfaces<'_> {
    let cfg = EnumerationCfg {
        algorithm,
        ..EnumerationCfg::default()
    };
    NormalSurfaces::enumerate(tri, coords, cfg, None).unwrap()
}

fn euler_chars(list: &NormalSurfaces<'_>) -> Vec<i64> {
    let mut out: Vec<i64> = list
        .iter()
        .map(|s| s.euler_char().unwrap().to_i64().unwrap())
        .collect();
    out.sort_unstable();
    out
}

fn rows(values: &[&[i64]]) -> Vec<Vec<Integer>> {
    let mut out: Vec<Vec<Integer>> = values
        .iter()
        .map(|r| r.iter().map(|&x| Integer::new(x)).collect())
        .collect();
    out.sort();
    out
}

/// Reports succeed `n - 1` times, then the tracker cancels itself.
struct CancelAfter {
    left: AtomicUsize,
    finished: AtomicBool,
}

impl CancelAfter {
    fn new(n: usize) -> Self {
        Self {
            left: AtomicUsize::new(n),
            finished: AtomicBool::new(false),
        }
    }
}

impl Progress for CancelAfter {
    fn new_stage(&self, _description: &str, _weight: f64) {}

    fn report(&self, _done: usize, _total: usize) -> bool {
        let prev = self
            .left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |x| Some(x.saturating_sub(1)))
            .unwrap_or(0);
        prev > 1
    }

    fn is_cancelled(&self) -> bool {
        self.left.load(Ordering::SeqCst) == 0
    }

    fn set_finished(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

#[test]
fn vertex_counts_of_named_triangulations() {
    // (name, standard, quad, almost normal, quad-oct)
    let cases: Vec<(&str, Triangulation, [usize; 4])> = vec![
        ("three_sphere", three_sphere(), [4, 2, 9, 4]),
        ("lens_3_1", lens_3_1(), [4, 2, 7, 4]),
        ("rp3", rp3(), [4, 2, 7, 4]),
        ("s2xs1", s2xs1(), [4, 3, 7, 6]),
        ("quaternionic", quaternionic(), [4, 3, 7, 6]),
        ("double_tetrahedron", double_tetrahedron(), [7, 3, 10, 6]),
        ("figure_eight", figure_eight(), [1, 4, 1, 18]),
        ("lst_1_2_3", lst_1_2_3(), [4, 3, 7, 6]),
        ("single_tetrahedron", single_tetrahedron(), [7, 3, 10, 6]),
    ];
    let systems = [
        NormalCoords::Standard,
        NormalCoords::Quad,
        NormalCoords::AlmostNormal,
        NormalCoords::QuadOct,
    ];
    for (name, tri, expected) in &cases {
        for (coords, &n) in systems.iter().zip(expected) {
            let direct = run(tri, *coords, EnumAlg::Direct);
            assert_eq!(direct.len(), n, "{name} {coords}");
            assert_eq!(direct.algorithm(), Some(EnumAlg::Direct));
        }
    }
}

#[test]
fn layered_solid_tori_counts() {
    for (a, b, std, quad) in [(1, 3, 6, 4), (3, 4, 9, 6), (2, 5, 7, 5)] {
        let tri = layered_solid_torus(a, b).unwrap();
        assert_eq!(run(&tri, NormalCoords::Standard, EnumAlg::Direct).len(), std);
        assert_eq!(run(&tri, NormalCoords::Quad, EnumAlg::Direct).len(), quad);
    }
}

#[test]
fn conversion_matches_direct_enumeration() {
    let mut cases = vec![
        three_sphere(),
        lens_3_1(),
        rp3(),
        s2xs1(),
        quaternionic(),
        double_tetrahedron(),
        lst_1_2_3(),
        single_tetrahedron(),
    ];
    for (a, b) in [(1, 3), (3, 4), (2, 5)] {
        cases.push(layered_solid_torus(a, b).unwrap());
    }
    for tri in &cases {
        for coords in [NormalCoords::Standard, NormalCoords::AlmostNormal] {
            let direct = run(tri, coords, EnumAlg::Direct);
            let via = run(tri, coords, EnumAlg::Default);
            assert_eq!(via.algorithm(), Some(EnumAlg::ViaReduced));
            assert_eq!(via.sorted_vectors(), direct.sorted_vectors(), "{coords}");
        }
    }
}

#[test]
fn lens_space_standard_vertices() {
    let tri = lens_3_1();
    let list = run(&tri, NormalCoords::Standard, EnumAlg::Default);
    let expected = rows(&[
        &[0, 0, 0, 0, 2, 0, 0, 1, 1, 0, 0, 1, 0, 0],
        &[0, 0, 2, 2, 0, 0, 0, 1, 1, 0, 0, 1, 0, 0],
        &[1, 1, 0, 0, 1, 0, 0, 1, 1, 1, 1, 0, 0, 0],
        &[1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0],
    ]);
    assert_eq!(list.sorted_vectors(), expected);
    assert_eq!(euler_chars(&list), vec![-2, 0, 2, 2]);
    let links: Vec<usize> = list.iter().filter_map(|s| s.is_vertex_link()).collect();
    assert_eq!(links, vec![0]);
    let edge_links: Vec<usize> = list.iter().filter_map(|s| s.is_thin_edge_link().0).collect();
    assert_eq!(edge_links, vec![2]);
}

#[test]
fn closed_examples_surface_census() {
    // (triangulation, sorted Euler characteristics, sorted first thin edge links)
    let cases = [
        ("three_sphere", three_sphere(), vec![-2, 0, 0, 2], vec![1, 2]),
        ("rp3", rp3(), vec![-1, 0, 1, 2], vec![2]),
        ("s2xs1", s2xs1(), vec![0, 0, 2, 2], vec![0, 1]),
        ("quaternionic", quaternionic(), vec![0, 0, 0, 2], vec![0, 1, 2]),
    ];
    for (name, tri, chis, edges) in &cases {
        let list = run(tri, NormalCoords::Standard, EnumAlg::Default);
        assert_eq!(&euler_chars(&list), chis, "{name}");
        let mut found: Vec<usize> = list.iter().filter_map(|s| s.is_thin_edge_link().0).collect();
        found.sort_unstable();
        assert_eq!(&found, edges, "{name}");
        assert_eq!(list.iter().filter(|s| s.is_vertex_link().is_some()).count(), 1, "{name}");
        for s in &list {
            if let Some(v) = s.is_vertex_link() {
                let chi = s.euler_char().unwrap().to_i64().unwrap();
                assert_eq!(chi, tri.vertices()[v].link_euler_char, "{name}");
            }
        }
        assert!(list.iter().all(|s| !s.has_real_boundary()));
    }

    let rp3 = rp3();
    let list = run(&rp3, NormalCoords::Standard, EnumAlg::Default);
    let one_sided = list.iter().filter(|s| s.is_two_sided() == Some(false)).count();
    let non_orientable = list.iter().filter(|s| s.is_orientable() == Some(false)).count();
    assert_eq!((one_sided, non_orientable), (2, 2));

    let q8 = quaternionic();
    let list = run(&q8, NormalCoords::Standard, EnumAlg::Default);
    assert_eq!(list.iter().filter(|s| s.is_orientable() == Some(false)).count(), 3);
}

#[test]
fn figure_eight_cusp() {
    let tri = figure_eight();
    let list = run(&tri, NormalCoords::Standard, EnumAlg::Default);
    assert_eq!(list.algorithm(), Some(EnumAlg::Direct));
    assert_eq!(
        list.sorted_vectors(),
        rows(&[&[1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0]])
    );
    let link = list.get(0).unwrap();
    assert_eq!(link.is_vertex_link(), Some(0));
    assert_eq!(link.euler_char().unwrap(), 0);

    let quads = run(&tri, NormalCoords::Quad, EnumAlg::Default);
    assert_eq!(quads.len(), 4);
    assert!(quads.iter().all(|s| !s.is_compact()));

    // Ideal triangulations are always enumerated directly.
    let via = run(&tri, NormalCoords::Standard, EnumAlg::ViaReduced);
    assert_eq!(via.algorithm(), Some(EnumAlg::Direct));
    assert_eq!(via.sorted_vectors(), list.sorted_vectors());
    let converted = build_standard_from_reduced(&tri, &quads, None).unwrap();
    assert_eq!(converted.algorithm(), Some(EnumAlg::Direct));
    assert_eq!(converted.sorted_vectors(), list.sorted_vectors());
    assert!(matches!(
        build_reduced_from_standard(&tri, &list, None),
        Err(Error::FailedPrecondition(_))
    ));
}

#[test]
fn bounded_torus_surfaces_meet_the_boundary() {
    let tri = layered_solid_torus(3, 4).unwrap();
    assert!(!tri.is_closed() && tri.has_boundary_triangles());
    let list = run(&tri, NormalCoords::Standard, EnumAlg::Default);
    assert_eq!(list.len(), 9);
    assert!(list.iter().all(|s| s.has_real_boundary()));
    let meridian = Vector::from_i64s(&[
        1, 1, 0, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0, 2, 0, 0, 3, 3, 0, 1, 0,
    ]);
    let found = list.iter().find(|s| s.vector() == &meridian).unwrap();
    assert_eq!(found.euler_char().unwrap(), 1);
}

#[test]
fn conversion_output_invariants() {
    let tri = layered_solid_torus(3, 4).unwrap();
    let quads = run(&tri, NormalCoords::Quad, EnumAlg::Direct);
    let std = build_standard_from_reduced(&tri, &quads, None).unwrap();
    assert_eq!(std.coords(), NormalCoords::Standard);
    assert_eq!(std.algorithm(), Some(EnumAlg::ViaReduced));
    assert_eq!((quads.len(), std.len()), (6, 9));

    let enc = NormalEncoding::standard();
    let eqs = MatchingEquations::standard(&tri, enc).unwrap();
    let constraints = ConstraintSet::quad(enc, tri.size());
    let quad_enc = NormalEncoding::quad();
    let quad_eqs = MatchingEquations::quad(&tri, quad_enc).unwrap();
    let quad_constraints = ConstraintSet::quad(quad_enc, tri.size());
    let mut hit = vec![false; quads.len()];
    let mut sums = Vec::new();
    for s in &std {
        let v = s.vector();
        assert!(v.is_nonnegative());
        assert!(constraints.admits(v));
        assert!(eqs.satisfied_by(v).unwrap());
        assert_eq!(v.clone().scale_down(), 1);

        // Projections land in the quad cone but need not be quad vertices.
        let mut q = quad_enc.project(enc, v).unwrap();
        if q.is_zero() {
            assert!(s.is_vertex_link().is_some());
            continue;
        }
        assert!(q.is_nonnegative());
        assert!(quad_constraints.admits(&q));
        assert!(quad_eqs.satisfied_by(&q).unwrap());
        q.scale_down();
        match quads.iter().position(|r| r.vector() == &q) {
            Some(i) => hit[i] = true,
            None => sums.push(q),
        }
    }
    assert!(hit.into_iter().all(|h| h));
    // Two standard vertices project to sums of two quad vertices each.
    assert_eq!(sums.len(), 2);
    assert!(sums.contains(&Vector::from_i64s(&[0, 1, 0, 1, 0, 0, 0, 0, 1])));
}

#[test]
fn reduction_inverts_conversion() {
    for tri in [lens_3_1(), s2xs1(), lst_1_2_3(), double_tetrahedron()] {
        for (std_coords, red_coords) in [
            (NormalCoords::Standard, NormalCoords::Quad),
            (NormalCoords::AlmostNormal, NormalCoords::QuadOct),
        ] {
            let std = run(&tri, std_coords, EnumAlg::Direct);
            let direct = run(&tri, red_coords, EnumAlg::Direct);
            let reduced = build_reduced_from_standard(&tri, &std, None).unwrap();
            assert_eq!(reduced.coords(), red_coords);
            assert_eq!(reduced.sorted_vectors(), direct.sorted_vectors());
        }
    }
}

#[test]
fn random_triangulations_convert_like_direct() {
    let mut tested = 0;
    for seed in 0..60u64 {
        let params = RandomGluingParams {
            tetrahedra: 1 + (seed % 3) as usize,
            boundary_facets: if seed % 4 == 0 { 2 } else { 0 },
            orientable: seed % 5 != 0,
            connected: true,
        };
        let tri = RandomGluingGenerator::generate_single(&params, seed).unwrap();
        if !tri.is_valid() || tri.is_ideal() {
            continue;
        }
        tested += 1;
        let coords = if seed % 3 == 0 {
            NormalCoords::AlmostNormal
        } else {
            NormalCoords::Standard
        };
        let direct = run(&tri, coords, EnumAlg::Direct);
        let via = run(&tri, coords, EnumAlg::ViaReduced);
        assert_eq!(via.sorted_vectors(), direct.sorted_vectors(), "seed {seed}");
    }
    assert!(tested > 0);
}

#[test]
fn ideal_and_invalid_triangulations_fall_back_to_direct() {
    // Facet 3 onto facet 2 reversing edge 01: invalid, with vertex surfaces
    // around the bad edge that no quad vector sees.
    let perm = crate::perm::Perm4::from_images([1, 0, 3, 2]).unwrap();
    let invalid = Triangulation::from_gluings(1, &[(0, 3, 0, perm)]).unwrap();
    assert!(!invalid.is_valid());
    let direct = run(&invalid, NormalCoords::Standard, EnumAlg::Direct);
    assert_eq!(direct.len(), 5);
    let quads = run(&invalid, NormalCoords::Quad, EnumAlg::Direct);
    let converted = build_standard_from_reduced(&invalid, &quads, None).unwrap();
    assert_eq!(converted.algorithm(), Some(EnumAlg::Direct));
    assert_eq!(converted.sorted_vectors(), direct.sorted_vectors());

    let (mut ideal, mut broken) = (0, 0);
    for seed in 0..80u64 {
        let params = RandomGluingParams {
            tetrahedra: 2 + (seed % 2) as usize,
            boundary_facets: 0,
            orientable: seed % 3 != 0,
            connected: true,
        };
        let tri = RandomGluingGenerator::generate_single(&params, seed).unwrap();
        if tri.is_valid() && !tri.is_ideal() {
            continue;
        }
        if tri.is_valid() {
            ideal += 1;
        } else {
            broken += 1;
        }
        for (coords, reduced) in [
            (NormalCoords::Standard, NormalCoords::Quad),
            (NormalCoords::AlmostNormal, NormalCoords::QuadOct),
        ] {
            let direct = run(&tri, coords, EnumAlg::Direct);
            let via = run(&tri, coords, EnumAlg::ViaReduced);
            assert_eq!(via.algorithm(), Some(EnumAlg::Direct), "seed {seed}");
            assert_eq!(via.sorted_vectors(), direct.sorted_vectors(), "seed {seed} {coords}");

            let red = run(&tri, reduced, EnumAlg::Direct);
            let converted = build_standard_from_reduced(&tri, &red, None).unwrap();
            assert_eq!(converted.coords(), coords);
            assert_eq!(
                converted.sorted_vectors(),
                direct.sorted_vectors(),
                "seed {seed} {reduced}"
            );
        }
    }
    assert!(ideal > 0 && broken > 0, "ideal {ideal}, invalid {broken}");
}

#[test]
fn empty_triangulation_gives_empty_lists() {
    let tri = Triangulation::new();
    let tracker = ProgressTracker::new();
    let list = NormalSurfaces::enumerate(
        &tri,
        NormalCoords::Standard,
        EnumerationCfg::default(),
        Some(&tracker),
    )
    .unwrap();
    assert!(list.is_empty());
    assert!(tracker.is_finished());

    let quads = run(&tri, NormalCoords::Quad, EnumAlg::Direct);
    assert!(quads.is_empty());
    assert!(build_standard_from_reduced(&tri, &quads, None).unwrap().is_empty());
}

#[test]
fn invalid_requests_are_rejected() {
    let tri = lens_3_1();
    let r = NormalSurfaces::enumerate(&tri, NormalCoords::EdgeWeight, EnumerationCfg::default(), None);
    assert!(matches!(r, Err(Error::InvalidArgument(_))));

    let std = run(&tri, NormalCoords::Standard, EnumAlg::Direct);
    assert!(matches!(
        build_standard_from_reduced(&tri, &std, None),
        Err(Error::InvalidArgument(_))
    ));
    let other = lens_3_1();
    let quads = run(&other, NormalCoords::Quad, EnumAlg::Direct);
    assert!(build_standard_from_reduced(&tri, &quads, None).is_err());

    let bad = NormalSurfaces::from_vectors(&tri, NormalCoords::Quad, vec![Vector::zero(5)]);
    assert!(matches!(bad, Err(Error::InvalidArgument(_))));
}

#[test]
fn cancelled_enumerations_return_nothing() {
    let tri = three_sphere();
    let cfg = EnumerationCfg {
        algorithm: EnumAlg::Direct,
        poll_interval: 1,
    };

    let tracker = ProgressTracker::new();
    tracker.cancel();
    let list = NormalSurfaces::enumerate(&tri, NormalCoords::Standard, cfg, Some(&tracker)).unwrap();
    assert!(list.is_empty());
    assert!(tracker.is_finished());

    for algorithm in [EnumAlg::Direct, EnumAlg::ViaReduced] {
        let tracker = CancelAfter::new(3);
        let cfg = EnumerationCfg {
            algorithm,
            poll_interval: 1,
        };
        let list = NormalSurfaces::enumerate(&tri, NormalCoords::Standard, cfg, Some(&tracker)).unwrap();
        assert!(list.is_empty(), "{algorithm}");
        assert!(tracker.finished.load(Ordering::SeqCst));
    }

    let quads = run(&tri, NormalCoords::Quad, EnumAlg::Direct);
    let tracker = CancelAfter::new(1);
    let std = build_standard_from_reduced(&tri, &quads, Some(&tracker)).unwrap();
    assert!(std.is_empty());
    assert!(tracker.finished.load(Ordering::SeqCst));
}

#[test]
fn cancelled_reduction_returns_nothing() {
    let tri = s2xs1();
    let std = run(&tri, NormalCoords::Standard, EnumAlg::Direct);
    assert!(std.iter().any(|s| !s.is_vertex_linking()));

    let tracker = CancelAfter::new(1);
    let reduced = build_reduced_from_standard(&tri, &std, Some(&tracker)).unwrap();
    assert_eq!(reduced.coords(), NormalCoords::Quad);
    assert!(reduced.is_empty());
    assert!(tracker.finished.load(Ordering::SeqCst));

    let tracker = CancelAfter::new(usize::MAX);
    let reduced = build_reduced_from_standard(&tri, &std, Some(&tracker)).unwrap();
    assert_eq!(reduced.len(), 3);
    assert!(!tracker.is_cancelled());
    assert!(tracker.finished.load(Ordering::SeqCst));
}

#[test]
fn cancellation_from_another_thread() {
    let params = RandomGluingParams {
        tetrahedra: 6,
        boundary_facets: 0,
        orientable: true,
        connected: true,
    };
    let tri = RandomGluingGenerator::generate_single(&params, 11).unwrap();
    let tracker = ProgressTracker::new();
    let cfg = EnumerationCfg {
        algorithm: EnumAlg::Direct,
        poll_interval: 1,
    };
    let watched = &tracker;
    std::thread::scope(|scope| {
        // The triangulation moves into the worker: its skeleton cache is not Sync.
        let worker = scope.spawn(move || {
            NormalSurfaces::enumerate(&tri, NormalCoords::Standard, cfg, Some(watched))
                .map(|list| list.len())
        });
        while !tracker.percent_changed() && !tracker.is_finished() {
            std::thread::yield_now();
        }
        tracker.cancel();
        let result = worker.join().unwrap();
        assert_eq!(result.unwrap(), 0);
    });
    assert!(tracker.is_finished());
}

#[test]
fn cancelling_a_large_closed_enumeration() {
    let tracker = ProgressTracker::new();
    let cfg = EnumerationCfg {
        algorithm: EnumAlg::ViaReduced,
        poll_interval: 1,
    };
    let watched = &tracker;
    let (len, algorithm) = std::thread::scope(|scope| {
        let worker = scope.spawn(move || {
            let tri = weber_seifert();
            assert_eq!(tri.size(), 36);
            NormalSurfaces::enumerate(&tri, NormalCoords::Standard, cfg, Some(watched))
                .map(|list| (list.len(), list.algorithm()))
        });
        while !tracker.percent_changed() && !tracker.is_finished() {
            std::thread::yield_now();
        }
        tracker.cancel();
        worker.join().unwrap().unwrap()
    });
    assert_eq!(len, 0);
    assert_eq!(algorithm, Some(EnumAlg::ViaReduced));
    assert!(tracker.is_finished() && tracker.is_cancelled());
}

#[test]
fn algorithm_names_round_trip() {
    for a in [EnumAlg::Default, EnumAlg::Direct, EnumAlg::ViaReduced] {
        assert_eq!(a.to_string().parse::<EnumAlg>().unwrap(), a);
    }
    assert!("simplex".parse::<EnumAlg>().is_err());
    assert_eq!(EnumerationCfg::default().poll_interval, 1024);
}
