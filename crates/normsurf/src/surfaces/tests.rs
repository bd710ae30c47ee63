use super::*;
use crate::arith::Integer;
use crate::error::Error;
use crate::triangulation::named::*;
use crate::triangulation::Triangulation;
use crate::vector::Vector;

fn std_surface<'t>(tri: &'t Triangulation, values: &[i64]) -> NormalSurface<'t> {
    NormalSurface::new(tri, NormalEncoding::standard(), Vector::from_i64s(values)).unwrap()
}

fn quad_surface<'t>(tri: &'t Triangulation, values: &[i64]) -> NormalSurface<'t> {
    NormalSurface::new(tri, NormalEncoding::quad(), Vector::from_i64s(values)).unwrap()
}

fn chi(s: &NormalSurface<'_>) -> i64 {
    s.euler_char().unwrap().to_i64().unwrap()
}

#[test]
fn construction_checks_length_and_encoding() {
    let tri = single_tetrahedron();
    let r = NormalSurface::new(&tri, NormalEncoding::standard(), Vector::from_i64s(&[1, 0, 0]));
    assert!(matches!(r, Err(Error::InvalidArgument(_))));
    let r = NormalSurface::from_coords(&tri, NormalCoords::EdgeWeight, Vector::zero(6));
    assert!(matches!(r, Err(Error::InvalidArgument(_))));
    let s = NormalSurface::from_coords(&tri, NormalCoords::Quad, Vector::from_i64s(&[0, 1, 0]))
        .unwrap()
        .with_name("q1");
    assert_eq!(s.name(), Some("q1"));
    assert_eq!(s.coords(), NormalCoords::Quad);
    assert_eq!(s.triangles(0, 2), 0);
    assert_eq!(s.octs(0, 1), 0);
    assert_eq!(s.quads(0, 1), 1);
}

#[test]
fn single_tetrahedron_discs() {
    let tri = single_tetrahedron();
    for c in 0..4 {
        let mut v = [0i64; 7];
        v[c] = 1;
        let s = std_surface(&tri, &v);
        assert_eq!(chi(&s), 1);
        assert_eq!(s.is_orientable(), Some(true));
        assert_eq!(s.is_two_sided(), Some(true));
        assert!(s.has_real_boundary());
        assert_eq!(s.is_vertex_link(), Some(c));
        assert!(s.is_vertex_linking());
        assert_eq!(s.is_thin_edge_link(), (None, None));
        let total: Integer = s.edge_weights().unwrap().iter().sum();
        assert_eq!(total, 3);
    }
    let expected_edges = [(0, 5), (1, 4), (2, 3)];
    for (k, &(e1, e2)) in expected_edges.iter().enumerate() {
        let mut v = [0i64; 7];
        v[4 + k] = 1;
        let s = std_surface(&tri, &v);
        assert_eq!(chi(&s), 1);
        assert_eq!(s.is_vertex_link(), None);
        assert!(!s.is_vertex_linking());
        assert_eq!(s.is_thin_edge_link(), (Some(e1), Some(e2)));
        assert!(s.is_splitting());
        assert_eq!(s.is_central(), 1);
        let total: Integer = s.edge_weights().unwrap().iter().sum();
        assert_eq!(total, 4);
        let arcs: Integer = (0..4)
            .flat_map(|f| (0..3).map(move |i| (f, i)))
            .map(|(f, i)| s.arc_count(f, i).unwrap())
            .sum();
        assert_eq!(arcs, 4);
    }
}

#[test]
fn layered_solid_torus_surfaces() {
    let tri = lst_1_2_3();
    let mobius = std_surface(&tri, &[0, 0, 0, 0, 0, 1, 0]);
    assert_eq!(chi(&mobius), 0);
    assert_eq!(mobius.is_orientable(), Some(false));
    assert_eq!(mobius.is_two_sided(), Some(false));
    assert_eq!(mobius.is_thin_edge_link(), (Some(1), None));
    assert!(mobius.is_splitting());

    let annulus = std_surface(&tri, &[0, 0, 1, 1, 1, 0, 0]);
    assert_eq!(chi(&annulus), 0);
    assert_eq!(annulus.is_orientable(), Some(true));
    assert_eq!(annulus.is_two_sided(), Some(true));
    assert_eq!(annulus.is_thin_edge_link(), (Some(0), None));

    let meridian = std_surface(&tri, &[1, 1, 0, 0, 0, 0, 1]);
    assert_eq!(chi(&meridian), 1);
    assert_eq!(meridian.is_orientable(), Some(true));
    assert_eq!(meridian.is_thin_edge_link(), (None, None));
    assert_eq!(meridian.is_vertex_link(), None);

    let link = std_surface(&tri, &[1, 1, 1, 1, 0, 0, 0]);
    assert_eq!(chi(&link), 1);
    assert_eq!(link.is_vertex_link(), Some(0));
    assert_eq!(link.is_central(), 0);
    assert!(!link.is_splitting());
    let built = NormalSurface::vertex_link_of(&tri, 0).unwrap();
    assert_eq!(built.vector(), link.vector());

    for s in [&mobius, &annulus, &meridian, &link] {
        assert!(s.has_real_boundary());
        assert!(s.is_compact());
    }
}

#[test]
fn figure_eight_cusp_and_spun_surfaces() {
    let tri = figure_eight();
    let link = std_surface(&tri, &[1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0]);
    assert_eq!(chi(&link), 0);
    assert_eq!(link.is_orientable(), Some(true));
    assert_eq!(link.is_two_sided(), Some(true));
    assert!(!link.has_real_boundary());
    assert_eq!(link.is_vertex_link(), Some(0));

    let spun = quad_surface(&tri, &[1, 0, 0, 0, 2, 0]);
    assert!(!spun.is_compact());
    assert!(spun.standard_view().is_none());
    assert!(matches!(spun.euler_char(), Err(Error::FailedPrecondition(_))));
    assert_eq!(spun.is_orientable(), None);
    assert_eq!(spun.is_two_sided(), None);
    assert_eq!(spun.is_thin_edge_link(), (None, None));
    assert!(spun.edge_weight(0).is_none());
    assert!(!spun.has_real_boundary());
    assert!(link.sum(&spun).is_err());
}

#[test]
fn quad_vectors_lift_without_vertex_links() {
    let tri = lst_1_2_3();
    let q = quad_surface(&tri, &[0, 1, 0]);
    assert_eq!(q.standard_view().unwrap(), &Vector::from_i64s(&[0, 0, 0, 0, 0, 1, 0]));
    assert_eq!(chi(&q), 0);
    assert_eq!(q.is_two_sided(), Some(false));

    let empty = quad_surface(&tri, &[0, 0, 0]);
    assert!(empty.is_empty());
    assert!(empty.is_vertex_linking());
    assert_eq!(empty.is_vertex_link(), None);
    assert_eq!(empty.standard_view().unwrap(), &Vector::zero(7));
}

#[test]
fn sums_scaling_and_compatibility() {
    let tri = single_tetrahedron();
    let link = std_surface(&tri, &[1, 0, 0, 0, 0, 0, 0]);
    let q0 = quad_surface(&tri, &[1, 0, 0]);
    let q1 = quad_surface(&tri, &[0, 1, 0]);

    let sum = link.sum(&q0).unwrap();
    assert_eq!(sum.coords(), NormalCoords::Standard);
    assert_eq!(sum.vector(), &Vector::from_i64s(&[1, 0, 0, 0, 1, 0, 0]));

    let qq = q0.sum(&q1).unwrap();
    assert_eq!(qq.coords(), NormalCoords::Quad);
    assert_eq!(qq.vector(), &Vector::from_i64s(&[1, 1, 0]));

    let oct = NormalSurface::new(
        &tri,
        NormalEncoding::quad_oct(),
        Vector::from_i64s(&[0, 0, 0, 0, 0, 1]),
    )
    .unwrap();
    let an = link.sum(&oct).unwrap();
    assert_eq!(an.coords(), NormalCoords::AlmostNormal);
    assert_eq!(an.octs(0, 2), 1);
    assert_eq!(an.triangles(0, 0), 1);

    let doubled = &q0 * &Integer::new(2);
    assert_eq!(doubled.vector(), &Vector::from_i64s(&[2, 0, 0]));
    assert_eq!(chi(&doubled), 2);
    assert_eq!(doubled.is_central(), 0);

    assert!(!q0.locally_compatible(&q1));
    assert!(q0.locally_compatible(&link));
    assert!(q0.locally_compatible(&doubled));
    assert!(!q0.locally_compatible(&oct));

    let other = single_tetrahedron();
    let elsewhere = quad_surface(&other, &[1, 0, 0]);
    assert!(!q0.locally_compatible(&elsewhere));
    assert!(q0.sum(&elsewhere).is_err());
}

#[test]
fn octagon_euler_characteristic() {
    let tri = single_tetrahedron();
    // An octagon meets all four faces twice and crosses eight edge points.
    let oct = NormalSurface::new(
        &tri,
        NormalEncoding::almost_normal(),
        Vector::from_i64s(&[0, 0, 0, 0, 0, 0, 0, 1, 0, 0]),
    )
    .unwrap();
    assert_eq!(chi(&oct), 1);
    assert_eq!(oct.edge_weight(0).unwrap(), 2);
    assert_eq!(oct.edge_weight(5).unwrap(), 2);
    assert_eq!(oct.edge_weight(1).unwrap(), 1);
    assert!(oct.has_real_boundary());
    assert_eq!(oct.is_orientable(), Some(true));
}

#[test]
fn matching_equations_accept_surfaces() {
    let tri = lst_1_2_3();
    let eqs = MatchingEquations::for_encoding(&tri, NormalEncoding::standard()).unwrap();
    assert_eq!(eqs.dim(), 7);
    for v in [
        [0, 0, 0, 0, 0, 1, 0],
        [0, 0, 1, 1, 1, 0, 0],
        [1, 1, 0, 0, 0, 0, 1],
        [1, 1, 1, 1, 0, 0, 0],
    ] {
        assert!(eqs.satisfied_by(&Vector::from_i64s(&v)).unwrap());
    }
    assert!(!eqs.satisfied_by(&Vector::from_i64s(&[1, 0, 0, 0, 0, 0, 0])).unwrap());
    assert!(eqs.satisfied_by(&Vector::zero(3)).is_err());

    let tri = figure_eight();
    let eqs = MatchingEquations::quad(&tri, NormalEncoding::quad()).unwrap();
    assert_eq!(eqs.len(), 2);
    assert!(eqs.satisfied_by(&Vector::from_i64s(&[1, 0, 0, 0, 2, 0])).unwrap());
    assert!(MatchingEquations::standard(&tri, NormalEncoding::quad()).is_err());
    assert!(MatchingEquations::quad(&tri, NormalEncoding::standard()).is_err());
}

#[test]
fn weber_seifert_vertex_links_are_spheres() {
    let tri = weber_seifert();
    let eqs = MatchingEquations::standard(&tri, NormalEncoding::standard()).unwrap();
    let mut total: Vector<Integer> = Vector::zero(7 * tri.size());
    for (v, vertex) in tri.vertices().iter().enumerate() {
        let link = NormalSurface::vertex_link_of(&tri, v).unwrap();
        assert!(eqs.satisfied_by(link.vector()).unwrap());
        assert_eq!(chi(&link), vertex.link_euler_char);
        assert_eq!(chi(&link), 2);
        assert_eq!(link.is_orientable(), Some(true));
        assert_eq!(link.is_two_sided(), Some(true));
        assert!(!link.has_real_boundary());
        assert_eq!(link.is_vertex_link(), Some(v));
        assert_eq!(link.vector().iter().filter(|x| !x.is_zero()).count(), vertex.degree());
        total += link.vector();
    }
    // Every triangle coordinate belongs to exactly one vertex link.
    let all = NormalSurface::new(&tri, NormalEncoding::standard(), total).unwrap();
    assert_eq!(chi(&all), 4);
    assert!(all.is_vertex_linking());
    assert_eq!(all.is_vertex_link(), None);
}
