//! Small triangulations with known topology.
//!
//! Closed: [`three_sphere`], [`lens_3_1`], [`rp3`], [`s2xs1`], [`quaternionic`],
//! [`double_tetrahedron`], [`weber_seifert`]. Ideal: [`figure_eight`]. Bounded:
//! [`single_tetrahedron`], [`lst_1_2_3`], [`layered_solid_torus`].

use num_integer::Integer as _;

use super::Triangulation;
use crate::error::{Error, Result};
use crate::perm::Perm4;

type Row = (usize, usize, usize, [u8; 4]);

fn build(n: usize, rows: &[Row]) -> Triangulation {
    let mut tri = Triangulation::with_size(n);
    for &(t, f, u, img) in rows {
        tri.glue(t, f, u, Perm4::from_images_unchecked(img));
    }
    tri
}

/// One-vertex two-tetrahedron 3-sphere.
pub fn three_sphere() -> Triangulation {
    build(
        2,
        &[
            (0, 0, 0, [1, 0, 2, 3]),
            (0, 2, 1, [1, 2, 0, 3]),
            (0, 3, 1, [0, 2, 3, 1]),
            (1, 2, 1, [0, 1, 3, 2]),
        ],
    )
}

/// Layered lens space L(3,1).
pub fn lens_3_1() -> Triangulation {
    build(
        2,
        &[
            (0, 0, 0, [1, 0, 2, 3]),
            (0, 2, 1, [2, 3, 0, 1]),
            (0, 3, 1, [2, 3, 0, 1]),
            (1, 2, 1, [1, 2, 3, 0]),
        ],
    )
}

/// Real projective space.
pub fn rp3() -> Triangulation {
    build(
        2,
        &[
            (0, 0, 0, [1, 0, 2, 3]),
            (0, 2, 1, [1, 2, 0, 3]),
            (0, 3, 1, [3, 0, 2, 1]),
            (1, 2, 1, [2, 0, 3, 1]),
        ],
    )
}

/// The product S² × S¹.
pub fn s2xs1() -> Triangulation {
    build(
        2,
        &[
            (0, 0, 0, [1, 2, 3, 0]),
            (0, 2, 1, [2, 3, 0, 1]),
            (0, 3, 1, [2, 3, 0, 1]),
            (1, 2, 1, [1, 2, 3, 0]),
        ],
    )
}

/// Quaternionic space S³/Q₈.
pub fn quaternionic() -> Triangulation {
    build(
        2,
        &[
            (0, 0, 1, [0, 2, 3, 1]),
            (0, 1, 1, [3, 1, 0, 2]),
            (0, 2, 1, [1, 3, 2, 0]),
            (0, 3, 1, [2, 0, 1, 3]),
        ],
    )
}

/// Two tetrahedra glued by the identity along all four faces: a four-vertex 3-sphere.
pub fn double_tetrahedron() -> Triangulation {
    build(
        2,
        &[
            (0, 0, 1, [0, 1, 2, 3]),
            (0, 1, 1, [0, 1, 2, 3]),
            (0, 2, 1, [0, 1, 2, 3]),
            (0, 3, 1, [0, 1, 2, 3]),
        ],
    )
}

/// The Seifert–Weber dodecahedral space: opposite faces of a dodecahedron
/// glued with a 3/10 twist.
///
/// Each pentagon is fanned from one corner (matched across glued faces) and
/// coned to the centre, giving 36 tetrahedra. Tetrahedron `t` has the centre
/// at vertex 0 and its pentagon triangle opposite. Two vertices: the centre and
/// the single class of dodecahedron corners.
pub fn weber_seifert() -> Triangulation {
    build(
        36,
        &[
            (0, 0, 29, [0, 1, 3, 2]),
            (0, 1, 7, [0, 1, 3, 2]),
            (0, 2, 1, [0, 1, 3, 2]),
            (0, 3, 15, [0, 3, 2, 1]),
            (1, 0, 28, [0, 1, 3, 2]),
            (1, 1, 3, [0, 1, 3, 2]),
            (1, 2, 2, [0, 1, 3, 2]),
            (2, 0, 27, [0, 1, 3, 2]),
            (2, 1, 9, [0, 3, 2, 1]),
            (2, 2, 23, [0, 3, 2, 1]),
            (3, 0, 32, [0, 1, 3, 2]),
            (3, 2, 4, [0, 1, 3, 2]),
            (3, 3, 9, [0, 3, 2, 1]),
            (4, 0, 31, [0, 1, 3, 2]),
            (4, 1, 6, [0, 1, 3, 2]),
            (4, 2, 5, [0, 1, 3, 2]),
            (5, 0, 30, [0, 1, 3, 2]),
            (5, 1, 12, [0, 3, 2, 1]),
            (5, 2, 26, [0, 3, 2, 1]),
            (6, 0, 35, [0, 1, 3, 2]),
            (6, 2, 7, [0, 1, 3, 2]),
            (6, 3, 12, [0, 3, 2, 1]),
            (7, 0, 34, [0, 1, 3, 2]),
            (7, 2, 8, [0, 1, 3, 2]),
            (8, 0, 33, [0, 1, 3, 2]),
            (8, 1, 15, [0, 3, 2, 1]),
            (8, 2, 20, [0, 3, 2, 1]),
            (9, 0, 20, [0, 1, 3, 2]),
            (9, 2, 10, [0, 1, 3, 2]),
            (10, 0, 19, [0, 1, 3, 2]),
            (10, 1, 26, [0, 1, 3, 2]),
            (10, 2, 11, [0, 1, 3, 2]),
            (11, 0, 18, [0, 1, 3, 2]),
            (11, 1, 35, [0, 1, 3, 2]),
            (11, 2, 21, [0, 1, 3, 2]),
            (12, 0, 23, [0, 1, 3, 2]),
            (12, 2, 13, [0, 1, 3, 2]),
            (13, 0, 22, [0, 1, 3, 2]),
            (13, 1, 20, [0, 1, 3, 2]),
            (13, 2, 14, [0, 1, 3, 2]),
            (14, 0, 21, [0, 1, 3, 2]),
            (14, 1, 29, [0, 1, 3, 2]),
            (14, 2, 24, [0, 1, 3, 2]),
            (15, 0, 26, [0, 1, 3, 2]),
            (15, 2, 16, [0, 1, 3, 2]),
            (16, 0, 25, [0, 1, 3, 2]),
            (16, 1, 23, [0, 1, 3, 2]),
            (16, 2, 17, [0, 1, 3, 2]),
            (17, 0, 24, [0, 1, 3, 2]),
            (17, 1, 32, [0, 1, 3, 2]),
            (17, 2, 18, [0, 1, 3, 2]),
            (18, 1, 31, [0, 1, 3, 2]),
            (18, 2, 19, [0, 1, 3, 2]),
            (19, 1, 29, [0, 2, 1, 3]),
            (19, 2, 20, [0, 1, 3, 2]),
            (21, 1, 34, [0, 1, 3, 2]),
            (21, 2, 22, [0, 1, 3, 2]),
            (22, 1, 32, [0, 2, 1, 3]),
            (22, 2, 23, [0, 1, 3, 2]),
            (24, 1, 28, [0, 1, 3, 2]),
            (24, 2, 25, [0, 1, 3, 2]),
            (25, 1, 35, [0, 2, 1, 3]),
            (25, 2, 26, [0, 1, 3, 2]),
            (27, 1, 33, [0, 3, 2, 1]),
            (27, 2, 28, [0, 1, 3, 2]),
            (27, 3, 30, [0, 3, 2, 1]),
            (28, 2, 29, [0, 1, 3, 2]),
            (30, 2, 31, [0, 1, 3, 2]),
            (30, 3, 33, [0, 3, 2, 1]),
            (31, 2, 32, [0, 1, 3, 2]),
            (33, 2, 34, [0, 1, 3, 2]),
            (34, 2, 35, [0, 1, 3, 2]),
        ],
    )
}

/// Ideal two-tetrahedron figure-eight knot complement.
pub fn figure_eight() -> Triangulation {
    build(
        2,
        &[
            (0, 0, 1, [1, 3, 0, 2]),
            (0, 1, 1, [2, 0, 3, 1]),
            (0, 2, 1, [0, 3, 2, 1]),
            (0, 3, 1, [2, 1, 0, 3]),
        ],
    )
}

/// A ball made of one tetrahedron with nothing glued.
pub fn single_tetrahedron() -> Triangulation {
    Triangulation::with_size(1)
}

/// One-tetrahedron layered solid torus LST(1,2,3).
///
/// Boundary edges: tetrahedron edge 0 meets the meridian disc 3 times, edge 1
/// twice, edge 3 once.
pub fn lst_1_2_3() -> Triangulation {
    build(1, &[(0, 0, 0, [1, 2, 3, 0])])
}

/// Layered solid torus LST(a, b, a+b) for coprime `1 <= a < b`.
///
/// Starts from [`lst_1_2_3`] and layers once per step of the Euclidean
/// algorithm run backwards from `(a, b)` to `(1, 2)`. Each layering covers the
/// boundary edge of weight `y − x` (meridian intersections) and creates one of
/// weight equal to the sum of the other two.
pub fn layered_solid_torus(a: u64, b: u64) -> Result<Triangulation> {
    if a == 0 || a >= b || a.gcd(&b) != 1 {
        return Err(Error::invalid(format!(
            "layered solid torus needs coprime 1 <= a < b, got ({a}, {b})"
        )));
    }
    let mut path = Vec::new();
    let (mut x, mut y) = (a, b);
    while (x, y) != (1, 2) {
        path.push((x, y));
        (x, y) = (x.min(y - x), x.max(y - x));
    }
    path.reverse();

    let mut tri = lst_1_2_3();
    // (tetrahedron, edge number) of each boundary edge, with its weight.
    let mut reps: Vec<((usize, usize), u64)> = vec![((0, 0), 3), ((0, 1), 2), ((0, 3), 1)];
    for (x, y) in path {
        let want = y - x;
        let slot = reps.iter().position(|&(_, w)| w == want).ok_or_else(|| {
            Error::impossible(format!("no boundary edge of weight {want} while layering"))
        })?;
        let ((t, e), _) = reps[slot];
        let edge = tri.tet_edge(t, e);
        let n = tri.layer_on(edge)?;
        let weight = reps
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != slot)
            .map(|(_, &(_, w))| w)
            .sum();
        reps[slot] = ((n, 5), weight);
    }
    Ok(tri)
}

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 10] = [
    "three-sphere",
    "lens-3-1",
    "rp3",
    "s2xs1",
    "quaternionic",
    "double-tetrahedron",
    "weber-seifert",
    "figure-eight",
    "single-tetrahedron",
    "lst-1-2-3",
];

pub fn by_name(name: &str) -> Option<Triangulation> {
    Some(match name {
        "three-sphere" => three_sphere(),
        "lens-3-1" => lens_3_1(),
        "rp3" => rp3(),
        "s2xs1" => s2xs1(),
        "quaternionic" => quaternionic(),
        "double-tetrahedron" => double_tetrahedron(),
        "weber-seifert" => weber_seifert(),
        "figure-eight" => figure_eight(),
        "single-tetrahedron" => single_tetrahedron(),
        "lst-1-2-3" => lst_1_2_3(),
        _ => return None,
    })
}
