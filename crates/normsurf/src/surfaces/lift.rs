//! Canonical triangle coordinates for triangle-free vectors.
//!
//! Around each vertex, the standard matching equations fix the difference of
//! triangle counts across every interior face, given the quads and octagons.
//! Solving outward from the vertex's first corner and shifting so the smallest
//! count is zero gives the unique lift with no extra copies of the vertex link.
//! If the differences disagree around a loop, no compact lift exists (the
//! vector is spun-normal).

use super::coords::{quad_separating, NormalEncoding};
use crate::arith::Integer;
use crate::triangulation::Triangulation;
use crate::vector::Vector;

/// Quad and octagon arcs that cut off corner `a` of face `f` in tetrahedron `t`.
fn arcs_beside(enc: NormalEncoding, v: &Vector<Integer>, t: usize, a: usize, f: usize) -> Integer {
    let k = quad_separating(a, f);
    let mut arcs = v[enc.quad_pos(t, k)].clone();
    for j in (0..3).filter(|&j| j != k) {
        if let Some(p) = enc.oct_pos(t, j) {
            arcs += &v[p];
        }
    }
    arcs
}

/// Lifts `v` (stored under triangle-free `enc`) to `enc.with_triangles()`.
/// Returns `None` when no compact lift exists.
pub(crate) fn canonical_lift(
    tri: &Triangulation,
    enc: NormalEncoding,
    v: &Vector<Integer>,
) -> Option<Vector<Integer>> {
    debug_assert!(!enc.stores_triangles());
    let n = tri.size();
    let mut corner: Vec<[Option<Integer>; 4]> = vec![Default::default(); n];

    for vertex in tri.vertices() {
        let start = vertex.embeddings[0];
        corner[start.tet][start.vertex] = Some(Integer::zero());
        let mut stack = vec![(start.tet, start.vertex)];
        while let Some((t, c)) = stack.pop() {
            let here = corner[t][c].clone()?;
            for f in (0..4).filter(|&f| f != c) {
                let Some(g) = tri.adjacent(t, f) else {
                    continue;
                };
                let (u, d) = (g.tet, g.perm.apply(c));
                let there = &here + &arcs_beside(enc, v, t, c, f)
                    - arcs_beside(enc, v, u, d, g.perm.apply(f));
                match &corner[u][d] {
                    None => {
                        corner[u][d] = Some(there);
                        stack.push((u, d));
                    }
                    Some(existing) if *existing != there => return None,
                    Some(_) => {}
                }
            }
        }
        let min = vertex
            .embeddings
            .iter()
            .filter_map(|e| corner[e.tet][e.vertex].clone())
            .min()?;
        for e in &vertex.embeddings {
            if let Some(x) = corner[e.tet][e.vertex].as_mut() {
                *x -= &min;
            }
        }
    }

    let full = enc.with_triangles();
    let mut out = Vector::zero(n * full.block());
    for t in 0..n {
        for c in 0..4 {
            if let Some(pos) = full.triangle_pos(t, c) {
                out[pos] = corner[t][c].clone()?;
            }
        }
        for k in 0..3 {
            out[full.quad_pos(t, k)] = v[enc.quad_pos(t, k)].clone();
            if let (Some(dst), Some(src)) = (full.oct_pos(t, k), enc.oct_pos(t, k)) {
                out[dst] = v[src].clone();
            }
        }
    }
    Some(out)
}
