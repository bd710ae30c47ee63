//! A single normal (or almost normal) surface and its derived properties.

use std::cell::OnceCell;
use std::fmt;
use std::ops::Mul;

use super::coords::{edges_crossed, in_zero_block, quad_separating, NormalCoords, NormalEncoding};
use super::lift::canonical_lift;
use crate::arith::{Integer, Rational};
use crate::error::{Error, Result};
use crate::perm::edge_number;
use crate::triangulation::Triangulation;
use crate::vector::Vector;

/// A surface stored as a coordinate vector under one encoding.
///
/// The triangulation is borrowed and must outlive the surface. Properties are
/// computed on first use and memoised; the vector itself never changes.
#[derive(Clone)]
pub struct NormalSurface<'t> {
    tri: &'t Triangulation,
    enc: NormalEncoding,
    vec: Vector<Integer>,
    name: Option<String>,
    lifted: OnceCell<Option<Vector<Integer>>>,
    euler: OnceCell<Result<Integer>>,
    sides: OnceCell<Option<(bool, bool)>>,
    real_boundary: OnceCell<bool>,
    vertex_link: OnceCell<Option<usize>>,
    edge_links: OnceCell<(Option<usize>, Option<usize>)>,
}

impl fmt::Debug for NormalSurface<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalSurface")
            .field("coords", &self.enc.coords())
            .field("vector", &self.vec)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for NormalSurface<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        write!(f, "{}", self.vec)
    }
}

impl<'t> NormalSurface<'t> {
    /// Fails with `InvalidArgument` if the vector length is not
    /// `block · size` for this triangulation.
    pub fn new(tri: &'t Triangulation, enc: NormalEncoding, vec: Vector<Integer>) -> Result<Self> {
        let expected = enc.block() * tri.size();
        if vec.len() != expected {
            return Err(Error::invalid(format!(
                "{} vector of length {} on {} tetrahedra (expected {expected})",
                enc.coords(),
                vec.len(),
                tri.size()
            )));
        }
        Ok(Self::fresh(tri, enc, vec))
    }

    fn fresh(tri: &'t Triangulation, enc: NormalEncoding, vec: Vector<Integer>) -> Self {
        Self {
            tri,
            enc,
            vec,
            name: None,
            lifted: OnceCell::new(),
            euler: OnceCell::new(),
            sides: OnceCell::new(),
            real_boundary: OnceCell::new(),
            vertex_link: OnceCell::new(),
            edge_links: OnceCell::new(),
        }
    }

    /// As [`Self::new`]; `EdgeWeight` is rejected since it is only a view.
    pub fn from_coords(
        tri: &'t Triangulation,
        coords: NormalCoords,
        vec: Vector<Integer>,
    ) -> Result<Self> {
        Self::new(tri, NormalEncoding::from_coords(coords)?, vec)
    }

    /// The link of `vertex` in standard coordinates.
    pub fn vertex_link_of(tri: &'t Triangulation, vertex: usize) -> Result<Self> {
        let enc = NormalEncoding::standard();
        let v = tri.vertices().get(vertex).ok_or_else(|| {
            Error::invalid(format!("vertex {vertex} out of range"))
        })?;
        let mut vec = Vector::zero(enc.block() * tri.size());
        for e in &v.embeddings {
            if let Some(p) = enc.triangle_pos(e.tet, e.vertex) {
                vec[p] = Integer::one();
            }
        }
        Self::new(tri, enc, vec)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn triangulation(&self) -> &'t Triangulation {
        self.tri
    }

    pub fn encoding(&self) -> NormalEncoding {
        self.enc
    }

    pub fn coords(&self) -> NormalCoords {
        self.enc.coords()
    }

    pub fn vector(&self) -> &Vector<Integer> {
        &self.vec
    }

    pub fn into_vector(self) -> Vector<Integer> {
        self.vec
    }

    /// Triangle count at `corner` of `tet`; 0 when triangles are not stored.
    pub fn triangles(&self, tet: usize, corner: usize) -> Integer {
        self.enc
            .triangle_pos(tet, corner)
            .map_or_else(Integer::zero, |p| self.vec[p].clone())
    }

    pub fn quads(&self, tet: usize, k: usize) -> Integer {
        self.vec[self.enc.quad_pos(tet, k)].clone()
    }

    /// Octagon count of type `k`; 0 when octagons are not stored.
    pub fn octs(&self, tet: usize, k: usize) -> Integer {
        self.enc
            .oct_pos(tet, k)
            .map_or_else(Integer::zero, |p| self.vec[p].clone())
    }

    /// The vector in the layout with triangles, lifting canonically if the
    /// surface was stored without them. `None` for spun-normal surfaces.
    pub fn standard_view(&self) -> Option<&Vector<Integer>> {
        if self.enc.stores_triangles() {
            Some(&self.vec)
        } else {
            self.lifted
                .get_or_init(|| canonical_lift(self.tri, self.enc, &self.vec))
                .as_ref()
        }
    }

    fn view_enc(&self) -> NormalEncoding {
        self.enc.with_triangles()
    }

    /// Arcs cutting off corner `a` of face `f` in `tet`, read from `view`.
    fn arcs_at(&self, view: &Vector<Integer>, tet: usize, a: usize, f: usize) -> Integer {
        let enc = self.view_enc();
        let k = quad_separating(a, f);
        let mut n = view[enc.quad_pos(tet, k)].clone();
        if let Some(p) = enc.triangle_pos(tet, a) {
            n += &view[p];
        }
        for j in (0..3).filter(|&j| j != k) {
            if let Some(p) = enc.oct_pos(tet, j) {
                n += &view[p];
            }
        }
        n
    }

    /// Number of times the surface meets skeletal edge `edge`.
    pub fn edge_weight(&self, edge: usize) -> Option<Integer> {
        let view = self.standard_view()?;
        let enc = self.view_enc();
        let emb = *self.tri.edges().get(edge)?.embeddings.first()?;
        let (a, b) = emb.ends();
        let t = emb.tet;
        let own = quad_separating(a, b);
        let mut w = Integer::zero();
        for c in [a, b] {
            if let Some(p) = enc.triangle_pos(t, c) {
                w += &view[p];
            }
        }
        for k in (0..3).filter(|&k| k != own) {
            w += &view[enc.quad_pos(t, k)];
        }
        for k in 0..3 {
            if let Some(p) = enc.oct_pos(t, k) {
                let times: i64 = if k == own { 2 } else { 1 };
                w += &view[p] * times;
            }
        }
        Some(w)
    }

    /// All edge weights, indexed by skeletal edge: the `EdgeWeight` view.
    pub fn edge_weights(&self) -> Option<Vector<Integer>> {
        (0..self.tri.count_edges())
            .map(|e| self.edge_weight(e))
            .collect::<Option<Vec<_>>>()
            .map(Vector::from_vec)
    }

    /// Normal arcs in skeletal triangle `triangle` that cut off its vertex
    /// `vertex` (0, 1 or 2, as numbered by the triangle's first embedding).
    pub fn arc_count(&self, triangle: usize, vertex: usize) -> Option<Integer> {
        let view = self.standard_view()?;
        let emb = *self.tri.triangles().get(triangle)?.embeddings.first()?;
        if vertex > 2 {
            return None;
        }
        Some(self.arcs_at(view, emb.tet, emb.perm.apply(vertex), emb.face()))
    }

    /// Finitely many discs, i.e. a compact standard view exists.
    pub fn is_compact(&self) -> bool {
        self.standard_view().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_zero()
    }

    /// Sum over discs of `1 − Σ arcs/faces-sharing + Σ corners/edge-degree`.
    ///
    /// `FailedPrecondition` for non-compact surfaces.
    pub fn euler_char(&self) -> Result<Integer> {
        self.euler
            .get_or_init(|| self.compute_euler_char())
            .clone()
    }

    fn compute_euler_char(&self) -> Result<Integer> {
        let view = self.standard_view().ok_or_else(|| {
            Error::precondition("non-compact surface has no Euler characteristic")
        })?;
        let enc = self.view_enc();
        let tri = self.tri;
        let face_share = |t: usize, f: usize| -> Rational {
            Rational::new(1, tri.triangles()[tri.tet_triangle(t, f)].embeddings.len() as i64)
        };
        let edge_share = |t: usize, a: usize, b: usize| -> Rational {
            Rational::new(1, tri.edges()[tri.tet_edge(t, edge_number(a, b))].degree() as i64)
        };

        let mut chi = Rational::zero();
        for t in 0..tri.size() {
            for a in 0..4 {
                let Some(p) = enc.triangle_pos(t, a) else {
                    continue;
                };
                if view[p].is_zero() {
                    continue;
                }
                let mut disc = Rational::one();
                for b in (0..4).filter(|&b| b != a) {
                    disc = disc - face_share(t, b) + edge_share(t, a, b);
                }
                chi = chi + Rational::from(view[p].clone()) * disc;
            }
            for k in 0..3 {
                let quads = &view[enc.quad_pos(t, k)];
                if !quads.is_zero() {
                    let mut disc = Rational::one();
                    for f in 0..4 {
                        disc = disc - face_share(t, f);
                    }
                    for (a, b) in edges_crossed(k, false) {
                        disc = disc + edge_share(t, a, b);
                    }
                    chi = chi + Rational::from(quads.clone()) * disc;
                }
                let Some(p) = enc.oct_pos(t, k) else {
                    continue;
                };
                if !view[p].is_zero() {
                    let mut disc = Rational::one();
                    for f in 0..4 {
                        disc = disc - face_share(t, f) - face_share(t, f);
                    }
                    for (a, b) in edges_crossed(k, true) {
                        disc = disc + edge_share(t, a, b);
                    }
                    chi = chi + Rational::from(view[p].clone()) * disc;
                }
            }
        }
        chi.to_integer().ok_or_else(|| {
            Error::impossible(format!("Euler characteristic {chi} is not an integer"))
        })
    }

    /// `None` for non-compact surfaces.
    pub fn is_orientable(&self) -> Option<bool> {
        self.sidedness().map(|(orientable, _)| orientable)
    }

    /// `None` for non-compact surfaces.
    pub fn is_two_sided(&self) -> Option<bool> {
        self.sidedness().map(|(_, two_sided)| two_sided)
    }

    fn sidedness(&self) -> Option<(bool, bool)> {
        *self.sides.get_or_init(|| {
            let view = self.standard_view()?;
            DiscWalk::new(self.tri, self.view_enc(), view)?.run()
        })
    }

    /// Some disc has an arc on an unglued face.
    pub fn has_real_boundary(&self) -> bool {
        *self.real_boundary.get_or_init(|| {
            let tri = self.tri;
            let free = |t: usize, f: usize| tri.adjacent(t, f).is_none();
            let view = self.standard_view();
            let enc = if view.is_some() { self.view_enc() } else { self.enc };
            let v = view.unwrap_or(&self.vec);
            (0..tri.size()).any(|t| {
                let tris = (0..4).any(|a| {
                    enc.triangle_pos(t, a)
                        .is_some_and(|p| !v[p].is_zero() && (0..4).any(|f| f != a && free(t, f)))
                });
                let others = (0..3)
                    .map(|k| Some(enc.quad_pos(t, k)))
                    .chain((0..3).map(|k| enc.oct_pos(t, k)))
                    .flatten()
                    .any(|p| !v[p].is_zero());
                tris || (others && (0..4).any(|f| free(t, f)))
            })
        })
    }

    /// No quads or octagons: a union of vertex links (or empty).
    pub fn is_vertex_linking(&self) -> bool {
        (0..self.tri.size()).all(|t| {
            (0..3).all(|k| self.quads(t, k).is_zero() && self.octs(t, k).is_zero())
        })
    }

    /// The vertex this surface is exactly the link of.
    pub fn is_vertex_link(&self) -> Option<usize> {
        *self.vertex_link.get_or_init(|| {
            if !self.is_vertex_linking() {
                return None;
            }
            let view = self.standard_view()?;
            let enc = self.view_enc();
            let tri = self.tri;
            let pos = |t: usize, c: usize| enc.triangle_pos(t, c).map(|p| &view[p]);
            let (t0, c0) = (0..tri.size())
                .flat_map(|t| (0..4).map(move |c| (t, c)))
                .find(|&(t, c)| pos(t, c).is_some_and(|x| !x.is_zero()))?;
            let v = tri.tet_vertex(t0, c0);
            let all_match = (0..tri.size()).all(|t| {
                (0..4).all(|c| {
                    let want = if tri.tet_vertex(t, c) == v { 1 } else { 0 };
                    pos(t, c).is_some_and(|x| *x == want)
                })
            });
            all_match.then_some(v)
        })
    }

    /// Edges whose thin edge link is a positive rational multiple of this surface.
    pub fn is_thin_edge_link(&self) -> (Option<usize>, Option<usize>) {
        *self.edge_links.get_or_init(|| {
            let Some(view) = self.standard_view() else {
                return (None, None);
            };
            let enc = self.view_enc();
            let mut found = (0..self.tri.count_edges()).filter(|&e| {
                thin_edge_link(self.tri, enc, e).is_some_and(|link| proportional(view, &link))
            });
            (found.next(), found.next())
        })
    }

    /// Exactly one quad per tetrahedron and no other discs.
    pub fn is_splitting(&self) -> bool {
        let Some(view) = self.standard_view() else {
            return false;
        };
        let enc = self.view_enc();
        (0..self.tri.size()).all(|t| {
            let quads: Integer = (0..3).map(|k| &view[enc.quad_pos(t, k)]).sum();
            let tris_zero = (0..4).all(|c| enc.triangle_pos(t, c).is_some_and(|p| view[p].is_zero()));
            let octs_zero = (0..3).all(|k| enc.oct_pos(t, k).map_or(true, |p| view[p].is_zero()));
            quads == 1 && tris_zero && octs_zero
        })
    }

    /// Number of discs if no tetrahedron holds more than one, else 0.
    pub fn is_central(&self) -> usize {
        let Some(view) = self.standard_view() else {
            return 0;
        };
        let b = self.view_enc().block();
        let mut total = 0;
        for t in 0..self.tri.size() {
            let discs: Integer = view.as_slice()[b * t..b * (t + 1)].iter().sum();
            if discs > 1 {
                return 0;
            }
            if discs == 1 {
                total += 1;
            }
        }
        total
    }

    /// Same triangulation, and no tetrahedron has two different quad/octagon types
    /// between the two surfaces.
    pub fn locally_compatible(&self, other: &NormalSurface<'_>) -> bool {
        if !std::ptr::eq(self.tri, other.tri) {
            return false;
        }
        (0..self.tri.size()).all(|t| {
            let used = |s: &NormalSurface<'_>, slot: usize| {
                if slot < 3 {
                    !s.quads(t, slot).is_zero()
                } else {
                    !s.octs(t, slot - 3).is_zero()
                }
            };
            (0..6).filter(|&slot| used(self, slot) || used(other, slot)).count() <= 1
        })
    }

    /// This surface's vector rewritten under `target`.
    fn vector_in(&self, target: NormalEncoding) -> Result<Vector<Integer>> {
        if target.stores_triangles() && !self.enc.stores_triangles() {
            let view = self.standard_view().ok_or_else(|| {
                Error::invalid("surface has no compact lift to triangle coordinates")
            })?;
            target.project(self.view_enc(), view)
        } else {
            target.project(self.enc, &self.vec)
        }
    }

    /// Sum under the union of both encodings. A triangle-free operand is
    /// lifted canonically when the other stores triangles.
    pub fn sum(&self, other: &NormalSurface<'t>) -> Result<NormalSurface<'t>> {
        if !std::ptr::eq(self.tri, other.tri) {
            return Err(Error::invalid("surfaces live in different triangulations"));
        }
        let target = self.enc.union(other.enc);
        let a = self.vector_in(target)?;
        let b = other.vector_in(target)?;
        NormalSurface::new(self.tri, target, &a + &b)
    }

    /// `k` copies of this surface, under the same encoding.
    pub fn scaled(&self, k: &Integer) -> NormalSurface<'t> {
        NormalSurface::fresh(self.tri, self.enc, &self.vec * k)
    }
}

impl<'t> Mul<&Integer> for &NormalSurface<'t> {
    type Output = NormalSurface<'t>;
    fn mul(self, k: &Integer) -> NormalSurface<'t> {
        self.scaled(k)
    }
}

/// Thin link of edge `e` in layout `enc` (triangles stored, octagons zero),
/// or `None` if the construction leaves a negative count or mixes quad types.
fn thin_edge_link(tri: &Triangulation, enc: NormalEncoding, e: usize) -> Option<Vector<Integer>> {
    let edge = tri.edges().get(e)?;
    let first = edge.embeddings.first()?;
    let (a, b) = first.ends();
    let mut ends = vec![tri.tet_vertex(first.tet, a), tri.tet_vertex(first.tet, b)];
    ends.dedup();

    let mut v = Vector::zero(enc.block() * tri.size());
    for &vertex in &ends {
        for emb in &tri.vertices()[vertex].embeddings {
            v[enc.triangle_pos(emb.tet, emb.vertex)?] += 1;
        }
    }
    for emb in &edge.embeddings {
        let (p, q) = emb.ends();
        v[enc.triangle_pos(emb.tet, p)?] -= 1;
        v[enc.triangle_pos(emb.tet, q)?] -= 1;
        v[enc.quad_pos(emb.tet, quad_separating(p, q))] += 1;
    }
    if !v.is_nonnegative() {
        return None;
    }
    let mixed = (0..tri.size())
        .any(|t| (0..3).filter(|&k| !v[enc.quad_pos(t, k)].is_zero()).count() > 1);
    (!mixed).then_some(v)
}

/// True iff `x = λ·y` for some rational `λ > 0`.
fn proportional(x: &Vector<Integer>, y: &Vector<Integer>) -> bool {
    if x.len() != y.len() {
        return false;
    }
    let mut anchor: Option<(&Integer, &Integer)> = None;
    for (xi, yi) in x.iter().zip(y.iter()) {
        if xi.is_zero() != yi.is_zero() {
            return false;
        }
        if xi.is_zero() {
            continue;
        }
        if xi.sign() != yi.sign() {
            return false;
        }
        match anchor {
            None => anchor = Some((xi, yi)),
            Some((x0, y0)) => {
                if xi * y0 != x0 * yi {
                    return false;
                }
            }
        }
    }
    anchor.is_some()
}

/// Walks individual discs across glued faces to decide orientability and
/// two-sidedness.
///
/// Discs are numbered per tetrahedron by slot (4 triangle corners, 3 quads,
/// 3 octagons), copies consecutive within a slot. Around corner `a` of face `f`
/// the arcs are ordered outward from `a`: triangles, then the quad, then the
/// octagons in type order. Quad and octagon copies are numbered from the side
/// holding vertex 0.
struct DiscWalk<'a> {
    tri: &'a Triangulation,
    /// counts[t][slot]
    counts: Vec<[usize; 10]>,
    /// First disc id of each (tet, slot).
    base: Vec<[usize; 10]>,
    total: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Disc {
    tet: usize,
    slot: usize,
    index: usize,
}

impl<'a> DiscWalk<'a> {
    fn new(tri: &'a Triangulation, enc: NormalEncoding, view: &Vector<Integer>) -> Option<Self> {
        let mut counts = vec![[0usize; 10]; tri.size()];
        let mut base = vec![[0usize; 10]; tri.size()];
        let mut total = 0usize;
        for t in 0..tri.size() {
            for slot in 0..10 {
                let pos = match slot {
                    0..=3 => enc.triangle_pos(t, slot),
                    4..=6 => Some(enc.quad_pos(t, slot - 4)),
                    _ => enc.oct_pos(t, slot - 7),
                };
                let c = match pos {
                    Some(p) => usize::try_from(view[p].to_i64()?).ok()?,
                    None => 0,
                };
                counts[t][slot] = c;
                base[t][slot] = total;
                total = total.checked_add(c)?;
            }
        }
        Some(Self {
            tri,
            counts,
            base,
            total,
        })
    }

    fn id(&self, d: Disc) -> usize {
        self.base[d.tet][d.slot] + d.index
    }

    /// Corners `a` at which disc `d` has an arc on face `f`.
    fn corners(d: Disc, f: usize) -> Vec<usize> {
        match d.slot {
            0..=3 => {
                if d.slot == f {
                    vec![]
                } else {
                    vec![d.slot]
                }
            }
            4..=6 => {
                let k = d.slot - 4;
                (0..4).filter(|&a| a != f && quad_separating(a, f) == k).collect()
            }
            _ => {
                let k = d.slot - 7;
                (0..4).filter(|&a| a != f && quad_separating(a, f) != k).collect()
            }
        }
    }

    /// Outward position of `d`'s arc at corner `a` of face `f`, and the sign
    /// telling whether the disc's inward side faces `a`.
    fn position(&self, d: Disc, a: usize, f: usize) -> (usize, i32) {
        let c = &self.counts[d.tet];
        let sep = quad_separating(a, f);
        let ordered = |k: usize, count: usize| {
            if in_zero_block(k, a) {
                (d.index, 1)
            } else {
                (count - 1 - d.index, -1)
            }
        };
        match d.slot {
            0..=3 => (d.index, 1),
            4..=6 => {
                let (i, s) = ordered(sep, c[d.slot]);
                (c[a] + i, s)
            }
            _ => {
                let k = d.slot - 7;
                let before: usize = (0..k).filter(|&j| j != sep).map(|j| c[7 + j]).sum();
                let (i, s) = ordered(k, c[d.slot]);
                (c[a] + c[4 + sep] + before + i, s)
            }
        }
    }

    /// The disc whose arc sits at outward position `pos` from corner `a` of face `f` in `tet`.
    fn at_position(&self, tet: usize, a: usize, f: usize, pos: usize) -> Option<(Disc, i32)> {
        let c = &self.counts[tet];
        let sep = quad_separating(a, f);
        let mut rest = pos;
        if rest < c[a] {
            return Some((Disc { tet, slot: a, index: rest }, 1));
        }
        rest -= c[a];
        let mut kinds = vec![(4 + sep, sep)];
        kinds.extend((0..3).filter(|&j| j != sep).map(|j| (7 + j, j)));
        for (slot, k) in kinds {
            let count = c[slot];
            if rest < count {
                let (index, s) = if in_zero_block(k, a) {
                    (rest, 1)
                } else {
                    (count - 1 - rest, -1)
                };
                return Some((Disc { tet, slot, index }, s));
            }
            rest -= count;
        }
        None
    }

    /// Returns `(orientable, two_sided)`, or `None` if arcs fail to match up.
    fn run(&self) -> Option<(bool, bool)> {
        let mut side = vec![0i8; self.total];
        let mut orient = vec![0i8; self.total];
        let (mut orientable, mut two_sided) = (true, true);
        let all = (0..self.counts.len()).flat_map(|tet| {
            (0..10).flat_map(move |slot| {
                (0..self.counts[tet][slot]).map(move |index| Disc { tet, slot, index })
            })
        });
        for start in all {
            let sid = self.id(start);
            if side[sid] != 0 {
                continue;
            }
            side[sid] = 1;
            orient[sid] = 1;
            let mut stack = vec![start];
            while let Some(d) = stack.pop() {
                let id = self.id(d);
                for f in 0..4 {
                    let Some(g) = self.tri.adjacent(d.tet, f) else {
                        continue;
                    };
                    for a in Self::corners(d, f) {
                        let (pos, s1) = self.position(d, a, f);
                        let (d2, s2) =
                            self.at_position(g.tet, g.perm.apply(a), g.perm.apply(f), pos)?;
                        let flip = (s1 * s2) as i8;
                        let e2 = side[id] * flip;
                        let t2 = orient[id] * flip * (-g.perm.sign()) as i8;
                        let id2 = self.id(d2);
                        if side[id2] == 0 {
                            side[id2] = e2;
                            orient[id2] = t2;
                            stack.push(d2);
                        } else {
                            two_sided &= side[id2] == e2;
                            orientable &= orient[id2] == t2;
                        }
                    }
                }
            }
        }
        Some((orientable, two_sided))
    }
}
