//! 3-manifold triangulations: tetrahedra, facet gluings and the derived skeleton.
//!
//! Purpose
//! - Hold a triangulation as a list of tetrahedra with symmetric facet
//!   gluings, and answer skeletal queries (vertices, edges, triangles,
//!   components, boundary components, link types, validity, orientability).
//!
//! Why this design
//! - The skeleton is derived data. It lives in a `OnceCell` that every
//!   mutating method clears, so queries on an unchanged triangulation cost one
//!   build. Triangulations are never shared across threads, so a plain cell is
//!   enough.
//! - Faces refer to each other by index into the skeleton's arrays. Tetrahedra
//!   refer to their neighbours by index into `tets`.
//!
//! Conventions
//! - `join(t, f, u, p)` glues facet `f` of `t` to facet `p(f)` of `u`, with
//!   vertex `i` of `t` identified with vertex `p(i)` of `u`. The reverse gluing
//!   `(t, p⁻¹)` is stored on `u` automatically.
//! - Edge and triangle embeddings follow the permutation conventions documented
//!   on [`EdgeEmbedding`] and [`TriangleEmbedding`].
//!
//! References
//! - Skeleton construction: `skeleton.rs`.
//! - Known triangulations for tests and benches: [`named`].

mod skeleton;
mod types;

pub mod named;
pub mod random;

use std::cell::OnceCell;
use std::ops::Range;

use tracing::trace;

pub use types::{
    BoundaryComponent, BoundaryKind, Component, Edge, EdgeEmbedding, Triangle,
    TriangleEmbedding, Vertex, VertexEmbedding, VertexLink,
};

use crate::error::{Error, Result};
use crate::perm::Perm4;
use skeleton::Skeleton;

/// Where a facet is glued: the adjacent tetrahedron and the vertex map into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Gluing {
    pub tet: usize,
    pub perm: Perm4,
}

/// One tetrahedron; facet `f` is the face opposite vertex `f`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tetrahedron {
    adj: [Option<Gluing>; 4],
}

impl Tetrahedron {
    #[inline]
    pub fn adjacent(&self, facet: usize) -> Option<Gluing> {
        self.adj[facet]
    }

    pub fn is_free(&self, facet: usize) -> bool {
        self.adj[facet].is_none()
    }

    /// Number of facets glued to something.
    pub fn degree(&self) -> usize {
        self.adj.iter().filter(|g| g.is_some()).count()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Triangulation {
    tets: Vec<Tetrahedron>,
    skeleton: OnceCell<Skeleton>,
}

impl PartialEq for Triangulation {
    /// Equal as labelled triangulations: same tetrahedra, same gluings.
    fn eq(&self, other: &Self) -> bool {
        self.tets == other.tets
    }
}

impl Eq for Triangulation {}

impl Triangulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// `n` tetrahedra with every facet free.
    pub fn with_size(n: usize) -> Self {
        Self {
            tets: vec![Tetrahedron::default(); n],
            skeleton: OnceCell::new(),
        }
    }

    /// Builds from `(tet, facet, adjacent, perm)` records, each gluing listed once.
    pub fn from_gluings(n: usize, gluings: &[(usize, usize, usize, Perm4)]) -> Result<Self> {
        let mut tri = Self::with_size(n);
        for &(t, f, u, p) in gluings {
            tri.join(t, f, u, p)?;
        }
        Ok(tri)
    }

    /// Gluing records with each glued facet pair listed once, from the lower
    /// `(tet, facet)` end. Feeding them to [`Self::from_gluings`] rebuilds `self`.
    pub fn gluings(&self) -> Vec<(usize, usize, usize, Perm4)> {
        let mut out = Vec::new();
        for (t, tet) in self.tets.iter().enumerate() {
            for f in 0..4 {
                if let Some(g) = tet.adj[f] {
                    if (t, f) <= (g.tet, g.perm.apply(f)) {
                        out.push((t, f, g.tet, g.perm));
                    }
                }
            }
        }
        out
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.tets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tets.is_empty()
    }

    pub fn tetrahedron(&self, t: usize) -> &Tetrahedron {
        &self.tets[t]
    }

    pub fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.tets
    }

    /// Facet gluing of `(t, facet)`, or `None` if the facet is on the boundary.
    #[inline]
    pub fn adjacent(&self, t: usize, facet: usize) -> Option<Gluing> {
        self.tets[t].adj[facet]
    }

    fn touched(&mut self) {
        self.skeleton.take();
    }

    /// Appends a free tetrahedron and returns its index.
    pub fn add_tetrahedron(&mut self) -> usize {
        self.touched();
        self.tets.push(Tetrahedron::default());
        self.tets.len() - 1
    }

    pub fn add_tetrahedra(&mut self, k: usize) -> Range<usize> {
        self.touched();
        let start = self.tets.len();
        self.tets.resize(start + k, Tetrahedron::default());
        start..start + k
    }

    /// Unglues and removes tetrahedron `t`; later tetrahedra shift down by one.
    pub fn remove_tetrahedron(&mut self, t: usize) -> Result<()> {
        self.check_tet(t)?;
        for f in 0..4 {
            self.unjoin(t, f);
        }
        self.tets.remove(t);
        for tet in self.tets.iter_mut() {
            for g in tet.adj.iter_mut().flatten() {
                if g.tet > t {
                    g.tet -= 1;
                }
            }
        }
        self.touched();
        Ok(())
    }

    fn check_tet(&self, t: usize) -> Result<()> {
        if t < self.tets.len() {
            Ok(())
        } else {
            Err(Error::invalid(format!(
                "tetrahedron {t} out of range (size {})",
                self.tets.len()
            )))
        }
    }

    /// Glues facet `facet` of `t` to facet `perm(facet)` of `u`.
    ///
    /// Fails with `InvalidArgument` on out-of-range indices, on a facet that is
    /// already glued at either end, and on gluing a facet to itself.
    pub fn join(&mut self, t: usize, facet: usize, u: usize, perm: Perm4) -> Result<()> {
        self.check_tet(t)?;
        self.check_tet(u)?;
        if facet > 3 {
            return Err(Error::invalid(format!("facet {facet} out of range")));
        }
        let other = perm.apply(facet);
        if t == u && other == facet {
            return Err(Error::invalid(format!(
                "cannot glue facet {facet} of tetrahedron {t} to itself"
            )));
        }
        if let Some(g) = self.tets[t].adj[facet] {
            return Err(Error::invalid(format!(
                "facet {facet} of tetrahedron {t} is already glued to tetrahedron {}",
                g.tet
            )));
        }
        if let Some(g) = self.tets[u].adj[other] {
            return Err(Error::invalid(format!(
                "facet {other} of tetrahedron {u} is already glued to tetrahedron {}",
                g.tet
            )));
        }
        self.glue(t, facet, u, perm);
        Ok(())
    }

    /// [`Self::join`] with the permutation given by its Lehmer index.
    pub fn join_by_index(&mut self, t: usize, facet: usize, u: usize, index: usize) -> Result<()> {
        self.join(t, facet, u, Perm4::from_index(index)?)
    }

    /// Stores both ends of a gluing the caller has already validated.
    pub(crate) fn glue(&mut self, t: usize, facet: usize, u: usize, perm: Perm4) {
        self.touched();
        self.tets[t].adj[facet] = Some(Gluing { tet: u, perm });
        self.tets[u].adj[perm.apply(facet)] = Some(Gluing {
            tet: t,
            perm: perm.inverse(),
        });
    }

    /// Unglues `(t, facet)` and returns the gluing it had. A free facet is left alone.
    pub fn unjoin(&mut self, t: usize, facet: usize) -> Option<Gluing> {
        let g = self.tets.get(t)?.adj.get(facet).copied().flatten()?;
        self.touched();
        self.tets[t].adj[facet] = None;
        self.tets[g.tet].adj[g.perm.apply(facet)] = None;
        Some(g)
    }

    /// Exchanges contents with `other`, caches included.
    pub fn swap(&mut self, other: &mut Triangulation) {
        std::mem::swap(self, other);
    }

    /// Glues a new tetrahedron across boundary edge `edge`, folding its two
    /// boundary triangles onto two faces of the new tetrahedron.
    ///
    /// The new tetrahedron's vertices 0 and 1 sit on the ends of `edge`, and its
    /// edge 5 (vertices 2, 3) becomes a new boundary edge. Returns the index of
    /// the new tetrahedron.
    pub fn layer_on(&mut self, edge: usize) -> Result<usize> {
        let (first, last) = {
            let edges = self.edges();
            let e = edges.get(edge).ok_or_else(|| {
                Error::invalid(format!("edge {edge} out of range ({} edges)", edges.len()))
            })?;
            if !e.boundary {
                return Err(Error::invalid(format!("edge {edge} is not a boundary edge")));
            }
            match (e.embeddings.first(), e.embeddings.last()) {
                (Some(a), Some(b)) => (*a, *b),
                _ => return Err(Error::impossible(format!("edge {edge} has no embeddings"))),
            }
        };
        let swap23 = Perm4::transposition(2, 3);
        let n = self.add_tetrahedron();
        self.join(n, 3, first.tet, first.perm * swap23)?;
        self.join(n, 2, last.tet, last.perm * swap23)?;
        trace!(edge, new_tet = n, "layered tetrahedron");
        Ok(n)
    }

    fn skeleton(&self) -> &Skeleton {
        self.skeleton.get_or_init(|| Skeleton::build(&self.tets))
    }

    pub fn components(&self) -> &[Component] {
        &self.skeleton().components
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.skeleton().vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.skeleton().edges
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.skeleton().triangles
    }

    /// Real boundary components first, then one per ideal vertex.
    pub fn boundary_components(&self) -> &[BoundaryComponent] {
        &self.skeleton().boundary_components
    }

    pub fn count_vertices(&self) -> usize {
        self.vertices().len()
    }

    pub fn count_edges(&self) -> usize {
        self.edges().len()
    }

    pub fn count_triangles(&self) -> usize {
        self.triangles().len()
    }

    pub fn count_components(&self) -> usize {
        self.components().len()
    }

    pub fn count_boundary_components(&self) -> usize {
        self.boundary_components().len()
    }

    /// Skeletal vertex at corner `corner` of tetrahedron `t`.
    pub fn tet_vertex(&self, t: usize, corner: usize) -> usize {
        self.skeleton().tet_vertex[t][corner]
    }

    /// Skeletal edge at edge number `e` of tetrahedron `t`.
    pub fn tet_edge(&self, t: usize, e: usize) -> usize {
        self.skeleton().tet_edge[t][e]
    }

    /// Skeletal triangle at facet `f` of tetrahedron `t`.
    pub fn tet_triangle(&self, t: usize, f: usize) -> usize {
        self.skeleton().tet_triangle[t][f]
    }

    pub fn tet_component(&self, t: usize) -> usize {
        self.skeleton().tet_component[t]
    }

    /// +1 or −1; within an orientable component, adjacent tetrahedra induce
    /// opposite orientations on their shared face.
    pub fn tet_orientation(&self, t: usize) -> i32 {
        self.skeleton().tet_orientation[t]
    }

    /// No edge is identified with itself in reverse and every vertex link is a
    /// sphere, disc, torus or Klein bottle.
    pub fn is_valid(&self) -> bool {
        self.skeleton().valid
    }

    pub fn is_orientable(&self) -> bool {
        self.skeleton().orientable
    }

    /// Some vertex has a closed link other than a sphere.
    pub fn is_ideal(&self) -> bool {
        self.skeleton().ideal
    }

    /// Every vertex link is a sphere, disc, torus or Klein bottle.
    pub fn is_standard(&self) -> bool {
        self.skeleton().standard
    }

    /// No boundary components, real or ideal.
    pub fn is_closed(&self) -> bool {
        self.boundary_components().is_empty()
    }

    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }

    pub fn has_boundary_triangles(&self) -> bool {
        self.triangles().iter().any(Triangle::is_boundary)
    }

    /// V − E + F − T over the skeleton.
    pub fn euler_char_tri(&self) -> i64 {
        self.count_vertices() as i64 - self.count_edges() as i64 + self.count_triangles() as i64
            - self.size() as i64
    }

    /// Euler characteristic of the compact manifold obtained by truncating
    /// ideal and invalid vertices and the midpoints of invalid edges.
    pub fn euler_char_manifold(&self) -> i64 {
        let mut chi = self.euler_char_tri();
        for v in self.vertices() {
            if v.is_ideal() || !v.is_valid() {
                chi += v.link_euler_char - 1;
            }
        }
        chi + self.edges().iter().filter(|e| !e.valid).count() as i64
    }
}
