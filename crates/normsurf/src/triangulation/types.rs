//! Skeletal faces of a 3-triangulation.
//!
//! Kept as plain data: the skeleton builder fills every field, callers read
//! them. Cross references between faces are indices into the skeleton's
//! arrays, never pointers.

use std::fmt;

use crate::perm::{edge_number, Perm4};

/// Corner `vertex` of tetrahedron `tet`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexEmbedding {
    pub tet: usize,
    pub vertex: usize,
}

/// Edge of tetrahedron `tet` running from `perm(0)` to `perm(1)`.
///
/// `perm(2)` and `perm(3)` are the faces on either side: stepping through face
/// `perm(3)` reaches the next embedding around the edge, and stepping through
/// `perm(2)` the previous one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeEmbedding {
    pub tet: usize,
    pub perm: Perm4,
}

impl EdgeEmbedding {
    #[inline]
    pub fn edge(&self) -> usize {
        edge_number(self.perm.apply(0), self.perm.apply(1))
    }

    #[inline]
    pub fn ends(&self) -> (usize, usize) {
        (self.perm.apply(0), self.perm.apply(1))
    }
}

/// Face `perm(3)` of tetrahedron `tet`; `perm(0..3)` are its corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TriangleEmbedding {
    pub tet: usize,
    pub perm: Perm4,
}

impl TriangleEmbedding {
    #[inline]
    pub fn face(&self) -> usize {
        self.perm.apply(3)
    }
}

/// Topological type of a vertex link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexLink {
    /// Closed, χ = 2: an internal vertex.
    Sphere,
    /// Bounded, χ = 1: a vertex on the real boundary.
    Disc,
    /// Closed orientable χ = 0: an ideal vertex.
    Torus,
    /// Closed non-orientable χ = 0: an ideal vertex.
    KleinBottle,
    /// Closed with χ < 0 or χ = 1 (a projective plane).
    NonStandardCusp,
    /// Bounded but not a disc.
    NonStandardBoundary,
}

impl VertexLink {
    pub fn is_closed(self) -> bool {
        !matches!(self, Self::Disc | Self::NonStandardBoundary)
    }

    /// Closed and not a sphere.
    pub fn is_ideal(self) -> bool {
        matches!(self, Self::Torus | Self::KleinBottle | Self::NonStandardCusp)
    }

    pub fn is_standard(self) -> bool {
        matches!(
            self,
            Self::Sphere | Self::Disc | Self::Torus | Self::KleinBottle
        )
    }
}

impl fmt::Display for VertexLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sphere => "sphere",
            Self::Disc => "disc",
            Self::Torus => "torus",
            Self::KleinBottle => "klein-bottle",
            Self::NonStandardCusp => "non-standard-cusp",
            Self::NonStandardBoundary => "non-standard-boundary",
        })
    }
}

#[derive(Clone, Debug)]
pub struct Vertex {
    /// Corners in the order the flood around the vertex reached them.
    pub embeddings: Vec<VertexEmbedding>,
    pub link: VertexLink,
    pub link_orientable: bool,
    pub link_euler_char: i64,
    pub component: usize,
    pub boundary_component: Option<usize>,
}

impl Vertex {
    pub fn degree(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_valid(&self) -> bool {
        self.link.is_standard()
    }

    pub fn is_ideal(&self) -> bool {
        self.link.is_ideal()
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    /// Embeddings in order around the edge. For a boundary edge the first
    /// has boundary face `perm(2)` and the last has boundary face `perm(3)`.
    pub embeddings: Vec<EdgeEmbedding>,
    /// False iff the edge is identified with itself in reverse.
    pub valid: bool,
    pub boundary: bool,
    pub component: usize,
    pub boundary_component: Option<usize>,
}

impl Edge {
    pub fn degree(&self) -> usize {
        self.embeddings.len()
    }
}

#[derive(Clone, Debug)]
pub struct Triangle {
    /// One embedding on the boundary, two otherwise.
    pub embeddings: Vec<TriangleEmbedding>,
    pub component: usize,
    pub boundary_component: Option<usize>,
}

impl Triangle {
    pub fn is_boundary(&self) -> bool {
        self.embeddings.len() == 1
    }
}

#[derive(Clone, Debug)]
pub struct Component {
    pub tetrahedra: Vec<usize>,
    pub orientable: bool,
    pub ideal: bool,
    pub boundary_components: Vec<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Built from boundary triangles.
    Real,
    /// The link of a single ideal vertex.
    Ideal,
}

#[derive(Clone, Debug)]
pub struct BoundaryComponent {
    pub kind: BoundaryKind,
    pub component: usize,
    pub triangles: Vec<usize>,
    pub edges: Vec<usize>,
    pub vertices: Vec<usize>,
    pub euler_char: i64,
}
