//! Skeleton construction: components, vertices, edges, triangles, boundary
//! components and vertex links, computed in one pass over the gluings.

use std::collections::VecDeque;

use tracing::debug;

use super::types::{
    BoundaryComponent, BoundaryKind, Component, Edge, EdgeEmbedding, Triangle,
    TriangleEmbedding, Vertex, VertexEmbedding, VertexLink,
};
use super::Tetrahedron;
use crate::perm::{edge_number, edge_ordering, face_ordering, Perm4};

const UNSET: usize = usize::MAX;

#[derive(Clone, Debug)]
pub(crate) struct Skeleton {
    pub components: Vec<Component>,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub triangles: Vec<Triangle>,
    pub boundary_components: Vec<BoundaryComponent>,
    pub tet_component: Vec<usize>,
    /// ±1 per tetrahedron, consistent within orientable components.
    pub tet_orientation: Vec<i32>,
    pub tet_vertex: Vec<[usize; 4]>,
    pub tet_edge: Vec<[usize; 6]>,
    pub tet_triangle: Vec<[usize; 4]>,
    pub valid: bool,
    pub orientable: bool,
    pub ideal: bool,
    pub standard: bool,
}

impl Skeleton {
    pub fn build(tets: &[Tetrahedron]) -> Self {
        let n = tets.len();
        let mut sk = Skeleton {
            components: Vec::new(),
            vertices: Vec::new(),
            edges: Vec::new(),
            triangles: Vec::new(),
            boundary_components: Vec::new(),
            tet_component: vec![UNSET; n],
            tet_orientation: vec![0; n],
            tet_vertex: vec![[UNSET; 4]; n],
            tet_edge: vec![[UNSET; 6]; n],
            tet_triangle: vec![[UNSET; 4]; n],
            valid: true,
            orientable: true,
            ideal: false,
            standard: true,
        };
        sk.label_components(tets);
        sk.label_vertices(tets);
        sk.label_edges(tets);
        sk.label_triangles(tets);
        sk.label_real_boundary();
        sk.classify_vertex_links(tets);
        debug!(
            tetrahedra = n,
            vertices = sk.vertices.len(),
            edges = sk.edges.len(),
            triangles = sk.triangles.len(),
            components = sk.components.len(),
            valid = sk.valid,
            orientable = sk.orientable,
            ideal = sk.ideal,
            "skeleton built"
        );
        sk
    }

    /// Flood through facet gluings, transporting an orientation sign.
    fn label_components(&mut self, tets: &[Tetrahedron]) {
        for start in 0..tets.len() {
            if self.tet_component[start] != UNSET {
                continue;
            }
            let cid = self.components.len();
            let mut comp = Component {
                tetrahedra: vec![start],
                orientable: true,
                ideal: false,
                boundary_components: Vec::new(),
            };
            self.tet_component[start] = cid;
            self.tet_orientation[start] = 1;
            let mut queue = VecDeque::from([start]);
            while let Some(t) = queue.pop_front() {
                for f in 0..4 {
                    let Some(g) = tets[t].adjacent(f) else {
                        continue;
                    };
                    let expected = -g.perm.sign() * self.tet_orientation[t];
                    if self.tet_component[g.tet] == UNSET {
                        self.tet_component[g.tet] = cid;
                        self.tet_orientation[g.tet] = expected;
                        comp.tetrahedra.push(g.tet);
                        queue.push_back(g.tet);
                    } else if self.tet_orientation[g.tet] != expected {
                        comp.orientable = false;
                    }
                }
            }
            self.orientable &= comp.orientable;
            self.components.push(comp);
        }
    }

    /// Flood through tetrahedron corners across the faces containing them.
    fn label_vertices(&mut self, tets: &[Tetrahedron]) {
        // Orientation of the link triangle at each corner.
        let mut local = vec![[0i32; 4]; tets.len()];
        for start in 0..tets.len() {
            for corner in 0..4 {
                if self.tet_vertex[start][corner] != UNSET {
                    continue;
                }
                let vid = self.vertices.len();
                let mut link_orientable = true;
                let mut embeddings = vec![VertexEmbedding {
                    tet: start,
                    vertex: corner,
                }];
                self.tet_vertex[start][corner] = vid;
                local[start][corner] = 1;
                let mut next = 0;
                while next < embeddings.len() {
                    let VertexEmbedding { tet: t, vertex: c } = embeddings[next];
                    next += 1;
                    for f in (0..4).filter(|&f| f != c) {
                        let Some(g) = tets[t].adjacent(f) else {
                            continue;
                        };
                        let d = g.perm.apply(c);
                        let expected = -g.perm.sign() * local[t][c];
                        if self.tet_vertex[g.tet][d] == UNSET {
                            self.tet_vertex[g.tet][d] = vid;
                            local[g.tet][d] = expected;
                            embeddings.push(VertexEmbedding {
                                tet: g.tet,
                                vertex: d,
                            });
                        } else if local[g.tet][d] != expected {
                            link_orientable = false;
                        }
                    }
                }
                self.vertices.push(Vertex {
                    embeddings,
                    link: VertexLink::Sphere,
                    link_orientable,
                    link_euler_char: 0,
                    component: self.tet_component[start],
                    boundary_component: None,
                });
            }
        }
    }

    /// Walk around each edge through the faces on either side of it.
    fn label_edges(&mut self, tets: &[Tetrahedron]) {
        let swap23 = Perm4::transposition(2, 3);
        for start in 0..tets.len() {
            for e in 0..6 {
                if self.tet_edge[start][e] != UNSET {
                    continue;
                }
                let eid = self.edges.len();
                let first = edge_ordering(e);
                let mut embeddings = vec![EdgeEmbedding {
                    tet: start,
                    perm: first,
                }];
                self.tet_edge[start][e] = eid;
                let mut valid = true;
                let mut boundary = false;

                let (mut t, mut p) = (start, first);
                loop {
                    let Some(g) = tets[t].adjacent(p.apply(3)) else {
                        boundary = true;
                        break;
                    };
                    let q = g.perm * p * swap23;
                    let emb = EdgeEmbedding { tet: g.tet, perm: q };
                    if g.tet == start && emb.edge() == e {
                        if q.apply(0) != first.apply(0) {
                            valid = false;
                        }
                        break;
                    }
                    if self.tet_edge[g.tet][emb.edge()] != UNSET {
                        debug_assert!(false, "edge walk revisited an embedding");
                        break;
                    }
                    self.tet_edge[g.tet][emb.edge()] = eid;
                    embeddings.push(emb);
                    (t, p) = (g.tet, q);
                }

                if boundary {
                    // Walk the other way from the start until the boundary.
                    let (mut t, mut p) = (start, first);
                    while let Some(g) = tets[t].adjacent(p.apply(2)) {
                        let q = g.perm * p * swap23;
                        let emb = EdgeEmbedding { tet: g.tet, perm: q };
                        if self.tet_edge[g.tet][emb.edge()] != UNSET {
                            debug_assert!(false, "edge walk revisited an embedding");
                            break;
                        }
                        self.tet_edge[g.tet][emb.edge()] = eid;
                        embeddings.insert(0, emb);
                        (t, p) = (g.tet, q);
                    }
                }

                self.valid &= valid;
                self.edges.push(Edge {
                    embeddings,
                    valid,
                    boundary,
                    component: self.tet_component[start],
                    boundary_component: None,
                });
            }
        }
    }

    fn label_triangles(&mut self, tets: &[Tetrahedron]) {
        for t in 0..tets.len() {
            for f in 0..4 {
                if self.tet_triangle[t][f] != UNSET {
                    continue;
                }
                let fid = self.triangles.len();
                let perm = face_ordering(f);
                let mut embeddings = vec![TriangleEmbedding { tet: t, perm }];
                self.tet_triangle[t][f] = fid;
                if let Some(g) = tets[t].adjacent(f) {
                    self.tet_triangle[g.tet][g.perm.apply(f)] = fid;
                    embeddings.push(TriangleEmbedding {
                        tet: g.tet,
                        perm: g.perm * perm,
                    });
                }
                self.triangles.push(Triangle {
                    embeddings,
                    component: self.tet_component[t],
                    boundary_component: None,
                });
            }
        }
    }

    /// Boundary triangles sharing a boundary edge lie in the same boundary
    /// component; components are numbered by their lowest triangle.
    fn label_real_boundary(&mut self) {
        let nt = self.triangles.len();
        let mut parent: Vec<usize> = (0..nt).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        for edge in self.edges.iter().filter(|e| e.boundary) {
            let (Some(first), Some(last)) = (edge.embeddings.first(), edge.embeddings.last())
            else {
                continue;
            };
            let a = self.tet_triangle[first.tet][first.perm.apply(2)];
            let b = self.tet_triangle[last.tet][last.perm.apply(3)];
            let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
            if ra != rb {
                parent[ra.max(rb)] = ra.min(rb);
            }
        }

        let mut root_to_bc = vec![UNSET; nt];
        for fid in 0..nt {
            if !self.triangles[fid].is_boundary() {
                continue;
            }
            let root = find(&mut parent, fid);
            if root_to_bc[root] == UNSET {
                root_to_bc[root] = self.boundary_components.len();
                let component = self.triangles[fid].component;
                self.components[component]
                    .boundary_components
                    .push(self.boundary_components.len());
                self.boundary_components.push(BoundaryComponent {
                    kind: BoundaryKind::Real,
                    component,
                    triangles: Vec::new(),
                    edges: Vec::new(),
                    vertices: Vec::new(),
                    euler_char: 0,
                });
            }
            let bc = root_to_bc[root];
            self.triangles[fid].boundary_component = Some(bc);
            self.boundary_components[bc].triangles.push(fid);

            let emb = self.triangles[fid].embeddings[0];
            let t = emb.tet;
            for i in 0..3 {
                let v = self.tet_vertex[t][emb.perm.apply(i)];
                if self.vertices[v].boundary_component.is_none() {
                    self.vertices[v].boundary_component = Some(bc);
                    self.boundary_components[bc].vertices.push(v);
                }
                let e = self.tet_edge[t][edge_number(emb.perm.apply(i), emb.perm.apply((i + 1) % 3))];
                if self.edges[e].boundary_component.is_none() {
                    self.edges[e].boundary_component = Some(bc);
                    self.boundary_components[bc].edges.push(e);
                }
            }
        }
        for bc in self.boundary_components.iter_mut() {
            bc.euler_char =
                bc.vertices.len() as i64 - bc.edges.len() as i64 + bc.triangles.len() as i64;
        }
    }

    /// Euler characteristic of each vertex link from face counts:
    /// F = degree, E = (3F + boundary arcs) / 2, V = edge ends at the vertex.
    fn classify_vertex_links(&mut self, tets: &[Tetrahedron]) {
        let mut edge_ends = vec![0i64; self.vertices.len()];
        for edge in &self.edges {
            let emb = edge.embeddings[0];
            let (a, b) = emb.ends();
            edge_ends[self.tet_vertex[emb.tet][a]] += 1;
            edge_ends[self.tet_vertex[emb.tet][b]] += 1;
        }
        for (vid, vertex) in self.vertices.iter_mut().enumerate() {
            let faces = vertex.embeddings.len() as i64;
            let boundary_arcs = vertex
                .embeddings
                .iter()
                .map(|emb| {
                    (0..4)
                        .filter(|&f| f != emb.vertex && tets[emb.tet].adjacent(f).is_none())
                        .count() as i64
                })
                .sum::<i64>();
            let link_edges = (3 * faces + boundary_arcs) / 2;
            let chi = edge_ends[vid] - link_edges + faces;
            vertex.link_euler_char = chi;
            vertex.link = if boundary_arcs == 0 {
                match chi {
                    2 => VertexLink::Sphere,
                    0 if vertex.link_orientable => VertexLink::Torus,
                    0 => VertexLink::KleinBottle,
                    _ => VertexLink::NonStandardCusp,
                }
            } else if chi == 1 {
                VertexLink::Disc
            } else {
                VertexLink::NonStandardBoundary
            };
        }

        for vid in 0..self.vertices.len() {
            let link = self.vertices[vid].link;
            self.standard &= link.is_standard();
            self.valid &= link.is_standard();
            if link.is_ideal() {
                self.ideal = true;
                let component = self.vertices[vid].component;
                self.components[component].ideal = true;
                let bc = self.boundary_components.len();
                self.components[component].boundary_components.push(bc);
                self.vertices[vid].boundary_component = Some(bc);
                self.boundary_components.push(BoundaryComponent {
                    kind: BoundaryKind::Ideal,
                    component,
                    triangles: Vec::new(),
                    edges: Vec::new(),
                    vertices: vec![vid],
                    euler_char: self.vertices[vid].link_euler_char,
                });
            }
        }
    }
}
