//! Matching equations: the linear conditions that make discs glue up across faces.
//!
//! Standard layouts get three rows per interior triangle (one per corner of the
//! triangle: arcs cutting off that corner must agree on both sides). Triangle-free
//! layouts get one row per interior edge (the quad/octagon "slope" around the
//! edge sums to zero).

use super::coords::{quad_separating, NormalEncoding};
use crate::arith::Integer;
use crate::error::{Error, Result};
use crate::triangulation::Triangulation;
use crate::vector::Vector;

/// Sparse integer rows over the positions of one encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchingEquations {
    rows: Vec<Vec<(usize, i64)>>,
    dim: usize,
}

/// Accumulates one row, cancelling repeated positions.
#[derive(Default)]
struct RowBuilder {
    terms: Vec<(usize, i64)>,
}

impl RowBuilder {
    fn add(&mut self, pos: usize, coeff: i64) {
        match self.terms.iter_mut().find(|(p, _)| *p == pos) {
            Some((_, c)) => *c += coeff,
            None => self.terms.push((pos, coeff)),
        }
    }

    fn finish(mut self) -> Vec<(usize, i64)> {
        self.terms.retain(|&(_, c)| c != 0);
        self.terms.sort_unstable();
        self.terms
    }
}

impl MatchingEquations {
    /// Triangle-matching rows for a layout that stores triangles.
    pub fn standard(tri: &Triangulation, enc: NormalEncoding) -> Result<Self> {
        if !enc.stores_triangles() {
            return Err(Error::invalid(format!(
                "{} coordinates have no triangle-matching equations",
                enc.coords()
            )));
        }
        let mut rows = Vec::new();
        for triangle in tri.triangles().iter().filter(|t| !t.is_boundary()) {
            let [a, b] = [triangle.embeddings[0], triangle.embeddings[1]];
            for i in 0..3 {
                let mut row = RowBuilder::default();
                for (emb, sign) in [(a, 1), (b, -1)] {
                    let corner = emb.perm.apply(i);
                    let k = quad_separating(corner, emb.face());
                    if let Some(p) = enc.triangle_pos(emb.tet, corner) {
                        row.add(p, sign);
                    }
                    row.add(enc.quad_pos(emb.tet, k), sign);
                    for j in (0..3).filter(|&j| j != k) {
                        if let Some(p) = enc.oct_pos(emb.tet, j) {
                            row.add(p, sign);
                        }
                    }
                }
                let row = row.finish();
                if !row.is_empty() {
                    rows.push(row);
                }
            }
        }
        Ok(Self {
            rows,
            dim: enc.block() * tri.size(),
        })
    }

    /// Edge rows for a triangle-free layout.
    pub fn quad(tri: &Triangulation, enc: NormalEncoding) -> Result<Self> {
        if enc.stores_triangles() {
            return Err(Error::invalid(format!(
                "{} coordinates use triangle-matching equations",
                enc.coords()
            )));
        }
        let mut rows = Vec::new();
        for edge in tri.edges().iter().filter(|e| !e.boundary) {
            let mut row = RowBuilder::default();
            for emb in &edge.embeddings {
                let p = emb.perm;
                let up = quad_separating(p.apply(0), p.apply(2));
                let down = quad_separating(p.apply(0), p.apply(3));
                row.add(enc.quad_pos(emb.tet, up), 1);
                row.add(enc.quad_pos(emb.tet, down), -1);
                if let (Some(o_up), Some(o_down)) =
                    (enc.oct_pos(emb.tet, down), enc.oct_pos(emb.tet, up))
                {
                    row.add(o_up, 1);
                    row.add(o_down, -1);
                }
            }
            let row = row.finish();
            if !row.is_empty() {
                rows.push(row);
            }
        }
        Ok(Self {
            rows,
            dim: enc.block() * tri.size(),
        })
    }

    /// The natural system for `enc`.
    pub fn for_encoding(tri: &Triangulation, enc: NormalEncoding) -> Result<Self> {
        if enc.stores_triangles() {
            Self::standard(tri, enc)
        } else {
            Self::quad(tri, enc)
        }
    }

    pub fn rows(&self) -> &[Vec<(usize, i64)>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of the vectors the rows apply to.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Row `r` evaluated at `v`.
    pub fn evaluate(&self, r: usize, v: &Vector<Integer>) -> Integer {
        self.rows[r]
            .iter()
            .filter(|(p, _)| !v[*p].is_zero())
            .map(|&(p, c)| &v[p] * c)
            .sum()
    }

    pub fn satisfied_by(&self, v: &Vector<Integer>) -> Result<bool> {
        if v.len() != self.dim {
            return Err(Error::precondition(format!(
                "vector of length {} against equations of dimension {}",
                v.len(),
                self.dim
            )));
        }
        Ok((0..self.rows.len()).all(|r| self.evaluate(r, v).is_zero()))
    }
}
