//! Coordinate systems and the block layout of surface vectors.

use std::fmt;
use std::str::FromStr;

use crate::arith::Integer;
use crate::error::{Error, Result};
use crate::vector::Vector;

/// Vertex pairs split by each quad type: type `k` separates
/// `QUAD_PARTITION[k][0]` from `QUAD_PARTITION[k][1]`.
pub const QUAD_PARTITION: [[[usize; 2]; 2]; 3] = [
    [[0, 1], [2, 3]],
    [[0, 2], [1, 3]],
    [[0, 3], [1, 2]],
];

/// The quad type that keeps vertices `a` and `b` on the same side.
pub fn quad_separating(a: usize, b: usize) -> usize {
    debug_assert!(a != b && a < 4 && b < 4);
    match (a.min(b), a.max(b)) {
        (0, 1) | (2, 3) => 0,
        (0, 2) | (1, 3) => 1,
        _ => 2,
    }
}

/// True iff `a` lies in the half of quad type `k` that contains vertex 0.
pub(crate) fn in_zero_block(k: usize, a: usize) -> bool {
    QUAD_PARTITION[k][0].contains(&a)
}

/// Tetrahedron edges crossed by one disc: four for a quad, eight (with
/// repetition) for an octagon.
pub(crate) fn edges_crossed(k: usize, octagon: bool) -> Vec<(usize, usize)> {
    let [[a, b], [c, d]] = QUAD_PARTITION[k];
    let mut out = vec![(a, c), (a, d), (b, c), (b, d)];
    if octagon {
        out.extend([(a, b), (a, b), (c, d), (c, d)]);
    }
    out
}

/// Coordinate system names understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NormalCoords {
    /// 4 triangles and 3 quads per tetrahedron.
    Standard,
    /// 3 quads per tetrahedron.
    Quad,
    /// Standard plus 3 octagons per tetrahedron.
    AlmostNormal,
    /// 3 quads and 3 octagons per tetrahedron.
    QuadOct,
    /// One weight per skeletal edge. A derived view; vectors are never stored this way.
    EdgeWeight,
}

impl NormalCoords {
    pub fn block_size(self) -> Option<usize> {
        match self {
            Self::Standard => Some(7),
            Self::Quad => Some(3),
            Self::AlmostNormal => Some(10),
            Self::QuadOct => Some(6),
            Self::EdgeWeight => None,
        }
    }

    pub fn stores_triangles(self) -> bool {
        matches!(self, Self::Standard | Self::AlmostNormal)
    }

    pub fn stores_octagons(self) -> bool {
        matches!(self, Self::AlmostNormal | Self::QuadOct)
    }

    pub fn is_view_only(self) -> bool {
        self == Self::EdgeWeight
    }

    /// The triangle-free system with the same quads/octagons.
    pub fn reduced(self) -> Option<Self> {
        match self {
            Self::Standard | Self::Quad => Some(Self::Quad),
            Self::AlmostNormal | Self::QuadOct => Some(Self::QuadOct),
            Self::EdgeWeight => None,
        }
    }

    /// The system with triangles added back.
    pub fn standard(self) -> Option<Self> {
        match self {
            Self::Standard | Self::Quad => Some(Self::Standard),
            Self::AlmostNormal | Self::QuadOct => Some(Self::AlmostNormal),
            Self::EdgeWeight => None,
        }
    }
}

impl fmt::Display for NormalCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Quad => "quad",
            Self::AlmostNormal => "an",
            Self::QuadOct => "quadoct",
            Self::EdgeWeight => "edge-weight",
        })
    }
}

impl FromStr for NormalCoords {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "std" => Ok(Self::Standard),
            "quad" => Ok(Self::Quad),
            "an" | "almost-normal" => Ok(Self::AlmostNormal),
            "quadoct" | "quad-oct" => Ok(Self::QuadOct),
            "edge-weight" | "edge" => Ok(Self::EdgeWeight),
            other => Err(Error::invalid(format!("unknown coordinate system '{other}'"))),
        }
    }
}

/// Which disc kinds a stored vector carries, and where.
///
/// Block layout per tetrahedron: triangles at corners 0..4 (if stored), then
/// quads of types 0..3, then octagons of types 0..3 (if stored).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NormalEncoding {
    triangles: bool,
    octagons: bool,
}

impl NormalEncoding {
    pub const fn standard() -> Self {
        Self {
            triangles: true,
            octagons: false,
        }
    }

    pub const fn quad() -> Self {
        Self {
            triangles: false,
            octagons: false,
        }
    }

    pub const fn almost_normal() -> Self {
        Self {
            triangles: true,
            octagons: true,
        }
    }

    pub const fn quad_oct() -> Self {
        Self {
            triangles: false,
            octagons: true,
        }
    }

    pub fn from_coords(coords: NormalCoords) -> Result<Self> {
        match coords {
            NormalCoords::Standard => Ok(Self::standard()),
            NormalCoords::Quad => Ok(Self::quad()),
            NormalCoords::AlmostNormal => Ok(Self::almost_normal()),
            NormalCoords::QuadOct => Ok(Self::quad_oct()),
            NormalCoords::EdgeWeight => Err(Error::invalid(
                "edge weights are a derived view, not a storage encoding",
            )),
        }
    }

    pub fn coords(self) -> NormalCoords {
        match (self.triangles, self.octagons) {
            (true, false) => NormalCoords::Standard,
            (false, false) => NormalCoords::Quad,
            (true, true) => NormalCoords::AlmostNormal,
            (false, true) => NormalCoords::QuadOct,
        }
    }

    #[inline]
    pub fn block(self) -> usize {
        3 + if self.triangles { 4 } else { 0 } + if self.octagons { 3 } else { 0 }
    }

    #[inline]
    pub fn stores_triangles(self) -> bool {
        self.triangles
    }

    #[inline]
    pub fn stores_octagons(self) -> bool {
        self.octagons
    }

    /// Stores every kind either encoding stores.
    pub fn union(self, other: Self) -> Self {
        Self {
            triangles: self.triangles || other.triangles,
            octagons: self.octagons || other.octagons,
        }
    }

    /// Same octagon setting, triangles added.
    pub fn with_triangles(self) -> Self {
        Self {
            triangles: true,
            ..self
        }
    }

    /// Same octagon setting, triangles removed.
    pub fn without_triangles(self) -> Self {
        Self {
            triangles: false,
            ..self
        }
    }

    /// Offset of the first quad inside a block.
    #[inline]
    pub fn quad_offset(self) -> usize {
        if self.triangles {
            4
        } else {
            0
        }
    }

    #[inline]
    pub fn triangle_pos(self, tet: usize, corner: usize) -> Option<usize> {
        self.triangles.then(|| self.block() * tet + corner)
    }

    #[inline]
    pub fn quad_pos(self, tet: usize, k: usize) -> usize {
        self.block() * tet + self.quad_offset() + k
    }

    #[inline]
    pub fn oct_pos(self, tet: usize, k: usize) -> Option<usize> {
        self.octagons
            .then(|| self.block() * tet + self.quad_offset() + 3 + k)
    }

    /// True iff position `pos` holds a quad or an octagon.
    pub fn is_quad_or_oct(self, pos: usize) -> bool {
        pos % self.block() >= self.quad_offset()
    }

    /// Rewrites `v`, stored under `from`, in this layout.
    ///
    /// Triangles can be dropped but not invented; octagons can be added as
    /// zeros, and dropped only when they are zero.
    pub fn project(self, from: Self, v: &Vector<Integer>) -> Result<Vector<Integer>> {
        if v.len() % from.block() != 0 {
            return Err(Error::invalid(format!(
                "vector length {} is not a multiple of block {}",
                v.len(),
                from.block()
            )));
        }
        if self.triangles && !from.triangles {
            return Err(Error::invalid(
                "cannot project onto triangle coordinates that were never stored",
            ));
        }
        let n = v.len() / from.block();
        let mut out = Vector::zero(n * self.block());
        for t in 0..n {
            if self.triangles {
                for c in 0..4 {
                    if let (Some(dst), Some(src)) = (self.triangle_pos(t, c), from.triangle_pos(t, c)) {
                        out[dst] = v[src].clone();
                    }
                }
            }
            for k in 0..3 {
                out[self.quad_pos(t, k)] = v[from.quad_pos(t, k)].clone();
                match (self.oct_pos(t, k), from.oct_pos(t, k)) {
                    (Some(dst), Some(src)) => out[dst] = v[src].clone(),
                    (None, Some(src)) if !v[src].is_zero() => {
                        return Err(Error::invalid(format!(
                            "tetrahedron {t} has a non-zero octagon the target layout cannot hold"
                        )));
                    }
                    _ => {}
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sizes_agree() {
        for c in [
            NormalCoords::Standard,
            NormalCoords::Quad,
            NormalCoords::AlmostNormal,
            NormalCoords::QuadOct,
        ] {
            let e = NormalEncoding::from_coords(c).unwrap();
            assert_eq!(Some(e.block()), c.block_size());
            assert_eq!(e.coords(), c);
            assert_eq!(e.stores_triangles(), c.stores_triangles());
            assert_eq!(e.stores_octagons(), c.stores_octagons());
            assert_eq!(c.to_string().parse::<NormalCoords>().unwrap(), c);
        }
        assert!(NormalEncoding::from_coords(NormalCoords::EdgeWeight).is_err());
        assert!(NormalCoords::EdgeWeight.is_view_only());
        assert!("simplicial".parse::<NormalCoords>().is_err());
        assert_eq!(NormalCoords::AlmostNormal.reduced(), Some(NormalCoords::QuadOct));
        assert_eq!(NormalCoords::Quad.standard(), Some(NormalCoords::Standard));
    }

    #[test]
    fn positions_are_a_bijection() {
        for enc in [
            NormalEncoding::standard(),
            NormalEncoding::quad(),
            NormalEncoding::almost_normal(),
            NormalEncoding::quad_oct(),
        ] {
            let n = 3;
            let mut seen = vec![false; n * enc.block()];
            for t in 0..n {
                let tris = (0..4).filter_map(|c| enc.triangle_pos(t, c));
                let quads = (0..3).map(|k| enc.quad_pos(t, k));
                let octs = (0..3).filter_map(|k| enc.oct_pos(t, k));
                for pos in tris.chain(quads).chain(octs) {
                    assert!(!seen[pos], "{enc:?} reuses {pos}");
                    seen[pos] = true;
                }
                for k in 0..3 {
                    assert!(enc.is_quad_or_oct(enc.quad_pos(t, k)));
                }
                if let Some(p) = enc.triangle_pos(t, 2) {
                    assert!(!enc.is_quad_or_oct(p));
                }
            }
            assert!(seen.into_iter().all(|b| b));
        }
    }

    #[test]
    fn quad_separation_matches_partition() {
        for (k, halves) in QUAD_PARTITION.iter().enumerate() {
            for &[a, b] in halves {
                assert_eq!(quad_separating(a, b), k);
                assert_eq!(quad_separating(b, a), k);
            }
            assert!(in_zero_block(k, 0));
        }
        assert_eq!(edges_crossed(1, false), vec![(0, 1), (0, 3), (2, 1), (2, 3)]);
        assert_eq!(edges_crossed(0, true).len(), 8);
    }

    #[test]
    fn projection_drops_and_refuses() {
        let std = NormalEncoding::standard();
        let quad = NormalEncoding::quad();
        let an = NormalEncoding::almost_normal();
        let v = Vector::from_i64s(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            quad.project(std, &v).unwrap(),
            Vector::from_i64s(&[5, 6, 7])
        );
        assert_eq!(
            an.project(std, &v).unwrap(),
            Vector::from_i64s(&[1, 2, 3, 4, 5, 6, 7, 0, 0, 0])
        );
        assert!(std.project(quad, &Vector::from_i64s(&[1, 0, 0])).is_err());
        let with_oct = Vector::from_i64s(&[0, 0, 0, 0, 0, 0, 0, 0, 1, 0]);
        assert!(std.project(an, &with_oct).is_err());
        assert!(quad.project(std, &Vector::from_i64s(&[1, 2])).is_err());
        assert_eq!(std.union(quad), std);
        assert_eq!(quad.union(NormalEncoding::quad_oct()), NormalEncoding::quad_oct());
        assert_eq!(std.union(NormalEncoding::quad_oct()), an);
    }
}
