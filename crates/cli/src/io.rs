//! JSON documents read and written by the driver.
//!
//! Triangulations: `{"tetrahedra": n, "gluings": [[tet, facet, adj, [p0,p1,p2,p3]], ...]}`
//! with each gluing listed once, or `{"named": "figure-eight"}`. Named inputs
//! also accept `lst-A-B` for a layered solid torus.
//!
//! Surface lists: `{"coords": "quad", "vectors": [[...], ...]}`. The output of
//! `enumerate` (a `surfaces` array of records carrying a `vector`) is accepted
//! wherever a surface list is read.
//!
//! Every written document gets a `<stem>.provenance.json` sidecar recording
//! the library version, code revision, tags and command parameters.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use normsurf::enumerate::NormalSurfaces;
use normsurf::surfaces::{NormalCoords, NormalSurface};
use normsurf::triangulation::named;
use normsurf::{Integer, Perm4, Triangulation, Vector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One exact integer: a JSON number when it fits in `i64`, a decimal string otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Int(i64),
    Text(String),
}

impl From<&Integer> for Entry {
    fn from(v: &Integer) -> Self {
        match v.to_i64() {
            Some(n) => Self::Int(n),
            None => Self::Text(v.to_string()),
        }
    }
}

impl Entry {
    fn to_integer(&self) -> Result<Integer> {
        match self {
            Self::Int(n) => Ok(Integer::from(*n)),
            Self::Text(s) => s
                .parse::<Integer>()
                .with_context(|| format!("parsing integer entry '{s}'")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriangulationDoc {
    Named {
        named: String,
    },
    Gluings {
        tetrahedra: usize,
        #[serde(default)]
        gluings: Vec<(usize, usize, usize, [usize; 4])>,
    },
}

impl TriangulationDoc {
    pub fn from_triangulation(tri: &Triangulation) -> Self {
        Self::Gluings {
            tetrahedra: tri.size(),
            gluings: tri
                .gluings()
                .into_iter()
                .map(|(t, f, u, p)| (t, f, u, p.images()))
                .collect(),
        }
    }

    pub fn build(&self) -> Result<Triangulation> {
        match self {
            Self::Named { named } => named_triangulation(named),
            Self::Gluings {
                tetrahedra,
                gluings,
            } => {
                let records = gluings
                    .iter()
                    .map(|&(t, f, u, img)| Ok((t, f, u, Perm4::from_images(img)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Triangulation::from_gluings(*tetrahedra, &records)?)
            }
        }
    }
}

fn named_triangulation(name: &str) -> Result<Triangulation> {
    if let Some(tri) = named::by_name(name) {
        return Ok(tri);
    }
    if let Some(rest) = name.strip_prefix("lst-") {
        let mut parts = rest.splitn(2, '-');
        let a = parts.next().and_then(|s| s.parse::<u64>().ok());
        let b = parts.next().and_then(|s| s.parse::<u64>().ok());
        if let (Some(a), Some(b)) = (a, b) {
            return Ok(named::layered_solid_torus(a, b)?);
        }
    }
    Err(anyhow!(
        "unknown triangulation '{name}' (known: {}, lst-A-B)",
        named::NAMES.join(", ")
    ))
}

pub fn read_triangulation(path: &Path) -> Result<Triangulation> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let doc: TriangulationDoc = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing triangulation JSON in {}", path.display()))?;
    doc.build()
        .with_context(|| format!("building triangulation from {}", path.display()))
}

/// Per-surface output: the stored vector plus the derived properties.
#[derive(Clone, Debug, Serialize)]
pub struct SurfaceRecord {
    pub vector: Vec<Entry>,
    pub compact: bool,
    /// Absent for non-compact (spun) surfaces.
    pub euler_char: Option<Entry>,
    pub orientable: Option<bool>,
    pub two_sided: Option<bool>,
    pub real_boundary: bool,
    pub vertex_linking: bool,
    pub vertex_link: Option<usize>,
    pub thin_edge_links: [Option<usize>; 2],
    pub splitting: bool,
    pub central: usize,
}

impl SurfaceRecord {
    pub fn describe(s: &NormalSurface<'_>) -> Self {
        let (e1, e2) = s.is_thin_edge_link();
        Self {
            vector: s.vector().iter().map(Entry::from).collect(),
            compact: s.is_compact(),
            euler_char: s.euler_char().ok().map(|x| Entry::from(&x)),
            orientable: s.is_orientable(),
            two_sided: s.is_two_sided(),
            real_boundary: s.has_real_boundary(),
            vertex_linking: s.is_vertex_linking(),
            vertex_link: s.is_vertex_link(),
            thin_edge_links: [e1, e2],
            splitting: s.is_splitting(),
            central: s.is_central(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SurfacesOut {
    pub coords: String,
    pub algorithm: Option<String>,
    pub count: usize,
    pub surfaces: Vec<SurfaceRecord>,
}

impl SurfacesOut {
    pub fn describe(list: &NormalSurfaces<'_>) -> Self {
        Self {
            coords: list.coords().to_string(),
            algorithm: list.algorithm().map(|a| a.to_string()),
            count: list.len(),
            surfaces: list.iter().map(SurfaceRecord::describe).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VectorOnly {
    vector: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct SurfacesIn {
    coords: String,
    #[serde(default)]
    vectors: Vec<Vec<Entry>>,
    #[serde(default)]
    surfaces: Vec<VectorOnly>,
}

/// Reads a surface list: its coordinate system and raw vectors.
pub fn read_vectors(path: &Path) -> Result<(NormalCoords, Vec<Vector<Integer>>)> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_vectors(&bytes).with_context(|| format!("parsing surface list in {}", path.display()))
}

fn parse_vectors(bytes: &[u8]) -> Result<(NormalCoords, Vec<Vector<Integer>>)> {
    let doc: SurfacesIn = serde_json::from_slice(bytes)?;
    let coords: NormalCoords = doc.coords.parse()?;
    if !doc.vectors.is_empty() && !doc.surfaces.is_empty() {
        bail!("give either 'vectors' or 'surfaces', not both");
    }
    let rows = doc
        .vectors
        .into_iter()
        .chain(doc.surfaces.into_iter().map(|s| s.vector));
    let vectors = rows
        .map(|row| {
            row.iter()
                .map(Entry::to_integer)
                .collect::<Result<Vec<_>>>()
                .map(Vector::from_vec)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((coords, vectors))
}

/// Sidecar record for one output document.
#[derive(Clone, Debug, Serialize)]
pub struct Provenance {
    pub code_rev: String,
    pub normsurf_version: &'static str,
    pub tags: Vec<String>,
    pub params: Value,
    pub outputs: Vec<String>,
}

impl Provenance {
    pub fn new(tag: Option<&str>, params: Value) -> Self {
        Self {
            code_rev: code_rev(),
            normsurf_version: normsurf::VERSION,
            tags: tag.map(str::to_owned).into_iter().collect(),
            params,
            outputs: Vec::new(),
        }
    }
}

/// `GIT_COMMIT` from the build, then from the environment.
fn code_rev() -> String {
    [
        option_env!("GIT_COMMIT").map(str::to_owned),
        std::env::var("GIT_COMMIT").ok(),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.is_empty())
    .unwrap_or_else(|| "unknown".to_owned())
}

fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.file_stem().unwrap_or(path.as_os_str()).to_os_string();
    name.push(".provenance.json");
    path.with_file_name(name)
}

/// Writes `value` to `path` and its provenance beside it; returns the sidecar path.
pub fn write_with_provenance<T: Serialize>(
    path: &Path,
    value: &T,
    mut provenance: Provenance,
) -> Result<PathBuf> {
    write_json(path, value)?;
    provenance.outputs.push(path.to_string_lossy().into_owned());
    let sidecar = sidecar_path(path);
    write_json(&sidecar, &provenance)?;
    Ok(sidecar)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}
