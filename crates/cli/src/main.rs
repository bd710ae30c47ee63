mod io;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use normsurf::enumerate::{build_standard_from_reduced, EnumAlg, EnumerationCfg, NormalSurfaces};
use normsurf::progress::{Progress, ProgressTracker};
use normsurf::surfaces::NormalCoords;
use normsurf::triangulation::random::{RandomGluingGenerator, RandomGluingParams};
use normsurf::Triangulation;
use serde_json::json;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::io::{Provenance, SurfacesOut, TriangulationDoc};

#[derive(Parser)]
#[command(name = "normsurf")]
#[command(about = "Normal surface enumeration for 3-manifold triangulations")]
struct Cmd {
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Optional label; propagated to provenance sidecars
    #[arg(long, global = true)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print a JSON summary of the triangulation's skeleton
    Skeleton {
        #[arg(long)]
        input: PathBuf,
    },
    /// Enumerate vertex normal surfaces
    Enumerate {
        #[arg(long)]
        input: PathBuf,
        /// standard | quad | an | quadoct
        #[arg(long, default_value = "standard")]
        coords: NormalCoords,
        /// default | direct | via-reduced
        #[arg(long, default_value = "default")]
        algo: EnumAlg,
        #[arg(long)]
        out: PathBuf,
        /// Cancel the enumeration after this many seconds
        #[arg(long)]
        time_limit: Option<u64>,
    },
    /// Convert a quad (or quad-oct) vertex list to standard (or almost normal) coordinates
    Convert {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        reduced: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write a random triangulation
    Random {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 2)]
        tetrahedra: usize,
        #[arg(long, default_value_t = 0)]
        boundary_faces: usize,
        #[arg(long)]
        non_orientable: bool,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_max_level(level)
        .with_target(false)
        .init();
    let tag = cmd.tag.as_deref();
    match cmd.action {
        Action::Skeleton { input } => skeleton(&input),
        Action::Enumerate {
            input,
            coords,
            algo,
            out,
            time_limit,
        } => enumerate(&input, coords, algo, &out, time_limit, tag),
        Action::Convert {
            input,
            reduced,
            out,
        } => convert(&input, &reduced, &out, tag),
        Action::Random {
            seed,
            tetrahedra,
            boundary_faces,
            non_orientable,
            out,
        } => random(seed, tetrahedra, boundary_faces, !non_orientable, &out, tag),
        Action::Report => report(tag),
    }
}

fn skeleton(input: &Path) -> Result<()> {
    let tri = io::read_triangulation(input)?;
    println!("{}", serde_json::to_string_pretty(&skeleton_summary(&tri))?);
    Ok(())
}

fn skeleton_summary(tri: &Triangulation) -> serde_json::Value {
    json!({
        "tetrahedra": tri.size(),
        "vertices": tri.count_vertices(),
        "edges": tri.count_edges(),
        "triangles": tri.count_triangles(),
        "components": tri.count_components(),
        "boundary_components": tri.count_boundary_components(),
        "valid": tri.is_valid(),
        "orientable": tri.is_orientable(),
        "ideal": tri.is_ideal(),
        "closed": tri.is_closed(),
        "connected": tri.is_connected(),
        "vertex_links": tri.vertices().iter().map(|v| v.link.to_string()).collect::<Vec<_>>(),
        "euler_char_tri": tri.euler_char_tri(),
        "euler_char_manifold": tri.euler_char_manifold(),
    })
}

fn enumerate(
    input: &Path,
    coords: NormalCoords,
    algo: EnumAlg,
    out: &Path,
    time_limit: Option<u64>,
    tag: Option<&str>,
) -> Result<()> {
    let tri = io::read_triangulation(input)?;
    let size = tri.size();
    tracing::info!(input = %input.display(), tetrahedra = size, %coords, %algo, "enumerate");
    let cfg = EnumerationCfg {
        algorithm: algo,
        ..EnumerationCfg::default()
    };
    let tracker = ProgressTracker::new();
    let watched = &tracker;
    let started = Instant::now();
    let limit = time_limit.map(Duration::from_secs);
    let doc = thread::scope(|scope| {
        let worker = scope.spawn(move || {
            NormalSurfaces::enumerate(&tri, coords, cfg, Some(watched))
                .map(|list| SurfacesOut::describe(&list))
        });
        while !worker.is_finished() {
            if tracker.description_changed() {
                tracing::info!(stage = %tracker.description(), "stage");
            }
            if tracker.percent_changed() {
                tracing::debug!(percent = tracker.percent(), "progress");
            }
            if limit.is_some_and(|l| started.elapsed() > l) {
                tracing::warn!(seconds = ?time_limit, "time limit reached; cancelling");
                tracker.cancel();
            }
            thread::sleep(Duration::from_millis(50));
        }
        worker.join()
    })
    .map_err(|_| anyhow!("enumeration thread panicked"))?
    .context("enumerating vertex surfaces")?;

    tracing::info!(
        surfaces = doc.count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "enumerate done"
    );
    let params = json!({
        "input": input.to_string_lossy(),
        "tetrahedra": size,
        "coords": coords.to_string(),
        "algo": algo.to_string(),
        "algorithm_used": doc.algorithm,
        "cancelled": tracker.is_cancelled(),
    });
    io::write_with_provenance(out, &doc, Provenance::new(tag, params))?;
    Ok(())
}

fn convert(input: &Path, reduced: &Path, out: &Path, tag: Option<&str>) -> Result<()> {
    let tri = io::read_triangulation(input)?;
    let (coords, vectors) = io::read_vectors(reduced)?;
    tracing::info!(rays = vectors.len(), %coords, "convert");
    let list = NormalSurfaces::from_vectors(&tri, coords, vectors)
        .with_context(|| format!("checking vectors in {}", reduced.display()))?;
    let converted = build_standard_from_reduced(&tri, &list, None)?;
    let doc = SurfacesOut::describe(&converted);
    tracing::info!(surfaces = doc.count, coords = %doc.coords, "convert done");
    let params = json!({
        "input": input.to_string_lossy(),
        "reduced": reduced.to_string_lossy(),
        "from": coords.to_string(),
        "to": converted.coords().to_string(),
        "algorithm_used": doc.algorithm,
    });
    io::write_with_provenance(out, &doc, Provenance::new(tag, params))?;
    Ok(())
}

fn random(
    seed: u64,
    tetrahedra: usize,
    boundary_faces: usize,
    orientable: bool,
    out: &Path,
    tag: Option<&str>,
) -> Result<()> {
    let params = RandomGluingParams {
        tetrahedra,
        boundary_facets: boundary_faces,
        orientable,
        connected: true,
    };
    let tri = RandomGluingGenerator::generate_single(&params, seed)?;
    tracing::info!(
        seed,
        tetrahedra,
        valid = tri.is_valid(),
        ideal = tri.is_ideal(),
        "random"
    );
    let params = json!({
        "seed": seed,
        "tetrahedra": tetrahedra,
        "boundary_faces": boundary_faces,
        "orientable": orientable,
    });
    let doc = TriangulationDoc::from_triangulation(&tri);
    io::write_with_provenance(out, &doc, Provenance::new(tag, params))?;
    Ok(())
}

fn report(tag: Option<&str>) -> Result<()> {
    let block = Provenance::new(tag, json!({}));
    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use normsurf::triangulation::named;
    use tempfile::tempdir;

    #[test]
    fn skeleton_summary_of_figure_eight() {
        let s = skeleton_summary(&named::figure_eight());
        assert_eq!(s["tetrahedra"], 2);
        assert_eq!(s["ideal"], true);
        assert_eq!(s["vertex_links"][0], "torus");
    }

    #[test]
    fn random_then_enumerate_then_convert() {
        let dir = tempdir().unwrap();
        let tri_path = dir.path().join("tri.json");
        random(5, 3, 0, true, &tri_path, Some("t")).unwrap();
        assert!(dir.path().join("tri.provenance.json").exists());

        let quads = dir.path().join("quads.json");
        enumerate(&tri_path, NormalCoords::Quad, EnumAlg::Direct, &quads, None, None).unwrap();
        let direct = dir.path().join("direct.json");
        enumerate(&tri_path, NormalCoords::Standard, EnumAlg::Direct, &direct, None, None).unwrap();
        let converted = dir.path().join("std.json");
        convert(&tri_path, &quads, &converted, None).unwrap();

        let (c1, mut a) = io::read_vectors(&direct).unwrap();
        let (c2, mut b) = io::read_vectors(&converted).unwrap();
        assert_eq!(c1, NormalCoords::Standard);
        assert_eq!(c2, NormalCoords::Standard);
        a.sort_by(|x, y| x.as_slice().cmp(y.as_slice()));
        b.sort_by(|x, y| x.as_slice().cmp(y.as_slice()));
        assert_eq!(a, b);
    }
}
