//! Seeded random triangulations for tests and benches.
//!
//! Purpose
//! - Produce reproducible streams of random facet gluings so enumeration
//!   cross-checks and benches can run on more than the named examples.
//!
//! Why this design
//! - Every sample carries its params and a replay token (the per-sample seed).
//!   `generate_next` streams; `regenerate` rebuilds one sample from its token.
//! - Gluings are drawn uniformly among the permutations that match the chosen
//!   facet pair. Orientable mode keeps only the orientation-reversing ones
//!   (odd permutations), which makes every component orientable.
//! - Nothing here filters for validity. Callers that need valid or non-ideal
//!   triangulations test the sample and draw again.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

use super::Triangulation;
use crate::error::{Error, Result};
use crate::perm::Perm4;

#[derive(Clone, Debug)]
pub struct TriangulationSample<P, R> {
    pub triangulation: Triangulation,
    pub params: P,
    pub replay: R,
}

/// Common trait for reproducible triangulation sources.
pub trait TriangulationGenerator {
    type Params: Clone;
    type Replay: Clone;

    fn params(&self) -> &Self::Params;

    fn generate_next(
        &mut self,
    ) -> Result<Option<TriangulationSample<Self::Params, Self::Replay>>>;

    fn regenerate(&self, replay: &Self::Replay) -> Result<Triangulation>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomGluingParams {
    pub tetrahedra: usize,
    /// Facets left unglued. `4·tetrahedra − boundary_facets` must be even.
    pub boundary_facets: usize,
    pub orientable: bool,
    /// Glue a random spanning tree first so the result has one component.
    pub connected: bool,
}

impl Default for RandomGluingParams {
    fn default() -> Self {
        Self {
            tetrahedra: 2,
            boundary_facets: 0,
            orientable: true,
            connected: true,
        }
    }
}

impl RandomGluingParams {
    fn validate(&self) -> Result<()> {
        if self.tetrahedra == 0 {
            return Err(Error::invalid("need at least one tetrahedron"));
        }
        let facets = 4 * self.tetrahedra;
        if self.boundary_facets > facets {
            return Err(Error::invalid(format!(
                "{} boundary facets requested but only {facets} exist",
                self.boundary_facets
            )));
        }
        if (facets - self.boundary_facets) % 2 != 0 {
            return Err(Error::invalid(
                "glued facets come in pairs; 4·tetrahedra − boundary_facets must be even",
            ));
        }
        if self.connected && self.boundary_facets > 2 * self.tetrahedra + 2 {
            return Err(Error::invalid(format!(
                "a connected triangulation on {} tetrahedra has at most {} boundary facets",
                self.tetrahedra,
                2 * self.tetrahedra + 2
            )));
        }
        Ok(())
    }
}

/// Replay token: the seed that regenerates one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedReplay {
    pub seed: u64,
}

pub struct RandomGluingGenerator {
    params: RandomGluingParams,
    master_rng: StdRng,
}

impl RandomGluingGenerator {
    pub fn new(params: RandomGluingParams, seed: u64) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            master_rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn generate_single(params: &RandomGluingParams, seed: u64) -> Result<Triangulation> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let n = params.tetrahedra;
        let mut tri = Triangulation::with_size(n);

        if params.connected {
            for t in 1..n {
                let facet = rng.gen_range(0..4);
                let free: Vec<(usize, usize)> = (0..t)
                    .flat_map(|u| (0..4).map(move |g| (u, g)))
                    .filter(|&(u, g)| tri.tets[u].is_free(g))
                    .collect();
                let &(u, g) = free
                    .choose(&mut rng)
                    .ok_or_else(|| Error::impossible("spanning tree ran out of free facets"))?;
                let perm = draw_gluing(&mut rng, facet, g, params.orientable)?;
                tri.join(t, facet, u, perm)?;
            }
        }

        let mut free: Vec<(usize, usize)> = (0..n)
            .flat_map(|t| (0..4).map(move |f| (t, f)))
            .filter(|&(t, f)| tri.tets[t].is_free(f))
            .collect();
        free.shuffle(&mut rng);
        let glued = free.len() - params.boundary_facets;
        for pair in free[..glued].chunks_exact(2) {
            let ((t, f), (u, g)) = (pair[0], pair[1]);
            let perm = draw_gluing(&mut rng, f, g, params.orientable)?;
            tri.join(t, f, u, perm)?;
        }
        Ok(tri)
    }
}

/// A uniformly random permutation sending `from` to `to`; odd when `orientable`.
fn draw_gluing(rng: &mut StdRng, from: usize, to: usize, orientable: bool) -> Result<Perm4> {
    let choices: Vec<Perm4> = Perm4::all()
        .filter(|p| p.apply(from) == to && (!orientable || p.sign() < 0))
        .collect();
    choices
        .choose(rng)
        .copied()
        .ok_or_else(|| Error::impossible(format!("no permutation sends {from} to {to}")))
}

impl TriangulationGenerator for RandomGluingGenerator {
    type Params = RandomGluingParams;
    type Replay = SeedReplay;

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn generate_next(
        &mut self,
    ) -> Result<Option<TriangulationSample<Self::Params, Self::Replay>>> {
        let seed = self.master_rng.next_u64();
        let triangulation = Self::generate_single(&self.params, seed)?;
        Ok(Some(TriangulationSample {
            triangulation,
            params: self.params.clone(),
            replay: SeedReplay { seed },
        }))
    }

    fn regenerate(&self, replay: &Self::Replay) -> Result<Triangulation> {
        Self::generate_single(&self.params, replay.seed)
    }
}
