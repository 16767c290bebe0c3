//! The two phase reduction for the 3x3x3: first bring the cube into the
//! subgroup generated by `U, D, R2, L2, F2, B2`, then finish inside it,
//! reusing the same table and search machinery over a coarse and a residual
//! coordinate.

pub mod coords;

pub use coords::PHASE1_BASE;
use coords::{Phase0, Phase1};

use super::{apply_moves, Cube333};
use crate::cache::{fetch_or_build, TableCache};
use crate::coord::CoordSpace;
use crate::error::TableError;
use crate::pruning::ResidueTable;
use crate::search::{combine_solve, ResidueHeuristic};

/// A 3x3x3 solver running Kociemba style two phase searches over mod 3
/// residue tables. Both phase spaces are far too large for exact bytes, so
/// the compressed tables are the only heuristic option here.
pub struct TwoPhaseSolver {
    phase0: Phase0,
    phase1: Phase1,
    residue0: ResidueTable,
    residue1: ResidueTable,
}

impl TwoPhaseSolver {
    /// Build the transition tables, and fetch or build both residue tables
    /// through `cache`.
    ///
    /// Generating a residue table walks every coordinate of its space, which
    /// is a long batch job; hand in a persistent
    /// [`DirCache`](crate::cache::DirCache) so it only ever happens once.
    pub fn new(cache: &dyn TableCache) -> Result<Self, TableError> {
        let phase0 = Phase0::new();
        let phase1 = Phase1::new();
        let residue0 = fetch_or_build(
            cache,
            "cube3.p0.distance_m3",
            |bytes| ResidueTable::from_bytes(bytes, phase0.state_count()),
            ResidueTable::to_bytes,
            || Ok(ResidueTable::generate(&phase0)),
        )?;
        let residue1 = fetch_or_build(
            cache,
            "cube3.p1.distance_m3",
            |bytes| ResidueTable::from_bytes(bytes, phase1.state_count()),
            ResidueTable::to_bytes,
            || Ok(ResidueTable::generate(&phase1)),
        )?;
        Ok(TwoPhaseSolver {
            phase0,
            phase1,
            residue0,
            residue1,
        })
    }

    /// Find a solution of at most `max_len` moves, as indices into the full
    /// [`BASE`](super::BASE), or `None` if the budget is too tight.
    ///
    /// Phase 0 solutions are enumerated in increasing length and each
    /// residual state is finished in phase 1 within the improving budget, so
    /// the result tightens toward optimal the longer the enumeration runs;
    /// see [`combine_solve`] for the stopping rules.
    pub fn solve(&self, cube: &Cube333, max_len: usize) -> Option<Vec<u8>> {
        combine_solve(
            &self.phase0,
            ResidueHeuristic::new(&self.residue0),
            &self.phase1,
            ResidueHeuristic::new(&self.residue1),
            cube,
            apply_moves,
            &PHASE1_BASE,
            max_len,
        )
    }
}
