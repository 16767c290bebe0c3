//! Coordinate spaces for the two phases.
//!
//! Phase 0 forgets everything the half turn subgroup can fix and keeps the
//! corner orientation, the locations of the E slice edges as a set, and the
//! edge orientation. Phase 1 keeps what phase 0 forgot: the corner
//! permutation and the edge permutations within each orbit, moved only by
//! the ten generators that stay inside the subgroup.

use super::super::{Cube333, BASE};
use crate::coord::CoordSpace;
use crate::group::{compose, successor_masks};
use crate::move_tables::{IndexTable, MoveTable};
use crate::ranking::{
    orientation_count, permutation_count, rank_label, rank_orientation, rank_permutation,
    unrank_label, unrank_orientation, unrank_permutation, Orbit,
};

const N_CO: usize = orientation_count(8, 3);
// 12 choose 4
const N_SLICE: usize = 495;
const N_EO: usize = orientation_count(12, 2);

const N_CP: usize = permutation_count(8);
const N_SLICE_P: usize = permutation_count(4);
const N_EP: usize = permutation_count(8);

/// The ten moves that stay inside the half turn subgroup, as indices into
/// the full [`BASE`].
pub const PHASE1_BASE: [u8; 10] = [0, 1, 2, 3, 4, 5, 7, 10, 13, 16];

/// Edge positions 0..4 hold the E slice edges.
fn edge_orbit() -> Orbit {
    Orbit::new(vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7, 8, 9, 10, 11]])
}

/// Corners 6 and 7 share a group; forgetting their order identifies pairs of
/// corner permutations with opposite parity, halving the phase 1 index
/// space. The edge permutation's parity decides which member of a pair a
/// reachable state actually carries.
fn corner_orbit() -> Orbit {
    Orbit::new(vec![
        vec![0],
        vec![1],
        vec![2],
        vec![3],
        vec![4],
        vec![5],
        vec![6, 7],
    ])
}

/// The phase 0 coordinate of a cube. Solved means the cube is in the half
/// turn subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State0 {
    co: u16,
    slice: u16,
    eo: u16,
}

/// The coarse coordinate space phase 0 searches, over the full 18 move base.
// TODO conjugating by the 16 symmetries that fix the UD axis would shrink
// the phase 0 residue table about 16x; worth doing if its memory ever hurts.
pub struct Phase0 {
    co: MoveTable,
    slice: MoveTable,
    eo: MoveTable,
    masks: Vec<u32>,
    orbit: Orbit,
}

impl Phase0 {
    /// Build the per-component transition tables by exhaustive unrank,
    /// multiply, rank.
    pub fn new() -> Self {
        let orbit = edge_orbit();
        let co = MoveTable::build(N_CO, BASE.len(), |i, j| {
            let a = Cube333 {
                co: unrank_orientation(i, 3),
                ..Cube333::SOLVED
            };
            rank_orientation(&a.multiply(&BASE[j]).co, 3)
        });
        let slice = MoveTable::build(N_SLICE, BASE.len(), |i, j| {
            let labels = unrank_label::<12>(i, orbit.sizes());
            rank_label(&compose(&labels, &BASE[j].ep), orbit.sizes())
        });
        let eo = MoveTable::build(N_EO, BASE.len(), |i, j| {
            let a = Cube333 {
                eo: unrank_orientation(i, 2),
                ..Cube333::SOLVED
            };
            rank_orientation(&a.multiply(&BASE[j]).eo, 2)
        });
        let masks = successor_masks(&BASE, &Cube333::SOLVED, |a, b| a.multiply(b));
        Phase0 {
            co,
            slice,
            eo,
            masks,
            orbit,
        }
    }
}

impl Default for Phase0 {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordSpace for Phase0 {
    type Cube = Cube333;
    type State = State0;

    fn move_count(&self) -> usize {
        BASE.len()
    }

    fn state_count(&self) -> usize {
        N_CO * N_SLICE * N_EO
    }

    fn project(&self, cube: &Cube333) -> State0 {
        State0 {
            co: rank_orientation(&cube.co, 3) as u16,
            slice: rank_label(&self.orbit.label_of(&cube.ep), self.orbit.sizes()) as u16,
            eo: rank_orientation(&cube.eo, 2) as u16,
        }
    }

    fn index_of(&self, state: State0) -> usize {
        (state.co as usize * N_SLICE + state.slice as usize) * N_EO + state.eo as usize
    }

    fn solved(&self) -> State0 {
        self.project(&Cube333::SOLVED)
    }

    fn apply(&self, state: State0, mv: usize) -> State0 {
        State0 {
            co: self.co.apply(state.co as usize, mv) as u16,
            slice: self.slice.apply(state.slice as usize, mv) as u16,
            eo: self.eo.apply(state.eo as usize, mv) as u16,
        }
    }

    fn move_mask(&self, last: Option<u8>) -> u32 {
        match last {
            Some(mv) => self.masks[mv as usize],
            None => (1 << BASE.len()) - 1,
        }
    }
}

/// The phase 1 coordinate of a cube already in the half turn subgroup: the
/// corner permutation and the edge permutations within the two orbits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State1 {
    cp: u16,
    slice: u8,
    ep: u16,
}

/// The residual coordinate space phase 1 searches, over [`PHASE1_BASE`].
///
/// The distance table index folds the corner permutation through the corner
/// orbit, so paired permutations share every table slot; states keep the
/// full corner permutation so the goal check stays exact.
pub struct Phase1 {
    cp: MoveTable,
    slice: MoveTable,
    ep: MoveTable,
    fold: IndexTable,
    masks: Vec<u32>,
    orbit: Orbit,
}

impl Phase1 {
    /// Build the transition tables and the corner fold table.
    pub fn new() -> Self {
        let orbit = edge_orbit();
        let corners = corner_orbit();
        let base: Vec<Cube333> = PHASE1_BASE.iter().map(|&i| BASE[i as usize]).collect();

        let cp = MoveTable::build(N_CP, base.len(), |i, j| {
            rank_permutation(&compose(&unrank_permutation::<8>(i), &base[j].cp))
        });
        let slice = MoveTable::build(N_SLICE_P, base.len(), |i, j| {
            let by = orbit.sub_permutation::<12, 4>(&base[j].ep, 0);
            rank_permutation(&compose(&unrank_permutation::<4>(i), &by))
        });
        let ep = MoveTable::build(N_EP, base.len(), |i, j| {
            let by = orbit.sub_permutation::<12, 8>(&base[j].ep, 1);
            rank_permutation(&compose(&unrank_permutation::<8>(i), &by))
        });
        let fold = IndexTable::build(N_CP, |i| {
            rank_label(
                &corners.label_of(&unrank_permutation::<8>(i)),
                corners.sizes(),
            )
        });
        let masks = successor_masks(&base, &Cube333::SOLVED, |a, b| a.multiply(b));
        Phase1 {
            cp,
            slice,
            ep,
            fold,
            masks,
            orbit,
        }
    }
}

impl Default for Phase1 {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordSpace for Phase1 {
    type Cube = Cube333;
    type State = State1;

    fn move_count(&self) -> usize {
        PHASE1_BASE.len()
    }

    fn state_count(&self) -> usize {
        N_CP / 2 * N_SLICE_P * N_EP
    }

    fn project(&self, cube: &Cube333) -> State1 {
        State1 {
            cp: rank_permutation(&cube.cp) as u16,
            slice: rank_permutation(&self.orbit.sub_permutation::<12, 4>(&cube.ep, 0)) as u8,
            ep: rank_permutation(&self.orbit.sub_permutation::<12, 8>(&cube.ep, 1)) as u16,
        }
    }

    fn index_of(&self, state: State1) -> usize {
        (self.fold.map(state.cp as usize) * N_SLICE_P + state.slice as usize) * N_EP
            + state.ep as usize
    }

    fn solved(&self) -> State1 {
        State1 {
            cp: 0,
            slice: 0,
            ep: 0,
        }
    }

    fn apply(&self, state: State1, mv: usize) -> State1 {
        State1 {
            cp: self.cp.apply(state.cp as usize, mv) as u16,
            slice: self.slice.apply(state.slice as usize, mv) as u8,
            ep: self.ep.apply(state.ep as usize, mv) as u16,
        }
    }

    fn move_mask(&self, last: Option<u8>) -> u32 {
        match last {
            Some(mv) => self.masks[mv as usize],
            None => (1 << PHASE1_BASE.len()) - 1,
        }
    }
}
