//! The 2x2x2 pocket cube: its group elements, generator moves, combined
//! corner coordinate, and a solver over it.
//!
//! The DBL corner never moves, which pins the cube in space and leaves seven
//! movable corners. The whole space (5040 permutations times 729
//! orientations) fits an exact distance table comfortably, so this puzzle
//! exercises both the exact and the mod 3 search paths.

use crate::cache::{fetch_or_build, TableCache};
use crate::coord::CoordSpace;
use crate::error::TableError;
use crate::group::TWIST;
use crate::move_tables::MoveTable;
use crate::pruning::{DistanceTable, ResidueTable};
use crate::ranking::{
    orientation_count, permutation_count, rank_orientation, rank_permutation, unrank_orientation,
    unrank_permutation,
};
use crate::search::{collect_solutions, ExactHeuristic, IdaStar, ResidueHeuristic};

const N_CP: usize = permutation_count(7);
const N_CO: usize = orientation_count(7, 3);

/// A 2x2x2 cube state: which corner sits in each of the seven movable
/// positions, and how far each is twisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cube222 {
    /// Corner permutation.
    pub cp: [u8; 7],
    /// Corner orientation, values in 0..3.
    pub co: [u8; 7],
}

impl Cube222 {
    /// The solved cube.
    pub const SOLVED: Cube222 = Cube222 {
        cp: [0, 1, 2, 3, 4, 5, 6],
        co: [0; 7],
    };

    /// Apply `other` after `self`. Orientation rides along with the position
    /// its permutation image comes from, composed through the twist algebra.
    pub const fn multiply(&self, other: &Cube222) -> Cube222 {
        let mut cp = [0u8; 7];
        let mut co = [0u8; 7];
        let mut i = 0;
        while i < 7 {
            cp[i] = self.cp[other.cp[i] as usize];
            co[i] = TWIST.compose(self.co[other.cp[i] as usize], other.co[i]);
            i += 1;
        }
        Cube222 { cp, co }
    }

    /// The inverse element.
    pub const fn inverse(&self) -> Cube222 {
        let mut cp = [0u8; 7];
        let mut co = [0u8; 7];
        let mut i = 0;
        while i < 7 {
            cp[self.cp[i] as usize] = i as u8;
            co[self.cp[i] as usize] = TWIST.invert(self.co[i]);
            i += 1;
        }
        Cube222 { cp, co }
    }
}

/// A quarter turn of the up face.
pub const U1: Cube222 = Cube222 {
    cp: [1, 3, 0, 2, 4, 5, 6],
    co: [0; 7],
};

/// A quarter turn of the right face.
pub const R1: Cube222 = Cube222 {
    cp: [4, 0, 2, 3, 5, 1, 6],
    co: [2, 1, 0, 0, 1, 2, 0],
};

/// A quarter turn of the front face.
pub const F1: Cube222 = Cube222 {
    cp: [2, 1, 6, 3, 0, 5, 4],
    co: [1, 0, 2, 0, 2, 0, 1],
};

/// The generator moves, composed at compile time from the three quarter
/// turns. Turning the other three faces would only rotate the whole cube.
pub const BASE: [Cube222; 9] = [
    U1,
    U1.multiply(&U1),
    U1.inverse(),
    R1,
    R1.multiply(&R1),
    R1.inverse(),
    F1,
    F1.multiply(&F1),
    F1.inverse(),
];

/// Display names for [`BASE`], in the same order.
pub const MOVE_NAMES: [&str; 9] = ["U", "U2", "U'", "R", "R2", "R'", "F", "F2", "F'"];

/// Apply a sequence of generator indices to a cube.
pub fn apply_moves(cube: &Cube222, moves: &[u8]) -> Cube222 {
    moves
        .iter()
        .fold(*cube, |a, &mv| a.multiply(&BASE[mv as usize]))
}

/// Format a sequence of generator indices using [`MOVE_NAMES`].
pub fn move_names(moves: &[u8]) -> String {
    moves
        .iter()
        .map(|&mv| MOVE_NAMES[mv as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

/// The combined corner coordinate of a [`Cube222`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State222 {
    cp: u16,
    co: u16,
}

/// The 2x2x2 coordinate space: one transition table per component over
/// [`BASE`].
pub struct Coords222 {
    cp: MoveTable,
    co: MoveTable,
}

impl Coords222 {
    /// Build both transition tables by exhaustive unrank, multiply, rank.
    pub fn new() -> Self {
        let cp = MoveTable::build(N_CP, BASE.len(), |i, j| {
            let a = Cube222 {
                cp: unrank_permutation(i),
                co: [0; 7],
            };
            rank_permutation(&a.multiply(&BASE[j]).cp)
        });
        let co = MoveTable::build(N_CO, BASE.len(), |i, j| {
            let a = Cube222 {
                cp: Cube222::SOLVED.cp,
                co: unrank_orientation(i, 3),
            };
            rank_orientation(&a.multiply(&BASE[j]).co, 3)
        });
        Coords222 { cp, co }
    }
}

impl Default for Coords222 {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordSpace for Coords222 {
    type Cube = Cube222;
    type State = State222;

    fn move_count(&self) -> usize {
        BASE.len()
    }

    fn state_count(&self) -> usize {
        N_CP * N_CO
    }

    fn project(&self, cube: &Cube222) -> State222 {
        State222 {
            cp: rank_permutation(&cube.cp) as u16,
            co: rank_orientation(&cube.co, 3) as u16,
        }
    }

    fn index_of(&self, state: State222) -> usize {
        state.cp as usize * N_CO + state.co as usize
    }

    fn solved(&self) -> State222 {
        State222 { cp: 0, co: 0 }
    }

    fn apply(&self, state: State222, mv: usize) -> State222 {
        State222 {
            cp: self.cp.apply(state.cp as usize, mv) as u16,
            co: self.co.apply(state.co as usize, mv) as u16,
        }
    }
}

/// A 2x2x2 solver owning the coordinate space and both heuristic tables.
pub struct Cube222Solver {
    coords: Coords222,
    distance: DistanceTable,
    residue: ResidueTable,
}

impl Cube222Solver {
    /// Build the transition tables and fetch or build both distance tables
    /// through `cache`.
    pub fn new(cache: &dyn TableCache) -> Result<Self, TableError> {
        let coords = Coords222::new();
        let distance = fetch_or_build(
            cache,
            "cube2.distance",
            |bytes| DistanceTable::from_bytes(bytes, N_CP * N_CO),
            DistanceTable::to_bytes,
            || DistanceTable::generate(&coords),
        )?;
        let residue = fetch_or_build(
            cache,
            "cube2.distance_m3",
            |bytes| ResidueTable::from_bytes(bytes, N_CP * N_CO),
            ResidueTable::to_bytes,
            || Ok(ResidueTable::generate(&coords)),
        )?;
        Ok(Cube222Solver {
            coords,
            distance,
            residue,
        })
    }

    /// The raw event stream of the exact-distance search for `cube`.
    pub fn events(&self, cube: &Cube222) -> IdaStar<'_, Coords222, ExactHeuristic<'_>> {
        IdaStar::new(
            &self.coords,
            ExactHeuristic::new(&self.distance),
            self.coords.project(cube),
        )
    }

    /// The raw event stream of the mod 3 search for `cube`.
    pub fn events_m3(&self, cube: &Cube222) -> IdaStar<'_, Coords222, ResidueHeuristic<'_>> {
        IdaStar::new(
            &self.coords,
            ResidueHeuristic::new(&self.residue),
            self.coords.project(cube),
        )
    }

    /// Every minimal solution for `cube`, plus the solutions from `relax`
    /// further bounds. Solutions are generator indices into [`BASE`].
    pub fn solve(&self, cube: &Cube222, relax: usize) -> Vec<Vec<u8>> {
        collect_solutions(self.events(cube), relax)
    }

    /// [`solve`](Self::solve) through the mod 3 table; returns the identical
    /// solution set.
    pub fn solve_m3(&self, cube: &Cube222, relax: usize) -> Vec<Vec<u8>> {
        collect_solutions(self.events_m3(cube), relax)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::cache::NoCache;
    use proptest::collection::vec;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    // The distance tables take a breadth first pass over all 3.6 million
    // states, so every test shares one solver.
    fn solver() -> &'static Cube222Solver {
        static SOLVER: OnceLock<Cube222Solver> = OnceLock::new();
        SOLVER.get_or_init(|| Cube222Solver::new(&NoCache).unwrap())
    }

    #[test]
    fn generators_have_order_four() {
        for mv in [U1, R1, F1] {
            let mut a = Cube222::SOLVED;
            for _ in 0..4 {
                a = a.multiply(&mv);
            }
            assert_eq!(a, Cube222::SOLVED);
        }
        assert_eq!(U1.multiply(&U1.inverse()), Cube222::SOLVED);
        assert_eq!(move_names(&[0, 4, 8]), "U R2 F'");
    }

    #[test]
    fn solved_is_distance_zero_and_moves_are_distance_one() {
        let s = solver();
        let solved = s.coords.solved();
        assert_eq!(s.distance.distance(s.coords.index_of(solved)), 0);
        for mv in 0..BASE.len() {
            let next = s.coords.apply(solved, mv);
            assert_eq!(s.distance.distance(s.coords.index_of(next)), 1);
        }
    }

    #[test]
    fn three_move_scramble_solves_in_three() {
        let s = solver();
        let scramble = apply_moves(&Cube222::SOLVED, &[0, 3, 6]);
        let solutions = s.solve(&scramble, 0);
        assert!(!solutions.is_empty());
        for solution in &solutions {
            assert!(solution.len() <= 3);
            assert_eq!(apply_moves(&scramble, solution), Cube222::SOLVED);
        }
    }

    #[test]
    fn solving_the_solved_cube_is_empty() {
        let solutions = solver().solve(&Cube222::SOLVED, 0);
        assert_eq!(solutions, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn solve_matches_solve_m3() {
        let s = solver();
        let scramble = apply_moves(&Cube222::SOLVED, &[3, 3, 0, 7, 2, 6]);
        for relax in 0..3 {
            assert_eq!(s.solve(&scramble, relax), s.solve_m3(&scramble, relax));
        }
    }

    proptest! {
        #[test]
        fn group_laws(a in vec(0..9u8, 0..20), b in vec(0..9u8, 0..20)) {
            let x = apply_moves(&Cube222::SOLVED, &a);
            let y = apply_moves(&Cube222::SOLVED, &b);
            prop_assert_eq!(x.multiply(&x.inverse()), Cube222::SOLVED);
            prop_assert_eq!(x.inverse().multiply(&x), Cube222::SOLVED);
            prop_assert_eq!(x.multiply(&Cube222::SOLVED), x);
            // Applying b's moves after x equals multiplying by y.
            prop_assert_eq!(apply_moves(&x, &b), x.multiply(&y));
        }

        #[test]
        fn orientation_sum_is_conserved(moves in vec(0..9u8, 0..20)) {
            let a = apply_moves(&Cube222::SOLVED, &moves);
            prop_assert_eq!(a.co.iter().map(|&v| v as usize).sum::<usize>() % 3, 0);
            prop_assert!(a.co.iter().all(|&v| v < 3));
        }

        #[test]
        fn solutions_are_optimal_and_replay(moves in vec(0..9u8, 0..6)) {
            let s = solver();
            let scramble = apply_moves(&Cube222::SOLVED, &moves);
            let solutions = s.solve(&scramble, 0);
            prop_assert!(!solutions.is_empty());
            let optimal = solutions[0].len();
            prop_assert!(optimal <= moves.len());
            for solution in &solutions {
                prop_assert_eq!(solution.len(), optimal);
                prop_assert_eq!(apply_moves(&scramble, solution), Cube222::SOLVED);
            }
        }
    }
}
