//! Iterative deepening search (IDA*) over a coordinate space, pruned by a
//! distance heuristic.
//!
//! A search is an unbounded stream of [`SearchEvent`]s: each depth bound is
//! announced before it is explored, and every goal-reaching move sequence of
//! exactly that length is yielded as it is found. The caller decides when to
//! stop consuming; dropping the stream is the only cancellation mechanism.

use crate::coord::CoordSpace;
use crate::pruning::{DistanceTable, ResidueTable, UNREACHED, UNVISITED};

use log::debug;

/// One event from the search stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// The depth bound the search is about to explore exhaustively.
    Bound(usize),
    /// A sequence of generator indices of exactly the announced bound's
    /// length that reaches the goal.
    Solution(Vec<u8>),
}

/// A distance-to-goal estimate consumed by [`IdaStar`].
///
/// The estimate must be admissible (never exceed the true distance) for the
/// search to be optimal. A hint is computed per node and handed to each of
/// its children, which lets the mod 3 variant carry exact distances through
/// the recursion without a full-precision table.
pub trait Heuristic<S: CoordSpace> {
    /// Per-node data threaded from a node to its children.
    type Hint: Copy;

    /// The estimate for the search's start state.
    fn root(&self, space: &S, state: S::State) -> (usize, Self::Hint);

    /// The estimate for a state one move away from a node with the given
    /// hint.
    fn child(&self, space: &S, state: S::State, hint: Self::Hint) -> (usize, Self::Hint);
}

/// Reads true distances straight from an exact [`DistanceTable`].
#[derive(Clone, Copy)]
pub struct ExactHeuristic<'a> {
    table: &'a DistanceTable,
}

impl<'a> ExactHeuristic<'a> {
    /// Wrap an exact distance table.
    pub fn new(table: &'a DistanceTable) -> Self {
        ExactHeuristic { table }
    }
}

impl<S: CoordSpace> Heuristic<S> for ExactHeuristic<'_> {
    type Hint = ();

    fn root(&self, space: &S, state: S::State) -> (usize, ()) {
        self.child(space, state, ())
    }

    fn child(&self, space: &S, state: S::State, _hint: ()) -> (usize, ()) {
        let d = self.table.distance(space.index_of(state));
        assert!(
            d != UNREACHED,
            "coordinate never reached by the generators; the move set does not span this state"
        );
        (d as usize, ())
    }
}

/// Reconstructs exact distances from a mod 3 [`ResidueTable`].
///
/// Every move changes the true distance by exactly one, so a child's residue
/// picks the unique value among `d-1`, `d` and `d+1` congruent to it, where
/// `d` is the parent's exact distance carried in the hint. The start state's
/// exact distance is recovered once by walking downhill: some neighbor always
/// has residue `d - 1 (mod 3)`, and following those neighbors reaches the
/// goal in exactly `d` steps.
#[derive(Clone, Copy)]
pub struct ResidueHeuristic<'a> {
    table: &'a ResidueTable,
}

impl<'a> ResidueHeuristic<'a> {
    /// Wrap a mod 3 residue table.
    pub fn new(table: &'a ResidueTable) -> Self {
        ResidueHeuristic { table }
    }

    fn residue<S: CoordSpace>(&self, space: &S, state: S::State) -> usize {
        let r = self.table.residue(space.index_of(state));
        assert!(
            r != UNVISITED,
            "coordinate never reached by the generators; the move set does not span this state"
        );
        r as usize
    }
}

impl<S: CoordSpace> Heuristic<S> for ResidueHeuristic<'_> {
    type Hint = usize;

    fn root(&self, space: &S, state: S::State) -> (usize, usize) {
        let goal = space.solved();
        let mut state = state;
        let mut depth = 0;
        while state != goal {
            let down = (self.residue(space, state) + 2) % 3;
            state = (0..space.move_count())
                .map(|mv| space.apply(state, mv))
                .find(|&next| self.residue(space, next) == down)
                .expect("no neighbor one step closer; residue table does not match this space");
            depth += 1;
        }
        (depth, depth)
    }

    fn child(&self, space: &S, state: S::State, hint: usize) -> (usize, usize) {
        let r = self.residue(space, state);
        let d = hint + (r + 4 - hint % 3) % 3 - 1;
        (d, d)
    }
}

#[derive(Clone, Copy)]
struct Frame<T: Copy, H: Copy> {
    state: T,
    dist: usize,
    hint: H,
    next_mv: u8,
}

/// The iterative deepening search itself, as an iterator over
/// [`SearchEvent`]s.
///
/// Each bound runs a depth-first search with the pruning rule "moves so far
/// plus estimated remaining distance exceeds the bound". Moves are explored
/// in generator order with a single shared path buffer, so which of several
/// equal-length solutions comes first is determined by the generator list.
/// The stream never ends on its own unless a maximum length was given.
pub struct IdaStar<'a, S: CoordSpace, H: Heuristic<S>> {
    space: &'a S,
    heuristic: H,
    goal: S::State,
    root: Frame<S::State, H::Hint>,
    bound: usize,
    max_len: usize,
    frames: Vec<Frame<S::State, H::Hint>>,
    path: Vec<u8>,
    counts: [u64; 3],
    announced: bool,
    done: bool,
}

impl<'a, S: CoordSpace, H: Heuristic<S>> IdaStar<'a, S, H> {
    /// Start a search from `start` toward the space's solved coordinate. The
    /// first announced bound is the start state's heuristic estimate.
    pub fn new(space: &'a S, heuristic: H, start: S::State) -> Self {
        Self::with_max_len(space, heuristic, start, usize::MAX)
    }

    /// Like [`new`](Self::new), but the stream ends instead of announcing a
    /// bound beyond `max_len`. Used by phase searches running under a move
    /// budget.
    pub fn with_max_len(space: &'a S, heuristic: H, start: S::State, max_len: usize) -> Self {
        let (dist, hint) = heuristic.root(space, start);
        IdaStar {
            goal: space.solved(),
            root: Frame {
                state: start,
                dist,
                hint,
                next_mv: 0,
            },
            bound: dist,
            max_len,
            frames: Vec::new(),
            path: Vec::new(),
            counts: [0; 3],
            announced: false,
            done: false,
            space,
            heuristic,
        }
    }

    fn pop(&mut self) {
        self.frames.pop();
        self.path.pop();
    }

    /// Resume the depth-bounded DFS until the next solution, or `None` when
    /// the current bound is exhausted.
    fn step(&mut self) -> Option<Vec<u8>> {
        while !self.frames.is_empty() {
            let depth = self.frames.len() - 1;

            if depth == self.bound {
                self.counts[1] += 1;
                let found = self.frames.last().unwrap().state == self.goal;
                let solution = found.then(|| self.path.clone());
                self.pop();
                if solution.is_some() {
                    self.counts[2] += 1;
                    return solution;
                }
                continue;
            }

            {
                let frame = self.frames.last().unwrap();
                if frame.next_mv == 0 && depth + frame.dist > self.bound {
                    self.pop();
                    continue;
                }
            }

            let mask = self.space.move_mask(self.path.last().copied());
            let mut child = None;
            {
                let frame = self.frames.last_mut().unwrap();
                while (frame.next_mv as usize) < self.space.move_count() {
                    let mv = frame.next_mv;
                    frame.next_mv += 1;
                    if mask >> mv & 1 == 1 {
                        child = Some((mv, self.space.apply(frame.state, mv as usize), frame.hint));
                        break;
                    }
                }
            }
            match child {
                Some((mv, state, hint)) => {
                    let (dist, hint) = self.heuristic.child(self.space, state, hint);
                    self.counts[0] += 1;
                    self.path.push(mv);
                    self.frames.push(Frame {
                        state,
                        dist,
                        hint,
                        next_mv: 0,
                    });
                }
                None => self.pop(),
            }
        }
        None
    }
}

impl<S: CoordSpace, H: Heuristic<S>> Iterator for IdaStar<'_, S, H> {
    type Item = SearchEvent;

    fn next(&mut self) -> Option<SearchEvent> {
        if self.done {
            return None;
        }
        if !self.announced {
            if self.bound > self.max_len {
                self.done = true;
                return None;
            }
            self.announced = true;
            self.counts = [1, 0, 0];
            self.path.clear();
            self.frames.clear();
            self.frames.push(self.root);
            debug!("ida_star: bound={}", self.bound);
            return Some(SearchEvent::Bound(self.bound));
        }
        if let Some(moves) = self.step() {
            return Some(SearchEvent::Solution(moves));
        }
        debug!(
            "ida_star: bound={}, visited={}, leaves={}, solutions={}",
            self.bound, self.counts[0], self.counts[1], self.counts[2]
        );
        self.bound += 1;
        self.announced = false;
        self.next()
    }
}

/// Drive a search stream the way `solve` does: gather solutions, and stop at
/// the first announced bound more than `relax` beyond the first solution's
/// length. With `relax = 0` the result is exactly the set of minimal
/// solutions.
pub fn collect_solutions(
    events: impl IntoIterator<Item = SearchEvent>,
    relax: usize,
) -> Vec<Vec<u8>> {
    let mut result: Vec<Vec<u8>> = Vec::new();
    for event in events {
        match event {
            SearchEvent::Solution(moves) => result.push(moves),
            SearchEvent::Bound(bound) => {
                if let Some(first) = result.first() {
                    if bound > first.len() + relax {
                        break;
                    }
                }
            }
        }
    }
    result
}

/// The two phase driver: enumerate phase 0 solutions by increasing length,
/// finish each residual state in phase 1 within the improving budget, and
/// return the best combined solution of at most `max_len` moves.
///
/// `advance` applies a phase 0 solution to the full puzzle; `remap` translates
/// phase 1 generator indices back into the full generator list. When a
/// phase 0 solution alone reaches the goal it is optimal overall and the
/// search finishes early; otherwise it stops once the phase 0 bound can no
/// longer beat the best total.
pub fn combine_solve<S0, S1, H0, H1>(
    phase0: &S0,
    h0: H0,
    phase1: &S1,
    h1: H1,
    cube: &S0::Cube,
    advance: impl Fn(&S0::Cube, &[u8]) -> S1::Cube,
    remap: &[u8],
    max_len: usize,
) -> Option<Vec<u8>>
where
    S0: CoordSpace,
    S1: CoordSpace,
    H0: Heuristic<S0>,
    H1: Heuristic<S1> + Copy,
{
    let mut best: Option<Vec<u8>> = None;
    let events = IdaStar::with_max_len(phase0, h0, phase0.project(cube), max_len);
    for event in events {
        match event {
            SearchEvent::Bound(bound) => {
                // Totals are never shorter than the phase 0 part.
                if best.as_ref().is_some_and(|b| bound >= b.len()) {
                    break;
                }
            }
            SearchEvent::Solution(moves) => {
                let budget = match &best {
                    Some(b) => b.len() - 1 - moves.len(),
                    None => max_len - moves.len(),
                };
                let residual = phase1.project(&advance(cube, &moves));
                let tail = IdaStar::with_max_len(phase1, h1, residual, budget)
                    .find_map(|event| match event {
                        SearchEvent::Solution(moves) => Some(moves),
                        SearchEvent::Bound(_) => None,
                    });
                let Some(tail) = tail else {
                    continue;
                };
                debug!(
                    "combine: found, n_moves=({} {})",
                    moves.len(),
                    tail.len()
                );
                let finished = tail.is_empty();
                let mut total = moves;
                total.extend(tail.iter().map(|&mv| remap[mv as usize]));
                best = Some(total);
                if finished {
                    break;
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::pruning::test::Ring;

    #[test]
    fn exact_search_on_ring() {
        let ring = Ring { len: 12 };
        let table = DistanceTable::generate(&ring).unwrap();
        let mut events = IdaStar::new(&ring, ExactHeuristic::new(&table), 5);

        // The first bound is the start state's true distance, and the only
        // length 5 solution is five backward steps.
        assert_eq!(events.next(), Some(SearchEvent::Bound(5)));
        assert_eq!(events.next(), Some(SearchEvent::Solution(vec![1; 5])));
        assert_eq!(events.next(), Some(SearchEvent::Bound(6)));
    }

    #[test]
    fn start_at_goal_yields_empty_solution() {
        let ring = Ring { len: 12 };
        let table = DistanceTable::generate(&ring).unwrap();
        let mut events = IdaStar::new(&ring, ExactHeuristic::new(&table), 0);
        assert_eq!(events.next(), Some(SearchEvent::Bound(0)));
        assert_eq!(events.next(), Some(SearchEvent::Solution(vec![])));
        assert_eq!(events.next(), Some(SearchEvent::Bound(1)));
    }

    #[test]
    fn relax_widens_the_bound() {
        let ring = Ring { len: 12 };
        let table = DistanceTable::generate(&ring).unwrap();

        // Distance parity on the ring means no length 6 solution exists from
        // distance 5; at length 7 one forward step can be inserted at any of
        // seven places, or the search can go the long way round.
        let heuristic = ExactHeuristic::new(&table);
        let minimal = collect_solutions(IdaStar::new(&ring, heuristic, 5), 0);
        assert_eq!(minimal, vec![vec![1; 5]]);

        let relaxed = collect_solutions(IdaStar::new(&ring, heuristic, 5), 2);
        assert_eq!(relaxed.len(), 1 + 7 + 1);
        assert!(relaxed.iter().all(|s| s.len() == 5 || s.len() == 7));
    }

    #[test]
    fn solutions_come_in_generator_order() {
        let ring = Ring { len: 12 };
        let table = DistanceTable::generate(&ring).unwrap();

        let solutions = collect_solutions(
            IdaStar::new(&ring, ExactHeuristic::new(&table), 2),
            2,
        );
        let quads: Vec<_> = solutions.iter().filter(|s| s.len() == 4).collect();
        assert_eq!(
            quads,
            [&vec![0, 1, 1, 1], &vec![1, 0, 1, 1], &vec![1, 1, 0, 1], &vec![1, 1, 1, 0]]
        );
    }

    #[test]
    fn residue_search_matches_exact() {
        let ring = Ring { len: 13 };
        let exact = DistanceTable::generate(&ring).unwrap();
        let residues = ResidueTable::generate(&ring);

        for start in 0..13 {
            for relax in 0..2 {
                let a = collect_solutions(
                    IdaStar::new(&ring, ExactHeuristic::new(&exact), start),
                    relax,
                );
                let b = collect_solutions(
                    IdaStar::new(&ring, ResidueHeuristic::new(&residues), start),
                    relax,
                );
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn guided_descent_recovers_exact_distances() {
        let ring = Ring { len: 257 };
        let exact = DistanceTable::generate(&ring).unwrap();
        let residues = ResidueTable::generate(&ring);
        let heuristic = ResidueHeuristic::new(&residues);
        for start in 0..257 {
            let (d, _) = Heuristic::<Ring>::root(&heuristic, &ring, start);
            assert_eq!(d, exact.distance(start) as usize);
        }
    }

    /// A two phase decomposition of a ring of 24 with moves +1, -1, +4, -4:
    /// the coarse coordinate is the position mod 4 (which the +-4 moves fix),
    /// and the fine coordinate finishes multiples of four with +-4 alone.
    struct CoarseRing;
    struct FineRing;

    impl CoordSpace for CoarseRing {
        type Cube = usize;
        type State = usize;

        fn move_count(&self) -> usize {
            4
        }

        fn state_count(&self) -> usize {
            4
        }

        fn project(&self, cube: &usize) -> usize {
            cube % 4
        }

        fn index_of(&self, state: usize) -> usize {
            state
        }

        fn solved(&self) -> usize {
            0
        }

        fn apply(&self, state: usize, mv: usize) -> usize {
            match mv {
                0 => (state + 1) % 4,
                1 => (state + 3) % 4,
                _ => state,
            }
        }
    }

    impl CoordSpace for FineRing {
        type Cube = usize;
        type State = usize;

        fn move_count(&self) -> usize {
            2
        }

        fn state_count(&self) -> usize {
            24
        }

        fn project(&self, cube: &usize) -> usize {
            *cube
        }

        fn index_of(&self, state: usize) -> usize {
            state
        }

        fn solved(&self) -> usize {
            0
        }

        fn apply(&self, state: usize, mv: usize) -> usize {
            match mv {
                0 => (state + 4) % 24,
                _ => (state + 20) % 24,
            }
        }
    }

    /// The undecomposed puzzle, for checking the combined result is optimal.
    struct FullRing;

    impl CoordSpace for FullRing {
        type Cube = usize;
        type State = usize;

        fn move_count(&self) -> usize {
            4
        }

        fn state_count(&self) -> usize {
            24
        }

        fn project(&self, cube: &usize) -> usize {
            *cube
        }

        fn index_of(&self, state: usize) -> usize {
            state
        }

        fn solved(&self) -> usize {
            0
        }

        fn apply(&self, state: usize, mv: usize) -> usize {
            match mv {
                0 => (state + 1) % 24,
                1 => (state + 23) % 24,
                2 => (state + 4) % 24,
                _ => (state + 20) % 24,
            }
        }
    }

    fn advance_ring(cube: &usize, moves: &[u8]) -> usize {
        let full = FullRing;
        moves.iter().fold(*cube, |x, &mv| full.apply(x, mv as usize))
    }

    #[test]
    fn combine_solves_through_both_phases() {
        let coarse = CoarseRing;
        let fine = FineRing;
        let d0 = DistanceTable::generate(&coarse).unwrap();
        let d1 = DistanceTable::generate(&fine).unwrap();
        let remap = [2u8, 3];

        let solve = |cube: usize, max_len: usize| {
            combine_solve(
                &coarse,
                ExactHeuristic::new(&d0),
                &fine,
                ExactHeuristic::new(&d1),
                &cube,
                advance_ring,
                &remap,
                max_len,
            )
        };

        // Already solved, solved by phase 1 alone, and a mixed case.
        assert_eq!(solve(0, 20), Some(vec![]));
        assert_eq!(solve(4, 20), Some(vec![3]));
        assert_eq!(solve(7, 20), Some(vec![0, 3, 3]));

        // Every result replays to the goal, and on this ring the two phase
        // split loses nothing against the true distance.
        let full = DistanceTable::generate(&FullRing).unwrap();
        for cube in 0..24 {
            let solution = solve(cube, 20).unwrap();
            assert_eq!(advance_ring(&cube, &solution), 0);
            assert_eq!(solution.len(), full.distance(cube) as usize);
        }

        // A budget too tight for any total comes back empty.
        assert_eq!(solve(7, 2), None);
    }
}
