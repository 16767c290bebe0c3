//! We give a general description of a coordinate space: the combined integer
//! encoding of a puzzle (or of a quotient of one, for phase solving), used as
//! the vertex set of the search graph.

/// A coordinate space for the puzzle `Cube`, with precomputed transition
/// tables for a fixed generator list.
///
/// States are trivially copyable coordinate tuples; `index_of` flattens them
/// into `[0, state_count)` for use as distance table indices. Move
/// application must be a table lookup, never algebraic composition; the
/// tables are built once and the search engines lean on this being cheap.
pub trait CoordSpace {
    /// The full puzzle state this space encodes.
    type Cube;

    /// A combined coordinate, used as a search vertex.
    type State: Copy + Eq;

    /// The number of generator moves.
    fn move_count(&self) -> usize;

    /// The total number of coordinate states.
    fn state_count(&self) -> usize;

    /// Encode a full puzzle state.
    fn project(&self, cube: &Self::Cube) -> Self::State;

    /// The dense index of a state, in `[0, state_count())`.
    fn index_of(&self, state: Self::State) -> usize;

    /// The coordinate of the solved puzzle.
    fn solved(&self) -> Self::State;

    /// Apply the generator with index `mv`.
    fn apply(&self, state: Self::State, mv: usize) -> Self::State;

    /// The bitmask of generators worth trying directly after `last` during a
    /// search. The default allows everything, which keeps the solution
    /// streams exhaustive; spaces may override it with
    /// [`successor_masks`](crate::group::successor_masks) when enumeration
    /// order of equal products does not matter.
    fn move_mask(&self, last: Option<u8>) -> u32 {
        let _ = last;
        (1u32 << self.move_count()) - 1
    }
}
