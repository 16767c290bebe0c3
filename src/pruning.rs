//! Pruning tables: breadth first exploration of the transition graph from the
//! solved coordinate, producing either exact distances (one byte per state)
//! or their mod 3 residues (two bits per state) for spaces too large to store
//! exactly.

use crate::coord::CoordSpace;
use crate::error::TableError;

use log::{debug, info};

/// Sentinel marking a coordinate the search has not reached (yet). Stored
/// distances are therefore capped at 254.
pub const UNREACHED: u8 = u8::MAX;

/// An exact distance table: for every coordinate, the minimum number of
/// generator moves to the solved coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceTable {
    dist: Box<[u8]>,
}

impl DistanceTable {
    /// Explore the whole space breadth first from the solved coordinate.
    /// Every first visit stamps the true shortest distance; the search ends
    /// when a layer produces no new states, at which point every coordinate
    /// reachable by the generators has been stamped.
    ///
    /// Fails with [`TableError::DiameterOverflow`] if a distance would
    /// collide with the [`UNREACHED`] sentinel; such a space needs the
    /// [`ResidueTable`] instead.
    pub fn generate<S: CoordSpace>(space: &S) -> Result<Self, TableError> {
        let mut dist = vec![UNREACHED; space.state_count()].into_boxed_slice();
        let solved = space.solved();
        dist[space.index_of(solved)] = 0;

        let mut layer = vec![solved];
        let mut total = 1u64;
        let mut depth = 0usize;
        while !layer.is_empty() {
            debug!("bfs: depth={}, count={}", depth, layer.len());
            depth += 1;
            if depth >= UNREACHED as usize {
                return Err(TableError::DiameterOverflow { depth });
            }

            let mut next = Vec::new();
            for a in layer {
                for mv in 0..space.move_count() {
                    let b = space.apply(a, mv);
                    let i = space.index_of(b);
                    if dist[i] == UNREACHED {
                        dist[i] = depth as u8;
                        next.push(b);
                    }
                }
            }
            total += next.len() as u64;
            layer = next;
        }

        info!(
            "bfs: done, states={}, reached={}, diameter={}",
            space.state_count(),
            total,
            depth - 1
        );
        Ok(DistanceTable { dist })
    }

    /// The stored distance of a coordinate index, or [`UNREACHED`].
    #[inline]
    pub fn distance(&self, index: usize) -> u8 {
        self.dist[index]
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.dist.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }

    /// Serialize for the cache collaborator.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.dist.to_vec()
    }

    /// Rebuild from [`to_bytes`](Self::to_bytes) output, checking the
    /// expected length.
    pub fn from_bytes(bytes: &[u8], len: usize) -> Option<Self> {
        (bytes.len() == len).then(|| DistanceTable {
            dist: bytes.to_vec().into_boxed_slice(),
        })
    }
}

/// Residue value marking a coordinate the search has not visited. Valid
/// residues are 0, 1 and 2.
pub const UNVISITED: u8 = 3;

/// A compressed distance table storing only `distance mod 3`, two bits per
/// entry (four entries per byte). Because adjacent coordinates' true
/// distances differ by exactly one, the residue is enough for the search
/// engine to reconstruct exact distances incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueTable {
    packed: Box<[u8]>,
    len: usize,
}

impl ResidueTable {
    /// The same traversal as [`DistanceTable::generate`], stamping
    /// `depth mod 3` instead of the depth itself. Cannot overflow.
    pub fn generate<S: CoordSpace>(space: &S) -> Self {
        let mut table = ResidueTable {
            packed: vec![0xff; space.state_count().div_ceil(4)].into_boxed_slice(),
            len: space.state_count(),
        };
        let solved = space.solved();
        table.set(space.index_of(solved), 0);

        let mut layer = vec![solved];
        let mut total = 1u64;
        let mut depth = 0usize;
        while !layer.is_empty() {
            debug!("bfs_m3: depth={}, count={}", depth, layer.len());
            depth += 1;

            let mut next = Vec::new();
            for a in layer {
                for mv in 0..space.move_count() {
                    let b = space.apply(a, mv);
                    let i = space.index_of(b);
                    if table.residue(i) == UNVISITED {
                        table.set(i, (depth % 3) as u8);
                        next.push(b);
                    }
                }
            }
            total += next.len() as u64;
            layer = next;
        }

        info!(
            "bfs_m3: done, states={}, reached={}, diameter={}",
            space.state_count(),
            total,
            depth - 1
        );
        table
    }

    /// The stored residue of a coordinate index: 0, 1, 2 or [`UNVISITED`].
    #[inline]
    pub fn residue(&self, index: usize) -> u8 {
        debug_assert!(index < self.len);
        (self.packed[index >> 2] >> ((index & 3) * 2)) & 3
    }

    #[inline]
    fn set(&mut self, index: usize, value: u8) {
        debug_assert!(value & !3 == 0);
        let shift = (index & 3) * 2;
        let slot = &mut self.packed[index >> 2];
        *slot &= !(3 << shift);
        *slot |= value << shift;
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Serialize for the cache collaborator: the entry count followed by the
    /// packed bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.packed.len());
        bytes.extend_from_slice(&(self.len as u64).to_le_bytes());
        bytes.extend_from_slice(&self.packed);
        bytes
    }

    /// Rebuild from [`to_bytes`](Self::to_bytes) output, checking the
    /// expected entry count.
    pub fn from_bytes(bytes: &[u8], len: usize) -> Option<Self> {
        let (header, packed) = bytes.split_at_checked(8)?;
        if u64::from_le_bytes(header.try_into().unwrap()) != len as u64
            || packed.len() != len.div_ceil(4)
        {
            return None;
        }
        Some(ResidueTable {
            packed: packed.to_vec().into_boxed_slice(),
            len,
        })
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// A ring of `len` states with generators +1 and -1; the distance of
    /// state `i` from 0 is `min(i, len - i)`, which makes every breadth first
    /// property checkable in closed form.
    pub(crate) struct Ring {
        pub len: usize,
    }

    impl CoordSpace for Ring {
        type Cube = usize;
        type State = usize;

        fn move_count(&self) -> usize {
            2
        }

        fn state_count(&self) -> usize {
            self.len
        }

        fn project(&self, cube: &usize) -> usize {
            cube % self.len
        }

        fn index_of(&self, state: usize) -> usize {
            state
        }

        fn solved(&self) -> usize {
            0
        }

        fn apply(&self, state: usize, mv: usize) -> usize {
            match mv {
                0 => (state + 1) % self.len,
                _ => (state + self.len - 1) % self.len,
            }
        }
    }

    #[test]
    fn exact_distances_on_ring() {
        let ring = Ring { len: 11 };
        let table = DistanceTable::generate(&ring).unwrap();
        assert_eq!(table.len(), 11);
        assert_eq!(table.distance(0), 0);
        for i in 0..11 {
            assert_eq!(table.distance(i) as usize, i.min(11 - i));
        }
    }

    #[test]
    fn bfs_shortest_path_property() {
        // Every non-solved coordinate's distance is one more than the best
        // neighbor distance.
        let ring = Ring { len: 16 };
        let table = DistanceTable::generate(&ring).unwrap();
        for i in 1..16 {
            let best = (0..2)
                .map(|mv| table.distance(ring.apply(i, mv)))
                .min()
                .unwrap();
            assert_eq!(table.distance(i), best + 1);
        }
    }

    #[test]
    fn residues_match_exact_mod3() {
        let ring = Ring { len: 257 };
        let exact = DistanceTable::generate(&ring).unwrap();
        let residues = ResidueTable::generate(&ring);
        assert_eq!(residues.len(), 257);
        for i in 0..257 {
            assert_eq!(residues.residue(i), exact.distance(i) % 3);
        }
    }

    #[test]
    fn diameter_overflow_is_surfaced() {
        // A path-like ring long enough that some state is 255+ moves out.
        let ring = Ring { len: 600 };
        assert_eq!(
            DistanceTable::generate(&ring),
            Err(TableError::DiameterOverflow { depth: 255 })
        );
        // The compressed table handles the same space fine.
        let residues = ResidueTable::generate(&ring);
        assert_eq!(residues.residue(300), (300 % 3) as u8);
    }

    #[test]
    fn packed_random_access() {
        let ring = Ring { len: 7 };
        let mut table = ResidueTable::generate(&ring);
        // Writes to one slot leave its byte neighbors untouched.
        for i in 0..7 {
            table.set(i, (i % 3) as u8);
        }
        for i in 0..7 {
            assert_eq!(table.residue(i), (i % 3) as u8);
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let ring = Ring { len: 97 };
        let exact = DistanceTable::generate(&ring).unwrap();
        assert_eq!(
            DistanceTable::from_bytes(&exact.to_bytes(), 97),
            Some(exact)
        );
        let residues = ResidueTable::generate(&ring);
        let bytes = residues.to_bytes();
        assert_eq!(ResidueTable::from_bytes(&bytes, 97), Some(residues));
        assert_eq!(ResidueTable::from_bytes(&bytes, 98), None);
    }
}
