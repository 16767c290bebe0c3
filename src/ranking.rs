//! Bijections between the algebraic objects making up a puzzle state
//! (permutations, orientation vectors, partition labelings) and dense integer
//! ranks. These ranks are what the move and distance tables are indexed by.
//!
//! All functions here are pure integer arithmetic. Part sizes are small
//! constants (7, 8, 12), so everything is written for clarity of the bijection
//! rather than speed.

/// The number of permutations of `m` items, i.e. `m!`.
pub const fn permutation_count(m: usize) -> usize {
    let mut x = 1;
    let mut i = 2;
    while i <= m {
        x *= i;
        i += 1;
    }
    x
}

/// Rank a permutation of `[0, M)` into `[0, M!)` using the factorial number
/// system. Exact inverse of [`unrank_permutation`].
pub fn rank_permutation<const M: usize>(p: &[u8; M]) -> usize {
    debug_assert!(is_permutation(p), "not a permutation of [0, M)");

    // Reduce each entry by the number of larger entries before it, leaving the
    // Lehmer digits in place, then evaluate them in the mixed radix
    // M, M-1, .., 1.
    let mut digits = *p;
    for i in 0..M {
        for j in i + 1..M {
            if digits[j] > digits[i] {
                digits[j] -= 1;
            }
        }
    }

    let mut x = 0;
    for i in 0..M {
        x = x * (M - i) + digits[i] as usize;
    }
    x
}

/// Unrank `x` in `[0, M!)` back into a permutation of `[0, M)`. Exact inverse
/// of [`rank_permutation`]. Ranks outside the valid range are a caller error.
pub fn unrank_permutation<const M: usize>(mut x: usize) -> [u8; M] {
    assert!(x < permutation_count(M), "permutation rank out of range");

    let mut p = [0u8; M];
    for i in (0..M).rev() {
        p[i] = (x % (M - i)) as u8;
        x /= M - i;
    }
    // Undo the digit reduction: later entries at least as large as an earlier
    // one shift up to make room for it.
    for i in (0..M).rev() {
        for j in i + 1..M {
            if p[j] >= p[i] {
                p[j] += 1;
            }
        }
    }
    p
}

/// The number of orientation vectors of length `m` over the alphabet `[0, n)`
/// whose sum is divisible by `n`, i.e. `n^(m-1)`.
pub const fn orientation_count(m: usize, n: usize) -> usize {
    let mut x = 1;
    let mut i = 1;
    while i < m {
        x *= n;
        i += 1;
    }
    x
}

/// Rank an orientation vector into `[0, n^(M-1))`. The last entry is derived
/// from the others by the sum invariant and does not contribute to the rank.
pub fn rank_orientation<const M: usize>(o: &[u8; M], n: u8) -> usize {
    debug_assert!(
        o.iter().map(|&v| v as usize).sum::<usize>() % n as usize == 0,
        "orientation sum invariant broken"
    );

    o[..M - 1]
        .iter()
        .fold(0, |acc, &v| acc * n as usize + v as usize)
}

/// Unrank `x` in `[0, n^(M-1))` into an orientation vector, synthesizing the
/// last entry so that the sum invariant holds. Exact inverse of
/// [`rank_orientation`].
pub fn unrank_orientation<const M: usize>(mut x: usize, n: u8) -> [u8; M] {
    assert!(x < orientation_count(M, n as usize), "orientation rank out of range");

    let mut o = [0u8; M];
    let mut sum = 0;
    for i in (0..M - 1).rev() {
        o[i] = (x % n as usize) as u8;
        x /= n as usize;
        sum += o[i] as usize;
    }
    o[M - 1] = ((n as usize - sum % n as usize) % n as usize) as u8;
    o
}

/// The number of ways to assign `sum(ns)` positions to groups of sizes `ns`,
/// i.e. the multinomial coefficient `sum(ns)! / (ns[0]! * ns[1]! * ..)`.
pub fn multinomial(ns: &[usize]) -> usize {
    let m = ns.iter().sum::<usize>();
    let mut number = 1;
    let mut i = 0;
    for &n in ns {
        // Running product of binomials; every intermediate division is exact.
        for j in 0..n {
            number = number * (m - i) / (j + 1);
            i += 1;
        }
    }
    number
}

/// Rank a labeling of `M` positions by group ids into `[0, multinomial(ns))`.
/// Exact inverse of [`unrank_label`].
pub fn rank_label<const M: usize>(labels: &[u8; M], ns: &[usize]) -> usize {
    debug_assert_eq!(ns.iter().sum::<usize>(), M);

    let mut number = multinomial(ns);
    let mut remaining = ns.to_vec();
    let mut x = 0;
    for (i, &g) in labels.iter().enumerate() {
        let g = g as usize;
        debug_assert!(remaining[g] > 0, "labeling does not match group sizes");
        for k in 0..g {
            x += number * remaining[k] / (M - i);
        }
        number = number * remaining[g] / (M - i);
        remaining[g] -= 1;
    }
    x
}

/// Unrank `x` in `[0, multinomial(ns))` into a labeling of positions by group
/// ids. Exact inverse of [`rank_label`].
pub fn unrank_label<const M: usize>(x: usize, ns: &[usize]) -> [u8; M] {
    debug_assert_eq!(ns.iter().sum::<usize>(), M);
    let mut number = multinomial(ns);
    assert!(x < number, "labeling rank out of range");

    let mut remaining = ns.to_vec();
    let mut rest = x;
    let mut labels = [0u8; M];
    for (i, label) in labels.iter_mut().enumerate() {
        for (j, r) in remaining.iter_mut().enumerate() {
            if *r == 0 {
                continue;
            }
            // Number of labelings that continue with group j here.
            let number_j = number * *r / (M - i);
            if rest < number_j {
                number = number_j;
                *r -= 1;
                *label = j as u8;
                break;
            }
            rest -= number_j;
        }
    }
    labels
}

/// A partition of the positions `[0, m)` into named groups, each group an
/// ordered sequence of positions. Shared read-only by the coordinate
/// conversions that reduce a permutation to a labeling or to per-group
/// sub-permutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orbit {
    positions: Vec<Vec<u8>>,
    sizes: Vec<usize>,
    group_of: Vec<u8>,
    index_in_group: Vec<u8>,
}

impl Orbit {
    /// Build an orbit descriptor from its groups. The groups must partition
    /// `[0, m)` where `m` is the total number of positions.
    pub fn new(groups: Vec<Vec<u8>>) -> Self {
        let m = groups.iter().map(Vec::len).sum::<usize>();
        let sizes = groups.iter().map(Vec::len).collect();
        let mut group_of = vec![u8::MAX; m];
        let mut index_in_group = vec![0; m];
        for (g, group) in groups.iter().enumerate() {
            for (j, &pos) in group.iter().enumerate() {
                let pos = pos as usize;
                assert!(pos < m && group_of[pos] == u8::MAX, "groups must partition [0, m)");
                group_of[pos] = g as u8;
                index_in_group[pos] = j as u8;
            }
        }
        assert!(group_of.iter().all(|&g| g != u8::MAX), "groups must partition [0, m)");

        Orbit {
            positions: groups,
            sizes,
            group_of,
            index_in_group,
        }
    }

    /// The group sizes, in group order.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// The total number of positions.
    pub fn position_count(&self) -> usize {
        self.group_of.len()
    }

    /// Forget everything about a permutation except which group each
    /// position's image belongs to.
    pub fn label_of<const M: usize>(&self, p: &[u8; M]) -> [u8; M] {
        debug_assert_eq!(M, self.position_count());
        p.map(|v| self.group_of[v as usize])
    }

    /// Restrict an orbit-preserving permutation to the group `g`, re-indexed
    /// by rank within the group. `K` must equal the group's size, and every
    /// image of the group must land back in it (caller error otherwise).
    pub fn sub_permutation<const M: usize, const K: usize>(
        &self,
        p: &[u8; M],
        g: usize,
    ) -> [u8; K] {
        debug_assert_eq!(M, self.position_count());
        assert_eq!(K, self.sizes[g], "sub-permutation size mismatch");

        let mut sub = [0u8; K];
        for (j, out) in sub.iter_mut().enumerate() {
            let image = p[self.positions[g][j] as usize];
            assert_eq!(
                self.group_of[image as usize] as usize, g,
                "permutation does not preserve the orbit"
            );
            *out = self.index_in_group[image as usize];
        }
        sub
    }
}

fn is_permutation<const M: usize>(p: &[u8; M]) -> bool {
    let mut seen = [false; M];
    for &v in p {
        if (v as usize) >= M || seen[v as usize] {
            return false;
        }
        seen[v as usize] = true;
    }
    true
}
