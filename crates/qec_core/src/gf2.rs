//! Linear algebra over GF(2).
//!
//! Everything the code model needs to validate a construction and derive its
//! logical operators: rank, kernel, an incremental XOR basis, and a small
//! minimum-weight solver used by the color-code lift.

use crate::bit_utils::{self, Bits};

/// Incrementally built XOR basis.
///
/// Vectors are reduced against the stored rows in insertion order; a row's
/// pivot is its first set bit. Insertion is deterministic, so two bases fed
/// the same sequence are identical.
#[derive(Debug, Clone, Default)]
pub struct Gf2Basis {
    rows: Vec<Bits>,
    pivots: Vec<usize>,
}

impl Gf2Basis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduces `v` in place against every stored row.
    pub fn reduce(&self, v: &mut Bits) {
        for (row, &pivot) in self.rows.iter().zip(&self.pivots) {
            if v[pivot] {
                bit_utils::xor_into(v, row);
            }
        }
    }

    /// Adds `v` to the basis. Returns false if it was already in the span.
    pub fn insert(&mut self, mut v: Bits) -> bool {
        self.reduce(&mut v);
        match v.first_one() {
            Some(pivot) => {
                self.rows.push(v);
                self.pivots.push(pivot);
                true
            }
            None => false,
        }
    }

    /// True if `v` lies in the span of the basis.
    pub fn contains(&self, v: &Bits) -> bool {
        let mut v = v.clone();
        self.reduce(&mut v);
        v.not_any()
    }

    pub fn rank(&self) -> usize {
        self.rows.len()
    }
}

/// Rank of the matrix whose rows are `rows`.
pub fn rank(rows: &[Bits]) -> usize {
    let mut basis = Gf2Basis::new();
    for row in rows {
        basis.insert(row.clone());
    }
    basis.rank()
}

/// Reduced row echelon form of `rows` over `ncols` columns.
///
/// Returns the non-zero reduced rows together with their pivot columns.
fn rref(rows: &[Bits], ncols: usize) -> (Vec<Bits>, Vec<usize>) {
    let mut m: Vec<Bits> = rows.to_vec();
    let mut pivots = Vec::new();
    let mut r = 0;
    for col in 0..ncols {
        let Some(found) = (r..m.len()).find(|&i| m[i][col]) else {
            continue;
        };
        m.swap(r, found);
        let pivot_row = m[r].clone();
        for (i, row) in m.iter_mut().enumerate() {
            if i != r && row[col] {
                bit_utils::xor_into(row, &pivot_row);
            }
        }
        pivots.push(col);
        r += 1;
        if r == m.len() {
            break;
        }
    }
    m.truncate(r);
    (m, pivots)
}

/// Basis of the null space `{v : rows * v = 0}` over `ncols` columns.
///
/// One basis vector per free column, in increasing column order.
pub fn kernel(rows: &[Bits], ncols: usize) -> Vec<Bits> {
    let (reduced, pivots) = rref(rows, ncols);
    let mut is_pivot = bit_utils::zeros(ncols);
    for &p in &pivots {
        is_pivot.set(p, true);
    }
    is_pivot
        .iter_zeros()
        .map(|free| {
            let mut v = bit_utils::zeros(ncols);
            v.set(free, true);
            for (row, &p) in reduced.iter().zip(&pivots) {
                if row[free] {
                    v.set(p, true);
                }
            }
            v
        })
        .collect()
}

/// Representatives of `ker(commuting) / rowspace(stabilizers)`.
///
/// For a CSS code, `logical_basis(hx, hz, n)` yields Z-type vectors that
/// commute with every X check and are not products of Z checks, i.e. one
/// independent Z logical per encoded qubit. The result is deterministic.
pub fn logical_basis(commuting: &[Bits], stabilizers: &[Bits], ncols: usize) -> Vec<Bits> {
    let mut basis = Gf2Basis::new();
    for row in stabilizers {
        basis.insert(row.clone());
    }
    kernel(commuting, ncols)
        .into_iter()
        .filter(|v| basis.insert(v.clone()))
        .collect()
}

/// Largest kernel dimension searched exhaustively by [`solve_min_weight`].
const MAX_EXHAUSTIVE_KERNEL: usize = 12;

/// Solves `A x = b` and returns a solution of minimum weight.
///
/// `columns[j]` is column `j` of `A` (one bit per equation) and `weights[j]`
/// the cost of setting `x_j`. When the solution space is small it is searched
/// exhaustively; otherwise the particular solution is returned. `None` if
/// the system is inconsistent.
pub fn solve_min_weight(columns: &[Bits], rhs: &Bits, weights: &[usize]) -> Option<Bits> {
    let nvars = columns.len();
    let neqs = rhs.len();
    // Augmented rows: variables then the right-hand side.
    let mut rows: Vec<Bits> = (0..neqs)
        .map(|e| {
            let mut row = bit_utils::zeros(nvars + 1);
            for (j, col) in columns.iter().enumerate() {
                if col[e] {
                    row.set(j, true);
                }
            }
            row.set(nvars, rhs[e]);
            row
        })
        .collect();

    let mut pivots = Vec::new();
    let mut r = 0;
    for col in 0..nvars {
        let Some(found) = (r..rows.len()).find(|&i| rows[i][col]) else {
            continue;
        };
        rows.swap(r, found);
        let pivot_row = rows[r].clone();
        for (i, row) in rows.iter_mut().enumerate() {
            if i != r && row[col] {
                bit_utils::xor_into(row, &pivot_row);
            }
        }
        pivots.push(col);
        r += 1;
    }
    if rows[r..].iter().any(|row| row[nvars]) {
        return None;
    }

    let mut particular = bit_utils::zeros(nvars);
    for (row, &p) in rows.iter().zip(&pivots) {
        if row[nvars] {
            particular.set(p, true);
        }
    }

    let mut is_pivot = bit_utils::zeros(nvars);
    for &p in &pivots {
        is_pivot.set(p, true);
    }
    let null_vectors: Vec<Bits> = is_pivot
        .iter_zeros()
        .map(|free| {
            let mut v = bit_utils::zeros(nvars);
            v.set(free, true);
            for (row, &p) in rows.iter().zip(&pivots) {
                if row[free] {
                    v.set(p, true);
                }
            }
            v
        })
        .collect();

    if null_vectors.len() > MAX_EXHAUSTIVE_KERNEL {
        return Some(particular);
    }

    let cost = |v: &Bits| v.iter_ones().map(|j| weights[j]).sum::<usize>();
    let mut best = particular.clone();
    let mut best_cost = cost(&best);
    let mut current = particular;
    // Gray-code walk over the coset.
    for step in 1u32..(1u32 << null_vectors.len()) {
        let flip = step.trailing_zeros() as usize;
        bit_utils::xor_into(&mut current, &null_vectors[flip]);
        let c = cost(&current);
        if c < best_cost {
            best_cost = c;
            best = current.clone();
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_utils::from_indices;

    fn mat(ncols: usize, rows: &[&[usize]]) -> Vec<Bits> {
        rows.iter().map(|r| from_indices(ncols, r)).collect()
    }

    #[test]
    fn rank_of_repetition_checks() {
        // Closed chain of 4: the four checks sum to zero.
        let h = mat(4, &[&[0, 1], &[1, 2], &[2, 3], &[3, 0]]);
        assert_eq!(rank(&h), 3);
    }

    #[test]
    fn kernel_vectors_are_annihilated() {
        let h = mat(5, &[&[0, 1, 2], &[2, 3], &[1, 4]]);
        let ker = kernel(&h, 5);
        assert_eq!(ker.len(), 5 - rank(&h));
        for v in &ker {
            for row in &h {
                assert!(!bit_utils::dot(row, v));
            }
        }
    }

    #[test]
    fn basis_membership() {
        let mut basis = Gf2Basis::new();
        assert!(basis.insert(from_indices(4, &[0, 1])));
        assert!(basis.insert(from_indices(4, &[1, 2])));
        assert!(!basis.insert(from_indices(4, &[0, 2])));
        assert!(basis.contains(&from_indices(4, &[0, 2])));
        assert!(!basis.contains(&from_indices(4, &[3])));
    }

    #[test]
    fn min_weight_picks_lighter_coset_member() {
        // Cycle of three variables: each equation couples neighbours.
        // x0 + x1 = 1, x1 + x2 = 0, x2 + x0 = 1 -> {x0} or {x1, x2}.
        let cols = mat(3, &[&[0, 2], &[0, 1], &[1, 2]]);
        let rhs = from_indices(3, &[0, 2]);
        let sol = solve_min_weight(&cols, &rhs, &[1, 1, 1]).unwrap();
        assert_eq!(sol.iter_ones().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn inconsistent_system_has_no_solution() {
        let cols = mat(2, &[&[0, 1]]);
        let rhs = from_indices(2, &[0]);
        assert!(solve_min_weight(&cols, &rhs, &[1]).is_none());
    }
}
