//! Disjoint Set Union (DSU) forest with cluster parity and boundary flags.
//!
//! Implements the union-find structure behind the cluster-growth decoder.
//! Each set is a cluster of decoding-graph nodes; its root carries two packed
//! flags: the parity of the defects it contains and whether it has reached a
//! boundary node. A cluster needs further growth exactly when it has odd
//! parity and no boundary.

use crate::bit_utils::BitPack;

/// Union-find forest over the nodes of one decoding graph.
///
/// Owned by a single decode call. Finds use path halving, unions attach the
/// smaller tree under the larger one, and flags are merged at the surviving
/// root.
#[derive(Debug, Clone)]
pub struct ClusterForest {
    /// Parent pointer array; roots point to themselves.
    ///
    /// Rewritten during finds (path halving) so that later lookups on the
    /// same path are close to O(1).
    parent: Vec<usize>,

    /// Number of nodes in each root's set. Meaningless for non-roots.
    size: Vec<usize>,

    /// Defect parity per root, packed as u64 words.
    parity: Vec<u64>,

    /// Boundary-contact flag per root, packed as u64 words.
    boundary: Vec<u64>,
}

impl ClusterForest {
    /// Creates `num_nodes` singleton clusters with clear flags.
    pub fn new(num_nodes: usize) -> Self {
        let words = BitPack::words_for(num_nodes);
        Self {
            parent: (0..num_nodes).collect(),
            size: vec![1; num_nodes],
            parity: vec![0; words],
            boundary: vec![0; words],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Finds the root of the set containing node `i`, halving the path.
    ///
    /// Every visited node is re-pointed at its grandparent, which flattens
    /// the tree without a second pass.
    #[inline(always)]
    pub fn find(&mut self, mut i: usize) -> usize {
        while i != self.parent[i] {
            let p = self.parent[i];
            let gp = self.parent[p];
            self.parent[i] = gp;
            i = p;
        }
        i
    }

    /// Merges the sets containing `i` and `j`.
    ///
    /// The smaller set is attached below the larger (ties keep `i`'s root).
    /// Parity is combined by XOR and the boundary flag by OR. Returns false
    /// if both nodes already shared a root.
    pub fn union(&mut self, i: usize, j: usize) -> bool {
        let (root_i, root_j) = (self.find(i), self.find(j));
        if root_i == root_j {
            return false;
        }
        let (keep, drop) = if self.size[root_i] < self.size[root_j] {
            (root_j, root_i)
        } else {
            (root_i, root_j)
        };
        self.parent[drop] = keep;
        self.size[keep] += self.size[drop];
        if BitPack::get(&self.parity, drop) {
            BitPack::toggle(&mut self.parity, keep);
        }
        if BitPack::get(&self.boundary, drop) {
            BitPack::set(&mut self.boundary, keep, true);
        }
        true
    }

    /// Toggles the parity of the set containing `i`.
    ///
    /// Each defect toggles its node's set once before growth starts.
    pub fn toggle_parity(&mut self, i: usize) {
        let root = self.find(i);
        BitPack::toggle(&mut self.parity, root);
    }

    /// Marks the set containing `i` as touching the boundary.
    pub fn mark_boundary(&mut self, i: usize) {
        let root = self.find(i);
        BitPack::set(&mut self.boundary, root, true);
    }

    /// Parity of a root's set.
    pub fn is_odd(&self, root: usize) -> bool {
        BitPack::get(&self.parity, root)
    }

    /// Boundary flag of a root's set.
    pub fn touches_boundary(&self, root: usize) -> bool {
        BitPack::get(&self.boundary, root)
    }

    /// True if the root's cluster still needs to grow.
    #[inline]
    pub fn is_active(&self, root: usize) -> bool {
        self.is_odd(root) && !self.touches_boundary(root)
    }

    pub fn set_size(&mut self, i: usize) -> usize {
        let root = self.find(i);
        self.size[root]
    }
}
