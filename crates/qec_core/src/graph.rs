//! Decoding graphs for the matching and union-find decoders.
//!
//! A [`DecodingGraph`] is a weighted undirected graph over detector nodes.
//! For surface and toric codes every qubit flips at most two checks of a
//! sector, so the sector itself is such a graph: nodes are checks plus one
//! boundary node, and each qubit is an edge. Color-code qubits flip three
//! checks and are decoded through two restricted lattices instead (see
//! [`crate::restriction`]). Both cases are wrapped in [`SectorGraph`].

use crate::code::CheckMatrix;
use crate::restriction::ColorLattice;
use std::collections::BTreeMap;

/// Undirected edge between two graph nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub u: usize,
    pub v: usize,

    /// Integer cost of using this edge; the number of qubits it flips.
    pub weight: u32,
}

impl Edge {
    /// The endpoint opposite `node`.
    #[inline]
    pub fn other(&self, node: usize) -> usize {
        if self.u == node { self.v } else { self.u }
    }
}

/// Weighted graph over detector nodes.
///
/// Edge ids are positions in [`DecodingGraph::edges`]; decoders report their
/// output as a set of edge ids (a chain) and the owner of the graph maps the
/// chain back to qubits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodingGraph {
    edges: Vec<Edge>,

    /// Per node, the incident `(neighbour, edge id)` pairs in edge order.
    adjacency: Vec<Vec<(usize, usize)>>,

    /// Node that absorbs any number of defects, if the graph has one.
    boundary: Option<usize>,

    max_weight: u32,
}

impl DecodingGraph {
    /// Empty graph over `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new(); num_nodes],
            boundary: None,
            max_weight: 0,
        }
    }

    /// Adds an edge and returns its id.
    ///
    /// Nodes beyond the current size grow the graph.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: u32) -> usize {
        let max_idx = u.max(v);
        if max_idx >= self.adjacency.len() {
            self.adjacency.resize(max_idx + 1, Vec::new());
        }
        let id = self.edges.len();
        self.edges.push(Edge { u, v, weight });
        self.max_weight = self.max_weight.max(weight);
        id
    }

    /// Rebuilds the adjacency lists from the edge list.
    pub fn build_adjacency(&mut self) {
        for list in &mut self.adjacency {
            list.clear();
        }
        for (id, e) in self.edges.iter().enumerate() {
            self.adjacency[e.u].push((e.v, id));
            self.adjacency[e.v].push((e.u, id));
        }
    }

    /// Marks `node` as the boundary.
    pub fn set_boundary(&mut self, node: usize) {
        if node >= self.adjacency.len() {
            self.adjacency.resize(node + 1, Vec::new());
        }
        self.boundary = Some(node);
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: usize) -> &Edge {
        &self.edges[id]
    }

    pub fn neighbours(&self, node: usize) -> &[(usize, usize)] {
        &self.adjacency[node]
    }

    pub fn boundary(&self) -> Option<usize> {
        self.boundary
    }

    /// Heaviest edge weight, `0` for an edgeless graph.
    pub fn max_edge_weight(&self) -> u32 {
        self.max_weight
    }
}

/// Sector graph whose edges are single qubits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QubitGraph {
    graph: DecodingGraph,

    /// Qubit flipped by each edge.
    edge_qubit: Vec<usize>,
}

impl QubitGraph {
    /// Builds the graph of a sector whose qubits touch one or two checks.
    ///
    /// Nodes `0..m` are the checks; node `m` is the boundary when some qubit
    /// touches a single check. Parallel qubits keep the lowest index.
    fn build(checks: &CheckMatrix) -> Result<Self, String> {
        let m = checks.num_checks();
        let boundary = m;
        let mut mechanisms: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        let mut has_boundary = false;
        for q in 0..checks.num_qubits() {
            let key = match *checks.qubit_checks(q) {
                [] => continue,
                [c] => {
                    has_boundary = true;
                    (c, boundary)
                }
                [a, b] => (a, b),
                ref other => {
                    return Err(format!(
                        "qubit {q} touches {} checks; not a graph-like sector",
                        other.len()
                    ));
                }
            };
            mechanisms.entry(key).or_insert(q);
        }

        let mut graph = DecodingGraph::new(if has_boundary { m + 1 } else { m });
        if has_boundary {
            graph.set_boundary(boundary);
        }
        let mut edge_qubit = Vec::with_capacity(mechanisms.len());
        for ((u, v), q) in mechanisms {
            graph.add_edge(u, v, 1);
            edge_qubit.push(q);
        }
        graph.build_adjacency();
        Ok(Self { graph, edge_qubit })
    }

    pub fn graph(&self) -> &DecodingGraph {
        &self.graph
    }

    pub fn edge_qubit(&self, edge: usize) -> usize {
        self.edge_qubit[edge]
    }
}

/// Graph structure used by the graph decoders for one sector.
#[derive(Debug, Clone)]
pub enum SectorGraph {
    /// Qubits are edges between at most two checks.
    Qubits(QubitGraph),
    /// Three-colorable sector decoded on restricted lattices.
    Restricted(Box<ColorLattice>),
}

impl SectorGraph {
    /// Builds the sector graph. `colors` selects the restricted-lattice form.
    pub(crate) fn build(checks: &CheckMatrix, colors: Option<&[u8]>) -> Result<Self, String> {
        match colors {
            Some(colors) => Ok(SectorGraph::Restricted(Box::new(ColorLattice::build(
                checks, colors,
            )?))),
            None => Ok(SectorGraph::Qubits(QubitGraph::build(checks)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repetition_code_graph() {
        // Three-qubit repetition code: two checks, two boundary qubits.
        let checks = CheckMatrix::from_supports(3, vec![vec![0, 1], vec![1, 2]]);
        let qg = QubitGraph::build(&checks).unwrap();
        let g = qg.graph();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.boundary(), Some(2));
        assert_eq!(g.edges().len(), 3);
        // Edge order follows the sorted (u, v) keys.
        assert_eq!(g.edge(0), &Edge { u: 0, v: 1, weight: 1 });
        assert_eq!(qg.edge_qubit(0), 1);
        assert_eq!(qg.edge_qubit(1), 0);
        assert_eq!(qg.edge_qubit(2), 2);
        assert_eq!(g.neighbours(1).len(), 2);
    }

    #[test]
    fn parallel_qubits_keep_the_first() {
        let checks = CheckMatrix::from_supports(3, vec![vec![0, 1, 2], vec![1, 2]]);
        let qg = QubitGraph::build(&checks).unwrap();
        assert_eq!(qg.graph().edges().len(), 2);
        assert_eq!(qg.edge_qubit(0), 1);
    }

    #[test]
    fn hyperedges_are_rejected() {
        let checks = CheckMatrix::from_supports(1, vec![vec![0], vec![0], vec![0]]);
        assert!(QubitGraph::build(&checks).is_err());
    }

    #[test]
    fn boundary_grows_graph() {
        let mut g = DecodingGraph::new(2);
        g.set_boundary(4);
        g.add_edge(0, 4, 3);
        g.build_adjacency();
        assert_eq!(g.num_nodes(), 5);
        assert_eq!(g.max_edge_weight(), 3);
        assert_eq!(g.edge(0).other(4), 0);
    }
}
