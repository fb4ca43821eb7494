//! Union-find decoder.
//!
//! Clusters start as single defects and grow half an edge per round along
//! every edge on their border. Clusters merge when an edge is fully grown,
//! and growth stops once every cluster holds an even number of defects or
//! touches the boundary. Each cluster's spanning forest is then peeled from
//! the leaves inward to produce the correction.

use crate::QecResult;
use crate::bit_utils;
use crate::code::StabilizerCode;
use crate::config::UnionFindConfig;
use crate::decoder::{
    self, Chain, ChainDecoder, DecodeOutcome, DecodeStatus, DecoderKind, Diagnostics,
};
use crate::dsu::ClusterForest;
use crate::graph::DecodingGraph;
use crate::pauli_frame::Syndrome;
use std::collections::{BTreeSet, VecDeque};
use tracing::trace;

const NO_EDGE: usize = usize::MAX;

/// Cluster-growth decoder with an optional cap on growth rounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionFindDecoder {
    /// Maximum growth rounds; `None` derives a cap from the graph size.
    pub max_rounds: Option<usize>,
}

impl UnionFindDecoder {
    pub fn new(config: &UnionFindConfig) -> Self {
        Self {
            max_rounds: config.max_rounds,
        }
    }

    fn round_cap(&self, graph: &DecodingGraph) -> usize {
        self.max_rounds.unwrap_or_else(|| {
            let max_w = graph.max_edge_weight().max(1) as usize;
            2 * max_w * graph.num_nodes().max(1)
        })
    }
}

impl ChainDecoder for UnionFindDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::UnionFind
    }

    fn decode_chain(&self, graph: &DecodingGraph, defects: &[usize]) -> Chain {
        let n = graph.num_nodes();
        let edges = graph.edges();
        let mut forest = ClusterForest::new(n);
        if let Some(b) = graph.boundary() {
            forest.mark_boundary(b);
        }
        for &d in defects {
            forest.toggle_parity(d);
        }

        let cap = self.round_cap(graph);
        let mut support = vec![0u32; edges.len()];
        let mut grown = bit_utils::zeros(edges.len());
        let mut rounds = 0;
        let status = loop {
            let any_active = defects.iter().any(|&d| {
                let root = forest.find(d);
                forest.is_active(root)
            });
            if !any_active {
                break DecodeStatus::Converged;
            }
            if rounds >= cap {
                break DecodeStatus::NonConverged;
            }
            rounds += 1;

            // Activity is read before any merge of this round.
            let mut fused = Vec::new();
            let mut grew = false;
            for (id, e) in edges.iter().enumerate() {
                if grown[id] {
                    continue;
                }
                let (ru, rv) = (forest.find(e.u), forest.find(e.v));
                if ru == rv {
                    continue;
                }
                let step = u32::from(forest.is_active(ru)) + u32::from(forest.is_active(rv));
                if step == 0 {
                    continue;
                }
                grew = true;
                support[id] += step;
                if support[id] >= 2 * e.weight {
                    fused.push(id);
                }
            }
            if !grew {
                break DecodeStatus::Unsatisfiable;
            }
            for id in fused {
                grown.set(id, true);
                forest.union(edges[id].u, edges[id].v);
            }
        };
        trace!(rounds, ?status, "cluster growth finished");

        let toggled = peel(graph, &grown, defects);
        let clusters: BTreeSet<usize> = defects.iter().map(|&d| forest.find(d)).collect();
        Chain {
            edges: decoder::odd_edges(&toggled),
            status,
            diagnostics: Diagnostics::UnionFind {
                defects: defects.len(),
                growth_rounds: rounds,
                clusters: clusters.len(),
                grown_edges: grown.count_ones(),
            },
        }
    }
}

/// Peels a spanning forest of the grown edges.
///
/// Trees are rooted at the boundary when they contain it. Walking leaves
/// first, a node still carrying a defect hands it to its parent through the
/// connecting edge, which joins the correction.
fn peel(graph: &DecodingGraph, grown: &bit_utils::Bits, defects: &[usize]) -> bit_utils::Bits {
    let n = graph.num_nodes();
    let mut toggled = bit_utils::zeros(graph.edges().len());
    let mut marked = bit_utils::zeros(n);
    for &d in defects {
        let flipped = !marked[d];
        marked.set(d, flipped);
    }

    let mut visited = bit_utils::zeros(n);
    let mut parent_edge = vec![NO_EDGE; n];
    let mut order = Vec::new();
    let mut queue = VecDeque::new();
    let roots = graph.boundary().into_iter().chain(0..n);
    for root in roots {
        if visited[root] {
            continue;
        }
        visited.set(root, true);
        queue.push_back(root);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &(next, edge) in graph.neighbours(node) {
                if grown[edge] && !visited[next] {
                    visited.set(next, true);
                    parent_edge[next] = edge;
                    queue.push_back(next);
                }
            }
        }
    }

    for &node in order.iter().rev() {
        let edge = parent_edge[node];
        if edge == NO_EDGE || !marked[node] {
            continue;
        }
        marked.set(node, false);
        toggled.set(edge, true);
        let up = graph.edge(edge).other(node);
        let flipped = !marked[up];
        marked.set(up, flipped);
    }
    toggled
}

/// Decodes `syndrome` with the default round cap.
pub fn decode_union_find(code: &StabilizerCode, syndrome: &Syndrome) -> QecResult<DecodeOutcome> {
    decode_union_find_with(code, syndrome, &UnionFindConfig::default())
}

/// Decodes `syndrome` on a graph-decodable code by cluster growth.
pub fn decode_union_find_with(
    code: &StabilizerCode,
    syndrome: &Syndrome,
    config: &UnionFindConfig,
) -> QecResult<DecodeOutcome> {
    let kind = DecoderKind::UnionFind;
    kind.ensure_supports(code)?;
    let inner = UnionFindDecoder::new(config);
    decoder::run_sectors(kind, code, syndrome, |sector, part| {
        decoder::decode_graph_sector(&inner, code, sector, part)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize) -> DecodingGraph {
        let mut g = DecodingGraph::new(n);
        for i in 0..n {
            g.add_edge(i, (i + 1) % n, 1);
        }
        g.build_adjacency();
        g
    }

    fn line_with_boundary(n: usize) -> DecodingGraph {
        let mut g = DecodingGraph::new(n + 1);
        g.add_edge(n, 0, 1);
        for i in 0..n - 1 {
            g.add_edge(i, i + 1, 1);
        }
        g.add_edge(n - 1, n, 1);
        g.set_boundary(n);
        g.build_adjacency();
        g
    }

    #[test]
    fn neighbouring_defects_share_one_edge() {
        let g = ring(8);
        let chain = UnionFindDecoder::default().decode_chain(&g, &[3, 4]);
        assert_eq!(chain.status, DecodeStatus::Converged);
        assert_eq!(chain.edges, vec![3]);
    }

    #[test]
    fn boundary_absorbs_a_lone_defect() {
        let g = line_with_boundary(5);
        let chain = UnionFindDecoder::default().decode_chain(&g, &[0]);
        assert_eq!(chain.status, DecodeStatus::Converged);
        assert_eq!(chain.edges, vec![0]);
    }

    #[test]
    fn odd_defects_on_a_ring_are_unsatisfiable() {
        let g = ring(6);
        let chain = UnionFindDecoder::default().decode_chain(&g, &[0, 2, 4]);
        assert_eq!(chain.status, DecodeStatus::Unsatisfiable);
    }

    #[test]
    fn round_cap_reports_non_convergence() {
        let g = ring(20);
        let decoder = UnionFindDecoder {
            max_rounds: Some(1),
        };
        let chain = decoder.decode_chain(&g, &[0, 10]);
        assert_eq!(chain.status, DecodeStatus::NonConverged);
    }

    #[test]
    fn peeled_chain_has_defects_as_boundary() {
        let g = ring(12);
        let defects = [1, 4, 6, 11];
        let chain = UnionFindDecoder::default().decode_chain(&g, &defects);
        assert_eq!(chain.status, DecodeStatus::Converged);
        let mut degree = vec![0usize; 12];
        for &e in &chain.edges {
            let edge = g.edge(e);
            degree[edge.u] += 1;
            degree[edge.v] += 1;
        }
        let odd: Vec<usize> = (0..12).filter(|&v| degree[v] % 2 == 1).collect();
        assert_eq!(odd, defects);
    }
}
