//! Minimum-weight perfect matching decoder.
//!
//! Defects are paired through shortest paths in the decoding graph. Each
//! defect may instead be matched to the boundary through its own virtual
//! partner; virtual partners pair among themselves at no cost, so any number
//! of defects can end on the boundary. The matching itself is solved exactly
//! by [`crate::blossom`].

use crate::blossom;
use crate::bit_utils;
use crate::code::StabilizerCode;
use crate::decoder::{
    self, Chain, ChainDecoder, DecodeOutcome, DecodeStatus, DecoderKind, Diagnostics,
};
use crate::graph::DecodingGraph;
use crate::pauli_frame::Syndrome;
use crate::QecResult;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::trace;

const UNREACHABLE: u64 = u64::MAX;
const NO_EDGE: usize = usize::MAX;

/// Single-source shortest paths.
#[derive(Debug, Clone)]
pub(crate) struct ShortestPaths {
    source: usize,
    dist: Vec<u64>,
    /// Edge used to reach each node on its shortest path.
    via: Vec<usize>,
}

impl ShortestPaths {
    /// Dijkstra from `source`. Ties settle in node order and the first
    /// predecessor found is kept, so paths are deterministic.
    pub(crate) fn compute(graph: &DecodingGraph, source: usize) -> Self {
        let n = graph.num_nodes();
        let mut dist = vec![UNREACHABLE; n];
        let mut via = vec![NO_EDGE; n];
        let mut heap = BinaryHeap::new();
        dist[source] = 0;
        heap.push(Reverse((0u64, source)));
        while let Some(Reverse((d, node))) = heap.pop() {
            if d > dist[node] {
                continue;
            }
            for &(next, edge) in graph.neighbours(node) {
                let nd = d + u64::from(graph.edge(edge).weight);
                if nd < dist[next] {
                    dist[next] = nd;
                    via[next] = edge;
                    heap.push(Reverse((nd, next)));
                }
            }
        }
        Self { source, dist, via }
    }

    pub(crate) fn distance(&self, node: usize) -> Option<u64> {
        (self.dist[node] != UNREACHABLE).then_some(self.dist[node])
    }

    /// Toggles every edge on the path from the source to `target`.
    fn toggle_path(&self, graph: &DecodingGraph, target: usize, toggled: &mut bit_utils::Bits) {
        let mut node = target;
        while node != self.source {
            let edge = self.via[node];
            if edge == NO_EDGE {
                return;
            }
            let flipped = !toggled[edge];
            toggled.set(edge, flipped);
            node = graph.edge(edge).other(node);
        }
    }
}

/// Exact matching decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MwpmDecoder;

impl ChainDecoder for MwpmDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Mwpm
    }

    fn decode_chain(&self, graph: &DecodingGraph, defects: &[usize]) -> Chain {
        let k = defects.len();
        let paths: Vec<ShortestPaths> = defects
            .iter()
            .map(|&d| ShortestPaths::compute(graph, d))
            .collect();
        let boundary_dist: Vec<Option<u64>> = match graph.boundary() {
            Some(b) => paths.iter().map(|p| p.distance(b)).collect(),
            None => vec![None; k],
        };

        // Defect graph: defects are 0..k, boundary partners k..2k, and the
        // ghost (odd count without a boundary) is node k.
        let mut edges: Vec<(usize, usize, u64)> = Vec::new();
        for i in 0..k {
            for j in i + 1..k {
                let Some(dij) = paths[i].distance(defects[j]) else {
                    continue;
                };
                if let (Some(bi), Some(bj)) = (boundary_dist[i], boundary_dist[j]) {
                    if dij > bi + bj {
                        continue;
                    }
                }
                edges.push((i, j, dij));
            }
        }
        let has_boundary = graph.boundary().is_some();
        let ghost = (!has_boundary && k % 2 == 1).then_some(k);
        let num_nodes = if has_boundary {
            for (i, bd) in boundary_dist.iter().enumerate() {
                if let Some(bi) = *bd {
                    edges.push((i, k + i, bi));
                }
            }
            for i in 0..k {
                for j in i + 1..k {
                    edges.push((k + i, k + j, 0));
                }
            }
            2 * k
        } else if let Some(ghost) = ghost {
            for i in 0..k {
                let nearest = (0..k)
                    .filter(|&j| j != i)
                    .filter_map(|j| paths[i].distance(defects[j]))
                    .min();
                if let Some(w) = nearest {
                    edges.push((i, ghost, w));
                }
            }
            k + 1
        } else {
            k
        };
        edges.sort_unstable_by_key(|&(u, v, _)| (u, v));

        let max_w = edges.iter().map(|e| e.2).max().unwrap_or(0) as i64;
        let offset = max_w + 1;
        let weighted: Vec<(usize, usize, i64)> = edges
            .iter()
            .map(|&(u, v, w)| (u, v, 2 * (offset - w as i64)))
            .collect();
        let mates = blossom::max_weight_matching(num_nodes, &weighted, true);

        let mut toggled = bit_utils::zeros(graph.edges().len());
        let mut status = DecodeStatus::Converged;
        let mut matched_pairs = 0;
        let mut boundary_matches = 0;
        let mut matching_weight = 0u64;
        for i in 0..k {
            let Some(j) = mates[i] else {
                trace!(defect = defects[i], "defect left unmatched");
                status = DecodeStatus::Unsatisfiable;
                continue;
            };
            if Some(j) == ghost {
                status = DecodeStatus::Unsatisfiable;
                continue;
            }
            if j < k {
                if j < i {
                    continue;
                }
                paths[i].toggle_path(graph, defects[j], &mut toggled);
                matching_weight += paths[i].distance(defects[j]).unwrap_or(0);
                matched_pairs += 1;
            } else if let Some(b) = graph.boundary() {
                paths[i].toggle_path(graph, b, &mut toggled);
                matching_weight += boundary_dist[i].unwrap_or(0);
                matched_pairs += 1;
                boundary_matches += 1;
            }
        }

        Chain {
            edges: decoder::odd_edges(&toggled),
            status,
            diagnostics: Diagnostics::Mwpm {
                defects: k,
                matched_pairs,
                boundary_matches,
                matching_weight,
            },
        }
    }
}

/// Decodes `syndrome` on a graph-decodable code by exact matching.
pub fn decode_mwpm(code: &StabilizerCode, syndrome: &Syndrome) -> QecResult<DecodeOutcome> {
    let kind = DecoderKind::Mwpm;
    kind.ensure_supports(code)?;
    decoder::run_sectors(kind, code, syndrome, |sector, part| {
        decoder::decode_graph_sector(&MwpmDecoder, code, sector, part)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize, boundary_ends: bool) -> DecodingGraph {
        // Nodes 0..n in a line; node n is the boundary at both ends.
        let mut g = DecodingGraph::new(n);
        for i in 0..n - 1 {
            g.add_edge(i, i + 1, 1);
        }
        if boundary_ends {
            g.add_edge(0, n, 1);
            g.add_edge(n - 1, n, 1);
            g.set_boundary(n);
        }
        g.build_adjacency();
        g
    }

    #[test]
    fn dijkstra_distances_on_a_line() {
        let g = path_graph(5, false);
        let sp = ShortestPaths::compute(&g, 1);
        assert_eq!(sp.distance(4), Some(3));
        assert_eq!(sp.distance(1), Some(0));
    }

    #[test]
    fn adjacent_defects_pair_up() {
        let g = path_graph(6, true);
        let chain = MwpmDecoder.decode_chain(&g, &[2, 3]);
        assert_eq!(chain.status, DecodeStatus::Converged);
        assert_eq!(chain.edges, vec![2]);
    }

    #[test]
    fn lone_defect_goes_to_nearest_boundary() {
        let g = path_graph(6, true);
        let chain = MwpmDecoder.decode_chain(&g, &[4]);
        assert_eq!(chain.status, DecodeStatus::Converged);
        // Edge 4 joins 4-5, edge 6 joins 5 to the boundary.
        assert_eq!(chain.edges, vec![4, 6]);
        match chain.diagnostics {
            Diagnostics::Mwpm {
                boundary_matches, ..
            } => assert_eq!(boundary_matches, 1),
            other => panic!("unexpected diagnostics {other:?}"),
        }
    }

    #[test]
    fn distant_defects_prefer_the_boundary() {
        let g = path_graph(8, true);
        let chain = MwpmDecoder.decode_chain(&g, &[0, 7]);
        assert_eq!(chain.status, DecodeStatus::Converged);
        assert_eq!(chain.edges.len(), 2);
    }

    #[test]
    fn odd_defects_without_boundary_are_unsatisfiable() {
        let g = path_graph(5, false);
        let chain = MwpmDecoder.decode_chain(&g, &[0, 2, 4]);
        assert_eq!(chain.status, DecodeStatus::Unsatisfiable);
    }

    #[test]
    fn no_defects_no_chain() {
        let g = path_graph(4, true);
        let chain = MwpmDecoder.decode_chain(&g, &[]);
        assert!(chain.edges.is_empty());
        assert_eq!(chain.status, DecodeStatus::Converged);
    }
}
