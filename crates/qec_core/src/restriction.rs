//! Restricted-lattice decoding for three-colorable codes.
//!
//! A color-code qubit flips up to three checks, one of each color, so a
//! sector is a hypergraph rather than a graph. It is decoded through two
//! ordinary graphs instead: the lattice restricted to colors {0, 1} and the
//! lattice restricted to colors {0, 2}. A graph decoder pairs up the defects
//! of each restricted lattice, and the two chains are lifted back to qubits
//! around every color-0 vertex.
//!
//! Open boundaries are closed into a sphere. Each color gets one virtual
//! vertex standing for its boundary, a qubit missing a color is attached to
//! that color's virtual vertex, and one extra triangle joins the three
//! virtual vertices. Every qubit is then a triangle with one vertex of each
//! color. The virtual vertices carry no measured syndrome; their values are
//! fixed by the parity of the real defects of each color, up to one global
//! flip, and both choices are decoded.

use crate::bit_utils::{self, Bits};
use crate::code::CheckMatrix;
use crate::decoder::{Chain, ChainDecoder, DecodeStatus, SectorResult};
use crate::graph::DecodingGraph;
use crate::{QecError, QecResult, gf2};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

const UNSET: usize = usize::MAX;

/// One face of the closed complex: a vertex per color, and the qubit it
/// stands for (`None` for the face joining the virtual vertices).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Triangle {
    by_color: [usize; 3],
    qubit: Option<usize>,
}

/// The lattice restricted to color 0 and one other color.
#[derive(Debug, Clone)]
struct RestrictedLattice {
    graph: DecodingGraph,
    /// `(color-0 vertex, other vertex)` of every edge.
    endpoints: Vec<(usize, usize)>,
}

impl RestrictedLattice {
    fn build(triangles: &[Triangle], num_vertices: usize, other: usize) -> Self {
        let pairs: BTreeSet<(usize, usize)> = triangles
            .iter()
            .map(|t| (t.by_color[0], t.by_color[other]))
            .collect();
        let mut graph = DecodingGraph::new(num_vertices);
        let mut endpoints = Vec::with_capacity(pairs.len());
        for (red, v) in pairs {
            graph.add_edge(red, v, 1);
            endpoints.push((red, v));
        }
        graph.build_adjacency();
        Self { graph, endpoints }
    }
}

/// Closed color complex of one sector with its two restricted lattices.
#[derive(Debug, Clone)]
pub struct ColorLattice {
    num_checks: usize,
    num_qubits: usize,
    /// Color of every vertex: the checks, then one virtual vertex per color.
    colors: Vec<u8>,
    triangles: Vec<Triangle>,
    /// Triangles around each vertex, indexed by vertex; filled for color 0.
    stars: Vec<Vec<usize>>,
    restricted: [RestrictedLattice; 2],
}

impl ColorLattice {
    /// Builds the complex from a sector's checks and their three-coloring.
    ///
    /// Fails if a qubit touches two checks of one color or no check at all.
    pub(crate) fn build(checks: &CheckMatrix, colors: &[u8]) -> Result<Self, String> {
        let m = checks.num_checks();
        let n = checks.num_qubits();
        if colors.len() != m {
            return Err(format!("{} colors given for {m} checks", colors.len()));
        }
        if let Some(c) = colors.iter().position(|&c| c > 2) {
            return Err(format!("check {c} has color {}, expected 0..3", colors[c]));
        }

        let mut triangles = Vec::with_capacity(n + 1);
        for q in 0..n {
            let mut by_color = [UNSET; 3];
            for &c in checks.qubit_checks(q) {
                let color = colors[c] as usize;
                if by_color[color] != UNSET {
                    return Err(format!("qubit {q} touches two checks of color {color}"));
                }
                by_color[color] = c;
            }
            if by_color.iter().all(|&v| v == UNSET) {
                return Err(format!("qubit {q} touches no checks"));
            }
            for (color, v) in by_color.iter_mut().enumerate() {
                if *v == UNSET {
                    *v = m + color;
                }
            }
            triangles.push(Triangle {
                by_color,
                qubit: Some(q),
            });
        }
        triangles.push(Triangle {
            by_color: [m, m + 1, m + 2],
            qubit: None,
        });

        let num_vertices = m + 3;
        let mut stars = vec![Vec::new(); num_vertices];
        for (t, tri) in triangles.iter().enumerate() {
            stars[tri.by_color[0]].push(t);
        }
        let restricted = [1, 2].map(|other| RestrictedLattice::build(&triangles, num_vertices, other));

        let mut vertex_colors = colors.to_vec();
        vertex_colors.extend([0, 1, 2]);
        Ok(Self {
            num_checks: m,
            num_qubits: n,
            colors: vertex_colors,
            triangles,
            stars,
            restricted,
        })
    }

    /// Graph of the lattice restricted to colors {0, 1} (`slot` 0) or
    /// {0, 2} (`slot` 1).
    pub fn restricted_graph(&self, slot: usize) -> &DecodingGraph {
        &self.restricted[slot].graph
    }

    /// Decodes the real defects of one sector with `inner` on both
    /// restricted lattices and lifts the result to a qubit correction.
    pub(crate) fn decode<D: ChainDecoder>(
        &self,
        inner: &D,
        defects: &[usize],
    ) -> QecResult<SectorResult> {
        let mut parity = [false; 3];
        for &d in defects {
            parity[self.colors[d] as usize] ^= true;
        }
        // Each restricted lattice sees an even number of defects once the
        // virtual vertices are set; the remaining freedom is a global flip.
        let even = [false, parity[0] ^ parity[1], parity[0] ^ parity[2]];
        let flipped = even.map(|b| !b);

        let first = self.decode_with_virtual(inner, defects, even)?;
        let second = self.decode_with_virtual(inner, defects, flipped)?;
        let (w1, w2) = (first.correction.count_ones(), second.correction.count_ones());
        trace!(first = w1, second = w2, "restricted lattice candidates");
        let take_second = (second.status, w2) < (first.status, w1);
        Ok(if take_second { second } else { first })
    }

    fn decode_with_virtual<D: ChainDecoder>(
        &self,
        inner: &D,
        defects: &[usize],
        virtual_defects: [bool; 3],
    ) -> QecResult<SectorResult> {
        let mut chains: Vec<Chain> = Vec::with_capacity(2);
        for (slot, other) in [1usize, 2].into_iter().enumerate() {
            let mut restricted: Vec<usize> = defects
                .iter()
                .copied()
                .filter(|&d| {
                    let color = self.colors[d] as usize;
                    color == 0 || color == other
                })
                .collect();
            if virtual_defects[0] {
                restricted.push(self.num_checks);
            }
            if virtual_defects[other] {
                restricted.push(self.num_checks + other);
            }
            chains.push(inner.decode_chain(&self.restricted[slot].graph, &restricted));
        }

        let mut incident: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (slot, chain) in chains.iter().enumerate() {
            for &e in &chain.edges {
                let (red, v) = self.restricted[slot].endpoints[e];
                incident.entry(red).or_default().push(v);
            }
        }

        let mut correction = bit_utils::zeros(self.num_qubits);
        for (red, others) in incident {
            let lifted = self.lift(red, &others).ok_or_else(|| QecError::InternalFault {
                decoder: inner.kind(),
                detail: format!("restricted chains cannot be lifted at vertex {red}"),
            })?;
            for t in lifted {
                if let Some(q) = self.triangles[t].qubit {
                    let flipped = !correction[q];
                    correction.set(q, flipped);
                }
            }
        }

        let mut chains = chains.into_iter();
        let (Some(a), Some(b)) = (chains.next(), chains.next()) else {
            return Err(QecError::InternalFault {
                decoder: inner.kind(),
                detail: "missing restricted chain".into(),
            });
        };
        let status: DecodeStatus = a.status.max(b.status);
        Ok(SectorResult {
            correction,
            status,
            diagnostics: a.diagnostics.merge(b.diagnostics),
        })
    }

    /// Chooses the triangles around color-0 vertex `red` whose boundary
    /// inside the star is exactly the chain edges `red -> others`.
    ///
    /// Among all solutions the one with fewest qubits wins. Returns `None`
    /// if no set of triangles has that boundary.
    fn lift(&self, red: usize, others: &[usize]) -> Option<Vec<usize>> {
        let star = &self.stars[red];
        let mut link: Vec<usize> = star
            .iter()
            .flat_map(|&t| {
                let tri = &self.triangles[t];
                [tri.by_color[1], tri.by_color[2]]
            })
            .collect();
        link.sort_unstable();
        link.dedup();
        let position = |v: usize| link.binary_search(&v).ok();

        let mut columns: Vec<Bits> = Vec::with_capacity(star.len());
        for &t in star {
            let tri = &self.triangles[t];
            let mut col = bit_utils::zeros(link.len());
            for v in [tri.by_color[1], tri.by_color[2]] {
                col.set(position(v)?, true);
            }
            columns.push(col);
        }
        let mut rhs = bit_utils::zeros(link.len());
        for &v in others {
            let p = position(v)?;
            let flipped = !rhs[p];
            rhs.set(p, flipped);
        }
        let weights: Vec<usize> = star
            .iter()
            .map(|&t| usize::from(self.triangles[t].qubit.is_some()))
            .collect();
        let chosen = gf2::solve_min_weight(&columns, &rhs, &weights)?;
        Some(chosen.iter_ones().map(|j| star[j]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Sector, build_code};
    use crate::graph::SectorGraph;
    use qec_common::family::CodeFamily;

    fn lattice(d: usize) -> ColorLattice {
        let code = build_code(CodeFamily::Color, d).unwrap();
        match code.sector(Sector::X).graph() {
            Some(SectorGraph::Restricted(l)) => (**l).clone(),
            other => panic!("expected restricted lattice, got {other:?}"),
        }
    }

    #[test]
    fn every_edge_bounds_two_triangles() {
        for d in [3, 5, 7] {
            let l = lattice(d);
            let mut count: BTreeMap<(usize, usize), usize> = BTreeMap::new();
            for tri in &l.triangles {
                let [a, b, c] = tri.by_color;
                for (u, v) in [(a, b), (a, c), (b, c)] {
                    *count.entry((u.min(v), u.max(v))).or_default() += 1;
                }
            }
            assert!(count.values().all(|&c| c == 2), "d = {d}");
        }
    }

    #[test]
    fn steane_lattice_shape() {
        let l = lattice(3);
        assert_eq!(l.triangles.len(), 8);
        assert_eq!(l.colors.len(), 6);
        for slot in 0..2 {
            let g = l.restricted_graph(slot);
            assert_eq!(g.num_nodes(), 6);
            assert_eq!(g.boundary(), None);
        }
    }

    #[test]
    fn lift_of_empty_chain_is_empty() {
        let l = lattice(5);
        let red = l.colors.iter().position(|&c| c == 0).unwrap();
        assert_eq!(l.lift(red, &[]), Some(Vec::new()));
    }

    #[test]
    fn lift_recovers_single_triangle() {
        let l = lattice(5);
        let (t, tri) = l
            .triangles
            .iter()
            .enumerate()
            .find(|(_, tri)| tri.by_color.iter().all(|&v| v < l.num_checks))
            .unwrap();
        let lifted = l.lift(tri.by_color[0], &[tri.by_color[1], tri.by_color[2]]).unwrap();
        assert_eq!(lifted, vec![t]);
    }

    #[test]
    fn rejects_repeated_color() {
        let checks = CheckMatrix::from_supports(2, vec![vec![0, 1], vec![0, 1]]);
        assert!(ColorLattice::build(&checks, &[0, 0]).is_err());
        assert!(ColorLattice::build(&checks, &[0]).is_err());
    }
}
