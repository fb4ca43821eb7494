//! Decoder dispatch and the shared decode pipeline.
//!
//! Every decoder runs per CSS sector: the full syndrome is split, each part is
//! decoded independently, and the two sector corrections are combined into
//! one [`Correction`]. Corrections reported as converged are re-checked
//! against the syndrome before they leave this module.

use crate::bit_utils::{self, Bits};
use crate::code::{CodeSector, Sector, StabilizerCode};
use crate::config::EngineConfig;
use crate::graph::{DecodingGraph, SectorGraph};
use crate::pauli_frame::{Correction, ErrorPattern, PauliFrame, Syndrome};
use crate::{QecError, QecResult, bp, lookup, mwpm, union_find};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Available decoding algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderKind {
    /// Minimum-weight perfect matching.
    Mwpm,
    /// Cluster growth with peeling.
    UnionFind,
    /// Precomputed minimum-weight table.
    Lookup,
    /// Normalized min-sum belief propagation.
    BpMinSum,
}

impl DecoderKind {
    pub const ALL: [DecoderKind; 4] = [
        DecoderKind::Mwpm,
        DecoderKind::UnionFind,
        DecoderKind::Lookup,
        DecoderKind::BpMinSum,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            DecoderKind::Mwpm => "mwpm",
            DecoderKind::UnionFind => "union_find",
            DecoderKind::Lookup => "lookup",
            DecoderKind::BpMinSum => "bp_min_sum",
        }
    }

    /// True if this decoder can run on `code` as built.
    pub fn supports(self, code: &StabilizerCode) -> bool {
        match self {
            DecoderKind::Mwpm | DecoderKind::UnionFind => Sector::BOTH
                .into_iter()
                .all(|s| code.sector(s).graph().is_some()),
            DecoderKind::Lookup => Sector::BOTH
                .into_iter()
                .all(|s| code.sector(s).lookup().is_some()),
            DecoderKind::BpMinSum => true,
        }
    }

    pub(crate) fn ensure_supports(self, code: &StabilizerCode) -> QecResult<()> {
        if self.supports(code) {
            Ok(())
        } else {
            Err(QecError::DecoderUnsupported {
                decoder: self,
                family: code.family(),
            })
        }
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error for decoder names that match no [`DecoderKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown decoder '{0}' (expected mwpm, union_find, lookup or bp_min_sum)")]
pub struct UnknownDecoder(pub String);

impl FromStr for DecoderKind {
    type Err = UnknownDecoder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "mwpm" | "matching" => Ok(DecoderKind::Mwpm),
            "union_find" | "uf" => Ok(DecoderKind::UnionFind),
            "lookup" | "table" => Ok(DecoderKind::Lookup),
            "bp_min_sum" | "bp" | "min_sum" => Ok(DecoderKind::BpMinSum),
            _ => Err(UnknownDecoder(s.to_string())),
        }
    }
}

/// How a decode run ended. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStatus {
    /// The correction reproduces the syndrome.
    Converged,
    /// An iteration or round cap was hit; the correction is best effort.
    NonConverged,
    /// No correction can reproduce the syndrome on this decoding structure.
    Unsatisfiable,
}

/// Per-decoder counters, summed over both sectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decoder", rename_all = "snake_case")]
pub enum Diagnostics {
    Mwpm {
        defects: usize,
        matched_pairs: usize,
        boundary_matches: usize,
        matching_weight: u64,
    },
    UnionFind {
        defects: usize,
        growth_rounds: usize,
        clusters: usize,
        grown_edges: usize,
    },
    Lookup {
        defects: usize,
        table_entries: usize,
        correction_weight: usize,
    },
    BeliefPropagation {
        initial_syndrome_weight: usize,
        iterations: usize,
        residual_syndrome_weight: usize,
    },
}

impl Diagnostics {
    /// Combines the counters of two runs of the same decoder. Counts add up;
    /// round and iteration counts keep the larger value.
    pub fn merge(self, other: Diagnostics) -> Diagnostics {
        use Diagnostics::*;
        match (self, other) {
            (
                Mwpm {
                    defects: a,
                    matched_pairs: b,
                    boundary_matches: c,
                    matching_weight: d,
                },
                Mwpm {
                    defects: e,
                    matched_pairs: f,
                    boundary_matches: g,
                    matching_weight: h,
                },
            ) => Mwpm {
                defects: a + e,
                matched_pairs: b + f,
                boundary_matches: c + g,
                matching_weight: d + h,
            },
            (
                UnionFind {
                    defects: a,
                    growth_rounds: b,
                    clusters: c,
                    grown_edges: d,
                },
                UnionFind {
                    defects: e,
                    growth_rounds: f,
                    clusters: g,
                    grown_edges: h,
                },
            ) => UnionFind {
                defects: a + e,
                growth_rounds: b.max(f),
                clusters: c + g,
                grown_edges: d + h,
            },
            (
                Lookup {
                    defects: a,
                    table_entries: b,
                    correction_weight: c,
                },
                Lookup {
                    defects: d,
                    table_entries: e,
                    correction_weight: f,
                },
            ) => Lookup {
                defects: a + d,
                table_entries: b + e,
                correction_weight: c + f,
            },
            (
                BeliefPropagation {
                    initial_syndrome_weight: a,
                    iterations: b,
                    residual_syndrome_weight: c,
                },
                BeliefPropagation {
                    initial_syndrome_weight: d,
                    iterations: e,
                    residual_syndrome_weight: f,
                },
            ) => BeliefPropagation {
                initial_syndrome_weight: a + d,
                iterations: b.max(e),
                residual_syndrome_weight: c + f,
            },
            (first, _) => first,
        }
    }
}

/// Result of decoding one syndrome.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutcome {
    pub decoder: DecoderKind,
    pub correction: Correction,
    pub status: DecodeStatus,
    /// Filled in by [`DecodeOutcome::evaluate`] once the true error is known.
    pub success: Option<bool>,
    pub diagnostics: Diagnostics,
    pub elapsed: Duration,
}

impl DecodeOutcome {
    /// Judges the correction against the error that produced the syndrome.
    ///
    /// Success means the residual `error * correction` has trivial syndrome
    /// and flips no logical operator. The verdict is also stored in
    /// [`DecodeOutcome::success`].
    pub fn evaluate(&mut self, code: &StabilizerCode, error: &ErrorPattern) -> QecResult<bool> {
        code.check_error_length(error)?;
        let residual = error.composed(&self.correction);
        let ok = code.is_trivial_residual(&residual);
        self.success = Some(ok);
        Ok(ok)
    }

    /// Turns a non-converged outcome into [`QecError::DecodeNonConvergence`],
    /// for callers that cannot use a best-effort correction.
    pub fn into_converged(self) -> QecResult<DecodeOutcome> {
        match self.status {
            DecodeStatus::Converged => Ok(self),
            status => Err(QecError::DecodeNonConvergence {
                decoder: self.decoder,
                detail: format!("{status:?} after {:?}", self.diagnostics),
            }),
        }
    }
}

/// Correction for a single sector.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SectorResult {
    pub correction: Bits,
    pub status: DecodeStatus,
    pub diagnostics: Diagnostics,
}

/// Edge set chosen by a graph decoder; every edge appears once.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub edges: Vec<usize>,
    pub status: DecodeStatus,
    pub diagnostics: Diagnostics,
}

/// Pairs up defects on a [`DecodingGraph`].
///
/// Implementations return a chain whose boundary (the nodes with odd degree
/// in the chain, ignoring the graph's boundary node) is the defect set when
/// the status is [`DecodeStatus::Converged`].
pub trait ChainDecoder {
    fn kind(&self) -> DecoderKind;

    fn decode_chain(&self, graph: &DecodingGraph, defects: &[usize]) -> Chain;
}

/// Collects the edges set in `toggled` into a chain edge list.
pub(crate) fn odd_edges(toggled: &Bits) -> Vec<usize> {
    toggled.iter_ones().collect()
}

/// Decodes one sector with a graph decoder.
pub(crate) fn decode_graph_sector<D: ChainDecoder>(
    decoder: &D,
    code: &StabilizerCode,
    sector: &CodeSector,
    part: &Bits,
) -> QecResult<SectorResult> {
    let graph = sector.graph().ok_or(QecError::DecoderUnsupported {
        decoder: decoder.kind(),
        family: code.family(),
    })?;
    let defects: Vec<usize> = part.iter_ones().collect();
    match graph {
        SectorGraph::Qubits(qubits) => {
            let chain = decoder.decode_chain(qubits.graph(), &defects);
            let mut correction = bit_utils::zeros(code.n());
            for e in chain.edges {
                let q = qubits.edge_qubit(e);
                let flipped = !correction[q];
                correction.set(q, flipped);
            }
            Ok(SectorResult {
                correction,
                status: chain.status,
                diagnostics: chain.diagnostics,
            })
        }
        SectorGraph::Restricted(lattice) => lattice.decode(decoder, &defects),
    }
}

/// Shared pipeline: validates and splits the syndrome, decodes each sector,
/// re-checks converged corrections and combines the result.
pub(crate) fn run_sectors<F>(
    kind: DecoderKind,
    code: &StabilizerCode,
    syndrome: &Syndrome,
    mut per_sector: F,
) -> QecResult<DecodeOutcome>
where
    F: FnMut(&CodeSector, &Bits) -> QecResult<SectorResult>,
{
    let start = Instant::now();
    let parts = code.split_syndrome(syndrome)?;
    let mut correction = PauliFrame::new(code.n());
    let mut status = DecodeStatus::Converged;
    let mut diagnostics: Option<Diagnostics> = None;

    for (sector, part) in Sector::BOTH.into_iter().zip(&parts) {
        let sec = code.sector(sector);
        let result = per_sector(sec, part)?;
        if result.status == DecodeStatus::Converged {
            let mut produced = sec.checks().syndrome(&result.correction);
            bit_utils::xor_into(&mut produced, part);
            let unsatisfied = produced.count_ones();
            if unsatisfied != 0 {
                warn!(decoder = %kind, %sector, unsatisfied, "converged correction misses syndrome");
                return Err(QecError::InternalFault {
                    decoder: kind,
                    detail: format!(
                        "{sector} sector correction leaves {unsatisfied} checks unsatisfied"
                    ),
                });
            }
        }
        *correction.sector_mut(sector) = result.correction;
        status = status.max(result.status);
        diagnostics = Some(match diagnostics {
            None => result.diagnostics,
            Some(d) => d.merge(result.diagnostics),
        });
    }

    let diagnostics = diagnostics.ok_or_else(|| QecError::InternalFault {
        decoder: kind,
        detail: "no sector was decoded".into(),
    })?;
    let elapsed = start.elapsed();
    debug!(
        decoder = %kind,
        defects = syndrome.weight(),
        ?status,
        correction_weight = correction.weight(),
        ?elapsed,
        "decoded"
    );
    Ok(DecodeOutcome {
        decoder: kind,
        correction,
        status,
        success: None,
        diagnostics,
        elapsed,
    })
}

/// Decodes `syndrome` on `code` with the selected decoder.
pub fn decode(
    kind: DecoderKind,
    code: &StabilizerCode,
    syndrome: &Syndrome,
    config: &EngineConfig,
) -> QecResult<DecodeOutcome> {
    match kind {
        DecoderKind::Mwpm => mwpm::decode_mwpm(code, syndrome),
        DecoderKind::UnionFind => {
            union_find::decode_union_find_with(code, syndrome, &config.union_find)
        }
        DecoderKind::Lookup => lookup::decode_lookup(code, syndrome),
        DecoderKind::BpMinSum => bp::decode_bp(code, syndrome, &config.bp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::build_code;
    use qec_common::family::CodeFamily;

    fn lookup_diagnostics() -> Diagnostics {
        Diagnostics::Lookup {
            defects: 0,
            table_entries: 0,
            correction_weight: 0,
        }
    }

    #[test]
    fn converged_correction_missing_its_syndrome_is_a_fault() {
        let code = build_code(CodeFamily::Surface, 3).unwrap();
        let syndrome = Syndrome::zeros(code.num_checks());
        // A single flip can never have a trivial syndrome on a distance-3 code.
        let result = run_sectors(DecoderKind::Lookup, &code, &syndrome, |_, _| {
            Ok(SectorResult {
                correction: bit_utils::from_indices(code.n(), &[4]),
                status: DecodeStatus::Converged,
                diagnostics: lookup_diagnostics(),
            })
        });
        assert!(matches!(
            result,
            Err(QecError::InternalFault {
                decoder: DecoderKind::Lookup,
                ..
            })
        ));
    }

    #[test]
    fn non_converged_results_are_not_rechecked() {
        let code = build_code(CodeFamily::Surface, 3).unwrap();
        let syndrome = Syndrome::zeros(code.num_checks());
        let outcome = run_sectors(DecoderKind::UnionFind, &code, &syndrome, |_, _| {
            Ok(SectorResult {
                correction: bit_utils::from_indices(code.n(), &[4]),
                status: DecodeStatus::NonConverged,
                diagnostics: lookup_diagnostics(),
            })
        })
        .unwrap();
        assert_eq!(outcome.status, DecodeStatus::NonConverged);
        assert!(matches!(
            outcome.into_converged(),
            Err(QecError::DecodeNonConvergence { .. })
        ));
    }

    #[test]
    fn decoder_names_parse() {
        for kind in DecoderKind::ALL {
            assert_eq!(kind.tag().parse::<DecoderKind>().unwrap(), kind);
        }
        assert_eq!("UF".parse::<DecoderKind>().unwrap(), DecoderKind::UnionFind);
        assert_eq!("bp-min-sum".parse::<DecoderKind>().unwrap(), DecoderKind::BpMinSum);
        assert!("osd".parse::<DecoderKind>().is_err());
    }

    #[test]
    fn status_order_picks_worst() {
        assert!(DecodeStatus::Converged < DecodeStatus::NonConverged);
        assert_eq!(
            DecodeStatus::NonConverged.max(DecodeStatus::Unsatisfiable),
            DecodeStatus::Unsatisfiable
        );
    }

    #[test]
    fn diagnostics_merge_sums_counts() {
        let a = Diagnostics::UnionFind {
            defects: 2,
            growth_rounds: 3,
            clusters: 1,
            grown_edges: 4,
        };
        let b = Diagnostics::UnionFind {
            defects: 1,
            growth_rounds: 5,
            clusters: 1,
            grown_edges: 2,
        };
        assert_eq!(
            a.merge(b),
            Diagnostics::UnionFind {
                defects: 3,
                growth_rounds: 5,
                clusters: 2,
                grown_edges: 6,
            }
        );
    }

    #[test]
    fn diagnostics_serialize_with_tag() {
        let d = Diagnostics::Lookup {
            defects: 1,
            table_entries: 16,
            correction_weight: 1,
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["decoder"], "lookup");
        assert_eq!(json["table_entries"], 16);
    }
}
