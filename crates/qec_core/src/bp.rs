//! Normalized min-sum belief propagation.
//!
//! Messages live on the edges of the Tanner graph of one sector. Every
//! iteration updates all check-to-variable messages and then all
//! variable-to-check messages (flooding schedule), takes a hard decision on
//! the posteriors, and stops as soon as the decision reproduces the
//! syndrome. Without convergence the decision with the lightest residual
//! syndrome is returned, flagged as non-converged.

use crate::QecResult;
use crate::bit_utils::{self, Bits};
use crate::cache::CodeCache;
use crate::code::{CheckMatrix, StabilizerCode};
use crate::config::BpConfig;
use crate::decoder::{self, DecodeOutcome, DecodeStatus, DecoderKind, Diagnostics, SectorResult};
use crate::pauli_frame::Syndrome;
use qec_common::family::{BbFamily, CodeFamily};
use tracing::trace;

/// Magnitude cap on check-to-variable messages.
const LLR_CAP: f64 = 1.0e3;

/// Log-likelihood ratio of a bit that is flipped with probability `p`.
pub fn prob_to_llr(p: f64) -> f64 {
    const EPS: f64 = 1e-10;
    let p = p.clamp(EPS, 1.0 - EPS);
    ((1.0 - p) / p).ln()
}

/// Tanner graph of one sector, with edges numbered check by check.
struct TannerEdges {
    /// Edge range of check `c` is `check_start[c]..check_start[c + 1]`.
    check_start: Vec<usize>,
    var_edges: Vec<Vec<usize>>,
}

impl TannerEdges {
    fn new(checks: &CheckMatrix) -> Self {
        let mut check_start = Vec::with_capacity(checks.num_checks() + 1);
        let mut var_edges = vec![Vec::new(); checks.num_qubits()];
        let mut next = 0;
        for c in 0..checks.num_checks() {
            check_start.push(next);
            for &q in checks.check_support(c) {
                var_edges[q].push(next);
                next += 1;
            }
        }
        check_start.push(next);
        Self {
            check_start,
            var_edges,
        }
    }

    fn num_edges(&self) -> usize {
        self.check_start.last().copied().unwrap_or(0)
    }
}

/// Runs min-sum on one sector syndrome.
pub(crate) fn decode_sector(checks: &CheckMatrix, syndrome: &Bits, config: &BpConfig) -> SectorResult {
    let n = checks.num_qubits();
    let initial = syndrome.count_ones();
    if initial == 0 {
        return SectorResult {
            correction: bit_utils::zeros(n),
            status: DecodeStatus::Converged,
            diagnostics: Diagnostics::BeliefPropagation {
                initial_syndrome_weight: 0,
                iterations: 0,
                residual_syndrome_weight: 0,
            },
        };
    }

    let tanner = TannerEdges::new(checks);
    let prior = prob_to_llr(config.prior_error_rate);
    let mut v2c = vec![prior; tanner.num_edges()];
    let mut c2v = vec![0.0f64; tanner.num_edges()];

    let mut best = bit_utils::zeros(n);
    let mut best_residual = initial;
    let mut iterations = 0;
    let mut converged = false;

    for iter in 1..=config.max_iterations {
        iterations = iter;

        for c in 0..checks.num_checks() {
            let range = tanner.check_start[c]..tanner.check_start[c + 1];
            let mut sign = if syndrome[c] { -1.0 } else { 1.0 };
            let (mut min1, mut min2) = (f64::INFINITY, f64::INFINITY);
            let mut argmin = usize::MAX;
            for e in range.clone() {
                let msg = v2c[e];
                if msg < 0.0 {
                    sign = -sign;
                }
                let mag = msg.abs();
                if mag < min1 {
                    min2 = min1;
                    min1 = mag;
                    argmin = e;
                } else if mag < min2 {
                    min2 = mag;
                }
            }
            for e in range {
                let own = if v2c[e] < 0.0 { -1.0 } else { 1.0 };
                let mag = (if e == argmin { min2 } else { min1 }).min(LLR_CAP);
                c2v[e] = config.scaling * sign * own * mag;
            }
        }

        let mut hard = bit_utils::zeros(n);
        for (q, edges) in tanner.var_edges.iter().enumerate() {
            let posterior = prior + edges.iter().map(|&e| c2v[e]).sum::<f64>();
            for &e in edges {
                v2c[e] = posterior - c2v[e];
            }
            if posterior < 0.0 {
                hard.set(q, true);
            }
        }

        let mut residual = checks.syndrome(&hard);
        bit_utils::xor_into(&mut residual, syndrome);
        let weight = residual.count_ones();
        if weight < best_residual {
            best_residual = weight;
            best = hard;
        }
        if weight == 0 {
            converged = true;
            break;
        }
    }
    trace!(iterations, converged, residual = best_residual, "min-sum finished");

    SectorResult {
        correction: best,
        status: if converged {
            DecodeStatus::Converged
        } else {
            DecodeStatus::NonConverged
        },
        diagnostics: Diagnostics::BeliefPropagation {
            initial_syndrome_weight: initial,
            iterations,
            residual_syndrome_weight: best_residual,
        },
    }
}

/// Decodes `syndrome` on any code with min-sum belief propagation.
pub fn decode_bp(
    code: &StabilizerCode,
    syndrome: &Syndrome,
    config: &BpConfig,
) -> QecResult<DecodeOutcome> {
    config.validate()?;
    decoder::run_sectors(DecoderKind::BpMinSum, code, syndrome, |sector, part| {
        Ok(decode_sector(sector.checks(), part, config))
    })
}

/// Decodes a syndrome of a bivariate-bicycle code, building the code on
/// first use through the shared cache.
pub fn decode_bb(
    family: BbFamily,
    syndrome: &Syndrome,
    config: &BpConfig,
) -> QecResult<DecodeOutcome> {
    let code = CodeCache::global().get_or_build(CodeFamily::Bb(family), 0)?;
    decode_bp(&code, syndrome, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repetition(n: usize) -> CheckMatrix {
        CheckMatrix::from_supports(n, (0..n - 1).map(|i| vec![i, i + 1]).collect())
    }

    #[test]
    fn llr_is_clamped() {
        assert!(prob_to_llr(0.0).is_finite());
        assert!(prob_to_llr(1.0).is_finite());
        assert!(prob_to_llr(0.01) > 0.0);
        assert!((prob_to_llr(0.5)).abs() < 1e-12);
    }

    #[test]
    fn zero_syndrome_returns_immediately() {
        let result = decode_sector(&repetition(5), &bit_utils::zeros(4), &BpConfig::default());
        assert_eq!(result.status, DecodeStatus::Converged);
        assert!(result.correction.not_any());
        assert!(matches!(
            result.diagnostics,
            Diagnostics::BeliefPropagation { iterations: 0, .. }
        ));
    }

    #[test]
    fn single_flip_on_repetition_code() {
        let checks = repetition(7);
        let syn = bit_utils::from_indices(6, &[2, 3]);
        let result = decode_sector(&checks, &syn, &BpConfig::default());
        assert_eq!(result.status, DecodeStatus::Converged);
        assert_eq!(result.correction.iter_ones().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn end_flip_on_repetition_code() {
        let checks = repetition(7);
        let syn = bit_utils::from_indices(6, &[5]);
        let result = decode_sector(&checks, &syn, &BpConfig::default());
        assert_eq!(result.status, DecodeStatus::Converged);
        assert_eq!(result.correction.iter_ones().collect::<Vec<_>>(), vec![6]);
    }
}
