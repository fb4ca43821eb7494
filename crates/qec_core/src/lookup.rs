//! Exhaustive lookup-table decoder for small codes.
//!
//! For a sector with at most `max_checks` checks and at most 64 qubits, every
//! error is enumerated in order of increasing weight (lexicographic within a
//! weight) and the first error reaching each syndrome is stored. The table is
//! therefore a minimum-weight decoder with deterministic tie-breaking.

use crate::QecError;
use crate::QecResult;
use crate::bit_utils::{self, Bits};
use crate::code::{CheckMatrix, StabilizerCode};
use crate::config::LookupConfig;
use crate::decoder::{self, DecodeOutcome, DecodeStatus, DecoderKind, Diagnostics, SectorResult};
use crate::pauli_frame::Syndrome;
use qec_common::limits::LOOKUP_MAX_QUBITS;
use tracing::debug;

/// Minimum-weight correction per packed syndrome of one sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    num_qubits: usize,
    /// Indexed by the syndrome packed LSB-first; values are packed errors.
    entries: Vec<Option<u64>>,
    filled: usize,
    /// True when every reachable syndrome has an entry.
    complete: bool,
}

/// Advances `combo` to the next `combo.len()`-subset of `0..n` in
/// lexicographic order. Returns false after the last one.
fn next_combination(combo: &mut [usize], n: usize) -> bool {
    let w = combo.len();
    let mut i = w;
    while i > 0 {
        i -= 1;
        if combo[i] < n - w + i {
            combo[i] += 1;
            for j in i + 1..w {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

impl LookupTable {
    /// Builds the table, or `None` if the sector exceeds the configured
    /// limits.
    pub fn build(checks: &CheckMatrix, config: &LookupConfig) -> Option<Self> {
        let m = checks.num_checks();
        let n = checks.num_qubits();
        if m > config.max_checks || n > LOOKUP_MAX_QUBITS || m >= usize::BITS as usize {
            return None;
        }

        let columns: Vec<u64> = (0..n)
            .map(|q| {
                checks
                    .qubit_checks(q)
                    .iter()
                    .fold(0u64, |acc, &c| acc | (1u64 << c))
            })
            .collect();
        let rank = checks.rank();
        let reachable = 1usize << rank;
        let mut entries = vec![None; 1usize << m];
        let mut filled = 0;
        let mut enumerated = 0;

        'weights: for weight in 0..=n {
            let mut combo: Vec<usize> = (0..weight).collect();
            loop {
                let (syndrome, error) = combo
                    .iter()
                    .fold((0u64, 0u64), |(s, e), &q| (s ^ columns[q], e | (1u64 << q)));
                enumerated += 1;
                let slot = &mut entries[syndrome as usize];
                if slot.is_none() {
                    *slot = Some(error);
                    filled += 1;
                    if filled == reachable {
                        break 'weights;
                    }
                }
                if enumerated >= config.max_enumerated {
                    break 'weights;
                }
                if !next_combination(&mut combo, n) {
                    break;
                }
            }
        }

        let complete = filled == reachable;
        debug!(checks = m, qubits = n, filled, complete, "built lookup table");
        Some(Self {
            num_qubits: n,
            entries,
            filled,
            complete,
        })
    }

    /// Number of syndromes with a stored correction.
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Stored correction for a sector syndrome, if any.
    pub fn correction(&self, syndrome: &Bits) -> Option<Bits> {
        let key = bit_utils::pack_u64(syndrome) as usize;
        let error = (*self.entries.get(key)?)?;
        Some(bit_utils::unpack_u64(error, self.num_qubits))
    }
}

/// Decodes `syndrome` by table lookup in both sectors.
///
/// A syndrome without an entry yields [`QecError::UnsupportedSyndrome`].
pub fn decode_lookup(code: &StabilizerCode, syndrome: &Syndrome) -> QecResult<DecodeOutcome> {
    let kind = DecoderKind::Lookup;
    kind.ensure_supports(code)?;
    decoder::run_sectors(kind, code, syndrome, |sector, part| {
        let table = sector.lookup().ok_or(QecError::DecoderUnsupported {
            decoder: kind,
            family: code.family(),
        })?;
        let correction = table
            .correction(part)
            .ok_or(QecError::UnsupportedSyndrome {
                sector: sector.kind(),
            })?;
        let correction_weight = correction.count_ones();
        Ok(SectorResult {
            correction,
            status: DecodeStatus::Converged,
            diagnostics: Diagnostics::Lookup {
                defects: part.count_ones(),
                table_entries: table.len(),
                correction_weight,
            },
        })
    })
}
