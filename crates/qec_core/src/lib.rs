//! Core quantum error correction algorithms and data structures.
//!
//! This crate builds CSS stabilizer codes (surface, toric, color and
//! bivariate-bicycle families), samples physical errors, and decodes
//! syndromes with four interchangeable decoders: minimum-weight perfect
//! matching, union-find, an exhaustive lookup table and min-sum belief
//! propagation. A parallel Monte Carlo driver estimates logical error rates
//! and thresholds on top of them.

/// Bit manipulation utilities for syndromes, errors and check rows.
///
/// Provides the dense bit vector type used across the crate plus packed-word
/// helpers for converting between bit vectors, `u64` words and sparse index
/// lists.
pub mod bit_utils;

/// Bivariate-bicycle check matrix construction.
///
/// Expands the published polynomial tables into the `Hx = [A | B]` and
/// `Hz = [B^T | A^T]` supports and checks their weights.
mod bivariate_bicycle;

/// Maximum-weight matching on general graphs.
///
/// Exact Edmonds blossom solver used by the matching decoder to pair defects.
pub mod blossom;

/// Normalized min-sum belief propagation decoder.
///
/// Works on any code, including the bivariate-bicycle families that have no
/// graph structure.
pub mod bp;

/// Process-wide cache of built codes.
///
/// Codes are expensive to validate and precompute; the cache builds each
/// `(family, size)` once and shares it across threads.
pub mod cache;

/// Stabilizer code model.
///
/// Check matrices, logical operators and per-sector decoding structures of a
/// built code, plus the entry points that construct codes by family.
pub mod code;

/// Engine configuration.
///
/// Decoder knobs with defaults, loadable from any serde format, and their
/// validation.
pub mod config;

/// Decoder selection and the shared decode pipeline.
///
/// Splits syndromes per sector, runs the chosen decoder, verifies converged
/// corrections and reports timing and diagnostics.
pub mod decoder;

/// Disjoint set union (DSU) forest for cluster growth.
///
/// Tracks clusters of decoding-graph nodes together with their defect parity
/// and boundary contact, with path halving and union by size.
pub mod dsu;

/// Linear algebra over GF(2).
///
/// Rank, kernels, logical operator bases and small minimum-weight solves.
pub mod gf2;

/// Decoding graph representation.
///
/// Nodes are checks (detectors) and edges are the single-qubit errors that
/// flip them. Used by the matching and union-find decoders.
pub mod graph;

/// Lattice layouts for the topological code families.
mod lattice;

/// Exhaustive lookup-table decoder for small codes.
pub mod lookup;

/// Minimum-weight perfect matching decoder.
pub mod mwpm;

/// Noise models and error sampling.
///
/// Draws physical error patterns from seeded generators and computes their
/// syndromes.
pub mod noise;

/// Pauli frames and syndromes.
///
/// Two-register representation of X and Z flips shared by sampled errors and
/// decoder corrections, and the measured syndrome type.
pub mod pauli_frame;

/// Decoding of three-colorable codes through restricted lattices.
pub mod restriction;

/// Parallel Monte Carlo threshold sweeps.
pub mod sweep;

/// Union-find decoder.
///
/// Grows clusters around defects until every cluster is neutral, then peels
/// a spanning forest to produce the correction.
pub mod union_find;

pub use code::{CheckMatrix, CodeSector, Sector, StabilizerCode, build_code, build_code_with};
pub use config::{BpConfig, EngineConfig, LookupConfig, UnionFindConfig};
pub use decoder::{DecodeOutcome, DecodeStatus, DecoderKind, Diagnostics, decode};
pub use noise::{NoiseModel, error_of_weight, sample_error, syndrome_of};
pub use pauli_frame::{Correction, ErrorPattern, PauliFrame, Syndrome};
pub use qec_common::family::{BbFamily, CodeFamily};
pub use sweep::{SweepPlan, ThresholdRun, estimate_crossing, run_threshold_sweep};

/// Errors returned by code construction, sampling and decoding.
///
/// Every failure is reported through this type; nothing in the engine
/// panics on caller input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum QecError {
    /// The requested family and size do not describe a valid code.
    #[error("invalid {family} code: {reason}")]
    InvalidCodeSpec { family: CodeFamily, reason: String },

    /// The lookup table has no entry for a sector syndrome.
    #[error("no lookup entry for this {sector}-sector syndrome")]
    UnsupportedSyndrome { sector: Sector },

    /// The decoder cannot run on this family.
    #[error("decoder {decoder} does not support {family} codes")]
    DecoderUnsupported {
        decoder: DecoderKind,
        family: CodeFamily,
    },

    /// Syndrome length differs from the code's check count.
    #[error("syndrome has {got} bits, code has {expected} checks")]
    MalformedSyndromeLength { expected: usize, got: usize },

    /// Error pattern length differs from the code's qubit count.
    #[error("error pattern covers {got} qubits, code has {expected}")]
    MalformedErrorLength { expected: usize, got: usize },

    /// A caller required convergence and the decoder did not converge.
    #[error("decoder {decoder} did not converge: {detail}")]
    DecodeNonConvergence { decoder: DecoderKind, detail: String },

    /// A decoder produced an inconsistent result.
    #[error("internal fault in {decoder}: {detail}")]
    InternalFault { decoder: DecoderKind, detail: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("error rate {0} is outside [0, 1]")]
    InvalidErrorRate(f64),
}

pub type QecResult<T> = Result<T, QecError>;
