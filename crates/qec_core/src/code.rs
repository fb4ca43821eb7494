//! Stabilizer code model.
//!
//! A [`StabilizerCode`] is a CSS code split into two independent sectors.
//! The X sector collects X-type errors, which are sensed by the Z-type
//! stabilizers; the Z sector is the mirror image. Each sector keeps its
//! check matrix in dense and sparse form, the logical representatives used to
//! judge failure, and whatever decoding structures the code supports.

use crate::bit_utils::{self, Bits};
use crate::config::LookupConfig;
use crate::graph::SectorGraph;
use crate::lookup::LookupTable;
use crate::pauli_frame::{ErrorPattern, Syndrome};
use crate::{QecError, QecResult, bivariate_bicycle, gf2, lattice};
use qec_common::family::CodeFamily;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use tracing::{debug, instrument};

/// One of the two CSS sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    /// X-type errors, sensed by Z-type checks.
    X,
    /// Z-type errors, sensed by X-type checks.
    Z,
}

impl Sector {
    pub const BOTH: [Sector; 2] = [Sector::X, Sector::Z];
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sector::X => f.write_str("X"),
            Sector::Z => f.write_str("Z"),
        }
    }
}

/// Parity-check relation between checks and physical qubits.
///
/// Stored as dense rows for linear algebra and as two adjacency lists for
/// the message-passing and graph decoders. Supports are sorted and free of
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMatrix {
    num_qubits: usize,
    rows: Vec<Bits>,
    qubits_of_check: Vec<Vec<usize>>,
    checks_of_qubit: Vec<Vec<usize>>,
}

impl CheckMatrix {
    /// Builds the matrix from per-check qubit supports.
    pub fn from_supports(num_qubits: usize, supports: Vec<Vec<usize>>) -> Self {
        let mut qubits_of_check = supports;
        let mut checks_of_qubit = vec![Vec::new(); num_qubits];
        let mut rows = Vec::with_capacity(qubits_of_check.len());
        for (c, support) in qubits_of_check.iter_mut().enumerate() {
            support.sort_unstable();
            support.dedup();
            for &q in support.iter() {
                checks_of_qubit[q].push(c);
            }
            rows.push(bit_utils::from_indices(num_qubits, support));
        }
        Self {
            num_qubits,
            rows,
            qubits_of_check,
            checks_of_qubit,
        }
    }

    pub fn num_checks(&self) -> usize {
        self.rows.len()
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn rows(&self) -> &[Bits] {
        &self.rows
    }

    /// Qubits acted on by check `c`.
    pub fn check_support(&self, c: usize) -> &[usize] {
        &self.qubits_of_check[c]
    }

    /// Checks that act on qubit `q`.
    pub fn qubit_checks(&self, q: usize) -> &[usize] {
        &self.checks_of_qubit[q]
    }

    /// Total number of non-zero entries.
    pub fn num_entries(&self) -> usize {
        self.qubits_of_check.iter().map(Vec::len).sum()
    }

    /// Largest number of checks touching a single qubit.
    pub fn max_qubit_degree(&self) -> usize {
        self.checks_of_qubit.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// `H * error (mod 2)`.
    pub fn syndrome(&self, error: &Bits) -> Bits {
        let mut out = bit_utils::zeros(self.rows.len());
        for (c, row) in self.rows.iter().enumerate() {
            if bit_utils::dot(row, error) {
                out.set(c, true);
            }
        }
        out
    }

    pub fn rank(&self) -> usize {
        gf2::rank(&self.rows)
    }
}

/// One CSS sector of a code and the structures that decode it.
#[derive(Debug, Clone)]
pub struct CodeSector {
    kind: Sector,
    checks: CheckMatrix,
    logicals: Vec<Bits>,
    graph: Option<SectorGraph>,
    lookup: Option<LookupTable>,
}

impl CodeSector {
    pub fn kind(&self) -> Sector {
        self.kind
    }

    /// Checks that sense this sector's errors.
    pub fn checks(&self) -> &CheckMatrix {
        &self.checks
    }

    /// Opposite-type logical representatives. An error in this sector that
    /// anticommutes with any of them flips an encoded qubit.
    pub fn logicals(&self) -> &[Bits] {
        &self.logicals
    }

    /// Decoding graph, present for surface, toric and color codes.
    pub fn graph(&self) -> Option<&SectorGraph> {
        self.graph.as_ref()
    }

    /// Precomputed lookup table, present for small codes.
    pub fn lookup(&self) -> Option<&LookupTable> {
        self.lookup.as_ref()
    }

    /// True if `residual` (an error in this sector with trivial syndrome)
    /// acts non-trivially on the encoded qubits.
    pub fn flips_logical(&self, residual: &Bits) -> bool {
        self.logicals.iter().any(|l| bit_utils::dot(l, residual))
    }
}

/// A CSS stabilizer code with both sectors assembled.
#[derive(Debug, Clone)]
pub struct StabilizerCode {
    family: CodeFamily,
    size: usize,
    distance: usize,
    n: usize,
    k: usize,
    x: CodeSector,
    z: CodeSector,
}

impl StabilizerCode {
    pub fn family(&self) -> CodeFamily {
        self.family
    }

    /// Size parameter the code was built with (the distance for lattice
    /// families, the block length for BB families).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    /// Number of physical qubits.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of logical qubits.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Total number of checks across both sectors.
    pub fn num_checks(&self) -> usize {
        self.x.checks.num_checks() + self.z.checks.num_checks()
    }

    pub fn sector(&self, sector: Sector) -> &CodeSector {
        match sector {
            Sector::X => &self.x,
            Sector::Z => &self.z,
        }
    }

    /// X-type stabilizers (the checks of the Z sector).
    pub fn x_stabilizers(&self) -> &CheckMatrix {
        &self.z.checks
    }

    /// Z-type stabilizers (the checks of the X sector).
    pub fn z_stabilizers(&self) -> &CheckMatrix {
        &self.x.checks
    }

    /// Positions of `sector`'s checks inside the full syndrome.
    pub fn syndrome_range(&self, sector: Sector) -> Range<usize> {
        let mx = self.x.checks.num_checks();
        match sector {
            Sector::X => 0..mx,
            Sector::Z => mx..mx + self.z.checks.num_checks(),
        }
    }

    /// Syndrome of `error`, assuming its length was already checked.
    pub(crate) fn project(&self, error: &ErrorPattern) -> Syndrome {
        let mut bits = bit_utils::zeros(self.num_checks());
        for sector in Sector::BOTH {
            let part = self.sector(sector).checks.syndrome(error.sector(sector));
            let offset = self.syndrome_range(sector).start;
            for c in part.iter_ones() {
                bits.set(offset + c, true);
            }
        }
        Syndrome::new(bits)
    }

    /// Splits a full syndrome into its two sector parts.
    pub(crate) fn split_syndrome(&self, syndrome: &Syndrome) -> QecResult<[Bits; 2]> {
        if syndrome.len() != self.num_checks() {
            return Err(QecError::MalformedSyndromeLength {
                expected: self.num_checks(),
                got: syndrome.len(),
            });
        }
        Ok(Sector::BOTH.map(|sector| {
            let range = self.syndrome_range(sector);
            syndrome.bits()[range].iter().by_vals().collect()
        }))
    }

    /// Checks that `error` spans exactly this code's qubits.
    pub(crate) fn check_error_length(&self, error: &ErrorPattern) -> QecResult<()> {
        if error.num_qubits() != self.n {
            return Err(QecError::MalformedErrorLength {
                expected: self.n,
                got: error.num_qubits(),
            });
        }
        Ok(())
    }

    /// True if `residual` is a stabilizer in both sectors, i.e. applying it
    /// leaves the encoded state untouched.
    pub fn is_trivial_residual(&self, residual: &ErrorPattern) -> bool {
        Sector::BOTH.into_iter().all(|sector| {
            let part = residual.sector(sector);
            let sec = self.sector(sector);
            sec.checks.syndrome(part).not_any() && !sec.flips_logical(part)
        })
    }
}

/// Qubit supports and metadata produced by a family constructor.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub n: usize,
    pub distance: usize,
    /// X-type stabilizer supports.
    pub x_checks: Vec<Vec<usize>>,
    /// Z-type stabilizer supports.
    pub z_checks: Vec<Vec<usize>>,
    /// Three-coloring of the checks, for color codes. The code is self-dual,
    /// so X and Z checks with the same index share a color.
    pub check_colors: Option<Vec<u8>>,
    /// Expected logical count, when the family publishes one.
    pub expected_k: Option<usize>,
}

/// Builds the code of `family` at `size` with the default lookup limits.
pub fn build_code(family: CodeFamily, size: usize) -> QecResult<StabilizerCode> {
    build_code_with(family, size, &LookupConfig::default())
}

/// Builds the code of `family` at `size`.
///
/// For lattice families `size` is the distance. BB families have a fixed
/// size; `size` may be `0`, the block length or the published distance.
#[instrument(level = "debug", skip(lookup))]
pub fn build_code_with(
    family: CodeFamily,
    size: usize,
    lookup: &LookupConfig,
) -> QecResult<StabilizerCode> {
    let layout = match family {
        CodeFamily::Surface => lattice::rotated_surface(size)?,
        CodeFamily::Toric => lattice::toric(size)?,
        CodeFamily::Color => lattice::color_666(size)?,
        CodeFamily::Bb(bb) => {
            let params = bb.params();
            if size != 0 && size != params.n && size != params.d {
                return Err(QecError::InvalidCodeSpec {
                    family,
                    reason: format!(
                        "{} has fixed size n = {}, d = {}; got {size}",
                        params.name, params.n, params.d
                    ),
                });
            }
            bivariate_bicycle::layout(params).map_err(|reason| QecError::InvalidCodeSpec {
                family,
                reason,
            })?
        }
    };
    let size = match family {
        CodeFamily::Bb(bb) => bb.params().n,
        _ => size,
    };
    assemble(family, size, layout, lookup)
}

fn assemble(
    family: CodeFamily,
    size: usize,
    layout: Layout,
    lookup: &LookupConfig,
) -> QecResult<StabilizerCode> {
    let invalid = |reason: String| QecError::InvalidCodeSpec { family, reason };
    let n = layout.n;
    let hx = CheckMatrix::from_supports(n, layout.x_checks);
    let hz = CheckMatrix::from_supports(n, layout.z_checks);

    for (i, xr) in hx.rows().iter().enumerate() {
        if let Some(j) = hz.rows().iter().position(|zr| bit_utils::dot(xr, zr)) {
            return Err(invalid(format!(
                "X check {i} anticommutes with Z check {j}"
            )));
        }
    }

    // Z logicals commute with X checks and detect X errors; X logicals mirror them.
    let z_logicals = gf2::logical_basis(hx.rows(), hz.rows(), n);
    let x_logicals = gf2::logical_basis(hz.rows(), hx.rows(), n);
    let k = z_logicals.len();
    if k == 0 {
        return Err(invalid("code encodes no logical qubits".into()));
    }
    let rank_k = n - hx.rank() - hz.rank();
    if x_logicals.len() != k || rank_k != k {
        return Err(invalid(format!(
            "logical count mismatch: {k} Z logicals, {} X logicals, rank gives {rank_k}",
            x_logicals.len()
        )));
    }
    if let Some(expected) = layout.expected_k {
        if expected != k {
            return Err(invalid(format!("expected k = {expected}, computed k = {k}")));
        }
    }

    let graph_decodable = !matches!(family, CodeFamily::Bb(_));
    let mut sectors = Vec::with_capacity(2);
    for (kind, checks, logicals) in [(Sector::X, hz, z_logicals), (Sector::Z, hx, x_logicals)] {
        let graph = if graph_decodable {
            Some(SectorGraph::build(&checks, layout.check_colors.as_deref()).map_err(invalid)?)
        } else {
            None
        };
        let table = LookupTable::build(&checks, lookup);
        sectors.push(CodeSector {
            kind,
            checks,
            logicals,
            graph,
            lookup: table,
        });
    }
    let z = sectors.pop().ok_or_else(|| invalid("missing Z sector".into()))?;
    let x = sectors.pop().ok_or_else(|| invalid("missing X sector".into()))?;

    debug!(
        %family,
        n,
        k,
        checks = x.checks.num_checks() + z.checks.num_checks(),
        lookup = x.lookup.is_some(),
        "built code"
    );
    Ok(StabilizerCode {
        family,
        size,
        distance: layout.distance,
        n,
        k,
        x,
        z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_common::family::BbFamily;

    #[test]
    fn surface_parameters() {
        for d in [2, 3, 5, 7] {
            let code = build_code(CodeFamily::Surface, d).unwrap();
            assert_eq!(code.n(), d * d);
            assert_eq!(code.k(), 1);
            assert_eq!(code.num_checks(), d * d - 1);
            if d % 2 == 1 {
                let mx = code.sector(Sector::X).checks().num_checks();
                assert_eq!(mx, (d * d - 1) / 2);
            }
        }
    }

    #[test]
    fn toric_parameters() {
        let code = build_code(CodeFamily::Toric, 4).unwrap();
        assert_eq!(code.n(), 32);
        assert_eq!(code.k(), 2);
        assert_eq!(code.num_checks(), 32);
    }

    #[test]
    fn color_parameters() {
        for d in [3, 5, 7] {
            let code = build_code(CodeFamily::Color, d).unwrap();
            assert_eq!(code.n(), (3 * d * d + 1) / 4);
            assert_eq!(code.k(), 1);
        }
    }

    #[test]
    fn invalid_sizes_rejected() {
        assert!(matches!(
            build_code(CodeFamily::Surface, 1),
            Err(QecError::InvalidCodeSpec { .. })
        ));
        assert!(build_code(CodeFamily::Toric, 2).is_err());
        assert!(build_code(CodeFamily::Color, 4).is_err());
        assert!(build_code(CodeFamily::Bb(BbFamily::Bb72), 50).is_err());
    }

    #[test]
    fn logicals_commute_with_opposite_checks() {
        let code = build_code(CodeFamily::Surface, 5).unwrap();
        for sector in Sector::BOTH {
            // X-sector logicals are Z-type: they commute with X stabilizers.
            let other = match sector {
                Sector::X => code.x_stabilizers(),
                Sector::Z => code.z_stabilizers(),
            };
            for l in code.sector(sector).logicals() {
                assert!(other.rows().iter().all(|r| !bit_utils::dot(r, l)));
            }
        }
    }

    #[test]
    fn syndrome_split_rejects_bad_length() {
        let code = build_code(CodeFamily::Surface, 3).unwrap();
        let err = code.split_syndrome(&Syndrome::zeros(5)).unwrap_err();
        assert!(matches!(
            err,
            QecError::MalformedSyndromeLength { expected: 8, got: 5 }
        ));
    }
}
