//! Common definitions shared across the decoding engine, I/O and host crates.
//!
//! This crate provides the code family tags understood by the engine, the
//! hard-coded parameter tables of the bivariate-bicycle code families, and
//! numeric constants that must agree between the engine and its callers.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code family identifiers and their textual tags.
///
/// The tags are the names used at every outer boundary (CLI arguments,
/// request files, JSON reports). Parsing is case-insensitive and accepts
/// `-` in place of `_`.
pub mod family {
    use super::*;

    /// The fixed bivariate-bicycle families the engine supports.
    ///
    /// Each variant maps to exactly one parameter table in [`crate::bb`].
    /// These are not user-tunable: the block length, check weight, logical
    /// count and distance are the published values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub enum BbFamily {
        /// [[72, 12, 6]] gross-code precursor, `l = m = 6`.
        #[serde(rename = "bb_72_12_6")]
        Bb72,
        /// [[90, 8, 10]], `l = 15`, `m = 3`.
        #[serde(rename = "bb_90_8_10")]
        Bb90,
        /// [[144, 12, 12]] gross code, `l = 12`, `m = 6`.
        #[serde(rename = "bb_144_12_12")]
        Bb144,
        /// [[288, 12, 18]] two-gross code, `l = m = 12`.
        #[serde(rename = "bb_288_12_18")]
        Bb288,
    }

    impl BbFamily {
        /// All supported families, in increasing block length.
        pub const ALL: [BbFamily; 4] = [
            BbFamily::Bb72,
            BbFamily::Bb90,
            BbFamily::Bb144,
            BbFamily::Bb288,
        ];

        /// Canonical tag, e.g. `bb_144_12_12`.
        pub fn tag(self) -> &'static str {
            self.params().name
        }

        /// Published parameter table for this family.
        pub fn params(self) -> &'static crate::bb::BbParams {
            match self {
                BbFamily::Bb72 => &crate::bb::BB_72_12_6,
                BbFamily::Bb90 => &crate::bb::BB_90_8_10,
                BbFamily::Bb144 => &crate::bb::BB_144_12_12,
                BbFamily::Bb288 => &crate::bb::BB_288_12_18,
            }
        }
    }

    /// Stabilizer code families recognised by the code model.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    pub enum CodeFamily {
        /// Rotated planar surface code of distance `d`.
        Surface,
        /// Kitaev toric code on a periodic `d x d` lattice.
        Toric,
        /// Triangular 6.6.6 color code of odd distance `d`.
        Color,
        /// One of the fixed bivariate-bicycle families.
        Bb(BbFamily),
    }

    impl CodeFamily {
        /// True for families whose size is fixed by the tag itself.
        pub fn is_fixed_size(self) -> bool {
            matches!(self, CodeFamily::Bb(_))
        }

        /// Canonical tag for this family.
        pub fn tag(self) -> &'static str {
            match self {
                CodeFamily::Surface => "surface",
                CodeFamily::Toric => "toric",
                CodeFamily::Color => "color",
                CodeFamily::Bb(bb) => bb.tag(),
            }
        }
    }

    impl fmt::Display for CodeFamily {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.tag())
        }
    }

    impl fmt::Display for BbFamily {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.tag())
        }
    }

    /// Returned when a tag names no known family.
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    #[error("unknown code family '{0}'")]
    pub struct UnknownFamily(pub String);

    impl FromStr for BbFamily {
        type Err = UnknownFamily;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
            BbFamily::ALL
                .into_iter()
                .find(|bb| bb.tag() == normalized)
                .ok_or_else(|| UnknownFamily(s.to_string()))
        }
    }

    impl From<CodeFamily> for String {
        fn from(family: CodeFamily) -> String {
            family.tag().to_string()
        }
    }

    impl TryFrom<String> for CodeFamily {
        type Error = UnknownFamily;

        fn try_from(tag: String) -> Result<Self, Self::Error> {
            tag.parse()
        }
    }

    impl FromStr for CodeFamily {
        type Err = UnknownFamily;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "surface" | "rotated_surface" => Ok(CodeFamily::Surface),
                "toric" => Ok(CodeFamily::Toric),
                "color" | "colour" | "color_666" => Ok(CodeFamily::Color),
                other => other.parse::<BbFamily>().map(CodeFamily::Bb),
            }
        }
    }
}

/// Bivariate-bicycle parameter tables.
///
/// A BB code is defined by two polynomials `A` and `B`, each a sum of three
/// monomials in the commuting shift matrices `x = S_l (x) I_m` and
/// `y = I_l (x) S_m`. The check matrices are `Hx = [A | B]` and
/// `Hz = [B^T | A^T]`, so every check has weight six and every qubit sits in
/// three checks of each type. Tables follow Bravyi et al., "High-threshold
/// and low-overhead fault-tolerant quantum memory" (2024), Table 3.
pub mod bb {
    /// A monomial `x^x_pow * y^y_pow`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Monomial {
        pub x_pow: usize,
        pub y_pow: usize,
    }

    const fn mono(x_pow: usize, y_pow: usize) -> Monomial {
        Monomial { x_pow, y_pow }
    }

    /// Published parameters of one BB family.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct BbParams {
        /// Canonical family tag.
        pub name: &'static str,
        /// Number of physical data qubits, `2 * l * m`.
        pub n: usize,
        /// Number of logical qubits.
        pub k: usize,
        /// Code distance.
        pub d: usize,
        /// Order of the `x` cyclic shift.
        pub l: usize,
        /// Order of the `y` cyclic shift.
        pub m: usize,
        /// Monomials of polynomial `A`.
        pub a: [Monomial; 3],
        /// Monomials of polynomial `B`.
        pub b: [Monomial; 3],
    }

    /// Row weight of every BB check (three monomials from each polynomial).
    pub const CHECK_WEIGHT: usize = 6;

    /// Number of checks of each type touching one qubit.
    pub const QUBIT_DEGREE: usize = 3;

    pub const BB_72_12_6: BbParams = BbParams {
        name: "bb_72_12_6",
        n: 72,
        k: 12,
        d: 6,
        l: 6,
        m: 6,
        a: [mono(3, 0), mono(0, 1), mono(0, 2)],
        b: [mono(0, 3), mono(1, 0), mono(2, 0)],
    };

    pub const BB_90_8_10: BbParams = BbParams {
        name: "bb_90_8_10",
        n: 90,
        k: 8,
        d: 10,
        l: 15,
        m: 3,
        a: [mono(9, 0), mono(0, 1), mono(0, 2)],
        b: [mono(0, 0), mono(2, 0), mono(7, 0)],
    };

    pub const BB_144_12_12: BbParams = BbParams {
        name: "bb_144_12_12",
        n: 144,
        k: 12,
        d: 12,
        l: 12,
        m: 6,
        a: [mono(3, 0), mono(0, 1), mono(0, 2)],
        b: [mono(0, 3), mono(1, 0), mono(2, 0)],
    };

    pub const BB_288_12_18: BbParams = BbParams {
        name: "bb_288_12_18",
        n: 288,
        k: 12,
        d: 18,
        l: 12,
        m: 12,
        a: [mono(3, 0), mono(0, 2), mono(0, 7)],
        b: [mono(0, 3), mono(1, 0), mono(2, 0)],
    };

    impl BbParams {
        /// Size of the cyclic group, `l * m`, equal to `n / 2`.
        pub fn group_order(&self) -> usize {
            self.l * self.m
        }

        /// Encoding rate `k / n`.
        pub fn encoding_rate(&self) -> f64 {
            self.k as f64 / self.n as f64
        }

        /// Footprint of a rotated surface code patch set with the same `k` and `d`.
        ///
        /// Counts data plus measurement qubits, `2 d^2` per logical qubit.
        pub fn surface_code_comparison(&self) -> SurfaceCodeComparison {
            let surface_qubits = 2 * self.d * self.d * self.k;
            SurfaceCodeComparison {
                surface_code_qubits: surface_qubits,
                bb_code_qubits: self.n,
                qubit_savings_percent: (1.0 - self.n as f64 / surface_qubits as f64) * 100.0,
            }
        }
    }

    /// Qubit overhead of a BB family against surface-code patches.
    #[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
    pub struct SurfaceCodeComparison {
        pub surface_code_qubits: usize,
        pub bb_code_qubits: usize,
        pub qubit_savings_percent: f64,
    }
}

/// Numeric limits shared by the engine and its callers.
pub mod limits {
    /// Largest per-sector check count for which lookup tables are built.
    pub const LOOKUP_MAX_CHECKS: usize = 16;

    /// Largest qubit count for which lookup tables are built.
    pub const LOOKUP_MAX_QUBITS: usize = 64;

    /// Upper bound on candidate errors enumerated while filling a lookup table.
    pub const LOOKUP_MAX_ENUMERATED: usize = 2_000_000;

    /// Largest distance accepted for lattice families.
    ///
    /// Matching cost grows cubically in the defect count, so larger patches
    /// are rejected at construction rather than stalling a request.
    pub const MAX_LATTICE_DISTANCE: usize = 41;
}
