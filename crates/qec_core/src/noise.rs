//! Error sampling.
//!
//! Noise models act independently on every physical qubit. All sampling goes
//! through a caller-supplied RNG, so a seeded generator reproduces the same
//! errors.

use crate::code::{Sector, StabilizerCode};
use crate::pauli_frame::{ErrorPattern, PauliFrame, Syndrome};
use crate::{QecError, QecResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Single-qubit noise channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseModel {
    /// X, Y or Z, each with probability `p / 3`.
    #[default]
    Depolarizing,
    /// X and Z flips drawn independently, each with probability `p`.
    IndependentXz,
    /// X flips only.
    BitFlip,
    /// Z flips only.
    PhaseFlip,
}

impl NoiseModel {
    pub fn tag(self) -> &'static str {
        match self {
            NoiseModel::Depolarizing => "depolarizing",
            NoiseModel::IndependentXz => "independent_xz",
            NoiseModel::BitFlip => "bit_flip",
            NoiseModel::PhaseFlip => "phase_flip",
        }
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NoiseModel {
    type Err = QecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "depolarizing" | "depolarising" | "dep" => Ok(NoiseModel::Depolarizing),
            "independent_xz" | "independent" | "xz" => Ok(NoiseModel::IndependentXz),
            "bit_flip" | "x" => Ok(NoiseModel::BitFlip),
            "phase_flip" | "z" => Ok(NoiseModel::PhaseFlip),
            other => Err(QecError::InvalidConfig(format!("unknown noise model '{other}'"))),
        }
    }
}

/// Rejects rates outside `[0, 1]`, including NaN.
pub fn validate_rate(p: f64) -> QecResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(QecError::InvalidErrorRate(p))
    }
}

/// Samples one error pattern over `code`'s qubits.
pub fn sample_error<R: Rng + ?Sized>(
    code: &StabilizerCode,
    p: f64,
    model: NoiseModel,
    rng: &mut R,
) -> QecResult<ErrorPattern> {
    validate_rate(p)?;
    let mut error = PauliFrame::new(code.n());
    for q in 0..code.n() {
        match model {
            NoiseModel::Depolarizing => {
                if rng.gen_bool(p) {
                    match rng.gen_range(0..3) {
                        0 => error.apply_x(q),
                        1 => error.apply_y(q),
                        _ => error.apply_z(q),
                    }
                }
            }
            NoiseModel::IndependentXz => {
                if rng.gen_bool(p) {
                    error.apply_x(q);
                }
                if rng.gen_bool(p) {
                    error.apply_z(q);
                }
            }
            NoiseModel::BitFlip => {
                if rng.gen_bool(p) {
                    error.apply_x(q);
                }
            }
            NoiseModel::PhaseFlip => {
                if rng.gen_bool(p) {
                    error.apply_z(q);
                }
            }
        }
    }
    Ok(error)
}

/// Syndrome produced by `error` on `code`.
pub fn syndrome_of(code: &StabilizerCode, error: &ErrorPattern) -> QecResult<Syndrome> {
    code.check_error_length(error)?;
    Ok(code.project(error))
}

/// Uniformly random error of exactly `weight` flips in one sector.
pub fn error_of_weight<R: Rng + ?Sized>(
    code: &StabilizerCode,
    weight: usize,
    sector: Sector,
    rng: &mut R,
) -> QecResult<ErrorPattern> {
    if weight > code.n() {
        return Err(QecError::InvalidConfig(format!(
            "error weight {weight} exceeds {} qubits",
            code.n()
        )));
    }
    let mut error = PauliFrame::new(code.n());
    for q in rand::seq::index::sample(rng, code.n(), weight) {
        match sector {
            Sector::X => error.apply_x(q),
            Sector::Z => error.apply_z(q),
        }
    }
    Ok(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::build_code;
    use qec_common::family::CodeFamily;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rates_outside_unit_interval_are_rejected() {
        let code = build_code(CodeFamily::Surface, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for p in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                sample_error(&code, p, NoiseModel::Depolarizing, &mut rng),
                Err(QecError::InvalidErrorRate(_))
            ));
        }
    }

    #[test]
    fn extreme_rates() {
        let code = build_code(CodeFamily::Surface, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let none = sample_error(&code, 0.0, NoiseModel::Depolarizing, &mut rng).unwrap();
        assert!(none.is_identity());
        let all = sample_error(&code, 1.0, NoiseModel::BitFlip, &mut rng).unwrap();
        assert_eq!(all.x().count_ones(), 9);
        assert!(all.z().not_any());
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let code = build_code(CodeFamily::Toric, 4).unwrap();
        let a = sample_error(&code, 0.2, NoiseModel::IndependentXz, &mut StdRng::seed_from_u64(3));
        let b = sample_error(&code, 0.2, NoiseModel::IndependentXz, &mut StdRng::seed_from_u64(3));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn fixed_weight_errors() {
        let code = build_code(CodeFamily::Surface, 5).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let e = error_of_weight(&code, 4, Sector::Z, &mut rng).unwrap();
        assert_eq!(e.z().count_ones(), 4);
        assert!(e.x().not_any());
        assert!(error_of_weight(&code, 26, Sector::X, &mut rng).is_err());
    }

    #[test]
    fn syndrome_rejects_wrong_length() {
        let code = build_code(CodeFamily::Surface, 3).unwrap();
        let e = PauliFrame::new(4);
        assert!(matches!(
            syndrome_of(&code, &e),
            Err(QecError::MalformedErrorLength { expected: 9, got: 4 })
        ));
    }

    #[test]
    fn model_names_parse() {
        assert_eq!("Depolarizing".parse::<NoiseModel>().unwrap(), NoiseModel::Depolarizing);
        assert_eq!("bit-flip".parse::<NoiseModel>().unwrap(), NoiseModel::BitFlip);
        assert!("amplitude_damping".parse::<NoiseModel>().is_err());
    }
}
