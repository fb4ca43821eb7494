//! Pauli frames over a code's physical qubits.
//!
//! A [`PauliFrame`] holds two bit registers, one marking X flips and one
//! marking Z flips; a Y flip sets both. The same type describes sampled
//! physical errors and decoder corrections, and composing the two gives the
//! residual that decides logical failure.

use crate::bit_utils::{self, Bits};
use crate::code::Sector;
use serde::Serialize;

/// X and Z registers over `n` physical qubits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PauliFrame {
    /// Qubits carrying an X component.
    x_register: Bits,

    /// Qubits carrying a Z component.
    z_register: Bits,
}

/// A physical error drawn from a noise model or supplied by a caller.
pub type ErrorPattern = PauliFrame;

/// A correction proposed by a decoder.
pub type Correction = PauliFrame;

impl PauliFrame {
    /// Identity frame over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            x_register: bit_utils::zeros(num_qubits),
            z_register: bit_utils::zeros(num_qubits),
        }
    }

    /// Builds a frame from explicit registers of equal length.
    ///
    /// Returns `None` when the lengths differ.
    pub fn from_registers(x: Bits, z: Bits) -> Option<Self> {
        (x.len() == z.len()).then_some(Self {
            x_register: x,
            z_register: z,
        })
    }

    /// Frame with X flips on `x` and Z flips on `z`.
    pub fn from_indices(num_qubits: usize, x: &[usize], z: &[usize]) -> Self {
        Self {
            x_register: bit_utils::from_indices(num_qubits, x),
            z_register: bit_utils::from_indices(num_qubits, z),
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.x_register.len()
    }

    /// Clears both registers.
    pub fn reset(&mut self) {
        self.x_register.fill(false);
        self.z_register.fill(false);
    }

    pub fn x(&self) -> &Bits {
        &self.x_register
    }

    pub fn z(&self) -> &Bits {
        &self.z_register
    }

    /// Register of errors belonging to `sector`: X flips for the X sector,
    /// Z flips for the Z sector.
    pub fn sector(&self, sector: Sector) -> &Bits {
        match sector {
            Sector::X => &self.x_register,
            Sector::Z => &self.z_register,
        }
    }

    pub fn sector_mut(&mut self, sector: Sector) -> &mut Bits {
        match sector {
            Sector::X => &mut self.x_register,
            Sector::Z => &mut self.z_register,
        }
    }

    /// Toggles an X flip on qubit `q`.
    pub fn apply_x(&mut self, q: usize) {
        let current = self.x_register[q];
        self.x_register.set(q, !current);
    }

    /// Toggles a Z flip on qubit `q`.
    pub fn apply_z(&mut self, q: usize) {
        let current = self.z_register[q];
        self.z_register.set(q, !current);
    }

    /// Toggles a Y flip (both components) on qubit `q`.
    pub fn apply_y(&mut self, q: usize) {
        self.apply_x(q);
        self.apply_z(q);
    }

    pub fn has_x_error(&self, q: usize) -> bool {
        self.x_register[q]
    }

    pub fn has_z_error(&self, q: usize) -> bool {
        self.z_register[q]
    }

    /// Multiplies `other` into this frame (phases are ignored).
    pub fn compose(&mut self, other: &PauliFrame) {
        bit_utils::xor_into(&mut self.x_register, &other.x_register);
        bit_utils::xor_into(&mut self.z_register, &other.z_register);
    }

    /// Product of two frames.
    pub fn composed(&self, other: &PauliFrame) -> PauliFrame {
        let mut out = self.clone();
        out.compose(other);
        out
    }

    /// Number of qubits acted on non-trivially.
    pub fn weight(&self) -> usize {
        self.x_register
            .iter()
            .by_vals()
            .zip(self.z_register.iter().by_vals())
            .filter(|&(x, z)| x || z)
            .count()
    }

    pub fn is_identity(&self) -> bool {
        self.x_register.not_any() && self.z_register.not_any()
    }

    /// Sparse view used in reports.
    pub fn support(&self) -> FrameSupport {
        FrameSupport {
            x: self.x_register.iter_ones().collect(),
            z: self.z_register.iter_ones().collect(),
        }
    }
}

/// Qubit indices carrying X and Z components of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSupport {
    pub x: Vec<usize>,
    pub z: Vec<usize>,
}

/// Measured values of every check of a code.
///
/// Laid out as the X-sector checks (Z-type stabilizers) followed by the
/// Z-sector checks (X-type stabilizers).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Syndrome {
    bits: Bits,
}

impl Syndrome {
    pub fn new(bits: Bits) -> Self {
        Self { bits }
    }

    /// All-zero syndrome over `num_checks` checks.
    pub fn zeros(num_checks: usize) -> Self {
        Self::new(bit_utils::zeros(num_checks))
    }

    /// Syndrome with the listed checks triggered.
    pub fn from_defects(num_checks: usize, defects: &[usize]) -> Self {
        Self::new(bit_utils::from_indices(num_checks, defects))
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &Bits {
        &self.bits
    }

    pub fn into_bits(self) -> Bits {
        self.bits
    }

    /// Indices of triggered checks.
    pub fn defects(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }

    /// Number of triggered checks.
    pub fn weight(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_trivial(&self) -> bool {
        self.bits.not_any()
    }
}

impl From<Bits> for Syndrome {
    fn from(bits: Bits) -> Self {
        Self::new(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_sets_both_components() {
        let mut frame = PauliFrame::new(4);
        frame.apply_y(2);
        assert!(frame.has_x_error(2) && frame.has_z_error(2));
        assert_eq!(frame.weight(), 1);
        frame.apply_x(2);
        assert!(!frame.has_x_error(2) && frame.has_z_error(2));
    }

    #[test]
    fn composing_with_self_is_identity() {
        let frame = PauliFrame::from_indices(6, &[0, 3], &[3, 5]);
        assert_eq!(frame.weight(), 3);
        assert!(frame.composed(&frame).is_identity());
    }

    #[test]
    fn mismatched_registers_rejected() {
        assert!(PauliFrame::from_registers(bit_utils::zeros(3), bit_utils::zeros(4)).is_none());
    }

    #[test]
    fn syndrome_defects() {
        let s = Syndrome::from_defects(8, &[1, 6]);
        assert_eq!(s.defects(), vec![1, 6]);
        assert_eq!(s.weight(), 2);
        assert!(!s.is_trivial());
        assert!(Syndrome::zeros(8).is_trivial());
    }
}
