// src/core/state.rs

use super::constants::tolerances::AMPLITUDE_EPSILON;
use super::error::QuantumError;
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::fmt;

/// An n-qubit pure state: `2^n` complex amplitudes in the computational basis.
///
/// Index `i` encodes the qubit values big-endian: qubit 0 is the most
/// significant bit of `i`, qubit `n - 1` the least significant.
///
/// A vector is owned by exactly one circuit or correction cycle. It is only
/// mutated by gate application and by syndrome correction; everything else
/// reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeVector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl AmplitudeVector {
    /// Wraps an existing amplitude list. The length must be a power of two
    /// and at least 2. Normalization is not checked here; see
    /// [`crate::validation::check_normalization`].
    pub fn new(amplitudes: Vec<Complex64>) -> Result<Self, QuantumError> {
        let dim = amplitudes.len();
        if dim < 2 || !dim.is_power_of_two() {
            return Err(QuantumError::DimensionMismatch {
                expected: dim.max(2).next_power_of_two(),
                actual: dim,
            });
        }
        let num_qubits = dim.trailing_zeros() as usize;
        Ok(Self { amplitudes, num_qubits })
    }

    /// The all-zero basis state |0...0>.
    pub fn zero_state(num_qubits: usize) -> Result<Self, QuantumError> {
        Self::basis_state(num_qubits, 0)
    }

    /// The computational basis state |index>.
    pub fn basis_state(num_qubits: usize, index: usize) -> Result<Self, QuantumError> {
        if num_qubits == 0 {
            return Err(QuantumError::invalid_parameter("a state needs at least one qubit"));
        }
        let dim = 1usize.checked_shl(num_qubits as u32).filter(|d| *d != 0).ok_or_else(|| {
            QuantumError::QubitLimitExceeded { requested: num_qubits, max: usize::BITS as usize - 1 }
        })?;
        if index >= dim {
            return Err(QuantumError::DimensionMismatch { expected: dim, actual: index + 1 });
        }
        let mut amplitudes = vec![Complex64::zero(); dim];
        amplitudes[index] = Complex64::one();
        Ok(Self { amplitudes, num_qubits })
    }

    /// Single-qubit state `alpha|0> + beta|1>`.
    pub fn qubit(alpha: Complex64, beta: Complex64) -> Self {
        Self { amplitudes: vec![alpha, beta], num_qubits: 1 }
    }

    /// Read-only view of the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    pub(crate) fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    /// Consumes the state and returns the raw amplitude list.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Number of qubits `n`.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Dimension `2^n`.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Squared Euclidean norm, `sum |c_i|^2`.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.norm_sqr().sqrt()
    }

    /// Probability mass per basis index, `|c_i|^2`.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Inner product `<self|other>`.
    pub fn inner(&self, other: &AmplitudeVector) -> Result<Complex64, QuantumError> {
        if self.dim() != other.dim() {
            return Err(QuantumError::DimensionMismatch { expected: self.dim(), actual: other.dim() });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Fidelity `|<self|other>|^2` between two pure states.
    pub fn fidelity(&self, other: &AmplitudeVector) -> Result<f64, QuantumError> {
        Ok(self.inner(other)?.norm_sqr())
    }

    /// Returns a copy scaled to unit norm, or `None` if the norm is negligible.
    pub fn normalized(&self) -> Option<AmplitudeVector> {
        let norm_sqr = self.norm_sqr();
        if norm_sqr < AMPLITUDE_EPSILON {
            return None;
        }
        let inv = 1.0 / norm_sqr.sqrt();
        Some(Self {
            amplitudes: self.amplitudes.iter().map(|c| c * inv).collect(),
            num_qubits: self.num_qubits,
        })
    }

    /// Bit position (from the least significant end) that stores `qubit`.
    #[inline]
    pub(crate) fn bit_position(&self, qubit: usize) -> usize {
        self.num_qubits - 1 - qubit
    }

    /// Formats a basis index as an n-character bit pattern, qubit 0 first.
    pub fn bit_pattern(&self, index: usize) -> String {
        format!("{:0width$b}", index, width = self.num_qubits)
    }
}

impl fmt::Display for AmplitudeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amplitudes[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_basis_state_layout_is_big_endian() -> Result<(), QuantumError> {
        // |011> on three qubits: qubit 0 = 0, qubits 1 and 2 = 1
        let state = AmplitudeVector::basis_state(3, 0b011)?;
        assert_eq!(state.dim(), 8);
        assert_eq!(state.amplitudes()[3], Complex64::one());
        assert_eq!(state.bit_pattern(3), "011");
        assert_eq!(state.bit_position(0), 2);
        Ok(())
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let err = AmplitudeVector::new(vec![Complex64::one(); 3]).unwrap_err();
        assert!(matches!(err, QuantumError::DimensionMismatch { actual: 3, .. }));
    }

    #[test]
    fn test_fidelity_of_plus_with_zero() -> Result<(), QuantumError> {
        let plus = AmplitudeVector::qubit(Complex64::new(FRAC_1_SQRT_2, 0.0), Complex64::new(FRAC_1_SQRT_2, 0.0));
        let zero = AmplitudeVector::zero_state(1)?;
        assert!((plus.fidelity(&zero)? - 0.5).abs() < 1e-12);
        assert!((plus.norm() - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_normalized_rejects_null_vector() -> Result<(), QuantumError> {
        let null = AmplitudeVector::new(vec![Complex64::zero(); 2])?;
        assert!(null.normalized().is_none());
        Ok(())
    }
}
