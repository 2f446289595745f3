// src/validation/mod.rs

//! Invariant checks for amplitude vectors, gate matrices and target lists.

use crate::core::{AmplitudeVector, QuantumError};
use crate::core::constants::tolerances::{NORM_TOLERANCE, UNITARY_TOLERANCE};
use ndarray::Array2;
use num_complex::Complex64;
use std::collections::HashSet;

/// Checks that the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `AmplitudeVector` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `NORM_TOLERANCE`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(QuantumError::NormDrift)` otherwise. The state is never renormalized
///   here; drift means a gate sequence is broken upstream.
pub fn check_normalization(
    state: &AmplitudeVector,
    tolerance: Option<f64>,
) -> Result<(), QuantumError> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    check_probability_sum(state.norm_sqr(), effective_tolerance)
}

/// Same check on an already summed probability mass.
pub fn check_probability_sum(total: f64, tolerance: f64) -> Result<(), QuantumError> {
    if !total.is_finite() || (total - 1.0).abs() > tolerance {
        Err(QuantumError::NormDrift { norm_sqr: total, tolerance })
    } else {
        Ok(())
    }
}

/// Returns `true` if `matrix` is square and `U U† = I` entry-wise within `tolerance`.
pub fn is_unitary(matrix: &Array2<Complex64>, tolerance: Option<f64>) -> bool {
    let tol = tolerance.unwrap_or(UNITARY_TOLERANCE);
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return false;
    }
    let eye = Array2::<Complex64>::eye(rows);
    let u_dagger = matrix.t().mapv(|x| x.conj());
    let product = matrix.dot(&u_dagger);
    product.iter().zip(eye.iter()).all(|(a, b)| (*a - *b).norm() < tol)
}

/// Returns the first index that occurs twice, if any.
pub fn find_duplicate(indices: &[usize]) -> Option<usize> {
    let mut seen = HashSet::with_capacity(indices.len());
    indices.iter().copied().find(|idx| !seen.insert(*idx))
}

/// Checks that every target lies in `[0, num_qubits)` and none repeats.
pub fn validate_targets(targets: &[usize], num_qubits: usize) -> Result<(), QuantumError> {
    if let Some(&index) = targets.iter().find(|&&t| t >= num_qubits) {
        return Err(QuantumError::QubitOutOfRange { index, num_qubits });
    }
    if let Some(dup) = find_duplicate(targets) {
        return Err(QuantumError::DuplicateQubit(dup));
    }
    Ok(())
}

/// Validates a single-qubit logical input: two amplitudes, unit norm.
pub fn validate_logical_state(
    state: &AmplitudeVector,
    tolerance: Option<f64>,
) -> Result<(), QuantumError> {
    if state.num_qubits() != 1 {
        return Err(QuantumError::DimensionMismatch { expected: 2, actual: state.dim() });
    }
    check_normalization(state, tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_normalization_reports_drift() -> Result<(), QuantumError> {
        let state = AmplitudeVector::new(vec![Complex64::new(1.0, 0.0), Complex64::new(0.1, 0.0)])?;
        match check_normalization(&state, None) {
            Err(QuantumError::NormDrift { norm_sqr, .. }) => assert!((norm_sqr - 1.01).abs() < 1e-12),
            other => panic!("expected NormDrift, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_is_unitary() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        assert!(is_unitary(&arr2(&[[zero, one], [one, zero]]), None));
        assert!(!is_unitary(&arr2(&[[one, one], [zero, one]]), None));
    }

    #[test]
    fn test_validate_targets() {
        assert!(validate_targets(&[0, 2], 3).is_ok());
        assert_eq!(validate_targets(&[3], 3), Err(QuantumError::QubitOutOfRange { index: 3, num_qubits: 3 }));
        assert_eq!(validate_targets(&[1, 1], 3), Err(QuantumError::DuplicateQubit(1)));
    }
}
