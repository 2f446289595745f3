// src/correction/pauli.rs

//! Pauli operators on amplitude vectors.
//!
//! A Pauli string is a monomial matrix: every row has exactly one non-zero
//! entry, a phase from `{±1, ±i}`. [`PauliOperator`] stores that entry per
//! row, so tensor products, expectation values and application are all
//! O(2^n) instead of the O(4^n) a dense matrix would need.

use crate::core::{AmplitudeVector, QuantumError};
use crate::operations::{GateKind, GateLibrary, GateParams};
use crate::simulation::engine::apply_single_qubit;
use crate::validation::validate_targets;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-qubit Pauli.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PauliKind {
    /// Identity; commutes with everything.
    I,
    /// Bit flip, `|0> <-> |1>`.
    X,
    /// Bit and phase flip, `iXZ`.
    Y,
    /// Phase flip, `|1> -> -|1>`.
    Z,
}

impl PauliKind {
    /// `true` if the two single-qubit Paulis commute.
    pub fn commutes_with(self, other: PauliKind) -> bool {
        self == PauliKind::I || other == PauliKind::I || self == other
    }

    /// Library gate for this Pauli, `None` for the identity.
    pub fn gate_kind(self) -> Option<GateKind> {
        match self {
            PauliKind::I => None,
            PauliKind::X => Some(GateKind::PauliX),
            PauliKind::Y => Some(GateKind::PauliY),
            PauliKind::Z => Some(GateKind::PauliZ),
        }
    }

    fn monomial(self) -> PauliOperator {
        let one = Complex64::new(1.0, 0.0);
        let (columns, phases) = match self {
            PauliKind::I => (vec![0, 1], vec![one, one]),
            PauliKind::X => (vec![1, 0], vec![one, one]),
            PauliKind::Y => (vec![1, 0], vec![Complex64::new(0.0, -1.0), Complex64::new(0.0, 1.0)]),
            PauliKind::Z => (vec![0, 1], vec![one, -one]),
        };
        PauliOperator { columns, phases }
    }
}

impl fmt::Display for PauliKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PauliKind::I => "I",
            PauliKind::X => "X",
            PauliKind::Y => "Y",
            PauliKind::Z => "Z",
        };
        f.write_str(s)
    }
}

/// Sparse monomial operator: row `i` holds `phases[i]` at column `columns[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PauliOperator {
    columns: Vec<usize>,
    phases: Vec<Complex64>,
}

impl PauliOperator {
    /// Identity of dimension `dim`.
    pub fn identity(dim: usize) -> Self {
        Self { columns: (0..dim).collect(), phases: vec![Complex64::new(1.0, 0.0); dim] }
    }

    /// Tensor product of a Pauli string, qubit 0 first.
    pub fn from_paulis(paulis: &[PauliKind]) -> Self {
        paulis.iter().fold(Self::identity(1), |acc, p| acc.kron(&p.monomial()))
    }

    /// Kronecker product `self ⊗ other`, kept sparse.
    pub fn kron(&self, other: &PauliOperator) -> Self {
        let dim_b = other.dim();
        let dim = self.dim() * dim_b;
        let mut columns = Vec::with_capacity(dim);
        let mut phases = Vec::with_capacity(dim);
        for (col_a, ph_a) in self.columns.iter().zip(self.phases.iter()) {
            for (col_b, ph_b) in other.columns.iter().zip(other.phases.iter()) {
                columns.push(col_a * dim_b + col_b);
                phases.push(ph_a * ph_b);
            }
        }
        Self { columns, phases }
    }

    /// Side length of the operator.
    pub fn dim(&self) -> usize {
        self.columns.len()
    }

    /// `<ψ|P|ψ>`, real for Hermitian `P`.
    pub fn expectation(&self, state: &AmplitudeVector) -> Result<f64, QuantumError> {
        self.check_dim(state)?;
        let amps = state.amplitudes();
        let value: Complex64 = amps
            .iter()
            .zip(self.columns.iter().zip(self.phases.iter()))
            .map(|(psi_i, (&col, phase))| psi_i.conj() * phase * amps[col])
            .sum();
        Ok(value.re)
    }

    /// `P|ψ>`.
    pub fn apply(&self, state: &AmplitudeVector) -> Result<AmplitudeVector, QuantumError> {
        self.check_dim(state)?;
        let amps = state.amplitudes();
        let out = self.columns.iter().zip(self.phases.iter()).map(|(&col, phase)| phase * amps[col]).collect();
        AmplitudeVector::new(out)
    }

    fn check_dim(&self, state: &AmplitudeVector) -> Result<(), QuantumError> {
        if state.dim() != self.dim() {
            return Err(QuantumError::DimensionMismatch { expected: self.dim(), actual: state.dim() });
        }
        Ok(())
    }
}

/// A stabilizer generator: one Pauli type applied to every qubit in `support`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilizerGenerator {
    /// Pauli applied on every support qubit. X-type generators detect Z
    /// errors and Z-type generators detect X errors.
    pub pauli: PauliKind,
    /// Physical qubit indices the generator acts on, ascending.
    pub support: Vec<usize>,
}

impl StabilizerGenerator {
    /// Generator of `pauli` over `support`.
    pub fn new(pauli: PauliKind, support: Vec<usize>) -> Self {
        Self { pauli, support }
    }

    /// Builds a generator from a 0/1 mask over the qubits.
    pub fn from_mask(pauli: PauliKind, mask: &[u8]) -> Self {
        let support = mask.iter().enumerate().filter(|(_, b)| **b == 1).map(|(q, _)| q).collect();
        Self { pauli, support }
    }

    /// Full-register operator on `num_qubits` qubits.
    pub fn operator(&self, num_qubits: usize) -> PauliOperator {
        let paulis: Vec<PauliKind> = (0..num_qubits)
            .map(|q| if self.support.contains(&q) { self.pauli } else { PauliKind::I })
            .collect();
        PauliOperator::from_paulis(&paulis)
    }

    /// Expectation value on `state`, in `[-1, 1]` for normalized states.
    pub fn expectation(&self, state: &AmplitudeVector) -> Result<f64, QuantumError> {
        validate_targets(&self.support, state.num_qubits())?;
        self.operator(state.num_qubits()).expectation(state)
    }

    /// `true` if a single `pauli` error on `qubit` flips this generator's sign.
    pub fn anticommutes_with(&self, pauli: PauliKind, qubit: usize) -> bool {
        self.support.contains(&qubit) && !self.pauli.commutes_with(pauli)
    }

    /// `true` if the two generators commute as operators.
    pub fn commutes_with(&self, other: &StabilizerGenerator) -> bool {
        if self.pauli.commutes_with(other.pauli) {
            return true;
        }
        let overlap = self.support.iter().filter(|q| other.support.contains(q)).count();
        overlap % 2 == 0
    }
}

impl fmt::Display for StabilizerGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for q in &self.support {
            write!(f, "{}{}", self.pauli, q)?;
        }
        Ok(())
    }
}

/// Applies a single-qubit Pauli to `qubit` through the gate applicator.
pub fn apply_pauli(
    state: &AmplitudeVector,
    pauli: PauliKind,
    qubit: usize,
) -> Result<AmplitudeVector, QuantumError> {
    match pauli.gate_kind() {
        None => {
            validate_targets(&[qubit], state.num_qubits())?;
            Ok(state.clone())
        }
        Some(kind) => {
            let matrix = GateLibrary::global().resolve(kind, &GateParams::new())?;
            apply_single_qubit(state, qubit, &matrix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kron_matches_dense_layout() {
        // X ⊗ Z: |00> -> |10>, |01> -> -|11>
        let xz = PauliOperator::from_paulis(&[PauliKind::X, PauliKind::Z]);
        assert_eq!(xz.dim(), 4);
        assert_eq!(xz.columns, vec![2, 3, 0, 1]);
        assert_eq!(xz.phases[3], Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn test_expectations_on_basis_states() -> Result<(), QuantumError> {
        let one_zero = AmplitudeVector::basis_state(2, 0b10)?;
        let z0 = StabilizerGenerator::new(PauliKind::Z, vec![0]);
        let z1 = StabilizerGenerator::new(PauliKind::Z, vec![1]);
        let x0 = StabilizerGenerator::new(PauliKind::X, vec![0]);
        assert_relative_eq!(z0.expectation(&one_zero)?, -1.0);
        assert_relative_eq!(z1.expectation(&one_zero)?, 1.0);
        assert_relative_eq!(x0.expectation(&one_zero)?, 0.0);
        Ok(())
    }

    #[test]
    fn test_apply_pauli_twice_is_identity() -> Result<(), QuantumError> {
        let amps = (0..8).map(|i| Complex64::new(i as f64, 1.0)).collect();
        let state = AmplitudeVector::new(amps)?;
        for pauli in [PauliKind::X, PauliKind::Y, PauliKind::Z] {
            let twice = apply_pauli(&apply_pauli(&state, pauli, 1)?, pauli, 1)?;
            for (a, b) in twice.amplitudes().iter().zip(state.amplitudes()) {
                assert!((a - b).norm() < 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_sparse_operator_agrees_with_gate_path() -> Result<(), QuantumError> {
        let amps = (0..8).map(|i| Complex64::new(1.0, i as f64)).collect();
        let state = AmplitudeVector::new(amps)?;
        let y_on_2 = PauliOperator::from_paulis(&[PauliKind::I, PauliKind::I, PauliKind::Y]);
        let sparse = y_on_2.apply(&state)?;
        let gate = apply_pauli(&state, PauliKind::Y, 2)?;
        for (a, b) in sparse.amplitudes().iter().zip(gate.amplitudes()) {
            assert!((a - b).norm() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_generator_commutation() {
        let x = StabilizerGenerator::new(PauliKind::X, vec![0, 1, 2]);
        let z_even = StabilizerGenerator::new(PauliKind::Z, vec![1, 2, 5]);
        let z_odd = StabilizerGenerator::new(PauliKind::Z, vec![2, 5]);
        assert!(x.commutes_with(&z_even));
        assert!(!x.commutes_with(&z_odd));
        assert!(x.anticommutes_with(PauliKind::Z, 0));
        assert!(!x.anticommutes_with(PauliKind::X, 0));
        assert!(!x.anticommutes_with(PauliKind::Z, 4));
    }
}
