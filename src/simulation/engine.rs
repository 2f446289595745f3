// src/simulation/engine.rs

//! Gate application on amplitude vectors.
//!
//! Three paths:
//! * direct bit-indexed update for one qubit and for adjacent qubit pairs,
//!   O(2^n);
//! * dense expansion of the local matrix to a full `2^n x 2^n` operator,
//!   O(4^n) in time and memory, used for non-adjacent pairs and, on request,
//!   for wider gates;
//! * local contraction, which applies a k-qubit matrix slice by slice in
//!   O(2^n * 2^k) without building the full operator.
//!
//! All paths are pure: they read the input state and return a new one.

use crate::config::MultiQubitStrategy;
use crate::core::{AmplitudeVector, QuantumError};
use crate::operations::{Gate, Matrix};
use crate::validation::{check_normalization, validate_targets};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use num_traits::Zero;
use tracing::{debug, trace};

/// Applies `gate` on the fast path.
///
/// Single-qubit gates and adjacent two-qubit gates are applied directly;
/// non-adjacent pairs fall back to dense expansion. Gates on more than two
/// qubits are refused here and must go through [`apply_general`] or
/// [`apply_contracted`] explicitly.
pub fn apply(state: &AmplitudeVector, gate: &Gate) -> Result<AmplitudeVector, QuantumError> {
    gate.validate_for(state.num_qubits())?;
    match gate.arity() {
        1 => apply_single_qubit(state, gate.targets()[0], gate.matrix()),
        2 if gate.is_adjacent_pair() => {
            let targets = gate.targets();
            apply_two_qubit(state, targets[0], targets[1], gate.matrix())
        }
        2 => {
            debug!(gate = %gate, "non-adjacent pair, using dense expansion");
            apply_general(state, gate)
        }
        arity => Err(QuantumError::UnsupportedArity {
            arity,
            message: "gates wider than two qubits need apply_general or apply_contracted".to_string(),
        }),
    }
}

/// Applies `gate` of any arity by expanding it to the full operator.
///
/// Exponential in both time and space; only reasonable for the small
/// registers allowed at the service boundary.
pub fn apply_general(
    state: &AmplitudeVector,
    gate: &Gate,
) -> Result<AmplitudeVector, QuantumError> {
    let full = expand_operator(gate.matrix(), gate.targets(), state.num_qubits())?;
    let psi = Array1::from(state.amplitudes().to_vec());
    AmplitudeVector::new(full.dot(&psi).to_vec())
}

/// Applies `gate` of any arity by local contraction over amplitude slices.
pub fn apply_contracted(
    state: &AmplitudeVector,
    gate: &Gate,
) -> Result<AmplitudeVector, QuantumError> {
    let n = state.num_qubits();
    validate_targets(gate.targets(), n)?;
    check_matrix_side(gate.matrix(), gate.arity())?;

    let k = gate.arity();
    let positions: Vec<usize> = gate.targets().iter().map(|&t| state.bit_position(t)).collect();
    let mut sorted_positions = positions.clone();
    sorted_positions.sort_unstable();

    let local_dim = 1usize << k;
    let matrix = gate.matrix();
    let input = state.amplitudes();
    let mut output = vec![Complex64::zero(); state.dim()];
    let mut indices = vec![0usize; local_dim];
    let mut psi = vec![Complex64::zero(); local_dim];

    for i_other in 0..(state.dim() >> k) {
        let base = sorted_positions.iter().fold(i_other, |acc, &pos| insert_zero_bit(acc, pos));
        for (local, slot) in indices.iter_mut().enumerate() {
            *slot = positions
                .iter()
                .enumerate()
                .filter(|(m, _)| (local >> (k - 1 - m)) & 1 == 1)
                .fold(base, |acc, (_, &pos)| acc | (1 << pos));
        }
        for (amp, &idx) in psi.iter_mut().zip(indices.iter()) {
            *amp = input[idx];
        }
        for (row, &idx) in indices.iter().enumerate() {
            output[idx] = (0..local_dim).map(|col| matrix[[row, col]] * psi[col]).sum();
        }
    }
    AmplitudeVector::new(output)
}

/// Builds the full `2^n x 2^n` operator for a k-qubit `matrix` on `targets`.
///
/// Entry `(i, j)` is non-zero only when `i` and `j` agree on every
/// non-target bit; it is then the local entry indexed by the target
/// sub-patterns of `i` and `j`.
pub fn expand_operator(
    matrix: &Matrix,
    targets: &[usize],
    num_qubits: usize,
) -> Result<Matrix, QuantumError> {
    validate_targets(targets, num_qubits)?;
    check_matrix_side(matrix, targets.len())?;

    let dim = 1usize << num_qubits;
    let k = targets.len();
    let positions: Vec<usize> = targets.iter().map(|&t| num_qubits - 1 - t).collect();
    let target_mask = positions.iter().fold(0usize, |acc, &p| acc | (1 << p));
    let spectator_mask = !target_mask & (dim - 1);
    let sub_pattern = |index: usize| -> usize {
        positions
            .iter()
            .enumerate()
            .fold(0usize, |acc, (m, &p)| acc | (((index >> p) & 1) << (k - 1 - m)))
    };

    let mut full = Array2::<Complex64>::zeros((dim, dim));
    for i in 0..dim {
        let row = sub_pattern(i);
        for j in 0..dim {
            if (i ^ j) & spectator_mask == 0 {
                full[[i, j]] = matrix[[row, sub_pattern(j)]];
            }
        }
    }
    trace!(num_qubits, arity = k, "expanded operator");
    Ok(full)
}

/// Applies a 2x2 matrix to one qubit.
///
/// Amplitudes are visited in pairs `(i0, i1)` that differ only in the
/// target bit; each pair is replaced by `matrix * [psi_0, psi_1]`.
pub fn apply_single_qubit(
    state: &AmplitudeVector,
    target: usize,
    matrix: &Matrix,
) -> Result<AmplitudeVector, QuantumError> {
    validate_targets(&[target], state.num_qubits())?;
    check_matrix_side(matrix, 1)?;

    let k = state.bit_position(target);
    let k_mask = 1usize << k;
    let input = state.amplitudes();
    let mut new_vec = vec![Complex64::zero(); state.dim()];

    for i in 0..state.dim() / 2 {
        let i0 = insert_zero_bit(i, k);
        let i1 = i0 | k_mask;
        let psi_0 = input[i0];
        let psi_1 = input[i1];
        new_vec[i0] = matrix[[0, 0]] * psi_0 + matrix[[0, 1]] * psi_1;
        new_vec[i1] = matrix[[1, 0]] * psi_0 + matrix[[1, 1]] * psi_1;
    }
    AmplitudeVector::new(new_vec)
}

/// Applies a 4x4 matrix to the pair `(first, second)`; `first` is the more
/// significant bit of the local index.
pub fn apply_two_qubit(
    state: &AmplitudeVector,
    first: usize,
    second: usize,
    matrix: &Matrix,
) -> Result<AmplitudeVector, QuantumError> {
    validate_targets(&[first, second], state.num_qubits())?;
    check_matrix_side(matrix, 2)?;

    let p1 = state.bit_position(first);
    let p2 = state.bit_position(second);
    let (low, high) = (p1.min(p2), p1.max(p2));
    let input = state.amplitudes();
    let mut new_vec = vec![Complex64::zero(); state.dim()];

    for i_other in 0..state.dim() / 4 {
        let base = insert_zero_bit(insert_zero_bit(i_other, low), high);
        // Local basis |b_first b_second>: 00, 01, 10, 11
        let indices = [base, base | (1 << p2), base | (1 << p1), base | (1 << p1) | (1 << p2)];
        let psi = indices.map(|idx| input[idx]);
        for (row, &idx) in indices.iter().enumerate() {
            new_vec[idx] = (0..4).map(|col| matrix[[row, col]] * psi[col]).sum();
        }
    }
    AmplitudeVector::new(new_vec)
}

/// Inserts a zero at bit `pos`, shifting the higher bits up by one.
#[inline]
fn insert_zero_bit(value: usize, pos: usize) -> usize {
    let low_mask = (1usize << pos) - 1;
    ((value & !low_mask) << 1) | (value & low_mask)
}

fn check_matrix_side(matrix: &Matrix, arity: usize) -> Result<(), QuantumError> {
    let expected = 1usize << arity;
    let (rows, cols) = matrix.dim();
    if rows != expected || cols != expected {
        return Err(QuantumError::DimensionMismatch { expected, actual: rows.max(cols) });
    }
    Ok(())
}

/// Owns the evolving state of one circuit run and picks the application
/// path for each gate.
pub(crate) struct SimulationEngine {
    state: AmplitudeVector,
    strategy: MultiQubitStrategy,
    dense_expansion_max_qubits: usize,
}

impl SimulationEngine {
    pub(crate) fn init(
        state: AmplitudeVector,
        strategy: MultiQubitStrategy,
        dense_expansion_max_qubits: usize,
    ) -> Self {
        Self { state, strategy, dense_expansion_max_qubits }
    }

    /// Applies one gate, routing wide gates by the configured strategy.
    pub(crate) fn apply_gate(&mut self, gate: &Gate) -> Result<(), QuantumError> {
        let next = if gate.arity() <= 2 {
            apply(&self.state, gate)?
        } else {
            gate.validate_for(self.state.num_qubits())?;
            match self.strategy {
                MultiQubitStrategy::LocalContraction => apply_contracted(&self.state, gate)?,
                MultiQubitStrategy::DenseExpansion => {
                    if self.state.num_qubits() > self.dense_expansion_max_qubits {
                        return Err(QuantumError::UnsupportedArity {
                            arity: gate.arity(),
                            message: format!(
                                "dense expansion is limited to {} qubits; use local contraction",
                                self.dense_expansion_max_qubits
                            ),
                        });
                    }
                    debug!(gate = %gate, num_qubits = self.state.num_qubits(), "dense expansion path");
                    apply_general(&self.state, gate)?
                }
            }
        };
        self.state = next;
        Ok(())
    }

    pub(crate) fn validate_state(&self, tolerance: f64) -> Result<(), QuantumError> {
        check_normalization(&self.state, Some(tolerance))
    }

    pub(crate) fn into_state(self) -> AmplitudeVector {
        self.state
    }
}
