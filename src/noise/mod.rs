// src/noise/mod.rs

//! Independent Pauli noise on physical qubits.
//!
//! Each qubit takes an error with the configured probability. The kind is
//! drawn uniformly from bit flip, phase flip and both. Randomness always
//! comes from the caller's generator so runs replay under a fixed seed.

use crate::core::{AmplitudeVector, QuantumError};
use crate::correction::{PauliKind, apply_pauli};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use tracing::trace;

/// Kind of injected error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Pauli X.
    BitFlip,
    /// Pauli Z.
    PhaseFlip,
    /// X followed by Z.
    Both,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 3] = [ErrorKind::BitFlip, ErrorKind::PhaseFlip, ErrorKind::Both];

    /// Paulis applied for this kind, in application order.
    pub fn paulis(self) -> &'static [PauliKind] {
        match self {
            ErrorKind::BitFlip => &[PauliKind::X],
            ErrorKind::PhaseFlip => &[PauliKind::Z],
            ErrorKind::Both => &[PauliKind::X, PauliKind::Z],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::BitFlip => "bit_flip",
            ErrorKind::PhaseFlip => "phase_flip",
            ErrorKind::Both => "both",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One injected error.
#[derive(Debug, Clone, PartialEq)]
pub struct QubitError {
    pub qubit: usize,
    pub kind: ErrorKind,
    pub timestamp: SystemTime,
    /// Per-qubit probability in effect when the error was drawn.
    pub probability: f64,
    /// Set once a correction covering this error has been applied.
    pub corrected: bool,
}

impl QubitError {
    pub fn new(qubit: usize, kind: ErrorKind, probability: f64) -> Self {
        Self { qubit, kind, timestamp: SystemTime::now(), probability, corrected: false }
    }
}

/// Bernoulli-per-qubit Pauli noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorInjector {
    probability: f64,
}

impl ErrorInjector {
    /// Fails unless `probability` lies in `[0, 1]`.
    pub fn new(probability: f64) -> Result<Self, QuantumError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(QuantumError::invalid_parameter(format!(
                "error probability must lie in [0, 1], got {}",
                probability
            )));
        }
        Ok(Self { probability })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Draws errors for every qubit of `state` and applies them.
    pub fn inject<R: Rng>(
        &self,
        state: &AmplitudeVector,
        rng: &mut R,
    ) -> Result<(AmplitudeVector, Vec<QubitError>), QuantumError> {
        let mut noisy = state.clone();
        let mut errors = Vec::new();
        if self.probability == 0.0 {
            return Ok((noisy, errors));
        }
        for qubit in 0..state.num_qubits() {
            if !rng.random_bool(self.probability) {
                continue;
            }
            let kind = ErrorKind::ALL[rng.random_range(0..ErrorKind::ALL.len())];
            noisy = Self::apply_error(&noisy, kind, qubit)?;
            trace!(qubit, kind = %kind, "injected error");
            errors.push(QubitError::new(qubit, kind, self.probability));
        }
        Ok((noisy, errors))
    }

    /// Applies one error of `kind` to `qubit`.
    pub fn apply_error(
        state: &AmplitudeVector,
        kind: ErrorKind,
        qubit: usize,
    ) -> Result<AmplitudeVector, QuantumError> {
        let mut out = state.clone();
        for &pauli in kind.paulis() {
            out = apply_pauli(&out, pauli, qubit)?;
        }
        Ok(out)
    }
}
