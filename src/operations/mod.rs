// src/operations/mod.rs

//! Gate descriptions: what acts on which qubits, and with which matrix.
//!
//! A [`Gate`] couples a [`GateKind`] with its ordered target list, an
//! optional parameter map and the resolved matrix. Matrices for the named
//! kinds come from the process-wide [`GateLibrary`]; custom unitaries carry
//! their own.

pub mod library;

pub use library::{GateLibrary, tensor_product};

use crate::core::QuantumError;
use crate::validation::{find_duplicate, is_unitary, validate_targets};
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Dense complex matrix, side `2^k` for a k-qubit gate.
pub type Matrix = Array2<Complex64>;

/// Named numeric gate parameters (`theta`, `n_qubits`).
/// Ordered so that the serialized cache key is deterministic.
pub type GateParams = BTreeMap<String, f64>;

/// Parameter name for rotation angles.
pub const PARAM_THETA: &str = "theta";
/// Parameter name for the width of QFT and diffuser gates.
pub const PARAM_N_QUBITS: &str = "n_qubits";

/// The gate kinds known to the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// Bit flip.
    PauliX,
    /// Combined bit and phase flip.
    PauliY,
    /// Phase flip.
    PauliZ,
    /// Hadamard.
    Hadamard,
    /// Phase by π/2.
    S,
    /// Phase by π/4.
    T,
    /// Controlled-NOT, first target is the control.
    Cnot,
    /// Exchange of two qubits.
    Swap,
    /// `diag(1, e^{iθ})`.
    Phase,
    /// `diag(1, 1, 1, e^{iθ})`.
    ControlledPhase,
    /// Quantum Fourier transform over all targets.
    Qft,
    /// Amplitude-amplification diffuser `2|s><s| - I` over all targets.
    Diffuser,
    /// Caller-supplied unitary.
    Custom,
}

impl GateKind {
    /// Canonical lowercase name, also used as the cache key prefix.
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::PauliX => "pauli_x",
            GateKind::PauliY => "pauli_y",
            GateKind::PauliZ => "pauli_z",
            GateKind::Hadamard => "hadamard",
            GateKind::S => "s",
            GateKind::T => "t_gate",
            GateKind::Cnot => "cnot",
            GateKind::Swap => "swap",
            GateKind::Phase => "phase",
            GateKind::ControlledPhase => "controlled_phase",
            GateKind::Qft => "qft",
            GateKind::Diffuser => "grover_diffuser",
            GateKind::Custom => "custom",
        }
    }

    /// Number of targets the kind always acts on, or `None` when it is
    /// given by the target list (`Qft`, `Diffuser`, `Custom`).
    pub fn fixed_arity(&self) -> Option<usize> {
        match self {
            GateKind::PauliX
            | GateKind::PauliY
            | GateKind::PauliZ
            | GateKind::Hadamard
            | GateKind::S
            | GateKind::T
            | GateKind::Phase => Some(1),
            GateKind::Cnot | GateKind::Swap | GateKind::ControlledPhase => Some(2),
            GateKind::Qft | GateKind::Diffuser | GateKind::Custom => None,
        }
    }

    /// `true` if the matrix depends on parameters.
    pub fn is_parametrized(&self) -> bool {
        matches!(
            self,
            GateKind::Phase | GateKind::ControlledPhase | GateKind::Qft | GateKind::Diffuser
        )
    }

    /// Short label used in circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            GateKind::PauliX => "X",
            GateKind::PauliY => "Y",
            GateKind::PauliZ => "Z",
            GateKind::Hadamard => "H",
            GateKind::S => "S",
            GateKind::T => "T",
            GateKind::Cnot => "X",
            GateKind::Swap => "x",
            GateKind::Phase => "P",
            GateKind::ControlledPhase => "P",
            GateKind::Qft => "QFT",
            GateKind::Diffuser => "D",
            GateKind::Custom => "U",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GateKind {
    type Err = QuantumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "x" | "pauli_x" | "not" => GateKind::PauliX,
            "y" | "pauli_y" => GateKind::PauliY,
            "z" | "pauli_z" => GateKind::PauliZ,
            "h" | "hadamard" => GateKind::Hadamard,
            "s" | "s_gate" => GateKind::S,
            "t" | "t_gate" => GateKind::T,
            "cnot" | "cx" => GateKind::Cnot,
            "swap" => GateKind::Swap,
            "phase" | "p" => GateKind::Phase,
            "cphase" | "cp" | "controlled_phase" => GateKind::ControlledPhase,
            "qft" => GateKind::Qft,
            "grover_diffuser" | "diffuser" => GateKind::Diffuser,
            "custom" => GateKind::Custom,
            _ => return Err(QuantumError::UnknownGateKind { kind: s.to_string() }),
        };
        Ok(kind)
    }
}

/// A gate bound to its target qubits.
///
/// The first target is the most significant bit of the local matrix index,
/// so `Gate::cnot(c, t)` reads "control `c`, target `t`".
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    kind: GateKind,
    targets: Vec<usize>,
    params: GateParams,
    matrix: Arc<Matrix>,
}

impl Gate {
    /// Builds a named gate, resolving its matrix through the global library.
    ///
    /// For `Qft` and `Diffuser` a missing `n_qubits` parameter is filled in
    /// from the target count; a present one must agree with it.
    pub fn new(
        kind: GateKind,
        targets: Vec<usize>,
        mut params: GateParams,
    ) -> Result<Self, QuantumError> {
        if kind == GateKind::Custom {
            return Err(QuantumError::UnknownGateKind {
                kind: "custom (use Gate::custom with an explicit matrix)".to_string(),
            });
        }
        check_target_list(&targets)?;

        match kind.fixed_arity() {
            Some(arity) if arity != targets.len() => {
                return Err(QuantumError::UnsupportedArity {
                    arity: targets.len(),
                    message: format!("{} acts on exactly {} qubit(s)", kind, arity),
                });
            }
            Some(_) => {}
            None => {
                let width = *params.entry(PARAM_N_QUBITS.to_string()).or_insert(targets.len() as f64);
                if width != targets.len() as f64 {
                    return Err(QuantumError::UnsupportedArity {
                        arity: targets.len(),
                        message: format!("{} declared n_qubits = {} but has {} targets", kind, width, targets.len()),
                    });
                }
            }
        }

        let matrix = GateLibrary::global().resolve(kind, &params)?;
        Ok(Self { kind, targets, params, matrix })
    }

    /// Builds a gate from an explicit unitary. The matrix side must be
    /// `2^targets.len()`.
    pub fn custom(matrix: Matrix, targets: Vec<usize>) -> Result<Self, QuantumError> {
        check_target_list(&targets)?;
        let (rows, cols) = matrix.dim();
        let expected = 1usize << targets.len();
        if rows != cols || rows != expected {
            return Err(QuantumError::DimensionMismatch { expected, actual: rows.max(cols) });
        }
        if !is_unitary(&matrix, None) {
            return Err(QuantumError::NonUnitary { kind: GateKind::Custom.name().to_string() });
        }
        Ok(Self { kind: GateKind::Custom, targets, params: GateParams::new(), matrix: Arc::new(matrix) })
    }

    /// Pauli-X on `q`.
    pub fn x(q: usize) -> Result<Self, QuantumError> {
        Self::new(GateKind::PauliX, vec![q], GateParams::new())
    }

    /// Pauli-Y on `q`.
    pub fn y(q: usize) -> Result<Self, QuantumError> {
        Self::new(GateKind::PauliY, vec![q], GateParams::new())
    }

    /// Pauli-Z on `q`.
    pub fn z(q: usize) -> Result<Self, QuantumError> {
        Self::new(GateKind::PauliZ, vec![q], GateParams::new())
    }

    /// Hadamard on `q`.
    pub fn h(q: usize) -> Result<Self, QuantumError> {
        Self::new(GateKind::Hadamard, vec![q], GateParams::new())
    }

    /// S gate on `q`.
    pub fn s(q: usize) -> Result<Self, QuantumError> {
        Self::new(GateKind::S, vec![q], GateParams::new())
    }

    /// T gate on `q`.
    pub fn t(q: usize) -> Result<Self, QuantumError> {
        Self::new(GateKind::T, vec![q], GateParams::new())
    }

    /// CNOT with `control` and `target`.
    pub fn cnot(control: usize, target: usize) -> Result<Self, QuantumError> {
        Self::new(GateKind::Cnot, vec![control, target], GateParams::new())
    }

    /// SWAP of `a` and `b`.
    pub fn swap(a: usize, b: usize) -> Result<Self, QuantumError> {
        Self::new(GateKind::Swap, vec![a, b], GateParams::new())
    }

    /// `diag(1, e^{iθ})` on `q`.
    pub fn phase(q: usize, theta: f64) -> Result<Self, QuantumError> {
        Self::new(GateKind::Phase, vec![q], theta_param(theta))
    }

    /// Controlled phase between `a` and `b` (symmetric in its targets).
    pub fn controlled_phase(a: usize, b: usize, theta: f64) -> Result<Self, QuantumError> {
        Self::new(GateKind::ControlledPhase, vec![a, b], theta_param(theta))
    }

    /// QFT over `targets`, first target most significant.
    pub fn qft(targets: Vec<usize>) -> Result<Self, QuantumError> {
        Self::new(GateKind::Qft, targets, GateParams::new())
    }

    /// Diffuser over `targets`.
    pub fn diffuser(targets: Vec<usize>) -> Result<Self, QuantumError> {
        Self::new(GateKind::Diffuser, targets, GateParams::new())
    }

    /// Gate kind.
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Ordered target list.
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Parameter map as resolved (including filled-in defaults).
    pub fn params(&self) -> &GateParams {
        &self.params
    }

    /// Resolved matrix.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Number of target qubits `k`.
    pub fn arity(&self) -> usize {
        self.targets.len()
    }

    /// `true` for a two-qubit gate whose targets are neighbours.
    pub fn is_adjacent_pair(&self) -> bool {
        self.targets.len() == 2 && self.targets[0].abs_diff(self.targets[1]) == 1
    }

    /// Checks that all targets fit inside an `num_qubits`-wide register.
    pub fn validate_for(&self, num_qubits: usize) -> Result<(), QuantumError> {
        validate_targets(&self.targets, num_qubits)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.kind, self.targets)?;
        if let Some(theta) = self.params.get(PARAM_THETA) {
            write!(f, "(θ={:.4})", theta)?;
        }
        Ok(())
    }
}

fn theta_param(theta: f64) -> GateParams {
    let mut params = GateParams::new();
    params.insert(PARAM_THETA.to_string(), theta);
    params
}

fn check_target_list(targets: &[usize]) -> Result<(), QuantumError> {
    if targets.is_empty() {
        return Err(QuantumError::UnsupportedArity { arity: 0, message: "a gate needs at least one target".to_string() });
    }
    if let Some(dup) = find_duplicate(targets) {
        return Err(QuantumError::DuplicateQubit(dup));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing_accepts_aliases() -> Result<(), QuantumError> {
        assert_eq!("h".parse::<GateKind>()?, GateKind::Hadamard);
        assert_eq!("Pauli_X".parse::<GateKind>()?, GateKind::PauliX);
        assert_eq!("grover_diffuser".parse::<GateKind>()?, GateKind::Diffuser);
        assert_eq!(
            "toffoli".parse::<GateKind>(),
            Err(QuantumError::UnknownGateKind { kind: "toffoli".to_string() })
        );
        Ok(())
    }

    #[test]
    fn test_arity_must_match_kind() {
        let err = Gate::new(GateKind::Hadamard, vec![0, 1], GateParams::new()).unwrap_err();
        assert!(matches!(err, QuantumError::UnsupportedArity { arity: 2, .. }));
        let err = Gate::new(GateKind::Cnot, vec![1, 1], GateParams::new()).unwrap_err();
        assert_eq!(err, QuantumError::DuplicateQubit(1));
    }

    #[test]
    fn test_qft_width_defaults_to_target_count() -> Result<(), QuantumError> {
        let gate = Gate::qft(vec![0, 1, 2])?;
        assert_eq!(gate.params().get(PARAM_N_QUBITS), Some(&3.0));
        assert_eq!(gate.matrix().dim(), (8, 8));

        let mut params = GateParams::new();
        params.insert(PARAM_N_QUBITS.to_string(), 2.0);
        assert!(Gate::new(GateKind::Qft, vec![0, 1, 2], params).is_err());
        Ok(())
    }

    #[test]
    fn test_custom_gate_rejects_non_unitary() {
        let m = Matrix::from_elem((2, 2), Complex64::new(1.0, 0.0));
        assert!(matches!(Gate::custom(m, vec![0]), Err(QuantumError::NonUnitary { .. })));
        let wrong_size = Matrix::eye(4);
        assert!(matches!(Gate::custom(wrong_size, vec![0]), Err(QuantumError::DimensionMismatch { .. })));
    }
}
