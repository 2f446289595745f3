//! Error handling logic

use thiserror::Error;

/// Error types raised by the simulation kernel and the correction layer.
///
/// Validation failures are reported straight back to the caller and never
/// retried internally. `NormDrift` signals an internal-consistency problem
/// (a gate sequence that stopped preserving the norm) and is never papered
/// over by renormalizing.
///
/// Uncorrectable syndromes are not errors: they show up as reduced fidelity
/// in the correction outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantumError {
    /// Requested register is larger than the configured ceiling.
    #[error("Qubit limit exceeded: {requested} qubits requested, maximum is {max}")]
    QubitLimitExceeded {
        /// Number of qubits asked for
        requested: usize,
        /// Configured ceiling
        max: usize,
    },

    /// A gate or error targets a qubit outside the register.
    #[error("Qubit index {index} out of range for a {num_qubits}-qubit register")]
    QubitOutOfRange {
        /// Offending index
        index: usize,
        /// Register width
        num_qubits: usize,
    },

    /// The same qubit appears twice in one target list.
    #[error("Duplicate qubit index found: {0}")]
    DuplicateQubit(usize),

    /// The gate arity is not handled by the chosen application path.
    #[error("Unsupported gate arity {arity}: {message}")]
    UnsupportedArity {
        /// Number of target qubits
        arity: usize,
        /// What the caller should do instead
        message: String,
    },

    /// Gate name did not resolve to a known or constructible gate.
    #[error("Unknown gate kind '{kind}'")]
    UnknownGateKind {
        /// The name that failed to resolve
        kind: String,
    },

    /// Correction code name is not one of the implemented codes.
    #[error("Unsupported correction code '{code}'")]
    UnsupportedCode {
        /// The name that failed to resolve
        code: String,
    },

    /// Shot count is zero or above the configured ceiling.
    #[error("Invalid shot count {shots}: must be between 1 and {max}")]
    InvalidShotCount {
        /// Requested shots
        shots: usize,
        /// Configured ceiling
        max: usize,
    },

    /// A numeric parameter (probability, angle, distance, tolerance) is out of domain.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Failure message
        message: String,
    },

    /// A matrix offered as a gate is not unitary within tolerance.
    #[error("Matrix for gate '{kind}' is not unitary (U\u{2020}U != I)")]
    NonUnitary {
        /// Gate kind the matrix was supplied for
        kind: String,
    },

    /// Two objects that must agree in size do not.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Required dimension
        expected: usize,
        /// Supplied dimension
        actual: usize,
    },

    /// State norm drifted beyond tolerance.
    #[error("State norm drifted: sum |c_i|^2 = {norm_sqr} (tolerance {tolerance})")]
    NormDrift {
        /// Observed squared norm
        norm_sqr: f64,
        /// Tolerance that was exceeded
        tolerance: f64,
    },

    /// A boundary payload could not be parsed or written as JSON.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Message from the JSON layer
        message: String,
    },
}

impl From<serde_json::Error> for QuantumError {
    fn from(err: serde_json::Error) -> Self {
        QuantumError::Serialization { message: err.to_string() }
    }
}

impl QuantumError {
    /// Shorthand for building an `InvalidParameter` error.
    pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
        QuantumError::InvalidParameter { message: message.into() }
    }
}
