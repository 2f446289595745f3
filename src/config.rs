// src/config.rs

//! Limits and tolerances for the simulator and the fault-tolerance service.
//!
//! Both configs deserialize from partial JSON (missing fields take their
//! defaults), so the surrounding service can pass through whatever subset it
//! overrides.

use crate::core::QuantumError;
use crate::core::constants::limits::{MAX_PHYSICAL_QUBITS, MAX_SHOTS, MAX_SIMULATION_QUBITS};
use crate::core::constants::tolerances::NORM_TOLERANCE;
use serde::{Deserialize, Serialize};

/// How gates acting on more than two qubits are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiQubitStrategy {
    /// Materialize the full `2^n x 2^n` operator and multiply. O(4^n).
    #[default]
    DenseExpansion,
    /// Apply the local matrix to each amplitude slice. O(2^n * 2^k).
    LocalContraction,
}

/// Settings for circuit simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Largest register a circuit may use.
    pub max_qubits: usize,
    /// Largest shot count per run.
    pub max_shots: usize,
    /// Allowed deviation of the final norm from 1.0.
    pub norm_tolerance: f64,
    /// Path for gates with more than two targets.
    pub multi_qubit_strategy: MultiQubitStrategy,
    /// Dense expansion is refused above this register width.
    pub dense_expansion_max_qubits: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: MAX_SIMULATION_QUBITS,
            max_shots: MAX_SHOTS,
            norm_tolerance: NORM_TOLERANCE,
            multi_qubit_strategy: MultiQubitStrategy::default(),
            dense_expansion_max_qubits: MAX_SIMULATION_QUBITS,
        }
    }
}

impl SimulatorConfig {
    /// Overrides `max_qubits`.
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Overrides `max_shots`.
    pub fn with_max_shots(mut self, max_shots: usize) -> Self {
        self.max_shots = max_shots;
        self
    }

    /// Overrides the multi-qubit strategy.
    pub fn with_strategy(mut self, strategy: MultiQubitStrategy) -> Self {
        self.multi_qubit_strategy = strategy;
        self
    }

    /// Rejects values the simulator cannot honor.
    pub fn validate(&self) -> Result<(), QuantumError> {
        if self.max_qubits == 0 || self.max_qubits >= usize::BITS as usize {
            return Err(QuantumError::invalid_parameter(format!("max_qubits out of range: {}", self.max_qubits)));
        }
        if self.max_shots == 0 {
            return Err(QuantumError::invalid_parameter("max_shots must be at least 1"));
        }
        check_tolerance(self.norm_tolerance)
    }
}

/// Settings for encoded-qubit correction cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultToleranceConfig {
    /// Largest physical register a code may encode into.
    pub max_physical_qubits: usize,
    /// Distance used when a surface code is requested without one.
    pub default_surface_distance: usize,
    /// Allowed deviation of the logical input norm from 1.0.
    pub norm_tolerance: f64,
    /// Largest number of cycles per run.
    pub max_cycles: usize,
}

impl Default for FaultToleranceConfig {
    fn default() -> Self {
        Self {
            max_physical_qubits: MAX_PHYSICAL_QUBITS,
            default_surface_distance: 3,
            norm_tolerance: NORM_TOLERANCE,
            max_cycles: 1_000,
        }
    }
}

impl FaultToleranceConfig {
    /// Rejects values the service cannot honor.
    pub fn validate(&self) -> Result<(), QuantumError> {
        if self.max_physical_qubits == 0 || self.max_physical_qubits >= usize::BITS as usize {
            return Err(QuantumError::invalid_parameter(format!(
                "max_physical_qubits out of range: {}",
                self.max_physical_qubits
            )));
        }
        if self.default_surface_distance < 2 {
            return Err(QuantumError::invalid_parameter("surface code distance must be at least 2"));
        }
        if self.max_cycles == 0 {
            return Err(QuantumError::invalid_parameter("max_cycles must be at least 1"));
        }
        check_tolerance(self.norm_tolerance)
    }
}

fn check_tolerance(tolerance: f64) -> Result<(), QuantumError> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(QuantumError::invalid_parameter(format!("tolerance must be positive, got {}", tolerance)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: SimulatorConfig =
            serde_json::from_str(r#"{"max_qubits": 8, "multi_qubit_strategy": "local_contraction"}"#).unwrap();
        assert_eq!(cfg.max_qubits, 8);
        assert_eq!(cfg.max_shots, MAX_SHOTS);
        assert_eq!(cfg.multi_qubit_strategy, MultiQubitStrategy::LocalContraction);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(SimulatorConfig::default().with_max_shots(0).validate().is_err());
        let ft = FaultToleranceConfig { default_surface_distance: 1, ..Default::default() };
        assert!(ft.validate().is_err());
    }
}
