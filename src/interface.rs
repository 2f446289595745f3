// src/interface.rs

//! Plain request and response shapes for the surrounding service.
//!
//! Everything here is built from strings, numbers and lists so it
//! serializes straight to JSON. Complex numbers travel as `[re, im]` pairs
//! and times as `f64` seconds (timestamps since the Unix epoch). No internal
//! type, cache or RNG state crosses this boundary.

use crate::circuits::CircuitBuilder;
use crate::config::{FaultToleranceConfig, SimulatorConfig};
use crate::core::{AmplitudeVector, QuantumError};
use crate::correction::{AppliedCorrection, CorrectionCode};
use crate::fault_tolerance::{ErrorStatistics, FaultToleranceReport, FaultTolerantService};
use crate::noise::{ErrorKind, QubitError};
use crate::operations::{Gate, GateKind, GateParams, Matrix};
use crate::simulation::{SimulationResult, Simulator};
use num_complex::Complex64;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// `[re, im]`.
pub type ComplexPair = [f64; 2];

/// One gate of a circuit request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSpec {
    /// Gate name, e.g. `"h"`, `"cnot"`, `"phase"`, `"qft"`, `"custom"`.
    pub kind: String,
    pub targets: Vec<usize>,
    /// Numeric parameters such as `theta`.
    #[serde(default)]
    pub params: GateParams,
    /// Row-major unitary for `"custom"` gates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<ComplexPair>>>,
}

/// A circuit to simulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitRequest {
    pub num_qubits: usize,
    #[serde(default)]
    pub gates: Vec<GateSpec>,
    pub shots: usize,
    /// Start state; |0...0> when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<Vec<ComplexPair>>,
    /// Sampling seed; fresh entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub counts: BTreeMap<String, usize>,
    pub probabilities: Vec<f64>,
    pub amplitudes: Vec<ComplexPair>,
    pub simulation_time: f64,
    pub num_qubits: usize,
    pub num_gates: usize,
    pub shots: usize,
}

impl From<&SimulationResult> for SimulationResponse {
    fn from(result: &SimulationResult) -> Self {
        Self {
            counts: result.counts().iter().map(|(k, v)| (k.clone(), *v)).collect(),
            probabilities: result.probabilities().to_vec(),
            amplitudes: to_pairs(result.state()),
            simulation_time: result.simulation_time().as_secs_f64(),
            num_qubits: result.num_qubits(),
            num_gates: result.num_gates(),
            shots: result.shots(),
        }
    }
}

fn default_error_rate() -> f64 {
    0.001
}

fn default_num_cycles() -> usize {
    1
}

/// A fault-tolerance run on one logical qubit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultToleranceRequest {
    /// Two amplitudes `[alpha, beta]`.
    pub logical_state: Vec<ComplexPair>,
    /// `"steane_7"`, `"shor_9"`, `"surface"` or `"surface_<d>"`.
    pub code: String,
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,
    #[serde(default = "default_num_cycles")]
    pub num_cycles: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitErrorReport {
    pub qubit: usize,
    pub error_type: ErrorKind,
    pub timestamp: f64,
    pub probability: f64,
    pub corrected: bool,
}

impl From<&QubitError> for QubitErrorReport {
    fn from(e: &QubitError) -> Self {
        Self {
            qubit: e.qubit,
            error_type: e.kind,
            timestamp: epoch_seconds(e.timestamp),
            probability: e.probability,
            corrected: e.corrected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: usize,
    pub errors_detected: usize,
    pub syndrome: Vec<u8>,
    pub syndrome_confidence: f64,
    pub corrections: Vec<AppliedCorrection>,
    pub uncorrectable: bool,
    pub logical_fidelity: f64,
    pub cycle_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultToleranceResponse {
    pub initial_logical_state: Vec<ComplexPair>,
    pub code: String,
    pub error_rate: f64,
    pub cycles: Vec<CycleReport>,
    pub final_logical_state: Vec<ComplexPair>,
    pub final_fidelity: f64,
    /// Every error injected during the run.
    pub errors: Vec<QubitErrorReport>,
    pub statistics: ErrorStatistics,
}

impl FaultToleranceResponse {
    fn new(report: &FaultToleranceReport, statistics: ErrorStatistics) -> Self {
        let cycles = report
            .cycles
            .iter()
            .map(|c| CycleReport {
                cycle: c.cycle,
                errors_detected: c.errors_detected(),
                syndrome: c.syndrome.bits.clone(),
                syndrome_confidence: c.syndrome.confidence,
                corrections: c.corrections.clone(),
                uncorrectable: c.uncorrectable,
                logical_fidelity: c.logical_fidelity,
                cycle_time: c.cycle_time.as_secs_f64(),
            })
            .collect();
        let errors = report.cycles.iter().flat_map(|c| c.errors.iter().map(QubitErrorReport::from)).collect();
        Self {
            initial_logical_state: to_pairs(&report.initial_logical_state),
            code: report.code.label(),
            error_rate: report.error_rate,
            cycles,
            final_logical_state: to_pairs(&report.final_logical_state),
            final_fidelity: report.final_fidelity,
            errors,
            statistics,
        }
    }
}

/// Builds, runs and samples the requested circuit.
pub fn simulate(
    request: &CircuitRequest,
    config: &SimulatorConfig,
) -> Result<SimulationResponse, QuantumError> {
    let simulator = Simulator::with_config(config.clone())?;
    // Checked before any register is allocated.
    if request.num_qubits > config.max_qubits {
        return Err(QuantumError::QubitLimitExceeded { requested: request.num_qubits, max: config.max_qubits });
    }

    let mut builder = CircuitBuilder::new(request.num_qubits);
    if let Some(pairs) = &request.initial_state {
        builder = builder.with_initial_state(from_pairs(pairs)?);
    }
    for spec in &request.gates {
        builder = builder.gate(gate_from_spec(spec));
    }
    let circuit = builder.build()?;

    let mut rng = seeded(request.seed);
    let result = simulator.run(&circuit, request.shots, &mut rng)?;
    debug!(num_qubits = request.num_qubits, shots = request.shots, "served simulation request");
    Ok(SimulationResponse::from(&result))
}

/// Runs the requested correction cycles on a fresh service.
pub fn run_fault_tolerance(
    request: &FaultToleranceRequest,
    config: &FaultToleranceConfig,
) -> Result<FaultToleranceResponse, QuantumError> {
    let code = CorrectionCode::parse_with_distance(&request.code, config.default_surface_distance)?;
    let logical = from_pairs(&request.logical_state)?;
    let mut service = FaultTolerantService::with_config(config.clone())?;
    let mut rng = seeded(request.seed);
    let report = service.run_cycles(&logical, code, request.error_rate, request.num_cycles, &mut rng)?;
    Ok(FaultToleranceResponse::new(&report, service.error_statistics()))
}

/// [`simulate`] with JSON in and out.
pub fn simulate_json(request: &str, config: &SimulatorConfig) -> Result<String, QuantumError> {
    let request: CircuitRequest = serde_json::from_str(request)?;
    Ok(serde_json::to_string(&simulate(&request, config)?)?)
}

/// [`run_fault_tolerance`] with JSON in and out.
pub fn run_fault_tolerance_json(
    request: &str,
    config: &FaultToleranceConfig,
) -> Result<String, QuantumError> {
    let request: FaultToleranceRequest = serde_json::from_str(request)?;
    Ok(serde_json::to_string(&run_fault_tolerance(&request, config)?)?)
}

/// Resolves a [`GateSpec`] into a gate.
pub fn gate_from_spec(spec: &GateSpec) -> Result<Gate, QuantumError> {
    let kind: GateKind = spec.kind.parse()?;
    if kind != GateKind::Custom {
        return Gate::new(kind, spec.targets.clone(), spec.params.clone());
    }
    let rows = spec
        .matrix
        .as_ref()
        .ok_or_else(|| QuantumError::invalid_parameter("custom gate needs a matrix"))?;
    let side = rows.len();
    if rows.iter().any(|r| r.len() != side) {
        return Err(QuantumError::invalid_parameter("custom gate matrix must be square"));
    }
    let entries: Vec<Complex64> = rows.iter().flatten().map(|[re, im]| Complex64::new(*re, *im)).collect();
    let matrix = Matrix::from_shape_vec((side, side), entries)
        .map_err(|e| QuantumError::invalid_parameter(format!("custom gate matrix: {}", e)))?;
    Gate::custom(matrix, spec.targets.clone())
}

/// Amplitudes as `[re, im]` pairs.
pub fn to_pairs(state: &AmplitudeVector) -> Vec<ComplexPair> {
    state.amplitudes().iter().map(|c| [c.re, c.im]).collect()
}

/// State from `[re, im]` pairs. The length must be a power of two.
pub fn from_pairs(pairs: &[ComplexPair]) -> Result<AmplitudeVector, QuantumError> {
    AmplitudeVector::new(pairs.iter().map(|[re, im]| Complex64::new(*re, *im)).collect())
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

fn epoch_seconds(t: SystemTime) -> f64 {
    t.duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}
