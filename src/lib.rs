// src/lib.rs

//! `stabq` - State-vector quantum simulation with stabilizer error correction
//!
//! The simulation half applies gates to exponentially sized amplitude
//! vectors and samples measurement histograms. The correction half encodes
//! one logical qubit with the Steane, Shor or surface code, injects Pauli
//! noise and runs repeated syndrome/correction cycles, tracking how well the
//! logical state survives.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod config;
pub mod correction;
pub mod noise;
pub mod fault_tolerance;
pub mod interface;

// Re-export the most common types for easier top-level use
pub use core::{AmplitudeVector, QuantumError};
pub use operations::{Gate, GateKind, GateLibrary, GateParams, Matrix};
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{Histogram, SimulationResult, Simulator};
pub use config::{FaultToleranceConfig, MultiQubitStrategy, SimulatorConfig};
pub use correction::{CorrectionCode, CorrectionOutcome, Corrector, PauliKind, SyndromeResult};
pub use noise::{ErrorInjector, ErrorKind, QubitError};
pub use fault_tolerance::{ErrorStatistics, FaultToleranceReport, FaultTolerantService};
pub use validation::{check_normalization, validate_logical_state};
pub use interface::{CircuitRequest, FaultToleranceRequest, FaultToleranceResponse, SimulationResponse};

// Example 1: Bell pair
// A Hadamard followed by a CNOT entangles two qubits; only the correlated
// outcomes 00 and 11 are ever sampled.
/// ```
/// use stabq::{CircuitBuilder, QuantumError, Simulator};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build()?;
/// println!("Circuit:\n{}", circuit);
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let result = Simulator::new().run(&circuit, 1000, &mut rng)?;
/// println!("Result:\n{}", result);
///
/// assert_eq!(result.count("00") + result.count("11"), 1000);
/// assert_eq!(result.count("01") + result.count("10"), 0);
/// assert!((result.probabilities()[3] - 0.5).abs() < 1e-12);
/// # Ok::<(), QuantumError>(())
/// ```
#[doc(hidden)]
const _: () = ();

// Example 2: Steane code under noise
// Encodes |+> into seven qubits and runs ten noisy correction cycles. Any
// single error per cycle is undone, so the logical state survives unless
// two errors land in the same cycle.
/// ```
/// use stabq::{AmplitudeVector, CorrectionCode, FaultTolerantService, QuantumError};
/// use num_complex::Complex64;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let h = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
/// let plus = AmplitudeVector::qubit(h, h);
///
/// let mut service = FaultTolerantService::new();
/// let mut rng = StdRng::seed_from_u64(7);
/// let report = service.run_cycles(&plus, CorrectionCode::Steane7, 0.01, 10, &mut rng)?;
/// println!("{}", report);
///
/// assert_eq!(report.cycles.len(), 10);
/// assert!(report.final_fidelity >= 0.0 && report.final_fidelity <= 1.0 + 1e-12);
/// assert_eq!(service.error_statistics().total_errors, report.total_errors());
/// # Ok::<(), QuantumError>(())
/// ```
#[doc(hidden)]
const _: () = ();
