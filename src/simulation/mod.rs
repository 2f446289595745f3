// src/simulation/mod.rs

//! Runs [`Circuit`]s: applies their gates in order to the register state and
//! samples the final state.
//!
//! The [`Simulator`] holds only configuration, so one instance can drive any
//! number of runs, including parallel batches.

mod results;
pub mod engine;
pub mod sampler;

pub use results::SimulationResult;
pub use sampler::{Histogram, Sampler, measure};

use crate::circuits::Circuit;
use crate::config::SimulatorConfig;
use crate::core::{AmplitudeVector, QuantumError};
use engine::SimulationEngine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Entry point for circuit simulation.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Creates a simulator with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator with `config`, rejecting invalid settings.
    pub fn with_config(config: SimulatorConfig) -> Result<Self, QuantumError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Applies every gate of `circuit` to its current state and returns the
    /// final state. The circuit itself is not modified.
    ///
    /// # Returns
    /// * `Err(QuantumError::QubitLimitExceeded)` if the circuit is wider than
    ///   the configured maximum.
    /// * `Err(QuantumError::NormDrift)` if the final state is no longer
    ///   normalized.
    pub fn evolve(&self, circuit: &Circuit) -> Result<AmplitudeVector, QuantumError> {
        self.check_width(circuit)?;
        let mut engine = SimulationEngine::init(
            circuit.state().clone(),
            self.config.multi_qubit_strategy,
            self.config.dense_expansion_max_qubits,
        );
        for gate in circuit.gates() {
            engine.apply_gate(gate)?;
        }
        engine.validate_state(self.config.norm_tolerance)?;
        Ok(engine.into_state())
    }

    /// Evolves `circuit` in place: its state becomes the final state.
    pub fn execute(&self, circuit: &mut Circuit) -> Result<(), QuantumError> {
        let final_state = self.evolve(circuit)?;
        circuit.set_state(final_state)
    }

    /// Runs `circuit` and samples the final state `shots` times.
    ///
    /// # Arguments
    /// * `circuit` - The circuit to simulate, starting from its current state.
    /// * `shots` - Number of samples, in `[1, max_shots]`.
    /// * `rng` - Random source for sampling.
    #[instrument(level = "debug", skip_all, fields(num_qubits = circuit.num_qubits(), num_gates = circuit.len(), shots = shots))]
    pub fn run<R: Rng>(
        &self,
        circuit: &Circuit,
        shots: usize,
        rng: &mut R,
    ) -> Result<SimulationResult, QuantumError> {
        self.check_shots(shots)?;
        let start = Instant::now();

        let final_state = self.evolve(circuit)?;
        let counts = Sampler::new()
            .with_tolerance(self.config.norm_tolerance)
            .with_max_shots(self.config.max_shots)
            .run(&final_state, shots, rng)?;

        let elapsed = start.elapsed();
        debug!(elapsed_us = elapsed.as_micros() as u64, outcomes = counts.len(), "circuit simulated");
        Ok(SimulationResult::new(counts, final_state, elapsed, circuit.len(), shots))
    }

    /// Runs independent circuits in parallel.
    ///
    /// Circuit `i` samples with its own `StdRng` seeded from `seed + i`, so
    /// the batch is reproducible regardless of scheduling.
    pub fn run_batch(
        &self,
        circuits: &[Circuit],
        shots: usize,
        seed: u64,
    ) -> Vec<Result<SimulationResult, QuantumError>> {
        info!(batch = circuits.len(), shots, "running circuit batch");
        circuits
            .par_iter()
            .enumerate()
            .map(|(i, circuit)| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                self.run(circuit, shots, &mut rng)
            })
            .collect()
    }

    fn check_width(&self, circuit: &Circuit) -> Result<(), QuantumError> {
        if circuit.num_qubits() > self.config.max_qubits {
            return Err(QuantumError::QubitLimitExceeded { requested: circuit.num_qubits(), max: self.config.max_qubits });
        }
        Ok(())
    }

    fn check_shots(&self, shots: usize) -> Result<(), QuantumError> {
        if shots == 0 || shots > self.config.max_shots {
            return Err(QuantumError::InvalidShotCount { shots, max: self.config.max_shots });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use crate::config::MultiQubitStrategy;
    use num_complex::Complex64;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-9;

    /// Asserts that two complex state vectors are approximately equal component-wise.
    fn assert_complex_vec_approx_equal(
        actual: &[Complex64],
        expected: &[Complex64],
        tolerance: f64,
        context: &str,
    ) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < tolerance * tolerance,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, DistSq: {:.3e}, Context: {}",
                i, actual[i], expected[i], dist_sq, context
            );
        }
    }

    #[test]
    fn test_bell_state_counts_only_correlated_outcomes() -> Result<(), QuantumError> {
        let bell = CircuitBuilder::new(2).h(0).cnot(0, 1).build()?;
        let mut rng = StdRng::seed_from_u64(11);
        let result = Simulator::new().run(&bell, 1000, &mut rng)?;

        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let z = Complex64::new(0.0, 0.0);
        assert_complex_vec_approx_equal(result.state().amplitudes(), &[h, z, z, h], TEST_TOLERANCE, "Bell state");
        assert_eq!(result.count("00") + result.count("11"), 1000);
        assert_eq!(result.count("01"), 0);
        Ok(())
    }

    #[test]
    fn test_qft_circuit_equals_qft_gate() -> Result<(), QuantumError> {
        let start = AmplitudeVector::basis_state(3, 0b011)?;
        let mut ladder = CircuitBuilder::new(3).with_initial_state(start.clone()).build()?;
        ladder.add_gates(Circuit::qft(3)?.gates().iter().cloned())?;

        let dense = CircuitBuilder::new(3).with_initial_state(start).qft(vec![0, 1, 2]).build()?;

        let sim = Simulator::new();
        let a = sim.evolve(&ladder)?;
        let b = sim.evolve(&dense)?;
        assert_complex_vec_approx_equal(a.amplitudes(), b.amplitudes(), TEST_TOLERANCE, "QFT ladder vs matrix");
        Ok(())
    }

    #[test]
    fn test_grover_amplifies_marked_state() -> Result<(), QuantumError> {
        let grover = Circuit::grover(3, 5)?;
        for strategy in [MultiQubitStrategy::DenseExpansion, MultiQubitStrategy::LocalContraction] {
            let sim = Simulator::with_config(SimulatorConfig::default().with_strategy(strategy))?;
            let state = sim.evolve(&grover)?;
            let p = state.probabilities()[5];
            assert!((p - 0.9453125).abs() < 1e-6, "{:?}: p(marked) = {}", strategy, p);
        }
        Ok(())
    }

    #[test]
    fn test_limits_are_enforced() -> Result<(), QuantumError> {
        let sim = Simulator::with_config(SimulatorConfig::default().with_max_qubits(2).with_max_shots(10))?;
        let mut rng = StdRng::seed_from_u64(0);
        let wide = Circuit::new(3)?;
        assert_eq!(
            sim.run(&wide, 1, &mut rng).unwrap_err(),
            QuantumError::QubitLimitExceeded { requested: 3, max: 2 }
        );
        let narrow = Circuit::new(1)?;
        assert_eq!(sim.run(&narrow, 11, &mut rng).unwrap_err(), QuantumError::InvalidShotCount { shots: 11, max: 10 });
        assert_eq!(sim.run(&narrow, 0, &mut rng).unwrap_err(), QuantumError::InvalidShotCount { shots: 0, max: 10 });
        Ok(())
    }

    #[test]
    fn test_execute_updates_circuit_state() -> Result<(), QuantumError> {
        let mut circuit = CircuitBuilder::new(1).x(0).build()?;
        Simulator::new().execute(&mut circuit)?;
        assert_eq!(circuit.state(), &AmplitudeVector::basis_state(1, 1)?);
        Ok(())
    }

    #[test]
    fn test_batch_is_reproducible() -> Result<(), QuantumError> {
        let circuits = vec![
            CircuitBuilder::new(2).h(0).h(1).build()?,
            CircuitBuilder::new(2).h(0).cnot(0, 1).build()?,
        ];
        let sim = Simulator::new();
        let first: Vec<_> = sim.run_batch(&circuits, 200, 99).into_iter().collect::<Result<_, _>>()?;
        let second: Vec<_> = sim.run_batch(&circuits, 200, 99).into_iter().collect::<Result<_, _>>()?;
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.counts(), b.counts());
        }
        Ok(())
    }
}
