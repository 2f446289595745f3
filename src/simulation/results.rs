// src/simulation/results.rs
use super::sampler::Histogram;
use crate::core::AmplitudeVector;
use std::fmt;
use std::time::Duration;

/// Everything one circuit run produces: the sampled histogram, the exact
/// outcome probabilities and the final state they were drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    counts: Histogram,
    probabilities: Vec<f64>,
    state: AmplitudeVector,
    simulation_time: Duration,
    num_gates: usize,
    shots: usize,
}

impl SimulationResult {
    pub(crate) fn new(
        counts: Histogram,
        state: AmplitudeVector,
        simulation_time: Duration,
        num_gates: usize,
        shots: usize,
    ) -> Self {
        let probabilities = state.probabilities();
        Self { counts, probabilities, state, simulation_time, num_gates, shots }
    }

    /// Sampled outcome counts keyed by bit pattern.
    pub fn counts(&self) -> &Histogram {
        &self.counts
    }

    /// Count for one bit pattern, zero if it was never drawn.
    pub fn count(&self, pattern: &str) -> usize {
        self.counts.get(pattern).copied().unwrap_or(0)
    }

    /// `|c_i|^2` of the final state, indexed by basis state.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Final state before sampling.
    pub fn state(&self) -> &AmplitudeVector {
        &self.state
    }

    /// Wall time spent applying gates and sampling.
    pub fn simulation_time(&self) -> Duration {
        self.simulation_time
    }

    /// Register width.
    pub fn num_qubits(&self) -> usize {
        self.state.num_qubits()
    }

    /// Number of gates applied.
    pub fn num_gates(&self) -> usize {
        self.num_gates
    }

    /// Number of shots drawn.
    pub fn shots(&self) -> usize {
        self.shots
    }

    /// The most frequently drawn pattern; ties go to the smaller pattern.
    pub fn most_frequent(&self) -> Option<(&str, usize)> {
        self.counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Simulation Results: {} qubits, {} gates, {} shots in {:?}",
            self.num_qubits(),
            self.num_gates,
            self.shots,
            self.simulation_time
        )?;
        if self.counts.is_empty() {
            writeln!(f, "  No outcomes sampled.")?;
        } else {
            // Sort by pattern for consistent and readable output
            let mut sorted: Vec<_> = self.counts.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            for (pattern, count) in sorted {
                writeln!(f, "    |{}>: {}", pattern, count)?;
            }
        }
        Ok(())
    }
}
