// src/simulation/sampler.rs

use crate::core::{AmplitudeVector, QuantumError};
use crate::core::constants::limits::MAX_SHOTS;
use crate::core::constants::tolerances::NORM_TOLERANCE;
use crate::validation::check_probability_sum;
use rand::Rng;
use std::collections::HashMap;
use tracing::trace;

/// Outcome counts keyed by n-character bit pattern, qubit 0 first.
pub type Histogram = HashMap<String, usize>;

/// Draws computational-basis outcomes from an amplitude vector.
///
/// Sampling never collapses or modifies the state; every shot is an
/// independent draw from the Born distribution `|c_i|^2`.
#[derive(Debug, Clone)]
pub struct Sampler {
    /// Allowed deviation of the total probability from 1.0.
    pub tolerance: f64,
    /// Largest accepted shot count.
    pub max_shots: usize,
}

impl Default for Sampler {
    fn default() -> Self {
        Self { tolerance: NORM_TOLERANCE, max_shots: MAX_SHOTS }
    }
}

impl Sampler {
    /// Creates a sampler with the default norm tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the probability-sum tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Overrides the shot limit.
    pub fn with_max_shots(mut self, max_shots: usize) -> Self {
        self.max_shots = max_shots;
        self
    }

    /// Samples `state` `shots` times and counts the outcomes.
    ///
    /// # Arguments
    ///
    /// * `state` - The state to sample; must be normalized.
    /// * `shots` - Number of independent draws, in `[1, max_shots]`.
    /// * `rng` - Source of uniform draws; seed it for reproducible histograms.
    ///
    /// # Returns
    ///
    /// A histogram whose counts sum to `shots`. Outcomes that were never drawn
    /// are absent.
    pub fn run<R: Rng>(
        &self,
        state: &AmplitudeVector,
        shots: usize,
        rng: &mut R,
    ) -> Result<Histogram, QuantumError> {
        let raw_counts = self.sample_counts(state, shots, rng)?;

        let mut counts = Histogram::new();
        for (idx, &count) in raw_counts.iter().enumerate() {
            if count > 0 {
                counts.insert(state.bit_pattern(idx), count);
            }
        }
        Ok(counts)
    }

    /// Same draws as [`Sampler::run`], returned as a count per basis index.
    pub fn sample_counts<R: Rng>(
        &self,
        state: &AmplitudeVector,
        shots: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, QuantumError> {
        if shots == 0 || shots > self.max_shots {
            return Err(QuantumError::InvalidShotCount { shots, max: self.max_shots });
        }
        let probs = state.probabilities();
        let total: f64 = probs.iter().sum();
        check_probability_sum(total, self.tolerance)?;

        // CDF once, then a binary search per shot.
        let mut cdf = Vec::with_capacity(probs.len());
        let mut current_sum = 0.0;
        for &p in &probs {
            current_sum += p;
            cdf.push(current_sum);
        }

        let last = probs.len() - 1;
        let mut raw_counts = vec![0usize; probs.len()];
        for _ in 0..shots {
            // Scale by the actual total so rounding never leaves a gap at the top.
            let r: f64 = rng.random::<f64>() * total;
            let outcome_idx = cdf.partition_point(|&c| c <= r).min(last);
            raw_counts[outcome_idx] += 1;
        }
        trace!(shots, outcomes = raw_counts.iter().filter(|c| **c > 0).count(), "sampled");
        Ok(raw_counts)
    }
}

/// Samples with a fresh [`Sampler`] limited to `max_shots`.
pub fn measure<R: Rng>(
    state: &AmplitudeVector,
    shots: usize,
    max_shots: usize,
    tolerance: f64,
    rng: &mut R,
) -> Result<Histogram, QuantumError> {
    Sampler::new().with_tolerance(tolerance).with_max_shots(max_shots).run(state, shots, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_basis_state_always_yields_its_pattern() -> Result<(), QuantumError> {
        let state = AmplitudeVector::basis_state(3, 0b101)?;
        let mut rng = StdRng::seed_from_u64(7);
        let counts = Sampler::new().run(&state, 250, &mut rng)?;
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("101"), Some(&250));
        Ok(())
    }

    #[test]
    fn test_plus_state_is_balanced() -> Result<(), QuantumError> {
        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let state = AmplitudeVector::qubit(h, h);
        let mut rng = StdRng::seed_from_u64(42);
        let shots = 100_000;
        let counts = Sampler::new().with_max_shots(shots).run(&state, shots, &mut rng)?;
        let zeros = *counts.get("0").unwrap_or(&0) as f64 / shots as f64;
        assert!((zeros - 0.5).abs() < 0.01, "frequency of 0 was {}", zeros);
        assert_eq!(counts.values().sum::<usize>(), shots);
        Ok(())
    }

    #[test]
    fn test_same_seed_same_histogram() -> Result<(), QuantumError> {
        let amps = vec![Complex64::new(0.5, 0.0); 4];
        let state = AmplitudeVector::new(amps)?;
        let a = Sampler::new().run(&state, 500, &mut StdRng::seed_from_u64(3))?;
        let b = Sampler::new().run(&state, 500, &mut StdRng::seed_from_u64(3))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_rejects_unnormalized_state_and_bad_shots() -> Result<(), QuantumError> {
        let state = AmplitudeVector::new(vec![Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)])?;
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(Sampler::new().run(&state, 10, &mut rng), Err(QuantumError::NormDrift { .. })));

        let ok = AmplitudeVector::zero_state(1)?;
        assert_eq!(
            measure(&ok, 0, 100, NORM_TOLERANCE, &mut rng),
            Err(QuantumError::InvalidShotCount { shots: 0, max: 100 })
        );
        assert_eq!(
            measure(&ok, 101, 100, NORM_TOLERANCE, &mut rng),
            Err(QuantumError::InvalidShotCount { shots: 101, max: 100 })
        );
        assert_eq!(
            Sampler::new().run(&ok, 0, &mut rng),
            Err(QuantumError::InvalidShotCount { shots: 0, max: MAX_SHOTS })
        );
        assert_eq!(
            Sampler::new().with_max_shots(5).sample_counts(&ok, 6, &mut rng),
            Err(QuantumError::InvalidShotCount { shots: 6, max: 5 })
        );
        Ok(())
    }
}
