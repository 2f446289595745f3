// src/fault_tolerance/mod.rs

//! Repeated encode / noise / syndrome / correct cycles on one logical qubit.
//!
//! A run encodes the logical state once. Every cycle then injects noise into
//! the current physical state, measures the syndrome, applies the correction
//! and decodes to score the logical fidelity; the corrected state carries
//! into the next cycle. Cycles of one run are strictly sequential.
//! Independent logical states run in parallel through
//! [`FaultTolerantService::run_batch`].
//!
//! Uncorrectable syndromes never abort a run. They are recorded on the
//! cycle and show up as lower fidelity.

mod results;

pub use results::{CycleRecord, ErrorStatistics, FaultToleranceReport};

use crate::config::FaultToleranceConfig;
use crate::core::{AmplitudeVector, NORM_TOLERANCE, QuantumError};
use crate::correction::{CorrectionCode, CorrectionOutcome, Corrector, SyndromeResult};
use crate::noise::{ErrorInjector, QubitError};
use crate::validation::check_normalization;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tracing::{debug, info, instrument};

/// Where a cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Encoded,
    Noisy,
    SyndromeMeasured,
    Corrected,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CyclePhase::Encoded => "encoded",
            CyclePhase::Noisy => "noisy",
            CyclePhase::SyndromeMeasured => "syndrome_measured",
            CyclePhase::Corrected => "corrected",
        };
        f.write_str(s)
    }
}

/// Owns the built correctors, the error history and per-code correction
/// counters.
#[derive(Debug, Default)]
pub struct FaultTolerantService {
    config: FaultToleranceConfig,
    correctors: HashMap<CorrectionCode, Arc<Corrector>>,
    error_history: Vec<QubitError>,
    correction_counts: BTreeMap<CorrectionCode, usize>,
}

impl FaultTolerantService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service with `config`, rejecting invalid settings.
    pub fn with_config(config: FaultToleranceConfig) -> Result<Self, QuantumError> {
        config.validate()?;
        Ok(Self { config, ..Default::default() })
    }

    pub fn config(&self) -> &FaultToleranceConfig {
        &self.config
    }

    /// Uses `corrector` for its code from now on, e.g. a surface code with a
    /// custom decoder.
    pub fn register_corrector(&mut self, corrector: Corrector) -> Result<(), QuantumError> {
        let code = corrector.code();
        let requested = code.num_physical_qubits();
        if requested > self.config.max_physical_qubits {
            return Err(QuantumError::QubitLimitExceeded { requested, max: self.config.max_physical_qubits });
        }
        self.correctors.insert(code, Arc::new(corrector));
        Ok(())
    }

    /// The corrector for `code`, built on first use.
    pub fn corrector(&mut self, code: CorrectionCode) -> Result<Arc<Corrector>, QuantumError> {
        if let Some(c) = self.correctors.get(&code) {
            return Ok(Arc::clone(c));
        }
        let built = Arc::new(Corrector::new(code, &self.config)?);
        self.correctors.insert(code, Arc::clone(&built));
        Ok(built)
    }

    /// Encodes a single-qubit state with `code`.
    pub fn encode_logical(
        &mut self,
        logical: &AmplitudeVector,
        code: CorrectionCode,
    ) -> Result<AmplitudeVector, QuantumError> {
        let corrector = self.corrector(code)?;
        let encoded = corrector.encode_with_tolerance(logical, Some(self.config.norm_tolerance))?;
        info!(code = %code, "encoded logical qubit");
        Ok(encoded)
    }

    /// Injects noise into `physical` and appends the errors to the history.
    pub fn inject_errors<R: Rng>(
        &mut self,
        physical: &AmplitudeVector,
        error_rate: f64,
        rng: &mut R,
    ) -> Result<(AmplitudeVector, Vec<QubitError>), QuantumError> {
        let (noisy, errors) = ErrorInjector::new(error_rate)?.inject(physical, rng)?;
        self.error_history.extend(errors.iter().cloned());
        Ok((noisy, errors))
    }

    /// Measures the syndrome of `noisy` and applies the matching correction.
    pub fn perform_correction(
        &mut self,
        noisy: &AmplitudeVector,
        code: CorrectionCode,
    ) -> Result<(CorrectionOutcome, SyndromeResult), QuantumError> {
        let corrector = self.corrector(code)?;
        let syndrome = corrector.measure_syndrome(noisy)?;
        let outcome = corrector.correct_errors(noisy, &syndrome)?;
        *self.correction_counts.entry(code).or_default() += 1;
        info!(code = %code, syndrome = %syndrome.pattern(), "error correction completed");
        Ok((outcome, syndrome))
    }

    /// Runs `num_cycles` correction cycles on `logical`.
    ///
    /// # Arguments
    /// * `logical` - Normalized single-qubit state.
    /// * `code` - Code to encode with.
    /// * `error_rate` - Per-qubit error probability per cycle, in `[0, 1]`.
    /// * `num_cycles` - At most `config.max_cycles`.
    /// * `rng` - Random source for noise.
    #[instrument(level = "debug", skip_all, fields(code = %code, error_rate = error_rate, num_cycles = num_cycles))]
    pub fn run_cycles<R: Rng>(
        &mut self,
        logical: &AmplitudeVector,
        code: CorrectionCode,
        error_rate: f64,
        num_cycles: usize,
        rng: &mut R,
    ) -> Result<FaultToleranceReport, QuantumError> {
        self.check_cycles(num_cycles)?;
        let injector = ErrorInjector::new(error_rate)?;
        let corrector = self.corrector(code)?;
        let tolerance = self.config.norm_tolerance;
        let report = run_on(&corrector, &injector, logical, num_cycles, tolerance, rng)?;
        self.record(&report);
        Ok(report)
    }

    /// Runs the same cycle schedule on independent logical states in
    /// parallel. State `i` draws noise from `StdRng` seeded with `seed + i`.
    /// Histories and counters of the successful runs are merged afterwards.
    pub fn run_batch(
        &mut self,
        logical_states: &[AmplitudeVector],
        code: CorrectionCode,
        error_rate: f64,
        num_cycles: usize,
        seed: u64,
    ) -> Result<Vec<Result<FaultToleranceReport, QuantumError>>, QuantumError> {
        self.check_cycles(num_cycles)?;
        let injector = ErrorInjector::new(error_rate)?;
        let corrector = self.corrector(code)?;
        let tolerance = self.config.norm_tolerance;
        info!(batch = logical_states.len(), code = %code, num_cycles, "running fault-tolerance batch");

        let reports: Vec<Result<FaultToleranceReport, QuantumError>> = logical_states
            .par_iter()
            .enumerate()
            .map(|(i, logical)| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                run_on(&corrector, &injector, logical, num_cycles, tolerance, &mut rng)
            })
            .collect();

        for report in reports.iter().flatten() {
            self.record(report);
        }
        Ok(reports)
    }

    /// Every error injected through this service, oldest first.
    pub fn error_history(&self) -> &[QubitError] {
        &self.error_history
    }

    pub fn error_statistics(&self) -> ErrorStatistics {
        let mut error_breakdown = BTreeMap::new();
        for e in &self.error_history {
            *error_breakdown.entry(e.kind).or_default() += 1;
        }
        let correction_attempts = self.correction_counts.iter().map(|(code, n)| (code.label(), *n)).collect();
        let corrected_errors = self.error_history.iter().filter(|e| e.corrected).count();

        let average_error_rate = match self.error_history.first() {
            None => 0.0,
            Some(first) => {
                let elapsed = SystemTime::now()
                    .duration_since(first.timestamp)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or(0.0);
                self.error_history.len() as f64 / elapsed.max(1.0)
            }
        };

        ErrorStatistics {
            total_errors: self.error_history.len(),
            error_breakdown,
            correction_attempts,
            corrected_errors,
            average_error_rate,
        }
    }

    fn record(&mut self, report: &FaultToleranceReport) {
        for cycle in &report.cycles {
            self.error_history.extend(cycle.errors.iter().cloned());
        }
        *self.correction_counts.entry(report.code).or_default() += report.cycles.len();
    }

    fn check_cycles(&self, num_cycles: usize) -> Result<(), QuantumError> {
        if num_cycles > self.config.max_cycles {
            return Err(QuantumError::invalid_parameter(format!(
                "{} cycles requested, maximum is {}",
                num_cycles, self.config.max_cycles
            )));
        }
        Ok(())
    }
}

/// One full run against a built corrector. Touches no service state, so
/// batch runs can share the corrector across threads.
///
/// `norm_tolerance` bounds both the logical input and the corrected
/// physical state of every cycle; drift past it is a `NormDrift` error.
fn run_on<R: Rng>(
    corrector: &Corrector,
    injector: &ErrorInjector,
    logical: &AmplitudeVector,
    num_cycles: usize,
    norm_tolerance: f64,
    rng: &mut R,
) -> Result<FaultToleranceReport, QuantumError> {
    let code = corrector.code();
    let mut current = corrector.encode_with_tolerance(logical, Some(norm_tolerance))?;
    debug!(phase = %CyclePhase::Encoded, physical_qubits = current.num_qubits(), "logical state encoded");

    let mut cycles = Vec::with_capacity(num_cycles);
    for cycle in 0..num_cycles {
        let start = Instant::now();

        let (noisy, mut errors) = injector.inject(&current, rng)?;
        debug!(cycle, phase = %CyclePhase::Noisy, errors = errors.len(), "noise injected");

        let syndrome = corrector.measure_syndrome(&noisy)?;
        debug!(cycle, phase = %CyclePhase::SyndromeMeasured, syndrome = %syndrome.pattern(), "syndrome measured");

        let outcome = corrector.correct_errors(&noisy, &syndrome)?;
        check_normalization(&outcome.state, Some(norm_tolerance))?;
        // Errors count as corrected when the pre-noise state is restored,
        // which also covers corrections equivalent up to a stabilizer.
        if !errors.is_empty() && outcome.state.fidelity(&current)? > 1.0 - NORM_TOLERANCE {
            for e in &mut errors {
                e.corrected = true;
            }
        }
        let logical_fidelity = corrector.decode(&outcome.state)?.fidelity(logical)?;
        debug!(cycle, phase = %CyclePhase::Corrected, applied = outcome.applied.len(), fidelity = logical_fidelity, "cycle corrected");

        cycles.push(CycleRecord {
            cycle,
            errors,
            syndrome,
            corrections: outcome.applied,
            uncorrectable: outcome.uncorrectable,
            logical_fidelity,
            cycle_time: start.elapsed(),
        });
        current = outcome.state;
    }

    let final_logical_state = corrector.decode(&current)?;
    let final_fidelity = final_logical_state.fidelity(logical)?;
    info!(code = %code, cycles = num_cycles, final_fidelity, "fault-tolerance run finished");

    Ok(FaultToleranceReport {
        initial_logical_state: logical.clone(),
        code,
        error_rate: injector.probability(),
        cycles,
        final_logical_state,
        final_fidelity,
    })
}
