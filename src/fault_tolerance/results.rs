// src/fault_tolerance/results.rs
use crate::core::AmplitudeVector;
use crate::correction::{AppliedCorrection, CorrectionCode, SyndromeResult};
use crate::noise::{ErrorKind, QubitError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// What happened in one correction cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRecord {
    /// Zero-based cycle number.
    pub cycle: usize,
    /// Errors injected this cycle, with their `corrected` flag settled.
    pub errors: Vec<QubitError>,
    pub syndrome: SyndromeResult,
    pub corrections: Vec<AppliedCorrection>,
    /// `true` if the syndrome had no known correction.
    pub uncorrectable: bool,
    /// `|<logical_in|decoded>|^2` after correction.
    pub logical_fidelity: f64,
    pub cycle_time: Duration,
}

impl CycleRecord {
    /// Number of errors injected this cycle.
    pub fn errors_detected(&self) -> usize {
        self.errors.len()
    }
}

/// Outcome of a full run of correction cycles on one logical state.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultToleranceReport {
    pub initial_logical_state: AmplitudeVector,
    pub code: CorrectionCode,
    pub error_rate: f64,
    pub cycles: Vec<CycleRecord>,
    /// Decoded state after the last cycle.
    pub final_logical_state: AmplitudeVector,
    pub final_fidelity: f64,
}

impl FaultToleranceReport {
    /// Errors injected over all cycles.
    pub fn total_errors(&self) -> usize {
        self.cycles.iter().map(CycleRecord::errors_detected).sum()
    }

    /// Mean of the per-cycle fidelities, or the final fidelity when no cycle ran.
    pub fn mean_fidelity(&self) -> f64 {
        if self.cycles.is_empty() {
            return self.final_fidelity;
        }
        self.cycles.iter().map(|c| c.logical_fidelity).sum::<f64>() / self.cycles.len() as f64
    }
}

impl fmt::Display for FaultToleranceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} code, error rate {}, {} cycles, {} errors injected",
            self.code,
            self.error_rate,
            self.cycles.len(),
            self.total_errors()
        )?;
        for c in &self.cycles {
            writeln!(
                f,
                "  cycle {:>3}: errors={} syndrome={} fidelity={:.6}{}",
                c.cycle,
                c.errors_detected(),
                c.syndrome.pattern(),
                c.logical_fidelity,
                if c.uncorrectable { " (uncorrectable)" } else { "" }
            )?;
        }
        write!(f, "final fidelity: {:.6} (mean {:.6})", self.final_fidelity, self.mean_fidelity())
    }
}

/// Aggregate view of a service's error history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorStatistics {
    pub total_errors: usize,
    pub error_breakdown: BTreeMap<ErrorKind, usize>,
    /// Correction rounds per code label.
    pub correction_attempts: BTreeMap<String, usize>,
    pub corrected_errors: usize,
    /// Errors per second since the first recorded error, over at least one
    /// second.
    pub average_error_rate: f64,
}
