// src/correction/syndrome.rs

use super::AppliedCorrection;
use super::pauli::{PauliKind, StabilizerGenerator};
use crate::core::constants::tolerances::AMPLITUDE_EPSILON;
use crate::core::{AmplitudeVector, QuantumError};
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant, SystemTime};
use tracing::trace;

/// Outcome of measuring every stabilizer generator of a code once.
#[derive(Debug, Clone, PartialEq)]
pub struct SyndromeResult {
    /// One bit per generator, `1` where the expectation value is negative
    /// (below `-1e-12`, so rounding noise around zero reads as `0`).
    pub bits: Vec<u8>,
    /// Raw expectation value per generator.
    pub expectations: Vec<f64>,
    /// Union of the generator supports, ascending.
    pub measured_qubits: Vec<usize>,
    /// Time taken by the measurement.
    pub measurement_time: Duration,
    /// When the measurement finished.
    pub timestamp: SystemTime,
    /// Mean `|<S>|` over the generators; 1.0 for a state inside a stabilizer
    /// eigenspace, lower when the state is a superposition of syndromes.
    pub confidence: f64,
}

impl SyndromeResult {
    /// `true` if every bit is zero.
    pub fn is_trivial(&self) -> bool {
        self.bits.iter().all(|b| *b == 0)
    }

    /// Bits as a `0`/`1` string, generator order.
    pub fn pattern(&self) -> String {
        self.bits.iter().map(|b| if *b == 1 { '1' } else { '0' }).collect()
    }
}

/// Measures every generator on `state`.
pub fn measure_generators(
    state: &AmplitudeVector,
    generators: &[StabilizerGenerator],
) -> Result<SyndromeResult, QuantumError> {
    let start = Instant::now();
    let expectations = generators
        .iter()
        .map(|g| g.expectation(state))
        .collect::<Result<Vec<f64>, QuantumError>>()?;
    let bits = expectations.iter().map(|e| u8::from(*e < -AMPLITUDE_EPSILON)).collect();
    let confidence = if expectations.is_empty() {
        1.0
    } else {
        expectations.iter().map(|e| e.abs()).sum::<f64>() / expectations.len() as f64
    };
    let measured_qubits: BTreeSet<usize> = generators.iter().flat_map(|g| g.support.iter().copied()).collect();

    let result = SyndromeResult {
        bits,
        expectations,
        measured_qubits: measured_qubits.into_iter().collect(),
        measurement_time: start.elapsed(),
        timestamp: SystemTime::now(),
        confidence,
    };
    trace!(syndrome = %result.pattern(), confidence = result.confidence, "measured generators");
    Ok(result)
}

/// What a syndrome pattern is decoded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyndromeEntry {
    NoError,
    Single(AppliedCorrection),
}

/// Lookup from syndrome bits to the single-qubit error that produces them.
#[derive(Debug, Clone, PartialEq)]
pub struct SyndromeTable {
    width: usize,
    entries: HashMap<Vec<u8>, SyndromeEntry>,
}

impl SyndromeTable {
    /// Precomputes the syndrome of every single-qubit X and Z error on
    /// `num_qubits` qubits against `generators`.
    ///
    /// When two errors share a syndrome (degenerate codes) the one on the
    /// lower qubit is kept; both act identically on the code space.
    pub fn single_qubit(generators: &[StabilizerGenerator], num_qubits: usize) -> Self {
        let width = generators.len();
        let mut entries = HashMap::new();
        entries.insert(vec![0u8; width], SyndromeEntry::NoError);
        for pauli in [PauliKind::X, PauliKind::Z] {
            for qubit in 0..num_qubits {
                let bits: Vec<u8> = generators.iter().map(|g| u8::from(g.anticommutes_with(pauli, qubit))).collect();
                entries.entry(bits).or_insert(SyndromeEntry::Single(AppliedCorrection { pauli, qubit }));
            }
        }
        Self { width, entries }
    }

    /// Number of generators, i.e. bits per key.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the table holds nothing, which never happens for a built table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a full pattern.
    pub fn lookup(&self, bits: &[u8]) -> Option<&SyndromeEntry> {
        self.entries.get(bits)
    }

    /// Iterates over `(pattern, entry)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &SyndromeEntry)> {
        self.entries.iter()
    }
}

/// Splits `bits` by generator type and decodes each part on its own.
///
/// Returns the corrections found and whether any non-zero part had no
/// table entry. X-type generators detect Z errors and vice versa, so a Y
/// error is decoded as one X and one Z correction.
pub(crate) fn decode_by_sector(
    table: &SyndromeTable,
    generators: &[StabilizerGenerator],
    bits: &[u8],
) -> (Vec<AppliedCorrection>, bool) {
    let mut applied = Vec::new();
    let mut uncorrectable = false;
    for sector in [PauliKind::X, PauliKind::Z] {
        let part: Vec<u8> = bits
            .iter()
            .zip(generators.iter())
            .map(|(b, g)| if g.pauli == sector { *b } else { 0 })
            .collect();
        if part.iter().all(|b| *b == 0) {
            continue;
        }
        match table.lookup(&part) {
            Some(SyndromeEntry::Single(correction)) => applied.push(*correction),
            Some(SyndromeEntry::NoError) => {}
            None => uncorrectable = true,
        }
    }
    (applied, uncorrectable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_qubit_bit_flip() -> Vec<StabilizerGenerator> {
        vec![
            StabilizerGenerator::new(PauliKind::Z, vec![0, 1]),
            StabilizerGenerator::new(PauliKind::Z, vec![1, 2]),
        ]
    }

    #[test]
    fn test_table_for_repetition_checks() {
        let table = SyndromeTable::single_qubit(&three_qubit_bit_flip(), 3);
        assert_eq!(table.width(), 2);
        assert_eq!(
            table.lookup(&[1, 1]),
            Some(&SyndromeEntry::Single(AppliedCorrection { pauli: PauliKind::X, qubit: 1 }))
        );
        assert_eq!(table.lookup(&[0, 0]), Some(&SyndromeEntry::NoError));
    }

    #[test]
    fn test_measure_generators_flags_flipped_check() -> Result<(), QuantumError> {
        // |001>: qubit 2 flipped
        let state = AmplitudeVector::basis_state(3, 0b001)?;
        let result = measure_generators(&state, &three_qubit_bit_flip())?;
        assert_eq!(result.bits, vec![0, 1]);
        assert_eq!(result.pattern(), "01");
        assert_eq!(result.measured_qubits, vec![0, 1, 2]);
        assert!((result.confidence - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_unknown_part_is_uncorrectable() {
        let generators = three_qubit_bit_flip();
        let table = SyndromeTable::single_qubit(&generators, 2);
        // Qubit 2 is outside the table's register, so [0, 1] has no entry.
        let (applied, uncorrectable) = decode_by_sector(&table, &generators, &[0, 1]);
        assert!(applied.is_empty());
        assert!(uncorrectable);
    }
}
