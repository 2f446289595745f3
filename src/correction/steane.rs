// src/correction/steane.rs

//! The [[7,1,3]] Steane code.
//!
//! Both stabilizer types share the rows of the Hamming(7,4) parity-check
//! matrix, so the syndrome of a single error on qubit `i` reads `i + 1` in
//! binary. Syndrome bits 0..3 come from the X-type generators (they detect
//! Z errors), bits 3..6 from the Z-type generators (they detect X errors).

use super::pauli::{PauliKind, StabilizerGenerator};
use super::syndrome::SyndromeTable;
use super::{CodeParameters, Codewords, CorrectionCode};
use crate::core::QuantumError;

const NUM_QUBITS: usize = 7;

/// Parity-check rows, qubit 0 first.
const CHECK_ROWS: [[u8; NUM_QUBITS]; 3] = [
    [0, 0, 0, 1, 1, 1, 1],
    [0, 1, 1, 0, 0, 1, 1],
    [1, 0, 1, 0, 1, 0, 1],
];

/// Basis indices of the logical |0> codeword; |1> is their bitwise complement.
const LOGICAL_ZERO_INDICES: [usize; 8] = [
    0b0000000, 0b1010101, 0b0110011, 0b1100110, 0b0001111, 0b1011010, 0b0111100, 0b1101001,
];

#[derive(Debug, Clone)]
pub struct SteaneCode {
    params: CodeParameters,
    codewords: Codewords,
}

impl SteaneCode {
    pub fn new() -> Result<Self, QuantumError> {
        let generators: Vec<StabilizerGenerator> = [PauliKind::X, PauliKind::Z]
            .into_iter()
            .flat_map(|pauli| CHECK_ROWS.iter().map(move |row| StabilizerGenerator::from_mask(pauli, row)))
            .collect();
        let all: Vec<usize> = (0..NUM_QUBITS).collect();
        let syndrome_table = SyndromeTable::single_qubit(&generators, NUM_QUBITS);

        let amplitude = 1.0 / (LOGICAL_ZERO_INDICES.len() as f64).sqrt();
        let complement = (1 << NUM_QUBITS) - 1;
        let zero: Vec<(usize, f64)> = LOGICAL_ZERO_INDICES.iter().map(|&i| (i, amplitude)).collect();
        let one: Vec<(usize, f64)> = LOGICAL_ZERO_INDICES.iter().map(|&i| (i ^ complement, amplitude)).collect();

        Ok(Self {
            params: CodeParameters {
                code: CorrectionCode::Steane7,
                num_physical_qubits: NUM_QUBITS,
                distance: 3,
                generators,
                logical_x: StabilizerGenerator::new(PauliKind::X, all.clone()),
                logical_z: StabilizerGenerator::new(PauliKind::Z, all),
                syndrome_table,
            },
            codewords: Codewords::from_terms(NUM_QUBITS, &zero, &one)?,
        })
    }

    pub fn parameters(&self) -> &CodeParameters {
        &self.params
    }

    pub(crate) fn codewords(&self) -> &Codewords {
        &self.codewords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::pauli::apply_pauli;
    use crate::correction::syndrome::{SyndromeEntry, measure_generators};
    use crate::correction::{AppliedCorrection, Corrector};
    use crate::core::AmplitudeVector;
    use num_complex::Complex64;
    use std::collections::HashSet;

    fn corrector() -> Corrector {
        Corrector::Steane(SteaneCode::new().unwrap())
    }

    #[test]
    fn test_generators_commute_and_stabilize_codewords() -> Result<(), QuantumError> {
        let code = SteaneCode::new()?;
        let gens = &code.parameters().generators;
        for a in gens {
            for b in gens {
                assert!(a.commutes_with(b), "{} and {} anticommute", a, b);
            }
        }
        for codeword in [code.codewords().zero(), code.codewords().one()] {
            let syndrome = measure_generators(codeword, gens)?;
            assert!(syndrome.is_trivial());
            assert!((syndrome.confidence - 1.0).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_syndrome_table_is_bijective() -> Result<(), QuantumError> {
        let code = SteaneCode::new()?;
        let table = &code.parameters().syndrome_table;
        assert_eq!(table.len(), 1 + 2 * NUM_QUBITS);

        let errors: HashSet<SyndromeEntry> = table.iter().map(|(_, entry)| *entry).collect();
        assert_eq!(errors.len(), table.len());
        for qubit in 0..NUM_QUBITS {
            for pauli in [PauliKind::X, PauliKind::Z] {
                assert!(errors.contains(&SyndromeEntry::Single(AppliedCorrection { pauli, qubit })));
            }
        }

        // X error on qubit 2 lights up Z checks with binary 3
        assert_eq!(
            table.lookup(&[0, 0, 0, 0, 1, 1]),
            Some(&SyndromeEntry::Single(AppliedCorrection { pauli: PauliKind::X, qubit: 2 }))
        );
        Ok(())
    }

    #[test]
    fn test_logical_operators_map_codewords() -> Result<(), QuantumError> {
        let code = SteaneCode::new()?;
        let zero = code.codewords().zero();
        let one = code.codewords().one();
        let flipped = code.parameters().logical_x.operator(NUM_QUBITS).apply(zero)?;
        assert!((flipped.fidelity(one)? - 1.0).abs() < 1e-12);
        let z_expect = code.parameters().logical_z.operator(NUM_QUBITS).expectation(one)?;
        assert!((z_expect + 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_every_single_error_is_corrected() -> Result<(), QuantumError> {
        let c = corrector();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let logical = AmplitudeVector::qubit(Complex64::new(h, 0.0), Complex64::new(0.0, h));
        let encoded = c.encode(&logical)?;
        for qubit in 0..NUM_QUBITS {
            for pauli in [PauliKind::X, PauliKind::Y, PauliKind::Z] {
                let noisy = apply_pauli(&encoded, pauli, qubit)?;
                let syndrome = c.measure_syndrome(&noisy)?;
                let outcome = c.correct_errors(&noisy, &syndrome)?;
                assert!(!outcome.uncorrectable);
                let decoded = c.decode(&outcome.state)?;
                let fidelity = decoded.fidelity(&logical)?;
                assert!((fidelity - 1.0).abs() < 1e-12, "{}{}: fidelity {}", pauli, qubit, fidelity);
            }
        }
        Ok(())
    }

    #[test]
    fn test_decode_keeps_relative_phase() -> Result<(), QuantumError> {
        let c = corrector();
        let logical = AmplitudeVector::qubit(Complex64::new(0.6, 0.0), Complex64::new(0.0, -0.8));
        let decoded = c.decode(&c.encode(&logical)?)?;
        assert!((decoded.amplitudes()[1] - Complex64::new(0.0, -0.8)).norm() < 1e-12);
        Ok(())
    }
}
