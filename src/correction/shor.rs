// src/correction/shor.rs

//! The [[9,1,3]] Shor code: three blocks of three qubits.
//!
//! Logical states are `⊗3 (|000> ± |111>)/√2`, `+` for |0> and `-` for |1>.
//! Six Z-pair checks catch a bit flip inside a block; two X-checks over
//! neighbouring block pairs catch which block took a phase flip. A phase
//! flip on any qubit of a block has the same effect on the code space, so
//! it is corrected on the block's first qubit.

use super::pauli::{PauliKind, StabilizerGenerator};
use super::syndrome::SyndromeTable;
use super::{CodeParameters, Codewords, CorrectionCode};
use crate::core::QuantumError;

const NUM_QUBITS: usize = 9;
const BLOCKS: usize = 3;
const BLOCK_SIZE: usize = 3;

#[derive(Debug, Clone)]
pub struct ShorCode {
    params: CodeParameters,
    codewords: Codewords,
}

impl ShorCode {
    pub fn new() -> Result<Self, QuantumError> {
        let mut generators = Vec::with_capacity(8);
        for block in 0..BLOCKS {
            let base = block * BLOCK_SIZE;
            generators.push(StabilizerGenerator::new(PauliKind::Z, vec![base, base + 1]));
            generators.push(StabilizerGenerator::new(PauliKind::Z, vec![base + 1, base + 2]));
        }
        generators.push(StabilizerGenerator::new(PauliKind::X, (0..6).collect()));
        generators.push(StabilizerGenerator::new(PauliKind::X, (3..9).collect()));
        let syndrome_table = SyndromeTable::single_qubit(&generators, NUM_QUBITS);

        let (zero, one) = codeword_terms();
        Ok(Self {
            params: CodeParameters {
                code: CorrectionCode::Shor9,
                num_physical_qubits: NUM_QUBITS,
                distance: 3,
                generators,
                // Z on one qubit per block flips every block's sign.
                logical_x: StabilizerGenerator::new(PauliKind::Z, vec![0, 3, 6]),
                logical_z: StabilizerGenerator::new(PauliKind::X, (0..NUM_QUBITS).collect()),
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

/// The eight terms of each codeword. Term `mask` has block `b` in |111>
/// when bit `b` of `mask` is set; |1>'s sign is `(-1)^(blocks in |111>)`.
fn codeword_terms() -> (Vec<(usize, f64)>, Vec<(usize, f64)>) {
    let amplitude = 1.0 / (2.0 * std::f64::consts::SQRT_2);
    let mut zero = Vec::with_capacity(1 << BLOCKS);
    let mut one = Vec::with_capacity(1 << BLOCKS);
    for mask in 0..(1usize << BLOCKS) {
        let index = (0..BLOCKS)
            .filter(|b| (mask >> b) & 1 == 1)
            .fold(0usize, |acc, b| acc | (0b111 << (NUM_QUBITS - BLOCK_SIZE * (b + 1))));
        let sign = if mask.count_ones() % 2 == 1 { -1.0 } else { 1.0 };
        zero.push((index, amplitude));
        one.push((index, sign * amplitude));
    }
    (zero, one)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AmplitudeVector;
    use crate::correction::pauli::apply_pauli;
    use crate::correction::syndrome::measure_generators;
    use crate::correction::{AppliedCorrection, Corrector};
    use num_complex::Complex64;

    #[test]
    fn test_codewords_are_orthonormal_and_stabilized() -> Result<(), QuantumError> {
        let code = ShorCode::new()?;
        let zero = code.codewords().zero();
        let one = code.codewords().one();
        assert!((zero.norm() - 1.0).abs() < 1e-12);
        assert!((one.norm() - 1.0).abs() < 1e-12);
        assert!(zero.inner(one)?.norm() < 1e-12);
        // |000 000 000> and |111 111 111> carry the + sign in both codewords
        assert!(zero.amplitudes()[0].re > 0.0);
        assert!(one.amplitudes()[0b111_111_111].re < 0.0);
        for codeword in [zero, one] {
            assert!(measure_generators(codeword, &code.parameters().generators)?.is_trivial());
        }
        Ok(())
    }

    #[test]
    fn test_phase_flips_share_a_block_syndrome() -> Result<(), QuantumError> {
        let code = ShorCode::new()?;
        let table = &code.parameters().syndrome_table;
        // Z on qubit 4 (block 1) lights both X checks; the table names qubit 3.
        let bits = [0, 0, 0, 0, 0, 0, 1, 1];
        assert_eq!(
            table.lookup(&bits),
            Some(&crate::correction::SyndromeEntry::Single(AppliedCorrection { pauli: PauliKind::Z, qubit: 3 }))
        );
        // Six distinct bit-flip patterns, three phase-flip patterns, no-error.
        assert_eq!(table.len(), 9 + 3 + 1);
        Ok(())
    }

    #[test]
    fn test_single_errors_are_corrected() -> Result<(), QuantumError> {
        let c = Corrector::Shor(ShorCode::new()?);
        let logical = AmplitudeVector::qubit(Complex64::new(0.8, 0.0), Complex64::new(0.0, 0.6));
        let encoded = c.encode(&logical)?;
        for qubit in 0..NUM_QUBITS {
            for pauli in [PauliKind::X, PauliKind::Y, PauliKind::Z] {
                let noisy = apply_pauli(&encoded, pauli, qubit)?;
                let syndrome = c.measure_syndrome(&noisy)?;
                let outcome = c.correct_errors(&noisy, &syndrome)?;
                assert!(!outcome.uncorrectable);
                let fidelity = c.decode(&outcome.state)?.fidelity(&logical)?;
                assert!((fidelity - 1.0).abs() < 1e-12, "{}{}: fidelity {}", pauli, qubit, fidelity);
            }
        }
        Ok(())
    }

    #[test]
    fn test_logical_x_swaps_codewords() -> Result<(), QuantumError> {
        let code = ShorCode::new()?;
        let op = code.parameters().logical_x.operator(NUM_QUBITS);
        let flipped = op.apply(code.codewords().zero())?;
        assert!((flipped.fidelity(code.codewords().one())? - 1.0).abs() < 1e-12);
        Ok(())
    }
}
