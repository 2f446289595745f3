// src/correction/mod.rs

//! Stabilizer error-correction codes for one logical qubit.
//!
//! The set of codes is closed: [`CorrectionCode`] names a code and its
//! parameters, [`Corrector`] holds the built code and dispatches the four
//! code operations (`encode`, `decode`, `measure_syndrome`,
//! `correct_errors`) by variant.
//!
//! Corrections that the code cannot resolve are not errors. They come back
//! as a [`CorrectionOutcome`] with `uncorrectable` set, and show up as
//! reduced logical fidelity.

pub mod pauli;
pub mod shor;
pub mod steane;
pub mod surface;
pub mod syndrome;

pub use pauli::{PauliKind, PauliOperator, StabilizerGenerator, apply_pauli};
pub use shor::ShorCode;
pub use steane::SteaneCode;
pub use surface::{IdentityDecoder, Site, SiteRole, SurfaceCode, SurfaceDecoder, SurfaceLattice};
pub use syndrome::{SyndromeEntry, SyndromeResult, SyndromeTable};

use crate::config::FaultToleranceConfig;
use crate::core::{AmplitudeVector, QuantumError};
use crate::validation::validate_logical_state;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Distance used when a surface code is named without one.
pub const DEFAULT_SURFACE_DISTANCE: usize = 3;

/// The supported codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CorrectionCode {
    /// [[7,1,3]] CSS code.
    Steane7,
    /// [[9,1,3]] concatenated repetition code.
    Shor9,
    /// Planar surface code on a `distance x distance` lattice.
    Surface { distance: usize },
}

impl CorrectionCode {
    /// Parses a code name, giving surface codes `default_distance` when the
    /// name does not carry one (`"surface"` vs `"surface_5"`).
    pub fn parse_with_distance(name: &str, default_distance: usize) -> Result<Self, QuantumError> {
        let lowered = name.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "steane_7" | "steane" => Ok(CorrectionCode::Steane7),
            "shor_9" | "shor" => Ok(CorrectionCode::Shor9),
            "surface" => Ok(CorrectionCode::Surface { distance: default_distance }),
            other => match other.strip_prefix("surface_").map(str::parse::<usize>) {
                Some(Ok(distance)) => Ok(CorrectionCode::Surface { distance }),
                _ => Err(QuantumError::UnsupportedCode { code: name.to_string() }),
            },
        }
    }

    /// Physical qubits used to encode one logical qubit. Saturates at
    /// `usize::MAX` for surface distances too large to count, so the result
    /// always fails a qubit cap instead of wrapping.
    pub fn num_physical_qubits(&self) -> usize {
        match self {
            CorrectionCode::Steane7 => 7,
            CorrectionCode::Shor9 => 9,
            CorrectionCode::Surface { distance } => distance
                .checked_mul(*distance)
                .and_then(|sites| sites.checked_mul(2))
                .map_or(usize::MAX, |n| n.saturating_sub(1)),
        }
    }

    /// Code distance.
    pub fn distance(&self) -> usize {
        match self {
            CorrectionCode::Steane7 | CorrectionCode::Shor9 => 3,
            CorrectionCode::Surface { distance } => *distance,
        }
    }

    /// Label used for statistics and at the service boundary.
    pub fn label(&self) -> String {
        match self {
            CorrectionCode::Steane7 => "steane_7".to_string(),
            CorrectionCode::Shor9 => "shor_9".to_string(),
            CorrectionCode::Surface { distance } => format!("surface_{}", distance),
        }
    }
}

impl fmt::Display for CorrectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for CorrectionCode {
    type Err = QuantumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_distance(s, DEFAULT_SURFACE_DISTANCE)
    }
}

/// A single-qubit Pauli applied as a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppliedCorrection {
    pub pauli: PauliKind,
    pub qubit: usize,
}

/// Result of `correct_errors`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionOutcome {
    /// Physical state after the corrections.
    pub state: AmplitudeVector,
    /// Corrections applied, in order.
    pub applied: Vec<AppliedCorrection>,
    /// `true` if part of the syndrome had no known correction.
    pub uncorrectable: bool,
}

/// Fixed description of a built code.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeParameters {
    pub code: CorrectionCode,
    pub num_physical_qubits: usize,
    pub distance: usize,
    /// Generators in syndrome-bit order.
    pub generators: Vec<StabilizerGenerator>,
    /// Logical bit flip.
    pub logical_x: StabilizerGenerator,
    /// Logical phase flip.
    pub logical_z: StabilizerGenerator,
    pub syndrome_table: SyndromeTable,
}

/// Logical |0> and |1> of a code as physical states.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Codewords {
    zero: AmplitudeVector,
    one: AmplitudeVector,
}

impl Codewords {
    /// Builds both codewords from `(basis index, amplitude)` terms.
    pub(crate) fn from_terms(
        num_qubits: usize,
        zero: &[(usize, f64)],
        one: &[(usize, f64)],
    ) -> Result<Self, QuantumError> {
        let build = |terms: &[(usize, f64)]| -> Result<AmplitudeVector, QuantumError> {
            let mut amps = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
            for &(index, amplitude) in terms {
                amps[index] = Complex64::new(amplitude, 0.0);
            }
            AmplitudeVector::new(amps)
        };
        Ok(Self { zero: build(zero)?, one: build(one)? })
    }

    pub(crate) fn zero(&self) -> &AmplitudeVector {
        &self.zero
    }

    pub(crate) fn one(&self) -> &AmplitudeVector {
        &self.one
    }

    /// `α|0_L> + β|1_L>`.
    pub(crate) fn encode(
        &self,
        logical: &AmplitudeVector,
    ) -> Result<AmplitudeVector, QuantumError> {
        let alpha = logical.amplitudes()[0];
        let beta = logical.amplitudes()[1];
        let amps = self
            .zero
            .amplitudes()
            .iter()
            .zip(self.one.amplitudes())
            .map(|(z, o)| alpha * z + beta * o)
            .collect();
        AmplitudeVector::new(amps)
    }

    /// Overlaps with both codewords, renormalized. Relative phase between
    /// the logical amplitudes is kept. Falls back to |0> when the state has
    /// no weight on the code space.
    pub(crate) fn decode(
        &self,
        physical: &AmplitudeVector,
    ) -> Result<AmplitudeVector, QuantumError> {
        let alpha = self.zero.inner(physical)?;
        let beta = self.one.inner(physical)?;
        let logical = AmplitudeVector::qubit(alpha, beta);
        match logical.normalized() {
            Some(decoded) => Ok(decoded),
            None => {
                debug!(weight = alpha.norm_sqr() + beta.norm_sqr(), "no code-space weight, decoding to |0>");
                AmplitudeVector::zero_state(1)
            }
        }
    }
}

/// A built code, dispatched by variant.
#[derive(Debug, Clone)]
pub enum Corrector {
    Steane(SteaneCode),
    Shor(ShorCode),
    Surface(SurfaceCode),
}

impl Corrector {
    /// Builds the corrector for `code`, refusing codes wider than
    /// `config.max_physical_qubits`.
    pub fn new(code: CorrectionCode, config: &FaultToleranceConfig) -> Result<Self, QuantumError> {
        if let CorrectionCode::Surface { distance } = code {
            if distance < 2 {
                return Err(QuantumError::invalid_parameter(format!(
                    "surface code distance must be at least 2, got {}",
                    distance
                )));
            }
        }
        let requested = code.num_physical_qubits();
        if requested > config.max_physical_qubits {
            return Err(QuantumError::QubitLimitExceeded { requested, max: config.max_physical_qubits });
        }
        let corrector = match code {
            CorrectionCode::Steane7 => Corrector::Steane(SteaneCode::new()?),
            CorrectionCode::Shor9 => Corrector::Shor(ShorCode::new()?),
            CorrectionCode::Surface { distance } => Corrector::Surface(SurfaceCode::new(distance)?),
        };
        debug!(code = %code, physical_qubits = requested, "built corrector");
        Ok(corrector)
    }

    /// The code's fixed parameters.
    pub fn parameters(&self) -> &CodeParameters {
        match self {
            Corrector::Steane(c) => c.parameters(),
            Corrector::Shor(c) => c.parameters(),
            Corrector::Surface(c) => c.parameters(),
        }
    }

    /// Which code this is.
    pub fn code(&self) -> CorrectionCode {
        self.parameters().code
    }

    /// Encodes a normalized single-qubit state.
    pub fn encode(&self, logical: &AmplitudeVector) -> Result<AmplitudeVector, QuantumError> {
        self.encode_with_tolerance(logical, None)
    }

    /// Like [`Corrector::encode`], accepting logical norms within
    /// `tolerance` of 1 (`NORM_TOLERANCE` when `None`).
    pub fn encode_with_tolerance(
        &self,
        logical: &AmplitudeVector,
        tolerance: Option<f64>,
    ) -> Result<AmplitudeVector, QuantumError> {
        validate_logical_state(logical, tolerance)?;
        self.codewords().encode(logical)
    }

    /// Decodes a physical state back to one qubit.
    pub fn decode(&self, physical: &AmplitudeVector) -> Result<AmplitudeVector, QuantumError> {
        self.check_width(physical)?;
        self.codewords().decode(physical)
    }

    /// Measures every stabilizer generator.
    pub fn measure_syndrome(
        &self,
        physical: &AmplitudeVector,
    ) -> Result<SyndromeResult, QuantumError> {
        self.check_width(physical)?;
        syndrome::measure_generators(physical, &self.parameters().generators)
    }

    /// Applies the correction the syndrome points to.
    pub fn correct_errors(
        &self,
        physical: &AmplitudeVector,
        syndrome: &SyndromeResult,
    ) -> Result<CorrectionOutcome, QuantumError> {
        self.check_width(physical)?;
        let params = self.parameters();
        if syndrome.bits.len() != params.generators.len() {
            return Err(QuantumError::DimensionMismatch {
                expected: params.generators.len(),
                actual: syndrome.bits.len(),
            });
        }
        let (applied, uncorrectable) = match self {
            Corrector::Surface(c) => c.corrections(syndrome),
            _ => syndrome::decode_by_sector(&params.syndrome_table, &params.generators, &syndrome.bits),
        };
        if uncorrectable {
            warn!(code = %params.code, syndrome = %syndrome.pattern(), "syndrome has no known correction");
        }
        let mut state = physical.clone();
        for correction in &applied {
            state = apply_pauli(&state, correction.pauli, correction.qubit)?;
        }
        Ok(CorrectionOutcome { state, applied, uncorrectable })
    }

    /// Physical state of logical |0> (`false`) or |1> (`true`).
    pub fn codeword(&self, logical_one: bool) -> &AmplitudeVector {
        if logical_one { self.codewords().one() } else { self.codewords().zero() }
    }

    fn codewords(&self) -> &Codewords {
        match self {
            Corrector::Steane(c) => c.codewords(),
            Corrector::Shor(c) => c.codewords(),
            Corrector::Surface(c) => c.codewords(),
        }
    }

    fn check_width(&self, physical: &AmplitudeVector) -> Result<(), QuantumError> {
        let n = self.parameters().num_physical_qubits;
        if physical.num_qubits() != n {
            return Err(QuantumError::DimensionMismatch { expected: 1 << n, actual: physical.dim() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_names() -> Result<(), QuantumError> {
        assert_eq!("steane_7".parse::<CorrectionCode>()?, CorrectionCode::Steane7);
        assert_eq!("SHOR_9".parse::<CorrectionCode>()?, CorrectionCode::Shor9);
        assert_eq!("surface".parse::<CorrectionCode>()?, CorrectionCode::Surface { distance: 3 });
        assert_eq!("surface_5".parse::<CorrectionCode>()?, CorrectionCode::Surface { distance: 5 });
        for name in ["color", "repetition", "stabilizer", "surface_x"] {
            assert_eq!(
                name.parse::<CorrectionCode>(),
                Err(QuantumError::UnsupportedCode { code: name.to_string() })
            );
        }
        Ok(())
    }

    #[test]
    fn test_surface_width_is_capped() {
        let config = FaultToleranceConfig::default();
        let err = Corrector::new(CorrectionCode::Surface { distance: 4 }, &config).unwrap_err();
        assert_eq!(err, QuantumError::QubitLimitExceeded { requested: 31, max: 17 });
        assert!(Corrector::new(CorrectionCode::Surface { distance: 1 }, &config).is_err());
    }

    #[test]
    fn test_huge_distance_saturates() {
        let huge = CorrectionCode::Surface { distance: 5_000_000_000 };
        assert_eq!(huge.num_physical_qubits(), usize::MAX);
        assert_eq!(CorrectionCode::Surface { distance: 0 }.num_physical_qubits(), 0);
        let err = Corrector::new(huge, &FaultToleranceConfig::default()).unwrap_err();
        assert_eq!(err, QuantumError::QubitLimitExceeded { requested: usize::MAX, max: 17 });
    }

    #[test]
    fn test_codewords_are_orthogonal() -> Result<(), QuantumError> {
        let config = FaultToleranceConfig::default();
        for code in [CorrectionCode::Steane7, CorrectionCode::Shor9, CorrectionCode::Surface { distance: 2 }] {
            let corrector = Corrector::new(code, &config)?;
            let zero = corrector.codeword(false);
            let one = corrector.codeword(true);
            assert_eq!(zero.num_qubits(), code.num_physical_qubits());
            assert!(zero.inner(one)?.norm() < 1e-12);
            let logical_one = AmplitudeVector::basis_state(1, 1)?;
            assert_eq!(&corrector.encode(&logical_one)?, one);
        }
        Ok(())
    }

    #[test]
    fn test_encode_tolerance_is_configurable() -> Result<(), QuantumError> {
        let corrector = Corrector::new(CorrectionCode::Steane7, &FaultToleranceConfig::default())?;
        // norm² = 1.0001
        let slightly_off = AmplitudeVector::qubit(Complex64::new(1.0, 0.0), Complex64::new(0.01, 0.0));
        assert!(matches!(corrector.encode(&slightly_off), Err(QuantumError::NormDrift { .. })));
        let encoded = corrector.encode_with_tolerance(&slightly_off, Some(1e-3))?;
        assert_eq!(encoded.num_qubits(), 7);
        Ok(())
    }

    #[test]
    fn test_encode_rejects_unnormalized_logical() -> Result<(), QuantumError> {
        let corrector = Corrector::new(CorrectionCode::Steane7, &FaultToleranceConfig::default())?;
        let bad = AmplitudeVector::qubit(Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0));
        assert!(matches!(corrector.encode(&bad), Err(QuantumError::NormDrift { .. })));
        let wide = AmplitudeVector::zero_state(2)?;
        assert!(matches!(corrector.encode(&wide), Err(QuantumError::DimensionMismatch { .. })));
        Ok(())
    }
}
