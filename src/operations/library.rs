// src/operations/library.rs

//! Registry of gate matrices, memoized by kind and parameters.
//!
//! Fixed gates are seeded at construction. Parametrized gates are built on
//! first use and kept for the lifetime of the process; the parameter space
//! exercised in practice is small, so the cache is not bounded.

use super::{GateKind, GateParams, Matrix, PARAM_N_QUBITS, PARAM_THETA};
use crate::core::QuantumError;
use crate::core::constants::limits::MAX_SIMULATION_QUBITS;
use ndarray::{Array2, arr2};
use num_complex::Complex64;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

static GLOBAL_LIBRARY: Lazy<GateLibrary> = Lazy::new(GateLibrary::new);

/// Thread-safe gate matrix cache.
///
/// Lookups take the read lock; a miss builds the matrix without holding any
/// lock and then inserts under the write lock, keeping whichever entry landed
/// first.
pub struct GateLibrary {
    cache: RwLock<HashMap<String, Arc<Matrix>>>,
}

impl GateLibrary {
    /// Creates a library with the fixed gates precomputed.
    pub fn new() -> Self {
        let mut cache = HashMap::new();
        for kind in [
            GateKind::PauliX,
            GateKind::PauliY,
            GateKind::PauliZ,
            GateKind::Hadamard,
            GateKind::S,
            GateKind::T,
            GateKind::Cnot,
            GateKind::Swap,
        ] {
            if let Some(matrix) = fixed_matrix(kind) {
                cache.insert(kind.name().to_string(), Arc::new(matrix));
            }
        }
        Self { cache: RwLock::new(cache) }
    }

    /// The process-wide instance shared by every circuit and corrector.
    pub fn global() -> &'static GateLibrary {
        &GLOBAL_LIBRARY
    }

    /// Returns the matrix for `kind` with `params`, building and caching it
    /// on a miss.
    pub fn resolve(
        &self,
        kind: GateKind,
        params: &GateParams,
    ) -> Result<Arc<Matrix>, QuantumError> {
        let key = cache_key(kind, params);
        if let Some(matrix) = self.cache.read().get(&key) {
            return Ok(Arc::clone(matrix));
        }

        let built = Arc::new(build_matrix(kind, params)?);
        debug!(gate = %kind, key = %key, dim = built.nrows(), "gate cache miss");

        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(key).or_insert(built)))
    }

    /// Resolves a gate given by name, e.g. `"hadamard"` or `"phase"`.
    pub fn resolve_named(
        &self,
        name: &str,
        params: &GateParams,
    ) -> Result<Arc<Matrix>, QuantumError> {
        self.resolve(name.parse()?, params)
    }

    /// Number of cached matrices.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// `true` if `kind` with `params` is already cached.
    pub fn contains(&self, kind: GateKind, params: &GateParams) -> bool {
        self.cache.read().contains_key(&cache_key(kind, params))
    }
}

impl Default for GateLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key: kind name followed by the parameters relevant to the kind, in
/// key order, with exact bit patterns for the values.
pub fn cache_key(kind: GateKind, params: &GateParams) -> String {
    let mut key = kind.name().to_string();
    if kind.is_parametrized() {
        for (name, value) in params {
            let _ = write!(key, ";{}={:016x}", name, value.to_bits());
        }
    }
    key
}

fn build_matrix(kind: GateKind, params: &GateParams) -> Result<Matrix, QuantumError> {
    if let Some(matrix) = fixed_matrix(kind) {
        return Ok(matrix);
    }
    match kind {
        GateKind::Phase => Ok(phase_matrix(theta(params)?)),
        GateKind::ControlledPhase => Ok(controlled_phase_matrix(theta(params)?)),
        GateKind::Qft => Ok(qft_matrix(width(params)?)),
        GateKind::Diffuser => Ok(diffuser_matrix(width(params)?)),
        _ => Err(QuantumError::UnknownGateKind { kind: kind.name().to_string() }),
    }
}

fn theta(params: &GateParams) -> Result<f64, QuantumError> {
    let theta = params.get(PARAM_THETA).copied().unwrap_or(0.0);
    if !theta.is_finite() {
        return Err(QuantumError::invalid_parameter(format!("theta must be finite, got {}", theta)));
    }
    Ok(theta)
}

fn width(params: &GateParams) -> Result<usize, QuantumError> {
    let n = params.get(PARAM_N_QUBITS).copied().unwrap_or(2.0);
    if n.fract() != 0.0 || n < 1.0 || n > MAX_SIMULATION_QUBITS as f64 {
        return Err(QuantumError::invalid_parameter(format!(
            "n_qubits must be an integer in [1, {}], got {}",
            MAX_SIMULATION_QUBITS, n
        )));
    }
    Ok(n as usize)
}

#[inline]
fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn fixed_matrix(kind: GateKind) -> Option<Matrix> {
    let o = Complex64::zero();
    let l = Complex64::one();
    let m = match kind {
        GateKind::PauliX => arr2(&[[o, l], [l, o]]),
        GateKind::PauliY => arr2(&[[o, c(0.0, -1.0)], [c(0.0, 1.0), o]]),
        GateKind::PauliZ => arr2(&[[l, o], [o, -l]]),
        GateKind::Hadamard => {
            let h = c(FRAC_1_SQRT_2, 0.0);
            arr2(&[[h, h], [h, -h]])
        }
        GateKind::S => phase_matrix(PI / 2.0),
        GateKind::T => phase_matrix(PI / 4.0),
        GateKind::Cnot => arr2(&[
            [l, o, o, o],
            [o, l, o, o],
            [o, o, o, l],
            [o, o, l, o],
        ]),
        GateKind::Swap => arr2(&[
            [l, o, o, o],
            [o, o, l, o],
            [o, l, o, o],
            [o, o, o, l],
        ]),
        _ => return None,
    };
    Some(m)
}

/// `diag(1, e^{iθ})`.
pub fn phase_matrix(theta: f64) -> Matrix {
    arr2(&[
        [Complex64::one(), Complex64::zero()],
        [Complex64::zero(), Complex64::from_polar(1.0, theta)],
    ])
}

/// `diag(1, 1, 1, e^{iθ})`.
pub fn controlled_phase_matrix(theta: f64) -> Matrix {
    let mut m = Array2::<Complex64>::eye(4);
    m[[3, 3]] = Complex64::from_polar(1.0, theta);
    m
}

/// QFT on `n` qubits: entries `ω^{ij} / √N` with `ω = e^{2πi/N}`, `N = 2^n`.
pub fn qft_matrix(n: usize) -> Matrix {
    let dim = 1usize << n;
    let scale = 1.0 / (dim as f64).sqrt();
    Array2::from_shape_fn((dim, dim), |(i, j)| {
        // Reduce the exponent first so large products keep full precision.
        let k = (i * j) % dim;
        Complex64::from_polar(scale, 2.0 * PI * k as f64 / dim as f64)
    })
}

/// Diffuser `2|s><s| - I` for the uniform superposition `|s>` on `n` qubits.
pub fn diffuser_matrix(n: usize) -> Matrix {
    let dim = 1usize << n;
    let off = 2.0 / dim as f64;
    Array2::from_shape_fn((dim, dim), |(i, j)| {
        if i == j { c(off - 1.0, 0.0) } else { c(off, 0.0) }
    })
}

/// Kronecker fold `ops[0] ⊗ ops[1] ⊗ ...`. An empty slice gives the 1×1 identity.
pub fn tensor_product(ops: &[Matrix]) -> Matrix {
    ops.iter()
        .fold(Array2::<Complex64>::eye(1), |acc, op| ndarray::linalg::kron(&acc, op))
}
