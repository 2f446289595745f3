// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;
pub mod constants;

// Re-export public types for convenient access via `stabq::core::TypeName`
pub use error::QuantumError;
pub use state::AmplitudeVector;
pub use constants::tolerances::{AMPLITUDE_EPSILON, NORM_TOLERANCE, UNITARY_TOLERANCE};
