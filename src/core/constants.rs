//! Numerical constants shared across the kernel.

/// Tolerances used when checking physical invariants.
pub mod tolerances {
    /// Allowed deviation of the squared norm from 1.0.
    pub const NORM_TOLERANCE: f64 = 1e-9;
    /// Allowed entry-wise deviation of U U† from the identity.
    pub const UNITARY_TOLERANCE: f64 = 1e-9;
    /// Amplitudes below this squared magnitude are treated as zero.
    pub const AMPLITUDE_EPSILON: f64 = 1e-12;
}

/// Default limits at the service boundary.
pub mod limits {
    /// Largest register accepted for circuit simulation.
    pub const MAX_SIMULATION_QUBITS: usize = 12;
    /// Largest shot count accepted for one measurement.
    pub const MAX_SHOTS: usize = 10_000;
    /// Largest physical register a correction code may encode into.
    /// 17 covers the distance-3 surface code.
    pub const MAX_PHYSICAL_QUBITS: usize = 17;
}
