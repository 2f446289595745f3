// src/circuits/mod.rs

//! Ordered gate sequences over a fixed-width qubit register.
//!
//! A [`Circuit`] owns its gate list and the state those gates act on. The
//! [`CircuitBuilder`] chains gate constructors and reports the first
//! construction error when the circuit is built, so call sites stay linear.

use crate::core::{AmplitudeVector, QuantumError};
use crate::operations::{Gate, GateKind, Matrix};
use num_complex::Complex64;
use std::f64::consts::PI;
use std::fmt;

/// An ordered sequence of gates on `num_qubits` qubits, plus the current
/// state of the register.
///
/// Every gate's targets lie in `[0, num_qubits)`; this is checked on insert.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    gates: Vec<Gate>,
    state: AmplitudeVector,
}

impl Circuit {
    /// Creates an empty circuit on `num_qubits` qubits, starting in |0...0>.
    pub fn new(num_qubits: usize) -> Result<Self, QuantumError> {
        Ok(Self { num_qubits, gates: Vec::new(), state: AmplitudeVector::zero_state(num_qubits)? })
    }

    /// Creates an empty circuit that starts from `state`.
    pub fn with_state(state: AmplitudeVector) -> Self {
        Self { num_qubits: state.num_qubits(), gates: Vec::new(), state }
    }

    /// Appends a gate after checking its targets against the register.
    pub fn add_gate(&mut self, gate: Gate) -> Result<(), QuantumError> {
        gate.validate_for(self.num_qubits)?;
        self.gates.push(gate);
        Ok(())
    }

    /// Appends every gate from `gates`, stopping at the first invalid one.
    pub fn add_gates<I>(&mut self, gates: I) -> Result<(), QuantumError>
    where
        I: IntoIterator<Item = Gate>,
    {
        for gate in gates {
            self.add_gate(gate)?;
        }
        Ok(())
    }

    /// Replaces the current state. The width must match the register.
    pub fn set_state(&mut self, state: AmplitudeVector) -> Result<(), QuantumError> {
        if state.num_qubits() != self.num_qubits {
            return Err(QuantumError::DimensionMismatch { expected: 1 << self.num_qubits, actual: state.dim() });
        }
        self.state = state;
        Ok(())
    }

    /// Resets the register to |0...0>; the gate list is kept.
    pub fn reset(&mut self) -> Result<(), QuantumError> {
        self.state = AmplitudeVector::zero_state(self.num_qubits)?;
        Ok(())
    }

    /// Register width.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Current state of the register.
    pub fn state(&self) -> &AmplitudeVector {
        &self.state
    }

    /// Number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// `true` if the circuit has no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// QFT on `n` qubits as a Hadamard and controlled-phase ladder followed
    /// by the bit-reversal swaps. Its overall unitary equals the dense QFT
    /// matrix from the gate library.
    pub fn qft(n: usize) -> Result<Self, QuantumError> {
        let mut builder = CircuitBuilder::new(n);
        for i in 0..n {
            builder = builder.h(i);
            for j in (i + 1)..n {
                builder = builder.controlled_phase(j, i, PI / (1u64 << (j - i)) as f64);
            }
        }
        for i in 0..n / 2 {
            builder = builder.swap(i, n - 1 - i);
        }
        builder.build()
    }

    /// Grover search for basis index `marked` on `n` qubits.
    ///
    /// Uniform superposition, then `⌊π/4 · √N⌋` rounds of a phase oracle
    /// (a diagonal gate with `-1` at `marked`) and the diffuser.
    pub fn grover(n: usize, marked: usize) -> Result<Self, QuantumError> {
        if n == 0 || n >= usize::BITS as usize {
            return Err(QuantumError::invalid_parameter(format!("grover needs a register of 1 or more qubits, got {}", n)));
        }
        let dim = 1usize << n;
        if marked >= dim {
            return Err(QuantumError::invalid_parameter(format!("marked index {} outside [0, {})", marked, dim)));
        }

        let all: Vec<usize> = (0..n).collect();
        let mut oracle = Matrix::eye(dim);
        oracle[[marked, marked]] = Complex64::new(-1.0, 0.0);
        let oracle = Gate::custom(oracle, all.clone())?;
        let diffuser = Gate::diffuser(all)?;
        let iterations = ((PI / 4.0) * (dim as f64).sqrt()).floor() as usize;

        let mut builder = CircuitBuilder::new(n);
        for q in 0..n {
            builder = builder.h(q);
        }
        for _ in 0..iterations {
            builder = builder.add_gate(oracle.clone()).add_gate(diffuser.clone());
        }
        builder.build()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Chained construction of a [`Circuit`].
///
/// Gate constructors may fail (bad targets, bad parameters). The builder
/// keeps the first failure and returns it from [`CircuitBuilder::build`].
pub struct CircuitBuilder {
    num_qubits: usize,
    gates: Vec<Gate>,
    initial_state: Option<AmplitudeVector>,
    error: Option<QuantumError>,
}

impl CircuitBuilder {
    /// Starts a builder for an `num_qubits`-wide register.
    pub fn new(num_qubits: usize) -> Self {
        Self { num_qubits, gates: Vec::new(), initial_state: None, error: None }
    }

    /// Starts from `state` instead of |0...0>.
    pub fn with_initial_state(mut self, state: AmplitudeVector) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Appends a prepared gate.
    pub fn add_gate(mut self, gate: Gate) -> Self {
        self.gates.push(gate);
        self
    }

    /// Appends several prepared gates.
    pub fn add_gates<I>(mut self, gates: I) -> Self
    where
        I: IntoIterator<Item = Gate>,
    {
        self.gates.extend(gates);
        self
    }

    /// Appends the outcome of a gate constructor, recording its error if any.
    pub fn gate(mut self, gate: Result<Gate, QuantumError>) -> Self {
        match gate {
            Ok(g) => self.gates.push(g),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
            }
        }
        self
    }

    pub fn x(self, q: usize) -> Self {
        self.gate(Gate::x(q))
    }

    pub fn y(self, q: usize) -> Self {
        self.gate(Gate::y(q))
    }

    pub fn z(self, q: usize) -> Self {
        self.gate(Gate::z(q))
    }

    pub fn h(self, q: usize) -> Self {
        self.gate(Gate::h(q))
    }

    pub fn s(self, q: usize) -> Self {
        self.gate(Gate::s(q))
    }

    pub fn t(self, q: usize) -> Self {
        self.gate(Gate::t(q))
    }

    pub fn cnot(self, control: usize, target: usize) -> Self {
        self.gate(Gate::cnot(control, target))
    }

    pub fn swap(self, a: usize, b: usize) -> Self {
        self.gate(Gate::swap(a, b))
    }

    pub fn phase(self, q: usize, theta: f64) -> Self {
        self.gate(Gate::phase(q, theta))
    }

    pub fn controlled_phase(self, a: usize, b: usize, theta: f64) -> Self {
        self.gate(Gate::controlled_phase(a, b, theta))
    }

    pub fn qft(self, targets: Vec<usize>) -> Self {
        self.gate(Gate::qft(targets))
    }

    pub fn diffuser(self, targets: Vec<usize>) -> Self {
        self.gate(Gate::diffuser(targets))
    }

    /// Validates every gate against the register and returns the circuit.
    pub fn build(self) -> Result<Circuit, QuantumError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut circuit = match self.initial_state {
            Some(state) => {
                let mut c = Circuit::new(self.num_qubits)?;
                c.set_state(state)?;
                c
            }
            None => Circuit::new(self.num_qubits)?,
        };
        circuit.add_gates(self.gates)?;
        Ok(circuit)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gates.is_empty() {
            return writeln!(f, "stabq::Circuit[0 gates on {} qubits]", self.num_qubits);
        }

        // --- Setup ---
        let gates = &self.gates;
        let num_gates = gates.len();
        let num_rows = self.num_qubits;

        let max_label_width = format!("q{}", num_rows.saturating_sub(1)).len();
        let label_padding = " ".repeat(max_label_width + 2); // Label + ": "

        const GATE_WIDTH: usize = 7; // e.g., "───H───"
        const WIRE: &str = "───────"; // GATE_WIDTH dashes
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the gate or wire segment
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_gates]; num_rows];
        // v_connect[row][time] holds the connector drawn below this row
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_gates]; num_rows];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!("{}{}{}", H_WIRE.to_string().repeat(pre_dashes), symbol, H_WIRE.to_string().repeat(post_dashes))
            }
        }

        // --- Populate Grids ---
        for (t, gate) in gates.iter().enumerate() {
            let targets = gate.targets();
            match gate.kind() {
                GateKind::Cnot | GateKind::ControlledPhase => {
                    op_grid[targets[0]][t] = format_gate("@");
                    op_grid[targets[1]][t] = format_gate(gate.kind().symbol());
                }
                _ => {
                    for &q in targets {
                        op_grid[q][t] = format_gate(gate.kind().symbol());
                    }
                }
            }
            if targets.len() > 1 {
                let r_min = targets.iter().copied().min().unwrap_or(0);
                let r_max = targets.iter().copied().max().unwrap_or(0);
                for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                    row_vec[t] = V_WIRE;
                }
            }
        }

        // --- Format Output String ---
        writeln!(f, "stabq::Circuit[{} gates on {} qubits]", num_gates, num_rows)?;
        for r in 0..num_rows {
            let label = format!("q{}: ", r);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_rows - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_gates {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defers_first_error() {
        let result = CircuitBuilder::new(2).h(0).cnot(0, 0).x(5).build();
        assert_eq!(result.unwrap_err(), QuantumError::DuplicateQubit(0));
    }

    #[test]
    fn test_builder_checks_targets_against_register() {
        let result = CircuitBuilder::new(2).h(0).x(2).build();
        assert_eq!(result.unwrap_err(), QuantumError::QubitOutOfRange { index: 2, num_qubits: 2 });
    }

    #[test]
    fn test_qft_circuit_layout() -> Result<(), QuantumError> {
        let qft = Circuit::qft(3)?;
        // 3 Hadamards, 3 controlled phases, 1 swap
        assert_eq!(qft.len(), 7);
        assert_eq!(qft.gates()[6].kind(), GateKind::Swap);
        assert_eq!(qft.gates()[6].targets(), &[0, 2]);
        Ok(())
    }

    #[test]
    fn test_grover_iteration_count() -> Result<(), QuantumError> {
        // N = 8: floor(π/4 · √8) = 2 rounds of oracle + diffuser after 3 Hadamards
        let grover = Circuit::grover(3, 5)?;
        assert_eq!(grover.len(), 3 + 2 * 2);
        assert!(Circuit::grover(3, 8).is_err());
        Ok(())
    }

    #[test]
    fn test_reset_restores_zero_state() -> Result<(), QuantumError> {
        let mut circuit = CircuitBuilder::new(2)
            .with_initial_state(AmplitudeVector::basis_state(2, 3)?)
            .h(0)
            .build()?;
        assert_eq!(circuit.state().amplitudes()[3], Complex64::new(1.0, 0.0));
        circuit.reset()?;
        assert_eq!(circuit.state(), &AmplitudeVector::zero_state(2)?);
        assert_eq!(circuit.len(), 1);
        Ok(())
    }

    #[test]
    fn test_display_draws_one_wire_per_qubit() -> Result<(), QuantumError> {
        let bell = CircuitBuilder::new(2).h(0).cnot(0, 1).build()?;
        let text = bell.to_string();
        assert!(text.starts_with("stabq::Circuit[2 gates on 2 qubits]"));
        assert!(text.contains("q0: ───H──────@───"));
        assert!(text.contains("q1: ──────────X───"));
        assert!(text.contains('│'));
        Ok(())
    }
}
