// tests/simulation_tests.rs

use stabq::simulation::engine;
use stabq::{
    AmplitudeVector, Circuit, CircuitBuilder, Gate, GateKind, GateParams, QuantumError, SimulatorConfig, Simulator,
};

use approx::assert_relative_eq;
use num_complex::Complex64;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::f64::consts::PI;

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[test]
fn test_qft_three_qubits_thousand_shots() -> Result<(), QuantumError> {
    let circuit = Circuit::qft(3)?;
    let result = Simulator::new().run(&circuit, 1000, &mut rng(2024))?;

    assert_eq!(result.counts().values().sum::<usize>(), 1000);
    assert_eq!(result.state().amplitudes().len(), 8);
    assert_relative_eq!(result.state().norm(), 1.0, epsilon = 1e-12);
    // QFT of |000> is the uniform superposition.
    for p in result.probabilities() {
        assert_relative_eq!(*p, 0.125, epsilon = 1e-12);
    }
    assert!(result.counts().keys().all(|k| k.len() == 3));
    Ok(())
}

#[test]
fn test_hadamard_histogram_converges() -> Result<(), QuantumError> {
    let circuit = CircuitBuilder::new(1).h(0).build()?;
    let sim = Simulator::with_config(SimulatorConfig::default().with_max_shots(100_000))?;
    let result = sim.run(&circuit, 100_000, &mut rng(1))?;
    for outcome in ["0", "1"] {
        let freq = result.count(outcome) as f64 / 100_000.0;
        assert!((freq - 0.5).abs() < 0.01, "frequency of {} = {}", outcome, freq);
    }
    Ok(())
}

#[test]
fn test_seeded_runs_repeat() -> Result<(), QuantumError> {
    let circuit = CircuitBuilder::new(3).h(0).h(1).t(1).cnot(1, 2).build()?;
    let sim = Simulator::new();
    let a = sim.run(&circuit, 200, &mut rng(9))?;
    let b = sim.run(&circuit, 200, &mut rng(9))?;
    assert_eq!(a.counts(), b.counts());
    Ok(())
}

#[test]
fn test_non_adjacent_cnot() -> Result<(), QuantumError> {
    // |100> -> CNOT(0, 2) -> |101>
    let circuit = CircuitBuilder::new(3)
        .with_initial_state(AmplitudeVector::basis_state(3, 0b100)?)
        .cnot(0, 2)
        .build()?;
    let state = Simulator::new().evolve(&circuit)?;
    assert_relative_eq!(state.amplitudes()[0b101].re, 1.0, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_fast_path_refuses_wide_gates() -> Result<(), QuantumError> {
    let state = AmplitudeVector::zero_state(3)?;
    let qft = Gate::qft(vec![0, 1, 2])?;
    assert!(matches!(engine::apply(&state, &qft), Err(QuantumError::UnsupportedArity { arity: 3, .. })));
    let dense = engine::apply_general(&state, &qft)?;
    let contracted = engine::apply_contracted(&state, &qft)?;
    for (a, b) in dense.amplitudes().iter().zip(contracted.amplitudes()) {
        assert!((a - b).norm() < 1e-12);
    }
    Ok(())
}

#[test]
fn test_validation_errors_reach_the_caller() -> Result<(), QuantumError> {
    assert_eq!(
        CircuitBuilder::new(2).h(2).build().unwrap_err(),
        QuantumError::QubitOutOfRange { index: 2, num_qubits: 2 }
    );
    assert_eq!(CircuitBuilder::new(2).cnot(1, 1).build().unwrap_err(), QuantumError::DuplicateQubit(1));
    assert!(matches!(
        Gate::new(GateKind::Hadamard, vec![0, 1], GateParams::new()),
        Err(QuantumError::UnsupportedArity { .. })
    ));
    assert!(matches!("toffoli".parse::<GateKind>(), Err(QuantumError::UnknownGateKind { .. })));

    let sim = Simulator::new();
    let circuit = Circuit::new(1)?;
    assert_eq!(
        sim.run(&circuit, 0, &mut rng(0)).unwrap_err(),
        QuantumError::InvalidShotCount { shots: 0, max: 10_000 }
    );
    assert_eq!(
        sim.run(&Circuit::new(13)?, 1, &mut rng(0)).unwrap_err(),
        QuantumError::QubitLimitExceeded { requested: 13, max: 12 }
    );
    Ok(())
}

#[test]
fn test_non_unitary_custom_gate() {
    let m = ndarray::array![[Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)], [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)]];
    assert!(matches!(Gate::custom(m, vec![0]), Err(QuantumError::NonUnitary { .. })));
}

fn arb_state(n: usize) -> impl Strategy<Value = AmplitudeVector> {
    prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), 1 << n).prop_filter_map("zero vector", |raw| {
        let amps = raw.into_iter().map(|(re, im)| Complex64::new(re, im)).collect();
        AmplitudeVector::new(amps).ok()?.normalized()
    })
}

fn arb_gate(n: usize) -> impl Strategy<Value = Gate> {
    (0..6usize, 0..n, 1..n, -PI..PI).prop_map(move |(which, q, offset, theta)| {
        let other = (q + offset) % n;
        let gate = match which {
            0 => Gate::h(q),
            1 => Gate::t(q),
            2 => Gate::phase(q, theta),
            3 => Gate::cnot(q, other),
            4 => Gate::controlled_phase(q, other, theta),
            _ => Gate::swap(q, other),
        };
        gate.expect("generated gate is valid")
    })
}

proptest! {
    #[test]
    fn prop_gates_preserve_norm(
        state in arb_state(4),
        gates in prop::collection::vec(arb_gate(4), 1..12),
    ) {
        let mut current = state;
        for gate in &gates {
            current = engine::apply(&current, gate).expect("gate applies");
            prop_assert!((current.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_qft_gate_preserves_norm(state in arb_state(3)) {
        let qft = Gate::qft(vec![2, 0, 1]).expect("qft builds");
        let out = engine::apply_contracted(&state, &qft).expect("qft applies");
        prop_assert!((out.norm() - 1.0).abs() < 1e-9);
    }
}
