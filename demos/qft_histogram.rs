// demos/qft_histogram.rs
//
// Runs the QFT on a basis state and prints the sampled histogram.
// `RUST_LOG=stabq=debug cargo run --example qft_histogram` shows gate paths.

use rand::SeedableRng;
use rand::rngs::StdRng;
use stabq::{AmplitudeVector, CircuitBuilder, Circuit, QuantumError, Simulator};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), QuantumError> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let n = 3;
    let mut circuit = CircuitBuilder::new(n).with_initial_state(AmplitudeVector::basis_state(n, 0b001)?).build()?;
    circuit.add_gates(Circuit::qft(n)?.gates().iter().cloned())?;
    println!("{}", circuit);

    let mut rng = StdRng::seed_from_u64(2024);
    let result = Simulator::new().run(&circuit, 1000, &mut rng)?;
    println!("{}", result);

    let mut counts: Vec<_> = result.counts().iter().collect();
    counts.sort();
    for (pattern, count) in counts {
        println!("{} {:>5} {}", pattern, count, "#".repeat(count / 10));
    }
    Ok(())
}
