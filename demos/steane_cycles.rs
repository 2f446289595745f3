// demos/steane_cycles.rs
//
// Compares how the Steane and Shor codes hold a logical |+> under
// increasing noise. `RUST_LOG=stabq=info` traces every run.

use num_complex::Complex64;
use stabq::{AmplitudeVector, CorrectionCode, FaultTolerantService, QuantumError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), QuantumError> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let h = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    let plus = AmplitudeVector::qubit(h, h);
    let batch = vec![plus; 8];

    let mut service = FaultTolerantService::new();
    for code in [CorrectionCode::Steane7, CorrectionCode::Shor9] {
        for error_rate in [0.001, 0.01, 0.05, 0.1] {
            let reports = service.run_batch(&batch, code, error_rate, 20, 7)?;
            let fidelities: Vec<f64> = reports.iter().filter_map(|r| r.as_ref().ok()).map(|r| r.final_fidelity).collect();
            let mean = fidelities.iter().sum::<f64>() / fidelities.len().max(1) as f64;
            println!("{:<8} p={:<6} mean final fidelity over {} runs: {:.4}", code.label(), error_rate, fidelities.len(), mean);
        }
    }

    let stats = service.error_statistics();
    println!("{}", serde_json::to_string_pretty(&stats).map_err(QuantumError::from)?);
    Ok(())
}
