//! Bivariate-bicycle decoding with belief propagation.

use anyhow::{Context, Result, bail};
use qec_core::bp::decode_bp;
use qec_core::cache::CodeCache;
use qec_core::{
    BbFamily, CodeFamily, DecodeOutcome, DecodeStatus, EngineConfig, NoiseModel, Syndrome,
};
use qec_io::parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
pub struct BbReport {
    pub family: String,
    pub n: usize,
    pub k: usize,
    pub d: usize,
    pub p: f64,
    pub shots: usize,
    pub converged: usize,
    pub failures: usize,
    pub mean_iterations: f64,
    pub logical_error_rate: f64,
}

fn iterations(diagnostics: &qec_core::Diagnostics) -> usize {
    match diagnostics {
        qec_core::Diagnostics::BeliefPropagation { iterations, .. } => *iterations,
        _ => 0,
    }
}

/// Decodes one given syndrome.
pub fn decode_one(
    cache: &CodeCache,
    family: BbFamily,
    config: &EngineConfig,
    text: &str,
) -> Result<DecodeOutcome> {
    let bits = parser::parse_bits(text).context("--syndrome")?;
    let code = cache.get_or_build(CodeFamily::Bb(family), 0)?;
    if bits.len() != code.num_checks() {
        bail!(
            "{family} has {} checks, syndrome has {} bits",
            code.num_checks(),
            bits.len()
        );
    }
    let outcome = decode_bp(&code, &Syndrome::new(bits), &config.bp)?;
    println!("Status:     {:?}", outcome.status);
    println!("Iterations: {}", iterations(&outcome.diagnostics));
    println!("Correction: {:?}", outcome.correction.support());
    Ok(outcome)
}

/// Samples `shots` errors at rate `p` and reports how BP fares.
#[allow(clippy::too_many_arguments)]
pub fn simulate(
    cache: &CodeCache,
    family: BbFamily,
    config: &EngineConfig,
    p: f64,
    noise: NoiseModel,
    shots: usize,
    seed: u64,
    json: bool,
) -> Result<BbReport> {
    let code = cache.get_or_build(CodeFamily::Bb(family), 0)?;
    let params = family.params();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut report = BbReport {
        family: family.to_string(),
        n: params.n,
        k: params.k,
        d: params.d,
        p,
        shots,
        ..BbReport::default()
    };
    let mut total_iterations = 0;
    for _ in 0..shots {
        let error = qec_core::sample_error(&code, p, noise, &mut rng)?;
        let syndrome = qec_core::syndrome_of(&code, &error)?;
        let mut outcome = decode_bp(&code, &syndrome, &config.bp)?;
        let converged = outcome.status == DecodeStatus::Converged;
        let ok = outcome.evaluate(&code, &error)?;
        report.converged += usize::from(converged);
        report.failures += usize::from(!ok || !converged);
        total_iterations += iterations(&outcome.diagnostics);
    }
    if shots > 0 {
        report.mean_iterations = total_iterations as f64 / shots as f64;
        report.logical_error_rate = report.failures as f64 / shots as f64;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }
    let cmp = params.surface_code_comparison();
    println!("{family}: [[{}, {}, {}]]", params.n, params.k, params.d);
    println!(
        "Qubits vs surface code patches: {} vs {} ({:.1}% saved)",
        cmp.bb_code_qubits, cmp.surface_code_qubits, cmp.qubit_savings_percent
    );
    println!("p = {p}, {shots} shots, seed {seed}");
    println!("Converged:       {}/{}", report.converged, shots);
    println!("Mean iterations: {:.2}", report.mean_iterations);
    println!(
        "Logical errors:  {} ({:.6})",
        report.failures, report.logical_error_rate
    );
    Ok(report)
}
