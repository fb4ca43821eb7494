use crate::stats::LatencyStats;
use anyhow::{Context, Result, bail};
use qec_core::bit_utils::Bits;
use qec_core::cache::CodeCache;
use qec_core::{DecodeStatus, DecoderKind, EngineConfig, PauliFrame, Syndrome, decode};
use qec_io::CodeSpec;
use qec_io::loader;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Per-thread counts gathered alongside latency.
#[derive(Debug, Clone, Default)]
struct Totals {
    stats: LatencyStats,
    converged: usize,
    failures: usize,
}

impl Totals {
    fn merge(self, other: Totals) -> Totals {
        Totals {
            stats: self.stats.merge(&other.stats),
            converged: self.converged + other.converged,
            failures: self.failures + other.failures,
        }
    }
}

fn unpack_error(bits: &Bits, n: usize) -> Option<PauliFrame> {
    PauliFrame::from_registers(bits[..n].to_bitvec(), bits[n..].to_bitvec())
}

/// Decodes every shot of a syndrome file in parallel and reports
/// throughput and latency. With an error file, each correction is also
/// scored against its true error.
pub fn run_benchmark(
    cache: &CodeCache,
    spec: CodeSpec,
    decoder: DecoderKind,
    config: &EngineConfig,
    syndrome_path: &Path,
    error_path: Option<&Path>,
) -> Result<()> {
    let start_load = Instant::now();
    let code = cache
        .get_or_build(spec.family, spec.size)
        .with_context(|| format!("cannot build {spec}"))?;
    println!(
        "Code {spec} built in {:?}. Qubits: {}, Checks: {}",
        start_load.elapsed(),
        code.n(),
        code.num_checks()
    );

    println!("Loading shots from {}...", syndrome_path.display());
    let shots = loader::load_shots(syndrome_path, code.num_checks())?;
    let errors = match error_path {
        Some(path) => {
            let raw = loader::load_shots(path, 2 * code.n())?;
            if raw.len() != shots.len() {
                bail!(
                    "{} holds {} errors for {} syndromes",
                    path.display(),
                    raw.len(),
                    shots.len()
                );
            }
            Some(raw)
        }
        None => None,
    };
    println!("Loaded {} shots.", shots.len());

    println!("Starting benchmark ({decoder}, rayon)...");
    let start_bench = Instant::now();
    let totals = shots
        .par_iter()
        .enumerate()
        .map(|(i, bits)| -> Result<Totals> {
            let syndrome = Syndrome::new(bits.clone());
            let start = Instant::now();
            let outcome = decode(decoder, &code, &syndrome, config);
            let nanos = start.elapsed().as_nanos() as u64;

            let mut totals = Totals::default();
            totals.stats.update(nanos);
            match outcome {
                Ok(mut outcome) => {
                    let converged = outcome.status == DecodeStatus::Converged;
                    totals.converged = usize::from(converged);
                    if let Some(errors) = &errors {
                        let error = unpack_error(&errors[i], code.n())
                            .context("error shot has mismatched registers")?;
                        let ok = outcome.evaluate(&code, &error)?;
                        totals.failures = usize::from(!ok || !converged);
                    }
                }
                Err(qec_core::QecError::UnsupportedSyndrome { .. }) => {
                    totals.failures = usize::from(errors.is_some());
                }
                Err(e) => return Err(e.into()),
            }
            Ok(totals)
        })
        .try_reduce(Totals::default, |a, b| Ok(a.merge(b)))?;

    let seconds = start_bench.elapsed().as_secs_f64();
    let throughput = shots.len() as f64 / seconds;

    println!("Results");
    println!("Time: {:.4} s", seconds);
    println!("Throughput: {:.2} shots/s", throughput);
    println!("Converged: {}/{}", totals.converged, shots.len());
    if errors.is_some() {
        let rate = if shots.is_empty() {
            0.0
        } else {
            totals.failures as f64 / shots.len() as f64
        };
        println!("Logical failures: {} ({:.4})", totals.failures, rate);
    }
    totals.stats.print_report();
    Ok(())
}
