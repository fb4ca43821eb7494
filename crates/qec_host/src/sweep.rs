//! Threshold sweeps from the command line.

use anyhow::{Context, Result};
use qec_core::cache::CodeCache;
use qec_core::{DecoderKind, EngineConfig, SweepPlan, ThresholdRun, estimate_crossing};
use qec_io::CodeSpec;
use serde::Serialize;
use tracing::info;

/// Sweep results of one code.
#[derive(Debug, Serialize)]
pub struct CurveReport {
    pub code: String,
    pub distance: usize,
    pub decoder: DecoderKind,
    pub runs: Vec<ThresholdRun>,
}

#[derive(Debug, Serialize)]
pub struct SweepReport {
    pub plan: SweepPlan,
    pub curves: Vec<CurveReport>,
    /// Crossing of each consecutive pair of curves, smaller code first.
    pub crossings: Vec<Option<f64>>,
}

pub fn run(
    cache: &CodeCache,
    specs: &[CodeSpec],
    decoder: DecoderKind,
    config: &EngineConfig,
    plan: SweepPlan,
    json: bool,
) -> Result<()> {
    let mut curves = Vec::with_capacity(specs.len());
    for &spec in specs {
        let code = cache
            .get_or_build(spec.family, spec.size)
            .with_context(|| format!("cannot build {spec}"))?;
        info!(code = %spec, shots = plan.shots_per_rate, "starting sweep");
        let runs = qec_core::run_threshold_sweep(&code, decoder, &plan, config)
            .with_context(|| format!("sweep on {spec} failed"))?;
        curves.push(CurveReport {
            code: spec.to_string(),
            distance: code.distance(),
            decoder,
            runs,
        });
    }
    curves.sort_by_key(|c| c.distance);
    let crossings = curves
        .windows(2)
        .map(|pair| estimate_crossing(&pair[0].runs, &pair[1].runs))
        .collect();

    let report = SweepReport {
        plan,
        curves,
        crossings,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }
    Ok(())
}

fn print_table(report: &SweepReport) {
    for curve in &report.curves {
        println!("\n{} (d = {}, {})", curve.code, curve.distance, curve.decoder);
        println!(
            "{:>10} {:>8} {:>9} {:>9} {:>12} {:>12}",
            "p", "shots", "failures", "non-conv", "p_L", "mean us"
        );
        for run in &curve.runs {
            println!(
                "{:>10.5} {:>8} {:>9} {:>9} {:>12.6} {:>12.2}",
                run.physical_error_rate,
                run.shots,
                run.failures,
                run.non_converged,
                run.logical_error_rate,
                run.mean_latency_us
            );
        }
    }
    for (pair, crossing) in report.curves.windows(2).zip(&report.crossings) {
        match crossing {
            Some(p) => println!("\n{} / {} cross near p = {p:.4}", pair[0].code, pair[1].code),
            None => println!("\n{} / {} do not cross in range", pair[0].code, pair[1].code),
        }
    }
}
