//! Monte Carlo threshold sweeps.
//!
//! For every physical error rate, `shots_per_rate` trials sample an error,
//! decode its syndrome and judge the correction. Trials run in parallel on
//! the rayon pool. Each trial seeds its own generator from the sweep seed,
//! the rate index and the trial index, so results do not depend on thread
//! count or scheduling.

use crate::code::StabilizerCode;
use crate::config::EngineConfig;
use crate::decoder::{DecodeStatus, DecoderKind, decode};
use crate::noise::{NoiseModel, sample_error, validate_rate};
use crate::{QecError, QecResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{info, instrument};

/// What to sample in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub error_rates: Vec<f64>,
    pub shots_per_rate: usize,
    pub seed: u64,
    #[serde(default)]
    pub noise: NoiseModel,
}

/// Aggregate result for one physical error rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRun {
    pub physical_error_rate: f64,
    /// Trials actually run; lower than requested after cancellation.
    pub shots: usize,
    pub failures: usize,
    /// Trials whose decoder did not converge. Also counted as failures.
    pub non_converged: usize,
    pub logical_error_rate: f64,
    pub mean_latency_us: f64,
    pub max_latency_us: f64,
}

/// Per-thread partial counts.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    shots: usize,
    failures: usize,
    non_converged: usize,
    total_nanos: u128,
    max_nanos: u128,
}

impl Tally {
    fn merge(self, other: Tally) -> Tally {
        Tally {
            shots: self.shots + other.shots,
            failures: self.failures + other.failures,
            non_converged: self.non_converged + other.non_converged,
            total_nanos: self.total_nanos + other.total_nanos,
            max_nanos: self.max_nanos.max(other.max_nanos),
        }
    }

    fn into_run(self, p: f64) -> ThresholdRun {
        let ratio = |num: f64| if self.shots == 0 { 0.0 } else { num / self.shots as f64 };
        ThresholdRun {
            physical_error_rate: p,
            shots: self.shots,
            failures: self.failures,
            non_converged: self.non_converged,
            logical_error_rate: ratio(self.failures as f64),
            mean_latency_us: ratio(self.total_nanos as f64) / 1_000.0,
            max_latency_us: self.max_nanos as f64 / 1_000.0,
        }
    }
}

/// SplitMix64 finalizer; spreads nearby seeds over the whole space.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Seed of trial `shot` at rate index `rate_idx`.
fn trial_seed(seed: u64, rate_idx: usize, shot: usize) -> u64 {
    splitmix64(seed ^ splitmix64(((rate_idx as u64) << 40) ^ shot as u64))
}

fn run_trial(
    code: &StabilizerCode,
    decoder: DecoderKind,
    p: f64,
    noise: NoiseModel,
    config: &EngineConfig,
    seed: u64,
) -> QecResult<Tally> {
    let mut rng = StdRng::seed_from_u64(seed);
    let error = sample_error(code, p, noise, &mut rng)?;
    let syndrome = code.project(&error);
    let start = Instant::now();
    let result = decode(decoder, code, &syndrome, config);
    let nanos = start.elapsed().as_nanos();
    let (failed, non_converged) = match result {
        Ok(mut outcome) => {
            let ok = outcome.evaluate(code, &error)?;
            let converged = outcome.status == DecodeStatus::Converged;
            (!ok || !converged, !converged)
        }
        // A table miss on a sampled syndrome is a decoding failure.
        Err(QecError::UnsupportedSyndrome { .. }) => (true, false),
        Err(e) => return Err(e),
    };
    Ok(Tally {
        shots: 1,
        failures: usize::from(failed),
        non_converged: usize::from(non_converged),
        total_nanos: nanos,
        max_nanos: nanos,
    })
}

/// Runs a sweep to completion.
pub fn run_threshold_sweep(
    code: &StabilizerCode,
    decoder: DecoderKind,
    plan: &SweepPlan,
    config: &EngineConfig,
) -> QecResult<Vec<ThresholdRun>> {
    run_threshold_sweep_with_cancel(code, decoder, plan, config, &AtomicBool::new(false))
}

/// Runs a sweep that stops early once `cancel` is set.
///
/// Trials that have not started when the flag is raised are skipped; the
/// returned runs count only the trials that completed.
#[instrument(level = "info", skip_all, fields(family = %code.family(), size = code.size(), %decoder))]
pub fn run_threshold_sweep_with_cancel(
    code: &StabilizerCode,
    decoder: DecoderKind,
    plan: &SweepPlan,
    config: &EngineConfig,
    cancel: &AtomicBool,
) -> QecResult<Vec<ThresholdRun>> {
    config.validate()?;
    for &p in &plan.error_rates {
        validate_rate(p)?;
    }
    decoder.ensure_supports(code)?;

    let mut runs = Vec::with_capacity(plan.error_rates.len());
    for (rate_idx, &p) in plan.error_rates.iter().enumerate() {
        let tally = (0..plan.shots_per_rate)
            .into_par_iter()
            .map(|shot| {
                if cancel.load(Ordering::Relaxed) {
                    return Ok(Tally::default());
                }
                run_trial(code, decoder, p, plan.noise, config, trial_seed(plan.seed, rate_idx, shot))
            })
            .try_reduce(Tally::default, |a, b| Ok(a.merge(b)))?;
        let run = tally.into_run(p);
        info!(
            p,
            shots = run.shots,
            failures = run.failures,
            non_converged = run.non_converged,
            logical_error_rate = run.logical_error_rate,
            "sweep point"
        );
        runs.push(run);
        if cancel.load(Ordering::Relaxed) {
            break;
        }
    }
    Ok(runs)
}

/// Estimates where the logical error curves of a smaller and a larger code
/// cross.
///
/// Both slices must sample the same rates in increasing order. Returns the
/// linearly interpolated rate of the first sign change of
/// `larger - smaller`, or `None` if the curves never cross.
pub fn estimate_crossing(smaller: &[ThresholdRun], larger: &[ThresholdRun]) -> Option<f64> {
    let diffs: Vec<(f64, f64)> = smaller
        .iter()
        .zip(larger)
        .filter(|(s, l)| s.physical_error_rate == l.physical_error_rate)
        .map(|(s, l)| (s.physical_error_rate, l.logical_error_rate - s.logical_error_rate))
        .collect();
    for pair in diffs.windows(2) {
        let (p0, d0) = pair[0];
        let (p1, d1) = pair[1];
        if d0 == 0.0 && d1 == 0.0 {
            continue;
        }
        if d0 <= 0.0 && d1 > 0.0 || d0 >= 0.0 && d1 < 0.0 {
            return Some(p0 + (p1 - p0) * (-d0) / (d1 - d0));
        }
    }
    None
}
