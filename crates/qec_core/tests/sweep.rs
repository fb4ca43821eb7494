use qec_core::code::{build_code, build_code_with};
use qec_core::sweep::run_threshold_sweep_with_cancel;
use qec_core::{
    CodeFamily, DecoderKind, EngineConfig, LookupConfig, NoiseModel, SweepPlan, ThresholdRun,
    run_threshold_sweep,
};
use std::sync::atomic::AtomicBool;

fn plan(error_rates: Vec<f64>, shots_per_rate: usize) -> SweepPlan {
    SweepPlan {
        error_rates,
        shots_per_rate,
        seed: 2024,
        noise: NoiseModel::Depolarizing,
    }
}

fn rates(runs: &[ThresholdRun]) -> Vec<f64> {
    runs.iter().map(|r| r.logical_error_rate).collect()
}

#[test]
fn logical_error_rate_grows_with_physical_rate() {
    let code = build_code(CodeFamily::Surface, 3).unwrap();
    let runs = run_threshold_sweep(
        &code,
        DecoderKind::Mwpm,
        &plan(vec![0.01, 0.05, 0.15], 2_000),
        &EngineConfig::default(),
    )
    .unwrap();
    let ler = rates(&runs);
    assert!(ler[0] <= ler[1] + 0.01, "{ler:?}");
    assert!(ler[1] <= ler[2] + 0.01, "{ler:?}");
    assert!(ler[2] > ler[0], "{ler:?}");
    for run in &runs {
        assert_eq!(run.shots, 2_000);
        assert_eq!(run.non_converged, 0);
        assert!(run.mean_latency_us <= run.max_latency_us);
    }
}

#[test]
fn larger_codes_help_below_threshold() {
    let config = EngineConfig::default();
    let plan = plan(vec![0.02], 3_000);
    let small = build_code(CodeFamily::Surface, 3).unwrap();
    let large = build_code(CodeFamily::Surface, 5).unwrap();
    let small = run_threshold_sweep(&small, DecoderKind::Mwpm, &plan, &config).unwrap();
    let large = run_threshold_sweep(&large, DecoderKind::Mwpm, &plan, &config).unwrap();
    assert!(
        large[0].logical_error_rate <= small[0].logical_error_rate + 0.005,
        "d=5 {} vs d=3 {}",
        large[0].logical_error_rate,
        small[0].logical_error_rate
    );
}

#[test]
fn noiseless_sweep_never_fails() {
    let config = EngineConfig::default();
    for (family, d, decoder) in [
        (CodeFamily::Surface, 3, DecoderKind::Lookup),
        (CodeFamily::Toric, 4, DecoderKind::UnionFind),
        (CodeFamily::Color, 5, DecoderKind::Mwpm),
    ] {
        let code = build_code(family, d).unwrap();
        let runs = run_threshold_sweep(&code, decoder, &plan(vec![0.0], 50), &config).unwrap();
        assert_eq!(runs[0].failures, 0, "{family}:{d} {decoder}");
        assert_eq!(runs[0].logical_error_rate, 0.0);
    }
}

#[test]
fn results_do_not_depend_on_the_thread_pool() {
    let code = build_code(CodeFamily::Toric, 4).unwrap();
    let plan = plan(vec![0.05, 0.1], 300);
    let config = EngineConfig::default();
    let sweep = || {
        run_threshold_sweep_with_cancel(
            &code,
            DecoderKind::UnionFind,
            &plan,
            &config,
            &AtomicBool::new(false),
        )
        .unwrap()
    };
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(sweep);
    let many = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(sweep);
    let failures = |runs: &[ThresholdRun]| runs.iter().map(|r| r.failures).collect::<Vec<_>>();
    assert_eq!(failures(&single), failures(&many));
}

#[test]
fn lookup_table_misses_count_as_failures() {
    // Two enumerated patterns: the empty error and one single flip.
    let lookup = LookupConfig {
        max_enumerated: 2,
        ..LookupConfig::default()
    };
    let code = build_code_with(CodeFamily::Surface, 3, &lookup).unwrap();
    let config = EngineConfig {
        lookup,
        ..EngineConfig::default()
    };
    let runs = run_threshold_sweep(&code, DecoderKind::Lookup, &plan(vec![0.4], 400), &config)
        .unwrap();
    let run = &runs[0];
    assert_eq!(run.shots, 400);
    assert_eq!(run.non_converged, 0);
    assert!(run.failures > 250, "{run:?}");
}
