//! Syndrome data generator for decode benchmarks.
//!
//! Samples physical errors on a code, writes their syndromes as a `.b8` file
//! and, optionally, the errors themselves so a later `run` can score the
//! decoder's corrections.

use anyhow::{Context, Result};
use qec_core::bit_utils::Bits;
use qec_core::cache::CodeCache;
use qec_core::{NoiseModel, sample_error};
use qec_io::CodeSpec;
use qec_io::loader;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use tracing::info;

/// Options of one generation run.
pub struct GenerateOptions<'a> {
    pub code: CodeSpec,
    pub p: f64,
    pub noise: NoiseModel,
    pub shots: usize,
    pub seed: u64,
    pub syndrome_path: &'a Path,
    pub error_path: Option<&'a Path>,
}

/// Packs an error as its X register followed by its Z register.
pub fn pack_error(error: &qec_core::PauliFrame) -> Bits {
    let mut bits = error.x().clone();
    bits.extend_from_bitslice(error.z());
    bits
}

pub fn generate(cache: &CodeCache, opts: &GenerateOptions<'_>) -> Result<()> {
    let code = cache
        .get_or_build(opts.code.family, opts.code.size)
        .with_context(|| format!("cannot build {}", opts.code))?;
    println!(
        "Generating {} shots on {} (n = {}, checks = {}, p = {}, {})...",
        opts.shots,
        opts.code,
        code.n(),
        code.num_checks(),
        opts.p,
        opts.noise
    );

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut syndromes = Vec::with_capacity(opts.shots);
    let mut errors = Vec::with_capacity(if opts.error_path.is_some() { opts.shots } else { 0 });
    for _ in 0..opts.shots {
        let error = sample_error(&code, opts.p, opts.noise, &mut rng)?;
        syndromes.push(qec_core::syndrome_of(&code, &error)?.into_bits());
        if opts.error_path.is_some() {
            errors.push(pack_error(&error));
        }
    }

    loader::write_b8_file(opts.syndrome_path, &syndromes)?;
    info!(path = %opts.syndrome_path.display(), shots = syndromes.len(), "wrote syndromes");
    if let Some(path) = opts.error_path {
        loader::write_b8_file(path, &errors)?;
        info!(path = %path.display(), "wrote errors");
    }

    let fired = syndromes.iter().filter(|s| s.any()).count();
    println!("Done. {fired}/{} shots have a non-trivial syndrome.", syndromes.len());
    Ok(())
}
