mod bb;
mod config;
mod decode;
mod generator;
mod stats;
mod sweep;
mod throughput;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use qec_core::cache::CodeCache;
use qec_core::{BbFamily, DecoderKind, NoiseModel, SweepPlan};
use qec_io::{CodeSpec, parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Quantum error correction decoding engine.
#[derive(Parser)]
#[command(name = "qec", version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample errors and write their syndromes as a .b8 file
    Gen {
        #[arg(long, default_value = "surface:5")]
        code: CodeSpec,
        #[arg(long, default_value_t = 0.01)]
        p: f64,
        #[arg(long, default_value_t = NoiseModel::Depolarizing)]
        noise: NoiseModel,
        #[arg(long, default_value_t = 100_000)]
        shots: usize,
        #[arg(long, default_value = "bench.b8")]
        out: PathBuf,
        /// Also write the sampled errors (X register then Z register)
        #[arg(long)]
        errors: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Decode a single syndrome
    Decode {
        #[arg(long)]
        code: CodeSpec,
        /// Syndrome as a 0/1 string
        #[arg(long, conflicts_with = "indices")]
        syndrome: Option<String>,
        /// Syndrome as the list of fired checks
        #[arg(long)]
        indices: Option<String>,
        #[arg(long, default_value_t = DecoderKind::Mwpm)]
        decoder: DecoderKind,
        /// True error as a sparse Pauli string, e.g. "X4,Z7"
        #[arg(long)]
        true_error: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Estimate logical error rates over a range of physical error rates
    Sweep {
        /// One or more codes, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        code: Vec<CodeSpec>,
        #[arg(long, default_value_t = DecoderKind::Mwpm)]
        decoder: DecoderKind,
        /// Comma-separated physical error rates
        #[arg(long, default_value = "0.01,0.02,0.05,0.1")]
        rates: String,
        #[arg(long, default_value_t = 1_000)]
        shots: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = NoiseModel::Depolarizing)]
        noise: NoiseModel,
        #[arg(long)]
        json: bool,
    },
    /// Decode bivariate-bicycle codes with belief propagation
    Bb {
        #[arg(long, default_value = "bb_72_12_6")]
        family: BbFamily,
        #[arg(long, default_value_t = 0.01)]
        p: f64,
        #[arg(long, default_value_t = NoiseModel::Depolarizing)]
        noise: NoiseModel,
        #[arg(long, default_value_t = 200)]
        shots: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Decode this syndrome instead of sampling
        #[arg(long)]
        syndrome: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Decode every shot of a syndrome file and report throughput
    Run {
        #[arg(long)]
        code: CodeSpec,
        #[arg(long)]
        b8: PathBuf,
        /// Error file written by `gen --errors`, to score corrections
        #[arg(long)]
        errors: Option<PathBuf>,
        #[arg(long, default_value_t = DecoderKind::UnionFind)]
        decoder: DecoderKind,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(cli.config.as_deref())?;
    let cache = CodeCache::with_lookup(config.lookup);

    match cli.command {
        Commands::Gen {
            code,
            p,
            noise,
            shots,
            out,
            errors,
            seed,
        } => generator::generate(
            &cache,
            &generator::GenerateOptions {
                code,
                p,
                noise,
                shots,
                seed,
                syndrome_path: &out,
                error_path: errors.as_deref(),
            },
        ),
        Commands::Decode {
            code,
            syndrome,
            indices,
            decoder,
            true_error,
            json,
        } => {
            let input = match (&syndrome, &indices) {
                (Some(bits), _) => decode::SyndromeInput::Bits(bits),
                (None, Some(list)) => decode::SyndromeInput::Indices(list),
                (None, None) => bail!("give the syndrome with --syndrome or --indices"),
            };
            decode::run(
                &cache,
                code,
                decoder,
                &config,
                input,
                true_error.as_deref(),
                json,
            )
        }
        Commands::Sweep {
            code,
            decoder,
            rates,
            shots,
            seed,
            noise,
            json,
        } => {
            let plan = SweepPlan {
                error_rates: parser::parse_rates(&rates)?,
                shots_per_rate: shots,
                seed,
                noise,
            };
            sweep::run(&cache, &code, decoder, &config, plan, json)
        }
        Commands::Bb {
            family,
            p,
            noise,
            shots,
            seed,
            syndrome,
            json,
        } => match syndrome {
            Some(text) => bb::decode_one(&cache, family, &config, &text).map(drop),
            None => bb::simulate(&cache, family, &config, p, noise, shots, seed, json).map(drop),
        },
        Commands::Run {
            code,
            b8,
            errors,
            decoder,
        } => throughput::run_benchmark(&cache, code, decoder, &config, &b8, errors.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["qec", "-vv", "decode", "--code", "surface:3", "--indices", "1,2"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn sweep_accepts_several_codes() {
        let cli = Cli::try_parse_from([
            "qec",
            "sweep",
            "--code",
            "surface:3,surface:5",
            "--decoder",
            "uf",
        ])
        .unwrap();
        match cli.command {
            Commands::Sweep { code, decoder, .. } => {
                assert_eq!(code.len(), 2);
                assert_eq!(decoder, DecoderKind::UnionFind);
            }
            _ => panic!("expected sweep"),
        }
    }

    #[test]
    fn bad_code_specs_are_rejected() {
        assert!(Cli::try_parse_from(["qec", "decode", "--code", "surface", "--indices", "1"]).is_err());
        assert!(Cli::try_parse_from(["qec", "bb", "--family", "bb_1_2_3"]).is_err());
    }
}
