//! Single-syndrome decoding from the command line.

use anyhow::{Context, Result, bail};
use qec_core::cache::CodeCache;
use qec_core::pauli_frame::FrameSupport;
use qec_core::{
    DecodeOutcome, DecodeStatus, DecoderKind, Diagnostics, EngineConfig, Syndrome, decode,
};
use qec_io::{CodeSpec, parser};
use serde::Serialize;

/// Where the syndrome comes from.
pub enum SyndromeInput<'a> {
    Bits(&'a str),
    Indices(&'a str),
}

/// JSON view of one decode.
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    pub code: String,
    pub decoder: DecoderKind,
    pub status: DecodeStatus,
    pub defects: Vec<usize>,
    pub correction: FrameSupport,
    pub correction_weight: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub diagnostics: Diagnostics,
    pub elapsed_us: f64,
}

impl DecodeReport {
    fn new(spec: CodeSpec, syndrome: &Syndrome, outcome: &DecodeOutcome) -> Self {
        Self {
            code: spec.to_string(),
            decoder: outcome.decoder,
            status: outcome.status,
            defects: syndrome.defects(),
            correction: outcome.correction.support(),
            correction_weight: outcome.correction.weight(),
            success: outcome.success,
            diagnostics: outcome.diagnostics.clone(),
            elapsed_us: outcome.elapsed.as_secs_f64() * 1e6,
        }
    }

    fn print(&self) {
        println!("Code:        {}", self.code);
        println!("Decoder:     {}", self.decoder);
        println!("Status:      {:?}", self.status);
        println!("Defects:     {:?}", self.defects);
        println!("Correction:  X{:?} Z{:?}", self.correction.x, self.correction.z);
        println!("Weight:      {}", self.correction_weight);
        if let Some(success) = self.success {
            println!("Success:     {success}");
        }
        println!("Diagnostics: {:?}", self.diagnostics);
        println!("Elapsed:     {:.2} us", self.elapsed_us);
    }
}

pub fn run(
    cache: &CodeCache,
    spec: CodeSpec,
    decoder: DecoderKind,
    config: &EngineConfig,
    input: SyndromeInput<'_>,
    true_error: Option<&str>,
    json: bool,
) -> Result<()> {
    let code = cache
        .get_or_build(spec.family, spec.size)
        .with_context(|| format!("cannot build {spec}"))?;
    let bits = match input {
        SyndromeInput::Bits(text) => parser::parse_bits(text).context("--syndrome")?,
        SyndromeInput::Indices(text) => {
            parser::parse_index_bits(text, code.num_checks()).context("--indices")?
        }
    };
    if bits.len() != code.num_checks() {
        bail!(
            "syndrome has {} bits but {spec} has {} checks",
            bits.len(),
            code.num_checks()
        );
    }
    let syndrome = Syndrome::new(bits);

    let mut outcome = decode(decoder, &code, &syndrome, config)?;
    if let Some(text) = true_error {
        let error = parser::parse_pauli(text, code.n()).context("--true-error")?;
        outcome.evaluate(&code, &error)?;
    }

    let report = DecodeReport::new(spec, &syndrome, &outcome);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}
