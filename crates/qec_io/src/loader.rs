//! Syndrome and error files.
//!
//! `.b8` files hold shots back to back, each packed LSB-first and padded to a
//! whole byte, which is the layout Stim uses for detection events. Text files
//! hold one shot per line in any encoding [`crate::parser::parse_bits`]
//! accepts.

use crate::parser;
use anyhow::{Context, Result, bail};
use bitvec::prelude::*;
use qec_core::bit_utils::Bits;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Loads the raw bits of a `.b8` file.
pub fn load_b8_file<P: AsRef<Path>>(path: P) -> Result<BitVec<u8, Lsb0>> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .with_context(|| format!("failed to read {}", path.display()))?;

    // Stim writes little-endian bit order within each byte.
    Ok(BitVec::<u8, Lsb0>::from_vec(buffer))
}

/// Splits raw `.b8` bits into shots of `bits_per_shot` bits.
///
/// Fails if the data does not hold a whole number of shots.
pub fn slice_shots(raw_bits: &BitSlice<u8, Lsb0>, bits_per_shot: usize) -> Result<Vec<Bits>> {
    if bits_per_shot == 0 {
        bail!("shots must hold at least one bit");
    }
    let stride_bits = bits_per_shot.div_ceil(8) * 8;
    if raw_bits.len() % stride_bits != 0 {
        bail!(
            "{} bytes is not a whole number of {}-byte shots",
            raw_bits.len() / 8,
            stride_bits / 8
        );
    }

    Ok(raw_bits
        .chunks_exact(stride_bits)
        .map(|shot| shot[..bits_per_shot].iter().by_vals().collect())
        .collect())
}

/// Loads a `.b8` file of `bits_per_shot`-bit shots.
pub fn load_b8_shots<P: AsRef<Path>>(path: P, bits_per_shot: usize) -> Result<Vec<Bits>> {
    let path = path.as_ref();
    let raw = load_b8_file(path)?;
    slice_shots(&raw, bits_per_shot).with_context(|| format!("malformed {}", path.display()))
}

/// Packs shots into the `.b8` layout.
pub fn encode_b8(shots: &[Bits]) -> Vec<u8> {
    let mut out: BitVec<u8, Lsb0> = BitVec::new();
    for shot in shots {
        out.extend(shot.iter().by_vals());
        let padded = out.len().div_ceil(8) * 8;
        out.resize(padded, false);
    }
    out.into_vec()
}

/// Writes shots as a `.b8` file. All shots must have the same length.
pub fn write_b8_file<P: AsRef<Path>>(path: P, shots: &[Bits]) -> Result<()> {
    let path = path.as_ref();
    if let Some(first) = shots.first() {
        if let Some(bad) = shots.iter().position(|s| s.len() != first.len()) {
            bail!(
                "shot {bad} has {} bits, expected {}",
                shots[bad].len(),
                first.len()
            );
        }
    }
    fs::write(path, encode_b8(shots))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Loads a text file of shots, one per line. Blank lines and `#` comments
/// are skipped.
pub fn load_text_shots<P: AsRef<Path>>(path: P) -> Result<Vec<Bits>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut shots = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let bits = parser::parse_bits(trimmed)
            .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
        shots.push(bits);
    }
    Ok(shots)
}

/// Writes shots as `0`/`1` lines.
pub fn write_text_shots<P: AsRef<Path>>(path: P, shots: &[Bits]) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for shot in shots {
        let line: String = shot.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect();
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// Loads shots from `path`, choosing the format by extension: `.b8` is
/// binary and needs `bits_per_shot`, anything else is text.
pub fn load_shots<P: AsRef<Path>>(path: P, bits_per_shot: usize) -> Result<Vec<Bits>> {
    let path = path.as_ref();
    let shots = if path.extension().is_some_and(|ext| ext == "b8") {
        load_b8_shots(path, bits_per_shot)?
    } else {
        load_text_shots(path)?
    };
    if let Some(bad) = shots.iter().position(|s| s.len() != bits_per_shot) {
        bail!(
            "{}: shot {bad} has {} bits, expected {bits_per_shot}",
            path.display(),
            shots[bad].len()
        );
    }
    Ok(shots)
}
