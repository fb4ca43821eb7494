//! Text encodings accepted at the command line and in syndrome files.
//!
//! Everything here is parsed with nom combinators over `&str` and reported
//! through `anyhow` so callers can attach the argument or line they came
//! from.

use anyhow::{Result, anyhow, bail};
use nom::Finish;
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::{char, digit1, multispace0, one_of};
use nom::combinator::{all_consuming, map, map_res, opt};
use nom::multi::{fold_many0, separated_list0, separated_list1};
use nom::number::complete::double;
use nom::sequence::{delimited, pair, preceded, terminated};
use qec_core::bit_utils::{self, Bits};
use qec_core::{CodeFamily, PauliFrame};

/// A code family together with its size parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSpec {
    pub family: CodeFamily,
    /// Distance for lattice families; `0` when a BB tag was given bare.
    pub size: usize,
}

impl std::fmt::Display for CodeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.size == 0 {
            write!(f, "{}", self.family)
        } else {
            write!(f, "{}:{}", self.family, self.size)
        }
    }
}

impl std::str::FromStr for CodeSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_code_spec(s)
    }
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0)(input)
}

fn family_tag(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

fn bit_separators(input: &str) -> IResult<&str, &str> {
    take_while(is_bit_separator)(input)
}

fn index_list(input: &str) -> IResult<&str, Vec<usize>> {
    separated_list0(comma, number)(input)
}

fn pauli_term(input: &str) -> IResult<&str, (char, usize)> {
    pair(map(one_of("XYZxyz"), |c: char| c.to_ascii_uppercase()), number)(input)
}

fn pauli_separator(input: &str) -> IResult<&str, char> {
    alt((comma, map(take_while1(char::is_whitespace), |_| ' ')))(input)
}

/// Parses `surface:5`, `toric:4`, `color:7` or a BB tag such as
/// `bb_144_12_12` (optionally followed by `:n` or `:d`).
pub fn parse_code_spec(input: &str) -> Result<CodeSpec> {
    let (_, (tag, size)) = all_consuming(delimited(
        multispace0,
        pair(family_tag, opt(preceded(char(':'), number))),
        multispace0,
    ))(input)
    .finish()
    .map_err(|e| anyhow!("invalid code spec '{input}' near '{}'", e.input))?;

    let family: CodeFamily = tag.parse()?;
    let size = match (family.is_fixed_size(), size) {
        (true, size) => size.unwrap_or(0),
        (false, Some(d)) => d,
        (false, None) => bail!("code spec '{input}' needs a distance, e.g. '{tag}:5'"),
    };
    Ok(CodeSpec { family, size })
}

fn is_bit_separator(c: char) -> bool {
    c == ',' || c == '_' || c.is_whitespace()
}

/// Parses a `0`/`1` string. Commas, underscores and whitespace between bits
/// are ignored, so `0101`, `0,1,0,1` and `01_01` are the same vector.
pub fn parse_bits(input: &str) -> Result<Bits> {
    let (_, bits) = all_consuming(terminated(
        fold_many0(
            preceded(bit_separators, one_of("01")),
            Bits::new,
            |mut acc, c| {
                acc.push(c == '1');
                acc
            },
        ),
        bit_separators,
    ))(input)
    .finish()
    .map_err(|e| anyhow!("invalid bit string near '{}'", e.input))?;
    Ok(bits)
}

/// Parses an index list, `3,7`, `[3, 7]` or an empty string.
pub fn parse_indices(input: &str) -> Result<Vec<usize>> {
    let (_, indices) = all_consuming(delimited(
        multispace0,
        alt((
            delimited(
                terminated(char('['), multispace0),
                index_list,
                preceded(multispace0, char(']')),
            ),
            index_list,
        )),
        multispace0,
    ))(input)
    .finish()
    .map_err(|e| anyhow!("invalid index list near '{}'", e.input))?;
    Ok(indices)
}

/// Sparse index list turned into a dense vector of `len` bits.
pub fn parse_index_bits(input: &str, len: usize) -> Result<Bits> {
    let indices = parse_indices(input)?;
    if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
        bail!("index {bad} out of range for {len} bits");
    }
    Ok(bit_utils::from_indices(len, &indices))
}

/// Parses a comma-separated list of physical error rates.
pub fn parse_rates(input: &str) -> Result<Vec<f64>> {
    let (_, rates) = all_consuming(delimited(
        multispace0,
        separated_list1(comma, double),
        multispace0,
    ))(input)
    .finish()
    .map_err(|e| anyhow!("invalid rate list near '{}'", e.input))?;
    Ok(rates)
}

/// Parses a sparse Pauli string such as `X4, Z7, Y0` over `num_qubits`
/// qubits. Repeated letters on one qubit compose.
pub fn parse_pauli(input: &str, num_qubits: usize) -> Result<PauliFrame> {
    let (_, terms) = all_consuming(delimited(
        multispace0,
        separated_list0(pauli_separator, pauli_term),
        multispace0,
    ))(input)
    .finish()
    .map_err(|e| anyhow!("invalid Pauli string near '{}'", e.input))?;

    let mut frame = PauliFrame::new(num_qubits);
    for (op, q) in terms {
        if q >= num_qubits {
            bail!("qubit {q} out of range for {num_qubits} qubits");
        }
        match op {
            'X' => frame.apply_x(q),
            'Y' => frame.apply_y(q),
            _ => frame.apply_z(q),
        }
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_core::BbFamily;

    #[test]
    fn code_specs() {
        assert_eq!(
            parse_code_spec("surface:5").unwrap(),
            CodeSpec {
                family: CodeFamily::Surface,
                size: 5
            }
        );
        assert_eq!(parse_code_spec(" toric:4 ").unwrap().size, 4);
        let bb = parse_code_spec("bb_144_12_12").unwrap();
        assert_eq!(bb.family, CodeFamily::Bb(BbFamily::Bb144));
        assert_eq!(bb.size, 0);
        assert_eq!(parse_code_spec("BB-72-12-6:72").unwrap().size, 72);
        assert!(parse_code_spec("surface").is_err());
        assert!(parse_code_spec("surface:").is_err());
        assert!(parse_code_spec("hexagon:3").is_err());
        assert_eq!(parse_code_spec("color:7").unwrap().to_string(), "color:7");
    }

    #[test]
    fn bit_strings() {
        let expected = bit_utils::from_indices(4, &[1, 3]);
        assert_eq!(parse_bits("0101").unwrap(), expected);
        assert_eq!(parse_bits("0,1,0,1").unwrap(), expected);
        assert_eq!(parse_bits(" 01_01\n").unwrap(), expected);
        assert!(parse_bits("").unwrap().is_empty());
        assert!(parse_bits("0120").is_err());
    }

    #[test]
    fn index_lists() {
        assert_eq!(parse_indices("3,7").unwrap(), vec![3, 7]);
        assert_eq!(parse_indices("[3, 7]").unwrap(), vec![3, 7]);
        assert_eq!(parse_indices("[ ]").unwrap(), Vec::<usize>::new());
        assert_eq!(parse_indices("").unwrap(), Vec::<usize>::new());
        assert!(parse_indices("3;7").is_err());
        assert!(parse_index_bits("2,9", 8).is_err());
        assert_eq!(parse_index_bits("2", 4).unwrap(), bit_utils::from_indices(4, &[2]));
    }

    #[test]
    fn rate_lists() {
        assert_eq!(parse_rates("0.01, 0.02,1e-3").unwrap(), vec![0.01, 0.02, 0.001]);
        assert!(parse_rates("").is_err());
        assert!(parse_rates("0.1,,0.2").is_err());
    }

    #[test]
    fn pauli_strings() {
        let frame = parse_pauli("X4, z7 Y0", 9).unwrap();
        assert_eq!(frame.support().x, vec![0, 4]);
        assert_eq!(frame.support().z, vec![0, 7]);
        assert!(parse_pauli("", 3).unwrap().is_identity());
        assert!(parse_pauli("X3", 3).is_err());
        assert!(parse_pauli("W1", 3).is_err());
    }
}
