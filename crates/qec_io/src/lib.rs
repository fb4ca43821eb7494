//! File formats and text encodings for the decoding engine.
//!
//! Syndromes and sampled errors move between the engine and the outside
//! world as packed `.b8` files or `0`/`1` text; codes, rates and sparse
//! Pauli operators are named on the command line with a small nom grammar.

/// Syndrome and error files.
///
/// Reads and writes the packed `.b8` format (LSB-first, one byte-padded shot
/// after another) and line-oriented text files.
pub mod loader;

/// Parsers for code specs, bit strings, index lists, rate lists and sparse
/// Pauli strings.
pub mod parser;

pub use parser::CodeSpec;
