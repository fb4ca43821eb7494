//! Packed bit helpers shared by the code model and the decoders.
//!
//! Check-matrix rows, error patterns and syndromes are stored as
//! `BitVec<u64, Lsb0>`. Hot loops (row reduction, syndrome projection,
//! anticommutation tests) work directly on the backing `u64` words, while
//! small per-decode flag arrays use [`BitPack`] over plain `u64` slices.

use bitvec::prelude::*;

/// Dense bit vector used for rows, errors and syndromes.
pub type Bits = BitVec<u64, Lsb0>;

/// Word-level access to bit flags packed into `u64` slices.
pub struct BitPack;

impl BitPack {
    /// Number of `u64` words needed to hold `bits` flags.
    #[inline(always)]
    pub fn words_for(bits: usize) -> usize {
        bits.div_ceil(64)
    }

    #[inline(always)]
    pub fn get(storage: &[u64], index: usize) -> bool {
        let word = storage[index / 64];
        let bit = index % 64;
        (word >> bit) & 1 == 1
    }

    #[inline(always)]
    pub fn toggle(storage: &mut [u64], index: usize) {
        let word_idx = index / 64;
        let bit_idx = index % 64;
        storage[word_idx] ^= 1 << bit_idx;
    }

    #[inline(always)]
    pub fn set(storage: &mut [u64], index: usize, val: bool) {
        let word_idx = index / 64;
        let bit_idx = index % 64;
        if val {
            storage[word_idx] |= 1 << bit_idx;
        } else {
            storage[word_idx] &= !(1 << bit_idx);
        }
    }
}

/// All-zero vector of length `len`.
pub fn zeros(len: usize) -> Bits {
    Bits::repeat(false, len)
}

/// Vector of length `len` with exactly the listed positions set.
///
/// Listing a position twice clears it again, matching XOR accumulation of
/// single-qubit flips.
pub fn from_indices(len: usize, indices: &[usize]) -> Bits {
    let mut bits = zeros(len);
    for &i in indices {
        let current = bits[i];
        bits.set(i, !current);
    }
    bits
}

/// Mask selecting the live bits of the last storage word.
#[inline]
fn tail_mask(len: usize) -> u64 {
    match len % 64 {
        0 => u64::MAX,
        r => (1u64 << r) - 1,
    }
}

/// `dst ^= src`, word by word. Both vectors must have the same length.
pub fn xor_into(dst: &mut Bits, src: &Bits) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.as_raw_mut_slice().iter_mut().zip(src.as_raw_slice()) {
        *d ^= *s;
    }
}

/// Parity of the overlap of `a` and `b`, i.e. their GF(2) inner product.
pub fn dot(a: &Bits, b: &Bits) -> bool {
    debug_assert_eq!(a.len(), b.len());
    let words = a.as_raw_slice().len().min(b.as_raw_slice().len());
    if words == 0 {
        return false;
    }
    let mut acc = 0u32;
    for (i, (x, y)) in a.as_raw_slice().iter().zip(b.as_raw_slice()).enumerate() {
        let mut w = x & y;
        if i + 1 == words {
            w &= tail_mask(a.len());
        }
        acc ^= w.count_ones() & 1;
    }
    acc == 1
}

/// Packs a vector of at most 64 bits into a `u64` key (bit `i` -> `1 << i`).
pub fn pack_u64(bits: &BitSlice<u64, Lsb0>) -> u64 {
    debug_assert!(bits.len() <= 64);
    bits.iter_ones().fold(0u64, |acc, i| acc | (1u64 << i))
}

/// Expands the low `len` bits of `word` into a vector.
pub fn unpack_u64(word: u64, len: usize) -> Bits {
    let mut bits = zeros(len);
    for i in 0..len.min(64) {
        if (word >> i) & 1 == 1 {
            bits.set(i, true);
        }
    }
    bits
}
