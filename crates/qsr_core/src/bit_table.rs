use crate::bit_utils::BitPack;
use crate::{WORD_BITS, padded_words};

/// A two-axis table of bits with both axes padded to a SIMD word.
///
/// Rows along the major axis are bit-packed exactly like [`crate::BitRow`],
/// stored back to back in one contiguous allocation. The natural layout for
/// shot records is one shot per major index; `transpose_into` serves
/// callers who want one shot per minor index instead.
pub struct BitTable {
    words: Vec<u64>,
    num_major_padded: usize,
    num_minor_padded: usize,
    words_per_row: usize,
}

impl BitTable {
    /// Creates an all-zero table with at least the requested dimensions.
    pub fn new(min_major: usize, min_minor: usize) -> Self {
        let words_per_row = padded_words(min_minor);
        let num_major_padded = padded_words(min_major) * WORD_BITS;
        Self {
            words: vec![0; num_major_padded * words_per_row],
            num_major_padded,
            num_minor_padded: words_per_row * WORD_BITS,
            words_per_row,
        }
    }

    pub fn num_major_padded(&self) -> usize {
        self.num_major_padded
    }

    pub fn num_minor_padded(&self) -> usize {
        self.num_minor_padded
    }

    /// Words per major row. Rows are `as_words()[major * words_per_row..]`.
    pub fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    pub fn row(&self, major: usize) -> &[u64] {
        let start = major * self.words_per_row;
        &self.words[start..start + self.words_per_row]
    }

    pub fn row_mut(&mut self, major: usize) -> &mut [u64] {
        let start = major * self.words_per_row;
        &mut self.words[start..start + self.words_per_row]
    }

    /// The byte span of one major row, LSB-first. Little-endian targets only.
    pub fn row_bytes_mut(&mut self, major: usize) -> &mut [u8] {
        bytemuck::cast_slice_mut(self.row_mut(major))
    }

    pub fn get(&self, major: usize, minor: usize) -> bool {
        BitPack::get(self.row(major), minor)
    }

    pub fn set(&mut self, major: usize, minor: usize, val: bool) {
        BitPack::set(self.row_mut(major), minor, val);
    }

    /// Writes the transpose of this table into `dest`.
    ///
    /// Bit `(i, j)` of `self` lands at `(j, i)` of `dest`, whose padded
    /// dimensions must be the swap of this table's. Works in 64x64 bit
    /// blocks so each block transposes in-register instead of bit by bit.
    ///
    /// # Panics
    ///
    /// Panics if `dest`'s dimensions are not the swap of `self`'s.
    pub fn transpose_into(&self, dest: &mut BitTable) {
        assert_eq!(dest.num_major_padded, self.num_minor_padded);
        assert_eq!(dest.num_minor_padded, self.num_major_padded);

        let mut block = [0u64; 64];
        for major_base in (0..self.num_major_padded).step_by(64) {
            for minor_word in 0..self.words_per_row {
                for (k, b) in block.iter_mut().enumerate() {
                    *b = self.words[(major_base + k) * self.words_per_row + minor_word];
                }
                transpose_block(&mut block);
                let dest_major_base = minor_word * 64;
                let dest_word = major_base / 64;
                for (k, b) in block.iter().enumerate() {
                    dest.words[(dest_major_base + k) * dest.words_per_row + dest_word] = *b;
                }
            }
        }
    }
}

/// Transposes a 64x64 bit block held as one u64 per row, LSB-first columns.
///
/// Classic mask-and-shift quadrant exchange: at each level, swap the
/// lower-left and upper-right half-blocks, halving the block size each
/// pass until single bits are exchanged.
fn transpose_block(block: &mut [u64; 64]) {
    let mut half = 32;
    while half > 0 {
        let mask = u64::MAX / ((1u64 << half) | 1);
        for k in 0..64 {
            if k & half == 0 {
                let t = ((block[k] >> half) ^ block[k + half]) & mask;
                block[k] ^= t << half;
                block[k + half] ^= t;
            }
        }
        half >>= 1;
    }
}
