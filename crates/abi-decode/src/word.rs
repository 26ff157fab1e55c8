// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! 32-byte word helpers shared by the decoder and the encoder.

use alloy_primitives::U256;

/// Size of one head slot in bytes.
pub const WORD_SIZE: usize = 32;

/// A single 32-byte slot of the encoding.
pub type Word = [u8; WORD_SIZE];

/// Interpret a word as a big-endian unsigned integer.
#[inline]
pub fn word_to_u256(word: &Word) -> U256 {
    U256::from_be_bytes(*word)
}

/// Interpret a word as a byte offset or element count.
///
/// Returns `None` when the value does not fit in `usize`.
#[inline]
pub fn word_to_usize(word: &Word) -> Option<usize> {
    let (high, low) = word.split_at(WORD_SIZE - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let raw: [u8; 8] = low.try_into().ok()?;
    usize::try_from(u64::from_be_bytes(raw)).ok()
}

/// Encode a `usize` as a big-endian word.
#[inline]
pub fn usize_to_word(n: usize) -> Word {
    U256::from(n).to_be_bytes::<WORD_SIZE>()
}

/// Round `len` up to the next multiple of [`WORD_SIZE`].
#[inline]
pub fn padded_len(len: usize) -> Option<usize> {
    len.checked_add(WORD_SIZE - 1)
        .map(|n| n / WORD_SIZE * WORD_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_offsets_fit_usize() {
        let word = usize_to_word(0x60);
        assert_eq!(word_to_usize(&word), Some(0x60));
        assert_eq!(word[31], 0x60);
        assert!(word[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn high_bits_do_not_fit_usize() {
        let mut word = [0u8; WORD_SIZE];
        word[0] = 1;
        assert_eq!(word_to_usize(&word), None);
        assert_eq!(word_to_u256(&word), U256::from(1u8) << 248usize);
    }

    #[test]
    fn padding_rounds_up_to_words() {
        assert_eq!(padded_len(0), Some(0));
        assert_eq!(padded_len(1), Some(32));
        assert_eq!(padded_len(32), Some(32));
        assert_eq!(padded_len(33), Some(64));
        assert_eq!(padded_len(usize::MAX), None);
    }
}
