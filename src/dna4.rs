//! Bit-packed, one-hot encoding of DNA strings of up to 32 bases.
//!
//! # Layout
//!
//! ```text
//!            bit 63 ........ 32 | 31 ......... 0
//! word `ac`:        A channel   |   C channel
//! word `gt`:        G channel   |   T channel
//! ```
//!
//! The last base of a string sits at bit 0 of its channel, the first base of
//! an `n`-base string at bit `n - 1`. Every valid position has exactly one of
//! the four channel bits set; characters outside `ACGT` set none.

use crate::{
    constants::MAX_PATTERN_LENGTH,
    util::channels,
    MatchError, Result,
};

const LOW_HALF: u64 = 0xFFFF_FFFF;

/// Pattern length and the window masks derived from it.
///
/// Every operation whose result depends on the pattern length (encoding to
/// length, sliding a window, decoding) takes this value explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternConfig {
    length: u8,
    window: u64,     // low `length` bits of both halves
    shift_keep: u64, // `window` minus the two insertion bits (0 and 32)
}

impl PatternConfig {
    /// Creates a configuration for patterns of `length` bases.
    ///
    /// # Errors
    /// `MatchError::InvalidPatternLength` unless `1 ≤ length ≤ 32`.
    pub fn new(length: usize) -> Result<Self> {
        if !(1..=MAX_PATTERN_LENGTH).contains(&length) {
            return Err(MatchError::InvalidPatternLength(length));
        }
        let low = if length == MAX_PATTERN_LENGTH {
            LOW_HALF
        } else {
            (1u64 << length) - 1
        };
        let window = low | (low << 32);
        Ok(Self {
            length: length as u8,
            window,
            shift_keep: window & !(1 | (1 << 32)),
        })
    }

    /// Pattern length in bases.
    #[inline]
    pub fn length(&self) -> usize {
        self.length as usize
    }

    /// Mask of the meaningful bits of either word.
    #[inline]
    pub fn window(&self) -> u64 {
        self.window
    }

    /// Encodes `text`, which must be exactly `length()` bases long.
    ///
    /// # Errors
    /// `MatchError::TargetLengthMismatch` (with index 0) when the length differs.
    pub fn encode(&self, text: &[u8]) -> Result<Dna4> {
        if text.len() != self.length() {
            return Err(MatchError::TargetLengthMismatch {
                index: 0,
                expected: self.length(),
                found: text.len(),
            });
        }
        Ok(Dna4::from_bytes(text))
    }
}

/// Up to 32 bases in two one-hot `u64` words.
///
/// Ordering compares `ac` first and then `gt`; it is a total order but not
/// a lexicographic one on the decoded text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dna4 {
    ac: u64,
    gt: u64,
}

impl Dna4 {
    /// Builds a pattern directly from its two words.
    #[inline]
    pub const fn from_words(ac: u64, gt: u64) -> Self {
        Self { ac, gt }
    }

    /// Word holding the A (high half) and C (low half) channels.
    #[inline]
    pub const fn ac(&self) -> u64 {
        self.ac
    }

    /// Word holding the G (high half) and T (low half) channels.
    #[inline]
    pub const fn gt(&self) -> u64 {
        self.gt
    }

    /// Encodes the trailing (at most 32) characters of `seq`.
    ///
    /// The last character lands on bit 0. Characters outside `ACGT` (either
    /// case) leave their position empty.
    pub fn from_bytes(seq: &[u8]) -> Self {
        let start = seq.len().saturating_sub(MAX_PATTERN_LENGTH);
        let (mut ac, mut gt) = (0u64, 0u64);
        for (i, &b) in seq[start..].iter().rev().enumerate() {
            let (a, g) = channels(b);
            ac |= a << i;
            gt |= g << i;
        }
        Self { ac, gt }
    }

    /// Slides the window by one base: the oldest base drops out, `b` enters at bit 0.
    ///
    /// Bits shifted past the configured length, and the bit carried from
    /// position 31 into the paired half, are cleared.
    ///
    /// # Returns
    /// `true` if `b` is one of `ACGT`; otherwise the new position stays empty.
    #[inline]
    pub fn push(&mut self, b: u8, config: &PatternConfig) -> bool {
        let (a, g) = channels(b);
        self.ac = ((self.ac << 1) & config.shift_keep) | a;
        self.gt = ((self.gt << 1) & config.shift_keep) | g;
        (a | g) != 0
    }

    /// Number of positions at which both patterns hold the same base.
    #[inline]
    pub fn similarity(&self, other: &Dna4) -> u32 {
        ((self.ac & other.ac) | (self.gt & other.gt)).count_ones()
    }

    /// Bitmask (bit `i` = position `i`) of positions with any channel set.
    #[inline]
    fn occupied(&self) -> u64 {
        ((self.ac >> 32) | (self.gt >> 32) | self.ac | self.gt) & LOW_HALF
    }

    /// Number of positions holding a real base (or a wildcard mark).
    #[inline]
    pub fn matchable_count(&self) -> u32 {
        self.occupied().count_ones()
    }

    /// Returns `true` if no channel is set anywhere.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ac == 0 && self.gt == 0
    }

    /// Returns `true` if position `pos` (0 = last base) has any channel set.
    #[inline]
    pub fn has_base_at(&self, pos: u32) -> bool {
        pos < MAX_PATTERN_LENGTH as u32 && (self.occupied() >> pos) & 1 == 1
    }

    /// Clears every position that is occupied in `mask`.
    ///
    /// e.g. `ACCGG` minus `__GG_` becomes `AC__G`.
    pub fn subtract_mask(&mut self, mask: &Dna4) {
        let m = mask.ac | mask.gt;
        let keep = !((m << 32) | (m >> 32) | m);
        self.ac &= keep;
        self.gt &= keep;
    }

    /// Marks every position of `text` equal to `wildcard` in all four channels.
    ///
    /// Positions are laid out as in `from_bytes` (last character on bit 0).
    /// A marked position scores 1 against any real base, counts towards
    /// `matchable_count`, and is removed from targets by `subtract_mask`.
    pub fn add_wildcards(&mut self, text: &[u8], wildcard: u8) {
        let mut marks = 0u64;
        for &c in text {
            marks <<= 1;
            if c == wildcard {
                marks |= 1;
            }
        }
        marks &= LOW_HALF;
        let both = marks | (marks << 32);
        self.ac |= both;
        self.gt |= both;
    }

    /// 2-bit hash code of the base at `pos`: A→1, G→2, C→3, T or empty→0.
    #[inline]
    pub(crate) fn hash_code(&self, pos: u32) -> u64 {
        let a = (self.ac >> (32 + pos)) & 1;
        let g = (self.gt >> (32 + pos)) & 1;
        let c = (self.ac >> pos) & 1;
        a | (g << 1) | (c * 3)
    }

    /// Decodes the first `config.length()` positions back to text.
    ///
    /// Empty positions become `_`.
    pub fn decode(&self, config: &PatternConfig) -> String {
        let len = config.length();
        let mut out = vec![b'_'; len];
        for i in 0..len {
            let slot = &mut out[len - i - 1];
            if (self.ac >> (32 + i)) & 1 == 1 {
                *slot = b'A';
            } else if (self.ac >> i) & 1 == 1 {
                *slot = b'C';
            } else if (self.gt >> (32 + i)) & 1 == 1 {
                *slot = b'G';
            } else if (self.gt >> i) & 1 == 1 {
                *slot = b'T';
            }
        }
        // only ASCII bytes were written
        out.into_iter().map(char::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(len: usize) -> PatternConfig {
        PatternConfig::new(len).unwrap()
    }

    #[test]
    fn config_rejects_bad_lengths() {
        assert_eq!(PatternConfig::new(0), Err(MatchError::InvalidPatternLength(0)));
        assert_eq!(PatternConfig::new(33), Err(MatchError::InvalidPatternLength(33)));
        assert_eq!(cfg(32).window(), u64::MAX);
        assert_eq!(cfg(4).window(), 0xF | (0xF << 32));
    }

    #[test]
    fn bit_layout() {
        // "ACGT": A at position 3, C at 2, G at 1, T at 0
        let d = Dna4::from_bytes(b"ACGT");
        assert_eq!(d.ac(), (1 << (32 + 3)) | (1 << 2));
        assert_eq!(d.gt(), (1 << (32 + 1)) | 1);
        assert_eq!(d, Dna4::from_bytes(b"acgt"));
    }

    #[test]
    fn decode_round_trip_and_unknowns() {
        let c = cfg(8);
        assert_eq!(Dna4::from_bytes(b"GATTACAC").decode(&c), "GATTACAC");
        assert_eq!(Dna4::from_bytes(b"GANTACAC").decode(&c), "GA_TACAC");
        assert_eq!(c.encode(b"ACG").unwrap_err(), MatchError::TargetLengthMismatch {
            index: 0,
            expected: 8,
            found: 3,
        });
    }

    #[test]
    fn push_matches_fresh_encoding() {
        let c = cfg(5);
        let seq = b"ACGTTGCANNACGT";
        let mut w = Dna4::from_bytes(&seq[..4]);
        for end in 4..seq.len() {
            let valid = w.push(seq[end], &c);
            assert_eq!(valid, seq[end] != b'N');
            assert_eq!(w, Dna4::from_bytes(&seq[end - 4..=end]), "window ending at {end}");
        }
    }

    #[test]
    fn push_at_full_width_drops_carry() {
        // position 31 must not leak into the paired channel at bit 32
        let c = cfg(32);
        let mut w = Dna4::from_bytes(&[b'C'; 32]);
        w.push(b'T', &c);
        assert_eq!(w.ac() >> 32, 0);
        assert_eq!(w.matchable_count(), 32);
        assert_eq!(w.decode(&c), format!("{}T", "C".repeat(31)));
    }

    #[test]
    fn similarity_counts_shared_bases() {
        let a = Dna4::from_bytes(b"ACGTACGT");
        let b = Dna4::from_bytes(b"ACGAACCT");
        assert_eq!(a.similarity(&b), 6);
        assert_eq!(b.similarity(&a), 6);
        assert_eq!(a.similarity(&a), a.matchable_count());
        assert_eq!(Dna4::from_bytes(b"ACNT").matchable_count(), 3);
        assert_eq!(Dna4::from_bytes(b"ACNT").similarity(&Dna4::from_bytes(b"ACNT")), 3);
    }

    #[test]
    fn subtract_mask_clears_occupied_positions() {
        let c = cfg(5);
        let mut d = Dna4::from_bytes(b"ACCGG");
        d.subtract_mask(&Dna4::from_bytes(b"__GG_"));
        assert_eq!(d.decode(&c), "AC__G");
    }

    #[test]
    fn wildcards_fill_every_channel() {
        let mut f = Dna4::from_bytes(b"*GG");
        f.add_wildcards(b"*GG", b'*');
        assert_eq!(f.ac() & (1 << 2), 1 << 2);
        assert_eq!(f.ac() & (1 << 34), 1 << 34);
        assert_eq!(f.gt() & (1 << 2), 1 << 2);
        assert_eq!(f.gt() & (1 << 34), 1 << 34);
        assert_eq!(f.matchable_count(), 3);

        // any real base at the wildcard position scores 1
        for w in [b"AGG", b"CGG", b"GGG", b"TGG"] {
            assert_eq!(Dna4::from_bytes(w).similarity(&f), 3);
        }
        assert_eq!(Dna4::from_bytes(b"NGG").similarity(&f), 2);
        assert_eq!(Dna4::from_bytes(b"AGC").similarity(&f), 2);
    }

    #[test]
    fn hash_codes() {
        let d = Dna4::from_bytes(b"ACGTN");
        assert_eq!(d.hash_code(4), 1);
        assert_eq!(d.hash_code(3), 3);
        assert_eq!(d.hash_code(2), 2);
        assert_eq!(d.hash_code(1), 0);
        assert_eq!(d.hash_code(0), 0);
        assert!(d.has_base_at(1));
        assert!(!d.has_base_at(0));
    }
}
