#![allow(clippy::unreadable_literal)]

// Global constants used throughout the product code.

// `ASCII_SIZE` – Number of possible ASCII values (0..255).
pub const ASCII_SIZE: usize = 256;

// `MAX_PATTERN_LENGTH` – Longest pattern a `Dna4` can hold (one bit per half-word).
pub const MAX_PATTERN_LENGTH: usize = 32;

// `DEFAULT_WILDCARD` – Character marking "any base" in a required-pattern template.
pub const DEFAULT_WILDCARD: u8 = b'*';

/// Bit set in word `ac` for a base at position 0: `A` uses the high half, `C` the low half.
/// Any other character maps to 0 (no channel).
pub const AC_CHANNELS: [u64; ASCII_SIZE] = {
    let mut tbl = [0u64; ASCII_SIZE];

    tbl[b'A' as usize] = 1 << 32;
    tbl[b'a' as usize] = 1 << 32;
    tbl[b'C' as usize] = 1;
    tbl[b'c' as usize] = 1;

    tbl
};

/// Bit set in word `gt` for a base at position 0: `G` uses the high half, `T` the low half.
/// Any other character maps to 0 (no channel).
pub const GT_CHANNELS: [u64; ASCII_SIZE] = {
    let mut tbl = [0u64; ASCII_SIZE];

    tbl[b'G' as usize] = 1 << 32;
    tbl[b'g' as usize] = 1 << 32;
    tbl[b'T' as usize] = 1;
    tbl[b't' as usize] = 1;

    tbl
};

// ---- cost model weights -------------------------------------------------

// `HASH_COST_PER_CHAR` – Relative cost of hashing one variable position, per arrangement.
pub const HASH_COST_PER_CHAR: u64 = 10;

// `BUCKET_BYTES` – Estimated footprint of one empty bucket (a `Vec` header).
pub const BUCKET_BYTES: u64 = 24;

// `ENTRY_BYTES` – Estimated footprint of one (pattern, index) bucket entry.
pub const ENTRY_BYTES: u64 = 24;

// `ALPHABET_SIZE` – Number of distinct symbols; buckets per arrangement grow as its power.
pub const ALPHABET_SIZE: u64 = 4;
