//! Approximate search for short fixed-length DNA targets in long sequences.
//!
//! Targets of up to 32 bases are matched against every window of the input
//! sequences, allowing a bounded number of substitutions and, optionally,
//! requiring a wildcard template (such as a PAM) at the end of each window.
//! With enough targets, a pigeonhole multi-index (`TargetContainer`) narrows
//! the candidates per window; otherwise every window is compared with every
//! target. Both paths report the same hits.
//!
//! ```
//! use offtargets_rs::{find_matches, MatchParams};
//!
//! let hits = find_matches(&["TTACGATT"], &["ACGT"], &MatchParams::new(1)).unwrap();
//! assert_eq!(hits[0].len(), 1);
//! assert_eq!(hits[0][0].position, 5);
//! assert_eq!(hits[0][0].mismatches, 1);
//! ```

mod constants;
mod util;
mod container;
mod dna4;
mod scanner;

pub use constants::*;
pub use container::{DivisionPlan, Entry, TargetContainer};
pub use dna4::{Dna4, PatternConfig};
pub use scanner::{find_matches, simple_match, MatchParams, Matcher, OffTarget, ScanStats};
pub use util::*;

/// Common `Result` type for all library operations, using `MatchError` for errors.
pub type Result<T, E = MatchError> = core::result::Result<T, E>;

/// Error variants for pattern encoding and search setup.
///
/// Problems inside the scan itself (unsupported bases, an index that does
/// not pay off, an oversized mismatch budget) are never errors; they degrade
/// to non-matching positions or the linear scan.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Thrown when a pattern length is 0 or above 32.
    #[error("pattern length {0} not supported (must be ≥ 1 and ≤ 32)")]
    InvalidPatternLength(usize),

    /// Thrown when a target's length differs from the configured pattern length.
    #[error("target {index} has length {found}, expected {expected}")]
    TargetLengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// Thrown when the required-pattern template is longer than the targets.
    #[error("required pattern of length {required} exceeds pattern length {length}")]
    RequiredPatternTooLong { required: usize, length: usize },

    /// Thrown when a `Matcher` is prepared without any targets.
    #[error("no targets to search for")]
    NoTargets,
}
