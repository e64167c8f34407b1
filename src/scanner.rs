use std::ops::AddAssign;

use log::debug;
use rayon::prelude::*;

use crate::{
    constants::DEFAULT_WILDCARD,
    container::TargetContainer,
    dna4::{Dna4, PatternConfig},
    MatchError, Result,
};

/// Search parameters shared by every scan entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchParams {
    mismatches: u32,
    required: Option<Vec<u8>>,
    wildcard: u8,
    max_index_bytes: u64,
}

impl MatchParams {
    /// Parameters allowing up to `mismatches` substitutions, with no required
    /// pattern, `*` as the wildcard and no index memory ceiling.
    pub fn new(mismatches: u32) -> Self {
        Self {
            mismatches,
            required: None,
            wildcard: DEFAULT_WILDCARD,
            max_index_bytes: u64::MAX,
        }
    }

    /// Sets a template every window must satisfy before it is compared.
    ///
    /// The template is aligned to the end of the window (a PAM such as `*GG`
    /// pins the last three bases). Wildcard characters accept any base.
    pub fn with_required_pattern(mut self, template: impl Into<Vec<u8>>) -> Self {
        self.required = Some(template.into());
        self
    }

    /// Sets the wildcard character used in the required template.
    pub fn with_wildcard(mut self, wildcard: u8) -> Self {
        self.wildcard = wildcard;
        self
    }

    /// Caps the estimated size of the target index; plans above it are rejected.
    pub fn with_max_index_bytes(mut self, bytes: u64) -> Self {
        self.max_index_bytes = bytes;
        self
    }

    pub fn mismatches(&self) -> u32 {
        self.mismatches
    }

    pub fn required_pattern(&self) -> Option<&[u8]> {
        self.required.as_deref()
    }

    pub fn wildcard(&self) -> u8 {
        self.wildcard
    }

    pub fn max_index_bytes(&self) -> u64 {
        self.max_index_bytes
    }
}

/// One approximate occurrence of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OffTarget {
    /// Index of the sequence in the input list.
    pub sequence: usize,
    /// 0-based position of the last base of the matched window.
    pub position: usize,
    /// The matched window.
    pub window: Dna4,
    /// Substitutions against the target, outside positions pinned by the required pattern.
    pub mismatches: u32,
}

impl OffTarget {
    /// 0-based position of the first base of the matched window.
    pub fn start(&self, config: &PatternConfig) -> usize {
        self.position + 1 - config.length()
    }

    /// The matched window as text (`_` for bases outside `ACGT`).
    pub fn window_text(&self, config: &PatternConfig) -> String {
        self.window.decode(config)
    }
}

/// Work counters collected during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Full-length windows visited.
    pub windows: u64,
    /// Windows rejected by the required pattern.
    pub filtered: u64,
    /// Similarity checks against candidate targets.
    pub comparisons: u64,
    /// Similarity checks a linear scan would have made for the same windows.
    pub naive_comparisons: u64,
    /// Characters outside `ACGT` pushed into the rolling window.
    pub ambiguous_bases: u64,
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, rhs: Self) {
        self.windows += rhs.windows;
        self.filtered += rhs.filtered;
        self.comparisons += rhs.comparisons;
        self.naive_comparisons += rhs.naive_comparisons;
        self.ambiguous_bases += rhs.ambiguous_bases;
    }
}

/// Required-pattern mask and the similarity a window needs to pass it.
#[derive(Debug, Clone, Copy)]
struct RequiredFilter {
    mask: Dna4,
    matchable: u32,
}

impl RequiredFilter {
    fn new(template: &[u8], wildcard: u8) -> Option<Self> {
        let mut mask = Dna4::from_bytes(template);
        mask.add_wildcards(template, wildcard);
        let matchable = mask.matchable_count();
        (matchable > 0).then_some(Self { mask, matchable })
    }

    #[inline]
    fn accepts(&self, window: &Dna4) -> bool {
        window.similarity(&self.mask) >= self.matchable
    }
}

/// Prepared search over a fixed target list.
///
/// Encodes the targets, applies the required pattern and builds the target
/// index once; the result can then scan any number of sequence batches.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: PatternConfig,
    targets: Vec<Dna4>,
    filter: Option<RequiredFilter>,
    variable_chars: u32,
    minimum_matches: u32,
    container: TargetContainer,
}

impl Matcher {
    /// Prepares a search for `targets`, indexing them if the cost model allows.
    ///
    /// # Errors
    /// - `NoTargets` if `targets` is empty
    /// - `InvalidPatternLength` if the first target is empty or longer than 32
    /// - `TargetLengthMismatch` if targets differ in length
    /// - `RequiredPatternTooLong` if the required template exceeds the target length
    pub fn new<T: AsRef<[u8]>>(targets: &[T], params: &MatchParams) -> Result<Self> {
        let mut matcher = Self::unindexed(targets, params)?;
        let filter = matcher.filter.map(|f| f.mask);
        matcher.container = TargetContainer::new(
            &matcher.targets,
            &matcher.config,
            params.mismatches,
            filter.as_ref(),
            params.max_index_bytes,
        );
        Ok(matcher)
    }

    /// Like `new`, but never builds an index; every window is compared with every target.
    pub fn linear<T: AsRef<[u8]>>(targets: &[T], params: &MatchParams) -> Result<Self> {
        Self::unindexed(targets, params)
    }

    fn unindexed<T: AsRef<[u8]>>(targets: &[T], params: &MatchParams) -> Result<Self> {
        let first = targets.first().ok_or(MatchError::NoTargets)?;
        let config = PatternConfig::new(first.as_ref().len())?;

        let filter = match params.required_pattern() {
            Some(template) if template.len() > config.length() => {
                return Err(MatchError::RequiredPatternTooLong {
                    required: template.len(),
                    length: config.length(),
                });
            }
            Some(template) => RequiredFilter::new(template, params.wildcard),
            None => None,
        };

        let mut encoded = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            let target = target.as_ref();
            let mut dna = config.encode(target).map_err(|_| MatchError::TargetLengthMismatch {
                index,
                expected: config.length(),
                found: target.len(),
            })?;
            if let Some(f) = &filter {
                dna.subtract_mask(&f.mask);
            }
            encoded.push(dna);
        }

        let pinned = filter.map_or(0, |f| f.matchable);
        let variable_chars = (config.length() as u32).saturating_sub(pinned);
        Ok(Self {
            config,
            targets: encoded,
            filter,
            variable_chars,
            minimum_matches: variable_chars.saturating_sub(params.mismatches),
            container: TargetContainer::default(),
        })
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Encoded targets, with required-pattern positions removed.
    pub fn targets(&self) -> &[Dna4] {
        &self.targets
    }

    pub fn container(&self) -> &TargetContainer {
        &self.container
    }

    pub fn is_indexed(&self) -> bool {
        self.container.is_indexed()
    }

    /// Least similarity a window needs to count as a hit.
    pub fn minimum_matches(&self) -> u32 {
        self.minimum_matches
    }

    /// Scans `sequences`, returning one hit list per target.
    pub fn scan<S: AsRef<[u8]>>(&self, sequences: &[S]) -> Vec<Vec<OffTarget>> {
        self.scan_with_stats(sequences).0
    }

    /// Scans `sequences` and also reports how much work the scan did.
    pub fn scan_with_stats<S: AsRef<[u8]>>(&self, sequences: &[S]) -> (Vec<Vec<OffTarget>>, ScanStats) {
        let mut hits = vec![Vec::new(); self.targets.len()];
        let mut stats = ScanStats::default();
        for (id, seq) in sequences.iter().enumerate() {
            self.scan_sequence(id, seq.as_ref(), &mut stats, |target, hit| {
                push_hit(&mut hits[target], hit);
            });
        }
        self.log_stats(&stats);
        (hits, stats)
    }

    /// Parallel `scan`: sequences are distributed over the rayon thread pool.
    ///
    /// Output is identical to `scan`.
    pub fn par_scan<S: AsRef<[u8]> + Sync>(&self, sequences: &[S]) -> Vec<Vec<OffTarget>> {
        let per_sequence: Vec<(Vec<(usize, OffTarget)>, ScanStats)> = sequences
            .par_iter()
            .enumerate()
            .map(|(id, seq)| {
                let mut found = Vec::new();
                let mut stats = ScanStats::default();
                self.scan_sequence(id, seq.as_ref(), &mut stats, |target, hit| {
                    found.push((target, hit));
                });
                (found, stats)
            })
            .collect();

        let mut hits = vec![Vec::new(); self.targets.len()];
        let mut stats = ScanStats::default();
        for (found, s) in per_sequence {
            for (target, hit) in found {
                push_hit(&mut hits[target], hit);
            }
            stats += s;
        }
        self.log_stats(&stats);
        hits
    }

    /// Slides a window over `seq`, calling `emit(target, hit)` for every verified hit.
    ///
    /// The same (target, position) may be emitted more than once when several
    /// arrangements surface it; `push_hit` drops the repeats.
    fn scan_sequence<F>(&self, id: usize, seq: &[u8], stats: &mut ScanStats, mut emit: F)
    where
        F: FnMut(usize, OffTarget),
    {
        let length = self.config.length();
        if seq.len() < length {
            return;
        }

        let mut window = Dna4::default();
        for (position, &base) in seq.iter().enumerate() {
            if !window.push(base, &self.config) {
                stats.ambiguous_bases += 1;
            }
            if position + 1 < length {
                continue;
            }
            stats.windows += 1;

            if self.filter.is_some_and(|f| !f.accepts(&window)) {
                stats.filtered += 1;
                continue;
            }
            stats.naive_comparisons += self.targets.len() as u64;

            let mut check = |index: usize, target: &Dna4| {
                stats.comparisons += 1;
                let similarity = window.similarity(target);
                if similarity >= self.minimum_matches {
                    emit(index, OffTarget {
                        sequence: id,
                        position,
                        window,
                        mismatches: self.variable_chars.saturating_sub(similarity),
                    });
                }
            };

            if self.container.is_indexed() {
                for bucket in self.container.buckets(&window) {
                    for entry in bucket {
                        check(entry.index, &entry.target);
                    }
                }
            } else {
                for (index, target) in self.targets.iter().enumerate() {
                    check(index, target);
                }
            }
        }
    }

    fn log_stats(&self, stats: &ScanStats) {
        debug!(
            "{} windows ({} filtered), {} comparisons, naive would perform {}, {} ambiguous bases, indexed={}",
            stats.windows,
            stats.filtered,
            stats.comparisons,
            stats.naive_comparisons,
            stats.ambiguous_bases,
            self.is_indexed()
        );
    }
}

/// Appends `hit` unless the list already ends with the same (sequence, position).
#[inline]
fn push_hit(hits: &mut Vec<OffTarget>, hit: OffTarget) {
    if hits
        .last()
        .is_none_or(|last| last.sequence != hit.sequence || last.position != hit.position)
    {
        hits.push(hit);
    }
}

/// Finds every window of `sequences` within the mismatch budget of each target.
///
/// Builds the target index when the cost model says it pays off and falls
/// back to comparing every window with every target otherwise; both paths
/// return the same hits.
///
/// # Returns
/// One list per target, in target order; each list is in scan order.
/// Empty `targets` give an empty result; empty `sequences` give one empty
/// list per target.
///
/// # Errors
/// See `Matcher::new`.
pub fn find_matches<S, T>(sequences: &[S], targets: &[T], params: &MatchParams) -> Result<Vec<Vec<OffTarget>>>
where
    S: AsRef<[u8]>,
    T: AsRef<[u8]>,
{
    if targets.is_empty() {
        return Ok(Vec::new());
    }
    let matcher = Matcher::new(targets, params)?;
    Ok(matcher.scan(sequences))
}

/// `find_matches` without the target index.
pub fn simple_match<S, T>(sequences: &[S], targets: &[T], params: &MatchParams) -> Result<Vec<Vec<OffTarget>>>
where
    S: AsRef<[u8]>,
    T: AsRef<[u8]>,
{
    if targets.is_empty() {
        return Ok(Vec::new());
    }
    let matcher = Matcher::linear(targets, params)?;
    Ok(matcher.scan(sequences))
}
