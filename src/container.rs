use log::{debug, trace};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::{
    constants::{ALPHABET_SIZE, BUCKET_BYTES, ENTRY_BYTES, HASH_COST_PER_CHAR},
    dna4::{Dna4, PatternConfig},
    util::{combinations, n_choose_k},
};

/// One indexed target: its (filter-subtracted) encoding and its position in the input list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub target: Dna4,
    pub index: usize,
}

/// Shape of the multi-index chosen by the cost model.
///
/// The variable positions are cut into `divisions` slices of
/// `division_size` positions. With a total budget of `m` mismatches at least
/// one division carries no more than `mismatches_per_division = m / divisions`
/// of them, so hashing every `(division_size - mismatches_per_division)`-subset
/// of each division finds every target within budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionPlan {
    pub divisions: u32,
    pub division_size: u32,
    pub mismatches_per_division: u32,
    pub arrangements_per_division: u64,
    pub buckets_per_arrangement: u64,
    /// Relative cost of one window lookup (hashing plus expected bucket scans).
    pub estimated_work: u64,
    /// Estimated index footprint in bytes.
    pub estimated_bytes: u64,
}

impl DivisionPlan {
    /// Cost of splitting `variable_chars` positions into `divisions` slices.
    ///
    /// Returns `None` when a division would be smaller than its share of the
    /// mismatch budget, or when `divisions` is zero.
    pub fn evaluate(variable_chars: u32, mismatches: u32, num_targets: u64, divisions: u32) -> Option<Self> {
        if divisions == 0 {
            return None;
        }
        let division_size = variable_chars / divisions;
        let mismatches_per_division = mismatches / divisions;
        let exact = division_size.checked_sub(mismatches_per_division)?;

        let arrangements_per_division = n_choose_k(division_size, mismatches_per_division);
        let buckets_per_arrangement = ALPHABET_SIZE.saturating_pow(exact);
        let tables = arrangements_per_division.saturating_mul(u64::from(divisions));

        let estimated_bytes = tables.saturating_mul(
            buckets_per_arrangement
                .saturating_mul(BUCKET_BYTES)
                .saturating_add(num_targets.saturating_mul(ENTRY_BYTES)),
        );
        let per_table = u64::from(variable_chars) * HASH_COST_PER_CHAR + num_targets / buckets_per_arrangement;
        let estimated_work = per_table.saturating_mul(tables);

        Some(Self {
            divisions,
            division_size,
            mismatches_per_division,
            arrangements_per_division,
            buckets_per_arrangement,
            estimated_work,
            estimated_bytes,
        })
    }

    /// Picks the division count with the least estimated work.
    ///
    /// Candidates must beat the linear scan (`num_targets` comparisons per
    /// window) and stay strictly below `max_index_bytes`. Ties keep the
    /// smaller division count. `None` means an index is not worth building.
    pub fn optimum(variable_chars: u32, mismatches: u32, num_targets: u64, max_index_bytes: u64) -> Option<Self> {
        let mut best: Option<Self> = None;
        let mut minimum_work = num_targets;

        for divisions in 1..=variable_chars {
            let Some(plan) = Self::evaluate(variable_chars, mismatches, num_targets, divisions) else {
                continue;
            };
            trace!(
                "divisions={} size={} mismatches/division={} arrangements/division={} work={} bytes={}",
                plan.divisions,
                plan.division_size,
                plan.mismatches_per_division,
                plan.arrangements_per_division,
                plan.estimated_work,
                plan.estimated_bytes
            );
            if plan.estimated_work < minimum_work && plan.estimated_bytes < max_index_bytes {
                minimum_work = plan.estimated_work;
                best = Some(plan);
            }
        }
        best
    }

    /// Total number of hash tables (arrangements across all divisions).
    pub fn num_tables(&self) -> usize {
        (self.arrangements_per_division * u64::from(self.divisions)) as usize
    }

    /// Number of positions each arrangement requires to match exactly.
    pub fn exact_positions(&self) -> u32 {
        self.division_size - self.mismatches_per_division
    }
}

/// Multi-index over a fixed set of targets.
///
/// One hash table per arrangement; a table maps the 2-bit codes of a
/// target's bases at the arrangement's positions to the targets sharing them.
/// Built once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TargetContainer {
    plan: Option<DivisionPlan>,
    variable_positions: Vec<u32>,
    arrangements: Vec<Vec<u32>>,
    tables: Vec<FxHashMap<u64, Vec<Entry>>>,
}

impl TargetContainer {
    /// Builds the index for `targets`.
    ///
    /// Positions occupied in `filter` are excluded from indexing; targets are
    /// expected to have had the filter subtracted already. If the cost model
    /// declines (few targets, no variable positions, memory ceiling) the
    /// returned container is unindexed; check `is_indexed()`.
    ///
    /// # Arguments
    ///
    /// * `targets` – Encoded targets, in input order.
    /// * `config` – Pattern length shared by all targets.
    /// * `mismatches` – Global mismatch budget.
    /// * `filter` – Required-pattern mask, if any.
    /// * `max_index_bytes` – Estimated memory ceiling (`u64::MAX` = unbounded).
    pub fn new(
        targets: &[Dna4],
        config: &PatternConfig,
        mismatches: u32,
        filter: Option<&Dna4>,
        max_index_bytes: u64,
    ) -> Self {
        let length = config.length() as u32;
        let variable_positions: Vec<u32> = (0..length)
            .rev()
            .filter(|&pos| filter.is_none_or(|f| !f.has_base_at(pos)))
            .collect();

        let plan = DivisionPlan::optimum(
            variable_positions.len() as u32,
            mismatches,
            targets.len() as u64,
            max_index_bytes,
        );
        let Some(plan) = plan else {
            debug!(
                "index declined: {} targets, {} variable positions, {} mismatches",
                targets.len(),
                variable_positions.len(),
                mismatches
            );
            return Self {
                variable_positions,
                ..Self::default()
            };
        };
        debug!(
            "index plan: {} divisions of {} positions, {} mismatches/division, {} tables",
            plan.divisions,
            plan.division_size,
            plan.mismatches_per_division,
            plan.num_tables()
        );

        let arrangements = Self::arrangements_for(&plan, &variable_positions);
        let tables = arrangements
            .par_iter()
            .map(|positions| {
                let mut table: FxHashMap<u64, Vec<Entry>> = FxHashMap::default();
                for (index, target) in targets.iter().enumerate() {
                    table
                        .entry(hash(target, positions))
                        .or_default()
                        .push(Entry { target: *target, index });
                }
                table
            })
            .collect();

        Self {
            plan: Some(plan),
            variable_positions,
            arrangements,
            tables,
        }
    }

    /// Exact-position sets of every arrangement, division by division.
    fn arrangements_for(plan: &DivisionPlan, variable_positions: &[u32]) -> Vec<Vec<u32>> {
        let size = plan.division_size as usize;
        let mut arrangements = Vec::with_capacity(plan.num_tables());
        for division in 0..plan.divisions as usize {
            let slice = &variable_positions[division * size..(division + 1) * size];
            let mut subsets = combinations(slice, plan.exact_positions() as usize);
            trace!("division {division}: {} arrangements over {slice:?}", subsets.len());
            arrangements.append(&mut subsets);
        }
        arrangements
    }

    /// `false` when the cost model declined to build an index.
    pub fn is_indexed(&self) -> bool {
        self.plan.is_some()
    }

    /// The chosen plan, if indexed.
    pub fn plan(&self) -> Option<&DivisionPlan> {
        self.plan.as_ref()
    }

    /// Number of hash tables (one per arrangement).
    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// Positions not pinned by the filter, highest bit first.
    pub fn variable_positions(&self) -> &[u32] {
        &self.variable_positions
    }

    /// Exact-position set of every arrangement, in table order.
    pub fn arrangements(&self) -> &[Vec<u32>] {
        &self.arrangements
    }

    /// One bucket per arrangement for the window `pattern`.
    ///
    /// Every target within the mismatch budget of `pattern` appears in at
    /// least one bucket. Buckets also hold false positives and may repeat a
    /// target; verify each entry with `Dna4::similarity`.
    pub fn buckets<'a>(&'a self, pattern: &'a Dna4) -> impl Iterator<Item = &'a [Entry]> + 'a {
        self.arrangements
            .iter()
            .zip(&self.tables)
            .map(move |(positions, table)| table.get(&hash(pattern, positions)).map_or(&[][..], Vec::as_slice))
    }
}

/// Concatenated 2-bit codes of `pattern` at `positions`, first position in the highest bits.
#[inline]
fn hash(pattern: &Dna4, positions: &[u32]) -> u64 {
    positions
        .iter()
        .fold(0u64, |key, &pos| (key << 2) | pattern.hash_code(pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(targets: &[&[u8]]) -> Vec<Dna4> {
        targets.iter().map(|t| Dna4::from_bytes(t)).collect()
    }

    #[test]
    fn plan_prefers_linear_scan_for_few_targets() {
        assert_eq!(DivisionPlan::optimum(20, 4, 1_000, u64::MAX), None);
        assert_eq!(DivisionPlan::optimum(20, 4, 0, u64::MAX), None);
        assert_eq!(DivisionPlan::optimum(0, 0, 1_000_000, u64::MAX), None);
    }

    #[test]
    fn plan_skips_divisions_smaller_than_their_budget() {
        assert_eq!(DivisionPlan::evaluate(3, 5, 10, 1), None);
        assert_eq!(DivisionPlan::evaluate(3, 5, 10, 2), None);
        assert!(DivisionPlan::evaluate(3, 5, 10, 3).is_some());
        assert_eq!(DivisionPlan::evaluate(3, 5, 10, 0), None);
    }

    #[test]
    fn plan_zero_mismatches_is_exact_indexing() {
        let p = DivisionPlan::evaluate(8, 0, 100, 2).unwrap();
        assert_eq!(p.arrangements_per_division, 1);
        assert_eq!(p.exact_positions(), 4);
        assert_eq!(p.buckets_per_arrangement, 256);
    }

    #[test]
    fn plan_saturates_huge_bucket_counts() {
        let p = DivisionPlan::evaluate(32, 0, 10, 1).unwrap();
        assert_eq!(p.buckets_per_arrangement, u64::MAX);
        assert_eq!(p.estimated_bytes, u64::MAX);
    }

    #[test]
    fn layout_without_filter() {
        let config = PatternConfig::new(8).unwrap();
        let targets = vec![Dna4::from_bytes(b"ACGTACGT"); 1000];
        let c = TargetContainer::new(&targets, &config, 2, None, u64::MAX);
        assert!(c.is_indexed());
        assert_eq!(c.plan().unwrap().divisions, 3);
        assert_eq!(c.variable_positions(), &[7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(c.arrangements(), &[vec![6, 7], vec![4, 5], vec![2, 3]]);
        assert_eq!(c.num_tables(), 3);
    }

    #[test]
    fn filter_positions_are_not_indexed() {
        let config = PatternConfig::new(6).unwrap();
        let mut filter = Dna4::from_bytes(b"*GG");
        filter.add_wildcards(b"*GG", b'*');
        let c = TargetContainer::new(&[], &config, 1, Some(&filter), u64::MAX);
        assert!(!c.is_indexed());
        assert_eq!(c.num_tables(), 0);
        assert_eq!(c.variable_positions(), &[5, 4, 3]);
    }

    #[test]
    fn buckets_surface_exact_and_near_targets() {
        let config = PatternConfig::new(8).unwrap();
        let mut targets = encode_all(&[b"ACGTACGT", b"TTTTTTTT", b"ACGTACGA"]);
        targets.resize(1000, Dna4::from_bytes(b"GGGGGGGG"));
        let c = TargetContainer::new(&targets, &config, 2, None, u64::MAX);
        assert!(c.is_indexed());

        let query = Dna4::from_bytes(b"ACGTACGT");
        let found: Vec<usize> = c.buckets(&query).flatten().map(|e| e.index).collect();
        assert!(found.contains(&0));
        assert!(found.contains(&2));
        assert!(!found.contains(&1));
        assert_eq!(c.buckets(&query).count(), c.num_tables());
    }

    #[test]
    fn hash_reads_positions_in_order() {
        let d = Dna4::from_bytes(b"ACGT"); // A@3 C@2 G@1 T@0
        assert_eq!(hash(&d, &[3]), 1);
        assert_eq!(hash(&d, &[2, 3]), (3 << 2) | 1);
        assert_eq!(hash(&d, &[0, 1, 2, 3]), (2 << 4) | (3 << 2) | 1);
        assert_eq!(hash(&d, &[]), 0);
    }
}
