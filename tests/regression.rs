//! Regression tests that pin the cost model's choices. If the weights in
//! `constants.rs` change intentionally, update these snapshots and note the
//! change in the CHANGELOG.

use offtargets_rs::DivisionPlan;

// ==== Fixed parameters: 20 variable positions, 4 mismatches (a 20-nt guide) ====
const VARIABLE: u32 = 20;
const MISMATCHES: u32 = 4;

// ==== Snapshot of the chosen plan for 100 000 targets ====
const BIG_TARGETS: u64 = 100_000;
const BIG_PLAN: DivisionPlan = DivisionPlan {
    divisions: 5,
    division_size: 4,
    mismatches_per_division: 0,
    arrangements_per_division: 1,
    buckets_per_arrangement: 256,
    estimated_work: 2_950,
    estimated_bytes: 12_030_720,
};

// ---------------------------------------------------------------------
//                         REGRESSION  TESTS
// ---------------------------------------------------------------------

/// A large target set is split into five exact-match divisions.
#[test]
fn regression_plan_many_targets() {
    assert_eq!(DivisionPlan::optimum(VARIABLE, MISMATCHES, BIG_TARGETS, u64::MAX), Some(BIG_PLAN));
}

/// A thousand targets are cheaper to scan linearly than to index.
#[test]
fn regression_plan_few_targets() {
    assert_eq!(DivisionPlan::optimum(VARIABLE, MISMATCHES, 1_000, u64::MAX), None);
}

/// The memory ceiling is a strict upper bound on the estimated index size.
#[test]
fn regression_plan_memory_ceiling() {
    let at = BIG_PLAN.estimated_bytes;
    assert_eq!(DivisionPlan::optimum(VARIABLE, MISMATCHES, BIG_TARGETS, at + 1), Some(BIG_PLAN));
    assert_eq!(DivisionPlan::optimum(VARIABLE, MISMATCHES, BIG_TARGETS, at), None);
}

/// Individual candidates evaluated by the optimizer.
#[test]
fn regression_candidate_costs() {
    let cost = |d| DivisionPlan::evaluate(VARIABLE, MISMATCHES, BIG_TARGETS, d).map(|p| p.estimated_work);
    assert_eq!(cost(1), Some(969_000));
    assert_eq!(cost(2), Some(18_090));
    assert_eq!(cost(3), Some(5_346));
    assert_eq!(cost(4), Some(11_800));
    assert_eq!(cost(5), Some(2_950));
    assert_eq!(cost(6), Some(10_572));
}
