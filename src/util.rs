use crate::constants::{AC_CHANNELS, GT_CHANNELS};

/// Returns the channel bits of `b` at position 0 as an `(ac, gt)` word pair.
///
/// Looks up the byte in `AC_CHANNELS` and `GT_CHANNELS`, which assign:
/// - A/a → high half of `ac`
/// - C/c → low half of `ac`
/// - G/g → high half of `gt`
/// - T/t → low half of `gt`
/// - Any other byte → `(0, 0)`
///
/// # Arguments
///
/// * `b` – An ASCII byte representing a nucleotide.
#[inline(always)]
pub const fn channels(b: u8) -> (u64, u64) {
    (AC_CHANNELS[b as usize], GT_CHANNELS[b as usize])
}

/// Returns `true` when `b` is one of A, C, G, T (either case).
#[inline(always)]
pub const fn is_base(b: u8) -> bool {
    (AC_CHANNELS[b as usize] | GT_CHANNELS[b as usize]) != 0
}

/// Number of ways to choose `k` items out of `n`.
///
/// Returns 0 when `k > n`. The running product stays exact because every
/// partial result is itself a binomial coefficient.
///
/// # Examples
/// - `n_choose_k(5, 2)` → 10
/// - `n_choose_k(20, 4)` → 4845
pub fn n_choose_k(n: u32, k: u32) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    if k == 0 {
        return 1;
    }

    let n = u64::from(n);
    let mut result = n;
    for i in 2..=u64::from(k) {
        result = result * (n - i + 1) / i;
    }
    result
}

/// Returns every `k`-element subset of `items`.
///
/// Subsets are produced in lexicographic order of the chosen *indices*
/// (`[0,1,..]`, `[0,1,..,k]`, ...); the values inside each subset are then
/// sorted ascending. The order is deterministic, which keeps hash-table
/// layouts repeatable between runs.
///
/// # Arguments
///
/// * `items` – Values to choose from.
/// * `k` – Subset size. `k == 0` yields a single empty subset; `k > items.len()` yields none.
pub fn combinations<T: Copy + Ord>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if k > n {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(n_choose_k(n as u32, k as u32) as usize);
    let mut idx: Vec<usize> = (0..k).collect();

    loop {
        let mut subset: Vec<T> = idx.iter().map(|&i| items[i]).collect();
        subset.sort_unstable();
        out.push(subset);

        // rightmost index that can still move forward
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if idx[i] != i + n - k {
                break;
            }
        }

        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choose_small_values() {
        assert_eq!(n_choose_k(5, 0), 1);
        assert_eq!(n_choose_k(5, 5), 1);
        assert_eq!(n_choose_k(5, 2), 10);
        assert_eq!(n_choose_k(5, 3), 10);
        assert_eq!(n_choose_k(20, 4), 4845);
        assert_eq!(n_choose_k(32, 16), 601_080_390);
        assert_eq!(n_choose_k(3, 4), 0);
    }

    #[test]
    fn combinations_follow_index_order() {
        // Input is descending, as division positions are; subsets come back sorted.
        let c = combinations(&[9u32, 8, 7, 6], 2);
        assert_eq!(
            c,
            vec![
                vec![8, 9],
                vec![7, 9],
                vec![6, 9],
                vec![7, 8],
                vec![6, 8],
                vec![6, 7],
            ]
        );
    }

    #[test]
    fn combination_counts_match_binomial() {
        let items: Vec<u32> = (0..10).collect();
        for k in 0..=10 {
            assert_eq!(combinations(&items, k).len() as u64, n_choose_k(10, k as u32));
        }
        assert!(combinations(&items, 11).is_empty());
        assert_eq!(combinations(&items, 0), vec![Vec::<u32>::new()]);
    }

    #[test]
    fn channel_lookup() {
        assert_eq!(channels(b'A'), (1 << 32, 0));
        assert_eq!(channels(b'c'), (1, 0));
        assert_eq!(channels(b'G'), (0, 1 << 32));
        assert_eq!(channels(b't'), (0, 1));
        assert_eq!(channels(b'N'), (0, 0));
        assert!(is_base(b'a'));
        assert!(!is_base(b'*'));
    }
}
