//! Lazy power-set enumeration.
//!
//! Subsets are enumerated with a counter from `0` to `2^n - 1`; bit `j` of
//! the counter selects `items[j]`. The emission order therefore only depends
//! on `n`, so re-enumerating the same input reproduces the same sequence.
//!
//! The counter is a `u64`, but enumerating anywhere near that many subsets is
//! not practical. Inputs longer than [`MAX_POWER_SET_ITEMS`] are rejected with
//! [`SetlapError::TooManySets`].

use crate::error::{Result, SetlapError};

/// Largest number of items whose power set may be enumerated (2^30 subsets).
pub const MAX_POWER_SET_ITEMS: usize = 30;

/// Iterator over subsets of `0..n` as ascending index lists.
#[derive(Debug, Clone)]
pub struct PowerSetIndices {
    n: usize,
    next: u64,
    end: u64,
    min: usize,
    max: usize,
}

impl PowerSetIndices {
    /// Creates an enumerator over subsets of `0..n` whose size lies in `[min, max]`.
    ///
    /// `max = None` means no upper bound.
    pub fn new(n: usize, min: usize, max: Option<usize>) -> Result<Self> {
        if n > MAX_POWER_SET_ITEMS {
            return Err(SetlapError::TooManySets {
                count: n,
                limit: MAX_POWER_SET_ITEMS,
            });
        }
        let max = max.unwrap_or(n).min(n);
        Ok(Self {
            n,
            next: 0,
            end: 1u64 << n,
            min,
            max,
        })
    }

    /// Number of items the subsets are drawn from.
    pub fn item_count(&self) -> usize {
        self.n
    }
}

impl Iterator for PowerSetIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.end {
            let mask = self.next;
            self.next += 1;
            let len = mask.count_ones() as usize;
            if len < self.min || len > self.max {
                continue;
            }
            return Some((0..self.n).filter(|j| mask & (1u64 << j) != 0).collect());
        }
        None
    }
}

/// Iterator over subsequences of a slice.
#[derive(Debug, Clone)]
pub struct PowerSet<'a, X> {
    items: &'a [X],
    indices: PowerSetIndices,
}

impl<'a, X> Iterator for PowerSet<'a, X> {
    type Item = Vec<&'a X>;

    fn next(&mut self) -> Option<Self::Item> {
        let items = self.items;
        self.indices
            .next()
            .map(|subset| subset.into_iter().map(|j| &items[j]).collect())
    }
}

/// Enumerates every subsequence of `items` with length in `[min, max]`.
///
/// # Example
///
/// ```
/// use setlap_core::powerset::power_set;
///
/// let subsets: Vec<Vec<&i32>> = power_set(&[1, 2, 3], 0, None).unwrap().collect();
/// assert_eq!(subsets.len(), 8);
/// assert_eq!(subsets[3], vec![&1, &2]);
/// ```
///
/// # Errors
///
/// Returns [`SetlapError::TooManySets`] when `items` is longer than
/// [`MAX_POWER_SET_ITEMS`].
pub fn power_set<X>(items: &[X], min: usize, max: Option<usize>) -> Result<PowerSet<'_, X>> {
    Ok(PowerSet {
        items,
        indices: PowerSetIndices::new(items.len(), min, max)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_subsets_in_counter_order() {
        let subsets: Vec<Vec<i32>> = power_set(&[1, 2, 3], 0, None)
            .unwrap()
            .map(|s| s.into_iter().copied().collect())
            .collect();
        assert_eq!(
            subsets,
            vec![
                vec![],
                vec![1],
                vec![2],
                vec![1, 2],
                vec![3],
                vec![1, 3],
                vec![2, 3],
                vec![1, 2, 3],
            ]
        );
    }

    #[test]
    fn test_size_bounds() {
        let subsets: Vec<Vec<usize>> = PowerSetIndices::new(4, 2, Some(3)).unwrap().collect();
        assert_eq!(subsets.len(), 6 + 4);
        assert!(subsets.iter().all(|s| (2..=3).contains(&s.len())));
    }

    #[test]
    fn test_restartable() {
        let first: Vec<_> = PowerSetIndices::new(5, 1, None).unwrap().collect();
        let second: Vec<_> = PowerSetIndices::new(5, 1, None).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_yields_empty_subset() {
        let subsets: Vec<Vec<usize>> = PowerSetIndices::new(0, 0, None).unwrap().collect();
        assert_eq!(subsets, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_too_many_items() {
        let items = vec![0u8; MAX_POWER_SET_ITEMS + 1];
        let err = power_set(&items, 0, None).unwrap_err();
        assert_eq!(
            err,
            SetlapError::TooManySets {
                count: MAX_POWER_SET_ITEMS + 1,
                limit: MAX_POWER_SET_ITEMS
            }
        );
    }
}
