//! Precomputed pairwise overlaps.
//!
//! The items are `sets ++ combinations`. Row `i` of an [`OverlapMatrix`]
//! holds the values for every `j > i`, so the matrix stores each unordered
//! pair once. It is meant for snapshots of dozens of items, not thousands.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use setlap_core::{
    OverlapMetric, Result, Set, SetCombination, SetLikeInfo, SetLikeKey, SetlapError,
};

/// Upper-triangular matrix of pairwise values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapMatrix {
    rows: Vec<Vec<usize>>,
}

impl OverlapMatrix {
    /// Builds a matrix over `n` items from `value(i, j)` for `i < j`.
    pub fn from_fn(n: usize, mut value: impl FnMut(usize, usize) -> usize) -> Self {
        let rows = (0..n)
            .map(|i| ((i + 1)..n).map(|j| value(i, j)).collect())
            .collect();
        Self { rows }
    }

    /// Wraps decoded rows, checking the triangular shape.
    ///
    /// # Errors
    ///
    /// Returns [`SetlapError::InvalidDump`] when row `i` does not hold
    /// `n - i - 1` values.
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Result<Self> {
        let n = rows.len();
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(i, row)| row.len() != n - i - 1)
        {
            return Err(SetlapError::InvalidDump(format!(
                "overlap row {i} has {} values, expected {}",
                row.len(),
                n - i - 1
            )));
        }
        Ok(Self { rows })
    }

    /// Number of items the matrix covers.
    pub fn item_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<usize>> {
        self.rows
    }

    /// Value for the pair `(i, j)` in either order; `None` on the diagonal
    /// or out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<usize> {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        if lo == hi {
            return None;
        }
        self.rows.get(lo)?.get(hi - lo - 1).copied()
    }
}

/// Overlap matrix over the elements of `sets ++ combinations`.
pub fn generate_overlap_lookup<T: Eq + Hash>(
    sets: &[Set<T>],
    combinations: &[SetCombination<T>],
    metric: OverlapMetric,
) -> OverlapMatrix {
    generate_overlap_lookup_by(sets, combinations, |e| e, metric)
}

/// Overlap matrix comparing elements by `to_elem_key`.
pub fn generate_overlap_lookup_by<'a, T, K, F>(
    sets: &'a [Set<T>],
    combinations: &'a [SetCombination<T>],
    to_elem_key: F,
    metric: OverlapMetric,
) -> OverlapMatrix
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let items: Vec<&'a [T]> = sets
        .iter()
        .map(|s| s.elems())
        .chain(combinations.iter().map(|c| c.elems()))
        .collect();

    let rows = items
        .iter()
        .enumerate()
        .map(|(i, elems)| {
            let lookup: HashSet<K> = elems.iter().map(&to_elem_key).collect();
            items[i + 1..]
                .iter()
                .map(|other| {
                    let overlap = other
                        .iter()
                        .filter(|&e| lookup.contains(&to_elem_key(e)))
                        .count();
                    metric.apply(elems.len(), other.len(), overlap)
                })
                .collect()
        })
        .collect();
    OverlapMatrix { rows }
}

/// Overlap matrix from items that answer overlaps themselves.
///
/// `overlap(i, j)` is asked once per unordered pair.
pub fn generate_overlap_lookup_with(
    cardinalities: &[usize],
    metric: OverlapMetric,
    mut overlap: impl FnMut(usize, usize) -> usize,
) -> OverlapMatrix {
    OverlapMatrix::from_fn(cardinalities.len(), |i, j| {
        metric.apply(cardinalities[i], cardinalities[j], overlap(i, j))
    })
}

/// Answers overlap queries from a matrix instead of elements.
#[derive(Debug, Clone, Default)]
pub struct OverlapLookup {
    matrix: OverlapMatrix,
    index: HashMap<SetLikeKey, usize>,
}

impl OverlapLookup {
    /// Creates a lookup over positional keys.
    ///
    /// `None` marks a position that can never be looked up. When a key
    /// repeats, its first position wins.
    pub fn new(matrix: OverlapMatrix, keys: impl IntoIterator<Item = Option<SetLikeKey>>) -> Self {
        let mut index = HashMap::new();
        for (i, key) in keys.into_iter().enumerate() {
            if let Some(key) = key {
                index.entry(key).or_insert(i);
            }
        }
        Self { matrix, index }
    }

    /// Matrix position of the set-like with this key.
    pub fn index_of(&self, key: &SetLikeKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn matrix(&self) -> &OverlapMatrix {
        &self.matrix
    }

    /// Value stored for `a` and `b`.
    ///
    /// Equal keys return `a`'s cardinality; keys the lookup does not know
    /// overlap nothing.
    pub fn compute<A, B>(&self, a: &A, b: &B) -> usize
    where
        A: SetLikeInfo + ?Sized,
        B: SetLikeInfo + ?Sized,
    {
        let (ka, kb) = (a.key(), b.key());
        if ka == kb {
            return a.cardinality();
        }
        match (self.index_of(&ka), self.index_of(&kb)) {
            (Some(i), Some(j)) if i == j => a.cardinality(),
            (Some(i), Some(j)) => self.matrix.get(i, j).unwrap_or(0),
            _ => 0,
        }
    }
}

/// Builds the lookup for a matrix generated over `sets ++ combinations`.
pub fn generate_overlap_lookup_function<S, C>(
    matrix: OverlapMatrix,
    sets: &[S],
    combinations: &[C],
) -> OverlapLookup
where
    S: SetLikeInfo,
    C: SetLikeInfo,
{
    let keys = sets
        .iter()
        .map(|s| Some(s.key()))
        .chain(combinations.iter().map(|c| Some(c.key())));
    OverlapLookup::new(matrix, keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::generate_combinations;
    use crate::overlap::brute_force_overlap;
    use setlap_core::{set_indices, CombinationType, GenerateOptions, Universe};
    use setlap_test::three_sets;

    #[test]
    fn test_matrix_shape_and_access() {
        let m = OverlapMatrix::from_fn(4, |i, j| 10 * i + j);
        assert_eq!(m.rows(), &[vec![1, 2, 3], vec![12, 13], vec![23], vec![]]);
        assert_eq!(m.get(1, 3), Some(13));
        assert_eq!(m.get(3, 1), Some(13));
        assert_eq!(m.get(2, 2), None);
        assert_eq!(m.get(0, 9), None);

        assert!(OverlapMatrix::from_rows(vec![vec![1], vec![]]).is_ok());
        assert!(OverlapMatrix::from_rows(vec![vec![1, 2], vec![]]).is_err());
    }

    #[test]
    fn test_lookup_matches_brute_force() {
        let sets = three_sets();
        let options = GenerateOptions::intersection();
        let combos = generate_combinations(&sets, &options, Universe::Unknown).unwrap();
        let matrix = generate_overlap_lookup(&sets, &combos, OverlapMetric::Intersection);
        assert_eq!(matrix.item_count(), sets.len() + combos.len());

        let lookup = generate_overlap_lookup_function(matrix, &sets, &combos);
        for a in &sets {
            for b in &combos {
                assert_eq!(lookup.compute(a, b), brute_force_overlap(a.elems(), b.elems()));
                assert_eq!(lookup.compute(b, a), lookup.compute(a, b));
            }
            assert_eq!(lookup.compute(a, a), a.cardinality());
        }
    }

    #[test]
    fn test_union_metric() {
        let sets = three_sets();
        let matrix = generate_overlap_lookup(&sets, &[], OverlapMetric::Union);
        let none: Vec<SetCombination<u32>> = Vec::new();
        let lookup = generate_overlap_lookup_function(matrix, &sets, &none);
        assert_eq!(lookup.compute(&sets[0], &sets[1]), 6);
    }

    #[test]
    fn test_key_function() {
        let sets = vec![
            Set::new("A", vec!["a1", "b1"]),
            Set::new("B", vec!["A2", "c2"]),
        ];
        let matrix = generate_overlap_lookup_by(
            &sets,
            &[],
            |e: &&str| e.to_lowercase().chars().next(),
            OverlapMetric::Intersection,
        );
        assert_eq!(matrix.get(0, 1), Some(1));
    }

    #[test]
    fn test_unknown_keys_are_zero() {
        let sets = three_sets();
        let matrix = generate_overlap_lookup(&sets, &[], OverlapMetric::Intersection);
        let none: Vec<SetCombination<u32>> = Vec::new();
        let lookup = generate_overlap_lookup_function(matrix, &sets, &none);

        let foreign = Set::new("Z", vec![1, 2]);
        assert_eq!(lookup.compute(&sets[0], &foreign), 0);
        let ad_hoc =
            SetCombination::new("x", CombinationType::Composite, set_indices([0]), vec![1]);
        assert_eq!(lookup.compute(&ad_hoc, &sets[0]), 0);
    }

    #[test]
    fn test_lookup_with_callback() {
        let cards = [4, 4, 5];
        let m = generate_overlap_lookup_with(&cards, OverlapMetric::Union, |i, j| i + j);
        assert_eq!(m.get(0, 1), Some(7));
        assert_eq!(m.get(1, 2), Some(6));
    }
}
