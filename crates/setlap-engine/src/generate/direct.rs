//! Power-set based generation.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::Instant;

use tracing::{info, trace};

use setlap_core::order::postprocess_combinations;
use setlap_core::{
    CombinationType, GenerateOptions, PowerSetIndices, Result, Set, SetCombination, Universe,
};

use super::{check_options, empty_combination, retain};

/// Membership lookups over a fixed list of base sets.
struct Membership<'a, T> {
    sets: &'a [Set<T>],
    lookups: Vec<HashSet<&'a T>>,
}

impl<'a, T: Clone + Eq + Hash> Membership<'a, T> {
    fn new(sets: &'a [Set<T>]) -> Self {
        Self {
            sets,
            lookups: sets.iter().map(|s| s.elems().iter().collect()).collect(),
        }
    }

    /// Elements of the smallest member set found in every other member.
    fn intersection(&self, subset: &[usize]) -> Vec<T> {
        let Some(smallest) = subset
            .iter()
            .copied()
            .min_by_key(|&i| self.sets[i].cardinality())
        else {
            return Vec::new();
        };
        self.sets[smallest]
            .elems()
            .iter()
            .filter(|e| {
                subset
                    .iter()
                    .all(|&j| j == smallest || self.lookups[j].contains(e))
            })
            .cloned()
            .collect()
    }

    /// Elements of the largest member set followed by the new ones of the rest.
    fn union(&self, subset: &[usize]) -> Vec<T> {
        let Some(largest) = subset
            .iter()
            .copied()
            .reduce(|acc, i| {
                if self.sets[i].cardinality() > self.sets[acc].cardinality() {
                    i
                } else {
                    acc
                }
            })
        else {
            return Vec::new();
        };
        let mut seen: HashSet<&T> = HashSet::new();
        let mut out = Vec::new();
        let order = std::iter::once(largest)
            .chain(subset.iter().copied().filter(|&i| i != largest));
        for i in order {
            for e in self.sets[i].elems() {
                if seen.insert(e) {
                    out.push(e.clone());
                }
            }
        }
        out
    }

    /// Intersection elements that belong to no set outside `subset`.
    fn distinct_intersection(&self, subset: &[usize]) -> Vec<T> {
        let mut elems = self.intersection(subset);
        elems.retain(|e| {
            (0..self.sets.len())
                .filter(|j| !subset.contains(j))
                .all(|j| !self.lookups[j].contains(e))
        });
        elems
    }
}

/// Generates combinations by enumerating the power set of `sets`.
///
/// Every subset with degree in `[min, max]` is materialized; subsets with no
/// elements are dropped unless `options.empty` is set. The empty subset
/// becomes `()` when `min == 0` and either `options.empty` is set or the
/// universe lists the elements outside every set.
///
/// # Errors
///
/// - [`SetlapError::TooManySets`](setlap_core::SetlapError::TooManySets) for
///   more than [`MAX_POWER_SET_ITEMS`](setlap_core::MAX_POWER_SET_ITEMS) sets
/// - [`UnsupportedCombinationType`](setlap_core::SetlapError::UnsupportedCombinationType)
///   for `composite`
/// - [`SetlapError::InvalidRange`](setlap_core::SetlapError::InvalidRange)
///   for `min > max` in strict mode
///
/// # Example
///
/// ```
/// use setlap_core::{GenerateOptions, Set, Universe};
/// use setlap_engine::generate_combinations;
///
/// let sets = vec![Set::new("A", vec![1, 2, 3]), Set::new("B", vec![2, 3, 4])];
/// let combinations =
///     generate_combinations(&sets, &GenerateOptions::intersection(), Universe::Unknown).unwrap();
/// let names: Vec<&str> = combinations.iter().map(|c| c.name()).collect();
/// assert_eq!(names, vec!["A", "B", "(A ∩ B)"]);
/// assert_eq!(combinations[2].cardinality(), 2);
/// ```
pub fn generate_combinations<T>(
    sets: &[Set<T>],
    options: &GenerateOptions,
    universe: Universe<'_, T>,
) -> Result<Vec<SetCombination<T>>>
where
    T: Clone + Eq + Hash,
{
    if !check_options(options)? {
        return Ok(Vec::new());
    }
    let start = Instant::now();
    let membership = Membership::new(sets);
    let max = options.max_degree(sets.len());
    let joiner = options.joiner();

    let mut combinations = Vec::new();
    for subset in PowerSetIndices::new(sets.len(), options.min, Some(max))? {
        if subset.is_empty() {
            combinations.extend(empty_combination(sets, options, universe));
            continue;
        }
        let elems = match options.kind {
            CombinationType::Union => membership.union(&subset),
            CombinationType::DistinctIntersection => membership.distinct_intersection(&subset),
            _ => membership.intersection(&subset),
        };
        if !retain(options, elems.len()) {
            continue;
        }
        let combination = SetCombination::named(
            options.kind,
            subset.into_iter().collect(),
            sets,
            elems,
            Some(joiner),
        );
        trace!(
            event = "combination",
            name = combination.name(),
            degree = combination.degree(),
            cardinality = combination.cardinality(),
        );
        combinations.push(combination);
    }

    let combinations = postprocess_combinations(combinations, &options.order, options.limit);
    info!(
        event = "generate_end",
        algorithm = "direct",
        kind = %options.kind,
        sets = sets.len(),
        combinations = combinations.len(),
        duration_ms = start.elapsed().as_millis() as u64,
    );
    Ok(combinations)
}
