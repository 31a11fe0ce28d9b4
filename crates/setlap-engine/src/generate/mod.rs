//! Combination generation from a fixed list of base sets.
//!
//! Two generators produce the same combinations:
//!
//! - [`generate_combinations`]: enumerates the power set and tests
//!   membership for every subset. Simple, but always `O(2^n)`.
//! - [`generate_combinations_incremental`]: builds degree `d` from pairs of
//!   degree `d - 1` results that differ in one set, pruning empty
//!   intersections before they spawn further candidates.
//!
//! Both emit combinations in power-set counter order before the shared
//! ordering and limit are applied, so sorted results are identical.
//!
//! Logging levels:
//! - **INFO**: generation summary
//! - **DEBUG**: pruning statistics
//! - **TRACE**: individual combinations

mod direct;
mod incremental;

use std::collections::HashSet;
use std::hash::Hash;

use setlap_core::{
    combination_name, Algorithm, CombinationType, GenerateOptions, Result, Set, SetCombination,
    SetIndices, SetlapError, Universe,
};

use crate::extract::extract_combinations_from_sets;

pub use direct::generate_combinations;
pub use incremental::generate_combinations_incremental;

/// Generates combinations with the selected algorithm.
///
/// `Composite` has no generator. Given a [`Universe::Elems`] it is
/// extracted from the memberships of `sets` instead, honoring the same
/// options; any other universe reports
/// [`SetlapError::UnsupportedCombinationType`].
pub fn generate<T>(
    sets: &[Set<T>],
    options: &GenerateOptions,
    universe: Universe<'_, T>,
    algorithm: Algorithm,
) -> Result<Vec<SetCombination<T>>>
where
    T: Clone + Eq + Hash,
{
    if options.kind == CombinationType::Composite {
        if let Universe::Elems(all) = universe {
            return extract_combinations_from_sets(sets, options, all);
        }
    }
    match algorithm {
        Algorithm::Direct => generate_combinations(sets, options, universe),
        Algorithm::Incremental => generate_combinations_incremental(sets, options, universe),
    }
}

/// Validates options shared by both generators.
///
/// Returns `Ok(false)` when the result is empty by construction.
fn check_options(options: &GenerateOptions) -> Result<bool> {
    match options.kind {
        CombinationType::Composite => Err(SetlapError::UnsupportedCombinationType(options.kind)),
        _ => options.check_range(),
    }
}

/// Whether a combination of degree one or more is kept.
fn retain(options: &GenerateOptions, cardinality: usize) -> bool {
    options.empty || cardinality > 0
}

/// Builds the `()` combination when the options ask for it.
fn empty_combination<T>(
    sets: &[Set<T>],
    options: &GenerateOptions,
    universe: Universe<'_, T>,
) -> Option<SetCombination<T>>
where
    T: Clone + Eq + Hash,
{
    if options.min > 0 || !(options.empty || universe.is_explicit()) {
        return None;
    }
    let elems: Vec<T> = match universe {
        Universe::Unknown => Vec::new(),
        Universe::NotPartOfAnySet(elems) => elems.to_vec(),
        Universe::Elems(all) => {
            let members: HashSet<&T> = sets.iter().flat_map(|s| s.elems()).collect();
            all.iter()
                .filter(|e| !members.contains(e))
                .cloned()
                .collect()
        }
    };
    if elems.is_empty() && !options.empty {
        return None;
    }
    Some(SetCombination::new(
        combination_name(Vec::<&str>::new(), options.joiner()),
        options.kind,
        SetIndices::new(),
        elems,
    ))
}

#[cfg(test)]
mod tests;
