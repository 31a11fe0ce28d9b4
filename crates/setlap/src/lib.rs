//! setlap - set combination and overlap analysis in Rust
//!
//! Turn tagged elements into named sets, derive their intersections, unions
//! or distinct intersections, and answer overlap questions, optionally from
//! an element-free snapshot.
//!
//! # Example
//!
//! ```
//! use setlap::prelude::*;
//!
//! let elements = vec![
//!     (1, vec!["A", "C"]),
//!     (2, vec!["A"]),
//!     (3, vec!["A", "B", "C"]),
//!     (4, vec!["A", "B", "C"]),
//!     (5, vec!["B"]),
//! ];
//! let config = SetlapConfig::new()
//!     .with_kind(CombinationType::DistinctIntersection)
//!     .with_sets(SetPostprocess::new().with_order(SortKey::name()));
//! let result = setlap::analyze(&elements, |e| e.1.clone(), &config).unwrap();
//!
//! let names: Vec<_> = result.combinations.iter().map(|c| c.name()).collect();
//! assert_eq!(names, ["A", "B", "(A ∩ C)", "(A ∩ B ∩ C)"]);
//! ```

pub use setlap_core::{
    codec, power_set, set_indices, Algorithm, CombinationType, Compress, GenerateOptions,
    OverlapMetric, Result, Set, SetCombination, SetIndices, SetLike, SetLikeInfo, SetLikeKey,
    SetLikeKind, SetPostprocess, SetlapError, SortDirection, SortField, SortKey, Universe,
};

pub use setlap_engine::{
    default_overlap_function, extract_combinations, extract_combinations_from_sets,
    extract_combinations_with_sets, extract_sets, extract_sets_with, generate,
    generate_combinations, generate_combinations_incremental, generate_overlap_function,
    generate_overlap_lookup, generate_overlap_lookup_by, generate_overlap_lookup_function,
    ExtractOptions, Extracted, OverlapFunction, OverlapLookup, OverlapMatrix,
};

pub use setlap_dump::{
    create_dump, create_dump_by, create_static_dump, create_static_dump_by, load_dump,
    load_static_dump, Dump, DumpError, DumpOptions, DumpSource, LoadedDump, Query, Selection,
    StaticDump, StaticDumpOptions, StaticSnapshot,
};

pub use setlap_config::{ConfigError, SetlapConfig};

#[cfg(feature = "console")]
pub mod console;

use std::hash::Hash;

/// Extracts sets and combinations as configured.
///
/// Sets are taken from the element memberships and postprocessed with
/// `config.sets`. Combinations come from the configured generator;
/// `composite` is extracted from the same memberships under the same degree
/// range, ordering and limit.
///
/// # Errors
///
/// Fails when the generation options are rejected by the generator.
pub fn analyze<E, A, I, S>(
    elements: &[E],
    accessor: A,
    config: &SetlapConfig,
) -> Result<Extracted<E>>
where
    E: Clone + Eq + Hash,
    A: Fn(&E) -> I,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let sets = extract_sets_with(elements, accessor, &config.sets);
    let combinations = generate(
        &sets,
        &config.generation,
        Universe::Elems(elements),
        config.algorithm,
    )?;
    Ok(Extracted { sets, combinations })
}

pub mod prelude {
    pub use super::{
        Algorithm, CombinationType, Compress, GenerateOptions, OverlapMetric, Set, SetCombination,
        SetLike, SetLikeInfo, SetPostprocess, SetlapConfig, SortKey, Universe,
    };
    pub use super::{
        default_overlap_function, extract_combinations, extract_sets, generate_combinations,
        generate_combinations_incremental,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use setlap_test::three_tagged;

    #[test]
    fn test_analyze_intersections() {
        let elements = three_tagged();
        let result = analyze(&elements, |e| e.1.clone(), &SetlapConfig::default()).unwrap();
        let names: Vec<_> = result.sets.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["A", "C", "B"]);
        assert_eq!(result.combinations.len(), 7);
    }

    #[test]
    fn test_analyze_with_direct_generator_and_limit() {
        let elements = three_tagged();
        let config = SetlapConfig::new()
            .with_algorithm(Algorithm::Direct)
            .with_kind(CombinationType::DistinctIntersection)
            .with_order(SortKey::cardinality())
            .with_limit(1);
        let result = analyze(&elements, |e| e.1.clone(), &config).unwrap();
        assert_eq!(result.combinations.len(), 1);
        assert_eq!(result.combinations[0].cardinality(), 2);
    }

    #[test]
    fn test_analyze_composite_uses_extraction() {
        let elements = three_tagged();
        let config = SetlapConfig::new().with_kind(CombinationType::Composite);
        let result = analyze(&elements, |e| e.1.clone(), &config).unwrap();
        assert!(result
            .combinations
            .iter()
            .all(|c| c.combination_type() == CombinationType::Composite));
        assert_eq!(result.combinations.len(), 7);
    }

    #[test]
    fn test_analyze_composite_honors_degree_range() {
        let elements = three_tagged();
        let config = SetlapConfig::new()
            .with_kind(CombinationType::Composite)
            .with_degree_range(2, 2);
        let result = analyze(&elements, |e| e.1.clone(), &config).unwrap();
        let names: Vec<_> = result.combinations.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["(A ∩ C)", "(A ∩ B)", "(C ∩ B)"]);
        let cardinalities: Vec<_> = result
            .combinations
            .iter()
            .map(|c| c.cardinality())
            .collect();
        assert_eq!(cardinalities, [3, 2, 3]);

        let mut strict = config.with_degree_range(3, 1);
        strict.generation.strict = true;
        let err = analyze(&elements, |e| e.1.clone(), &strict).unwrap_err();
        assert_eq!(err, SetlapError::InvalidRange { min: 3, max: 1 });
    }

    #[test]
    fn test_analyze_empty_keeps_outside_elements() {
        let elements = three_tagged();
        let mut config = SetlapConfig::new();
        config.generation.empty = true;
        config.generation.max = Some(1);
        let result = analyze(&elements, |e| e.1.clone(), &config).unwrap();
        assert_eq!(result.combinations[0].name(), "()");
        assert_eq!(result.combinations[0].elems(), &[(8, vec![])]);
    }
}
