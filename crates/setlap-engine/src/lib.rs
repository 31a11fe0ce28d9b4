//! Set combination engine.
//!
//! This crate turns raw membership data into set combinations and answers
//! overlap questions about them:
//!
//! - [`extract`] - derive sets and combinations from tagged elements
//! - [`generate`] - enumerate combinations of a fixed list of sets
//! - [`overlap`] - pairwise overlaps with precomputed fast paths
//! - [`lookup`] - upper-triangular overlap matrices for snapshots
//!
//! # Example
//!
//! ```
//! use setlap_core::{GenerateOptions, Set, Universe};
//! use setlap_engine::generate_combinations_incremental;
//!
//! let sets = vec![Set::new("A", vec![1, 2, 3]), Set::new("B", vec![2, 3, 4])];
//! let combos = generate_combinations_incremental(
//!     &sets,
//!     &GenerateOptions::intersection(),
//!     Universe::Unknown,
//! )
//! .unwrap();
//!
//! let names: Vec<_> = combos.iter().map(|c| c.name()).collect();
//! assert_eq!(names, ["A", "B", "(A ∩ B)"]);
//! ```

pub mod extract;
pub mod generate;
pub mod lookup;
pub mod overlap;

pub use extract::{
    extract_combinations, extract_combinations_from_sets, extract_combinations_with_sets,
    extract_sets, extract_sets_with, ExtractOptions, Extracted,
};
pub use generate::{generate, generate_combinations, generate_combinations_incremental};
pub use lookup::{
    generate_overlap_lookup, generate_overlap_lookup_by, generate_overlap_lookup_function,
    generate_overlap_lookup_with, OverlapLookup, OverlapMatrix,
};
pub use overlap::{
    brute_force_overlap, brute_force_overlap_by, brute_force_set_likes, default_overlap_function,
    generate_overlap_function, BruteForce, OverlapFunction,
};
