//! Shared test fixtures for setlap crates.
//!
//! - [`three`] - the three-set reference example with known results
//! - [`random`] - reproducible random membership data
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! setlap-test = { workspace = true }
//! ```

pub mod random;
pub mod three;

pub use random::{random_elements, random_sets, Tagged};
pub use three::{three_sets, three_tagged};

use setlap_core::SetCombination;

/// Comparable summary of a combination: name, degree, cardinality, sorted elements.
pub type Signature<T> = (String, usize, usize, Vec<T>);

/// Summarizes combinations sorted by name, ignoring element order.
pub fn signatures<T: Clone + Ord>(combinations: &[SetCombination<T>]) -> Vec<Signature<T>> {
    let mut out: Vec<Signature<T>> = combinations
        .iter()
        .map(|c| {
            let mut elems = c.elems().to_vec();
            elems.sort();
            (c.name().to_string(), c.degree(), c.cardinality(), elems)
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}
