//! The three-set reference example.
//!
//! `A = {1,2,3,4}`, `B = {3,4,5,6}`, `C = {1,3,4,6,7}`.

use setlap_core::Set;

/// Returns the sets `A`, `B` and `C`.
pub fn three_sets() -> Vec<Set<u32>> {
    vec![
        Set::new("A", vec![1, 2, 3, 4]),
        Set::new("B", vec![3, 4, 5, 6]),
        Set::new("C", vec![1, 3, 4, 6, 7]),
    ]
}

/// Returns the same data as tagged elements, plus element `8` in no set.
pub fn three_tagged() -> Vec<(u32, Vec<&'static str>)> {
    vec![
        (1, vec!["A", "C"]),
        (2, vec!["A"]),
        (3, vec!["A", "B", "C"]),
        (4, vec!["A", "B", "C"]),
        (5, vec!["B"]),
        (6, vec!["B", "C"]),
        (7, vec!["C"]),
        (8, vec![]),
    ]
}
