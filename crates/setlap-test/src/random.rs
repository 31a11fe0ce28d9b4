//! Reproducible random membership data.
//!
//! Data is drawn from a seeded ChaCha generator so failing cases can be
//! replayed from the seed alone.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use setlap_core::Set;

/// An element with the names of the sets it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tagged {
    pub id: usize,
    pub sets: Vec<String>,
}

/// Names used for generated sets: `S0`, `S1`, ...
pub fn set_name(i: usize) -> String {
    format!("S{i}")
}

/// Generates `count` elements, each joining every one of `set_count` sets
/// with probability `density`.
pub fn random_elements(seed: u64, count: usize, set_count: usize, density: f64) -> Vec<Tagged> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|id| Tagged {
            id,
            sets: (0..set_count)
                .filter(|_| rng.random_bool(density))
                .map(set_name)
                .collect(),
        })
        .collect()
}

/// Generates `set_count` sets over element ids `0..count`.
///
/// Every set is listed, even when it ends up empty.
pub fn random_sets(seed: u64, count: usize, set_count: usize, density: f64) -> Vec<Set<usize>> {
    let elements = random_elements(seed, count, set_count, density);
    (0..set_count)
        .map(|i| {
            let name = set_name(i);
            let elems = elements
                .iter()
                .filter(|e| e.sets.contains(&name))
                .map(|e| e.id)
                .collect();
            Set::new(name, elems)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_data() {
        assert_eq!(random_elements(7, 50, 4, 0.3), random_elements(7, 50, 4, 0.3));
        assert_ne!(random_elements(7, 50, 4, 0.3), random_elements(8, 50, 4, 0.3));
    }

    #[test]
    fn test_random_sets_lists_every_set() {
        let sets = random_sets(1, 10, 5, 0.0);
        assert_eq!(sets.len(), 5);
        assert!(sets.iter().all(|s| s.cardinality() == 0));
    }
}
