//! Tests for combination generation.

use super::*;
use setlap_core::{SortKey, MAX_POWER_SET_ITEMS};
use setlap_test::{random_sets, signatures, three_sets};

fn summary(combinations: &[SetCombination<u32>]) -> Vec<(String, Vec<u32>)> {
    combinations
        .iter()
        .map(|c| {
            let mut elems = c.elems().to_vec();
            elems.sort();
            (c.name().to_string(), elems)
        })
        .collect()
}

fn both<T: Clone + Eq + Hash>(
    sets: &[Set<T>],
    options: &GenerateOptions,
    universe: Universe<'_, T>,
) -> (Vec<SetCombination<T>>, Vec<SetCombination<T>>) {
    (
        generate_combinations(sets, options, universe).unwrap(),
        generate_combinations_incremental(sets, options, universe).unwrap(),
    )
}

#[test]
fn test_three_set_intersections() {
    let sets = three_sets();
    let (direct, incremental) = both(&sets, &GenerateOptions::intersection(), Universe::Unknown);

    let expected = vec![
        ("A".to_string(), vec![1, 2, 3, 4]),
        ("B".to_string(), vec![3, 4, 5, 6]),
        ("(A ∩ B)".to_string(), vec![3, 4]),
        ("C".to_string(), vec![1, 3, 4, 6, 7]),
        ("(A ∩ C)".to_string(), vec![1, 3, 4]),
        ("(B ∩ C)".to_string(), vec![3, 4, 6]),
        ("(A ∩ B ∩ C)".to_string(), vec![3, 4]),
    ];
    assert_eq!(summary(&direct), expected);
    assert_eq!(summary(&incremental), expected);
}

#[test]
fn test_three_set_distinct_intersections() {
    let sets = three_sets();
    let (direct, incremental) = both(
        &sets,
        &GenerateOptions::distinct_intersection(),
        Universe::Unknown,
    );

    let expected = vec![
        ("A".to_string(), vec![2]),
        ("B".to_string(), vec![5]),
        ("C".to_string(), vec![7]),
        ("(A ∩ C)".to_string(), vec![1]),
        ("(B ∩ C)".to_string(), vec![6]),
        ("(A ∩ B ∩ C)".to_string(), vec![3, 4]),
    ];
    assert_eq!(summary(&direct), expected);
    assert_eq!(summary(&incremental), expected);
    assert!(direct
        .iter()
        .all(|c| c.combination_type() == CombinationType::DistinctIntersection));
}

#[test]
fn test_three_set_unions() {
    let sets = three_sets();
    let (direct, incremental) =
        both(&sets, &GenerateOptions::union().with_min(2), Universe::Unknown);

    let expected = vec![
        ("(A ∪ B)".to_string(), vec![1, 2, 3, 4, 5, 6]),
        ("(A ∪ C)".to_string(), vec![1, 2, 3, 4, 6, 7]),
        ("(B ∪ C)".to_string(), vec![1, 3, 4, 5, 6, 7]),
        ("(A ∪ B ∪ C)".to_string(), vec![1, 2, 3, 4, 5, 6, 7]),
    ];
    assert_eq!(summary(&direct), expected);
    assert_eq!(summary(&incremental), expected);
}

#[test]
fn test_inclusion_exclusion() {
    let sets = three_sets();
    let pairs = GenerateOptions::intersection().with_min(2).with_max(2);
    let inter = generate_combinations(&sets, &pairs, Universe::Unknown).unwrap();
    let pairs = GenerateOptions::union().with_min(2).with_max(2);
    let union = generate_combinations(&sets, &pairs, Universe::Unknown).unwrap();

    for (i, u) in inter.iter().zip(&union) {
        assert_eq!(i.sets(), u.sets());
        let card: usize = i.sets().iter().map(|&s| sets[s].cardinality()).sum();
        assert_eq!(i.cardinality(), card - u.cardinality());
    }
}

#[test]
fn test_empty_combination_from_universe() {
    let sets = three_sets();
    let all: Vec<u32> = (1..=9).collect();
    let options = GenerateOptions::intersection().with_max(1);

    // not requested
    let (direct, _) = both(&sets, &options, Universe::Elems(&all));
    assert!(direct.iter().all(|c| c.degree() > 0));

    let options = options.with_empty(true);
    let (direct, incremental) = both(&sets, &options, Universe::Elems(&all));
    assert_eq!(direct[0].name(), "()");
    assert_eq!(direct[0].elems(), &[8, 9]);
    assert_eq!(summary(&direct), summary(&incremental));

    let outside = [42];
    let options = GenerateOptions::intersection().with_max(1);
    let (direct, incremental) = both(&sets, &options, Universe::NotPartOfAnySet(&outside));
    assert_eq!(direct[0].elems(), &[42]);
    assert_eq!(incremental[0].elems(), &[42]);
    assert_eq!(direct.len(), 4);
}

#[test]
fn test_empty_flag_keeps_empty_combinations() {
    let sets = vec![
        Set::new("A", vec![1, 2]),
        Set::new("B", vec![3]),
        Set::new("C", vec![2, 3]),
    ];
    let options = GenerateOptions::intersection().with_min(1);
    let (direct, incremental) = both(&sets, &options, Universe::Unknown);
    assert_eq!(direct.len(), 5);
    assert_eq!(summary(&direct), summary(&incremental));

    let options = options.with_empty(true);
    let (direct, incremental) = both(&sets, &options, Universe::Unknown);
    assert_eq!(direct.len(), 7);
    assert_eq!(summary(&direct), summary(&incremental));
    assert_eq!(direct.iter().filter(|c| c.cardinality() == 0).count(), 2);
}

#[test]
fn test_degree_bounds() {
    let sets = three_sets();
    let options = GenerateOptions::intersection().with_min(2).with_max(2);
    let (direct, incremental) = both(&sets, &options, Universe::Unknown);
    assert_eq!(direct.len(), 3);
    assert!(direct.iter().all(|c| c.degree() == 2));
    assert_eq!(summary(&direct), summary(&incremental));
}

#[test]
fn test_invalid_range() {
    let sets = three_sets();
    let options = GenerateOptions::intersection().with_min(3).with_max(1);
    let (direct, incremental) = both(&sets, &options, Universe::Unknown);
    assert!(direct.is_empty());
    assert!(incremental.is_empty());

    let strict = options.with_strict(true);
    assert_eq!(
        generate_combinations(&sets, &strict, Universe::Unknown).unwrap_err(),
        SetlapError::InvalidRange { min: 3, max: 1 }
    );
    assert!(generate_combinations_incremental(&sets, &strict, Universe::Unknown).is_err());
}

#[test]
fn test_composite_is_rejected() {
    let options = GenerateOptions::new(CombinationType::Composite);
    let err = generate_combinations(&three_sets(), &options, Universe::Unknown).unwrap_err();
    assert_eq!(err, SetlapError::UnsupportedCombinationType(CombinationType::Composite));
}

#[test]
fn test_generate_extracts_composite_from_elements() {
    let sets = three_sets();
    let universe: Vec<u32> = (1..=8).collect();
    let composite = GenerateOptions::new(CombinationType::Composite)
        .with_min(2)
        .with_order(SortKey::cardinality());
    let intersection = GenerateOptions::intersection()
        .with_min(2)
        .with_order(SortKey::cardinality());

    let extracted =
        generate(&sets, &composite, Universe::Elems(&universe), Algorithm::Direct).unwrap();
    let generated =
        generate(&sets, &intersection, Universe::Elems(&universe), Algorithm::Direct).unwrap();
    assert_eq!(summary(&extracted), summary(&generated));
    assert!(extracted
        .iter()
        .all(|c| c.combination_type() == CombinationType::Composite));

    let err = generate(&sets, &composite, Universe::Unknown, Algorithm::Incremental).unwrap_err();
    assert_eq!(err, SetlapError::UnsupportedCombinationType(CombinationType::Composite));
}

#[test]
fn test_direct_rejects_too_many_sets() {
    let sets: Vec<Set<u32>> = (0..=MAX_POWER_SET_ITEMS)
        .map(|i| Set::new(format!("S{i}"), vec![i as u32]))
        .collect();
    let options = GenerateOptions::intersection().with_max(1);
    assert!(matches!(
        generate_combinations(&sets, &options, Universe::Unknown),
        Err(SetlapError::TooManySets { .. })
    ));

    // disjoint sets: every intersection of two or more is pruned
    let options = GenerateOptions::intersection();
    let incremental =
        generate_combinations_incremental(&sets, &options, Universe::Unknown).unwrap();
    assert_eq!(incremental.len(), sets.len());
}

#[test]
fn test_custom_joiner_order_and_limit() {
    let sets = three_sets();
    let options = GenerateOptions::intersection()
        .with_joiner(" & ")
        .with_order(SortKey::cardinality())
        .with_order(SortKey::name())
        .with_limit(3);
    let (direct, incremental) = both(&sets, &options, Universe::Unknown);
    let names: Vec<&str> = direct.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["C", "A", "B"]);
    assert_eq!(
        incremental.iter().map(|c| c.name()).collect::<Vec<_>>(),
        names
    );

    let options = GenerateOptions::intersection()
        .with_joiner(" & ")
        .with_order(SortKey::degree().reversed());
    let (direct, _) = both(&sets, &options, Universe::Unknown);
    assert_eq!(direct[0].name(), "(A & B & C)");
}

#[test]
fn test_generate_dispatch() {
    let sets = three_sets();
    let options = GenerateOptions::intersection();
    let direct = generate(&sets, &options, Universe::Unknown, Algorithm::Direct).unwrap();
    let incremental = generate(&sets, &options, Universe::Unknown, Algorithm::Incremental).unwrap();
    assert_eq!(signatures(&direct), signatures(&incremental));
}

#[test]
fn test_direct_and_incremental_agree_on_random_data() {
    let kinds = [
        GenerateOptions::intersection(),
        GenerateOptions::union(),
        GenerateOptions::distinct_intersection(),
    ];
    for seed in 0..12u64 {
        let set_count = 2 + (seed as usize % 6);
        let density = 0.15 + 0.05 * (seed % 5) as f64;
        let sets = random_sets(seed, 60, set_count, density);
        for options in &kinds {
            for options in [
                options.clone(),
                options.clone().with_empty(true),
                options.clone().with_min(2).with_max(3),
            ] {
                let direct = generate_combinations(&sets, &options, Universe::Unknown).unwrap();
                let incremental =
                    generate_combinations_incremental(&sets, &options, Universe::Unknown).unwrap();
                assert_eq!(
                    signatures(&direct),
                    signatures(&incremental),
                    "seed {seed}, options {options:?}"
                );
                // emission order matches as well
                let names = |cs: &[SetCombination<usize>]| -> Vec<String> {
                    cs.iter().map(|c| c.name().to_string()).collect()
                };
                assert_eq!(names(&direct), names(&incremental));
            }
        }
    }
}

#[test]
fn test_distinct_partition_law_on_random_data() {
    for seed in 100..110u64 {
        let sets = random_sets(seed, 80, 5, 0.3);
        let distinct = generate_combinations_incremental(
            &sets,
            &GenerateOptions::distinct_intersection(),
            Universe::Unknown,
        )
        .unwrap();

        let members: HashSet<usize> = sets.iter().flat_map(|s| s.elems().iter().copied()).collect();
        let total: usize = distinct.iter().map(|c| c.cardinality()).sum();
        assert_eq!(total, members.len(), "seed {seed}");

        let mut seen = HashSet::new();
        for c in &distinct {
            for e in c.elems() {
                assert!(seen.insert(*e), "element {e} appears twice (seed {seed})");
            }
        }
    }
}

#[test]
fn test_monotonic_cardinalities() {
    let sets = random_sets(5, 100, 5, 0.4);
    let options = GenerateOptions::intersection().with_empty(true);
    let inter = generate_combinations_incremental(&sets, &options, Universe::Unknown).unwrap();
    let options = GenerateOptions::union().with_empty(true);
    let union = generate_combinations_incremental(&sets, &options, Universe::Unknown).unwrap();

    for combos in [&inter, &union] {
        for child in combos.iter() {
            for parent in combos.iter() {
                if parent.degree() + 1 == child.degree() && parent.sets().is_subset(child.sets()) {
                    if child.combination_type() == CombinationType::Union {
                        assert!(child.cardinality() >= parent.cardinality());
                    } else {
                        assert!(child.cardinality() <= parent.cardinality());
                    }
                }
            }
        }
    }
}
