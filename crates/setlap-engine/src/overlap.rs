//! Overlap functions over sets, combinations and ad hoc selections.
//!
//! [`generate_overlap_function`] turns a finished list of combinations of one
//! type into a fast `overlap(a, b)`. Pairs it cannot answer from the
//! precomputed cardinalities are handed to a fallback, ordinarily
//! [`brute_force_overlap`] over the elements.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use setlap_core::{CombinationType, Set, SetCombination, SetIndices, SetLike, SetLikeInfo};

/// Counts elements present in both slices.
///
/// The larger operand is indexed and the smaller one is looked up in it.
pub fn brute_force_overlap<T: Eq + Hash>(a: &[T], b: &[T]) -> usize {
    brute_force_overlap_by(a, b, |e| e)
}

/// Counts elements present in both slices, comparing by `key`.
pub fn brute_force_overlap_by<'a, T, K, F>(a: &'a [T], b: &'a [T], key: F) -> usize
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if small.is_empty() {
        return 0;
    }
    let lookup: HashSet<K> = large.iter().map(&key).collect();
    small.iter().filter(|&e| lookup.contains(&key(e))).count()
}

/// Brute-force fallback usable with [`generate_overlap_function`].
pub fn brute_force_set_likes<T: Eq + Hash>(a: &SetLike<'_, T>, b: &SetLike<'_, T>) -> usize {
    brute_force_overlap(a.elems(), b.elems())
}

/// Signature of [`brute_force_set_likes`].
pub type BruteForce<T> = fn(&SetLike<'_, T>, &SetLike<'_, T>) -> usize;

/// Overlap function backed by precomputed combination cardinalities.
pub struct OverlapFunction<'a, T, F> {
    kind: Option<CombinationType>,
    set_index: HashMap<&'a str, usize>,
    set_cardinalities: Vec<usize>,
    by_sets: HashMap<SetIndices, usize>,
    /// Distinct combinations as (members, cardinality).
    distinct: Vec<(SetIndices, usize)>,
    /// Whether the distinct combinations cover each set completely.
    complete: Vec<bool>,
    fallback: F,
    _marker: std::marker::PhantomData<fn(&T)>,
}

/// Builds an overlap function from combinations of one type.
///
/// Fast paths, in order:
/// 1. identical operands, an empty operand, or equal derived keys
/// 2. `intersection`: a subset of member sets means containment; otherwise
///    the combination over the joined member sets has the answer
/// 3. `union`: same lookups through `|a ∩ b| = |a| + |b| - |a ∪ b|`
/// 4. `distinctIntersection`: distinct combinations are disjoint, a distinct
///    combination lies inside exactly its member sets, and two sets overlap
///    by the sum of the distinct combinations containing both
///
/// Mixed combination types, `composite`, and pairs whose answer was not
/// generated go to `fallback`.
pub fn generate_overlap_function<'a, T, F>(
    sets: &'a [Set<T>],
    combinations: &[SetCombination<T>],
    fallback: F,
) -> OverlapFunction<'a, T, F>
where
    F: Fn(&SetLike<'_, T>, &SetLike<'_, T>) -> usize,
{
    let kind = combinations.first().map(|c| c.combination_type()).filter(|&kind| {
        combinations
            .iter()
            .all(|c| c.combination_type() == kind)
    });

    let set_index = sets.iter().enumerate().map(|(i, s)| (s.name(), i)).collect();
    let set_cardinalities: Vec<usize> = sets.iter().map(|s| s.cardinality()).collect();

    let mut by_sets = HashMap::new();
    let mut distinct = Vec::new();
    let mut covered = vec![0usize; sets.len()];
    if kind.is_some() {
        for c in combinations {
            by_sets.entry(c.sets().clone()).or_insert(c.cardinality());
            if kind == Some(CombinationType::DistinctIntersection) {
                distinct.push((c.sets().clone(), c.cardinality()));
                for &s in c.sets() {
                    if let Some(total) = covered.get_mut(s) {
                        *total += c.cardinality();
                    }
                }
            }
        }
    }
    let complete = covered
        .iter()
        .zip(&set_cardinalities)
        .map(|(covered, card)| covered == card)
        .collect();

    OverlapFunction {
        kind,
        set_index,
        set_cardinalities,
        by_sets,
        distinct,
        complete,
        fallback,
        _marker: std::marker::PhantomData,
    }
}

/// Overlap function with the brute-force fallback.
pub fn default_overlap_function<'a, T: Eq + Hash>(
    sets: &'a [Set<T>],
    combinations: &[SetCombination<T>],
) -> OverlapFunction<'a, T, BruteForce<T>> {
    generate_overlap_function(sets, combinations, brute_force_set_likes as BruteForce<T>)
}

enum Operand {
    Set(usize),
    Combination(SetIndices),
}

impl Operand {
    fn members(&self) -> SetIndices {
        match self {
            Operand::Set(i) => std::iter::once(*i).collect(),
            Operand::Combination(sets) => sets.clone(),
        }
    }
}

impl<T, F> OverlapFunction<'_, T, F>
where
    F: Fn(&SetLike<'_, T>, &SetLike<'_, T>) -> usize,
{
    /// Number of elements shared by `a` and `b`.
    pub fn overlap(&self, a: &SetLike<'_, T>, b: &SetLike<'_, T>) -> usize {
        if a.same_as(b) {
            return a.cardinality();
        }
        if a.cardinality() == 0 || b.cardinality() == 0 {
            return 0;
        }
        if a.key() == b.key() {
            return a.cardinality();
        }
        self.precomputed(a, b)
            .unwrap_or_else(|| (self.fallback)(a, b))
    }

    /// The homogeneous type of the supplied combinations, if any.
    pub fn combination_type(&self) -> Option<CombinationType> {
        self.kind
    }

    /// Resolves an operand to its member sets if it fits `kind`.
    fn operand(&self, s: &SetLike<'_, T>, kind: CombinationType) -> Option<Operand> {
        match s {
            SetLike::Set(set) => self.set_index.get(set.name()).map(|&i| Operand::Set(i)),
            // `()` holds the elements outside every set
            SetLike::Combination(c)
                if c.degree() == 0 && kind != CombinationType::DistinctIntersection =>
            {
                None
            }
            SetLike::Combination(c) if c.combination_type() == kind => {
                Some(Operand::Combination(c.sets().clone()))
            }
            SetLike::Combination(_) => None,
        }
    }

    fn precomputed(&self, a: &SetLike<'_, T>, b: &SetLike<'_, T>) -> Option<usize> {
        let kind = self.kind?;
        let oa = self.operand(a, kind)?;
        let ob = self.operand(b, kind)?;
        let (card_a, card_b) = (a.cardinality(), b.cardinality());

        match kind {
            CombinationType::Intersection => {
                let (ma, mb) = (oa.members(), ob.members());
                if ma.is_subset(&mb) {
                    return Some(card_b);
                }
                if mb.is_subset(&ma) {
                    return Some(card_a);
                }
                let joined: SetIndices = ma.union(&mb).copied().collect();
                self.by_sets.get(&joined).copied()
            }
            CombinationType::Union => {
                let (ma, mb) = (oa.members(), ob.members());
                if ma.is_subset(&mb) {
                    return Some(card_a);
                }
                if mb.is_subset(&ma) {
                    return Some(card_b);
                }
                let joined: SetIndices = ma.union(&mb).copied().collect();
                self.by_sets
                    .get(&joined)
                    .map(|&union| (card_a + card_b).saturating_sub(union))
            }
            CombinationType::DistinctIntersection => match (oa, ob) {
                (Operand::Set(i), Operand::Set(j)) => {
                    if !(self.complete[i] && self.complete[j]) {
                        return None;
                    }
                    Some(
                        self.distinct
                            .iter()
                            .filter(|(sets, _)| sets.contains(&i) && sets.contains(&j))
                            .map(|(_, card)| card)
                            .sum(),
                    )
                }
                (Operand::Set(i), Operand::Combination(sets)) => {
                    Some(if sets.contains(&i) { card_b } else { 0 })
                }
                (Operand::Combination(sets), Operand::Set(j)) => {
                    Some(if sets.contains(&j) { card_a } else { 0 })
                }
                // different keys, so disjoint parts of the partition
                (Operand::Combination(_), Operand::Combination(_)) => Some(0),
            },
            CombinationType::Composite => None,
        }
    }

    /// Cardinality of base set `i` as seen when the function was built.
    pub fn set_cardinality(&self, i: usize) -> Option<usize> {
        self.set_cardinalities.get(i).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::generate::generate_combinations;
    use setlap_core::{set_indices, GenerateOptions, Universe};
    use setlap_test::{random_sets, three_sets};

    fn counting_fallback<'c>(
        calls: &'c Cell<usize>,
    ) -> impl Fn(&SetLike<'_, u32>, &SetLike<'_, u32>) -> usize + 'c {
        move |a, b| {
            calls.set(calls.get() + 1);
            brute_force_overlap(a.elems(), b.elems())
        }
    }

    #[test]
    fn test_brute_force() {
        assert_eq!(brute_force_overlap(&[1, 2, 3], &[2, 3, 4, 5]), 2);
        assert_eq!(brute_force_overlap::<u8>(&[], &[1]), 0);
        let a = ["x1", "y2"];
        let b = ["X9", "z1"];
        assert_eq!(brute_force_overlap_by(&a, &b, |s| s.to_lowercase().chars().next()), 1);
    }

    #[test]
    fn test_intersection_fast_paths() {
        let sets = three_sets();
        let options = GenerateOptions::intersection();
        let combos = generate_combinations(&sets, &options, Universe::Unknown).unwrap();
        let calls = Cell::new(0);
        let f = generate_overlap_function(&sets, &combos, counting_fallback(&calls));
        assert_eq!(f.combination_type(), Some(CombinationType::Intersection));

        let (a, b, c) = (SetLike::Set(&sets[0]), SetLike::Set(&sets[1]), SetLike::Set(&sets[2]));
        assert_eq!(f.overlap(&a, &a), 4);
        assert_eq!(f.overlap(&a, &b), 2);
        assert_eq!(f.overlap(&c, &a), 3);

        let ab = combos.iter().find(|x| x.name() == "(A ∩ B)").unwrap();
        let bc = combos.iter().find(|x| x.name() == "(B ∩ C)").unwrap();
        assert_eq!(f.overlap(&a, &SetLike::Combination(ab)), 2);
        assert_eq!(f.overlap(&SetLike::Combination(ab), &SetLike::Combination(bc)), 2);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_union_uses_inclusion_exclusion() {
        let sets = three_sets();
        let options = GenerateOptions::union();
        let combos = generate_combinations(&sets, &options, Universe::Unknown).unwrap();
        let calls = Cell::new(0);
        let f = generate_overlap_function(&sets, &combos, counting_fallback(&calls));

        let (a, b, c) = (SetLike::Set(&sets[0]), SetLike::Set(&sets[1]), SetLike::Set(&sets[2]));
        assert_eq!(f.overlap(&a, &b), 2);
        assert_eq!(f.overlap(&a, &c), 3);
        assert_eq!(f.overlap(&b, &c), 3);

        let ab = combos.iter().find(|x| x.name() == "(A ∪ B)").unwrap();
        assert_eq!(f.overlap(&a, &SetLike::Combination(ab)), 4);
        assert_eq!(f.overlap(&SetLike::Combination(ab), &c), 4);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_distinct_partition_lookups() {
        let sets = three_sets();
        let combos = generate_combinations(
            &sets,
            &GenerateOptions::distinct_intersection(),
            Universe::Unknown,
        )
        .unwrap();
        let calls = Cell::new(0);
        let f = generate_overlap_function(&sets, &combos, counting_fallback(&calls));

        let (a, b, c) = (SetLike::Set(&sets[0]), SetLike::Set(&sets[1]), SetLike::Set(&sets[2]));
        assert_eq!(f.overlap(&a, &b), 2);
        assert_eq!(f.overlap(&a, &c), 3);
        assert_eq!(f.overlap(&b, &c), 3);

        let abc = combos.iter().find(|x| x.degree() == 3).unwrap();
        let only_a = combos.iter().find(|x| x.name() == "A").unwrap();
        assert_eq!(f.overlap(&b, &SetLike::Combination(abc)), 2);
        assert_eq!(f.overlap(&SetLike::Combination(only_a), &b), 0);
        assert_eq!(f.overlap(&SetLike::Combination(only_a), &SetLike::Combination(abc)), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_incomplete_distinct_falls_back() {
        let sets = three_sets();
        let mut combos = generate_combinations(
            &sets,
            &GenerateOptions::distinct_intersection(),
            Universe::Unknown,
        )
        .unwrap();
        combos.retain(|c| c.degree() < 3);
        let calls = Cell::new(0);
        let f = generate_overlap_function(&sets, &combos, counting_fallback(&calls));
        let (a, b) = (SetLike::Set(&sets[0]), SetLike::Set(&sets[1]));
        assert_eq!(f.overlap(&a, &b), 2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_mixed_and_ad_hoc_fall_back() {
        let sets = three_sets();
        let options = GenerateOptions::intersection();
        let combos = generate_combinations(&sets, &options, Universe::Unknown).unwrap();
        let calls = Cell::new(0);
        let f = generate_overlap_function(&sets, &combos, counting_fallback(&calls));

        let selection = SetCombination::new(
            "selection",
            CombinationType::Composite,
            set_indices([]),
            vec![2, 5, 7, 9],
        );
        let a = SetLike::Set(&sets[0]);
        assert_eq!(f.overlap(&a, &SetLike::Combination(&selection)), 1);
        assert_eq!(calls.get(), 1);

        let empty =
            SetCombination::new("none", CombinationType::Composite, set_indices([]), vec![]);
        assert_eq!(f.overlap(&a, &SetLike::Combination(&empty)), 0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_limited_combinations_fall_back() {
        let sets = three_sets();
        let combos = generate_combinations(
            &sets,
            &GenerateOptions::intersection().with_max(1),
            Universe::Unknown,
        )
        .unwrap();
        let f = default_overlap_function(&sets, &combos);
        assert_eq!(f.overlap(&SetLike::Set(&sets[0]), &SetLike::Set(&sets[1])), 2);
    }

    #[test]
    fn test_symmetry_on_random_data() {
        let sets = random_sets(3, 60, 4, 0.4);
        for options in [
            GenerateOptions::intersection(),
            GenerateOptions::union(),
            GenerateOptions::distinct_intersection(),
        ] {
            let combos = generate_combinations(&sets, &options, Universe::Unknown).unwrap();
            let f = default_overlap_function(&sets, &combos);
            let items: Vec<SetLike<'_, usize>> = sets
                .iter()
                .map(SetLike::Set)
                .chain(combos.iter().map(SetLike::Combination))
                .collect();
            for x in &items {
                assert_eq!(f.overlap(x, x), x.cardinality());
                for y in &items {
                    let expected = brute_force_overlap(x.elems(), y.elems());
                    assert_eq!(f.overlap(x, y), expected, "{} / {}", x.name(), y.name());
                    assert_eq!(f.overlap(x, y), f.overlap(y, x));
                }
            }
        }
    }
}
