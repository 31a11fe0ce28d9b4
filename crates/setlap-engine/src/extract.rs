//! Extraction of sets and distinct combinations from tagged elements.
//!
//! Elements expose the names of the groups they belong to through an
//! accessor. [`extract_sets`] groups them in one pass. [`extract_combinations`]
//! additionally keys every element by its exact membership, which yields the
//! distinct intersections without any search, and can aggregate those upward
//! through the containment poset to obtain full intersections.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, info};

use setlap_core::order::{postprocess_combinations, postprocess_sets};
use setlap_core::{
    combination_name, CombinationType, GenerateOptions, Result, Set, SetCombination, SetIndices,
    SetPostprocess, SortKey, Universe,
};

use crate::generate::generate_combinations_incremental;

/// Membership signature of one element: ascending base set positions.
type MembershipKey = SmallVec<[usize; 4]>;

/// Groups elements into sets by the names the accessor reports.
///
/// Sets appear in first-seen order and keep their elements in input order.
/// A name reported twice for the same element counts once.
///
/// # Example
///
/// ```
/// use setlap_engine::extract_sets;
///
/// let elems = vec![("x", vec!["A", "B"]), ("y", vec!["B"])];
/// let sets = extract_sets(&elems, |e| e.1.clone());
/// assert_eq!(sets.len(), 2);
/// assert_eq!(sets[0].name(), "A");
/// assert_eq!(sets[1].cardinality(), 2);
/// ```
pub fn extract_sets<E, A, I, S>(elements: &[E], accessor: A) -> Vec<Set<E>>
where
    E: Clone,
    A: Fn(&E) -> I,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<E>)> = Vec::new();
    let mut touched: SmallVec<[usize; 8]> = SmallVec::new();

    for elem in elements {
        touched.clear();
        for name in accessor(elem) {
            let name = name.as_ref();
            let slot = match slots.get(name) {
                Some(&slot) => slot,
                None => {
                    slots.insert(name.to_string(), groups.len());
                    groups.push((name.to_string(), Vec::new()));
                    groups.len() - 1
                }
            };
            if touched.contains(&slot) {
                continue;
            }
            touched.push(slot);
            groups[slot].1.push(elem.clone());
        }
    }

    groups
        .into_iter()
        .map(|(name, elems)| Set::new(name, elems))
        .collect()
}

/// Like [`extract_sets`], followed by ordering and truncation.
pub fn extract_sets_with<E, A, I, S>(
    elements: &[E],
    accessor: A,
    postprocess: &SetPostprocess,
) -> Vec<Set<E>>
where
    E: Clone,
    A: Fn(&E) -> I,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    postprocess_sets(extract_sets(elements, accessor), postprocess)
}

/// Options for [`extract_combinations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Combination semantics.
    pub kind: CombinationType,
    /// Ordering and limit applied to the extracted sets.
    pub sets: SetPostprocess,
    /// Comparator chain applied to the combinations.
    pub order: Vec<SortKey>,
    /// Keep at most this many combinations.
    pub limit: Option<usize>,
    /// Replaces the type's default joiner in generated names.
    pub joiner: Option<String>,
    /// Also emit `()` with the elements that belong to no set.
    pub empty: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            kind: CombinationType::Intersection,
            sets: SetPostprocess::default(),
            order: Vec::new(),
            limit: None,
            joiner: None,
            empty: false,
        }
    }
}

impl ExtractOptions {
    pub fn new(kind: CombinationType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_sets(mut self, sets: SetPostprocess) -> Self {
        self.sets = sets;
        self
    }

    pub fn with_order(mut self, key: SortKey) -> Self {
        self.order.push(key);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_joiner(mut self, joiner: impl Into<String>) -> Self {
        self.joiner = Some(joiner.into());
        self
    }

    pub fn with_empty(mut self, empty: bool) -> Self {
        self.empty = empty;
        self
    }

    fn joiner(&self) -> &str {
        self.joiner
            .as_deref()
            .unwrap_or_else(|| self.kind.default_joiner())
    }
}

/// Sets and combinations produced by [`extract_combinations`].
#[derive(Debug, Clone)]
pub struct Extracted<E> {
    pub sets: Vec<Set<E>>,
    pub combinations: Vec<SetCombination<E>>,
}

/// Extracts sets and combinations in one call.
///
/// Sets are extracted with [`extract_sets_with`] using `options.sets`; see
/// [`extract_combinations_with_sets`] for the combination semantics.
pub fn extract_combinations<E, A, I, S>(
    elements: &[E],
    accessor: A,
    options: &ExtractOptions,
) -> Result<Extracted<E>>
where
    E: Clone + Eq + Hash,
    A: Fn(&E) -> I,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let sets = extract_sets_with(elements, &accessor, &options.sets);
    extract_combinations_with_sets(elements, accessor, sets, options)
}

/// Extracts combinations over caller-provided sets.
///
/// Group names that match none of `sets` are ignored.
///
/// - `DistinctIntersection`: each element lands in exactly one combination,
///   the one matching its full membership.
/// - `Intersection` / `Composite`: the distinct combinations are aggregated
///   through the containment poset, so `A` ends up with the elements of `A`,
///   `(A ∩ B)`, `(A ∩ B ∩ C)` and so on.
/// - `Union`: no distinct shortcut exists; the incremental generator runs.
pub fn extract_combinations_with_sets<E, A, I, S>(
    elements: &[E],
    accessor: A,
    sets: Vec<Set<E>>,
    options: &ExtractOptions,
) -> Result<Extracted<E>>
where
    E: Clone + Eq + Hash,
    A: Fn(&E) -> I,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if options.kind == CombinationType::Union {
        let generate = GenerateOptions {
            kind: CombinationType::Union,
            min: if options.empty { 0 } else { 1 },
            max: None,
            empty: options.empty,
            order: options.order.clone(),
            limit: options.limit,
            joiner: options.joiner.clone(),
            strict: false,
        };
        let combinations =
            generate_combinations_incremental(&sets, &generate, Universe::Elems(elements))?;
        return Ok(Extracted { sets, combinations });
    }

    let combinations = {
        let index: HashMap<&str, usize> = sets
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name(), i))
            .collect();
        let membership = |elem: &E| -> MembershipKey {
            accessor(elem)
                .into_iter()
                .filter_map(|name| index.get(name.as_ref()).copied())
                .collect()
        };
        combinations_by_membership(elements, membership, &sets, options)
    };
    Ok(Extracted { sets, combinations })
}

/// Extracts combinations of already grouped sets over the element universe.
///
/// Memberships are read back from `sets`, so this also serves `Composite`,
/// which the generators reject. The degree range and `strict` flag of
/// `options` apply before ordering and the limit, as they do for
/// generation. Elements of `sets` missing from `universe` are not counted.
///
/// # Errors
///
/// Returns [`SetlapError::InvalidRange`](setlap_core::SetlapError::InvalidRange)
/// for an empty degree range in strict mode.
pub fn extract_combinations_from_sets<E>(
    sets: &[Set<E>],
    options: &GenerateOptions,
    universe: &[E],
) -> Result<Vec<SetCombination<E>>>
where
    E: Clone + Eq + Hash,
{
    if !options.check_range()? {
        return Ok(Vec::new());
    }
    if options.kind == CombinationType::Union {
        return generate_combinations_incremental(sets, options, Universe::Elems(universe));
    }

    let mut membership: HashMap<&E, MembershipKey> = HashMap::new();
    for (i, set) in sets.iter().enumerate() {
        for elem in set.elems() {
            membership.entry(elem).or_default().push(i);
        }
    }
    let extract = ExtractOptions {
        kind: options.kind,
        joiner: options.joiner.clone(),
        empty: options.empty && options.min == 0,
        ..ExtractOptions::default()
    };
    let max = options.max_degree(sets.len());
    let combinations = combinations_by_membership(
        universe,
        |elem| membership.get(elem).cloned().unwrap_or_default(),
        sets,
        &extract,
    )
    .into_iter()
    .filter(|c| (options.min..=max).contains(&c.degree()))
    .collect();
    Ok(postprocess_combinations(combinations, &options.order, options.limit))
}

/// Keys every element by its membership and builds the combinations.
///
/// `membership` may report positions unsorted or repeated.
fn combinations_by_membership<E, K>(
    elements: &[E],
    membership: K,
    sets: &[Set<E>],
    options: &ExtractOptions,
) -> Vec<SetCombination<E>>
where
    E: Clone + Eq + Hash,
    K: Fn(&E) -> MembershipKey,
{
    let start = Instant::now();

    let mut slots: HashMap<MembershipKey, usize> = HashMap::new();
    let mut distinct: Vec<(MembershipKey, Vec<E>)> = Vec::new();
    let mut outside: Vec<E> = Vec::new();
    for elem in elements {
        let mut key = membership(elem);
        key.sort_unstable();
        key.dedup();
        if key.is_empty() {
            outside.push(elem.clone());
            continue;
        }
        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                slots.insert(key.clone(), distinct.len());
                distinct.push((key, Vec::new()));
                distinct.len() - 1
            }
        };
        distinct[slot].1.push(elem.clone());
    }

    debug!(
        event = "distinct_extracted",
        elements = elements.len(),
        signatures = distinct.len(),
        outside = outside.len(),
    );

    let joiner = options.joiner();
    let mut entries: Vec<(MembershipKey, Vec<E>)> = match options.kind {
        CombinationType::DistinctIntersection => distinct,
        _ => aggregate_poset(distinct),
    };
    entries.sort_by(|a, b| colex_cmp(&a.0, &b.0));

    let mut combinations = Vec::with_capacity(entries.len() + 1);
    if options.empty {
        combinations.push(SetCombination::new(
            combination_name(Vec::<&str>::new(), joiner),
            options.kind,
            SetIndices::new(),
            outside,
        ));
    }
    combinations.extend(entries.into_iter().map(|(key, elems)| {
        SetCombination::named(
            options.kind,
            key.into_iter().collect(),
            sets,
            elems,
            Some(joiner),
        )
    }));

    let combinations = postprocess_combinations(combinations, &options.order, options.limit);

    info!(
        event = "extract_end",
        kind = %options.kind,
        sets = sets.len(),
        combinations = combinations.len(),
        duration_ms = start.elapsed().as_millis() as u64,
    );

    combinations
}

struct PosetNode<E> {
    key: MembershipKey,
    elems: Vec<E>,
    children: Vec<usize>,
}

/// Turns distinct intersections into full intersections.
///
/// Every key of degree two or more gets its one-smaller subsets as parents,
/// created empty when missing. Each node then collects the elements of all
/// descendants, visiting a descendant reachable by several paths once.
fn aggregate_poset<E: Clone>(
    distinct: Vec<(MembershipKey, Vec<E>)>,
) -> Vec<(MembershipKey, Vec<E>)> {
    let mut index: HashMap<MembershipKey, usize> = HashMap::new();
    let mut nodes: Vec<PosetNode<E>> = Vec::with_capacity(distinct.len());
    for (key, elems) in distinct {
        index.insert(key.clone(), nodes.len());
        nodes.push(PosetNode {
            key,
            elems,
            children: Vec::new(),
        });
    }

    // created parents are appended and linked in turn
    let mut next = 0;
    while next < nodes.len() {
        let key = nodes[next].key.clone();
        if key.len() >= 2 {
            for skip in 0..key.len() {
                let parent_key: MembershipKey = key
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != skip)
                    .map(|(_, &s)| s)
                    .collect();
                let parent = match index.get(&parent_key) {
                    Some(&parent) => parent,
                    None => {
                        index.insert(parent_key.clone(), nodes.len());
                        nodes.push(PosetNode {
                            key: parent_key,
                            elems: Vec::new(),
                            children: Vec::new(),
                        });
                        nodes.len() - 1
                    }
                };
                nodes[parent].children.push(next);
            }
        }
        next += 1;
    }

    let mut visited: HashSet<usize> = HashSet::new();
    let mut stack: Vec<usize> = Vec::new();
    let aggregated: Vec<Vec<E>> = (0..nodes.len())
        .map(|node| {
            visited.clear();
            stack.clear();
            stack.extend(nodes[node].children.iter().copied());

            let mut elems = nodes[node].elems.clone();
            while let Some(child) = stack.pop() {
                if !visited.insert(child) {
                    continue;
                }
                elems.extend(nodes[child].elems.iter().cloned());
                stack.extend(nodes[child].children.iter().copied());
            }
            elems
        })
        .collect();

    nodes
        .into_iter()
        .zip(aggregated)
        .map(|(node, elems)| (node.key, elems))
        .collect()
}

/// Orders ascending index lists the way the power-set counter emits them.
///
/// The list whose largest differing member is smaller comes first.
pub(crate) fn colex_cmp(a: &[usize], b: &[usize]) -> std::cmp::Ordering {
    let mut a = a.iter().rev();
    let mut b = b.iter().rev();
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) if x == y => continue,
            (Some(x), Some(y)) => return x.cmp(y),
            (Some(_), None) => return std::cmp::Ordering::Greater,
            (None, Some(_)) => return std::cmp::Ordering::Less,
            (None, None) => return std::cmp::Ordering::Equal,
        }
    }
}
