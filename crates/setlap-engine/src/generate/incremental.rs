//! Degree-by-degree generation from pairwise merges.
//!
//! Elements are first mapped to dense ids. A node holds the ids of one
//! combination together with a hash set of them. Nodes sharing all but their
//! last member set are siblings; merging two siblings yields a node one degree
//! higher, and the merged nodes of one parent form the next sibling group.
//! A group with fewer than two nodes cannot produce anything and ends the
//! branch.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::time::Instant;

use tracing::{debug, info, trace};

use setlap_core::order::postprocess_combinations;
use setlap_core::{CombinationType, GenerateOptions, Result, Set, SetCombination, Universe};

use super::{check_options, empty_combination, retain};
use crate::extract::colex_cmp;

struct Node {
    sets: Vec<usize>,
    ids: Vec<usize>,
    lookup: HashSet<usize>,
}

impl Node {
    fn new(sets: Vec<usize>, ids: Vec<usize>) -> Self {
        let lookup = ids.iter().copied().collect();
        Self { sets, ids, lookup }
    }

    fn extended(&self, other: &Node) -> Vec<usize> {
        let mut sets = self.sets.clone();
        sets.extend(other.sets.last().copied());
        sets
    }

    /// The smaller operand scans the larger one's lookup.
    fn intersect(&self, other: &Node) -> Node {
        let (small, large) = if self.ids.len() <= other.ids.len() {
            (self, other)
        } else {
            (other, self)
        };
        let ids: Vec<usize> = small
            .ids
            .iter()
            .copied()
            .filter(|id| large.lookup.contains(id))
            .collect();
        Node::new(self.extended(other), ids)
    }

    fn unite(&self, other: &Node) -> Node {
        let (small, large) = if self.ids.len() < other.ids.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut ids = large.ids.clone();
        let mut lookup = large.lookup.clone();
        for &id in &small.ids {
            if lookup.insert(id) {
                ids.push(id);
            }
        }
        Node {
            sets: self.extended(other),
            ids,
            lookup,
        }
    }
}

struct Builder<'a, T> {
    sets: &'a [Set<T>],
    options: &'a GenerateOptions,
    max: usize,
    elems: Vec<&'a T>,
    /// Number of base sets containing each element id.
    memberships: Vec<usize>,
    output: Vec<SetCombination<T>>,
    merges: usize,
    pruned: usize,
}

impl<'a, T: Clone + Eq + Hash> Builder<'a, T> {
    fn new(sets: &'a [Set<T>], options: &'a GenerateOptions) -> (Self, Vec<Node>) {
        let mut ids: HashMap<&'a T, usize> = HashMap::new();
        let mut elems: Vec<&'a T> = Vec::new();
        let mut memberships: Vec<usize> = Vec::new();
        let mut roots = Vec::with_capacity(sets.len());

        for (i, set) in sets.iter().enumerate() {
            let mut set_ids = Vec::with_capacity(set.cardinality());
            for e in set.elems() {
                let id = *ids.entry(e).or_insert_with(|| {
                    elems.push(e);
                    memberships.push(0);
                    elems.len() - 1
                });
                set_ids.push(id);
            }
            let node = Node::new(vec![i], set_ids);
            for &id in &node.lookup {
                memberships[id] += 1;
            }
            roots.push(node);
        }

        let builder = Self {
            sets,
            options,
            max: options.max_degree(sets.len()),
            elems,
            memberships,
            output: Vec::new(),
            merges: 0,
            pruned: 0,
        };
        (builder, roots)
    }

    fn is_union(&self) -> bool {
        self.options.kind == CombinationType::Union
    }

    /// Supersets of an empty intersection are empty as well.
    fn prunable(&self, node: &Node) -> bool {
        !self.is_union() && !self.options.empty && node.ids.is_empty()
    }

    fn emit(&mut self, node: &Node) {
        let degree = node.sets.len();
        if degree < self.options.min || degree > self.max {
            return;
        }
        let elems: Vec<T> = match self.options.kind {
            CombinationType::DistinctIntersection => node
                .ids
                .iter()
                .filter(|&&id| self.memberships[id] == degree)
                .map(|&id| self.elems[id].clone())
                .collect(),
            _ => node.ids.iter().map(|&id| self.elems[id].clone()).collect(),
        };
        if !retain(self.options, elems.len()) {
            return;
        }
        let combination = SetCombination::named(
            self.options.kind,
            node.sets.iter().copied().collect(),
            self.sets,
            elems,
            Some(self.options.joiner()),
        );
        trace!(
            event = "combination",
            name = combination.name(),
            degree = degree,
            cardinality = combination.cardinality(),
        );
        self.output.push(combination);
    }

    fn merge(&mut self, a: &Node, b: &Node) -> Node {
        self.merges += 1;
        if self.is_union() {
            a.unite(b)
        } else {
            a.intersect(b)
        }
    }

    /// Expands a sibling group of degree `degree`.
    fn expand(&mut self, siblings: &[Node], degree: usize) {
        if degree >= self.max {
            return;
        }
        for (i, node) in siblings.iter().enumerate() {
            let mut children = Vec::with_capacity(siblings.len() - i - 1);
            for other in &siblings[i + 1..] {
                let child = self.merge(node, other);
                if self.prunable(&child) {
                    self.pruned += 1;
                    continue;
                }
                self.emit(&child);
                children.push(child);
            }
            if children.len() >= 2 {
                self.expand(&children, degree + 1);
            }
        }
    }
}

/// Generates combinations by merging lower-degree results.
///
/// Produces the same combinations (names, degrees, cardinalities and element
/// sets) in the same order as
/// [`generate_combinations`](super::generate_combinations). Element order
/// within a combination may differ. Unlike the direct generator there is no
/// limit on the number of base sets; the work is bounded by the number of
/// non-empty intersections instead.
///
/// # Errors
///
/// Fails like [`generate_combinations`](super::generate_combinations) except
/// for the base set limit.
pub fn generate_combinations_incremental<T>(
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
    let (mut builder, roots) = Builder::new(sets, options);

    let mut candidates = Vec::with_capacity(roots.len());
    for root in roots {
        if builder.prunable(&root) {
            builder.pruned += 1;
            continue;
        }
        builder.emit(&root);
        candidates.push(root);
    }
    if candidates.len() >= 2 {
        builder.expand(&candidates, 1);
    }

    debug!(
        event = "incremental_stats",
        elements = builder.elems.len(),
        merges = builder.merges,
        pruned = builder.pruned,
    );

    let mut combinations = builder.output;
    combinations.sort_by(|a, b| {
        let a: Vec<usize> = a.sets().iter().copied().collect();
        let b: Vec<usize> = b.sets().iter().copied().collect();
        colex_cmp(&a, &b)
    });
    if let Some(empty) = empty_combination(sets, options, universe) {
        combinations.insert(0, empty);
    }

    let combinations = postprocess_combinations(combinations, &options.order, options.limit);
    info!(
        event = "generate_end",
        algorithm = "incremental",
        kind = %options.kind,
        sets = sets.len(),
        combinations = combinations.len(),
        duration_ms = start.elapsed().as_millis() as u64,
    );
    Ok(combinations)
}
