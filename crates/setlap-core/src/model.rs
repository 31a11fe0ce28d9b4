//! Data model: sets, combinations and the set-like sum type.
//!
//! Base sets live in a caller-owned slice. A [`SetCombination`] refers to the
//! sets it is built from through [`SetIndices`], positions into that slice,
//! so combinations never own or outlive their base sets.

use std::collections::BTreeSet;
use std::fmt;

/// Positions of base sets within the slice a combination was generated from.
pub type SetIndices = BTreeSet<usize>;

/// The semantic type of a [`SetCombination`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CombinationType {
    /// Elements contained in every member set.
    #[default]
    Intersection,

    /// Elements contained in at least one member set.
    Union,

    /// Elements whose exact membership is the member sets.
    DistinctIntersection,

    /// An arbitrary caller-defined grouping of member sets.
    Composite,
}

impl CombinationType {
    /// Joiner placed between member names in generated combination names.
    pub fn default_joiner(self) -> &'static str {
        match self {
            CombinationType::Union => " ∪ ",
            CombinationType::Intersection
            | CombinationType::DistinctIntersection
            | CombinationType::Composite => " ∩ ",
        }
    }

    /// Returns the wire name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            CombinationType::Intersection => "intersection",
            CombinationType::Union => "union",
            CombinationType::DistinctIntersection => "distinctIntersection",
            CombinationType::Composite => "composite",
        }
    }
}

impl fmt::Display for CombinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a set-like value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetLikeKind {
    /// A base set.
    Set,
    /// A derived combination of the given type.
    Combination(CombinationType),
}

impl fmt::Display for SetLikeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetLikeKind::Set => f.write_str("set"),
            SetLikeKind::Combination(kind) => kind.fmt(f),
        }
    }
}

/// Derived identity of a set-like value.
///
/// Two set-likes with the same key are treated as the same group by the
/// overlap machinery, even when they are distinct values in memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SetLikeKey {
    /// A base set, identified by its unique name.
    Set(String),
    /// A combination, identified by its type and member sets.
    Combination {
        kind: CombinationType,
        sets: SetIndices,
    },
}

/// Shared read-only interface of everything that behaves like a set.
pub trait SetLikeInfo {
    /// Display name.
    fn name(&self) -> &str;

    /// Number of elements.
    fn cardinality(&self) -> usize;

    /// Variant discriminant.
    fn kind(&self) -> SetLikeKind;

    /// Derived identity used for lookups.
    fn key(&self) -> SetLikeKey;

    /// Optional display color.
    fn color(&self) -> Option<&str> {
        None
    }
}

/// Builds the canonical name of a combination from its member names.
///
/// A single member keeps its own name, no members yield `()`, and several
/// members are wrapped as `(A ∩ B ∩ C)` using `joiner`.
///
/// # Example
///
/// ```
/// use setlap_core::model::combination_name;
///
/// assert_eq!(combination_name(["A"], " ∩ "), "A");
/// assert_eq!(combination_name(["A", "B"], " ∩ "), "(A ∩ B)");
/// assert_eq!(combination_name(Vec::<&str>::new(), " ∩ "), "()");
/// ```
pub fn combination_name<I, S>(names: I, joiner: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names: Vec<S> = names.into_iter().collect();
    match names.as_slice() {
        [single] => single.as_ref().to_string(),
        _ => {
            let joined: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
            format!("({})", joined.join(joiner))
        }
    }
}

/// A named group of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Set<T> {
    name: String,
    elems: Vec<T>,
    color: Option<String>,
}

impl<T> Set<T> {
    /// Creates a set from its name and elements.
    pub fn new(name: impl Into<String>, elems: Vec<T>) -> Self {
        Self {
            name: name.into(),
            elems,
            color: None,
        }
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elems(&self) -> &[T] {
        &self.elems
    }

    pub fn cardinality(&self) -> usize {
        self.elems.len()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

impl<T> SetLikeInfo for Set<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn cardinality(&self) -> usize {
        self.elems.len()
    }

    fn kind(&self) -> SetLikeKind {
        SetLikeKind::Set
    }

    fn key(&self) -> SetLikeKey {
        SetLikeKey::Set(self.name.clone())
    }

    fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

/// A group derived from one or more base sets.
#[derive(Debug, Clone, PartialEq)]
pub struct SetCombination<T> {
    name: String,
    kind: CombinationType,
    sets: SetIndices,
    elems: Vec<T>,
    color: Option<String>,
}

impl<T> SetCombination<T> {
    /// Creates a combination over the given base set positions.
    pub fn new(
        name: impl Into<String>,
        kind: CombinationType,
        sets: SetIndices,
        elems: Vec<T>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            sets,
            elems,
            color: None,
        }
    }

    /// Creates a combination named by the canonical naming rule.
    ///
    /// Member names are taken from `base` in position order.
    pub fn named(
        kind: CombinationType,
        sets: SetIndices,
        base: &[Set<T>],
        elems: Vec<T>,
        joiner: Option<&str>,
    ) -> Self {
        let joiner = joiner.unwrap_or_else(|| kind.default_joiner());
        let name = combination_name(
            sets.iter().filter_map(|&i| base.get(i)).map(Set::name),
            joiner,
        );
        Self::new(name, kind, sets, elems)
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn combination_type(&self) -> CombinationType {
        self.kind
    }

    /// Positions of the member sets.
    pub fn sets(&self) -> &SetIndices {
        &self.sets
    }

    /// Number of member sets.
    pub fn degree(&self) -> usize {
        self.sets.len()
    }

    pub fn elems(&self) -> &[T] {
        &self.elems
    }

    pub fn cardinality(&self) -> usize {
        self.elems.len()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Consumes the combination, returning its elements.
    pub fn into_elems(self) -> Vec<T> {
        self.elems
    }
}

impl<T> SetLikeInfo for SetCombination<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn cardinality(&self) -> usize {
        self.elems.len()
    }

    fn kind(&self) -> SetLikeKind {
        SetLikeKind::Combination(self.kind)
    }

    fn key(&self) -> SetLikeKey {
        SetLikeKey::Combination {
            kind: self.kind,
            sets: self.sets.clone(),
        }
    }

    fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

/// Borrowed view of either a base set or a combination.
#[derive(Debug)]
pub enum SetLike<'a, T> {
    Set(&'a Set<T>),
    Combination(&'a SetCombination<T>),
}

impl<T> Clone for SetLike<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SetLike<'_, T> {}

impl<'a, T> SetLike<'a, T> {
    pub fn elems(&self) -> &'a [T] {
        match self {
            SetLike::Set(s) => s.elems(),
            SetLike::Combination(c) => c.elems(),
        }
    }

    /// Returns true if both views point at the same value.
    pub fn same_as(&self, other: &SetLike<'_, T>) -> bool {
        match (self, other) {
            (SetLike::Set(a), SetLike::Set(b)) => std::ptr::eq(*a, *b),
            (SetLike::Combination(a), SetLike::Combination(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl<'a, T> From<&'a Set<T>> for SetLike<'a, T> {
    fn from(set: &'a Set<T>) -> Self {
        SetLike::Set(set)
    }
}

impl<'a, T> From<&'a SetCombination<T>> for SetLike<'a, T> {
    fn from(combination: &'a SetCombination<T>) -> Self {
        SetLike::Combination(combination)
    }
}

impl<T> SetLikeInfo for SetLike<'_, T> {
    fn name(&self) -> &str {
        match self {
            SetLike::Set(s) => s.name(),
            SetLike::Combination(c) => c.name(),
        }
    }

    fn cardinality(&self) -> usize {
        self.elems().len()
    }

    fn kind(&self) -> SetLikeKind {
        match self {
            SetLike::Set(_) => SetLikeKind::Set,
            SetLike::Combination(c) => SetLikeKind::Combination(c.combination_type()),
        }
    }

    fn key(&self) -> SetLikeKey {
        match self {
            SetLike::Set(s) => SetLikeInfo::key(*s),
            SetLike::Combination(c) => SetLikeInfo::key(*c),
        }
    }

    fn color(&self) -> Option<&str> {
        match self {
            SetLike::Set(s) => s.color(),
            SetLike::Combination(c) => c.color(),
        }
    }
}

/// Collects `indices` into a [`SetIndices`].
pub fn set_indices(indices: impl IntoIterator<Item = usize>) -> SetIndices {
    indices.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_combination_follows_position_order() {
        let base = vec![
            Set::new("B", vec![1, 2]),
            Set::new("A", vec![2, 3]),
            Set::new("C", vec![2]),
        ];
        let c = SetCombination::named(
            CombinationType::Intersection,
            set_indices([2, 0]),
            &base,
            vec![2],
            None,
        );
        assert_eq!(c.name(), "(B ∩ C)");
        assert_eq!(c.degree(), 2);
        assert_eq!(c.cardinality(), 1);

        let u = SetCombination::named(
            CombinationType::Union,
            set_indices([0, 1]),
            &base,
            vec![1, 2, 3],
            Some(" | "),
        );
        assert_eq!(u.name(), "(B | A)");
    }

    #[test]
    fn test_single_member_keeps_set_name() {
        let base = vec![Set::new("A", vec![1])];
        let c = SetCombination::named(
            CombinationType::Union,
            set_indices([0]),
            &base,
            vec![1],
            None,
        );
        assert_eq!(c.name(), "A");
    }

    #[test]
    fn test_keys_distinguish_kinds() {
        let set = Set::new("A", vec![1, 2]);
        let inter = SetCombination::new(
            "A",
            CombinationType::Intersection,
            set_indices([0]),
            vec![1, 2],
        );
        let distinct = SetCombination::new(
            "A",
            CombinationType::DistinctIntersection,
            set_indices([0]),
            vec![1],
        );

        assert_eq!(SetLikeInfo::key(&set), SetLikeKey::Set("A".into()));
        assert_ne!(SetLikeInfo::key(&inter), SetLikeInfo::key(&distinct));
        assert_eq!(
            SetLike::from(&inter).kind(),
            SetLikeKind::Combination(CombinationType::Intersection)
        );
        assert_eq!(SetLike::from(&set).kind().to_string(), "set");
    }

    #[test]
    fn test_same_as_uses_identity() {
        let a = Set::new("A", vec![1]);
        let b = Set::new("A", vec![1]);
        assert!(SetLike::from(&a).same_as(&SetLike::from(&a)));
        assert!(!SetLike::from(&a).same_as(&SetLike::from(&b)));
    }
}
