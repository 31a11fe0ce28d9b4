//! Ordering and limiting of sets and combinations.
//!
//! Sort keys form a comparator chain evaluated left to right; the first
//! non-equal comparison decides. Sorting is stable, so ties keep the
//! relative order produced by the generator.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::SetlapError;
use crate::model::{Set, SetCombination, SetLikeInfo};

/// Attribute a sort key compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Number of elements.
    Cardinality,
    /// Lexicographic name.
    Name,
    /// Number of member sets.
    Degree,
    /// Position of the first member set in the base set ordering.
    Group,
}

impl SortField {
    fn default_direction(self) -> SortDirection {
        match self {
            SortField::Cardinality => SortDirection::Desc,
            SortField::Name | SortField::Degree | SortField::Group => SortDirection::Asc,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SortField::Cardinality => "cardinality",
            SortField::Name => "name",
            SortField::Degree => "degree",
            SortField::Group => "group",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One link of the comparator chain.
///
/// Parses from and formats to `field[:asc|:desc]`, e.g. `"cardinality:desc"`
/// or `"name"`. Without a direction, cardinality sorts descending and every
/// other field ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn cardinality() -> Self {
        Self::new(SortField::Cardinality, SortDirection::Desc)
    }

    pub fn name() -> Self {
        Self::new(SortField::Name, SortDirection::Asc)
    }

    pub fn degree() -> Self {
        Self::new(SortField::Degree, SortDirection::Asc)
    }

    pub fn group() -> Self {
        Self::new(SortField::Group, SortDirection::Asc)
    }

    /// Returns this key with the opposite direction.
    pub fn reversed(self) -> Self {
        let direction = match self.direction {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        };
        Self { direction, ..self }
    }

    fn compare<X: SetLikeInfo>(&self, a: &Ranked<X>, b: &Ranked<X>) -> Ordering {
        let ordering = match self.field {
            SortField::Cardinality => a.item.cardinality().cmp(&b.item.cardinality()),
            SortField::Name => a.item.name().cmp(b.item.name()),
            SortField::Degree => a.degree.cmp(&b.degree),
            SortField::Group => match (a.group, b.group) {
                (Some(x), Some(y)) => x.cmp(&y),
                // no matching set sorts last in either direction
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", self.field.as_str(), direction)
    }
}

impl FromStr for SortKey {
    type Err = SetlapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.trim().split_once(':') {
            Some((field, direction)) => (field, Some(direction)),
            None => (s.trim(), None),
        };
        let field = match field {
            "cardinality" => SortField::Cardinality,
            "name" => SortField::Name,
            "degree" => SortField::Degree,
            "group" => SortField::Group,
            _ => return Err(SetlapError::InvalidSortKey(s.to_string())),
        };
        let direction = match direction {
            None => field.default_direction(),
            Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(_) => return Err(SetlapError::InvalidSortKey(s.to_string())),
        };
        Ok(Self { field, direction })
    }
}

impl TryFrom<String> for SortKey {
    type Error = SetlapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.to_string()
    }
}

/// Ordering and truncation applied after extraction or generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetPostprocess {
    /// Comparator chain; empty keeps the input order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub order: Vec<SortKey>,

    /// Keep at most this many items after sorting.
    #[cfg_attr(feature = "serde", serde(default))]
    pub limit: Option<usize>,
}

impl SetPostprocess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, key: SortKey) -> Self {
        self.order.push(key);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

struct Ranked<X> {
    item: X,
    degree: usize,
    group: Option<usize>,
}

fn sort_and_limit<X: SetLikeInfo>(
    mut ranked: Vec<Ranked<X>>,
    order: &[SortKey],
    limit: Option<usize>,
) -> Vec<X> {
    if !order.is_empty() {
        ranked.sort_by(|a, b| {
            order
                .iter()
                .map(|key| key.compare(a, b))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked.into_iter().map(|r| r.item).collect()
}

/// Sorts and truncates base sets.
///
/// A set's group is its position in `sets`; its degree is 1.
pub fn postprocess_sets<T>(sets: Vec<Set<T>>, options: &SetPostprocess) -> Vec<Set<T>> {
    let ranked = sets
        .into_iter()
        .enumerate()
        .map(|(i, item)| Ranked {
            item,
            degree: 1,
            group: Some(i),
        })
        .collect();
    sort_and_limit(ranked, &options.order, options.limit)
}

/// Sorts and truncates combinations.
///
/// A combination's group is its lowest member set position.
pub fn postprocess_combinations<T>(
    combinations: Vec<SetCombination<T>>,
    order: &[SortKey],
    limit: Option<usize>,
) -> Vec<SetCombination<T>> {
    let ranked = combinations
        .into_iter()
        .map(|item| Ranked {
            degree: item.degree(),
            group: item.sets().iter().next().copied(),
            item,
        })
        .collect();
    sort_and_limit(ranked, order, limit)
}
