//! Options shared by the combination generators.

use crate::error::{Result, SetlapError};
use crate::model::CombinationType;
use crate::order::SortKey;

/// Which generator computes the combinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Algorithm {
    /// Enumerate the power set and test membership per subset.
    Direct,
    /// Build degree by degree from pairwise merges of the previous degree.
    #[default]
    Incremental,
}

/// Quantity stored in an overlap matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverlapMetric {
    /// `|a ∩ b|`
    #[default]
    Intersection,
    /// `|a ∪ b|`
    Union,
}

impl OverlapMetric {
    /// Derives the metric from both cardinalities and their overlap.
    pub fn apply(self, a: usize, b: usize, overlap: usize) -> usize {
        match self {
            OverlapMetric::Intersection => overlap,
            OverlapMetric::Union => (a + b).saturating_sub(overlap),
        }
    }
}

/// Options for combination generation.
///
/// These options are element-free so they can be stored in dumps and
/// config files; the element universe for the `()` combination is passed
/// separately as a [`Universe`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct GenerateOptions {
    /// Combination semantics.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: CombinationType,

    /// Minimum degree (inclusive).
    pub min: usize,

    /// Maximum degree (inclusive); `None` means the number of base sets.
    pub max: Option<usize>,

    /// Keep combinations without elements.
    pub empty: bool,

    /// Comparator chain applied to the result.
    pub order: Vec<SortKey>,

    /// Keep at most this many combinations after sorting.
    pub limit: Option<usize>,

    /// Replaces the type's default joiner in generated names.
    pub joiner: Option<String>,

    /// Report an invalid degree range as an error instead of an empty result.
    pub strict: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            kind: CombinationType::Intersection,
            min: 0,
            max: None,
            empty: false,
            order: Vec::new(),
            limit: None,
            joiner: None,
            strict: false,
        }
    }
}

impl GenerateOptions {
    pub fn new(kind: CombinationType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn intersection() -> Self {
        Self::new(CombinationType::Intersection)
    }

    pub fn union() -> Self {
        Self::new(CombinationType::Union)
    }

    pub fn distinct_intersection() -> Self {
        Self::new(CombinationType::DistinctIntersection)
    }

    pub fn with_min(mut self, min: usize) -> Self {
        self.min = min;
        self
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_empty(mut self, empty: bool) -> Self {
        self.empty = empty;
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

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Joiner used for multi-set names.
    pub fn joiner(&self) -> &str {
        self.joiner
            .as_deref()
            .unwrap_or_else(|| self.kind.default_joiner())
    }

    /// Effective maximum degree for `set_count` base sets.
    pub fn max_degree(&self, set_count: usize) -> usize {
        self.max.map_or(set_count, |max| max.min(set_count))
    }

    /// Checks the degree range.
    ///
    /// Returns `Ok(false)` when the range is empty and the options are not
    /// strict, meaning the result is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`SetlapError::InvalidRange`] for an empty range in strict mode.
    pub fn check_range(&self) -> Result<bool> {
        match self.max {
            Some(max) if self.min > max => {
                if self.strict {
                    Err(SetlapError::InvalidRange { min: self.min, max })
                } else {
                    Ok(false)
                }
            }
            _ => Ok(true),
        }
    }
}

/// Source of the elements that belong to no base set.
#[derive(Debug)]
pub enum Universe<'a, T> {
    /// Nothing is known beyond the base sets.
    Unknown,
    /// All elements; the ones outside every base set are derived.
    Elems(&'a [T]),
    /// The elements outside every base set, given directly.
    NotPartOfAnySet(&'a [T]),
}

impl<T> Clone for Universe<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Universe<'_, T> {}

impl<T> Default for Universe<'_, T> {
    fn default() -> Self {
        Universe::Unknown
    }
}

impl<T> Universe<'_, T> {
    /// Whether the `()` combination was explicitly requested.
    pub fn is_explicit(&self) -> bool {
        matches!(self, Universe::NotPartOfAnySet(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_checks() {
        let options = GenerateOptions::intersection().with_min(3).with_max(2);
        assert_eq!(options.check_range(), Ok(false));
        assert_eq!(
            options.with_strict(true).check_range(),
            Err(SetlapError::InvalidRange { min: 3, max: 2 })
        );
        assert_eq!(GenerateOptions::union().with_min(2).check_range(), Ok(true));
    }

    #[test]
    fn test_joiner_and_max_degree() {
        assert_eq!(GenerateOptions::union().joiner(), " ∪ ");
        assert_eq!(GenerateOptions::union().with_joiner("&").joiner(), "&");
        assert_eq!(GenerateOptions::intersection().max_degree(4), 4);
        assert_eq!(GenerateOptions::intersection().with_max(2).max_degree(4), 2);
        assert_eq!(GenerateOptions::intersection().with_max(9).max_degree(4), 4);
    }
}
