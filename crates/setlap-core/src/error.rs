//! Error types for setlap.

use thiserror::Error;

use crate::model::CombinationType;

/// Main error type for set and combination operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetlapError {
    /// The power set of this many items cannot be enumerated.
    #[error("Too many base sets: {count} exceeds the power set limit of {limit}")]
    TooManySets { count: usize, limit: usize },

    /// The requested degree range is empty.
    #[error("Invalid degree range: min {min} > max {max}")]
    InvalidRange { min: usize, max: usize },

    /// The operation cannot produce combinations of this type.
    #[error("Unsupported combination type for this operation: {0}")]
    UnsupportedCombinationType(CombinationType),

    /// An index points outside the referenced collection.
    #[error("Index {index} out of range for {what} of length {len}")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A compressed index string could not be parsed.
    #[error("Malformed index token '{0}'")]
    MalformedIndices(String),

    /// A sort key string could not be parsed.
    #[error("Invalid sort key '{0}'")]
    InvalidSortKey(String),

    /// A set name could not be resolved.
    #[error("Unknown set: {0}")]
    UnknownSet(String),

    /// A serialized snapshot is structurally invalid.
    #[error("Invalid dump: {0}")]
    InvalidDump(String),
}

/// Result type alias for setlap operations.
pub type Result<T> = std::result::Result<T, SetlapError>;
