//! setlap core - data model and shared building blocks
//!
//! This crate provides the fundamental pieces used by the setlap engine:
//! - The set / combination data model and the set-like sum type
//! - Lazy power-set enumeration
//! - Ordering and limiting of generated results
//! - Compact encodings for element index sequences

pub mod codec;
pub mod error;
pub mod model;
pub mod options;
pub mod order;
pub mod powerset;

pub use codec::{Compress, CountsArray, IndicesArray};
pub use error::{Result, SetlapError};
pub use model::{
    combination_name, set_indices, CombinationType, Set, SetCombination, SetIndices, SetLike,
    SetLikeInfo, SetLikeKey, SetLikeKind,
};
pub use options::{Algorithm, GenerateOptions, OverlapMetric, Universe};
pub use order::{SetPostprocess, SortDirection, SortField, SortKey};
pub use powerset::{power_set, PowerSet, PowerSetIndices, MAX_POWER_SET_ITEMS};
