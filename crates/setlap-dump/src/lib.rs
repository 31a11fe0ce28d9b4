//! Serialized snapshots of sets and combinations.
//!
//! Two formats are supported:
//!
//! - [`Dump`]: sets, combinations, the selection and queries with their
//!   elements, stored as indices into a caller-provided element list.
//!   Combinations can be left out and regenerated on load.
//! - [`StaticDump`]: no elements at all. Names, cardinalities and the
//!   pairwise overlap matrix are enough to answer overlap questions after
//!   reload.
//!
//! Loading is lenient below the set level: a combination, selection or query
//! that cannot be reconstructed is reported in the `rejected` list and the
//! rest of the dump still loads.
//!
//! Logging levels:
//! - **INFO**: load summaries
//! - **DEBUG**: dump creation
//! - **WARN**: rejected entries

pub mod dump;
pub mod error;
pub mod static_dump;

pub use dump::{
    create_dump, create_dump_by, load_dump, CombinationDump, Dump, DumpOptions, LoadedDump,
    QueryDump, SelectionDump, SetDump,
};
pub use error::{DumpError, DumpResult};
pub use static_dump::{
    create_static_dump, create_static_dump_by, load_static_dump, StaticCombination,
    StaticCombinationDump, StaticDump, StaticDumpOptions, StaticQuery, StaticQueryDump,
    StaticSet, StaticSetDump, StaticSnapshot, StaticTarget, StaticTargetDump,
};

use serde::{Deserialize, Serialize};
use setlap_core::{GenerateOptions, Set, SetCombination, SetlapError};
use tracing::warn;

/// Current format version of both dump kinds.
pub const DUMP_VERSION: u32 = 1;

/// Which collection a [`SetLikeRef`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetLikeRefKind {
    Set,
    Combination,
}

/// Positional reference to a set or combination of the same dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLikeRef {
    #[serde(rename = "type")]
    pub kind: SetLikeRefKind,
    pub index: usize,
}

impl SetLikeRef {
    pub fn set(index: usize) -> Self {
        Self {
            kind: SetLikeRefKind::Set,
            index,
        }
    }

    pub fn combination(index: usize) -> Self {
        Self {
            kind: SetLikeRefKind::Combination,
            index,
        }
    }
}

/// A highlighted group: a known set-like or an ad hoc element list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    /// Position in the set list.
    Set(usize),
    /// Position in the combination list.
    Combination(usize),
    /// Ad hoc elements.
    Elems(Vec<T>),
}

/// A named, colored selection shown next to the main one.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<T> {
    pub name: String,
    pub color: Option<String>,
    pub target: Selection<T>,
}

impl<T> Query<T> {
    pub fn new(name: impl Into<String>, target: Selection<T>) -> Self {
        Self {
            name: name.into(),
            color: None,
            target,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Everything a dump is created from.
#[derive(Debug)]
pub struct DumpSource<'a, T> {
    pub sets: &'a [Set<T>],
    pub combinations: &'a [SetCombination<T>],
    /// Options the combinations were generated with.
    pub options: &'a GenerateOptions,
    pub selection: Option<&'a Selection<T>>,
    pub queries: &'a [Query<T>],
}

impl<'a, T> DumpSource<'a, T> {
    pub fn new(
        sets: &'a [Set<T>],
        combinations: &'a [SetCombination<T>],
        options: &'a GenerateOptions,
    ) -> Self {
        Self {
            sets,
            combinations,
            options,
            selection: None,
            queries: &[],
        }
    }

    pub fn with_selection(mut self, selection: &'a Selection<T>) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_queries(mut self, queries: &'a [Query<T>]) -> Self {
        self.queries = queries;
        self
    }
}

/// An entry skipped while loading, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// Location in the dump, e.g. `combinations[3]` or `selection`.
    pub path: String,
    pub error: SetlapError,
}

fn check_version(found: u32) -> DumpResult<()> {
    if found == DUMP_VERSION {
        Ok(())
    } else {
        Err(DumpError::Version {
            found,
            expected: DUMP_VERSION,
        })
    }
}

fn reject(rejected: &mut Vec<RejectedEntry>, path: String, error: SetlapError) {
    warn!(event = "dump_entry_rejected", path = %path, error = %error);
    rejected.push(RejectedEntry { path, error });
}

/// Maps a dumped combination position to its position after rejections.
fn remap(positions: &[Option<usize>], index: usize) -> Result<usize, SetlapError> {
    match positions.get(index) {
        Some(Some(i)) => Ok(*i),
        Some(None) => Err(SetlapError::InvalidDump(format!(
            "combination {index} was rejected"
        ))),
        None => Err(SetlapError::IndexOutOfRange {
            what: "combinations",
            index,
            len: positions.len(),
        }),
    }
}

fn check_set_index(index: usize, len: usize) -> Result<usize, SetlapError> {
    if index < len {
        Ok(index)
    } else {
        Err(SetlapError::IndexOutOfRange {
            what: "sets",
            index,
            len,
        })
    }
}
