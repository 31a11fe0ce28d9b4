//! Element-carrying dumps.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use setlap_core::codec::{from_indices_array, to_indices_array};
use setlap_core::{
    set_indices, Algorithm, CombinationType, Compress, GenerateOptions, IndicesArray, Set,
    SetCombination, SetLike, SetlapError, Universe,
};
use setlap_engine::generate;
use tracing::{debug, info};

use crate::{
    check_set_index, check_version, reject, remap, DumpResult, DumpSource, Query, RejectedEntry,
    Selection, SetLikeRef, SetLikeRefKind, DUMP_VERSION,
};

type EntryResult<T> = Result<T, SetlapError>;

/// Options for [`create_dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DumpOptions {
    /// Index sequence encoding.
    pub compress: Compress,
    /// Store combinations; otherwise they are regenerated on load.
    pub include_combinations: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            compress: Compress::Auto,
            include_combinations: true,
        }
    }
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compress(mut self, compress: Compress) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_include_combinations(mut self, include: bool) -> Self {
        self.include_combinations = include;
        self
    }
}

/// Serialized form of a [`Set`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDump {
    pub name: String,
    pub cardinality: usize,
    pub elems: IndicesArray,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Serialized form of a [`SetCombination`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationDump {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CombinationType,
    /// Positions of the member sets.
    pub sets: Vec<usize>,
    pub cardinality: usize,
    pub elems: IndicesArray,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Serialized [`Selection`]: a reference or encoded element indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionDump {
    Ref(SetLikeRef),
    Elems(IndicesArray),
}

/// Serialized [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDump {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub target: SelectionDump,
}

/// A versioned dump of sets, combinations, selection and queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dump {
    pub version: u32,
    pub sets: Vec<SetDump>,
    /// `None` when the combinations are regenerated on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinations: Option<Vec<CombinationDump>>,
    pub combination_options: GenerateOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionDump>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<QueryDump>,
}

impl Dump {
    pub fn to_json(&self) -> DumpResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> DumpResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> DumpResult<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Result of [`load_dump`].
#[derive(Debug, Clone)]
pub struct LoadedDump<T> {
    pub sets: Vec<Set<T>>,
    pub combinations: Vec<SetCombination<T>>,
    pub options: GenerateOptions,
    pub selection: Option<Selection<T>>,
    pub queries: Vec<Query<T>>,
    /// Entries that could not be reconstructed.
    pub rejected: Vec<RejectedEntry>,
}

impl<T> LoadedDump<T> {
    /// Resolves a positional selection; ad hoc elements have no set-like.
    pub fn set_like(&self, selection: &Selection<T>) -> Option<SetLike<'_, T>> {
        match selection {
            Selection::Set(i) => self.sets.get(*i).map(SetLike::Set),
            Selection::Combination(i) => self.combinations.get(*i).map(SetLike::Combination),
            Selection::Elems(_) => None,
        }
    }
}

/// Creates a dump, encoding elements as positions in `elems`.
///
/// # Errors
///
/// Fails when an element is missing from `elems` or a selection points
/// outside the source lists.
pub fn create_dump<'a, T>(
    source: &DumpSource<'a, T>,
    elems: &'a [T],
    options: &DumpOptions,
) -> DumpResult<Dump>
where
    T: Eq + Hash,
{
    create_dump_by(source, elems, |e| e, options)
}

/// Creates a dump, identifying elements by `to_elem_key`.
///
/// When two entries of `elems` share a key, the first position is used.
pub fn create_dump_by<'a, T, K, F>(
    source: &DumpSource<'a, T>,
    elems: &'a [T],
    to_elem_key: F,
    options: &DumpOptions,
) -> DumpResult<Dump>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::with_capacity(elems.len());
    for (i, e) in elems.iter().enumerate() {
        index.entry(to_elem_key(e)).or_insert(i);
    }
    let encode = |items: &'a [T]| -> EntryResult<IndicesArray> {
        let positions = items
            .iter()
            .map(|e| {
                index.get(&to_elem_key(e)).copied().ok_or_else(|| {
                    SetlapError::InvalidDump("element missing from the element list".to_string())
                })
            })
            .collect::<EntryResult<Vec<usize>>>()?;
        Ok(to_indices_array(&positions, options.compress))
    };

    let sets = source
        .sets
        .iter()
        .map(|s| {
            Ok(SetDump {
                name: s.name().to_string(),
                cardinality: s.cardinality(),
                elems: encode(s.elems())?,
                color: s.color().map(str::to_string),
            })
        })
        .collect::<EntryResult<Vec<_>>>()?;

    let combinations = if options.include_combinations {
        let dumped = source
            .combinations
            .iter()
            .map(|c| {
                Ok(CombinationDump {
                    name: c.name().to_string(),
                    kind: c.combination_type(),
                    sets: c.sets().iter().copied().collect(),
                    cardinality: c.cardinality(),
                    elems: encode(c.elems())?,
                    color: c.color().map(str::to_string),
                })
            })
            .collect::<EntryResult<Vec<_>>>()?;
        Some(dumped)
    } else {
        None
    };

    let selection = source
        .selection
        .map(|s| dump_selection(s, source, &encode))
        .transpose()?;
    let queries = source
        .queries
        .iter()
        .map(|q| {
            Ok(QueryDump {
                name: q.name.clone(),
                color: q.color.clone(),
                target: dump_selection(&q.target, source, &encode)?,
            })
        })
        .collect::<EntryResult<Vec<_>>>()?;

    debug!(
        event = "dump_created",
        sets = sets.len(),
        combinations = source.combinations.len(),
        include_combinations = options.include_combinations,
        queries = queries.len(),
    );

    Ok(Dump {
        version: DUMP_VERSION,
        sets,
        combinations,
        combination_options: source.options.clone(),
        selection,
        queries,
    })
}

fn dump_selection<'a, T, E>(
    selection: &'a Selection<T>,
    source: &DumpSource<'a, T>,
    encode: &E,
) -> EntryResult<SelectionDump>
where
    E: Fn(&'a [T]) -> EntryResult<IndicesArray>,
{
    match selection {
        Selection::Set(i) => {
            check_set_index(*i, source.sets.len()).map(|i| SelectionDump::Ref(SetLikeRef::set(i)))
        }
        Selection::Combination(i) if *i < source.combinations.len() => {
            Ok(SelectionDump::Ref(SetLikeRef::combination(*i)))
        }
        Selection::Combination(i) => Err(SetlapError::IndexOutOfRange {
            what: "combinations",
            index: *i,
            len: source.combinations.len(),
        }),
        Selection::Elems(elems) => encode(elems).map(SelectionDump::Elems),
    }
}

/// Reconstructs sets, combinations, selection and queries.
///
/// Omitted combinations are regenerated from the stored options. Selection
/// and query references to combinations keep pointing at the same entries
/// when earlier combinations were rejected.
///
/// # Errors
///
/// Fails on a version mismatch, on any invalid set, and when regenerating
/// combinations fails. Other invalid entries end up in
/// [`LoadedDump::rejected`].
pub fn load_dump<T>(dump: &Dump, elems: &[T]) -> DumpResult<LoadedDump<T>>
where
    T: Clone + Eq + Hash,
{
    check_version(dump.version)?;

    let sets = dump
        .sets
        .iter()
        .enumerate()
        .map(|(i, s)| {
            load_set(s, elems)
                .map_err(|e| SetlapError::InvalidDump(format!("sets[{i}]: {e}")))
        })
        .collect::<EntryResult<Vec<_>>>()?;

    let mut rejected = Vec::new();
    let (combinations, positions) = match &dump.combinations {
        Some(dumped) => {
            let mut combinations = Vec::with_capacity(dumped.len());
            let mut positions = Vec::with_capacity(dumped.len());
            for (i, c) in dumped.iter().enumerate() {
                match load_combination(c, sets.len(), elems) {
                    Ok(c) => {
                        positions.push(Some(combinations.len()));
                        combinations.push(c);
                    }
                    Err(e) => {
                        positions.push(None);
                        reject(&mut rejected, format!("combinations[{i}]"), e);
                    }
                }
            }
            (combinations, positions)
        }
        None => {
            let combinations = generate(
                &sets,
                &dump.combination_options,
                Universe::Elems(elems),
                Algorithm::Incremental,
            )?;
            let positions = (0..combinations.len()).map(Some).collect();
            (combinations, positions)
        }
    };

    let selection = match &dump.selection {
        Some(s) => match load_selection(s, sets.len(), &positions, elems) {
            Ok(s) => Some(s),
            Err(e) => {
                reject(&mut rejected, "selection".to_string(), e);
                None
            }
        },
        None => None,
    };

    let mut queries = Vec::with_capacity(dump.queries.len());
    for (i, q) in dump.queries.iter().enumerate() {
        match load_selection(&q.target, sets.len(), &positions, elems) {
            Ok(target) => queries.push(Query {
                name: q.name.clone(),
                color: q.color.clone(),
                target,
            }),
            Err(e) => reject(&mut rejected, format!("queries[{i}]"), e),
        }
    }

    info!(
        event = "dump_loaded",
        sets = sets.len(),
        combinations = combinations.len(),
        regenerated = dump.combinations.is_none(),
        queries = queries.len(),
        rejected = rejected.len(),
    );

    Ok(LoadedDump {
        sets,
        combinations,
        options: dump.combination_options.clone(),
        selection,
        queries,
        rejected,
    })
}

fn check_cardinality(expected: usize, actual: usize) -> EntryResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SetlapError::InvalidDump(format!(
            "cardinality {expected} does not match {actual} elements"
        )))
    }
}

fn load_set<T: Clone>(dumped: &SetDump, elems: &[T]) -> EntryResult<Set<T>> {
    let members = from_indices_array(&dumped.elems, elems)?;
    check_cardinality(dumped.cardinality, members.len())?;
    let set = Set::new(dumped.name.clone(), members);
    Ok(match &dumped.color {
        Some(color) => set.with_color(color.clone()),
        None => set,
    })
}

fn load_combination<T: Clone>(
    dumped: &CombinationDump,
    set_count: usize,
    elems: &[T],
) -> EntryResult<SetCombination<T>> {
    let sets = dumped
        .sets
        .iter()
        .map(|&i| check_set_index(i, set_count))
        .collect::<EntryResult<Vec<_>>>()?;
    let members = from_indices_array(&dumped.elems, elems)?;
    check_cardinality(dumped.cardinality, members.len())?;
    let combination =
        SetCombination::new(dumped.name.clone(), dumped.kind, set_indices(sets), members);
    Ok(match &dumped.color {
        Some(color) => combination.with_color(color.clone()),
        None => combination,
    })
}

fn load_selection<T: Clone>(
    dumped: &SelectionDump,
    set_count: usize,
    positions: &[Option<usize>],
    elems: &[T],
) -> EntryResult<Selection<T>> {
    match dumped {
        SelectionDump::Ref(r) => match r.kind {
            SetLikeRefKind::Set => check_set_index(r.index, set_count).map(Selection::Set),
            SetLikeRefKind::Combination => remap(positions, r.index).map(Selection::Combination),
        },
        SelectionDump::Elems(indices) => from_indices_array(indices, elems).map(Selection::Elems),
    }
}
