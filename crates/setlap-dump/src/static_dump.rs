//! Element-free snapshots answering overlaps from a precomputed matrix.

use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use setlap_core::codec::to_counts_array;
use setlap_core::{
    combination_name, set_indices, CombinationType, Compress, CountsArray, OverlapMetric, Set,
    SetCombination, SetIndices, SetLikeInfo, SetLikeKey, SetLikeKind, SetlapError,
};
use setlap_engine::{
    brute_force_overlap_by, generate_overlap_lookup_by, OverlapLookup, OverlapMatrix,
};
use tracing::{debug, info};

use crate::{
    check_set_index, check_version, reject, remap, DumpResult, DumpSource, RejectedEntry,
    Selection, SetLikeRef, SetLikeRefKind, DUMP_VERSION,
};

type EntryResult<T> = Result<T, SetlapError>;

/// Member set positions from this one on cannot be stored in a bitmask.
///
/// JSON readers commonly hold numbers as doubles, exact up to `2^53`.
const MAX_BITMASK_SETS: usize = 53;

/// Options for [`create_static_dump`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct StaticDumpOptions {
    /// Encoding of combinations and matrix rows.
    pub compress: Compress,
    /// Quantity stored in the matrix.
    pub metric: OverlapMetric,
}

impl StaticDumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compress(mut self, compress: Compress) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_metric(mut self, metric: OverlapMetric) -> Self {
        self.metric = metric;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSetDump {
    pub name: String,
    pub cardinality: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A combination in full or bitmask form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StaticCombinationDump {
    Full {
        name: String,
        #[serde(rename = "type")]
        kind: CombinationType,
        sets: Vec<usize>,
        cardinality: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Compressed {
        /// Bitmask of member set positions.
        s: u64,
        /// Cardinality.
        c: usize,
        /// One-letter type code, omitted for intersections.
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        /// Name, omitted when it follows the canonical naming rule.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        n: Option<String>,
        /// Color.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cc: Option<String>,
    },
}

/// Serialized [`StaticTarget`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StaticTargetDump {
    Ref(SetLikeRef),
    Overlaps {
        cardinality: usize,
        overlaps: CountsArray,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticQueryDump {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub target: StaticTargetDump,
}

/// A versioned, element-free snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDump {
    pub version: u32,
    #[serde(default)]
    pub metric: OverlapMetric,
    pub sets: Vec<StaticSetDump>,
    #[serde(default)]
    pub combinations: Vec<StaticCombinationDump>,
    /// Rows of the overlap matrix over `sets ++ combinations`.
    pub overlaps: Vec<CountsArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<StaticTargetDump>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<StaticQueryDump>,
}

impl StaticDump {
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

fn type_code(kind: CombinationType) -> Option<&'static str> {
    match kind {
        CombinationType::Intersection => None,
        CombinationType::Union => Some("u"),
        CombinationType::DistinctIntersection => Some("d"),
        CombinationType::Composite => Some("c"),
    }
}

fn parse_type_code(code: Option<&str>) -> EntryResult<CombinationType> {
    match code {
        None | Some("i") => Ok(CombinationType::Intersection),
        Some("u") => Ok(CombinationType::Union),
        Some("d") => Ok(CombinationType::DistinctIntersection),
        Some("c") => Ok(CombinationType::Composite),
        Some(other) => Err(SetlapError::InvalidDump(format!(
            "unknown combination type code '{other}'"
        ))),
    }
}

fn bitmask(sets: &SetIndices) -> Option<u64> {
    sets.iter().try_fold(0u64, |mask, &i| {
        (i < MAX_BITMASK_SETS).then(|| mask | (1u64 << i))
    })
}

fn canonical_name<T>(kind: CombinationType, sets: &SetIndices, base: &[Set<T>]) -> String {
    combination_name(
        sets.iter().filter_map(|&i| base.get(i)).map(Set::name),
        kind.default_joiner(),
    )
}

fn dump_combination<T>(
    combination: &SetCombination<T>,
    base: &[Set<T>],
    compress: Compress,
) -> StaticCombinationDump {
    let kind = combination.combination_type();
    let color = combination.color().map(str::to_string);
    match bitmask(combination.sets()).filter(|_| compress != Compress::No) {
        Some(s) => {
            let canonical = canonical_name(kind, combination.sets(), base);
            StaticCombinationDump::Compressed {
                s,
                c: combination.cardinality(),
                kind: type_code(kind).map(str::to_string),
                n: (combination.name() != canonical).then(|| combination.name().to_string()),
                cc: color,
            }
        }
        None => StaticCombinationDump::Full {
            name: combination.name().to_string(),
            kind,
            sets: combination.sets().iter().copied().collect(),
            cardinality: combination.cardinality(),
            color,
        },
    }
}

/// Creates a static dump comparing elements by equality.
pub fn create_static_dump<'a, T>(
    source: &DumpSource<'a, T>,
    options: &StaticDumpOptions,
) -> DumpResult<StaticDump>
where
    T: Eq + Hash,
{
    create_static_dump_by(source, |e| e, options)
}

/// Creates a static dump comparing elements by `to_elem_key`.
///
/// Ad hoc element selections are stored as their overlaps against every
/// set and combination, using the same metric as the matrix.
///
/// # Errors
///
/// Fails when a selection or query points outside the source lists.
pub fn create_static_dump_by<'a, T, K, F>(
    source: &DumpSource<'a, T>,
    to_elem_key: F,
    options: &StaticDumpOptions,
) -> DumpResult<StaticDump>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let matrix =
        generate_overlap_lookup_by(source.sets, source.combinations, &to_elem_key, options.metric);
    let overlaps: Vec<CountsArray> = matrix
        .rows()
        .iter()
        .map(|row| to_counts_array(row, options.compress))
        .collect();

    let items: Vec<&'a [T]> = source
        .sets
        .iter()
        .map(|s| s.elems())
        .chain(source.combinations.iter().map(|c| c.elems()))
        .collect();
    let dump_target = |selection: &'a Selection<T>| -> EntryResult<StaticTargetDump> {
        match selection {
            Selection::Set(i) => check_set_index(*i, source.sets.len())
                .map(|i| StaticTargetDump::Ref(SetLikeRef::set(i))),
            Selection::Combination(i) if *i < source.combinations.len() => {
                Ok(StaticTargetDump::Ref(SetLikeRef::combination(*i)))
            }
            Selection::Combination(i) => Err(SetlapError::IndexOutOfRange {
                what: "combinations",
                index: *i,
                len: source.combinations.len(),
            }),
            Selection::Elems(elems) => {
                let elems = elems.as_slice();
                let values: Vec<usize> = items
                    .iter()
                    .map(|&item| {
                        let overlap = brute_force_overlap_by(elems, item, &to_elem_key);
                        options.metric.apply(elems.len(), item.len(), overlap)
                    })
                    .collect();
                Ok(StaticTargetDump::Overlaps {
                    cardinality: elems.len(),
                    overlaps: to_counts_array(&values, options.compress),
                })
            }
        }
    };

    let sets = source
        .sets
        .iter()
        .map(|s| StaticSetDump {
            name: s.name().to_string(),
            cardinality: s.cardinality(),
            color: s.color().map(str::to_string),
        })
        .collect();
    let combinations: Vec<StaticCombinationDump> = source
        .combinations
        .iter()
        .map(|c| dump_combination(c, source.sets, options.compress))
        .collect();
    let selection = source.selection.map(&dump_target).transpose()?;
    let queries = source
        .queries
        .iter()
        .map(|q| {
            Ok(StaticQueryDump {
                name: q.name.clone(),
                color: q.color.clone(),
                target: dump_target(&q.target)?,
            })
        })
        .collect::<EntryResult<Vec<_>>>()?;

    debug!(
        event = "static_dump_created",
        items = matrix.item_count(),
        compressed_combinations = combinations
            .iter()
            .filter(|c| matches!(c, StaticCombinationDump::Compressed { .. }))
            .count(),
        queries = queries.len(),
    );

    Ok(StaticDump {
        version: DUMP_VERSION,
        metric: options.metric,
        sets,
        combinations,
        overlaps,
        selection,
        queries,
    })
}

/// A set restored from a static dump.
#[derive(Debug, Clone)]
pub struct StaticSet {
    name: String,
    cardinality: usize,
    color: Option<String>,
    lookup: Arc<OverlapLookup>,
}

impl StaticSet {
    /// Stored overlap with another set-like; unknown set-likes give 0.
    pub fn overlap(&self, other: &dyn SetLikeInfo) -> usize {
        self.lookup.compute(self, other)
    }
}

impl SetLikeInfo for StaticSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn cardinality(&self) -> usize {
        self.cardinality
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

/// A combination restored from a static dump.
#[derive(Debug, Clone)]
pub struct StaticCombination {
    name: String,
    kind: CombinationType,
    sets: SetIndices,
    cardinality: usize,
    color: Option<String>,
    lookup: Arc<OverlapLookup>,
}

impl StaticCombination {
    pub fn combination_type(&self) -> CombinationType {
        self.kind
    }

    pub fn sets(&self) -> &SetIndices {
        &self.sets
    }

    pub fn degree(&self) -> usize {
        self.sets.len()
    }

    /// Stored overlap with another set-like; unknown set-likes give 0.
    pub fn overlap(&self, other: &dyn SetLikeInfo) -> usize {
        self.lookup.compute(self, other)
    }
}

impl SetLikeInfo for StaticCombination {
    fn name(&self) -> &str {
        &self.name
    }

    fn cardinality(&self) -> usize {
        self.cardinality
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

/// A restored selection or query target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticTarget {
    Set(usize),
    Combination(usize),
    /// Ad hoc elements, known only by size and stored overlaps indexed by
    /// matrix position.
    Elems {
        cardinality: usize,
        overlaps: Vec<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticQuery {
    pub name: String,
    pub color: Option<String>,
    pub target: StaticTarget,
}

/// Result of [`load_static_dump`].
#[derive(Debug, Clone)]
pub struct StaticSnapshot {
    pub sets: Vec<StaticSet>,
    pub combinations: Vec<StaticCombination>,
    pub metric: OverlapMetric,
    pub selection: Option<StaticTarget>,
    pub queries: Vec<StaticQuery>,
    pub rejected: Vec<RejectedEntry>,
    lookup: Arc<OverlapLookup>,
}

impl StaticSnapshot {
    pub fn lookup(&self) -> &OverlapLookup {
        &self.lookup
    }

    pub fn target_cardinality(&self, target: &StaticTarget) -> Option<usize> {
        match target {
            StaticTarget::Set(i) => self.sets.get(*i).map(|s| s.cardinality),
            StaticTarget::Combination(i) => self.combinations.get(*i).map(|c| c.cardinality),
            StaticTarget::Elems { cardinality, .. } => Some(*cardinality),
        }
    }

    /// Stored overlap between a target and a set-like.
    pub fn target_overlap(&self, target: &StaticTarget, other: &dyn SetLikeInfo) -> usize {
        match target {
            StaticTarget::Set(i) => self.sets.get(*i).map_or(0, |s| s.overlap(other)),
            StaticTarget::Combination(i) => {
                self.combinations.get(*i).map_or(0, |c| c.overlap(other))
            }
            StaticTarget::Elems { overlaps, .. } => self
                .lookup
                .index_of(&other.key())
                .and_then(|i| overlaps.get(i).copied())
                .unwrap_or(0),
        }
    }
}

struct DecodedCombination {
    name: String,
    kind: CombinationType,
    sets: SetIndices,
    cardinality: usize,
    color: Option<String>,
}

fn decode_combination(
    dumped: &StaticCombinationDump,
    base: &[StaticSetDump],
) -> EntryResult<DecodedCombination> {
    match dumped {
        StaticCombinationDump::Full {
            name,
            kind,
            sets,
            cardinality,
            color,
        } => {
            let sets = sets
                .iter()
                .map(|&i| check_set_index(i, base.len()))
                .collect::<EntryResult<Vec<_>>>()?;
            Ok(DecodedCombination {
                name: name.clone(),
                kind: *kind,
                sets: set_indices(sets),
                cardinality: *cardinality,
                color: color.clone(),
            })
        }
        StaticCombinationDump::Compressed { s, c, kind, n, cc } => {
            let kind = parse_type_code(kind.as_deref())?;
            let sets = (0..u64::BITS as usize)
                .filter(|i| s & (1u64 << i) != 0)
                .map(|i| check_set_index(i, base.len()))
                .collect::<EntryResult<Vec<_>>>()?;
            let sets = set_indices(sets);
            let name = match n {
                Some(name) => name.clone(),
                None => combination_name(
                    sets.iter().map(|&i| base[i].name.as_str()),
                    kind.default_joiner(),
                ),
            };
            Ok(DecodedCombination {
                name,
                kind,
                sets,
                cardinality: *c,
                color: cc.clone(),
            })
        }
    }
}

fn decode_counts(counts: &CountsArray, max_len: usize, what: &str) -> EntryResult<Vec<usize>> {
    counts
        .to_counts_within(max_len)
        .map_err(|e| SetlapError::InvalidDump(format!("{what}: {e}")))
}

fn load_target(
    dumped: &StaticTargetDump,
    set_count: usize,
    positions: &[Option<usize>],
    item_count: usize,
) -> EntryResult<StaticTarget> {
    match dumped {
        StaticTargetDump::Ref(r) => match r.kind {
            SetLikeRefKind::Set => check_set_index(r.index, set_count).map(StaticTarget::Set),
            SetLikeRefKind::Combination => {
                remap(positions, r.index).map(StaticTarget::Combination)
            }
        },
        StaticTargetDump::Overlaps {
            cardinality,
            overlaps,
        } => {
            let overlaps = decode_counts(overlaps, item_count, "overlaps")?;
            if overlaps.len() != item_count {
                return Err(SetlapError::InvalidDump(format!(
                    "{} overlaps for {item_count} items",
                    overlaps.len()
                )));
            }
            Ok(StaticTarget::Elems {
                cardinality: *cardinality,
                overlaps,
            })
        }
    }
}

/// Restores a static snapshot.
///
/// # Errors
///
/// Fails on a version mismatch and on a malformed overlap matrix. Invalid
/// combinations, selections and queries end up in
/// [`StaticSnapshot::rejected`]; a rejected combination keeps its matrix
/// position but can no longer be looked up.
pub fn load_static_dump(dump: &StaticDump) -> DumpResult<StaticSnapshot> {
    check_version(dump.version)?;

    let item_count = dump.sets.len() + dump.combinations.len();
    let rows = dump
        .overlaps
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let expected = item_count.saturating_sub(i + 1);
            decode_counts(row, expected, &format!("overlaps[{i}]"))
        })
        .collect::<EntryResult<Vec<_>>>()?;
    let matrix = OverlapMatrix::from_rows(rows)?;
    if matrix.item_count() != item_count {
        return Err(SetlapError::InvalidDump(format!(
            "overlap matrix covers {} items, dump has {item_count}",
            matrix.item_count()
        ))
        .into());
    }

    let mut rejected = Vec::new();
    let decoded: Vec<Option<DecodedCombination>> = dump
        .combinations
        .iter()
        .enumerate()
        .map(|(i, c)| match decode_combination(c, &dump.sets) {
            Ok(c) => Some(c),
            Err(e) => {
                reject(&mut rejected, format!("combinations[{i}]"), e);
                None
            }
        })
        .collect();

    let keys = dump
        .sets
        .iter()
        .map(|s| Some(SetLikeKey::Set(s.name.clone())))
        .chain(decoded.iter().map(|c| {
            c.as_ref().map(|c| SetLikeKey::Combination {
                kind: c.kind,
                sets: c.sets.clone(),
            })
        }));
    let lookup = Arc::new(OverlapLookup::new(matrix, keys));

    let sets: Vec<StaticSet> = dump
        .sets
        .iter()
        .map(|s| StaticSet {
            name: s.name.clone(),
            cardinality: s.cardinality,
            color: s.color.clone(),
            lookup: Arc::clone(&lookup),
        })
        .collect();
    let mut positions = Vec::with_capacity(decoded.len());
    let mut combinations = Vec::new();
    for c in decoded {
        match c {
            Some(c) => {
                positions.push(Some(combinations.len()));
                combinations.push(StaticCombination {
                    name: c.name,
                    kind: c.kind,
                    sets: c.sets,
                    cardinality: c.cardinality,
                    color: c.color,
                    lookup: Arc::clone(&lookup),
                });
            }
            None => positions.push(None),
        }
    }

    let selection = match &dump.selection {
        Some(s) => match load_target(s, sets.len(), &positions, item_count) {
            Ok(t) => Some(t),
            Err(e) => {
                reject(&mut rejected, "selection".to_string(), e);
                None
            }
        },
        None => None,
    };
    let mut queries = Vec::with_capacity(dump.queries.len());
    for (i, q) in dump.queries.iter().enumerate() {
        match load_target(&q.target, sets.len(), &positions, item_count) {
            Ok(target) => queries.push(StaticQuery {
                name: q.name.clone(),
                color: q.color.clone(),
                target,
            }),
            Err(e) => reject(&mut rejected, format!("queries[{i}]"), e),
        }
    }

    info!(
        event = "static_dump_loaded",
        sets = sets.len(),
        combinations = combinations.len(),
        queries = queries.len(),
        rejected = rejected.len(),
    );

    Ok(StaticSnapshot {
        sets,
        combinations,
        metric: dump.metric,
        selection,
        queries,
        rejected,
        lookup,
    })
}
