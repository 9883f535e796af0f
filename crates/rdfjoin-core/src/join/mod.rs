//! Two-table equi-join execution.
//!
//! Every algorithm implements the same build/probe contract: `build`
//! indexes one side, `probe` scans the other side against that index and
//! emits merged tuples. The caller picks an algorithm and names, for each
//! side, a property and which field of its items (subject or object)
//! participates in the equality predicate. That 6-tuple is the entire
//! public surface of this layer.

mod column_hash;
mod hash_join;
mod input;
mod parallel_column;
mod parallel_hash;
mod sort_merge;

pub use column_hash::ColumnHashJoin;
pub use hash_join::HashJoin;
pub use input::JoinInput;
pub use parallel_column::ParallelColumnHashJoin;
pub use parallel_hash::{ParallelHashJoin, DEFAULT_WORKERS};
pub use sort_merge::SortMergeJoin;

use std::collections::HashMap;

use tracing::debug;

use crate::error::Error;
use crate::hash::{hash_key, hash_str};
use crate::model::{DataType, Dictionary};
use crate::table::{resolve_object, ColumnTable, JoinedRow, RowTable};

/// Which field of the named property's item the equality predicate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Subject,
    Object,
}

/// One side of a join predicate: a property name plus the field to read.
#[derive(Debug, Clone, Copy)]
pub struct JoinKey<'a> {
    pub property: &'a str,
    pub side: JoinSide,
}

impl<'a> JoinKey<'a> {
    pub fn subject(property: &'a str) -> Self {
        Self {
            property,
            side: JoinSide::Subject,
        }
    }

    pub fn object(property: &'a str) -> Self {
        Self {
            property,
            side: JoinSide::Object,
        }
    }
}

/// A join-key value read from one tuple, in comparable form.
///
/// String-typed objects are resolved through their dictionary before
/// comparison, so keys from independently encoded sides still match on
/// the actual string, never on coincidentally equal integer keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyValue<'a> {
    Int(u64),
    Str(&'a str),
}

impl KeyValue<'_> {
    /// Deterministic hash of the key, mixing integers and rolling strings.
    pub fn hash(&self) -> u64 {
        match self {
            KeyValue::Int(value) => hash_key(*value),
            KeyValue::Str(value) => hash_str(value),
        }
    }
}

/// Build-phase output, produced once per join call and consumed by
/// exactly one probe. Probe implementations pattern-match and reject a
/// payload produced by a different algorithm family.
#[derive(Debug)]
pub enum BuildOutput {
    /// Hashed key to owned matching rows (row layout).
    HashRows(HashMap<u64, Vec<JoinedRow>>),
    /// Hashed key to row positions (columnar layout, avoids copying).
    HashPositions(HashMap<u64, Vec<usize>>),
    /// Rows paired with their integer join key, sorted by key.
    SortedRows(Vec<(u64, JoinedRow)>),
}

/// Read the join key of one row, or `None` when the row lacks the join
/// property (sparse data, silently excluded from matching).
pub(crate) fn row_key<'a>(
    row: &'a JoinedRow,
    property_id: u32,
    key: JoinKey<'_>,
    object_dict: &'a Dictionary,
) -> Result<Option<KeyValue<'a>>, Error> {
    let Some(item) = row.values.get(&property_id) else {
        return Ok(None);
    };
    match key.side {
        JoinSide::Subject => Ok(Some(KeyValue::Int(row.subject))),
        JoinSide::Object => match item.data_type {
            DataType::String => Ok(Some(KeyValue::Str(resolve_object(
                item,
                key.property,
                object_dict,
            )?))),
            DataType::Integer | DataType::Object => Ok(Some(KeyValue::Int(item.object))),
        },
    }
}

/// Merge one matched pair into `out`.
///
/// The reference (build-side) row is copied first; the probe row's
/// properties follow, remapped through property names and with
/// string-typed objects re-interned into `out`'s object dictionary
/// (find-or-insert). This is the only place two independently encoded
/// sides become mutually consistent, and every emitted tuple passes
/// through it exactly once. A property carried by both sides keeps the
/// probe side's value.
pub(crate) fn merge_rows(
    out: &mut RowTable,
    build: &RowTable,
    build_row: &JoinedRow,
    probe: &RowTable,
    probe_row: &JoinedRow,
) -> Result<(), Error> {
    let mut merged = JoinedRow::new(build_row.subject);
    for (table, row) in [(build, build_row), (probe, probe_row)] {
        for (&id, item) in &row.values {
            let name = table.property_name(id).ok_or(Error::DanglingKey {
                property: format!("#{id}"),
                key: id as u64,
            })?;
            let out_id = out.intern_property(name);
            let item = match item.data_type {
                DataType::String => {
                    let value = resolve_object(item, name, table.object_dict())?;
                    let key = out.intern_object(value);
                    crate::model::Item::new(item.subject, key as u64, DataType::String)
                }
                DataType::Integer | DataType::Object => *item,
            };
            merged.values.insert(out_id, item);
        }
    }
    out.push(merged);
    Ok(())
}

/// Strategy contract shared by the row-layout join algorithms.
///
/// `join` applies build-side selection and runs both phases; `build` and
/// `probe` are exposed separately so callers (and the parallel wrapper)
/// can drive the phases themselves.
pub trait JoinAlgorithm {
    /// Short algorithm name, used in logs.
    fn name(&self) -> &'static str;

    /// Index one side of the join.
    fn build(&self, table: &RowTable, key: JoinKey<'_>) -> Result<BuildOutput, Error>;

    /// Scan `probe` against the build output and emit merged tuples.
    fn probe(
        &self,
        built: BuildOutput,
        build: &RowTable,
        build_key: JoinKey<'_>,
        probe: &RowTable,
        probe_key: JoinKey<'_>,
    ) -> Result<RowTable, Error>;

    /// Full join with build-side selection: the side with the smaller
    /// join cardinality is always the one indexed. Swapping sides never
    /// changes the output tuple set.
    fn join(
        &self,
        r: &RowTable,
        r_key: JoinKey<'_>,
        s: &RowTable,
        s_key: JoinKey<'_>,
    ) -> Result<RowTable, Error> {
        for (table, key) in [(r, r_key), (s, s_key)] {
            if table.property_id(key.property).is_none() {
                return Err(Error::UnknownProperty {
                    property: key.property.to_string(),
                });
            }
        }
        let r_cardinality = r.key_cardinality(r_key.property);
        let s_cardinality = s.key_cardinality(s_key.property);
        let (build, build_key, probe, probe_key) = if s_cardinality < r_cardinality {
            (s, s_key, r, r_key)
        } else {
            (r, r_key, s, s_key)
        };
        debug!(
            algorithm = self.name(),
            build_property = build_key.property,
            probe_property = probe_key.property,
            build_rows = build.key_cardinality(build_key.property),
            probe_rows = probe.key_cardinality(probe_key.property),
            "joining"
        );
        let built = self.build(build, build_key)?;
        self.probe(built, build, build_key, probe, probe_key)
    }
}

/// Strategy contract for the vertically partitioned layout.
pub trait ColumnJoinAlgorithm {
    fn name(&self) -> &'static str;

    fn build(&self, table: &ColumnTable, key: JoinKey<'_>) -> Result<BuildOutput, Error>;

    fn probe(
        &self,
        built: BuildOutput,
        build: &ColumnTable,
        build_key: JoinKey<'_>,
        probe: &ColumnTable,
        probe_key: JoinKey<'_>,
    ) -> Result<ColumnTable, Error>;

    /// Full join with the same build-side selection rule as the row
    /// layout: always index the smaller side.
    fn join(
        &self,
        r: &ColumnTable,
        r_key: JoinKey<'_>,
        s: &ColumnTable,
        s_key: JoinKey<'_>,
    ) -> Result<ColumnTable, Error> {
        for (table, key) in [(r, r_key), (s, s_key)] {
            if !table.has_property(key.property) {
                return Err(Error::UnknownProperty {
                    property: key.property.to_string(),
                });
            }
        }
        let (build, build_key, probe, probe_key) =
            if s.key_cardinality(s_key.property) < r.key_cardinality(r_key.property) {
                (s, s_key, r, r_key)
            } else {
                (r, r_key, s, s_key)
            };
        debug!(
            algorithm = self.name(),
            build_property = build_key.property,
            probe_property = probe_key.property,
            "joining columns"
        );
        let built = self.build(build, build_key)?;
        self.probe(built, build, build_key, probe, probe_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;

    #[test]
    fn key_values_compare_on_content_not_encoding() {
        let mut left = Dictionary::new();
        let mut right = Dictionary::new();
        right.put("padding");
        let a = left.put("LEA");
        let b = right.put("LEA");
        assert_ne!(a, b);

        let row_a = JoinedRow::new(0).with_value(1, Item::new(0, a as u64, DataType::String));
        let row_b = JoinedRow::new(9).with_value(1, Item::new(9, b as u64, DataType::String));
        let key = JoinKey::object("foaf:givenName");
        let ka = row_key(&row_a, 1, key, &left).unwrap();
        let kb = row_key(&row_b, 1, key, &right).unwrap();
        assert_eq!(ka, kb);
        assert_eq!(ka.unwrap().hash(), kb.unwrap().hash());
    }

    #[test]
    fn rows_without_the_property_yield_no_key() {
        let dict = Dictionary::new();
        let row = JoinedRow::new(5);
        let key = JoinKey::subject("wsdbm:follows");
        assert_eq!(row_key(&row, 1, key, &dict).unwrap(), None);
    }

    #[test]
    fn merged_rows_reintern_probe_strings_once() {
        let mut build = RowTable::default();
        let bid = build.intern_property("wsdbm:userId");
        let b_row = JoinedRow::new(0).with_value(bid, Item::new(0, 1806723, DataType::Integer));

        let mut probe = RowTable::default();
        let pid = probe.intern_property("foaf:givenName");
        let luke = probe.intern_object("LUKE");
        let p_row = JoinedRow::new(0).with_value(pid, Item::new(0, luke as u64, DataType::String));

        let mut out = RowTable::new(Dictionary::new(), build.object_dict().clone());
        merge_rows(&mut out, &build, &b_row, &probe, &p_row).unwrap();
        merge_rows(&mut out, &build, &b_row, &probe, &p_row).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out.object_dict().len(), 1);
        let decoded = out.decoded_rows().unwrap();
        for row in decoded {
            assert_eq!(row["foaf:givenName"], "LUKE");
            assert_eq!(row["wsdbm:userId"], "1806723");
        }
    }
}
