//! Layout-neutral view of a join input.

use std::collections::HashMap;

use crate::error::Error;
use crate::join::{row_key, JoinKey, JoinSide, KeyValue};
use crate::model::DataType;
use crate::table::{resolve_object, ColumnTable, RowTable};

/// The minimal capability a join algorithm needs from a table layout:
/// how many positions to scan and the join key at each one. Bucket
/// construction is written once against this trait; only the columnar
/// index remapping in the parallel variant is layout-specific.
pub trait JoinInput {
    fn has_property(&self, property: &str) -> bool;

    /// Number of scannable positions for this predicate side.
    fn position_count(&self, key: JoinKey<'_>) -> usize;

    /// Join key at `pos`, or `None` when the tuple there lacks the join
    /// property or the position is out of range.
    fn join_key(&self, key: JoinKey<'_>, pos: usize) -> Result<Option<KeyValue<'_>>, Error>;
}

impl JoinInput for RowTable {
    fn has_property(&self, property: &str) -> bool {
        self.property_id(property).is_some()
    }

    fn position_count(&self, _key: JoinKey<'_>) -> usize {
        self.len()
    }

    fn join_key(&self, key: JoinKey<'_>, pos: usize) -> Result<Option<KeyValue<'_>>, Error> {
        let (Some(id), Some(row)) = (self.property_id(key.property), self.rows().get(pos)) else {
            return Ok(None);
        };
        row_key(row, id, key, self.object_dict())
    }
}

impl JoinInput for ColumnTable {
    fn has_property(&self, property: &str) -> bool {
        ColumnTable::has_property(self, property)
    }

    fn position_count(&self, key: JoinKey<'_>) -> usize {
        self.key_cardinality(key.property)
    }

    fn join_key(&self, key: JoinKey<'_>, pos: usize) -> Result<Option<KeyValue<'_>>, Error> {
        let Some(column) = self.column(key.property) else {
            return Ok(None);
        };
        let Some(item) = column.items().get(pos) else {
            return Ok(None);
        };
        match key.side {
            JoinSide::Subject => Ok(Some(KeyValue::Int(item.subject))),
            JoinSide::Object => match item.data_type {
                DataType::String => Ok(Some(KeyValue::Str(resolve_object(
                    item,
                    key.property,
                    column.dict(),
                )?))),
                DataType::Integer | DataType::Object => Ok(Some(KeyValue::Int(item.object))),
            },
        }
    }
}

/// Bucket the given `(stored_index, position)` pairs by hashed join key.
///
/// The stored index is what lands in the bucket, which lets the parallel
/// columnar build store worker-local indices for later remapping while
/// the sequential build simply stores the position itself.
pub(crate) fn build_positions<T: JoinInput>(
    table: &T,
    key: JoinKey<'_>,
    positions: impl Iterator<Item = (usize, usize)>,
) -> Result<HashMap<u64, Vec<usize>>, Error> {
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    for (stored, pos) in positions {
        if let Some(value) = table.join_key(key, pos)? {
            buckets.entry(value.hash()).or_default().push(stored);
        }
    }
    Ok(buckets)
}
