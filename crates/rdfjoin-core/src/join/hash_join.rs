//! Sequential partitioned hash join over row tables.

use std::collections::HashMap;

use crate::error::Error;
use crate::join::{merge_rows, row_key, BuildOutput, JoinAlgorithm, JoinKey};
use crate::table::{JoinedRow, RowTable};

/// Classic build/probe hash join.
///
/// Build buckets the smaller side by hashed join key; probe scans the
/// larger side and re-checks true key equality on every bucket hit, so a
/// hash collision can never produce a false match.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashJoin;

/// Bucket the rows at `positions` by hashed join key.
pub(super) fn build_row_buckets(
    table: &RowTable,
    key: JoinKey<'_>,
    positions: impl Iterator<Item = usize>,
) -> Result<HashMap<u64, Vec<JoinedRow>>, Error> {
    let mut buckets: HashMap<u64, Vec<JoinedRow>> = HashMap::new();
    let Some(id) = table.property_id(key.property) else {
        return Ok(buckets);
    };
    for pos in positions {
        let Some(row) = table.rows().get(pos) else {
            continue;
        };
        if let Some(value) = row_key(row, id, key, table.object_dict())? {
            buckets.entry(value.hash()).or_default().push(row.clone());
        }
    }
    Ok(buckets)
}

/// Probe the rows at `positions` against `buckets`, emitting a merged
/// tuple per true-key match.
pub(super) fn probe_with(
    buckets: &HashMap<u64, Vec<JoinedRow>>,
    build: &RowTable,
    build_key: JoinKey<'_>,
    probe: &RowTable,
    probe_key: JoinKey<'_>,
    positions: impl Iterator<Item = usize>,
) -> Result<RowTable, Error> {
    let mut out = RowTable::new(
        build.property_dict().clone(),
        build.object_dict().clone(),
    );
    let (Some(build_id), Some(probe_id)) = (
        build.property_id(build_key.property),
        probe.property_id(probe_key.property),
    ) else {
        return Ok(out);
    };
    for pos in positions {
        let Some(probe_row) = probe.rows().get(pos) else {
            continue;
        };
        let Some(probe_value) = row_key(probe_row, probe_id, probe_key, probe.object_dict())?
        else {
            continue;
        };
        let Some(bucket) = buckets.get(&probe_value.hash()) else {
            continue;
        };
        for candidate in bucket {
            // hash equality is necessary, true-key equality decides
            let build_value = row_key(candidate, build_id, build_key, build.object_dict())?;
            if build_value == Some(probe_value) {
                merge_rows(&mut out, build, candidate, probe, probe_row)?;
            }
        }
    }
    Ok(out)
}

impl JoinAlgorithm for HashJoin {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn build(&self, table: &RowTable, key: JoinKey<'_>) -> Result<BuildOutput, Error> {
        build_row_buckets(table, key, 0..table.len()).map(BuildOutput::HashRows)
    }

    fn probe(
        &self,
        built: BuildOutput,
        build: &RowTable,
        build_key: JoinKey<'_>,
        probe: &RowTable,
        probe_key: JoinKey<'_>,
    ) -> Result<RowTable, Error> {
        let BuildOutput::HashRows(buckets) = built else {
            return Err(Error::BuildOutputMismatch {
                expected: "hash buckets",
            });
        };
        probe_with(&buckets, build, build_key, probe, probe_key, 0..probe.len())
    }
}
