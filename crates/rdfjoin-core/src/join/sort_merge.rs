//! Sort-merge join over row tables.

use crate::error::Error;
use crate::join::{merge_rows, BuildOutput, JoinAlgorithm, JoinKey, JoinSide};
use crate::table::{JoinedRow, RowTable};

/// Sort both sides by integer join key, then merge with two cursors.
///
/// Keys are the raw subject or object integers; a string-typed object
/// joins on its dictionary encoding, which is only meaningful when both
/// sides share an object dictionary (as relations of one loaded dataset
/// and the outputs of prior joins do). Equal-key runs on both sides are
/// expanded to their full cross product, so duplicate join keys fan out
/// exactly as they do under the hash join.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortMergeJoin;

fn sorted_rows(table: &RowTable, key: JoinKey<'_>) -> Vec<(u64, JoinedRow)> {
    let mut rows = Vec::new();
    let Some(id) = table.property_id(key.property) else {
        return rows;
    };
    for row in table.rows() {
        if let Some(item) = row.values.get(&id) {
            let value = match key.side {
                JoinSide::Subject => row.subject,
                JoinSide::Object => item.object,
            };
            rows.push((value, row.clone()));
        }
    }
    rows.sort_unstable_by_key(|&(value, _)| value);
    rows
}

/// First index past the equal-key run starting at `start`.
fn run_end(rows: &[(u64, JoinedRow)], start: usize) -> usize {
    let value = rows[start].0;
    let mut end = start + 1;
    while end < rows.len() && rows[end].0 == value {
        end += 1;
    }
    end
}

impl JoinAlgorithm for SortMergeJoin {
    fn name(&self) -> &'static str {
        "sort-merge"
    }

    fn build(&self, table: &RowTable, key: JoinKey<'_>) -> Result<BuildOutput, Error> {
        Ok(BuildOutput::SortedRows(sorted_rows(table, key)))
    }

    fn probe(
        &self,
        built: BuildOutput,
        build: &RowTable,
        _build_key: JoinKey<'_>,
        probe: &RowTable,
        probe_key: JoinKey<'_>,
    ) -> Result<RowTable, Error> {
        let BuildOutput::SortedRows(build_rows) = built else {
            return Err(Error::BuildOutputMismatch {
                expected: "sorted rows",
            });
        };
        let probe_rows = sorted_rows(probe, probe_key);
        let mut out = RowTable::new(build.property_dict().clone(), build.object_dict().clone());

        let (mut i, mut j) = (0, 0);
        while i < build_rows.len() && j < probe_rows.len() {
            let build_value = build_rows[i].0;
            let probe_value = probe_rows[j].0;
            if build_value < probe_value {
                i += 1;
            } else if build_value > probe_value {
                j += 1;
            } else {
                let i_end = run_end(&build_rows, i);
                let j_end = run_end(&probe_rows, j);
                for (_, build_row) in &build_rows[i..i_end] {
                    for (_, probe_row) in &probe_rows[j..j_end] {
                        merge_rows(&mut out, build, build_row, probe, probe_row)?;
                    }
                }
                i = i_end;
                j = j_end;
            }
        }
        Ok(out)
    }
}
