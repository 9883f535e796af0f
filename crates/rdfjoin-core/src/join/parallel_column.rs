//! Thread-partitioned hash join over vertically partitioned tables.

use std::collections::HashMap;
use std::thread;

use tracing::debug;

use crate::error::Error;
use crate::join::column_hash::probe_positions;
use crate::join::input::build_positions;
use crate::join::{BuildOutput, ColumnJoinAlgorithm, JoinInput, JoinKey};
use crate::table::ColumnTable;

/// Columnar hash join with round-robin thread partitioning.
///
/// Build workers bucket worker-local indices to keep their state fully
/// private; the merge at the build barrier converts local index `i` of
/// worker `w` (out of `n`) back to the global position `i * n + w`, the
/// inverse of the round-robin split. Probe workers each produce a
/// partial result table, concatenated in worker order at the second
/// barrier.
#[derive(Debug, Clone, Copy)]
pub struct ParallelColumnHashJoin {
    workers: usize,
}

impl ParallelColumnHashJoin {
    pub fn new() -> Self {
        Self {
            workers: super::DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    fn partitions(&self, rows: usize) -> usize {
        self.workers.min(rows).max(1)
    }
}

impl Default for ParallelColumnHashJoin {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnJoinAlgorithm for ParallelColumnHashJoin {
    fn name(&self) -> &'static str {
        "parallel-column-hash"
    }

    fn build(&self, table: &ColumnTable, key: JoinKey<'_>) -> Result<BuildOutput, Error> {
        let count = table.position_count(key);
        let parts = self.partitions(count);
        debug!(parts, rows = count, "parallel columnar build");
        let locals = thread::scope(|scope| {
            let handles: Vec<_> = (0..parts)
                .map(|worker| {
                    scope.spawn(move || {
                        build_positions(table, key, (worker..count).step_by(parts).enumerate())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        });

        let mut combined: HashMap<u64, Vec<usize>> = HashMap::new();
        for (worker, outcome) in locals.into_iter().enumerate() {
            let local = outcome.map_err(|_| Error::WorkerPanic { phase: "build" })??;
            for (hash, indices) in local {
                combined
                    .entry(hash)
                    .or_default()
                    .extend(indices.into_iter().map(|local| local * parts + worker));
            }
        }
        Ok(BuildOutput::HashPositions(combined))
    }

    fn probe(
        &self,
        built: BuildOutput,
        build: &ColumnTable,
        build_key: JoinKey<'_>,
        probe: &ColumnTable,
        probe_key: JoinKey<'_>,
    ) -> Result<ColumnTable, Error> {
        let BuildOutput::HashPositions(buckets) = built else {
            return Err(Error::BuildOutputMismatch {
                expected: "hash positions",
            });
        };
        let count = probe.position_count(probe_key);
        let parts = self.partitions(count);
        debug!(parts, rows = count, "parallel columnar probe");
        let partials = thread::scope(|scope| {
            let buckets = &buckets;
            let handles: Vec<_> = (0..parts)
                .map(|worker| {
                    scope.spawn(move || {
                        probe_positions(
                            buckets,
                            build,
                            build_key,
                            probe,
                            probe_key,
                            (worker..count).step_by(parts),
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        });

        let mut out = ColumnTable::new();
        for outcome in partials {
            let partial = outcome.map_err(|_| Error::WorkerPanic { phase: "probe" })??;
            for (property, column) in partial.columns() {
                match out.column_mut(property) {
                    Some(target) => target.merge(property, column)?,
                    None => out.set_column(property, column.clone()),
                }
            }
        }
        Ok(out)
    }
}
