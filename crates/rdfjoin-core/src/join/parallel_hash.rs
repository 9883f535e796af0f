//! Thread-partitioned hash join over row tables.

use std::collections::HashMap;
use std::thread;

use tracing::debug;

use crate::error::Error;
use crate::join::hash_join::{build_row_buckets, probe_with};
use crate::join::{BuildOutput, JoinAlgorithm, JoinKey};
use crate::table::{JoinedRow, RowTable};

/// Default worker count, clamped per phase to the input size.
pub const DEFAULT_WORKERS: usize = 8;

/// Hash join with both phases split round-robin across worker threads.
///
/// Worker `w` of `n` owns positions where `pos % n == w`. Each build
/// worker grows a private bucket map and each probe worker a private
/// result table; the only synchronization points are the two joins on
/// all worker handles, once after build and once after probe. Output
/// row order is partition concatenation order, not input order.
#[derive(Debug, Clone, Copy)]
pub struct ParallelHashJoin {
    workers: usize,
}

impl ParallelHashJoin {
    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Partitions for a phase: never more than one per row, never zero.
    fn partitions(&self, rows: usize) -> usize {
        self.workers.min(rows).max(1)
    }
}

impl Default for ParallelHashJoin {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinAlgorithm for ParallelHashJoin {
    fn name(&self) -> &'static str {
        "parallel-hash"
    }

    fn build(&self, table: &RowTable, key: JoinKey<'_>) -> Result<BuildOutput, Error> {
        let parts = self.partitions(table.len());
        debug!(parts, rows = table.len(), "parallel build");
        let locals = thread::scope(|scope| {
            let handles: Vec<_> = (0..parts)
                .map(|worker| {
                    scope.spawn(move || {
                        build_row_buckets(table, key, (worker..table.len()).step_by(parts))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        });

        let mut combined: HashMap<u64, Vec<JoinedRow>> = HashMap::new();
        for outcome in locals {
            let local = outcome.map_err(|_| Error::WorkerPanic { phase: "build" })??;
            for (hash, rows) in local {
                combined.entry(hash).or_default().extend(rows);
            }
        }
        Ok(BuildOutput::HashRows(combined))
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
        let parts = self.partitions(probe.len());
        debug!(parts, rows = probe.len(), "parallel probe");
        let partials = thread::scope(|scope| {
            let buckets = &buckets;
            let handles: Vec<_> = (0..parts)
                .map(|worker| {
                    scope.spawn(move || {
                        probe_with(
                            buckets,
                            build,
                            build_key,
                            probe,
                            probe_key,
                            (worker..probe.len()).step_by(parts),
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        });

        let mut out = RowTable::new(build.property_dict().clone(), build.object_dict().clone());
        for outcome in partials {
            let partial = outcome.map_err(|_| Error::WorkerPanic { phase: "probe" })??;
            out.merge_table(&partial)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::HashJoin;
    use crate::model::{DataType, Item};
    use std::collections::BTreeSet;

    fn relation(property: &str, facts: &[(u64, u64)]) -> RowTable {
        let mut table = RowTable::default();
        let id = table.intern_property(property);
        for &(subject, object) in facts {
            table.push(
                JoinedRow::new(subject).with_value(id, Item::new(subject, object, DataType::Object)),
            );
        }
        table
    }

    fn decoded_set(table: &RowTable) -> BTreeSet<Vec<(String, String)>> {
        table
            .decoded_rows()
            .unwrap()
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect()
    }

    #[test]
    fn matches_the_sequential_join_for_any_worker_count() {
        let follows = relation(
            "wsdbm:follows",
            &[(0, 24), (0, 27), (2, 24), (3, 24), (3, 31), (5, 99)],
        );
        let likes = relation("wsdbm:likes", &[(24, 25), (24, 31), (31, 40)]);
        let r_key = JoinKey::object("wsdbm:follows");
        let s_key = JoinKey::subject("wsdbm:likes");

        let sequential = HashJoin.join(&follows, r_key, &likes, s_key).unwrap();
        for workers in [1, 2, 64] {
            let parallel = ParallelHashJoin::with_workers(workers)
                .join(&follows, r_key, &likes, s_key)
                .unwrap();
            assert_eq!(decoded_set(&parallel), decoded_set(&sequential));
        }
    }

    #[test]
    fn empty_probe_side_yields_an_empty_table() {
        let mut empty = RowTable::default();
        empty.intern_property("wsdbm:likes");
        let follows = relation("wsdbm:follows", &[(0, 24)]);
        let joined = ParallelHashJoin::new()
            .join(
                &follows,
                JoinKey::object("wsdbm:follows"),
                &empty,
                JoinKey::subject("wsdbm:likes"),
            )
            .unwrap();
        assert!(joined.is_empty());
    }
}
