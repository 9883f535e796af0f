//! Core error types.

use thiserror::Error;

/// Errors raised by loading and join execution.
#[derive(Debug, Error)]
pub enum Error {
    /// A join was requested on a property the table does not carry.
    #[error("unknown join property '{property}'")]
    UnknownProperty { property: String },

    /// A dictionary key is already bound to a different value.
    #[error("dictionary conflict: key {key} is bound to '{existing}', refusing to rebind to '{incoming}'")]
    DictionaryConflict {
        key: u32,
        existing: String,
        incoming: String,
    },

    /// A string-typed object references a key its dictionary does not hold.
    #[error("dangling dictionary key {key} for property '{property}'")]
    DanglingKey { property: String, key: u64 },

    /// The probe phase received a build output produced by a different algorithm.
    #[error("build output mismatch: probe expected {expected}")]
    BuildOutputMismatch { expected: &'static str },

    /// A vertically partitioned table has columns of unequal length.
    #[error("column '{property}' holds {actual} items, expected {expected}")]
    ColumnMisalignment {
        property: String,
        expected: usize,
        actual: usize,
    },

    /// A worker thread panicked during a parallel join phase.
    #[error("join worker panicked during the {phase} phase")]
    WorkerPanic { phase: &'static str },

    /// A dataset line did not have subject/property/object shape.
    #[error("malformed triple line: '{0}'")]
    MalformedTriple(String),

    /// I/O error while reading a dataset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
