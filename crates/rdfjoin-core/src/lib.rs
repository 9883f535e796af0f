//! Join-execution engine for RDF-style triple data.
//!
//! Triples are loaded into per-property relations with string values
//! compressed through dictionaries; multi-way joins are evaluated as
//! chains of two-table joins under one of three interchangeable
//! algorithms (hash, sort-merge, parallel hash) over a row-oriented or
//! vertically partitioned layout.
//!
//! ```
//! use rdfjoin_core::join::{HashJoin, JoinAlgorithm, JoinKey};
//! use rdfjoin_core::loader::load_reader;
//!
//! let data = "wsdbm:user0\twsdbm:follows\twsdbm:user24 .\n\
//!             wsdbm:user24\twsdbm:likes\twsdbm:product25 .\n";
//! let db = load_reader(data.as_bytes()).unwrap();
//! let joined = HashJoin
//!     .join(
//!         &db.row_table("wsdbm:follows").unwrap(),
//!         JoinKey::object("wsdbm:follows"),
//!         &db.row_table("wsdbm:likes").unwrap(),
//!         JoinKey::subject("wsdbm:likes"),
//!     )
//!     .unwrap();
//! assert_eq!(joined.len(), 1);
//! ```

pub mod error;
pub mod hash;
pub mod join;
pub mod loader;
pub mod model;
pub mod table;
pub mod timing;

pub use error::Error;
pub use join::{
    ColumnHashJoin, ColumnJoinAlgorithm, HashJoin, JoinAlgorithm, JoinKey, JoinSide,
    ParallelColumnHashJoin, ParallelHashJoin, SortMergeJoin,
};
pub use model::{DataType, Dictionary, Item};
pub use table::{Column, ColumnTable, Database, JoinedRow, Relation, RowTable};
