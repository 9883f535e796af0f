//! Table layouts the join algorithms operate on.
//!
//! A [`Relation`] holds the facts of a single property as loaded. Joins
//! consume and produce multi-property tables in one of two layouts: the
//! row-oriented [`RowTable`] (one record per subject with an embedded
//! property/value map) and the vertically partitioned [`ColumnTable`]
//! (one item array per property, aligned by position).

mod column_table;
mod database;
mod relation;
mod row_table;

pub use column_table::{Column, ColumnTable};
pub use database::Database;
pub use relation::Relation;
pub use row_table::{JoinedRow, RowTable};

pub(crate) use row_table::resolve_object;
