//! Loaded dataset: per-property relations plus the shared dictionaries.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Error;
use crate::model::{Dictionary, Item};
use crate::table::{Column, ColumnTable, JoinedRow, Relation, RowTable};

/// All relations of a loaded dataset.
///
/// String-typed objects across every relation are encoded against one
/// shared object dictionary, and property names against one shared
/// property dictionary, so any pair of relations can be joined without a
/// remapping pass first.
#[derive(Debug, Clone, Default)]
pub struct Database {
    relations: HashMap<String, Relation>,
    property_dict: Dictionary,
    object_dict: Dictionary,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fact under `property`, creating the relation on first use.
    pub fn insert(&mut self, property: &str, item: Item) {
        self.property_dict.put(property);
        self.relations
            .entry(property.to_string())
            .or_insert_with(|| Relation::new(property))
            .insert(item);
    }

    /// Intern a string object value for use in an [`Item`].
    pub fn intern_object(&mut self, value: &str) -> u32 {
        self.object_dict.put(value)
    }

    pub fn relation(&self, property: &str) -> Option<&Relation> {
        self.relations.get(property)
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn triple_count(&self) -> usize {
        self.relations.values().map(Relation::len).sum()
    }

    pub fn property_dict(&self) -> &Dictionary {
        &self.property_dict
    }

    pub fn object_dict(&self) -> &Dictionary {
        &self.object_dict
    }

    /// Materialize one relation as a row-oriented table.
    pub fn row_table(&self, property: &str) -> Result<RowTable, Error> {
        let relation = self.relations.get(property).ok_or(Error::UnknownProperty {
            property: property.to_string(),
        })?;
        let mut table = RowTable::new(Dictionary::new(), self.object_dict.clone());
        let id = table.intern_property(property);
        for item in relation.items() {
            table.push(JoinedRow::new(item.subject).with_value(id, *item));
        }
        debug!(property, rows = table.len(), "materialized row table");
        Ok(table)
    }

    /// Materialize one relation as a single-column vertical partition.
    pub fn column_table(&self, property: &str) -> Result<ColumnTable, Error> {
        let relation = self.relations.get(property).ok_or(Error::UnknownProperty {
            property: property.to_string(),
        })?;
        let mut column = Column::new(self.object_dict.clone());
        for item in relation.items() {
            column.push(*item);
        }
        let mut table = ColumnTable::new();
        table.set_column(property, column);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataType;

    fn sample() -> Database {
        let mut db = Database::new();
        let luke = db.intern_object("LUKE") as u64;
        db.insert("foaf:givenName", Item::new(0, luke, DataType::String));
        db.insert("wsdbm:userId", Item::new(0, 1806723, DataType::Integer));
        db.insert("wsdbm:follows", Item::new(0, 24, DataType::Object));
        db.insert("wsdbm:follows", Item::new(0, 27, DataType::Object));
        db
    }

    #[test]
    fn relations_share_the_object_dictionary() {
        let mut db = sample();
        let key = db.intern_object("LUKE");
        assert_eq!(key, 1);
        assert_eq!(db.relation_count(), 3);
        assert_eq!(db.triple_count(), 4);
        assert_eq!(db.relation("wsdbm:follows").map(Relation::len), Some(2));
    }

    #[test]
    fn row_table_carries_decodable_strings() {
        let db = sample();
        let table = db.row_table("foaf:givenName").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.decoded_rows().unwrap()[0]["foaf:givenName"], "LUKE");
    }

    #[test]
    fn unknown_property_is_an_error() {
        let db = sample();
        assert!(matches!(
            db.row_table("wsdbm:likes"),
            Err(Error::UnknownProperty { .. })
        ));
        assert!(db.column_table("wsdbm:likes").is_err());
    }
}
