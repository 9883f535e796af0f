//! Vertically partitioned multi-property table.

use std::collections::HashMap;

use crate::error::Error;
use crate::model::{DataType, Dictionary, Item};
use crate::table::{JoinedRow, RowTable};

/// One vertical partition: the items of a single property plus the
/// dictionary its string-typed objects are encoded against.
///
/// Each column carries its own dictionary. Properties never share keys,
/// so appending a column to a table needs no remapping; only merging two
/// columns of the *same* property does.
#[derive(Debug, Clone, Default)]
pub struct Column {
    dict: Dictionary,
    items: Vec<Item>,
}

impl Column {
    pub fn new(dict: Dictionary) -> Self {
        Self {
            dict,
            items: Vec::new(),
        }
    }

    pub fn dict(&self) -> &Dictionary {
        &self.dict
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Intern a string value into this column's dictionary.
    pub fn intern(&mut self, value: &str) -> u32 {
        self.dict.put(value)
    }

    /// Append another column of the same property, re-interning its
    /// string-typed objects through this column's dictionary.
    pub fn merge(&mut self, property: &str, other: &Column) -> Result<(), Error> {
        let remap = self.dict.merge_values(&other.dict);
        for item in &other.items {
            self.items.push(remap_item(item, property, &remap)?);
        }
        Ok(())
    }
}

fn remap_item(item: &Item, property: &str, remap: &HashMap<u32, u32>) -> Result<Item, Error> {
    match item.data_type {
        DataType::String => {
            let key = u32::try_from(item.object)
                .ok()
                .and_then(|k| remap.get(&k).copied())
                .ok_or(Error::DanglingKey {
                    property: property.to_string(),
                    key: item.object,
                })?;
            Ok(Item::new(item.subject, key as u64, DataType::String))
        }
        DataType::Integer | DataType::Object => Ok(*item),
    }
}

/// Multi-property table laid out as one item array per property.
///
/// Columns are aligned by position: the items at position `i` across all
/// columns form record `i`. Join outputs preserve this alignment by
/// appending to every column once per match.
#[derive(Debug, Clone, Default)]
pub struct ColumnTable {
    columns: Vec<(String, Column)>,
}

impl ColumnTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a column under `property`, replacing any existing one.
    pub fn set_column(&mut self, property: impl Into<String>, column: Column) {
        let property = property.into();
        match self.columns.iter_mut().find(|(p, _)| *p == property) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((property, column)),
        }
    }

    pub fn column(&self, property: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, c)| c)
    }

    pub fn column_mut(&mut self, property: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|(p, _)| p == property)
            .map(|(_, c)| c)
    }

    /// Iterate `(property, column)` pairs in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(p, c)| (p.as_str(), c))
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.columns.iter().any(|(p, _)| p == property)
    }

    /// Ordered property names present in this table.
    pub fn properties(&self) -> Vec<&str> {
        self.columns.iter().map(|(p, _)| p.as_str()).collect()
    }

    /// Number of aligned records, taken from the first column.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Join cardinality of one property: the length of its column.
    pub fn key_cardinality(&self, property: &str) -> usize {
        self.column(property).map_or(0, Column::len)
    }

    /// Verify that every column holds the same number of items.
    pub fn check_alignment(&self) -> Result<(), Error> {
        let expected = self.len();
        for (property, column) in &self.columns {
            if column.len() != expected {
                return Err(Error::ColumnMisalignment {
                    property: property.clone(),
                    expected,
                    actual: column.len(),
                });
            }
        }
        Ok(())
    }

    /// Pivot into the row-oriented layout, re-interning every column's
    /// string objects through one shared output dictionary.
    pub fn to_row_table(&self) -> Result<RowTable, Error> {
        self.check_alignment()?;
        let mut out = RowTable::default();
        let ids: Vec<u32> = self
            .columns
            .iter()
            .map(|(p, _)| out.intern_property(p))
            .collect();
        for pos in 0..self.len() {
            let mut row: Option<JoinedRow> = None;
            for ((property, column), &id) in self.columns.iter().zip(&ids) {
                let item = column.items()[pos];
                let item = match item.data_type {
                    DataType::String => {
                        let key = u32::try_from(item.object)
                            .ok()
                            .and_then(|k| column.dict().get(k))
                            .ok_or(Error::DanglingKey {
                                property: property.clone(),
                                key: item.object,
                            })?;
                        let key = out.intern_object(key);
                        Item::new(item.subject, key as u64, DataType::String)
                    }
                    DataType::Integer | DataType::Object => item,
                };
                let row = row.get_or_insert_with(|| JoinedRow::new(item.subject));
                row.values.insert(id, item);
            }
            if let Some(row) = row {
                out.push(row);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_of(values: &[(u64, &str)]) -> Column {
        let mut column = Column::new(Dictionary::new());
        for &(subject, value) in values {
            let key = column.intern(value);
            column.push(Item::new(subject, key as u64, DataType::String));
        }
        column
    }

    #[test]
    fn columns_keep_insertion_order() {
        let mut table = ColumnTable::new();
        table.set_column("wsdbm:follows", Column::default());
        table.set_column("wsdbm:likes", Column::default());
        assert_eq!(table.properties(), vec!["wsdbm:follows", "wsdbm:likes"]);
        assert!(table.has_property("wsdbm:likes"));
        assert!(!table.has_property("rev:title"));
    }

    #[test]
    fn merge_remaps_string_keys_between_column_dictionaries() {
        let mut left = column_of(&[(0, "LUKE")]);
        let right = column_of(&[(2, "HAN"), (24, "LEA")]);
        left.merge("foaf:givenName", &right).unwrap();

        assert_eq!(left.len(), 3);
        let decoded: Vec<&str> = left
            .items()
            .iter()
            .map(|i| left.dict().get(i.object as u32).unwrap())
            .collect();
        assert_eq!(decoded, vec!["LUKE", "HAN", "LEA"]);
    }

    #[test]
    fn misaligned_columns_are_rejected() {
        let mut table = ColumnTable::new();
        table.set_column("a", column_of(&[(0, "x"), (1, "y")]));
        table.set_column("b", column_of(&[(0, "z")]));
        assert!(matches!(
            table.check_alignment(),
            Err(Error::ColumnMisalignment { expected: 2, actual: 1, .. })
        ));
        assert!(table.to_row_table().is_err());
    }

    #[test]
    fn pivoting_to_rows_shares_one_dictionary() {
        let mut table = ColumnTable::new();
        table.set_column("foaf:givenName", column_of(&[(0, "LUKE"), (2, "HAN")]));
        table.set_column("rev:title", column_of(&[(0, "LUKE"), (2, "fine")]));

        let rows = table.to_row_table().unwrap();
        assert_eq!(rows.len(), 2);
        // "LUKE" appears in both columns but is interned once
        assert_eq!(rows.object_dict().len(), 3);
        let decoded = rows.decoded_rows().unwrap();
        assert_eq!(decoded[0]["foaf:givenName"], "LUKE");
        assert_eq!(decoded[0]["rev:title"], "LUKE");
        assert_eq!(decoded[1]["rev:title"], "fine");
    }
}
