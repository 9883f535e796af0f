//! Row-oriented multi-property table.

use std::collections::{BTreeMap, HashMap};

use crate::error::Error;
use crate::model::{DataType, Dictionary, Item};

/// One result record: a subject and its property/value map.
///
/// Values are keyed by property id from the owning table's property
/// dictionary. Two rows with the same subject but different property
/// values are distinct records; joins never deduplicate across paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRow {
    pub subject: u64,
    pub values: HashMap<u32, Item>,
}

impl JoinedRow {
    pub fn new(subject: u64) -> Self {
        Self {
            subject,
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, property_id: u32, item: Item) -> Self {
        self.values.insert(property_id, item);
        self
    }
}

/// Multi-property table laid out as one record per subject tuple.
///
/// Owns its two dictionaries: the property dictionary mapping property
/// names to the ids used inside rows, and the object dictionary for
/// string-typed values. Join outputs seed both from the build side and
/// grow them through find-or-insert, so a table handed to a further join
/// is always internally consistent.
#[derive(Debug, Clone, Default)]
pub struct RowTable {
    properties: Vec<u32>,
    property_dict: Dictionary,
    object_dict: Dictionary,
    rows: Vec<JoinedRow>,
}

impl RowTable {
    pub fn new(property_dict: Dictionary, object_dict: Dictionary) -> Self {
        Self {
            properties: Vec::new(),
            property_dict,
            object_dict,
            rows: Vec::new(),
        }
    }

    /// Intern a property name and record it in the table's property set.
    pub fn intern_property(&mut self, name: &str) -> u32 {
        let id = self.property_dict.put(name);
        if !self.properties.contains(&id) {
            self.properties.push(id);
        }
        id
    }

    /// Intern a string object value into the object dictionary.
    pub fn intern_object(&mut self, value: &str) -> u32 {
        self.object_dict.put(value)
    }

    /// Append a row. Property ids the table has not seen yet are added to
    /// its property set in order of first appearance.
    pub fn push(&mut self, row: JoinedRow) {
        for &id in row.values.keys() {
            if !self.properties.contains(&id) {
                self.properties.push(id);
            }
        }
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ordered property names present in this table.
    pub fn properties(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter_map(|&id| self.property_dict.get(id))
            .collect()
    }

    pub fn property_id(&self, name: &str) -> Option<u32> {
        self.property_dict
            .key_of(name)
            .filter(|id| self.properties.contains(id))
    }

    pub fn property_name(&self, id: u32) -> Option<&str> {
        self.property_dict.get(id)
    }

    pub fn property_dict(&self) -> &Dictionary {
        &self.property_dict
    }

    pub fn object_dict(&self) -> &Dictionary {
        &self.object_dict
    }

    /// Number of rows that hold `property` (the join cardinality used for
    /// build-side selection).
    pub fn key_cardinality(&self, property: &str) -> usize {
        match self.property_dict.key_of(property) {
            Some(id) => self
                .rows
                .iter()
                .filter(|row| row.values.contains_key(&id))
                .count(),
            None => 0,
        }
    }

    /// Copy every row of `other` into this table, remapping property ids
    /// through property names and re-interning string objects through the
    /// object dictionaries (find-or-insert), so both tables' encodings
    /// become mutually consistent.
    pub fn merge_table(&mut self, other: &RowTable) -> Result<(), Error> {
        for name in other.properties() {
            self.intern_property(name);
        }
        for row in &other.rows {
            let mut values = HashMap::with_capacity(row.values.len());
            for (&other_id, item) in &row.values {
                let name = other.property_name(other_id).ok_or(Error::DanglingKey {
                    property: format!("#{other_id}"),
                    key: other_id as u64,
                })?;
                let id = self.intern_property(name);
                values.insert(id, remap_object(item, name, &other.object_dict, &mut self.object_dict)?);
            }
            self.rows.push(JoinedRow {
                subject: row.subject,
                values,
            });
        }
        Ok(())
    }

    /// Decode every row into property-name/value maps, resolving
    /// string-typed objects through the object dictionary.
    ///
    /// Fails loudly on a dangling key rather than misdecoding.
    pub fn decoded_rows(&self) -> Result<Vec<BTreeMap<String, String>>, Error> {
        let mut decoded = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut record = BTreeMap::new();
            for (&id, item) in &row.values {
                let name = self.property_name(id).ok_or(Error::DanglingKey {
                    property: format!("#{id}"),
                    key: id as u64,
                })?;
                let value = match item.data_type {
                    DataType::String => resolve_object(item, name, &self.object_dict)?.to_string(),
                    DataType::Integer | DataType::Object => item.object.to_string(),
                };
                record.insert(name.to_string(), value);
            }
            decoded.push(record);
        }
        Ok(decoded)
    }
}

/// Resolve a string-typed object through its owning dictionary.
pub(crate) fn resolve_object<'a>(
    item: &Item,
    property: &str,
    dict: &'a Dictionary,
) -> Result<&'a str, Error> {
    let key = u32::try_from(item.object).map_err(|_| Error::DanglingKey {
        property: property.to_string(),
        key: item.object,
    })?;
    dict.get(key).ok_or_else(|| Error::DanglingKey {
        property: property.to_string(),
        key: item.object,
    })
}

/// Copy an item across dictionaries: string objects are resolved through
/// the source dictionary and re-interned into the target; everything else
/// is copied unchanged.
pub(crate) fn remap_object(
    item: &Item,
    property: &str,
    source: &Dictionary,
    target: &mut Dictionary,
) -> Result<Item, Error> {
    match item.data_type {
        DataType::String => {
            let value = resolve_object(item, property, source)?;
            Ok(Item::new(item.subject, target.put(value) as u64, DataType::String))
        }
        DataType::Integer | DataType::Object => Ok(*item),
    }
}
