//! Elementary facts: a subject paired with a typed object value.

use serde::{Deserialize, Serialize};

/// How the `object` field of an [`Item`] must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// `object` is a dictionary key; resolve it through the owning dictionary.
    String,
    /// `object` is a literal numeric value, stored directly.
    Integer,
    /// `object` is a resource identifier taken from the source data's
    /// numeric suffix. Never dictionary-encoded, but distinct from
    /// `Integer`: it denotes identity, not a quantity.
    Object,
}

/// An elementary fact of one property: subject and typed object.
///
/// Subjects are dense integers assigned at load time and are never looked
/// up through a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub subject: u64,
    pub object: u64,
    pub data_type: DataType,
}

impl Item {
    pub fn new(subject: u64, object: u64, data_type: DataType) -> Self {
        Self {
            subject,
            object,
            data_type,
        }
    }
}
