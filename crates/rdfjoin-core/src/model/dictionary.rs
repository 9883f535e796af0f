//! Bidirectional string/integer interning table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Maps strings to dense integer keys and back.
///
/// Keys are assigned sequentially starting at 1; 0 is reserved so a zero
/// key can double as an "absent" sentinel. `put` is idempotent: interning
/// the same string twice returns the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    values: HashMap<u32, String>,
    inverted: HashMap<String, u32>,
    next_key: u32,
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            inverted: HashMap::new(),
            next_key: 1,
        }
    }

    /// Intern a value, returning its stable key (find-or-insert).
    pub fn put(&mut self, value: &str) -> u32 {
        if let Some(&key) = self.inverted.get(value) {
            return key;
        }
        let key = self.next_key;
        self.next_key += 1;
        self.values.insert(key, value.to_string());
        self.inverted.insert(value.to_string(), key);
        key
    }

    /// Resolve a key back to its string value.
    pub fn get(&self, key: u32) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Look up the key for an already-interned value.
    pub fn key_of(&self, value: &str) -> Option<u32> {
        self.inverted.get(value).copied()
    }

    pub fn contains_key(&self, key: u32) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bind an explicit key to a value, failing loudly if the key is
    /// already bound to a different value.
    pub fn insert_binding(&mut self, key: u32, value: &str) -> Result<(), Error> {
        match self.values.get(&key) {
            Some(existing) if existing != value => Err(Error::DictionaryConflict {
                key,
                existing: existing.clone(),
                incoming: value.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.values.insert(key, value.to_string());
                self.inverted.insert(value.to_string(), key);
                self.next_key = self.next_key.max(key + 1);
                Ok(())
            }
        }
    }

    /// Intern every value of `other` into this dictionary and return the
    /// remapping from `other`'s keys to this dictionary's keys.
    ///
    /// Merging never copies raw keys, so two independently grown
    /// dictionaries can never end up with one key bound to two values;
    /// callers must rewrite encoded values through the returned map.
    pub fn merge_values(&mut self, other: &Dictionary) -> HashMap<u32, u32> {
        let mut remap = HashMap::with_capacity(other.len());
        for (&other_key, value) in &other.values {
            remap.insert(other_key, self.put(value));
        }
        remap
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}
