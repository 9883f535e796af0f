//! Data model: dictionary-encoded items and the interning dictionary.

mod dictionary;
mod item;

pub use dictionary::Dictionary;
pub use item::{DataType, Item};
