//! Tab-separated triple loader.
//!
//! Reads the WatDiv-style dump format, one fact per line:
//!
//! ```text
//! wsdbm:user0<TAB>wsdbm:follows<TAB>wsdbm:user24 .
//! wsdbm:user0<TAB>foaf:givenName<TAB>"LUKE" .
//! ```
//!
//! Subjects are resources with a numeric suffix, used directly as the
//! subject id. Objects are classified by shape: quoted or plain text
//! becomes a dictionary-interned string, an all-digit token a literal
//! integer, and a resource token an object id taken from its suffix.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::error::Error;
use crate::model::{DataType, Item};
use crate::table::Database;

/// Load a triple file into a fresh [`Database`].
pub fn load_file(path: impl AsRef<Path>) -> Result<Database, Error> {
    let path = path.as_ref();
    let db = load_reader(File::open(path)?)?;
    info!(
        path = %path.display(),
        relations = db.relation_count(),
        triples = db.triple_count(),
        "dataset loaded"
    );
    Ok(db)
}

/// Load triples from any reader.
pub fn load_reader(reader: impl Read) -> Result<Database, Error> {
    let mut db = Database::new();
    for line in BufReader::new(reader).lines() {
        parse_line(&mut db, &line?)?;
    }
    Ok(db)
}

fn parse_line(db: &mut Database, line: &str) -> Result<(), Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }
    let line = line.strip_suffix('.').map_or(line, str::trim_end);
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    let [subject, property, object] = fields[..] else {
        return Err(Error::MalformedTriple(line.to_string()));
    };
    let subject = numeric_suffix(subject).ok_or_else(|| Error::MalformedTriple(line.to_string()))?;
    let item = match classify(object) {
        ObjectShape::Integer(value) => Item::new(subject, value, DataType::Integer),
        ObjectShape::Resource(id) => Item::new(subject, id, DataType::Object),
        ObjectShape::Text(value) => {
            let key = db.intern_object(value);
            Item::new(subject, key as u64, DataType::String)
        }
    };
    db.insert(property, item);
    Ok(())
}

enum ObjectShape<'a> {
    Integer(u64),
    Resource(u64),
    Text(&'a str),
}

fn classify(token: &str) -> ObjectShape<'_> {
    if let Some(quoted) = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
    {
        return ObjectShape::Text(quoted);
    }
    if token.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(value) = token.parse() {
            return ObjectShape::Integer(value);
        }
    } else if token.contains(':') {
        if let Some(id) = numeric_suffix(token) {
            return ObjectShape::Resource(id);
        }
    }
    ObjectShape::Text(token)
}

/// Trailing digit run of a resource token, e.g. `wsdbm:user24` -> 24.
fn numeric_suffix(token: &str) -> Option<u64> {
    let digits = token.trim_end_matches(|c: char| !c.is_ascii_digit());
    let start = digits.len() - digits.bytes().rev().take_while(u8::is_ascii_digit).count();
    digits[start..].parse().ok()
}
