//! Record store for platform and engine definitions.
//!
//! A table is loaded from one document and replaced wholesale by the next
//! document of the same kind. Records are kept exactly as declared; the
//! `inherits` link is only followed by `resolve.rs`.

use super::validate;
use crate::{Error, Properties, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The two record families kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Platform,
    Engine,
}

impl RecordKind {
    /// Top-level key of the document holding this kind.
    pub fn document_key(self) -> &'static str {
        match self {
            RecordKind::Platform => "platforms",
            RecordKind::Engine => "engines",
        }
    }

    /// The keyword a user agent entry uses to reference this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            RecordKind::Platform => "platform",
            RecordKind::Engine => "engine",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Platform => f.write_str("platform"),
            RecordKind::Engine => f.write_str("rendering engine"),
        }
    }
}

/// A platform or engine definition as declared in its source document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub(crate) name: String,
    pub(crate) properties: Properties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) inherits: Option<String>,
}

impl Record {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Own properties only; see [`Collection::platform`](crate::Collection::platform)
    /// for the flattened view.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn inherits(&self) -> Option<&str> {
        self.inherits.as_deref()
    }
}

/// All records of one kind, keyed by name in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordTable {
    records: IndexMap<String, Record>,
}

impl RecordTable {
    /// Builds a table from a `{"platforms": {...}}` / `{"engines": {...}}` document.
    pub(crate) fn from_document(kind: RecordKind, document: &Value) -> Result<Self> {
        let entries = document
            .get(kind.document_key())
            .and_then(Value::as_object)
            .ok_or(Error::InvalidDocument { expected: kind.document_key() })?;

        let mut records = IndexMap::with_capacity(entries.len());
        for (name, entry) in entries {
            let record = parse_record(kind, name, entry)?;
            records.insert(name.clone(), record);
        }

        Ok(RecordTable { records })
    }

    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_record(kind: RecordKind, name: &str, entry: &Value) -> Result<Record> {
    let fields = entry
        .as_object()
        .ok_or_else(|| Error::malformed(name, format!("each {} entry has to be an object", kind.keyword())))?;

    let properties = match fields.get("properties") {
        Some(value) => validate::properties(name, value)?,
        None => Properties::new(),
    };

    let inherits = match fields.get("inherits") {
        Some(Value::String(parent)) => Some(parent.clone()),
        Some(_) => return Err(Error::malformed(name, "the inherits entry has to be a string")),
        None => None,
    };

    for field in fields.keys().filter(|k| !matches!(k.as_str(), "properties" | "inherits")) {
        tracing::warn!(%kind, record = name, field = field.as_str(), "ignoring unknown record field");
    }

    Ok(Record { name: name.to_string(), properties, inherits })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Property, PropertyValue};
    use serde_json::json;

    #[test]
    fn loads_records_in_source_order() {
        let doc = json!({
            "platforms": {
                "WinNT": { "properties": { "Platform": "WinNT", "Win32": true } },
                "Win7": { "inherits": "WinNT", "properties": { "Platform": "Win7" } },
                "Linux": {}
            }
        });

        let table = RecordTable::from_document(RecordKind::Platform, &doc).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), ["WinNT", "Win7", "Linux"]);

        let win7 = table.get("Win7").unwrap();
        assert_eq!(win7.inherits(), Some("WinNT"));
        assert_eq!(win7.properties().get(&Property::Platform), Some(&PropertyValue::from("Win7")));
        assert!(table.get("Linux").unwrap().properties().is_empty());
    }

    #[test]
    fn document_key_must_match_kind() {
        let doc = json!({ "platforms": {} });
        let err = RecordTable::from_document(RecordKind::Engine, &doc).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { expected: "engines" }));
    }

    #[test]
    fn inherits_must_be_a_string() {
        let doc = json!({ "engines": { "Blink": { "inherits": ["WebKit"] } } });
        let err = RecordTable::from_document(RecordKind::Engine, &doc).unwrap_err();
        assert!(matches!(err, Error::Malformed { ref key, .. } if key == "Blink"));
    }
}
