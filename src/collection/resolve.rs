//! Record inheritance resolution.
//!
//! A record may name one parent of the same kind through `inherits`. The
//! resolved view is the parent's flattened properties overlaid with the
//! record's own:
//!
//! ```text
//! Win7 ──inherits──▶ WinNT ──inherits──▶ Win32
//!
//! props(Win32)
//!   └─ overlay props(WinNT)   (redundancy check against the Win32 view)
//!        └─ overlay props(Win7)  (redundancy check against the WinNT view)
//! ```
//!
//! Re-declaring a property with exactly the value the parent already
//! resolves to is rejected. The walk keeps a visited set, so a malformed
//! cyclic table ends in [`Error::InheritanceCycle`] instead of recursing.

use super::records::{Record, RecordKind, RecordTable};
use crate::{Error, Properties, Result};
use serde::Serialize;
use std::collections::HashSet;

/// A record with its inheritance chain flattened away.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecord {
    pub name: String,
    pub properties: Properties,
}

pub(crate) fn resolve(kind: RecordKind, table: &RecordTable, name: &str) -> Result<ResolvedRecord> {
    let chain = chain(kind, table, name)?;

    // `chain` runs leaf first; fold from the root down.
    let mut links = chain.iter().rev();
    let mut properties = match links.next() {
        Some(root) => root.properties.clone(),
        None => Properties::new(),
    };

    let mut parent_name = chain.last().map(|r| r.name.as_str()).unwrap_or(name);
    for record in links {
        for (property, value) in &record.properties {
            if properties.get(property) == Some(value) {
                return Err(Error::Redundant {
                    kind,
                    name: record.name.clone(),
                    parent: parent_name.to_string(),
                    property: property.to_string(),
                });
            }
            properties.insert(property.clone(), value.clone());
        }
        parent_name = record.name.as_str();
    }

    Ok(ResolvedRecord { name: name.to_string(), properties })
}

/// Collects `name` and its ancestors, leaf first.
fn chain<'a>(kind: RecordKind, table: &'a RecordTable, name: &str) -> Result<Vec<&'a Record>> {
    let mut chain: Vec<&Record> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = name;

    loop {
        let record = table.get(current).ok_or_else(|| Error::UnknownRecord {
            kind,
            name: current.to_string(),
            available: table.names().map(str::to_string).collect(),
        })?;

        if !visited.insert(record.name.as_str()) {
            let mut cycle: Vec<String> = chain.iter().map(|r| r.name.clone()).collect();
            cycle.push(record.name.clone());
            return Err(Error::InheritanceCycle { kind, chain: cycle });
        }
        chain.push(record);

        match record.inherits.as_deref() {
            Some(parent) => current = parent,
            None => return Ok(chain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Property, PropertyValue};
    use serde_json::{Value, json};

    fn table(doc: Value) -> RecordTable {
        RecordTable::from_document(RecordKind::Platform, &doc).unwrap()
    }

    fn prop(name: &str) -> Property {
        Property::parse(name)
    }

    #[test]
    fn flattens_parent_properties() {
        let t = table(json!({ "platforms": {
            "A": { "properties": { "x": 1 } },
            "B": { "inherits": "A", "properties": { "y": 2 } }
        }}));

        let b = resolve(RecordKind::Platform, &t, "B").unwrap();
        assert_eq!(b.name, "B");
        assert_eq!(b.properties.len(), 2);
        assert_eq!(b.properties.get(&prop("x")), Some(&PropertyValue::from(1)));
        assert_eq!(b.properties.get(&prop("y")), Some(&PropertyValue::from(2)));
    }

    #[test]
    fn override_keeps_parent_position() {
        let t = table(json!({ "platforms": {
            "A": { "properties": { "x": 1, "z": 3 } },
            "B": { "inherits": "A", "properties": { "x": 2 } }
        }}));

        let b = resolve(RecordKind::Platform, &t, "B").unwrap();
        let keys: Vec<&str> = b.properties.keys().map(Property::as_str).collect();
        assert_eq!(keys, ["x", "z"]);
        assert_eq!(b.properties.get(&prop("x")), Some(&PropertyValue::from(2)));
    }

    #[test]
    fn identical_override_is_redundant() {
        let t = table(json!({ "platforms": {
            "A": { "properties": { "x": 1 } },
            "B": { "inherits": "A", "properties": { "x": 1 } }
        }}));

        let err = resolve(RecordKind::Platform, &t, "B").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Redundancy);
        assert!(
            matches!(err, Error::Redundant { ref name, ref parent, ref property, .. }
                if name == "B" && parent == "A" && property == "x")
        );
    }

    #[test]
    fn redundancy_is_checked_against_the_flattened_parent() {
        let t = table(json!({ "platforms": {
            "A": { "properties": { "x": 1 } },
            "B": { "inherits": "A", "properties": { "y": 2 } },
            "C": { "inherits": "B", "properties": { "x": 1 } }
        }}));

        let err = resolve(RecordKind::Platform, &t, "C").unwrap_err();
        assert!(matches!(err, Error::Redundant { ref parent, .. } if parent == "B"));
    }

    #[test]
    fn record_without_own_properties_inherits_everything() {
        let t = table(json!({ "platforms": {
            "A": { "properties": { "x": "a" } },
            "B": { "inherits": "A" }
        }}));

        let b = resolve(RecordKind::Platform, &t, "B").unwrap();
        assert_eq!(b.properties.get(&prop("x")), Some(&PropertyValue::from("a")));
    }

    #[test]
    fn unknown_name() {
        let t = table(json!({ "platforms": { "A": {} } }));
        let err = resolve(RecordKind::Platform, &t, "Nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
        assert!(err.to_string().contains("available: [A]"));
    }

    #[test]
    fn unknown_parent_is_reported_by_name() {
        let t = table(json!({ "platforms": { "B": { "inherits": "Gone" } } }));
        let err = resolve(RecordKind::Platform, &t, "B").unwrap_err();
        assert!(matches!(err, Error::UnknownRecord { ref name, .. } if name == "Gone"));
    }

    #[test]
    fn cycle_is_detected() {
        let t = table(json!({ "platforms": {
            "A": { "inherits": "C" },
            "B": { "inherits": "A" },
            "C": { "inherits": "B" }
        }}));

        let err = resolve(RecordKind::Platform, &t, "A").unwrap_err();
        match err {
            Error::InheritanceCycle { chain, .. } => assert_eq!(chain, ["A", "C", "B", "A"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_inheritance_is_a_cycle() {
        let t = table(json!({ "platforms": { "A": { "inherits": "A" } } }));
        let err = resolve(RecordKind::Platform, &t, "A").unwrap_err();
        assert!(matches!(err, Error::InheritanceCycle { .. }));
    }
}
