//! Structural checks applied while a division document is ingested.
//!
//! Every check either passes or returns the error that aborts the whole
//! load call. The checks run before a [`Division`](super::Division) is
//! materialized, so a constructed division is always valid.
//!
//! ## Rules enforced here
//!
//! - `division` and `sortIndex` are present and non-empty.
//! - Property maps are objects of scalars.
//! - Every user agent declares `Parent`; no child does.
//! - No property map carries platform or engine fields (those belong to the
//!   record store).
//! - `children` is a list of objects, each with a `match` string.
//!
//! Key uniqueness lives in `dedup.rs`.

use super::division::{Child, UserAgent};
use super::records::RecordKind;
use crate::{Error, Properties, Property, PropertyDomain, PropertyValue, Result};
use serde_json::{Map, Value};

/// Returns true if `properties` declares any platform-only field.
pub fn has_platform_property(properties: &Properties) -> bool {
    leaked_property(properties, PropertyDomain::PLATFORM).is_some()
}

/// Returns true if `properties` declares any engine-only field.
pub fn has_engine_property(properties: &Properties) -> bool {
    leaked_property(properties, PropertyDomain::ENGINE).is_some()
}

fn leaked_property(properties: &Properties, domain: PropertyDomain) -> Option<&Property> {
    properties.keys().find(|p| p.domain().intersects(domain))
}

/// Rejects platform and engine fields in a user agent or child property map.
pub(crate) fn ensure_no_domain_leak(key: &str, properties: &Properties) -> Result<()> {
    const RESERVED: [(PropertyDomain, RecordKind); 2] =
        [(PropertyDomain::PLATFORM, RecordKind::Platform), (PropertyDomain::ENGINE, RecordKind::Engine)];

    for (domain, kind) in RESERVED {
        if let Some(property) = leaked_property(properties, domain) {
            return Err(Error::DomainLeak { key: key.to_string(), property: property.to_string(), kind });
        }
    }
    Ok(())
}

/// Parses a property object. `key` names the owner in error messages.
pub(crate) fn properties(key: &str, value: &Value) -> Result<Properties> {
    let object = value.as_object().ok_or_else(|| Error::malformed(key, "the properties entry has to be an object"))?;

    let mut properties = Properties::with_capacity(object.len());
    for (name, raw) in object {
        let value = PropertyValue::from_json(raw)
            .ok_or_else(|| Error::malformed(key, format!("the value of property \"{name}\" has to be a scalar")))?;
        properties.insert(Property::parse(name), value);
    }
    Ok(properties)
}

/// Header fields of a division document.
#[derive(Debug)]
pub(crate) struct Header {
    pub name: String,
    pub sort_index: i64,
    pub lite: bool,
    pub versions: Vec<String>,
}

pub(crate) fn header(document: &Map<String, Value>) -> Result<Header> {
    let name = match document.get("division") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(Value::String(_) | Value::Null) | None => return Err(Error::MissingField { field: "division" }),
        Some(_) => return Err(Error::malformed("division", "the division name has to be a string")),
    };

    let sort_index = match document.get("sortIndex") {
        None | Some(Value::Null) => return Err(Error::MissingField { field: "sortIndex" }),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| Error::malformed(name.as_str(), "the sortIndex has to be an integer"))?,
    };
    if sort_index == 0 {
        return Err(Error::MissingField { field: "sortIndex" });
    }

    let lite = match document.get("lite") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(lite)) => *lite,
        Some(_) => return Err(Error::malformed(name.as_str(), "the lite flag has to be a boolean")),
    };

    let versions = match document.get("versions") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(Error::malformed(name.as_str(), "each version has to be a string or a number")),
            })
            .collect::<Result<_>>()?,
        Some(_) => return Err(Error::malformed(name.as_str(), "the versions entry has to be a list")),
    };

    Ok(Header { name, sort_index, lite, versions })
}

/// The raw `userAgents` list; absent means an empty division.
pub(crate) fn user_agent_list<'a>(division: &str, document: &'a Map<String, Value>) -> Result<&'a [Value]> {
    match document.get("userAgents") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(Error::malformed(division, "the userAgents entry has to be a list")),
    }
}

/// Validates one `userAgents` entry and builds it.
pub(crate) fn user_agent(division: &str, entry: &Value) -> Result<UserAgent> {
    let fields =
        entry.as_object().ok_or_else(|| Error::malformed(division, "each userAgents entry has to be an object"))?;

    let key = match fields.get("userAgent") {
        Some(Value::String(key)) if !key.is_empty() => key.as_str(),
        _ => return Err(Error::malformed(division, "each userAgents entry requires a \"userAgent\" string")),
    };

    let properties = match fields.get("properties") {
        Some(value) => properties(key, value)?,
        None => return Err(Error::malformed(key, "the properties entry has to be an object")),
    };

    match properties.get(&Property::Parent) {
        None => return Err(Error::MissingParent { key: key.to_string() }),
        Some(PropertyValue::Text(parent)) if !parent.is_empty() => {}
        Some(_) => return Err(Error::malformed(key, "the Parent property has to be a non-empty string")),
    }

    ensure_no_domain_leak(key, &properties)?;

    let children = match fields.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => children(key, value)?,
    };

    Ok(UserAgent { user_agent: key.to_string(), properties, children })
}

fn children(key: &str, value: &Value) -> Result<Vec<Child>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::malformed(key, "the children property has to be a list of objects"))?;

    items.iter().map(|item| child(key, item)).collect()
}

fn child(parent_key: &str, item: &Value) -> Result<Child> {
    let fields = item
        .as_object()
        .ok_or_else(|| Error::malformed(parent_key, "each entry of the children property has to be an object"))?;

    let pattern = match fields.get("match") {
        Some(Value::String(pattern)) if !pattern.is_empty() => pattern.as_str(),
        _ => {
            return Err(Error::malformed(
                parent_key,
                "each entry of the children property requires a \"match\" string",
            ));
        }
    };

    let properties = match fields.get("properties") {
        Some(value) => properties(pattern, value)?,
        None => Properties::new(),
    };

    if properties.contains_key(&Property::Parent) {
        return Err(Error::ChildParent { key: pattern.to_string() });
    }
    ensure_no_domain_leak(pattern, &properties)?;

    Ok(Child { pattern: pattern.to_string(), properties })
}
