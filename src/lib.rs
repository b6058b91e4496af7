//! Capability collection builder.
//!
//! Loads hand-maintained JSON sources (platform records, engine records,
//! default property sets and user agent "divisions") into a single
//! [`Collection`], enforcing the structural rules of the data set while
//! loading and resolving record inheritance on demand.
//!
//! ```no_run
//! use capcollect::{Options, create_collection};
//!
//! let options = Options { resources_dir: "resources".into(), ..Options::default() };
//! let mut collection = create_collection(&options)?;
//! for division in collection.divisions() {
//!     println!("{} ({})", division.name(), division.sort_index());
//! }
//! # Ok::<(), capcollect::Error>(())
//! ```

#[macro_use]
mod macros;
mod api;
mod collection;
mod error;
mod property;
mod source;

pub use api::{
    BuildMetrics, BuildResult, DivisionSummary, Options, RecordIssue, Summary, create_collection,
    create_collection_with_metrics, summarize,
};
pub use collection::{
    Child, Collection, Division, ExpandedVersion, LoadMetrics, Record, RecordKind, RecordTable, ResolvedRecord,
    SourceKind, UserAgent, has_engine_property, has_platform_property,
};
pub use error::{Error, ErrorKind, Result};
pub use property::{Property, PropertyDomain};
pub use source::load_file;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Property name to value mapping, in source order.
pub type Properties = IndexMap<Property, PropertyValue>;

/// A scalar property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Flag(bool),
    Number(serde_json::Number),
}

impl PropertyValue {
    /// Converts a JSON scalar; `null`, arrays and objects have no property form.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(PropertyValue::Text(s.clone())),
            Value::Bool(b) => Some(PropertyValue::Flag(*b)),
            Value::Number(n) => Some(PropertyValue::Number(n.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Flag(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value.into())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Flag(b) => write!(f, "{b}"),
            PropertyValue::Number(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_convert() {
        assert_eq!(PropertyValue::from_json(&json!("Win7")), Some(PropertyValue::from("Win7")));
        assert_eq!(PropertyValue::from_json(&json!(true)), Some(PropertyValue::Flag(true)));
        assert_eq!(PropertyValue::from_json(&json!(64)), Some(PropertyValue::from(64)));
    }

    #[test]
    fn non_scalars_are_rejected() {
        assert_eq!(PropertyValue::from_json(&json!(null)), None);
        assert_eq!(PropertyValue::from_json(&json!([1, 2])), None);
        assert_eq!(PropertyValue::from_json(&json!({"a": 1})), None);
    }
}
