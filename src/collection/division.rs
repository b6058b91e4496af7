//! Division model: one loaded group of user agent rules.
//!
//! Divisions are read-only once built; all checks happen in `validate.rs`
//! before construction.

use crate::{Properties, Property, PropertyValue};
use serde::Serialize;

/// A named, prioritized group of user agent rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub(crate) name: String,
    pub(crate) sort_index: i64,
    pub(crate) lite: bool,
    pub(crate) versions: Vec<String>,
    pub(crate) user_agents: Vec<UserAgent>,
}

/// One matching key with its properties and narrower children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAgent {
    pub(crate) user_agent: String,
    pub(crate) properties: Properties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) children: Vec<Child>,
}

/// A narrower pattern beneath a [`UserAgent`]; its parent is implicit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Child {
    #[serde(rename = "match")]
    pub(crate) pattern: String,
    #[serde(skip_serializing_if = "Properties::is_empty")]
    pub(crate) properties: Properties,
}

/// The entries of a division for one of its versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedVersion {
    /// `None` for divisions without a version list.
    pub version: Option<String>,
    pub user_agents: Vec<UserAgent>,
}

impl Division {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower values sort first.
    pub fn sort_index(&self) -> i64 {
        self.sort_index
    }

    /// Whether the division is part of the reduced ("lite") output.
    pub fn lite(&self) -> bool {
        self.lite
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn user_agents(&self) -> &[UserAgent] {
        &self.user_agents
    }

    pub fn child_count(&self) -> usize {
        self.user_agents.iter().map(|ua| ua.children.len()).sum()
    }

    /// Substitutes `#MAJORVER#` / `#MINORVER#` once per listed version.
    ///
    /// ```text
    /// versions: ["5.1", "6"]
    /// "Foo/#MAJORVER#.#MINORVER#*"  ──▶  "Foo/5.1*", "Foo/6.0*"
    /// ```
    ///
    /// Keys, child patterns and string property values are substituted. A
    /// division without versions yields its entries unchanged.
    pub fn expand_versions(&self) -> Vec<ExpandedVersion> {
        if self.versions.is_empty() {
            return vec![ExpandedVersion { version: None, user_agents: self.user_agents.clone() }];
        }

        self.versions
            .iter()
            .map(|version| {
                let (major, minor) = split_version(version);
                ExpandedVersion {
                    version: Some(version.clone()),
                    user_agents: self.user_agents.iter().map(|ua| ua.with_version(major, minor)).collect(),
                }
            })
            .collect()
    }
}

impl UserAgent {
    /// The matching key.
    pub fn key(&self) -> &str {
        &self.user_agent
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// The declared `Parent` key.
    pub fn parent(&self) -> Option<&str> {
        self.properties.get(&Property::Parent).and_then(PropertyValue::as_str)
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    fn with_version(&self, major: &str, minor: &str) -> UserAgent {
        UserAgent {
            user_agent: substitute(&self.user_agent, major, minor),
            properties: substitute_properties(&self.properties, major, minor),
            children: self
                .children
                .iter()
                .map(|child| Child {
                    pattern: substitute(&child.pattern, major, minor),
                    properties: substitute_properties(&child.properties, major, minor),
                })
                .collect(),
        }
    }
}

impl Child {
    /// The matching pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

fn split_version(version: &str) -> (&str, &str) {
    match version.split_once('.') {
        Some((major, minor)) if !minor.is_empty() => (major, minor),
        Some((major, _)) => (major, "0"),
        None => (version, "0"),
    }
}

fn substitute(text: &str, major: &str, minor: &str) -> String {
    regex!(r"#(MAJORVER|MINORVER)#")
        .replace_all(text, |caps: &regex::Captures<'_>| if &caps[1] == "MAJORVER" { major } else { minor })
        .into_owned()
}

fn substitute_properties(properties: &Properties, major: &str, minor: &str) -> Properties {
    properties
        .iter()
        .map(|(name, value)| {
            let value = match value {
                PropertyValue::Text(text) => PropertyValue::Text(substitute(text, major, minor)),
                other => other.clone(),
            };
            (name.clone(), value)
        })
        .collect()
}
