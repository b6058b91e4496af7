//! Error taxonomy for collection loading and record resolution.
//!
//! Every load call either succeeds or fails synchronously with one [`Error`].
//! Nothing is retried and nothing is swallowed; the message is meant to be
//! shown to whoever maintains the source files, verbatim.

use crate::collection::RecordKind;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Source file missing or unreadable.
    Io,
    /// Source content is not valid JSON.
    Parse,
    /// Missing field, wrong shape, duplicate key, misplaced `Parent`, cycles.
    Structural,
    /// Platform or engine property declared outside the record store.
    DomainLeak,
    /// Inherited property re-declared with the identical value.
    Redundancy,
    /// Unknown platform or engine requested.
    Lookup,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file \"{}\" does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("file \"{}\" is not readable: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file \"{}\" had invalid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A structural failure raised while loading `path`.
    #[error("{}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("expected a JSON object with a \"{expected}\" entry")]
    InvalidDocument { expected: &'static str },

    #[error("required attribute \"{field}\" is missing")]
    MissingField { field: &'static str },

    #[error("{reason} for key \"{key}\"")]
    Malformed { key: String, reason: String },

    #[error("user agent \"{key}\" is defined twice")]
    DuplicateKey { key: String },

    #[error("the \"Parent\" property is missing for key \"{key}\"")]
    MissingParent { key: String },

    #[error("the \"Parent\" property must not be set inside the children list for key \"{key}\"")]
    ChildParent { key: String },

    #[error(
        "the properties of key \"{key}\" contain {kind} data (\"{property}\"), please use the \"{}\" keyword",
        kind.keyword()
    )]
    DomainLeak { key: String, property: String, kind: RecordKind },

    #[error(
        "the value for property \"{property}\" has the same value in the {kind} \"{name}\" and its parent \"{parent}\""
    )]
    Redundant { kind: RecordKind, name: String, parent: String, property: String },

    #[error("inheritance cycle detected in {kind} records: {}", chain.join(" -> "))]
    InheritanceCycle { kind: RecordKind, chain: Vec<String> },

    #[error("{kind} \"{name}\" does not exist in data, available: [{}]", available.join(", "))]
    UnknownRecord { kind: RecordKind, name: String, available: Vec<String> },

    #[error("parent \"{parent}\" of key \"{key}\" is not a known user agent")]
    DanglingParent { key: String, parent: String },

    #[error("Parent chain of key \"{}\" loops back on itself: {}", chain[0], chain.join(" -> "))]
    ParentCycle { chain: Vec<String> },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } | Error::Io { .. } => ErrorKind::Io,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Source { source, .. } => source.kind(),
            Error::DomainLeak { .. } => ErrorKind::DomainLeak,
            Error::Redundant { .. } => ErrorKind::Redundancy,
            Error::UnknownRecord { .. } => ErrorKind::Lookup,
            Error::InvalidDocument { .. }
            | Error::MissingField { .. }
            | Error::Malformed { .. }
            | Error::DuplicateKey { .. }
            | Error::MissingParent { .. }
            | Error::ChildParent { .. }
            | Error::InheritanceCycle { .. }
            | Error::DanglingParent { .. }
            | Error::ParentCycle { .. } => ErrorKind::Structural,
        }
    }

    pub(crate) fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Malformed { key: key.into(), reason: reason.into() }
    }

    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            err @ (Error::NotFound { .. } | Error::Io { .. } | Error::Parse { .. } | Error::Source { .. }) => err,
            other => Error::Source { path: path.into(), source: Box::new(other) },
        }
    }
}
