//! Load metrics.
//!
//! Collected by the resource-directory creator (`api.rs`) around each load
//! call; a bare [`Collection`](super::Collection) does not time itself.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// What a source file contributed to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Platforms,
    Engines,
    DefaultProperties,
    DefaultBrowser,
    Division,
}

/// Timing and counts for one loaded source file.
#[derive(Debug, Clone, Serialize)]
pub struct LoadMetrics {
    pub kind: SourceKind,
    pub path: PathBuf,
    /// Elapsed time for read + parse + validation.
    pub duration: Duration,
    /// Records for platform/engine files, user agents for divisions.
    pub entries: usize,
    /// Children across all user agents (divisions only).
    pub children: usize,
}
