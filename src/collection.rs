//! The capability collection.
//!
//! [`Collection`] owns everything loaded during one build run: the platform
//! and engine record tables, the divisions of user agent rules, the default
//! property documents, plus a version label and generation date for writers.
//!
//! ## How the parts work together
//!
//! ```text
//! platforms.json ──┐
//! engines.json   ──┼─ RecordTable::from_document   (records.rs)
//!                  │     replaced wholesale on every load
//!                  │
//! division.json  ──┼─ validate::header / user_agent (validate.rs)
//!                  │   KeyStaging::insert            (dedup.rs)
//!                  │     └─ commit + append Division (division.rs)
//!                  │
//!  any load ───────┴─ SortState::invalidate          (order.rs)
//!
//! divisions()         ─▶ SortState::ensure ─▶ sorted &Division
//! platform()/engine() ─▶ resolve::resolve  ─▶ ResolvedRecord
//! ```
//!
//! ## Responsibilities by module
//!
//! - `records.rs`: platform/engine tables as declared.
//! - `resolve.rs`: flattens `inherits` chains on demand, rejecting redundant
//!   overrides and cycles.
//! - `validate.rs`: shape, `Parent` and domain-leak checks for divisions.
//! - `dedup.rs`: collection-wide matching-key uniqueness.
//! - `division.rs`: the read-only division model and version expansion.
//! - `order.rs`: the memoized division order.
//! - `metrics.rs`: per-load timing and counts used by the creator.
//!
//! ## Failure policy
//!
//! Each load call is atomic: on error nothing from that document is kept,
//! and state from earlier successful loads is untouched. The collection as a
//! whole is not transactional across calls.
//!
//! A collection is meant to be driven by one thread; there is no internal
//! locking.

#[path = "collection/dedup.rs"]
mod dedup;
#[path = "collection/division.rs"]
mod division;
#[path = "collection/metrics.rs"]
mod metrics;
#[path = "collection/order.rs"]
mod order;
#[path = "collection/records.rs"]
mod records;
#[path = "collection/resolve.rs"]
mod resolve;
#[path = "collection/validate.rs"]
mod validate;


pub use division::{Child, Division, ExpandedVersion, UserAgent};
pub use metrics::{LoadMetrics, SourceKind};
pub use records::{Record, RecordKind, RecordTable};
pub use resolve::ResolvedRecord;
pub use validate::{has_engine_property, has_platform_property};

use crate::{Error, Result, source};
use chrono::{Local, NaiveDateTime};
use dedup::KeyRegistry;
use order::SortState;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Collection {
    version: String,
    generation_date: NaiveDateTime,
    platforms: RecordTable,
    engines: RecordTable,
    divisions: Vec<Division>,
    default_properties: Value,
    default_browser: Value,
    keys: KeyRegistry,
    order: SortState,
}

impl Collection {
    /// Creates an empty collection for `version`, stamped with the current time.
    pub fn new(version: impl Into<String>) -> Self {
        Collection {
            version: version.into(),
            generation_date: Local::now().naive_local(),
            platforms: RecordTable::default(),
            engines: RecordTable::default(),
            divisions: Vec::new(),
            default_properties: Value::Null,
            default_browser: Value::Null,
            keys: KeyRegistry::default(),
            order: SortState::default(),
        }
    }

    /// Overrides the generation date (for reproducible output).
    pub fn with_generation_date(mut self, generation_date: NaiveDateTime) -> Self {
        self.generation_date = generation_date;
        self
    }

    // --- Loading ------------------------------------------------------------

    /// Loads a platforms file, replacing the current platform table.
    pub fn add_platforms_file(&mut self, path: impl AsRef<Path>) -> Result<&RecordTable> {
        let path = path.as_ref();
        let document = source::load_file(path)?;
        self.load_platforms(&document).map_err(|err| err.in_file(path))
    }

    /// Replaces the platform table with the contents of a `{"platforms": {...}}` document.
    pub fn load_platforms(&mut self, document: &Value) -> Result<&RecordTable> {
        let table = RecordTable::from_document(RecordKind::Platform, document)?;
        tracing::debug!(records = table.len(), "loaded platforms");
        self.platforms = table;
        self.order.invalidate();
        Ok(&self.platforms)
    }

    /// Loads an engines file, replacing the current engine table.
    pub fn add_engines_file(&mut self, path: impl AsRef<Path>) -> Result<&RecordTable> {
        let path = path.as_ref();
        let document = source::load_file(path)?;
        self.load_engines(&document).map_err(|err| err.in_file(path))
    }

    /// Replaces the engine table with the contents of an `{"engines": {...}}` document.
    pub fn load_engines(&mut self, document: &Value) -> Result<&RecordTable> {
        let table = RecordTable::from_document(RecordKind::Engine, document)?;
        tracing::debug!(records = table.len(), "loaded engines");
        self.engines = table;
        self.order.invalidate();
        Ok(&self.engines)
    }

    pub fn add_default_properties_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let document = source::load_file(path)?;
        self.load_default_properties(document);
        Ok(())
    }

    /// Stores the default property document verbatim.
    pub fn load_default_properties(&mut self, document: Value) {
        self.default_properties = document;
        self.order.invalidate();
    }

    pub fn add_default_browser_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let document = source::load_file(path)?;
        self.load_default_browser(document);
        Ok(())
    }

    /// Stores the default browser document verbatim.
    pub fn load_default_browser(&mut self, document: Value) {
        self.default_browser = document;
        self.order.invalidate();
    }

    /// Loads a division file and appends it.
    pub fn add_source_file(&mut self, path: impl AsRef<Path>) -> Result<&Division> {
        let path = path.as_ref();
        let document = source::load_file(path)?;
        self.load_division(&document).map_err(|err| err.in_file(path))
    }

    /// Validates a division document and appends it.
    ///
    /// On any failure nothing is appended and none of the document's keys
    /// are reserved.
    pub fn load_division(&mut self, document: &Value) -> Result<&Division> {
        let fields = document.as_object().ok_or(Error::InvalidDocument { expected: "division" })?;
        let header = validate::header(fields)?;
        let entries = validate::user_agent_list(&header.name, fields)?;

        let mut staging = self.keys.stage();
        let mut user_agents = Vec::with_capacity(entries.len());
        for entry in entries {
            let user_agent = validate::user_agent(&header.name, entry)?;
            staging.insert(&user_agent.user_agent)?;
            user_agents.push(user_agent);
        }
        let pending = staging.into_pending();
        self.keys.commit(pending);

        let division = Division {
            name: header.name,
            sort_index: header.sort_index,
            lite: header.lite,
            versions: header.versions,
            user_agents,
        };
        tracing::debug!(
            division = division.name.as_str(),
            sort_index = division.sort_index,
            user_agents = division.user_agents.len(),
            children = division.child_count(),
            "loaded division"
        );

        self.divisions.push(division);
        self.order.invalidate();
        Ok(&self.divisions[self.divisions.len() - 1])
    }

    // --- Ordering -----------------------------------------------------------

    /// Sorts the divisions if anything was loaded since the last sort.
    ///
    /// Returns load positions in sorted order. Repeated calls without an
    /// intervening load return the cached order.
    pub fn sort_divisions(&mut self) -> &[usize] {
        self.order.ensure(&self.divisions)
    }

    pub fn is_sorted(&self) -> bool {
        self.order.is_fresh()
    }

    /// Divisions in sorted order.
    pub fn divisions(&mut self) -> Vec<&Division> {
        let order = self.order.ensure(&self.divisions);
        order.iter().map(|&idx| &self.divisions[idx]).collect()
    }

    /// Divisions in load order.
    pub fn loaded_divisions(&self) -> &[Division] {
        &self.divisions
    }

    // --- Records --------------------------------------------------------------

    /// The platform table as declared, without inheritance applied.
    pub fn platforms(&self) -> &RecordTable {
        &self.platforms
    }

    /// The engine table as declared, without inheritance applied.
    pub fn engines(&self) -> &RecordTable {
        &self.engines
    }

    /// The named platform with its inheritance chain flattened.
    pub fn platform(&self, name: &str) -> Result<ResolvedRecord> {
        resolve::resolve(RecordKind::Platform, &self.platforms, name)
    }

    /// The named engine with its inheritance chain flattened.
    pub fn engine(&self, name: &str) -> Result<ResolvedRecord> {
        resolve::resolve(RecordKind::Engine, &self.engines, name)
    }

    pub fn record(&self, kind: RecordKind, name: &str) -> Result<ResolvedRecord> {
        match kind {
            RecordKind::Platform => self.platform(name),
            RecordKind::Engine => self.engine(name),
        }
    }

    // --- Everything else ------------------------------------------------------

    pub fn default_properties(&self) -> &Value {
        &self.default_properties
    }

    pub fn default_browser(&self) -> &Value {
        &self.default_browser
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn generation_date(&self) -> NaiveDateTime {
        self.generation_date
    }

    /// Whether `key` is a loaded user agent key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Number of user agent keys across all divisions.
    pub fn user_agent_count(&self) -> usize {
        self.keys.len()
    }

    /// Checks that every `Parent` names a loaded user agent key or the
    /// `userAgent` of the default property / default browser documents, and
    /// that following `Parent` from any key reaches one of those roots.
    pub fn check_parents(&self) -> Result<()> {
        let roots: HashSet<&str> = [&self.default_properties, &self.default_browser]
            .into_iter()
            .filter_map(|doc| doc.get("userAgent").and_then(Value::as_str))
            .collect();
        let parents: HashMap<&str, &str> = self
            .divisions
            .iter()
            .flat_map(|d| d.user_agents.iter())
            .filter_map(|ua| ua.parent().map(|parent| (ua.user_agent.as_str(), parent)))
            .collect();

        // Keys whose chain is already known to end in a root.
        let mut settled: HashSet<&str> = HashSet::new();
        for user_agent in self.divisions.iter().flat_map(|d| d.user_agents.iter()) {
            let mut chain: Vec<&str> = Vec::new();
            let mut current = user_agent.user_agent.as_str();
            loop {
                if roots.contains(current) || settled.contains(current) {
                    break;
                }
                if chain.contains(&current) {
                    chain.push(current);
                    return Err(Error::ParentCycle { chain: chain.into_iter().map(str::to_string).collect() });
                }
                chain.push(current);
                match parents.get(current) {
                    Some(&parent) if parents.contains_key(parent) || roots.contains(parent) => current = parent,
                    Some(&parent) => {
                        return Err(Error::DanglingParent { key: current.to_string(), parent: parent.to_string() });
                    }
                    None => break,
                }
            }
            settled.extend(chain);
        }
        Ok(())
    }
}
