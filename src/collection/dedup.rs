//! Matching-key uniqueness across the whole collection.
//!
//! Every user agent key may be declared once, across all divisions ever
//! loaded. Collections reach tens of thousands of keys, so lookups go
//! through a hash set rather than scanning the loaded divisions.
//!
//! A division load is atomic: its keys are staged in a [`KeyStaging`] that
//! checks against both the committed registry and the keys staged so far,
//! and only enter the registry once the whole document validated.

use crate::{Error, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub(crate) struct KeyRegistry {
    keys: HashSet<String>,
}

impl KeyRegistry {
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn stage(&self) -> KeyStaging<'_> {
        KeyStaging { registry: self, pending: HashSet::new() }
    }

    pub(crate) fn commit(&mut self, pending: HashSet<String>) {
        self.keys.extend(pending);
    }
}

/// Keys of one in-flight load.
#[derive(Debug)]
pub(crate) struct KeyStaging<'a> {
    registry: &'a KeyRegistry,
    pending: HashSet<String>,
}

impl KeyStaging<'_> {
    pub(crate) fn insert(&mut self, key: &str) -> Result<()> {
        if self.registry.contains(key) || self.pending.contains(key) {
            return Err(Error::DuplicateKey { key: key.to_string() });
        }
        self.pending.insert(key.to_string());
        Ok(())
    }

    pub(crate) fn into_pending(self) -> HashSet<String> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_within_one_load() {
        let registry = KeyRegistry::default();
        let mut staging = registry.stage();
        staging.insert("Opera*").unwrap();
        assert!(matches!(staging.insert("Opera*"), Err(Error::DuplicateKey { .. })));
    }

    #[test]
    fn duplicate_across_loads() {
        let mut registry = KeyRegistry::default();
        let mut staging = registry.stage();
        staging.insert("Opera*").unwrap();
        let pending = staging.into_pending();
        registry.commit(pending);

        let mut staging = registry.stage();
        assert!(staging.insert("Opera*").is_err());
        assert!(staging.insert("Opera Mini*").is_ok());
    }

    #[test]
    fn dropped_staging_reserves_nothing() {
        let registry = KeyRegistry::default();
        {
            let mut staging = registry.stage();
            staging.insert("Opera*").unwrap();
        }
        assert!(!registry.contains("Opera*"));
        assert_eq!(registry.len(), 0);
    }
}
