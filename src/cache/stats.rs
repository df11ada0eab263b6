//! Counters and diagnostics snapshots

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Running counters of a cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    /// Entries removed to restore the budget
    pub evictions: u64,
    /// Entries removed by `remove`, change notifications or staleness
    pub invalidations: u64,
    /// Hits discarded because the registry reported the resource stale
    pub stale: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0.0 when nothing was looked up yet
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// One line of a [`CacheDump`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpEntry<Id> {
    pub id: Id,
    pub size: u64,
}

/// Snapshot of a cache's contents, most recently used first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheDump<Id> {
    pub label: String,
    pub total_size: u64,
    pub max_size: u64,
    pub entries: Vec<DumpEntry<Id>>,
}

impl<Id> CacheDump<Id> {
    /// Identities in recency order
    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.entries.iter().map(|e| &e.id)
    }
}

impl<Id: Serialize> CacheDump<Id> {
    /// Render the dump as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if an identity cannot be serialized.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<Id: fmt::Debug> fmt::Display for CacheDump<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} entries, {}/{} bytes",
            self.label,
            self.entries.len(),
            self.total_size,
            self.max_size
        )?;
        for entry in &self.entries {
            writeln!(f, "  {:?} ({} bytes)", entry.id, entry.size)?;
        }
        Ok(())
    }
}
