//! Ordered entries, size accounting and eviction
//!
//! `order` is an unbounded `LruCache` used purely as a recency-ordered map:
//! `get` moves an entry to the head in O(1), `pop_lru` takes the tail in O(1).
//! The byte budget is enforced here, not by the map's capacity.
//!
//! `total_size` is kept as `u128` so that adding any `u64` size is exact. It
//! only exceeds `u64::MAX` between an insertion and the eviction that
//! follows: once an operation returns, either the total fits the budget or a
//! single entry remains.

use super::stats::{CacheDump, CacheStats, DumpEntry};
use crate::error::{Error, Result};
use crate::registry::ResourceRegistry;
use crate::release::ReleaseStrategy;
use crate::resource::Resource;
use log::{debug, trace};
use lru::LruCache;
use std::sync::Arc;

/// A cached resource and its declared byte cost
struct CacheEntry<R> {
    resource: Arc<R>,
    size: u64,
}

pub(crate) struct CacheState<R: Resource> {
    order: LruCache<R::Id, CacheEntry<R>>,
    total_size: u128,
    max_size: u64,
    release: Box<dyn ReleaseStrategy<R>>,
    stats: CacheStats,
    label: String,
}

/// Keeps the first error of a multi-step operation while the rest still runs
fn keep_first(slot: &mut Option<Error>, result: Result<()>) {
    if let Err(e) = result {
        slot.get_or_insert(e);
    }
}

impl<R: Resource> CacheState<R> {
    pub(crate) fn new(label: String, max_size: u64, release: Box<dyn ReleaseStrategy<R>>) -> Self {
        Self {
            order: LruCache::unbounded(),
            total_size: 0,
            max_size,
            release,
            stats: CacheStats::default(),
            label,
        }
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn total_size(&self) -> u64 {
        u64::try_from(self.total_size).unwrap_or(u64::MAX)
    }

    pub(crate) fn max_size(&self) -> u64 {
        self.max_size
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }

    pub(crate) fn contains(&self, id: &R::Id) -> bool {
        self.order.contains(id)
    }

    /// Promote `id` and validate it against the registry
    ///
    /// A stale entry is invalidated and reported as absent. Hit/miss counters
    /// are left to the caller.
    fn touch(
        &mut self,
        id: &R::Id,
        registry: &dyn ResourceRegistry<R>,
    ) -> Result<Option<Arc<R>>> {
        // `get` moves the entry to the head; a no-op when it is already there
        let Some(entry) = self.order.get(id) else {
            return Ok(None);
        };
        let resource = Arc::clone(&entry.resource);

        if registry.is_stale(&resource) {
            debug!("[{}] Dropping stale entry {id:?}", self.label);
            self.stats.stale += 1;
            self.invalidate(id)?;
            return Ok(None);
        }
        Ok(Some(resource))
    }

    pub(crate) fn lookup(
        &mut self,
        id: &R::Id,
        registry: &dyn ResourceRegistry<R>,
    ) -> Result<Option<Arc<R>>> {
        let found = self.touch(id, registry);
        match &found {
            Ok(Some(_)) => {
                trace!("[{}] Hit {id:?}", self.label);
                self.stats.hits += 1;
            }
            _ => {
                trace!("[{}] Miss {id:?}", self.label);
                self.stats.misses += 1;
            }
        }
        found
    }

    pub(crate) fn insert(
        &mut self,
        resource: Arc<R>,
        size: u64,
        registry: &dyn ResourceRegistry<R>,
    ) -> Result<()> {
        let id = resource.id();
        let mut failure = None;

        match self.touch(&id, registry) {
            Ok(Some(_)) => return Ok(()),
            Ok(None) => {}
            // The stale entry is gone regardless; cache the fresh one
            Err(e) => failure = Some(e),
        }

        debug!("[{}] Caching {id:?} ({size} bytes)", self.label);
        self.total_size += u128::from(size);
        self.stats.insertions += 1;
        if let Some((old_id, old)) = self.order.push(id, CacheEntry { resource, size }) {
            keep_first(&mut failure, self.release_entry(old_id, old));
        }

        keep_first(&mut failure, self.enforce_budget());
        failure.map_or(Ok(()), Err)
    }

    /// Remove the entry for `id`, returning whether one was cached
    pub(crate) fn invalidate(&mut self, id: &R::Id) -> Result<bool> {
        let Some(entry) = self.order.pop(id) else {
            return Ok(false);
        };
        debug!("[{}] Invalidating {id:?}", self.label);
        self.stats.invalidations += 1;
        self.release_entry(id.clone(), entry)?;
        Ok(true)
    }

    pub(crate) fn set_max_size(&mut self, max_size: u64) -> Result<()> {
        debug!(
            "[{}] Budget {} -> {max_size} bytes",
            self.label, self.max_size
        );
        self.max_size = max_size;
        self.enforce_budget()
    }

    /// Release every entry, least recently used first
    pub(crate) fn clear(&mut self) -> Result<()> {
        let mut failure = None;
        while let Some((id, entry)) = self.order.pop_lru() {
            keep_first(&mut failure, self.release_entry(id, entry));
        }
        failure.map_or(Ok(()), Err)
    }

    /// Evict from the tail until the budget holds
    ///
    /// The last remaining entry is kept even if it alone exceeds the budget.
    fn enforce_budget(&mut self) -> Result<()> {
        let mut failure = None;
        while self.total_size > u128::from(self.max_size) && self.order.len() > 1 {
            let Some((id, entry)) = self.order.pop_lru() else {
                break;
            };
            debug!(
                "[{}] Evicting {id:?} ({} bytes, {}/{} used)",
                self.label, entry.size, self.total_size, self.max_size
            );
            self.stats.evictions += 1;
            keep_first(&mut failure, self.release_entry(id, entry));
        }
        failure.map_or(Ok(()), Err)
    }

    /// Account for an unlinked entry and hand it to the release strategy
    ///
    /// The cache's reference is dropped when `entry` goes out of scope, after
    /// the strategy ran.
    fn release_entry(&mut self, id: R::Id, entry: CacheEntry<R>) -> Result<()> {
        self.total_size -= u128::from(entry.size);
        self.release
            .release(&entry.resource)
            .map_err(|source| Error::release(id, source))
    }

    pub(crate) fn dump(&self) -> CacheDump<R::Id> {
        CacheDump {
            label: self.label.clone(),
            total_size: self.total_size(),
            max_size: self.max_size,
            entries: self
                .order
                .iter()
                .map(|(id, entry)| DumpEntry {
                    id: id.clone(),
                    size: entry.size,
                })
                .collect(),
        }
    }
}
