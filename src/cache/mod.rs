//! Size-bounded LRU cache of shared resources
//!
//! [`ResourceCache`] holds one `Arc` per cached resource, ordered by recency,
//! and evicts least recently used entries once the sum of their declared
//! sizes exceeds the budget. Entries are also dropped as soon as the injected
//! [`ResourceRegistry`] reports that their content changed, either through a
//! change notification or lazily when a stale entry is looked up.

mod state;
mod stats;

pub use stats::{CacheDump, CacheStats, DumpEntry};

use self::state::CacheState;
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::events::{ChangeEvent, NotifyPriority, SubscriptionId};
use crate::registry::ResourceRegistry;
use crate::release::{NoopRelease, ReleaseStrategy};
use crate::resource::Resource;
use crate::sync::MutexExt;
use log::{debug, warn};
use std::fmt;
use std::sync::{Arc, Mutex};

/// LRU cache of reference-counted resources bounded by a byte budget
///
/// All operations lock an internal mutex, which also serializes change
/// notifications delivered from other threads. The release strategy and the
/// registry's `is_stale` run under that lock and must not call back into the
/// cache.
///
/// Dropping the cache unsubscribes it from the registry and releases every
/// remaining entry.
///
/// # Example
///
/// ```rust
/// use rescache::{MemoryRegistry, ResourceCache, Resource};
/// use std::sync::Arc;
///
/// struct Thumbnail { id: u64, pixels: Vec<u8> }
///
/// impl Resource for Thumbnail {
///     type Id = u64;
///     fn id(&self) -> u64 { self.id }
/// }
///
/// # fn main() -> rescache::Result<()> {
/// let registry = Arc::new(MemoryRegistry::<Thumbnail>::new());
/// let cache: ResourceCache<Thumbnail> = ResourceCache::new(
///     |thumb: &Arc<Thumbnail>| println!("released {}", thumb.id),
///     100,
///     registry.clone(),
/// );
///
/// let thumb = Arc::new(Thumbnail { id: 1, pixels: vec![0; 40] });
/// cache.put(thumb.clone(), thumb.pixels.len() as u64)?;
/// assert!(cache.get(&thumb)?);
/// assert_eq!(cache.total_size(), 40);
/// # Ok(())
/// # }
/// ```
pub struct ResourceCache<R: Resource> {
    state: Arc<Mutex<CacheState<R>>>,
    registry: Arc<dyn ResourceRegistry<R>>,
    subscription: SubscriptionId,
}

impl<R: Resource> ResourceCache<R> {
    /// Create a cache with the default configuration and the given budget
    pub fn new<S>(release: S, max_size: u64, registry: Arc<dyn ResourceRegistry<R>>) -> Self
    where
        S: ReleaseStrategy<R> + 'static,
    {
        let config = CacheConfig {
            max_size,
            ..CacheConfig::default()
        };
        Self::from_parts(config, Box::new(release), registry)
    }

    /// Create a cache from a [`CacheConfig`]
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config<S>(
        config: CacheConfig,
        release: S,
        registry: Arc<dyn ResourceRegistry<R>>,
    ) -> Result<Self>
    where
        S: ReleaseStrategy<R> + 'static,
    {
        config.validate()?;
        Ok(Self::from_parts(config, Box::new(release), registry))
    }

    /// Create a new builder
    pub fn builder() -> CacheBuilder<R> {
        CacheBuilder::new()
    }

    fn from_parts(
        config: CacheConfig,
        release: Box<dyn ReleaseStrategy<R>>,
        registry: Arc<dyn ResourceRegistry<R>>,
    ) -> Self {
        let state = Arc::new(Mutex::new(CacheState::new(
            config.label,
            config.max_size,
            release,
        )));

        // Subscribed for every resource, cached or not: a resource can change
        // while evicted and be cached again under the same identity.
        let weak = Arc::downgrade(&state);
        let subscription = registry.subscribe(
            Arc::new(move |event: &ChangeEvent<R::Id>| {
                if !event.kind.affects_content() {
                    return;
                }
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let mut state = state.lock_recovered();
                if let Err(e) = state.invalidate(&event.id) {
                    warn!("[{}] {e}", state.label());
                }
            }),
            config.priority,
        );

        Self {
            state,
            registry,
            subscription,
        }
    }

    /// Cache `resource` with a declared cost of `size` bytes
    ///
    /// If the identity is already cached this behaves like [`get`](Self::get):
    /// a fresh entry is promoted and kept as is (the new `size` is ignored),
    /// a stale entry is released and replaced by `resource`.
    ///
    /// After insertion least recently used entries are evicted until the
    /// budget holds. A single entry larger than the whole budget is kept.
    /// Every `u64` size is accepted; accounting is exact even when the sum
    /// of two sizes exceeds `u64::MAX`, as the eviction that follows brings
    /// it back in range.
    ///
    /// # Errors
    ///
    /// Returns the first release strategy failure. The cache is consistent
    /// and within budget either way.
    pub fn put(&self, resource: Arc<R>, size: u64) -> Result<()> {
        self.state
            .lock_recovered()
            .insert(resource, size, self.registry.as_ref())
    }

    /// Whether `resource` is cached and fresh
    ///
    /// A hit promotes the entry to most recently used. A cached entry that
    /// the registry reports as stale is released and reported as a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing a stale entry fails.
    pub fn get(&self, resource: &R) -> Result<bool> {
        Ok(self.lookup(&resource.id())?.is_some())
    }

    /// Like [`get`](Self::get), keyed by identity, returning the cached handle
    ///
    /// # Errors
    ///
    /// Returns an error if releasing a stale entry fails.
    pub fn lookup(&self, id: &R::Id) -> Result<Option<Arc<R>>> {
        self.state
            .lock_recovered()
            .lookup(id, self.registry.as_ref())
    }

    /// Presence test without promotion or freshness check
    pub fn contains(&self, id: &R::Id) -> bool {
        self.state.lock_recovered().contains(id)
    }

    /// Release the entry of `resource`, returning whether one was cached
    ///
    /// # Errors
    ///
    /// Returns an error if the release strategy fails; the entry is removed
    /// regardless.
    pub fn remove(&self, resource: &R) -> Result<bool> {
        self.remove_id(&resource.id())
    }

    /// [`remove`](Self::remove) keyed by identity
    ///
    /// # Errors
    ///
    /// Returns an error if the release strategy fails; the entry is removed
    /// regardless.
    pub fn remove_id(&self, id: &R::Id) -> Result<bool> {
        self.state.lock_recovered().invalidate(id)
    }

    /// Change the budget and evict down to it
    ///
    /// # Errors
    ///
    /// Returns the first release strategy failure.
    #[doc(alias = "set_size")]
    pub fn set_max_size(&self, max_size: u64) -> Result<()> {
        self.state.lock_recovered().set_max_size(max_size)
    }

    /// Release every entry
    ///
    /// # Errors
    ///
    /// Returns the first release strategy failure; all entries are removed
    /// regardless.
    pub fn clear(&self) -> Result<()> {
        self.state.lock_recovered().clear()
    }

    pub fn len(&self) -> usize {
        self.state.lock_recovered().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the declared sizes of all cached entries
    pub fn total_size(&self) -> u64 {
        self.state.lock_recovered().total_size()
    }

    pub fn max_size(&self) -> u64 {
        self.state.lock_recovered().max_size()
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock_recovered().stats()
    }

    pub fn label(&self) -> String {
        self.state.lock_recovered().label().to_string()
    }

    /// Snapshot of `(id, size)` pairs, most recently used first
    pub fn dump(&self) -> CacheDump<R::Id> {
        self.state.lock_recovered().dump()
    }

    /// Write [`dump`](Self::dump) to the debug log
    pub fn log_dump(&self) {
        if log::log_enabled!(log::Level::Debug) {
            debug!("{}", self.dump());
        }
    }
}

impl<R: Resource> Drop for ResourceCache<R> {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.subscription);
        let mut state = self.state.lock_recovered();
        if let Err(e) = state.clear() {
            warn!("[{}] Failed to release entries on drop: {e}", state.label());
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock_recovered();
        f.debug_struct("ResourceCache")
            .field("label", &state.label())
            .field("len", &state.len())
            .field("total_size", &state.total_size())
            .field("max_size", &state.max_size())
            .field("subscription", &self.subscription)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for creating a [`ResourceCache`] with a fluent API
///
/// A registry is required; the release strategy defaults to [`NoopRelease`].
///
/// # Example
///
/// ```rust
/// use rescache::{FileRegistry, FileResource, NotifyPriority, ResourceCache};
/// use std::sync::Arc;
///
/// type Pixbuf = FileResource<Vec<u8>>;
///
/// let cache = ResourceCache::<Pixbuf>::builder()
///     .label("pixbufs")
///     .max_size(32 * 1024 * 1024)
///     .priority(NotifyPriority::High)
///     .registry(Arc::new(FileRegistry::<Pixbuf>::new()))
///     .release(|pixbuf: &Arc<Pixbuf>| println!("freeing {} bytes", pixbuf.data().len()))
///     .build()
///     .unwrap();
/// assert_eq!(cache.label(), "pixbufs");
/// ```
pub struct CacheBuilder<R: Resource> {
    config: CacheConfig,
    release: Box<dyn ReleaseStrategy<R>>,
    registry: Option<Arc<dyn ResourceRegistry<R>>>,
}

impl<R: Resource> CacheBuilder<R> {
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            release: Box::new(NoopRelease),
            registry: None,
        }
    }

    /// Replace the whole configuration
    #[must_use]
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.config.max_size = bytes;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: NotifyPriority) -> Self {
        self.config.priority = priority;
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    #[must_use]
    pub fn release<S>(mut self, release: S) -> Self
    where
        S: ReleaseStrategy<R> + 'static,
    {
        self.release = Box::new(release);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn ResourceRegistry<R>>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the cache and subscribe it to the registry
    ///
    /// # Errors
    ///
    /// Returns an error if no registry was set or the configuration is invalid.
    pub fn build(self) -> Result<ResourceCache<R>> {
        let registry = self
            .registry
            .ok_or_else(|| Error::Config("a resource registry is required".into()))?;
        self.config.validate()?;
        Ok(ResourceCache::from_parts(self.config, self.release, registry))
    }
}

impl<R: Resource> Default for CacheBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> fmt::Debug for CacheBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("config", &self.config)
            .field("has_registry", &self.registry.is_some())
            .finish_non_exhaustive()
    }
}
