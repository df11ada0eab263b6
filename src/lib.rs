//! # rescache - Resource Cache
//!
//! A size-bounded LRU cache for externally owned, reference-counted resources
//! such as decoded images or metadata blobs loaded from files.
//!
//! ## Features
//!
//! - **Byte budget**: Callers declare each entry's cost; least recently used
//!   entries are evicted once the total exceeds the budget
//! - **Identity keyed**: Resources are deduplicated by a stable id, not by value
//! - **Release strategies**: A cleanup hook runs exactly once for every entry
//!   that leaves the cache, on every removal path
//! - **Change-driven invalidation**: A pluggable [`ResourceRegistry`] drops
//!   entries whose content changed, by notification or lazily on lookup
//! - **File tracking**: [`FileRegistry`] detects changed files from their
//!   length and modification time
//!
//! ## Quick Start
//!
//! ```rust
//! use rescache::{FileRegistry, FileResource, ResourceCache};
//! use std::sync::Arc;
//!
//! type Pixbuf = FileResource<Vec<u8>>;
//!
//! # fn main() -> rescache::Result<()> {
//! let registry = Arc::new(FileRegistry::<Pixbuf>::new());
//! let cache = ResourceCache::<Pixbuf>::builder()
//!     .label("pixbufs")
//!     .max_size(64 * 1024 * 1024)
//!     .registry(registry.clone())
//!     .release(|pixbuf: &Arc<Pixbuf>| println!("dropping {:?}", pixbuf.data().len()))
//!     .build()?;
//!
//! let pixbuf = Arc::new(Pixbuf::new("/photos/cat.png", vec![0u8; 4096]));
//! cache.put(pixbuf.clone(), 4096)?;
//!
//! if let Some(cached) = cache.lookup(&"/photos/cat.png".into())? {
//!     assert_eq!(cached.data().len(), 4096);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Eviction
//!
//! After every `put` and `set_max_size` the cache evicts from the least
//! recently used end until the total fits the budget. A single entry larger
//! than the whole budget is kept rather than rejected:
//!
//! ```rust
//! use rescache::{MemoryRegistry, NoopRelease, Resource, ResourceCache};
//! use std::sync::Arc;
//!
//! struct Blob(u64);
//! impl Resource for Blob {
//!     type Id = u64;
//!     fn id(&self) -> u64 { self.0 }
//! }
//!
//! # fn main() -> rescache::Result<()> {
//! let registry = Arc::new(MemoryRegistry::<Blob>::new());
//! let cache: ResourceCache<Blob> = ResourceCache::new(NoopRelease, 100, registry);
//!
//! cache.put(Arc::new(Blob(1)), 40)?;
//! cache.put(Arc::new(Blob(2)), 50)?;
//! cache.put(Arc::new(Blob(3)), 20)?; // evicts 1
//! assert_eq!(cache.dump().ids().copied().collect::<Vec<_>>(), vec![3, 2]);
//!
//! cache.set_max_size(5)?; // evicts 2, keeps the most recent entry
//! assert_eq!(cache.len(), 1);
//! assert_eq!(cache.total_size(), 20);
//! # Ok(())
//! # }
//! ```
//!
//! ## Invalidation
//!
//! The cache subscribes to its registry when constructed. A
//! [`ChangeKind::Reread`] or [`ChangeKind::Changed`] event for any cached
//! identity releases that entry immediately; lookups additionally ask the
//! registry whether the cached resource went stale.
//!
//! ```rust
//! use rescache::{ChangeKind, MemoryRegistry, NoopRelease, Resource, ResourceCache};
//! use std::sync::Arc;
//!
//! # struct Blob(u64);
//! # impl Resource for Blob {
//! #     type Id = u64;
//! #     fn id(&self) -> u64 { self.0 }
//! # }
//! # fn main() -> rescache::Result<()> {
//! let registry = Arc::new(MemoryRegistry::<Blob>::new());
//! let cache: ResourceCache<Blob> = ResourceCache::new(NoopRelease, 100, registry.clone());
//!
//! cache.put(Arc::new(Blob(7)), 10)?;
//! registry.notify(7, ChangeKind::Changed);
//! assert!(!cache.contains(&7));
//! # Ok(())
//! # }
//! ```

// Core modules
mod cache;
mod error;
mod release;
mod resource;
mod sync;

// Grouped modules
pub mod config;
pub mod events;
pub mod registry;

// Re-exports from core
pub use cache::{CacheBuilder, CacheDump, CacheStats, DumpEntry, ResourceCache};
pub use error::{Error, ReleaseError, Result};
pub use release::{NoopRelease, ReleaseStrategy};
pub use resource::{FileBacked, FileResource, Resource};

// Re-exports from grouped modules
pub use config::{
    CacheConfig, CacheConfigBuilder, DEFAULT_MAX_SIZE, DefaultEnvSource, EnvSource, parse_size,
};
pub use events::{ChangeEvent, ChangeKind, ChangeListener, NotifyPriority, SubscriptionId};
pub use registry::{FileRegistry, MemoryRegistry, ResourceRegistry};
