//! Resource registries
//!
//! A registry knows whether a resource changed since it was loaded and
//! broadcasts change events for every resource it tracks. The cache consumes
//! it through the [`ResourceRegistry`] trait, so any change-tracking system
//! can be plugged in.
//!
//! Two implementations are bundled:
//!
//! - [`MemoryRegistry`]: staleness and events driven by the application
//! - [`FileRegistry`]: staleness derived from file length and modification time

mod file;
mod memory;

pub use file::FileRegistry;
pub use memory::MemoryRegistry;

use crate::events::{ChangeListener, NotifyPriority, SubscriptionId};
use crate::resource::Resource;

/// Change tracking consumed by [`ResourceCache`](crate::ResourceCache)
///
/// Implementations must not hold internal locks while invoking listeners:
/// the cache's listener locks the cache, and the cache calls
/// [`is_stale`](ResourceRegistry::is_stale) with its own lock held.
pub trait ResourceRegistry<R: Resource>: Send + Sync {
    /// True if the content behind `resource` changed since it was loaded
    fn is_stale(&self, resource: &R) -> bool;

    /// Register `listener` for change events of any resource
    fn subscribe(
        &self,
        listener: ChangeListener<R::Id>,
        priority: NotifyPriority,
    ) -> SubscriptionId;

    /// Remove a listener, returning whether it was registered
    fn unsubscribe(&self, subscription: SubscriptionId) -> bool;
}
