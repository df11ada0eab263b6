//! In-memory registry for testing and app-driven change tracking

use super::ResourceRegistry;
use crate::events::{
    ChangeEvent, ChangeKind, ChangeListener, ListenerSet, NotifyPriority, SubscriptionId,
};
use crate::resource::Resource;
use crate::sync::RwLockExt;
use std::collections::HashSet;
use std::sync::RwLock;

/// Registry whose staleness flags and events are set by the application
pub struct MemoryRegistry<R: Resource> {
    stale: RwLock<HashSet<R::Id>>,
    listeners: ListenerSet<R::Id>,
}

impl<R: Resource> MemoryRegistry<R> {
    /// Create a new memory registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            stale: RwLock::new(HashSet::new()),
            listeners: ListenerSet::new(),
        }
    }

    /// Report `id` as stale on the next freshness check
    pub fn mark_stale(&self, id: R::Id) {
        self.stale.write_recovered().insert(id);
    }

    /// Clear the stale flag, e.g. after the resource was reloaded
    pub fn mark_fresh(&self, id: &R::Id) {
        self.stale.write_recovered().remove(id);
    }

    /// Broadcast a change event to every subscriber
    pub fn notify(&self, id: R::Id, kind: ChangeKind) {
        log::trace!("Broadcasting {kind:?} for {id:?}");
        self.listeners.notify(&ChangeEvent::new(id, kind));
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<R: Resource> Default for MemoryRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ResourceRegistry<R> for MemoryRegistry<R> {
    fn is_stale(&self, resource: &R) -> bool {
        self.stale.read_recovered().contains(&resource.id())
    }

    fn subscribe(
        &self,
        listener: ChangeListener<R::Id>,
        priority: NotifyPriority,
    ) -> SubscriptionId {
        self.listeners.subscribe(listener, priority)
    }

    fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        self.listeners.unsubscribe(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Doc(u32);

    impl Resource for Doc {
        type Id = u32;
        fn id(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_stale_flags() {
        let registry = MemoryRegistry::<Doc>::new();
        let doc = Doc(4);

        assert!(!registry.is_stale(&doc));
        registry.mark_stale(4);
        assert!(registry.is_stale(&doc));
        assert!(!registry.is_stale(&Doc(5)));
        registry.mark_fresh(&4);
        assert!(!registry.is_stale(&doc));
    }

    #[test]
    fn test_notify_reaches_subscribers() {
        let registry = MemoryRegistry::<Doc>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let subscription = registry.subscribe(
            Arc::new(move |event: &ChangeEvent<u32>| {
                assert_eq!(event.id, 9);
                counter_clone.fetch_add(1, Ordering::SeqCst);
            }),
            NotifyPriority::Normal,
        );
        assert_eq!(registry.subscriber_count(), 1);

        registry.notify(9, ChangeKind::Changed);
        assert!(registry.unsubscribe(subscription));
        registry.notify(9, ChangeKind::Changed);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(registry.subscriber_count(), 0);
    }
}
