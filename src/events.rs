//! Change notification types
//!
//! Registries broadcast a [`ChangeEvent`] whenever a resource they track is
//! reread or modified. Listeners subscribe once for every resource and filter
//! on [`ChangeKind`] themselves.

use crate::sync::RwLockExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// What happened to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The resource was explicitly reloaded from its source
    Reread,
    /// The underlying content changed
    Changed,
    /// The resource moved to a new location; content is unchanged
    Renamed,
    /// Only auxiliary metadata (marks, tags, ...) changed
    Metadata,
}

impl ChangeKind {
    /// Whether content held by caches must be discarded
    #[must_use]
    pub fn affects_content(self) -> bool {
        matches!(self, ChangeKind::Reread | ChangeKind::Changed)
    }
}

/// A change notification for a single resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent<Id> {
    pub id: Id,
    pub kind: ChangeKind,
}

impl<Id> ChangeEvent<Id> {
    pub fn new(id: Id, kind: ChangeKind) -> Self {
        Self { id, kind }
    }
}

/// Delivery order of listeners; `High` listeners run first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum NotifyPriority {
    High,
    #[default]
    Normal,
    Low,
}

/// Type alias for a change listener
pub type ChangeListener<Id> = Arc<dyn Fn(&ChangeEvent<Id>) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription#{}", self.0)
    }
}

struct Subscriber<Id> {
    id: SubscriptionId,
    priority: NotifyPriority,
    listener: ChangeListener<Id>,
}

/// Priority-ordered set of change listeners
///
/// Shared building block for registries. Listeners are called without the
/// internal lock held, so a listener may unsubscribe or subscribe others.
pub struct ListenerSet<Id> {
    next_id: AtomicU64,
    subscribers: RwLock<Vec<Subscriber<Id>>>,
}

impl<Id> ListenerSet<Id> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener for every resource
    ///
    /// Listeners with equal priority are called in subscription order.
    pub fn subscribe(
        &self,
        listener: ChangeListener<Id>,
        priority: NotifyPriority,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.subscribers.write_recovered();
        // Insert after every subscriber of the same or higher priority
        let position = guard
            .iter()
            .position(|s| s.priority > priority)
            .unwrap_or(guard.len());
        guard.insert(
            position,
            Subscriber {
                id,
                priority,
                listener,
            },
        );
        log::debug!("Registered change listener {id} ({priority:?})");
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self.subscribers.write_recovered();
        let before = guard.len();
        guard.retain(|s| s.id != id);
        before != guard.len()
    }

    /// Deliver `event` to every listener in priority order
    pub fn notify(&self, event: &ChangeEvent<Id>) {
        let listeners: Vec<ChangeListener<Id>> = self
            .subscribers
            .read_recovered()
            .iter()
            .map(|s| Arc::clone(&s.listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.read_recovered().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<Id> Default for ListenerSet<Id> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_listener_receives_every_resource() {
        let listeners = ListenerSet::<u64>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        listeners.subscribe(
            Arc::new(move |_event: &ChangeEvent<u64>| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            }),
            NotifyPriority::Normal,
        );

        listeners.notify(&ChangeEvent::new(1, ChangeKind::Changed));
        listeners.notify(&ChangeEvent::new(2, ChangeKind::Metadata));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_priority_order() {
        let listeners = ListenerSet::<u64>::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for (name, priority) in [
            ("low", NotifyPriority::Low),
            ("high", NotifyPriority::High),
            ("normal-1", NotifyPriority::Normal),
            ("normal-2", NotifyPriority::Normal),
        ] {
            let calls = calls.clone();
            listeners.subscribe(
                Arc::new(move |_event: &ChangeEvent<u64>| calls.lock().unwrap().push(name)),
                priority,
            );
        }

        listeners.notify(&ChangeEvent::new(7, ChangeKind::Reread));

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["high", "normal-1", "normal-2", "low"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let listeners = ListenerSet::<u64>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let id = listeners.subscribe(
            Arc::new(move |_event: &ChangeEvent<u64>| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            }),
            NotifyPriority::High,
        );

        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        assert!(listeners.is_empty());

        listeners.notify(&ChangeEvent::new(1, ChangeKind::Changed));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_content_kinds() {
        assert!(ChangeKind::Reread.affects_content());
        assert!(ChangeKind::Changed.affects_content());
        assert!(!ChangeKind::Renamed.affects_content());
        assert!(!ChangeKind::Metadata.affects_content());
    }
}
