//! Common test utilities for rescache integration tests
//!
//! Provides a test resource type, a recording release strategy and a fixture
//! wiring both into a cache backed by a `MemoryRegistry`.

#![allow(dead_code)]

use rescache::{MemoryRegistry, ReleaseError, ReleaseStrategy, Resource, ResourceCache};
use std::sync::{Arc, Mutex};

// =============================================================================
// Test Resource
// =============================================================================

/// A resource identified by a numeric id
#[derive(Debug)]
pub struct TestResource {
    pub id: u64,
    pub name: &'static str,
}

impl Resource for TestResource {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

pub fn resource(id: u64, name: &'static str) -> Arc<TestResource> {
    Arc::new(TestResource { id, name })
}

// =============================================================================
// Recording Release Strategy
// =============================================================================

/// Records the id of every released resource, optionally failing for some
#[derive(Clone, Default)]
pub struct Recorder {
    released: Arc<Mutex<Vec<u64>>>,
    failing: Arc<Mutex<Vec<u64>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids released so far, in release order
    pub fn released(&self) -> Vec<u64> {
        self.released.lock().unwrap().clone()
    }

    pub fn count(&self, id: u64) -> usize {
        self.released().iter().filter(|r| **r == id).count()
    }

    /// Make releasing `id` return an error (it is still recorded)
    pub fn fail_on(&self, id: u64) {
        self.failing.lock().unwrap().push(id);
    }
}

impl ReleaseStrategy<TestResource> for Recorder {
    fn release(&mut self, resource: &Arc<TestResource>) -> Result<(), ReleaseError> {
        self.released.lock().unwrap().push(resource.id);
        if self.failing.lock().unwrap().contains(&resource.id) {
            return Err(format!("cannot release {}", resource.name).into());
        }
        Ok(())
    }
}

// =============================================================================
// Test Fixture
// =============================================================================

pub struct TestFixture {
    pub registry: Arc<MemoryRegistry<TestResource>>,
    pub recorder: Recorder,
    pub cache: ResourceCache<TestResource>,
}

impl TestFixture {
    /// Create a cache with the given byte budget
    pub fn new(max_size: u64) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let registry = Arc::new(MemoryRegistry::<TestResource>::new());
        let recorder = Recorder::new();
        let cache: ResourceCache<TestResource> =
            ResourceCache::new(recorder.clone(), max_size, registry.clone());

        Self {
            registry,
            recorder,
            cache,
        }
    }

    /// Cached ids, most recently used first
    pub fn order(&self) -> Vec<u64> {
        self.cache.dump().ids().copied().collect()
    }

    /// Assert size accounting, uniqueness and budget invariants
    pub fn assert_invariants(&self) {
        let dump = self.cache.dump();
        let sum: u64 = dump.entries.iter().map(|e| e.size).sum();
        assert_eq!(dump.total_size, sum, "total_size must equal the sum of sizes");

        let mut ids: Vec<u64> = dump.ids().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), dump.entries.len(), "identities must be unique");

        assert!(
            dump.total_size <= dump.max_size || dump.entries.len() == 1,
            "over budget with {} entries",
            dump.entries.len()
        );
    }
}
