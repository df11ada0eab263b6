//! Release strategies
//!
//! A release strategy is the caller's cleanup hook. The cache calls it exactly
//! once for every entry that leaves the cache (eviction, invalidation,
//! explicit removal, `clear`, or drop of the cache), while the cache still
//! holds its own strong reference to the resource.

use crate::error::ReleaseError;
use std::sync::Arc;

/// Cleanup invoked once per removed cache entry
///
/// Any `FnMut(&Arc<R>) + Send` closure is a release strategy that never
/// fails. Implement the trait directly for stateful or fallible cleanup.
///
/// Implementations run while the cache is locked and must not call back into
/// the cache that owns them.
///
/// # Example
///
/// ```rust
/// use rescache::{ReleaseError, ReleaseStrategy, Resource};
/// use std::sync::Arc;
///
/// struct Blob(u64);
/// impl Resource for Blob {
///     type Id = u64;
///     fn id(&self) -> u64 { self.0 }
/// }
///
/// /// Tracks how many bytes the application still keeps alive elsewhere
/// struct Accounting { released: usize }
///
/// impl ReleaseStrategy<Blob> for Accounting {
///     fn release(&mut self, _blob: &Arc<Blob>) -> Result<(), ReleaseError> {
///         self.released += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait ReleaseStrategy<R>: Send {
    /// Release `resource`
    ///
    /// # Errors
    ///
    /// A returned error is reported to the caller of the operation that
    /// removed the entry. The entry is gone either way.
    fn release(&mut self, resource: &Arc<R>) -> Result<(), ReleaseError>;
}

impl<R, F> ReleaseStrategy<R> for F
where
    F: FnMut(&Arc<R>) + Send,
{
    fn release(&mut self, resource: &Arc<R>) -> Result<(), ReleaseError> {
        self(resource);
        Ok(())
    }
}

/// Release strategy that only drops the cache's reference
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRelease;

impl<R> ReleaseStrategy<R> for NoopRelease {
    fn release(&mut self, _resource: &Arc<R>) -> Result<(), ReleaseError> {
        Ok(())
    }
}
