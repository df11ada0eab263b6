//! Resource identity
//!
//! The cache never compares resources by value. Each resource exposes a
//! stable identity (a numeric id, a canonical path, ...) that is used for
//! deduplication, lookups and change notifications.

use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};

/// An externally owned resource that can be held by a
/// [`ResourceCache`](crate::ResourceCache).
///
/// Resources are shared as `Arc<R>`; the cache holds one strong reference
/// per entry and never assumes it is the sole owner.
pub trait Resource: Send + Sync + 'static {
    /// Identity used as the lookup key
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Stable identity of this resource
    fn id(&self) -> Self::Id;
}

/// A resource backed by a file on disk
///
/// Required by [`FileRegistry`](crate::FileRegistry) to check the file's
/// on-disk stamp.
pub trait FileBacked: Resource {
    fn path(&self) -> &Path;
}

/// A payload loaded from a file, identified by its path
///
/// # Example
///
/// ```rust
/// use rescache::{FileResource, Resource};
/// use std::path::PathBuf;
///
/// let pixels = FileResource::new("/photos/cat.png", vec![0u8; 16]);
/// assert_eq!(pixels.id(), PathBuf::from("/photos/cat.png"));
/// assert_eq!(pixels.data().len(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource<T> {
    path: PathBuf,
    data: T,
}

impl<T> FileResource<T> {
    pub fn new(path: impl Into<PathBuf>, data: T) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: Send + Sync + 'static> Resource for FileResource<T> {
    type Id = PathBuf;

    fn id(&self) -> PathBuf {
        self.path.clone()
    }
}

impl<T: Send + Sync + 'static> FileBacked for FileResource<T> {
    fn path(&self) -> &Path {
        &self.path
    }
}
