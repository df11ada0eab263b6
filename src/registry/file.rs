//! File-stamp based registry
//!
//! Staleness is derived from a `(len, modified)` stamp recorded when the
//! application loads a file. A file whose current stamp differs from the
//! recorded one, or that can no longer be stat'ed, is stale.

use super::ResourceRegistry;
use crate::error::{Error, Result};
use crate::events::{
    ChangeEvent, ChangeKind, ChangeListener, ListenerSet, NotifyPriority, SubscriptionId,
};
use crate::resource::FileBacked;
use crate::sync::RwLockExt;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn read(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Registry for resources loaded from files
///
/// Call [`track`](FileRegistry::track) after loading a file. Untracked files
/// are never reported stale.
///
/// # Example
///
/// ```rust,no_run
/// use rescache::{FileRegistry, FileResource};
///
/// # fn example() -> rescache::Result<()> {
/// let registry = FileRegistry::<FileResource<Vec<u8>>>::new();
/// let _bytes = std::fs::read("/photos/cat.png").unwrap_or_default();
/// registry.track("/photos/cat.png")?;
///
/// // Later, e.g. on a timer or when the window regains focus
/// let changed = registry.check_changed();
/// println!("{} files changed", changed.len());
/// # Ok(())
/// # }
/// ```
pub struct FileRegistry<R: FileBacked> {
    stamps: RwLock<HashMap<PathBuf, FileStamp>>,
    listeners: ListenerSet<R::Id>,
}

impl<R: FileBacked> FileRegistry<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stamps: RwLock::new(HashMap::new()),
            listeners: ListenerSet::new(),
        }
    }

    /// Record the current stamp of `path`
    ///
    /// Re-tracking an already tracked path refreshes its stamp, which is what
    /// a caller does after reloading the file. If the stamp moved, anything
    /// loaded before is out of date: a [`ChangeKind::Reread`] event is
    /// broadcast for `to_id(path)` so caches drop their old copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read.
    pub fn track_with<F>(&self, path: impl AsRef<Path>, to_id: F) -> Result<()>
    where
        F: FnOnce(&Path) -> R::Id,
    {
        let path = path.as_ref();
        let stamp = FileStamp::read(path).map_err(|e| Error::FileMetadata {
            path: path.to_path_buf(),
            source: e,
        })?;
        let previous = self
            .stamps
            .write_recovered()
            .insert(path.to_path_buf(), stamp);

        if previous.is_some_and(|recorded| recorded != stamp) {
            debug!("'{}' moved since it was last tracked", path.display());
            self.listeners
                .notify(&ChangeEvent::new(to_id(path), ChangeKind::Reread));
        }
        Ok(())
    }

    /// Stop tracking `path`, returning whether it was tracked
    pub fn forget(&self, path: impl AsRef<Path>) -> bool {
        self.stamps.write_recovered().remove(path.as_ref()).is_some()
    }

    pub fn is_tracked(&self, path: impl AsRef<Path>) -> bool {
        self.stamps.read_recovered().contains_key(path.as_ref())
    }

    pub fn tracked_count(&self) -> usize {
        self.stamps.read_recovered().len()
    }

    /// Refresh the stamp of `resource` and broadcast [`ChangeKind::Reread`]
    ///
    /// A vanished file is forgotten instead of refreshed.
    pub fn reread(&self, resource: &R) {
        let path = resource.path();
        match FileStamp::read(path) {
            Ok(stamp) => {
                self.stamps.write_recovered().insert(path.to_path_buf(), stamp);
            }
            Err(e) => {
                debug!("Forgetting '{}' on reread: {e}", path.display());
                self.stamps.write_recovered().remove(path);
            }
        }
        self.listeners
            .notify(&ChangeEvent::new(resource.id(), ChangeKind::Reread));
    }

    /// Broadcast a change event without touching stamps
    pub fn notify(&self, id: R::Id, kind: ChangeKind) {
        self.listeners.notify(&ChangeEvent::new(id, kind));
    }

    /// Scan every tracked file and report the ones whose stamp moved
    ///
    /// Changed files get their stamp refreshed and a [`ChangeKind::Changed`]
    /// event is broadcast for each, with `to_id` mapping the path to the
    /// resource identity. Vanished files are forgotten and reported too.
    pub fn check_changed_with<F>(&self, to_id: F) -> Vec<PathBuf>
    where
        F: Fn(&Path) -> R::Id,
    {
        let changed: Vec<PathBuf> = {
            let mut stamps = self.stamps.write_recovered();
            let mut changed = Vec::new();
            stamps.retain(|path, recorded| match FileStamp::read(path) {
                Ok(current) if current == *recorded => true,
                Ok(current) => {
                    *recorded = current;
                    changed.push(path.clone());
                    true
                }
                Err(_) => {
                    changed.push(path.clone());
                    false
                }
            });
            changed
        };

        for path in &changed {
            debug!("Detected change in '{}'", path.display());
            self.listeners
                .notify(&ChangeEvent::new(to_id(path), ChangeKind::Changed));
        }
        changed
    }
}

impl<R: FileBacked<Id = PathBuf>> FileRegistry<R> {
    /// [`track_with`](FileRegistry::track_with) for resources identified by
    /// their path
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read.
    pub fn track(&self, path: impl AsRef<Path>) -> Result<()> {
        self.track_with(path, Path::to_path_buf)
    }

    /// [`check_changed_with`](FileRegistry::check_changed_with) for resources
    /// identified by their path
    pub fn check_changed(&self) -> Vec<PathBuf> {
        self.check_changed_with(Path::to_path_buf)
    }
}

impl<R: FileBacked> Default for FileRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: FileBacked> ResourceRegistry<R> for FileRegistry<R> {
    fn is_stale(&self, resource: &R) -> bool {
        let path = resource.path();
        let Some(recorded) = self.stamps.read_recovered().get(path).copied() else {
            return false;
        };
        match FileStamp::read(path) {
            Ok(current) => current != recorded,
            Err(_) => true,
        }
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
