//! Snapshots: bulk pre-population of the lookup cache.
//!
//! A snapshot lists each directory below a root once and caches every child
//! it finds, so later property reads in that subtree are cache hits. The
//! cost becomes one provider call per directory instead of one per file and
//! property. Releasing a snapshot drops the cached subtree.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use super::external::ExternalFileManager;
use crate::config::SearchMode;
use crate::document::CachedDocument;
use crate::error::{FsafError, FsafResult};
use crate::file::ExternalFile;
use crate::provider::DocumentProvider;

impl<P: DocumentProvider> ExternalFileManager<P> {
    /// Lists `dir` (and, with `include_subdirs`, every directory below it)
    /// and caches all children. Returns the number of directories listed.
    ///
    /// A missing or empty directory is a no-op. Traversal stops once
    /// `cache.snapshot.max_directories` directories were listed.
    ///
    /// # Errors
    ///
    /// [`FsafError::NotADirectory`] if `dir` ends with a file name.
    pub fn create_snapshot(&self, dir: &ExternalFile, include_subdirs: bool) -> FsafResult<usize> {
        if dir.is_file_name_appended() {
            return Err(FsafError::NotADirectory(dir.full_path()));
        }

        if self.search_mode() == SearchMode::Slow {
            debug!(dir = %dir, "slow search mode, snapshot skipped");
            return Ok(0);
        }

        let Some(root) = self.resolve(dir).filter(CachedDocument::is_directory) else {
            debug!(dir = %dir, "nothing to snapshot");
            return Ok(0);
        };

        let max_directories = self.cache_config().snapshot.max_directories;
        let mut pending = VecDeque::from([root]);
        let mut listed = 0;
        let mut cached = 0;

        while let Some(current) = pending.pop_front() {
            if listed >= max_directories {
                warn!(dir = %dir, max_directories, "snapshot directory limit reached");
                break;
            }

            let Some(children) = self.fetch_children(&current) else {
                continue;
            };
            listed += 1;

            for child in children {
                self.cache_document(&child);
                cached += 1;
                if include_subdirs && child.is_directory() {
                    pending.push_back(child);
                }
            }
        }

        info!(dir = %dir, directories = listed, documents = cached, "snapshot created");
        Ok(listed)
    }

    /// Drops every cached entry under `dir`. Returns false if nothing was
    /// cached there.
    pub fn release_snapshot(&self, dir: &ExternalFile) -> bool {
        let key = dir.key_segments();
        if key.is_empty() {
            return false;
        }

        let released = self.trie().remove(&key);
        if released {
            info!(dir = %dir, "snapshot released");
        }
        released
    }

    /// Creates a snapshot that is released when the returned guard drops.
    ///
    /// # Errors
    ///
    /// Same as [`create_snapshot`](Self::create_snapshot).
    pub fn snapshot(
        &self,
        dir: &ExternalFile,
        include_subdirs: bool,
    ) -> FsafResult<SnapshotGuard<'_, P>> {
        self.create_snapshot(dir, include_subdirs)?;
        Ok(SnapshotGuard {
            manager: self,
            dir: dir.clone(),
        })
    }

    /// Runs `f` inside a snapshot of `dir`. The snapshot is released on
    /// every exit path, including a panic in `f`.
    ///
    /// # Errors
    ///
    /// Same as [`create_snapshot`](Self::create_snapshot).
    pub fn with_snapshot<T, F>(&self, dir: &ExternalFile, recursive: bool, f: F) -> FsafResult<T>
    where
        F: FnOnce(&Self) -> T,
    {
        let _guard = self.snapshot(dir, recursive)?;
        Ok(f(self))
    }
}

/// Releases a snapshot on drop.
#[must_use = "the snapshot is released as soon as the guard is dropped"]
pub struct SnapshotGuard<'a, P: DocumentProvider> {
    manager: &'a ExternalFileManager<P>,
    dir: ExternalFile,
}

impl<P: DocumentProvider> SnapshotGuard<'_, P> {
    /// The snapshotted directory.
    pub fn dir(&self) -> &ExternalFile {
        &self.dir
    }
}

impl<P: DocumentProvider> Drop for SnapshotGuard<'_, P> {
    fn drop(&mut self) {
        self.manager.release_snapshot(&self.dir);
    }
}
