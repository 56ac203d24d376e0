//! The file manager facade.
//!
//! [`FileManager`] accepts [`AbstractFile`] handles and forwards each call to
//! the manager of the handle's backing store. It also owns the base
//! directory registry shared with the external manager.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::FsafConfig;
use crate::document::DocumentUri;
use crate::error::FsafResult;
use crate::file::{AbstractFile, ExternalFile};
use crate::manager::{
    BaseDirectory, BaseFileManager, DirectoryManager, ExternalFileManager, RawFileManager,
};
use crate::provider::DocumentProvider;

/// Forwards a call to the manager of the handle's variant.
macro_rules! dispatch {
    (@wrap $self:ident, $file:expr, $op:ident $(, $arg:expr)*) => {
        match $file {
            AbstractFile::Raw(file) => $self.raw.$op(file $(, $arg)*).map(AbstractFile::Raw),
            AbstractFile::External(file) => {
                $self.external.$op(file $(, $arg)*).map(AbstractFile::External)
            }
        }
    };
    ($self:ident, $file:expr, $op:ident $(, $arg:expr)*) => {
        match $file {
            AbstractFile::Raw(file) => $self.raw.$op(file $(, $arg)*),
            AbstractFile::External(file) => $self.external.$op(file $(, $arg)*),
        }
    };
}

/// Which entries [`FileManager::traverse_directory`] hands to its visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseMode {
    /// Regular files only
    OnlyFiles,
    /// Directories only
    OnlyDirs,
    /// Files and directories
    Both,
}

impl TraverseMode {
    /// True for [`TraverseMode::OnlyDirs`] and [`TraverseMode::Both`].
    pub fn includes_dirs(self) -> bool {
        matches!(self, TraverseMode::OnlyDirs | TraverseMode::Both)
    }

    /// True for [`TraverseMode::OnlyFiles`] and [`TraverseMode::Both`].
    pub fn includes_files(self) -> bool {
        matches!(self, TraverseMode::OnlyFiles | TraverseMode::Both)
    }
}

/// Entry point for file operations over both backing stores.
pub struct FileManager<P> {
    raw: RawFileManager,
    external: ExternalFileManager<P>,
    directories: Arc<DirectoryManager>,
    include_subdirs: bool,
}

impl<P: DocumentProvider> FileManager<P> {
    /// Creates a facade whose external handles are served by `provider`.
    pub fn new(provider: P, config: &FsafConfig) -> Self {
        let directories = Arc::new(DirectoryManager::new());
        let external = ExternalFileManager::new(provider, directories.clone(), config);

        Self {
            raw: RawFileManager::new(),
            external,
            directories,
            include_subdirs: config.cache.snapshot.include_subdirs,
        }
    }

    /// Base directory registry.
    pub fn directories(&self) -> &DirectoryManager {
        &self.directories
    }

    /// The provider backed manager.
    pub fn external(&self) -> &ExternalFileManager<P> {
        &self.external
    }

    /// Registers a base directory.
    pub fn register_base_directory(&self, dir: BaseDirectory) {
        self.directories.register(dir);
    }

    /// Handle for a local path. No I/O beyond a file type check.
    pub fn from_path<T: AsRef<Path>>(&self, path: T) -> AbstractFile {
        AbstractFile::Raw(self.raw.to_raw_file(path))
    }

    /// Handle for a provider document. `None` if it does not exist.
    pub fn from_uri(&self, uri: &DocumentUri) -> Option<AbstractFile> {
        self.external.from_uri(uri).map(AbstractFile::External)
    }

    /// Handle for the registered base directory `id`. A provider URI wins
    /// over a local path when both are set.
    pub fn new_base_directory_file(&self, id: &str) -> Option<AbstractFile> {
        let dir = self.directories.get_by_id(id)?;
        if let Some(uri) = dir.dir_uri() {
            return self.from_uri(uri);
        }

        dir.dir_path().map(|path| self.from_path(path))
    }

    /// See [`BaseFileManager::exists`].
    pub fn exists(&self, file: &AbstractFile) -> bool {
        dispatch!(self, file, exists)
    }

    /// See [`BaseFileManager::is_file`].
    pub fn is_file(&self, file: &AbstractFile) -> bool {
        dispatch!(self, file, is_file)
    }

    /// See [`BaseFileManager::is_directory`].
    pub fn is_directory(&self, file: &AbstractFile) -> bool {
        dispatch!(self, file, is_directory)
    }

    /// See [`BaseFileManager::can_read`].
    pub fn can_read(&self, file: &AbstractFile) -> bool {
        dispatch!(self, file, can_read)
    }

    /// See [`BaseFileManager::can_write`].
    pub fn can_write(&self, file: &AbstractFile) -> bool {
        dispatch!(self, file, can_write)
    }

    /// See [`BaseFileManager::length`].
    pub fn length(&self, file: &AbstractFile) -> Option<u64> {
        dispatch!(self, file, length)
    }

    /// See [`BaseFileManager::last_modified`].
    pub fn last_modified(&self, file: &AbstractFile) -> Option<u64> {
        dispatch!(self, file, last_modified)
    }

    /// See [`BaseFileManager::name`].
    pub fn name(&self, file: &AbstractFile) -> Option<String> {
        dispatch!(self, file, name)
    }

    /// See [`BaseFileManager::find_file`].
    pub fn find_file(&self, dir: &AbstractFile, name: &str) -> FsafResult<Option<AbstractFile>> {
        Ok(match dir {
            AbstractFile::Raw(dir) => self.raw.find_file(dir, name)?.map(AbstractFile::Raw),
            AbstractFile::External(dir) => self
                .external
                .find_file(dir, name)?
                .map(AbstractFile::External),
        })
    }

    /// See [`BaseFileManager::list_files`].
    pub fn list_files(&self, dir: &AbstractFile) -> FsafResult<Vec<AbstractFile>> {
        Ok(match dir {
            AbstractFile::Raw(dir) => self
                .raw
                .list_files(dir)?
                .into_iter()
                .map(AbstractFile::Raw)
                .collect(),
            AbstractFile::External(dir) => self
                .external
                .list_files(dir)?
                .into_iter()
                .map(AbstractFile::External)
                .collect(),
        })
    }

    /// Cached children of a snapshotted directory. Local directories are
    /// never cached, so they list nothing.
    pub fn list_snapshot_files(&self, dir: &AbstractFile) -> Vec<AbstractFile> {
        match dir {
            AbstractFile::Raw(_) => Vec::new(),
            AbstractFile::External(dir) => self
                .external
                .list_snapshot_files(dir)
                .into_iter()
                .map(AbstractFile::External)
                .collect(),
        }
    }

    /// See [`BaseFileManager::delete`].
    pub fn delete(&self, file: &AbstractFile) -> bool {
        dispatch!(self, file, delete)
    }

    /// See [`BaseFileManager::delete_content`].
    pub fn delete_content(&self, dir: &AbstractFile) -> bool {
        dispatch!(self, dir, delete_content)
    }

    /// See [`BaseFileManager::create`].
    pub fn create(&self, file: &AbstractFile) -> Option<AbstractFile> {
        dispatch!(@wrap self, file, create)
    }

    /// See [`ExternalFileManager::create_snapshot`].
    pub fn create_snapshot(&self, dir: &ExternalFile, include_subdirs: bool) -> FsafResult<usize> {
        self.external.create_snapshot(dir, include_subdirs)
    }

    /// See [`ExternalFileManager::release_snapshot`].
    pub fn release_snapshot(&self, dir: &ExternalFile) -> bool {
        self.external.release_snapshot(dir)
    }

    /// Runs `f` inside a snapshot of `dir`. Local directories run `f`
    /// directly.
    ///
    /// # Errors
    ///
    /// Same as [`ExternalFileManager::create_snapshot`].
    pub fn with_snapshot<T, F>(&self, dir: &AbstractFile, recursive: bool, f: F) -> FsafResult<T>
    where
        F: FnOnce(&Self) -> T,
    {
        match dir {
            AbstractFile::Raw(_) => {
                debug!(dir = %dir, "local directory, no snapshot needed");
                Ok(f(self))
            }
            AbstractFile::External(external) => {
                let _guard = self.external.snapshot(external, recursive)?;
                Ok(f(self))
            }
        }
    }

    /// Walks the directory `dir` and calls `visitor` on the entries `mode`
    /// selects.
    ///
    /// Without `recursive` only the direct children of `dir` are visited.
    /// A recursive walk is breadth first and starts with `dir` itself, so
    /// directory modes see `dir` before its content. A missing or empty
    /// directory, or a handle that is not a directory, visits nothing.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`list_files`](Self::list_files).
    pub fn traverse_directory<F>(
        &self,
        dir: &AbstractFile,
        recursive: bool,
        mode: TraverseMode,
        mut visitor: F,
    ) -> FsafResult<()>
    where
        F: FnMut(&AbstractFile),
    {
        if !self.is_directory(dir) {
            warn!(dir = %dir, "not an existing directory, nothing to traverse");
            return Ok(());
        }

        let children = self.list_files(dir)?;
        if children.is_empty() {
            debug!(dir = %dir, "directory is empty");
            return Ok(());
        }

        if !recursive {
            for child in &children {
                if self.is_selected(child, mode) {
                    visitor(child);
                }
            }
            return Ok(());
        }

        if mode.includes_dirs() {
            visitor(dir);
        }

        let mut queue: VecDeque<AbstractFile> = children.into();
        while let Some(file) = queue.pop_front() {
            if self.is_directory(&file) {
                if mode.includes_dirs() {
                    visitor(&file);
                }
                queue.extend(self.list_files(&file)?);
            } else if self.is_file(&file) {
                if mode.includes_files() {
                    visitor(&file);
                }
            } else {
                debug!(file = %file, "entry vanished during traversal");
            }
        }

        Ok(())
    }

    /// Every file below `dir`, breadth first. With `include_empty_dirs`
    /// empty subdirectories are collected as well. A missing, empty or
    /// non-directory `dir` yields nothing.
    ///
    /// # Errors
    ///
    /// Same as [`traverse_directory`](Self::traverse_directory).
    pub fn collect_all_files_in_dir_tree(
        &self,
        dir: &AbstractFile,
        include_empty_dirs: bool,
    ) -> FsafResult<Vec<AbstractFile>> {
        if !self.is_directory(dir) {
            warn!(dir = %dir, "not an existing directory, nothing to collect");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut queue = VecDeque::from([dir.clone()]);
        while let Some(file) = queue.pop_front() {
            if self.is_directory(&file) {
                let children = self.list_files(&file)?;
                if children.is_empty() && include_empty_dirs && &file != dir {
                    files.push(file);
                    continue;
                }
                queue.extend(children);
            } else if self.is_file(&file) {
                files.push(file);
            }
        }

        Ok(files)
    }

    fn is_selected(&self, file: &AbstractFile, mode: TraverseMode) -> bool {
        (mode.includes_dirs() && self.is_directory(file))
            || (mode.includes_files() && self.is_file(file))
    }

    /// [`with_snapshot`](Self::with_snapshot) with the configured
    /// `cache.snapshot.include_subdirs`.
    pub fn with_default_snapshot<T, F>(&self, dir: &AbstractFile, f: F) -> FsafResult<T>
    where
        F: FnOnce(&Self) -> T,
    {
        self.with_snapshot(dir, self.include_subdirs, f)
    }
}
