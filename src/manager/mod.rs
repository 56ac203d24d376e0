//! File managers.
//!
//! Each backing store gets one manager implementing [`BaseFileManager`]:
//! [`RawFileManager`] for the hierarchical file API and
//! [`ExternalFileManager`] for document providers. Only the latter caches,
//! because only provider calls are expensive.
//!
//! Absence is never an error here. Operations on files that do not exist
//! answer `false` or `None`; `Err` is reserved for misuse such as listing a
//! handle that ends with a file name.

pub mod base_directory;
pub mod external;
pub mod raw;
pub mod snapshot;

use crate::error::FsafResult;

pub use base_directory::{BaseDirectory, DirectoryManager, DirectoryRegistry};
pub use external::ExternalFileManager;
pub use raw::RawFileManager;
pub use snapshot::SnapshotGuard;

/// Operations shared by every backing store.
pub trait BaseFileManager {
    /// Handle type this manager resolves.
    type File;

    /// True if the handle resolves to an existing object.
    fn exists(&self, file: &Self::File) -> bool;

    /// True if the handle resolves to a regular file.
    fn is_file(&self, file: &Self::File) -> bool;

    /// True if the handle resolves to a directory.
    fn is_directory(&self, file: &Self::File) -> bool;

    /// True if the resolved object may be read.
    fn can_read(&self, file: &Self::File) -> bool;

    /// True if the resolved object may be written or deleted.
    fn can_write(&self, file: &Self::File) -> bool;

    /// Size in bytes. `None` for directories and missing files.
    fn length(&self, file: &Self::File) -> Option<u64>;

    /// Modification time in milliseconds since the epoch.
    fn last_modified(&self, file: &Self::File) -> Option<u64>;

    /// File name. Answered without I/O when the handle already ends with a
    /// file name.
    fn name(&self, file: &Self::File) -> Option<String>;

    /// The child `name` of `dir`.
    ///
    /// # Errors
    ///
    /// [`FsafError::NotADirectory`](crate::error::FsafError::NotADirectory)
    /// if `dir` ends with a file name.
    fn find_file(&self, dir: &Self::File, name: &str) -> FsafResult<Option<Self::File>>;

    /// All children of `dir`. Empty if `dir` does not exist.
    ///
    /// # Errors
    ///
    /// [`FsafError::NotADirectory`](crate::error::FsafError::NotADirectory)
    /// if `dir` ends with a file name.
    fn list_files(&self, dir: &Self::File) -> FsafResult<Vec<Self::File>>;

    /// Deletes the object and everything below it. A handle that does not
    /// resolve counts as deleted.
    fn delete(&self, file: &Self::File) -> bool;

    /// Deletes every child of `dir`, keeping `dir` itself. True only if all
    /// deletions succeeded.
    fn delete_content(&self, dir: &Self::File) -> bool;

    /// Creates the object and any missing parent directories. Returns the
    /// handle of the created (or already existing) object.
    fn create(&self, file: &Self::File) -> Option<Self::File>;
}
