//! File manager for the hierarchical file API.
//!
//! Local file system calls are cheap, so nothing is cached: every operation
//! goes straight to `std::fs`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use tracing::{debug, warn};

use super::BaseFileManager;
use crate::error::{report_error, ErrorContext, FsafError, FsafResult};
use crate::file::{RawFile, Root};

const COMPONENT: &str = "raw_file_manager";

/// Stateless manager for [`RawFile`] handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawFileManager;

impl RawFileManager {
    /// Creates a manager.
    pub fn new() -> Self {
        Self
    }

    /// A handle rooted at `path`: a file root if `path` is an existing file,
    /// a directory root otherwise.
    pub fn to_raw_file<P: AsRef<Path>>(&self, path: P) -> RawFile {
        let path = path.as_ref();
        match path.file_name() {
            Some(name) if path.is_file() => RawFile::new(Root::File {
                holder: path.to_path_buf(),
                name: name.to_string_lossy().into_owned(),
            }),
            _ => RawFile::new(Root::Dir(path.to_path_buf())),
        }
    }

    fn report_failure(&self, error: io::Error, operation: &str, path: &Path) {
        warn!(%error, operation, path = %path.display(), "file system call failed");
        report_error(
            ErrorContext::new(FsafError::Io(error), COMPONENT)
                .with_details(format!("{operation} on {}", path.display())),
        );
    }

    fn remove(&self, path: &Path) -> bool {
        let result = match fs::symlink_metadata(path) {
            Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
            Ok(_) => fs::remove_file(path),
            Err(error) if error.kind() == io::ErrorKind::NotFound => return true,
            Err(error) => Err(error),
        };

        match result {
            Ok(()) => true,
            Err(error) => {
                self.report_failure(error, "remove", path);
                false
            }
        }
    }
}

impl BaseFileManager for RawFileManager {
    type File = RawFile;

    fn exists(&self, file: &RawFile) -> bool {
        file.to_path().exists()
    }

    fn is_file(&self, file: &RawFile) -> bool {
        file.to_path().is_file()
    }

    fn is_directory(&self, file: &RawFile) -> bool {
        file.to_path().is_dir()
    }

    fn can_read(&self, file: &RawFile) -> bool {
        fs::metadata(file.to_path()).is_ok()
    }

    fn can_write(&self, file: &RawFile) -> bool {
        fs::metadata(file.to_path()).is_ok_and(|metadata| !metadata.permissions().readonly())
    }

    fn length(&self, file: &RawFile) -> Option<u64> {
        fs::metadata(file.to_path())
            .ok()
            .filter(|metadata| metadata.is_file())
            .map(|metadata| metadata.len())
    }

    fn last_modified(&self, file: &RawFile) -> Option<u64> {
        fs::metadata(file.to_path())
            .and_then(|metadata| metadata.modified())
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_millis() as u64)
    }

    fn name(&self, file: &RawFile) -> Option<String> {
        if let Some(name) = file.known_file_name() {
            return Some(name.to_string());
        }

        let path = file.to_path();
        if !path.exists() {
            return None;
        }
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn find_file(&self, dir: &RawFile, name: &str) -> FsafResult<Option<RawFile>> {
        if dir.is_file_name_appended() {
            return Err(FsafError::NotADirectory(dir.full_path()));
        }

        let path = dir.to_path().join(name);
        Ok(path.exists().then(|| self.to_raw_file(path)))
    }

    fn list_files(&self, dir: &RawFile) -> FsafResult<Vec<RawFile>> {
        if dir.is_file_name_appended() {
            return Err(FsafError::NotADirectory(dir.full_path()));
        }

        let path = dir.to_path();
        if !path.is_dir() {
            return Ok(Vec::new());
        }

        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(error) => {
                self.report_failure(error, "read_dir", &path);
                return Ok(Vec::new());
            }
        };

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect();
        paths.sort();

        Ok(paths.into_iter().map(|path| self.to_raw_file(path)).collect())
    }

    fn delete(&self, file: &RawFile) -> bool {
        self.remove(&file.to_path())
    }

    fn delete_content(&self, dir: &RawFile) -> bool {
        let path = dir.to_path();
        if !path.exists() {
            return true;
        }
        if !path.is_dir() {
            return false;
        }

        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(error) => {
                self.report_failure(error, "read_dir", &path);
                return false;
            }
        };

        let mut all_deleted = true;
        for entry in entries {
            match entry {
                Ok(entry) => all_deleted &= self.remove(&entry.path()),
                Err(error) => {
                    self.report_failure(error, "read_dir", &path);
                    all_deleted = false;
                }
            }
        }
        all_deleted
    }

    fn create(&self, file: &RawFile) -> Option<RawFile> {
        let path = file.to_path();

        let result = if file.is_file_name_appended() {
            path.parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|()| {
                    OpenOptions::new()
                        .write(true)
                        .create(true)
                        .truncate(false)
                        .open(&path)
                        .map(|_| ())
                })
        } else {
            fs::create_dir_all(&path)
        };

        match result {
            Ok(()) => {
                debug!(path = %path.display(), "created");
                Some(self.to_raw_file(path))
            }
            Err(error) => {
                self.report_failure(error, "create", &path);
                None
            }
        }
    }
}
