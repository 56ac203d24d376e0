//! Snapshot lifecycle tests.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::test_utils::{dir_row, file_row, TestFixture};
use crate::config::{FsafConfig, SearchMode};
use crate::document::{CachedDocument, DocumentUri, PreloadedInfo};
use crate::file::{ExternalFile, Root};
use crate::manager::{BaseFileManager, DirectoryManager, ExternalFileManager};
use crate::provider::MockDocumentProvider;

const ROOT_URI: &str = "content://mock/tree/root";

/// Mock listing `root/{x.txt, sub/}` and `root/sub/{y.txt}`.
fn listing_provider(listings: usize) -> MockDocumentProvider {
    let mut provider = MockDocumentProvider::new();
    provider
        .expect_document_uri()
        .returning(|_, id| DocumentUri::new(format!("content://mock/document/{id}")));
    provider
        .expect_list_children()
        .times(listings)
        .returning(|parent, _| {
            Ok(if parent.as_str() == ROOT_URI {
                vec![dir_row("root", "sub"), file_row("root", "x.txt", 1)]
            } else {
                vec![file_row("root/sub", "y.txt", 2)]
            })
        });
    provider.expect_find_child().times(0);
    provider
}

fn manager(
    provider: MockDocumentProvider,
    config: &FsafConfig,
) -> (ExternalFileManager<MockDocumentProvider>, ExternalFile) {
    let manager = ExternalFileManager::new(provider, Arc::new(DirectoryManager::new()), config);
    let root = ExternalFile::new(Root::Dir(CachedDocument::root(
        DocumentUri::new(ROOT_URI),
        PreloadedInfo::directory("root", "root"),
    )));
    (manager, root)
}

#[test]
fn test_one_listing_per_directory() {
    let (manager, root) = manager(listing_provider(2), &FsafConfig::default());

    assert_eq!(manager.create_snapshot(&root, true).unwrap(), 2);

    let y = root.append_dir("sub").unwrap().append_file("y.txt").unwrap();
    assert!(manager.is_file(&y));
    assert_eq!(manager.length(&y), Some(2));
    assert_eq!(manager.length(&root.append_file("x.txt").unwrap()), Some(1));
}

#[test]
fn test_snapshot_files_listed_from_cache() {
    let (manager, root) = manager(listing_provider(1), &FsafConfig::default());

    manager.create_snapshot(&root, false).unwrap();
    let names: Vec<_> = manager
        .list_snapshot_files(&root)
        .iter()
        .filter_map(|file| manager.name(file))
        .collect();
    assert_eq!(names, vec!["sub", "x.txt"]);
}

#[test]
fn test_guard_releases_on_drop() {
    let (manager, root) = manager(listing_provider(2), &FsafConfig::default());

    {
        let guard = manager.snapshot(&root, true).unwrap();
        assert_eq!(guard.dir(), &root);
        assert_eq!(manager.trie().len(), 3);
    }

    assert_eq!(manager.trie().len(), 0);
}

#[test]
fn test_release_runs_when_block_panics() {
    let (manager, root) = manager(listing_provider(1), &FsafConfig::default());

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        manager
            .with_snapshot(&root, false, |_| -> usize { panic!("work failed") })
            .unwrap()
    }));

    assert!(result.is_err());
    assert_eq!(manager.trie().len(), 0);
}

#[test]
fn test_release_is_idempotent() {
    let (manager, root) = manager(listing_provider(1), &FsafConfig::default());

    manager.create_snapshot(&root, false).unwrap();
    assert!(manager.release_snapshot(&root));
    assert!(!manager.release_snapshot(&root));
}

#[test]
fn test_slow_mode_skips_snapshot() {
    let mut config = FsafConfig::default();
    config.cache.search_mode = SearchMode::Slow;
    let (manager, root) = manager(listing_provider(0), &config);

    assert_eq!(manager.create_snapshot(&root, true).unwrap(), 0);
    assert!(manager.list_snapshot_files(&root).is_empty());
}

#[test]
fn test_snapshot_over_local_provider() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .create_tree(&["docs/a.txt", "docs/deep/b.txt", "empty/"])
        .unwrap();
    let (manager, root) = fixture.external_manager(&FsafConfig::default());

    let docs = root.append_dir("docs").unwrap();
    let listed = manager
        .with_snapshot(&docs, true, |manager| manager.list_snapshot_files(&docs).len())
        .unwrap();
    assert_eq!(listed, 2);

    let empty = root.append_dir("empty").unwrap();
    assert_eq!(manager.create_snapshot(&empty, true).unwrap(), 1);
    assert!(manager.list_snapshot_files(&empty).is_empty());
}
