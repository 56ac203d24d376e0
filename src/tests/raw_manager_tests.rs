//! Tests for the local file manager and the facade over it.

use super::test_utils::TestFixture;
use crate::config::FsafConfig;
use crate::file::{AbstractFile, Segment};
use crate::manager::{BaseDirectory, BaseFileManager, RawFileManager};
use crate::FileManager;

#[test]
fn test_properties_of_local_files() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_tree(&["music/song.mp3", "empty/"]).unwrap();
    let manager = RawFileManager::new();
    let root = manager.to_raw_file(fixture.path());

    let song = root.append_dir("music").unwrap().append_file("song.mp3").unwrap();
    assert!(manager.exists(&song));
    assert!(manager.is_file(&song));
    assert!(manager.can_read(&song));
    assert!(manager.can_write(&song));
    assert_eq!(manager.length(&song), Some("music/song.mp3".len() as u64));
    assert!(manager.last_modified(&song).is_some());
    assert_eq!(manager.name(&song), Some("song.mp3".to_string()));

    let empty = root.append_dir("empty").unwrap();
    assert!(manager.is_directory(&empty));
    assert_eq!(manager.length(&empty), None);
    assert_eq!(manager.name(&empty), Some("empty".to_string()));
}

#[test]
fn test_missing_local_file() {
    let fixture = TestFixture::new().unwrap();
    let manager = RawFileManager::new();
    let missing = manager.to_raw_file(fixture.path()).append_dir("nothing").unwrap();

    assert!(!manager.exists(&missing));
    assert_eq!(manager.name(&missing), None);
    assert_eq!(manager.last_modified(&missing), None);
    assert!(manager.list_files(&missing).unwrap().is_empty());
    assert!(manager.find_file(&missing, "x").unwrap().is_none());
}

#[test]
fn test_facade_dispatches_both_variants() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_tree(&["shared/a.txt", "shared/b.txt"]).unwrap();

    let manager = FileManager::new(fixture.provider(), &FsafConfig::default());
    manager.register_base_directory(BaseDirectory::from_uri("fixture", fixture.tree_uri()));
    let local = manager.from_path(fixture.path());
    let remote = manager.from_uri(&fixture.tree_uri()).unwrap();

    for root in [&local, &remote] {
        let shared = root.clone_with([Segment::dir("shared").unwrap()]).unwrap();
        assert!(manager.is_directory(&shared));

        let names: Vec<_> = manager
            .list_files(&shared)
            .unwrap()
            .iter()
            .filter_map(|file| manager.name(file))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    assert!(matches!(local, AbstractFile::Raw(_)));
    assert!(matches!(remote, AbstractFile::External(_)));
}

#[test]
fn test_facade_create_and_delete() {
    let fixture = TestFixture::new().unwrap();
    let manager = FileManager::new(fixture.provider(), &FsafConfig::default());
    let local = manager.from_path(fixture.path());

    let target = local
        .clone_with([Segment::dir("new").unwrap(), Segment::file("file.txt").unwrap()])
        .unwrap();
    let created = manager.create(&target).unwrap();
    assert!(manager.is_file(&created));
    assert!(fixture.join("new/file.txt").is_file());

    assert!(manager.delete(&target));
    assert!(!manager.exists(&target));
}
