//! Tests for directory traversal through the facade.

use super::test_utils::TestFixture;
use crate::config::FsafConfig;
use crate::file::{AbstractFile, Segment};
use crate::manager::BaseDirectory;
use crate::provider::LocalDocumentProvider;
use crate::{FileManager, TraverseMode};

const TREE: &[&str] = &["a/one.txt", "a/b/two.txt", "empty/", "top.txt"];

/// A facade over the fixture plus a local and a provider root for it.
fn roots(fixture: &TestFixture) -> (FileManager<LocalDocumentProvider>, Vec<AbstractFile>) {
    fixture.create_tree(TREE).unwrap();
    let manager = FileManager::new(fixture.provider(), &FsafConfig::default());
    manager.register_base_directory(BaseDirectory::from_uri("fixture", fixture.tree_uri()));

    let local = manager.from_path(fixture.path());
    let remote = manager.from_uri(&fixture.tree_uri()).unwrap();
    (manager, vec![local, remote])
}

fn names(manager: &FileManager<LocalDocumentProvider>, files: &[AbstractFile]) -> Vec<String> {
    files.iter().filter_map(|file| manager.name(file)).collect()
}

fn traverse(
    manager: &FileManager<LocalDocumentProvider>,
    dir: &AbstractFile,
    recursive: bool,
    mode: TraverseMode,
) -> Vec<AbstractFile> {
    let mut visited = Vec::new();
    manager
        .traverse_directory(dir, recursive, mode, |file| visited.push(file.clone()))
        .unwrap();
    visited
}

#[test]
fn test_traverse_direct_children() {
    let fixture = TestFixture::new().unwrap();
    let (manager, roots) = roots(&fixture);

    for root in &roots {
        let both = traverse(&manager, root, false, TraverseMode::Both);
        assert_eq!(names(&manager, &both), vec!["a", "empty", "top.txt"]);

        let files = traverse(&manager, root, false, TraverseMode::OnlyFiles);
        assert_eq!(names(&manager, &files), vec!["top.txt"]);

        let dirs = traverse(&manager, root, false, TraverseMode::OnlyDirs);
        assert_eq!(names(&manager, &dirs), vec!["a", "empty"]);
    }
}

#[test]
fn test_traverse_recursively_breadth_first() {
    let fixture = TestFixture::new().unwrap();
    let (manager, roots) = roots(&fixture);

    for root in &roots {
        let files = traverse(&manager, root, true, TraverseMode::OnlyFiles);
        assert_eq!(names(&manager, &files), vec!["top.txt", "one.txt", "two.txt"]);

        let dirs = traverse(&manager, root, true, TraverseMode::OnlyDirs);
        assert_eq!(dirs.len(), 4);
        assert_eq!(&dirs[0], root);
        assert_eq!(names(&manager, &dirs[1..]), vec!["a", "empty", "b"]);
    }
}

#[test]
fn test_traverse_skips_missing_and_files() {
    let fixture = TestFixture::new().unwrap();
    let (manager, roots) = roots(&fixture);

    for root in &roots {
        let missing = root.clone_with([Segment::dir("ghost").unwrap()]).unwrap();
        assert!(traverse(&manager, &missing, true, TraverseMode::Both).is_empty());

        let top = manager.find_file(root, "top.txt").unwrap().unwrap();
        assert!(traverse(&manager, &top, true, TraverseMode::Both).is_empty());

        let empty = manager.find_file(root, "empty").unwrap().unwrap();
        assert!(traverse(&manager, &empty, true, TraverseMode::Both).is_empty());
    }
}

#[test]
fn test_collect_all_files_in_dir_tree() {
    let fixture = TestFixture::new().unwrap();
    let (manager, roots) = roots(&fixture);

    for root in &roots {
        let files = manager.collect_all_files_in_dir_tree(root, false).unwrap();
        assert_eq!(names(&manager, &files), vec!["top.txt", "one.txt", "two.txt"]);

        let with_empty = manager.collect_all_files_in_dir_tree(root, true).unwrap();
        assert_eq!(
            names(&manager, &with_empty),
            vec!["empty", "top.txt", "one.txt", "two.txt"]
        );
        assert!(manager.is_directory(&with_empty[0]));
    }
}

#[test]
fn test_collect_from_empty_directory() {
    let fixture = TestFixture::new().unwrap();
    let (manager, roots) = roots(&fixture);

    for root in &roots {
        let empty = manager.find_file(root, "empty").unwrap().unwrap();
        assert!(manager
            .collect_all_files_in_dir_tree(&empty, true)
            .unwrap()
            .is_empty());
    }
}

#[test]
fn test_traverse_modes() {
    assert!(TraverseMode::Both.includes_dirs() && TraverseMode::Both.includes_files());
    assert!(TraverseMode::OnlyDirs.includes_dirs() && !TraverseMode::OnlyDirs.includes_files());
    assert!(!TraverseMode::OnlyFiles.includes_dirs() && TraverseMode::OnlyFiles.includes_files());
}
