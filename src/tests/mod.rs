//! Test modules for FSAF.
//!
//! Cross-module suites live here; unit tests stay next to the code they
//! cover. Property-based tests use proptest, provider call counts are checked
//! with mockall.

pub mod config_tests;
pub mod raw_manager_tests;
pub mod segment_trie_tests;
pub mod snapshot_tests;
pub mod traversal_tests;

// Re-export commonly used testing tools to simplify imports in test modules
pub use test_utils::{
    create_test_dir, dir_row, file_row, segment_strategy, segments_strategy, TestFixture,
};
