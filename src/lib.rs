//! FSAF: a file system abstraction over hierarchical files and document
//! providers.
//!
//! Files are addressed by handles: a resolved root plus pending path segments.
//! Handles on the local file system go straight to `std::fs`. Handles on a
//! document provider are resolved through a read-through cache, a trie keyed
//! by path segments, because every provider call is an expensive round trip.
//! Snapshots fill that cache for a whole subtree with one listing per
//! directory.
//!
//! # Architecture
//!
//! - [`data_structures::SegmentTrie`] caches resolved documents by path
//! - [`manager::ExternalFileManager`] resolves provider handles and owns the
//!   snapshot controller
//! - [`manager::RawFileManager`] serves local handles
//! - [`file_manager::FileManager`] dispatches over both

// Re-export public modules
pub mod config;
pub mod data_structures;
pub mod document;
pub mod error;
pub mod file;
pub mod file_manager;
pub mod manager;
pub mod provider;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

pub use file_manager::{FileManager, TraverseMode};

/// Version information for FSAF.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
