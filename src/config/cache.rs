//! Cache configuration module.
//!
//! Controls whether document lookups go through the segment trie and how far
//! a snapshot may traverse.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// How the external file manager looks documents up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Resolved documents are cached in the segment trie
    #[default]
    Fast,
    /// Every lookup goes to the provider and snapshots are no-ops
    Slow,
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CacheConfig {
    /// Lookup strategy
    pub search_mode: SearchMode,

    /// Snapshot settings
    pub snapshot: SnapshotConfig,
}

impl Validate for CacheConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.snapshot.validate()
    }
}

/// Snapshot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotConfig {
    /// Whether snapshots descend into sub directories unless told otherwise
    pub include_subdirs: bool,

    /// Maximum number of directories listed by one snapshot
    pub max_directories: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            include_subdirs: false,
            max_directories: 4096,
        }
    }
}

impl Validate for SnapshotConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_directories == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "cache.snapshot.max_directories".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
