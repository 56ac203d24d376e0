//! Tests for the configuration module.
//!
//! This module contains tests for configuration loading, validation, and usage.

use crate::config::{ConfigLoader, FsafConfig, SearchMode, Validate};
use crate::error::config::ConfigError;
use std::fs;
use tempfile::tempdir;

use super::test_utils::TestFixture;

/// Test that default configuration can be created and is valid.
#[test]
fn test_default_config_is_valid() {
    let config = FsafConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.cache.search_mode, SearchMode::Fast);
    assert_eq!(config.provider.authority, "local");
}

/// Test that configuration validation catches invalid values.
#[test]
fn test_config_validation() {
    let mut config = FsafConfig::default();

    config.cache.snapshot.max_directories = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValueOutOfRange { .. })
    ));

    config.cache.snapshot.max_directories = 10;
    config.provider.authority = "a/b".to_string();
    assert!(config.validate().is_err());

    config.provider.authority = "local".to_string();
    config.provider.default_mime_type = "binary".to_string();
    assert!(config.validate().is_err());

    config.provider.default_mime_type = "text/plain".to_string();
    config.log.level = "loud".to_string();
    assert!(config.validate().is_err());

    config.log.level = "debug".to_string();
    assert!(config.validate().is_ok());
}

/// Test loading configuration from a file.
#[test]
fn test_load_config_from_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config_file_test.toml");

    let config_content = r#"
    [cache]
    search_mode = "slow"

    [cache.snapshot]
    include_subdirs = true

    [provider]
    authority = "com.example.docs"
    "#;

    fs::write(&config_path, config_content).unwrap();

    let loader = ConfigLoader::new(Some(&config_path), "TEST_FILE");
    let config = loader.load().unwrap();

    assert_eq!(config.cache.search_mode, SearchMode::Slow);
    assert!(config.cache.snapshot.include_subdirs);
    assert_eq!(config.provider.authority, "com.example.docs");

    // Other values should be defaults
    assert_eq!(config.cache.snapshot.max_directories, 4096);
    assert_eq!(config.log.level, "info");
}

/// Test loading configuration with environment variable overrides.
#[test]
fn test_env_var_override() {
    let mut fixture = TestFixture::new().unwrap();
    let config_path = fixture.join("config_env_test.toml");
    fs::write(&config_path, "[log]\nlevel = \"warn\"\n").unwrap();

    fixture.set_env("TEST_ENV__LOG__LEVEL", "trace");
    fixture.set_env("TEST_ENV__CACHE__SNAPSHOT__MAX_DIRECTORIES", "12");

    let loader = ConfigLoader::new(Some(&config_path), "TEST_ENV");
    let config = loader.load().unwrap();

    assert_eq!(config.log.level, "trace");
    assert_eq!(config.cache.snapshot.max_directories, 12);
}

/// Test that loading an invalid configuration file returns an error.
#[test]
fn test_load_invalid_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("invalid.toml");

    let config_content = r#"
    [cache
    search_mode = fast"
    "#;

    fs::write(&config_path, config_content).unwrap();

    let loader = ConfigLoader::new(Some(&config_path), "TEST_INVALID");
    assert!(matches!(loader.load(), Err(ConfigError::ParseError(_))));
}

/// Test that an unknown search mode is rejected.
#[test]
fn test_unknown_search_mode() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("mode.toml");
    fs::write(&config_path, "[cache]\nsearch_mode = \"turbo\"\n").unwrap();

    let loader = ConfigLoader::new(Some(&config_path), "TEST_MODE");
    assert!(loader.load().is_err());
}

/// Test that a missing file and an unsupported extension are reported.
#[test]
fn test_missing_and_unsupported_files() {
    let dir = tempdir().unwrap();

    let missing = ConfigLoader::new(Some(dir.path().join("nope.toml")), "TEST_MISSING");
    assert!(matches!(missing.load(), Err(ConfigError::FileNotFound(_))));

    let ini = dir.path().join("config.ini");
    fs::write(&ini, "").unwrap();
    let unsupported = ConfigLoader::new(Some(&ini), "TEST_INI");
    assert!(matches!(unsupported.load(), Err(ConfigError::ParseError(_))));
}

/// Test that the generated configuration loads back unchanged.
#[test]
fn test_generated_config_loads() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("generated.toml");
    fs::write(
        &config_path,
        toml::to_string_pretty(&FsafConfig::default()).unwrap(),
    )
    .unwrap();

    let loader = ConfigLoader::new(Some(&config_path), "TEST_GENERATED");
    assert_eq!(loader.load().unwrap(), FsafConfig::default());
}
