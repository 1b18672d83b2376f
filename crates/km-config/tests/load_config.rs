//! Loading configuration files from disk

use std::fs;

use km_config::{ConfigError, KmConfig};
use tempfile::TempDir;

#[test]
fn test_load_file_with_env_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("km.yaml");
    fs::write(
        &path,
        "engine:\n  log_path: !env_var KM_CONFIG_TEST_UNSET_LOG /tmp/engine.log\n\
         harness:\n  scratch_group: CI Scratch\n  keep_passing_artifacts: true\n",
    )
    .unwrap();

    let config = KmConfig::load(&path).unwrap();
    assert_eq!(config.engine.log_path.to_str(), Some("/tmp/engine.log"));
    assert_eq!(config.harness.scratch_group, "CI Scratch");
    assert!(config.harness.keep_passing_artifacts);
    assert_eq!(config.harness.poll_attempts, 20);
}

#[test]
fn test_empty_file_is_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("km.yaml");
    fs::write(&path, "").unwrap();

    let config = KmConfig::load(&path).unwrap();
    assert_eq!(config, KmConfig::default());
}

#[test]
fn test_invalid_value_reported_with_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("km.yaml");
    fs::write(&path, "harness:\n  poll_attempts: 0\n").unwrap();

    let err = KmConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert!(err.to_string().contains("harness.poll_attempts"));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = KmConfig::load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}
