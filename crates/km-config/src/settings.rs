//! Typed configuration
//!
//! Every field has a default, so an empty file (or no file) yields a usable
//! configuration. Environment overrides are applied after the file.

use std::env;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::load_yaml;

/// Path of the configuration file
pub const CONFIG_PATH_VAR: &str = "KM_CONFIG";
/// Overrides [`HarnessSettings::scratch_group`]
pub const SCRATCH_GROUP_VAR: &str = "KM_SCRATCH_GROUP";
/// Overrides [`HarnessSettings::artifacts_dir`]
pub const ARTIFACTS_DIR_VAR: &str = "KM_ARTIFACTS_DIR";
/// Overrides [`EngineSettings::log_path`]
pub const ENGINE_LOG_VAR: &str = "KM_ENGINE_LOG";

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KmConfig {
    pub engine: EngineSettings,
    pub harness: HarnessSettings,
}

/// How the engine is reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// AppleScript runner
    pub osascript: PathBuf,
    /// Application that imports macro files
    pub editor_app: String,
    /// Application scripted for macro queries and execution
    pub engine_app: String,
    /// Engine log scanned for asynchronously reported errors
    pub log_path: PathBuf,
    /// Lines of the engine log matching this pattern count as errors
    pub error_pattern: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            osascript: PathBuf::from("/usr/bin/osascript"),
            editor_app: "Keyboard Maestro".to_string(),
            engine_app: "Keyboard Maestro Engine".to_string(),
            log_path: default_log_path(),
            error_pattern: r"(?i)\b(error|failed|aborted|cancel(?:l)?ed)\b".to_string(),
        }
    }
}

/// Round-trip harness behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    /// Macro group created for the run and deleted afterwards
    pub scratch_group: String,
    /// Import files of failing cases are kept here
    pub artifacts_dir: PathBuf,
    /// Temporary import files are written here
    pub import_dir: PathBuf,
    /// Times to look for an imported macro before giving up
    pub poll_attempts: u32,
    /// Delay between lookups
    pub poll_delay_ms: u64,
    /// Also keep import files of passing cases
    pub keep_passing_artifacts: bool,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            scratch_group: "Round Trip Scratch".to_string(),
            artifacts_dir: PathBuf::from("target/roundtrip-artifacts"),
            import_dir: env::temp_dir(),
            poll_attempts: 20,
            poll_delay_ms: 250,
            keep_passing_artifacts: false,
        }
    }
}

/// `~/Library/Logs/Keyboard Maestro/Engine.log`
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("Library")
        .join("Logs")
        .join("Keyboard Maestro")
        .join("Engine.log")
}

impl KmConfig {
    /// Load from a YAML file, then validate
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let value = load_yaml(base_dir, path)?;
        let config: KmConfig = if value.is_null() {
            KmConfig::default()
        } else {
            serde_yaml::from_value(value).map_err(|e| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source: e,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `KM_CONFIG` (defaults otherwise), then apply
    /// the environment overrides
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                debug!("Loading configuration from {}", path);
                Self::load(path)?
            }
            Err(_) => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `KM_SCRATCH_GROUP`, `KM_ARTIFACTS_DIR` and `KM_ENGINE_LOG`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(group) = env::var(SCRATCH_GROUP_VAR) {
            debug!("Scratch group overridden by {}", SCRATCH_GROUP_VAR);
            self.harness.scratch_group = group;
        }
        if let Ok(dir) = env::var(ARTIFACTS_DIR_VAR) {
            debug!("Artifacts directory overridden by {}", ARTIFACTS_DIR_VAR);
            self.harness.artifacts_dir = PathBuf::from(dir);
        }
        if let Ok(log) = env::var(ENGINE_LOG_VAR) {
            debug!("Engine log overridden by {}", ENGINE_LOG_VAR);
            self.engine.log_path = PathBuf::from(log);
        }
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> ConfigResult<()> {
        Regex::new(&self.engine.error_pattern).map_err(|e| ConfigError::InvalidValue {
            key: "engine.error_pattern".to_string(),
            reason: e.to_string(),
        })?;
        if self.harness.poll_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "harness.poll_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.harness.scratch_group.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "harness.scratch_group".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = KmConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.engine.log_path.ends_with("Keyboard Maestro/Engine.log"));
        assert_eq!(config.harness.poll_attempts, 20);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: KmConfig =
            serde_yaml::from_str("harness:\n  poll_attempts: 3\n").unwrap();
        assert_eq!(config.harness.poll_attempts, 3);
        assert_eq!(config.harness.poll_delay_ms, 250);
        assert_eq!(config.engine.editor_app, "Keyboard Maestro");
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = KmConfig::default();
        config.harness.poll_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "harness.poll_attempts"
        ));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let mut config = KmConfig::default();
        config.engine.error_pattern = "(unclosed".to_string();
        assert!(config.validate().is_err());
    }
}
