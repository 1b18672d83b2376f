//! Configuration for the engine client and round-trip harness
//!
//! Configuration is YAML with two sections:
//!
//! ```yaml
//! engine:
//!   osascript: /usr/bin/osascript
//!   log_path: !env_var KM_LOG /tmp/engine.log
//! harness:
//!   scratch_group: Round Trip Scratch
//!   poll_attempts: 20
//!   poll_delay_ms: 250
//! ```
//!
//! Supported tags:
//!
//! - `!env_var NAME [default]` - Environment variable substitution
//! - `!include path` - Include another YAML file

mod error;
mod loader;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, load_yaml_string, YamlLoader};
pub use settings::{
    default_log_path, EngineSettings, HarnessSettings, KmConfig, ARTIFACTS_DIR_VAR,
    CONFIG_PATH_VAR, ENGINE_LOG_VAR, SCRATCH_GROUP_VAR,
};

pub use serde_yaml::Value;
