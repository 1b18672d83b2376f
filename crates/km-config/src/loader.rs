//! YAML loader with tag support
//!
//! Supported tags:
//! - `!env_var NAME [default]` - Environment variable substitution
//! - `!include path` - Include another YAML file, relative to the including file

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// YAML loader resolving custom tags into plain values
pub struct YamlLoader {
    /// Base directory for resolving relative paths
    base_dir: PathBuf,
    /// Files currently being loaded, for cycle detection
    include_stack: HashSet<PathBuf>,
}

impl YamlLoader {
    /// Create a loader resolving relative paths against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            include_stack: HashSet::new(),
        }
    }

    /// Load and process a YAML file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.resolve_path(path.as_ref());
        debug!("Loading YAML file: {:?}", path);

        if self.include_stack.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        self.include_stack.insert(path.clone());
        let result = self.load_string(&content, &path);
        self.include_stack.remove(&path);

        result
    }

    /// Load and process YAML from a string
    pub fn load_string(&mut self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        self.process_value(value, source_path)
    }

    fn process_value(&mut self, value: Value, source_path: &Path) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => self.process_tagged(*tagged, source_path),
            Value::Mapping(map) => {
                let mut result = serde_yaml::Mapping::new();
                for (k, v) in map {
                    let processed = self.process_value(v, source_path)?;
                    result.insert(k, processed);
                }
                Ok(Value::Mapping(result))
            }
            Value::Sequence(seq) => {
                let result: ConfigResult<Vec<Value>> = seq
                    .into_iter()
                    .map(|v| self.process_value(v, source_path))
                    .collect();
                Ok(Value::Sequence(result?))
            }
            _ => Ok(value),
        }
    }

    fn process_tagged(
        &mut self,
        tagged: serde_yaml::value::TaggedValue,
        source_path: &Path,
    ) -> ConfigResult<Value> {
        let tag = tagged.tag.to_string();
        let value = tagged.value;

        trace!("Processing tag '{}' with value {:?}", tag, value);

        match tag.as_str() {
            "!env_var" => process_env_var(value),
            "!include" => {
                let path = self.value_to_path(&value, source_path)?;
                debug!("Including file: {:?}", path);
                self.load_file(&path)
            }
            _ => {
                let processed = self.process_value(value, source_path)?;
                Ok(Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
                    tag: tagged.tag,
                    value: processed,
                })))
            }
        }
    }

    fn value_to_path(&self, value: &Value, source_path: &Path) -> ConfigResult<PathBuf> {
        let Value::String(path) = value else {
            return Err(ConfigError::InvalidValue {
                key: "!include".to_string(),
                reason: "path must be a string".to_string(),
            });
        };

        let base_dir = source_path.parent().unwrap_or(&self.base_dir);
        Ok(if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            base_dir.join(path)
        })
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// `NAME` or `NAME default text`; the default may contain spaces
fn process_env_var(value: Value) -> ConfigResult<Value> {
    let Value::String(spec) = value else {
        return Err(ConfigError::InvalidValue {
            key: "!env_var".to_string(),
            reason: "environment variable name must be a string".to_string(),
        });
    };

    let spec = spec.trim();
    let (name, default) = match spec.split_once(char::is_whitespace) {
        Some((name, default)) => (name, Some(default.trim())),
        None => (spec, None),
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => {
            debug!("Substituted env var: {}", name);
            Ok(Value::String(value))
        }
        (Err(_), Some(default)) => {
            debug!("Env var {} not set, using default", name);
            Ok(Value::String(default.to_string()))
        }
        (Err(_), None) => Err(ConfigError::EnvVarNotFound {
            var: name.to_string(),
        }),
    }
}

/// Load a YAML file with tag processing
pub fn load_yaml(base_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    YamlLoader::new(base_dir).load_file(file)
}

/// Load a YAML string with tag processing
pub fn load_yaml_string(
    base_dir: impl Into<PathBuf>,
    content: &str,
    source_name: &str,
) -> ConfigResult<Value> {
    let base_dir = base_dir.into();
    let source = base_dir.join(source_name);
    YamlLoader::new(base_dir).load_string(content, &source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        value.as_mapping()?.get(Value::String(key.to_string()))
    }

    #[test]
    fn test_env_var() {
        std::env::set_var("TEST_KM_CONFIG_VAR", "env_value");
        let value =
            load_yaml_string("/tmp", "from_env: !env_var TEST_KM_CONFIG_VAR\n", "km.yaml").unwrap();
        assert_eq!(get(&value, "from_env"), Some(&Value::String("env_value".into())));
        std::env::remove_var("TEST_KM_CONFIG_VAR");
    }

    #[test]
    fn test_env_var_default() {
        let value = load_yaml_string(
            "/tmp",
            "group: !env_var TEST_KM_CONFIG_UNSET Round Trip Scratch\n",
            "km.yaml",
        )
        .unwrap();
        assert_eq!(
            get(&value, "group"),
            Some(&Value::String("Round Trip Scratch".into()))
        );
    }

    #[test]
    fn test_env_var_missing() {
        let result = load_yaml_string("/tmp", "x: !env_var TEST_KM_CONFIG_ABSENT\n", "km.yaml");
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound { .. })));
    }

    #[test]
    fn test_include() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "engine.yaml", "osascript: /usr/bin/osascript\n");
        write_file(dir.path(), "km.yaml", "engine: !include engine.yaml\n");

        let value = load_yaml(dir.path(), "km.yaml").unwrap();
        let engine = get(&value, "engine").unwrap();
        assert_eq!(
            get(engine, "osascript"),
            Some(&Value::String("/usr/bin/osascript".into()))
        );
    }

    #[test]
    fn test_circular_include() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.yaml", "b: !include b.yaml\n");
        write_file(dir.path(), "b.yaml", "a: !include a.yaml\n");

        let result = load_yaml(dir.path(), "a.yaml");
        assert!(matches!(result, Err(ConfigError::CircularInclude { .. })));
    }
}
