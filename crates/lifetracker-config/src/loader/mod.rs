//! Start-up config loader.
//!
//! Layers defaults, an optional JSON5 file and the process environment into a
//! single validated `LifeTrackerConfig`. Loading happens once; the result is
//! passed by value to the rest of the process.

mod env;
mod layer_io;
mod schema;


use crate::{ConfigError, LifeTrackerConfig};
use log::{debug, info};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub use env::env_vars;

/// Default config filename.
const DEFAULT_CONFIG_FILE: &str = "lifetracker.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".lifetracker";

/// Options controlling where config is read from.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Explicit config file; it must exist when set.
    pub path: Option<PathBuf>,
    /// Fall back to `~/.lifetracker/lifetracker.json5` when no path is set.
    pub use_default_path: bool,
    /// Skip the environment overlay.
    pub ignore_env: bool,
}

impl ConfigLoadOptions {
    /// Options that read the given file and then the environment.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }
}

impl LifeTrackerConfig {
    /// Load a single config from a path (no environment overlay).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config (path={})", path.display());
        let value = layer_io::read_layer(path)?;
        config_from_value(value, &layer_io::layer_label(path))
    }

    /// Load a single config from JSON5 contents (no environment overlay).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents).map_err(|source| ConfigError::Syntax {
            origin: "config".to_string(),
            source,
        })?;
        config_from_value(value, "config")
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = LifeTrackerConfig::default();
        config.apply_env_overrides(env::process_env);
        config.validate()?;
        Ok(config)
    }

    /// Load config using the given options: defaults, then file, then environment.
    pub fn load(options: ConfigLoadOptions) -> Result<Self, ConfigError> {
        let path = match options.path {
            Some(path) => Some(path),
            None if options.use_default_path => {
                layer_io::default_user_config_path().filter(|path| path.exists())
            }
            None => None,
        };

        let mut config = match path {
            Some(path) => {
                let value = layer_io::read_layer(&path)?;
                decode_config(value, &layer_io::layer_label(&path))?
            }
            None => {
                debug!("no config file; starting from defaults");
                LifeTrackerConfig::default()
            }
        };

        if !options.ignore_env {
            config.apply_env_overrides(env::process_env);
        }
        config.validate()?;
        info!(
            "config loaded (region={}, table_prefix={:?}, indexes={})",
            config.storage.region,
            config.storage.table_prefix(),
            config.storage.indexes.len()
        );
        Ok(config)
    }

    /// Overlay environment values read through `lookup`.
    ///
    /// Empty variables are ignored. `AWS_DEFAULT_REGION` wins over `AWS_REGION`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        env::apply(self, lookup);
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let region = self.storage.region.trim();
        let pattern = Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$")
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if !pattern.is_match(region) {
            return Err(ConfigError::InvalidField {
                path: "storage.region".to_string(),
                message: format!("`{region}` is not a valid region name"),
            });
        }

        if let Some(credentials) = &self.storage.credentials {
            if credentials.access_key_id.trim().is_empty() {
                return Err(ConfigError::InvalidField {
                    path: "storage.credentials.access_key_id".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
            if credentials.secret_access_key.trim().is_empty() {
                return Err(ConfigError::InvalidField {
                    path: "storage.credentials.secret_access_key".to_string(),
                    message: "must not be empty when an access key is set".to_string(),
                });
            }
        }

        for (entity, index) in &self.storage.indexes {
            if index.name.trim().is_empty() {
                return Err(ConfigError::InvalidField {
                    path: format!("storage.indexes.{entity}.name"),
                    message: "must not be empty".to_string(),
                });
            }
        }

        if self.storage.page_size == 0 {
            return Err(ConfigError::InvalidField {
                path: "storage.page_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let tools = &self.tools;
        if tools.max_limit == 0 || tools.default_limit == 0 || tools.recent_activity_limit == 0 {
            return Err(ConfigError::Invalid(
                "tool limits must be at least 1".to_string(),
            ));
        }
        if tools.default_limit > tools.max_limit {
            return Err(ConfigError::InvalidField {
                path: "tools.default_limit".to_string(),
                message: format!("must not exceed tools.max_limit ({})", tools.max_limit),
            });
        }
        if tools.recent_activity_limit > tools.max_limit {
            return Err(ConfigError::InvalidField {
                path: "tools.recent_activity_limit".to_string(),
                message: format!("must not exceed tools.max_limit ({})", tools.max_limit),
            });
        }
        Ok(())
    }
}

/// Validate and decode a config value, then check cross-field constraints.
fn config_from_value(value: Value, label: &str) -> Result<LifeTrackerConfig, ConfigError> {
    let config = decode_config(value, label)?;
    config.validate()?;
    Ok(config)
}

/// Validate a raw value against the schema and decode it.
fn decode_config(value: Value, label: &str) -> Result<LifeTrackerConfig, ConfigError> {
    schema::validate_config_schema(&value, label)?;
    Ok(serde_json::from_value(value)?)
}
