//! IO helpers for reading config files from disk.

use super::{DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read and parse a JSON5 config file.
pub(super) fn read_layer(path: &Path) -> Result<Value, ConfigError> {
    debug!("reading config file (path={})", path.display());
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    json5::from_str(&contents).map_err(|source| ConfigError::Syntax {
        origin: layer_label(path),
        source,
    })
}

/// Build a user-friendly label for schema validation errors.
pub(super) fn layer_label(path: &Path) -> String {
    format!("file({})", path.display())
}

/// Default user config path under the home directory.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}
