//! Start-up configuration failures.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded.
///
/// Every variant is fatal at start-up; none is raised per tool call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON5.
    #[error("cannot parse {origin} as JSON5")]
    Syntax {
        /// File label or `config` for in-memory contents.
        origin: String,
        #[source]
        source: json5::Error,
    },
    /// The document passed the schema but does not fit the model.
    #[error("cannot decode config: {0}")]
    Decode(#[from] serde_json::Error),
    /// A key outside the schema, e.g. a misspelt section.
    #[error("unknown key at {path}")]
    UnknownKey { path: String },
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}
