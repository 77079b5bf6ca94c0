//! Configuration models and start-up config loading.
//!
//! This crate owns the LifeTracker config schema, its validation, and the
//! defaults -> file -> environment layering. Config is loaded once at process
//! start and handed to the store and tool layers as an explicit value.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Loader options and environment variable names.
pub use loader::{ConfigLoadOptions, env_vars};
/// Configuration schema models.
pub use model::*;
