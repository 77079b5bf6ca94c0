//! Environment overlay applied on top of file config.

use crate::{CredentialsConfig, LifeTrackerConfig};
use log::debug;

/// Environment variable names read at start-up.
pub mod env_vars {
    pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
    pub const AWS_REGION: &str = "AWS_REGION";
    pub const TABLE_PREFIX: &str = "TABLE_PREFIX";
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
    pub const DYNAMODB_ENDPOINT_URL: &str = "DYNAMODB_ENDPOINT_URL";
}

/// Read a variable from the process environment.
pub(super) fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Apply every recognised variable to the config.
pub(super) fn apply<F>(config: &mut LifeTrackerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(region) = read(env_vars::AWS_DEFAULT_REGION).or_else(|| read(env_vars::AWS_REGION))
    {
        debug!("region overridden from environment (region={region})");
        config.storage.region = region;
    }

    if let Some(prefix) = read(env_vars::TABLE_PREFIX) {
        debug!("table prefix overridden from environment (prefix={prefix})");
        config.storage.table_prefix = Some(prefix);
    }

    if let Some(endpoint) = read(env_vars::DYNAMODB_ENDPOINT_URL) {
        debug!("endpoint overridden from environment (endpoint={endpoint})");
        config.storage.endpoint_url = Some(endpoint);
    }

    if let Some(access_key_id) = read(env_vars::AWS_ACCESS_KEY_ID) {
        debug!("static credentials taken from environment");
        config.storage.credentials = Some(CredentialsConfig {
            access_key_id,
            secret_access_key: read(env_vars::AWS_SECRET_ACCESS_KEY).unwrap_or_default(),
            session_token: read(env_vars::AWS_SESSION_TOKEN),
        });
    }
}
