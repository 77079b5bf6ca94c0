//! Schema validation helpers for LifeTracker JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a raw config value against the schema.
pub(super) fn validate_config_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(map, &["$schema", "storage", "tools"], layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("storage") {
        validate_storage(value, layer, "storage")?;
    }
    if let Some(value) = map.get("tools") {
        validate_tools(value, layer, "tools")?;
    }
    Ok(())
}

/// Validate the "storage" block.
fn validate_storage(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "region",
            "table_prefix",
            "endpoint_url",
            "credentials",
            "indexes",
            "page_size",
        ],
        layer,
        path,
    )?;

    for key in ["region", "table_prefix", "endpoint_url"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("page_size") {
        expect_u64(value, layer, &join_path(path, "page_size"))?;
    }
    if let Some(value) = map.get("credentials") {
        validate_credentials(value, layer, &join_path(path, "credentials"))?;
    }
    if let Some(value) = map.get("indexes") {
        let indexes_path = join_path(path, "indexes");
        let indexes = expect_object(value, layer, &indexes_path)?;
        for (entity, index) in indexes {
            validate_index(index, layer, &join_path(&indexes_path, entity))?;
        }
    }
    Ok(())
}

/// Validate a static credentials block.
fn validate_credentials(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["access_key_id", "secret_access_key", "session_token"],
        layer,
        path,
    )?;
    for key in ["access_key_id", "secret_access_key"] {
        match map.get(key) {
            Some(value) => expect_string(value, layer, &join_path(path, key))?,
            None => return Err(invalid_field(layer, &join_path(path, key), "missing key")),
        }
    }
    if let Some(value) = map.get("session_token") {
        expect_string(value, layer, &join_path(path, "session_token"))?;
    }
    Ok(())
}

/// Validate a single owner index declaration.
fn validate_index(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["name"], layer, path)?;
    match map.get("name") {
        Some(value) => expect_string(value, layer, &join_path(path, "name")),
        None => Err(invalid_field(layer, &join_path(path, "name"), "missing key")),
    }
}

/// Validate the "tools" block.
fn validate_tools(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = ["default_limit", "max_limit", "recent_activity_limit"];
    ensure_allowed_keys(map, &allowed, layer, path)?;
    for key in allowed {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Reject keys that are not part of the schema.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ConfigError::UnknownKey {
                path: format!("{layer}:{}", join_path(path, key)),
            });
        }
    }
    Ok(())
}

/// `storage` + `indexes` -> `storage.indexes`.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
