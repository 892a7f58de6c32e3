//! Settings loading from configuration files.
//!
//! This module provides functions to load [`FormatSettings`] from TOML and
//! JSON, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON source (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `TEXTFMT_DEBUG` | `debug` |
//! | `TEXTFMT_LOG_LEVEL` | `log_level` |
//! | `TEXTFMT_MULTI_FORMATTER_MODE` | `multi_formatter_mode` |
//! | `TEXTFMT_FORMATTERS` | `formatters` (comma-separated) |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use textfmt_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/textfmt.toml").unwrap();
//! let settings = settings_loader::from_json_file_with_env("config/textfmt.json").unwrap();
//! ```

use std::path::Path;

use crate::error::FormatError;
use crate::settings::FormatSettings;

/// Loads settings from a TOML string.
///
/// Keys absent from the TOML keep their default values.
///
/// # Errors
///
/// Returns a `ConfigurationError` if the TOML is malformed or cannot be
/// deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<FormatSettings, FormatError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormatError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an `IoError` if the file cannot be read and a `ConfigurationError`
/// if the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<FormatSettings, FormatError> {
    let content = std::fs::read_to_string(path)?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<FormatSettings, FormatError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns a `ConfigurationError` if the JSON is malformed or cannot be
/// deserialized.
pub fn from_json_str(json_str: &str) -> Result<FormatSettings, FormatError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormatError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an `IoError` if the file cannot be read and a `ConfigurationError`
/// if the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<FormatSettings, FormatError> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<FormatSettings, FormatError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> FormatSettings {
    let mut settings = FormatSettings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`
/// (case-insensitive); any other value leaves the setting untouched.
pub fn apply_env_overrides(settings: &mut FormatSettings) {
    if let Some(debug) = env_flag("TEXTFMT_DEBUG") {
        settings.debug = debug;
    }

    if let Ok(val) = std::env::var("TEXTFMT_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(multi) = env_flag("TEXTFMT_MULTI_FORMATTER_MODE") {
        settings.multi_formatter_mode = multi;
    }

    if let Ok(val) = std::env::var("TEXTFMT_FORMATTERS") {
        settings.formatters = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

// ============================================================
// Helpers
// ============================================================

fn env_flag(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    parse_flag(&val)
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn merge_over_defaults(
    value: serde_json::Value,
    source: &str,
) -> Result<FormatSettings, FormatError> {
    let default_json = serde_json::to_value(FormatSettings::default()).map_err(|e| {
        FormatError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FormatError::ConfigurationError(format!(
            "Failed to deserialize settings from {source}: {e}"
        ))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
