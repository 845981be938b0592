//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `XPROFILE_SECRET_KEY` | `secret_key` |
//! | `XPROFILE_DEBUG` | `debug` |
//! | `XPROFILE_LOG_LEVEL` | `log_level` |
//! | `XPROFILE_DATABASE_PATH` | `database.path` |
//! | `XPROFILE_TABLE_PREFIX` | `database.table_prefix` |
//! | `XPROFILE_ADMIN_PREFIX` | `admin.url_prefix` |
//! | `XPROFILE_LINE_MODE` | `options.line_mode` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use xprofile_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("xprofile.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::XProfileError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys missing from the TOML keep their default values, including keys
/// nested inside tables such as `[admin]`.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, XProfileError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| XProfileError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    let json_value = toml_to_json(toml_value);
    merge_into_defaults(json_value, "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, XProfileError> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, XProfileError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, XProfileError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| XProfileError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_into_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, XProfileError> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from a file, picking the format from its extension
/// (`.json` is JSON, anything else is TOML), then applies environment
/// overrides.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, XProfileError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let mut settings = if is_json {
        from_json_file(path)?
    } else {
        from_toml_file(path)?
    };
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Loads settings from environment variables only (starting from defaults).
pub fn from_env() -> Result<Settings, XProfileError> {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Applies `XPROFILE_*` environment variable overrides.
///
/// Fails only when `XPROFILE_LINE_MODE` holds an unknown mode.
pub fn apply_env_overrides(settings: &mut Settings) -> Result<(), XProfileError> {
    if let Ok(val) = std::env::var("XPROFILE_SECRET_KEY") {
        settings.secret_key = val;
    }

    if let Ok(val) = std::env::var("XPROFILE_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("XPROFILE_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("XPROFILE_DATABASE_PATH") {
        settings.database.path = val;
    }

    if let Ok(val) = std::env::var("XPROFILE_TABLE_PREFIX") {
        settings.database.table_prefix = val;
    }

    if let Ok(val) = std::env::var("XPROFILE_ADMIN_PREFIX") {
        settings.admin.url_prefix = val;
    }

    if let Ok(val) = std::env::var("XPROFILE_LINE_MODE") {
        settings.options.line_mode = val.parse()?;
    }

    Ok(())
}

fn read_config(path: &Path, format: &str) -> Result<String, XProfileError> {
    std::fs::read_to_string(path).map_err(|e| {
        XProfileError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_into_defaults(
    overrides: serde_json::Value,
    format: &str,
) -> Result<Settings, XProfileError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        XProfileError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, overrides);
    serde_json::from_value(merged).map_err(|e| {
        XProfileError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a TOML value into the equivalent JSON value.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges `overlay` into `base`. Objects merge key by key; any other
/// value in `overlay` replaces the one in `base`.
fn merge_json(base: serde_json::Value, overlay: serde_json::Value) -> serde_json::Value {
    match (base, overlay) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => merge_json(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}
