//! Handler functions for `arbwatch config` subcommands.
//!
//! Keys are dotted paths into the TOML document, e.g. `http.timeout_secs`
//! or `tools.extractor`.

use std::path::PathBuf;

use crate::cli::ConfigAction;
use crate::config::ArbwatchConfig;
use crate::error::{Error, Result};

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => cmd_config_get(config_path, &key),
        ConfigAction::Set { key, value } => cmd_config_set(config_path, &key, &value),
        ConfigAction::Init { file, force } => cmd_config_init(file.as_deref(), force),
        ConfigAction::Show => cmd_config_show(config_path),
    }
}

// ============================================================================
// Command handlers
// ============================================================================

/// Show the resolved config file path.
pub fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = ArbwatchConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!(
            "(file does not exist; run `{} config init` to create it)",
            ArbwatchConfig::project_name()
        );
    }
    Ok(())
}

/// Print a configuration value by dotted key.
pub fn cmd_config_get(config_path: Option<&str>, key: &str) -> Result<()> {
    let config = ArbwatchConfig::load(config_path)?;
    println!("{}", config_value(&config, key)?);
    Ok(())
}

/// Set a configuration value by dotted key in the config file.
pub fn cmd_config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<()> {
    let path = ArbwatchConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    set_in_file(&path, key, value)?;
    println!("Set {key} = {value} in {}", path.display());
    Ok(())
}

/// Create a default configuration file.
pub fn cmd_config_init(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => ArbwatchConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };
    write_default(&path, force)?;
    println!("Config file created at {}", path.display());
    Ok(())
}

/// Print the effective configuration, env overrides included.
pub fn cmd_config_show(config_path: Option<&str>) -> Result<()> {
    let config = ArbwatchConfig::load(config_path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

// ============================================================================
// File operations
// ============================================================================

/// Look up a dotted key in a loaded config.
pub fn config_value(config: &ArbwatchConfig, key: &str) -> Result<String> {
    let value = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Set `key` in an existing config file, rejecting values that would make
/// the file unloadable.
pub fn set_in_file(path: &std::path::Path, key: &str, value: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{} config init` first.",
            path.display(),
            ArbwatchConfig::project_name()
        )));
    }
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    set_nested_value(&mut doc, key, parse_value(value))?;
    doc.clone()
        .try_into::<ArbwatchConfig>()
        .map_err(|e| Error::config(format!("Invalid value for '{key}': {e}")))?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    std::fs::write(path, toml_str).map_err(|e| Error::io_with_path(e, path))
}

/// Write the default config to `path`.
pub fn write_default(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let toml_str = ArbwatchConfig::default().to_toml_string()?;
    std::fs::write(path, toml_str).map_err(|e| Error::io_with_path(e, path))
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = match parts.pop() {
        Some(last) if !last.is_empty() => last,
        _ => return Err(Error::config("Empty key path")),
    };

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a string value into a TOML value, auto-detecting the type.
///
/// Priority: bool, integer, float, string.
pub fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => return toml::Value::Boolean(true),
        "false" => return toml::Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

/// Format a TOML value for display on stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        write_default(&path, false).unwrap();
        path
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_value_nested_key() {
        let config = ArbwatchConfig::default();
        assert_eq!(config_value(&config, "http.timeout_secs").unwrap(), "30");
        assert_eq!(config_value(&config, "tools.extractor").unwrap(), "otaripper");
    }

    #[test]
    fn test_config_value_missing_key() {
        let err = config_value(&ArbwatchConfig::default(), "nonexistent.key").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    // ------------------------------------------------------------------------
    // init / set
    // ------------------------------------------------------------------------

    #[test]
    fn test_write_default_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = init_file(&dir);
        assert!(write_default(&path, false).is_err());
        assert!(write_default(&path, true).is_ok());
    }

    #[test]
    fn test_write_default_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/config.toml");
        write_default(&path, false).unwrap();
        let loaded = ArbwatchConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.tools, ArbwatchConfig::default().tools);
    }

    #[test]
    fn test_set_in_file_updates_value() {
        let dir = TempDir::new().unwrap();
        let path = init_file(&dir);
        set_in_file(&path, "http.timeout_secs", "45").unwrap();
        set_in_file(&path, "paths.history_dir", "/srv/history").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let config: ArbwatchConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.http.timeout_secs, 45);
        assert_eq!(config.paths.history_dir, Some(PathBuf::from("/srv/history")));
    }

    #[test]
    fn test_set_in_file_rejects_wrong_type() {
        let dir = TempDir::new().unwrap();
        let path = init_file(&dir);
        let before = std::fs::read_to_string(&path).unwrap();
        let err = set_in_file(&path, "http.timeout_secs", "soon").unwrap_err();
        assert!(err.to_string().contains("Invalid value"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_set_in_file_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let err = set_in_file(&dir.path().join("missing.toml"), "http.timeout_secs", "1")
            .unwrap_err();
        assert!(err.to_string().contains("config init"));
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    #[test]
    fn test_set_nested_value_creates_tables() {
        let mut root = toml::Value::Table(toml::map::Map::new());
        set_nested_value(&mut root, "a.b.c", toml::Value::Integer(1)).unwrap();
        assert_eq!(
            get_nested_value(&root, "a.b.c"),
            Some(&toml::Value::Integer(1))
        );
    }

    #[test]
    fn test_set_nested_value_through_scalar_fails() {
        let mut root: toml::Value = toml::from_str("a = 1").unwrap();
        assert!(set_nested_value(&mut root, "a.b", toml::Value::Integer(2)).is_err());
        assert!(set_nested_value(&mut root, "", toml::Value::Integer(2)).is_err());
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("42"), toml::Value::Integer(42));
        assert_eq!(parse_value("1.5"), toml::Value::Float(1.5));
        assert_eq!(
            parse_value("otaripper"),
            toml::Value::String("otaripper".to_string())
        );
    }

    #[test]
    fn test_format_toml_array() {
        let value: toml::Value = toml::from_str("x = [\"a\", \"b\"]").unwrap();
        let formatted = format_toml_value(get_nested_value(&value, "x").unwrap());
        assert!(formatted.contains('a'));
    }
}
