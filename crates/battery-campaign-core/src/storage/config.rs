//! TOML-based campaign configuration.
//!
//! Stores:
//! - Which data source to use and where the live registry lives
//! - The stale lock threshold
//! - The engagement cut-off
//!
//! Configuration is stored at `~/.config/battery-campaign/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::campaign::{EngagementCalculator, StaleLockFilter, DEFAULT_THRESHOLD_DAYS};
use crate::error::{ConfigError, ValidationError};
use crate::source::SourceMode;

/// Data source selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub mode: SourceMode,
    /// Path to the SQLite registry. Defaults to `registry.db` in the data directory.
    #[serde(default)]
    pub registry_path: Option<String>,
}

/// Stale lock filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_threshold_days")]
    pub threshold_days: u32,
}

/// Engagement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Open rate (percent) under which a campaign is low engagement.
    #[serde(default)]
    pub min_engaged_rate: f64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/battery-campaign/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
}

fn default_threshold_days() -> u32 {
    DEFAULT_THRESHOLD_DAYS
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::Fixture,
            registry_path: None,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threshold_days: default_threshold_days(),
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            min_engaged_rate: 0.0,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    invalid(format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
                    }
                    // Empty clears optional fields; required ones fail to deserialize.
                    _ if value.trim().is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of `config.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Unset optional values come back as an empty string.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value doesn't fit the field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate().map_err(|e| invalid(e.to_string()))?;
        *self = updated;
        Ok(())
    }

    /// Check values that serde accepts but the campaign can't use.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.calculator().map(|_| ())
    }

    /// Registry path, falling back to `registry.db` in the data directory.
    pub fn registry_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.source.registry_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(data_dir()?.join("registry.db")),
        }
    }

    pub fn filter(&self) -> StaleLockFilter {
        StaleLockFilter::with_threshold_days(self.filter.threshold_days)
    }

    pub fn calculator(&self) -> Result<EngagementCalculator, ValidationError> {
        EngagementCalculator::with_min_engaged_rate(self.engagement.min_engaged_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.source.mode, SourceMode::Fixture);
        assert_eq!(parsed.filter.threshold_days, 30);
        assert_eq!(parsed.engagement.min_engaged_rate, 0.0);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[source]\nmode = \"live\"\n").unwrap();
        assert_eq!(parsed.source.mode, SourceMode::Live);
        assert!(parsed.source.registry_path.is_none());
        assert_eq!(parsed.filter.threshold_days, 30);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("source.mode").as_deref(), Some("fixture"));
        assert_eq!(cfg.get("filter.threshold_days").as_deref(), Some("30"));
        assert_eq!(cfg.get("source.registry_path").as_deref(), Some(""));
        assert!(cfg.get("filter.missing_key").is_none());
        assert!(cfg.get("filter").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("filter.threshold_days", "45").unwrap();
        cfg.set("source.mode", "live").unwrap();
        cfg.set("source.registry_path", "/var/lib/locks.db").unwrap();
        cfg.set("engagement.min_engaged_rate", "12.5").unwrap();

        assert_eq!(cfg.filter.threshold_days, 45);
        assert_eq!(cfg.source.mode, SourceMode::Live);
        assert_eq!(cfg.source.registry_path.as_deref(), Some("/var/lib/locks.db"));
        assert_eq!(cfg.engagement.min_engaged_rate, 12.5);
    }

    #[test]
    fn empty_value_clears_registry_path() {
        let mut cfg = Config::default();
        cfg.set("source.registry_path", "/var/lib/locks.db").unwrap();
        cfg.set("source.registry_path", "").unwrap();

        assert!(cfg.source.registry_path.is_none());
        assert_eq!(cfg.get("source.registry_path").as_deref(), Some(""));
        // Required fields can't be cleared.
        assert!(cfg.set("source.mode", "").is_err());
        assert_eq!(cfg.source.mode, SourceMode::Fixture);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("filter.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(cfg.set("filter", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.set("filter.threshold_days", "soon").is_err());
        assert!(cfg.set("source.mode", "dynamo").is_err());
        assert!(cfg.set("engagement.min_engaged_rate", "150").is_err());
        // Failed sets leave the config untouched.
        assert_eq!(cfg.filter.threshold_days, 30);
        assert_eq!(cfg.source.mode, SourceMode::Fixture);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.filter.threshold_days, 30);
        assert!(path.exists());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.set("filter.threshold_days", "14").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.filter.threshold_days, 14);
        assert_eq!(loaded.filter().threshold(), chrono::Duration::days(14));
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "filter = [").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::LoadFailed { .. })));
    }

    #[test]
    fn explicit_registry_path_wins() {
        let mut cfg = Config::default();
        cfg.source.registry_path = Some("/tmp/locks.db".into());
        assert_eq!(cfg.registry_path().unwrap(), PathBuf::from("/tmp/locks.db"));
    }
}
