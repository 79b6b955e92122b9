//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$RACEKEEPER_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/racekeeper/config.toml`
//! 3. `~/.racekeeper/config.toml` (canonical write location)
//!
//! # Data Config
//!
//! Located at `<data_dir>/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the validation mode must be a known name).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::ranking::ValidationMode;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// data_dir = "/srv/school-sports"
///
/// [lifecycle]
/// minimum_capacity = 2
/// results_validation = "strict"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Where races and students are stored
    pub data_dir: Option<PathBuf>,

    /// Lifecycle defaults
    pub lifecycle: Option<LifecycleSettings>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "data_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Some(lifecycle) = &self.lifecycle {
            lifecycle.validate()?;
        }

        Ok(())
    }
}

/// Data-directory configuration.
///
/// Settings here travel with the data and override the global config.
///
/// # Example
///
/// ```toml
/// [lifecycle]
/// require_locked_for_results = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Lifecycle overrides
    pub lifecycle: Option<LifecycleSettings>,
}

impl DataConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(lifecycle) = &self.lifecycle {
            lifecycle.validate()?;
        }
        Ok(())
    }
}

/// `[lifecycle]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LifecycleSettings {
    /// Lanes required before a race can be locked
    pub minimum_capacity: Option<usize>,

    /// "strict" or "incremental"
    pub results_validation: Option<String>,

    /// Only record results for locked races
    pub require_locked_for_results: Option<bool>,
}

impl LifecycleSettings {
    /// Validate the lifecycle settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minimum_capacity == Some(0) {
            return Err(ConfigError::InvalidValue(
                "minimum_capacity must be at least 1".to_string(),
            ));
        }

        if let Some(mode) = &self.results_validation {
            mode.parse::<ValidationMode>().map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "invalid results_validation '{}', must be one of: {}",
                    mode,
                    ValidationMode::NAMES.join(", ")
                ))
            })?;
        }

        Ok(())
    }

    /// Parsed validation mode, if configured and valid.
    pub fn validation_mode(&self) -> Option<ValidationMode> {
        self.results_validation
            .as_deref()
            .and_then(|m| m.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.data_dir.is_none());
            assert!(config.lifecycle.is_none());
        }

        #[test]
        fn empty_data_dir_rejected() {
            let config = GlobalConfig {
                data_dir: Some(PathBuf::new()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = GlobalConfig {
                data_dir: Some(PathBuf::from("/srv/races")),
                lifecycle: Some(LifecycleSettings {
                    minimum_capacity: Some(4),
                    results_validation: Some("strict".to_string()),
                    require_locked_for_results: Some(true),
                }),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }
    }

    mod lifecycle_settings {
        use super::*;

        #[test]
        fn zero_capacity_rejected() {
            let settings = LifecycleSettings {
                minimum_capacity: Some(0),
                ..Default::default()
            };
            assert!(settings.validate().is_err());
        }

        #[test]
        fn unknown_mode_rejected() {
            let settings = LifecycleSettings {
                results_validation: Some("lenient".to_string()),
                ..Default::default()
            };
            let err = settings.validate().unwrap_err();
            assert!(err.to_string().contains("strict, incremental"));
        }

        #[test]
        fn mode_parsed() {
            let settings = LifecycleSettings {
                results_validation: Some("Strict".to_string()),
                ..Default::default()
            };
            assert_eq!(settings.validation_mode(), Some(ValidationMode::Strict));
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                minimum_capacity = 2
                unknown_field = true
            "#;

            let result: Result<LifecycleSettings, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }
}
