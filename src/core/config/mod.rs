//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! racekeeper has two configuration scopes:
//! - **Global**: User-level settings
//! - **Data**: Settings stored alongside the race data
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Data config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$RACEKEEPER_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/racekeeper/config.toml`
//! 3. `~/.racekeeper/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use racekeeper::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/srv/races"))).unwrap();
//!
//! println!("Minimum capacity: {}", config.minimum_capacity());
//! println!("Validation: {}", config.validation_mode());
//! ```

pub mod schema;

pub use schema::{DataConfig, GlobalConfig, LifecycleSettings};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::lifecycle::{LifecycleConfig, MINIMUM_CAPACITY};
use crate::core::paths::DataPaths;
use crate::core::ranking::ValidationMode;

/// Environment variable naming the global config file.
pub const CONFIG_ENV: &str = "RACEKEEPER_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: data config overrides global
/// config, which overrides built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Data-directory configuration (if a data dir was given)
    pub data: Option<DataConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the data config file (if loaded)
    data_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `data_dir` is provided, also loads `<data_dir>/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(data_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = Self::load_global()?;
        global.validate()?;

        let mut config = Config {
            global,
            data: None,
            global_path,
            data_path: None,
        };

        if let Some(dir) = data_dir {
            config.load_data(&DataPaths::new(dir.to_path_buf()))?;
        }

        Ok(config)
    }

    /// Load the data-directory config into an already loaded config.
    ///
    /// Used when the data directory itself comes from the global config.
    pub fn load_data(&mut self, paths: &DataPaths) -> Result<(), ConfigError> {
        let path = paths.config_path();
        if !path.exists() {
            return Ok(());
        }
        let data: DataConfig = Self::read_config(&path)?;
        data.validate()?;
        debug!(path = %path.display(), "loaded data config");
        self.data = Some(data);
        self.data_path = Some(path);
        Ok(())
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $RACEKEEPER_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/racekeeper/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("racekeeper/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.racekeeper/config.toml
        if let Ok(path) = Self::global_config_path() {
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    /// Read and parse a config file.
    fn read_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.racekeeper/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".racekeeper/config.toml"))
    }

    /// Write data-directory config atomically.
    pub fn write_data(paths: &DataPaths, config: &DataConfig) -> Result<PathBuf, ConfigError> {
        let path = paths.config_path();
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file atomically.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        // Write to temp file in same directory (for atomic rename)
        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn lifecycle_value<T>(&self, get: impl Fn(&LifecycleSettings) -> Option<T>) -> Option<T> {
        self.data
            .as_ref()
            .and_then(|d| d.lifecycle.as_ref())
            .and_then(&get)
            .or_else(|| self.global.lifecycle.as_ref().and_then(&get))
    }

    /// Configured data directory, if any.
    pub fn data_dir(&self) -> Option<&Path> {
        self.global.data_dir.as_deref()
    }

    /// Lanes required to lock a race.
    ///
    /// Defaults to 2 if not configured.
    pub fn minimum_capacity(&self) -> usize {
        self.lifecycle_value(|l| l.minimum_capacity)
            .unwrap_or(MINIMUM_CAPACITY)
    }

    /// How result batches are validated.
    ///
    /// Defaults to `incremental` if not configured.
    pub fn validation_mode(&self) -> ValidationMode {
        self.lifecycle_value(|l| l.validation_mode())
            .unwrap_or_default()
    }

    /// Whether results require a locked race.
    ///
    /// Defaults to `false` if not configured.
    pub fn require_locked_for_results(&self) -> bool {
        self.lifecycle_value(|l| l.require_locked_for_results)
            .unwrap_or(false)
    }

    /// The lifecycle settings with precedence applied.
    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            minimum_capacity: self.minimum_capacity(),
            validation_mode: self.validation_mode(),
            require_locked_for_results: self.require_locked_for_results(),
        }
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded data config file.
    pub fn data_config_loaded_from(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_files() {
        let config = Config::default();
        assert_eq!(config.minimum_capacity(), 2);
        assert_eq!(config.validation_mode(), ValidationMode::Incremental);
        assert!(!config.require_locked_for_results());
        assert_eq!(config.lifecycle(), LifecycleConfig::default());
    }

    #[test]
    fn load_data_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("config.toml"),
            r#"
            [lifecycle]
            minimum_capacity = 3
            results_validation = "strict"
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config
            .load_data(&DataPaths::new(temp.path().to_path_buf()))
            .unwrap();

        assert_eq!(config.minimum_capacity(), 3);
        assert_eq!(config.validation_mode(), ValidationMode::Strict);
        assert!(config.data_config_loaded_from().is_some());
    }

    #[test]
    fn data_overrides_global() {
        let config = Config {
            global: GlobalConfig {
                lifecycle: Some(LifecycleSettings {
                    minimum_capacity: Some(5),
                    require_locked_for_results: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            },
            data: Some(DataConfig {
                lifecycle: Some(LifecycleSettings {
                    minimum_capacity: Some(4),
                    ..Default::default()
                }),
            }),
            global_path: None,
            data_path: None,
        };

        assert_eq!(config.minimum_capacity(), 4);
        // Unset in data config, falls back to global
        assert!(config.require_locked_for_results());
    }

    #[test]
    fn write_data_config_atomic() {
        let temp = TempDir::new().unwrap();
        let paths = DataPaths::new(temp.path().join("nested"));

        let data = DataConfig {
            lifecycle: Some(LifecycleSettings {
                require_locked_for_results: Some(true),
                ..Default::default()
            }),
        };
        let path = Config::write_data(&paths, &data).unwrap();
        assert!(path.exists());

        let mut config = Config::default();
        config.load_data(&paths).unwrap();
        assert!(config.require_locked_for_results());
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("config.toml"),
            "[lifecycle]\nresults_validation = \"sloppy\"\n",
        )
        .unwrap();

        let mut config = Config::default();
        let result = config.load_data(&DataPaths::new(temp.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), "colour = \"red\"\n").unwrap();

        let mut config = Config::default();
        let result = config.load_data(&DataPaths::new(temp.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
