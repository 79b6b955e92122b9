//! core::paths
//!
//! Centralized path routing for racekeeper storage locations.
//!
//! **Hard rule:** no code outside this module joins file names onto the
//! data directory. All paths go through [`DataPaths`].
//!
//! # Storage Layout
//!
//! All data lives under one data directory:
//! - `races.json` - Students, races and lanes
//! - `lock` - Exclusive lock file held while a store is open
//! - `config.toml` - Data-directory configuration
//!
//! # Data Directory Resolution
//!
//! 1. `--data-dir` flag
//! 2. `$RACEKEEPER_DATA_DIR`
//! 3. `data_dir` in the global config
//! 4. `~/.racekeeper/data`
//!
//! # Example
//!
//! ```
//! use racekeeper::core::paths::DataPaths;
//! use std::path::PathBuf;
//!
//! let paths = DataPaths::new(PathBuf::from("/srv/races"));
//!
//! assert_eq!(paths.database_path(), PathBuf::from("/srv/races/races.json"));
//! assert_eq!(paths.config_path(), PathBuf::from("/srv/races/config.toml"));
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RACEKEEPER_DATA_DIR";

/// Centralized path routing for racekeeper storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Root of all stored data.
    pub data_dir: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Resolve the data directory using the documented precedence.
    ///
    /// Returns `None` only when nothing is configured and the home
    /// directory cannot be determined.
    pub fn resolve(flag: Option<&Path>, configured: Option<&Path>) -> Option<Self> {
        if let Some(dir) = flag {
            return Some(Self::new(dir.to_path_buf()));
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                return Some(Self::new(PathBuf::from(dir)));
            }
        }
        if let Some(dir) = configured {
            return Some(Self::new(dir.to_path_buf()));
        }
        Self::default_dir().map(Self::new)
    }

    /// `~/.racekeeper/data`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".racekeeper").join("data"))
    }

    /// Path to the JSON database: `<data_dir>/races.json`
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("races.json")
    }

    /// Path to the lock file: `<data_dir>/lock`
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join("lock")
    }

    /// Path to the data-directory config: `<data_dir>/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }
}
