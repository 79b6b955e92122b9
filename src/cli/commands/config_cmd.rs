//! config command - Get, set, or list configuration values

use anyhow::{bail, Context as _, Result};

use super::session;
use crate::cli::Context;
use crate::core::config::{Config, DataConfig};

/// Keys understood by `get` and `set`.
const KEYS: &[&str] = &[
    "data_dir",
    "lifecycle.minimum_capacity",
    "lifecycle.results_validation",
    "lifecycle.require_locked_for_results",
];

fn value_of(config: &Config, data_dir: &str, key: &str) -> Result<String> {
    Ok(match key {
        "data_dir" => data_dir.to_string(),
        "lifecycle.minimum_capacity" => config.minimum_capacity().to_string(),
        "lifecycle.results_validation" => config.validation_mode().to_string(),
        "lifecycle.require_locked_for_results" => config.require_locked_for_results().to_string(),
        _ => bail!(
            "Unknown configuration key: {} (known keys: {})",
            key,
            KEYS.join(", ")
        ),
    })
}

/// Get a configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let session = session(ctx)?;
    let data_dir = session.paths.data_dir.display().to_string();
    println!("{}", value_of(&session.config, &data_dir, key)?);
    Ok(())
}

/// Set a value in the data-directory config.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let session = session(ctx)?;

    let mut data = session.config.data.clone().unwrap_or_default();
    let mut lifecycle = data.lifecycle.take().unwrap_or_default();

    match key {
        "lifecycle.minimum_capacity" => {
            let n: usize = value
                .parse()
                .with_context(|| format!("'{}' is not a number", value))?;
            lifecycle.minimum_capacity = Some(n);
        }
        "lifecycle.results_validation" => {
            lifecycle.results_validation = Some(value.trim().to_ascii_lowercase());
        }
        "lifecycle.require_locked_for_results" => {
            let flag: bool = value
                .parse()
                .with_context(|| format!("'{}' is not true or false", value))?;
            lifecycle.require_locked_for_results = Some(flag);
        }
        "data_dir" => bail!("data_dir is set in the global config or with --data-dir"),
        _ => bail!(
            "Unknown configuration key: {} (known keys: {})",
            key,
            KEYS.join(", ")
        ),
    }

    let data = DataConfig {
        lifecycle: Some(lifecycle),
    };
    data.validate().context("Invalid configuration value")?;
    let path = Config::write_data(&session.paths, &data).context("Failed to write config")?;

    if !ctx.quiet {
        println!("Set {} = {} in {}", key, value, path.display());
    }
    Ok(())
}

/// List effective configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    let session = session(ctx)?;
    let data_dir = session.paths.data_dir.display().to_string();

    if ctx.json {
        let lifecycle = session.config.lifecycle();
        let value = serde_json::json!({
            "data_dir": data_dir,
            "lifecycle": lifecycle,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("# Effective Configuration");
    for key in KEYS {
        println!("{} = {}", key, value_of(&session.config, &data_dir, key)?);
    }

    if let Some(path) = session.config.global_config_loaded_from() {
        println!("# global config: {}", path.display());
    }
    if let Some(path) = session.config.data_config_loaded_from() {
        println!("# data config: {}", path.display());
    }

    Ok(())
}
