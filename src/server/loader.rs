//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment.
///
/// `data_dir` points at an optional `parley.toml` override living next to
/// the persisted state.
pub fn load_config(data_dir: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/local").required(false));

    if let Some(dir) = data_dir {
        builder = builder.add_source(File::from(dir.join("parley.toml")).required(false));
    }

    // 3. Environment variables (highest priority below CLI flags).
    // prefix_separator("_") keeps PARLEY_LLM__MODEL working with config-rs 0.14.
    let config = builder
        .add_source(
            Environment::with_prefix("PARLEY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Embedded defaults only, for tests
#[cfg(test)]
pub fn config_from_sources(extra_toml: Option<&str>) -> Result<AppConfig> {
    let mut builder =
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
    if let Some(extra) = extra_toml {
        builder = builder.add_source(File::from_str(extra, FileFormat::Toml));
    }
    builder
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
