// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)
//!
//! The merged result is validated before it is returned.

use crate::validation::validate_config;
use crate::{ConfigError, ConfigResult, MeanfieldConfig};
use meanfield_npu_neural::ModelVariant;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for when no path is given
pub const CONFIG_FILE_NAME: &str = "meanfield_configuration.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `MEANFIELD_CONFIG_PATH` environment variable
/// 2. Current working directory: `./meanfield_configuration.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("MEANFIELD_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by MEANFIELD_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet MEANFIELD_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, has an override that
/// does not parse, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<MeanfieldConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: MeanfieldConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    validate_config(&config)?;
    Ok(config)
}

fn parse_value<T: std::str::FromStr>(source: &str, value: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(format!("{} = '{}': {}", source, value, e)))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `MEANFIELD_MODEL` -> `core.model`
/// - `MEANFIELD_TICK_PERIOD_US` -> `core.tick_period_us`
/// - `MEANFIELD_TIMESTEP_MS` -> `core.timestep_ms`
/// - `MEANFIELD_WORKING_MEMORY_BYTES` -> `core.working_memory_bytes`
/// - `MEANFIELD_RECORD` -> `recording.variables` (comma separated)
/// - `MEANFIELD_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut MeanfieldConfig) -> ConfigResult<()> {
    if let Ok(value) = env::var("MEANFIELD_MODEL") {
        config.core.model = parse_value::<ModelVariant>("MEANFIELD_MODEL", &value)?;
    }
    if let Ok(value) = env::var("MEANFIELD_TICK_PERIOD_US") {
        config.core.tick_period_us = parse_value("MEANFIELD_TICK_PERIOD_US", &value)?;
    }
    if let Ok(value) = env::var("MEANFIELD_TIMESTEP_MS") {
        config.core.timestep_ms = parse_value("MEANFIELD_TIMESTEP_MS", &value)?;
    }
    if let Ok(value) = env::var("MEANFIELD_WORKING_MEMORY_BYTES") {
        config.core.working_memory_bytes =
            parse_value("MEANFIELD_WORKING_MEMORY_BYTES", &value)?;
    }
    if let Ok(value) = env::var("MEANFIELD_RECORD") {
        config.recording.variables = parse_list(&value);
    }
    if let Ok(value) = env::var("MEANFIELD_LOG_LEVEL") {
        config.logging.level = value;
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"model": "linear_rate", "tick_period_us": "500"}`)
pub fn apply_cli_overrides(
    config: &mut MeanfieldConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("model") {
        config.core.model = parse_value::<ModelVariant>("model", value)?;
    }
    if let Some(value) = cli_args.get("tick_period_us") {
        config.core.tick_period_us = parse_value("tick_period_us", value)?;
    }
    if let Some(value) = cli_args.get("timestep_ms") {
        config.core.timestep_ms = parse_value("timestep_ms", value)?;
    }
    if let Some(value) = cli_args.get("working_memory_bytes") {
        config.core.working_memory_bytes = parse_value("working_memory_bytes", value)?;
    }
    if let Some(value) = cli_args.get("record") {
        config.recording.variables = parse_list(value);
    }
    if let Some(value) = cli_args.get("sampling_interval") {
        config.recording.sampling_interval = parse_value("sampling_interval", value)?;
    }
    if let Some(value) = cli_args.get("frame_capacity") {
        config.recording.frame_capacity = parse_value("frame_capacity", value)?;
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    Ok(())
}
