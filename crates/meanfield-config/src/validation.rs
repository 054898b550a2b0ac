// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent and within valid ranges. All problems are collected and reported together.

use crate::{ConfigError, ConfigResult, MeanfieldConfig};
use meanfield_npu_neural::{LinearRateModel, MeanFieldModel, ModelVariant, UnitUpdate};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
    UnknownVariable { variable: String, model: ModelVariant },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::UnknownVariable { variable, model } => {
                write!(f, "Model {} has no recordable variable '{}'", model, variable)
            }
        }
    }
}

/// Variable names the given model can record
pub fn recordable_variables(model: ModelVariant) -> &'static [&'static str] {
    match model {
        ModelVariant::MeanField => MeanFieldModel::new().recorded_variables(),
        ModelVariant::LinearRate => LinearRateModel::new().recorded_variables(),
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &MeanfieldConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every validation problem in `config`
pub fn collect_errors(config: &MeanfieldConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_core(config, &mut errors);
    validate_recording(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn validate_core(config: &MeanfieldConfig, errors: &mut Vec<ConfigValidationError>) {
    let timestep = config.core.timestep_ms;
    if !timestep.is_finite() || timestep <= 0.0 {
        errors.push(invalid("core.timestep_ms", "must be a positive number"));
    } else if timestep >= 65536.0 {
        errors.push(invalid(
            "core.timestep_ms",
            "must fit the fixed-point range (< 65536)",
        ));
    }
}

fn validate_recording(config: &MeanfieldConfig, errors: &mut Vec<ConfigValidationError>) {
    let recording = &config.recording;
    if recording.sampling_interval == 0 {
        errors.push(invalid("recording.sampling_interval", "must be >= 1"));
    }

    let available = recordable_variables(config.core.model);
    for variable in &recording.variables {
        if !available.contains(&variable.as_str()) {
            errors.push(ConfigValidationError::UnknownVariable {
                variable: variable.clone(),
                model: config.core.model,
            });
        }
    }

    let mut seen = Vec::new();
    for variable in &recording.variables {
        if seen.contains(&variable) {
            errors.push(invalid(
                "recording.variables",
                format!("'{}' listed more than once", variable),
            ));
        }
        seen.push(variable);
    }

    if !recording.variables.is_empty() && recording.frame_capacity == 0 {
        errors.push(invalid(
            "recording.frame_capacity",
            "must be > 0 when variables are recorded",
        ));
    }
}

fn validate_logging(config: &MeanfieldConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(invalid(
            "logging.level",
            format!(
                "'{}' is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&MeanfieldConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = MeanfieldConfig::default();
        config.recording.sampling_interval = 0;
        config.core.timestep_ms = 0.0;
        config.logging.level = "verbose".to_string();

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 3);

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("recording.sampling_interval"));
        assert!(message.contains("core.timestep_ms"));
        assert!(message.contains("logging.level"));
    }

    #[test]
    fn test_variables_checked_against_model() {
        let mut config = MeanfieldConfig::default();
        config.recording.variables = vec!["rate".to_string(), "mu".to_string()];
        assert!(collect_errors(&config).is_empty());

        config.core.model = ModelVariant::LinearRate;
        assert_eq!(
            collect_errors(&config),
            vec![ConfigValidationError::UnknownVariable {
                variable: "mu".to_string(),
                model: ModelVariant::LinearRate,
            }]
        );
    }

    #[test]
    fn test_duplicate_variable() {
        let mut config = MeanfieldConfig::default();
        config.recording.variables = vec!["rate".to_string(), "rate".to_string()];
        assert_eq!(collect_errors(&config).len(), 1);
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = MeanfieldConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
