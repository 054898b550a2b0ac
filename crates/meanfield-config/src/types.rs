// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `meanfield_configuration.toml`.

use core::time::Duration;
use meanfield_npu_neural::ModelVariant;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MeanfieldConfig {
    pub core: CoreConfig,
    pub recording: RecordingConfig,
    pub logging: LoggingConfig,
}

/// Core execution configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Unit model hosted by the core
    pub model: ModelVariant,
    /// Tick period in microseconds (0 = run ticks back to back)
    pub tick_period_us: u64,
    /// Tick duration handed to the unit model, in milliseconds
    pub timestep_ms: f64,
    /// Working-memory budget in bytes (0 = unlimited)
    pub working_memory_bytes: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            model: ModelVariant::MeanField,
            tick_period_us: 1000,
            timestep_ms: 1.0,
            working_memory_bytes: 64 * 1024,
        }
    }
}

impl CoreConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(self.tick_period_us)
    }

    /// Budget for `StdWorkingMemory`, `None` when unlimited
    pub fn memory_limit(&self) -> Option<usize> {
        (self.working_memory_bytes > 0).then_some(self.working_memory_bytes)
    }
}

/// Recording configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Model variable names to record, in frame order
    pub variables: Vec<String>,
    /// Keep one frame every N ticks
    pub sampling_interval: u32,
    /// Bytes available per frame
    pub frame_capacity: usize,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            variables: vec!["rate".to_string()],
            sampling_interval: 1,
            frame_capacity: 16 * 1024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Crates to log at debug level regardless of `level`
    pub debug_crates: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug_crates: Vec::new(),
        }
    }
}
