// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # meanfield - Mean-Field Simulation Core
//!
//! Per-timestep simulation core for rate-based population models running on a fixed tick.
//! Each tick drains the weights accumulated in a ring buffer, updates every unit with the
//! configured model, transmits unit outputs on a TDMA schedule and records selected
//! variables.
//!
//! ## Crates
//! - **`meanfield-npu-neural`**: fixed-point `Accum`, weight conversion, unit models
//! - **`meanfield-npu-runtime`**: ring buffer, shared region, recording/transmit/memory traits
//! - **`meanfield-npu-tick-engine`**: parameter store, aggregator, timestep controller
//! - **`meanfield-config`**: TOML configuration with env/CLI overrides
//! - **`meanfield-observability`**: logging setup
//!
//! ## Usage
//!
//! ```rust,no_run
//! use meanfield::prelude::*;
//!
//! let config = MeanfieldConfig::default();
//! let blob = BlobBuilder::new(vec![MeanFieldParameters::default(); 8])
//!     .scaling_exponents(vec![4, 4])
//!     .build_region()
//!     .unwrap();
//!
//! let mut core = meanfield::host::start_core(&config, blob, CoreServices::host()).unwrap();
//! core.ring_buffer().unwrap().deposit(0, 3, 32).unwrap();
//! core.on_tick(0).unwrap();
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export foundation
pub use meanfield_npu_neural as neural;
pub use meanfield_npu_runtime as runtime;

// Re-export algorithms
pub use meanfield_npu_tick_engine as tick_engine;

// Re-export infrastructure
pub use meanfield_config as config;
pub use meanfield_observability as observability;

pub mod host;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::neural::{
        Accum, LinearRateModel, LinearRateParameters, MeanFieldModel, MeanFieldParameters,
        ModelVariant, UnitUpdate,
    };
    pub use crate::runtime::{
        FrameRecorder, RecordingSink, RecordingTarget, RingBuffer, SharedRegion, SharedSink,
    };
    pub use crate::tick_engine::{
        BlobBuilder, CoreError, CoreServices, CoreState, DynamicCore, TickLoopRunner,
        TimestepController,
    };
    pub use crate::config::MeanfieldConfig;
}
