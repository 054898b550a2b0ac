// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Mean-Field Neural Computation (Platform-Agnostic)
//!
//! Everything a core needs to turn raw weights into unit state:
//! - **Types**: `Accum` fixed point, tick context, unit parameter sets
//! - **Synapse**: weight-to-input conversion and input accumulation
//! - **Math**: complementary error function for the transfer functions
//! - **Models**: unit update capability and the bundled models

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod math;

pub mod synapse;

pub mod models;

// Re-export types
pub use types::{
    padded_unit_count, Accum, Error, NeuralError, Result, RingBufferWeight, TickContext,
    UnitParameterSet,
};

pub use synapse::{convert_weight_to_input, InputSink, SynapseType, SynapticInputs};

pub use models::{
    LinearRateModel, LinearRateParameters, MeanFieldModel, MeanFieldParameters, ModelVariant,
    UnitParameters, UnitUpdate,
};
