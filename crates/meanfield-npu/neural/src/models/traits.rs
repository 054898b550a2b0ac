// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Unit update capability
//!
//! The timestep controller only knows this trait. Everything model specific (the record
//! layout, the dynamics, which variables are worth recording) lives behind it, and the
//! model variant is picked once at configuration time.

use crate::types::Accum;
use bytemuck::Pod;
use core::fmt::Debug;

/// Per-unit parameter record
///
/// Records are `#[repr(C)]` plain-old-data made of 32-bit words, so the parameter store
/// can move them to and from the external blob by casting.
pub trait UnitParameters: Pod + Debug + PartialEq + Send + Sync {
    /// Size of one record in 32-bit words
    ///
    /// Evaluating this for a record that is not a whole number of words fails the build.
    const WORDS: usize = {
        assert!(core::mem::size_of::<Self>() % 4 == 0);
        core::mem::size_of::<Self>() / 4
    };

    /// Validate parameter ranges
    fn validate(&self) -> Result<(), &'static str>;
}

/// Advances one unit's state per tick
///
/// Implementations must be deterministic: the new state depends only on the previous
/// record, the aggregated inputs and the tick duration.
pub trait UnitUpdate {
    /// Model-specific per-unit record
    type Parameters: UnitParameters;

    /// Human-readable model name
    fn model_name(&self) -> &'static str;

    /// Advance one unit by one tick
    ///
    /// # Arguments
    /// * `params` - The unit's record, updated in place
    /// * `inputs` - Aggregated input per event class, indexed by class
    /// * `timestep` - Tick duration in milliseconds
    fn update(&self, params: &mut Self::Parameters, inputs: &[Accum], timestep: Accum);

    /// Value to transmit for this unit after its update, if any
    fn output(&self, params: &Self::Parameters) -> Option<Accum>;

    /// Names of the recordable variables, indexed by variable id
    fn recorded_variables(&self) -> &'static [&'static str];

    /// Current value of one recordable variable
    fn recorded_value(&self, params: &Self::Parameters, variable: usize) -> Accum;
}
