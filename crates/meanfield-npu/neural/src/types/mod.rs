// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neural Types Module
//!
//! Core type definitions shared by the runtime and the tick engine.

pub mod error;
pub mod fixed;
pub mod tick;
pub mod unit_set;

// Re-export commonly used types
pub use error::{Error, NeuralError, Result};
pub use fixed::Accum;
pub use tick::{padded_unit_count, TickContext};
pub use unit_set::UnitParameterSet;

/// Raw accumulated weight as stored in a ring buffer slot
pub type RingBufferWeight = u32;

// Note: SynapseType is in crate::synapse module (shared with algorithms)
pub use crate::synapse::SynapseType;
