// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Synaptic input module
//!
//! Weight-to-input conversion and the per-tick input accumulator.

pub mod input;
pub mod weight;

pub use input::*;
pub use weight::*;
