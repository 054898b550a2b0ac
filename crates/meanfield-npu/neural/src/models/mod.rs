// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Unit Model Architecture
//!
//! Trait-based unit update capability so the core can host different population models.
//!
//! ## Adding a New Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Define a `#[repr(C)]` Pod parameter record and implement `UnitParameters`
//! 3. Implement `UnitUpdate`
//! 4. Add tests
//! 5. Export in `mod.rs` and add a `DynamicCore` variant in the tick engine

pub mod linear;
pub mod meanfield;
pub mod traits;
pub mod variant;

pub use linear::{LinearRateModel, LinearRateParameters};
pub use meanfield::{MeanFieldModel, MeanFieldParameters};
pub use traits::{UnitParameters, UnitUpdate};
pub use variant::{ModelVariant, UnknownModelVariant};
