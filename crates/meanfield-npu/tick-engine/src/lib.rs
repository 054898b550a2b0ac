// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # Mean-Field Tick Engine
//!
//! Per-timestep simulation core for rate-based population models.
//!
//! ## Per Tick
//! 1. Drain the ring buffer: every slot is read, converted with its class's scaling
//!    exponent, delivered to the input accumulator and zeroed
//! 2. Update every unit with the selected model
//! 3. Transmit outputs on the TDMA schedule
//! 4. Record the selected variables
//!
//! ## Architecture
//! - [`ParameterStore`] moves unit records between the external blob and working memory
//! - [`drain`] is the ring buffer aggregator
//! - [`TimestepController`] owns the lifecycle and the tick cycle
//! - [`DynamicCore`] picks the unit model at runtime
//! - [`TickLoopRunner`] ticks a core from a background thread

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod aggregation;
pub mod controller;
pub mod dynamic_core;
pub mod error;
pub mod fatal;
pub mod parameter_store;
pub mod stats;
pub mod tdma;
#[cfg(feature = "std")]
pub mod tick_loop_runner;

pub use aggregation::{drain, DrainReport};
pub use controller::{CoreServices, CoreState, TimestepController};
pub use dynamic_core::DynamicCore;
pub use error::{CoreError, Result};
pub use fatal::{halt, FatalError};
pub use parameter_store::{
    BlobBuilder, BlobHeader, ParameterStore, TransmissionIdentity, HEADER_WORDS,
};
pub use stats::TickStats;
pub use tdma::{TdmaClock, TdmaSchedule};
#[cfg(feature = "std")]
pub use tick_loop_runner::TickLoopRunner;
