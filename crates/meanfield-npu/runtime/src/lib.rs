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

//! # Mean-Field Runtime Abstraction
//!
//! Platform-facing pieces of a core.
//!
//! This crate provides:
//! - **Traits** (always available): `WorkingMemory`, `RecordingSink`, `Transmitter`
//! - **Shared state**: the atomic `RingBuffer` and the external `SharedRegion`
//! - **Std Implementation** (behind `std` feature): host memory, recorder and transmitters
//!
//! ## Usage
//!
//! ```rust
//! use meanfield_npu_runtime::RingBuffer;
//!
//! let buffer = RingBuffer::new(1, 3);
//! buffer.deposit(0, 1, 16).unwrap();
//! assert_eq!(buffer.take(buffer.index(0, 1)), 16);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Traits module (always available)
pub mod traits;

pub mod region;
pub mod ring_buffer;

// Re-export traits for convenience
pub use traits::{
    OutboundEvent, RecordingSink, RecordingTarget, Result, RuntimeError, SharedSink, Transmitter,
    WorkingMemory,
};

pub use region::SharedRegion;
pub use ring_buffer::RingBuffer;

// Standard library implementation (behind "std" feature)
#[cfg(feature = "std")]
pub mod std_impl;

#[cfg(feature = "std")]
pub use std_impl::{
    CollectingTransmitter, Frame, FrameRecorder, NullTransmitter, StdWorkingMemory,
};

/// Version of the runtime trait API
///
/// Increment this when making breaking changes to the trait API.
pub const RUNTIME_TRAIT_VERSION: u32 = 1;
