// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runtime abstraction traits
//!
//! The tick engine talks to the platform only through these traits:
//! - Working memory (byte-budgeted allocation)
//! - Recording (per-tick frames)
//! - Transmission (outbound events)

pub mod error;
pub mod memory;
pub mod recording;
pub mod transmit;

// Re-export key types
pub use error::{Result, RuntimeError};
pub use memory::WorkingMemory;
pub use recording::{RecordingSink, RecordingTarget, SharedSink};
pub use transmit::{OutboundEvent, Transmitter};
