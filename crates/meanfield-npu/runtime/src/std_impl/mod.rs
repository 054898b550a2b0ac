// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Mean-Field Runtime - Standard (Desktop/Server)
//!
//! Host implementations of the runtime traits:
//! - `StdWorkingMemory`: heap allocation with an optional byte budget
//! - `FrameRecorder`: in-memory recording frames
//! - `CollectingTransmitter` / `NullTransmitter`: outbound event endpoints
//!
//! This module is only available when the `std` feature is enabled.

pub mod memory;
pub mod recorder;
pub mod transmitter;

pub use memory::StdWorkingMemory;
pub use recorder::{Frame, FrameRecorder};
pub use transmitter::{CollectingTransmitter, NullTransmitter};
