// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for runtime operations

/// Runtime errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// Working-memory budget exhausted
    #[error("Out of memory: requested {requested_bytes} bytes for {purpose}, {available_bytes} available")]
    OutOfMemory {
        /// Requested bytes
        requested_bytes: usize,
        /// Bytes still free in the budget
        available_bytes: usize,
        /// What the allocation was for
        purpose: &'static str,
    },

    /// Capacity exceeded
    #[error("Capacity exceeded: requested {requested}, available {available}")]
    CapacityExceeded {
        /// Requested capacity
        requested: usize,
        /// Available capacity
        available: usize,
    },

    /// Producer addressed a ring buffer slot outside the buffer
    #[error("Ring buffer slot out of range: class {class}/{class_count}, unit {unit}/{unit_count_padded}")]
    SlotOutOfRange {
        /// Event class
        class: usize,
        /// Padded unit index
        unit: usize,
        /// Number of event classes
        class_count: usize,
        /// Padded unit count
        unit_count_padded: usize,
    },

    /// Shared region is shorter than the requested access
    #[error("Region too short: need {needed} words, region has {available}")]
    RegionTooShort {
        /// Words needed
        needed: usize,
        /// Words present
        available: usize,
    },

    /// A recording variable name is not provided by the model
    #[error("Unknown recording variable '{0}'")]
    UnknownVariable(String),

    /// Recording subsystem refused initialise/reset
    #[error("Recording error: {0}")]
    Recording(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for runtime operations
pub type Result<T> = core::result::Result<T, RuntimeError>;
