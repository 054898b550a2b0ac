// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for neural data handling

/// Errors raised while decoding or validating unit data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NeuralError {
    #[error("parameter words too short: need {expected} words for {units} units, got {actual}")]
    TruncatedParameters {
        units: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unit parameter record is {size} bytes, not a whole number of 32-bit words")]
    UnalignedRecord { size: usize },

    #[error("invalid parameters for unit {unit}: {reason}")]
    InvalidParameters { unit: usize, reason: &'static str },

    #[error("unit index {unit} out of range (unit count {unit_count})")]
    UnitOutOfRange { unit: usize, unit_count: usize },

    #[error("event class {class} out of range (class count {class_count})")]
    ClassOutOfRange { class: usize, class_count: usize },
}

pub type Result<T> = core::result::Result<T, NeuralError>;
pub type Error = NeuralError;
