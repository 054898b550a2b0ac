// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fatal error reporting
//!
//! A core has no one to return an error to in the cases below; the platform's only answer
//! is to stop the core with a diagnostic. `halt` logs the diagnostic and panics. Release
//! builds use `panic = "abort"`, so the panic ends the process the way a core halt would.

use meanfield_npu_runtime::RuntimeError;
use tracing::error;

/// Conditions that stop the core
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalError {
    /// Working memory could not satisfy an initialization allocation
    #[error("working-memory allocation failed: {0}")]
    Allocation(#[source] RuntimeError),

    /// Aggregation reached a unit the input accumulator cannot address
    #[error("unit index {unit} out of range (unit count {unit_count})")]
    UnitIndexOutOfRange { unit: usize, unit_count: usize },

    /// Scaling table does not cover every event class
    #[error("scaling table has {entries} entries for {class_count} event classes")]
    ScalingTableMismatch { entries: usize, class_count: usize },

    /// Parameters could not be written back to external memory
    #[error("parameter store failed: {0}")]
    StoreFailed(String),
}

/// Stop the core with a diagnostic
#[cold]
#[track_caller]
pub fn halt(err: FatalError) -> ! {
    error!(target: "meanfield-tick-engine", "[FATAL] {}", err);
    panic!("core halted: {}", err);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "core halted: unit index 7 out of range")]
    fn test_halt_panics_with_diagnostic() {
        halt(FatalError::UnitIndexOutOfRange {
            unit: 7,
            unit_count: 3,
        });
    }
}
