// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recoverable controller errors

use crate::controller::CoreState;
use meanfield_npu_neural::NeuralError;
use meanfield_npu_runtime::RuntimeError;

/// Errors a controller reports to its caller; state is unchanged when one is returned
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: CoreState,
    },

    #[error("invalid parameter blob: {0}")]
    InvalidBlob(String),

    #[error(transparent)]
    InvalidParameters(#[from] NeuralError),

    #[error("recording failed: {0}")]
    Recording(#[source] RuntimeError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
