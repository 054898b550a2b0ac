// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # meanfield-observability
//!
//! Logging setup shared by the mean-field binaries and tests.
//!
//! Every crate logs through `tracing` with its crate name as the target, so per-crate debug
//! flags map directly onto `EnvFilter` directives.
//!
//! ## Features
//! - `file-logging`: per-run log folder with a combined log file (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use init::*;

/// Known crate log targets for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "meanfield",
    "meanfield-tick-engine",
    "meanfield-runtime",
    "meanfield-config",
];
