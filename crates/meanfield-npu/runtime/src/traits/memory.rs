// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Working-memory abstraction
//!
//! A core has a small local memory. Everything the controller allocates at initialization
//! (scaling table, unit records, ring buffer, input accumulator) is accounted against it
//! through this trait, so exhausting it is detected where it happens instead of surfacing
//! later as an allocator abort.

use super::error::Result;

/// Byte-budgeted allocator for per-core working memory
///
/// # Example
///
/// ```ignore
/// pub struct FixedMemory { used: usize }
///
/// impl WorkingMemory for FixedMemory {
///     fn reserve(&mut self, bytes: usize, purpose: &'static str) -> Result<()> { ... }
///     fn release(&mut self, bytes: usize) { ... }
///     fn in_use(&self) -> usize { self.used }
///     fn memory_limit(&self) -> Option<usize> { Some(64 * 1024) }
/// }
/// ```
pub trait WorkingMemory: Send {
    /// Account `bytes` against the budget
    ///
    /// Fails with `RuntimeError::OutOfMemory` and leaves the budget untouched when the
    /// request does not fit.
    fn reserve(&mut self, bytes: usize, purpose: &'static str) -> Result<()>;

    /// Return `bytes` to the budget
    fn release(&mut self, bytes: usize);

    /// Bytes currently reserved
    fn in_use(&self) -> usize;

    /// Platform memory limit (None = unlimited)
    fn memory_limit(&self) -> Option<usize>;

    /// Bytes still available (None = unlimited)
    fn available(&self) -> Option<usize> {
        self.memory_limit()
            .map(|limit| limit.saturating_sub(self.in_use()))
    }

    /// Platform name for logging/debugging
    fn platform_name(&self) -> &'static str {
        "Generic Working Memory"
    }
}
