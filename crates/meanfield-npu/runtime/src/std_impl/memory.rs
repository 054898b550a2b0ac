// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Heap-backed working memory with an optional byte budget

use crate::traits::{Result, RuntimeError, WorkingMemory};
use tracing::trace;

/// Working memory for desktop/server hosts
///
/// Allocation itself goes to the global allocator; this type only enforces the budget so a
/// host run behaves like a core with `limit` bytes of local memory.
#[derive(Debug, Clone, Default)]
pub struct StdWorkingMemory {
    limit: Option<usize>,
    in_use: usize,
}

impl StdWorkingMemory {
    /// Unlimited budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Budget of `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            in_use: 0,
        }
    }
}

impl WorkingMemory for StdWorkingMemory {
    fn reserve(&mut self, bytes: usize, purpose: &'static str) -> Result<()> {
        if let Some(available) = self.available() {
            if bytes > available {
                return Err(RuntimeError::OutOfMemory {
                    requested_bytes: bytes,
                    available_bytes: available,
                    purpose,
                });
            }
        }
        self.in_use += bytes;
        trace!(target: "meanfield-runtime", "[MEMORY] Reserved {} bytes for {} ({} in use)", bytes, purpose, self.in_use);
        Ok(())
    }

    fn release(&mut self, bytes: usize) {
        self.in_use = self.in_use.saturating_sub(bytes);
    }

    fn in_use(&self) -> usize {
        self.in_use
    }

    fn memory_limit(&self) -> Option<usize> {
        self.limit
    }

    fn platform_name(&self) -> &'static str {
        "Standard (heap, budgeted)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited() {
        let mut memory = StdWorkingMemory::new();
        memory.reserve(usize::MAX / 2, "test").unwrap();
        assert_eq!(memory.available(), None);
    }

    #[test]
    fn test_budget_enforced() {
        let mut memory = StdWorkingMemory::with_limit(100);
        memory.reserve(60, "a").unwrap();
        let err = memory.reserve(41, "b").unwrap_err();
        assert_eq!(
            err,
            RuntimeError::OutOfMemory {
                requested_bytes: 41,
                available_bytes: 40,
                purpose: "b"
            }
        );
        assert_eq!(memory.in_use(), 60);
        memory.reserve(40, "c").unwrap();
        assert_eq!(memory.available(), Some(0));

        memory.release(100);
        assert_eq!(memory.in_use(), 0);
    }
}
