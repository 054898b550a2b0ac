// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared external memory region
//!
//! Models the SDRAM block a core's parameters are loaded from and stored back to. The
//! region outlives any single controller and may be inspected by the host between runs,
//! hence the shared lock.

use crate::traits::{Result, RuntimeError};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Cloneable handle to a block of little-endian 32-bit words
#[derive(Debug, Clone, Default)]
pub struct SharedRegion {
    words: Arc<RwLock<Vec<u32>>>,
}

impl SharedRegion {
    pub fn new(words: Vec<u32>) -> Self {
        Self {
            words: Arc::new(RwLock::new(words)),
        }
    }

    /// Decode a little-endian byte image; the length must be a multiple of 4
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(RuntimeError::InvalidOperation(format!(
                "region image of {} bytes is not word aligned",
                bytes.len()
            )));
        }
        let words = bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Self::new(words))
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.words
            .read()
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Vec<u32>> {
        self.words.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<u32>> {
        self.words.write()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<u32> {
        self.words.read().clone()
    }

    pub fn len(&self) -> usize {
        self.words.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }

    /// Copy `count` words starting at `offset`
    pub fn read_words(&self, offset: usize, count: usize) -> Result<Vec<u32>> {
        let words = self.words.read();
        let end = offset.saturating_add(count);
        words
            .get(offset..end)
            .map(<[u32]>::to_vec)
            .ok_or(RuntimeError::RegionTooShort {
                needed: end,
                available: words.len(),
            })
    }
}
