// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Shared input ring buffer
//!
//! One accumulator slot per (event class, padded unit). The combined index is
//! `(class << log2(padded)) | unit`, so a class occupies a contiguous, power-of-two block.
//!
//! The buffer has one asynchronous writer (event delivery) and one reader (the tick
//! handler). Slots are atomics: the writer accumulates with a saturating
//! compare-exchange loop and the reader drains with `swap(0)`, so a slot is never observed
//! half-updated and no deposit is lost between the read and the clear.

use crate::traits::{Result, RuntimeError};
use meanfield_npu_neural::{padded_unit_count, RingBufferWeight};
use std::sync::atomic::{AtomicU32, Ordering};

/// Atomic (class, unit) weight accumulator
#[derive(Debug)]
pub struct RingBuffer {
    slots: Box<[AtomicU32]>,
    class_count: usize,
    unit_count_padded: usize,
    unit_bits: u32,
}

impl RingBuffer {
    /// Create an empty buffer. `unit_count_padded` is rounded up to a power of two.
    pub fn new(class_count: usize, unit_count_padded: usize) -> Self {
        let unit_count_padded = padded_unit_count(unit_count_padded);
        let slots = (0..class_count * unit_count_padded)
            .map(|_| AtomicU32::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            class_count,
            unit_count_padded,
            unit_bits: unit_count_padded.trailing_zeros(),
        }
    }

    /// Working-memory footprint for the given shape
    pub fn bytes_for(class_count: usize, unit_count_padded: usize) -> usize {
        class_count * padded_unit_count(unit_count_padded) * core::mem::size_of::<AtomicU32>()
    }

    #[inline(always)]
    pub fn index(&self, class: usize, unit: usize) -> usize {
        (class << self.unit_bits) | unit
    }

    /// Accumulate `weight` into (class, unit), saturating at `u32::MAX`
    ///
    /// Called by the event-delivery side. Out-of-range addresses are rejected.
    pub fn deposit(&self, class: usize, unit: usize, weight: RingBufferWeight) -> Result<()> {
        if class >= self.class_count || unit >= self.unit_count_padded {
            return Err(RuntimeError::SlotOutOfRange {
                class,
                unit,
                class_count: self.class_count,
                unit_count_padded: self.unit_count_padded,
            });
        }
        let slot = &self.slots[self.index(class, unit)];
        // Closure never returns None, so the update always succeeds
        let _ = slot.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            Some(current.saturating_add(weight))
        });
        Ok(())
    }

    /// Read and zero one slot by combined index
    #[inline]
    pub fn take(&self, index: usize) -> RingBufferWeight {
        self.slots[index].swap(0, Ordering::AcqRel)
    }

    /// Current value of (class, unit) without clearing it
    pub fn peek(&self, class: usize, unit: usize) -> RingBufferWeight {
        self.slots[self.index(class, unit)].load(Ordering::Acquire)
    }

    /// Zero every slot
    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.store(0, Ordering::Release);
        }
    }

    /// True when every slot is zero
    pub fn is_empty(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.load(Ordering::Acquire) == 0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn class_count(&self) -> usize {
        self.class_count
    }

    pub fn unit_count_padded(&self) -> usize {
        self.unit_count_padded
    }

    /// log2 of the padded unit count
    pub fn unit_bits(&self) -> u32 {
        self.unit_bits
    }
}
