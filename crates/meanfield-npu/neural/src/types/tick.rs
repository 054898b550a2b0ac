// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-tick context

use core::fmt;

/// Ephemeral record describing the tick being processed.
///
/// Built fresh for every tick and dropped when the tick ends; nothing in here survives
/// into the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    /// Timer tick index as delivered by the timer interrupt
    pub tick: u32,
    /// Simulation time in ticks since the run started
    pub time: u32,
    /// Number of simulated units on this core
    pub unit_count: usize,
    /// Smallest power of two >= `unit_count`
    pub unit_count_padded: usize,
    /// Number of event classes (synapse types)
    pub class_count: usize,
}

impl TickContext {
    /// Number of ring buffer slots covered by this tick
    pub fn slot_count(&self) -> usize {
        self.class_count * self.unit_count_padded
    }
}

impl fmt::Display for TickContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {} (time {}, units {}/{}, classes {})",
            self.tick, self.time, self.unit_count, self.unit_count_padded, self.class_count
        )
    }
}

/// Smallest power of two >= `unit_count` (1 for an empty core)
pub fn padded_unit_count(unit_count: usize) -> usize {
    unit_count.max(1).next_power_of_two()
}
