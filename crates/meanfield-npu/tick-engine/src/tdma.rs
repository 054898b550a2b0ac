// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Time-division transmission schedule
//!
//! Cores sharing a router stagger their sends. Each core gets an initial offset into the
//! tick and a spacing between consecutive sends; the n-th send of a tick leaves at
//! `initial_offset + (n mod phase_count) × time_between_sends`.

use serde::Serialize;

/// Per-core schedule, read from the head of the parameter blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TdmaSchedule {
    /// Spacing between consecutive sends (timer ticks)
    pub time_between_sends: u32,
    /// Offset of the first send of each tick
    pub initial_offset: u32,
    /// Number of distinct send slots per tick (0 = unbounded)
    pub phase_count: u32,
}

impl TdmaSchedule {
    /// Number of blob words the schedule occupies
    pub const WORDS: usize = 3;

    pub fn from_words(words: [u32; 3]) -> Self {
        Self {
            time_between_sends: words[0],
            initial_offset: words[1],
            phase_count: words[2],
        }
    }

    pub fn to_words(&self) -> [u32; 3] {
        [self.time_between_sends, self.initial_offset, self.phase_count]
    }

    /// Send offset for a given phase
    pub fn offset(&self, phase: u32) -> u32 {
        let phase = match self.phase_count {
            0 => phase,
            count => phase % count,
        };
        self.initial_offset
            .saturating_add(phase.saturating_mul(self.time_between_sends))
    }
}

/// Phase counter over a schedule; reset at the start of every tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TdmaClock {
    schedule: TdmaSchedule,
    phase: u32,
}

impl TdmaClock {
    pub fn new(schedule: TdmaSchedule) -> Self {
        Self { schedule, phase: 0 }
    }

    pub fn schedule(&self) -> &TdmaSchedule {
        &self.schedule
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0;
    }

    /// Offset for the next send, advancing the phase
    pub fn next_offset(&mut self) -> u32 {
        let offset = self.schedule.offset(self.phase);
        self.phase = self.phase.wrapping_add(1);
        offset
    }
}
