// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recording sink contract
//!
//! The controller drives a sink through a fixed per-tick sequence:
//! `prepare_next_frame` → `record` for every selected (variable, unit) → `capture`.

use super::error::{Result, RuntimeError};
use meanfield_npu_neural::Accum;
use parking_lot::Mutex;
use std::sync::Arc;

/// Where and what to record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingTarget {
    /// Model variable ids to record, in frame order
    pub variables: Vec<usize>,
    /// Keep one frame every `sampling_interval` ticks (>= 1)
    pub sampling_interval: u32,
    /// Bytes available for one frame in the recording region
    pub frame_capacity: usize,
}

impl RecordingTarget {
    /// Record nothing
    pub fn disabled() -> Self {
        Self {
            variables: Vec::new(),
            sampling_interval: 1,
            frame_capacity: 0,
        }
    }

    /// Resolve variable names against the names a model provides
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        available: &[&str],
        sampling_interval: u32,
        frame_capacity: usize,
    ) -> Result<Self> {
        let variables = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                available
                    .iter()
                    .position(|candidate| *candidate == name)
                    .ok_or_else(|| RuntimeError::UnknownVariable(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            variables,
            sampling_interval: sampling_interval.max(1),
            frame_capacity,
        })
    }

    /// Bytes one frame needs for `unit_count` units
    pub fn frame_bytes(&self, unit_count: usize) -> usize {
        self.variables.len() * unit_count * core::mem::size_of::<Accum>()
    }
}

/// Persists selected per-unit variables once per tick
pub trait RecordingSink: Send {
    /// Arm recording for `unit_count` units
    fn initialise(&mut self, target: &RecordingTarget, unit_count: usize) -> Result<()>;

    /// Start a fresh frame (first step of every tick)
    fn prepare_next_frame(&mut self);

    /// Stage one value in the current frame
    fn record(&mut self, variable: usize, unit: usize, value: Accum);

    /// Close the current frame (last step of every tick)
    fn capture(&mut self, tick: u32);

    /// Drop recorded state and re-arm for `unit_count` units
    fn reset(&mut self, unit_count: usize) -> Result<()>;
}

/// A sink shared with the host, so recorded frames can be read while the core owns it
pub type SharedSink<R> = Arc<Mutex<R>>;

impl<R: RecordingSink> RecordingSink for Arc<Mutex<R>> {
    fn initialise(&mut self, target: &RecordingTarget, unit_count: usize) -> Result<()> {
        self.lock().initialise(target, unit_count)
    }

    fn prepare_next_frame(&mut self) {
        self.lock().prepare_next_frame();
    }

    fn record(&mut self, variable: usize, unit: usize, value: Accum) {
        self.lock().record(variable, unit, value);
    }

    fn capture(&mut self, tick: u32) {
        self.lock().capture(tick);
    }

    fn reset(&mut self, unit_count: usize) -> Result<()> {
        self.lock().reset(unit_count)
    }
}
