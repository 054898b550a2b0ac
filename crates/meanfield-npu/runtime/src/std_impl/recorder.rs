// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! In-memory frame recorder
//!
//! Keeps every captured frame on the heap. A frame holds one value per selected variable
//! per unit, laid out variable-major.

use crate::traits::{RecordingSink, RecordingTarget, Result, RuntimeError};
use meanfield_npu_neural::Accum;
use tracing::debug;

/// One captured tick
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tick: u32,
    /// `values[slot * unit_count + unit]`, slot = position in the recorded variable list
    pub values: Vec<Accum>,
}

/// Recording sink that keeps frames in memory
#[derive(Debug, Default)]
pub struct FrameRecorder {
    target: Option<RecordingTarget>,
    unit_count: usize,
    staging: Vec<Accum>,
    frames: Vec<Frame>,
    prepared: u64,
    recorded: u64,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Remove and return all captured frames
    pub fn take_frames(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.frames)
    }

    /// Number of `prepare_next_frame` calls since the last initialise/reset
    pub fn frames_prepared(&self) -> u64 {
        self.prepared
    }

    /// Number of `record` calls accepted since the last initialise/reset
    pub fn values_recorded(&self) -> u64 {
        self.recorded
    }

    pub fn is_armed(&self) -> bool {
        self.target.is_some()
    }

    /// Frame value for one (variable id, unit), if that variable is recorded
    pub fn value(&self, frame: &Frame, variable: usize, unit: usize) -> Option<Accum> {
        let slot = self.slot_of(variable)?;
        frame.values.get(slot * self.unit_count + unit).copied()
    }

    fn slot_of(&self, variable: usize) -> Option<usize> {
        self.target
            .as_ref()?
            .variables
            .iter()
            .position(|&v| v == variable)
    }

    fn arm(&mut self, unit_count: usize) -> Result<()> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| RuntimeError::Recording("recorder was never initialised".to_string()))?;
        let needed = target.frame_bytes(unit_count);
        if needed > target.frame_capacity {
            return Err(RuntimeError::Recording(format!(
                "frame needs {} bytes for {} units, region holds {}",
                needed, unit_count, target.frame_capacity
            )));
        }
        self.unit_count = unit_count;
        self.staging = vec![Accum::ZERO; target.variables.len() * unit_count];
        self.frames.clear();
        self.prepared = 0;
        self.recorded = 0;
        Ok(())
    }
}

impl RecordingSink for FrameRecorder {
    fn initialise(&mut self, target: &RecordingTarget, unit_count: usize) -> Result<()> {
        let previous = self.target.replace(target.clone());
        if let Err(e) = self.arm(unit_count) {
            self.target = previous;
            return Err(e);
        }
        debug!(target: "meanfield-runtime", "[RECORDING] Armed {} variables for {} units", target.variables.len(), unit_count);
        Ok(())
    }

    fn prepare_next_frame(&mut self) {
        self.staging.fill(Accum::ZERO);
        self.prepared += 1;
    }

    fn record(&mut self, variable: usize, unit: usize, value: Accum) {
        if unit >= self.unit_count {
            return;
        }
        if let Some(slot) = self.slot_of(variable) {
            self.staging[slot * self.unit_count + unit] = value;
            self.recorded += 1;
        }
    }

    fn capture(&mut self, tick: u32) {
        let Some(target) = self.target.as_ref() else {
            return;
        };
        if tick % target.sampling_interval.max(1) == 0 && !self.staging.is_empty() {
            self.frames.push(Frame {
                tick,
                values: self.staging.clone(),
            });
        }
    }

    fn reset(&mut self, unit_count: usize) -> Result<()> {
        self.arm(unit_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(variables: Vec<usize>, sampling_interval: u32, frame_capacity: usize) -> RecordingTarget {
        RecordingTarget {
            variables,
            sampling_interval,
            frame_capacity,
        }
    }

    #[test]
    fn test_records_selected_variables_only() {
        let mut recorder = FrameRecorder::new();
        recorder.initialise(&target(vec![1], 1, 1024), 2).unwrap();

        recorder.prepare_next_frame();
        recorder.record(0, 0, Accum::from_int(9));
        recorder.record(1, 0, Accum::from_int(3));
        recorder.record(1, 1, Accum::from_int(4));
        recorder.capture(0);

        let frame = &recorder.frames()[0];
        assert_eq!(frame.values, vec![Accum::from_int(3), Accum::from_int(4)]);
        assert_eq!(recorder.value(frame, 1, 1), Some(Accum::from_int(4)));
        assert_eq!(recorder.value(frame, 0, 0), None);
        assert_eq!(recorder.values_recorded(), 2);
    }

    #[test]
    fn test_sampling_interval() {
        let mut recorder = FrameRecorder::new();
        recorder.initialise(&target(vec![0], 3, 1024), 1).unwrap();
        for tick in 0..7 {
            recorder.prepare_next_frame();
            recorder.record(0, 0, Accum::ONE);
            recorder.capture(tick);
        }
        let ticks: Vec<u32> = recorder.frames().iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![0, 3, 6]);
        assert_eq!(recorder.frames_prepared(), 7);
    }

    #[test]
    fn test_capacity_too_small_is_recoverable() {
        let mut recorder = FrameRecorder::new();
        let err = recorder.initialise(&target(vec![0, 1], 1, 15), 2).unwrap_err();
        assert!(matches!(err, RuntimeError::Recording(_)));
        assert!(!recorder.is_armed());

        recorder.initialise(&target(vec![0, 1], 1, 16), 2).unwrap();
        assert!(recorder.is_armed());
    }

    #[test]
    fn test_reset_clears_frames() {
        let mut recorder = FrameRecorder::new();
        assert!(recorder.reset(1).is_err());

        recorder.initialise(&target(vec![0], 1, 64), 4).unwrap();
        recorder.prepare_next_frame();
        recorder.capture(0);
        assert_eq!(recorder.frames().len(), 1);

        recorder.reset(4).unwrap();
        assert!(recorder.frames().is_empty());
        assert_eq!(recorder.frames_prepared(), 0);
        assert!(recorder.reset(100).is_err());
    }
}
