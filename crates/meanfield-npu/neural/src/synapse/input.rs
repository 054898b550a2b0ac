// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Per-tick synaptic input accumulation
//!
//! The aggregator hands every converted ring buffer entry to an [`InputSink`]. The standard
//! sink, [`SynapticInputs`], keeps one `Accum` per (unit, class) and is what the unit models
//! read during the update pass.

use crate::types::{Accum, NeuralError, Result};

/// Event class polarity (excitatory or inhibitory)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynapseType {
    Excitatory = 0,
    Inhibitory = 1,
}

impl SynapseType {
    /// Class 0 is excitatory, every other class inhibitory
    #[inline]
    pub fn from_class(class: usize) -> Self {
        if class == 0 {
            SynapseType::Excitatory
        } else {
            SynapseType::Inhibitory
        }
    }

    /// Apply this polarity to an input
    #[inline]
    pub fn signed(self, input: Accum) -> Accum {
        match self {
            SynapseType::Excitatory => input,
            SynapseType::Inhibitory => input.saturating_neg(),
        }
    }
}

/// Receiver of converted inputs, one call per delivered (class, unit) slot
pub trait InputSink {
    /// Number of units this sink can address
    fn unit_count(&self) -> usize;

    fn add_input(&mut self, class: usize, unit: usize, input: Accum);
}

/// Dense (unit, class) input accumulator
///
/// Layout is unit-major so a model sees all classes of one unit as a contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct SynapticInputs {
    class_count: usize,
    unit_count: usize,
    values: Vec<Accum>,
}

impl SynapticInputs {
    pub fn new(class_count: usize, unit_count: usize) -> Self {
        Self {
            class_count,
            unit_count,
            values: vec![Accum::ZERO; class_count * unit_count],
        }
    }

    /// Working-memory footprint for the given shape
    pub fn bytes_for(class_count: usize, unit_count: usize) -> usize {
        class_count * unit_count * core::mem::size_of::<Accum>()
    }

    pub fn class_count(&self) -> usize {
        self.class_count
    }

    pub fn unit_count(&self) -> usize {
        self.unit_count
    }

    /// All class inputs for one unit
    pub fn for_unit(&self, unit: usize) -> &[Accum] {
        let start = unit * self.class_count;
        &self.values[start..start + self.class_count]
    }

    /// Checked read of a single entry
    pub fn get(&self, class: usize, unit: usize) -> Result<Accum> {
        if unit >= self.unit_count {
            return Err(NeuralError::UnitOutOfRange {
                unit,
                unit_count: self.unit_count,
            });
        }
        if class >= self.class_count {
            return Err(NeuralError::ClassOutOfRange {
                class,
                class_count: self.class_count,
            });
        }
        Ok(self.values[unit * self.class_count + class])
    }

    /// Polarity-weighted sum over classes for one unit
    pub fn net_input(&self, unit: usize) -> Accum {
        self.for_unit(unit)
            .iter()
            .enumerate()
            .fold(Accum::ZERO, |acc, (class, &input)| {
                acc.saturating_add(SynapseType::from_class(class).signed(input))
            })
    }

    /// Zero every entry (start of a new tick)
    pub fn clear(&mut self) {
        self.values.fill(Accum::ZERO);
    }
}

impl InputSink for SynapticInputs {
    fn unit_count(&self) -> usize {
        self.unit_count
    }

    #[inline]
    fn add_input(&mut self, class: usize, unit: usize, input: Accum) {
        let idx = unit * self.class_count + class;
        self.values[idx] = self.values[idx].saturating_add(input);
    }
}
