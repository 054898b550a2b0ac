// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Linear Rate Model
//!
//! Leaky integrator without a transfer function, useful as a baseline and for checking the
//! input pipeline:
//!
//! ```text
//! rate(t+1) = max(0, rate(t) + gain × I_net - leak × rate(t))
//! ```

use super::traits::{UnitParameters, UnitUpdate};
use crate::synapse::SynapseType;
use crate::types::Accum;
use bytemuck::{Pod, Zeroable};

const RECORDED: &[&str] = &["rate"];

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRateModel;

impl LinearRateModel {
    pub fn new() -> Self {
        Self
    }
}

impl UnitUpdate for LinearRateModel {
    type Parameters = LinearRateParameters;

    fn model_name(&self) -> &'static str {
        "Linear leaky rate"
    }

    fn update(&self, params: &mut LinearRateParameters, inputs: &[Accum], _timestep: Accum) {
        let net = inputs
            .iter()
            .enumerate()
            .fold(Accum::ZERO, |acc, (class, &input)| {
                acc.saturating_add(SynapseType::from_class(class).signed(input))
            });
        let leaked = params.leak.saturating_mul(params.rate);
        params.rate = params
            .rate
            .saturating_add(params.gain.saturating_mul(net))
            .saturating_sub(leaked)
            .max(Accum::ZERO);
    }

    /// Silent units send nothing
    fn output(&self, params: &LinearRateParameters) -> Option<Accum> {
        (!params.rate.is_zero()).then_some(params.rate)
    }

    fn recorded_variables(&self) -> &'static [&'static str] {
        RECORDED
    }

    fn recorded_value(&self, params: &LinearRateParameters, variable: usize) -> Accum {
        match variable {
            0 => params.rate,
            _ => Accum::ZERO,
        }
    }
}

/// Linear rate per-unit record (3 words)
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct LinearRateParameters {
    pub rate: Accum,
    /// Fraction of the rate lost per tick (0-1)
    pub leak: Accum,
    pub gain: Accum,
}

impl Default for LinearRateParameters {
    fn default() -> Self {
        Self {
            rate: Accum::ZERO,
            leak: Accum::from_f32(0.1),
            gain: Accum::ONE,
        }
    }
}

impl UnitParameters for LinearRateParameters {
    fn validate(&self) -> Result<(), &'static str> {
        if self.leak.is_negative() || self.leak > Accum::ONE {
            return Err("LinearRate: leak must be in [0, 1]");
        }
        Ok(())
    }
}
