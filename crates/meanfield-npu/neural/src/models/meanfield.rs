// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Mean-Field Rate Model
//!
//! Each unit stands for a population and carries its mean firing rate.
//!
//! ## Model Dynamics
//!
//! ```text
//! Mean input:
//!     μ = drive + I_exc - Σ I_inh
//!
//!     Where:
//!     - I_exc = aggregated input of class 0
//!     - I_inh = aggregated inputs of classes 1..n
//!
//! Transfer function:
//!     F(μ) = max_rate × ½ × erfc((threshold - μ) / (σ × √2))
//!
//!     σ = 0 degenerates to a step at the threshold.
//!
//! Rate update (first order, dt = tick duration):
//!     rate(t+1) = rate(t) + min(dt/τ, 1) × (F(μ) - rate(t))
//!
//!     τ = 0 makes the rate follow F(μ) instantly.
//! ```

use super::traits::{UnitParameters, UnitUpdate};
use crate::math::{erfc, SQRT_2};
use crate::synapse::SynapseType;
use crate::types::Accum;
use bytemuck::{Pod, Zeroable};

const RECORDED: &[&str] = &["rate", "mu"];

/// Variable id of the population rate
pub const VAR_RATE: usize = 0;
/// Variable id of the mean input of the last update
pub const VAR_MU: usize = 1;

/// Mean-field population model
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanFieldModel;

impl MeanFieldModel {
    pub fn new() -> Self {
        Self
    }

    /// Mean input seen by one unit
    #[inline]
    pub fn mean_input(params: &MeanFieldParameters, inputs: &[Accum]) -> Accum {
        inputs
            .iter()
            .enumerate()
            .fold(params.drive, |mu, (class, &input)| {
                mu.saturating_add(SynapseType::from_class(class).signed(input))
            })
    }

    /// Population transfer function F(μ)
    pub fn transfer(params: &MeanFieldParameters, mu: Accum) -> Accum {
        if params.sigma.is_zero() {
            return match mu.cmp(&params.threshold) {
                core::cmp::Ordering::Greater => params.max_rate,
                core::cmp::Ordering::Equal => params.max_rate.saturating_mul(Accum::HALF),
                core::cmp::Ordering::Less => Accum::ZERO,
            };
        }
        let scaled = (params.threshold.to_f64() - mu.to_f64()) / (params.sigma.to_f64() * SQRT_2);
        params
            .max_rate
            .saturating_mul(Accum::HALF)
            .saturating_mul(erfc(Accum::from_f64(scaled)))
    }
}

impl UnitUpdate for MeanFieldModel {
    type Parameters = MeanFieldParameters;

    fn model_name(&self) -> &'static str {
        "Mean-field rate population"
    }

    fn update(&self, params: &mut MeanFieldParameters, inputs: &[Accum], timestep: Accum) {
        let mu = Self::mean_input(params, inputs);
        let target = Self::transfer(params, mu);

        let step = params
            .tau
            .is_zero()
            .then_some(Accum::ONE)
            .or_else(|| timestep.checked_div(params.tau))
            .unwrap_or(Accum::ONE)
            .min(Accum::ONE);

        params.mu = mu;
        params.rate = params
            .rate
            .saturating_add(step.saturating_mul(target.saturating_sub(params.rate)));
    }

    fn output(&self, params: &MeanFieldParameters) -> Option<Accum> {
        Some(params.rate)
    }

    fn recorded_variables(&self) -> &'static [&'static str] {
        RECORDED
    }

    fn recorded_value(&self, params: &MeanFieldParameters, variable: usize) -> Accum {
        match variable {
            VAR_RATE => params.rate,
            VAR_MU => params.mu,
            _ => Accum::ZERO,
        }
    }
}

/// Mean-field per-unit record (7 words)
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct MeanFieldParameters {
    /// Population rate (Hz)
    pub rate: Accum,
    /// Mean input of the last update
    pub mu: Accum,
    /// Constant external drive
    pub drive: Accum,
    /// Rate time constant (ms)
    pub tau: Accum,
    /// Input at which the population fires at half its maximum rate
    pub threshold: Accum,
    /// Input spread across the population
    pub sigma: Accum,
    /// Saturation rate (Hz)
    pub max_rate: Accum,
}

impl MeanFieldParameters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for MeanFieldParameters {
    fn default() -> Self {
        Self {
            rate: Accum::ZERO,
            mu: Accum::ZERO,
            drive: Accum::ZERO,
            tau: Accum::from_int(10),
            threshold: Accum::ONE,
            sigma: Accum::ONE,
            max_rate: Accum::from_int(100),
        }
    }
}

impl UnitParameters for MeanFieldParameters {
    fn validate(&self) -> Result<(), &'static str> {
        if self.tau.is_negative() {
            return Err("MeanField: tau must be >= 0");
        }
        if self.sigma.is_negative() {
            return Err("MeanField: sigma must be >= 0");
        }
        if self.max_rate.is_negative() {
            return Err("MeanField: max_rate must be >= 0");
        }
        Ok(())
    }
}
