// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runtime model dispatch
//!
//! Provides `DynamicCore` for selecting the unit model from configuration at runtime, while
//! every variant still runs a monomorphized `TimestepController`.

use crate::controller::{CoreServices, CoreState, TimestepController};
use crate::error::Result;
use crate::parameter_store::BlobHeader;
use crate::stats::TickStats;
use meanfield_npu_neural::{LinearRateModel, MeanFieldModel, ModelVariant};
use meanfield_npu_runtime::{RecordingTarget, RingBuffer, SharedRegion};
use std::sync::Arc;

/// Controller for whichever unit model the configuration names
pub enum DynamicCore {
    /// Mean-field population rate model
    MeanField(TimestepController<MeanFieldModel>),

    /// Linear leaky rate model
    LinearRate(TimestepController<LinearRateModel>),
}

/// Macro for dispatching methods to the correct controller variant (`&self` or `&mut self`)
macro_rules! dispatch {
    ($self:expr, $method:ident($($args:expr),*)) => {
        match $self {
            DynamicCore::MeanField(core) => core.$method($($args),*),
            DynamicCore::LinearRate(core) => core.$method($($args),*),
        }
    };
}

impl DynamicCore {
    pub fn new(variant: ModelVariant, services: CoreServices) -> Self {
        match variant {
            ModelVariant::MeanField => {
                DynamicCore::MeanField(TimestepController::new(MeanFieldModel::new(), services))
            }
            ModelVariant::LinearRate => {
                DynamicCore::LinearRate(TimestepController::new(LinearRateModel::new(), services))
            }
        }
    }

    pub fn variant(&self) -> ModelVariant {
        match self {
            DynamicCore::MeanField(_) => ModelVariant::MeanField,
            DynamicCore::LinearRate(_) => ModelVariant::LinearRate,
        }
    }

    // Lifecycle (delegate to the underlying controller)

    pub fn initialize(&mut self, blob: SharedRegion, target: &RecordingTarget) -> Result<()> {
        dispatch!(self, initialize(blob, target))
    }

    pub fn on_tick(&mut self, tick: u32) -> Result<()> {
        dispatch!(self, on_tick(tick))
    }

    pub fn pause(&mut self) -> Result<()> {
        dispatch!(self, pause())
    }

    pub fn resume(&mut self) -> Result<()> {
        dispatch!(self, resume())
    }

    pub fn record_overrun(&mut self) {
        dispatch!(self, record_overrun())
    }

    /// Resolve variable names for the selected model
    pub fn resolve_recording<S: AsRef<str>>(
        &self,
        names: &[S],
        sampling_interval: u32,
        frame_capacity: usize,
    ) -> Result<RecordingTarget> {
        dispatch!(self, resolve_recording(names, sampling_interval, frame_capacity))
    }

    // Queries

    pub fn state(&self) -> CoreState {
        dispatch!(self, state())
    }

    pub fn stats(&self) -> &TickStats {
        dispatch!(self, stats())
    }

    pub fn time(&self) -> u32 {
        dispatch!(self, time())
    }

    pub fn unit_count(&self) -> usize {
        dispatch!(self, unit_count())
    }

    pub fn header(&self) -> Option<&BlobHeader> {
        dispatch!(self, header())
    }

    pub fn ring_buffer(&self) -> Option<Arc<RingBuffer>> {
        dispatch!(self, ring_buffer())
    }

    pub fn recorded_variables(&self) -> &'static [&'static str] {
        dispatch!(self, recorded_variables())
    }

    pub fn as_mean_field(&self) -> Option<&TimestepController<MeanFieldModel>> {
        match self {
            DynamicCore::MeanField(core) => Some(core),
            _ => None,
        }
    }

    pub fn as_linear_rate(&self) -> Option<&TimestepController<LinearRateModel>> {
        match self {
            DynamicCore::LinearRate(core) => Some(core),
            _ => None,
        }
    }
}

impl std::fmt::Debug for DynamicCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        dispatch!(self, fmt(f))
    }
}
