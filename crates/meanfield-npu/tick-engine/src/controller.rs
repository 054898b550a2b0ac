// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Timestep Controller
//!
//! Owns everything a core keeps between ticks and runs the per-tick cycle.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Ready --on_tick--> Running
//!                                 |                  |
//!                                 +------pause-------+--> Suspended --resume--> Ready
//! ```
//!
//! ## Tick Cycle (strict order)
//!
//! 1. `prepare_next_frame` on the recording sink
//! 2. Drain the ring buffer into the input accumulator
//! 3. Update every unit, transmitting outputs on the TDMA schedule and staging recorded values
//! 4. `capture` on the recording sink
//!
//! Every operation completes synchronously. A rejected operation leaves the controller
//! exactly as it was.

use crate::aggregation::drain;
use crate::error::{CoreError, Result};
use crate::fatal::{halt, FatalError};
use crate::parameter_store::{BlobHeader, ParameterStore};
use crate::stats::TickStats;
use crate::tdma::TdmaClock;
use core::fmt;
use meanfield_npu_neural::{
    Accum, SynapticInputs, TickContext, UnitParameterSet, UnitUpdate,
};
use meanfield_npu_runtime::{
    FrameRecorder, NullTransmitter, OutboundEvent, RecordingSink, RecordingTarget, RingBuffer,
    RuntimeError, SharedRegion, StdWorkingMemory, Transmitter, WorkingMemory,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreState {
    Uninitialized,
    Ready,
    Running,
    Suspended,
}

impl fmt::Display for CoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoreState::Uninitialized => "uninitialized",
            CoreState::Ready => "ready",
            CoreState::Running => "running",
            CoreState::Suspended => "suspended",
        };
        f.write_str(name)
    }
}

/// Platform collaborators handed to a controller at construction
pub struct CoreServices {
    pub recorder: Box<dyn RecordingSink>,
    pub transmitter: Arc<dyn Transmitter>,
    pub memory: Box<dyn WorkingMemory>,
    /// Tick duration passed to the unit model (ms)
    pub timestep: Accum,
}

impl CoreServices {
    /// In-memory recorder, no transmission, unlimited working memory, 1 ms ticks
    pub fn host() -> Self {
        Self {
            recorder: Box::new(FrameRecorder::new()),
            transmitter: Arc::new(NullTransmitter),
            memory: Box::new(StdWorkingMemory::new()),
            timestep: Accum::ONE,
        }
    }

    pub fn with_recorder(mut self, recorder: impl RecordingSink + 'static) -> Self {
        self.recorder = Box::new(recorder);
        self
    }

    pub fn with_transmitter(mut self, transmitter: Arc<dyn Transmitter>) -> Self {
        self.transmitter = transmitter;
        self
    }

    pub fn with_memory(mut self, memory: impl WorkingMemory + 'static) -> Self {
        self.memory = Box::new(memory);
        self
    }

    pub fn with_timestep(mut self, timestep: Accum) -> Self {
        self.timestep = timestep;
        self
    }
}

/// State that exists only between a successful `initialize` and the end of the run
struct LoadedCore<P> {
    header: BlobHeader,
    store: ParameterStore,
    params: UnitParameterSet<P>,
    scaling: Arc<[u32]>,
    ring: Arc<RingBuffer>,
    inputs: SynapticInputs,
    reserved_bytes: usize,
}

/// Tick-driven orchestrator for one core
pub struct TimestepController<M: UnitUpdate> {
    model: M,
    state: CoreState,
    core: Option<LoadedCore<M::Parameters>>,
    tdma: TdmaClock,
    recorded: Vec<usize>,
    recorder: Box<dyn RecordingSink>,
    transmitter: Arc<dyn Transmitter>,
    memory: Box<dyn WorkingMemory>,
    timestep: Accum,
    time: u32,
    stats: TickStats,
}

impl<M: UnitUpdate> TimestepController<M> {
    pub fn new(model: M, services: CoreServices) -> Self {
        Self {
            model,
            state: CoreState::Uninitialized,
            core: None,
            tdma: TdmaClock::default(),
            recorded: Vec::new(),
            recorder: services.recorder,
            transmitter: services.transmitter,
            memory: services.memory,
            timestep: services.timestep,
            time: 0,
            stats: TickStats::new(),
        }
    }

    fn expect_state(&self, operation: &'static str, allowed: &[CoreState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    fn reserve_or_halt(&mut self, bytes: usize, purpose: &'static str, reserved: &mut usize) {
        if let Err(e) = self.memory.reserve(bytes, purpose) {
            halt(FatalError::Allocation(e));
        }
        *reserved += bytes;
    }

    /// Resolve recording variable names against this controller's model
    pub fn resolve_recording<S: AsRef<str>>(
        &self,
        names: &[S],
        sampling_interval: u32,
        frame_capacity: usize,
    ) -> Result<RecordingTarget> {
        RecordingTarget::from_names(
            names,
            self.model.recorded_variables(),
            sampling_interval,
            frame_capacity,
        )
        .map_err(CoreError::Recording)
    }

    /// Load the blob and arm recording: Uninitialized → Ready
    ///
    /// A malformed blob or a recording failure is returned and leaves the controller
    /// uninitialized. Running out of working memory halts the core; nothing loaded up to
    /// that point becomes visible.
    pub fn initialize(&mut self, blob: SharedRegion, target: &RecordingTarget) -> Result<()> {
        self.expect_state("initialize", &[CoreState::Uninitialized])?;

        let variable_count = self.model.recorded_variables().len();
        if let Some(&bad) = target.variables.iter().find(|&&v| v >= variable_count) {
            return Err(CoreError::Recording(RuntimeError::UnknownVariable(format!(
                "variable id {}",
                bad
            ))));
        }

        // TDMA schedule, transmission identity and scaling exponents all come from the header
        let (header, exponents) = {
            let words = blob.read();
            let header = BlobHeader::parse(&words)?;
            let exponents = header.scaling_exponents(&words).to_vec();
            (header, exponents)
        };
        // Every reservation below is sized from the header, so the header must match the blob
        let store = ParameterStore::new(blob, &header);
        store.check_unit_array::<M::Parameters>()?;
        if header.identity.has_key {
            info!(target: "meanfield-tick-engine", "[CORE] Transmitting with key {:#010x}", header.identity.key);
        } else {
            info!(target: "meanfield-tick-engine", "[CORE] No routing key, core will not transmit");
        }

        let mut reserved = 0;
        self.reserve_or_halt(
            exponents.len() * core::mem::size_of::<u32>(),
            "scaling table",
            &mut reserved,
        );
        let scaling: Arc<[u32]> = exponents.into();

        self.reserve_or_halt(
            UnitParameterSet::<M::Parameters>::bytes_for(header.unit_count),
            "unit parameters",
            &mut reserved,
        );
        let params = match store.load::<M::Parameters>() {
            Ok(params) => params,
            Err(e) => {
                self.memory.release(reserved);
                return Err(e);
            }
        };

        self.reserve_or_halt(
            RingBuffer::bytes_for(header.class_count, header.unit_count_padded),
            "ring buffer",
            &mut reserved,
        );
        let ring = Arc::new(RingBuffer::new(header.class_count, header.unit_count_padded));

        self.reserve_or_halt(
            SynapticInputs::bytes_for(header.class_count, header.unit_count),
            "input accumulator",
            &mut reserved,
        );
        let inputs = SynapticInputs::new(header.class_count, header.unit_count);

        if let Err(e) = self.recorder.initialise(target, header.unit_count) {
            self.memory.release(reserved);
            return Err(CoreError::Recording(e));
        }

        info!(
            target: "meanfield-tick-engine",
            "[CORE] Initialized {}: {} units (padded {}), {} event classes, {} bytes reserved",
            self.model.model_name(),
            header.unit_count,
            header.unit_count_padded,
            header.class_count,
            reserved
        );

        self.tdma = TdmaClock::new(header.tdma);
        self.recorded = target.variables.clone();
        self.core = Some(LoadedCore {
            header,
            store,
            params,
            scaling,
            ring,
            inputs,
            reserved_bytes: reserved,
        });
        self.state = CoreState::Ready;
        Ok(())
    }

    /// Run one tick: Ready/Running → Running
    pub fn on_tick(&mut self, tick: u32) -> Result<()> {
        self.expect_state("tick", &[CoreState::Ready, CoreState::Running])?;
        let Some(core) = self.core.as_mut() else {
            return Err(CoreError::InvalidTransition {
                operation: "tick",
                state: self.state,
            });
        };
        if self.state == CoreState::Ready {
            info!(target: "meanfield-tick-engine", "[CORE] Running from tick {}", tick);
            self.state = CoreState::Running;
        }

        let ctx = TickContext {
            tick,
            time: self.time,
            unit_count: core.header.unit_count,
            unit_count_padded: core.header.unit_count_padded,
            class_count: core.header.class_count,
        };

        self.recorder.prepare_next_frame();
        self.tdma.reset_phase();

        core.inputs.clear();
        let report = drain(&core.ring, &core.scaling, &ctx, &mut core.inputs);
        self.stats.record_drain(&report);

        for (unit, params) in core.params.as_mut_slice().iter_mut().enumerate() {
            self.model.update(params, core.inputs.for_unit(unit), self.timestep);

            if let Some(key) = core.header.identity.key_for(unit) {
                if let Some(output) = self.model.output(params) {
                    let offset = self.tdma.next_offset();
                    self.transmitter.send(OutboundEvent::new(key, output, offset));
                    self.stats.record_send(offset);
                }
            }

            for &variable in &self.recorded {
                self.recorder
                    .record(variable, unit, self.model.recorded_value(params, variable));
            }
        }

        self.recorder.capture(tick);
        self.time = self.time.wrapping_add(1);
        self.stats.ticks += 1;
        Ok(())
    }

    /// Write unit state back to the blob: Ready/Running → Suspended
    ///
    /// Weights still in the ring buffer stay there and are discarded on `resume`.
    pub fn pause(&mut self) -> Result<()> {
        self.expect_state("pause", &[CoreState::Ready, CoreState::Running])?;
        let Some(core) = self.core.as_ref() else {
            return Err(CoreError::InvalidTransition {
                operation: "pause",
                state: self.state,
            });
        };
        core.store.store(&core.params);
        self.state = CoreState::Suspended;
        info!(target: "meanfield-tick-engine", "[CORE] Suspended at time {}", self.time);
        Ok(())
    }

    /// Reset recording and reload unit state from the blob: Suspended → Ready
    pub fn resume(&mut self) -> Result<()> {
        self.expect_state("resume", &[CoreState::Suspended])?;
        let Some(core) = self.core.as_mut() else {
            return Err(CoreError::InvalidTransition {
                operation: "resume",
                state: self.state,
            });
        };

        let params = core.store.load::<M::Parameters>()?;
        self.recorder
            .reset(core.header.unit_count)
            .map_err(CoreError::Recording)?;

        core.params = params;
        core.ring.clear();
        core.inputs.clear();
        self.state = CoreState::Ready;
        debug!(target: "meanfield-tick-engine", "[CORE] Reloaded {} unit records", core.params.len());
        info!(target: "meanfield-tick-engine", "[CORE] Resumed at time {}", self.time);
        Ok(())
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Unit records, once initialized
    pub fn parameters(&self) -> Option<&UnitParameterSet<M::Parameters>> {
        self.core.as_ref().map(|core| &core.params)
    }

    /// Handle for event producers
    pub fn ring_buffer(&self) -> Option<Arc<RingBuffer>> {
        self.core.as_ref().map(|core| Arc::clone(&core.ring))
    }

    pub fn scaling_table(&self) -> Option<&[u32]> {
        self.core.as_ref().map(|core| &core.scaling[..])
    }

    pub fn header(&self) -> Option<&BlobHeader> {
        self.core.as_ref().map(|core| &core.header)
    }

    pub fn unit_count(&self) -> usize {
        self.core.as_ref().map_or(0, |core| core.header.unit_count)
    }

    /// Working-memory bytes held by the loaded core
    pub fn reserved_bytes(&self) -> usize {
        self.core.as_ref().map_or(0, |core| core.reserved_bytes)
    }

    /// Ticks completed since initialization
    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Count a tick that ran past its deadline
    pub fn record_overrun(&mut self) {
        self.stats.overruns += 1;
    }

    pub fn recorded_variables(&self) -> &'static [&'static str] {
        self.model.recorded_variables()
    }
}

impl<M: UnitUpdate> fmt::Debug for TimestepController<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestepController")
            .field("model", &self.model.model_name())
            .field("state", &self.state)
            .field("units", &self.unit_count())
            .field("time", &self.time)
            .finish()
    }
}
