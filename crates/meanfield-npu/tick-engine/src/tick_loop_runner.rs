// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Tick Loop Runner
//!
//! Drives a [`DynamicCore`] from a dedicated thread at a fixed tick period.
//!
//! ## Design
//! - One `on_tick` per period, numbered from 0
//! - A tick that takes longer than the period is counted as an overrun; the next tick starts
//!   immediately
//! - Sleep is chunked so `stop` is honoured within ~50ms
//! - A period of zero runs ticks back to back
//!
//! Hosts that still need to pause or inspect the core lock it through [`TickLoopRunner::core`].

use crate::dynamic_core::DynamicCore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const MAX_SLEEP_CHUNK: Duration = Duration::from_millis(50);

/// Background thread that ticks one core
pub struct TickLoopRunner {
    core: Arc<Mutex<DynamicCore>>,
    period: Duration,
    max_ticks: Option<u64>,
    running: Arc<AtomicBool>,
    tick_count: Arc<AtomicU64>,
    overruns: Arc<AtomicU64>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl TickLoopRunner {
    pub fn new(core: Arc<Mutex<DynamicCore>>, period: Duration) -> Self {
        Self {
            core,
            period,
            max_ticks: None,
            running: Arc::new(AtomicBool::new(false)),
            tick_count: Arc::new(AtomicU64::new(0)),
            overruns: Arc::new(AtomicU64::new(0)),
            thread_handle: None,
        }
    }

    /// Stop by itself after this many ticks
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Start the tick loop in a background thread
    pub fn start(&mut self) -> Result<(), String> {
        if self.running.load(Ordering::Acquire) {
            return Err("Tick loop already running".to_string());
        }
        // Reap a loop that finished on its own
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }

        info!(
            target: "meanfield-tick-engine",
            "[TICK-LOOP] Starting tick loop with period {:?}{}",
            self.period,
            self.max_ticks
                .map(|n| format!(" for {} ticks", n))
                .unwrap_or_default()
        );
        self.running.store(true, Ordering::Release);

        let core = self.core.clone();
        let running = self.running.clone();
        let tick_count = self.tick_count.clone();
        let overruns = self.overruns.clone();
        let period = self.period;
        let max_ticks = self.max_ticks;

        let spawned = thread::Builder::new()
            .name("meanfield-tick-loop".to_string())
            .spawn(move || {
                tick_loop(core, period, max_ticks, running, tick_count, overruns);
            });
        match spawned {
            Ok(handle) => {
                self.thread_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(format!("Failed to spawn tick loop thread: {}", e))
            }
        }
    }

    /// Ask the loop to finish and wait for it
    pub fn stop(&mut self) {
        if self.running.swap(false, Ordering::AcqRel) {
            info!(target: "meanfield-tick-engine", "[TICK-LOOP] Stopping tick loop...");
        }
        self.join();
    }

    /// Wait for the loop thread to exit without asking it to
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!(target: "meanfield-tick-engine", "[TICK-LOOP] Tick loop thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ticks completed by this runner (lock-free)
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn core(&self) -> Arc<Mutex<DynamicCore>> {
        self.core.clone()
    }
}

impl Drop for TickLoopRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn tick_loop(
    core: Arc<Mutex<DynamicCore>>,
    period: Duration,
    max_ticks: Option<u64>,
    running: Arc<AtomicBool>,
    tick_count: Arc<AtomicU64>,
    overruns: Arc<AtomicU64>,
) {
    while running.load(Ordering::Acquire) {
        let tick = tick_count.load(Ordering::Relaxed);
        if max_ticks.is_some_and(|max| tick >= max) {
            break;
        }
        let tick_start = Instant::now();

        {
            let mut core = core.lock();
            if let Err(e) = core.on_tick(tick as u32) {
                warn!(target: "meanfield-tick-engine", "[TICK-LOOP] Tick {} rejected, stopping: {}", tick, e);
                break;
            }
            let elapsed = tick_start.elapsed();
            if !period.is_zero() && elapsed > period {
                core.record_overrun();
                overruns.fetch_add(1, Ordering::Relaxed);
                warn!(
                    target: "meanfield-tick-engine",
                    "[TICK-LOOP] Tick {} overran its period: {:.3}ms > {:.3}ms",
                    tick,
                    elapsed.as_secs_f64() * 1000.0,
                    period.as_secs_f64() * 1000.0
                );
            }
        }
        tick_count.store(tick + 1, Ordering::Relaxed);

        // Chunked sleep until the next deadline
        let deadline = tick_start + period;
        loop {
            if !running.load(Ordering::Acquire) {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(MAX_SLEEP_CHUNK));
        }
    }

    running.store(false, Ordering::Release);
    debug!(
        target: "meanfield-tick-engine",
        "[TICK-LOOP] Loop exited after {} ticks",
        tick_count.load(Ordering::Relaxed)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{CoreServices, CoreState};
    use crate::parameter_store::BlobBuilder;
    use meanfield_npu_neural::{LinearRateParameters, ModelVariant};
    use meanfield_npu_runtime::RecordingTarget;

    fn ready_core() -> Arc<Mutex<DynamicCore>> {
        let mut core = DynamicCore::new(ModelVariant::LinearRate, CoreServices::host());
        let blob = BlobBuilder::new(vec![LinearRateParameters::default(); 4])
            .scaling_exponents(vec![0])
            .build_region()
            .unwrap();
        core.initialize(blob, &RecordingTarget::disabled()).unwrap();
        Arc::new(Mutex::new(core))
    }

    #[test]
    fn test_runs_bounded_ticks() {
        let core = ready_core();
        let mut runner = TickLoopRunner::new(core.clone(), Duration::ZERO).with_max_ticks(25);
        runner.start().unwrap();
        runner.join();

        assert!(!runner.is_running());
        assert_eq!(runner.tick_count(), 25);
        assert_eq!(core.lock().time(), 25);
        assert_eq!(core.lock().state(), CoreState::Running);
    }

    #[test]
    fn test_start_twice_rejected() {
        let mut runner = TickLoopRunner::new(ready_core(), Duration::from_millis(20));
        runner.start().unwrap();
        assert!(runner.start().is_err());
        runner.stop();
        assert!(!runner.is_running());
    }

    #[test]
    fn test_rejected_tick_stops_loop() {
        let core = Arc::new(Mutex::new(DynamicCore::new(
            ModelVariant::MeanField,
            CoreServices::host(),
        )));
        let mut runner = TickLoopRunner::new(core, Duration::ZERO);
        runner.start().unwrap();
        runner.join();
        assert_eq!(runner.tick_count(), 0);
        assert!(!runner.is_running());
    }

    #[test]
    fn test_paused_core_stops_loop() {
        let core = ready_core();
        core.lock().pause().unwrap();
        let mut runner = TickLoopRunner::new(core.clone(), Duration::ZERO).with_max_ticks(10);
        runner.start().unwrap();
        runner.join();
        assert_eq!(runner.tick_count(), 0);
        assert_eq!(core.lock().state(), CoreState::Suspended);
    }
}
