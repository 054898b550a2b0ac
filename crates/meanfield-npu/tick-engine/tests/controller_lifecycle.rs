// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Integration Tests: Controller Lifecycle
//!
//! End-to-end tests through the public controller API:
//! - Blob loading → ticks → recorded frames
//! - Consume-and-clear of the ring buffer
//! - Padding slots never reach a unit
//! - Pause/resume write-back and reload
//! - Transmission keys and TDMA offsets
//! - Allocation failure halts without exposing partial state

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use meanfield_npu_neural::{
    Accum, LinearRateModel, LinearRateParameters, MeanFieldModel, MeanFieldParameters,
};
use meanfield_npu_runtime::{
    CollectingTransmitter, FrameRecorder, RecordingTarget, SharedRegion, SharedSink,
    StdWorkingMemory,
};
use meanfield_npu_tick_engine::{
    BlobBuilder, CoreError, CoreServices, CoreState, TdmaSchedule, TimestepController,
};
use parking_lot::Mutex;

// ═══════════════════════════════════════════════════════════
// Helper Functions
// ═══════════════════════════════════════════════════════════

/// Integrator units: no leak, unit gain, so the rate is the running sum of inputs
fn integrators(n: usize) -> Vec<LinearRateParameters> {
    vec![
        LinearRateParameters {
            rate: Accum::ZERO,
            leak: Accum::ZERO,
            gain: Accum::ONE,
        };
        n
    ]
}

fn record_rate() -> RecordingTarget {
    RecordingTarget {
        variables: vec![0],
        sampling_interval: 1,
        frame_capacity: 1024,
    }
}

fn recording_controller(
    blob: SharedRegion,
) -> (TimestepController<LinearRateModel>, SharedSink<FrameRecorder>) {
    let recorder: SharedSink<FrameRecorder> = Arc::new(Mutex::new(FrameRecorder::new()));
    let mut controller = TimestepController::new(
        LinearRateModel::new(),
        CoreServices::host().with_recorder(recorder.clone()),
    );
    controller.initialize(blob, &record_rate()).unwrap();
    (controller, recorder)
}

fn rates(controller: &TimestepController<LinearRateModel>) -> Vec<Accum> {
    controller
        .parameters()
        .unwrap()
        .iter()
        .map(|p| p.rate)
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Aggregation through the controller
// ═══════════════════════════════════════════════════════════

#[test]
fn test_single_weight_reaches_one_unit() {
    // 3 units, 1 class with shift 2: a weight of 16 on unit 1 is an input of 4.0
    let blob = BlobBuilder::new(integrators(3))
        .scaling_exponents(vec![2])
        .build_region()
        .unwrap();
    let (mut controller, recorder) = recording_controller(blob);
    let ring = controller.ring_buffer().unwrap();

    ring.deposit(0, 1, 16).unwrap();
    controller.on_tick(0).unwrap();

    assert_eq!(rates(&controller), vec![Accum::ZERO, Accum::from_int(4), Accum::ZERO]);
    assert!(ring.is_empty());

    let recorder = recorder.lock();
    assert_eq!(recorder.frames().len(), 1);
    let frame = &recorder.frames()[0];
    assert_eq!(frame.tick, 0);
    assert_eq!(recorder.value(frame, 0, 1), Some(Accum::from_int(4)));
    assert_eq!(recorder.value(frame, 0, 0), Some(Accum::ZERO));
}

#[test]
fn test_weights_are_consumed_once() {
    let blob = BlobBuilder::new(integrators(3))
        .scaling_exponents(vec![2])
        .build_region()
        .unwrap();
    let (mut controller, _recorder) = recording_controller(blob);
    let ring = controller.ring_buffer().unwrap();

    ring.deposit(0, 1, 16).unwrap();
    controller.on_tick(0).unwrap();
    controller.on_tick(1).unwrap();
    controller.on_tick(2).unwrap();

    // Integrators would read 12.0 if the weight were delivered every tick
    assert_eq!(rates(&controller)[1], Accum::from_int(4));
    assert_eq!(controller.stats().inputs_delivered, 1);
}

#[test]
fn test_deposits_accumulate_within_a_tick() {
    let blob = BlobBuilder::new(integrators(2))
        .scaling_exponents(vec![0, 0])
        .build_region()
        .unwrap();
    let (mut controller, _recorder) = recording_controller(blob);
    let ring = controller.ring_buffer().unwrap();

    ring.deposit(0, 0, 3).unwrap();
    ring.deposit(0, 0, 2).unwrap();
    ring.deposit(1, 0, 1).unwrap();
    controller.on_tick(0).unwrap();

    // Class 1 is inhibitory
    assert_eq!(rates(&controller)[0], Accum::from_int(4));
}

#[test]
fn test_padding_slots_never_reach_units() {
    let blob = BlobBuilder::new(integrators(3))
        .scaling_exponents(vec![0])
        .unit_count_padded(8)
        .build_region()
        .unwrap();
    let (mut controller, _recorder) = recording_controller(blob);
    let ring = controller.ring_buffer().unwrap();

    for unit in 3..8 {
        ring.deposit(0, unit, 100).unwrap();
    }
    controller.on_tick(0).unwrap();

    assert!(rates(&controller).iter().all(|r| r.is_zero()));
    assert!(ring.is_empty());
    assert_eq!(controller.stats().padding_skipped, 5);
    assert_eq!(controller.stats().padding_discarded, 5);
}

#[test]
fn test_zero_event_classes() {
    let blob = BlobBuilder::new(integrators(4))
        .scaling_exponents(Vec::new())
        .build_region()
        .unwrap();
    let (mut controller, recorder) = recording_controller(blob);

    controller.on_tick(0).unwrap();
    controller.on_tick(1).unwrap();

    assert_eq!(controller.ring_buffer().unwrap().len(), 0);
    assert_eq!(controller.stats().inputs_delivered, 0);
    assert_eq!(rates(&controller), vec![Accum::ZERO; 4]);
    assert_eq!(recorder.lock().frames().len(), 2);
}

#[test]
fn test_sampling_interval_thins_frames() {
    let blob = BlobBuilder::new(integrators(2))
        .scaling_exponents(vec![0])
        .build_region()
        .unwrap();
    let recorder: SharedSink<FrameRecorder> = Arc::new(Mutex::new(FrameRecorder::new()));
    let mut controller = TimestepController::new(
        LinearRateModel::new(),
        CoreServices::host().with_recorder(recorder.clone()),
    );
    let target = controller.resolve_recording(&["rate"], 3, 64).unwrap();
    controller.initialize(blob, &target).unwrap();

    for tick in 0..7 {
        controller.on_tick(tick).unwrap();
    }
    let ticks: Vec<u32> = recorder.lock().frames().iter().map(|f| f.tick).collect();
    assert_eq!(ticks, vec![0, 3, 6]);
}

#[test]
fn test_frame_larger_than_region_rejected() {
    let blob = BlobBuilder::new(integrators(64))
        .scaling_exponents(vec![0])
        .build_region()
        .unwrap();
    let mut controller = TimestepController::new(LinearRateModel::new(), CoreServices::host());
    let target = RecordingTarget {
        frame_capacity: 16,
        ..record_rate()
    };

    let err = controller.initialize(blob.clone(), &target).unwrap_err();
    assert!(matches!(err, CoreError::Recording(_)));
    assert_eq!(controller.state(), CoreState::Uninitialized);
    assert!(controller.parameters().is_none());

    // A target that fits succeeds on the same controller
    controller.initialize(blob, &record_rate()).unwrap();
    assert_eq!(controller.state(), CoreState::Ready);
}

// ═══════════════════════════════════════════════════════════
// Pause / resume
// ═══════════════════════════════════════════════════════════

#[test]
fn test_pause_writes_back_loadable_state() {
    let blob = BlobBuilder::new(integrators(3))
        .scaling_exponents(vec![1])
        .build_region()
        .unwrap();
    let (mut controller, _recorder) = recording_controller(blob.clone());
    let ring = controller.ring_buffer().unwrap();

    ring.deposit(0, 0, 6).unwrap();
    ring.deposit(0, 2, 10).unwrap();
    controller.on_tick(0).unwrap();
    controller.pause().unwrap();

    // A fresh core loading the written-back blob sees the same unit records
    let (fresh, _) = recording_controller(SharedRegion::new(blob.snapshot()));
    assert_eq!(fresh.parameters(), controller.parameters());
    assert_eq!(rates(&fresh), vec![Accum::from_int(3), Accum::ZERO, Accum::from_int(5)]);
}

#[test]
fn test_pause_resume_without_ticks_is_idempotent() {
    let blob = BlobBuilder::new(integrators(3))
        .scaling_exponents(vec![0])
        .build_region()
        .unwrap();
    let (mut controller, _recorder) = recording_controller(blob.clone());
    let ring = controller.ring_buffer().unwrap();
    ring.deposit(0, 1, 7).unwrap();
    controller.on_tick(0).unwrap();

    controller.pause().unwrap();
    let first = blob.snapshot();
    let params = controller.parameters().cloned();

    controller.resume().unwrap();
    controller.pause().unwrap();
    assert_eq!(blob.snapshot(), first);
    assert_eq!(controller.parameters().cloned(), params);
}

#[test]
fn test_resume_discards_pending_weights_and_frames() {
    let blob = BlobBuilder::new(integrators(2))
        .scaling_exponents(vec![0])
        .build_region()
        .unwrap();
    let (mut controller, recorder) = recording_controller(blob);
    let ring = controller.ring_buffer().unwrap();

    controller.on_tick(0).unwrap();
    controller.pause().unwrap();
    ring.deposit(0, 0, 9).unwrap();
    assert!(controller.on_tick(1).is_err());

    controller.resume().unwrap();
    assert!(ring.is_empty());
    assert!(recorder.lock().frames().is_empty());
    assert_eq!(controller.state(), CoreState::Ready);

    controller.on_tick(1).unwrap();
    assert_eq!(rates(&controller), vec![Accum::ZERO, Accum::ZERO]);
    assert_eq!(controller.state(), CoreState::Running);
}

#[test]
fn test_resume_reloads_edited_blob() {
    let blob = BlobBuilder::new(integrators(2))
        .scaling_exponents(vec![0])
        .build_region()
        .unwrap();
    let (mut controller, _recorder) = recording_controller(blob.clone());
    controller.pause().unwrap();

    // Host edits unit 1's rate in place while suspended
    let header = controller.header().unwrap().clone();
    let rate_word = meanfield_npu_tick_engine::HEADER_WORDS + header.class_count + 3;
    blob.write()[rate_word] = Accum::from_int(2).to_bits() as u32;

    controller.resume().unwrap();
    assert_eq!(rates(&controller), vec![Accum::ZERO, Accum::from_int(2)]);
}

// ═══════════════════════════════════════════════════════════
// Transmission
// ═══════════════════════════════════════════════════════════

#[test]
fn test_transmits_keyed_events_on_tdma_schedule() {
    let units = vec![
        MeanFieldParameters {
            tau: Accum::ZERO,
            sigma: Accum::ZERO,
            drive: Accum::from_int(2),
            max_rate: Accum::from_int(10),
            ..MeanFieldParameters::default()
        };
        3
    ];
    let blob = BlobBuilder::new(units)
        .scaling_exponents(vec![0])
        .routing_key(0x0A00)
        .tdma(TdmaSchedule {
            time_between_sends: 10,
            initial_offset: 5,
            phase_count: 2,
        })
        .build_region()
        .unwrap();
    let tx = Arc::new(CollectingTransmitter::new());
    let mut controller = TimestepController::new(
        MeanFieldModel::new(),
        CoreServices::host().with_transmitter(tx.clone()),
    );
    controller.initialize(blob, &RecordingTarget::disabled()).unwrap();

    controller.on_tick(0).unwrap();
    controller.on_tick(1).unwrap();

    let events = tx.drain();
    let keys: Vec<u32> = events.iter().map(|e| e.key).collect();
    let offsets: Vec<u32> = events.iter().map(|e| e.send_offset).collect();
    assert_eq!(keys, vec![0x0A00, 0x0A01, 0x0A02, 0x0A00, 0x0A01, 0x0A02]);
    assert_eq!(offsets, vec![5, 15, 5, 5, 15, 5]);
    assert!(events.iter().all(|e| e.value() == Accum::from_int(10)));

    let stats = controller.stats();
    assert_eq!(stats.transmissions, 6);
    assert_eq!(stats.earliest_send_offset, Some(5));
    assert_eq!(stats.latest_send_offset, Some(15));
}

#[test]
fn test_core_without_key_is_silent() {
    let blob = BlobBuilder::new(vec![MeanFieldParameters::default(); 4])
        .scaling_exponents(vec![0])
        .build_region()
        .unwrap();
    let tx = Arc::new(CollectingTransmitter::new());
    let mut controller = TimestepController::new(
        MeanFieldModel::new(),
        CoreServices::host().with_transmitter(tx.clone()),
    );
    controller.initialize(blob, &RecordingTarget::disabled()).unwrap();
    controller.on_tick(0).unwrap();

    assert!(tx.is_empty());
    assert_eq!(controller.stats().transmissions, 0);
}

// ═══════════════════════════════════════════════════════════
// Failure behaviour
// ═══════════════════════════════════════════════════════════

#[test]
fn test_failed_resume_keeps_frames_and_state() {
    let blob = BlobBuilder::new(integrators(2))
        .scaling_exponents(vec![0])
        .build_region()
        .unwrap();
    let (mut controller, recorder) = recording_controller(blob.clone());
    controller.on_tick(0).unwrap();
    controller.pause().unwrap();
    assert_eq!(recorder.lock().frames().len(), 1);

    // Host writes an out-of-range leak for unit 1 while suspended
    let header = controller.header().unwrap().clone();
    let leak_word = meanfield_npu_tick_engine::HEADER_WORDS + header.class_count + 3 + 1;
    blob.write()[leak_word] = Accum::from_int(3).to_bits() as u32;

    let err = controller.resume().unwrap_err();
    assert!(matches!(err, CoreError::InvalidParameters(_)));
    assert_eq!(controller.state(), CoreState::Suspended);
    assert_eq!(recorder.lock().frames().len(), 1);
}

#[test]
fn test_allocation_failure_halts_without_parameters() {
    let blob = BlobBuilder::new(integrators(3))
        .scaling_exponents(vec![0])
        .build_region()
        .unwrap();
    // Room for the scaling table, not the unit records
    let mut controller = TimestepController::new(
        LinearRateModel::new(),
        CoreServices::host().with_memory(StdWorkingMemory::with_limit(16)),
    );

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _ = controller.initialize(blob, &record_rate());
    }));

    assert!(outcome.is_err());
    assert_eq!(controller.state(), CoreState::Uninitialized);
    assert!(controller.parameters().is_none());
    assert!(controller.ring_buffer().is_none());
}

#[test]
fn test_scaling_table_allocation_failure_halts() {
    let blob = BlobBuilder::new(integrators(3))
        .scaling_exponents(vec![0, 0])
        .build_region()
        .unwrap();
    // Smaller than the 8-byte scaling table
    let mut controller = TimestepController::new(
        LinearRateModel::new(),
        CoreServices::host().with_memory(StdWorkingMemory::with_limit(4)),
    );

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _ = controller.initialize(blob, &record_rate());
    }));

    assert!(outcome.is_err());
    assert_eq!(controller.state(), CoreState::Uninitialized);
    assert!(controller.parameters().is_none());
    assert!(controller.ring_buffer().is_none());
    assert!(controller.scaling_table().is_none());
}

#[test]
fn test_invalid_parameters_rejected() {
    let mut units = integrators(2);
    units[1].leak = Accum::from_int(3);
    let blob = BlobBuilder::new(units)
        .scaling_exponents(vec![0])
        .build_region()
        .unwrap();
    let mut controller = TimestepController::new(LinearRateModel::new(), CoreServices::host());

    let err = controller.initialize(blob, &record_rate()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidParameters(_)));
    assert_eq!(controller.state(), CoreState::Uninitialized);
}
