// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Ring Buffer Aggregation
//!
//! Turns the raw weights accumulated in the ring buffer during the last tick into per-unit
//! inputs.
//!
//! ## Drain Order
//!
//! ```text
//! for class in 0..class_count:                 (outer)
//!     shift = scaling_table[class]
//!     for unit in 0..unit_count_padded:        (inner, increasing index)
//!         weight = take(class, unit)           (slot is zero afterwards)
//!         unit <  unit_count  → deliver convert(weight, shift) to (class, unit)
//!         unit >= unit_count  → padding, never delivered
//! ```
//!
//! Every visited slot is cleared whether or not it was delivered, so nothing read in one
//! tick is seen again in the next.

use crate::fatal::{halt, FatalError};
use meanfield_npu_neural::{convert_weight_to_input, InputSink, TickContext};
use meanfield_npu_runtime::RingBuffer;
use serde::Serialize;
use tracing::{trace, warn};

/// Outcome of one drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub slots_visited: usize,
    /// Non-zero in-range slots handed to the sink
    pub inputs_delivered: usize,
    pub padding_skipped: usize,
    /// Padding slots that held a weight (producer wrote past the true unit count)
    pub padding_discarded: usize,
}

/// Drain every slot of `buffer` into `sink`
///
/// `ctx` supplies the true and padded unit counts and the class count; `scaling_table`
/// holds one exponent per class. Reaching a unit the sink cannot address halts the core.
pub fn drain<S: InputSink>(
    buffer: &RingBuffer,
    scaling_table: &[u32],
    ctx: &TickContext,
    sink: &mut S,
) -> DrainReport {
    if scaling_table.len() < ctx.class_count {
        halt(FatalError::ScalingTableMismatch {
            entries: scaling_table.len(),
            class_count: ctx.class_count,
        });
    }

    let mut report = DrainReport::default();

    for (class, &shift) in scaling_table.iter().enumerate().take(ctx.class_count) {
        for unit in 0..ctx.unit_count_padded {
            let weight = buffer.take(buffer.index(class, unit));
            report.slots_visited += 1;

            if unit >= ctx.unit_count {
                report.padding_skipped += 1;
                if weight != 0 {
                    report.padding_discarded += 1;
                }
                continue;
            }

            if unit >= sink.unit_count() {
                halt(FatalError::UnitIndexOutOfRange {
                    unit,
                    unit_count: sink.unit_count(),
                });
            }

            if weight != 0 {
                sink.add_input(class, unit, convert_weight_to_input(weight, shift));
                report.inputs_delivered += 1;
            }
        }
    }

    if report.padding_discarded > 0 {
        warn!(
            target: "meanfield-tick-engine",
            "[DRAIN] {}: discarded {} non-zero padding slots",
            ctx, report.padding_discarded
        );
    }
    trace!(
        target: "meanfield-tick-engine",
        "[DRAIN] {}: visited {}, delivered {}, padding {}",
        ctx, report.slots_visited, report.inputs_delivered, report.padding_skipped
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use meanfield_npu_neural::{padded_unit_count, Accum, SynapticInputs};

    fn ctx(unit_count: usize, class_count: usize) -> TickContext {
        TickContext {
            tick: 0,
            time: 0,
            unit_count,
            unit_count_padded: padded_unit_count(unit_count),
            class_count,
        }
    }

    #[test]
    fn test_single_weight_scenario() {
        let ctx = ctx(3, 1);
        let buffer = RingBuffer::new(1, ctx.unit_count_padded);
        buffer.deposit(0, 1, 16).unwrap();
        let mut inputs = SynapticInputs::new(1, 3);

        let report = drain(&buffer, &[2], &ctx, &mut inputs);

        assert_eq!(inputs.for_unit(0), &[Accum::ZERO]);
        assert_eq!(inputs.for_unit(1), &[Accum::from_int(4)]);
        assert_eq!(inputs.for_unit(2), &[Accum::ZERO]);
        assert_eq!(buffer.peek(0, 1), 0);
        assert_eq!(report.inputs_delivered, 1);
        assert_eq!(report.slots_visited, 4);
        assert_eq!(report.padding_skipped, 1);
    }

    #[test]
    fn test_every_slot_cleared() {
        let ctx = ctx(5, 3);
        let buffer = RingBuffer::new(3, ctx.unit_count_padded);
        for class in 0..3 {
            for unit in 0..ctx.unit_count_padded {
                buffer.deposit(class, unit, (class * 10 + unit + 1) as u32).unwrap();
            }
        }
        let mut inputs = SynapticInputs::new(3, 5);
        drain(&buffer, &[0, 1, 2], &ctx, &mut inputs);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_padding_never_delivered() {
        let ctx = ctx(3, 2);
        let buffer = RingBuffer::new(2, ctx.unit_count_padded);
        buffer.deposit(0, 3, 100).unwrap();
        buffer.deposit(1, 3, 100).unwrap();
        let mut inputs = SynapticInputs::new(2, 3);

        let report = drain(&buffer, &[0, 0], &ctx, &mut inputs);

        for unit in 0..3 {
            assert_eq!(inputs.for_unit(unit), &[Accum::ZERO, Accum::ZERO]);
        }
        assert_eq!(report.padding_discarded, 2);
        assert_eq!(report.inputs_delivered, 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_per_class_scaling() {
        let ctx = ctx(1, 2);
        let buffer = RingBuffer::new(2, 1);
        buffer.deposit(0, 0, 8).unwrap();
        buffer.deposit(1, 0, 8).unwrap();
        let mut inputs = SynapticInputs::new(2, 1);

        drain(&buffer, &[3, 1], &ctx, &mut inputs);

        assert_eq!(inputs.for_unit(0), &[Accum::ONE, Accum::from_int(4)]);
    }

    #[test]
    fn test_zero_classes_is_noop() {
        let ctx = ctx(3, 0);
        let buffer = RingBuffer::new(0, ctx.unit_count_padded);
        let mut inputs = SynapticInputs::new(0, 3);
        let report = drain(&buffer, &[], &ctx, &mut inputs);
        assert_eq!(report, DrainReport::default());
    }

    #[test]
    #[should_panic(expected = "unit index 2 out of range")]
    fn test_sink_too_small_halts() {
        let ctx = ctx(3, 1);
        let buffer = RingBuffer::new(1, ctx.unit_count_padded);
        let mut inputs = SynapticInputs::new(1, 2);
        drain(&buffer, &[0], &ctx, &mut inputs);
    }

    #[test]
    #[should_panic(expected = "scaling table has 1 entries for 2 event classes")]
    fn test_short_scaling_table_halts() {
        let ctx = ctx(1, 2);
        let buffer = RingBuffer::new(2, 1);
        let mut inputs = SynapticInputs::new(2, 1);
        drain(&buffer, &[0], &ctx, &mut inputs);
    }
}
