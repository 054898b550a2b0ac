// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Ring buffer weight to input conversion
//!
//! A raw accumulated weight is an unsigned integer whose unit depends on the event class.
//! The class's scaling exponent says how many of the weight's low bits are fractional, so the
//! real input is `weight × 2^-shift`. A larger shift therefore means finer discretization
//! steps for that class.
//!
//! The result is expressed in [`Accum`]; conversion is done in 64-bit and saturated, so every
//! `(weight, shift)` pair has a defined result.

use crate::types::{Accum, RingBufferWeight};

/// Convert a raw ring buffer weight to an input value
///
/// `input = weight × 2^-shift`, as raw `Accum` bits `(weight << 15) >> shift`.
///
/// # Example
/// ```
/// use meanfield_npu_neural::synapse::convert_weight_to_input;
/// use meanfield_npu_neural::types::Accum;
///
/// assert_eq!(convert_weight_to_input(16, 2), Accum::from_int(4));
/// assert_eq!(convert_weight_to_input(1, 15), Accum::EPSILON);
/// assert_eq!(convert_weight_to_input(u32::MAX, 0), Accum::MAX); // Saturated
/// assert_eq!(convert_weight_to_input(7, 200), Accum::ZERO); // Any shift is defined
/// ```
#[inline]
pub fn convert_weight_to_input(weight: RingBufferWeight, shift: u32) -> Accum {
    let widened = (weight as i64) << Accum::FRACTIONAL_BITS;
    Accum::from_wide_bits(widened.checked_shr(shift).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_scales_down() {
        assert_eq!(convert_weight_to_input(16, 0), Accum::from_int(16));
        assert_eq!(convert_weight_to_input(16, 2), Accum::from_int(4));
        assert_eq!(convert_weight_to_input(16, 4), Accum::ONE);
        assert_eq!(convert_weight_to_input(16, 5), Accum::HALF);
    }

    #[test]
    fn test_zero_weight_is_zero_for_any_shift() {
        for shift in [0, 1, 15, 31, 63, 64, u32::MAX] {
            assert_eq!(convert_weight_to_input(0, shift), Accum::ZERO);
        }
    }

    #[test]
    fn test_huge_shift_is_total() {
        assert_eq!(convert_weight_to_input(u32::MAX, 64), Accum::ZERO);
        assert_eq!(convert_weight_to_input(u32::MAX, u32::MAX), Accum::ZERO);
    }

    #[test]
    fn test_monotone_in_weight() {
        let mut previous = Accum::ZERO;
        for weight in (0..100_000u32).step_by(997) {
            let input = convert_weight_to_input(weight, 3);
            assert!(input >= previous);
            previous = input;
        }
    }

    #[test]
    fn test_saturates_without_shift() {
        assert_eq!(convert_weight_to_input(70_000, 0), Accum::MAX);
        assert_eq!(convert_weight_to_input(65_535, 0), Accum::from_wide_bits(65_535 << 15));
    }
}
