// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Math services for the unit models
//!
//! The transfer functions need the complementary error function. It is evaluated in `f64`
//! with the Abramowitz & Stegun 7.1.26 rational approximation (absolute error below
//! 1.5e-7, well under one `Accum` step) and converted back to fixed point.

use crate::types::Accum;

pub const SQRT_2: f64 = core::f64::consts::SQRT_2;

const P: f64 = 0.327_591_1;
const A1: f64 = 0.254_829_592;
const A2: f64 = -0.284_496_736;
const A3: f64 = 1.421_413_741;
const A4: f64 = -1.453_152_027;
const A5: f64 = 1.061_405_429;

/// Complementary error function on `f64`
///
/// `erfc(-x) = 2 - erfc(x)`; NaN propagates.
pub fn erfc_f64(x: f64) -> f64 {
    if x.is_nan() {
        return x;
    }
    let z = x.abs();
    let t = 1.0 / (1.0 + P * z);
    let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
    let tail = poly * (-z * z).exp();
    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

/// Complementary error function on fixed point. Result lies in `[0, 2]`.
pub fn erfc(x: Accum) -> Accum {
    Accum::from_f64(erfc_f64(x.to_f64()))
}
