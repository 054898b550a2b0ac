// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Signed 16.15 fixed-point arithmetic
//!
//! Every unit parameter, every converted input and every recorded value is an [`Accum`].
//! The representation is an `i32` with 15 fractional bits, so one least significant bit is
//! `2^-15` and the representable range is roughly `[-65536.0, 65536.0)`.
//!
//! All arithmetic saturates at the range bounds. Nothing here can panic or wrap.

use bytemuck::{Pod, Zeroable};
use core::fmt;

#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

/// Signed 16.15 fixed-point value
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Pod, Zeroable,
)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct Accum(i32);

impl Accum {
    /// Number of fractional bits
    pub const FRACTIONAL_BITS: u32 = 15;

    /// Raw bit pattern of 1.0
    pub const ONE_BITS: i32 = 1 << Self::FRACTIONAL_BITS;

    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::ONE_BITS);
    pub const HALF: Self = Self(Self::ONE_BITS / 2);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);

    /// Smallest positive step (2^-15)
    pub const EPSILON: Self = Self(1);

    #[inline(always)]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    #[inline(always)]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Whole-number constructor (exact)
    #[inline]
    pub const fn from_int(value: i16) -> Self {
        Self((value as i32) << Self::FRACTIONAL_BITS)
    }

    /// Round to nearest representable value, saturating. NaN maps to zero.
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(value as f64)
    }

    /// Round to nearest representable value, saturating. NaN maps to zero.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        let scaled = (value * Self::ONE_BITS as f64).round();
        if scaled >= i32::MAX as f64 {
            Self::MAX
        } else if scaled <= i32::MIN as f64 {
            Self::MIN
        } else {
            Self(scaled as i32)
        }
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / Self::ONE_BITS as f32
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::ONE_BITS as f64
    }

    /// Clamp a 64-bit raw value into the representable range
    #[inline]
    pub fn from_wide_bits(bits: i64) -> Self {
        Self(bits.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    #[inline(always)]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    #[inline(always)]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    #[inline]
    pub fn saturating_neg(self) -> Self {
        Self(self.0.saturating_neg())
    }

    /// Fixed-point multiply, truncating toward negative infinity like the hardware `accum` type
    #[inline]
    pub fn saturating_mul(self, other: Self) -> Self {
        let wide = (self.0 as i64 * other.0 as i64) >> Self::FRACTIONAL_BITS;
        Self::from_wide_bits(wide)
    }

    /// Fixed-point divide. Returns `None` on division by zero.
    #[inline]
    pub fn checked_div(self, other: Self) -> Option<Self> {
        if other.0 == 0 {
            return None;
        }
        let wide = ((self.0 as i64) << Self::FRACTIONAL_BITS) / other.0 as i64;
        Some(Self::from_wide_bits(wide))
    }

    #[inline]
    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }

    #[inline(always)]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Accum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}

impl From<i16> for Accum {
    fn from(value: i16) -> Self {
        Self::from_int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_is_2_pow_15() {
        assert_eq!(Accum::ONE.to_bits(), 32768);
        assert_eq!(Accum::from_int(3).to_bits(), 3 * 32768);
        assert_eq!(Accum::from_int(-2).to_f32(), -2.0);
    }

    #[test]
    fn test_f32_round_trip_within_resolution() {
        for v in [0.0f32, 1.5, -7.25, 100.125, -0.000_03] {
            let back = Accum::from_f32(v).to_f32();
            assert!((back - v).abs() <= 1.0 / 32768.0, "{} -> {}", v, back);
        }
    }

    #[test]
    fn test_from_f32_saturates() {
        assert_eq!(Accum::from_f32(1.0e9), Accum::MAX);
        assert_eq!(Accum::from_f32(-1.0e9), Accum::MIN);
        assert_eq!(Accum::from_f32(f32::NAN), Accum::ZERO);
    }

    #[test]
    fn test_saturating_add_sub() {
        assert_eq!(Accum::MAX.saturating_add(Accum::ONE), Accum::MAX);
        assert_eq!(Accum::MIN.saturating_sub(Accum::ONE), Accum::MIN);
        assert_eq!(
            Accum::from_int(2).saturating_add(Accum::from_int(3)),
            Accum::from_int(5)
        );
    }

    #[test]
    fn test_mul_and_div() {
        let a = Accum::from_f32(1.5);
        let b = Accum::from_int(4);
        assert_eq!(a.saturating_mul(b), Accum::from_int(6));
        assert_eq!(Accum::from_int(6).checked_div(b), Some(a));
        assert_eq!(a.checked_div(Accum::ZERO), None);
        assert_eq!(Accum::from_int(30000).saturating_mul(Accum::from_int(30000)), Accum::MAX);
    }

    #[test]
    fn test_pod_cast_matches_bits() {
        let words: [u32; 2] = [Accum::ONE.to_bits() as u32, Accum::from_int(-1).to_bits() as u32];
        let values: &[Accum] = bytemuck::cast_slice(&words);
        assert_eq!(values, &[Accum::ONE, Accum::from_int(-1)]);
    }
}
