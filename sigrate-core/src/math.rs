//! Scalar primitives shared by the resampling kernels.

use std::f64::consts::PI;

/// Normalized sinc, `sin(pi t) / (pi t)`, equal to 1 at the origin.
#[inline]
pub fn sinc(t: f64) -> f64 {
    if t.abs() < 1e-10 {
        1.0
    } else {
        let x = PI * t;
        x.sin() / x
    }
}

/// Blackman window of total width `2w`, centred on the origin.
///
/// Exactly zero for `|t| >= w`.
#[inline]
pub fn blackman(t: f64, w: f64) -> f64 {
    if t.abs() >= w {
        return 0.0;
    }
    let x = PI * t / w;
    0.42 + 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
}

/// Smallest power of two greater than or equal to `x`, or `None` on overflow.
///
/// Zero maps to one.
#[inline]
pub fn greater_power_of_two(x: usize) -> Option<usize> {
    x.max(1).checked_next_power_of_two()
}

/// `x` modulo `y` as the representative in `0..y`.
///
/// Unlike `%`, the result is never negative. `y` must be positive.
#[inline]
pub fn int_mod(x: i64, y: i64) -> i64 {
    debug_assert!(y > 0);
    x.rem_euclid(y)
}

/// Floor of `a / b` for positive `b`.
///
/// Wide operands so products of stream positions and ratio terms fit.
#[inline]
pub fn div_floor(a: i128, b: i128) -> i128 {
    debug_assert!(b > 0);
    a.div_euclid(b)
}

/// Ceiling of `a / b` for positive `b`.
#[inline]
pub fn div_ceil(a: i128, b: i128) -> i128 {
    debug_assert!(b > 0);
    -(-a).div_euclid(b)
}

/// Clip a 32-bit value into `[-2^15, 2^15 - 1]`.
#[inline]
pub fn clip_16(x: i32) -> i16 {
    x.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
