//! Complex sample types.
//!
//! Signals are complex baseband: double precision for the floating point
//! path, 16-bit lanes for the fixed point path and 32-bit lanes for its
//! accumulators.

use crate::math::clip_16;

pub use num_complex::{Complex, Complex64};

/// Complex sample with 16-bit fixed point lanes.
pub type Complex16 = Complex<i16>;

/// Complex accumulator with 32-bit lanes.
pub type Complex32 = Complex<i32>;

/// Narrow a 32-bit complex value to 16 bits, saturating each lane.
#[inline]
pub fn saturate_16(x: Complex32) -> Complex16 {
    Complex16::new(clip_16(x.re), clip_16(x.im))
}

/// Widen a 16-bit complex value to 32-bit lanes.
#[inline]
pub fn widen_32(x: Complex16) -> Complex32 {
    Complex32::new(x.re as i32, x.im as i32)
}

/// Convert a 16-bit sample to double precision with unit full scale.
#[inline]
pub fn to_unit_scale(x: Complex16) -> Complex64 {
    Complex64::new(x.re as f64 / 32768.0, x.im as f64 / 32768.0)
}

/// Quantize a unit-scale sample to 16 bits, rounding and saturating.
#[inline]
pub fn from_unit_scale(x: Complex64) -> Complex16 {
    let lane = |v: f64| (v * 32768.0).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
    Complex16::new(lane(x.re), lane(x.im))
}
