//! # Sigrate Resample
//!
//! Streaming arbitrary-ratio resampling of complex baseband signals.
//!
//! The output/input rate ratio is approximated by a fraction `p/q` and every
//! output sample is a windowed-sinc combination of the stored inputs around
//! its position. Three variants share one engine:
//! - **Double precision**: `Complex64` samples and `f64` taps
//! - **Fixed point**: `Complex<i16>` samples, integer taps, 32-bit accumulation
//!   normalized by exact division
//! - **Fixed point, shift**: as above, normalized by a right shift
//!
//! ## Example
//!
//! ```
//! use sigrate_resample::{DoubleResampler, Resample};
//! use sigrate_core::Complex64;
//!
//! let mut resampler = DoubleResampler::new(8000.0, 11025.0, 30.0)?;
//! for i in 0..200 {
//!     resampler.push(Complex64::new(if i == 100 { 1.0 } else { 0.0 }, 0.0));
//! }
//!
//! for n in resampler.output_range() {
//!     let y = resampler.evaluate(n);
//!     assert!(y.norm().is_finite());
//! }
//! # Ok::<(), sigrate_resample::ResampleError>(())
//! ```

pub mod double;
pub mod error;
pub mod fixed;
pub mod geometry;
pub mod polyphase;
mod resampler;
pub mod stream;

pub use double::DoubleResampler;
pub use error::{ResampleError, Result};
pub use fixed::{FixedResampler, Normalization, ACCUMULATOR_HEADROOM};
pub use geometry::{ResamplerGeometry, DEFAULT_WINDOW, MAX_TAPS};
pub use polyphase::{ResamplerCore, Support};
pub use resampler::{ApproximationConfig, ResamplerConfig};
pub use stream::Stream;

use std::ops::RangeInclusive;

/// Trait for all resampling implementations.
///
/// `push` feeds the next input sample. Output `n` (aligned so that output 0
/// coincides with input 0) may be evaluated while it lies inside
/// `[min_output_index(), max_output_index()]`; this window only moves forward.
pub trait Resample: Send + Sync {
    /// Sample type of both input and output.
    type Sample: Copy;

    /// Append the next input sample.
    fn push(&mut self, sample: Self::Sample);

    /// Total number of inputs pushed.
    fn pushed(&self) -> u64;

    /// First output index computable now.
    fn min_output_index(&self) -> i64;

    /// Last output index computable now.
    fn max_output_index(&self) -> i64;

    /// Output sample `n`.
    ///
    /// `n` must be inside the output window. Outside it the result is
    /// meaningless (but memory-safe); use [`Resample::try_evaluate`] when
    /// that is not already guaranteed.
    fn evaluate(&self, n: i64) -> Self::Sample;

    /// The geometry this resampler was built with.
    fn geometry(&self) -> &ResamplerGeometry;

    /// True if `n` can be evaluated now.
    fn is_valid_output(&self, n: i64) -> bool {
        n >= self.min_output_index() && n <= self.max_output_index()
    }

    /// The output window. Empty until enough history has accumulated.
    fn output_range(&self) -> RangeInclusive<i64> {
        self.min_output_index()..=self.max_output_index()
    }

    /// Output sample `n`, or `OutOfRange` outside the window.
    fn try_evaluate(&self, n: i64) -> Result<Self::Sample> {
        if self.is_valid_output(n) {
            Ok(self.evaluate(n))
        } else {
            Err(ResampleError::OutOfRange {
                index: n,
                min: self.min_output_index(),
                max: self.max_output_index(),
            })
        }
    }

    /// Input sample rate in Hz.
    fn input_rate(&self) -> f64 {
        self.geometry().input_rate()
    }

    /// Output sample rate in Hz.
    fn output_rate(&self) -> f64 {
        self.geometry().output_rate()
    }

    /// Resampling ratio actually realised, `p/q`.
    fn ratio(&self) -> f64 {
        self.geometry().gamma()
    }
}
