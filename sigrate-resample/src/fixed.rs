//! 16-bit fixed-point windowed-sinc resampler.
//!
//! Taps are the double-precision kernel scaled by an integer gain `alpha`
//! and rounded. Products of 16-bit samples and taps are accumulated in 32
//! bits, then the gain is removed and each lane is clipped back to 16 bits.
//!
//! `alpha` is chosen so that no polyphase branch of the integer table has an
//! absolute sum above [`ACCUMULATOR_HEADROOM`]. Since every input magnitude
//! is at most `2^15`, the accumulator then stays below `2^31` for any input.

use crate::error::{ResampleError, Result};
use crate::geometry::{ResamplerGeometry, DEFAULT_WINDOW};
use crate::polyphase::ResamplerCore;
use crate::Resample;
use serde::{Deserialize, Serialize};
use sigrate_core::math::int_mod;
use sigrate_core::sample::{saturate_16, widen_32};
use sigrate_core::{Complex16, Complex32};
use tracing::debug;

/// Largest branch sum of absolute tap values, `floor((2^31 - 1) / 2^15)`.
pub const ACCUMULATOR_HEADROOM: i64 = i32::MAX as i64 >> 15;

/// How the 32-bit accumulator is scaled back to sample range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Truncating division by `alpha`.
    #[default]
    Divide,
    /// Arithmetic right shift by `floor(log2(alpha))`.
    ///
    /// Cheaper than division but only exact when `alpha` is a power of two;
    /// otherwise the output gain is between 1 and 2 and full-scale input
    /// clips more often.
    Shift,
}

/// Windowed-sinc resampler over complex 16-bit samples.
#[derive(Debug, Clone)]
pub struct FixedResampler {
    core: ResamplerCore<Complex16>,
    reference: Vec<f64>,
    taps: Vec<i32>,
    alpha: i32,
    beta: f64,
    shift: u32,
    normalization: Normalization,
}

impl FixedResampler {
    /// Create a resampler normalizing by division.
    pub fn new(input_rate: f64, output_rate: f64, window: f64) -> Result<Self> {
        Self::from_geometry(
            ResamplerGeometry::new(input_rate, output_rate, window)?,
            Normalization::Divide,
        )
    }

    /// Create a resampler normalizing by a right shift.
    pub fn with_shift(input_rate: f64, output_rate: f64, window: f64) -> Result<Self> {
        Self::from_geometry(
            ResamplerGeometry::new(input_rate, output_rate, window)?,
            Normalization::Shift,
        )
    }

    /// Create with the default window half-width, normalizing by division.
    pub fn with_defaults(input_rate: f64, output_rate: f64) -> Result<Self> {
        Self::new(input_rate, output_rate, DEFAULT_WINDOW)
    }

    /// Create from an already derived geometry.
    ///
    /// # Errors
    /// Returns `InvalidWindow` if the kernel is too wide to scale into 16-bit
    /// taps without risking accumulator overflow.
    pub fn from_geometry(
        geometry: ResamplerGeometry,
        normalization: Normalization,
    ) -> Result<Self> {
        let reference = geometry.kernel_table();
        let branches = geometry.p();
        let gmin = geometry.gmin();

        let max_l1 = branch_sums(&reference, gmin, branches, f64::abs)
            .into_iter()
            .fold(0.0, f64::max);
        let beta = ACCUMULATOR_HEADROOM as f64 / max_l1;

        let too_wide = || ResampleError::InvalidWindow {
            width: geometry.window(),
        };

        // Rounding can push a branch past the headroom, so shrink until it fits
        let mut alpha = beta.floor().min(i32::MAX as f64) as i64;
        let taps = loop {
            if alpha < 1 {
                return Err(too_wide());
            }
            let taps: Vec<i32> = reference
                .iter()
                .map(|g| (alpha as f64 * g).round() as i32)
                .collect();
            let worst = branch_sums(&taps, gmin, branches, |f| (f as i64).abs())
                .into_iter()
                .max()
                .unwrap_or(0);
            if worst <= ACCUMULATOR_HEADROOM {
                break taps;
            }
            alpha = alpha * ACCUMULATOR_HEADROOM / worst;
        };

        let alpha = alpha as i32;
        let shift = 31 - alpha.leading_zeros();
        let core = ResamplerCore::new(geometry, Complex16::new(0, 0))?;

        debug!(
            ratio = %core.geometry().ratio(),
            window = core.geometry().window(),
            taps = taps.len(),
            alpha,
            beta,
            ?normalization,
            "Created fixed-point resampler"
        );

        Ok(Self {
            core,
            reference,
            taps,
            alpha,
            beta,
            shift,
            normalization,
        })
    }

    /// Integer tap table, indexed by `l - gmin`.
    pub fn taps(&self) -> &[i32] {
        &self.taps
    }

    /// Integer gain applied to the kernel.
    pub fn alpha(&self) -> i32 {
        self.alpha
    }

    /// Real-valued gain bound `alpha` was derived from.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// `floor(log2(alpha))`, the shift used by [`Normalization::Shift`].
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// Normalization strategy.
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Double-precision kernel value at tap offset `l`; zero outside
    /// `[gmin, gmax]`.
    pub fn tap(&self, l: i64) -> f64 {
        let g = self.core.geometry();
        if l < g.gmin() || l > g.gmax() {
            return 0.0;
        }
        self.reference[(l - g.gmin()) as usize]
    }

    /// Shared resampler state.
    pub fn core(&self) -> &ResamplerCore<Complex16> {
        &self.core
    }

    /// Overwrite a retained input sample.
    pub fn write_input(&mut self, m: i64, sample: Complex16) -> Result<()> {
        self.core.write_input(m, sample)
    }

    /// Raw 32-bit accumulator for output `n`, before normalization.
    ///
    /// Same precondition as [`Resample::evaluate`].
    pub fn evaluate_wide(&self, n: i64) -> Complex32 {
        let mut acc = Complex32::new(0, 0);
        for (x, tap) in self.core.support(n) {
            acc += widen_32(*x) * self.taps[tap];
        }
        acc
    }

    #[inline]
    fn normalize(&self, acc: Complex32) -> Complex32 {
        match self.normalization {
            Normalization::Divide => Complex32::new(acc.re / self.alpha, acc.im / self.alpha),
            Normalization::Shift => Complex32::new(acc.re >> self.shift, acc.im >> self.shift),
        }
    }
}

impl Resample for FixedResampler {
    type Sample = Complex16;

    #[inline]
    fn push(&mut self, sample: Complex16) {
        self.core.push(sample);
    }

    fn pushed(&self) -> u64 {
        self.core.pushed()
    }

    fn min_output_index(&self) -> i64 {
        self.core.min_output_index()
    }

    fn max_output_index(&self) -> i64 {
        self.core.max_output_index()
    }

    fn evaluate(&self, n: i64) -> Complex16 {
        saturate_16(self.normalize(self.evaluate_wide(n)))
    }

    fn geometry(&self) -> &ResamplerGeometry {
        self.core.geometry()
    }
}

/// Per-branch sums of `weight(tap)`, branch `r` collecting offsets
/// `l ≡ r (mod p)`.
fn branch_sums<T, S>(table: &[T], gmin: i64, branches: i64, weight: impl Fn(T) -> S) -> Vec<S>
where
    T: Copy,
    S: Copy + Default + std::ops::AddAssign,
{
    let mut sums = vec![S::default(); branches as usize];
    for (i, &v) in table.iter().enumerate() {
        let l = gmin + i as i64;
        sums[int_mod(l, branches) as usize] += weight(v);
    }
    sums
}
