//! Double-precision windowed-sinc resampler.
//!
//! High-quality resampling of `Complex64` streams. The whole tap table is
//! computed once at construction; each output is a dot product of one
//! polyphase branch of it with the stored inputs.

use crate::error::Result;
use crate::geometry::{ResamplerGeometry, DEFAULT_WINDOW};
use crate::polyphase::ResamplerCore;
use crate::Resample;
use sigrate_core::Complex64;
use tracing::debug;

/// Windowed-sinc resampler over complex `f64` samples.
///
/// # Quality Characteristics
/// - Passband error falls as the window half-width grows
/// - Cost per output is about `2W / min(1, ratio)` complex multiply-adds
#[derive(Debug, Clone)]
pub struct DoubleResampler {
    core: ResamplerCore<Complex64>,
    taps: Vec<f64>,
}

impl DoubleResampler {
    /// Create a resampler with kernel half-width `window`.
    ///
    /// # Errors
    /// Returns an error if the rates or the window are invalid, or the rate
    /// ratio cannot be approximated.
    pub fn new(input_rate: f64, output_rate: f64, window: f64) -> Result<Self> {
        Self::from_geometry(ResamplerGeometry::new(input_rate, output_rate, window)?)
    }

    /// Create with the default window half-width.
    pub fn with_defaults(input_rate: f64, output_rate: f64) -> Result<Self> {
        Self::new(input_rate, output_rate, DEFAULT_WINDOW)
    }

    /// Create from an already derived geometry.
    pub fn from_geometry(geometry: ResamplerGeometry) -> Result<Self> {
        let taps = geometry.kernel_table();
        let core = ResamplerCore::new(geometry, Complex64::new(0.0, 0.0))?;

        debug!(
            ratio = %core.geometry().ratio(),
            window = core.geometry().window(),
            taps = taps.len(),
            history = core.history().capacity(),
            "Created double-precision resampler"
        );

        Ok(Self { core, taps })
    }

    /// Kernel value at tap offset `l`; zero outside `[gmin, gmax]`.
    pub fn tap(&self, l: i64) -> f64 {
        let g = self.core.geometry();
        if l < g.gmin() || l > g.gmax() {
            return 0.0;
        }
        self.taps[(l - g.gmin()) as usize]
    }

    /// The tap table, indexed by `l - gmin`.
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Shared resampler state.
    pub fn core(&self) -> &ResamplerCore<Complex64> {
        &self.core
    }

    /// Overwrite a retained input sample.
    pub fn write_input(&mut self, m: i64, sample: Complex64) -> Result<()> {
        self.core.write_input(m, sample)
    }
}

impl Resample for DoubleResampler {
    type Sample = Complex64;

    #[inline]
    fn push(&mut self, sample: Complex64) {
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

    fn evaluate(&self, n: i64) -> Complex64 {
        let mut sum = Complex64::new(0.0, 0.0);
        for (x, tap) in self.core.support(n) {
            sum += *x * self.taps[tap];
        }
        sum
    }

    fn geometry(&self) -> &ResamplerGeometry {
        self.core.geometry()
    }
}
