//! Resampler configuration.
//!
//! Provides a serializable description of a resampler from which either
//! precision variant can be built.

use crate::double::DoubleResampler;
use crate::error::Result;
use crate::fixed::{FixedResampler, Normalization};
use crate::geometry::{ResamplerGeometry, DEFAULT_WINDOW};
use serde::{Deserialize, Serialize};
use sigrate_core::RationalApproximator;

/// Limits on the rational approximation of the rate ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproximationConfig {
    /// Accept the first convergent closer than this to the real ratio.
    pub tolerance: f64,
    /// Largest admissible denominator.
    pub max_denominator: i64,
    /// Largest number of convergents to examine.
    pub max_convergents: usize,
}

impl Default for ApproximationConfig {
    fn default() -> Self {
        let defaults = RationalApproximator::default();
        Self {
            tolerance: defaults.tolerance,
            max_denominator: defaults.max_denominator,
            max_convergents: defaults.max_convergents,
        }
    }
}

impl From<ApproximationConfig> for RationalApproximator {
    fn from(config: ApproximationConfig) -> Self {
        RationalApproximator::new(
            config.tolerance,
            config.max_denominator,
            config.max_convergents,
        )
    }
}

/// Configuration for the resampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResamplerConfig {
    /// Input sample rate in Hz.
    pub input_rate: f64,
    /// Output sample rate in Hz.
    pub output_rate: f64,
    /// Kernel half-width.
    #[serde(default = "default_window")]
    pub window: f64,
    /// Rate ratio approximation limits.
    #[serde(default)]
    pub approximation: ApproximationConfig,
    /// Fixed-point normalization (ignored by the double variant).
    #[serde(default)]
    pub normalization: Normalization,
}

fn default_window() -> f64 {
    DEFAULT_WINDOW
}

impl ResamplerConfig {
    /// Create a new configuration.
    pub fn new(input_rate: f64, output_rate: f64) -> Self {
        Self {
            input_rate,
            output_rate,
            window: DEFAULT_WINDOW,
            approximation: ApproximationConfig::default(),
            normalization: Normalization::default(),
        }
    }

    /// Set the kernel half-width.
    pub fn with_window(mut self, window: f64) -> Self {
        self.window = window;
        self
    }

    /// Set the rate approximation limits.
    pub fn with_approximation(mut self, approximation: ApproximationConfig) -> Self {
        self.approximation = approximation;
        self
    }

    /// Set the fixed-point normalization.
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Create a config trading accuracy for speed.
    pub fn fast(input_rate: f64, output_rate: f64) -> Self {
        Self::new(input_rate, output_rate).with_window(8.0)
    }

    /// Create a config for high-quality resampling.
    pub fn high_quality(input_rate: f64, output_rate: f64) -> Self {
        Self::new(input_rate, output_rate).with_window(64.0)
    }

    /// Derive the geometry described by this configuration.
    pub fn geometry(&self) -> Result<ResamplerGeometry> {
        ResamplerGeometry::with_approximator(
            self.input_rate,
            self.output_rate,
            self.window,
            &self.approximation.into(),
        )
    }

    /// Build a double-precision resampler.
    pub fn build_double(&self) -> Result<DoubleResampler> {
        DoubleResampler::from_geometry(self.geometry()?)
    }

    /// Build a fixed-point resampler with the configured normalization.
    pub fn build_fixed(&self) -> Result<FixedResampler> {
        FixedResampler::from_geometry(self.geometry()?, self.normalization)
    }
}
