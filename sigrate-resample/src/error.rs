//! Error types for resampling.

use sigrate_core::CoreError;
use thiserror::Error;

/// Result type for resampling operations.
pub type Result<T> = std::result::Result<T, ResampleError>;

/// Errors that can occur while building or querying a resampler.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResampleError {
    /// Invalid sample rate specified.
    #[error("Invalid sample rate: {rate} Hz (must be finite and > 0)")]
    InvalidSampleRate { rate: f64 },

    /// Invalid kernel half-width.
    #[error("Invalid window width: {width} (must be finite and > 0)")]
    InvalidWindow { width: f64 },

    /// Rate ratio has no usable rational approximation.
    #[error("Resampling ratio {ratio} cannot be approximated with a positive fraction")]
    RatioTooExtreme { ratio: f64 },

    /// Kernel support too wide to tabulate.
    #[error("Kernel with {taps} taps exceeds the supported size")]
    KernelTooLarge { taps: u128 },

    /// Output index outside the currently valid window.
    #[error("Output index {index} outside valid range [{min}, {max}]")]
    OutOfRange { index: i64, min: i64, max: i64 },

    /// Core primitive error.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl ResampleError {
    /// Check if this error rejects a construction parameter.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::InvalidSampleRate { .. }
            | Self::InvalidWindow { .. }
            | Self::RatioTooExtreme { .. }
            | Self::KernelTooLarge { .. } => true,
            Self::Core(e) => e.is_invalid_input(),
            Self::OutOfRange { .. } => false,
        }
    }

    /// Check if this error rejects an index.
    pub fn is_out_of_range(&self) -> bool {
        match self {
            Self::OutOfRange { .. } => true,
            Self::Core(e) => e.is_out_of_range(),
            _ => false,
        }
    }
}
