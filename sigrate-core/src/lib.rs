//! # Sigrate Core
//!
//! Core types and primitives for the sigrate resampling library.
//!
//! This crate provides the building blocks the resampling engine is made of:
//! - Error handling types
//! - Rational numbers and continued-fraction approximation
//! - A power-of-two history buffer addressed by global stream position
//! - Complex sample types for double precision and 16-bit fixed point
//! - Scalar DSP primitives (sinc, Blackman window, integer rounding helpers)

pub mod error;
pub mod history;
pub mod math;
pub mod rational;
pub mod sample;

pub use error::{CoreError, Result};
pub use history::HistoryBuffer;
pub use rational::{
    best_approximations, rational_approximation, Approximation, ContinuedFraction, Convergent,
    Convergents, OverflowKind, Rational, RationalApproximator, StopReason, MAX_EXPANSION_DEPTH,
};
pub use sample::{Complex, Complex16, Complex32, Complex64};
