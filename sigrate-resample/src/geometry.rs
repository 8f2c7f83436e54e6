//! Filter geometry derived from the rate ratio.
//!
//! The output/input ratio is replaced by a fraction `p/q`. Output `n` sits at
//! input position `n q / p`, so its distance to input `m` is `(n q - m p) / p`
//! and every tap offset `l = n q - m p` is an integer. The kernel therefore
//! only ever needs the finite table `g(l)` for `l` in `[gmin, gmax]`.

use crate::error::{ResampleError, Result};
use sigrate_core::math::{blackman, div_ceil, div_floor, sinc};
use sigrate_core::{Rational, RationalApproximator};

/// Default kernel half-width, in units of the lower of the two sample rates.
pub const DEFAULT_WINDOW: f64 = 30.0;

/// Largest tap table a geometry may describe.
pub const MAX_TAPS: u128 = 1 << 24;

/// Immutable geometry of a resampler.
#[derive(Debug, Clone, PartialEq)]
pub struct ResamplerGeometry {
    input_rate: f64,
    output_rate: f64,
    window: f64,
    ratio: Rational,
    gamma: f64,
    kappa: f64,
    delta: f64,
    xi: i64,
    gmin: i64,
    gmax: i64,
    live: i64,
    history_len: usize,
}

impl ResamplerGeometry {
    /// Derive the geometry with the default rate approximation
    /// (tolerance 1e-6, denominator at most 1000, at most 10 convergents).
    pub fn new(input_rate: f64, output_rate: f64, window: f64) -> Result<Self> {
        Self::with_approximator(
            input_rate,
            output_rate,
            window,
            &RationalApproximator::default(),
        )
    }

    /// Derive the geometry with a custom rate approximation.
    ///
    /// # Errors
    ///
    /// - `InvalidSampleRate` if either rate is not finite and positive
    /// - `InvalidWindow` if `window` is not finite and positive
    /// - `RatioTooExtreme` if the ratio approximates to a non-positive fraction
    /// - `KernelTooLarge` if the tap table would exceed [`MAX_TAPS`]
    pub fn with_approximator(
        input_rate: f64,
        output_rate: f64,
        window: f64,
        approximator: &RationalApproximator,
    ) -> Result<Self> {
        for rate in [input_rate, output_rate] {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ResampleError::InvalidSampleRate { rate });
            }
        }
        if !window.is_finite() || window <= 0.0 {
            return Err(ResampleError::InvalidWindow { width: window });
        }

        let ratio = output_rate / input_rate;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ResampleError::RatioTooExtreme { ratio });
        }

        let r = approximator.approximate(ratio)?.value;
        if !r.is_positive() {
            return Err(ResampleError::RatioTooExtreme { ratio });
        }

        let (p, q) = (r.num(), r.den());
        let xi = p.max(q);
        let half = (xi as f64 * window).floor();
        let taps = 2.0 * half + 1.0;
        if taps > MAX_TAPS as f64 {
            return Err(ResampleError::KernelTooLarge { taps: taps as u128 });
        }

        let gamma = p as f64 / q as f64;
        let kappa = gamma.min(1.0);
        let delta = gamma.max(1.0);
        let history_len = (2.0 * window / kappa).ceil() as usize + 1;
        // The window vanishes at |l| = xi W, so those offsets never contribute
        let live = if half == xi as f64 * window {
            half as i64 - 1
        } else {
            half as i64
        };

        Ok(Self {
            input_rate,
            output_rate,
            window,
            ratio: r,
            gamma,
            kappa,
            delta,
            xi,
            gmin: (-(xi as f64) * window).ceil() as i64,
            gmax: half as i64,
            live,
            history_len,
        })
    }

    /// Input sample rate in Hz.
    pub fn input_rate(&self) -> f64 {
        self.input_rate
    }

    /// Output sample rate in Hz.
    pub fn output_rate(&self) -> f64 {
        self.output_rate
    }

    /// Kernel half-width `W`.
    pub fn window(&self) -> f64 {
        self.window
    }

    /// Rational approximation `p/q` of the output/input ratio.
    pub fn ratio(&self) -> Rational {
        self.ratio
    }

    /// Numerator `p` of the ratio.
    pub fn p(&self) -> i64 {
        self.ratio.num()
    }

    /// Denominator `q` of the ratio.
    pub fn q(&self) -> i64 {
        self.ratio.den()
    }

    /// `p/q` as a real number.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// `min(1, gamma)`, the kernel bandwidth relative to the input rate.
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// `max(1, gamma)`.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// `max(p, q)`, the number of tap offsets per unit of kernel argument.
    pub fn xi(&self) -> i64 {
        self.xi
    }

    /// Smallest tap offset, `ceil(-xi W)`.
    pub fn gmin(&self) -> i64 {
        self.gmin
    }

    /// Largest tap offset, `floor(xi W)`.
    pub fn gmax(&self) -> i64 {
        self.gmax
    }

    /// Number of tap offsets in `[gmin, gmax]`.
    pub fn tap_count(&self) -> usize {
        (self.gmax - self.gmin + 1) as usize
    }

    /// Input history needed by one output, `ceil(2W / kappa) + 1`.
    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Windowed-sinc kernel at tap offset `l`:
    /// `kappa * sinc(l / xi) * blackman(l / xi, W)`.
    pub fn kernel(&self, l: i64) -> f64 {
        let t = l as f64 / self.xi as f64;
        self.kappa * sinc(t) * blackman(t, self.window)
    }

    /// The kernel tabulated over `[gmin, gmax]`.
    pub fn kernel_table(&self) -> Vec<f64> {
        (self.gmin..=self.gmax).map(|l| self.kernel(l)).collect()
    }

    /// First valid output index once `pushed` inputs sit in a history of
    /// `capacity` slots.
    ///
    /// `ceil(gamma (N - 1 - capacity) + delta W)`, raised where needed to the
    /// first output whose whole support is still retained.
    pub fn min_output_index(&self, pushed: u64, capacity: usize) -> i64 {
        let oldest = pushed as i128 - capacity as i128 - 1;
        let (whole, frac) = self.scale(oldest);
        let nominal = whole.saturating_add((frac + self.delta * self.window).ceil() as i64);
        // Smallest n with ceil((n q - live) / p) >= N - capacity
        let (p, q, live) = (self.p() as i128, self.q() as i128, self.live as i128);
        let exact = to_index(div_floor(oldest * p + live, q) + 1);
        nominal.max(exact)
    }

    /// Last valid output index once `pushed` inputs have been seen.
    ///
    /// `floor(gamma (N - 2) - delta W)`, lowered where needed to the last
    /// output whose whole support has been pushed.
    pub fn max_output_index(&self, pushed: u64) -> i64 {
        let newest = pushed as i128 - 1;
        let (whole, frac) = self.scale(newest - 1);
        let nominal = whole.saturating_add((frac - self.delta * self.window).floor() as i64);
        let (p, q, live) = (self.p() as i128, self.q() as i128, self.live as i128);
        let exact = to_index(div_floor(newest * p - live, q));
        nominal.min(exact)
    }

    /// `gamma * k` split into `floor` and a fraction in `[0, 1)`, so the
    /// rounding error does not grow with the stream position.
    fn scale(&self, k: i128) -> (i64, f64) {
        let (scaled, q) = (k * self.p() as i128, self.q() as i128);
        let whole = div_floor(scaled, q);
        (to_index(whole), (scaled - whole * q) as f64 / q as f64)
    }

    /// Inclusive range of input indices contributing to output `n`.
    ///
    /// Offsets where the kernel is exactly zero at the window edge are left
    /// out, which keeps every input of a valid output inside the history.
    pub fn input_span(&self, n: i64) -> (i64, i64) {
        let (p, q, live) = (self.p() as i128, self.q() as i128, self.live as i128);
        let center = n as i128 * q;
        (
            to_index(div_ceil(center - live, p)),
            to_index(div_floor(center + live, p)),
        )
    }

    /// Tap offset linking output `n` to input `m`.
    ///
    /// Exact whenever the offset itself fits in `i64`, however far along the
    /// stream `n` and `m` are.
    #[inline]
    pub fn tap_offset(&self, n: i64, m: i64) -> i64 {
        n.wrapping_mul(self.q()).wrapping_sub(m.wrapping_mul(self.p()))
    }
}

#[inline]
fn to_index(x: i128) -> i64 {
    x.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
