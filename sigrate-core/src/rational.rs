//! Rational numbers and continued-fraction approximation.
//!
//! A real rate ratio is replaced by a nearby fraction `p/q` with a small
//! denominator. The fraction bounds the number of distinct filter offsets a
//! resampler ever needs, at the cost of a small error in the conversion rate.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// Hard cap on the number of partial quotients expanded for any input.
pub const MAX_EXPANSION_DEPTH: usize = 64;

/// A rational number in lowest terms with a positive denominator.
///
/// Serializes as `{ "num": .., "den": .. }`; deserialization re-normalizes
/// and rejects a zero denominator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRational", into = "RawRational")]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Rational {
    /// Create a rational number equal to `num/den`, reduced to lowest terms.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero or the normalized value does not fit in `i64`.
    pub fn new(num: i64, den: i64) -> Self {
        match Self::normalize(num as i128, den as i128) {
            Some(r) => r,
            None => panic!("invalid rational {}/{}", num, den),
        }
    }

    /// Fallible variant of [`Rational::new`].
    pub fn try_new(num: i64, den: i64) -> Result<Self> {
        Self::normalize(num as i128, den as i128)
            .ok_or_else(|| CoreError::invalid_input(format!("invalid rational {}/{}", num, den)))
    }

    /// Create a rational from an integer.
    pub const fn from_int(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// Create a zero rational.
    pub const fn zero() -> Self {
        Self { num: 0, den: 1 }
    }

    /// Create a rational representing one.
    pub const fn one() -> Self {
        Self { num: 1, den: 1 }
    }

    /// Numerator.
    pub const fn num(&self) -> i64 {
        self.num
    }

    /// Denominator, always positive.
    pub const fn den(&self) -> i64 {
        self.den
    }

    /// Check if this rational is zero.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Check if this rational is positive.
    pub fn is_positive(&self) -> bool {
        self.num > 0
    }

    /// Convert to f64.
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Sum of two rationals, or `None` if the reduced result overflows.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let num = self.num as i128 * rhs.den as i128 + rhs.num as i128 * self.den as i128;
        let den = self.den as i128 * rhs.den as i128;
        Self::normalize(num, den)
    }

    fn normalize(num: i128, den: i128) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
        let (num, den) = if g > 1 { (num / g, den / g) } else { (num, den) };
        Some(Self {
            num: i64::try_from(num).ok()?,
            den: i64::try_from(den).ok()?,
        })
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl Add for Rational {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if the reduced sum does not fit in `i64`.
    fn add(self, rhs: Self) -> Self::Output {
        match self.checked_add(rhs) {
            Some(sum) => sum,
            None => panic!("rational overflow in {} + {}", self, rhs),
        }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_int(n)
    }
}

impl From<(i64, i64)> for Rational {
    fn from((num, den): (i64, i64)) -> Self {
        Self::new(num, den)
    }
}

#[derive(Serialize, Deserialize)]
struct RawRational {
    num: i64,
    den: i64,
}

impl TryFrom<RawRational> for Rational {
    type Error = CoreError;

    fn try_from(raw: RawRational) -> Result<Self> {
        Self::try_new(raw.num, raw.den)
    }
}

impl From<Rational> for RawRational {
    fn from(r: Rational) -> Self {
        Self {
            num: r.num,
            den: r.den,
        }
    }
}

/// Greatest common divisor using the Euclidean algorithm.
pub fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// One step of a continued-fraction expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convergent {
    /// Partial quotient `a_i`.
    pub term: i64,
    /// Convergent `h_i / k_i`.
    pub value: Rational,
    /// True if the convergent reproduces the input exactly in double precision.
    pub exact: bool,
}

/// Iterator over the convergents of a real number.
///
/// Ends when the expansion terminates, after [`MAX_EXPANSION_DEPTH`] terms,
/// or when the next convergent is not representable in `i64`.
#[derive(Debug, Clone)]
pub struct Convergents {
    x: f64,
    remainder: f64,
    /// `(h_{i-1}, h_{i-2})`
    h: (i64, i64),
    /// `(k_{i-1}, k_{i-2})`
    k: (i64, i64),
    produced: usize,
    done: bool,
    overflow: Option<OverflowKind>,
}

/// Which half of a convergent left the `i64` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowKind {
    /// The numerator `h_i` overflowed.
    Numerator,
    /// The denominator `k_i` overflowed.
    Denominator,
}

impl Convergents {
    /// Start expanding `x`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `x` is NaN or infinite.
    pub fn new(x: f64) -> Result<Self> {
        if !x.is_finite() {
            return Err(CoreError::invalid_input(format!(
                "cannot expand non-finite value {}",
                x
            )));
        }
        Ok(Self {
            x,
            remainder: x,
            h: (1, 0),
            k: (0, 1),
            produced: 0,
            done: false,
            overflow: None,
        })
    }

    /// Set when the expansion stopped because a convergent left the `i64` range.
    pub fn overflow(&self) -> Option<OverflowKind> {
        self.overflow
    }

    fn step(&mut self) -> std::result::Result<Convergent, OverflowKind> {
        // k_{-1} = 0, so only the first term can overflow the numerator alone
        let kind = if self.k.0 == 0 {
            OverflowKind::Numerator
        } else {
            OverflowKind::Denominator
        };
        let a = self.remainder.floor();
        if !(a.abs() < i64::MAX as f64) {
            return Err(kind);
        }
        let term = a as i64;
        let k = term
            .checked_mul(self.k.0)
            .and_then(|k| k.checked_add(self.k.1))
            .ok_or(OverflowKind::Denominator)?;
        let h = term
            .checked_mul(self.h.0)
            .and_then(|h| h.checked_add(self.h.1))
            .ok_or(OverflowKind::Numerator)?;
        let value = Rational::try_new(h, k).map_err(|_| OverflowKind::Numerator)?;

        self.h = (h, self.h.0);
        self.k = (k, self.k.0);

        let frac = self.remainder - a;
        let exact = frac == 0.0 || value.to_f64() == self.x;
        if exact {
            self.done = true;
        } else {
            self.remainder = frac.recip();
        }

        Ok(Convergent { term, value, exact })
    }
}

impl Iterator for Convergents {
    type Item = Convergent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.produced >= MAX_EXPANSION_DEPTH {
            return None;
        }
        match self.step() {
            Ok(c) => {
                self.produced += 1;
                Some(c)
            }
            Err(kind) => {
                self.done = true;
                self.overflow = Some(kind);
                None
            }
        }
    }
}

/// Why an approximation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The convergent is within the requested tolerance.
    WithinTolerance,
    /// The expansion terminated; the convergent equals the input.
    Exact,
    /// The next convergent's denominator exceeds the bound.
    DenominatorLimit,
    /// The convergent budget is spent.
    ConvergentLimit,
    /// The next convergent's numerator is not representable in `i64`.
    Overflow,
}

/// Result of [`RationalApproximator::approximate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approximation {
    /// The selected convergent.
    pub value: Rational,
    /// `|x - value|`.
    pub error: f64,
    /// Number of convergents produced, including the selected one.
    pub convergents: usize,
    /// Which criterion ended the expansion.
    pub stop: StopReason,
}

/// Best low-denominator approximation of a real number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RationalApproximator {
    /// Stop at the first convergent closer than this.
    pub tolerance: f64,
    /// Never return a convergent with a larger denominator.
    pub max_denominator: i64,
    /// Stop after this many convergents.
    pub max_convergents: usize,
}

impl Default for RationalApproximator {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_denominator: 1000,
            max_convergents: 10,
        }
    }
}

impl RationalApproximator {
    /// Create an approximator with explicit limits.
    pub fn new(tolerance: f64, max_denominator: i64, max_convergents: usize) -> Self {
        Self {
            tolerance,
            max_denominator,
            max_convergents,
        }
    }

    /// Set the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the denominator bound.
    pub fn with_max_denominator(mut self, max_denominator: i64) -> Self {
        self.max_denominator = max_denominator;
        self
    }

    /// Set the convergent budget.
    pub fn with_max_convergents(mut self, max_convergents: usize) -> Self {
        self.max_convergents = max_convergents;
        self
    }

    /// Check the limits.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance >= 0.0) || self.tolerance.is_infinite() {
            return Err(CoreError::invalid_input(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if self.max_denominator < 1 {
            return Err(CoreError::invalid_input(format!(
                "max denominator must be at least 1, got {}",
                self.max_denominator
            )));
        }
        if self.max_convergents == 0 {
            return Err(CoreError::invalid_input("convergent budget must be at least 1"));
        }
        Ok(())
    }

    /// Approximate `x`, stopping at the first convergent that meets the
    /// tolerance, terminates the expansion, or exhausts the convergent budget.
    /// A convergent whose denominator would exceed the bound is never
    /// returned; the previous one is.
    pub fn approximate(&self, x: f64) -> Result<Approximation> {
        self.validate()?;

        let budget = self.max_convergents.min(MAX_EXPANSION_DEPTH);
        let mut convergents = Convergents::new(x)?;
        let mut best: Option<Rational> = None;
        let mut count = 0;

        let stop = loop {
            let Some(c) = convergents.next() else {
                // |h - x k| < 1, so an overflowing numerator also means a
                // denominator past the bound whenever |x| times the bound fits
                let numerator_implies_bound =
                    (x.abs() + 1.0) * (self.max_denominator as f64) < i64::MAX as f64;
                break match convergents.overflow() {
                    Some(OverflowKind::Denominator) => StopReason::DenominatorLimit,
                    Some(OverflowKind::Numerator) if numerator_implies_bound => {
                        StopReason::DenominatorLimit
                    }
                    _ => StopReason::Overflow,
                };
            };
            if c.value.den() > self.max_denominator {
                break StopReason::DenominatorLimit;
            }
            count += 1;
            best = Some(c.value);

            if (x - c.value.to_f64()).abs() < self.tolerance {
                break StopReason::WithinTolerance;
            }
            if c.exact {
                break StopReason::Exact;
            }
            if count >= budget {
                break StopReason::ConvergentLimit;
            }
        };

        let value = best.ok_or_else(|| {
            CoreError::invalid_input(format!("{} has no convergent representable in i64", x))
        })?;

        Ok(Approximation {
            value,
            error: (x - value.to_f64()).abs(),
            convergents: count,
            stop,
        })
    }
}

/// Find `p/q` approximating `x` with `|x - p/q| < tolerance`, or the last
/// convergent with `q <= max_denominator`, or the `max_convergents`-th
/// convergent, whichever comes first.
pub fn rational_approximation(
    x: f64,
    tolerance: f64,
    max_denominator: i64,
    max_convergents: usize,
) -> Result<Rational> {
    RationalApproximator::new(tolerance, max_denominator, max_convergents)
        .approximate(x)
        .map(|a| a.value)
}

/// The first `count` convergents of `x` in increasing-denominator order.
///
/// Fewer are returned if the expansion terminates first.
pub fn best_approximations(x: f64, count: usize) -> Result<Vec<Rational>> {
    Ok(Convergents::new(x)?.take(count).map(|c| c.value).collect())
}

/// Truncated continued-fraction expansion `[a0; a1, a2, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuedFraction {
    terms: Vec<i64>,
    value: Rational,
    error_bound: f64,
}

impl ContinuedFraction {
    /// Expand `x` to at most `size` partial quotients.
    pub fn expand(x: f64, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(CoreError::invalid_input("expansion size must be at least 1"));
        }
        let mut convergents = Convergents::new(x)?;
        let mut terms = Vec::with_capacity(size.min(MAX_EXPANSION_DEPTH));
        let mut last: Option<Convergent> = None;

        for c in convergents.by_ref().take(size) {
            terms.push(c.term);
            last = Some(c);
        }
        let last = last.ok_or_else(|| {
            CoreError::invalid_input(format!("{} has no convergent representable in i64", x))
        })?;

        // |x - h_n/k_n| < 1 / (k_n k_{n+1}) <= 1 / k_n^2
        let k = last.value.den() as f64;
        let error_bound = if last.exact {
            0.0
        } else {
            match convergents.next() {
                Some(next) => (k * next.value.den() as f64).recip(),
                None => (k * k).recip(),
            }
        };

        Ok(Self {
            terms,
            value: last.value,
            error_bound,
        })
    }

    /// Partial quotients.
    pub fn terms(&self) -> &[i64] {
        &self.terms
    }

    /// Value of the truncated fraction.
    pub fn value(&self) -> Rational {
        self.value
    }

    /// Upper bound on the distance between `x` and [`Self::value`].
    pub fn error_bound(&self) -> f64 {
        self.error_bound
    }
}
