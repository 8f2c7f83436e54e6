//! Precision-independent resampler state.
//!
//! [`ResamplerCore`] couples a [`ResamplerGeometry`] with the input history
//! and answers the bookkeeping questions every variant shares: which output
//! indices are currently computable, and which stored inputs (with which tap
//! offsets) contribute to a given output.

use crate::error::Result;
use crate::geometry::ResamplerGeometry;
use sigrate_core::HistoryBuffer;

/// Input history plus geometry, generic over the sample type.
#[derive(Debug, Clone)]
pub struct ResamplerCore<T> {
    geometry: ResamplerGeometry,
    history: HistoryBuffer<T>,
}

impl<T: Clone> ResamplerCore<T> {
    /// Create a core whose history reads as `fill` before the first push.
    pub fn new(geometry: ResamplerGeometry, fill: T) -> Result<Self> {
        // One slot beyond the kernel span keeps the output window non-empty
        let history = HistoryBuffer::new(geometry.history_len() + 1, fill)?;
        Ok(Self { geometry, history })
    }
}

impl<T> ResamplerCore<T> {
    /// The geometry this core was built with.
    #[inline]
    pub fn geometry(&self) -> &ResamplerGeometry {
        &self.geometry
    }

    /// The input history.
    #[inline]
    pub fn history(&self) -> &HistoryBuffer<T> {
        &self.history
    }

    /// Append the next input sample.
    #[inline]
    pub fn push(&mut self, sample: T) {
        self.history.push(sample);
    }

    /// Total number of inputs pushed.
    #[inline]
    pub fn pushed(&self) -> u64 {
        self.history.pushed()
    }

    /// Overwrite an input that is still retained.
    pub fn write_input(&mut self, m: i64, sample: T) -> Result<()> {
        Ok(self.history.write(m, sample)?)
    }

    /// First output index computable from the current history.
    pub fn min_output_index(&self) -> i64 {
        self.geometry
            .min_output_index(self.history.pushed(), self.history.capacity())
    }

    /// Last output index computable from the current history.
    pub fn max_output_index(&self) -> i64 {
        self.geometry.max_output_index(self.history.pushed())
    }

    /// Inputs contributing to output `n`, each paired with its position in
    /// the tap table (`l - gmin`).
    ///
    /// Reads are unchecked: for `n` outside the output window the samples
    /// are stale or aliased.
    pub fn support(&self, n: i64) -> Support<'_, T> {
        let (first, last) = self.geometry.input_span(n);
        let tap = self.geometry.tap_offset(n, first) - self.geometry.gmin();
        Support {
            history: &self.history,
            next: first,
            last,
            tap,
            stride: self.geometry.p(),
        }
    }
}

/// Iterator over the kernel support of one output.
///
/// Successive inputs are one index apart, so the tap position falls by `p`
/// at each step.
#[derive(Debug, Clone)]
pub struct Support<'a, T> {
    history: &'a HistoryBuffer<T>,
    next: i64,
    last: i64,
    tap: i64,
    stride: i64,
}

impl<'a, T> Iterator for Support<'a, T> {
    type Item = (&'a T, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.last {
            return None;
        }
        let item = (self.history.read(self.next), self.tap as usize);
        self.next += 1;
        self.tap -= self.stride;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last - self.next + 1).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Support<'_, T> {}
