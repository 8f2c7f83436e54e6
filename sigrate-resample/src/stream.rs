//! Block-oriented driver.
//!
//! [`Stream`] turns the push/evaluate interface into "samples in, samples
//! out": it remembers the next output index to emit and, after every push,
//! emits everything that has become computable.

use crate::Resample;
use sigrate_core::math::div_floor;
use tracing::trace;

/// Lossless block driver over any [`Resample`] variant.
///
/// Outputs are emitted contiguously from index 0. Each output index is
/// evaluable for at least one push count, and the window only moves forward,
/// so draining after every push never skips an index.
#[derive(Debug, Clone)]
pub struct Stream<R> {
    resampler: R,
    next: i64,
    padded: u64,
}

impl<R: Resample> Stream<R> {
    /// Wrap a resampler. Emission starts at output 0, or at the first
    /// output still computable if inputs were already pushed.
    pub fn new(resampler: R) -> Self {
        let next = if resampler.pushed() == 0 {
            0
        } else {
            resampler.min_output_index().max(0)
        };
        Self {
            resampler,
            next,
            padded: 0,
        }
    }

    /// Push `input` and return every output that became computable.
    pub fn process(&mut self, input: &[R::Sample]) -> Vec<R::Sample> {
        let estimate = (input.len() as f64 * self.resampler.ratio()).ceil() as usize + 1;
        let mut output = Vec::with_capacity(estimate);
        self.process_into(input, &mut output);
        output
    }

    /// Push `input`, appending every output that became computable.
    pub fn process_into(&mut self, input: &[R::Sample], output: &mut Vec<R::Sample>) {
        for &sample in input {
            self.resampler.push(sample);
            self.drain(i64::MAX, output);
        }
    }

    /// Index of the next output to be emitted.
    pub fn next_index(&self) -> i64 {
        self.next
    }

    /// The wrapped resampler.
    pub fn resampler(&self) -> &R {
        &self.resampler
    }

    /// Unwrap the resampler.
    pub fn into_inner(self) -> R {
        self.resampler
    }

    fn drain(&mut self, limit: i64, output: &mut Vec<R::Sample>) {
        let last = self.resampler.max_output_index().min(limit);
        debug_assert!(self.next > last || self.next >= self.resampler.min_output_index());
        while self.next <= last {
            output.push(self.resampler.evaluate(self.next));
            self.next += 1;
        }
    }
}

impl<R> Stream<R>
where
    R: Resample,
    R::Sample: Default,
{
    /// Emit the remaining outputs up to the position of the last real input,
    /// pushing silence past the end of the stream as needed.
    ///
    /// Samples processed after a flush follow that silence.
    pub fn flush(&mut self) -> Vec<R::Sample> {
        let mut output = Vec::new();
        let real = self.resampler.pushed() - self.padded;
        if real == 0 {
            return output;
        }

        let geometry = self.resampler.geometry();
        let (p, q) = (geometry.p() as i128, geometry.q() as i128);
        let last = div_floor((real - 1) as i128 * p, q) as i64;
        self.drain(last, &mut output);

        let mut padding = 0usize;
        while self.next <= last {
            self.resampler.push(R::Sample::default());
            self.padded += 1;
            padding += 1;
            self.drain(last, &mut output);
        }

        trace!(
            emitted = output.len(),
            padding,
            next = self.next,
            "Flushed resampler stream"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DoubleResampler, FixedResampler};
    use sigrate_core::{Complex16, Complex64};

    fn ramp(len: usize) -> Vec<Complex64> {
        (0..len)
            .map(|i| Complex64::new(i as f64 * 1e-3, 0.0))
            .collect()
    }

    #[test]
    fn test_outputs_are_contiguous() {
        let mut stream = Stream::new(DoubleResampler::new(8000.0, 11025.0, 16.0).unwrap());
        let mut total = 0;
        for chunk in ramp(1000).chunks(37) {
            total += stream.process(chunk).len();
            assert_eq!(stream.next_index(), total as i64);
        }
        assert!(total > 1000);
    }

    #[test]
    fn test_chunking_does_not_change_output() {
        let input = ramp(500);

        let mut whole = Stream::new(DoubleResampler::new(48000.0, 22050.0, 10.0).unwrap());
        let expected = whole.process(&input);

        let mut chunked = Stream::new(DoubleResampler::new(48000.0, 22050.0, 10.0).unwrap());
        let mut actual = Vec::new();
        for chunk in input.chunks(7) {
            chunked.process_into(chunk, &mut actual);
        }
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_flush_reaches_last_input() {
        let mut stream = Stream::new(DoubleResampler::new(8000.0, 11025.0, 30.0).unwrap());
        let mut output = stream.process(&ramp(400));
        output.extend(stream.flush());

        // Output n sits at input n / gamma; the last one at or before input 399
        let last = (441.0 * 399.0 / 320.0f64).floor() as usize;
        assert_eq!(output.len(), last + 1);
        assert_eq!(stream.next_index(), last as i64 + 1);

        // Nothing more once flushed
        assert!(stream.flush().is_empty());
    }

    #[test]
    fn test_flush_empty_stream() {
        let mut stream = Stream::new(FixedResampler::new(8000.0, 16000.0, 8.0).unwrap());
        assert!(stream.flush().is_empty());
        assert_eq!(stream.next_index(), 0);
    }

    #[test]
    fn test_fixed_stream() {
        let mut stream = Stream::new(FixedResampler::new(16000.0, 8000.0, 8.0).unwrap());
        let input = vec![Complex16::new(1000, -1000); 200];
        let mut output = stream.process(&input);
        output.extend(stream.flush());
        assert_eq!(output.len(), 100);

        let r = stream.into_inner();
        assert!(r.pushed() >= 200);
    }

    #[test]
    fn test_wrap_after_pushes() {
        let mut r = DoubleResampler::new(8000.0, 11025.0, 8.0).unwrap();
        for x in ramp(100) {
            r.push(x);
        }
        let min = r.min_output_index();
        let stream = Stream::new(r);
        assert_eq!(stream.next_index(), min.max(0));
        assert_eq!(stream.resampler().pushed(), 100);
    }
}
