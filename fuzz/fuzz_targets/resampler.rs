#![no_main]

//! Fuzz target for resampler construction and streaming.
//!
//! Arbitrary parameters must either be rejected or yield a resampler whose
//! output window stays consistent while fed arbitrary 16-bit samples.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sigrate_core::Complex16;
use sigrate_resample::{FixedResampler, Resample, ResamplerGeometry, Stream};

#[derive(Arbitrary, Debug)]
struct ResamplerInput {
    input_rate: u16,
    output_rate: u16,
    window: u8,
    shift: bool,
    samples: Vec<(i16, i16)>,
}

fuzz_target!(|input: ResamplerInput| {
    let window = input.window as f64 / 16.0;
    let geometry = match ResamplerGeometry::new(
        input.input_rate as f64,
        input.output_rate as f64,
        window,
    ) {
        Ok(g) => g,
        Err(e) => {
            assert!(e.is_invalid_input());
            return;
        }
    };
    // Keep each run short
    if geometry.tap_count() > 1 << 16 {
        return;
    }

    let resampler = if input.shift {
        FixedResampler::with_shift(input.input_rate as f64, input.output_rate as f64, window)
    } else {
        FixedResampler::new(input.input_rate as f64, input.output_rate as f64, window)
    };
    let Ok(resampler) = resampler else {
        return;
    };

    let samples: Vec<Complex16> = input
        .samples
        .iter()
        .take(4096)
        .map(|&(re, im)| Complex16::new(re, im))
        .collect();

    let mut stream = Stream::new(resampler);
    let mut emitted = stream.process(&samples).len();
    emitted += stream.flush().len();
    assert_eq!(emitted as i64, stream.next_index());

    let r = stream.resampler();
    if r.is_valid_output(r.max_output_index()) {
        assert!(r.try_evaluate(r.max_output_index()).is_ok());
    }
});
