//! Integration tests for sigrate-resample.

use sigrate_core::sample::{from_unit_scale, to_unit_scale};
use sigrate_core::{rational_approximation, Complex16, Complex64, Rational};
use sigrate_resample::{
    DoubleResampler, FixedResampler, Normalization, Resample, ResamplerConfig,
    ResamplerGeometry, Stream, ACCUMULATOR_HEADROOM,
};
use std::f64::consts::PI;

/// Generate a complex tone at `frequency` cycles per sample.
fn generate_tone(frequency: f64, num_samples: usize) -> Vec<Complex64> {
    (0..num_samples)
        .map(|i| Complex64::from_polar(1.0, 2.0 * PI * frequency * i as f64))
        .collect()
}

/// Largest distance between two signals over `range`.
fn max_error(a: &[Complex64], b: &[Complex64], range: std::ops::Range<usize>) -> f64 {
    range.map(|i| (a[i] - b[i]).norm()).fold(0.0, f64::max)
}

// ============================================================================
// Impulse Scenario
// ============================================================================

#[test]
fn test_impulse_8000_to_11025() {
    let mut resampler = DoubleResampler::new(8000.0, 11025.0, 30.0).unwrap();
    let geometry = resampler.geometry().clone();
    assert_eq!(geometry.ratio(), Rational::new(441, 320));

    let mut input = vec![Complex64::new(0.0, 0.0); 201];
    input[100] = Complex64::new(1.0, 0.0);

    let capacity = resampler.core().history().capacity();
    let mut outputs = Vec::new();
    let mut last_window = (i64::MIN, i64::MIN);
    for &x in &input {
        resampler.push(x);

        let window = (resampler.min_output_index(), resampler.max_output_index());
        assert!(window.0 >= last_window.0 && window.1 >= last_window.1);
        assert_eq!(
            window.0,
            geometry.min_output_index(resampler.pushed(), capacity)
        );
        assert_eq!(window.1, geometry.max_output_index(resampler.pushed()));
        last_window = window;

        for n in (outputs.len() as i64).max(window.0)..=window.1 {
            assert_eq!(n, outputs.len() as i64);
            outputs.push(resampler.evaluate(n));
        }
    }
    assert_eq!(outputs.len(), 233);

    // Each output is the kernel at its offset from the impulse
    for (n, y) in outputs.iter().enumerate() {
        let l = geometry.tap_offset(n as i64, 100);
        assert!((y.re - resampler.tap(l)).abs() < 1e-12, "n={}", n);
        assert!((y.re - resampler.tap(-l)).abs() < 1e-9, "n={}", n);
        assert_eq!(y.im, 0.0);
    }

    // Single peak at the output nearest input 100
    let peak = outputs
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
        .map(|(n, _)| n)
        .unwrap();
    assert_eq!(peak, 138);
    for (n, y) in outputs.iter().enumerate() {
        if n != peak {
            assert!(y.norm() < outputs[peak].norm());
        }
    }

    // Outside the kernel support the response is exactly zero
    assert!(outputs[..96].iter().all(|y| y.norm() == 0.0));
    assert!(outputs[180..].iter().all(|y| y.norm() == 0.0));
}

// ============================================================================
// Round Trip
// ============================================================================

fn round_trip_error(window: f64) -> f64 {
    let input = generate_tone(0.05, 2000);

    let mut forward = Stream::new(DoubleResampler::new(8000.0, 11025.0, window).unwrap());
    let mut backward = Stream::new(DoubleResampler::new(11025.0, 8000.0, window).unwrap());

    let middle = forward.process(&input);
    let expected: Vec<Complex64> = (0..middle.len())
        .map(|n| Complex64::from_polar(1.0, 2.0 * PI * 0.05 * n as f64 * 320.0 / 441.0))
        .collect();
    let forward_error = max_error(&middle, &expected, 200..middle.len());

    let output = backward.process(&middle);
    assert!(output.len() > 1500, "only {} samples", output.len());
    let backward_error = max_error(&output, &input, 200..output.len());

    forward_error.max(backward_error)
}

#[test]
fn test_round_trip_tone() {
    let coarse = round_trip_error(3.0);
    let fine = round_trip_error(30.0);
    assert!(fine < 5e-3, "error {} at W=30", fine);
    assert!(fine < coarse, "W=30 error {} not below W=3 error {}", fine, coarse);
}

#[test]
fn test_tone_preserves_phase_downsampling() {
    let input = generate_tone(0.02, 3000);
    let mut stream = Stream::new(DoubleResampler::new(48000.0, 22050.0, 30.0).unwrap());
    let output = stream.process(&input);

    // Output n sits at input n * 320 / 147
    let expected: Vec<Complex64> = (0..output.len())
        .map(|n| Complex64::from_polar(1.0, 2.0 * PI * 0.02 * n as f64 * 320.0 / 147.0))
        .collect();
    assert!(max_error(&output, &expected, 100..output.len()) < 5e-3);
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_geometry_is_deterministic() {
    let a = ResamplerGeometry::new(44100.0, 48000.0, 30.0).unwrap();
    let b = ResamplerGeometry::new(44100.0, 48000.0, 30.0).unwrap();
    assert_eq!(a, b);

    let mut x = DoubleResampler::from_geometry(a).unwrap();
    let mut y = FixedResampler::from_geometry(b, Normalization::Divide).unwrap();
    for i in 0..500 {
        assert_eq!(x.output_range(), y.output_range(), "after {} pushes", i);
        x.push(Complex64::new(0.0, 0.0));
        y.push(Complex16::new(0, 0));
    }
}

#[test]
fn test_common_rate_pairs() {
    let cases = [
        (22050.0, 48000.0, Rational::new(320, 147)),
        (48000.0, 22050.0, Rational::new(147, 320)),
        (44100.0, 48000.0, Rational::new(160, 147)),
        (8000.0, 11025.0, Rational::new(441, 320)),
        (16000.0, 8000.0, Rational::new(1, 2)),
    ];
    for (from, to, expected) in cases {
        let geometry = ResamplerGeometry::new(from, to, 30.0).unwrap();
        assert_eq!(geometry.ratio(), expected, "{} -> {}", from, to);
    }
    assert_eq!(
        rational_approximation(22050.0 / 48000.0, 1e-6, 1000, 10).unwrap(),
        Rational::new(147, 320)
    );
}

// ============================================================================
// Fixed Point
// ============================================================================

#[test]
fn test_fixed_point_clipping() {
    let mut resampler = FixedResampler::new(8000.0, 11025.0, 30.0).unwrap();
    let geometry = resampler.geometry().clone();
    let alpha = resampler.alpha() as i64;

    // Output whose polyphase branch has the largest tap mass
    let branch_mass = |n: i64| -> i64 {
        let (first, last) = geometry.input_span(n);
        (first..=last)
            .map(|m| {
                let l = geometry.tap_offset(n, m);
                resampler.taps()[(l - geometry.gmin()) as usize].abs() as i64
            })
            .sum()
    };
    let target = (300..741).max_by_key(|&n| branch_mass(n)).unwrap();
    assert!(branch_mass(target) > 2 * alpha);

    // Full-scale input matching the sign of every tap
    let (first, last) = geometry.input_span(target);
    let mut m = 0;
    while resampler.max_output_index() < target {
        let value = if m >= first && m <= last {
            let l = geometry.tap_offset(target, m);
            if resampler.tap(l) >= 0.0 {
                i16::MAX
            } else {
                -i16::MAX
            }
        } else {
            0
        };
        resampler.push(Complex16::new(value, 0));
        m += 1;
    }
    assert!(resampler.is_valid_output(target));

    let wide = resampler.evaluate_wide(target);
    assert!(wide.re as i64 > i16::MAX as i64 * alpha);
    assert_eq!(resampler.evaluate(target), Complex16::new(i16::MAX, 0));

    // Rebuilt with inverted signs the clip goes the other way
    let mut negative = FixedResampler::new(8000.0, 11025.0, 30.0).unwrap();
    for _ in 0..resampler.pushed() {
        negative.push(Complex16::new(0, 0));
    }
    for m in first..=last {
        let l = geometry.tap_offset(target, m);
        let value = if resampler.tap(l) >= 0.0 {
            -i16::MAX
        } else {
            i16::MAX
        };
        negative.write_input(m, Complex16::new(0, value)).unwrap();
    }
    assert_eq!(negative.evaluate(target), Complex16::new(0, i16::MIN));
}

/// Alternating-sign full-scale impulses every `period` inputs, the two
/// lanes in opposition.
fn impulse_train(period: usize, len: usize) -> Vec<Complex16> {
    (0..len)
        .map(|i| match (i % period, (i / period) % 2) {
            (0, 0) => Complex16::new(i16::MAX, i16::MIN),
            (0, _) => Complex16::new(i16::MIN, i16::MAX),
            _ => Complex16::new(0, 0),
        })
        .collect()
}

#[test]
fn test_full_scale_impulse_train_saturates() {
    let bound = 32768 * ACCUMULATOR_HEADROOM;
    for normalization in [Normalization::Divide, Normalization::Shift] {
        for period in [1, 2, 3, 5, 11, 64] {
            let geometry = ResamplerGeometry::new(8000.0, 11025.0, 30.0).unwrap();
            let mut resampler = FixedResampler::from_geometry(geometry, normalization).unwrap();
            let (alpha, shift) = (resampler.alpha(), resampler.shift());
            let normalize = |v: i32| match normalization {
                Normalization::Divide => v / alpha,
                Normalization::Shift => v >> shift,
            };

            let mut next = 0;
            for x in impulse_train(period, 600) {
                resampler.push(x);
                for n in next.max(resampler.min_output_index())..=resampler.max_output_index() {
                    let wide = resampler.evaluate_wide(n);
                    assert!((wide.re as i64).abs() <= bound, "period={}", period);
                    assert!((wide.im as i64).abs() <= bound, "period={}", period);

                    let y = resampler.evaluate(n);
                    assert_eq!(y.re as i32, normalize(wide.re).clamp(-32768, 32767));
                    assert_eq!(y.im as i32, normalize(wide.im).clamp(-32768, 32767));
                    next = n + 1;
                }
            }
            assert!(next > 700, "{:?} period={} next={}", normalization, period, next);
        }
    }
}

#[test]
fn test_fixed_tracks_double() {
    let input = generate_tone(0.03, 1500);
    let quantized: Vec<Complex16> = input.iter().map(|&x| from_unit_scale(x * 0.5)).collect();

    let mut double = Stream::new(DoubleResampler::new(8000.0, 11025.0, 16.0).unwrap());
    let mut fixed = Stream::new(FixedResampler::new(8000.0, 11025.0, 16.0).unwrap());
    let reference = double.process(&input);
    let output = fixed.process(&quantized);
    assert_eq!(reference.len(), output.len());

    // 32 LSB at unit scale
    for (r, y) in reference.iter().zip(&output).skip(50) {
        let error = *r * 0.5 - to_unit_scale(*y);
        assert!(error.re.abs() < 32.0 / 32768.0);
        assert!(error.im.abs() < 32.0 / 32768.0);
    }
}

// ============================================================================
// Stream
// ============================================================================

#[test]
fn test_stream_output_counts() {
    let rates = [
        (8000.0, 11025.0),
        (11025.0, 8000.0),
        (44100.0, 48000.0),
        (48000.0, 44100.0),
        (1000.0, 1000.0),
        (8000.0, 16000.0),
        (16000.0, 8000.0),
    ];
    for (from, to) in rates {
        let mut stream = Stream::new(DoubleResampler::new(from, to, 12.0).unwrap());
        let input = generate_tone(0.01, 777);
        let mut output = Vec::new();
        for chunk in input.chunks(100) {
            stream.process_into(chunk, &mut output);
        }
        output.extend(stream.flush());

        let ratio = stream.resampler().ratio();
        let expected = (ratio * 776.0).floor() as usize + 1;
        assert_eq!(output.len(), expected, "{} -> {}", from, to);
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_from_json_defaults() {
    let config: ResamplerConfig =
        serde_json::from_str(r#"{"input_rate": 8000.0, "output_rate": 11025.0}"#).unwrap();
    assert_eq!(config, ResamplerConfig::new(8000.0, 11025.0));
    assert_eq!(config.window, 30.0);

    let resampler = config.build_double().unwrap();
    assert_eq!(resampler.geometry().ratio(), Rational::new(441, 320));
}

#[test]
fn test_config_from_json_overrides() {
    let json = r#"{
        "input_rate": 48000,
        "output_rate": 44100,
        "window": 16.0,
        "approximation": { "max_denominator": 100 },
        "normalization": "shift"
    }"#;
    let config: ResamplerConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.window, 16.0);
    assert_eq!(config.approximation.max_denominator, 100);
    assert_eq!(config.approximation.tolerance, 1e-6);
    assert_eq!(config.normalization, Normalization::Shift);

    // 147/160 needs a denominator above 100
    let fixed = config.build_fixed().unwrap();
    assert!(fixed.geometry().q() <= 100);
    assert_eq!(fixed.normalization(), Normalization::Shift);

    let text = serde_json::to_string(&config).unwrap();
    assert!(text.contains(r#""normalization":"shift""#));
}

#[test]
fn test_config_rejects_bad_values() {
    let config: ResamplerConfig =
        serde_json::from_str(r#"{"input_rate": -1.0, "output_rate": 8000.0}"#).unwrap();
    assert!(config.build_double().unwrap_err().is_invalid_input());

    assert!(serde_json::from_str::<ResamplerConfig>(r#"{"input_rate": 8000.0}"#).is_err());
}
