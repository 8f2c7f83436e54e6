#![no_main]

//! Fuzz target for continued-fraction approximation.
//!
//! Any finite input with valid limits must yield a reduced fraction inside
//! the denominator bound; invalid inputs must be rejected, never panic.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sigrate_core::{ContinuedFraction, RationalApproximator, StopReason};

#[derive(Arbitrary, Debug)]
struct ApproximationInput {
    x: f64,
    tolerance: f64,
    max_denominator: i64,
    max_convergents: u8,
}

fuzz_target!(|input: ApproximationInput| {
    let approximator = RationalApproximator::new(
        input.tolerance,
        input.max_denominator,
        input.max_convergents as usize,
    );

    match approximator.approximate(input.x) {
        Ok(a) => {
            assert!(a.value.den() > 0);
            assert!(a.value.den() <= input.max_denominator);
            assert!(a.convergents >= 1 && a.convergents <= input.max_convergents as usize);
            if a.stop == StopReason::WithinTolerance {
                assert!(a.error < input.tolerance);
            }
        }
        Err(e) => assert!(e.is_invalid_input()),
    }

    if let Ok(cf) = ContinuedFraction::expand(input.x, input.max_convergents as usize) {
        assert!(cf.terms().len() <= input.max_convergents as usize);
        assert!(cf.error_bound() >= 0.0);
    }
});
