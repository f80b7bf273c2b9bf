//! Single-metric comparison over arbitrary floats, including NaN and
//! infinities, must never panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use metricgate_types::ComparisonStatus;

#[derive(Arbitrary, Debug)]
struct Input {
    metric: String,
    current: f64,
    baseline: f64,
    precision: u8,
}

fuzz_target!(|input: Input| {
    let precision = u32::from(input.precision % 11);
    let result = metricgate_domain::compare_metric(
        &input.metric,
        input.current,
        input.baseline,
        precision,
    );

    if input.current.is_finite() && input.baseline.is_finite() && input.current == input.baseline {
        assert_eq!(result.status, ComparisonStatus::Unchanged);
    }
});
