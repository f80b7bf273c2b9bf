//! Rule patterns come from user config, so compiling and matching them
//! must never panic whatever the pattern or metric name.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    pattern: &'a str,
    metric: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    if let Ok(pattern) = metricgate_domain::MetricPattern::compile(input.pattern) {
        let _ = pattern.matches(input.metric);
        assert_eq!(pattern.as_str(), input.pattern);
        if !input.pattern.contains(['*', '?']) {
            assert_eq!(pattern.matches(input.metric), input.pattern == input.metric);
        }
    }
});
