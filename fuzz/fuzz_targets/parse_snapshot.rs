#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = serde_json::from_slice::<metricgate_types::MetricsSnapshot>(data) {
        let _ = metricgate_validation::validate_metrics_snapshot(&snapshot);
    }
});
