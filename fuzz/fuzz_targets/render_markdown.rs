#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(report) = serde_json::from_slice::<metricgate_types::ComparisonReport>(data) {
        let md = metricgate_app::render_markdown(&report);
        assert!(md.starts_with(['✅', '⚠', '❌']));
    }
});
