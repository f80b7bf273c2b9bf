#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = toml::from_str::<metricgate_types::ConfigFile>(s) {
            for rule in &config.rules {
                let _ = metricgate_validation::validate_threshold_rule(rule);
            }
        }
    }
});
