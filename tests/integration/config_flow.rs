use metricgate_types::{ConfigFile, Direction, Severity, ThresholdValueType};
use metricgate_validation::validate_threshold_rule;

const SAMPLE: &str = r#"
[defaults]
precision_digits = 3
include_unchanged = true
exclude_metrics = ["performance.rss"]

[directions]
"performance.cacheHitRatio.pct" = "higher"

[[rule]]
id = "no-failures"
name = "No failing tests"
metric = "tests.failed"
comparison = "lte"
type = "absolute"
value = 0.0
severity = "error"

[[rule]]
name = "Latency budget"
metric = "performance.p95.*"
comparison = "lte"
type = "percentage"
value = 5.0
severity = "warning"
progressive = true
"#;

#[test]
fn sample_config_parses_and_validates() {
    let config: ConfigFile = toml::from_str(SAMPLE).unwrap();

    assert_eq!(config.defaults.precision_digits, Some(3));
    assert_eq!(config.defaults.include_unchanged, Some(true));
    assert_eq!(config.defaults.fail_on_warning, None);
    assert_eq!(
        config.directions.get("performance.cacheHitRatio.pct"),
        Some(&Direction::Higher)
    );

    assert_eq!(config.rules.len(), 2);
    let latency = &config.rules[1];
    assert_eq!(latency.id, "");
    assert!(latency.enabled);
    assert!(latency.progressive);
    assert_eq!(latency.value_type, ThresholdValueType::Percentage);
    assert_eq!(latency.severity, Severity::Warning);

    for rule in &config.rules {
        validate_threshold_rule(rule).unwrap();
    }
}

#[test]
fn config_round_trips_through_toml() {
    let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
    let text = toml::to_string(&config).unwrap();
    let back: ConfigFile = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
}
