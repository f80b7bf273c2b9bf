use super::{at, perf_mut, snapshot};
use metricgate_app::{
    Clock, CompareRequest, CompareUseCase, IdGenerator, baseline_from_snapshot, render_markdown,
};
use metricgate_domain::{Comparator, generate_comparisons};
use metricgate_error::{COMPARISON_ERROR, ErrorCode, ValidationError};
use metricgate_types::{
    ComparisonOperator, ComparisonOptions, ComparisonReport, ComparisonStatus, OverallStatus,
    Severity, ThresholdRule, ThresholdValueType,
};
use metricgate_validation::validate_metrics_snapshot;
use std::collections::BTreeMap;

struct FrozenClock;

impl Clock for FrozenClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        at(30)
    }
}

struct FixedId;

impl IdGenerator for FixedId {
    fn next_id(&self) -> String {
        "report-fixed".to_string()
    }
}

fn rule(metric: &str, op: ComparisonOperator, kind: ThresholdValueType, value: f64, severity: Severity) -> ThresholdRule {
    ThresholdRule {
        id: metric.to_string(),
        name: format!("gate on {metric}"),
        metric: metric.to_string(),
        comparison: op,
        value_type: kind,
        value,
        severity,
        progressive: false,
        enabled: true,
    }
}

fn release_rules() -> Vec<ThresholdRule> {
    vec![
        rule("tests.failed", ComparisonOperator::Lte, ThresholdValueType::Absolute, 0.0, Severity::Error),
        rule("coverage.*.percentage", ComparisonOperator::Gte, ThresholdValueType::Absolute, -0.5, Severity::Warning),
        rule("performance.p95.*", ComparisonOperator::Lte, ThresholdValueType::Percentage, 5.0, Severity::Error),
        rule("performance.rss.mb", ComparisonOperator::Lte, ThresholdValueType::Percentage, 20.0, Severity::Info),
    ]
}

fn run(current: metricgate_types::MetricsSnapshot, rules: Vec<ThresholdRule>) -> ComparisonReport {
    CompareUseCase::new(FrozenClock, FixedId)
        .execute(CompareRequest {
            current,
            baseline: baseline_from_snapshot(snapshot("base", 0, 400, 0, 84.0)),
            rules,
            options: ComparisonOptions::default(),
            directions: BTreeMap::new(),
        })
        .unwrap()
}

#[test]
fn report_is_deterministic_with_fixed_clock_and_ids() {
    let a = serde_json::to_string(&run(snapshot("cur", 1, 398, 2, 83.0), release_rules())).unwrap();
    let b = serde_json::to_string(&run(snapshot("cur", 1, 398, 2, 83.0), release_rules())).unwrap();
    assert_eq!(a, b);
    assert!(a.contains("\"id\":\"report-fixed\""));
}

#[test]
fn info_failures_never_change_the_verdict() {
    let mut current = snapshot("cur", 1, 400, 0, 84.0);
    perf_mut(&mut current, "rss").value = 1024.0;

    let report = run(current, release_rules());
    let rss = report
        .rule_evaluations
        .iter()
        .find(|e| e.comparison.metric == "performance.rss.mb")
        .unwrap();
    assert!(!rss.passed);
    assert_eq!(rss.rule.severity, Severity::Info);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.summary.warnings, 0);
    assert_eq!(report.overall_status, OverallStatus::Pass);
}

#[test]
fn every_evaluation_references_a_reported_comparison() {
    let mut current = snapshot("cur", 1, 395, 5, 80.0);
    perf_mut(&mut current, "p95").value = 200.0;
    let report = run(current, release_rules());

    assert_eq!(report.overall_status, OverallStatus::Fail);
    for eval in &report.rule_evaluations {
        assert!(report.comparisons.contains(&eval.comparison));
        assert!(eval.rule.enabled);
    }
    let total = report.summary.total as usize;
    assert_eq!(total, report.rule_evaluations.len());
}

#[test]
fn report_comparisons_match_the_generator() {
    let current = snapshot("cur", 1, 398, 2, 83.0);
    let baseline = snapshot("base", 0, 400, 0, 84.0);
    let expected = generate_comparisons(
        &current,
        &baseline,
        &ComparisonOptions::default(),
        &Comparator::default(),
    );
    let report = run(current, vec![]);
    assert_eq!(report.comparisons, expected);
    assert!(
        report
            .comparisons
            .iter()
            .all(|c| c.status != ComparisonStatus::Unchanged)
    );
}

#[test]
fn invalid_current_snapshot_fails_validation_before_comparison() {
    let mut current = snapshot("cur", 1, 398, 2, 83.0);
    current.coverage.lines.covered = current.coverage.lines.total + 1;
    assert!(validate_metrics_snapshot(&current).is_err());

    let err = CompareUseCase::new(FrozenClock, FixedId)
        .execute(CompareRequest {
            current,
            baseline: baseline_from_snapshot(snapshot("base", 0, 400, 0, 84.0)),
            rules: release_rules(),
            options: ComparisonOptions::default(),
            directions: BTreeMap::new(),
        })
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
    assert!(matches!(
        err,
        metricgate_error::EngineError::Validation(ValidationError::InvalidSnapshot { .. })
    ));
}

#[test]
fn oversized_pattern_surfaces_as_comparison_error() {
    let rules = vec![rule(
        &"*?".repeat(100_000),
        ComparisonOperator::Gte,
        ThresholdValueType::Absolute,
        0.0,
        Severity::Error,
    )];
    let err = CompareUseCase::new(FrozenClock, FixedId)
        .execute(CompareRequest {
            current: snapshot("cur", 1, 398, 2, 83.0),
            baseline: baseline_from_snapshot(snapshot("base", 0, 400, 0, 84.0)),
            rules,
            options: ComparisonOptions::default(),
            directions: BTreeMap::new(),
        })
        .unwrap_err();
    assert_eq!(err.code().as_str(), COMPARISON_ERROR);
}

#[test]
fn markdown_summarizes_the_report() {
    let report = run(snapshot("cur", 1, 398, 2, 83.0), release_rules());
    let md = render_markdown(&report);
    assert!(md.starts_with("❌ metricgate: fail"));
    assert!(md.contains("`tests.failed`"));
    assert!(md.contains("**Recommendations:**"));
}
