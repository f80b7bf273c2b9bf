//! Verdict aggregation and recommendations.

use metricgate_types::{
    ComparisonResult, ComparisonStatus, ComparisonSummary, OverallStatus, RuleEvaluationResult,
    Severity, metric_names as names,
};

/// Line coverage below this percentage triggers a recommendation.
pub const COVERAGE_TARGET_PCT: f64 = 80.0;

/// Degradations larger than this (in percent) get their own recommendation.
pub const DEGRADATION_ALERT_PCT: f64 = 10.0;

pub const ALL_CLEAR: &str = "All metrics are within acceptable ranges.";

fn failed_with(eval: &RuleEvaluationResult, severity: Severity) -> bool {
    !eval.passed && eval.rule.severity == severity
}

pub fn build_summary(evaluations: &[RuleEvaluationResult]) -> ComparisonSummary {
    let failed_count = |severity: Severity| {
        evaluations
            .iter()
            .filter(|e| failed_with(e, severity))
            .count() as u32
    };

    ComparisonSummary {
        total: evaluations.len() as u32,
        passed: evaluations.iter().filter(|e| e.passed).count() as u32,
        failed: failed_count(Severity::Error),
        warnings: failed_count(Severity::Warning),
    }
}

/// Worst-case verdict. Failed `info` rules never affect it.
pub fn overall_status(evaluations: &[RuleEvaluationResult]) -> OverallStatus {
    if evaluations.iter().any(|e| failed_with(e, Severity::Error)) {
        OverallStatus::Fail
    } else if evaluations.iter().any(|e| failed_with(e, Severity::Warning)) {
        OverallStatus::Warning
    } else {
        OverallStatus::Pass
    }
}

pub fn generate_recommendations(
    comparisons: &[ComparisonResult],
    evaluations: &[RuleEvaluationResult],
) -> Vec<String> {
    let mut out = Vec::new();

    for eval in evaluations.iter().filter(|e| failed_with(e, Severity::Error)) {
        out.push(format!(
            "Critical: {} has degraded significantly. Consider investigating the root cause.",
            eval.comparison.metric
        ));
    }

    for c in comparisons.iter().filter(|c| {
        c.status == ComparisonStatus::Degraded && c.delta_percentage.abs() > DEGRADATION_ALERT_PCT
    }) {
        out.push(format!(
            "{} has degraded by {:.2}%. Review recent changes that may have affected this metric.",
            c.metric,
            c.delta_percentage.abs()
        ));
    }

    if let Some(lines) = comparisons.iter().find(|c| c.metric == names::COVERAGE_LINES) {
        if lines.current < COVERAGE_TARGET_PCT {
            out.push(format!(
                "Line coverage is {:.2}%, below the {COVERAGE_TARGET_PCT}% threshold. \
                 Consider adding tests to reach at least {COVERAGE_TARGET_PCT}% coverage.",
                lines.current
            ));
        }
    }

    if let Some(failed) = comparisons.iter().find(|c| c.metric == names::TESTS_FAILED) {
        if failed.current > 0.0 {
            out.push(format!(
                "{} test(s) are failing. Fix failing tests before deploying.",
                failed.current
            ));
        }
    }

    if out.is_empty() {
        out.push(ALL_CLEAR.to_string());
    }
    out
}
