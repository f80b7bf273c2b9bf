//! Input validation gate for metricgate.
//!
//! Everything here runs before the engine touches the data. Past this gate
//! the engine assumes well-formed snapshots and finite, non-negative numbers.

use metricgate_error::ValidationError;
use metricgate_types::{
    BaselineData, CoverageMetric, MAX_PRECISION, MetricsSnapshot, ThresholdRule,
};

pub fn validate_non_empty_string(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty(field));
    }
    Ok(())
}

/// Rejects NaN, infinities, and negative values. Zero is accepted: a zero
/// baseline is a legitimate "metric did not exist yet" value.
pub fn validate_positive_number(value: f64, field: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidNumber {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

pub fn validate_precision(precision: u32) -> Result<(), ValidationError> {
    if precision > MAX_PRECISION {
        return Err(ValidationError::InvalidPrecision {
            value: precision,
            max: MAX_PRECISION,
        });
    }
    Ok(())
}

pub fn validate_metrics_snapshot(snapshot: &MetricsSnapshot) -> Result<(), ValidationError> {
    let as_snapshot_err = |e: ValidationError| ValidationError::snapshot(e.to_string());

    validate_non_empty_string(&snapshot.id, "snapshot.id").map_err(as_snapshot_err)?;
    validate_non_empty_string(&snapshot.branch, "snapshot.branch").map_err(as_snapshot_err)?;
    validate_non_empty_string(&snapshot.commit, "snapshot.commit").map_err(as_snapshot_err)?;

    let tests = &snapshot.tests;
    let accounted = tests
        .passed
        .checked_add(tests.failed)
        .and_then(|n| n.checked_add(tests.skipped));
    match accounted {
        Some(n) if n <= tests.total => {}
        _ => {
            return Err(ValidationError::snapshot(format!(
                "tests.passed + tests.failed + tests.skipped exceeds tests.total ({})",
                tests.total
            )));
        }
    }
    validate_positive_number(tests.duration, "tests.duration").map_err(as_snapshot_err)?;

    let coverage = &snapshot.coverage;
    for (name, metric) in [
        ("lines", &coverage.lines),
        ("functions", &coverage.functions),
        ("branches", &coverage.branches),
        ("statements", &coverage.statements),
    ] {
        validate_coverage(name, metric)?;
    }

    for (i, perf) in snapshot.performance.iter().enumerate() {
        validate_non_empty_string(&perf.name, &format!("performance[{i}].name"))
            .map_err(as_snapshot_err)?;
        validate_positive_number(perf.value, &format!("performance.{}.{}", perf.name, perf.unit))
            .map_err(as_snapshot_err)?;
    }

    if snapshot.updated_at < snapshot.created_at {
        return Err(ValidationError::snapshot("updatedAt precedes createdAt"));
    }

    Ok(())
}

fn validate_coverage(name: &str, metric: &CoverageMetric) -> Result<(), ValidationError> {
    if metric.covered > metric.total {
        return Err(ValidationError::snapshot(format!(
            "coverage.{name}.covered ({}) exceeds coverage.{name}.total ({})",
            metric.covered, metric.total
        )));
    }
    if !metric.percentage.is_finite() || !(0.0..=100.0).contains(&metric.percentage) {
        return Err(ValidationError::snapshot(format!(
            "coverage.{name}.percentage must be within 0..=100 (got {})",
            metric.percentage
        )));
    }
    Ok(())
}

pub fn validate_baseline_data(baseline: &BaselineData) -> Result<(), ValidationError> {
    let as_baseline_err = |e: ValidationError| ValidationError::baseline(e.to_string());

    validate_non_empty_string(&baseline.id, "baseline.id").map_err(as_baseline_err)?;
    validate_non_empty_string(&baseline.name, "baseline.name").map_err(as_baseline_err)?;
    validate_metrics_snapshot(&baseline.snapshot).map_err(as_baseline_err)?;
    Ok(())
}

/// Rules are caller-supplied per invocation, so they pass the gate too.
pub fn validate_threshold_rule(rule: &ThresholdRule) -> Result<(), ValidationError> {
    validate_non_empty_string(&rule.name, "rule.name")?;
    validate_non_empty_string(&rule.metric, "rule.metric")?;
    if !rule.value.is_finite() {
        return Err(ValidationError::InvalidNumber {
            field: format!("rule '{}' value", rule.name),
            value: rule.value,
        });
    }
    Ok(())
}
