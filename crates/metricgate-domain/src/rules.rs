//! Threshold rule matching and evaluation.

use crate::DomainError;
use metricgate_types::{
    ComparisonOperator, ComparisonResult, RuleEvaluationResult, ThresholdRule, ThresholdValueType,
};
use regex::{Regex, RegexBuilder};

/// Absolute tolerance for `eq` / `ne`.
pub const EQ_TOLERANCE: f64 = 0.001;

/// Compiled-program budget for a single rule pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// A rule's metric pattern compiled to an anchored regular expression.
///
/// Only `*` (any run of characters) and `?` (exactly one character) are
/// special. Every other character, regex metacharacters included, matches
/// itself.
#[derive(Debug, Clone)]
pub struct MetricPattern {
    pattern: String,
    regex: Regex,
}

impl MetricPattern {
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let translated = regex::escape(pattern)
            .replace(r"\*", ".*")
            .replace(r"\?", ".");
        let regex = RegexBuilder::new(&format!("^(?:{translated})$"))
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, metric: &str) -> bool {
        self.regex.is_match(metric)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

pub fn check_operator(op: ComparisonOperator, value: f64, threshold: f64) -> bool {
    match op {
        ComparisonOperator::Gte => value >= threshold,
        ComparisonOperator::Lte => value <= threshold,
        ComparisonOperator::Gt => value > threshold,
        ComparisonOperator::Lt => value < threshold,
        ComparisonOperator::Eq => (value - threshold).abs() < EQ_TOLERANCE,
        ComparisonOperator::Ne => (value - threshold).abs() >= EQ_TOLERANCE,
    }
}

/// Judge one rule against the comparison it matched.
pub fn evaluate_rule(rule: &ThresholdRule, comparison: &ComparisonResult) -> RuleEvaluationResult {
    let (label, value, suffix) = match rule.value_type {
        ThresholdValueType::Percentage => ("change", comparison.delta_percentage, "%"),
        ThresholdValueType::Absolute => ("delta", comparison.delta, ""),
    };
    let passed = check_operator(rule.comparison, value, rule.value);
    let icon = if passed { "✓" } else { "✗" };

    let message = format!(
        "{icon} {metric} {label} ({value}{suffix}) should {phrase} {threshold}{suffix}",
        metric = comparison.metric,
        phrase = rule.comparison.phrase(),
        threshold = rule.value,
    );

    RuleEvaluationResult {
        rule: rule.clone(),
        comparison: comparison.clone(),
        passed,
        message,
    }
}

/// Evaluate every enabled rule against the first comparison its pattern
/// matches. Rules that match nothing are skipped, not failed.
pub fn evaluate_rules(
    rules: &[ThresholdRule],
    comparisons: &[ComparisonResult],
) -> Result<Vec<RuleEvaluationResult>, DomainError> {
    let mut evaluations = Vec::new();

    for rule in rules.iter().filter(|r| r.enabled) {
        let pattern =
            MetricPattern::compile(&rule.metric).map_err(|source| DomainError::InvalidPattern {
                rule: rule.name.clone(),
                pattern: rule.metric.clone(),
                source,
            })?;

        let Some(comparison) = comparisons.iter().find(|c| pattern.matches(&c.metric)) else {
            continue;
        };

        evaluations.push(evaluate_rule(rule, comparison));
    }

    Ok(evaluations)
}
