//! Domain logic for metricgate.
//!
//! This crate is intentionally I/O-free: it does math and policy.
//! Every function is a pure function of its arguments, so callers may share
//! a [`DirectionClassifier`] or [`Comparator`] across threads freely.

mod comparator;
mod direction;
mod generator;
mod rules;
mod summary;
mod trend;

pub use comparator::{Comparator, UNCHANGED_THRESHOLD_PCT, compare_metric, delta_percentage};
pub use direction::{DirectionClassifier, LOWER_IS_BETTER_HINTS, category_direction};
pub use generator::{apply_filters, generate_comparisons};
pub use rules::{EQ_TOLERANCE, MetricPattern, check_operator, evaluate_rule, evaluate_rules};
pub use summary::{
    ALL_CLEAR, COVERAGE_TARGET_PCT, DEGRADATION_ALERT_PCT, build_summary,
    generate_recommendations, overall_status,
};
pub use trend::{STABLE_SLOPE, VOLATILITY_THRESHOLD, analyze_trend, metric_value};

use metricgate_error::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("rule '{rule}' has a metric pattern that cannot be compiled: {pattern}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Round half away from zero to `precision` decimal places.
///
/// Negative zero is normalized so serialized reports never carry `-0.0`.
/// Values too large to scale are returned unrounded.
pub(crate) fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// NaN and infinities collapse to zero.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
