//! Single-metric comparison.

use crate::{DirectionClassifier, round_to};
use metricgate_types::{
    ComparisonResult, ComparisonStatus, DEFAULT_PRECISION, Direction, PerformanceCategory,
};

/// Changes smaller than this (in percent) are reported as `unchanged`.
pub const UNCHANGED_THRESHOLD_PCT: f64 = 0.01;

/// Relative change in percent.
///
/// A zero baseline reports 100 when the metric appeared (current > 0) and
/// 0 otherwise, instead of dividing by zero.
pub fn delta_percentage(current: f64, baseline: f64) -> f64 {
    if baseline != 0.0 {
        (current - baseline) / baseline * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Compare one metric with the default direction table.
pub fn compare_metric(
    metric: &str,
    current: f64,
    baseline: f64,
    precision: u32,
) -> ComparisonResult {
    Comparator::new(precision).compare(metric, current, baseline)
}

/// Comparator configured once (precision, direction table) and reused.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    precision: u32,
    classifier: DirectionClassifier,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl Comparator {
    pub fn new(precision: u32) -> Self {
        Self {
            precision,
            classifier: DirectionClassifier::default(),
        }
    }

    pub fn with_classifier(precision: u32, classifier: DirectionClassifier) -> Self {
        Self {
            precision,
            classifier,
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn classifier(&self) -> &DirectionClassifier {
        &self.classifier
    }

    pub fn compare(&self, metric: &str, current: f64, baseline: f64) -> ComparisonResult {
        let direction = self.classifier.classify(metric);
        self.compare_directed(metric, current, baseline, direction)
    }

    pub fn compare_performance(
        &self,
        metric: &str,
        current: f64,
        baseline: f64,
        category: PerformanceCategory,
    ) -> ComparisonResult {
        let direction = self.classifier.classify_with_category(metric, category);
        self.compare_directed(metric, current, baseline, direction)
    }

    fn compare_directed(
        &self,
        metric: &str,
        current: f64,
        baseline: f64,
        direction: Direction,
    ) -> ComparisonResult {
        let delta = current - baseline;
        let pct = delta_percentage(current, baseline);

        let status = if pct.abs() < UNCHANGED_THRESHOLD_PCT {
            ComparisonStatus::Unchanged
        } else if direction.favors(delta) {
            ComparisonStatus::Improved
        } else {
            ComparisonStatus::Degraded
        };

        ComparisonResult {
            metric: metric.to_string(),
            current: round_to(current, self.precision),
            baseline: round_to(baseline, self.precision),
            delta: round_to(delta, self.precision),
            delta_percentage: round_to(pct, self.precision),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn duration_drop_is_an_improvement() {
        let r = compare_metric("tests.duration", 900.0, 1000.0, 2);
        assert_eq!(r.delta, -100.0);
        assert_eq!(r.delta_percentage, -10.0);
        assert_eq!(r.status, ComparisonStatus::Improved);
    }

    #[test]
    fn more_passing_tests_is_an_improvement() {
        let r = compare_metric("tests.passed", 105.0, 95.0, 2);
        assert_eq!(r.delta, 10.0);
        assert_relative_eq!(r.delta_percentage, 10.53);
        assert_eq!(r.status, ComparisonStatus::Improved);
    }

    #[test]
    fn huge_values_survive_rounding_and_serialization() {
        let r = compare_metric("performance.bytes.b", 1e300, 1e300, 10);
        assert!(r.current.is_finite());
        assert!(r.baseline.is_finite());
        assert_eq!(r.current, 1e300);
        assert_eq!(r.delta, 0.0);
        assert_eq!(r.status, ComparisonStatus::Unchanged);

        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("null"), "{json}");
        let back: ComparisonResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn more_skipped_tests_is_a_degradation() {
        let r = compare_metric("tests.skipped", 6.0, 2.0, 2);
        assert_eq!(r.status, ComparisonStatus::Degraded);
        let r = compare_metric("tests.skipped", 1.0, 2.0, 2);
        assert_eq!(r.status, ComparisonStatus::Improved);
    }

    #[test]
    fn coverage_drop_is_a_degradation() {
        let r = compare_metric("coverage.lines.percentage", 70.0, 95.0, 2);
        assert_eq!(r.status, ComparisonStatus::Degraded);
        assert_eq!(r.delta, -25.0);
    }

    #[test]
    fn more_failures_is_a_degradation() {
        let r = compare_metric("tests.failed", 3.0, 1.0, 2);
        assert_eq!(r.status, ComparisonStatus::Degraded);
        assert_eq!(r.delta_percentage, 200.0);
    }

    #[test]
    fn zero_baseline_reports_full_increase_for_new_metric() {
        let r = compare_metric("performance.cacheHits.count", 12.0, 0.0, 2);
        assert_eq!(r.delta_percentage, 100.0);
        assert_eq!(r.status, ComparisonStatus::Improved);

        let r = compare_metric("performance.cacheHits.count", 0.0, 0.0, 2);
        assert_eq!(r.delta_percentage, 0.0);
        assert_eq!(r.status, ComparisonStatus::Unchanged);
    }

    #[test]
    fn tiny_relative_change_is_unchanged() {
        // 0.005% change
        let r = compare_metric("tests.duration", 100_005.0, 100_000.0, 2);
        assert_eq!(r.status, ComparisonStatus::Unchanged);
    }

    #[test]
    fn inputs_are_rounded_independently_of_math() {
        let r = compare_metric("coverage.lines.percentage", 80.456, 80.123, 2);
        assert_eq!(r.current, 80.46);
        assert_eq!(r.baseline, 80.12);
        // 0.333 computed from the unrounded inputs
        assert_eq!(r.delta, 0.33);
        assert_eq!(r.status, ComparisonStatus::Improved);
    }

    #[test]
    fn precision_is_respected() {
        let r = compare_metric("tests.passed", 105.0, 95.0, 4);
        assert_eq!(r.delta_percentage, 10.5263);
    }

    #[test]
    fn category_decides_custom_named_metric() {
        let c = Comparator::default();
        let r = c.compare_performance(
            "performance.requests.rps",
            900.0,
            1000.0,
            PerformanceCategory::Throughput,
        );
        assert_eq!(r.status, ComparisonStatus::Degraded);

        let r = c.compare_performance(
            "performance.bundle.kb",
            900.0,
            1000.0,
            PerformanceCategory::Size,
        );
        assert_eq!(r.status, ComparisonStatus::Improved);
    }

    proptest! {
        #[test]
        fn identical_values_are_unchanged(
            metric in "[a-zA-Z.]{1,30}",
            x in 0.001f64..1e9,
        ) {
            let r = compare_metric(&metric, x, x, 2);
            prop_assert_eq!(r.delta, 0.0);
            prop_assert_eq!(r.delta_percentage, 0.0);
            prop_assert_eq!(r.status, ComparisonStatus::Unchanged);
        }

        #[test]
        fn status_flips_with_direction(
            current in 1.0f64..1e6,
            baseline in 1.0f64..1e6,
        ) {
            prop_assume!((delta_percentage(current, baseline)).abs() >= UNCHANGED_THRESHOLD_PCT);
            let higher = compare_metric("tests.passed", current, baseline, 2);
            let lower = compare_metric("tests.failed", current, baseline, 2);
            prop_assert_ne!(higher.status, lower.status);
        }
    }
}
