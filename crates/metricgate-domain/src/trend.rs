//! Longitudinal trend statistics over a snapshot history.

use crate::{DirectionClassifier, DomainError, finite_or_zero};
use metricgate_error::{MIN_TREND_SNAPSHOTS, ValidationError};
use metricgate_types::{
    MetricsSnapshot, TrendAxis, TrendDirection, TrendPoint, TrendResult, metric_names as names,
};
use serde_json::Value;
use statrs::statistics::Statistics;

/// Coefficient of variation above which a series is `volatile`.
pub const VOLATILITY_THRESHOLD: f64 = 0.2;

/// Slopes smaller than this in magnitude are `stable`.
pub const STABLE_SLOPE: f64 = 0.001;

/// Resolve a dotted metric path against one snapshot.
///
/// Generated metric names (`tests.passRate`, `performance.<name>.<unit>`)
/// resolve the same way the comparison generator computes them. Any other
/// path walks the snapshot's JSON form; numeric segments index into arrays.
/// Missing or non-numeric values read as 0.
pub fn metric_value(snapshot: &MetricsSnapshot, path: &str) -> f64 {
    if path == names::TESTS_PASS_RATE {
        return snapshot.tests.pass_rate();
    }
    if let Some(key) = path.strip_prefix(names::PERFORMANCE_PREFIX) {
        if let Some(perf) = snapshot.performance.iter().rev().find(|p| p.key() == key) {
            return perf.value;
        }
    }

    let Ok(root) = serde_json::to_value(snapshot) else {
        return 0.0;
    };
    let mut node = &root;
    for segment in path.split('.') {
        let next = match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) => node = v,
            None => return 0.0,
        }
    }
    node.as_f64().unwrap_or(0.0)
}

/// Classify how a metric moved across a history of at least two snapshots.
///
/// Points are sorted by `created_at` (stable for ties). Slope and Pearson
/// correlation regress value against `axis`; volatility is the population
/// standard deviation over the absolute mean. Non-finite results read as 0.
pub fn analyze_trend(
    snapshots: &[MetricsSnapshot],
    metric_path: &str,
    axis: TrendAxis,
    classifier: &DirectionClassifier,
) -> Result<TrendResult, DomainError> {
    if snapshots.len() < MIN_TREND_SNAPSHOTS {
        return Err(ValidationError::InsufficientSnapshots {
            required: MIN_TREND_SNAPSHOTS,
            actual: snapshots.len(),
        }
        .into());
    }

    let mut ordered: Vec<&MetricsSnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.created_at);

    let points: Vec<TrendPoint> = ordered
        .iter()
        .map(|s| TrendPoint {
            timestamp: s.created_at,
            value: metric_value(s, metric_path),
        })
        .collect();

    let xs: Vec<f64> = match axis {
        TrendAxis::Index => (0..points.len()).map(|i| i as f64).collect(),
        TrendAxis::Elapsed => {
            let origin = points[0].timestamp;
            points
                .iter()
                .map(|p| (p.timestamp - origin).num_milliseconds() as f64 / 1000.0)
                .collect()
        }
    };
    let ys: Vec<f64> = points.iter().map(|p| p.value).collect();

    let (slope, correlation) = regress(&xs, &ys);
    let volatility = coefficient_of_variation(&ys);

    let direction = match performance_category(&ordered, metric_path) {
        Some(category) => classifier.classify_with_category(metric_path, category),
        None => classifier.classify(metric_path),
    };

    let trend = if volatility > VOLATILITY_THRESHOLD {
        TrendDirection::Volatile
    } else if slope.abs() < STABLE_SLOPE {
        TrendDirection::Stable
    } else if direction.favors(slope) {
        TrendDirection::Improving
    } else {
        TrendDirection::Declining
    };

    Ok(TrendResult {
        metric: metric_path.to_string(),
        axis,
        trend,
        slope,
        correlation,
        volatility,
        values: points,
    })
}

/// Ordinary-least-squares slope and Pearson correlation of `ys` on `xs`.
fn regress(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let cov = xs.iter().covariance(ys.iter());
    let var_x = xs.iter().variance();
    let slope = finite_or_zero(cov / var_x);
    let correlation = finite_or_zero(cov / (xs.iter().std_dev() * ys.iter().std_dev()));
    (slope, correlation)
}

fn coefficient_of_variation(ys: &[f64]) -> f64 {
    let mean = ys.iter().mean();
    if mean == 0.0 {
        return 0.0;
    }
    finite_or_zero(ys.iter().population_std_dev() / mean.abs())
}

/// Category of a `performance.<name>.<unit>` path, newest snapshot first.
fn performance_category(
    ordered: &[&MetricsSnapshot],
    metric_path: &str,
) -> Option<metricgate_types::PerformanceCategory> {
    let key = metric_path.strip_prefix(names::PERFORMANCE_PREFIX)?;
    ordered
        .iter()
        .rev()
        .flat_map(|s| s.performance.iter().rev())
        .find(|p| p.key() == key)
        .map(|p| p.category)
}
