//! Trend use case over a history of snapshots.

use metricgate_domain::{DirectionClassifier, DomainError, analyze_trend};
use metricgate_error::EngineError;
use metricgate_types::{Direction, MetricsSnapshot, TrendAxis, TrendResult};
use metricgate_validation::{validate_metrics_snapshot, validate_non_empty_string};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TrendRequest {
    pub snapshots: Vec<MetricsSnapshot>,

    /// Dotted path into the snapshot, e.g. `coverage.lines.percentage`.
    pub metric: String,

    pub axis: TrendAxis,
    pub directions: BTreeMap<String, Direction>,
}

pub struct TrendUseCase;

impl TrendUseCase {
    pub fn execute(req: TrendRequest) -> Result<TrendResult, EngineError> {
        validate_non_empty_string(&req.metric, "metric")?;
        for snapshot in &req.snapshots {
            validate_metrics_snapshot(snapshot)?;
        }

        let classifier = DirectionClassifier::with_overrides(req.directions);
        let result = analyze_trend(&req.snapshots, &req.metric, req.axis, &classifier).map_err(
            |err| match err {
                DomainError::Validation(v) => EngineError::Validation(v),
                other => EngineError::comparison("failed to analyze trend", other),
            },
        )?;

        debug!(
            metric = %result.metric,
            points = result.values.len(),
            trend = ?result.trend,
            slope = result.slope,
            "trend analyzed"
        );
        Ok(result)
    }
}
