//! Application layer for metricgate.
//!
//! The app layer validates inputs, drives the domain engine, and assembles
//! reports. It does not parse CLI flags and it does not do filesystem I/O.

mod render;
mod trend;

pub use render::render_markdown;
pub use trend::{TrendRequest, TrendUseCase};

use chrono::{DateTime, Utc};
use metricgate_domain::{
    Comparator, DirectionClassifier, DomainError, build_summary, evaluate_rules,
    generate_comparisons, generate_recommendations, overall_status,
};
use metricgate_error::EngineError;
use metricgate_types::{
    BaselineData, ComparisonOptions, ComparisonReport, ComparisonResult, Direction,
    MetricsSnapshot, OverallStatus, REPORT_SCHEMA_V1, ThresholdRule,
};
use metricgate_validation::{
    validate_baseline_data, validate_metrics_snapshot, validate_non_empty_string,
    validate_positive_number, validate_precision, validate_threshold_rule,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of report identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

#[derive(Debug, Default, Clone)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Wrap a bare snapshot as an untagged, non-default baseline.
///
/// The baseline takes the snapshot's id and creation time so the same
/// snapshot always wraps to the same baseline.
pub fn baseline_from_snapshot(snapshot: MetricsSnapshot) -> BaselineData {
    BaselineData {
        id: snapshot.id.clone(),
        name: format!("{}@{}", snapshot.branch, snapshot.commit),
        version: 1,
        is_default: false,
        tags: Vec::new(),
        created_at: snapshot.created_at,
        snapshot,
    }
}

#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub current: MetricsSnapshot,
    pub baseline: BaselineData,
    pub rules: Vec<ThresholdRule>,
    pub options: ComparisonOptions,

    /// Exact metric name -> direction, consulted before the built-in table.
    pub directions: BTreeMap<String, Direction>,
}

pub struct CompareUseCase<C: Clock, I: IdGenerator> {
    clock: C,
    ids: I,
}

impl<C: Clock, I: IdGenerator> CompareUseCase<C, I> {
    pub fn new(clock: C, ids: I) -> Self {
        Self { clock, ids }
    }

    /// Compare `current` against the baseline snapshot and judge the rules.
    ///
    /// All inputs are validated before any comparison runs. Any failure in
    /// generation or evaluation aborts the whole report.
    pub fn execute(&self, req: CompareRequest) -> Result<ComparisonReport, EngineError> {
        validate_metrics_snapshot(&req.current)?;
        validate_baseline_data(&req.baseline)?;
        for rule in &req.rules {
            validate_threshold_rule(rule)?;
        }
        let precision = req.options.precision();
        validate_precision(precision)?;

        let comparator = Comparator::with_classifier(
            precision,
            DirectionClassifier::with_overrides(req.directions),
        );

        let comparisons = generate_comparisons(
            &req.current,
            &req.baseline.snapshot,
            &req.options,
            &comparator,
        );
        debug!(
            comparisons = comparisons.len(),
            baseline = %req.baseline.id,
            "generated comparisons"
        );

        let evaluations = evaluate_rules(&req.rules, &comparisons).map_err(wrap_domain)?;
        let enabled = req.rules.iter().filter(|r| r.enabled).count();
        debug!(
            enabled_rules = enabled,
            evaluated = evaluations.len(),
            "evaluated rules"
        );
        for rule in req
            .rules
            .iter()
            .filter(|r| r.enabled && !evaluations.iter().any(|e| e.rule == **r))
        {
            warn!(rule = %rule.name, pattern = %rule.metric, "rule matched no comparison; skipped");
        }

        let summary = build_summary(&evaluations);
        let status = overall_status(&evaluations);
        let recommendations = generate_recommendations(&comparisons, &evaluations);

        let report = ComparisonReport {
            schema: REPORT_SCHEMA_V1.to_string(),
            id: self.ids.next_id(),
            baseline_id: req.baseline.id,
            created_at: self.clock.now(),
            current: req.current,
            baseline: req.baseline.snapshot,
            summary,
            comparisons,
            rule_evaluations: evaluations,
            recommendations,
            overall_status: status,
        };

        info!(
            report = %report.id,
            status = ?report.overall_status,
            failed = report.summary.failed,
            warnings = report.summary.warnings,
            "comparison complete"
        );

        Ok(report)
    }
}

fn wrap_domain(err: DomainError) -> EngineError {
    match err {
        DomainError::Validation(v) => EngineError::Validation(v),
        other => EngineError::comparison("failed to compare metrics", other),
    }
}

/// Exit-code policy shared by callers that gate on a report.
pub fn is_blocking(status: OverallStatus, fail_on_warning: bool) -> bool {
    match status {
        OverallStatus::Pass => false,
        OverallStatus::Warning => fail_on_warning,
        OverallStatus::Fail => true,
    }
}

#[derive(Debug, Clone)]
pub struct CompareMetricRequest {
    pub name: String,
    pub current: f64,
    pub baseline: f64,
    pub precision: u32,
    pub directions: BTreeMap<String, Direction>,
}

/// One-off comparison of a single named value pair.
pub struct CompareMetricUseCase;

impl CompareMetricUseCase {
    pub fn execute(req: CompareMetricRequest) -> Result<ComparisonResult, EngineError> {
        validate_non_empty_string(&req.name, "name")?;
        validate_positive_number(req.current, "current")?;
        validate_positive_number(req.baseline, "baseline")?;
        validate_precision(req.precision)?;

        let comparator = Comparator::with_classifier(
            req.precision,
            DirectionClassifier::with_overrides(req.directions),
        );
        Ok(comparator.compare(&req.name, req.current, req.baseline))
    }
}
