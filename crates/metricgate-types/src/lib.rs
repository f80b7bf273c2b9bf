//! Shared types for metricgate.
//!
//! Design goal: versioned, explicit, boring.
//! Snapshots and baselines arrive from collectors, rules arrive from config,
//! and reports leave for renderers and CI gates. All of them are plain data.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const REPORT_SCHEMA_V1: &str = "metricgate.report.v1";

/// Decimal places used when a caller does not ask for a precision.
pub const DEFAULT_PRECISION: u32 = 2;

/// Upper bound on requested precision; beyond this `f64` rounding is noise.
pub const MAX_PRECISION: u32 = 10;

/// Names of the metrics the comparison generator always emits.
pub mod metric_names {
    pub const TESTS_TOTAL: &str = "tests.total";
    pub const TESTS_PASSED: &str = "tests.passed";
    pub const TESTS_FAILED: &str = "tests.failed";
    pub const TESTS_SKIPPED: &str = "tests.skipped";
    pub const TESTS_PASS_RATE: &str = "tests.passRate";
    pub const TESTS_DURATION: &str = "tests.duration";
    pub const COVERAGE_LINES: &str = "coverage.lines.percentage";
    pub const COVERAGE_FUNCTIONS: &str = "coverage.functions.percentage";
    pub const COVERAGE_BRANCHES: &str = "coverage.branches.percentage";
    pub const COVERAGE_STATEMENTS: &str = "coverage.statements.percentage";

    pub const PERFORMANCE_PREFIX: &str = "performance.";

    /// `performance.<name>.<unit>`
    pub fn performance(name: &str, unit: &str) -> String {
        format!("{PERFORMANCE_PREFIX}{name}.{unit}")
    }
}

// ----------------------------
// Snapshots
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,

    /// Wall-clock duration of the test run, in milliseconds.
    pub duration: f64,
}

impl TestSummary {
    /// passed / total * 100, or 0 for an empty run.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMetric {
    pub total: u64,
    pub covered: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub lines: CoverageMetric,
    pub functions: CoverageMetric,
    pub branches: CoverageMetric,
    pub statements: CoverageMetric,
}

#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceCategory {
    Timing,
    Memory,
    Cpu,
    Throughput,
    Size,
    Network,
    #[default]
    #[serde(other)]
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    pub name: String,
    pub value: f64,
    pub unit: String,

    #[serde(default)]
    pub category: PerformanceCategory,
}

impl PerformanceMetric {
    /// Union key used to pair measurements across snapshots.
    pub fn key(&self) -> String {
        format!("{}.{}", self.name, self.unit)
    }
}

/// One immutable bundle of test, coverage, and performance metrics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub id: String,
    pub branch: String,
    pub commit: String,
    pub environment: String,
    pub version: String,

    pub tests: TestSummary,
    pub coverage: CoverageSummary,

    #[serde(default)]
    pub performance: Vec<PerformanceMetric>,

    /// Free-form collector metadata (CI job, runner, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named, versioned snapshot designated as the comparison reference.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaselineData {
    pub id: String,
    pub name: String,
    pub version: u32,
    pub snapshot: MetricsSnapshot,

    #[serde(default)]
    pub is_default: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,
}

// ----------------------------
// Direction
// ----------------------------

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Larger values are better (pass counts, coverage, throughput).
    Higher,
    /// Smaller values are better (failures, durations, memory).
    Lower,
}

impl Direction {
    /// True when a change with this sign moves the metric the good way.
    pub fn favors(self, change: f64) -> bool {
        match self {
            Direction::Higher => change > 0.0,
            Direction::Lower => change < 0.0,
        }
    }
}

// ----------------------------
// Threshold rules
// ----------------------------

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOperator {
    Gte,
    Lte,
    Gt,
    Lt,
    Eq,
    Ne,
}

impl ComparisonOperator {
    /// Phrase used in rule evaluation messages ("should <phrase> <value>").
    pub fn phrase(self) -> &'static str {
        match self {
            ComparisonOperator::Gte => "be >=",
            ComparisonOperator::Lte => "be <=",
            ComparisonOperator::Gt => "be >",
            ComparisonOperator::Lt => "be <",
            ComparisonOperator::Eq => "equal",
            ComparisonOperator::Ne => "not equal",
        }
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdValueType {
    /// Compare against `ComparisonResult::delta`.
    Absolute,
    /// Compare against `ComparisonResult::delta_percentage`.
    Percentage,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRule {
    #[serde(default)]
    pub id: String,

    pub name: String,

    /// Metric name pattern; `*` matches any run, `?` matches one character.
    pub metric: String,

    pub comparison: ComparisonOperator,

    #[serde(rename = "type")]
    pub value_type: ThresholdValueType,

    pub value: f64,

    pub severity: Severity,

    /// Carried for consumers that ratchet thresholds; not interpreted here.
    #[serde(default)]
    pub progressive: bool,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// ----------------------------
// Comparison output
// ----------------------------

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Improved,
    Degraded,
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub metric: String,
    pub current: f64,
    pub baseline: f64,

    /// current - baseline
    pub delta: f64,

    /// delta / baseline * 100 (100 or 0 when the baseline is zero)
    pub delta_percentage: f64,

    pub status: ComparisonStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvaluationResult {
    pub rule: ThresholdRule,
    pub comparison: ComparisonResult,
    pub passed: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub warnings: u32,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Pass,
    Warning,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub schema: String,
    pub id: String,
    pub baseline_id: String,
    pub created_at: DateTime<Utc>,

    pub current: MetricsSnapshot,
    pub baseline: MetricsSnapshot,

    pub summary: ComparisonSummary,
    pub comparisons: Vec<ComparisonResult>,
    pub rule_evaluations: Vec<RuleEvaluationResult>,
    pub recommendations: Vec<String>,
    pub overall_status: OverallStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOptions {
    /// Keep rows whose status is `unchanged`.
    #[serde(default)]
    pub include_unchanged: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision_digits: Option<u32>,

    /// Substrings of metric names that are always kept, even when excluded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_metrics: Vec<String>,

    /// Substrings of metric names to drop.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_metrics: Vec<String>,
}

impl ComparisonOptions {
    pub fn precision(&self) -> u32 {
        self.precision_digits.unwrap_or(DEFAULT_PRECISION)
    }
}

// ----------------------------
// Trends
// ----------------------------

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
    Volatile,
}

/// Independent variable used for trend regression.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrendAxis {
    /// Position in the time-sorted history; assumes a uniform sampling cadence.
    #[default]
    Index,
    /// Seconds elapsed since the oldest snapshot.
    Elapsed,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub metric: String,
    pub axis: TrendAxis,
    pub trend: TrendDirection,
    pub slope: f64,
    pub correlation: f64,
    pub volatility: f64,
    pub values: Vec<TrendPoint>,
}

// ----------------------------
// Optional config file schema
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Exact metric name -> direction, overriding the built-in table.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub directions: BTreeMap<String, Direction>,

    #[serde(default, rename = "rule")]
    pub rules: Vec<ThresholdRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision_digits: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_unchanged: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metrics: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_metrics: Option<Vec<String>>,

    /// Treat an overall `warning` as a failing exit code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_warning: Option<bool>,
}
