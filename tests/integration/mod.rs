//! Workspace integration tests that drive the library crates together,
//! without going through the CLI binary.

mod compare_flow;
mod config_flow;
mod trend_flow;

use chrono::{DateTime, Duration, TimeZone, Utc};
use metricgate_types::{
    CoverageMetric, CoverageSummary, MetricsSnapshot, PerformanceCategory, PerformanceMetric,
    TestSummary,
};

pub fn at(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 6, 0, 0).unwrap() + Duration::days(day)
}

fn coverage(pct: f64) -> CoverageMetric {
    CoverageMetric {
        total: 2000,
        covered: (pct * 20.0).round() as u64,
        percentage: pct,
    }
}

pub fn snapshot(id: &str, day: i64, passed: u64, failed: u64, lines: f64) -> MetricsSnapshot {
    MetricsSnapshot {
        id: id.to_string(),
        branch: "main".to_string(),
        commit: format!("{id}0000"),
        environment: "staging".to_string(),
        version: "3.1.0".to_string(),
        tests: TestSummary {
            total: passed + failed + 4,
            passed,
            failed,
            skipped: 4,
            duration: 310.0,
        },
        coverage: CoverageSummary {
            lines: coverage(lines),
            functions: coverage(91.0),
            branches: coverage(72.5),
            statements: coverage(88.0),
        },
        performance: vec![
            PerformanceMetric {
                name: "p95".to_string(),
                value: 180.0,
                unit: "ms".to_string(),
                category: PerformanceCategory::Timing,
            },
            PerformanceMetric {
                name: "rss".to_string(),
                value: 512.0,
                unit: "mb".to_string(),
                category: PerformanceCategory::Memory,
            },
        ],
        metadata: Default::default(),
        created_at: at(day),
        updated_at: at(day),
    }
}

pub fn perf_mut<'a>(snapshot: &'a mut MetricsSnapshot, name: &str) -> &'a mut PerformanceMetric {
    snapshot
        .performance
        .iter_mut()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("no performance metric {name}"))
}
