//! "Higher is better" classification.
//!
//! Lookup order: caller overrides, the built-in table of known metric names,
//! the performance category, then a name heuristic as a last resort.

use metricgate_types::{Direction, PerformanceCategory, metric_names as names};
use std::collections::BTreeMap;

/// Case-insensitive name fragments that mark a metric as lower-is-better
/// when nothing more specific is known about it.
pub const LOWER_IS_BETTER_HINTS: [&str; 7] = [
    "failed", "error", "duration", "time", "latency", "memory", "cpu",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionClassifier {
    overrides: BTreeMap<String, Direction>,
}

impl DirectionClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: BTreeMap<String, Direction>) -> Self {
        Self { overrides }
    }

    pub fn insert(&mut self, metric: impl Into<String>, direction: Direction) {
        self.overrides.insert(metric.into(), direction);
    }

    /// Direction for a metric when its performance category is unknown.
    pub fn classify(&self, metric: &str) -> Direction {
        self.known(metric)
            .unwrap_or_else(|| heuristic_direction(metric))
    }

    /// Direction for a performance measurement whose category is known.
    pub fn classify_with_category(&self, metric: &str, category: PerformanceCategory) -> Direction {
        self.known(metric)
            .or_else(|| category_direction(category))
            .unwrap_or_else(|| heuristic_direction(metric))
    }

    fn known(&self, metric: &str) -> Option<Direction> {
        self.overrides
            .get(metric)
            .copied()
            .or_else(|| builtin_direction(metric))
    }
}

fn builtin_direction(metric: &str) -> Option<Direction> {
    match metric {
        names::TESTS_TOTAL | names::TESTS_PASSED | names::TESTS_PASS_RATE => {
            Some(Direction::Higher)
        }
        // More skipped tests means less of the suite actually ran.
        names::TESTS_FAILED | names::TESTS_SKIPPED | names::TESTS_DURATION => {
            Some(Direction::Lower)
        }
        m if m.starts_with("coverage.") && m.ends_with(".percentage") => Some(Direction::Higher),
        _ => None,
    }
}

/// `None` for `custom`: the category says nothing about direction.
pub fn category_direction(category: PerformanceCategory) -> Option<Direction> {
    match category {
        PerformanceCategory::Timing
        | PerformanceCategory::Memory
        | PerformanceCategory::Cpu
        | PerformanceCategory::Size
        | PerformanceCategory::Network => Some(Direction::Lower),
        PerformanceCategory::Throughput => Some(Direction::Higher),
        PerformanceCategory::Custom => None,
    }
}

fn heuristic_direction(metric: &str) -> Direction {
    let lower = metric.to_lowercase();
    if LOWER_IS_BETTER_HINTS.iter().any(|hint| lower.contains(hint)) {
        Direction::Lower
    } else {
        Direction::Higher
    }
}
