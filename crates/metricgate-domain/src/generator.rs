//! Snapshot pair -> full list of per-metric comparisons.

use crate::Comparator;
use metricgate_types::{
    ComparisonOptions, ComparisonResult, ComparisonStatus, MetricsSnapshot, PerformanceCategory,
    metric_names as names,
};
use std::collections::HashMap;

/// Build every comparison for a snapshot pair, then apply `options` filters.
///
/// Test and coverage metrics are always generated. Performance metrics are
/// the union of `name.unit` keys in either snapshot (current first, in list
/// order), a missing side counting as zero, skipping keys that are zero on
/// both sides.
pub fn generate_comparisons(
    current: &MetricsSnapshot,
    baseline: &MetricsSnapshot,
    options: &ComparisonOptions,
    comparator: &Comparator,
) -> Vec<ComparisonResult> {
    let mut rows = Vec::new();

    let (ct, bt) = (&current.tests, &baseline.tests);
    rows.push(comparator.compare(names::TESTS_TOTAL, ct.total as f64, bt.total as f64));
    rows.push(comparator.compare(names::TESTS_PASSED, ct.passed as f64, bt.passed as f64));
    rows.push(comparator.compare(names::TESTS_FAILED, ct.failed as f64, bt.failed as f64));
    rows.push(comparator.compare(names::TESTS_PASS_RATE, ct.pass_rate(), bt.pass_rate()));
    rows.push(comparator.compare(names::TESTS_DURATION, ct.duration, bt.duration));

    let (cc, bc) = (&current.coverage, &baseline.coverage);
    for (metric, c, b) in [
        (names::COVERAGE_LINES, &cc.lines, &bc.lines),
        (names::COVERAGE_FUNCTIONS, &cc.functions, &bc.functions),
        (names::COVERAGE_BRANCHES, &cc.branches, &bc.branches),
        (names::COVERAGE_STATEMENTS, &cc.statements, &bc.statements),
    ] {
        rows.push(comparator.compare(metric, c.percentage, b.percentage));
    }

    for perf in performance_union(current, baseline) {
        if perf.current == 0.0 && perf.baseline == 0.0 {
            continue;
        }
        let metric = names::performance(&perf.name, &perf.unit);
        rows.push(comparator.compare_performance(
            &metric,
            perf.current,
            perf.baseline,
            perf.category,
        ));
    }

    apply_filters(rows, options)
}

struct PerformancePair {
    name: String,
    unit: String,
    category: PerformanceCategory,
    current: f64,
    baseline: f64,
}

fn performance_union(current: &MetricsSnapshot, baseline: &MetricsSnapshot) -> Vec<PerformancePair> {
    let mut pairs: Vec<PerformancePair> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (is_current, snapshot) in [(true, current), (false, baseline)] {
        for perf in &snapshot.performance {
            let slot = *index.entry(perf.key()).or_insert_with(|| {
                pairs.push(PerformancePair {
                    name: perf.name.clone(),
                    unit: perf.unit.clone(),
                    category: perf.category,
                    current: 0.0,
                    baseline: 0.0,
                });
                pairs.len() - 1
            });
            // Later duplicates of a key within one snapshot win.
            let pair = &mut pairs[slot];
            if is_current {
                pair.current = perf.value;
            } else {
                pair.baseline = perf.value;
            }
        }
    }

    pairs
}

/// Exclusion, custom-metric forcing, then the unchanged filter.
///
/// A row survives exclusion when it matches no `exclude_metrics` substring
/// or when it matches a `custom_metrics` substring. Each row appears at most
/// once.
pub fn apply_filters(
    rows: Vec<ComparisonResult>,
    options: &ComparisonOptions,
) -> Vec<ComparisonResult> {
    let contains_any =
        |metric: &str, needles: &[String]| needles.iter().any(|n| metric.contains(n.as_str()));

    rows.into_iter()
        .filter(|row| {
            !contains_any(&row.metric, &options.exclude_metrics)
                || contains_any(&row.metric, &options.custom_metrics)
        })
        .filter(|row| options.include_unchanged || row.status != ComparisonStatus::Unchanged)
        .collect()
}
