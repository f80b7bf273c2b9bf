//! Markdown rendering for comparison reports.

use metricgate_types::{ComparisonReport, ComparisonStatus, OverallStatus};

pub fn render_markdown(report: &ComparisonReport) -> String {
    let mut out = String::new();

    let header = match report.overall_status {
        OverallStatus::Pass => "✅ metricgate: pass",
        OverallStatus::Warning => "⚠️ metricgate: warning",
        OverallStatus::Fail => "❌ metricgate: fail",
    };
    out.push_str(header);
    out.push_str("\n\n");

    out.push_str(&format!(
        "**Branch:** `{}` @ `{}` vs baseline `{}`\n\n",
        report.current.branch, report.current.commit, report.baseline_id
    ));
    out.push_str(&format!(
        "**Rules:** {} evaluated, {} passed, {} failed, {} warnings\n\n",
        report.summary.total, report.summary.passed, report.summary.failed, report.summary.warnings
    ));

    if report.comparisons.is_empty() {
        out.push_str("_No metric changed._\n");
    } else {
        out.push_str("| metric | baseline | current | delta | change | status |\n");
        out.push_str("|---|---:|---:|---:|---:|---|\n");
        for c in &report.comparisons {
            let icon = match c.status {
                ComparisonStatus::Improved => "⬆️ improved",
                ComparisonStatus::Degraded => "⬇️ degraded",
                ComparisonStatus::Unchanged => "➖ unchanged",
            };
            out.push_str(&format!(
                "| `{metric}` | {b} | {cur} | {delta} | {pct} | {icon} |\n",
                metric = c.metric,
                b = c.baseline,
                cur = c.current,
                delta = format_signed(c.delta, ""),
                pct = format_signed(c.delta_percentage, "%"),
            ));
        }
    }

    let failures: Vec<&str> = report
        .rule_evaluations
        .iter()
        .filter(|e| !e.passed)
        .map(|e| e.message.as_str())
        .collect();
    if !failures.is_empty() {
        out.push_str("\n**Failed rules:**\n");
        for msg in failures {
            out.push_str(&format!("- {msg}\n"));
        }
    }

    out.push_str("\n**Recommendations:**\n");
    for r in &report.recommendations {
        out.push_str(&format!("- {r}\n"));
    }

    out
}

fn format_signed(v: f64, suffix: &str) -> String {
    let sign = if v > 0.0 { "+" } else { "" };
    format!("{sign}{v}{suffix}")
}
