use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use metricgate_app::{
    CompareMetricRequest, CompareMetricUseCase, CompareRequest, CompareUseCase, SystemClock,
    TrendRequest, TrendUseCase, UuidIdGenerator, baseline_from_snapshot, is_blocking,
    render_markdown,
};
use metricgate_types::{
    BaselineData, ComparisonOptions, ComparisonReport, ConfigFile, MetricsSnapshot,
    OverallStatus, TrendAxis,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Exit code for a failing verdict.
const EXIT_FAIL: u8 = 2;
/// Exit code for a warning verdict under `--fail-on-warning`.
const EXIT_WARNING: u8 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "metricgate",
    version,
    about = "Compare test, coverage, and performance metrics against a baseline in CI"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare a current snapshot against a baseline and emit a report (JSON).
    Compare {
        /// Current metrics snapshot (JSON)
        #[arg(long)]
        current: PathBuf,

        /// Baseline (JSON). Either a baseline record or a bare snapshot.
        #[arg(long)]
        baseline: PathBuf,

        /// TOML config with defaults, direction overrides, and rules
        #[arg(long)]
        config: Option<PathBuf>,

        /// Keep metrics whose value did not change
        #[arg(long, default_value_t = false)]
        include_unchanged: bool,

        /// Decimal places in the report
        #[arg(long)]
        precision: Option<u32>,

        /// Metric substring that is always reported. Repeatable.
        #[arg(long = "custom-metric")]
        custom_metrics: Vec<String>,

        /// Metric substring to drop from the report. Repeatable.
        #[arg(long = "exclude-metric")]
        exclude_metrics: Vec<String>,

        /// Treat a warning verdict as a failing exit code
        #[arg(long, default_value_t = false)]
        fail_on_warning: bool,

        /// Report output path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also write a Markdown summary to this path
        #[arg(long)]
        md: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Compare a single named value pair and print the result (JSON).
    Metric {
        #[arg(long)]
        name: String,

        #[arg(long, allow_negative_numbers = true)]
        current: f64,

        #[arg(long, allow_negative_numbers = true)]
        baseline: f64,

        #[arg(long, default_value_t = metricgate_types::DEFAULT_PRECISION)]
        precision: u32,

        /// TOML config; only `[directions]` is used
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Classify how one metric moved across a series of snapshots.
    Trend {
        /// Dotted metric path, e.g. coverage.lines.percentage
        #[arg(long)]
        metric: String,

        /// Snapshot file (JSON). Repeatable; order does not matter.
        #[arg(long = "snapshot", required = true)]
        snapshots: Vec<PathBuf>,

        /// Regression x-axis
        #[arg(long, value_enum, default_value_t = AxisArg::Index)]
        axis: AxisArg,

        /// TOML config; only `[directions]` is used
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Render a Markdown summary from a saved report.
    Md {
        #[arg(long)]
        report: PathBuf,

        /// Output markdown path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AxisArg {
    /// Position in the time-sorted series
    Index,
    /// Seconds since the first snapshot
    Elapsed,
}

impl From<AxisArg> for TrendAxis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::Index => TrendAxis::Index,
            AxisArg::Elapsed => TrendAxis::Elapsed,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    match real_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("METRICGATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn real_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Compare {
            current,
            baseline,
            config,
            include_unchanged,
            precision,
            custom_metrics,
            exclude_metrics,
            fail_on_warning,
            out,
            md,
            pretty,
        } => {
            let config = load_config(config.as_deref())?;
            let defaults = &config.defaults;

            let options = ComparisonOptions {
                include_unchanged: include_unchanged || defaults.include_unchanged.unwrap_or(false),
                precision_digits: precision.or(defaults.precision_digits),
                custom_metrics: merge_lists(defaults.custom_metrics.as_deref(), custom_metrics),
                exclude_metrics: merge_lists(defaults.exclude_metrics.as_deref(), exclude_metrics),
            };
            let fail_on_warning = fail_on_warning || defaults.fail_on_warning.unwrap_or(false);

            let current_snapshot: MetricsSnapshot = read_json(&current)?;
            let baseline_data = read_baseline(&baseline)?;

            let usecase = CompareUseCase::new(SystemClock, UuidIdGenerator);
            let report = usecase
                .execute(CompareRequest {
                    current: current_snapshot,
                    baseline: baseline_data,
                    rules: config.rules,
                    options,
                    directions: config.directions,
                })
                .with_context(|| {
                    format!("compare {} against {}", current.display(), baseline.display())
                })?;

            match &out {
                Some(path) => write_json(path, &report, pretty)?,
                None => println!("{}", to_json(&report, pretty)?),
            }
            if let Some(path) = &md {
                write_text(path, &render_markdown(&report))?;
            }

            Ok(verdict_exit_code(&report, fail_on_warning))
        }

        Command::Metric {
            name,
            current,
            baseline,
            precision,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let result = CompareMetricUseCase::execute(CompareMetricRequest {
                name,
                current,
                baseline,
                precision,
                directions: config.directions,
            })?;
            println!("{}", to_json(&result, false)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Trend {
            metric,
            snapshots,
            axis,
            config,
            out,
            pretty,
        } => {
            let config = load_config(config.as_deref())?;
            let history = snapshots
                .iter()
                .map(|p| read_json::<MetricsSnapshot>(p))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let result = TrendUseCase::execute(TrendRequest {
                snapshots: history,
                metric,
                axis: axis.into(),
                directions: config.directions,
            })?;

            match &out {
                Some(path) => write_json(path, &result, pretty)?,
                None => println!("{}", to_json(&result, pretty)?),
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Md { report, out } => {
            let saved: ComparisonReport = read_json(&report)?;
            let md = render_markdown(&saved);

            match out {
                Some(path) => write_text(&path, &md)?,
                None => print!("{md}"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn verdict_exit_code(report: &ComparisonReport, fail_on_warning: bool) -> ExitCode {
    if !is_blocking(report.overall_status, fail_on_warning) {
        return ExitCode::SUCCESS;
    }
    for eval in report.rule_evaluations.iter().filter(|e| !e.passed) {
        warn!(rule = %eval.rule.name, "{}", eval.message);
    }
    match report.overall_status {
        OverallStatus::Fail => ExitCode::from(EXIT_FAIL),
        _ => ExitCode::from(EXIT_WARNING),
    }
}

/// Config-file entries first, then command-line additions.
fn merge_lists(from_config: Option<&[String]>, from_cli: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = from_config.unwrap_or_default().to_vec();
    for item in from_cli {
        if !merged.contains(&item) {
            merged.push(item);
        }
    }
    merged
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ConfigFile> {
    let Some(path) = path else {
        return Ok(ConfigFile::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: ConfigFile =
        toml::from_str(&text).with_context(|| format!("parse toml {}", path.display()))?;
    debug!(
        path = %path.display(),
        rules = config.rules.len(),
        directions = config.directions.len(),
        "loaded config"
    );
    Ok(config)
}

/// A baseline file holds either a baseline record or a bare snapshot.
fn read_baseline(path: &Path) -> anyhow::Result<BaselineData> {
    let value: serde_json::Value = read_json(path)?;
    if value.get("snapshot").is_some() {
        return serde_json::from_value(value)
            .with_context(|| format!("parse baseline {}", path.display()));
    }
    let snapshot: MetricsSnapshot = serde_json::from_value(value)
        .with_context(|| format!("parse baseline snapshot {}", path.display()))?;
    Ok(baseline_from_snapshot(snapshot))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let v =
        serde_json::from_slice(&bytes).with_context(|| format!("parse json {}", path.display()))?;
    Ok(v)
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(s)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T, pretty: bool) -> anyhow::Result<()> {
    let mut text = to_json(value, pretty)?;
    text.push('\n');
    write_text(path, &text)
}

fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }
    atomic_write(path, text.as_bytes())
}

fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    use std::io::Write;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));

    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("create temp {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write temp {}", tmp.display()))?;
        f.sync_all().ok();
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn merge_keeps_config_order_and_dedups() {
        let merged = merge_lists(
            Some(&["coverage".to_string(), "tests.failed".to_string()]),
            vec!["tests.failed".into(), "performance.".into()],
        );
        assert_eq!(merged, vec!["coverage", "tests.failed", "performance."]);
        assert!(merge_lists(None, vec![]).is_empty());
    }
}
